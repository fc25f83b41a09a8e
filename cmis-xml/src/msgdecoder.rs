//! Decoding of the service envelopes.

use super::error::ParsingError;
use super::msgtypes::FailedToDelete;
use super::xml::{IRead, Ns, QReadAs, Reader};

/// Implements `QRead` for an envelope declared in `msgtypes`.
///
/// Children are accepted in any order, unknown ones are skipped and a
/// missing `req` field is a `MissingChild` error.
macro_rules! envelope_qread {
    ($name:ident ($tag:literal) {
        $($field:ident : $mult:ident $ty:ty = $ns:ident $ftag:literal),* $(,)?
    }) => {
        impl $crate::xml::QRead<$name> for $name {
            #[allow(unused_mut)]
            async fn qread(
                xml: &mut $crate::xml::Reader<impl $crate::xml::IRead>,
            ) -> Result<Self, $crate::error::ParsingError> {
                xml.open($crate::xml::MSG_URN, $tag).await?;
                $(let mut $field = $crate::msgdecoder::envelope_qread!(@init $mult);)*
                loop {
                    let mut dirty = false;
                    $(
                        $crate::msgdecoder::envelope_qread!(
                            @read $mult, xml, $crate::xml::Ns::$ns, $ftag, &mut $field, &mut dirty
                        );
                    )*
                    if !dirty && xml.skip_unknown().await? {
                        break;
                    }
                }
                xml.close().await?;

                Ok($name {
                    $($field: $crate::msgdecoder::envelope_qread!(@finish $mult, $field, $ftag),)*
                })
            }
        }
    };
    (@init many) => { Vec::new() };
    (@init $other:ident) => { None };
    (@read many, $xml:ident, $ns:expr, $ftag:literal, $acc:expr, $dirty:expr) => {
        $xml.maybe_push_as($ns, $ftag, $acc, $dirty).await?
    };
    (@read $other:ident, $xml:ident, $ns:expr, $ftag:literal, $acc:expr, $dirty:expr) => {
        $xml.maybe_read_as($ns, $ftag, $acc, $dirty).await?
    };
    (@finish req, $v:ident, $ftag:literal) => { $crate::xml::required($v, $ftag)? };
    (@finish $other:ident, $v:ident, $ftag:literal) => { $v };
}
pub(crate) use envelope_qread;

impl QReadAs<FailedToDelete> for FailedToDelete {
    async fn qread_as(
        xml: &mut Reader<impl IRead>,
        ns: Ns,
        name: &'static str,
    ) -> Result<Self, ParsingError> {
        xml.open(ns.urn(), name).await?;
        let mut object_ids = Vec::new();
        loop {
            let mut dirty = false;
            xml.maybe_push_as(Ns::Msg, "objectId", &mut object_ids, &mut dirty)
                .await?;
            if !dirty && xml.skip_unknown().await? {
                break;
            }
        }
        xml.close().await?;
        Ok(FailedToDelete { object_ids })
    }
}
