//! Encoding of the service envelopes.
//!
//! Envelopes are flat: every field is written with `QWriteAs`, optional
//! fields and lists go through the `Option` and `Vec` implementations.
//! An envelope with nothing set is written as an empty element.

use quick_xml::events::Event;
use quick_xml::Error as QError;

use super::msgtypes::FailedToDelete;
use super::xml::{IWrite, Ns, QWriteAs, Writer};

/// Implements `QWrite` for an envelope declared in `msgtypes`
macro_rules! envelope_qwrite {
    ($name:ident ($tag:literal) {
        $($field:ident : $mult:ident $ty:ty = $ns:ident $ftag:literal),* $(,)?
    }) => {
        impl $crate::xml::QWrite for $name {
            async fn qwrite(
                &self,
                xml: &mut $crate::xml::Writer<impl $crate::xml::IWrite>,
            ) -> Result<(), ::quick_xml::Error> {
                let start = xml.create_msg_element($tag);
                let unset = true $(&& $crate::msgencoder::envelope_qwrite!(@unset self.$field, $mult))*;
                if unset {
                    return xml
                        .q
                        .write_event_async(::quick_xml::events::Event::Empty(start))
                        .await;
                }

                let end = start.to_end().into_owned();
                xml.q
                    .write_event_async(::quick_xml::events::Event::Start(start))
                    .await?;
                $(
                    $crate::xml::QWriteAs::qwrite_as(
                        &self.$field,
                        xml,
                        $crate::xml::Ns::$ns,
                        $ftag,
                    )
                    .await?;
                )*
                xml.q
                    .write_event_async(::quick_xml::events::Event::End(end))
                    .await
            }
        }
    };
    (@unset $v:expr, req) => { false };
    (@unset $v:expr, opt) => { $v.is_none() };
    (@unset $v:expr, many) => { $v.is_empty() };
}
pub(crate) use envelope_qwrite;

impl QWriteAs for FailedToDelete {
    async fn qwrite_as(
        &self,
        xml: &mut Writer<impl IWrite>,
        ns: Ns,
        name: &'static str,
    ) -> Result<(), QError> {
        let start = xml.create_element(ns, name);
        if self.object_ids.is_empty() {
            return xml.q.write_event_async(Event::Empty(start)).await;
        }
        let end = start.to_end().into_owned();
        xml.q.write_event_async(Event::Start(start)).await?;
        self.object_ids.qwrite_as(xml, Ns::Msg, "objectId").await?;
        xml.q.write_event_async(Event::End(end)).await
    }
}
