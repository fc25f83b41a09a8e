use quick_xml::events::attributes::AttrError;

/// A string that is not part of a closed CMIS enumeration
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("illegal value {value:?} for {kind}")]
pub struct IllegalArgument {
    pub kind: &'static str,
    pub value: String,
}

/// Decoding failures.
///
/// `Recoverable` is not a real failure: the element under the cursor is
/// not the one that was asked for, and the caller may try something else.
#[derive(Debug, thiserror::Error)]
pub enum ParsingError {
    #[error("not the expected element")]
    Recoverable,
    #[error("a required child element is missing")]
    MissingChild,
    #[error("a required attribute is missing")]
    MissingAttribute,
    #[error("unexpected token")]
    WrongToken,
    #[error("value does not match its XML schema type")]
    InvalidValue,
    #[error("illegal argument: {0}")]
    IllegalArgument(#[from] IllegalArgument),
    #[error("text is not valid utf-8")]
    Utf8Error(#[from] std::str::Utf8Error),
    #[error("xml: {0}")]
    QuickXml(#[from] quick_xml::Error),
    #[error("bad date time: {0}")]
    Chrono(#[from] chrono::format::ParseError),
    #[error("bad integer: {0}")]
    Int(#[from] std::num::ParseIntError),
    #[error("bad base64 content: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("found EOF while expecting data")]
    Eof,
}

impl From<AttrError> for ParsingError {
    fn from(value: AttrError) -> Self {
        Self::QuickXml(value.into())
    }
}
