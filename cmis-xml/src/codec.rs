//! Whole-document entry points.

use quick_xml::events::{BytesDecl, Event};
use quick_xml::reader::NsReader;
use tokio::io::AsyncWriteExt;

use super::error::ParsingError;
use super::xml::{
    default_namespaces, IRead, IWrite, Node, QWrite, Reader, Writer, SOAP11_URN, SOAP12_URN,
};

/// Output formatting
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    pub indent_char: u8,
    /// No indentation at all when 0
    pub indent_size: usize,
    pub xml_declaration: bool,
}
impl Default for Options {
    fn default() -> Self {
        Self {
            indent_char: b' ',
            indent_size: 4,
            xml_declaration: true,
        }
    }
}

/// Write `elem` as a complete document, namespaces are declared on its root
pub async fn serialize_into<W: IWrite>(
    elem: &impl QWrite,
    out: W,
    opts: &Options,
) -> Result<(), quick_xml::Error> {
    let mut q = match opts.indent_size {
        0 => quick_xml::writer::Writer::new(out),
        size => quick_xml::writer::Writer::new_with_indent(out, opts.indent_char, size),
    };
    if opts.xml_declaration {
        q.write_event_async(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
            .await?;
    }

    let mut writer = Writer {
        q,
        ns_to_apply: default_namespaces(),
    };
    elem.qwrite(&mut writer).await?;

    let mut out = writer.q.into_inner();
    out.flush().await?;
    Ok(())
}

pub async fn serialize(elem: &impl QWrite, opts: &Options) -> Result<String, quick_xml::Error> {
    let mut buffer = Vec::new();
    serialize_into(elem, &mut buffer, opts).await?;
    String::from_utf8(buffer).map_err(|e| quick_xml::Error::NonDecodable(Some(e.utf8_error())))
}

/// Decode the first `T` of the stream, anything before it is skipped.
/// When the document is a SOAP 1.1 or 1.2 envelope, `T` is searched in its body.
pub async fn deserialize_from<T: Node<T>>(src: impl IRead) -> Result<T, ParsingError> {
    let mut rdr = Reader::new(NsReader::from_reader(src)).await?;
    enter_soap_body(&mut rdr).await?;
    rdr.find().await.map_err(|e| {
        tracing::debug!(err = %e, "decoding failed");
        e
    })
}

pub async fn deserialize<T: Node<T>>(src: &str) -> Result<T, ParsingError> {
    deserialize_from(src.as_bytes()).await
}

async fn enter_soap_body(rdr: &mut Reader<impl IRead>) -> Result<(), ParsingError> {
    // declaration, comments and blanks before the root
    while !matches!(rdr.peek(), Event::Start(_) | Event::Empty(_) | Event::Eof) {
        rdr.skip().await?;
    }
    if !matches!(rdr.peek(), Event::Start(_)) {
        return Ok(());
    }

    for urn in [SOAP11_URN, SOAP12_URN] {
        if !rdr.is_tag(urn, "Envelope") {
            continue;
        }
        rdr.open(urn, "Envelope").await?;
        loop {
            if rdr.maybe_open(urn, "Body").await?.is_some() {
                return Ok(());
            }
            if rdr.skip_unknown().await? {
                tracing::debug!("soap envelope without a body");
                return Err(ParsingError::MissingChild);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coretypes::Fault;
    use crate::enums::ServiceException;
    use crate::message::Message;
    use crate::msgtypes::*;

    fn fault() -> Fault {
        Fault {
            kind: ServiceException::Versioning,
            code: 409,
            message: "not the latest version".into(),
            any: vec![],
        }
    }

    #[tokio::test]
    async fn default_options() {
        let got = serialize(&fault(), &Options::default()).await.unwrap();
        let expected = r#"<?xml version="1.0" encoding="utf-8"?>
<cmism:cmisFault xmlns:cmis="http://docs.oasis-open.org/ns/cmis/core/200901" xmlns:cmism="http://docs.oasis-open.org/ns/cmis/messaging/200901" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
    <cmism:type>versioning</cmism:type>
    <cmism:code>409</cmism:code>
    <cmism:message>not the latest version</cmism:message>
</cmism:cmisFault>"#;
        assert_eq!(&got, expected, "\n---GOT---\n{got}\n---EXP---\n{expected}\n");
    }

    #[tokio::test]
    async fn compact_without_declaration() {
        let opts = Options {
            indent_size: 0,
            xml_declaration: false,
            ..Options::default()
        };
        let got = serialize(&CheckIn::new("main", "d"), &opts).await.unwrap();
        let expected = r#"<cmism:checkIn xmlns:cmis="http://docs.oasis-open.org/ns/cmis/core/200901" xmlns:cmism="http://docs.oasis-open.org/ns/cmis/messaging/200901" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"><cmism:repositoryId>main</cmism:repositoryId><cmism:documentId>d</cmism:documentId></cmism:checkIn>"#;
        assert_eq!(&got, expected);
    }

    #[tokio::test]
    async fn decode_after_declaration_and_garbage() {
        let src = serialize(&fault(), &Options::default()).await.unwrap();
        let src = src.replacen("?>", "?>\n<rando/>\n<garbage><old/></garbage>", 1);

        let got = deserialize::<Message>(&src).await.unwrap();
        assert_eq!(got, Message::Fault(fault()));
    }

    #[tokio::test]
    async fn nothing_to_decode() {
        let got = deserialize::<Message>("<rando/>").await;
        assert!(matches!(got, Err(ParsingError::Eof)));
    }

    #[tokio::test]
    async fn message_inside_soap_body() {
        let src = r#"<?xml version="1.0" encoding="utf-8"?>
<S:Envelope xmlns:S="http://schemas.xmlsoap.org/soap/envelope/">
    <S:Header>
        <wsse:Security xmlns:wsse="http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-secext-1.0.xsd"/>
    </S:Header>
    <S:Body>
        <cmism:deleteObject xmlns:cmism="http://docs.oasis-open.org/ns/cmis/messaging/200901">
            <cmism:repositoryId>main</cmism:repositoryId>
            <cmism:objectId>n1</cmism:objectId>
        </cmism:deleteObject>
    </S:Body>
</S:Envelope>"#;
        let got = deserialize::<Message>(src).await.unwrap();
        assert_eq!(got.name(), "deleteObject");
        assert_eq!(got.repository_id(), Some("main"));

        let soap12 = r#"<env:Envelope xmlns:env="http://www.w3.org/2003/05/soap-envelope"><env:Body>
<cmism:checkIn xmlns:cmism="http://docs.oasis-open.org/ns/cmis/messaging/200901"><cmism:repositoryId>main</cmism:repositoryId><cmism:documentId>d</cmism:documentId></cmism:checkIn>
</env:Body></env:Envelope>"#;
        let got = deserialize::<CheckIn>(soap12).await.unwrap();
        assert_eq!(got, CheckIn::new("main", "d"));
    }

    #[tokio::test]
    async fn soap_envelope_without_body() {
        let src = r#"<S:Envelope xmlns:S="http://schemas.xmlsoap.org/soap/envelope/"><S:Header/></S:Envelope>"#;
        let got = deserialize::<Message>(src).await;
        assert!(matches!(got, Err(ParsingError::MissingChild)));
    }

    #[tokio::test]
    async fn wrong_root_type() {
        let got = deserialize::<CheckIn>(
            r#"<cmism:checkOut xmlns:cmism="http://docs.oasis-open.org/ns/cmis/messaging/200901"/>"#,
        )
        .await;
        assert!(got.is_err());
    }
}
