#![no_main]

use libfuzzer_sys::arbitrary;
use libfuzzer_sys::arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use cmis_xml::codec::{deserialize, serialize, Options};
use cmis_xml::message::Message;
use tokio::runtime::Runtime;

const ROOTS: [&str; 12] = [
    "checkIn",
    "createDocument",
    "deleteTree",
    "deleteTreeResponse",
    "getChildrenResponse",
    "getContentChangesResponse",
    "getPropertiesResponse",
    "getRepositoryInfoResponse",
    "getTypesResponse",
    "cmisFault",
    "query",
    "queryResponse",
];

const TOKENS: [&str; 52] = [
    "0",
    "1",
    "true",
    "false",
    "42.5",
    "2009-01-01T10:00:00+01:00",
    "aGVsbG8=",
    "main",
    "cmis:Name",
    "cmis:ObjectId",
    "pdid",
    "xsi:nil",
    "xsi:type",
    "cmis:cmisTypeFolderDefinitionType",
    "allowableActions",
    "baseTypeId",
    "canDeleteObject",
    "canGetChildren",
    "changeToken",
    "changeType",
    "changedObject",
    "child",
    "code",
    "contentStream",
    "continueOnFailure",
    "creatable",
    "documentId",
    "failedToDelete",
    "folderId",
    "hasMoreItems",
    "major",
    "message",
    "mimeType",
    "object",
    "objectId",
    "properties",
    "propertyId",
    "propertyString",
    "propertyBoolean",
    "propertyDateTime",
    "propertyDecimal",
    "queryName",
    "repositoryId",
    "repositoryInfo",
    "statement",
    "stream",
    "type",
    "typeId",
    "value",
    "versioningState",
    "folderType",
    "objectNotFound",
];

#[derive(Arbitrary)]
struct Token(usize);
impl Token {
    fn serialize(&self) -> &'static str {
        TOKENS[self.0 % TOKENS.len()]
    }
}

#[derive(Arbitrary)]
struct Tag {
    core: bool,
    name: Token,
    attr: Option<(Token, Token)>,
}
impl Tag {
    fn name(&self) -> String {
        let prefix = if self.core { "cmis" } else { "cmism" };
        format!("{}:{}", prefix, self.name.serialize())
    }
    fn start(&self) -> String {
        match &self.attr {
            Some((k, v)) => format!("{} {}=\"{}\"", self.name(), k.serialize(), v.serialize()),
            None => self.name(),
        }
    }
}

#[derive(Arbitrary)]
enum XmlNode {
    Node(Tag, Vec<Self>),
    Number(i64),
    Text(Token),
}
impl std::fmt::Debug for XmlNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.serialize())
    }
}
impl XmlNode {
    fn serialize(&self) -> String {
        match self {
            Self::Node(tag, children) if children.is_empty() => format!("<{}/>", tag.start()),
            Self::Node(tag, children) => format!(
                "<{}>{}</{}>",
                tag.start(),
                children.iter().map(|v| v.serialize()).collect::<String>(),
                tag.name()
            ),
            Self::Number(v) => format!("{}", v),
            Self::Text(v) => v.serialize().to_string(),
        }
    }
}

#[derive(Arbitrary, Debug)]
struct Document {
    root: usize,
    nodes: Vec<XmlNode>,
}
impl Document {
    fn serialize(&self) -> String {
        let root = ROOTS[self.root % ROOTS.len()];
        format!(
            "<cmism:{root} xmlns:cmis=\"http://docs.oasis-open.org/ns/cmis/core/200901\" xmlns:cmism=\"http://docs.oasis-open.org/ns/cmis/messaging/200901\" xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\">{}</cmism:{root}>",
            self.nodes.iter().map(|v| v.serialize()).collect::<String>(),
        )
    }
}

fuzz_target!(|doc: Document| {
    let gen = doc.serialize();
    let rt = Runtime::new().expect("tokio runtime initialization");

    rt.block_on(async {
        // 1. Only inputs that decode are interesting
        let reference = match deserialize::<Message>(&gen).await {
            Err(_) => return,
            Ok(m) => m,
        };

        // 2. Encode what was understood
        let encoded = serialize(&reference, &Options::default())
            .await
            .expect("xml serialization");

        // 3. Our own output must decode to the same value
        let comparison = deserialize::<Message>(&encoded)
            .await
            .expect("deserialize again");
        assert_eq!(reference, comparison);
    })
});
