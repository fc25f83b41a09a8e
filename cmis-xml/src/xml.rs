use futures::Future;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::name::{QName, ResolveResult};
use quick_xml::reader::NsReader;
use tokio::io::{AsyncBufRead, AsyncWrite};

use super::error::ParsingError;

// Constants
pub const CMIS_URN: &[u8] = b"http://docs.oasis-open.org/ns/cmis/core/200901";
pub const MSG_URN: &[u8] = b"http://docs.oasis-open.org/ns/cmis/messaging/200901";
pub const XSI_URN: &[u8] = b"http://www.w3.org/2001/XMLSchema-instance";
pub const XOP_URN: &[u8] = b"http://www.w3.org/2004/08/xop/include";
pub const SOAP11_URN: &[u8] = b"http://schemas.xmlsoap.org/soap/envelope/";
pub const SOAP12_URN: &[u8] = b"http://www.w3.org/2003/05/soap-envelope";

/// The two CMIS namespaces an element of this crate can live in
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Ns {
    Cmis,
    Msg,
}
impl Ns {
    pub fn urn(&self) -> &'static [u8] {
        match self {
            Self::Cmis => CMIS_URN,
            Self::Msg => MSG_URN,
        }
    }

    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Cmis => "cmis",
            Self::Msg => "cmism",
        }
    }
}

/// Namespace declarations put on the root element of every document we write
pub fn default_namespaces() -> Vec<(String, String)> {
    vec![
        ("xmlns:cmis".into(), String::from_utf8_lossy(CMIS_URN).into_owned()),
        ("xmlns:cmism".into(), String::from_utf8_lossy(MSG_URN).into_owned()),
        ("xmlns:xsi".into(), String::from_utf8_lossy(XSI_URN).into_owned()),
    ]
}

// Async traits
pub trait IWrite: AsyncWrite + Unpin + Send {}
impl<T: AsyncWrite + Unpin + Send> IWrite for T {}
pub trait IRead: AsyncBufRead + Unpin {}
impl<T: AsyncBufRead + Unpin> IRead for T {}

// Serialization/Deserialization traits

/// An object bound to a single global element
pub trait QWrite {
    fn qwrite(
        &self,
        xml: &mut Writer<impl IWrite>,
    ) -> impl Future<Output = Result<(), quick_xml::Error>> + Send;
}
pub trait QRead<T> {
    fn qread(xml: &mut Reader<impl IRead>) -> impl Future<Output = Result<T, ParsingError>>;
}

/// A schema type, the element name is chosen by the enclosing type
pub trait QWriteAs {
    fn qwrite_as(
        &self,
        xml: &mut Writer<impl IWrite>,
        ns: Ns,
        name: &'static str,
    ) -> impl Future<Output = Result<(), quick_xml::Error>> + Send;
}
pub trait QReadAs<T> {
    fn qread_as(
        xml: &mut Reader<impl IRead>,
        ns: Ns,
        name: &'static str,
    ) -> impl Future<Output = Result<T, ParsingError>>;
}

// The representation of an XML node in Rust
pub trait Node<T>: QRead<T> + QWrite + std::fmt::Debug + PartialEq + Clone + Sync {}
impl<T: QRead<T> + QWrite + std::fmt::Debug + PartialEq + Clone + Sync> Node<T> for T {}

// The representation of a schema type in Rust
pub trait TypeNode<T>:
    QReadAs<T> + QWriteAs + std::fmt::Debug + PartialEq + Clone + Send + Sync
{
}
impl<T: QReadAs<T> + QWriteAs + std::fmt::Debug + PartialEq + Clone + Send + Sync> TypeNode<T>
    for T
{
}

impl<T: QWriteAs + Sync> QWriteAs for Option<T> {
    async fn qwrite_as(
        &self,
        xml: &mut Writer<impl IWrite>,
        ns: Ns,
        name: &'static str,
    ) -> Result<(), quick_xml::Error> {
        match self {
            Some(v) => v.qwrite_as(xml, ns, name).await,
            None => Ok(()),
        }
    }
}

impl<T: QWriteAs + Sync> QWriteAs for Vec<T> {
    async fn qwrite_as(
        &self,
        xml: &mut Writer<impl IWrite>,
        ns: Ns,
        name: &'static str,
    ) -> Result<(), quick_xml::Error> {
        for v in self.iter() {
            v.qwrite_as(xml, ns, name).await?;
        }
        Ok(())
    }
}

// ---------------

/// An attribute we do not model, kept with its resolved namespace
#[derive(Debug, PartialEq, Clone)]
pub struct ExtAttribute {
    pub name: String,
    pub namespace: Option<String>,
    pub value: String,
}
impl ExtAttribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            value: value.into(),
        }
    }

    pub fn prefix(&self) -> Option<&str> {
        self.name.split_once(':').map(|(p, _)| p)
    }

    pub fn local(&self) -> &str {
        match self.name.split_once(':') {
            Some((_, l)) => l,
            None => self.name.as_str(),
        }
    }
}

/// Remove an unqualified attribute from the list and return its value
pub fn take_attribute(attrs: &mut Vec<ExtAttribute>, name: &str) -> Option<String> {
    let idx = attrs
        .iter()
        .position(|a| a.namespace.is_none() && a.prefix().is_none() && a.local() == name)?;
    Some(attrs.remove(idx).value)
}

/// Remove an `xsi:` attribute from the list and return its value
pub fn take_xsi_attribute(attrs: &mut Vec<ExtAttribute>, name: &str) -> Option<String> {
    let idx = attrs
        .iter()
        .position(|a| a.namespace.as_deref().map(str::as_bytes) == Some(XSI_URN) && a.local() == name)?;
    Some(attrs.remove(idx).value)
}

/// An element captured verbatim in an `<xs:any>` slot
#[derive(Debug, PartialEq, Clone)]
pub struct AnyElement {
    pub prefix: Option<String>,
    pub local: String,
    pub namespace: Option<String>,
    pub attributes: Vec<ExtAttribute>,
    pub children: Vec<AnyNode>,
}
impl AnyElement {
    pub fn new(namespace: Option<&str>, prefix: Option<&str>, local: &str) -> Self {
        Self {
            prefix: prefix.map(Into::into),
            local: local.into(),
            namespace: namespace.map(Into::into),
            attributes: vec![],
            children: vec![],
        }
    }

    pub fn qualified_name(&self) -> String {
        match &self.prefix {
            Some(p) => format!("{}:{}", p, self.local),
            None => self.local.clone(),
        }
    }

    /// The `xmlns` declarations this element needs, given the bindings
    /// already in scope
    fn declarations(&self, scope: &[(String, String)]) -> Vec<(String, String)> {
        let own = match (&self.prefix, &self.namespace) {
            (Some(p), Some(ns)) => Some((format!("xmlns:{}", p), ns.clone())),
            (None, ns) => Some(("xmlns".to_string(), ns.clone().unwrap_or_default())),
            (Some(_), None) => None,
        };
        let used_by_attributes =
            self.attributes
                .iter()
                .filter_map(|a| match (a.prefix(), &a.namespace) {
                    (Some(p), Some(ns)) if p != "xml" => Some((format!("xmlns:{}", p), ns.clone())),
                    _ => None,
                });

        let mut decls: Vec<(String, String)> = vec![];
        for (key, ns) in own.into_iter().chain(used_by_attributes) {
            if bound(scope, &key) != ns && !decls.iter().any(|(k, _)| k == &key) {
                decls.push((key, ns));
            }
        }
        decls
    }
}

/// Namespace bound to `key` (`xmlns` or `xmlns:prefix`), empty when unbound
fn bound<'a>(scope: &'a [(String, String)], key: &str) -> &'a str {
    scope
        .iter()
        .rev()
        .find(|(k, _)| k == key)
        .map_or("", |(_, v)| v.as_str())
}

enum Step<'a> {
    Enter(&'a AnyElement),
    Text(&'a str),
    Exit(BytesEnd<'static>, usize),
}
impl<'a> From<&'a AnyNode> for Step<'a> {
    fn from(node: &'a AnyNode) -> Self {
        match node {
            AnyNode::Element(e) => Step::Enter(e),
            AnyNode::Text(t) => Step::Text(t.as_str()),
        }
    }
}

/// Serialize captured content as is: no indentation is added, so text
/// nodes (whitespace included) are the only text in the output.
/// Depth first, without recursion.
fn compact(mut stack: Vec<Step<'_>>) -> Result<String, quick_xml::Error> {
    let mut q = quick_xml::writer::Writer::new(Vec::new());
    let mut scope: Vec<(String, String)> = vec![];

    while let Some(step) = stack.pop() {
        match step {
            Step::Enter(elem) => {
                let decls = elem.declarations(&scope);
                let mut start = BytesStart::new(elem.qualified_name());
                for (k, v) in decls.iter() {
                    start.push_attribute((k.as_str(), v.as_str()));
                }
                for attr in elem.attributes.iter() {
                    start.push_attribute((attr.name.as_str(), attr.value.as_str()));
                }

                if elem.children.is_empty() {
                    q.write_event(Event::Empty(start))?;
                    continue;
                }

                let end = start.to_end().into_owned();
                q.write_event(Event::Start(start))?;
                stack.push(Step::Exit(end, scope.len()));
                scope.extend(decls);
                stack.extend(elem.children.iter().rev().map(Step::from));
            }
            Step::Text(txt) => q.write_event(Event::Text(BytesText::new(txt)))?,
            Step::Exit(end, depth) => {
                scope.truncate(depth);
                q.write_event(Event::End(end))?;
            }
        }
    }

    String::from_utf8(q.into_inner())
        .map_err(|e| quick_xml::Error::NonDecodable(Some(e.utf8_error())))
}

#[derive(Debug, PartialEq, Clone)]
pub enum AnyNode {
    Element(AnyElement),
    Text(String),
}

/// Mixed content kept opaque (html values, xml values, vendor information)
#[derive(Debug, PartialEq, Clone, Default)]
pub struct AnyXml(pub Vec<AnyNode>);

impl QWriteAs for AnyXml {
    async fn qwrite_as(
        &self,
        xml: &mut Writer<impl IWrite>,
        ns: Ns,
        name: &'static str,
    ) -> Result<(), quick_xml::Error> {
        let start = xml.create_element(ns, name);
        if self.0.is_empty() {
            return xml.q.write_event_async(Event::Empty(start)).await;
        }
        let end = start.to_end().into_owned();
        xml.q.write_event_async(Event::Start(start)).await?;
        xml.write_any_nodes(&self.0).await?;
        xml.q.write_event_async(Event::End(end)).await
    }
}

impl QReadAs<AnyXml> for AnyXml {
    async fn qread_as(
        xml: &mut Reader<impl IRead>,
        ns: Ns,
        name: &'static str,
    ) -> Result<Self, ParsingError> {
        xml.open(ns.urn(), name).await?;
        let nodes = xml.capture_content().await?;
        xml.close().await?;
        Ok(AnyXml(nodes))
    }
}

/// Put back unmodeled attributes, declaring the foreign prefixes they use
pub fn push_ext_attributes(start: &mut BytesStart<'static>, attrs: &[ExtAttribute]) {
    let mut declared: Vec<&str> = vec![];
    for attr in attrs.iter() {
        if let (Some(prefix), Some(ns)) = (attr.prefix(), &attr.namespace) {
            let known = matches!(prefix, "xml" | "cmis" | "cmism" | "xsi");
            if !known && !declared.contains(&prefix) {
                declared.push(prefix);
                start.push_attribute((format!("xmlns:{}", prefix).as_str(), ns.as_str()));
            }
        }
        start.push_attribute((attr.name.as_str(), attr.value.as_str()));
    }
}

// ---------------

/// Transform a Rust object into an XML stream of characters
pub struct Writer<T: IWrite> {
    pub q: quick_xml::writer::Writer<T>,
    pub ns_to_apply: Vec<(String, String)>,
}
impl<T: IWrite> Writer<T> {
    pub fn create_cmis_element(&mut self, name: &str) -> BytesStart<'static> {
        self.create_ns_element("cmis", name)
    }
    pub fn create_msg_element(&mut self, name: &str) -> BytesStart<'static> {
        self.create_ns_element("cmism", name)
    }
    pub fn create_element(&mut self, ns: Ns, name: &str) -> BytesStart<'static> {
        self.create_ns_element(ns.prefix(), name)
    }

    fn create_ns_element(&mut self, ns: &str, name: &str) -> BytesStart<'static> {
        self.create_raw_element(format!("{}:{}", ns, name))
    }

    fn create_raw_element(&mut self, qname: String) -> BytesStart<'static> {
        let mut start = BytesStart::new(qname);
        if !self.ns_to_apply.is_empty() {
            start.extend_attributes(
                self.ns_to_apply
                    .iter()
                    .map(|(k, n)| (k.as_str(), n.as_str())),
            );
            self.ns_to_apply.clear()
        }
        start
    }

    /// `<prefix:name>text</prefix:name>`
    pub async fn write_text(
        &mut self,
        ns: Ns,
        name: &str,
        text: &str,
    ) -> Result<(), quick_xml::Error> {
        let start = self.create_element(ns, name);
        let end = start.to_end().into_owned();
        self.q.write_event_async(Event::Start(start)).await?;
        self.q
            .write_event_async(Event::Text(BytesText::new(text)))
            .await?;
        self.q.write_event_async(Event::End(end)).await
    }

    /// Mixed content, written back exactly as it was captured
    pub async fn write_any_nodes(&mut self, nodes: &[AnyNode]) -> Result<(), quick_xml::Error> {
        if nodes.is_empty() {
            return Ok(());
        }
        let raw = compact(nodes.iter().rev().map(Step::from).collect())?;
        self.q
            .write_event_async(Event::Text(BytesText::from_escaped(raw)))
            .await
    }

    pub async fn write_any_elements(
        &mut self,
        elems: &[AnyElement],
    ) -> Result<(), quick_xml::Error> {
        for elem in elems.iter() {
            self.write_any(elem).await?;
        }
        Ok(())
    }

    /// A captured element on its own line. Its content is not indented:
    /// that would add text nodes that were not there.
    pub async fn write_any(&mut self, elem: &AnyElement) -> Result<(), quick_xml::Error> {
        let raw = compact(vec![Step::Enter(elem)])?;
        self.q.write_indent_async().await?;
        self.q
            .write_event_async(Event::Text(BytesText::from_escaped(raw)))
            .await
    }
}

/// Adjacent text and CDATA sections are one text node
fn push_text(nodes: &mut Vec<AnyNode>, txt: String) {
    if txt.is_empty() {
        return;
    }
    match nodes.last_mut() {
        Some(AnyNode::Text(prev)) => prev.push_str(&txt),
        _ => nodes.push(AnyNode::Text(txt)),
    }
}

/// Transform an XML stream of characters into a Rust object
pub struct Reader<T: IRead> {
    pub rdr: NsReader<T>,
    cur: Event<'static>,
    prev: Event<'static>,
    parents: Vec<Event<'static>>,
    buf: Vec<u8>,
}
impl<T: IRead> Reader<T> {
    pub async fn new(mut rdr: NsReader<T>) -> Result<Self, ParsingError> {
        let mut buf: Vec<u8> = vec![];
        let cur = rdr.read_event_into_async(&mut buf).await?.into_owned();
        let parents = vec![];
        let prev = Event::Eof;
        buf.clear();
        Ok(Self {
            cur,
            prev,
            parents,
            rdr,
            buf,
        })
    }

    /// read one more tag
    /// do not expose it publicly
    async fn next(&mut self) -> Result<Event<'static>, ParsingError> {
        let evt = self
            .rdr
            .read_event_into_async(&mut self.buf)
            .await?
            .into_owned();
        self.buf.clear();
        self.prev = std::mem::replace(&mut self.cur, evt);
        Ok(self.prev.clone())
    }

    /// skip a node at current level
    pub async fn skip(&mut self) -> Result<Event<'static>, ParsingError> {
        match &self.cur {
            Event::Start(b) => {
                tracing::trace!(name=?String::from_utf8_lossy(b.name().as_ref()), "skipping element");
                let _span = self
                    .rdr
                    .read_to_end_into_async(b.to_end().name(), &mut self.buf)
                    .await?;
                self.next().await
            }
            Event::End(_) => Err(ParsingError::WrongToken),
            Event::Eof => Err(ParsingError::Eof),
            _ => self.next().await,
        }
    }

    /// check if this is the desired tag
    pub fn is_tag(&self, ns: &[u8], key: &str) -> bool {
        let qname = match self.peek() {
            Event::Start(bs) | Event::Empty(bs) => bs.name(),
            Event::End(be) => be.name(),
            _ => return false,
        };

        let (extr_ns, local) = self.rdr.resolve_element(qname);

        if local.into_inner() != key.as_bytes() {
            return false;
        }

        match extr_ns {
            ResolveResult::Bound(v) => v.into_inner() == ns,
            _ => false,
        }
    }

    pub fn parent_has_child(&self) -> bool {
        matches!(self.parents.last(), Some(Event::Start(_)) | None)
    }

    fn ensure_parent_has_child(&self) -> Result<(), ParsingError> {
        match self.parent_has_child() {
            true => Ok(()),
            false => Err(ParsingError::Recoverable),
        }
    }

    pub fn peek(&self) -> &Event<'static> {
        &self.cur
    }

    fn resolve_namespace(res: ResolveResult) -> Option<String> {
        match res {
            ResolveResult::Bound(v) => Some(String::from_utf8_lossy(v.into_inner()).into_owned()),
            _ => None,
        }
    }

    /// All the attributes of an element, namespace declarations excluded
    pub fn attributes(&self, evt: &Event<'static>) -> Result<Vec<ExtAttribute>, ParsingError> {
        let bs = match evt {
            Event::Start(bs) | Event::Empty(bs) => bs,
            _ => return Ok(vec![]),
        };

        let mut acc = vec![];
        for attr in bs.attributes() {
            let attr = attr?;
            let raw = attr.key.as_ref();
            if raw == b"xmlns" || raw.starts_with(b"xmlns:") {
                continue;
            }
            let (res, _) = self.rdr.resolve_attribute(QName(raw));
            acc.push(ExtAttribute {
                name: std::str::from_utf8(raw)?.to_string(),
                namespace: Self::resolve_namespace(res),
                value: attr.unescape_value()?.into_owned(),
            });
        }
        Ok(acc)
    }

    fn element_from(&self, bs: &BytesStart<'static>) -> Result<AnyElement, ParsingError> {
        let qname = bs.name();
        let (res, local) = self.rdr.resolve_element(qname);
        let prefix = match qname.prefix() {
            Some(p) => Some(std::str::from_utf8(p.into_inner())?.to_string()),
            None => None,
        };
        Ok(AnyElement {
            prefix,
            local: std::str::from_utf8(local.into_inner())?.to_string(),
            namespace: Self::resolve_namespace(res),
            attributes: self.attributes(&Event::Start(bs.clone()))?,
            children: vec![],
        })
    }

    /// Capture the element under the cursor as an opaque tree
    pub async fn capture(&mut self) -> Result<AnyElement, ParsingError> {
        self.ensure_parent_has_child()?;

        let root = match self.peek() {
            Event::Empty(bs) => {
                let elem = self.element_from(bs)?;
                self.next().await?;
                return Ok(elem);
            }
            Event::Start(bs) => self.element_from(bs)?,
            _ => return Err(ParsingError::Recoverable),
        };
        self.next().await?;

        let mut stack = vec![root];
        loop {
            match self.peek() {
                Event::Start(bs) => {
                    let elem = self.element_from(bs)?;
                    stack.push(elem);
                }
                Event::Empty(bs) => {
                    let elem = self.element_from(bs)?;
                    let parent = stack.last_mut().ok_or(ParsingError::WrongToken)?;
                    parent.children.push(AnyNode::Element(elem));
                }
                Event::Text(escaped) => {
                    let txt = escaped.unescape()?.into_owned();
                    let parent = stack.last_mut().ok_or(ParsingError::WrongToken)?;
                    push_text(&mut parent.children, txt);
                }
                Event::CData(unescaped) => {
                    let txt = std::str::from_utf8(unescaped.as_ref())?.to_string();
                    let parent = stack.last_mut().ok_or(ParsingError::WrongToken)?;
                    push_text(&mut parent.children, txt);
                }
                Event::End(_) => {
                    let done = stack.pop().ok_or(ParsingError::WrongToken)?;
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(AnyNode::Element(done)),
                        None => {
                            self.next().await?;
                            tracing::debug!(name = done.local, "captured extension element");
                            return Ok(done);
                        }
                    }
                }
                Event::Eof => return Err(ParsingError::Eof),
                _ => (),
            };
            self.next().await?;
        }
    }

    /// Capture everything until the end of the current element (mixed content)
    pub async fn capture_content(&mut self) -> Result<Vec<AnyNode>, ParsingError> {
        let mut acc = vec![];
        if !self.parent_has_child() {
            return Ok(acc);
        }

        loop {
            match self.peek() {
                Event::Start(_) | Event::Empty(_) => acc.push(AnyNode::Element(self.capture().await?)),
                Event::Text(escaped) => {
                    push_text(&mut acc, escaped.unescape()?.into_owned());
                    self.next().await?;
                }
                Event::CData(unescaped) => {
                    push_text(&mut acc, std::str::from_utf8(unescaped.as_ref())?.to_string());
                    self.next().await?;
                }
                Event::End(_) => return Ok(acc),
                Event::Eof => return Err(ParsingError::Eof),
                _ => {
                    self.next().await?;
                }
            }
        }
    }

    /// Nothing known matched: report the end of the current element,
    /// or skip one token
    pub async fn skip_unknown(&mut self) -> Result<bool, ParsingError> {
        if !self.parent_has_child() {
            return Ok(true);
        }
        match self.peek() {
            Event::End(_) => Ok(true),
            _ => {
                self.skip().await?;
                Ok(false)
            }
        }
    }

    /// Same as `skip_unknown` but foreign elements are kept in `any`
    pub async fn capture_unknown(&mut self, any: &mut Vec<AnyElement>) -> Result<bool, ParsingError> {
        if !self.parent_has_child() {
            return Ok(true);
        }
        match self.peek() {
            Event::End(_) => Ok(true),
            Event::Start(_) | Event::Empty(_) => {
                any.push(self.capture().await?);
                Ok(false)
            }
            _ => {
                self.skip().await?;
                Ok(false)
            }
        }
    }

    // NEW API
    pub async fn tag_string(&mut self) -> Result<String, ParsingError> {
        self.ensure_parent_has_child()?;

        let mut acc = String::new();
        loop {
            match self.peek() {
                Event::CData(unescaped) => {
                    acc.push_str(std::str::from_utf8(unescaped.as_ref())?);
                    self.next().await?
                }
                Event::Text(escaped) => {
                    acc.push_str(escaped.unescape()?.as_ref());
                    self.next().await?
                }
                Event::End(_) | Event::Start(_) | Event::Empty(_) => return Ok(acc),
                _ => self.next().await?,
            };
        }
    }

    /// Text of a leaf element, an empty element gives an empty string
    pub async fn text_as(&mut self, ns: Ns, key: &str) -> Result<String, ParsingError> {
        self.open(ns.urn(), key).await?;
        let txt = match self.parent_has_child() {
            true => self.tag_string().await?,
            false => String::new(),
        };
        self.close().await?;
        Ok(txt)
    }

    pub async fn maybe_read<N: Node<N>>(
        &mut self,
        t: &mut Option<N>,
        dirty: &mut bool,
    ) -> Result<(), ParsingError> {
        if !self.parent_has_child() {
            return Ok(());
        }

        match N::qread(self).await {
            Ok(v) => {
                *t = Some(v);
                *dirty = true;
                Ok(())
            }
            Err(ParsingError::Recoverable) => Ok(()),
            Err(e) => Err(e),
        }
    }

    pub async fn maybe_push<N: Node<N>>(
        &mut self,
        t: &mut Vec<N>,
        dirty: &mut bool,
    ) -> Result<(), ParsingError> {
        if !self.parent_has_child() {
            return Ok(());
        }

        match N::qread(self).await {
            Ok(v) => {
                t.push(v);
                *dirty = true;
                Ok(())
            }
            Err(ParsingError::Recoverable) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// `xsi:nil="true"` on the current element, if it has the expected name
    async fn maybe_nil(&mut self, ns: Ns, key: &str) -> Result<bool, ParsingError> {
        if !self.is_tag(ns.urn(), key) {
            return Ok(false);
        }
        let mut attrs = self.attributes(&self.cur.clone())?;
        match take_xsi_attribute(&mut attrs, "nil").as_deref().map(str::trim) {
            Some("true") | Some("1") => {
                self.open(ns.urn(), key).await?;
                self.close().await?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    pub async fn maybe_read_as<N: TypeNode<N>>(
        &mut self,
        ns: Ns,
        key: &'static str,
        t: &mut Option<N>,
        dirty: &mut bool,
    ) -> Result<(), ParsingError> {
        if !self.parent_has_child() {
            return Ok(());
        }

        if self.maybe_nil(ns, key).await? {
            *dirty = true;
            return Ok(());
        }

        match N::qread_as(self, ns, key).await {
            Ok(v) => {
                *t = Some(v);
                *dirty = true;
                Ok(())
            }
            Err(ParsingError::Recoverable) => Ok(()),
            Err(e) => Err(e),
        }
    }

    pub async fn maybe_push_as<N: TypeNode<N>>(
        &mut self,
        ns: Ns,
        key: &'static str,
        t: &mut Vec<N>,
        dirty: &mut bool,
    ) -> Result<(), ParsingError> {
        if !self.parent_has_child() {
            return Ok(());
        }

        // a nil entry is consumed but adds nothing to the list
        if self.maybe_nil(ns, key).await? {
            *dirty = true;
            return Ok(());
        }

        match N::qread_as(self, ns, key).await {
            Ok(v) => {
                t.push(v);
                *dirty = true;
                Ok(())
            }
            Err(ParsingError::Recoverable) => Ok(()),
            Err(e) => Err(e),
        }
    }

    pub async fn find<N: Node<N>>(&mut self) -> Result<N, ParsingError> {
        self.ensure_parent_has_child()?;

        loop {
            // Try parse
            match N::qread(self).await {
                Err(ParsingError::Recoverable) => (),
                otherwise => return otherwise,
            }

            // If recovered, skip the element
            self.skip().await?;
        }
    }

    pub async fn open(&mut self, ns: &[u8], key: &str) -> Result<Event<'static>, ParsingError> {
        let evt = match self.peek() {
            Event::Empty(_) if self.is_tag(ns, key) => {
                // the cursor stays on an empty element, `close` consumes it
                self.cur.clone()
            }
            Event::Start(_) if self.is_tag(ns, key) => self.next().await?,
            _ => return Err(ParsingError::Recoverable),
        };

        self.parents.push(evt.clone());
        Ok(evt)
    }

    pub async fn maybe_open(
        &mut self,
        ns: &[u8],
        key: &str,
    ) -> Result<Option<Event<'static>>, ParsingError> {
        match self.open(ns, key).await {
            Ok(v) => Ok(Some(v)),
            Err(ParsingError::Recoverable) => Ok(None),
            Err(e) => Err(e),
        }
    }

    // find stop tag
    pub async fn close(&mut self) -> Result<Event<'static>, ParsingError> {
        // Handle the empty case
        if !self.parent_has_child() {
            self.parents.pop();
            return self.next().await;
        }

        // Handle the start/end case
        loop {
            match self.peek() {
                Event::End(_) => {
                    self.parents.pop();
                    return self.next().await;
                }
                _ => self.skip().await?,
            };
        }
    }
}

/// Turn a missing required child into an error, with a trace of which one
pub fn required<T>(v: Option<T>, name: &'static str) -> Result<T, ParsingError> {
    v.ok_or_else(|| {
        tracing::debug!(element = name, "missing required element");
        ParsingError::MissingChild
    })
}
