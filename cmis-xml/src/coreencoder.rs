use std::pin::Pin;

use base64::Engine;
use futures::Future;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Error as QError;

use super::coretypes::*;
use super::value::XmlValue;
use super::xml::{push_ext_attributes, IWrite, Ns, QWrite, QWriteAs, Writer, XOP_URN};

// ---- Allowable actions ----

impl QWriteAs for AllowableActions {
    async fn qwrite_as(
        &self,
        xml: &mut Writer<impl IWrite>,
        ns: Ns,
        name: &'static str,
    ) -> Result<(), QError> {
        let mut start = xml.create_element(ns, name);
        push_ext_attributes(&mut start, &self.other_attributes);
        if self.actions.is_empty() && self.any.is_empty() {
            return xml.q.write_event_async(Event::Empty(start)).await;
        }

        let end = start.to_end().into_owned();
        xml.q.write_event_async(Event::Start(start)).await?;
        for (action, allowed) in self.iter() {
            allowed.qwrite_as(xml, Ns::Cmis, action.value()).await?;
        }
        xml.write_any_elements(&self.any).await?;
        xml.q.write_event_async(Event::End(end)).await
    }
}

// ---- Access control ----

impl QWriteAs for AccessControlPrincipal {
    async fn qwrite_as(
        &self,
        xml: &mut Writer<impl IWrite>,
        ns: Ns,
        name: &'static str,
    ) -> Result<(), QError> {
        let start = xml.create_element(ns, name);
        let end = start.to_end().into_owned();
        xml.q.write_event_async(Event::Start(start)).await?;
        self.principal_id
            .qwrite_as(xml, Ns::Cmis, "principalId")
            .await?;
        xml.write_any_elements(&self.any).await?;
        xml.q.write_event_async(Event::End(end)).await
    }
}

impl QWriteAs for AccessControlEntry {
    async fn qwrite_as(
        &self,
        xml: &mut Writer<impl IWrite>,
        ns: Ns,
        name: &'static str,
    ) -> Result<(), QError> {
        let start = xml.create_element(ns, name);
        let end = start.to_end().into_owned();
        xml.q.write_event_async(Event::Start(start)).await?;
        self.principal.qwrite_as(xml, Ns::Cmis, "principal").await?;
        self.permissions
            .qwrite_as(xml, Ns::Cmis, "permission")
            .await?;
        self.direct.qwrite_as(xml, Ns::Cmis, "direct").await?;
        xml.write_any_elements(&self.any).await?;
        xml.q.write_event_async(Event::End(end)).await
    }
}

impl QWriteAs for AccessControlList {
    async fn qwrite_as(
        &self,
        xml: &mut Writer<impl IWrite>,
        ns: Ns,
        name: &'static str,
    ) -> Result<(), QError> {
        let start = xml.create_element(ns, name);
        if self.permissions.is_empty() && self.any.is_empty() {
            return xml.q.write_event_async(Event::Empty(start)).await;
        }
        let end = start.to_end().into_owned();
        xml.q.write_event_async(Event::Start(start)).await?;
        self.permissions
            .qwrite_as(xml, Ns::Cmis, "permission")
            .await?;
        xml.write_any_elements(&self.any).await?;
        xml.q.write_event_async(Event::End(end)).await
    }
}

impl QWriteAs for PermissionDefinition {
    async fn qwrite_as(
        &self,
        xml: &mut Writer<impl IWrite>,
        ns: Ns,
        name: &'static str,
    ) -> Result<(), QError> {
        let start = xml.create_element(ns, name);
        let end = start.to_end().into_owned();
        xml.q.write_event_async(Event::Start(start)).await?;
        xml.write_text(Ns::Cmis, "permission", &self.permission)
            .await?;
        self.description
            .qwrite_as(xml, Ns::Cmis, "description")
            .await?;
        xml.write_any_elements(&self.any).await?;
        xml.q.write_event_async(Event::End(end)).await
    }
}

impl QWriteAs for PermissionSet {
    async fn qwrite_as(
        &self,
        xml: &mut Writer<impl IWrite>,
        ns: Ns,
        name: &'static str,
    ) -> Result<(), QError> {
        let start = xml.create_element(ns, name);
        if self.permissions.is_empty() && self.any.is_empty() {
            return xml.q.write_event_async(Event::Empty(start)).await;
        }
        let end = start.to_end().into_owned();
        xml.q.write_event_async(Event::Start(start)).await?;
        self.permissions
            .qwrite_as(xml, Ns::Cmis, "permission")
            .await?;
        xml.write_any_elements(&self.any).await?;
        xml.q.write_event_async(Event::End(end)).await
    }
}

// ---- Content ----

impl QWriteAs for ContentPayload {
    async fn qwrite_as(
        &self,
        xml: &mut Writer<impl IWrite>,
        ns: Ns,
        name: &'static str,
    ) -> Result<(), QError> {
        match self {
            Self::Inline(bytes) => {
                let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
                xml.write_text(ns, name, &encoded).await
            }
            Self::Attachment(href) => {
                let start = xml.create_element(ns, name);
                let end = start.to_end().into_owned();
                xml.q.write_event_async(Event::Start(start)).await?;

                let mut include = BytesStart::new("xop:Include");
                let xop = String::from_utf8_lossy(XOP_URN);
                include.push_attribute(("xmlns:xop", xop.as_ref()));
                include.push_attribute(("href", href.as_str()));
                xml.q.write_event_async(Event::Empty(include)).await?;

                xml.q.write_event_async(Event::End(end)).await
            }
        }
    }
}

impl QWriteAs for ContentStream {
    async fn qwrite_as(
        &self,
        xml: &mut Writer<impl IWrite>,
        ns: Ns,
        name: &'static str,
    ) -> Result<(), QError> {
        let start = xml.create_element(ns, name);
        let end = start.to_end().into_owned();
        xml.q.write_event_async(Event::Start(start)).await?;
        self.length.qwrite_as(xml, Ns::Cmis, "length").await?;
        self.mime_type.qwrite_as(xml, Ns::Cmis, "mimeType").await?;
        self.filename.qwrite_as(xml, Ns::Cmis, "filename").await?;
        self.uri.qwrite_as(xml, Ns::Cmis, "uri").await?;
        self.stream.qwrite_as(xml, Ns::Cmis, "stream").await?;
        xml.write_any_elements(&self.any).await?;
        xml.q.write_event_async(Event::End(end)).await
    }
}

// ---- Objects ----

impl QWriteAs for CmisObject {
    async fn qwrite_as(
        &self,
        xml: &mut Writer<impl IWrite>,
        ns: Ns,
        name: &'static str,
    ) -> Result<(), QError> {
        let start = xml.create_element(ns, name);
        if self == &CmisObject::default() {
            return xml.q.write_event_async(Event::Empty(start)).await;
        }
        let end = start.to_end().into_owned();
        xml.q.write_event_async(Event::Start(start)).await?;
        write_object_body(self, xml).await?;
        xml.q.write_event_async(Event::End(end)).await
    }
}

/// Objects nest through relationships and children, the boxed future
/// breaks the recursion
fn write_object_body<'a, W: IWrite + 'a>(
    obj: &'a CmisObject,
    xml: &'a mut Writer<W>,
) -> Pin<Box<dyn Future<Output = Result<(), QError>> + Send + 'a>> {
    Box::pin(async move {
        obj.properties.qwrite_as(xml, Ns::Cmis, "properties").await?;
        obj.allowable_actions
            .qwrite_as(xml, Ns::Cmis, "allowableActions")
            .await?;
        obj.relationships
            .qwrite_as(xml, Ns::Cmis, "relationship")
            .await?;
        obj.children.qwrite_as(xml, Ns::Cmis, "child").await?;
        obj.acl.qwrite_as(xml, Ns::Cmis, "acl").await?;
        obj.exact_acl.qwrite_as(xml, Ns::Cmis, "exactACL").await?;
        xml.write_any_elements(&obj.any).await
    })
}

impl QWriteAs for ChangedObject {
    async fn qwrite_as(
        &self,
        xml: &mut Writer<impl IWrite>,
        ns: Ns,
        name: &'static str,
    ) -> Result<(), QError> {
        let start = xml.create_element(ns, name);
        let end = start.to_end().into_owned();
        xml.q.write_event_async(Event::Start(start)).await?;
        write_object_body(&self.object, xml).await?;
        self.change_type
            .qwrite_as(xml, Ns::Cmis, "changeType")
            .await?;
        xml.q.write_event_async(Event::End(end)).await
    }
}

// ---- Repository ----

impl QWriteAs for RepositoryEntry {
    async fn qwrite_as(
        &self,
        xml: &mut Writer<impl IWrite>,
        ns: Ns,
        name: &'static str,
    ) -> Result<(), QError> {
        let start = xml.create_element(ns, name);
        let end = start.to_end().into_owned();
        xml.q.write_event_async(Event::Start(start)).await?;
        xml.write_text(Ns::Cmis, "repositoryId", &self.repository_id)
            .await?;
        xml.write_text(Ns::Cmis, "repositoryName", &self.repository_name)
            .await?;
        self.repository_uri
            .qwrite_as(xml, Ns::Cmis, "repositoryURI")
            .await?;
        xml.write_any_elements(&self.any).await?;
        xml.q.write_event_async(Event::End(end)).await
    }
}

impl QWriteAs for RepositoryCapabilities {
    async fn qwrite_as(
        &self,
        xml: &mut Writer<impl IWrite>,
        ns: Ns,
        name: &'static str,
    ) -> Result<(), QError> {
        let start = xml.create_element(ns, name);
        let end = start.to_end().into_owned();
        xml.q.write_event_async(Event::Start(start)).await?;
        self.multifiling
            .qwrite_as(xml, Ns::Cmis, "capabilityMultifiling")
            .await?;
        self.unfiling
            .qwrite_as(xml, Ns::Cmis, "capabilityUnfiling")
            .await?;
        self.version_specific_filing
            .qwrite_as(xml, Ns::Cmis, "capabilityVersionSpecificFiling")
            .await?;
        self.pwc_updateable
            .qwrite_as(xml, Ns::Cmis, "capabilityPWCUpdateable")
            .await?;
        self.pwc_searchable
            .qwrite_as(xml, Ns::Cmis, "capabilityPWCSearchable")
            .await?;
        self.all_versions_searchable
            .qwrite_as(xml, Ns::Cmis, "capabilityAllVersionsSearchable")
            .await?;
        self.query
            .qwrite_as(xml, Ns::Cmis, "capabilityQuery")
            .await?;
        self.join.qwrite_as(xml, Ns::Cmis, "capabilityJoin").await?;
        self.full_text
            .qwrite_as(xml, Ns::Cmis, "capabilityFullText")
            .await?;
        self.changes
            .qwrite_as(xml, Ns::Cmis, "capabilityChanges")
            .await?;
        self.content_stream_updatability
            .qwrite_as(xml, Ns::Cmis, "capabilityContentStreamUpdatability")
            .await?;
        self.renditions
            .qwrite_as(xml, Ns::Cmis, "capabilityRenditions")
            .await?;
        self.acl.qwrite_as(xml, Ns::Cmis, "capabilityACL").await?;
        xml.write_any_elements(&self.any).await?;
        xml.q.write_event_async(Event::End(end)).await
    }
}

impl QWriteAs for RepositoryInfo {
    async fn qwrite_as(
        &self,
        xml: &mut Writer<impl IWrite>,
        ns: Ns,
        name: &'static str,
    ) -> Result<(), QError> {
        let start = xml.create_element(ns, name);
        let end = start.to_end().into_owned();
        xml.q.write_event_async(Event::Start(start)).await?;
        xml.write_text(Ns::Cmis, "repositoryId", &self.repository_id)
            .await?;
        xml.write_text(Ns::Cmis, "repositoryName", &self.repository_name)
            .await?;
        self.repository_relationship
            .qwrite_as(xml, Ns::Cmis, "repositoryRelationship")
            .await?;
        self.repository_description
            .qwrite_as(xml, Ns::Cmis, "repositoryDescription")
            .await?;
        self.vendor_name
            .qwrite_as(xml, Ns::Cmis, "vendorName")
            .await?;
        self.product_name
            .qwrite_as(xml, Ns::Cmis, "productName")
            .await?;
        self.product_version
            .qwrite_as(xml, Ns::Cmis, "productVersion")
            .await?;
        xml.write_text(Ns::Cmis, "rootFolderId", &self.root_folder_id)
            .await?;
        self.latest_change_token
            .qwrite_as(xml, Ns::Cmis, "latestChangeToken")
            .await?;
        self.capabilities
            .qwrite_as(xml, Ns::Cmis, "capabilities")
            .await?;
        self.acl_propagation
            .qwrite_as(xml, Ns::Cmis, "aclPropagation")
            .await?;
        self.permission_set
            .qwrite_as(xml, Ns::Cmis, "permissionSet")
            .await?;
        xml.write_text(
            Ns::Cmis,
            "cmisVersionSupported",
            &self.cmis_version_supported,
        )
        .await?;
        self.repository_specific_information
            .qwrite_as(xml, Ns::Cmis, "repositorySpecificInformation")
            .await?;
        xml.write_any_elements(&self.any).await?;
        xml.q.write_event_async(Event::End(end)).await
    }
}

// ---- Types ----

async fn write_type_body(
    def: &TypeDefinition,
    xml: &mut Writer<impl IWrite>,
) -> Result<(), QError> {
    let base = def.base();
    xml.write_text(Ns::Cmis, "typeId", &base.type_id).await?;
    base.query_name
        .qwrite_as(xml, Ns::Cmis, "queryName")
        .await?;
    base.display_name
        .qwrite_as(xml, Ns::Cmis, "displayName")
        .await?;
    base.base_type_id
        .qwrite_as(xml, Ns::Cmis, "baseTypeId")
        .await?;
    base.parent_id.qwrite_as(xml, Ns::Cmis, "parentId").await?;
    base.description
        .qwrite_as(xml, Ns::Cmis, "description")
        .await?;
    base.creatable.qwrite_as(xml, Ns::Cmis, "creatable").await?;
    base.fileable.qwrite_as(xml, Ns::Cmis, "fileable").await?;
    base.queryable.qwrite_as(xml, Ns::Cmis, "queryable").await?;
    base.controllable
        .qwrite_as(xml, Ns::Cmis, "controllable")
        .await?;
    base.included_in_supertype_query
        .qwrite_as(xml, Ns::Cmis, "includedInSupertypeQuery")
        .await?;
    for prop in base.property_definitions.iter() {
        prop.qwrite(xml).await?;
    }
    xml.write_any_elements(&base.any).await?;

    match def {
        TypeDefinition::Document(doc) => {
            doc.versionable
                .qwrite_as(xml, Ns::Cmis, "versionable")
                .await?;
            doc.content_stream_allowed
                .qwrite_as(xml, Ns::Cmis, "contentStreamAllowed")
                .await
        }
        TypeDefinition::Relationship(rel) => {
            rel.allowed_source_types
                .qwrite_as(xml, Ns::Cmis, "allowedSourceTypes")
                .await?;
            rel.allowed_target_types
                .qwrite_as(xml, Ns::Cmis, "allowedTargetTypes")
                .await
        }
        TypeDefinition::Folder(_) | TypeDefinition::Policy(_) => Ok(()),
    }
}

/// `cmis:documentType`, `cmis:folderType`, ...
impl QWrite for TypeDefinition {
    async fn qwrite(&self, xml: &mut Writer<impl IWrite>) -> Result<(), QError> {
        let (tag, _) = TypeDefinition::tag_of(self.kind());
        let start = xml.create_cmis_element(tag);
        let end = start.to_end().into_owned();
        xml.q.write_event_async(Event::Start(start)).await?;
        write_type_body(self, xml).await?;
        xml.q.write_event_async(Event::End(end)).await
    }
}

/// The polymorphic slot, the concrete type goes in `xsi:type`
impl QWriteAs for TypeDefinition {
    async fn qwrite_as(
        &self,
        xml: &mut Writer<impl IWrite>,
        ns: Ns,
        name: &'static str,
    ) -> Result<(), QError> {
        let (_, xsi) = TypeDefinition::tag_of(self.kind());
        let mut start = xml.create_element(ns, name);
        start.push_attribute(("xsi:type", format!("cmis:{}", xsi).as_str()));
        let end = start.to_end().into_owned();
        xml.q.write_event_async(Event::Start(start)).await?;
        write_type_body(self, xml).await?;
        xml.q.write_event_async(Event::End(end)).await
    }
}

// ---- Discovery and faults ----

impl QWrite for QueryRequest {
    async fn qwrite(&self, xml: &mut Writer<impl IWrite>) -> Result<(), QError> {
        let start = xml.create_cmis_element(QueryRequest::TAG);
        let end = start.to_end().into_owned();
        xml.q.write_event_async(Event::Start(start)).await?;
        xml.write_text(Ns::Cmis, "repositoryId", &self.repository_id)
            .await?;
        xml.write_text(Ns::Cmis, "statement", &self.statement)
            .await?;
        self.search_all_versions
            .qwrite_as(xml, Ns::Cmis, "searchAllVersions")
            .await?;
        self.include_allowable_actions
            .qwrite_as(xml, Ns::Cmis, "includeAllowableActions")
            .await?;
        self.include_relationships
            .qwrite_as(xml, Ns::Cmis, "includeRelationships")
            .await?;
        self.max_items.qwrite_as(xml, Ns::Cmis, "maxItems").await?;
        self.skip_count
            .qwrite_as(xml, Ns::Cmis, "skipCount")
            .await?;
        xml.write_any_elements(&self.any).await?;
        xml.q.write_event_async(Event::End(end)).await
    }
}

impl QWrite for Fault {
    async fn qwrite(&self, xml: &mut Writer<impl IWrite>) -> Result<(), QError> {
        let start = xml.create_msg_element(Fault::TAG);
        let end = start.to_end().into_owned();
        xml.q.write_event_async(Event::Start(start)).await?;
        self.kind.qwrite_as(xml, Ns::Msg, "type").await?;
        xml.write_text(Ns::Msg, "code", &self.code.to_xml()).await?;
        xml.write_text(Ns::Msg, "message", &self.message).await?;
        xml.write_any_elements(&self.any).await?;
        xml.q.write_event_async(Event::End(end)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::*;
    use crate::proptypes::*;
    use crate::xml::{default_namespaces, AnyElement, AnyNode, QRead, QReadAs, Reader};
    use quick_xml::reader::NsReader;
    use tokio::io::AsyncWriteExt;

    async fn serialize(elem: &impl QWrite) -> String {
        let mut buffer = Vec::new();
        let mut tokio_buffer = tokio::io::BufWriter::new(&mut buffer);
        let q = quick_xml::writer::Writer::new_with_indent(&mut tokio_buffer, b' ', 4);
        let ns_to_apply = default_namespaces();
        let mut writer = Writer { q, ns_to_apply };

        elem.qwrite(&mut writer).await.expect("xml serialization");
        tokio_buffer.flush().await.expect("tokio buffer flush");
        let got = std::str::from_utf8(buffer.as_slice()).unwrap();

        return got.into();
    }

    async fn serialize_as(elem: &impl QWriteAs, ns: Ns, name: &'static str) -> String {
        let mut buffer = Vec::new();
        let mut tokio_buffer = tokio::io::BufWriter::new(&mut buffer);
        let q = quick_xml::writer::Writer::new_with_indent(&mut tokio_buffer, b' ', 4);
        let ns_to_apply = default_namespaces();
        let mut writer = Writer { q, ns_to_apply };

        elem.qwrite_as(&mut writer, ns, name)
            .await
            .expect("xml serialization");
        tokio_buffer.flush().await.expect("tokio buffer flush");
        let got = std::str::from_utf8(buffer.as_slice()).unwrap();

        return got.into();
    }

    async fn reader(src: &str) -> Reader<&[u8]> {
        Reader::new(NsReader::from_reader(src.as_bytes()))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn allowable_actions_in_declaration_order() {
        let mut orig = AllowableActions::default();
        orig.set(AllowableAction::CanCheckin, false)
            .set(AllowableAction::CanGetProperties, true)
            .set(AllowableAction::CanDelete, true);

        let got = serialize_as(&orig, Ns::Cmis, "allowableActions").await;
        let expected = r#"<cmis:allowableActions xmlns:cmis="http://docs.oasis-open.org/ns/cmis/core/200901" xmlns:cmism="http://docs.oasis-open.org/ns/cmis/messaging/200901" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
    <cmis:canDelete>true</cmis:canDelete>
    <cmis:canGetProperties>true</cmis:canGetProperties>
    <cmis:canCheckin>false</cmis:canCheckin>
</cmis:allowableActions>"#;

        assert_eq!(&got, expected, "\n---GOT---\n{got}\n---EXP---\n{expected}\n");
        let back = AllowableActions::qread_as(&mut reader(&got).await, Ns::Cmis, "allowableActions")
            .await
            .unwrap();
        assert_eq!(back, orig);
    }

    #[tokio::test]
    async fn content_stream_inline_and_attachment() {
        let mut orig = ContentStream::inline("text/plain", b"hello world".to_vec());
        orig.filename = Some("hello.txt".into());

        let got = serialize_as(&orig, Ns::Msg, "contentStream").await;
        let expected = r#"<cmism:contentStream xmlns:cmis="http://docs.oasis-open.org/ns/cmis/core/200901" xmlns:cmism="http://docs.oasis-open.org/ns/cmis/messaging/200901" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
    <cmis:length>11</cmis:length>
    <cmis:mimeType>text/plain</cmis:mimeType>
    <cmis:filename>hello.txt</cmis:filename>
    <cmis:stream>aGVsbG8gd29ybGQ=</cmis:stream>
</cmism:contentStream>"#;
        assert_eq!(&got, expected, "\n---GOT---\n{got}\n---EXP---\n{expected}\n");
        let back = ContentStream::qread_as(&mut reader(&got).await, Ns::Msg, "contentStream")
            .await
            .unwrap();
        assert_eq!(back, orig);

        orig.stream = ContentPayload::Attachment("cid:part1@example.org".into());
        let got = serialize_as(&orig, Ns::Msg, "contentStream").await;
        assert!(got.contains(
            r#"<xop:Include xmlns:xop="http://www.w3.org/2004/08/xop/include" href="cid:part1@example.org"/>"#
        ));
        let back = ContentStream::qread_as(&mut reader(&got).await, Ns::Msg, "contentStream")
            .await
            .unwrap();
        assert_eq!(back, orig);
    }

    #[tokio::test]
    async fn object_tree_with_acl() {
        let mut child = CmisObject::default();
        child.properties = Some(Properties {
            properties: vec![Property::Id(PropertyId::with_values(
                "cmis:ObjectId",
                vec!["doc-1".into()],
            ))],
            ..Properties::default()
        });
        let mut grandchild = child.clone();
        grandchild.properties = Some(Properties {
            properties: vec![Property::Id(PropertyId::with_values(
                "cmis:ObjectId",
                vec!["doc-2".into()],
            ))],
            ..Properties::default()
        });
        child.children = vec![grandchild];

        let orig = CmisObject {
            acl: Some(AccessControlList {
                permissions: vec![AccessControlEntry {
                    principal: AccessControlPrincipal {
                        principal_id: Some("admin".into()),
                        any: vec![],
                    },
                    permissions: vec![BasicPermissions::All.value().into()],
                    direct: true,
                    any: vec![],
                }],
                any: vec![],
            }),
            exact_acl: Some(true),
            children: vec![child, CmisObject::default()],
            any: vec![AnyElement::new(Some("urn:x"), Some("x"), "marker")],
            ..CmisObject::default()
        };

        let got = serialize_as(&orig, Ns::Cmis, "object").await;
        assert!(got.contains("<cmis:principalId>admin</cmis:principalId>"));
        assert!(got.contains("<cmis:permission>cmis:all</cmis:permission>"));
        assert!(got.contains("<cmis:child/>"));
        assert!(got.contains(r#"<x:marker xmlns:x="urn:x"/>"#));

        let back = CmisObject::qread_as(&mut reader(&got).await, Ns::Cmis, "object")
            .await
            .unwrap();
        assert_eq!(back, orig);
        assert_eq!(back.walk().len(), 4);
        assert_eq!(back.children[0].children[0].object_id(), Some("doc-2"));
    }

    #[tokio::test]
    async fn foreign_subtree_keeps_its_namespaces() {
        let src = r#"<cmis:object xmlns:cmis="http://docs.oasis-open.org/ns/cmis/core/200901"><a xmlns="urn:d"><p:b xmlns:p="urn:p" xmlns=""><c/></p:b><d p:k="v" xmlns:p="urn:p2"/></a></cmis:object>"#;
        let orig = CmisObject::qread_as(&mut reader(src).await, Ns::Cmis, "object")
            .await
            .unwrap();
        let AnyNode::Element(b) = &orig.any[0].children[0] else {
            panic!("expected an element")
        };
        let AnyNode::Element(c) = &b.children[0] else {
            panic!("expected an element")
        };
        assert_eq!(c.namespace, None);

        let got = serialize_as(&orig, Ns::Cmis, "object").await;
        let back = CmisObject::qread_as(&mut reader(&got).await, Ns::Cmis, "object")
            .await
            .unwrap();
        assert_eq!(back, orig);
    }

    #[tokio::test]
    async fn type_definition_global_and_slot() {
        let orig = TypeDefinition::Relationship(RelationshipTypeDefinition {
            base: TypeDefinitionBase {
                queryable: Some(false),
                property_definitions: vec![PropertyDefinition::Id(PropertyIdDefinition::new(
                    "cmis:SourceId",
                    Cardinality::Single,
                    Updatability::OnCreate,
                ))],
                ..TypeDefinitionBase::new("R:cm:references", ObjectType::Relationship)
            },
            allowed_source_types: vec!["cmis:document".into()],
            allowed_target_types: vec!["cmis:document".into(), "cmis:folder".into()],
        });

        let got = serialize(&orig).await;
        assert!(got.starts_with("<cmis:relationshipType "));
        assert!(got.contains("<cmis:baseTypeId>relationship</cmis:baseTypeId>"));
        let back = TypeDefinition::qread(&mut reader(&got).await).await.unwrap();
        assert_eq!(back, orig);

        let got = serialize_as(&orig, Ns::Cmis, "type").await;
        assert!(got.contains(r#"xsi:type="cmis:cmisTypeRelationshipDefinitionType""#));
        let back = TypeDefinition::qread_as(&mut reader(&got).await, Ns::Cmis, "type")
            .await
            .unwrap();
        assert_eq!(back, orig);
    }

    #[tokio::test]
    async fn fault_and_query() {
        let fault = Fault {
            kind: ServiceException::ObjectNotFound,
            code: 404,
            message: "no such node".into(),
            any: vec![],
        };
        let got = serialize(&fault).await;
        let expected = r#"<cmism:cmisFault xmlns:cmis="http://docs.oasis-open.org/ns/cmis/core/200901" xmlns:cmism="http://docs.oasis-open.org/ns/cmis/messaging/200901" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
    <cmism:type>objectNotFound</cmism:type>
    <cmism:code>404</cmism:code>
    <cmism:message>no such node</cmism:message>
</cmism:cmisFault>"#;
        assert_eq!(&got, expected, "\n---GOT---\n{got}\n---EXP---\n{expected}\n");
        assert_eq!(Fault::qread(&mut reader(&got).await).await.unwrap(), fault);

        let mut query = QueryRequest::new("main", "SELECT * FROM cmis:document WHERE cmis:Name < 'b'");
        query.max_items = Some(10);
        let got = serialize(&query).await;
        assert!(got.contains("cmis:Name &lt; &apos;b&apos;") || got.contains("cmis:Name &lt; 'b'"));
        assert_eq!(QueryRequest::qread(&mut reader(&got).await).await.unwrap(), query);
    }
}
