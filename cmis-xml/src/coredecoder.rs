use std::pin::Pin;

use base64::Engine;
use futures::Future;

use super::coretypes::*;
use super::enums::*;
use super::error::ParsingError;
use super::proptypes::{Properties, PropertyDefinition};
use super::xml::{
    required, take_attribute, take_xsi_attribute, AnyElement, AnyXml, IRead, Ns, QRead, QReadAs,
    Reader, CMIS_URN, MSG_URN, XOP_URN,
};

// ---- Allowable actions ----

impl QReadAs<AllowableActions> for AllowableActions {
    async fn qread_as(
        xml: &mut Reader<impl IRead>,
        ns: Ns,
        name: &'static str,
    ) -> Result<Self, ParsingError> {
        let evt = xml.open(ns.urn(), name).await?;
        let other_attributes = xml.attributes(&evt)?;

        let mut acc = AllowableActions {
            other_attributes,
            ..AllowableActions::default()
        };
        loop {
            let mut dirty = false;
            for action in AllowableAction::ALL.iter() {
                let mut allowed: Option<bool> = None;
                xml.maybe_read_as(Ns::Cmis, action.value(), &mut allowed, &mut dirty)
                    .await?;
                if let Some(allowed) = allowed {
                    acc.set(*action, allowed);
                }
            }
            if !dirty && xml.capture_unknown(&mut acc.any).await? {
                break;
            }
        }
        xml.close().await?;
        Ok(acc)
    }
}

// ---- Access control ----

impl QReadAs<AccessControlPrincipal> for AccessControlPrincipal {
    async fn qread_as(
        xml: &mut Reader<impl IRead>,
        ns: Ns,
        name: &'static str,
    ) -> Result<Self, ParsingError> {
        xml.open(ns.urn(), name).await?;
        let mut acc = AccessControlPrincipal::default();
        loop {
            let mut dirty = false;
            xml.maybe_read_as(Ns::Cmis, "principalId", &mut acc.principal_id, &mut dirty)
                .await?;
            if !dirty && xml.capture_unknown(&mut acc.any).await? {
                break;
            }
        }
        xml.close().await?;
        Ok(acc)
    }
}

impl QReadAs<AccessControlEntry> for AccessControlEntry {
    async fn qread_as(
        xml: &mut Reader<impl IRead>,
        ns: Ns,
        name: &'static str,
    ) -> Result<Self, ParsingError> {
        xml.open(ns.urn(), name).await?;
        let (mut principal, mut permissions, mut direct, mut any) =
            (None, Vec::new(), None, Vec::new());
        loop {
            let mut dirty = false;
            xml.maybe_read_as(Ns::Cmis, "principal", &mut principal, &mut dirty)
                .await?;
            xml.maybe_push_as(Ns::Cmis, "permission", &mut permissions, &mut dirty)
                .await?;
            xml.maybe_read_as(Ns::Cmis, "direct", &mut direct, &mut dirty)
                .await?;
            if !dirty && xml.capture_unknown(&mut any).await? {
                break;
            }
        }
        xml.close().await?;

        Ok(AccessControlEntry {
            principal: required(principal, "principal")?,
            permissions,
            direct: required(direct, "direct")?,
            any,
        })
    }
}

impl QReadAs<AccessControlList> for AccessControlList {
    async fn qread_as(
        xml: &mut Reader<impl IRead>,
        ns: Ns,
        name: &'static str,
    ) -> Result<Self, ParsingError> {
        xml.open(ns.urn(), name).await?;
        let mut acc = AccessControlList::default();
        loop {
            let mut dirty = false;
            xml.maybe_push_as(Ns::Cmis, "permission", &mut acc.permissions, &mut dirty)
                .await?;
            if !dirty && xml.capture_unknown(&mut acc.any).await? {
                break;
            }
        }
        xml.close().await?;
        Ok(acc)
    }
}

impl QReadAs<PermissionDefinition> for PermissionDefinition {
    async fn qread_as(
        xml: &mut Reader<impl IRead>,
        ns: Ns,
        name: &'static str,
    ) -> Result<Self, ParsingError> {
        xml.open(ns.urn(), name).await?;
        let (mut permission, mut description, mut any) = (None, None, Vec::new());
        loop {
            let mut dirty = false;
            xml.maybe_read_as(Ns::Cmis, "permission", &mut permission, &mut dirty)
                .await?;
            xml.maybe_read_as(Ns::Cmis, "description", &mut description, &mut dirty)
                .await?;
            if !dirty && xml.capture_unknown(&mut any).await? {
                break;
            }
        }
        xml.close().await?;

        Ok(PermissionDefinition {
            permission: required(permission, "permission")?,
            description,
            any,
        })
    }
}

impl QReadAs<PermissionSet> for PermissionSet {
    async fn qread_as(
        xml: &mut Reader<impl IRead>,
        ns: Ns,
        name: &'static str,
    ) -> Result<Self, ParsingError> {
        xml.open(ns.urn(), name).await?;
        let mut acc = PermissionSet::default();
        loop {
            let mut dirty = false;
            xml.maybe_push_as(Ns::Cmis, "permission", &mut acc.permissions, &mut dirty)
                .await?;
            if !dirty && xml.capture_unknown(&mut acc.any).await? {
                break;
            }
        }
        xml.close().await?;
        Ok(acc)
    }
}

// ---- Content ----

impl QReadAs<ContentPayload> for ContentPayload {
    async fn qread_as(
        xml: &mut Reader<impl IRead>,
        ns: Ns,
        name: &'static str,
    ) -> Result<Self, ParsingError> {
        xml.open(ns.urn(), name).await?;
        if !xml.parent_has_child() {
            xml.close().await?;
            return Ok(ContentPayload::Inline(vec![]));
        }

        let txt = xml.tag_string().await?;
        let payload = match xml.maybe_open(XOP_URN, "Include").await? {
            Some(evt) => {
                let mut attrs = xml.attributes(&evt)?;
                let href = take_attribute(&mut attrs, "href").ok_or_else(|| {
                    tracing::debug!("xop:Include without href");
                    ParsingError::MissingAttribute
                })?;
                xml.close().await?;
                ContentPayload::Attachment(href)
            }
            None => {
                let compact: String = txt.chars().filter(|c| !c.is_whitespace()).collect();
                let bytes = base64::engine::general_purpose::STANDARD.decode(compact)?;
                ContentPayload::Inline(bytes)
            }
        };
        xml.close().await?;
        Ok(payload)
    }
}

impl QReadAs<ContentStream> for ContentStream {
    async fn qread_as(
        xml: &mut Reader<impl IRead>,
        ns: Ns,
        name: &'static str,
    ) -> Result<Self, ParsingError> {
        xml.open(ns.urn(), name).await?;
        let (mut length, mut mime_type, mut filename, mut uri, mut stream, mut any) =
            (None, None, None, None, None, Vec::new());
        loop {
            let mut dirty = false;
            xml.maybe_read_as(Ns::Cmis, "length", &mut length, &mut dirty)
                .await?;
            xml.maybe_read_as(Ns::Cmis, "mimeType", &mut mime_type, &mut dirty)
                .await?;
            xml.maybe_read_as(Ns::Cmis, "filename", &mut filename, &mut dirty)
                .await?;
            xml.maybe_read_as(Ns::Cmis, "uri", &mut uri, &mut dirty)
                .await?;
            xml.maybe_read_as(Ns::Cmis, "stream", &mut stream, &mut dirty)
                .await?;
            if !dirty && xml.capture_unknown(&mut any).await? {
                break;
            }
        }
        xml.close().await?;

        Ok(ContentStream {
            length: required(length, "length")?,
            mime_type,
            filename,
            uri,
            stream: required(stream, "stream")?,
            any,
        })
    }
}

// ---- Objects ----

/// Children of `cmisObjectType`, shared with the changed object extension
#[derive(Default)]
struct ObjectFields {
    properties: Option<Properties>,
    allowable_actions: Option<AllowableActions>,
    relationships: Vec<CmisObject>,
    children: Vec<CmisObject>,
    acl: Option<AccessControlList>,
    exact_acl: Option<bool>,
}
impl ObjectFields {
    async fn maybe_read(
        &mut self,
        xml: &mut Reader<impl IRead>,
        dirty: &mut bool,
    ) -> Result<(), ParsingError> {
        xml.maybe_read_as(Ns::Cmis, "properties", &mut self.properties, dirty)
            .await?;
        xml.maybe_read_as(Ns::Cmis, "allowableActions", &mut self.allowable_actions, dirty)
            .await?;
        xml.maybe_push_as(Ns::Cmis, "relationship", &mut self.relationships, dirty)
            .await?;
        xml.maybe_push_as(Ns::Cmis, "child", &mut self.children, dirty)
            .await?;
        xml.maybe_read_as(Ns::Cmis, "acl", &mut self.acl, dirty)
            .await?;
        xml.maybe_read_as(Ns::Cmis, "exactACL", &mut self.exact_acl, dirty)
            .await
    }

    fn into_object(self, any: Vec<AnyElement>) -> CmisObject {
        CmisObject {
            properties: self.properties,
            allowable_actions: self.allowable_actions,
            relationships: self.relationships,
            children: self.children,
            acl: self.acl,
            exact_acl: self.exact_acl,
            any,
        }
    }
}

impl QReadAs<CmisObject> for CmisObject {
    async fn qread_as(
        xml: &mut Reader<impl IRead>,
        ns: Ns,
        name: &'static str,
    ) -> Result<Self, ParsingError> {
        read_object(xml, ns, name).await
    }
}

/// Objects nest through relationships and children, the boxed future
/// breaks the recursion
fn read_object<'a, R: IRead + 'a>(
    xml: &'a mut Reader<R>,
    ns: Ns,
    name: &'static str,
) -> Pin<Box<dyn Future<Output = Result<CmisObject, ParsingError>> + 'a>> {
    Box::pin(async move {
        xml.open(ns.urn(), name).await?;
        let (mut fields, mut any) = (ObjectFields::default(), Vec::new());
        loop {
            let mut dirty = false;
            fields.maybe_read(xml, &mut dirty).await?;
            if !dirty && xml.capture_unknown(&mut any).await? {
                break;
            }
        }
        xml.close().await?;
        Ok(fields.into_object(any))
    })
}

impl QReadAs<ChangedObject> for ChangedObject {
    async fn qread_as(
        xml: &mut Reader<impl IRead>,
        ns: Ns,
        name: &'static str,
    ) -> Result<Self, ParsingError> {
        xml.open(ns.urn(), name).await?;
        let (mut fields, mut change_type, mut any) =
            (ObjectFields::default(), None, Vec::new());
        loop {
            let mut dirty = false;
            fields.maybe_read(xml, &mut dirty).await?;
            xml.maybe_read_as(Ns::Cmis, "changeType", &mut change_type, &mut dirty)
                .await?;
            if !dirty && xml.capture_unknown(&mut any).await? {
                break;
            }
        }
        xml.close().await?;

        Ok(ChangedObject {
            change_type: required(change_type, "changeType")?,
            object: fields.into_object(any),
        })
    }
}

// ---- Repository ----

impl QReadAs<RepositoryEntry> for RepositoryEntry {
    async fn qread_as(
        xml: &mut Reader<impl IRead>,
        ns: Ns,
        name: &'static str,
    ) -> Result<Self, ParsingError> {
        xml.open(ns.urn(), name).await?;
        let (mut repository_id, mut repository_name, mut repository_uri, mut any) =
            (None, None, None, Vec::new());
        loop {
            let mut dirty = false;
            xml.maybe_read_as(Ns::Cmis, "repositoryId", &mut repository_id, &mut dirty)
                .await?;
            xml.maybe_read_as(Ns::Cmis, "repositoryName", &mut repository_name, &mut dirty)
                .await?;
            xml.maybe_read_as(Ns::Cmis, "repositoryURI", &mut repository_uri, &mut dirty)
                .await?;
            if !dirty && xml.capture_unknown(&mut any).await? {
                break;
            }
        }
        xml.close().await?;

        Ok(RepositoryEntry {
            repository_id: required(repository_id, "repositoryId")?,
            repository_name: required(repository_name, "repositoryName")?,
            repository_uri,
            any,
        })
    }
}

impl QReadAs<RepositoryCapabilities> for RepositoryCapabilities {
    async fn qread_as(
        xml: &mut Reader<impl IRead>,
        ns: Ns,
        name: &'static str,
    ) -> Result<Self, ParsingError> {
        xml.open(ns.urn(), name).await?;
        let (mut multifiling, mut unfiling, mut version_specific_filing) = (None, None, None);
        let (mut pwc_updateable, mut pwc_searchable, mut all_versions_searchable) =
            (None, None, None);
        let (mut query, mut join, mut full_text) = (None, None, None);
        let (mut changes, mut content_stream_updatability, mut renditions, mut acl) =
            (None, None, None, None);
        let mut any = Vec::new();
        loop {
            let mut dirty = false;
            xml.maybe_read_as(Ns::Cmis, "capabilityMultifiling", &mut multifiling, &mut dirty)
                .await?;
            xml.maybe_read_as(Ns::Cmis, "capabilityUnfiling", &mut unfiling, &mut dirty)
                .await?;
            xml.maybe_read_as(
                Ns::Cmis,
                "capabilityVersionSpecificFiling",
                &mut version_specific_filing,
                &mut dirty,
            )
            .await?;
            xml.maybe_read_as(Ns::Cmis, "capabilityPWCUpdateable", &mut pwc_updateable, &mut dirty)
                .await?;
            xml.maybe_read_as(Ns::Cmis, "capabilityPWCSearchable", &mut pwc_searchable, &mut dirty)
                .await?;
            xml.maybe_read_as(
                Ns::Cmis,
                "capabilityAllVersionsSearchable",
                &mut all_versions_searchable,
                &mut dirty,
            )
            .await?;
            xml.maybe_read_as(Ns::Cmis, "capabilityQuery", &mut query, &mut dirty)
                .await?;
            xml.maybe_read_as(Ns::Cmis, "capabilityJoin", &mut join, &mut dirty)
                .await?;
            xml.maybe_read_as(Ns::Cmis, "capabilityFullText", &mut full_text, &mut dirty)
                .await?;
            xml.maybe_read_as(Ns::Cmis, "capabilityChanges", &mut changes, &mut dirty)
                .await?;
            xml.maybe_read_as(
                Ns::Cmis,
                "capabilityContentStreamUpdatability",
                &mut content_stream_updatability,
                &mut dirty,
            )
            .await?;
            xml.maybe_read_as(Ns::Cmis, "capabilityRenditions", &mut renditions, &mut dirty)
                .await?;
            xml.maybe_read_as(Ns::Cmis, "capabilityACL", &mut acl, &mut dirty)
                .await?;
            if !dirty && xml.capture_unknown(&mut any).await? {
                break;
            }
        }
        xml.close().await?;

        Ok(RepositoryCapabilities {
            multifiling: required(multifiling, "capabilityMultifiling")?,
            unfiling: required(unfiling, "capabilityUnfiling")?,
            version_specific_filing: required(
                version_specific_filing,
                "capabilityVersionSpecificFiling",
            )?,
            pwc_updateable: required(pwc_updateable, "capabilityPWCUpdateable")?,
            pwc_searchable: required(pwc_searchable, "capabilityPWCSearchable")?,
            all_versions_searchable: required(
                all_versions_searchable,
                "capabilityAllVersionsSearchable",
            )?,
            query: required(query, "capabilityQuery")?,
            join: required(join, "capabilityJoin")?,
            full_text: required(full_text, "capabilityFullText")?,
            changes,
            content_stream_updatability,
            renditions,
            acl,
            any,
        })
    }
}

impl QReadAs<RepositoryInfo> for RepositoryInfo {
    async fn qread_as(
        xml: &mut Reader<impl IRead>,
        ns: Ns,
        name: &'static str,
    ) -> Result<Self, ParsingError> {
        xml.open(ns.urn(), name).await?;
        let (mut repository_id, mut repository_name, mut repository_relationship) =
            (None, None, None);
        let (mut repository_description, mut vendor_name, mut product_name, mut product_version) =
            (None, None, None, None);
        let (mut root_folder_id, mut latest_change_token, mut capabilities) = (None, None, None);
        let (mut acl_propagation, mut permission_set, mut cmis_version_supported) =
            (None, None, None);
        let mut repository_specific_information: Option<AnyXml> = None;
        let mut any = Vec::new();
        loop {
            let mut dirty = false;
            xml.maybe_read_as(Ns::Cmis, "repositoryId", &mut repository_id, &mut dirty)
                .await?;
            xml.maybe_read_as(Ns::Cmis, "repositoryName", &mut repository_name, &mut dirty)
                .await?;
            xml.maybe_read_as(
                Ns::Cmis,
                "repositoryRelationship",
                &mut repository_relationship,
                &mut dirty,
            )
            .await?;
            xml.maybe_read_as(
                Ns::Cmis,
                "repositoryDescription",
                &mut repository_description,
                &mut dirty,
            )
            .await?;
            xml.maybe_read_as(Ns::Cmis, "vendorName", &mut vendor_name, &mut dirty)
                .await?;
            xml.maybe_read_as(Ns::Cmis, "productName", &mut product_name, &mut dirty)
                .await?;
            xml.maybe_read_as(Ns::Cmis, "productVersion", &mut product_version, &mut dirty)
                .await?;
            xml.maybe_read_as(Ns::Cmis, "rootFolderId", &mut root_folder_id, &mut dirty)
                .await?;
            xml.maybe_read_as(
                Ns::Cmis,
                "latestChangeToken",
                &mut latest_change_token,
                &mut dirty,
            )
            .await?;
            xml.maybe_read_as(Ns::Cmis, "capabilities", &mut capabilities, &mut dirty)
                .await?;
            xml.maybe_read_as(Ns::Cmis, "aclPropagation", &mut acl_propagation, &mut dirty)
                .await?;
            xml.maybe_read_as(Ns::Cmis, "permissionSet", &mut permission_set, &mut dirty)
                .await?;
            xml.maybe_read_as(
                Ns::Cmis,
                "cmisVersionSupported",
                &mut cmis_version_supported,
                &mut dirty,
            )
            .await?;
            xml.maybe_read_as(
                Ns::Cmis,
                "repositorySpecificInformation",
                &mut repository_specific_information,
                &mut dirty,
            )
            .await?;
            if !dirty && xml.capture_unknown(&mut any).await? {
                break;
            }
        }
        xml.close().await?;

        Ok(RepositoryInfo {
            repository_id: required(repository_id, "repositoryId")?,
            repository_name: required(repository_name, "repositoryName")?,
            repository_relationship,
            repository_description,
            vendor_name,
            product_name,
            product_version,
            root_folder_id: required(root_folder_id, "rootFolderId")?,
            latest_change_token,
            capabilities: required(capabilities, "capabilities")?,
            acl_propagation,
            permission_set,
            cmis_version_supported: required(cmis_version_supported, "cmisVersionSupported")?,
            repository_specific_information,
            any,
        })
    }
}

// ---- Types ----

/// Every child a type definition can have, whatever its kind
#[derive(Default)]
struct TypeFields {
    type_id: Option<String>,
    query_name: Option<String>,
    display_name: Option<String>,
    base_type_id: Option<ObjectType>,
    parent_id: Option<String>,
    description: Option<String>,
    creatable: Option<bool>,
    fileable: Option<bool>,
    queryable: Option<bool>,
    controllable: Option<bool>,
    included_in_supertype_query: Option<bool>,
    property_definitions: Vec<PropertyDefinition>,
    versionable: Option<bool>,
    content_stream_allowed: Option<ContentStreamAllowed>,
    allowed_source_types: Vec<String>,
    allowed_target_types: Vec<String>,
    any: Vec<AnyElement>,
}
impl TypeFields {
    /// Read up to the end of the already opened element
    async fn read_body(xml: &mut Reader<impl IRead>) -> Result<Self, ParsingError> {
        let mut acc = TypeFields::default();
        loop {
            let mut dirty = false;
            xml.maybe_read_as(Ns::Cmis, "typeId", &mut acc.type_id, &mut dirty)
                .await?;
            xml.maybe_read_as(Ns::Cmis, "queryName", &mut acc.query_name, &mut dirty)
                .await?;
            xml.maybe_read_as(Ns::Cmis, "displayName", &mut acc.display_name, &mut dirty)
                .await?;
            xml.maybe_read_as(Ns::Cmis, "baseTypeId", &mut acc.base_type_id, &mut dirty)
                .await?;
            xml.maybe_read_as(Ns::Cmis, "parentId", &mut acc.parent_id, &mut dirty)
                .await?;
            xml.maybe_read_as(Ns::Cmis, "description", &mut acc.description, &mut dirty)
                .await?;
            xml.maybe_read_as(Ns::Cmis, "creatable", &mut acc.creatable, &mut dirty)
                .await?;
            xml.maybe_read_as(Ns::Cmis, "fileable", &mut acc.fileable, &mut dirty)
                .await?;
            xml.maybe_read_as(Ns::Cmis, "queryable", &mut acc.queryable, &mut dirty)
                .await?;
            xml.maybe_read_as(Ns::Cmis, "controllable", &mut acc.controllable, &mut dirty)
                .await?;
            xml.maybe_read_as(
                Ns::Cmis,
                "includedInSupertypeQuery",
                &mut acc.included_in_supertype_query,
                &mut dirty,
            )
            .await?;
            xml.maybe_push(&mut acc.property_definitions, &mut dirty)
                .await?;
            xml.maybe_read_as(Ns::Cmis, "versionable", &mut acc.versionable, &mut dirty)
                .await?;
            xml.maybe_read_as(
                Ns::Cmis,
                "contentStreamAllowed",
                &mut acc.content_stream_allowed,
                &mut dirty,
            )
            .await?;
            xml.maybe_push_as(
                Ns::Cmis,
                "allowedSourceTypes",
                &mut acc.allowed_source_types,
                &mut dirty,
            )
            .await?;
            xml.maybe_push_as(
                Ns::Cmis,
                "allowedTargetTypes",
                &mut acc.allowed_target_types,
                &mut dirty,
            )
            .await?;
            if !dirty && xml.capture_unknown(&mut acc.any).await? {
                break;
            }
        }
        Ok(acc)
    }

    /// `kind` comes from the element name or `xsi:type`, `baseTypeId` otherwise
    fn finish(self, kind: Option<ObjectType>) -> Result<TypeDefinition, ParsingError> {
        let base_type_id = required(self.base_type_id, "baseTypeId")?;
        let base = TypeDefinitionBase {
            type_id: required(self.type_id, "typeId")?,
            query_name: self.query_name,
            display_name: self.display_name,
            base_type_id,
            parent_id: self.parent_id,
            description: self.description,
            creatable: self.creatable,
            fileable: self.fileable,
            queryable: self.queryable,
            controllable: self.controllable,
            included_in_supertype_query: self.included_in_supertype_query,
            property_definitions: self.property_definitions,
            any: self.any,
        };

        Ok(match kind.unwrap_or(base_type_id) {
            ObjectType::Document => TypeDefinition::Document(DocumentTypeDefinition {
                base,
                versionable: self.versionable,
                content_stream_allowed: self.content_stream_allowed,
            }),
            ObjectType::Folder => TypeDefinition::Folder(FolderTypeDefinition { base }),
            ObjectType::Relationship => TypeDefinition::Relationship(RelationshipTypeDefinition {
                base,
                allowed_source_types: self.allowed_source_types,
                allowed_target_types: self.allowed_target_types,
            }),
            ObjectType::Policy => TypeDefinition::Policy(PolicyTypeDefinition { base }),
        })
    }
}

/// One of the four global type elements
impl QRead<TypeDefinition> for TypeDefinition {
    async fn qread(xml: &mut Reader<impl IRead>) -> Result<Self, ParsingError> {
        for kind in ObjectType::ALL.iter() {
            let (tag, _) = TypeDefinition::tag_of(*kind);
            if xml.maybe_open(CMIS_URN, tag).await?.is_some() {
                let fields = TypeFields::read_body(xml).await?;
                xml.close().await?;
                return fields.finish(Some(*kind));
            }
        }
        Err(ParsingError::Recoverable)
    }
}

/// A `cmisTypeDefinitionType` slot
impl QReadAs<TypeDefinition> for TypeDefinition {
    async fn qread_as(
        xml: &mut Reader<impl IRead>,
        ns: Ns,
        name: &'static str,
    ) -> Result<Self, ParsingError> {
        let evt = xml.open(ns.urn(), name).await?;
        let mut attrs = xml.attributes(&evt)?;
        let declared = take_xsi_attribute(&mut attrs, "type");
        let kind = declared.as_deref().and_then(|xsi| {
            let local = xsi.rsplit(':').next().unwrap_or(xsi);
            ObjectType::ALL
                .iter()
                .copied()
                .find(|k| TypeDefinition::tag_of(*k).1 == local)
        });
        if declared.is_some() && kind.is_none() {
            tracing::debug!(xsi_type = ?declared, "unknown type definition, using baseTypeId");
        }

        let fields = TypeFields::read_body(xml).await?;
        xml.close().await?;
        fields.finish(kind)
    }
}

// ---- Discovery and faults ----

impl QRead<QueryRequest> for QueryRequest {
    async fn qread(xml: &mut Reader<impl IRead>) -> Result<Self, ParsingError> {
        xml.open(CMIS_URN, QueryRequest::TAG).await?;
        let (mut repository_id, mut statement, mut search_all_versions) = (None, None, None);
        let (mut include_allowable_actions, mut include_relationships) = (None, None);
        let (mut max_items, mut skip_count, mut any) = (None, None, Vec::new());
        loop {
            let mut dirty = false;
            xml.maybe_read_as(Ns::Cmis, "repositoryId", &mut repository_id, &mut dirty)
                .await?;
            xml.maybe_read_as(Ns::Cmis, "statement", &mut statement, &mut dirty)
                .await?;
            xml.maybe_read_as(
                Ns::Cmis,
                "searchAllVersions",
                &mut search_all_versions,
                &mut dirty,
            )
            .await?;
            xml.maybe_read_as(
                Ns::Cmis,
                "includeAllowableActions",
                &mut include_allowable_actions,
                &mut dirty,
            )
            .await?;
            xml.maybe_read_as(
                Ns::Cmis,
                "includeRelationships",
                &mut include_relationships,
                &mut dirty,
            )
            .await?;
            xml.maybe_read_as(Ns::Cmis, "maxItems", &mut max_items, &mut dirty)
                .await?;
            xml.maybe_read_as(Ns::Cmis, "skipCount", &mut skip_count, &mut dirty)
                .await?;
            if !dirty && xml.capture_unknown(&mut any).await? {
                break;
            }
        }
        xml.close().await?;

        Ok(QueryRequest {
            repository_id: required(repository_id, "repositoryId")?,
            statement: required(statement, "statement")?,
            search_all_versions,
            include_allowable_actions,
            include_relationships,
            max_items,
            skip_count,
            any,
        })
    }
}

impl QRead<Fault> for Fault {
    async fn qread(xml: &mut Reader<impl IRead>) -> Result<Self, ParsingError> {
        xml.open(MSG_URN, Fault::TAG).await?;
        let (mut kind, mut code, mut message, mut any) = (None, None, None, Vec::new());
        loop {
            let mut dirty = false;
            xml.maybe_read_as(Ns::Msg, "type", &mut kind, &mut dirty)
                .await?;
            xml.maybe_read_as(Ns::Msg, "code", &mut code, &mut dirty)
                .await?;
            xml.maybe_read_as(Ns::Msg, "message", &mut message, &mut dirty)
                .await?;
            if !dirty && xml.capture_unknown(&mut any).await? {
                break;
            }
        }
        xml.close().await?;

        Ok(Fault {
            kind: required(kind, "type")?,
            code: required(code, "code")?,
            message: required(message, "message")?,
            any,
        })
    }
}
