use std::collections::HashMap;

use super::enums::*;
use super::proptypes::{Properties, PropertyDefinition};
use super::xml::{AnyElement, AnyXml, ExtAttribute};

// ---- Allowable actions ----

/// `cmis:allowableActions`
///
/// Only the actions that were set are serialized, always in the
/// declaration order of `AllowableAction`.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct AllowableActions {
    pub actions: HashMap<AllowableAction, bool>,
    pub any: Vec<AnyElement>,
    pub other_attributes: Vec<ExtAttribute>,
}
impl AllowableActions {
    pub fn get(&self, action: AllowableAction) -> Option<bool> {
        self.actions.get(&action).copied()
    }

    pub fn set(&mut self, action: AllowableAction, allowed: bool) -> &mut Self {
        self.actions.insert(action, allowed);
        self
    }

    pub fn unset(&mut self, action: AllowableAction) -> Option<bool> {
        self.actions.remove(&action)
    }

    /// An unset action is not allowed
    pub fn is_allowed(&self, action: AllowableAction) -> bool {
        self.get(action).unwrap_or(false)
    }

    /// Set actions in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (AllowableAction, bool)> + '_ {
        AllowableAction::ALL
            .iter()
            .filter_map(|a| self.get(*a).map(|v| (*a, v)))
    }
}

// ---- Access control ----

#[derive(Debug, PartialEq, Clone, Default)]
pub struct AccessControlPrincipal {
    pub principal_id: Option<String>,
    pub any: Vec<AnyElement>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct AccessControlEntry {
    pub principal: AccessControlPrincipal,
    /// Permission names, see `BasicPermissions` for the portable ones
    pub permissions: Vec<String>,
    pub direct: bool,
    pub any: Vec<AnyElement>,
}

/// `cmisAccessControlListType`
#[derive(Debug, PartialEq, Clone, Default)]
pub struct AccessControlList {
    pub permissions: Vec<AccessControlEntry>,
    pub any: Vec<AnyElement>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct PermissionDefinition {
    pub permission: String,
    pub description: Option<String>,
    pub any: Vec<AnyElement>,
}

/// Permissions a repository supports
#[derive(Debug, PartialEq, Clone, Default)]
pub struct PermissionSet {
    pub permissions: Vec<PermissionDefinition>,
    pub any: Vec<AnyElement>,
}

// ---- Content ----

/// Payload of a content stream
#[derive(Debug, PartialEq, Clone)]
pub enum ContentPayload {
    /// `<cmis:stream>base64</cmis:stream>`
    Inline(Vec<u8>),
    /// MTOM: `<cmis:stream><xop:Include href="cid:..."/></cmis:stream>`
    Attachment(String),
}

/// `cmisContentStreamType`
#[derive(Debug, PartialEq, Clone)]
pub struct ContentStream {
    pub length: i64,
    pub mime_type: Option<String>,
    pub filename: Option<String>,
    pub uri: Option<String>,
    pub stream: ContentPayload,
    pub any: Vec<AnyElement>,
}
impl ContentStream {
    pub fn inline(mime_type: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            length: content.len() as i64,
            mime_type: Some(mime_type.into()),
            filename: None,
            uri: None,
            stream: ContentPayload::Inline(content),
            any: vec![],
        }
    }
}

// ---- Objects ----

/// `cmisObjectType`
#[derive(Debug, PartialEq, Clone, Default)]
pub struct CmisObject {
    pub properties: Option<Properties>,
    pub allowable_actions: Option<AllowableActions>,
    pub relationships: Vec<CmisObject>,
    pub children: Vec<CmisObject>,
    pub acl: Option<AccessControlList>,
    pub exact_acl: Option<bool>,
    pub any: Vec<AnyElement>,
}
impl CmisObject {
    pub fn object_id(&self) -> Option<&str> {
        self.properties.as_ref()?.id_value("cmis:ObjectId")
    }

    /// This object and all its children, depth first
    pub fn walk(&self) -> Vec<&CmisObject> {
        let mut acc = vec![];
        let mut stack = vec![self];
        while let Some(obj) = stack.pop() {
            acc.push(obj);
            stack.extend(obj.children.iter().rev());
        }
        acc
    }
}

/// `cmisChangedObjectType`, an object extended with the kind of change
#[derive(Debug, PartialEq, Clone)]
pub struct ChangedObject {
    pub object: CmisObject,
    pub change_type: ChangeType,
}

// ---- Repository ----

/// `cmisRepositoryEntryType`
#[derive(Debug, PartialEq, Clone)]
pub struct RepositoryEntry {
    pub repository_id: String,
    pub repository_name: String,
    pub repository_uri: Option<String>,
    pub any: Vec<AnyElement>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct RepositoryCapabilities {
    pub multifiling: bool,
    pub unfiling: bool,
    pub version_specific_filing: bool,
    pub pwc_updateable: bool,
    pub pwc_searchable: bool,
    pub all_versions_searchable: bool,
    pub query: CapabilityQuery,
    pub join: CapabilityJoin,
    pub full_text: CapabilityFullText,
    pub changes: Option<CapabilityChanges>,
    pub content_stream_updatability: Option<CapabilityContentStreamUpdates>,
    pub renditions: Option<CapabilityRendition>,
    pub acl: Option<CapabilityAcl>,
    pub any: Vec<AnyElement>,
}

/// `cmis:repositoryInfo`
#[derive(Debug, PartialEq, Clone)]
pub struct RepositoryInfo {
    pub repository_id: String,
    pub repository_name: String,
    pub repository_relationship: Option<RepositoryRelationship>,
    pub repository_description: Option<String>,
    pub vendor_name: Option<String>,
    pub product_name: Option<String>,
    pub product_version: Option<String>,
    pub root_folder_id: String,
    pub latest_change_token: Option<String>,
    pub capabilities: RepositoryCapabilities,
    pub acl_propagation: Option<AclPropagation>,
    pub permission_set: Option<PermissionSet>,
    pub cmis_version_supported: String,
    pub repository_specific_information: Option<AnyXml>,
    pub any: Vec<AnyElement>,
}

// ---- Types ----

/// Fields shared by every type definition
#[derive(Debug, PartialEq, Clone)]
pub struct TypeDefinitionBase {
    pub type_id: String,
    pub query_name: Option<String>,
    pub display_name: Option<String>,
    pub base_type_id: ObjectType,
    pub parent_id: Option<String>,
    pub description: Option<String>,
    pub creatable: Option<bool>,
    pub fileable: Option<bool>,
    pub queryable: Option<bool>,
    pub controllable: Option<bool>,
    pub included_in_supertype_query: Option<bool>,
    pub property_definitions: Vec<PropertyDefinition>,
    pub any: Vec<AnyElement>,
}
impl TypeDefinitionBase {
    pub fn new(type_id: impl Into<String>, base_type_id: ObjectType) -> Self {
        Self {
            type_id: type_id.into(),
            query_name: None,
            display_name: None,
            base_type_id,
            parent_id: None,
            description: None,
            creatable: None,
            fileable: None,
            queryable: None,
            controllable: None,
            included_in_supertype_query: None,
            property_definitions: vec![],
            any: vec![],
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct DocumentTypeDefinition {
    pub base: TypeDefinitionBase,
    pub versionable: Option<bool>,
    pub content_stream_allowed: Option<ContentStreamAllowed>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct FolderTypeDefinition {
    pub base: TypeDefinitionBase,
}

#[derive(Debug, PartialEq, Clone)]
pub struct RelationshipTypeDefinition {
    pub base: TypeDefinitionBase,
    pub allowed_source_types: Vec<String>,
    pub allowed_target_types: Vec<String>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct PolicyTypeDefinition {
    pub base: TypeDefinitionBase,
}

#[derive(Debug, PartialEq, Clone)]
pub enum TypeDefinition {
    Document(DocumentTypeDefinition),
    Folder(FolderTypeDefinition),
    Relationship(RelationshipTypeDefinition),
    Policy(PolicyTypeDefinition),
}
impl TypeDefinition {
    pub fn base(&self) -> &TypeDefinitionBase {
        match self {
            Self::Document(d) => &d.base,
            Self::Folder(d) => &d.base,
            Self::Relationship(d) => &d.base,
            Self::Policy(d) => &d.base,
        }
    }

    pub fn kind(&self) -> ObjectType {
        match self {
            Self::Document(_) => ObjectType::Document,
            Self::Folder(_) => ObjectType::Folder,
            Self::Relationship(_) => ObjectType::Relationship,
            Self::Policy(_) => ObjectType::Policy,
        }
    }

    /// Name of the global element, also the `xsi:type` suffix
    pub(crate) fn tag_of(kind: ObjectType) -> (&'static str, &'static str) {
        match kind {
            ObjectType::Document => ("documentType", "cmisTypeDocumentDefinitionType"),
            ObjectType::Folder => ("folderType", "cmisTypeFolderDefinitionType"),
            ObjectType::Relationship => ("relationshipType", "cmisTypeRelationshipDefinitionType"),
            ObjectType::Policy => ("policyType", "cmisTypePolicyDefinitionType"),
        }
    }
}

// ---- Discovery and faults ----

/// `cmis:query`
#[derive(Debug, PartialEq, Clone)]
pub struct QueryRequest {
    pub repository_id: String,
    pub statement: String,
    pub search_all_versions: Option<bool>,
    pub include_allowable_actions: Option<bool>,
    pub include_relationships: Option<IncludeRelationships>,
    pub max_items: Option<i64>,
    pub skip_count: Option<i64>,
    pub any: Vec<AnyElement>,
}
impl QueryRequest {
    pub const TAG: &'static str = "query";

    pub fn new(repository_id: impl Into<String>, statement: impl Into<String>) -> Self {
        Self {
            repository_id: repository_id.into(),
            statement: statement.into(),
            search_all_versions: None,
            include_allowable_actions: None,
            include_relationships: None,
            max_items: None,
            skip_count: None,
            any: vec![],
        }
    }

    pub fn search_all_versions(&self) -> bool {
        self.search_all_versions.unwrap_or(false)
    }

    pub fn include_allowable_actions(&self) -> bool {
        self.include_allowable_actions.unwrap_or(false)
    }

    pub fn include_relationships(&self) -> IncludeRelationships {
        self.include_relationships
            .unwrap_or(IncludeRelationships::None)
    }
}

/// `cmism:cmisFault`
#[derive(Debug, PartialEq, Clone)]
pub struct Fault {
    pub kind: ServiceException,
    pub code: i64,
    pub message: String,
    pub any: Vec<AnyElement>,
}
impl Fault {
    pub const TAG: &'static str = "cmisFault";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allowable_actions_accessors() {
        let mut actions = AllowableActions::default();
        assert_eq!(actions.get(AllowableAction::CanDelete), None);
        assert!(!actions.is_allowed(AllowableAction::CanDelete));

        actions
            .set(AllowableAction::CanMove, true)
            .set(AllowableAction::CanDelete, false);
        assert_eq!(actions.get(AllowableAction::CanDelete), Some(false));
        assert_eq!(
            actions.iter().collect::<Vec<_>>(),
            vec![
                (AllowableAction::CanDelete, false),
                (AllowableAction::CanMove, true)
            ]
        );

        assert_eq!(actions.unset(AllowableAction::CanMove), Some(true));
        assert_eq!(actions.iter().count(), 1);
    }

    #[test]
    fn query_defaults_leave_fields_unset() {
        let query = QueryRequest::new("main", "SELECT * FROM cmis:document");
        assert!(!query.search_all_versions());
        assert_eq!(query.include_relationships(), IncludeRelationships::None);
        assert_eq!(query.include_relationships, None);
    }

    #[test]
    fn walk_is_depth_first() {
        let leaf = |name: &str| CmisObject {
            any: vec![AnyElement::new(None, None, name)],
            ..CmisObject::default()
        };
        let mut a = leaf("a");
        a.children = vec![leaf("a1"), leaf("a2")];
        let mut root = leaf("root");
        root.children = vec![a, leaf("b")];

        let order: Vec<&str> = root
            .walk()
            .into_iter()
            .map(|o| o.any[0].local.as_str())
            .collect();
        assert_eq!(order, vec!["root", "a", "a1", "a2", "b"]);
    }
}
