//! Request and response envelopes of the CMIS services.
//!
//! Each envelope is a global element of the messaging namespace named
//! after the operation. Fields are declared in wire order with their
//! multiplicity (`req`, `opt` or `many`), the namespace and the name of
//! the child element.
//!
//! Options the server gives a meaning to when they are absent are left
//! as `None` after decoding, the accessor of the same name returns the
//! effective value.

use super::coretypes::*;
use super::enums::*;
use super::proptypes::Properties;

macro_rules! envelope {
    (@ty req $ty:ty) => { $ty };
    (@ty opt $ty:ty) => { Option<$ty> };
    (@ty many $ty:ty) => { Vec<$ty> };
    ($(#[$meta:meta])* $name:ident ($tag:literal) {
        $($(#[$fmeta:meta])* $field:ident : $mult:ident $ty:ty = $ns:ident $ftag:literal),* $(,)?
    }) => {
        $(#[$meta])*
        #[derive(Debug, PartialEq, Clone)]
        pub struct $name {
            $($(#[$fmeta])* pub $field: envelope!(@ty $mult $ty),)*
        }
        impl $name {
            pub const TAG: &'static str = $tag;
        }
        $crate::msgencoder::envelope_qwrite!($name ($tag) { $($field : $mult $ty = $ns $ftag),* });
        $crate::msgdecoder::envelope_qread!($name ($tag) { $($field : $mult $ty = $ns $ftag),* });
    };
}

/// `includeAllowableActions` and `includeRelationships` defaults
macro_rules! inclusion_defaults {
    ($($name:ident),+ $(,)?) => {
        $(
            impl $name {
                pub fn include_allowable_actions(&self) -> bool {
                    self.include_allowable_actions.unwrap_or(false)
                }

                pub fn include_relationships(&self) -> IncludeRelationships {
                    self.include_relationships
                        .unwrap_or(IncludeRelationships::None)
                }
            }
        )+
    };
}

/// Ids of the objects a `deleteTree` could not remove
#[derive(Debug, PartialEq, Clone, Default)]
pub struct FailedToDelete {
    pub object_ids: Vec<String>,
}

// ---- Repository service ----

envelope! {
    GetRepositories ("getRepositories") {}
}

envelope! {
    GetRepositoriesResponse ("getRepositoriesResponse") {
        repositories: many RepositoryEntry = Msg "repository",
    }
}

envelope! {
    GetRepositoryInfo ("getRepositoryInfo") {
        repository_id: req String = Msg "repositoryId",
    }
}

envelope! {
    GetRepositoryInfoResponse ("getRepositoryInfoResponse") {
        repository_info: req RepositoryInfo = Cmis "repositoryInfo",
    }
}

envelope! {
    GetTypes ("getTypes") {
        repository_id: req String = Msg "repositoryId",
        /// Only this type and its descendants, all types when absent
        type_id: opt String = Msg "typeId",
        include_property_definitions: opt bool = Msg "includePropertyDefinitions",
        max_items: opt i64 = Msg "maxItems",
        skip_count: opt i64 = Msg "skipCount",
    }
}
impl GetTypes {
    pub fn include_property_definitions(&self) -> bool {
        self.include_property_definitions.unwrap_or(false)
    }
}

envelope! {
    GetTypesResponse ("getTypesResponse") {
        types: many TypeDefinition = Cmis "type",
        has_more_items: req bool = Cmis "hasMoreItems",
    }
}

envelope! {
    GetTypeDefinition ("getTypeDefinition") {
        repository_id: req String = Msg "repositoryId",
        type_id: req String = Msg "typeId",
    }
}

envelope! {
    GetTypeDefinitionResponse ("getTypeDefinitionResponse") {
        type_definition: req TypeDefinition = Cmis "type",
    }
}

// ---- Navigation service ----

envelope! {
    GetDescendants ("getDescendants") {
        repository_id: req String = Msg "repositoryId",
        folder_id: req String = Msg "folderId",
        kind: opt TypesOfFileableObjects = Msg "type",
        depth: opt i64 = Msg "depth",
        filter: opt String = Msg "filter",
        include_allowable_actions: opt bool = Msg "includeAllowableActions",
        include_relationships: opt IncludeRelationships = Msg "includeRelationships",
    }
}

envelope! {
    GetDescendantsResponse ("getDescendantsResponse") {
        objects: many CmisObject = Cmis "object",
    }
}

envelope! {
    GetChildren ("getChildren") {
        repository_id: req String = Msg "repositoryId",
        folder_id: req String = Msg "folderId",
        kind: opt TypesOfFileableObjects = Msg "type",
        filter: opt String = Msg "filter",
        include_allowable_actions: opt bool = Msg "includeAllowableActions",
        include_relationships: opt IncludeRelationships = Msg "includeRelationships",
        max_items: opt i64 = Msg "maxItems",
        skip_count: opt i64 = Msg "skipCount",
    }
}
impl GetChildren {
    pub fn new(repository_id: impl Into<String>, folder_id: impl Into<String>) -> Self {
        Self {
            repository_id: repository_id.into(),
            folder_id: folder_id.into(),
            kind: None,
            filter: None,
            include_allowable_actions: None,
            include_relationships: None,
            max_items: None,
            skip_count: None,
        }
    }

    pub fn kind(&self) -> TypesOfFileableObjects {
        self.kind.unwrap_or(TypesOfFileableObjects::Any)
    }
}

envelope! {
    GetChildrenResponse ("getChildrenResponse") {
        objects: many CmisObject = Cmis "object",
        has_more_items: req bool = Cmis "hasMoreItems",
    }
}

envelope! {
    GetFolderParent ("getFolderParent") {
        repository_id: req String = Msg "repositoryId",
        folder_id: req String = Msg "folderId",
        filter: opt String = Msg "filter",
        include_allowable_actions: opt bool = Msg "includeAllowableActions",
        include_relationships: opt IncludeRelationships = Msg "includeRelationships",
        return_to_root: opt bool = Msg "returnToRoot",
    }
}
impl GetFolderParent {
    pub fn return_to_root(&self) -> bool {
        self.return_to_root.unwrap_or(false)
    }
}

envelope! {
    GetFolderParentResponse ("getFolderParentResponse") {
        objects: many CmisObject = Cmis "object",
    }
}

envelope! {
    GetObjectParents ("getObjectParents") {
        repository_id: req String = Msg "repositoryId",
        object_id: req String = Msg "objectId",
        filter: opt String = Msg "filter",
        include_allowable_actions: opt bool = Msg "includeAllowableActions",
        include_relationships: opt IncludeRelationships = Msg "includeRelationships",
    }
}

envelope! {
    GetObjectParentsResponse ("getObjectParentsResponse") {
        objects: many CmisObject = Cmis "object",
    }
}

envelope! {
    GetCheckedoutDocs ("getCheckedoutDocs") {
        repository_id: req String = Msg "repositoryId",
        folder_id: opt String = Msg "folderId",
        filter: opt String = Msg "filter",
        order_by: opt String = Msg "orderBy",
        include_allowable_actions: opt bool = Msg "includeAllowableActions",
        include_relationships: opt IncludeRelationships = Msg "includeRelationships",
        max_items: opt i64 = Msg "maxItems",
        skip_count: opt i64 = Msg "skipCount",
    }
}

envelope! {
    GetCheckedoutDocsResponse ("getCheckedoutDocsResponse") {
        objects: many CmisObject = Cmis "object",
        has_more_items: req bool = Cmis "hasMoreItems",
    }
}

// ---- Object service ----

envelope! {
    CreateDocument ("createDocument") {
        repository_id: req String = Msg "repositoryId",
        type_id: req String = Msg "typeId",
        properties: req Properties = Msg "properties",
        /// Unfiled document when absent
        folder_id: opt String = Msg "folderId",
        content_stream: opt ContentStream = Msg "contentStream",
        versioning_state: opt VersioningState = Msg "versioningState",
    }
}
impl CreateDocument {
    pub fn new(
        repository_id: impl Into<String>,
        type_id: impl Into<String>,
        properties: Properties,
    ) -> Self {
        Self {
            repository_id: repository_id.into(),
            type_id: type_id.into(),
            properties,
            folder_id: None,
            content_stream: None,
            versioning_state: None,
        }
    }

    /// A document created without a versioning state is a major version
    pub fn versioning_state(&self) -> VersioningState {
        self.versioning_state.unwrap_or(VersioningState::Major)
    }
}

envelope! {
    CreateDocumentResponse ("createDocumentResponse") {
        object_id: req String = Msg "objectId",
    }
}

envelope! {
    CreateFolder ("createFolder") {
        repository_id: req String = Msg "repositoryId",
        type_id: req String = Msg "typeId",
        properties: req Properties = Msg "properties",
        folder_id: req String = Msg "folderId",
    }
}

envelope! {
    CreateFolderResponse ("createFolderResponse") {
        object_id: req String = Msg "objectId",
    }
}

envelope! {
    CreateRelationship ("createRelationship") {
        repository_id: req String = Msg "repositoryId",
        type_id: req String = Msg "typeId",
        properties: req Properties = Msg "properties",
        source_object_id: req String = Msg "sourceObjectId",
        target_object_id: req String = Msg "targetObjectId",
    }
}

envelope! {
    CreateRelationshipResponse ("createRelationshipResponse") {
        object_id: req String = Msg "objectId",
    }
}

envelope! {
    CreatePolicy ("createPolicy") {
        repository_id: req String = Msg "repositoryId",
        type_id: req String = Msg "typeId",
        properties: req Properties = Msg "properties",
        folder_id: opt String = Msg "folderId",
    }
}

envelope! {
    CreatePolicyResponse ("createPolicyResponse") {
        object_id: req String = Msg "objectId",
    }
}

envelope! {
    GetAllowableActions ("getAllowableActions") {
        repository_id: req String = Msg "repositoryId",
        object_id: req String = Msg "objectId",
    }
}

envelope! {
    GetAllowableActionsResponse ("getAllowableActionsResponse") {
        allowable_actions: req AllowableActions = Cmis "allowableActions",
    }
}

envelope! {
    GetProperties ("getProperties") {
        repository_id: req String = Msg "repositoryId",
        object_id: req String = Msg "objectId",
        filter: opt String = Msg "filter",
        include_allowable_actions: opt bool = Msg "includeAllowableActions",
        include_relationships: opt IncludeRelationships = Msg "includeRelationships",
        return_version: opt ReturnVersion = Msg "returnVersion",
    }
}
impl GetProperties {
    pub fn return_version(&self) -> ReturnVersion {
        self.return_version.unwrap_or(ReturnVersion::This)
    }
}

envelope! {
    GetPropertiesResponse ("getPropertiesResponse") {
        object: req CmisObject = Cmis "object",
    }
}

envelope! {
    GetContentStream ("getContentStream") {
        repository_id: req String = Msg "repositoryId",
        document_id: req String = Msg "documentId",
    }
}

envelope! {
    GetContentStreamResponse ("getContentStreamResponse") {
        content_stream: req ContentStream = Msg "contentStream",
    }
}

envelope! {
    UpdateProperties ("updateProperties") {
        repository_id: req String = Msg "repositoryId",
        object_id: req String = Msg "objectId",
        change_token: opt String = Msg "changeToken",
        properties: req Properties = Msg "properties",
    }
}

envelope! {
    UpdatePropertiesResponse ("updatePropertiesResponse") {
        object_id: req String = Msg "objectId",
    }
}

envelope! {
    MoveObject ("moveObject") {
        repository_id: req String = Msg "repositoryId",
        object_id: req String = Msg "objectId",
        target_folder_id: req String = Msg "targetFolderId",
        /// Needed when the object is filed in several folders
        source_folder_id: opt String = Msg "sourceFolderId",
    }
}

envelope! {
    MoveObjectResponse ("moveObjectResponse") {}
}

envelope! {
    DeleteObject ("deleteObject") {
        repository_id: req String = Msg "repositoryId",
        object_id: req String = Msg "objectId",
    }
}

envelope! {
    DeleteObjectResponse ("deleteObjectResponse") {}
}

envelope! {
    DeleteTree ("deleteTree") {
        repository_id: req String = Msg "repositoryId",
        folder_id: req String = Msg "folderId",
        unfile_nonfolder_objects: opt UnfileNonfolderObjects = Msg "unfileNonfolderObjects",
        continue_on_failure: opt bool = Msg "continueOnFailure",
    }
}
impl DeleteTree {
    pub fn unfile_nonfolder_objects(&self) -> UnfileNonfolderObjects {
        self.unfile_nonfolder_objects
            .unwrap_or(UnfileNonfolderObjects::Delete)
    }

    pub fn continue_on_failure(&self) -> bool {
        self.continue_on_failure.unwrap_or(false)
    }
}

envelope! {
    DeleteTreeResponse ("deleteTreeResponse") {
        failed_to_delete: req FailedToDelete = Msg "failedToDelete",
    }
}

envelope! {
    SetContentStream ("setContentStream") {
        repository_id: req String = Msg "repositoryId",
        document_id: req String = Msg "documentId",
        overwrite_flag: opt bool = Msg "overwriteFlag",
        content_stream: req ContentStream = Msg "contentStream",
    }
}
impl SetContentStream {
    pub fn overwrite_flag(&self) -> bool {
        self.overwrite_flag.unwrap_or(true)
    }
}

envelope! {
    SetContentStreamResponse ("setContentStreamResponse") {
        document_id: req String = Msg "documentId",
    }
}

envelope! {
    DeleteContentStream ("deleteContentStream") {
        repository_id: req String = Msg "repositoryId",
        document_id: req String = Msg "documentId",
    }
}

envelope! {
    DeleteContentStreamResponse ("deleteContentStreamResponse") {}
}

// ---- Multi-filing service ----

envelope! {
    AddObjectToFolder ("addObjectToFolder") {
        repository_id: req String = Msg "repositoryId",
        object_id: req String = Msg "objectId",
        folder_id: req String = Msg "folderId",
    }
}

envelope! {
    AddObjectToFolderResponse ("addObjectToFolderResponse") {}
}

envelope! {
    RemoveObjectFromFolder ("removeObjectFromFolder") {
        repository_id: req String = Msg "repositoryId",
        object_id: req String = Msg "objectId",
        /// Every parent folder when absent
        folder_id: opt String = Msg "folderId",
    }
}

envelope! {
    RemoveObjectFromFolderResponse ("removeObjectFromFolderResponse") {}
}

// ---- Discovery service ----

envelope! {
    /// Answer to a `cmis:query` request
    QueryResponse ("queryResponse") {
        objects: many CmisObject = Cmis "object",
        has_more_items: req bool = Cmis "hasMoreItems",
    }
}

envelope! {
    GetContentChanges ("getContentChanges") {
        repository_id: req String = Msg "repositoryId",
        change_token: opt String = Msg "changeToken",
        max_items: opt i64 = Msg "maxItems",
        include_acl: opt bool = Msg "includeACL",
        include_properties: opt bool = Msg "includeProperties",
        filter: opt String = Msg "filter",
    }
}
impl GetContentChanges {
    pub fn include_acl(&self) -> bool {
        self.include_acl.unwrap_or(false)
    }

    pub fn include_properties(&self) -> bool {
        self.include_properties.unwrap_or(false)
    }
}

envelope! {
    GetContentChangesResponse ("getContentChangesResponse") {
        changed_objects: many ChangedObject = Msg "changedObject",
        /// Token to resume from on the next call
        change_token: opt String = Msg "changeToken",
    }
}

// ---- Versioning service ----

envelope! {
    CheckOut ("checkOut") {
        repository_id: req String = Msg "repositoryId",
        document_id: req String = Msg "documentId",
    }
}

envelope! {
    CheckOutResponse ("checkOutResponse") {
        /// Id of the private working copy
        document_id: req String = Msg "documentId",
        content_copied: req bool = Msg "contentCopied",
    }
}

envelope! {
    CancelCheckOut ("cancelCheckOut") {
        repository_id: req String = Msg "repositoryId",
        document_id: req String = Msg "documentId",
    }
}

envelope! {
    CancelCheckOutResponse ("cancelCheckOutResponse") {}
}

envelope! {
    CheckIn ("checkIn") {
        repository_id: req String = Msg "repositoryId",
        document_id: req String = Msg "documentId",
        major: opt bool = Msg "major",
        properties: opt Properties = Msg "properties",
        content_stream: opt ContentStream = Msg "contentStream",
        checkin_comment: opt String = Msg "checkinComment",
    }
}
impl CheckIn {
    pub fn new(repository_id: impl Into<String>, document_id: impl Into<String>) -> Self {
        Self {
            repository_id: repository_id.into(),
            document_id: document_id.into(),
            major: None,
            properties: None,
            content_stream: None,
            checkin_comment: None,
        }
    }

    /// Check-ins produce major versions unless told otherwise
    pub fn major(&self) -> bool {
        self.major.unwrap_or(true)
    }
}

envelope! {
    CheckInResponse ("checkInResponse") {
        document_id: req String = Msg "documentId",
    }
}

envelope! {
    GetPropertiesOfLatestVersion ("getPropertiesOfLatestVersion") {
        repository_id: req String = Msg "repositoryId",
        version_series_id: req String = Msg "versionSeriesId",
        major_version: opt bool = Msg "majorVersion",
        filter: opt String = Msg "filter",
    }
}
impl GetPropertiesOfLatestVersion {
    pub fn major_version(&self) -> bool {
        self.major_version.unwrap_or(false)
    }
}

envelope! {
    GetPropertiesOfLatestVersionResponse ("getPropertiesOfLatestVersionResponse") {
        object: req CmisObject = Cmis "object",
    }
}

envelope! {
    GetAllVersions ("getAllVersions") {
        repository_id: req String = Msg "repositoryId",
        version_series_id: req String = Msg "versionSeriesId",
        filter: opt String = Msg "filter",
        include_allowable_actions: opt bool = Msg "includeAllowableActions",
        include_relationships: opt IncludeRelationships = Msg "includeRelationships",
    }
}

envelope! {
    GetAllVersionsResponse ("getAllVersionsResponse") {
        objects: many CmisObject = Cmis "object",
    }
}

envelope! {
    DeleteAllVersions ("deleteAllVersions") {
        repository_id: req String = Msg "repositoryId",
        version_series_id: req String = Msg "versionSeriesId",
    }
}

envelope! {
    DeleteAllVersionsResponse ("deleteAllVersionsResponse") {}
}

// ---- Relationship service ----

envelope! {
    GetRelationships ("getRelationships") {
        repository_id: req String = Msg "repositoryId",
        object_id: req String = Msg "objectId",
        direction: opt RelationshipDirection = Msg "direction",
        type_id: opt String = Msg "typeId",
        include_sub_relationship_types: opt bool = Msg "includeSubRelationshipTypes",
        filter: opt String = Msg "filter",
        include_allowable_actions: opt bool = Msg "includeAllowableActions",
        include_relationships: opt IncludeRelationships = Msg "includeRelationships",
        max_items: opt i64 = Msg "maxItems",
        skip_count: opt i64 = Msg "skipCount",
    }
}
impl GetRelationships {
    pub fn direction(&self) -> RelationshipDirection {
        self.direction.unwrap_or(RelationshipDirection::Source)
    }

    pub fn include_sub_relationship_types(&self) -> bool {
        self.include_sub_relationship_types.unwrap_or(false)
    }
}

envelope! {
    GetRelationshipsResponse ("getRelationshipsResponse") {
        objects: many CmisObject = Cmis "object",
        has_more_items: req bool = Cmis "hasMoreItems",
    }
}

// ---- Policy service ----

envelope! {
    ApplyPolicy ("applyPolicy") {
        repository_id: req String = Msg "repositoryId",
        policy_id: req String = Msg "policyId",
        object_id: req String = Msg "objectId",
    }
}

envelope! {
    ApplyPolicyResponse ("applyPolicyResponse") {}
}

envelope! {
    RemovePolicy ("removePolicy") {
        repository_id: req String = Msg "repositoryId",
        policy_id: req String = Msg "policyId",
        object_id: req String = Msg "objectId",
    }
}

envelope! {
    RemovePolicyResponse ("removePolicyResponse") {}
}

envelope! {
    GetAppliedPolicies ("getAppliedPolicies") {
        repository_id: req String = Msg "repositoryId",
        object_id: req String = Msg "objectId",
        filter: opt String = Msg "filter",
    }
}

envelope! {
    GetAppliedPoliciesResponse ("getAppliedPoliciesResponse") {
        objects: many CmisObject = Cmis "object",
    }
}

inclusion_defaults!(
    GetDescendants,
    GetChildren,
    GetFolderParent,
    GetObjectParents,
    GetCheckedoutDocs,
    GetProperties,
    GetAllVersions,
    GetRelationships,
);
