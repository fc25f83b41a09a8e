//! Any document exchanged with a CMIS SOAP endpoint.

use super::coretypes::{CmisObject, Fault, QueryRequest};
use super::error::ParsingError;
use super::msgtypes::*;
use super::xml::{IRead, IWrite, QRead, QWrite, Reader, Writer};

macro_rules! messages {
    ($($variant:ident => $ty:ident),+ $(,)?) => {
        /// One variant per root element
        #[derive(Debug, PartialEq, Clone)]
        pub enum Message {
            $($variant($ty)),+
        }

        impl Message {
            /// Local name of the root element
            pub fn name(&self) -> &'static str {
                match self {
                    $(Self::$variant(_) => $ty::TAG),+
                }
            }
        }

        impl QRead<Message> for Message {
            async fn qread(xml: &mut Reader<impl IRead>) -> Result<Self, ParsingError> {
                $(
                    match $ty::qread(xml).await {
                        Err(ParsingError::Recoverable) => (),
                        otherwise => return otherwise.map(Self::$variant),
                    }
                )+
                Err(ParsingError::Recoverable)
            }
        }

        impl QWrite for Message {
            async fn qwrite(&self, xml: &mut Writer<impl IWrite>) -> Result<(), quick_xml::Error> {
                match self {
                    $(Self::$variant(m) => m.qwrite(xml).await),+
                }
            }
        }

        $(
            impl From<$ty> for Message {
                fn from(m: $ty) -> Self {
                    Self::$variant(m)
                }
            }
        )+
    };
}

messages! {
    // repository
    GetRepositories => GetRepositories,
    GetRepositoriesResponse => GetRepositoriesResponse,
    GetRepositoryInfo => GetRepositoryInfo,
    GetRepositoryInfoResponse => GetRepositoryInfoResponse,
    GetTypes => GetTypes,
    GetTypesResponse => GetTypesResponse,
    GetTypeDefinition => GetTypeDefinition,
    GetTypeDefinitionResponse => GetTypeDefinitionResponse,

    // navigation
    GetDescendants => GetDescendants,
    GetDescendantsResponse => GetDescendantsResponse,
    GetChildren => GetChildren,
    GetChildrenResponse => GetChildrenResponse,
    GetFolderParent => GetFolderParent,
    GetFolderParentResponse => GetFolderParentResponse,
    GetObjectParents => GetObjectParents,
    GetObjectParentsResponse => GetObjectParentsResponse,
    GetCheckedoutDocs => GetCheckedoutDocs,
    GetCheckedoutDocsResponse => GetCheckedoutDocsResponse,

    // object
    CreateDocument => CreateDocument,
    CreateDocumentResponse => CreateDocumentResponse,
    CreateFolder => CreateFolder,
    CreateFolderResponse => CreateFolderResponse,
    CreateRelationship => CreateRelationship,
    CreateRelationshipResponse => CreateRelationshipResponse,
    CreatePolicy => CreatePolicy,
    CreatePolicyResponse => CreatePolicyResponse,
    GetAllowableActions => GetAllowableActions,
    GetAllowableActionsResponse => GetAllowableActionsResponse,
    GetProperties => GetProperties,
    GetPropertiesResponse => GetPropertiesResponse,
    GetContentStream => GetContentStream,
    GetContentStreamResponse => GetContentStreamResponse,
    UpdateProperties => UpdateProperties,
    UpdatePropertiesResponse => UpdatePropertiesResponse,
    MoveObject => MoveObject,
    MoveObjectResponse => MoveObjectResponse,
    DeleteObject => DeleteObject,
    DeleteObjectResponse => DeleteObjectResponse,
    DeleteTree => DeleteTree,
    DeleteTreeResponse => DeleteTreeResponse,
    SetContentStream => SetContentStream,
    SetContentStreamResponse => SetContentStreamResponse,
    DeleteContentStream => DeleteContentStream,
    DeleteContentStreamResponse => DeleteContentStreamResponse,

    // multi-filing
    AddObjectToFolder => AddObjectToFolder,
    AddObjectToFolderResponse => AddObjectToFolderResponse,
    RemoveObjectFromFolder => RemoveObjectFromFolder,
    RemoveObjectFromFolderResponse => RemoveObjectFromFolderResponse,

    // discovery
    Query => QueryRequest,
    QueryResponse => QueryResponse,
    GetContentChanges => GetContentChanges,
    GetContentChangesResponse => GetContentChangesResponse,

    // versioning
    CheckOut => CheckOut,
    CheckOutResponse => CheckOutResponse,
    CancelCheckOut => CancelCheckOut,
    CancelCheckOutResponse => CancelCheckOutResponse,
    CheckIn => CheckIn,
    CheckInResponse => CheckInResponse,
    GetPropertiesOfLatestVersion => GetPropertiesOfLatestVersion,
    GetPropertiesOfLatestVersionResponse => GetPropertiesOfLatestVersionResponse,
    GetAllVersions => GetAllVersions,
    GetAllVersionsResponse => GetAllVersionsResponse,
    DeleteAllVersions => DeleteAllVersions,
    DeleteAllVersionsResponse => DeleteAllVersionsResponse,

    // relationship
    GetRelationships => GetRelationships,
    GetRelationshipsResponse => GetRelationshipsResponse,

    // policy
    ApplyPolicy => ApplyPolicy,
    ApplyPolicyResponse => ApplyPolicyResponse,
    RemovePolicy => RemovePolicy,
    RemovePolicyResponse => RemovePolicyResponse,
    GetAppliedPolicies => GetAppliedPolicies,
    GetAppliedPoliciesResponse => GetAppliedPoliciesResponse,

    Fault => Fault,
}

impl Message {
    pub fn is_response(&self) -> bool {
        self.name().ends_with("Response")
    }

    pub fn is_fault(&self) -> bool {
        matches!(self, Self::Fault(_))
    }

    /// Objects carried at the top level of a response
    pub fn objects(&self) -> Vec<&CmisObject> {
        match self {
            Self::GetDescendantsResponse(r) => r.objects.iter().collect(),
            Self::GetChildrenResponse(r) => r.objects.iter().collect(),
            Self::GetFolderParentResponse(r) => r.objects.iter().collect(),
            Self::GetObjectParentsResponse(r) => r.objects.iter().collect(),
            Self::GetCheckedoutDocsResponse(r) => r.objects.iter().collect(),
            Self::QueryResponse(r) => r.objects.iter().collect(),
            Self::GetAllVersionsResponse(r) => r.objects.iter().collect(),
            Self::GetRelationshipsResponse(r) => r.objects.iter().collect(),
            Self::GetAppliedPoliciesResponse(r) => r.objects.iter().collect(),
            Self::GetPropertiesResponse(r) => vec![&r.object],
            Self::GetPropertiesOfLatestVersionResponse(r) => vec![&r.object],
            Self::GetContentChangesResponse(r) => {
                r.changed_objects.iter().map(|c| &c.object).collect()
            }
            _ => vec![],
        }
    }

    /// The repository a request is addressed to
    pub fn repository_id(&self) -> Option<&str> {
        let id = match self {
            Self::GetRepositoryInfo(m) => &m.repository_id,
            Self::GetTypes(m) => &m.repository_id,
            Self::GetTypeDefinition(m) => &m.repository_id,
            Self::GetDescendants(m) => &m.repository_id,
            Self::GetChildren(m) => &m.repository_id,
            Self::GetFolderParent(m) => &m.repository_id,
            Self::GetObjectParents(m) => &m.repository_id,
            Self::GetCheckedoutDocs(m) => &m.repository_id,
            Self::CreateDocument(m) => &m.repository_id,
            Self::CreateFolder(m) => &m.repository_id,
            Self::CreateRelationship(m) => &m.repository_id,
            Self::CreatePolicy(m) => &m.repository_id,
            Self::GetAllowableActions(m) => &m.repository_id,
            Self::GetProperties(m) => &m.repository_id,
            Self::GetContentStream(m) => &m.repository_id,
            Self::UpdateProperties(m) => &m.repository_id,
            Self::MoveObject(m) => &m.repository_id,
            Self::DeleteObject(m) => &m.repository_id,
            Self::DeleteTree(m) => &m.repository_id,
            Self::SetContentStream(m) => &m.repository_id,
            Self::DeleteContentStream(m) => &m.repository_id,
            Self::AddObjectToFolder(m) => &m.repository_id,
            Self::RemoveObjectFromFolder(m) => &m.repository_id,
            Self::Query(m) => &m.repository_id,
            Self::GetContentChanges(m) => &m.repository_id,
            Self::CheckOut(m) => &m.repository_id,
            Self::CancelCheckOut(m) => &m.repository_id,
            Self::CheckIn(m) => &m.repository_id,
            Self::GetPropertiesOfLatestVersion(m) => &m.repository_id,
            Self::GetAllVersions(m) => &m.repository_id,
            Self::DeleteAllVersions(m) => &m.repository_id,
            Self::GetRelationships(m) => &m.repository_id,
            Self::ApplyPolicy(m) => &m.repository_id,
            Self::RemovePolicy(m) => &m.repository_id,
            Self::GetAppliedPolicies(m) => &m.repository_id,
            _ => return None,
        };
        Some(id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coretypes::*;
    use crate::enums::*;
    use crate::proptypes::*;
    use crate::xml::default_namespaces;
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

    async fn deserialize(src: &str) -> Message {
        let mut rdr = Reader::new(NsReader::from_reader(src.as_bytes()))
            .await
            .unwrap();
        rdr.find().await.unwrap()
    }

    #[tokio::test]
    async fn every_kind_of_root() {
        let mut props = Properties::default();
        props.properties.push(Property::Id(PropertyId::with_values(
            "cmis:ObjectId",
            vec!["n1".into()],
        )));
        let obj = CmisObject {
            properties: Some(props.clone()),
            ..CmisObject::default()
        };

        let samples: Vec<Message> = vec![
            GetRepositories {}.into(),
            CheckIn::new("main", "n1").into(),
            MoveObject {
                repository_id: "main".into(),
                object_id: "n1".into(),
                target_folder_id: "f2".into(),
                source_folder_id: Some("f1".into()),
            }
            .into(),
            GetPropertiesResponse { object: obj.clone() }.into(),
            QueryResponse {
                objects: vec![obj.clone(), obj],
                has_more_items: false,
            }
            .into(),
            QueryRequest::new("main", "SELECT * FROM folder").into(),
            Fault {
                kind: ServiceException::PermissionDenied,
                code: 403,
                message: "denied".into(),
                any: vec![],
            }
            .into(),
            CheckOutResponse {
                document_id: "n1;pwc".into(),
                content_copied: true,
            }
            .into(),
            DeleteTreeResponse {
                failed_to_delete: FailedToDelete {
                    object_ids: vec!["x".into()],
                },
            }
            .into(),
        ];

        for orig in samples {
            let got = serialize(&orig).await;
            let back = deserialize(&got).await;
            assert_eq!(back, orig, "\n---XML---\n{got}\n");
        }
    }

    #[tokio::test]
    async fn one_root_per_service() {
        let mut props = Properties::default();
        props.properties.push(Property::String(PropertyString::with_values(
            "cmis:Name",
            vec!["Reports".into()],
        )));
        let obj = CmisObject {
            properties: Some(props.clone()),
            ..CmisObject::default()
        };

        let mut document = TypeDefinitionBase::new("document", ObjectType::Document);
        document.queryable = Some(true);
        document.property_definitions = vec![PropertyDefinition::Id(PropertyIdDefinition::new(
            "cmis:ObjectId",
            Cardinality::Single,
            Updatability::ReadOnly,
        ))];
        let mut link = TypeDefinitionBase::new("R:cm:link", ObjectType::Relationship);
        link.parent_id = Some("relationship".into());

        let mut children = GetChildren::new("main", "root");
        children.kind = Some(TypesOfFileableObjects::Folders);
        children.max_items = Some(20);

        let relationships = GetRelationships {
            repository_id: "main".into(),
            object_id: "n1".into(),
            direction: Some(RelationshipDirection::Target),
            type_id: None,
            include_sub_relationship_types: Some(true),
            filter: Some("cmis:ObjectId".into()),
            include_allowable_actions: None,
            include_relationships: None,
            max_items: None,
            skip_count: None,
        };

        let samples: Vec<Message> = vec![
            // repository
            GetRepositoriesResponse {
                repositories: vec![RepositoryEntry {
                    repository_id: "main".into(),
                    repository_name: "Main Repository".into(),
                    repository_uri: Some("http://localhost/cmis".into()),
                    any: vec![],
                }],
            }
            .into(),
            GetTypesResponse {
                types: vec![
                    TypeDefinition::Document(DocumentTypeDefinition {
                        base: document,
                        versionable: Some(true),
                        content_stream_allowed: Some(ContentStreamAllowed::Allowed),
                    }),
                    TypeDefinition::Relationship(RelationshipTypeDefinition {
                        base: link,
                        allowed_source_types: vec!["document".into()],
                        allowed_target_types: vec!["document".into(), "folder".into()],
                    }),
                ],
                has_more_items: true,
            }
            .into(),
            // navigation
            children.into(),
            // object
            CreateFolder {
                repository_id: "main".into(),
                type_id: "folder".into(),
                properties: props,
                folder_id: "root".into(),
            }
            .into(),
            SetContentStream {
                repository_id: "main".into(),
                document_id: "n1".into(),
                overwrite_flag: Some(false),
                content_stream: ContentStream::inline("text/plain", b"draft".to_vec()),
            }
            .into(),
            // multi-filing
            AddObjectToFolder {
                repository_id: "main".into(),
                object_id: "n1".into(),
                folder_id: "f2".into(),
            }
            .into(),
            // discovery
            GetContentChangesResponse {
                changed_objects: vec![
                    ChangedObject {
                        object: obj.clone(),
                        change_type: ChangeType::Updated,
                    },
                    ChangedObject {
                        object: CmisObject::default(),
                        change_type: ChangeType::Deleted,
                    },
                ],
                change_token: Some("1024".into()),
            }
            .into(),
            // versioning
            GetAllVersionsResponse {
                objects: vec![obj.clone(), obj],
            }
            .into(),
            // relationship
            relationships.into(),
            // policy
            ApplyPolicy {
                repository_id: "main".into(),
                policy_id: "p1".into(),
                object_id: "n1".into(),
            }
            .into(),
        ];

        for orig in samples {
            let got = serialize(&orig).await;
            let back = deserialize(&got).await;
            assert_eq!(back, orig, "\n---XML---\n{got}\n");
        }
    }

    #[tokio::test]
    async fn accessors() {
        let msg: Message = GetChildren::new("main", "root").into();
        assert_eq!(msg.name(), "getChildren");
        assert!(!msg.is_response());
        assert_eq!(msg.repository_id(), Some("main"));

        let msg: Message = GetChildrenResponse {
            objects: vec![CmisObject::default()],
            has_more_items: false,
        }
        .into();
        assert!(msg.is_response());
        assert_eq!(msg.objects().len(), 1);
        assert_eq!(msg.repository_id(), None);
    }

    #[tokio::test]
    async fn unknown_root_is_skipped() {
        let src = r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/"/>
<cmism:deleteObject xmlns:cmism="http://docs.oasis-open.org/ns/cmis/messaging/200901">
  <cmism:repositoryId>main</cmism:repositoryId>
  <cmism:objectId>n1</cmism:objectId>
</cmism:deleteObject>"#;
        let got = deserialize(src).await;
        assert_eq!(got.name(), "deleteObject");
    }
}
