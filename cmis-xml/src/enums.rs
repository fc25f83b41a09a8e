//! Closed CMIS enumerations.
//!
//! Every enumeration converts to and from its wire string. An unknown
//! string is an error, there is no catch-all variant.

use std::str::FromStr;

use super::error::{IllegalArgument, ParsingError};
use super::value::{value_node, XmlValue};

macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident ($kind:literal) { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Every constant, in declaration order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn value(&self) -> &'static str {
                match self {
                    $(Self::$variant => $wire),+
                }
            }

            pub fn from_value(v: &str) -> Result<Self, IllegalArgument> {
                match v {
                    $($wire => Ok(Self::$variant),)+
                    _ => Err(IllegalArgument {
                        kind: $kind,
                        value: v.to_string(),
                    }),
                }
            }
        }

        impl FromStr for $name {
            type Err = IllegalArgument;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_value(s)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.value())
            }
        }

        impl XmlValue for $name {
            fn to_xml(&self) -> String {
                self.value().to_string()
            }
            fn from_xml(txt: &str) -> Result<Self, ParsingError> {
                Ok(Self::from_value(txt.trim())?)
            }
        }

        value_node!($name);
    };
}

wire_enum! {
    /// Data type of a property
    PropertyType ("propertyType") {
        Boolean => "boolean",
        Id => "id",
        Integer => "integer",
        DateTime => "datetime",
        Decimal => "decimal",
        Html => "html",
        String => "string",
        Uri => "uri",
        Xml => "xml",
    }
}

wire_enum! {
    Cardinality ("cardinality") {
        Single => "single",
        Multi => "multi",
    }
}

wire_enum! {
    Updatability ("updatability") {
        ReadOnly => "readonly",
        ReadWrite => "readwrite",
        WhenCheckedOut => "whencheckedout",
        OnCreate => "oncreate",
    }
}

wire_enum! {
    ContentStreamAllowed ("contentStreamAllowed") {
        NotAllowed => "notallowed",
        Allowed => "allowed",
        Required => "required",
    }
}

wire_enum! {
    DecimalPrecision ("decimalPrecision") {
        Bits32 => "32",
        Bits64 => "64",
    }
}

wire_enum! {
    /// Base type of an object, also used as `baseTypeId`
    ObjectType ("objectType") {
        Document => "document",
        Folder => "folder",
        Relationship => "relationship",
        Policy => "policy",
    }
}

wire_enum! {
    CapabilityQuery ("capabilityQuery") {
        None => "none",
        MetadataOnly => "metadataonly",
        FullTextOnly => "fulltextonly",
        Both => "both",
    }
}

wire_enum! {
    CapabilityJoin ("capabilityJoin") {
        NoJoin => "nojoin",
        InnerOnly => "inneronly",
        InnerAndOuter => "innerandouter",
    }
}

wire_enum! {
    CapabilityFullText ("capabilityFullText") {
        None => "none",
        FullTextOnly => "fulltextonly",
        FullTextAndStructured => "fulltextandstructured",
    }
}

wire_enum! {
    CapabilityChanges ("capabilityChanges") {
        None => "none",
        ObjectIdsOnly => "objectidsonly",
        Properties => "properties",
        All => "all",
    }
}

wire_enum! {
    CapabilityContentStreamUpdates ("capabilityContentStreamUpdates") {
        Anytime => "anytime",
        PwcOnly => "pwconly",
        None => "none",
    }
}

wire_enum! {
    CapabilityRendition ("capabilityRendition") {
        None => "none",
        Read => "read",
    }
}

wire_enum! {
    CapabilityAcl ("capabilityACL") {
        None => "none",
        Discover => "discover",
        Manage => "manage",
    }
}

wire_enum! {
    AclPropagation ("ACLPropagation") {
        RepositoryDetermined => "repositorydetermined",
        ObjectOnly => "objectonly",
        Propagate => "propagate",
    }
}

wire_enum! {
    /// How a listed repository relates to the one answering
    RepositoryRelationship ("repositoryRelationship") {
        Itself => "self",
        Replica => "replica",
        Peer => "peer",
        Parent => "parent",
        Child => "child",
        Archive => "archive",
    }
}

wire_enum! {
    TypesOfFileableObjects ("typesOfFileableObjects") {
        Documents => "documents",
        Folders => "folders",
        Policies => "policies",
        Any => "any",
    }
}

wire_enum! {
    VersioningState ("versioningState") {
        CheckedOut => "checkedout",
        Minor => "minor",
        Major => "major",
    }
}

wire_enum! {
    ReturnVersion ("returnVersion") {
        This => "this",
        Latest => "latest",
        LatestMajor => "latestmajor",
    }
}

wire_enum! {
    UnfileNonfolderObjects ("unfileNonfolderObjects") {
        Unfile => "unfile",
        DeleteSingleFiled => "deletesinglefiled",
        Delete => "delete",
    }
}

wire_enum! {
    RelationshipDirection ("relationshipDirection") {
        Source => "source",
        Target => "target",
        Both => "both",
    }
}

wire_enum! {
    IncludeRelationships ("includeRelationships") {
        None => "none",
        Source => "source",
        Target => "target",
        Both => "both",
    }
}

wire_enum! {
    ChangeType ("changeType") {
        Created => "created",
        Updated => "updated",
        Deleted => "deleted",
        Security => "security",
    }
}

wire_enum! {
    BasicPermissions ("basicPermissions") {
        Read => "cmis:read",
        Write => "cmis:write",
        All => "cmis:all",
    }
}

wire_enum! {
    /// Named operations an object may currently allow, in schema order
    AllowableAction ("allowableAction") {
        CanDelete => "canDelete",
        CanUpdateProperties => "canUpdateProperties",
        CanGetProperties => "canGetProperties",
        CanGetRelationships => "canGetRelationships",
        CanGetParents => "canGetParents",
        CanGetFolderParent => "canGetFolderParent",
        CanGetDescendants => "canGetDescendants",
        CanMove => "canMove",
        CanDeleteVersion => "canDeleteVersion",
        CanDeleteContent => "canDeleteContent",
        CanCheckout => "canCheckout",
        CanCancelCheckout => "canCancelCheckout",
        CanCheckin => "canCheckin",
        CanSetContent => "canSetContent",
        CanGetAllVersions => "canGetAllVersions",
        CanAddToFolder => "canAddToFolder",
        CanRemoveFromFolder => "canRemoveFromFolder",
        CanViewContent => "canViewContent",
        CanAddPolicy => "canAddPolicy",
        CanGetAppliedPolicies => "canGetAppliedPolicies",
        CanRemovePolicy => "canRemovePolicy",
        CanGetChildren => "canGetChildren",
        CanCreateDocument => "canCreateDocument",
        CanCreateFolder => "canCreateFolder",
        CanCreateRelationship => "canCreateRelationship",
        CanCreatePolicy => "canCreatePolicy",
        CanDeleteTree => "canDeleteTree",
    }
}

wire_enum! {
    /// Fault categories carried by `cmisFault`
    ServiceException ("serviceException") {
        Constraint => "constraint",
        ContentAlreadyExists => "contentAlreadyExists",
        FilterNotValid => "filterNotValid",
        InvalidArgument => "invalidArgument",
        NotSupported => "notSupported",
        ObjectNotFound => "objectNotFound",
        PermissionDenied => "permissionDenied",
        Runtime => "runtime",
        Storage => "storage",
        StreamNotSupported => "streamNotSupported",
        UpdateConflict => "updateConflict",
        Versioning => "versioning",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! check_total {
        ($($name:ident),+) => {
            $(
            for v in $name::ALL.iter() {
                assert_eq!($name::from_value(v.value()).unwrap(), *v);
                assert_eq!(v.to_string().parse::<$name>().unwrap(), *v);
            }
            assert!($name::from_value("bogus").is_err());
            )+
        };
    }

    #[test]
    fn lookup_is_total_over_declared_values() {
        check_total!(
            PropertyType,
            Cardinality,
            Updatability,
            ContentStreamAllowed,
            DecimalPrecision,
            ObjectType,
            CapabilityQuery,
            CapabilityJoin,
            CapabilityFullText,
            CapabilityChanges,
            CapabilityContentStreamUpdates,
            CapabilityRendition,
            CapabilityAcl,
            AclPropagation,
            RepositoryRelationship,
            TypesOfFileableObjects,
            VersioningState,
            ReturnVersion,
            UnfileNonfolderObjects,
            RelationshipDirection,
            IncludeRelationships,
            ChangeType,
            BasicPermissions,
            AllowableAction,
            ServiceException
        );
    }

    #[test]
    fn unknown_value_is_illegal() {
        assert_eq!(
            PropertyType::from_value("Boolean"),
            Err(IllegalArgument {
                kind: "propertyType",
                value: "Boolean".into()
            })
        );
        assert!(matches!(
            VersioningState::from_xml("draft"),
            Err(ParsingError::IllegalArgument(_))
        ));
        assert_eq!(
            AllowableAction::from_xml(" canCheckout ").unwrap(),
            AllowableAction::CanCheckout
        );
        assert_eq!(BasicPermissions::All.value(), "cmis:all");
        assert_eq!(AllowableAction::ALL.len(), 27);
    }
}
