use chrono::{DateTime, FixedOffset};
use futures::Future;

use super::enums::{Cardinality, DecimalPrecision, PropertyType, Updatability};
use super::error::ParsingError;
use super::value::Decimal;
use super::xml;

/// One of the nine property data types.
///
/// A kind is a marker: it carries the Rust type of the values, the
/// extra facets of its definitions and the element names used on the wire.
pub trait PropertyKind: std::fmt::Debug + Clone + PartialEq + Send + Sync + 'static {
    type Value: xml::TypeNode<Self::Value>;
    type Facets: Facets;
    const PROPERTY_TYPE: PropertyType;
    const PROPERTY_TAG: &'static str;
    const DEFINITION_TAG: &'static str;
    const CHOICE_TAG: &'static str;
}

/// Kind specific children of a property definition
pub trait Facets:
    xml::QWrite + FacetsRead + Default + std::fmt::Debug + PartialEq + Clone + Send + Sync
{
}
impl<T: xml::QWrite + FacetsRead + Default + std::fmt::Debug + PartialEq + Clone + Send + Sync>
    Facets for T
{
}

pub trait FacetsRead {
    /// Try to consume one facet element at the cursor
    fn maybe_read_facet(
        &mut self,
        xml: &mut xml::Reader<impl xml::IRead>,
        dirty: &mut bool,
    ) -> impl Future<Output = Result<(), ParsingError>>;
}

macro_rules! property_kind {
    ($kind:ident, $value:ty, $facets:ty, $ptype:ident, $tag:literal, $def:literal, $choice:literal) => {
        #[derive(Debug, PartialEq, Clone)]
        pub struct $kind;
        impl PropertyKind for $kind {
            type Value = $value;
            type Facets = $facets;
            const PROPERTY_TYPE: PropertyType = PropertyType::$ptype;
            const PROPERTY_TAG: &'static str = $tag;
            const DEFINITION_TAG: &'static str = $def;
            const CHOICE_TAG: &'static str = $choice;
        }
    };
}

property_kind!(BooleanKind, bool, NoFacets, Boolean, "propertyBoolean", "propertyBooleanDefinition", "choiceBoolean");
property_kind!(IdKind, String, NoFacets, Id, "propertyId", "propertyIdDefinition", "choiceId");
property_kind!(IntegerKind, i64, IntegerFacets, Integer, "propertyInteger", "propertyIntegerDefinition", "choiceInteger");
property_kind!(DateTimeKind, DateTime<FixedOffset>, NoFacets, DateTime, "propertyDateTime", "propertyDateTimeDefinition", "choiceDateTime");
property_kind!(DecimalKind, Decimal, DecimalFacets, Decimal, "propertyDecimal", "propertyDecimalDefinition", "choiceDecimal");
property_kind!(HtmlKind, xml::AnyXml, NoFacets, Html, "propertyHtml", "propertyHtmlDefinition", "choiceHtml");
property_kind!(StringKind, String, StringFacets, String, "propertyString", "propertyStringDefinition", "choiceString");
property_kind!(UriKind, String, NoFacets, Uri, "propertyUri", "propertyUriDefinition", "choiceUri");
property_kind!(XmlKind, xml::AnyXml, XmlFacets, Xml, "propertyXml", "propertyXmlDefinition", "choiceXml");

// ---- Facets ----

#[derive(Debug, PartialEq, Clone, Default)]
pub struct NoFacets;

#[derive(Debug, PartialEq, Clone, Default)]
pub struct IntegerFacets {
    pub min_value: Option<i64>,
    pub max_value: Option<i64>,
}

#[derive(Debug, PartialEq, Clone, Default)]
pub struct DecimalFacets {
    pub precision: Option<DecimalPrecision>,
}

#[derive(Debug, PartialEq, Clone, Default)]
pub struct StringFacets {
    pub max_length: Option<i64>,
}

#[derive(Debug, PartialEq, Clone, Default)]
pub struct XmlFacets {
    pub schema_uri: Option<String>,
    pub encoding: Option<String>,
}

// ---- Property values ----

/// A named property carrying zero or more values of kind `K`
///
/// ```xml
/// <cmis:propertyString pdid="cmis:Name" localname="name">
///     <cmis:value>report.pdf</cmis:value>
/// </cmis:propertyString>
/// ```
#[derive(Debug, PartialEq, Clone)]
pub struct TypedProperty<K: PropertyKind> {
    pub pdid: String,
    pub localname: Option<String>,
    pub displayname: Option<String>,
    /// Use `property_type()` to get the effective type
    pub property_type: Option<PropertyType>,
    pub values: Vec<K::Value>,
    pub other_attributes: Vec<xml::ExtAttribute>,
}
impl<K: PropertyKind> TypedProperty<K> {
    pub fn new(pdid: impl Into<String>) -> Self {
        Self {
            pdid: pdid.into(),
            localname: None,
            displayname: None,
            property_type: None,
            values: vec![],
            other_attributes: vec![],
        }
    }

    pub fn with_values(pdid: impl Into<String>, values: Vec<K::Value>) -> Self {
        Self {
            values,
            ..Self::new(pdid)
        }
    }

    pub fn property_type(&self) -> PropertyType {
        self.property_type.unwrap_or(K::PROPERTY_TYPE)
    }
}

pub type PropertyBoolean = TypedProperty<BooleanKind>;
pub type PropertyId = TypedProperty<IdKind>;
pub type PropertyInteger = TypedProperty<IntegerKind>;
pub type PropertyDateTime = TypedProperty<DateTimeKind>;
pub type PropertyDecimal = TypedProperty<DecimalKind>;
pub type PropertyHtml = TypedProperty<HtmlKind>;
pub type PropertyString = TypedProperty<StringKind>;
pub type PropertyUri = TypedProperty<UriKind>;
pub type PropertyXml = TypedProperty<XmlKind>;

/// Any member of the `cmis:property` substitution group
#[derive(Debug, PartialEq, Clone)]
pub enum Property {
    Boolean(PropertyBoolean),
    Id(PropertyId),
    Integer(PropertyInteger),
    DateTime(PropertyDateTime),
    Decimal(PropertyDecimal),
    Html(PropertyHtml),
    String(PropertyString),
    Uri(PropertyUri),
    Xml(PropertyXml),
}
impl Property {
    pub fn pdid(&self) -> &str {
        match self {
            Self::Boolean(p) => &p.pdid,
            Self::Id(p) => &p.pdid,
            Self::Integer(p) => &p.pdid,
            Self::DateTime(p) => &p.pdid,
            Self::Decimal(p) => &p.pdid,
            Self::Html(p) => &p.pdid,
            Self::String(p) => &p.pdid,
            Self::Uri(p) => &p.pdid,
            Self::Xml(p) => &p.pdid,
        }
    }

    pub fn property_type(&self) -> PropertyType {
        match self {
            Self::Boolean(p) => p.property_type(),
            Self::Id(p) => p.property_type(),
            Self::Integer(p) => p.property_type(),
            Self::DateTime(p) => p.property_type(),
            Self::Decimal(p) => p.property_type(),
            Self::Html(p) => p.property_type(),
            Self::String(p) => p.property_type(),
            Self::Uri(p) => p.property_type(),
            Self::Xml(p) => p.property_type(),
        }
    }

    pub fn value_count(&self) -> usize {
        match self {
            Self::Boolean(p) => p.values.len(),
            Self::Id(p) => p.values.len(),
            Self::Integer(p) => p.values.len(),
            Self::DateTime(p) => p.values.len(),
            Self::Decimal(p) => p.values.len(),
            Self::Html(p) => p.values.len(),
            Self::String(p) => p.values.len(),
            Self::Uri(p) => p.values.len(),
            Self::Xml(p) => p.values.len(),
        }
    }
}

/// `cmisPropertiesType`
#[derive(Debug, PartialEq, Clone, Default)]
pub struct Properties {
    pub properties: Vec<Property>,
    pub any: Vec<xml::AnyElement>,
    pub other_attributes: Vec<xml::ExtAttribute>,
}
impl Properties {
    pub fn get(&self, pdid: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.pdid() == pdid)
    }

    /// First id value of the given property, handy for `cmis:ObjectId`
    pub fn id_value(&self, pdid: &str) -> Option<&str> {
        match self.get(pdid)? {
            Property::Id(p) => p.values.first().map(String::as_str),
            Property::String(p) => p.values.first().map(String::as_str),
            _ => None,
        }
    }
}

// ---- Property definitions ----

/// A selectable value, possibly grouping nested choices
#[derive(Debug, PartialEq, Clone)]
pub struct Choice<K: PropertyKind> {
    pub display_name: String,
    pub values: Vec<K::Value>,
    pub choices: Vec<Choice<K>>,
    pub other_attributes: Vec<xml::ExtAttribute>,
}
impl<K: PropertyKind> Choice<K> {
    pub fn new(display_name: impl Into<String>, values: Vec<K::Value>) -> Self {
        Self {
            display_name: display_name.into(),
            values,
            choices: vec![],
            other_attributes: vec![],
        }
    }
}

/// `cmisProperty{Kind}DefinitionType`
#[derive(Debug, PartialEq, Clone)]
pub struct TypedPropertyDefinition<K: PropertyKind> {
    pub id: String,
    pub local_name: Option<String>,
    pub local_namespace: Option<String>,
    pub query_name: Option<String>,
    pub display_name: Option<String>,
    pub description: Option<String>,
    /// Use `property_type()` to get the effective type
    pub property_type: Option<PropertyType>,
    pub cardinality: Cardinality,
    pub updatability: Updatability,
    pub inherited: Option<bool>,
    pub required: Option<bool>,
    pub queryable: Option<bool>,
    pub orderable: Option<bool>,
    pub open_choice: Option<bool>,
    pub default_value: Option<TypedProperty<K>>,
    pub choices: Vec<Choice<K>>,
    pub facets: K::Facets,
    pub any: Vec<xml::AnyElement>,
}
impl<K: PropertyKind> TypedPropertyDefinition<K> {
    pub fn new(id: impl Into<String>, cardinality: Cardinality, updatability: Updatability) -> Self {
        Self {
            id: id.into(),
            local_name: None,
            local_namespace: None,
            query_name: None,
            display_name: None,
            description: None,
            property_type: None,
            cardinality,
            updatability,
            inherited: None,
            required: None,
            queryable: None,
            orderable: None,
            open_choice: None,
            default_value: None,
            choices: vec![],
            facets: K::Facets::default(),
            any: vec![],
        }
    }

    pub fn property_type(&self) -> PropertyType {
        self.property_type.unwrap_or(K::PROPERTY_TYPE)
    }
}

pub type PropertyBooleanDefinition = TypedPropertyDefinition<BooleanKind>;
pub type PropertyIdDefinition = TypedPropertyDefinition<IdKind>;
pub type PropertyIntegerDefinition = TypedPropertyDefinition<IntegerKind>;
pub type PropertyDateTimeDefinition = TypedPropertyDefinition<DateTimeKind>;
pub type PropertyDecimalDefinition = TypedPropertyDefinition<DecimalKind>;
pub type PropertyHtmlDefinition = TypedPropertyDefinition<HtmlKind>;
pub type PropertyStringDefinition = TypedPropertyDefinition<StringKind>;
pub type PropertyUriDefinition = TypedPropertyDefinition<UriKind>;
pub type PropertyXmlDefinition = TypedPropertyDefinition<XmlKind>;

#[derive(Debug, PartialEq, Clone)]
pub enum PropertyDefinition {
    Boolean(PropertyBooleanDefinition),
    Id(PropertyIdDefinition),
    Integer(PropertyIntegerDefinition),
    DateTime(PropertyDateTimeDefinition),
    Decimal(PropertyDecimalDefinition),
    Html(PropertyHtmlDefinition),
    String(PropertyStringDefinition),
    Uri(PropertyUriDefinition),
    Xml(PropertyXmlDefinition),
}
impl PropertyDefinition {
    pub fn id(&self) -> &str {
        match self {
            Self::Boolean(d) => &d.id,
            Self::Id(d) => &d.id,
            Self::Integer(d) => &d.id,
            Self::DateTime(d) => &d.id,
            Self::Decimal(d) => &d.id,
            Self::Html(d) => &d.id,
            Self::String(d) => &d.id,
            Self::Uri(d) => &d.id,
            Self::Xml(d) => &d.id,
        }
    }

    pub fn property_type(&self) -> PropertyType {
        match self {
            Self::Boolean(d) => d.property_type(),
            Self::Id(d) => d.property_type(),
            Self::Integer(d) => d.property_type(),
            Self::DateTime(d) => d.property_type(),
            Self::Decimal(d) => d.property_type(),
            Self::Html(d) => d.property_type(),
            Self::String(d) => d.property_type(),
            Self::Uri(d) => d.property_type(),
            Self::Xml(d) => d.property_type(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_property_type_defaults_to_kind() {
        let mut prop = PropertyDecimal::new("cmis:price");
        assert_eq!(prop.property_type(), PropertyType::Decimal);
        assert_eq!(prop.property_type, None);

        prop.property_type = Some(PropertyType::String);
        assert_eq!(prop.property_type(), PropertyType::String);

        let def = PropertyHtmlDefinition::new("x:body", Cardinality::Single, Updatability::ReadWrite);
        assert_eq!(def.property_type(), PropertyType::Html);
        assert_eq!(def.property_type, None);
    }

    #[test]
    fn lookup_by_pdid() {
        let props = Properties {
            properties: vec![
                Property::Id(PropertyId::with_values("cmis:ObjectId", vec!["n1".into()])),
                Property::Boolean(PropertyBoolean::with_values("cmis:IsLatestVersion", vec![true])),
            ],
            ..Properties::default()
        };
        assert_eq!(props.id_value("cmis:ObjectId"), Some("n1"));
        assert_eq!(
            props.get("cmis:IsLatestVersion").map(Property::property_type),
            Some(PropertyType::Boolean)
        );
        assert!(props.get("cmis:Name").is_none());
        assert!(Properties::default().properties.is_empty());
    }
}
