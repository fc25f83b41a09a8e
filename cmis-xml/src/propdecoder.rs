use std::pin::Pin;

use futures::Future;

use super::enums::{Cardinality, PropertyType, Updatability};
use super::error::ParsingError;
use super::proptypes::*;
use super::value::XmlValue;
use super::xml::{required, take_attribute, IRead, Ns, QRead, QReadAs, Reader};

// ---- Values ----

impl<K: PropertyKind> QReadAs<TypedProperty<K>> for TypedProperty<K> {
    async fn qread_as(
        xml: &mut Reader<impl IRead>,
        ns: Ns,
        name: &'static str,
    ) -> Result<Self, ParsingError> {
        let evt = xml.open(ns.urn(), name).await?;
        let mut other_attributes = xml.attributes(&evt)?;
        let pdid = take_attribute(&mut other_attributes, "pdid");
        let localname = take_attribute(&mut other_attributes, "localname");
        let displayname = take_attribute(&mut other_attributes, "displayname");
        let property_type = take_attribute(&mut other_attributes, "propertyType")
            .map(|v| PropertyType::from_xml(&v))
            .transpose()?;

        let mut values = Vec::new();
        loop {
            let mut dirty = false;
            xml.maybe_push_as(Ns::Cmis, "value", &mut values, &mut dirty)
                .await?;
            if !dirty && xml.skip_unknown().await? {
                break;
            }
        }
        xml.close().await?;

        let pdid = pdid.ok_or_else(|| {
            tracing::debug!(element = name, "property without pdid");
            ParsingError::MissingAttribute
        })?;
        Ok(TypedProperty {
            pdid,
            localname,
            displayname,
            property_type,
            values,
            other_attributes,
        })
    }
}

impl QRead<Property> for Property {
    async fn qread(xml: &mut Reader<impl IRead>) -> Result<Self, ParsingError> {
        macro_rules! try_kind {
            ($kind:ident, $variant:ident) => {
                match TypedProperty::<$kind>::qread_as(xml, Ns::Cmis, $kind::PROPERTY_TAG).await {
                    Err(ParsingError::Recoverable) => (),
                    otherwise => return otherwise.map(Property::$variant),
                }
            };
        }

        try_kind!(BooleanKind, Boolean);
        try_kind!(IdKind, Id);
        try_kind!(IntegerKind, Integer);
        try_kind!(DateTimeKind, DateTime);
        try_kind!(DecimalKind, Decimal);
        try_kind!(HtmlKind, Html);
        try_kind!(StringKind, String);
        try_kind!(UriKind, Uri);
        try_kind!(XmlKind, Xml);
        Err(ParsingError::Recoverable)
    }
}

impl QReadAs<Properties> for Properties {
    async fn qread_as(
        xml: &mut Reader<impl IRead>,
        ns: Ns,
        name: &'static str,
    ) -> Result<Self, ParsingError> {
        let evt = xml.open(ns.urn(), name).await?;
        let other_attributes = xml.attributes(&evt)?;
        let (mut properties, mut any) = (Vec::new(), Vec::new());
        loop {
            let mut dirty = false;
            xml.maybe_push::<Property>(&mut properties, &mut dirty)
                .await?;
            if !dirty && xml.capture_unknown(&mut any).await? {
                break;
            }
        }
        xml.close().await?;

        Ok(Properties {
            properties,
            any,
            other_attributes,
        })
    }
}

// ---- Definitions ----

impl<K: PropertyKind> QReadAs<Choice<K>> for Choice<K> {
    async fn qread_as(
        xml: &mut Reader<impl IRead>,
        ns: Ns,
        name: &'static str,
    ) -> Result<Self, ParsingError> {
        read_choice(xml, ns, name).await
    }
}

/// Choices nest, the boxed future breaks the recursion
fn read_choice<'a, K: PropertyKind, R: IRead + 'a>(
    xml: &'a mut Reader<R>,
    ns: Ns,
    name: &'static str,
) -> Pin<Box<dyn Future<Output = Result<Choice<K>, ParsingError>> + 'a>> {
    Box::pin(async move {
        let evt = xml.open(ns.urn(), name).await?;
        let mut other_attributes = xml.attributes(&evt)?;
        let display_name = take_attribute(&mut other_attributes, "displayName");

        let (mut values, mut choices) = (Vec::new(), Vec::<Choice<K>>::new());
        loop {
            let mut dirty = false;
            xml.maybe_push_as(Ns::Cmis, "value", &mut values, &mut dirty)
                .await?;
            xml.maybe_push_as(ns, name, &mut choices, &mut dirty)
                .await?;
            if !dirty && xml.skip_unknown().await? {
                break;
            }
        }
        xml.close().await?;

        Ok(Choice {
            display_name: display_name.ok_or(ParsingError::MissingAttribute)?,
            values,
            choices,
            other_attributes,
        })
    })
}

impl<K: PropertyKind> QReadAs<TypedPropertyDefinition<K>> for TypedPropertyDefinition<K> {
    async fn qread_as(
        xml: &mut Reader<impl IRead>,
        ns: Ns,
        name: &'static str,
    ) -> Result<Self, ParsingError> {
        xml.open(ns.urn(), name).await?;

        let mut id: Option<String> = None;
        let mut local_name: Option<String> = None;
        let mut local_namespace: Option<String> = None;
        let mut query_name: Option<String> = None;
        let mut display_name: Option<String> = None;
        let mut description: Option<String> = None;
        let mut property_type: Option<PropertyType> = None;
        let mut cardinality: Option<Cardinality> = None;
        let mut updatability: Option<Updatability> = None;
        let (mut inherited, mut required_flag, mut queryable, mut orderable, mut open_choice) =
            (None, None, None, None, None);
        let mut default_value: Option<TypedProperty<K>> = None;
        let mut choices: Vec<Choice<K>> = Vec::new();
        let mut facets = K::Facets::default();
        let mut any = Vec::new();

        loop {
            let mut dirty = false;
            xml.maybe_read_as(Ns::Cmis, "id", &mut id, &mut dirty).await?;
            xml.maybe_read_as(Ns::Cmis, "localName", &mut local_name, &mut dirty)
                .await?;
            xml.maybe_read_as(Ns::Cmis, "localNamespace", &mut local_namespace, &mut dirty)
                .await?;
            xml.maybe_read_as(Ns::Cmis, "queryName", &mut query_name, &mut dirty)
                .await?;
            xml.maybe_read_as(Ns::Cmis, "displayName", &mut display_name, &mut dirty)
                .await?;
            xml.maybe_read_as(Ns::Cmis, "description", &mut description, &mut dirty)
                .await?;
            xml.maybe_read_as(Ns::Cmis, "propertyType", &mut property_type, &mut dirty)
                .await?;
            xml.maybe_read_as(Ns::Cmis, "cardinality", &mut cardinality, &mut dirty)
                .await?;
            xml.maybe_read_as(Ns::Cmis, "updatability", &mut updatability, &mut dirty)
                .await?;
            xml.maybe_read_as::<bool>(Ns::Cmis, "inherited", &mut inherited, &mut dirty)
                .await?;
            xml.maybe_read_as::<bool>(Ns::Cmis, "required", &mut required_flag, &mut dirty)
                .await?;
            xml.maybe_read_as::<bool>(Ns::Cmis, "queryable", &mut queryable, &mut dirty)
                .await?;
            xml.maybe_read_as::<bool>(Ns::Cmis, "orderable", &mut orderable, &mut dirty)
                .await?;
            xml.maybe_read_as::<bool>(Ns::Cmis, "openChoice", &mut open_choice, &mut dirty)
                .await?;
            xml.maybe_read_as(Ns::Cmis, "defaultValue", &mut default_value, &mut dirty)
                .await?;
            xml.maybe_push_as(Ns::Cmis, K::CHOICE_TAG, &mut choices, &mut dirty)
                .await?;
            facets.maybe_read_facet(xml, &mut dirty).await?;
            if !dirty && xml.capture_unknown(&mut any).await? {
                break;
            }
        }
        xml.close().await?;

        Ok(TypedPropertyDefinition {
            id: required(id, "id")?,
            local_name,
            local_namespace,
            query_name,
            display_name,
            description,
            property_type,
            cardinality: required(cardinality, "cardinality")?,
            updatability: required(updatability, "updatability")?,
            inherited,
            required: required_flag,
            queryable,
            orderable,
            open_choice,
            default_value,
            choices,
            facets,
            any,
        })
    }
}

impl QRead<PropertyDefinition> for PropertyDefinition {
    async fn qread(xml: &mut Reader<impl IRead>) -> Result<Self, ParsingError> {
        macro_rules! try_kind {
            ($kind:ident, $variant:ident) => {
                match TypedPropertyDefinition::<$kind>::qread_as(xml, Ns::Cmis, $kind::DEFINITION_TAG)
                    .await
                {
                    Err(ParsingError::Recoverable) => (),
                    otherwise => return otherwise.map(PropertyDefinition::$variant),
                }
            };
        }

        try_kind!(BooleanKind, Boolean);
        try_kind!(IdKind, Id);
        try_kind!(IntegerKind, Integer);
        try_kind!(DateTimeKind, DateTime);
        try_kind!(DecimalKind, Decimal);
        try_kind!(HtmlKind, Html);
        try_kind!(StringKind, String);
        try_kind!(UriKind, Uri);
        try_kind!(XmlKind, Xml);
        Err(ParsingError::Recoverable)
    }
}

// ---- Facets ----

impl FacetsRead for NoFacets {
    async fn maybe_read_facet(
        &mut self,
        _xml: &mut Reader<impl IRead>,
        _dirty: &mut bool,
    ) -> Result<(), ParsingError> {
        Ok(())
    }
}

impl FacetsRead for IntegerFacets {
    async fn maybe_read_facet(
        &mut self,
        xml: &mut Reader<impl IRead>,
        dirty: &mut bool,
    ) -> Result<(), ParsingError> {
        xml.maybe_read_as(Ns::Cmis, "minValue", &mut self.min_value, dirty)
            .await?;
        xml.maybe_read_as(Ns::Cmis, "maxValue", &mut self.max_value, dirty)
            .await
    }
}

impl FacetsRead for DecimalFacets {
    async fn maybe_read_facet(
        &mut self,
        xml: &mut Reader<impl IRead>,
        dirty: &mut bool,
    ) -> Result<(), ParsingError> {
        xml.maybe_read_as(Ns::Cmis, "precision", &mut self.precision, dirty)
            .await
    }
}

impl FacetsRead for StringFacets {
    async fn maybe_read_facet(
        &mut self,
        xml: &mut Reader<impl IRead>,
        dirty: &mut bool,
    ) -> Result<(), ParsingError> {
        xml.maybe_read_as(Ns::Cmis, "maxLength", &mut self.max_length, dirty)
            .await
    }
}

impl FacetsRead for XmlFacets {
    async fn maybe_read_facet(
        &mut self,
        xml: &mut Reader<impl IRead>,
        dirty: &mut bool,
    ) -> Result<(), ParsingError> {
        xml.maybe_read_as(Ns::Cmis, "schemaURI", &mut self.schema_uri, dirty)
            .await?;
        xml.maybe_read_as(Ns::Cmis, "encoding", &mut self.encoding, dirty)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::{AnyNode, AnyXml};
    use chrono::{FixedOffset, TimeZone};
    use quick_xml::reader::NsReader;

    #[tokio::test]
    async fn property_any_order_and_foreign_attributes() {
        let src = r#"<?xml version="1.0" encoding="utf-8" ?>
<rando/>
<garbage><old/></garbage>
<cmis:propertyDateTime xmlns:cmis="http://docs.oasis-open.org/ns/cmis/core/200901"
    xmlns:al="http://www.alfresco.org" al:mapped="cm:modified"
    displayname="Last Modified" pdid="cmis:LastModificationDate">
    <al:note>ignored</al:note>
    <cmis:value>2009-03-17T10:30:00+02:00</cmis:value>
    <cmis:value>2009-03-18T10:30:00Z</cmis:value>
</cmis:propertyDateTime>
"#;

        let mut rdr = Reader::new(NsReader::from_reader(src.as_bytes()))
            .await
            .unwrap();
        let got = rdr.find::<Property>().await.unwrap();

        let Property::DateTime(prop) = got else {
            panic!("wrong property kind")
        };
        assert_eq!(prop.pdid, "cmis:LastModificationDate");
        assert_eq!(prop.displayname.as_deref(), Some("Last Modified"));
        assert_eq!(prop.property_type, None);
        assert_eq!(prop.property_type(), PropertyType::DateTime);
        assert_eq!(
            prop.values,
            vec![
                FixedOffset::east_opt(2 * 3600)
                    .unwrap()
                    .with_ymd_and_hms(2009, 3, 17, 10, 30, 0)
                    .unwrap(),
                FixedOffset::east_opt(0)
                    .unwrap()
                    .with_ymd_and_hms(2009, 3, 18, 10, 30, 0)
                    .unwrap(),
            ]
        );
        assert_eq!(prop.other_attributes.len(), 1);
        assert_eq!(prop.other_attributes[0].name, "al:mapped");
        assert_eq!(
            prop.other_attributes[0].namespace.as_deref(),
            Some("http://www.alfresco.org")
        );
    }

    #[tokio::test]
    async fn nil_entries_in_value_list() {
        let src = r#"<cmis:propertyInteger xmlns:cmis="http://docs.oasis-open.org/ns/cmis/core/200901"
    xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" pdid="x:sizes">
    <cmis:value>1</cmis:value>
    <cmis:value xsi:nil="true"/>
    <cmis:value xsi:nil="true"></cmis:value>
    <cmis:value>3</cmis:value>
</cmis:propertyInteger>"#;
        let mut rdr = Reader::new(NsReader::from_reader(src.as_bytes()))
            .await
            .unwrap();
        let Property::Integer(prop) = rdr.find::<Property>().await.unwrap() else {
            panic!("wrong property kind")
        };
        assert_eq!(prop.values, vec![1, 3]);
    }

    #[tokio::test]
    async fn property_without_pdid_fails() {
        let src = r#"<cmis:propertyId xmlns:cmis="http://docs.oasis-open.org/ns/cmis/core/200901"><cmis:value>x</cmis:value></cmis:propertyId>"#;
        let mut rdr = Reader::new(NsReader::from_reader(src.as_bytes()))
            .await
            .unwrap();
        assert!(matches!(
            rdr.find::<Property>().await,
            Err(ParsingError::MissingAttribute)
        ));
    }

    #[tokio::test]
    async fn bad_property_type_is_illegal() {
        let src = r#"<cmis:propertyId xmlns:cmis="http://docs.oasis-open.org/ns/cmis/core/200901" pdid="a" propertyType="guid"/>"#;
        let mut rdr = Reader::new(NsReader::from_reader(src.as_bytes()))
            .await
            .unwrap();
        assert!(matches!(
            rdr.find::<Property>().await,
            Err(ParsingError::IllegalArgument(_))
        ));
    }

    #[tokio::test]
    async fn properties_with_extension() {
        let src = r#"<cmism:properties xmlns:cmis="http://docs.oasis-open.org/ns/cmis/core/200901"
    xmlns:cmism="http://docs.oasis-open.org/ns/cmis/messaging/200901">
    <cmis:propertyString pdid="cmis:Name"><cmis:value>a &amp; b.txt</cmis:value></cmis:propertyString>
    <cmis:propertyXml pdid="x:meta"><cmis:value><m:doc xmlns:m="urn:m"><m:k>v</m:k></m:doc></cmis:value></cmis:propertyXml>
    <ext:aspects xmlns:ext="urn:example:aspects"><ext:aspect name="titled"/></ext:aspects>
    <cmis:propertyBoolean pdid="cmis:IsMajorVersion"/>
</cmism:properties>"#;

        let mut rdr = Reader::new(NsReader::from_reader(src.as_bytes()))
            .await
            .unwrap();
        let got = Properties::qread_as(&mut rdr, Ns::Msg, "properties")
            .await
            .unwrap();

        assert_eq!(got.properties.len(), 3);
        assert_eq!(got.properties[2].pdid(), "cmis:IsMajorVersion");
        match &got.properties[0] {
            Property::String(p) => assert_eq!(p.values, vec!["a & b.txt".to_string()]),
            _ => panic!("expected a string property"),
        };
        match &got.properties[1] {
            Property::Xml(p) => {
                let AnyXml(nodes) = &p.values[0];
                let AnyNode::Element(doc) = &nodes[0] else {
                    panic!("expected an element")
                };
                assert_eq!(doc.local, "doc");
                assert_eq!(doc.namespace.as_deref(), Some("urn:m"));
                assert_eq!(doc.children.len(), 1);
            }
            _ => panic!("expected an xml property"),
        };

        assert_eq!(got.any.len(), 1);
        assert_eq!(got.any[0].local, "aspects");
        let AnyNode::Element(aspect) = &got.any[0].children[0] else {
            panic!("expected a nested element")
        };
        assert_eq!(aspect.attributes[0].name, "name");
        assert_eq!(aspect.attributes[0].value, "titled");
    }

    #[tokio::test]
    async fn integer_definition_with_nil_and_facets() {
        let src = r#"<?xml version="1.0" encoding="utf-8" ?>
<cmis:propertyIntegerDefinition xmlns:cmis="http://docs.oasis-open.org/ns/cmis/core/200901"
    xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
    <cmis:maxValue>10</cmis:maxValue>
    <cmis:id>x:rating</cmis:id>
    <cmis:description xsi:nil="true"/>
    <cmis:cardinality>single</cmis:cardinality>
    <cmis:updatability>readonly</cmis:updatability>
    <cmis:choiceInteger displayName="low"><cmis:value>1</cmis:value></cmis:choiceInteger>
    <cmis:minValue>0</cmis:minValue>
</cmis:propertyIntegerDefinition>"#;

        let mut rdr = Reader::new(NsReader::from_reader(src.as_bytes()))
            .await
            .unwrap();
        let got = rdr.find::<PropertyDefinition>().await.unwrap();

        let PropertyDefinition::Integer(def) = got else {
            panic!("wrong definition kind")
        };
        assert_eq!(def.id, "x:rating");
        assert_eq!(def.description, None);
        assert_eq!(def.cardinality, Cardinality::Single);
        assert_eq!(def.updatability, Updatability::ReadOnly);
        assert_eq!(
            def.facets,
            IntegerFacets {
                min_value: Some(0),
                max_value: Some(10)
            }
        );
        assert_eq!(def.choices, vec![Choice::new("low", vec![1])]);
        assert_eq!(def.property_type(), PropertyType::Integer);
    }

    #[tokio::test]
    async fn definition_missing_cardinality() {
        let src = r#"<cmis:propertyIdDefinition xmlns:cmis="http://docs.oasis-open.org/ns/cmis/core/200901">
    <cmis:id>cmis:ObjectId</cmis:id>
    <cmis:updatability>readonly</cmis:updatability>
</cmis:propertyIdDefinition>"#;

        let mut rdr = Reader::new(NsReader::from_reader(src.as_bytes()))
            .await
            .unwrap();
        assert!(matches!(
            rdr.find::<PropertyDefinition>().await,
            Err(ParsingError::MissingChild)
        ));
    }
}
