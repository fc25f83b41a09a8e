use std::pin::Pin;

use futures::Future;
use quick_xml::events::Event;
use quick_xml::Error as QError;

use super::proptypes::*;
use super::xml::{push_ext_attributes, IWrite, Ns, QWrite, QWriteAs, Writer};

// ---- Values ----

impl<K: PropertyKind> QWriteAs for TypedProperty<K> {
    async fn qwrite_as(
        &self,
        xml: &mut Writer<impl IWrite>,
        ns: Ns,
        name: &'static str,
    ) -> Result<(), QError> {
        let mut start = xml.create_element(ns, name);
        start.push_attribute(("pdid", self.pdid.as_str()));
        if let Some(localname) = &self.localname {
            start.push_attribute(("localname", localname.as_str()));
        }
        if let Some(displayname) = &self.displayname {
            start.push_attribute(("displayname", displayname.as_str()));
        }
        if let Some(ptype) = &self.property_type {
            start.push_attribute(("propertyType", ptype.value()));
        }
        push_ext_attributes(&mut start, &self.other_attributes);

        if self.values.is_empty() {
            return xml.q.write_event_async(Event::Empty(start)).await;
        }

        let end = start.to_end().into_owned();
        xml.q.write_event_async(Event::Start(start)).await?;
        self.values.qwrite_as(xml, Ns::Cmis, "value").await?;
        xml.q.write_event_async(Event::End(end)).await
    }
}

impl QWrite for Property {
    async fn qwrite(&self, xml: &mut Writer<impl IWrite>) -> Result<(), QError> {
        match self {
            Self::Boolean(p) => p.qwrite_as(xml, Ns::Cmis, BooleanKind::PROPERTY_TAG).await,
            Self::Id(p) => p.qwrite_as(xml, Ns::Cmis, IdKind::PROPERTY_TAG).await,
            Self::Integer(p) => p.qwrite_as(xml, Ns::Cmis, IntegerKind::PROPERTY_TAG).await,
            Self::DateTime(p) => p.qwrite_as(xml, Ns::Cmis, DateTimeKind::PROPERTY_TAG).await,
            Self::Decimal(p) => p.qwrite_as(xml, Ns::Cmis, DecimalKind::PROPERTY_TAG).await,
            Self::Html(p) => p.qwrite_as(xml, Ns::Cmis, HtmlKind::PROPERTY_TAG).await,
            Self::String(p) => p.qwrite_as(xml, Ns::Cmis, StringKind::PROPERTY_TAG).await,
            Self::Uri(p) => p.qwrite_as(xml, Ns::Cmis, UriKind::PROPERTY_TAG).await,
            Self::Xml(p) => p.qwrite_as(xml, Ns::Cmis, XmlKind::PROPERTY_TAG).await,
        }
    }
}

impl QWriteAs for Properties {
    async fn qwrite_as(
        &self,
        xml: &mut Writer<impl IWrite>,
        ns: Ns,
        name: &'static str,
    ) -> Result<(), QError> {
        let mut start = xml.create_element(ns, name);
        push_ext_attributes(&mut start, &self.other_attributes);

        if self.properties.is_empty() && self.any.is_empty() {
            return xml.q.write_event_async(Event::Empty(start)).await;
        }

        let end = start.to_end().into_owned();
        xml.q.write_event_async(Event::Start(start)).await?;
        for prop in self.properties.iter() {
            prop.qwrite(xml).await?;
        }
        xml.write_any_elements(&self.any).await?;
        xml.q.write_event_async(Event::End(end)).await
    }
}

// ---- Definitions ----

impl<K: PropertyKind> QWriteAs for Choice<K> {
    async fn qwrite_as(
        &self,
        xml: &mut Writer<impl IWrite>,
        ns: Ns,
        name: &'static str,
    ) -> Result<(), QError> {
        write_choice(self, xml, ns, name).await
    }
}

/// Choices nest, the boxed future breaks the recursion
fn write_choice<'a, K: PropertyKind, W: IWrite + 'a>(
    choice: &'a Choice<K>,
    xml: &'a mut Writer<W>,
    ns: Ns,
    name: &'static str,
) -> Pin<Box<dyn Future<Output = Result<(), QError>> + Send + 'a>> {
    Box::pin(async move {
        let mut start = xml.create_element(ns, name);
        start.push_attribute(("displayName", choice.display_name.as_str()));
        push_ext_attributes(&mut start, &choice.other_attributes);

        if choice.values.is_empty() && choice.choices.is_empty() {
            return xml.q.write_event_async(Event::Empty(start)).await;
        }

        let end = start.to_end().into_owned();
        xml.q.write_event_async(Event::Start(start)).await?;
        choice.values.qwrite_as(xml, Ns::Cmis, "value").await?;
        for sub in choice.choices.iter() {
            write_choice(sub, xml, ns, name).await?;
        }
        xml.q.write_event_async(Event::End(end)).await
    })
}

impl<K: PropertyKind> QWriteAs for TypedPropertyDefinition<K> {
    async fn qwrite_as(
        &self,
        xml: &mut Writer<impl IWrite>,
        ns: Ns,
        name: &'static str,
    ) -> Result<(), QError> {
        let start = xml.create_element(ns, name);
        let end = start.to_end().into_owned();
        xml.q.write_event_async(Event::Start(start)).await?;

        xml.write_text(Ns::Cmis, "id", &self.id).await?;
        self.local_name.qwrite_as(xml, Ns::Cmis, "localName").await?;
        self.local_namespace
            .qwrite_as(xml, Ns::Cmis, "localNamespace")
            .await?;
        self.query_name.qwrite_as(xml, Ns::Cmis, "queryName").await?;
        self.display_name
            .qwrite_as(xml, Ns::Cmis, "displayName")
            .await?;
        self.description
            .qwrite_as(xml, Ns::Cmis, "description")
            .await?;
        self.property_type
            .qwrite_as(xml, Ns::Cmis, "propertyType")
            .await?;
        self.cardinality
            .qwrite_as(xml, Ns::Cmis, "cardinality")
            .await?;
        self.updatability
            .qwrite_as(xml, Ns::Cmis, "updatability")
            .await?;
        self.inherited.qwrite_as(xml, Ns::Cmis, "inherited").await?;
        self.required.qwrite_as(xml, Ns::Cmis, "required").await?;
        self.queryable.qwrite_as(xml, Ns::Cmis, "queryable").await?;
        self.orderable.qwrite_as(xml, Ns::Cmis, "orderable").await?;
        self.open_choice
            .qwrite_as(xml, Ns::Cmis, "openChoice")
            .await?;
        self.default_value
            .qwrite_as(xml, Ns::Cmis, "defaultValue")
            .await?;
        self.choices.qwrite_as(xml, Ns::Cmis, K::CHOICE_TAG).await?;
        self.facets.qwrite(xml).await?;
        xml.write_any_elements(&self.any).await?;

        xml.q.write_event_async(Event::End(end)).await
    }
}

impl QWrite for PropertyDefinition {
    async fn qwrite(&self, xml: &mut Writer<impl IWrite>) -> Result<(), QError> {
        match self {
            Self::Boolean(d) => d.qwrite_as(xml, Ns::Cmis, BooleanKind::DEFINITION_TAG).await,
            Self::Id(d) => d.qwrite_as(xml, Ns::Cmis, IdKind::DEFINITION_TAG).await,
            Self::Integer(d) => d.qwrite_as(xml, Ns::Cmis, IntegerKind::DEFINITION_TAG).await,
            Self::DateTime(d) => d.qwrite_as(xml, Ns::Cmis, DateTimeKind::DEFINITION_TAG).await,
            Self::Decimal(d) => d.qwrite_as(xml, Ns::Cmis, DecimalKind::DEFINITION_TAG).await,
            Self::Html(d) => d.qwrite_as(xml, Ns::Cmis, HtmlKind::DEFINITION_TAG).await,
            Self::String(d) => d.qwrite_as(xml, Ns::Cmis, StringKind::DEFINITION_TAG).await,
            Self::Uri(d) => d.qwrite_as(xml, Ns::Cmis, UriKind::DEFINITION_TAG).await,
            Self::Xml(d) => d.qwrite_as(xml, Ns::Cmis, XmlKind::DEFINITION_TAG).await,
        }
    }
}

// ---- Facets ----

impl QWrite for NoFacets {
    async fn qwrite(&self, _xml: &mut Writer<impl IWrite>) -> Result<(), QError> {
        Ok(())
    }
}

impl QWrite for IntegerFacets {
    async fn qwrite(&self, xml: &mut Writer<impl IWrite>) -> Result<(), QError> {
        self.min_value.qwrite_as(xml, Ns::Cmis, "minValue").await?;
        self.max_value.qwrite_as(xml, Ns::Cmis, "maxValue").await
    }
}

impl QWrite for DecimalFacets {
    async fn qwrite(&self, xml: &mut Writer<impl IWrite>) -> Result<(), QError> {
        self.precision.qwrite_as(xml, Ns::Cmis, "precision").await
    }
}

impl QWrite for StringFacets {
    async fn qwrite(&self, xml: &mut Writer<impl IWrite>) -> Result<(), QError> {
        self.max_length.qwrite_as(xml, Ns::Cmis, "maxLength").await
    }
}

impl QWrite for XmlFacets {
    async fn qwrite(&self, xml: &mut Writer<impl IWrite>) -> Result<(), QError> {
        self.schema_uri.qwrite_as(xml, Ns::Cmis, "schemaURI").await?;
        self.encoding.qwrite_as(xml, Ns::Cmis, "encoding").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::{Cardinality, DecimalPrecision, PropertyType, Updatability};
    use crate::value::Decimal;
    use crate::xml::{default_namespaces, AnyElement, AnyNode, AnyXml, ExtAttribute, QRead, QReadAs, Reader};
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

    async fn deserialize<T: QRead<T>>(src: &str) -> T {
        let mut rdr = Reader::new(NsReader::from_reader(src.as_bytes()))
            .await
            .unwrap();
        T::qread(&mut rdr).await.unwrap()
    }

    #[tokio::test]
    async fn property_with_values() {
        let orig = Property::Id(PropertyId {
            localname: Some("objectId".into()),
            ..PropertyId::with_values("cmis:ObjectId", vec!["workspace://SpacesStore/n1".into()])
        });
        let got = serialize(&orig).await;
        let expected = r#"<cmis:propertyId xmlns:cmis="http://docs.oasis-open.org/ns/cmis/core/200901" xmlns:cmism="http://docs.oasis-open.org/ns/cmis/messaging/200901" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" pdid="cmis:ObjectId" localname="objectId">
    <cmis:value>workspace://SpacesStore/n1</cmis:value>
</cmis:propertyId>"#;

        assert_eq!(&got, expected, "\n---GOT---\n{got}\n---EXP---\n{expected}\n");
        assert_eq!(deserialize::<Property>(got.as_str()).await, orig);
    }

    #[tokio::test]
    async fn property_without_value_is_empty() {
        let orig = Property::Boolean(PropertyBoolean {
            property_type: Some(PropertyType::Boolean),
            ..PropertyBoolean::new("cmis:IsImmutable")
        });
        let got = serialize(&orig).await;
        let expected = r#"<cmis:propertyBoolean xmlns:cmis="http://docs.oasis-open.org/ns/cmis/core/200901" xmlns:cmism="http://docs.oasis-open.org/ns/cmis/messaging/200901" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" pdid="cmis:IsImmutable" propertyType="boolean"/>"#;

        assert_eq!(&got, expected, "\n---GOT---\n{got}\n---EXP---\n{expected}\n");
        assert_eq!(deserialize::<Property>(got.as_str()).await, orig);
    }

    #[tokio::test]
    async fn html_value_keeps_markup() {
        let mut bold = AnyElement::new(Some("http://www.w3.org/1999/xhtml"), Some("h"), "b");
        bold.children.push(AnyNode::Text("urgent".into()));
        let orig = Property::Html(PropertyHtml {
            other_attributes: vec![ExtAttribute {
                name: "ext:origin".into(),
                namespace: Some("urn:example:ext".into()),
                value: "import".into(),
            }],
            ..PropertyHtml::with_values(
                "x:summary",
                vec![AnyXml(vec![
                    AnyNode::Text("Read this".into()),
                    AnyNode::Element(bold),
                ])],
            )
        });

        let got = serialize(&orig).await;
        assert!(got.contains(r#"xmlns:ext="urn:example:ext" ext:origin="import""#));
        assert!(got.contains(r#"<h:b xmlns:h="http://www.w3.org/1999/xhtml">urgent</h:b>"#));
        assert_eq!(deserialize::<Property>(got.as_str()).await, orig);
    }

    #[tokio::test]
    async fn html_value_keeps_whitespace_between_markup() {
        let src = r#"<cmis:propertyHtml xmlns:cmis="http://docs.oasis-open.org/ns/cmis/core/200901" pdid="x:body"><cmis:value><b>Hello</b> <i>world</i></cmis:value><cmis:value>
  <p>one</p>
  <p>two</p>
</cmis:value></cmis:propertyHtml>"#;
        let orig = deserialize::<Property>(src).await;
        let Property::Html(html) = &orig else {
            panic!("expected an html property")
        };
        assert_eq!(html.values[0].0[1], AnyNode::Text(" ".into()));
        assert_eq!(html.values[1].0.len(), 5);

        let got = serialize(&orig).await;
        assert!(got.contains("<cmis:value><b>Hello</b> <i>world</i></cmis:value>"));
        assert!(got.contains("<cmis:value>\n  <p>one</p>\n  <p>two</p>\n</cmis:value>"));
        assert_eq!(deserialize::<Property>(got.as_str()).await, orig);
    }

    #[tokio::test]
    async fn definition_with_nested_choices() {
        let mut region = Choice::<StringKind>::new("Europe", vec![]);
        region.choices = vec![
            Choice::new("France", vec!["fr".into()]),
            Choice::new("Germany", vec!["de".into()]),
        ];
        let orig = PropertyDefinition::String(PropertyStringDefinition {
            local_name: Some("country".into()),
            query_name: Some("x:country".into()),
            inherited: Some(false),
            open_choice: Some(true),
            default_value: Some(PropertyString::with_values("x:country", vec!["fr".into()])),
            choices: vec![region],
            facets: StringFacets {
                max_length: Some(2),
            },
            ..PropertyStringDefinition::new("x:country", Cardinality::Single, Updatability::ReadWrite)
        });

        let got = serialize(&orig).await;
        let expected = r#"<cmis:propertyStringDefinition xmlns:cmis="http://docs.oasis-open.org/ns/cmis/core/200901" xmlns:cmism="http://docs.oasis-open.org/ns/cmis/messaging/200901" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
    <cmis:id>x:country</cmis:id>
    <cmis:localName>country</cmis:localName>
    <cmis:queryName>x:country</cmis:queryName>
    <cmis:cardinality>single</cmis:cardinality>
    <cmis:updatability>readwrite</cmis:updatability>
    <cmis:inherited>false</cmis:inherited>
    <cmis:openChoice>true</cmis:openChoice>
    <cmis:defaultValue pdid="x:country">
        <cmis:value>fr</cmis:value>
    </cmis:defaultValue>
    <cmis:choiceString displayName="Europe">
        <cmis:choiceString displayName="France">
            <cmis:value>fr</cmis:value>
        </cmis:choiceString>
        <cmis:choiceString displayName="Germany">
            <cmis:value>de</cmis:value>
        </cmis:choiceString>
    </cmis:choiceString>
    <cmis:maxLength>2</cmis:maxLength>
</cmis:propertyStringDefinition>"#;

        assert_eq!(&got, expected, "\n---GOT---\n{got}\n---EXP---\n{expected}\n");
        assert_eq!(deserialize::<PropertyDefinition>(got.as_str()).await, orig);
    }

    #[tokio::test]
    async fn decimal_definition_facets() {
        let orig = PropertyDefinition::Decimal(PropertyDecimalDefinition {
            facets: DecimalFacets {
                precision: Some(DecimalPrecision::Bits64),
            },
            default_value: Some(PropertyDecimal::with_values(
                "x:price",
                vec![Decimal::new("9.99").unwrap()],
            )),
            ..PropertyDecimalDefinition::new("x:price", Cardinality::Multi, Updatability::OnCreate)
        });

        let got = serialize(&orig).await;
        assert!(got.contains("<cmis:precision>64</cmis:precision>"));
        assert!(got.contains("<cmis:value>9.99</cmis:value>"));
        assert_eq!(deserialize::<PropertyDefinition>(got.as_str()).await, orig);
    }

    #[tokio::test]
    async fn properties_contextual_name() {
        let orig = Properties {
            properties: vec![
                Property::String(PropertyString::with_values("cmis:Name", vec!["a.txt".into()])),
                Property::Integer(PropertyInteger::with_values(
                    "cmis:ContentStreamLength",
                    vec![1024],
                )),
            ],
            ..Properties::default()
        };

        let mut buffer = Vec::new();
        let mut tokio_buffer = tokio::io::BufWriter::new(&mut buffer);
        let q = quick_xml::writer::Writer::new_with_indent(&mut tokio_buffer, b' ', 4);
        let mut writer = Writer {
            q,
            ns_to_apply: default_namespaces(),
        };
        orig.qwrite_as(&mut writer, Ns::Msg, "properties")
            .await
            .unwrap();
        tokio_buffer.flush().await.unwrap();
        let got = std::str::from_utf8(buffer.as_slice()).unwrap();

        assert!(got.starts_with("<cmism:properties "));
        assert!(got.contains("<cmis:value>1024</cmis:value>"));

        let mut rdr = Reader::new(NsReader::from_reader(got.as_bytes()))
            .await
            .unwrap();
        let back = Properties::qread_as(&mut rdr, Ns::Msg, "properties")
            .await
            .unwrap();
        assert_eq!(back, orig);
    }
}
