use chrono::{DateTime, FixedOffset, NaiveDateTime, SecondsFormat, TimeZone, Utc};

use super::error::{IllegalArgument, ParsingError};

/// Lexical form of a leaf value, the text between a start and an end tag
pub trait XmlValue: Sized {
    fn to_xml(&self) -> String;
    fn from_xml(txt: &str) -> Result<Self, ParsingError>;
}

/// Implement `QReadAs`/`QWriteAs` for leaf values: `<ns:name>lexical</ns:name>`
macro_rules! value_node {
    ($($t:ty),* $(,)?) => {
        $(
        impl $crate::xml::QWriteAs for $t {
            async fn qwrite_as(
                &self,
                xml: &mut $crate::xml::Writer<impl $crate::xml::IWrite>,
                ns: $crate::xml::Ns,
                name: &'static str,
            ) -> Result<(), quick_xml::Error> {
                let txt = $crate::value::XmlValue::to_xml(self);
                xml.write_text(ns, name, &txt).await
            }
        }

        impl $crate::xml::QReadAs<$t> for $t {
            async fn qread_as(
                xml: &mut $crate::xml::Reader<impl $crate::xml::IRead>,
                ns: $crate::xml::Ns,
                name: &'static str,
            ) -> Result<Self, $crate::error::ParsingError> {
                let txt = xml.text_as(ns, name).await?;
                <$t as $crate::value::XmlValue>::from_xml(&txt)
            }
        }
        )*
    };
}
pub(crate) use value_node;

impl XmlValue for String {
    fn to_xml(&self) -> String {
        self.clone()
    }
    fn from_xml(txt: &str) -> Result<Self, ParsingError> {
        Ok(txt.to_string())
    }
}

impl XmlValue for bool {
    fn to_xml(&self) -> String {
        match self {
            true => "true".into(),
            false => "false".into(),
        }
    }
    fn from_xml(txt: &str) -> Result<Self, ParsingError> {
        match txt.trim() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            _ => Err(ParsingError::InvalidValue),
        }
    }
}

impl XmlValue for i64 {
    fn to_xml(&self) -> String {
        self.to_string()
    }
    fn from_xml(txt: &str) -> Result<Self, ParsingError> {
        let txt = txt.trim();
        let txt = txt.strip_prefix('+').unwrap_or(txt);
        Ok(txt.parse::<i64>()?)
    }
}

impl XmlValue for DateTime<FixedOffset> {
    fn to_xml(&self) -> String {
        self.to_rfc3339_opts(SecondsFormat::AutoSi, true)
    }
    fn from_xml(txt: &str) -> Result<Self, ParsingError> {
        let txt = txt.trim();
        match DateTime::parse_from_rfc3339(txt) {
            Ok(v) => Ok(v),
            Err(zoned) => {
                // xs:dateTime allows a local time, it is read as UTC
                let naive = NaiveDateTime::parse_from_str(txt, "%Y-%m-%dT%H:%M:%S%.f")
                    .map_err(|_| zoned)?;
                Ok(Utc.from_utc_datetime(&naive).into())
            }
        }
    }
}

/// An `xs:decimal`, kept in its lexical form
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub struct Decimal(String);
impl Decimal {
    pub fn new(txt: &str) -> Result<Self, IllegalArgument> {
        let txt = txt.trim();
        let unsigned = txt
            .strip_prefix('-')
            .or_else(|| txt.strip_prefix('+'))
            .unwrap_or(txt);
        let (int, frac) = unsigned.split_once('.').unwrap_or((unsigned, ""));
        let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
        if int.len() + frac.len() == 0 || !all_digits(int) || !all_digits(frac) {
            return Err(IllegalArgument {
                kind: "decimal",
                value: txt.to_string(),
            });
        }
        Ok(Self(txt.to_string()))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}
impl From<i64> for Decimal {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}
impl std::str::FromStr for Decimal {
    type Err = IllegalArgument;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}
impl std::fmt::Display for Decimal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
impl XmlValue for Decimal {
    fn to_xml(&self) -> String {
        self.0.clone()
    }
    fn from_xml(txt: &str) -> Result<Self, ParsingError> {
        Ok(Self::new(txt)?)
    }
}

value_node!(String, bool, i64, Decimal, DateTime<FixedOffset>);

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn booleans() {
        assert_eq!(bool::from_xml("1").unwrap(), true);
        assert_eq!(bool::from_xml(" false ").unwrap(), false);
        assert!(matches!(
            bool::from_xml("yes"),
            Err(ParsingError::InvalidValue)
        ));
        assert_eq!(true.to_xml(), "true");
    }

    #[test]
    fn integers() {
        assert_eq!(i64::from_xml("+42").unwrap(), 42);
        assert_eq!(i64::from_xml("-7").unwrap(), -7);
        assert!(i64::from_xml("4.2").is_err());
    }

    #[test]
    fn decimals() {
        assert_eq!(Decimal::new("-12.50").unwrap().as_str(), "-12.50");
        assert_eq!(Decimal::new(".5").unwrap().to_string(), ".5");
        assert!(Decimal::new("").is_err());
        assert!(Decimal::new(".").is_err());
        assert!(Decimal::new("1e5").is_err());
        assert_eq!(
            Decimal::new("abc").unwrap_err(),
            IllegalArgument {
                kind: "decimal",
                value: "abc".into()
            }
        );
    }

    #[test]
    fn datetimes() {
        let expected = FixedOffset::east_opt(2 * 3600)
            .unwrap()
            .with_ymd_and_hms(2009, 3, 17, 10, 30, 0)
            .unwrap();
        let got = DateTime::<FixedOffset>::from_xml("2009-03-17T10:30:00+02:00").unwrap();
        assert_eq!(got, expected);
        assert_eq!(got.to_xml(), "2009-03-17T10:30:00+02:00");

        let local = DateTime::<FixedOffset>::from_xml("2009-03-17T08:30:00.250").unwrap();
        assert_eq!(local.to_xml(), "2009-03-17T08:30:00.250Z");
    }
}
