use {
    serde::{
        de::{self, value::MapAccessDeserializer, Deserializer, MapAccess, SeqAccess, Visitor},
        ser::{SerializeSeq, Serializer},
        Deserialize, Serialize,
    },
    std::{
        fmt::{Formatter, Result as FmtResult},
        iter::FromIterator,
        marker::PhantomData,
        ops::Deref,
    },
};

/// Implement Display for a given class by formatting it as pretty-printed JSON.
#[macro_export]
macro_rules! display_json {
    ($cls:ident) => {
        impl std::fmt::Display for $cls {
            fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                let buf = Vec::new();
                let serde_formatter = ::serde_json::ser::PrettyFormatter::with_indent(b"    ");
                let mut ser = ::serde_json::Serializer::with_formatter(buf, serde_formatter);
                match self.serialize(&mut ser) {
                    Ok(()) => (),
                    Err(e) => {
                        ::log::error!("Failed to serialize: {}", e);
                        return Err(::std::fmt::Error {});
                    }
                };
                match std::str::from_utf8(&ser.into_inner()) {
                    Ok(s) => write!(f, "{}", s),
                    Err(e) => {
                        ::log::error!("JSON serialization contained non-UTF-8 characters: {}", e);
                        Err(::std::fmt::Error {})
                    }
                }
            }
        }
    };
}

/// Implement FromStr for a given class by parsing it as JSON.
#[macro_export]
macro_rules! from_str_json {
    ($cls:ident) => {
        impl ::std::str::FromStr for $cls {
            type Err = $crate::ExposureError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match ::serde_json::from_str::<Self>(s) {
                    Ok(result) => Ok(result),
                    Err(e) => {
                        ::log::debug!("Failed to parse: {}: {:?}", s, e);
                        Err(e.into())
                    }
                }
            }
        }
    };
}

/// A list of strings that, in JSON, may be written as a single scalar or as a list of scalars.
///
/// Booleans and numbers are accepted and kept in their JSON text form; condition values such as
/// `"aws:SecureTransport": false` are common in real policies. Whatever the source shape, the value is always held
/// (and serialized) as a list.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct StringList(Vec<String>);

impl StringList {
    #[inline]
    pub fn new() -> Self {
        Self(Vec::new())
    }

    #[inline]
    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl Deref for StringList {
    type Target = [String];

    #[inline]
    fn deref(&self) -> &[String] {
        &self.0
    }
}

impl From<Vec<String>> for StringList {
    fn from(v: Vec<String>) -> Self {
        Self(v)
    }
}

impl From<&str> for StringList {
    fn from(v: &str) -> Self {
        Self(vec![v.to_string()])
    }
}

impl<S: Into<String>> FromIterator<S> for StringList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// A single JSON scalar rendered as a string.
struct Scalar(String);

struct ScalarVisitor;

impl<'de> Visitor<'de> for ScalarVisitor {
    type Value = Scalar;

    fn expecting(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "string, boolean, or number")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(Scalar(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
        Ok(Scalar(v))
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
        Ok(Scalar(v.to_string()))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(Scalar(v.to_string()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(Scalar(v.to_string()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(Scalar(v.to_string()))
    }
}

impl<'de> Deserialize<'de> for Scalar {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ScalarVisitor)
    }
}

struct StringListVisitor;

impl<'de> Visitor<'de> for StringListVisitor {
    type Value = StringList;

    fn expecting(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "string or list of strings")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(StringList(vec![v.to_string()]))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
        Ok(StringList(vec![v]))
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
        Ok(StringList(vec![v.to_string()]))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(StringList(vec![v.to_string()]))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(StringList(vec![v.to_string()]))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(StringList(vec![v.to_string()]))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut result = match access.size_hint() {
            Some(size) => Vec::with_capacity(size),
            None => Vec::new(),
        };

        while let Some(Scalar(item)) = access.next_element::<Scalar>()? {
            result.push(item);
        }

        Ok(StringList(result))
    }
}

impl<'de> Deserialize<'de> for StringList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(StringListVisitor)
    }
}

impl Serialize for StringList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for e in &self.0 {
            seq.serialize_element(e)?;
        }
        seq.end()
    }
}

/// ElementList allows a JSON field to be an element (represented as a JSON object) or a list of elements
/// (represented as a JSON array). The result is always a list.
pub(crate) struct ElementList<E>(Vec<E>);

impl<E> ElementList<E> {
    #[inline]
    pub(crate) fn into_vec(self) -> Vec<E> {
        self.0
    }
}

struct ElementListVisitor<E> {
    phantom: PhantomData<E>,
}

impl<'de, E: Deserialize<'de>> Visitor<'de> for ElementListVisitor<E> {
    type Value = ElementList<E>;

    fn expecting(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "element or list of elements")
    }

    fn visit_map<A: MapAccess<'de>>(self, access: A) -> Result<Self::Value, A::Error> {
        Ok(ElementList(vec![E::deserialize(MapAccessDeserializer::new(access))?]))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut result: Vec<E> = match access.size_hint() {
            None => Vec::new(),
            Some(size) => Vec::with_capacity(size),
        };

        while let Some(item) = access.next_element::<E>()? {
            result.push(item);
        }
        Ok(ElementList(result))
    }
}

impl<'de, E: Deserialize<'de>> Deserialize<'de> for ElementList<E> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ElementListVisitor {
            phantom: PhantomData,
        })
    }
}

#[cfg(test)]
mod tests {
    use {
        crate::serutil::{ElementList, StringList},
        pretty_assertions::assert_eq,
        serde::{Deserialize, Serialize},
        std::collections::BTreeMap,
    };

    #[test_log::test]
    fn test_string_list_shapes() {
        let single: StringList = serde_json::from_str(r#""s3:GetObject""#).unwrap();
        assert_eq!(single, StringList::from("s3:GetObject"));
        assert_eq!(single.len(), 1);

        let list: StringList = serde_json::from_str(r#"["a", "b"]"#).unwrap();
        assert_eq!(&*list, &["a".to_string(), "b".to_string()]);

        let empty: StringList = serde_json::from_str("[]").unwrap();
        assert!(empty.is_empty());
        assert_eq!(empty, StringList::new());
    }

    #[test_log::test]
    fn test_string_list_scalars() {
        let b: StringList = serde_json::from_str("false").unwrap();
        assert_eq!(b.into_vec(), vec!["false".to_string()]);

        let n: StringList = serde_json::from_str("[123456789012, true, \"x\"]").unwrap();
        assert_eq!(n.into_vec(), vec!["123456789012".to_string(), "true".to_string(), "x".to_string()]);

        assert!(serde_json::from_str::<StringList>(r#"{"a": "b"}"#).is_err());
        assert!(serde_json::from_str::<StringList>(r#"[["nested"]]"#).is_err());
    }

    #[test_log::test]
    fn test_string_list_serialize() {
        let list: StringList = vec!["one"].into_iter().collect();
        assert_eq!(serde_json::to_string(&list).unwrap(), r#"["one"]"#);
    }

    #[derive(Debug, Deserialize, Eq, PartialEq)]
    struct Item {
        name: String,
    }

    #[test_log::test]
    fn test_element_list() {
        let single: ElementList<Item> = serde_json::from_str(r#"{"name": "a"}"#).unwrap();
        assert_eq!(
            single.into_vec(),
            vec![Item {
                name: "a".to_string()
            }]
        );

        let list: ElementList<Item> = serde_json::from_str(r#"[{"name": "a"}, {"name": "b"}]"#).unwrap();
        assert_eq!(list.into_vec().len(), 2);

        assert!(serde_json::from_str::<ElementList<Item>>(r#""a""#).is_err());
    }

    #[derive(Debug, Serialize)]
    struct Pretty {
        values: BTreeMap<String, u32>,
    }
    display_json!(Pretty);

    #[test_log::test]
    fn test_display_json() {
        let mut values = BTreeMap::new();
        values.insert("a".to_string(), 1);
        let p = Pretty {
            values,
        };
        assert_eq!(p.to_string(), "{\n    \"values\": {\n        \"a\": 1\n    }\n}");
    }
}
