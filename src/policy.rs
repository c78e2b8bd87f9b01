use {
    crate::{display_json, from_str_json, serutil::ElementList, Statement},
    derive_builder::Builder,
    serde::{
        de::{self, Deserializer, MapAccess, Visitor},
        ser::{SerializeMap, Serializer},
        Deserialize, Serialize,
    },
    std::fmt::{Formatter, Result as FmtResult},
};

/// A canonicalized policy document.
///
/// Deserializing accepts the shorthand forms found in real documents (a single statement object instead of a list,
/// scalar principals, actions, resources, and condition values) and normalizes them to lists.
#[derive(Builder, Clone, Debug, Default, Eq, PartialEq)]
pub struct Policy {
    /// The policy language version, kept as written (typically `2012-10-17`).
    #[builder(setter(into, strip_option), default)]
    version: Option<String>,

    /// An optional identifier for the policy.
    #[builder(setter(into, strip_option), default)]
    id: Option<String>,

    /// Statements in document order. Order determines the default `Sid` of statements that do not set one.
    #[builder(setter(into), default)]
    statement: Vec<Statement>,
}

impl Policy {
    #[inline]
    pub fn builder() -> PolicyBuilder {
        PolicyBuilder::default()
    }

    #[inline]
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    #[inline]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    #[inline]
    pub fn statement(&self) -> &[Statement] {
        &self.statement
    }
}

display_json!(Policy);
from_str_json!(Policy);

struct PolicyVisitor;

impl<'de> Visitor<'de> for PolicyVisitor {
    type Value = Policy;

    fn expecting(&self, formatter: &mut Formatter<'_>) -> FmtResult {
        formatter.write_str("policy")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut builder = Policy::builder();
        let mut version_seen = false;
        let mut id_seen = false;
        let mut statement_seen = false;

        while let Some(key) = access.next_key::<String>()? {
            match key.as_str() {
                "Version" => {
                    if version_seen {
                        return Err(de::Error::duplicate_field("Version"));
                    }
                    version_seen = true;
                    builder.version(access.next_value::<String>()?);
                }
                "Id" => {
                    if id_seen {
                        return Err(de::Error::duplicate_field("Id"));
                    }
                    id_seen = true;
                    builder.id(access.next_value::<String>()?);
                }
                "Statement" => {
                    if statement_seen {
                        return Err(de::Error::duplicate_field("Statement"));
                    }
                    statement_seen = true;
                    builder.statement(access.next_value::<ElementList<Statement>>()?.into_vec());
                }
                _ => return Err(de::Error::unknown_field(&key, &["Version", "Id", "Statement"])),
            }
        }

        if !statement_seen {
            return Err(de::Error::missing_field("Statement"));
        }

        builder.build().map_err(de::Error::custom)
    }
}

impl<'de> Deserialize<'de> for Policy {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Policy, D::Error> {
        d.deserialize_map(PolicyVisitor)
    }
}

impl Serialize for Policy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_map(None)?;
        if let Some(version) = &self.version {
            state.serialize_entry("Version", version)?;
        }
        if let Some(id) = &self.id {
            state.serialize_entry("Id", id)?;
        }
        state.serialize_entry("Statement", &self.statement)?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use {
        crate::{ExposureError, Policy, Statement},
        indoc::indoc,
        pretty_assertions::assert_eq,
        std::str::FromStr,
    };

    #[test_log::test]
    fn test_blank_policy_import() {
        let policy = Policy::from_str(indoc! { r#"
            {
                "Version": "2012-10-17",
                "Statement": []
            }"# })
        .unwrap();
        assert_eq!(policy.version(), Some("2012-10-17"));
        assert!(policy.id().is_none());
        assert!(policy.statement().is_empty());

        assert_eq!(
            policy.to_string(),
            indoc! { r#"
            {
                "Version": "2012-10-17",
                "Statement": []
            }"#}
        );
    }

    #[test_log::test]
    fn test_single_statement_object() {
        let policy = Policy::from_str(indoc! { r#"
            {
                "Id": "sns-topic-policy",
                "Statement": {
                    "Effect": "Allow",
                    "Principal": {"Service": "events.amazonaws.com"},
                    "Action": "sns:Publish",
                    "Resource": "arn:aws:sns:us-east-1:123456789012:alerts"
                }
            }"# })
        .unwrap();

        assert_eq!(policy.id(), Some("sns-topic-policy"));
        assert_eq!(policy.version(), None);
        assert_eq!(policy.statement().len(), 1);
        assert_eq!(policy.statement()[0].principal().unwrap().service(), &["events.amazonaws.com".to_string()]);
    }

    #[test_log::test]
    fn test_invalid_documents() {
        assert!(matches!(Policy::from_str(r#"{"Version": "2012-10-17"}"#), Err(ExposureError::InvalidPolicy(_))));
        assert!(matches!(Policy::from_str(r#"{"Statement": [], "Extra": 1}"#), Err(ExposureError::InvalidPolicy(_))));
        assert!(matches!(
            Policy::from_str(r#"{"Statement": [], "Statement": []}"#),
            Err(ExposureError::InvalidPolicy(_))
        ));
        assert!(matches!(Policy::from_str(r#"["Statement"]"#), Err(ExposureError::InvalidPolicy(_))));
        assert!(matches!(Policy::from_str("not json"), Err(ExposureError::InvalidPolicy(_))));
    }

    #[test_log::test]
    fn test_builder() {
        let statement = Statement::builder().effect("Allow").action(vec!["*".to_string()]).build().unwrap();
        let policy = Policy::builder().version("2012-10-17").statement(vec![statement.clone()]).build().unwrap();
        assert_eq!(policy.statement(), &[statement]);
        assert_eq!(Policy::builder().build().unwrap(), Policy::default());
    }
}
