use {
    crate::{display_json, from_str_json, serutil::StringList, Condition, Principal},
    derive_builder::Builder,
    serde::{
        de::{self, Deserializer, MapAccess, Visitor},
        Deserialize, Serialize,
    },
    std::fmt::{Formatter, Result as FmtResult},
};

/// One canonicalized policy statement.
///
/// `Effect` is kept exactly as written; it is validated when the statement is evaluated.
#[derive(Builder, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Statement {
    #[builder(setter(into, strip_option), default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    sid: Option<String>,

    #[builder(setter(into))]
    effect: String,

    #[builder(setter(into), default)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    action: Vec<String>,

    #[builder(setter(into, strip_option), default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    not_action: Option<Vec<String>>,

    #[builder(setter(into), default)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    resource: Vec<String>,

    #[builder(setter(into, strip_option), default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    not_resource: Option<Vec<String>>,

    #[builder(setter(into, strip_option), default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    principal: Option<Principal>,

    #[builder(setter(into, strip_option), default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    not_principal: Option<Principal>,

    #[builder(setter(into, strip_option), default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    condition: Option<Condition>,
}

impl Statement {
    #[inline]
    pub fn builder() -> StatementBuilder {
        StatementBuilder::default()
    }

    #[inline]
    pub fn sid(&self) -> Option<&str> {
        self.sid.as_deref()
    }

    #[inline]
    pub fn effect(&self) -> &str {
        &self.effect
    }

    #[inline]
    pub fn action(&self) -> &[String] {
        &self.action
    }

    #[inline]
    pub fn not_action(&self) -> Option<&[String]> {
        self.not_action.as_deref()
    }

    #[inline]
    pub fn resource(&self) -> &[String] {
        &self.resource
    }

    #[inline]
    pub fn not_resource(&self) -> Option<&[String]> {
        self.not_resource.as_deref()
    }

    #[inline]
    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    #[inline]
    pub fn not_principal(&self) -> Option<&Principal> {
        self.not_principal.as_ref()
    }

    #[inline]
    pub fn condition(&self) -> Option<&Condition> {
        self.condition.as_ref()
    }

    /// Indicates whether the statement names resources (via `Resource` or `NotResource`).
    pub fn has_resources(&self) -> bool {
        !self.resource.is_empty() || self.not_resource.as_ref().map(|r| !r.is_empty()).unwrap_or(false)
    }
}

display_json!(Statement);
from_str_json!(Statement);

const STATEMENT_FIELDS: &[&str] =
    &["Sid", "Effect", "Action", "NotAction", "Resource", "NotResource", "Principal", "NotPrincipal", "Condition"];

impl<'de> Deserialize<'de> for Statement {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(StatementVisitor {})
    }
}

struct StatementVisitor;

impl<'de> Visitor<'de> for StatementVisitor {
    type Value = Statement;

    fn expecting(&self, formatter: &mut Formatter) -> FmtResult {
        formatter.write_str("a map of statement properties")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Statement, A::Error> {
        let mut builder = Statement::builder();
        let mut seen: Vec<&'static str> = Vec::with_capacity(STATEMENT_FIELDS.len());

        while let Some(key) = access.next_key::<String>()? {
            let field = match STATEMENT_FIELDS.iter().find(|f| **f == key) {
                Some(field) => *field,
                None => return Err(de::Error::unknown_field(&key, STATEMENT_FIELDS)),
            };

            if seen.contains(&field) {
                return Err(de::Error::duplicate_field(field));
            }
            seen.push(field);

            match field {
                "Sid" => {
                    builder.sid(access.next_value::<String>()?);
                }
                "Effect" => {
                    builder.effect(access.next_value::<String>()?);
                }
                "Action" => {
                    builder.action(access.next_value::<StringList>()?.into_vec());
                }
                "NotAction" => {
                    builder.not_action(access.next_value::<StringList>()?.into_vec());
                }
                "Resource" => {
                    builder.resource(access.next_value::<StringList>()?.into_vec());
                }
                "NotResource" => {
                    builder.not_resource(access.next_value::<StringList>()?.into_vec());
                }
                "Principal" => {
                    builder.principal(access.next_value::<Principal>()?);
                }
                "NotPrincipal" => {
                    builder.not_principal(access.next_value::<Principal>()?);
                }
                _ => {
                    builder.condition(access.next_value::<Condition>()?);
                }
            }
        }

        builder.build().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use {
        crate::{Principal, Statement},
        indoc::indoc,
        pretty_assertions::assert_eq,
        std::str::FromStr,
    };

    #[test_log::test]
    fn test_deserialize_single_values() {
        let s = Statement::from_str(indoc! { r#"
            {
                "Sid": "PublicRead",
                "Effect": "Allow",
                "Principal": "*",
                "Action": "s3:GetObject",
                "Resource": "arn:aws:s3:::bucket/*"
            }"# })
        .unwrap();

        assert_eq!(s.sid(), Some("PublicRead"));
        assert_eq!(s.effect(), "Allow");
        assert_eq!(s.principal(), Some(&Principal::any()));
        assert_eq!(s.action(), &["s3:GetObject".to_string()]);
        assert_eq!(s.resource(), &["arn:aws:s3:::bucket/*".to_string()]);
        assert!(s.has_resources());
        assert!(s.condition().is_none());
    }

    #[test_log::test]
    fn test_deserialize_lists_and_condition() {
        let s = Statement::from_str(indoc! { r#"
            {
                "Effect": "Deny",
                "Principal": {"AWS": ["111122223333"]},
                "Action": ["sqs:SendMessage", "sqs:ReceiveMessage"],
                "NotResource": ["arn:aws:sqs:us-east-1:123456789012:queue"],
                "Condition": {"StringEquals": {"aws:PrincipalOrgID": "o-abc123"}, "Bool": {"aws:SecureTransport": false}}
            }"# })
        .unwrap();

        assert_eq!(s.sid(), None);
        assert_eq!(s.effect(), "Deny");
        assert_eq!(s.action().len(), 2);
        assert!(s.resource().is_empty());
        assert!(s.has_resources());

        let condition = s.condition().unwrap();
        assert_eq!(condition.len(), 2);
        assert_eq!(condition.get("StringEquals").unwrap()["aws:PrincipalOrgID"], vec!["o-abc123".to_string()]);
        assert_eq!(condition.get("Bool").unwrap()["aws:SecureTransport"], vec!["false".to_string()]);
    }

    #[test_log::test]
    fn test_deserialize_errors() {
        assert!(Statement::from_str(r#"{"Action": "s3:GetObject"}"#).is_err());
        assert!(Statement::from_str(r#"{"Effect": "Allow", "Effect": "Deny"}"#).is_err());
        assert!(Statement::from_str(r#"{"Effect": "Allow", "Actions": "s3:GetObject"}"#).is_err());
        assert!(Statement::from_str(r#"{"Effect": "Allow", "Principal": "111122223333"}"#).is_err());

        // Effect values are checked at evaluation time, not parse time.
        assert_eq!(Statement::from_str(r#"{"Effect": "Permit"}"#).unwrap().effect(), "Permit");
    }

    #[test_log::test]
    fn test_builder_and_display() {
        let s = Statement::builder()
            .sid("s1")
            .effect("Allow")
            .action(vec!["sns:Publish".to_string()])
            .build()
            .unwrap();
        assert!(!s.has_resources());
        assert_eq!(
            s.to_string(),
            indoc! { r#"
            {
                "Sid": "s1",
                "Effect": "Allow",
                "Action": [
                    "sns:Publish"
                ]
            }"# }
        );

        assert!(Statement::builder().sid("s1").build().is_err());
    }
}
