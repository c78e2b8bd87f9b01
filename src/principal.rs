use {
    crate::{account, display_json, identity::Identities, serutil::StringList, ExposureError},
    derive_builder::Builder,
    log::{debug, trace},
    serde::{
        de::{self, Deserializer, MapAccess, Unexpected, Visitor},
        Deserialize, Serialize,
    },
    std::fmt::{Formatter, Result as FmtResult},
};

/// A statement's `Principal` block, canonicalized: every principal kind maps to a (possibly empty) list.
///
/// The JSON shorthand `"Principal": "*"` is read as `{"AWS": ["*"]}`.
#[derive(Builder, Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct Principal {
    #[builder(setter(into), default)]
    #[serde(rename = "AWS", skip_serializing_if = "Vec::is_empty")]
    aws: Vec<String>,

    #[builder(setter(into), default)]
    #[serde(rename = "CanonicalUser", skip_serializing_if = "Vec::is_empty")]
    canonical_user: Vec<String>,

    #[builder(setter(into), default)]
    #[serde(rename = "Federated", skip_serializing_if = "Vec::is_empty")]
    federated: Vec<String>,

    #[builder(setter(into), default)]
    #[serde(rename = "Service", skip_serializing_if = "Vec::is_empty")]
    service: Vec<String>,
}

display_json!(Principal);

impl Principal {
    #[inline]
    pub fn builder() -> PrincipalBuilder {
        PrincipalBuilder::default()
    }

    /// The `{"AWS": "*"}` principal.
    pub fn any() -> Self {
        Self {
            aws: vec!["*".to_string()],
            ..Default::default()
        }
    }

    #[inline]
    pub fn aws(&self) -> &[String] {
        &self.aws
    }

    #[inline]
    pub fn canonical_user(&self) -> &[String] {
        &self.canonical_user
    }

    #[inline]
    pub fn federated(&self) -> &[String] {
        &self.federated
    }

    #[inline]
    pub fn service(&self) -> &[String] {
        &self.service
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.aws.is_empty() && self.canonical_user.is_empty() && self.federated.is_empty() && self.service.is_empty()
    }

    /// Derive the identities this principal block grants access to.
    ///
    /// An empty principal on a statement that names resources and has no principal-bounding condition has the
    /// shape of an identity-based policy; it only ever applies to the owning account.
    pub(crate) fn evaluate(
        &self,
        owner_account_id: &str,
        has_resources: bool,
        has_conditions: bool,
    ) -> Result<EvaluatedPrincipal, ExposureError> {
        let mut evaluated = EvaluatedPrincipal::default();

        if self.is_empty() && has_resources && !has_conditions {
            evaluated.identities.add_principal(owner_account_id, owner_account_id);
            evaluated.is_private = true;
            return Ok(evaluated);
        }

        for principal in &self.aws {
            if principal == "*" {
                evaluated.identities.add_principal(principal, principal);
                evaluated.wildcard = true;
                continue;
            }

            let account_id = if account::is_account_id(principal) {
                principal.as_str()
            } else {
                match account::arn_account(principal) {
                    Some(account_id) => account_id,
                    None => {
                        debug!("Unable to parse AWS principal as an account or ARN: {}", principal);
                        return Err(ExposureError::InvalidPrincipal(principal.to_string()));
                    }
                }
            };

            if account_id == owner_account_id {
                evaluated.is_private = true;
            } else {
                evaluated.is_shared = true;
            }

            evaluated.identities.add_principal(principal, account_id);
        }

        for service in &self.service {
            evaluated.identities.services.insert(service.to_string());
            evaluated.service = true;
        }

        for federated in &self.federated {
            evaluated.identities.federated.insert(federated.to_string());
            evaluated.is_private = true;
        }

        if !self.canonical_user.is_empty() {
            trace!("CanonicalUser principals are not classified: {:?}", self.canonical_user);
        }

        Ok(evaluated)
    }
}

struct PrincipalVisitor;

impl<'de> Visitor<'de> for PrincipalVisitor {
    type Value = Principal;

    fn expecting(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "map of principal types to values or \"*\"")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        if v == "*" {
            Ok(Principal::any())
        } else {
            Err(E::invalid_value(Unexpected::Str(v), &self))
        }
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut principal = Principal::default();
        let mut aws_seen = false;
        let mut canonical_user_seen = false;
        let mut federated_seen = false;
        let mut service_seen = false;

        while let Some(key) = access.next_key::<String>()? {
            let (seen, target) = match key.as_str() {
                "AWS" => (&mut aws_seen, &mut principal.aws),
                "CanonicalUser" => (&mut canonical_user_seen, &mut principal.canonical_user),
                "Federated" => (&mut federated_seen, &mut principal.federated),
                "Service" => (&mut service_seen, &mut principal.service),
                _ => {
                    debug!("Unknown principal type: {}", key);
                    return Err(de::Error::unknown_field(&key, &["AWS", "CanonicalUser", "Federated", "Service"]));
                }
            };

            if *seen {
                return Err(de::Error::custom(format!("duplicate principal type `{}`", key)));
            }

            *seen = true;
            *target = access.next_value::<StringList>()?.into_vec();
        }

        Ok(principal)
    }
}

impl<'de> Deserialize<'de> for Principal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(PrincipalVisitor)
    }
}

/// Facts about who a statement's principal block lets in.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct EvaluatedPrincipal {
    pub(crate) identities: Identities,

    /// An `AWS: "*"` principal is present.
    pub(crate) wildcard: bool,

    /// A `Service` principal is present.
    pub(crate) service: bool,

    pub(crate) is_shared: bool,
    pub(crate) is_private: bool,
}

#[cfg(test)]
mod tests {
    use {
        super::Principal,
        crate::{identity::sorted, ExposureError},
        indoc::indoc,
        pretty_assertions::assert_eq,
    };

    const OWNER: &str = "123456789012";

    #[test_log::test]
    fn test_deserialize_shapes() {
        let p: Principal = serde_json::from_str(r#""*""#).unwrap();
        assert_eq!(p, Principal::any());

        let p: Principal = serde_json::from_str(indoc! { r#"
            {
                "AWS": "arn:aws:iam::123456789012:root",
                "Service": ["ec2.amazonaws.com", "lambda.amazonaws.com"],
                "Federated": "cognito-identity.amazonaws.com",
                "CanonicalUser": "df22d4799ef444d6434c676951d8b390145f2fc5f9107140d0e4b733ad40516d"
            }"# })
        .unwrap();
        assert_eq!(p.aws(), &["arn:aws:iam::123456789012:root".to_string()]);
        assert_eq!(p.service().len(), 2);
        assert_eq!(p.federated(), &["cognito-identity.amazonaws.com".to_string()]);
        assert_eq!(p.canonical_user().len(), 1);

        assert!(serde_json::from_str::<Principal>(r#""arn:aws:iam::123456789012:root""#).is_err());
        assert!(serde_json::from_str::<Principal>(r#"{"Robot": "r2d2"}"#).is_err());
        assert!(serde_json::from_str::<Principal>(r#"{"AWS": "*", "AWS": "*"}"#).is_err());
    }

    #[test_log::test]
    fn test_display() {
        let p = Principal::builder().aws(vec!["123456789012".to_string()]).build().unwrap();
        assert_eq!(
            p.to_string(),
            indoc! { r#"
            {
                "AWS": [
                    "123456789012"
                ]
            }"# }
        );
    }

    #[test_log::test]
    fn test_empty_identity_shape() {
        let p = Principal::default();
        let e = p.evaluate(OWNER, true, false).unwrap();
        assert!(e.is_private);
        assert!(!e.wildcard && !e.service);
        assert!(!e.is_shared);
        assert_eq!(sorted(&e.identities.principals), vec![OWNER.to_string()]);
        assert_eq!(sorted(&e.identities.account_ids), vec![OWNER.to_string()]);

        // A condition or a missing resource means this is not an identity policy.
        let e = p.evaluate(OWNER, true, true).unwrap();
        assert!(!e.is_private);
        assert!(e.identities.principals.is_empty());

        let e = p.evaluate(OWNER, false, false).unwrap();
        assert!(!e.is_private);
        assert!(e.identities.account_ids.is_empty());
    }

    #[test_log::test]
    fn test_aws_principals() {
        let p = Principal::builder()
            .aws(vec![
                "*".to_string(),
                OWNER.to_string(),
                "arn:aws:iam::444455556666:role/reader".to_string(),
                "arn:aws:sts::123456789012:assumed-role/admin/session".to_string(),
            ])
            .build()
            .unwrap();
        let e = p.evaluate(OWNER, true, false).unwrap();

        assert!(e.wildcard);
        assert!(e.is_shared);
        assert!(e.is_private);
        assert_eq!(
            sorted(&e.identities.account_ids),
            vec!["*".to_string(), OWNER.to_string(), "444455556666".to_string()]
        );
        assert_eq!(e.identities.principals.len(), 4);
    }

    #[test_log::test]
    fn test_invalid_aws_principal() {
        for bad in ["user/alice", "arn:aws:iam::*:root", "12345678901", "arn:aws:s3:::bucket"] {
            let p = Principal::builder().aws(vec![bad.to_string()]).build().unwrap();
            assert_eq!(p.evaluate(OWNER, true, false).unwrap_err(), ExposureError::InvalidPrincipal(bad.to_string()));
        }
    }

    #[test_log::test]
    fn test_service_and_federated() {
        let p = Principal::builder()
            .service(vec!["sns.amazonaws.com".to_string()])
            .federated(vec!["accounts.google.com".to_string()])
            .build()
            .unwrap();
        let e = p.evaluate(OWNER, false, false).unwrap();

        assert!(e.service);
        assert!(!e.wildcard);
        assert!(e.is_private);
        assert!(!e.is_shared);
        assert_eq!(sorted(&e.identities.services), vec!["sns.amazonaws.com".to_string()]);
        assert_eq!(sorted(&e.identities.federated), vec!["accounts.google.com".to_string()]);
        assert!(e.identities.principals.is_empty());
    }
}
