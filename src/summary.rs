use {
    crate::{display_json, AccessLevel},
    serde::{Deserialize, Serialize},
    std::fmt::{Display, Formatter, Result as FmtResult},
};

/// Who, beyond the owning account, a policy lets in.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Exposure {
    /// Any principal, or a set of principals that cannot be bounded to known accounts.
    Public,

    /// Specific other accounts or organizations.
    Shared,

    /// Only the owning account.
    Private,
}

impl Default for Exposure {
    fn default() -> Self {
        Self::Private
    }
}

impl Display for Exposure {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            Self::Public => f.write_str("public"),
            Self::Shared => f.write_str("shared"),
            Self::Private => f.write_str("private"),
        }
    }
}

/// The result of evaluating a policy.
///
/// Every list is sorted and free of duplicates.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct PolicySummary {
    pub(crate) access_level: Exposure,
    pub(crate) allowed_organization_ids: Vec<String>,
    pub(crate) allowed_principals: Vec<String>,
    pub(crate) allowed_principal_account_ids: Vec<String>,
    pub(crate) allowed_principal_federated_identities: Vec<String>,
    pub(crate) allowed_principal_services: Vec<String>,
    pub(crate) is_public: bool,
    pub(crate) public_access_levels: Vec<AccessLevel>,
    pub(crate) shared_access_levels: Vec<AccessLevel>,
    pub(crate) private_access_levels: Vec<AccessLevel>,
    pub(crate) public_statement_ids: Vec<String>,
    pub(crate) shared_statement_ids: Vec<String>,
}

display_json!(PolicySummary);

impl PolicySummary {
    /// `public` if any statement is public, else `shared` if any statement is shared, else `private`.
    #[inline]
    pub fn access_level(&self) -> Exposure {
        self.access_level
    }

    #[inline]
    pub fn allowed_organization_ids(&self) -> &[String] {
        &self.allowed_organization_ids
    }

    #[inline]
    pub fn allowed_principals(&self) -> &[String] {
        &self.allowed_principals
    }

    #[inline]
    pub fn allowed_principal_account_ids(&self) -> &[String] {
        &self.allowed_principal_account_ids
    }

    #[inline]
    pub fn allowed_principal_federated_identities(&self) -> &[String] {
        &self.allowed_principal_federated_identities
    }

    #[inline]
    pub fn allowed_principal_services(&self) -> &[String] {
        &self.allowed_principal_services
    }

    #[inline]
    pub fn is_public(&self) -> bool {
        self.is_public
    }

    #[inline]
    pub fn public_access_levels(&self) -> &[AccessLevel] {
        &self.public_access_levels
    }

    #[inline]
    pub fn shared_access_levels(&self) -> &[AccessLevel] {
        &self.shared_access_levels
    }

    #[inline]
    pub fn private_access_levels(&self) -> &[AccessLevel] {
        &self.private_access_levels
    }

    #[inline]
    pub fn public_statement_ids(&self) -> &[String] {
        &self.public_statement_ids
    }

    #[inline]
    pub fn shared_statement_ids(&self) -> &[String] {
        &self.shared_statement_ids
    }
}
