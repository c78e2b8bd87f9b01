use {
    crate::{account, evaluate_policy, ExposureError, PermissionCatalog, Policy, PolicySummary},
    derive_builder::Builder,
    log::debug,
    std::{str::FromStr, sync::Arc},
};

/// Evaluates resource policies on behalf of a single owning account.
///
/// An `Evaluator` is immutable once built and can be shared across threads; every evaluation is independent.
#[derive(Builder, Clone, Debug, Eq, PartialEq)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct Evaluator {
    /// The 12-digit account that owns the resources whose policies are evaluated.
    #[builder(setter(into))]
    owner_account_id: String,

    /// The service permission catalog used to resolve actions to access levels.
    catalog: Arc<PermissionCatalog>,
}

impl EvaluatorBuilder {
    fn validate(&self) -> Result<(), String> {
        match &self.owner_account_id {
            Some(owner) if !account::is_account_id(owner) => {
                Err(ExposureError::InvalidAccountId(owner.clone()).to_string())
            }
            _ => Ok(()),
        }
    }
}

impl Evaluator {
    #[inline]
    pub fn builder() -> EvaluatorBuilder {
        EvaluatorBuilder::default()
    }

    /// Create an evaluator for `owner_account_id`, which must be exactly 12 digits.
    pub fn new<S: Into<String>>(owner_account_id: S, catalog: Arc<PermissionCatalog>) -> Result<Self, ExposureError> {
        let owner_account_id = owner_account_id.into();
        account::validate_owner(&owner_account_id)?;

        Ok(Self {
            owner_account_id,
            catalog,
        })
    }

    /// Create an evaluator that uses the catalog bundled with this crate.
    pub fn with_builtin_catalog<S: Into<String>>(owner_account_id: S) -> Result<Self, ExposureError> {
        Self::new(owner_account_id, Arc::new(PermissionCatalog::builtin()?))
    }

    #[inline]
    pub fn owner_account_id(&self) -> &str {
        &self.owner_account_id
    }

    #[inline]
    pub fn catalog(&self) -> &PermissionCatalog {
        &self.catalog
    }

    /// Summarize a parsed policy.
    pub fn evaluate(&self, policy: &Policy) -> Result<PolicySummary, ExposureError> {
        evaluate_policy(policy, &self.owner_account_id, &self.catalog)
    }

    /// Parse and summarize a raw JSON policy document.
    ///
    /// A blank document (empty or whitespace only) is treated as having no statements.
    pub fn evaluate_json(&self, policy: &str) -> Result<PolicySummary, ExposureError> {
        account::validate_owner(&self.owner_account_id)?;

        if policy.trim().is_empty() {
            debug!("Blank policy document for {}", self.owner_account_id);
            return Ok(PolicySummary::default());
        }

        let policy = Policy::from_str(policy)?;
        self.evaluate(&policy)
    }
}
