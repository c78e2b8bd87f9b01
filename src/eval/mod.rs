
use {
    crate::{
        account,
        action::ActionResolver,
        condition::EvaluatedCondition,
        identity::{sorted, Identities},
        principal::EvaluatedPrincipal,
        AccessLevel, Condition, Effect, Exposure, ExposureError, PermissionCatalog, Policy, PolicySummary,
        Principal, Statement,
    },
    log::debug,
    std::{collections::HashSet, str::FromStr},
};

/// A statement reduced to the facts the summary needs. Only the action set changes after creation, when denied
/// actions are removed.
#[derive(Clone, Debug)]
pub(crate) struct EvaluatedStatement {
    pub(crate) principal: EvaluatedPrincipal,
    pub(crate) condition: EvaluatedCondition,
    pub(crate) sid: String,
    pub(crate) actions: HashSet<String>,
}

impl EvaluatedStatement {
    /// A wildcard AWS principal is public unless a condition bounds who the caller can be; service principals are
    /// always public.
    pub(crate) fn is_public(&self) -> bool {
        let principal_public = self.principal.service || (self.principal.wildcard && !self.condition.narrows);
        principal_public || self.condition.is_public
    }

    #[inline]
    pub(crate) fn is_shared(&self) -> bool {
        self.principal.is_shared || self.condition.is_shared
    }

    #[inline]
    pub(crate) fn is_private(&self) -> bool {
        self.principal.is_private || self.condition.is_private
    }
}

/// The statement ID used in output: the `Sid` if set, else `Statement[n]` with a 1-based index.
pub(crate) fn statement_id(statement: &Statement, index: usize) -> String {
    match statement.sid() {
        Some(sid) if !sid.is_empty() => sid.to_string(),
        _ => format!("Statement[{}]", index + 1),
    }
}

/// Evaluate one statement in isolation.
pub(crate) fn evaluate_statement(
    statement: &Statement,
    index: usize,
    owner_account_id: &str,
) -> Result<(Effect, EvaluatedStatement), ExposureError> {
    let effect = Effect::from_str(statement.effect())?;
    let sid = statement_id(statement, index);

    if statement.not_principal().is_some() {
        return Err(ExposureError::Unsupported(format!("NotPrincipal in statement {}", sid)));
    }

    if statement.not_action().is_some() {
        return Err(ExposureError::Unsupported(format!("NotAction in statement {}", sid)));
    }

    let empty_condition = Condition::new();
    let condition = statement.condition().unwrap_or(&empty_condition).evaluate(owner_account_id)?;

    let empty_principal = Principal::default();
    let principal = statement.principal().unwrap_or(&empty_principal).evaluate(
        owner_account_id,
        statement.has_resources(),
        condition.has_conditions,
    )?;

    Ok((
        effect,
        EvaluatedStatement {
            principal,
            condition,
            sid,
            actions: statement.action().iter().cloned().collect(),
        },
    ))
}

/// Evaluate every statement and split the results by effect. Statement IDs must be unique across the policy.
pub(crate) fn sort_statements(
    statements: &[Statement],
    owner_account_id: &str,
) -> Result<(Vec<EvaluatedStatement>, Vec<EvaluatedStatement>), ExposureError> {
    let mut allowed = Vec::with_capacity(statements.len());
    let mut denied = Vec::with_capacity(statements.len());
    let mut sids = HashSet::with_capacity(statements.len());

    for (index, statement) in statements.iter().enumerate() {
        let (effect, evaluated) = evaluate_statement(statement, index, owner_account_id)?;

        if !sids.insert(evaluated.sid.clone()) {
            return Err(ExposureError::DuplicateSid(evaluated.sid));
        }

        match effect {
            Effect::Allow => allowed.push(evaluated),
            Effect::Deny => denied.push(evaluated),
        }
    }

    Ok((allowed, denied))
}

/// Remove every denied action from every allowed statement.
///
/// This is deliberately coarse: a deny applies to all allow statements regardless of its principal, resource, or
/// condition scope.
pub(crate) fn apply_denies(allowed: &mut [EvaluatedStatement], denied: &[EvaluatedStatement]) {
    for deny in denied {
        for allow in allowed.iter_mut() {
            for action in &deny.actions {
                if allow.actions.remove(action) {
                    debug!("Statement {} denies {} granted by statement {}", deny.sid, action, allow.sid);
                }
            }
        }
    }
}

/// Policy-wide accumulation of the surviving allow statements.
#[derive(Debug, Default)]
pub(crate) struct StatementsSummary {
    pub(crate) identities: Identities,
    pub(crate) public_statement_ids: HashSet<String>,
    pub(crate) shared_statement_ids: HashSet<String>,
    pub(crate) public_access_levels: HashSet<AccessLevel>,
    pub(crate) shared_access_levels: HashSet<AccessLevel>,
    pub(crate) private_access_levels: HashSet<AccessLevel>,
    pub(crate) is_public: bool,
    pub(crate) is_shared: bool,
}

impl StatementsSummary {
    /// Fold allow statements into a summary. Statements that grant no resolvable access level contribute nothing,
    /// not even their principals.
    pub(crate) fn build(statements: &[EvaluatedStatement], resolver: &mut ActionResolver) -> Self {
        let mut summary = Self::default();

        for statement in statements {
            if statement.actions.is_empty() {
                debug!("Statement {} has no remaining actions", statement.sid);
                continue;
            }

            let levels = resolver.access_levels(&statement.actions);
            if levels.is_empty() {
                debug!("Statement {} grants no known access level: {:?}", statement.sid, statement.actions);
                continue;
            }

            summary.identities.merge(&statement.principal.identities);
            summary.identities.merge(&statement.condition.identities);

            if statement.is_public() {
                summary.is_public = true;
                summary.public_access_levels.extend(levels.iter().copied());
                summary.public_statement_ids.insert(statement.sid.clone());
            }

            if statement.is_shared() {
                summary.is_shared = true;
                summary.shared_access_levels.extend(levels.iter().copied());
                summary.shared_statement_ids.insert(statement.sid.clone());
            }

            if statement.is_private() {
                summary.private_access_levels.extend(levels.iter().copied());
            }
        }

        summary
    }

    /// Strict precedence: public, then shared, then private.
    pub(crate) fn exposure(&self) -> Exposure {
        if self.is_public {
            Exposure::Public
        } else if self.is_shared {
            Exposure::Shared
        } else {
            Exposure::Private
        }
    }
}

impl From<StatementsSummary> for PolicySummary {
    fn from(summary: StatementsSummary) -> Self {
        Self {
            access_level: summary.exposure(),
            allowed_organization_ids: sorted(&summary.identities.organization_ids),
            allowed_principals: sorted(&summary.identities.principals),
            allowed_principal_account_ids: sorted(&summary.identities.account_ids),
            allowed_principal_federated_identities: sorted(&summary.identities.federated),
            allowed_principal_services: sorted(&summary.identities.services),
            is_public: summary.is_public,
            public_access_levels: sorted(&summary.public_access_levels),
            shared_access_levels: sorted(&summary.shared_access_levels),
            private_access_levels: sorted(&summary.private_access_levels),
            public_statement_ids: sorted(&summary.public_statement_ids),
            shared_statement_ids: sorted(&summary.shared_statement_ids),
        }
    }
}

/// Summarize who can access a resource governed by `policy`, from the point of view of the account that owns it.
///
/// Any error aborts the evaluation: a non-12-digit owner, an invalid `Effect`, a duplicate `Sid`, or an
/// unparseable `AWS` principal are reported as invalid input; negated principal conditions, `NotPrincipal`, and
/// `NotAction` are reported as [ExposureError::Unsupported]. Clauses that are merely not understood (unknown
/// operators, condition keys, or services) are skipped.
pub fn evaluate_policy(
    policy: &Policy,
    owner_account_id: &str,
    catalog: &PermissionCatalog,
) -> Result<PolicySummary, ExposureError> {
    account::validate_owner(owner_account_id)?;

    let (mut allowed, denied) = sort_statements(policy.statement(), owner_account_id)?;

    // All denies must be applied before any allow is read.
    apply_denies(&mut allowed, &denied);

    let mut resolver = ActionResolver::new(catalog);
    let summary = StatementsSummary::build(&allowed, &mut resolver);
    debug!(
        "Policy evaluated for {}: {} allow statements, {} deny statements, {}",
        owner_account_id,
        allowed.len(),
        denied.len(),
        summary.exposure()
    );

    Ok(summary.into())
}
