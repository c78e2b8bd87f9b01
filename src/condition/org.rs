use {
    super::{ConditionOp, EvaluatedCondition, OpCategory},
    log::trace,
};

const ORG_PREFIX: &str = "o-";

/// Organization wildcard recorded when any organization is allowed.
const ANY_ORG: &str = "o-*";

/// Evaluate `aws:PrincipalOrgID`.
///
/// Organizations are never private: even the owner's own organization reaches beyond the owning account.
pub(super) fn evaluate(values: &[String], op: &ConditionOp, out: &mut EvaluatedCondition) -> bool {
    evaluate_with(values, op, out, |value| value)
}

/// Evaluate `aws:PrincipalOrgPaths`, e.g. `o-a1b2c3d4e5/r-ab12/ou-ab12-11111111/*`.
///
/// Only the organization, the first path segment, is recorded; the remainder only restricts further within it.
pub(super) fn evaluate_paths(values: &[String], op: &ConditionOp, out: &mut EvaluatedCondition) -> bool {
    evaluate_with(values, op, out, |path| path.split('/').next().unwrap_or_default())
}

fn evaluate_with<F>(values: &[String], op: &ConditionOp, out: &mut EvaluatedCondition, org_of: F) -> bool
where
    F: Fn(&str) -> &str,
{
    if op.category() != OpCategory::String {
        trace!("Organization condition values under {} operator ignored: {:?}", op.category(), values);
        return false;
    }

    let mut resolved = false;

    for value in values {
        let org = org_of(value);
        let org = if op.is_caseless() {
            org.to_lowercase()
        } else {
            org.to_string()
        };

        if op.is_like() && (org == "*" || org == ANY_ORG) {
            out.identities.organization_ids.insert(ANY_ORG.to_string());
            out.is_public = true;
            resolved = true;
            continue;
        }

        if !org.starts_with(ORG_PREFIX) {
            trace!("Skipping organization value {}", value);
            continue;
        }

        if !op.is_like() && (org.contains('*') || org.contains('?')) {
            trace!("Skipping wildcard organization {} under exact operator", value);
            continue;
        }

        out.identities.organization_ids.insert(org);
        out.is_shared = true;
        resolved = true;
    }

    resolved
}
