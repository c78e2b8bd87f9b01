use {
    super::{ConditionOp, EvaluatedCondition, OpCategory},
    crate::account::{arn_account, is_account_id, wildcard_arn_account},
    log::trace,
};

/// Index of the account field in a colon-separated ARN.
const ACCOUNT_FIELD: usize = 4;

/// Evaluate an ARN-valued key (`aws:PrincipalArn`, `aws:SourceArn`).
///
/// Returns true if any value resolved to an identity.
pub(super) fn evaluate(values: &[String], op: &ConditionOp, owner_account_id: &str, out: &mut EvaluatedCondition) -> bool {
    let mut resolved = false;

    for arn in values {
        let matched = match (op.is_like(), op.category()) {
            (true, OpCategory::String) => string_like(arn, owner_account_id, out),
            (true, OpCategory::Arn) => arn_like(arn, owner_account_id, out),
            (false, _) => exact(arn, owner_account_id, out),
        };

        resolved |= matched;
    }

    resolved
}

/// `StringLike` has no notion of ARN fields; look for a 12-digit run delimited by `:`, `*`, or `?` and assume that is
/// the account. Without one the pattern cannot be bounded to an account.
fn string_like(arn: &str, owner_account_id: &str, out: &mut EvaluatedCondition) -> bool {
    out.identities.principals.insert(arn.to_string());

    match wildcard_arn_account(arn) {
        Some(account) => {
            out.identities.account_ids.insert(account.to_string());
            out.classify_account(account, owner_account_id);
        }
        None => {
            out.identities.account_ids.insert("*".to_string());
            out.is_public = true;
        }
    }

    true
}

fn arn_like(arn: &str, owner_account_id: &str, out: &mut EvaluatedCondition) -> bool {
    let account = match arn.split(':').nth(ACCOUNT_FIELD) {
        Some(account) => account,
        None => {
            trace!("Skipping ARN pattern without an account field: {}", arn);
            return false;
        }
    };

    if account.contains('*') && account.len() <= 12 {
        out.identities.add_principal(arn, account);
        out.is_public = true;
        return true;
    }

    if account.len() != 12 {
        trace!("Skipping ARN pattern with malformed account {}: {}", account, arn);
        return false;
    }

    if account.contains('?') {
        out.identities.add_principal(arn, account);
        out.is_public = true;
        return true;
    }

    if !is_account_id(account) {
        trace!("Skipping ARN pattern with non-numeric account {}: {}", account, arn);
        return false;
    }

    out.identities.add_principal(arn, account);
    out.classify_account(account, owner_account_id);
    true
}

fn exact(arn: &str, owner_account_id: &str, out: &mut EvaluatedCondition) -> bool {
    match arn_account(arn) {
        Some(account) => {
            out.identities.add_principal(arn, account);
            out.classify_account(account, owner_account_id);
            true
        }
        None => {
            trace!("Skipping malformed ARN {}", arn);
            false
        }
    }
}
