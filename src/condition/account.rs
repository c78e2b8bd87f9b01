use {
    super::{ConditionOp, EvaluatedCondition, OpCategory},
    crate::account::is_account_id,
    log::trace,
};

/// Evaluate an account-valued key (`aws:PrincipalAccount`, `aws:SourceAccount`, `aws:SourceOwner`).
///
/// Returns true if any value resolved to an identity.
pub(super) fn evaluate(values: &[String], op: &ConditionOp, owner_account_id: &str, out: &mut EvaluatedCondition) -> bool {
    if op.category() != OpCategory::String {
        trace!("Account condition values under {} operator ignored: {:?}", op.category(), values);
        return false;
    }

    let mut resolved = false;

    for account in values {
        if op.is_like() {
            // A star can stand in for any number of digits, so a pattern no longer than an account ID may match
            // any account.
            if account.contains('*') && account.len() <= 12 {
                out.identities.add_principal(account, account);
                out.is_public = true;
                resolved = true;
                continue;
            }

            if account.len() != 12 {
                trace!("Skipping account pattern {}", account);
                continue;
            }

            if account.contains('?') {
                out.identities.add_principal(account, account);
                out.is_public = true;
                resolved = true;
                continue;
            }
        }

        if !is_account_id(account) {
            trace!("Skipping account value {}", account);
            continue;
        }

        out.identities.add_principal(account, account);
        out.classify_account(account, owner_account_id);
        resolved = true;
    }

    resolved
}
