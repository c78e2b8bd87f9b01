use std::collections::HashSet;

/// The identities a statement (or part of one) grants access to.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct Identities {
    /// Principal strings as written: account IDs, ARNs, ARN patterns, or `*`.
    pub(crate) principals: HashSet<String>,

    /// Account IDs (or account wildcards such as `*`) the principals resolve to.
    pub(crate) account_ids: HashSet<String>,

    pub(crate) federated: HashSet<String>,
    pub(crate) services: HashSet<String>,
    pub(crate) organization_ids: HashSet<String>,
}

impl Identities {
    pub(crate) fn merge(&mut self, other: &Identities) {
        self.principals.extend(other.principals.iter().cloned());
        self.account_ids.extend(other.account_ids.iter().cloned());
        self.federated.extend(other.federated.iter().cloned());
        self.services.extend(other.services.iter().cloned());
        self.organization_ids.extend(other.organization_ids.iter().cloned());
    }

    /// Record a principal string and the account it resolved to.
    pub(crate) fn add_principal(&mut self, principal: &str, account_id: &str) {
        self.principals.insert(principal.to_string());
        self.account_ids.insert(account_id.to_string());
    }
}

/// Sorted copy of a set, for output.
pub(crate) fn sorted<T: Clone + Ord>(set: &HashSet<T>) -> Vec<T> {
    let mut result: Vec<T> = set.iter().cloned().collect();
    result.sort();
    result
}
