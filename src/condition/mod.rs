mod account;
mod arn;
pub mod op;
mod org;


pub use op::{ConditionOp, OpCategory};
use {
    crate::{from_str_json, identity::Identities, serutil::StringList, ExposureError},
    log::{debug, trace},
    serde::{de::Deserializer, ser::Serializer, Deserialize, Serialize},
    std::{
        collections::{btree_map::Iter, BTreeMap},
        iter::FromIterator,
    },
};

/// Condition keys mapped to the values they are compared against.
pub type ConditionMap = BTreeMap<String, Vec<String>>;

/// A statement's `Condition` block: operator name to condition map.
///
/// Operator names are kept as written so that operators this crate does not classify survive canonicalization and
/// can be skipped during evaluation.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Condition {
    map: BTreeMap<String, ConditionMap>,
}

from_str_json!(Condition);

impl<'de> Deserialize<'de> for Condition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, BTreeMap<String, StringList>>::deserialize(deserializer)?;
        let map = raw
            .into_iter()
            .map(|(op, keys)| (op, keys.into_iter().map(|(key, values)| (key, values.into_vec())).collect()))
            .collect();

        Ok(Self {
            map,
        })
    }
}

impl Serialize for Condition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.map.serialize(serializer)
    }
}

impl Condition {
    #[inline]
    pub fn new() -> Self {
        Self {
            map: BTreeMap::new(),
        }
    }

    #[inline]
    pub fn get(&self, op: &str) -> Option<&ConditionMap> {
        self.map.get(op)
    }

    #[inline]
    pub fn insert<S: Into<String>>(&mut self, op: S, value: ConditionMap) -> Option<ConditionMap> {
        self.map.insert(op.into(), value)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> Iter<'_, String, ConditionMap> {
        self.map.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Derive the principal and organization facts this condition block establishes.
    ///
    /// Only the global keys that bound the calling principal are recognized: `aws:PrincipalAccount`,
    /// `aws:SourceAccount`, and `aws:SourceOwner` (accounts), `aws:PrincipalArn` and `aws:SourceArn` (ARNs), and
    /// `aws:PrincipalOrgID` and `aws:PrincipalOrgPaths` (organizations). Other keys, and operators outside the string and ARN families, are
    /// ignored.
    ///
    /// A negated operator on a recognized key fails with [ExposureError::Unsupported]: "anyone except X" cannot be
    /// expressed as a set of allowed identities.
    pub(crate) fn evaluate(&self, owner_account_id: &str) -> Result<EvaluatedCondition, ExposureError> {
        let mut evaluated = EvaluatedCondition::default();

        for (op_name, keys) in self.iter() {
            let op = match ConditionOp::classify(op_name) {
                Some(op) => op,
                None => {
                    trace!("Skipping unclassified condition operator {}", op_name);
                    continue;
                }
            };

            for (key, values) in keys {
                let key_type = match KeyType::of(key) {
                    Some(key_type) => key_type,
                    None => {
                        trace!("Skipping condition key {} under {}", key, op_name);
                        continue;
                    }
                };

                evaluated.has_conditions = true;

                if op.is_negated() {
                    return Err(ExposureError::Unsupported(format!("{} on condition key {}", op_name, key)));
                }

                let resolved = match key_type {
                    KeyType::Account => account::evaluate(values, &op, owner_account_id, &mut evaluated),
                    KeyType::Arn => arn::evaluate(values, &op, owner_account_id, &mut evaluated),
                    KeyType::Organization => org::evaluate(values, &op, &mut evaluated),
                    KeyType::OrganizationPath => org::evaluate_paths(values, &op, &mut evaluated),
                };

                if resolved && !op.is_if_exists() {
                    evaluated.narrows = true;
                } else if !resolved {
                    debug!("Condition {} {} {:?} did not resolve to any identity", op_name, key, values);
                }
            }
        }

        Ok(evaluated)
    }
}

impl<S: Into<String>> FromIterator<(S, ConditionMap)> for Condition {
    fn from_iter<I: IntoIterator<Item = (S, ConditionMap)>>(iter: I) -> Self {
        Self {
            map: iter.into_iter().map(|(op, map)| (op.into(), map)).collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Condition {
    type Item = (&'a String, &'a ConditionMap);
    type IntoIter = Iter<'a, String, ConditionMap>;

    fn into_iter(self) -> Iter<'a, String, ConditionMap> {
        self.map.iter()
    }
}

/// The recognized condition keys, grouped by how their values are interpreted.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum KeyType {
    Account,
    Arn,
    Organization,
    OrganizationPath,
}

impl KeyType {
    fn of(key: &str) -> Option<Self> {
        match key.to_lowercase().as_str() {
            "aws:principalaccount" | "aws:sourceaccount" | "aws:sourceowner" => Some(Self::Account),
            "aws:principalarn" | "aws:sourcearn" => Some(Self::Arn),
            "aws:principalorgid" => Some(Self::Organization),
            "aws:principalorgpaths" => Some(Self::OrganizationPath),
            _ => None,
        }
    }
}

/// Facts about who a statement's condition block lets in.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct EvaluatedCondition {
    pub(crate) identities: Identities,
    pub(crate) is_public: bool,
    pub(crate) is_shared: bool,
    pub(crate) is_private: bool,

    /// A recognized key was present, whether or not any of its values resolved.
    pub(crate) has_conditions: bool,

    /// A recognized key under a non-`IfExists` operator resolved at least one identity, so the condition bounds who
    /// the principal can be.
    pub(crate) narrows: bool,
}

impl EvaluatedCondition {
    /// Classify a concrete account as shared or private relative to the owner.
    pub(super) fn classify_account(&mut self, account_id: &str, owner_account_id: &str) {
        if account_id == owner_account_id {
            self.is_private = true;
        } else {
            self.is_shared = true;
        }
    }
}
