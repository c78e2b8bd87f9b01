use std::fmt::{Display, Formatter, Result as FmtResult};

/// The kind of value a condition operator compares.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum OpCategory {
    Arn,
    String,
}

impl Display for OpCategory {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            Self::Arn => f.write_str("arn"),
            Self::String => f.write_str("string"),
        }
    }
}

/// The semantics of a condition operator that can restrict principals.
///
/// Only the string and ARN operator families are classified; numeric, date, boolean, IP address, binary, and null
/// operators never constrain who the principal is.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct ConditionOp {
    category: OpCategory,
    negated: bool,
    like: bool,
    caseless: bool,
    if_exists: bool,
}

const SET_QUALIFIERS: [&str; 2] = ["foranyvalue:", "forallvalues:"];
const IF_EXISTS: &str = "ifexists";

impl ConditionOp {
    const fn new(category: OpCategory, negated: bool, like: bool, caseless: bool) -> Self {
        Self {
            category,
            negated,
            like,
            caseless,
            if_exists: false,
        }
    }

    /// Classify an operator name such as `StringLike`, `ArnNotEqualsIfExists`, or `ForAnyValue:StringEquals`.
    ///
    /// Matching is case-insensitive. Returns `None` for operators that are not classified; conditions using them are
    /// not evaluated.
    pub fn classify(name: &str) -> Option<Self> {
        let mut name = name.to_lowercase();

        for qualifier in SET_QUALIFIERS {
            if let Some(base) = name.strip_prefix(qualifier) {
                name = base.to_string();
                break;
            }
        }

        let if_exists = name.ends_with(IF_EXISTS);
        if if_exists {
            name.truncate(name.len() - IF_EXISTS.len());
        }

        let op = match name.as_str() {
            "stringequals" => Self::new(OpCategory::String, false, false, false),
            "stringnotequals" => Self::new(OpCategory::String, true, false, false),
            "stringequalsignorecase" => Self::new(OpCategory::String, false, false, true),
            "stringnotequalsignorecase" => Self::new(OpCategory::String, true, false, true),
            "stringlike" => Self::new(OpCategory::String, false, true, false),
            "stringnotlike" => Self::new(OpCategory::String, true, true, false),
            "arnequals" => Self::new(OpCategory::Arn, false, false, true),
            "arnlike" => Self::new(OpCategory::Arn, false, true, true),
            "arnnotequals" => Self::new(OpCategory::Arn, true, false, true),
            "arnnotlike" => Self::new(OpCategory::Arn, true, true, true),
            _ => return None,
        };

        Some(Self {
            if_exists,
            ..op
        })
    }

    #[inline]
    pub fn category(&self) -> OpCategory {
        self.category
    }

    /// The operator matches values *not* in its list.
    #[inline]
    pub fn is_negated(&self) -> bool {
        self.negated
    }

    /// Values are wildcard patterns (`*`, `?`).
    #[inline]
    pub fn is_like(&self) -> bool {
        self.like
    }

    #[inline]
    pub fn is_caseless(&self) -> bool {
        self.caseless
    }

    /// The operator passes when the key is absent from the request.
    #[inline]
    pub fn is_if_exists(&self) -> bool {
        self.if_exists
    }
}
