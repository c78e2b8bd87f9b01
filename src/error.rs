use std::{
    error::Error,
    fmt::{Display, Formatter, Result as FmtResult},
};

/// Errors raised while loading a permission catalog or evaluating a policy.
///
/// Any error aborts the evaluation as a whole; no partial summary is produced.
#[derive(Debug, Eq, PartialEq)]
pub enum ExposureError {
    /// The owning account ID is not a 12-digit string.
    InvalidAccountId(String),

    /// The permission catalog data could not be parsed.
    InvalidCatalog(String),

    /// A statement's `Effect` is neither `Allow` nor `Deny`.
    InvalidEffect(String),

    /// The policy document could not be parsed.
    InvalidPolicy(String),

    /// An `AWS` principal is neither `*`, an account ID, nor an ARN carrying an account ID.
    InvalidPrincipal(String),

    /// Two statements resolved to the same statement ID.
    DuplicateSid(String),

    /// The construct is recognized but its meaning cannot be represented as a set of allowed identities.
    Unsupported(String),
}

impl ExposureError {
    /// Indicates whether this error reports a construct that is understood but not supported, as opposed to
    /// malformed input.
    #[inline]
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported(_))
    }
}

impl Display for ExposureError {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            Self::InvalidAccountId(account_id) => write!(f, "Invalid account ID: {}", account_id),
            Self::InvalidCatalog(msg) => write!(f, "Invalid permission catalog: {}", msg),
            Self::InvalidEffect(effect) => {
                write!(f, "Invalid effect: {}; valid choices are 'Allow' or 'Deny'", effect)
            }
            Self::InvalidPolicy(msg) => write!(f, "Invalid policy: {}", msg),
            Self::InvalidPrincipal(principal) => write!(f, "Invalid principal: {}", principal),
            Self::DuplicateSid(sid) => write!(f, "Duplicate Sid: {}", sid),
            Self::Unsupported(construct) => write!(f, "Not implemented: {}", construct),
        }
    }
}

impl Error for ExposureError {}

impl From<serde_json::Error> for ExposureError {
    fn from(e: serde_json::Error) -> Self {
        Self::InvalidPolicy(e.to_string())
    }
}
