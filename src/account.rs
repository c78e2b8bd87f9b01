use {crate::ExposureError, lazy_static::lazy_static, regex::Regex};

lazy_static! {
    static ref AWS_ACCOUNT_ID: Regex = Regex::new(r"^[0-9]{12}$").unwrap();

    /// `arn:<partition>:<service>:<region>:<account>:<resource>` with a concrete 12-digit account.
    static ref AWS_RESOURCE_ARN: Regex = Regex::new(r"^arn:[a-z-]*:[a-z0-9-]*:[a-z0-9-]*:([0-9]{12}):.*$").unwrap();

    /// A 12-digit account embedded in an ARN pattern, delimited by `:`, `*`, or `?` on both sides.
    static ref WILDCARD_ARN_ACCOUNT: Regex = Regex::new(r"^.*[:*?]([0-9]{12})[:*?].*$").unwrap();
}

/// Indicates whether `s` is exactly 12 ASCII digits.
#[inline]
pub(crate) fn is_account_id(s: &str) -> bool {
    AWS_ACCOUNT_ID.is_match(s)
}

/// Validate the account that owns the resource under evaluation.
pub(crate) fn validate_owner(account_id: &str) -> Result<(), ExposureError> {
    if is_account_id(account_id) {
        Ok(())
    } else {
        Err(ExposureError::InvalidAccountId(account_id.to_string()))
    }
}

/// Return the account ID of a strictly-shaped ARN, if it has one.
pub(crate) fn arn_account(arn: &str) -> Option<&str> {
    AWS_RESOURCE_ARN.captures(arn).and_then(|c| c.get(1)).map(|m| m.as_str())
}

/// Return the first 12-digit account found between wildcard or field delimiters in an ARN pattern.
pub(crate) fn wildcard_arn_account(pattern: &str) -> Option<&str> {
    WILDCARD_ARN_ACCOUNT.captures(pattern).and_then(|c| c.get(1)).map(|m| m.as_str())
}
