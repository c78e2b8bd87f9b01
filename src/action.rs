use {
    crate::{AccessLevel, PermissionCatalog},
    log::{debug, trace},
    regex::{Regex, RegexBuilder},
    std::collections::{HashMap, HashSet},
};

/// An action string split into the pieces used for catalog lookup.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct EvaluatedAction {
    /// Lower-cased service prefix.
    pub(crate) prefix: String,

    /// Lower-cased privilege name, or the literal text before the first wildcard.
    pub(crate) privilege: String,

    /// The full lower-cased privilege pattern, present only if it contains a wildcard.
    pub(crate) pattern: Option<String>,
}

impl EvaluatedAction {
    /// Parse `service:privilege`. Returns `None` if there is no privilege part.
    pub(crate) fn parse(action: &str) -> Option<Self> {
        let action = action.to_lowercase();
        let mut parts = action.split(':');
        let prefix = parts.next().unwrap_or_default();
        let raw = parts.next().unwrap_or_default();

        if raw.is_empty() {
            return None;
        }

        match raw.find(&['*', '?'][..]) {
            None => Some(Self {
                prefix: prefix.to_string(),
                privilege: raw.to_string(),
                pattern: None,
            }),
            Some(i) => Some(Self {
                prefix: prefix.to_string(),
                privilege: raw[..i].to_string(),
                pattern: Some(raw.to_string()),
            }),
        }
    }
}

/// Convert a lower-cased privilege pattern into an anchored regex. Wildcards only span privilege characters.
pub(crate) fn regex_from_privilege_pattern(pattern: &str) -> RegexBuilder {
    let mut regex = String::with_capacity(2 + pattern.len() * 2);
    regex.push('^');

    for c in pattern.chars() {
        match c {
            '*' => regex.push_str("[a-z0-9]*"),
            '?' => regex.push_str("[a-z0-9]"),
            _ => regex.push_str(&regex::escape(&String::from(c))),
        }
    }

    regex.push('$');
    RegexBuilder::new(&regex)
}

/// Resolves the access levels granted by sets of actions.
///
/// Compiled wildcard patterns are cached for the lifetime of the resolver; patterns recur heavily across the
/// statements of a policy.
pub(crate) struct ActionResolver<'a> {
    catalog: &'a PermissionCatalog,
    matchers: HashMap<String, Regex>,
}

impl<'a> ActionResolver<'a> {
    pub(crate) fn new(catalog: &'a PermissionCatalog) -> Self {
        Self {
            catalog,
            matchers: HashMap::new(),
        }
    }

    /// Return the access levels granted by `actions`. Actions whose service is not in the catalog, or that have no
    /// privilege part, grant nothing.
    pub(crate) fn access_levels<'s, I>(&mut self, actions: I) -> HashSet<AccessLevel>
    where
        I: IntoIterator<Item = &'s String>,
    {
        let mut levels = HashSet::new();

        for action in actions {
            if action == "*" {
                return AccessLevel::ALL.iter().copied().collect();
            }

            self.resolve(action, &mut levels);
        }

        levels
    }

    fn resolve(&mut self, action: &str, levels: &mut HashSet<AccessLevel>) {
        let evaluated = match EvaluatedAction::parse(action) {
            Some(evaluated) => evaluated,
            None => {
                trace!("Skipping action without a privilege: {}", action);
                return;
            }
        };

        let catalog = self.catalog;
        let permissions = match catalog.service(&evaluated.prefix) {
            Some(permissions) => permissions,
            None => {
                debug!("Skipping action for unknown service {}: {}", evaluated.prefix, action);
                return;
            }
        };

        let pattern = match &evaluated.pattern {
            None => {
                match permissions.access_level(&evaluated.privilege) {
                    Some(level) => {
                        levels.insert(level);
                    }
                    None => debug!("Skipping unknown privilege: {}", action),
                }
                return;
            }
            Some(pattern) => pattern,
        };

        let matcher = match self.matcher(pattern) {
            Some(matcher) => matcher,
            None => return,
        };

        // Privileges sharing the literal prefix are contiguous in the sorted list.
        let privileges = permissions.privileges();
        let start = permissions.lower_bound(&evaluated.privilege);
        for privilege in privileges[start..].iter().take_while(|p| p.starts_with(evaluated.privilege.as_str())) {
            if matcher.is_match(privilege) {
                if let Some(level) = permissions.access_level(privilege) {
                    levels.insert(level);
                }
            }
        }
    }

    fn matcher(&mut self, pattern: &str) -> Option<&Regex> {
        if !self.matchers.contains_key(pattern) {
            match regex_from_privilege_pattern(pattern).build() {
                Ok(regex) => {
                    self.matchers.insert(pattern.to_string(), regex);
                }
                Err(e) => {
                    debug!("Unable to compile privilege pattern {}: {}", pattern, e);
                    return None;
                }
            }
        }

        self.matchers.get(pattern)
    }
}

#[cfg(test)]
mod tests {
    use {
        super::{regex_from_privilege_pattern, ActionResolver, EvaluatedAction},
        crate::{identity::sorted, AccessLevel, PermissionCatalog},
        pretty_assertions::assert_eq,
        std::collections::HashSet,
    };

    fn catalog() -> PermissionCatalog {
        vec![
            ("s3", "GetObject", AccessLevel::Read),
            ("s3", "GetObjectAcl", AccessLevel::Read),
            ("s3", "GetBucketPolicy", AccessLevel::Read),
            ("s3", "ListBucket", AccessLevel::List),
            ("s3", "PutObject", AccessLevel::Write),
            ("s3", "PutObjectAcl", AccessLevel::PermissionsManagement),
            ("s3", "PutObjectTagging", AccessLevel::Tagging),
            ("sqs", "SendMessage", AccessLevel::Write),
        ]
        .into_iter()
        .collect()
    }

    fn resolve(catalog: &PermissionCatalog, actions: &[&str]) -> Vec<AccessLevel> {
        let actions: Vec<String> = actions.iter().map(|a| a.to_string()).collect();
        sorted(&ActionResolver::new(catalog).access_levels(&actions))
    }

    #[test_log::test]
    fn test_parse() {
        assert_eq!(
            EvaluatedAction::parse("S3:GetObject"),
            Some(EvaluatedAction {
                prefix: "s3".to_string(),
                privilege: "getobject".to_string(),
                pattern: None,
            })
        );
        assert_eq!(
            EvaluatedAction::parse("s3:Get*Acl"),
            Some(EvaluatedAction {
                prefix: "s3".to_string(),
                privilege: "get".to_string(),
                pattern: Some("get*acl".to_string()),
            })
        );
        assert_eq!(EvaluatedAction::parse("s3:*").unwrap().privilege, "");
        assert_eq!(EvaluatedAction::parse("s3:"), None);
        assert_eq!(EvaluatedAction::parse("s3"), None);
    }

    #[test_log::test]
    fn test_pattern_regex() {
        let r = regex_from_privilege_pattern("get*acl").build().unwrap();
        assert!(r.is_match("getobjectacl"));
        assert!(r.is_match("getacl"));
        assert!(!r.is_match("getobjectacls"));

        let r = regex_from_privilege_pattern("putobject?cl").build().unwrap();
        assert!(r.is_match("putobjectacl"));
        assert!(!r.is_match("putobjectcl"));

        let r = regex_from_privilege_pattern("get.*").build().unwrap();
        assert!(!r.is_match("getxobject"));
    }

    #[test_log::test]
    fn test_exact() {
        let c = catalog();
        assert_eq!(resolve(&c, &["s3:GetObject"]), vec![AccessLevel::Read]);
        assert_eq!(resolve(&c, &["s3:getobject", "S3:PUTOBJECT"]), vec![AccessLevel::Read, AccessLevel::Write]);
        assert!(resolve(&c, &["s3:GetNothing"]).is_empty());
    }

    #[test_log::test]
    fn test_wildcards() {
        let c = catalog();
        assert_eq!(resolve(&c, &["s3:Get*"]), vec![AccessLevel::Read]);
        assert_eq!(
            resolve(&c, &["s3:Put*"]),
            vec![AccessLevel::PermissionsManagement, AccessLevel::Tagging, AccessLevel::Write]
        );
        assert_eq!(resolve(&c, &["s3:PutObject?cl"]), vec![AccessLevel::PermissionsManagement]);
        assert_eq!(resolve(&c, &["s3:*Acl"]), vec![AccessLevel::PermissionsManagement, AccessLevel::Read]);
        assert_eq!(resolve(&c, &["s3:*"]).len(), 5);
        assert!(resolve(&c, &["s3:Delete*"]).is_empty());
        assert!(resolve(&c, &["s3:Z*"]).is_empty());
    }

    #[test_log::test]
    fn test_star_and_unknown() {
        let c = catalog();
        assert_eq!(resolve(&c, &["ec2:RunInstances", "*"]), AccessLevel::ALL.to_vec());
        assert_eq!(resolve(&c, &["*"]), AccessLevel::ALL.to_vec());
        assert!(resolve(&c, &["ec2:RunInstances", "ec2:*", "s3", "s3:"]).is_empty());
        assert!(resolve(&PermissionCatalog::default(), &["s3:GetObject"]).is_empty());
    }

    #[test_log::test]
    fn test_matcher_cache() {
        let c = catalog();
        let mut resolver = ActionResolver::new(&c);
        let actions = vec!["s3:Get*".to_string()];
        let first: HashSet<AccessLevel> = resolver.access_levels(&actions);
        let second: HashSet<AccessLevel> = resolver.access_levels(&actions);
        assert_eq!(first, second);
        assert_eq!(resolver.matchers.len(), 1);
    }
}
