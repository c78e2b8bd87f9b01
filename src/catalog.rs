use {
    crate::ExposureError,
    log::debug,
    serde::{
        de::{self, Deserializer, Unexpected, Visitor},
        ser::Serializer,
        Deserialize, Serialize,
    },
    std::{
        collections::HashMap,
        fmt::{Display, Formatter, Result as FmtResult},
        iter::FromIterator,
        str::FromStr,
    },
};

const BUILTIN_PERMISSIONS: &str = include_str!("../data/permissions.json");

/// The coarse permission category assigned to each privilege.
///
/// Variants are declared in the lexicographic order of their names so that sorting by value and sorting by name
/// agree.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum AccessLevel {
    List,
    PermissionsManagement,
    Read,
    Tagging,
    Write,
}

impl AccessLevel {
    /// All access levels, sorted by name.
    pub const ALL: [AccessLevel; 5] =
        [Self::List, Self::PermissionsManagement, Self::Read, Self::Tagging, Self::Write];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::List => "List",
            Self::PermissionsManagement => "Permissions management",
            Self::Read => "Read",
            Self::Tagging => "Tagging",
            Self::Write => "Write",
        }
    }
}

impl Display for AccessLevel {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccessLevel {
    type Err = ExposureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "List" => Ok(Self::List),
            "Permissions management" => Ok(Self::PermissionsManagement),
            "Read" => Ok(Self::Read),
            "Tagging" => Ok(Self::Tagging),
            "Write" => Ok(Self::Write),
            _ => Err(ExposureError::InvalidCatalog(format!("unknown access level: {}", s))),
        }
    }
}

struct AccessLevelVisitor;

impl<'de> Visitor<'de> for AccessLevelVisitor {
    type Value = AccessLevel;

    fn expecting(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "one of List, Read, Write, Tagging, or Permissions management")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        AccessLevel::from_str(v).map_err(|_| E::invalid_value(Unexpected::Str(v), &self))
    }
}

impl<'de> Deserialize<'de> for AccessLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_str(AccessLevelVisitor)
    }
}

impl Serialize for AccessLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// The privileges known for one service prefix.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Permissions {
    /// Lower-cased privilege names, sorted.
    privileges: Vec<String>,
    access_level: HashMap<String, AccessLevel>,
}

impl Permissions {
    /// Lower-cased privilege names in sorted order.
    #[inline]
    pub fn privileges(&self) -> &[String] {
        &self.privileges
    }

    /// Look up the access level of a lower-cased privilege name.
    #[inline]
    pub fn access_level(&self, privilege: &str) -> Option<AccessLevel> {
        self.access_level.get(privilege).copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.privileges.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.privileges.is_empty()
    }

    /// Index of the first privilege that is not less than `prefix`.
    #[inline]
    pub(crate) fn lower_bound(&self, prefix: &str) -> usize {
        self.privileges.partition_point(|p| p.as_str() < prefix)
    }

    fn insert(&mut self, privilege: &str, level: AccessLevel) {
        let privilege = privilege.to_lowercase();
        if self.access_level.contains_key(&privilege) {
            debug!("Ignoring duplicate privilege {}", privilege);
            return;
        }

        self.access_level.insert(privilege.clone(), level);
        self.privileges.push(privilege);
    }

    fn sort(&mut self) {
        self.privileges.sort();
    }
}

#[derive(Deserialize)]
struct ServiceRecord {
    prefix: String,
    privileges: Vec<PrivilegeRecord>,
}

#[derive(Deserialize)]
struct PrivilegeRecord {
    privilege: String,
    access_level: AccessLevel,
}

/// Service prefix to privilege table.
///
/// The catalog is immutable once built and may be shared freely between threads and evaluations.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PermissionCatalog {
    services: HashMap<String, Permissions>,
}

impl PermissionCatalog {
    /// Load the catalog bundled with this crate.
    pub fn builtin() -> Result<Self, ExposureError> {
        Self::from_json(BUILTIN_PERMISSIONS)
    }

    /// Load a catalog from JSON of the form `[{"prefix": ..., "privileges": [{"privilege": ..., "access_level":
    /// ...}]}]`.
    ///
    /// When a prefix appears in more than one record, only the first record is used.
    pub fn from_json(json: &str) -> Result<Self, ExposureError> {
        let records: Vec<ServiceRecord> =
            serde_json::from_str(json).map_err(|e| ExposureError::InvalidCatalog(e.to_string()))?;
        let mut services: HashMap<String, Permissions> = HashMap::with_capacity(records.len());

        for record in records {
            let prefix = record.prefix.to_lowercase();
            if services.contains_key(&prefix) {
                debug!("Ignoring duplicate catalog entry for service {}", prefix);
                continue;
            }

            let mut permissions = Permissions::default();
            for privilege in &record.privileges {
                permissions.insert(&privilege.privilege, privilege.access_level);
            }
            permissions.sort();
            services.insert(prefix, permissions);
        }

        Ok(Self {
            services,
        })
    }

    /// Look up the privileges of a lower-cased service prefix.
    #[inline]
    pub fn service(&self, prefix: &str) -> Option<&Permissions> {
        self.services.get(prefix)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.services.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl<P, V> FromIterator<(P, V, AccessLevel)> for PermissionCatalog
where
    P: AsRef<str>,
    V: AsRef<str>,
{
    /// Build a catalog from `(service prefix, privilege, access level)` triples.
    fn from_iter<I: IntoIterator<Item = (P, V, AccessLevel)>>(iter: I) -> Self {
        let mut services: HashMap<String, Permissions> = HashMap::new();

        for (prefix, privilege, level) in iter {
            services.entry(prefix.as_ref().to_lowercase()).or_default().insert(privilege.as_ref(), level);
        }

        for permissions in services.values_mut() {
            permissions.sort();
        }

        Self {
            services,
        }
    }
}
