//! Role to landing-page mapping used after login and registration.

use std::collections::BTreeMap;

use super::user::{Role, UserValidationError};

/// Errors raised while parsing destination overrides.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoleDestinationError {
    /// An entry was not of the form `role=/path`.
    #[error("malformed destination entry: {entry}")]
    MalformedEntry {
        /// Offending entry.
        entry: String,
    },
    /// The role name was not recognised.
    #[error(transparent)]
    UnknownRole(#[from] UserValidationError),
    /// Destinations must be absolute paths.
    #[error("destination for {role} must start with '/': {path}")]
    RelativePath {
        /// Role being configured.
        role: Role,
        /// Rejected path.
        path: String,
    },
}

/// Total mapping from [`Role`] to a front-end path.
///
/// Every role always has a destination: overrides replace entries of the
/// default table and never remove them.
///
/// # Examples
/// ```
/// use masters_backend::domain::{Role, RoleDestinations};
///
/// let table = RoleDestinations::parse("admin=/console").expect("valid overrides");
/// assert_eq!(table.destination_for(Role::Admin), "/console");
/// assert_eq!(table.destination_for(Role::Client), "/dashboard");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleDestinations {
    paths: BTreeMap<Role, String>,
}

impl Default for RoleDestinations {
    fn default() -> Self {
        let paths = Role::ALL
            .into_iter()
            .map(|role| (role, default_path(role).to_owned()))
            .collect();
        Self { paths }
    }
}

fn default_path(role: Role) -> &'static str {
    match role {
        Role::Admin => "/admin",
        Role::Master | Role::VerifiedMaster => "/master",
        Role::Client => "/dashboard",
    }
}

impl RoleDestinations {
    /// Replace the destination of one role.
    pub fn with_override(
        mut self,
        role: Role,
        path: impl Into<String>,
    ) -> Result<Self, RoleDestinationError> {
        let path = path.into();
        if !path.starts_with('/') {
            return Err(RoleDestinationError::RelativePath { role, path });
        }
        self.paths.insert(role, path);
        Ok(self)
    }

    /// Parse comma separated `role=/path` overrides on top of the defaults.
    pub fn parse(raw: &str) -> Result<Self, RoleDestinationError> {
        raw.split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .try_fold(Self::default(), |table, entry| {
                let (role, path) =
                    entry
                        .split_once('=')
                        .ok_or_else(|| RoleDestinationError::MalformedEntry {
                            entry: entry.to_owned(),
                        })?;
                table.with_override(role.parse()?, path.trim())
            })
    }

    /// Destination for `role`.
    pub fn destination_for(&self, role: Role) -> &str {
        self.paths
            .get(&role)
            .map_or_else(|| default_path(role), String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Role::Admin, "/admin")]
    #[case(Role::Master, "/master")]
    #[case(Role::VerifiedMaster, "/master")]
    #[case(Role::Client, "/dashboard")]
    fn defaults_route_each_role(#[case] role: Role, #[case] expected: &str) {
        assert_eq!(RoleDestinations::default().destination_for(role), expected);
    }

    #[rstest]
    fn mapping_is_total_after_overrides() {
        let table = RoleDestinations::parse("master=/workshop, verified_master=/workshop/pro")
            .expect("valid overrides");
        for role in Role::ALL {
            assert!(table.destination_for(role).starts_with('/'));
        }
        assert_eq!(table.destination_for(Role::VerifiedMaster), "/workshop/pro");
    }

    #[rstest]
    fn empty_override_string_keeps_defaults() {
        assert_eq!(
            RoleDestinations::parse(" , ").expect("blank entries ignored"),
            RoleDestinations::default()
        );
    }

    #[rstest]
    #[case("admin")]
    #[case("=/x")]
    fn malformed_entries_are_rejected(#[case] raw: &str) {
        assert!(RoleDestinations::parse(raw).is_err());
    }

    #[rstest]
    fn relative_paths_are_rejected() {
        let err = RoleDestinations::parse("client=home").expect_err("relative path");
        assert!(matches!(err, RoleDestinationError::RelativePath { .. }));
    }
}
