// ============================
// crates/backend-lib/src/auth/policy.rs
// ============================
//! Static route policy: which paths may be reached without authentication.

/// Signup path
pub const SIGNUP_PATH: &str = "/users/signup";
/// Login path
pub const LOGIN_PATH: &str = "/users/login";

/// Access requirement of a path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Public,
    RequiresAuth,
}

/// One row of the policy table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyEntry {
    pub path: String,
    pub requirement: Requirement,
}

/// Path → requirement table, built once at startup.
///
/// Paths are matched exactly and regardless of method. Any path without an
/// entry requires authentication.
#[derive(Debug, Clone)]
pub struct RoutePolicy {
    entries: Vec<PolicyEntry>,
}

impl RoutePolicy {
    pub fn new(entries: Vec<PolicyEntry>) -> Self {
        Self { entries }
    }

    /// Look up the requirement for `path`
    pub fn requirement(&self, path: &str) -> Requirement {
        self.entries
            .iter()
            .find(|entry| entry.path == path)
            .map_or(Requirement::RequiresAuth, |entry| entry.requirement)
    }
}

impl Default for RoutePolicy {
    /// Signup and login are public; everything else is protected.
    fn default() -> Self {
        Self::new(
            [SIGNUP_PATH, LOGIN_PATH]
                .into_iter()
                .map(|path| PolicyEntry {
                    path: path.to_string(),
                    requirement: Requirement::Public,
                })
                .collect(),
        )
    }
}
