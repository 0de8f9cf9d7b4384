//! Acting user as resolved by the authentication layer.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::role::{normalize_role, Role};

/// The identity performing an operation: a username and the role set granted to it.
///
/// The user's own `USR:<name>` role is always part of the role set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    username: String,
    roles: BTreeSet<String>,
}

impl Actor {
    /// Build an actor from a username and raw role strings.
    ///
    /// Malformed role strings are dropped; the rest are normalized to upper case.
    pub fn new<I, S>(username: impl Into<String>, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let username = username.into().trim().to_string();
        let mut set: BTreeSet<String> = roles
            .into_iter()
            .filter_map(|r| normalize_role(r.as_ref()))
            .collect();
        if !username.is_empty() {
            set.insert(Role::user(&username).to_string());
        }
        Self {
            username,
            roles: set,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn roles(&self) -> &BTreeSet<String> {
        &self.roles
    }

    pub fn has_role(&self, role: &str) -> bool {
        normalize_role(role).is_some_and(|r| self.roles.contains(&r))
    }

    pub fn has_any_role<S: AsRef<str>>(&self, roles: &[S]) -> bool {
        roles.iter().any(|r| self.has_role(r.as_ref()))
    }
}
