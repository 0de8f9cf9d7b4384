//! Role identifiers.
//!
//! Roles are strings of the form `SCHEME:identifier[#qualifier]`:
//! - `USR:<name>` an individual user
//! - `GRP:<unit>` an organizational unit, `GRP:<unit>#LEADER` its leader
//! - `SYS:<name>` a system override role
//! - `VAR:<name>` a placeholder resolved against a target before comparison
//!
//! Roles are compared case-insensitively and always stored upper case.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Scheme prefix of a role identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RoleScheme {
    Usr,
    Grp,
    Sys,
    Var,
}

impl RoleScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Usr => "USR",
            Self::Grp => "GRP",
            Self::Sys => "SYS",
            Self::Var => "VAR",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "USR" => Some(Self::Usr),
            "GRP" => Some(Self::Grp),
            "SYS" => Some(Self::Sys),
            "VAR" => Some(Self::Var),
            _ => None,
        }
    }
}

/// Qualifier marking the leader of an organizational unit.
pub const LEADER_QUALIFIER: &str = "LEADER";

/// Placeholder for the leader of the target's department.
pub const VAR_DEPT_LEADER: &str = "VAR:DEPT_LEADER";

/// Placeholder for the leader of the target's area.
pub const VAR_AREA_LEADER: &str = "VAR:AREA_LEADER";

/// A parsed, normalized role identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Role {
    scheme: RoleScheme,
    identifier: String,
    qualifier: Option<String>,
}

impl Role {
    /// Parse a role string, returning `None` if it is not well formed.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let (scheme, rest) = s.split_once(':')?;
        let scheme = RoleScheme::from_str(scheme)?;

        let (identifier, qualifier) = match rest.split_once('#') {
            Some((id, q)) => (id, Some(q)),
            None => (rest, None),
        };

        if !is_valid_segment(identifier) {
            return None;
        }
        if let Some(q) = qualifier {
            if !is_valid_segment(q) {
                return None;
            }
        }

        Some(Self {
            scheme,
            identifier: identifier.to_uppercase(),
            qualifier: qualifier.map(str::to_uppercase),
        })
    }

    pub fn user(name: &str) -> Self {
        Self {
            scheme: RoleScheme::Usr,
            identifier: name.trim().to_uppercase(),
            qualifier: None,
        }
    }

    /// The leader role of an organizational unit.
    pub fn unit_leader(unit: &str) -> Self {
        Self {
            scheme: RoleScheme::Grp,
            identifier: unit.trim().to_uppercase(),
            qualifier: Some(LEADER_QUALIFIER.to_string()),
        }
    }

    pub fn scheme(&self) -> RoleScheme {
        self.scheme
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn qualifier(&self) -> Option<&str> {
        self.qualifier.as_deref()
    }

    pub fn is_placeholder(&self) -> bool {
        self.scheme == RoleScheme::Var
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.scheme.as_str(), self.identifier)?;
        if let Some(q) = &self.qualifier {
            write!(f, "#{q}")?;
        }
        Ok(())
    }
}

fn is_valid_segment(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '@'))
}

/// Normalize a role string to its canonical upper-case form.
pub fn normalize_role(s: &str) -> Option<String> {
    Role::parse(s).map(|r| r.to_string())
}

/// Context a target provides for resolving `VAR:*` placeholders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleContext {
    /// Department that owns the target, if any.
    pub dept: Option<String>,
    /// Area the target is located in, if any.
    pub area: Option<String>,
}

/// Resolve placeholder roles against a target context.
///
/// Concrete roles pass through normalized. Placeholders expand to the concrete
/// role they stand for; a placeholder with no value in the context, or one that
/// is not recognized, resolves to nothing and therefore grants nobody.
pub fn resolve_roles(roles: &[String], ctx: &RoleContext) -> Vec<String> {
    let mut resolved: Vec<String> = Vec::with_capacity(roles.len());
    for raw in roles {
        let Some(role) = Role::parse(raw) else {
            continue;
        };

        let concrete = if role.is_placeholder() {
            let unit = match role.to_string().as_str() {
                VAR_DEPT_LEADER => ctx.dept.as_deref(),
                VAR_AREA_LEADER => ctx.area.as_deref(),
                _ => None,
            };
            match unit.filter(|u| !u.trim().is_empty()) {
                Some(unit) => Role::unit_leader(unit).to_string(),
                None => continue,
            }
        } else {
            role.to_string()
        };

        if !resolved.contains(&concrete) {
            resolved.push(concrete);
        }
    }
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_normalize() {
        let role = Role::parse("grp:ee#leader").unwrap();
        assert_eq!(role.scheme(), RoleScheme::Grp);
        assert_eq!(role.identifier(), "EE");
        assert_eq!(role.qualifier(), Some("LEADER"));
        assert_eq!(role.to_string(), "GRP:EE#LEADER");

        assert_eq!(normalize_role("usr:jdoe").as_deref(), Some("USR:JDOE"));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(Role::parse("").is_none());
        assert!(Role::parse("jdoe").is_none());
        assert!(Role::parse("FOO:bar").is_none());
        assert!(Role::parse("USR:").is_none());
        assert!(Role::parse("GRP:EE#").is_none());
        assert!(Role::parse("USR:has space").is_none());
    }

    #[test]
    fn test_resolve_placeholders() {
        let ctx = RoleContext {
            dept: Some("ee".to_string()),
            area: None,
        };
        let roles = vec![
            "VAR:DEPT_LEADER".to_string(),
            "VAR:AREA_LEADER".to_string(),
            "usr:alice".to_string(),
            "GRP:EE#LEADER".to_string(),
        ];

        let resolved = resolve_roles(&roles, &ctx);
        assert_eq!(resolved, vec!["GRP:EE#LEADER".to_string(), "USR:ALICE".to_string()]);
    }
}
