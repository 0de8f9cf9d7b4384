//! Authorization predicates over role strings.
//!
//! Pure functions of the actor's role set and configuration; no storage access.

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    normalize_role, resolve_roles, Actor, AuthConfig, ChecklistSubject, Role, RoleContext, Target,
};

/// Decides who may manage targets and who may set subject statuses.
#[derive(Debug, Clone)]
pub struct Authorizer {
    admin_roles: Vec<String>,
    override_roles: Vec<String>,
}

impl Authorizer {
    /// Build from configuration. Malformed role strings are dropped.
    pub fn new(config: &AuthConfig) -> Self {
        let normalize = |roles: &[String]| -> Vec<String> {
            roles.iter().filter_map(|r| normalize_role(r)).collect()
        };
        Self {
            admin_roles: normalize(&config.admin_roles),
            override_roles: normalize(&config.override_roles),
        }
    }

    /// True if the actor leads `owner_unit` or holds a system-admin role.
    pub fn can_manage(&self, actor: &Actor, owner_unit: &str) -> bool {
        if actor.has_any_role(&self.admin_roles) {
            return true;
        }
        let unit = owner_unit.trim();
        !unit.is_empty() && actor.has_role(&Role::unit_leader(unit).to_string())
    }

    /// True if the actor is one of the subject's resolved assignees or holds a
    /// system-override role.
    ///
    /// `VAR:*` assignees are resolved against `ctx` before comparison.
    pub fn can_assign_status(&self, actor: &Actor, subject: &ChecklistSubject, ctx: &RoleContext) -> bool {
        if actor.has_any_role(&self.override_roles) {
            return true;
        }
        resolve_roles(&subject.assignees, ctx)
            .iter()
            .any(|role| actor.roles().contains(role))
    }

    pub fn ensure_can_manage(&self, actor: &Actor, target: &Target) -> DomainResult<()> {
        if self.can_manage(actor, target.owner_unit()) {
            Ok(())
        } else {
            Err(DomainError::forbidden(format!(
                "{} may not manage {} {}",
                actor.username(),
                target.target_type(),
                target.name()
            )))
        }
    }
}

impl Default for Authorizer {
    fn default() -> Self {
        Self::new(&AuthConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{ChecklistType, Slot, VAR_AREA_LEADER};

    #[test]
    fn test_can_manage_unit_leader_or_admin() {
        let auth = Authorizer::default();
        assert!(auth.can_manage(&Actor::new("lee", ["grp:lina#leader"]), "LINA"));
        assert!(!auth.can_manage(&Actor::new("lee", ["GRP:LINA"]), "LINA"));
        assert!(!auth.can_manage(&Actor::new("lee", ["GRP:FS#LEADER"]), "LINA"));
        assert!(auth.can_manage(&Actor::new("root", ["sys:admin"]), "LINA"));
        assert!(!auth.can_manage(&Actor::new("lee", ["GRP:#LEADER"]), ""));
    }

    #[test]
    fn test_configured_admin_roles() {
        let auth = Authorizer::new(&AuthConfig {
            admin_roles: vec!["GRP:OPS".to_string(), "not a role".to_string()],
            override_roles: vec![],
        });
        assert!(auth.can_manage(&Actor::new("ops", ["GRP:OPS"]), "LINA"));
        assert!(!auth.can_manage(&Actor::new("root", ["SYS:ADMIN"]), "LINA"));
    }

    #[test]
    fn test_can_assign_status_resolves_placeholders() {
        let auth = Authorizer::default();
        let slot = Target::Slot(Slot::new("FS1_CSS", "ARR01"));
        let subject = ChecklistSubject::standard(ChecklistType::SlotDefault, "AM", "Area Manager", 10)
            .with_assignees([VAR_AREA_LEADER]);
        let ctx = slot.role_context();

        assert!(auth.can_assign_status(&Actor::new("amy", ["GRP:ARR01#LEADER"]), &subject, &ctx));
        assert!(!auth.can_assign_status(&Actor::new("amy", ["VAR:AREA_LEADER"]), &subject, &ctx));
        assert!(auth.can_assign_status(&Actor::new("bot", ["SYS:RUNCHECK"]), &subject, &ctx));
    }

    #[test]
    fn test_can_assign_status_by_user_role() {
        let auth = Authorizer::default();
        let subject = ChecklistSubject::standard(ChecklistType::DeviceDefault, "EE", "EE", 0)
            .with_assignees(["USR:alice"]);
        let ctx = RoleContext::default();
        assert!(auth.can_assign_status(&Actor::new("Alice", Vec::<String>::new()), &subject, &ctx));
        assert!(!auth.can_assign_status(&Actor::new("bob", Vec::<String>::new()), &subject, &ctx));
    }
}
