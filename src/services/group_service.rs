//! Group membership of slots and devices.

use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use super::authorization::Authorizer;
use super::history_ledger::HistoryLedger;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Actor, Group, Target, TargetType, Tracked, WatchedFields};
use crate::domain::ports::TargetRepository;

pub struct GroupService {
    targets: Arc<dyn TargetRepository>,
    ledger: Arc<HistoryLedger>,
    authorizer: Arc<Authorizer>,
}

impl GroupService {
    pub fn new(targets: Arc<dyn TargetRepository>, ledger: Arc<HistoryLedger>, authorizer: Arc<Authorizer>) -> Self {
        Self {
            targets,
            ledger,
            authorizer,
        }
    }

    /// Add a slot or device to a group.
    ///
    /// Re-adding a current member is a no-op; a member of another group is
    /// rejected.
    pub async fn add_member(&self, actor: &Actor, group_id: Uuid, member_id: Uuid) -> DomainResult<Target> {
        let (group, member) = self.load(actor, group_id, member_id).await?;

        match member.group_id() {
            Some(current) if current == group_id => {
                info!(%group_id, %member_id, "already a member");
                return Ok(member);
            }
            Some(_) => {
                warn!(%group_id, %member_id, "member belongs to another group");
                return Err(DomainError::AlreadyInGroup {
                    member_type: member.target_type(),
                    member_id,
                });
            }
            None => {}
        }

        let member = self.set_group(actor, member, Some(group.id)).await?;
        info!(%group_id, %member_id, actor = actor.username(), "member added to group");
        Ok(member)
    }

    /// Remove a slot or device from a group.
    pub async fn remove_member(&self, actor: &Actor, group_id: Uuid, member_id: Uuid) -> DomainResult<Target> {
        let (_, member) = self.load(actor, group_id, member_id).await?;
        if member.group_id() != Some(group_id) {
            return Err(DomainError::validation(format!(
                "{} {} is not a member of group {group_id}",
                member.target_type(),
                member.name()
            )));
        }

        let member = self.set_group(actor, member, None).await?;
        info!(%group_id, %member_id, actor = actor.username(), "member removed from group");
        Ok(member)
    }

    pub async fn list_members(&self, group_id: Uuid) -> DomainResult<Vec<Target>> {
        self.targets.list_group_members(group_id).await
    }

    async fn load(&self, actor: &Actor, group_id: Uuid, member_id: Uuid) -> DomainResult<(Group, Target)> {
        let group = self
            .targets
            .get_group(group_id)
            .await?
            .ok_or(DomainError::TargetNotFound { target_type: TargetType::Group, id: group_id })?;

        let member = match self.targets.get_target(group.member_type, member_id).await? {
            Some(member) => member,
            None => {
                let other = match group.member_type {
                    TargetType::Device => TargetType::Slot,
                    _ => TargetType::Device,
                };
                return Err(match self.targets.get_target(other, member_id).await? {
                    Some(_) => DomainError::validation(format!(
                        "Group {} only accepts {} members",
                        group.name,
                        group.member_type.as_str().to_lowercase()
                    )),
                    None => DomainError::TargetNotFound { target_type: group.member_type, id: member_id },
                });
            }
        };

        if !self.authorizer.can_manage(actor, &group.owner) {
            return Err(DomainError::forbidden(format!(
                "{} may not manage group {}",
                actor.username(),
                group.name
            )));
        }
        Ok((group, member))
    }

    async fn set_group(&self, actor: &Actor, member: Target, group_id: Option<Uuid>) -> DomainResult<Target> {
        let actor = actor.username();
        let watched = WatchedFields::All;
        let store = &*self.targets;
        Ok(match member {
            Target::Device(device) => {
                let mut tracked = Tracked::loaded(device);
                tracked.group_id = group_id;
                self.ledger.save(&mut tracked, actor, &watched, store).await?;
                Target::Device(tracked.into_inner())
            }
            Target::Slot(slot) => {
                let mut tracked = Tracked::loaded(slot);
                tracked.group_id = group_id;
                self.ledger.save(&mut tracked, actor, &watched, store).await?;
                Target::Slot(tracked.into_inner())
            }
            Target::Group(group) => {
                return Err(DomainError::validation(format!("Group {} cannot be a group member", group.name)));
            }
        })
    }
}
