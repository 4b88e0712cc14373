use crate::error::{ProvisionError, ProvisionResult};
use crate::report::{Operation, Outcome, RunReport};
use crate::resources::{HandleKey, RemoteId, ResourceType, SpecId};
use serde::Serialize;
use std::collections::HashMap;

/// Resolution status of one resource during a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HandleStatus {
    Unresolved,
    Found,
    Created,
    Failed,
}

impl HandleStatus {
    /// Found or Created: the remote id is known and fixed
    pub fn is_resolved(&self) -> bool {
        matches!(self, HandleStatus::Found | HandleStatus::Created)
    }
}

/// Run-time state of one resource
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceHandle {
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    pub natural_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<SpecId>,
    pub remote_id: Option<RemoteId>,
    pub status: HandleStatus,
}

/// Handles of every resource touched by a run, keyed by type and natural key
/// (plus parent spec for scoped resources).
///
/// Built fresh for each run and never persisted.
#[derive(Debug, Clone)]
pub struct RunContext {
    handles: HashMap<HandleKey, ResourceHandle>,
    order: Vec<HandleKey>,
    report: RunReport,
}

impl RunContext {
    pub fn new(operation: Operation) -> Self {
        Self {
            handles: HashMap::new(),
            order: Vec::new(),
            report: RunReport::new(operation),
        }
    }

    /// Start tracking `key` as Unresolved if it is not tracked yet
    pub fn track(&mut self, key: &HandleKey) {
        if self.handles.contains_key(key) {
            return;
        }
        self.order.push(key.clone());
        self.handles.insert(
            key.clone(),
            ResourceHandle {
                resource_type: key.resource_type,
                natural_key: key.natural_key.clone(),
                scope: key.scope.clone(),
                remote_id: None,
                status: HandleStatus::Unresolved,
            },
        );
    }

    pub fn handle(&self, key: &HandleKey) -> Option<&ResourceHandle> {
        self.handles.get(key)
    }

    /// Handles in the order they were first tracked
    pub fn handles(&self) -> impl Iterator<Item = &ResourceHandle> {
        self.order.iter().filter_map(|key| self.handles.get(key))
    }

    /// Remote id of a Found or Created handle
    pub fn remote_id(&self, key: &HandleKey) -> Option<RemoteId> {
        self.handles
            .get(key)
            .filter(|h| h.status.is_resolved())
            .and_then(|h| h.remote_id)
    }

    pub fn mark_found(&mut self, key: &HandleKey, id: RemoteId) -> ProvisionResult<()> {
        self.bind(key, id, HandleStatus::Found)?;
        self.report.record(key, Outcome::Found { id });
        Ok(())
    }

    pub fn mark_created(&mut self, key: &HandleKey, id: RemoteId) -> ProvisionResult<()> {
        self.bind(key, id, HandleStatus::Created)?;
        self.report.record(key, Outcome::Created { id });
        Ok(())
    }

    /// Record a failure; a handle that is already resolved keeps its id and status
    pub fn mark_failed(&mut self, key: &HandleKey, error: &ProvisionError) {
        self.track(key);
        if let Some(handle) = self.handles.get_mut(key) {
            if !handle.status.is_resolved() {
                handle.status = HandleStatus::Failed;
            }
        }
        self.report.record(
            key,
            Outcome::Failed {
                error: error.to_string(),
            },
        );
    }

    /// Record an outcome that does not change the handle
    pub fn note(&mut self, key: &HandleKey, outcome: Outcome) {
        self.track(key);
        self.report.record(key, outcome);
    }

    fn bind(&mut self, key: &HandleKey, id: RemoteId, status: HandleStatus) -> ProvisionResult<()> {
        self.track(key);
        let handle = self
            .handles
            .get_mut(key)
            .ok_or_else(|| ProvisionError::InvalidPlan(format!("{} is not tracked", key)))?;

        if handle.status.is_resolved() {
            return Err(ProvisionError::HandleRebind {
                resource_type: key.resource_type,
                natural_key: key.natural_key.clone(),
                current: handle.remote_id.map_or(0, RemoteId::get),
            });
        }

        handle.remote_id = Some(id);
        handle.status = status;
        Ok(())
    }

    pub fn report(&self) -> &RunReport {
        &self.report
    }

    pub fn count(&self, status: HandleStatus) -> usize {
        self.handles.values().filter(|h| h.status == status).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag() -> HandleKey {
        HandleKey::new(ResourceType::Tag, "Semente1")
    }

    #[test]
    fn test_track_starts_unresolved() {
        let mut ctx = RunContext::new(Operation::Apply);
        ctx.track(&tag());
        let handle = ctx.handle(&tag()).unwrap();
        assert_eq!(handle.status, HandleStatus::Unresolved);
        assert_eq!(handle.remote_id, None);
        assert_eq!(ctx.remote_id(&tag()), None);
    }

    #[test]
    fn test_resolved_id_is_immutable() {
        let mut ctx = RunContext::new(Operation::Apply);
        ctx.mark_found(&tag(), RemoteId::new(42)).unwrap();

        let err = ctx.mark_created(&tag(), RemoteId::new(43)).unwrap_err();
        assert!(matches!(err, ProvisionError::HandleRebind { current: 42, .. }));
        assert_eq!(ctx.remote_id(&tag()), Some(RemoteId::new(42)));
        assert_eq!(ctx.handle(&tag()).unwrap().status, HandleStatus::Found);
    }

    #[test]
    fn test_failure_does_not_unbind() {
        let mut ctx = RunContext::new(Operation::Apply);
        ctx.mark_created(&tag(), RemoteId::new(5)).unwrap();
        ctx.mark_failed(
            &tag(),
            &ProvisionError::InvalidPlan("late failure".to_string()),
        );
        assert_eq!(ctx.handle(&tag()).unwrap().status, HandleStatus::Created);
        assert!(ctx.report().has_failures());
    }

    #[test]
    fn test_scoped_handles_are_distinct() {
        let mut ctx = RunContext::new(Operation::Apply);
        let event = HandleKey::new(ResourceType::CampaignEvent, "Send email (D+1)");
        let first = event.clone().within(SpecId::new("campaign_a"));
        let second = event.within(SpecId::new("campaign_b"));

        ctx.mark_created(&first, RemoteId::new(31)).unwrap();
        ctx.mark_created(&second, RemoteId::new(32)).unwrap();

        assert_eq!(ctx.remote_id(&first), Some(RemoteId::new(31)));
        assert_eq!(ctx.remote_id(&second), Some(RemoteId::new(32)));
        assert_eq!(ctx.count(HandleStatus::Created), 2);
    }

    #[test]
    fn test_handles_keep_tracking_order() {
        let mut ctx = RunContext::new(Operation::Apply);
        let field = HandleKey::new(ResourceType::CustomField, "profissao");
        ctx.track(&field);
        ctx.track(&tag());
        ctx.track(&field);

        let keys: Vec<&str> = ctx.handles().map(|h| h.natural_key.as_str()).collect();
        assert_eq!(keys, vec!["profissao", "Semente1"]);
    }
}
