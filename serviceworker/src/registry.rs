//! Live service records
//!
//! In-memory mapping from service object id to the pid running it. Rebuilt
//! through RESTORE commands after a daemon restart; never persisted.

use std::collections::HashMap;

use nix::unistd::Pid;
use shared::ObjectId;

#[derive(Debug, Default)]
pub struct ServiceRegistry {
    records: HashMap<ObjectId, Pid>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self {
            records: HashMap::new(),
        }
    }

    /// Register a live service. A duplicate of a live object id is rejected
    /// and the existing record wins; returns whether the record was added.
    pub fn insert(&mut self, object_id: ObjectId, pid: Pid) -> bool {
        if self.records.contains_key(&object_id) {
            return false;
        }
        self.records.insert(object_id, pid);
        true
    }

    pub fn contains(&self, object_id: &ObjectId) -> bool {
        self.records.contains_key(object_id)
    }

    pub fn pid_of(&self, object_id: &ObjectId) -> Option<Pid> {
        self.records.get(object_id).copied()
    }

    /// Drop the record for a reaped pid; returns its object id if one was
    /// registered (the anchor and already-removed pids are not)
    pub fn remove_by_pid(&mut self, pid: Pid) -> Option<ObjectId> {
        let object_id = self
            .records
            .iter()
            .find(|(_, &recorded)| recorded == pid)
            .map(|(id, _)| id.clone())?;
        self.records.remove(&object_id);
        Some(object_id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn object_ids(&self) -> Vec<ObjectId> {
        self.records.keys().cloned().collect()
    }
}
