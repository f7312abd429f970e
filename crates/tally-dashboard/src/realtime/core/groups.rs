use dashmap::{DashMap, DashSet};

/// Group membership: group -> sessions, session -> groups.
#[derive(Default)]
pub struct Groups {
    group_to_sessions: DashMap<String, DashSet<String>>,
    session_to_groups: DashMap<String, DashSet<String>>,
}

impl Groups {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent: joining twice leaves one membership.
    pub fn join(&self, group: &str, session_id: &str) {
        self.group_to_sessions
            .entry(group.to_string())
            .or_default()
            .insert(session_id.to_string());

        self.session_to_groups
            .entry(session_id.to_string())
            .or_default()
            .insert(group.to_string());
    }

    /// Snapshot of a group's sessions; empty for unknown groups.
    pub fn members(&self, group: &str) -> Vec<String> {
        self.group_to_sessions
            .get(group)
            .map(|set| set.iter().map(|s| s.key().clone()).collect())
            .unwrap_or_default()
    }

    pub fn len(&self, group: &str) -> usize {
        self.group_to_sessions.get(group).map(|s| s.len()).unwrap_or(0)
    }

    /// Drop a session from every group it joined; empty groups are removed.
    pub fn cleanup_session(&self, session_id: &str) {
        let Some((_, groups)) = self.session_to_groups.remove(session_id) else {
            return;
        };
        for g in groups.iter() {
            let group = g.key();
            let now_empty = match self.group_to_sessions.get(group) {
                Some(set) => {
                    set.remove(session_id);
                    set.is_empty()
                }
                None => false,
            };
            if now_empty {
                self.group_to_sessions.remove_if(group, |_, set| set.is_empty());
            }
        }
    }
}
