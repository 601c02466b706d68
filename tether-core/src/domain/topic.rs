//! Topic name derivation
//!
//! Topic names are derived from an optional deployment prefix, a fixed base
//! topic, and the identity of the bound manager. Segments are joined with
//! `_`; the prefix is omitted when empty and the manager name is omitted
//! when it is the default-manager sentinel, so a bare deployment with a
//! single unnamed manager polls plain `job_setup`.

/// Sentinel identity of the default (unnamed) manager.
pub const DEFAULT_MANAGER_NAME: &str = "_default_";

/// Base topic for job setup commands.
pub const JOB_SETUP: &str = "job_setup";
/// Base topic for job status query commands.
pub const JOB_STATUS_REQUEST: &str = "job_status_request";
/// Base topic for job kill commands.
pub const JOB_KILL: &str = "job_kill";
/// Base topic for published job state transitions.
pub const JOB_STATUS_UPDATE: &str = "job_status_update";

/// Compose a topic name from prefix, base topic and manager identity.
pub fn compose_topic(prefix: &str, base: &str, manager_name: &str) -> String {
    let mut segments: Vec<&str> = Vec::with_capacity(3);
    if !prefix.is_empty() {
        segments.push(prefix);
    }
    segments.push(base);
    if !manager_name.is_empty() && manager_name != DEFAULT_MANAGER_NAME {
        segments.push(manager_name);
    }
    segments.join("_")
}

/// The full topic set for one bound manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerTopics {
    pub setup: String,
    pub status_request: String,
    pub kill: String,
    pub status_update: String,
}

impl ManagerTopics {
    /// Derive the topic set for a manager under an optional prefix.
    pub fn derive(prefix: &str, manager_name: &str) -> Self {
        Self {
            setup: compose_topic(prefix, JOB_SETUP, manager_name),
            status_request: compose_topic(prefix, JOB_STATUS_REQUEST, manager_name),
            kill: compose_topic(prefix, JOB_KILL, manager_name),
            status_update: compose_topic(prefix, JOB_STATUS_UPDATE, manager_name),
        }
    }

    /// Topics a consumer subscribes to (everything except the update topic).
    pub fn consumed(&self) -> Vec<String> {
        vec![
            self.setup.clone(),
            self.status_request.clone(),
            self.kill.clone(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_manager_and_empty_prefix_collapse_to_base() {
        assert_eq!(compose_topic("", JOB_SETUP, DEFAULT_MANAGER_NAME), "job_setup");
    }

    #[test]
    fn test_prefix_and_manager_are_joined() {
        assert_eq!(
            compose_topic("prod", JOB_SETUP, "cluster_a"),
            "prod_job_setup_cluster_a"
        );
    }

    #[test]
    fn test_empty_manager_name_is_omitted() {
        assert_eq!(compose_topic("prod", JOB_KILL, ""), "prod_job_kill");
    }

    #[test]
    fn test_derive_builds_the_full_set() {
        let topics = ManagerTopics::derive("prod", "cluster_a");
        assert_eq!(topics.setup, "prod_job_setup_cluster_a");
        assert_eq!(topics.status_request, "prod_job_status_request_cluster_a");
        assert_eq!(topics.kill, "prod_job_kill_cluster_a");
        assert_eq!(topics.status_update, "prod_job_status_update_cluster_a");
        assert_eq!(
            topics.consumed(),
            vec![
                "prod_job_setup_cluster_a".to_string(),
                "prod_job_status_request_cluster_a".to_string(),
                "prod_job_kill_cluster_a".to_string(),
            ]
        );
    }
}
