//! The manager seam
//!
//! The job server this crate binds to the relay lives outside the
//! workspace; these traits are its contract. A manager exposes the command
//! surface ([`JobManager`]) and accepts a [`StateChangeHandler`] it must
//! invoke on every job state transition.

use std::sync::Arc;

use async_trait::async_trait;

use tether_core::domain::job::JobState;

/// Invoked by a manager on every job state transition.
///
/// The binding layer installs a handler that publishes the transition to
/// the relay. Errors are returned to the manager; deciding what a failed
/// status publication means for the job is the manager's call.
#[async_trait]
pub trait StateChangeHandler: Send + Sync {
    async fn on_state_change(&self, state: JobState, job_id: &str) -> anyhow::Result<()>;
}

/// The job-execution server bound to the relay.
///
/// Implementations are expected to use interior mutability for
/// `set_state_change_callback`; the binding layer holds managers as
/// `Arc<dyn JobManager>` and installs the callback after construction.
#[async_trait]
pub trait JobManager: Send + Sync {
    /// Identity used to derive this manager's topic names.
    fn name(&self) -> &str;

    /// Accept a job described by an arbitrary structured payload.
    async fn submit_job(&self, payload: serde_json::Value) -> anyhow::Result<()>;

    /// Terminate a job.
    async fn kill(&self, job_id: &str) -> anyhow::Result<()>;

    /// Re-fire the state-change callback with the job's current state, so
    /// a status query can be answered over the update topic.
    async fn trigger_state_change_callback(&self, job_id: &str) -> anyhow::Result<()>;

    /// Install the handler to invoke on every state transition.
    fn set_state_change_callback(&self, handler: Arc<dyn StateChangeHandler>);
}
