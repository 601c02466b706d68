//! Tether Agent
//!
//! Binds a remote job-execution server (a "manager") to the Tether message
//! relay so it can receive control commands and publish job-state updates
//! without a persistent broker connection.
//!
//! Architecture:
//! - Config: connection settings and binding flags, from values or environment
//! - Manager seam: the [`JobManager`] trait an external job server implements
//! - Publisher: forwards job-state transitions to the status update topic
//! - Consumer: long-polls the command topics and dispatches to the manager
//! - State: cooperative shutdown flag and worker registry
//!
//! [`bind_manager`] wires all of it: it derives the manager's topic names,
//! registers the status publisher as the manager's state-change callback,
//! and starts a background consumer worker.

pub mod binding;
pub mod config;
pub mod consumer;
pub mod manager;
pub mod publisher;
pub mod state;

// Re-export commonly used types
pub use binding::{RelayBinding, bind_manager};
pub use config::Config;
pub use consumer::{CommandKind, ConsumerBinding, ConsumerLoop};
pub use manager::{JobManager, StateChangeHandler};
pub use publisher::StatusPublisher;
pub use state::RelayState;
pub use tether_core::domain::job::{JobState, StatusUpdate};
pub use tether_core::domain::topic::ManagerTopics;
