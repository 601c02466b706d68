//! Manager-to-relay wiring

use std::sync::Arc;

use tracing::info;

use tether_client::RelayClient;
use tether_core::domain::topic::ManagerTopics;

use crate::config::Config;
use crate::consumer::{ConsumerBinding, ConsumerLoop};
use crate::manager::JobManager;
use crate::publisher::StatusPublisher;
use crate::state::RelayState;

/// An established manager-relay binding.
#[derive(Debug, Clone)]
pub struct RelayBinding {
    /// The topic names derived for the bound manager.
    pub topics: ManagerTopics,
}

/// Bind a manager to the relay.
///
/// Derives the manager's topic names from the configured prefix and the
/// manager's identity, then, per the config flags:
/// - `publish`: installs a [`StatusPublisher`] as the manager's
///   state-change callback, so every job transition lands on the status
///   update topic;
/// - `consume`: spawns a consumer worker subscribed to the manager's
///   command topics and registers it with `state` for shutdown.
///
/// Independent bindings for the same topics operate without mutual
/// awareness; nothing here coordinates across managers.
pub fn bind_manager(
    config: &Config,
    client: Arc<RelayClient>,
    manager: Arc<dyn JobManager>,
    state: Arc<RelayState>,
) -> RelayBinding {
    let topics = ManagerTopics::derive(&config.topic_prefix, manager.name());
    info!(
        manager = manager.name(),
        setup = %topics.setup,
        status_update = %topics.status_update,
        "binding manager to relay"
    );

    if config.publish {
        let publisher = StatusPublisher::new(
            Arc::clone(&client),
            topics.status_update.clone(),
            manager.name().to_string(),
        );
        manager.set_state_change_callback(Arc::new(publisher));
    }

    if config.consume {
        let binding = ConsumerBinding::new(&topics, Arc::clone(&manager));
        let consumer = ConsumerLoop::new(
            Arc::clone(&client),
            binding,
            Arc::clone(&state),
            config.poll_timeout,
        );
        state.register(tokio::spawn(consumer.run()));
    }

    RelayBinding { topics }
}
