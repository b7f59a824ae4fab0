#![cfg(feature = "subscriber")]

//! Fleet event logging subscriber.
//!
//! Maps fleet events to structured tracing logs with severity matching their operational weight.

use async_trait::async_trait;
use envlabels_core::{FleetEvent, FleetSubscriber};
use tracing::{debug, info, warn};

/// Subscriber that logs every fleet event.
#[derive(Default)]
pub struct FleetLogSubscriber;

/// Sized for connect storms after an orchestrator restart.
const SUBSCRIBER_QUEUE_CAPACITY: usize = 2048;

#[async_trait]
impl FleetSubscriber for FleetLogSubscriber {
    async fn on_event(&self, event: &FleetEvent) {
        log_event(event);
    }

    fn name(&self) -> &'static str {
        "fleet-log"
    }

    fn queue_capacity(&self) -> usize {
        SUBSCRIBER_QUEUE_CAPACITY
    }
}

fn log_event(event: &FleetEvent) {
    let msg = message_for(event);
    match event {
        FleetEvent::NodeOnline { node, env: Ok(env) } => {
            info!(node = %node, env_vars = env.len(), "{msg}")
        }
        FleetEvent::NodeOnline { node, env: Err(e) } => {
            warn!(node = %node, kind = e.kind(), reason = %e, "{msg}")
        }
        FleetEvent::NodeOffline { node } => info!(node = %node, "{msg}"),
        FleetEvent::TopologyChanged { live } => debug!(live = live.len(), "{msg}"),
    }
}

/// Human-readable description used as the primary log message.
fn message_for(event: &FleetEvent) -> &'static str {
    match event {
        FleetEvent::NodeOnline { env: Ok(_), .. } => "node online",
        FleetEvent::NodeOnline { env: Err(_), .. } => "node online, environment unreadable",
        FleetEvent::NodeOffline { .. } => "node offline",
        FleetEvent::TopologyChanged { .. } => "fleet roster changed",
    }
}
