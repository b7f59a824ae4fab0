use std::sync::Arc;

use futures::future::join_all;
use tokio::{
    sync::{Mutex, mpsc},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use super::{FleetEvent, FleetSubscriber};
use crate::error::CoreError;

struct Lane {
    name: &'static str,
    tx: mpsc::Sender<Arc<FleetEvent>>,
}

/// Fan-out of fleet events to registered subscribers.
///
/// Every subscriber owns a bounded queue drained by a dedicated worker task; events reach each
/// subscriber in publish order. `publish` waits for queue space instead of dropping: losing an
/// online or topology event would leave the cache stale.
///
/// Must be created inside a tokio runtime.
pub struct FleetBus {
    lanes: Vec<Lane>,
    workers: Mutex<Vec<(&'static str, JoinHandle<()>)>>,
    cancel: CancellationToken,
}

impl FleetBus {
    /// Spawn one worker per subscriber.
    pub fn new(subscribers: Vec<Arc<dyn FleetSubscriber>>) -> Self {
        let cancel = CancellationToken::new();
        let mut lanes = Vec::with_capacity(subscribers.len());
        let mut workers = Vec::with_capacity(subscribers.len());

        for sub in subscribers {
            let name = sub.name();
            let (tx, rx) = mpsc::channel(sub.queue_capacity().max(1));
            let handle = tokio::spawn(run_lane(sub, rx, cancel.child_token()));
            debug!(subscriber = name, "fleet subscriber started");
            lanes.push(Lane { name, tx });
            workers.push((name, handle));
        }

        Self {
            lanes,
            workers: Mutex::new(workers),
            cancel,
        }
    }

    /// Number of registered subscribers.
    pub fn subscribers(&self) -> usize {
        self.lanes.len()
    }

    /// Deliver `event` to every subscriber queue.
    ///
    /// Queues are fed concurrently: a full queue holds back this call, never the delivery of the
    /// event to the other subscribers. A subscriber whose worker has died is skipped with a
    /// warning. Fails once the bus has been shut down.
    pub async fn publish(&self, event: FleetEvent) -> Result<(), CoreError> {
        if self.cancel.is_cancelled() {
            return Err(CoreError::BusClosed);
        }

        let kind = event.kind();
        let event = Arc::new(event);
        let sends = self.lanes.iter().map(|lane| {
            let event = Arc::clone(&event);
            async move {
                match lane.tx.send(event).await {
                    Ok(()) => trace!(subscriber = lane.name, event = kind, "event queued"),
                    Err(_) => warn!(
                        subscriber = lane.name,
                        event = kind,
                        "subscriber worker gone, event not delivered"
                    ),
                }
            }
        });
        join_all(sends).await;
        Ok(())
    }

    /// Stop accepting events, let workers drain what is queued, then join them.
    ///
    /// Reports the first worker that terminated abnormally (e.g. a panicking subscriber).
    /// Calling it again is a no-op.
    pub async fn shutdown(&self) -> Result<(), CoreError> {
        self.cancel.cancel();
        let workers = std::mem::take(&mut *self.workers.lock().await);

        let mut first_err = None;
        for (name, handle) in workers {
            if let Err(e) = handle.await {
                warn!(subscriber = name, error = %e, "fleet subscriber terminated abnormally");
                first_err.get_or_insert(CoreError::SubscriberFailed(name, e.to_string()));
            }
        }
        debug!("fleet bus stopped");
        first_err.map_or(Ok(()), Err)
    }
}

async fn run_lane(
    sub: Arc<dyn FleetSubscriber>,
    mut rx: mpsc::Receiver<Arc<FleetEvent>>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            next = rx.recv() => match next {
                Some(event) => sub.on_event(&event).await,
                None => break,
            },
            _ = cancel.cancelled() => {
                while let Ok(event) = rx.try_recv() {
                    sub.on_event(&event).await;
                }
                break;
            }
        }
    }
    trace!(subscriber = sub.name(), "fleet subscriber stopped");
}

#[cfg(test)]
mod tests {
    use std::{sync::Mutex, time::Duration};

    use async_trait::async_trait;
    use envlabels_model::{Env, LABELS_ENV_VAR, NodeId, OptIn};

    use super::*;
    use crate::{
        cache::LabelCache, contributor::LabelContributor, events::ContributorSubscriber,
        fleet::{FleetView, StaticFleet},
    };

    #[derive(Default)]
    struct Collect {
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl FleetSubscriber for Collect {
        async fn on_event(&self, event: &FleetEvent) {
            let tag = match event.node() {
                Some(n) => format!("{}:{n}", event.kind()),
                None => event.kind().to_string(),
            };
            self.seen.lock().unwrap().push(tag);
        }

        fn name(&self) -> &'static str {
            "collect"
        }

        fn queue_capacity(&self) -> usize {
            2
        }
    }

    struct Panicky;

    #[async_trait]
    impl FleetSubscriber for Panicky {
        async fn on_event(&self, _event: &FleetEvent) {
            panic!("subscriber bug");
        }

        fn name(&self) -> &'static str {
            "panicky"
        }
    }

    fn node(name: &str) -> NodeId {
        NodeId::new(name).unwrap()
    }

    #[tokio::test]
    async fn delivers_in_publish_order_with_small_queue() {
        let collect = Arc::new(Collect::default());
        let subs: Vec<Arc<dyn FleetSubscriber>> = vec![collect.clone()];
        let bus = FleetBus::new(subs);
        assert_eq!(bus.subscribers(), 1);

        for i in 0..10 {
            bus.publish(FleetEvent::online(node(&format!("n{i}")), Env::new()))
                .await
                .unwrap();
        }
        bus.publish(FleetEvent::topology(Vec::new())).await.unwrap();
        bus.shutdown().await.unwrap();

        let seen = collect.seen.lock().unwrap();
        let expected: Vec<String> = (0..10)
            .map(|i| format!("node_online:n{i}"))
            .chain(std::iter::once("topology_changed".to_string()))
            .collect();
        assert_eq!(*seen, expected);
    }

    /// Blocks on every event until released.
    struct Stalled {
        release: CancellationToken,
    }

    #[async_trait]
    impl FleetSubscriber for Stalled {
        async fn on_event(&self, _event: &FleetEvent) {
            self.release.cancelled().await;
        }

        fn name(&self) -> &'static str {
            "stalled"
        }

        fn queue_capacity(&self) -> usize {
            1
        }
    }

    #[tokio::test]
    async fn publish_after_shutdown_is_rejected() {
        let collect = Arc::new(Collect::default());
        let subs: Vec<Arc<dyn FleetSubscriber>> = vec![collect.clone()];
        let bus = FleetBus::new(subs);

        bus.publish(FleetEvent::offline(node("a"))).await.unwrap();
        bus.shutdown().await.unwrap();

        let res = bus.publish(FleetEvent::offline(node("b"))).await;
        assert!(matches!(res, Err(CoreError::BusClosed)));
        assert_eq!(*collect.seen.lock().unwrap(), vec!["node_offline:a".to_string()]);

        bus.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn stalled_subscriber_does_not_starve_others() {
        let release = CancellationToken::new();
        let collect = Arc::new(Collect::default());
        let subs: Vec<Arc<dyn FleetSubscriber>> = vec![
            Arc::new(Stalled {
                release: release.clone(),
            }),
            collect.clone(),
        ];
        let bus = FleetBus::new(subs);

        let mut held_back = 0;
        for i in 0..5 {
            let publish = bus.publish(FleetEvent::offline(node(&format!("n{i}"))));
            if tokio::time::timeout(Duration::from_millis(200), publish)
                .await
                .is_err()
            {
                held_back += 1;
            }
        }
        assert!(held_back > 0);

        release.cancel();
        bus.shutdown().await.unwrap();

        let expected: Vec<String> = (0..5).map(|i| format!("node_offline:n{i}")).collect();
        assert_eq!(*collect.seen.lock().unwrap(), expected);
    }

    #[tokio::test]
    async fn panicking_subscriber_does_not_block_others() {
        let collect = Arc::new(Collect::default());
        let subs: Vec<Arc<dyn FleetSubscriber>> = vec![Arc::new(Panicky), collect.clone()];
        let bus = FleetBus::new(subs);

        bus.publish(FleetEvent::offline(node("a"))).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        bus.publish(FleetEvent::offline(node("b"))).await.unwrap();

        let res = bus.shutdown().await;
        assert!(matches!(res, Err(CoreError::SubscriberFailed("panicky", _))));
        assert_eq!(
            *collect.seen.lock().unwrap(),
            vec!["node_offline:a".to_string(), "node_offline:b".to_string()]
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn contributor_follows_fleet_events() {
        let fleet = Arc::new(StaticFleet::new());
        let cache = Arc::new(LabelCache::new());
        let contributor = Arc::new(LabelContributor::new(cache.clone(), fleet.clone()));
        let subs: Vec<Arc<dyn FleetSubscriber>> =
            vec![Arc::new(ContributorSubscriber::new(contributor.clone()))];
        let bus = FleetBus::new(subs);

        let w0 = node("w0");
        let w1 = node("w1");
        fleet.register(w0.clone(), OptIn::present());
        fleet.register(w1.clone(), OptIn::absent());
        for n in [&w0, &w1] {
            fleet.set_online(n, true);
            bus.publish(FleetEvent::online(n.clone(), Env::single(LABELS_ENV_VAR, "gpu fast")))
                .await
                .unwrap();
        }

        fleet.remove(&w0);
        bus.publish(FleetEvent::offline(w0.clone())).await.unwrap();
        bus.publish(FleetEvent::topology(fleet.nodes())).await.unwrap();
        bus.shutdown().await.unwrap();

        assert!(cache.get(&w0).is_none());
        assert_eq!(cache.get(&w1).as_deref(), Some("gpu fast"));
        assert!(contributor.resolve_labels(&w1).is_empty());
    }
}
