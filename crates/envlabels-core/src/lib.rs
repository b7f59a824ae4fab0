pub mod cache;
pub mod contributor;
pub mod error;
pub mod events;
pub mod finder;
pub mod fleet;
pub mod grammar;
pub mod metrics;

pub use cache::LabelCache;
pub use contributor::LabelContributor;
pub use error::{CoreError, SnapshotError};
pub use events::{ContributorSubscriber, FleetBus, FleetEvent, FleetSubscriber};
pub use finder::{LabelFinder, LabelResolver};
pub use fleet::{FleetView, StaticFleet};
pub use grammar::{DefaultGrammar, LabelGrammar};
pub use metrics::{
    CacheWrite, MetricsBackend, MetricsHandle, NoOpMetrics, ResolveOutcome, noop_metrics,
};

pub mod prelude {
    pub use crate::cache::LabelCache;
    pub use crate::contributor::LabelContributor;
    pub use crate::error::{CoreError, SnapshotError};
    pub use crate::events::{FleetBus, FleetEvent, FleetSubscriber};
    pub use crate::finder::{LabelFinder, LabelResolver};
    pub use crate::fleet::FleetView;
}
