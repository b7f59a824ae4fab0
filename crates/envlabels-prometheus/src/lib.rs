//! Prometheus metrics backend for the environment label contributor.
//!
//! Provides [`PrometheusMetrics`], an implementation of [`envlabels_core::MetricsBackend`].
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use envlabels_core::{LabelCache, LabelContributor, StaticFleet};
//! use envlabels_prometheus::PrometheusMetrics;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let metrics = PrometheusMetrics::new()?;
//! let contributor = LabelContributor::new(
//!     Arc::new(LabelCache::new()),
//!     Arc::new(StaticFleet::new()),
//! )
//! .with_metrics(Arc::new(metrics.clone()));
//!
//! let _ = contributor.resolve_labels(&"w0".parse()?);
//! assert!(metrics.render()?.contains("envlabels_resolutions_total"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Metrics
//! - `envlabels_cache_writes_total{kind}` - Counter
//! - `envlabels_resolutions_total{outcome}` - Counter
//! - `envlabels_sweeps_total` - Counter
//! - `envlabels_swept_entries_total` - Counter
//! - `envlabels_snapshot_failures_total{error_kind}` - Counter
//! - `envlabels_rejected_tokens_total` - Counter
//!
//! This crate does not serve `/metrics`; expose [`PrometheusMetrics::gather`] through the host's
//! HTTP stack.

mod backend;
pub use backend::PrometheusMetrics;

pub use prometheus::{Encoder, Registry, TextEncoder};
