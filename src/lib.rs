//! ripple - event-driven field description propagation for metadata catalogs.
//!
//! ripple hosts small handlers that receive metadata-change events from a
//! catalog pipeline, isolate edited field descriptions, and push them onward:
//! across the dataset's lineage via graph mutations, or into an analytics
//! taxonomy via HTTP.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         ripple                              │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Actions: Propagation | Amplitude       Transform: Extract  │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Diff Extractor │ URN Parser │ Lineage Query + Filters      │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Graph Client (GraphQL)     │  Taxonomy Client (HTTP PUT)   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use ripple::action::{Action, PropagationAction};
//! use ripple::config::RippleConfig;
//! use ripple::graph::RestGraphClient;
//!
//! # async fn run(envelope: ripple::event::EventEnvelope) -> ripple::Result<()> {
//! let config = RippleConfig::development();
//! let graph = Arc::new(RestGraphClient::from_config(&config.graph));
//! let action = PropagationAction::new(config.propagation, graph)?;
//!
//! action.act(&envelope).await?;
//! # Ok(())
//! # }
//! ```

pub mod action;
pub mod config;
pub mod diff;
pub mod error;
pub mod event;
pub mod graph;
pub mod lineage;
pub mod transform;
pub mod urn;

pub use error::{Result, RippleError};
