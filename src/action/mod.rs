//! Event-driven actions.
//!
//! An action receives event envelopes from the surrounding pipeline and
//! reacts with side effects: graph mutations, external API calls. Actions
//! hold no mutable state between invocations, so independent invocations may
//! run concurrently.

pub mod amplitude;
pub mod propagation;

use crate::error::Result;
use crate::event::EventEnvelope;
use async_trait::async_trait;

pub use amplitude::{AmplitudeAction, TaxonomyClient};
pub use propagation::{Outcome, PropagationAction, SkipReason};

/// Trait for event-driven actions.
#[async_trait]
pub trait Action: Send + Sync {
    /// Get the action name.
    fn name(&self) -> &str;

    /// Handle one event envelope.
    async fn act(&self, envelope: &EventEnvelope) -> Result<()>;

    /// Release resources on pipeline shutdown.
    async fn close(&self) -> Result<()> {
        Ok(())
    }
}
