//! Event transformers.
//!
//! A transformer rewrites an envelope on its way through the pipeline,
//! typically attaching metadata for a downstream action. Returning `None`
//! drops the event.

pub mod extract;

use crate::error::Result;
use crate::event::EventEnvelope;
use async_trait::async_trait;

pub use extract::ExtractTransformer;

/// Trait for event transformers.
#[async_trait]
pub trait Transformer: Send + Sync {
    /// Get the transformer name.
    fn name(&self) -> &str;

    /// Rewrite one envelope, or drop it by returning `None`.
    async fn transform(&self, envelope: EventEnvelope) -> Result<Option<EventEnvelope>>;
}
