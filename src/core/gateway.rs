//! Contracts for the two external collaborators of the scheduler.
//!
//! The scheduler never talks HTTP itself. It asks a [`CapacityOracle`] how
//! many jobs are active remotely and hands payloads to a [`DispatchGateway`].
//! Both traits are object-safe and `Send + Sync` so they can be shared across
//! spawned dispatch tasks.
//!
//! # Example
//!
//! ```rust,ignore
//! use async_trait::async_trait;
//! use voice_slot_scheduler::core::{CapacityOracle, SchedulerError};
//!
//! struct FixedOracle(u64);
//!
//! #[async_trait]
//! impl CapacityOracle for FixedOracle {
//!     async fn active_count(&self) -> Result<u64, SchedulerError> {
//!         Ok(self.0)
//!     }
//! }
//! ```

use async_trait::async_trait;
use serde::Serialize;

use super::SchedulerError;
use crate::util::serde::TrackingId;

/// Source of the remotely observed active-job count.
#[async_trait]
pub trait CapacityOracle: Send + Sync + 'static {
    /// Count of jobs currently active on the remote side.
    ///
    /// Implementations return `Ok(0)` when no endpoint is configured and an
    /// error for transport failures or non-success responses.
    async fn active_count(&self) -> Result<u64, SchedulerError>;
}

/// Submits a single job payload to the remote system.
#[async_trait]
pub trait DispatchGateway<P>: Send + Sync + 'static
where
    P: Send + Sync + 'static,
{
    /// Start the job remotely and return its identifiers.
    ///
    /// Fails when the payload is incomplete, the remote rejects the request,
    /// or the response carries no identifier at all.
    async fn dispatch(&self, payload: &P) -> Result<DispatchReceipt, SchedulerError>;
}

/// Identifiers extracted from a successful dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchReceipt {
    /// Primary identifier used to correlate terminal notifications.
    pub tracking_id: TrackingId,
    /// Conversation-scoped identifier, when the remote returned one.
    pub conversation_id: Option<String>,
    /// Telephony call SID, when the remote returned one.
    pub call_sid: Option<String>,
}

impl DispatchReceipt {
    /// Receipt carrying only a tracking identifier.
    pub fn tracked(tracking_id: impl Into<TrackingId>) -> Self {
        Self {
            tracking_id: tracking_id.into(),
            conversation_id: None,
            call_sid: None,
        }
    }
}
