//! Assemble a call scheduler from [`AppConfig`].

use std::sync::Arc;

use crate::config::AppConfig;
use crate::core::{Scheduler, SchedulerError, Spawn};
use crate::infra::elevenlabs::{CallPayload, ElevenLabsClient};
use crate::infra::queue::InMemoryJobQueue;
use crate::runtime::TokioSpawner;

/// Scheduler over call payloads and the in-memory queue.
pub type CallScheduler<O = ElevenLabsClient, G = ElevenLabsClient, S = TokioSpawner> =
    Scheduler<CallPayload, InMemoryJobQueue<CallPayload>, O, G, S>;

/// Build the production scheduler: one ElevenLabs client serves as both
/// capacity oracle and dispatch gateway.
///
/// Auditing is opt-in. The returned scheduler has no audit sink; embedders
/// that want an audit trail attach one with [`Scheduler::with_audit`].
///
/// # Errors
///
/// Returns `SchedulerError::InvalidConfig` if the configuration fails
/// validation or the HTTP client cannot be built.
pub fn build_scheduler<S>(
    cfg: &AppConfig,
    spawner: S,
) -> Result<CallScheduler<ElevenLabsClient, ElevenLabsClient, S>, SchedulerError>
where
    S: Spawn + Clone,
{
    cfg.validate().map_err(SchedulerError::InvalidConfig)?;

    let client = Arc::new(ElevenLabsClient::from_config(cfg)?);
    Ok(Scheduler::new(
        cfg.scheduler_policy(),
        InMemoryJobQueue::new(),
        Arc::clone(&client),
        client,
        spawner,
    ))
}
