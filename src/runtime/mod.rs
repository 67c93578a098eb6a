//! Runtime adapters: Tokio spawner, HTTP API and server bootstrap.

pub mod api;
pub mod server;
pub mod tokio_spawner;

pub use api::{create_router, ApiError, EnqueueRequest, WebhookEvent};
pub use server::{serve, shutdown_signal};
pub use tokio_spawner::TokioSpawner;
