//! Infrastructure adapters: the job queue and the remote call platform.

pub mod elevenlabs;
pub mod queue;

pub use elevenlabs::ElevenLabsClient;
pub use queue::InMemoryJobQueue;
