//! ElevenLabs adapter: active-call polling and outbound-call dispatch.

pub mod active_count;
pub mod client;
pub mod payload;

pub use active_count::{ActiveCallsDecoder, ActiveCallsShape};
pub use client::{receipt_from_response, ElevenLabsClient};
pub use payload::{CallPayload, FieldAlias, OutboundCallRequest};
