//! `voice-slot-scheduler` binary.

use voice_slot_scheduler::config::AppConfig;
use voice_slot_scheduler::core::AppResult;
use voice_slot_scheduler::runtime::serve;
use voice_slot_scheduler::util::init_tracing;

#[tokio::main]
async fn main() -> AppResult<()> {
    dotenvy::dotenv().ok();
    init_tracing();
    serve(AppConfig::from_env()).await
}
