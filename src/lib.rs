//! Privacy-protection middleware for agent runtimes: classifies every
//! message, tool call, and tool result into a sensitivity tier, desensitizes
//! what leaves the device, and keeps a dual-track history so the local model
//! always sees the full record while the cloud model only ever sees the
//! clean one.
//!
//! The [`Orchestrator`] is the single entry point a host runtime drives
//! through the six lifecycle checkpoints in [`context::Checkpoint`].

pub mod audit;
pub mod config;
pub mod context;
pub mod detect;
pub mod error;
pub mod events;
pub mod fileconv;
pub mod guard;
pub mod llm;
pub mod memory;
pub mod orchestrator;
pub mod persistence;
pub mod privacy;
pub mod session;
pub mod tier;

pub use config::Config;
pub use context::{Checkpoint, DetectionContext};
pub use error::{PrivacyError, Result};
pub use orchestrator::{Orchestrator, RoutingDecision};
pub use tier::{Action, Tier};

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Initializes the `tracing` subscriber for a host process embedding this
/// crate: an `EnvFilter` seeded from `RUST_LOG` (falling back to `info` for
/// this crate and `warn` elsewhere) plus a formatting layer, structured JSON
/// when `json` is set and human-readable otherwise. Call once at process
/// startup, before constructing an `Orchestrator`.
pub fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "a3s_privacy_guard=info,warn".into());
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
