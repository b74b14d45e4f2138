//! Controller-side application layer.
//!
//! [`CommandRouter`] owns a dispatch table and the callback sets registered
//! for it. Transports hand it raw command buffers; it decodes them, invokes
//! callbacks, logs the outcome, and decides which failures the caller sees.

pub mod config;
pub mod errors;
pub mod logger;
pub mod router;

pub use config::RouterConfig;
pub use errors::{ControllerError, Result};
pub use logger::TerrainLogger;
pub use router::CommandRouter;
