//! # cloudslash-core
//!
//! Foundation crate for the cloudslash waste-discovery engine.
//! Defines the intern pool, the property value model, errors, config,
//! pipeline events, tracing bootstrap, and shared constants.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod events;
pub mod tracing;
pub mod types;

// Re-export the most commonly used types at the crate root.
pub use config::SweepConfig;
pub use errors::error_code::SlashErrorCode;
pub use events::dispatcher::EventDispatcher;
pub use events::handler::{NullEventHandler, PipelineEventHandler};
pub use types::collections::{FxHashMap, FxHashSet};
pub use types::interning::{intern, resolve, InternedId, Interner};
pub use types::value::Value;
