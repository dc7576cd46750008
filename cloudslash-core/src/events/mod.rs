//! Pipeline progress events, consumed by shells (TUI, CI notifiers).

pub mod dispatcher;
pub mod handler;
pub mod types;

pub use dispatcher::EventDispatcher;
pub use handler::{NullEventHandler, PipelineEventHandler};
