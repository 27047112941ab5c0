//! Terminal rendering for the chat view.
//!
//! Format-only: everything here turns core snapshots and events into lines.
//! Nothing reads or mutates conversation state.

pub mod events;
pub mod transcript;

pub use events::EventRenderer;
pub use transcript::{format_message, format_session};
