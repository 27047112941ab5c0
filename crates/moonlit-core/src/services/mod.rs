//! Core services - the application's business logic layer.
//!
//! Services here orchestrate between ports and domain logic. They don't know
//! about concrete implementations.

mod conversation;

pub use conversation::ConversationOrchestrator;
