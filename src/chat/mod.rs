//! Live chat feed simulator.
//!
//! ARCHITECTURE
//! ============
//! Leaves first: `message` (model) → `store` (append-only log) →
//! `script` (explicit configuration) → `generator` (synthetic activity) →
//! `composer` (local drafts) → `feed` (rendered, auto-following view) →
//! `session` (one task per mounted stream view, with cancellation).

pub mod composer;
pub mod feed;
pub mod generator;
pub mod message;
pub mod script;
pub mod session;
pub mod store;
