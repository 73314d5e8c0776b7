//! Dispatch Module
//!
//! Serializes every cache operation through one bounded queue and one
//! consumer task. The consumer owns the cache outright, so this queue is the
//! only synchronization point for the engine; producers that find the queue
//! full are turned away instead of waiting.

mod action;
mod dispatcher;

pub use action::Action;
pub use dispatcher::{ActionConsumer, Dispatcher, QueueStats};
