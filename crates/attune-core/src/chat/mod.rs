//! Conversation thread persistence abstraction for Attune.
//!
//! Defines the `ThreadRepository` trait that the infrastructure layer
//! implements for append-only thread storage.

pub mod repository;
