//! Business logic services (use cases).
//!
//! Services orchestrate agents and repository calls. They depend on traits
//! (ports), never on concrete infrastructure implementations.

pub mod assistant;
