//! Domain layer for Parley
//!
//! Contains the conversion coordinate space, the drift state machine, the
//! phonetic profile and the records exchanged with human reviewers.
//! This layer performs no I/O and defines the ubiquitous language.

pub mod entities;
pub mod errors;
pub mod value_objects;

pub use entities::*;
pub use errors::DomainError;
pub use value_objects::*;
