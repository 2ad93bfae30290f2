//! # Inkpress Core
//!
//! The domain layer of the Inkpress blog API: entities, validation rules,
//! slug derivation, comment threading, query objects and the services that
//! tie them to the repository ports.
//! This crate has no infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod ports;
pub mod projection;
pub mod services;
pub mod slug;
pub mod thread;
pub mod validation;

pub use error::{DomainError, RepoError};
pub use slug::slugify;
pub use validation::FieldErrors;
