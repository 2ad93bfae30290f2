//! # Inkpress Shared
//!
//! Request and response bodies of the blog API.
//! Kept free of server dependencies so clients can reuse them.

pub mod dto;
pub mod response;

pub use response::{ErrorResponse, PaginatedResponse};
