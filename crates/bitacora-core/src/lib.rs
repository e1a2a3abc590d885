//! # Bitacora Core
//!
//! The domain layer of the blog API: entities and their validation rules,
//! the error taxonomy, the ports infrastructure must implement, and the
//! services that compose them. Zero infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

pub use error::DomainError;
