//! # Bitacora Shared
//!
//! Request/response types shared between the backend and API clients.
//! In a full-stack Rust setup this crate also compiles to WASM.

pub mod dto;
pub mod response;

pub use response::{ApiResponse, ErrorResponse};
