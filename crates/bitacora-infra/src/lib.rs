//! # Bitacora Infrastructure
//!
//! Concrete implementations of the ports defined in `bitacora-core`:
//! SeaORM/Postgres repositories, JWT token issuing, Argon2 password
//! hashing and disk-backed upload storage.

pub mod auth;
pub mod database;
pub mod uploads;

pub use auth::{Argon2PasswordService, JwtConfig, JwtTokenService};
pub use database::{Database, DatabaseConfig, PostgresPostRepository, PostgresUserRepository};
pub use uploads::{DiskUploadStore, UploadConfig};
