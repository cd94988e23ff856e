//! # Lunchly
//!
//! Gestor de reservas de restaurante: clientes, sus reservas y una API REST
//! para listarlos, buscarlos y editarlos.
//!
//! ## Arquitectura
//!
//! ```text
//! Frontend
//!     ↓ HTTP/JSON
//! API REST (Actix Web)          -> api
//!     ↓
//! Clientes / Reservas           -> db::customer, db::reservation
//!     ↓ SQL parametrizado
//! Pasarela de almacenamiento    -> db::gateway (sqlx + SQLite)
//! ```

pub mod api;
pub mod config;
pub mod db;
pub mod errors;

pub use errors::{AppError, AppResult};
