//! # Módulo API
//!
//! Este módulo contiene todas las rutas y controladores de la API REST.
//!
//! ## Módulos principales
//!
//! - [`customer`] - Gestión de clientes (listado, búsqueda, alta, edición)
//! - [`reservation`] - Reservas de un cliente
//! - [`middleware`] - Logging de peticiones y de cadenas de errores

pub mod customer;
pub mod middleware;
pub mod reservation;

// Re-exportar tipos comunes para facilitar su uso
pub use crate::errors::{AppError, AppResult, ErrorResponse};

use actix_web::web;

/// Configura todas las rutas de la API
///
/// ## Rutas configuradas
///
/// - `/customers/*` - Ver [`customer::routes`]
/// - `/customers/{id}/reservations` - Ver [`reservation::routes`]
///
/// Los cuerpos JSON mal formados se responden como errores de validación (400).
///
/// # Ejemplo
///
/// ```no_run
/// use actix_web::App;
/// use lunchly::api;
///
/// let app = App::new()
///     .configure(api::init_routes);
/// ```
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        AppError::Validation(format!("Payload inválido: {}", err)).into()
    }));

    customer::routes(cfg);
    reservation::routes(cfg);
}
