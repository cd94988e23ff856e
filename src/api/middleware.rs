//! # Utilidades de logging
//!
//! Registro de cada petición entrante y de cadenas de errores completas.

use actix_web::dev::ServiceRequest;
use std::error::Error as StdError;

/// Registra la petición entrante antes de despacharla a su ruta
///
/// Se engancha en la aplicación con `wrap_fn`:
///
/// ```no_run
/// use actix_web::{dev::Service, App};
/// use lunchly::api::middleware::log_request;
///
/// let app = App::new().wrap_fn(|req, srv| {
///     log_request(&req);
///     srv.call(req)
/// });
/// ```
pub fn log_request(req: &ServiceRequest) {
    tracing::info!(
        method = %req.method(),
        path = %req.path(),
        "Sending {} request to {}.",
        req.method(),
        req.path()
    );
}

/// Recorre la cadena de `source()` de un error y devuelve cada mensaje
pub fn error_chain<E>(error: &E) -> Vec<String>
where
    E: StdError + 'static,
{
    let mut chain = Vec::new();
    let mut current_error: Option<&dyn StdError> = Some(error);

    while let Some(err) = current_error {
        chain.push(err.to_string());
        current_error = err.source();
    }

    chain
}

/// Registra la cadena completa de errores
///
/// # Parámetros
/// - `error`: Error a analizar y registrar
/// - `context`: Contexto opcional para añadir información
pub fn log_error_chain<E>(error: &E, context: Option<&str>)
where
    E: StdError + 'static,
{
    let error_chain = error_chain(error);

    if let Some(ctx) = context {
        tracing::error!(
            context = %ctx,
            error_chain = ?error_chain,
            "Error with full chain (with context)"
        );
    } else {
        tracing::error!(
            error_chain = ?error_chain,
            "Error with full chain"
        );
    }
}

/// Extension trait para Results que añade logging automático de error chains
///
/// # Ejemplo de uso
/// ```no_run
/// # use lunchly::api::middleware::ErrorLogExt;
/// # fn run() -> Result<(), std::io::Error> {
/// std::fs::read("lunchly.db")
///     .log_error_context("reading database file")?;
/// # Ok(())
/// # }
/// ```
pub trait ErrorLogExt<T, E> {
    /// Loggea la cadena de errores con contexto adicional
    fn log_error_context(self, context: &str) -> Result<T, E>;
}

impl<T, E> ErrorLogExt<T, E> for Result<T, E>
where
    E: StdError + 'static,
{
    fn log_error_context(self, context: &str) -> Result<T, E> {
        if let Err(ref error) = self {
            log_error_chain(error, Some(context));
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;

    #[test]
    fn error_chain_includes_sources() {
        let err = AppError::store("select", sqlx::Error::PoolTimedOut);
        let chain = error_chain(&err);

        assert_eq!(chain.len(), 2);
        assert!(chain[0].contains("select"));
    }

    #[test]
    fn log_error_context_passes_result_through() {
        let ok: Result<i32, AppError> = Ok(3);
        assert_eq!(ok.log_error_context("ctx").ok(), Some(3));

        let err: Result<i32, AppError> = Err(AppError::not_found_id("Cliente", 1));
        assert!(err.log_error_context("ctx").is_err());
    }
}
