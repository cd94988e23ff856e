//! # Manejo de errores
//!
//! Taxonomía de errores de la aplicación construida con thiserror:
//!
//! - **Store**: cualquier fallo en el viaje de ida y vuelta a la base de datos
//! - **Validation**: campos requeridos ausentes o payloads mal formados
//! - **NotFound**: búsqueda por ID sin fila asociada
//!
//! La capa de persistencia no recupera nada localmente: todos los errores suben
//! al llamador y la capa HTTP los traduce a códigos de estado.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use std::error::Error;
use thiserror::Error;

/// Tipos de error de la aplicación
#[derive(Error, Debug)]
pub enum AppError {
    /// Error de base de datos con la operación que lo provocó
    ///
    /// Mantiene la cadena de errores original de sqlx para depuración.
    #[error("Error de base de datos en operación '{operation}': {source}")]
    Store {
        operation: String,
        #[source]
        source: sqlx::Error,
    },

    /// Error de validación con campo específico
    #[error("Error de validación en campo '{field}': {message}")]
    ValidationWithField {
        field: String,
        message: String,
    },

    /// Error de validación general
    #[error("Error de validación: {0}")]
    Validation(String),

    /// Error de recurso no encontrado
    #[error("No encontrado: {resource_type} con ID '{id}'")]
    NotFoundWithId {
        resource_type: String,
        id: String,
    },

    /// Error interno con código de rastreo
    #[error("Error interno (trace: {trace_id}): {message}")]
    InternalWithTrace {
        trace_id: String,
        message: String,
    },
}

// Métodos helper para crear errores con contexto
impl AppError {
    /// Crea un error de base de datos con contexto de operación
    pub fn store(operation: &str, source: sqlx::Error) -> Self {
        Self::Store {
            operation: operation.to_string(),
            source,
        }
    }

    /// Crea un error de validación con campo específico
    pub fn validation_field(field: &str, message: &str) -> Self {
        Self::ValidationWithField {
            field: field.to_string(),
            message: message.to_string(),
        }
    }

    /// Crea un error de no encontrado con ID
    pub fn not_found_id(resource_type: &str, id: impl ToString) -> Self {
        Self::NotFoundWithId {
            resource_type: resource_type.to_string(),
            id: id.to_string(),
        }
    }

    /// Crea un error interno con trace ID
    pub fn internal_trace(message: &str, trace_id: Option<String>) -> Self {
        Self::InternalWithTrace {
            trace_id: trace_id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            message: message.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFoundWithId { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::ValidationWithField { .. })
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::ValidationWithField { .. } | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFoundWithId { .. } => StatusCode::NOT_FOUND,
            Self::Store { .. } | Self::InternalWithTrace { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        // Log detallado del error antes de responder
        let body = match self {
            Self::Store { operation, source } => {
                tracing::error!(
                    operation = %operation,
                    error = %source,
                    error_chain = ?source.source(),
                    "Database error occurred"
                );
                ErrorResponse {
                    error: "Error de base de datos".to_string(),
                    message: "Error interno del servidor".to_string(),
                }
            }
            Self::ValidationWithField { field, message } => {
                tracing::warn!(
                    field = %field,
                    message = %message,
                    "Validation error"
                );
                ErrorResponse {
                    error: "Error de validación".to_string(),
                    message: format!("Campo '{}': {}", field, message),
                }
            }
            Self::Validation(message) => {
                tracing::warn!(message = %message, "Validation error");
                ErrorResponse {
                    error: "Error de validación".to_string(),
                    message: message.clone(),
                }
            }
            Self::NotFoundWithId { resource_type, id } => {
                tracing::info!(
                    resource_type = %resource_type,
                    id = %id,
                    "Resource not found"
                );
                ErrorResponse {
                    error: "No encontrado".to_string(),
                    message: format!("{} con ID '{}' no encontrado", resource_type, id),
                }
            }
            Self::InternalWithTrace { trace_id, message } => {
                tracing::error!(
                    trace_id = %trace_id,
                    message = %message,
                    "Internal error with trace"
                );
                ErrorResponse {
                    error: "Error interno".to_string(),
                    message: format!("Error interno (trace: {})", trace_id),
                }
            }
        };

        HttpResponse::build(self.status_code()).json(body)
    }
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

pub type AppResult<T> = Result<T, AppError>;

pub trait ResultExt<T> {
    fn map_err_validation(self, message: &str) -> AppResult<T>;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: std::error::Error + Send + 'static,
{
    fn map_err_validation(self, message: &str) -> AppResult<T> {
        self.map_err(|e| AppError::Validation(format!("{}: {}", message, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_error_kind() {
        assert_eq!(
            AppError::not_found_id("Cliente", 7).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::validation_field("firstName", "requerido").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::store("select", sqlx::Error::RowNotFound).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::internal_trace("boom", None).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_trace_keeps_given_trace_id() {
        let err = AppError::internal_trace("fallo", Some("abc-123".to_string()));
        assert!(err.to_string().contains("abc-123"));
    }

    #[test]
    fn store_error_keeps_source_chain() {
        let err = AppError::store("connect", sqlx::Error::PoolTimedOut);
        assert!(err.source().is_some());
        assert!(!err.is_not_found());
        assert!(!err.is_validation());
    }

    #[test]
    fn result_ext_maps_to_validation() {
        let parsed: Result<i32, _> = "abc".parse::<i32>();
        let err = parsed.map_err_validation("numGuests inválido").unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("numGuests inválido"));
    }
}
