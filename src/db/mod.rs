// src/db/mod.rs
pub mod customer;
pub mod gateway;
pub mod reservation;

pub use customer::{Customer, CustomerId, NewCustomer};
pub use gateway::{BindValue, Gateway};
pub use reservation::{NewReservation, Reservation, ReservationId};

use sqlx::sqlite::{Sqlite, SqliteRow};
use sqlx::{Decode, Row, Type};

use crate::errors::{AppError, AppResult};

/// Lee una columna por alias; cualquier fallo es un error de validación
pub(crate) fn column<'r, T>(row: &'r SqliteRow, name: &str) -> AppResult<T>
where
    T: Decode<'r, Sqlite> + Type<Sqlite>,
{
    row.try_get(name)
        .map_err(|e| AppError::validation_field(name, &e.to_string()))
}

/// Texto obligatorio: se recorta y no puede quedar vacío
pub(crate) fn required_text(field: &str, value: &str) -> AppResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::validation_field(field, "es requerido"));
    }
    Ok(value.to_string())
}

/// Texto opcional: se recorta y el texto vacío cuenta como ausente
pub(crate) fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
