//! # Reservas
//!
//! Cada reserva pertenece a un único cliente. El cliente se fija al crear la
//! reserva y no se puede cambiar: [`Reservation`] solo expone un getter para
//! `customer_id` y la sentencia `UPDATE` nunca lo toca.

use chrono::{DateTime, Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use std::fmt;

use super::column;
use super::customer::CustomerId;
use super::gateway::Gateway;
use super::optional_text;
use crate::errors::{AppError, AppResult, ResultExt};

/// Formato de `startAt` para mostrar, p. ej. "May 1 2024, 7:00 PM"
pub const DISPLAY_FORMAT: &str = "%B %-d %Y, %-I:%M %p";

/// Formatos aceptados al leer `startAt` de un formulario
const INPUT_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReservationId(pub i64);

impl fmt::Display for ReservationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Valida y parsea la fecha y hora de inicio
///
/// Acepta hora local sin zona ([`INPUT_FORMATS`]) o RFC 3339 con `Z`/offset,
/// que se convierte a la hora local del servidor.
///
/// # Errores
/// - `ValidationWithField`: ningún formato encaja
pub fn parse_start_at(raw: &str) -> AppResult<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Ok(instant.with_timezone(&Local).naive_local());
    }

    INPUT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .ok_or_else(|| {
            AppError::validation_field(
                "startAt",
                "formato inválido, use YYYY-MM-DDTHH:MM o RFC 3339 (2024-05-01T19:00:00Z)",
            )
        })
}

fn validate_num_guests(num_guests: i64) -> AppResult<i32> {
    if num_guests <= 0 {
        return Err(AppError::validation_field(
            "numGuests",
            "el número de personas debe ser mayor a 0",
        ));
    }
    i32::try_from(num_guests).map_err_validation("numGuests fuera de rango")
}

/// Reserva aún no guardada
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReservation {
    customer_id: CustomerId,
    pub num_guests: i32,
    pub start_at: NaiveDateTime,
    pub notes: Option<String>,
}

impl NewReservation {
    /// # Errores
    /// - `ValidationWithField`: `num_guests` no es positivo o no cabe en un i32
    pub fn new(
        customer_id: CustomerId,
        num_guests: i64,
        start_at: NaiveDateTime,
        notes: Option<&str>,
    ) -> AppResult<Self> {
        Ok(Self {
            customer_id,
            num_guests: validate_num_guests(num_guests)?,
            start_at,
            notes: optional_text(notes),
        })
    }

    pub fn customer_id(&self) -> CustomerId {
        self.customer_id
    }

    /// Inserta la reserva y devuelve su versión persistente
    ///
    /// # Errores
    /// - `Store`: entre otros, si el cliente no existe (clave foránea)
    pub async fn save(self, db: &Gateway) -> AppResult<Reservation> {
        validate_num_guests(i64::from(self.num_guests))?;

        let rows = db
            .query(
                r#"
                INSERT INTO reservations (customer_id, start_at, num_guests, notes)
                VALUES ($1, $2, $3, $4)
                RETURNING id
                "#,
                vec![
                    self.customer_id.0.into(),
                    self.start_at.into(),
                    self.num_guests.into(),
                    self.notes.clone().into(),
                ],
            )
            .await?;

        let row = rows
            .first()
            .ok_or_else(|| AppError::internal_trace("INSERT de reserva sin ID devuelto", None))?;
        let id = ReservationId(column(row, "id")?);

        tracing::info!(
            reservation_id = %id,
            customer_id = %self.customer_id,
            "Reserva creada"
        );

        Ok(Reservation {
            id,
            customer_id: self.customer_id,
            num_guests: self.num_guests,
            start_at: self.start_at,
            notes: self.notes,
        })
    }
}

/// Reserva guardada en la base de datos
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    id: ReservationId,
    customer_id: CustomerId,
    pub num_guests: i32,
    pub start_at: NaiveDateTime,
    pub notes: Option<String>,
}

impl Reservation {
    /// Construye una reserva a partir de una fila de `reservations`
    ///
    /// # Errores
    /// - `ValidationWithField`: columna ausente, tipo incorrecto o `num_guests` no positivo
    pub fn from_row(row: &SqliteRow) -> AppResult<Self> {
        Ok(Self {
            id: ReservationId(column(row, "id")?),
            customer_id: CustomerId(column(row, "customer_id")?),
            num_guests: validate_num_guests(column(row, "num_guests")?)?,
            start_at: column(row, "start_at")?,
            notes: column(row, "notes")?,
        })
    }

    pub fn id(&self) -> ReservationId {
        self.id
    }

    pub fn customer_id(&self) -> CustomerId {
        self.customer_id
    }

    pub fn formatted_start_at(&self) -> String {
        self.start_at.format(DISPLAY_FORMAT).to_string()
    }

    /// Reservas de un cliente, de la más temprana a la más tardía
    ///
    /// A igual hora de inicio se respeta el orden de inserción.
    pub async fn get_reservations_for_customer(
        db: &Gateway,
        customer_id: CustomerId,
    ) -> AppResult<Vec<Reservation>> {
        let rows = db
            .query(
                r#"
                SELECT id, customer_id, num_guests, start_at, notes
                FROM reservations
                WHERE customer_id = $1
                ORDER BY start_at, id
                "#,
                vec![customer_id.0.into()],
            )
            .await?;

        rows.iter().map(Self::from_row).collect()
    }

    /// Actualiza hora de inicio, número de personas y notas
    ///
    /// # Errores
    /// - `ValidationWithField`: `num_guests` no positivo
    /// - `NotFoundWithId`: la fila ya no existe
    pub async fn save(&self, db: &Gateway) -> AppResult<()> {
        validate_num_guests(i64::from(self.num_guests))?;

        let rows = db
            .query(
                r#"
                UPDATE reservations
                SET start_at = $1,
                    num_guests = $2,
                    notes = $3
                WHERE id = $4
                RETURNING id
                "#,
                vec![
                    self.start_at.into(),
                    self.num_guests.into(),
                    self.notes.clone().into(),
                    self.id.0.into(),
                ],
            )
            .await?;

        if rows.is_empty() {
            return Err(AppError::not_found_id("Reserva", self.id));
        }

        tracing::debug!(reservation_id = %self.id, "Reserva actualizada");
        Ok(())
    }
}
