//! # API de Reservas
//!
//! Las reservas siempre se gestionan a través de su cliente:
//! - Listar las reservas de un cliente
//! - Añadir una reserva a un cliente

use actix_web::{get, post, web, HttpResponse, Responder};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::AppResult;
use crate::db::reservation::parse_start_at;
use crate::db::{Customer, CustomerId, Gateway, NewReservation, Reservation, ReservationId};

/// Datos para crear una nueva reserva
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MakeReservation {
    /// Número de comensales
    num_guests: i64,
    /// Fecha y hora de inicio (formato YYYY-MM-DDTHH:MM)
    start_at: String,
    notes: Option<String>,
}

/// Reserva tal como se envía al frontend
#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReservationResponse {
    pub id: ReservationId,
    pub customer_id: CustomerId,
    pub num_guests: i32,
    pub start_at: NaiveDateTime,
    /// `startAt` legible, p. ej. "May 1 2024, 7:00 PM"
    pub formatted_start_at: String,
    pub notes: Option<String>,
}

impl From<&Reservation> for ReservationResponse {
    fn from(reservation: &Reservation) -> Self {
        ReservationResponse {
            id: reservation.id(),
            customer_id: reservation.customer_id(),
            num_guests: reservation.num_guests,
            start_at: reservation.start_at,
            formatted_start_at: reservation.formatted_start_at(),
            notes: reservation.notes.clone(),
        }
    }
}

/// Lista las reservas de un cliente en orden cronológico
///
/// # Errores
/// - `404 Not Found`: Cliente no encontrado
#[get("/customers/{id}/reservations")]
async fn get_reservations(
    db: web::Data<Gateway>,
    path: web::Path<i64>,
) -> AppResult<impl Responder> {
    let customer = Customer::get(db.get_ref(), CustomerId(path.into_inner())).await?;
    let reservations = customer.get_reservations(db.get_ref()).await?;

    let results: Vec<ReservationResponse> =
        reservations.iter().map(ReservationResponse::from).collect();

    Ok(HttpResponse::Ok().json(results))
}

/// Añade una reserva a un cliente
///
/// # Validaciones
/// - El cliente debe existir
/// - Número de personas debe ser mayor a 0
/// - `startAt` debe ser una fecha y hora válidas
///
/// # Respuesta
/// ```json
/// {
///   "id": 1,
///   "customerId": 1,
///   "numGuests": 4,
///   "startAt": "2024-05-01T19:00:00",
///   "formattedStartAt": "May 1 2024, 7:00 PM",
///   "notes": "window seat"
/// }
/// ```
///
/// # Errores
/// - `400 Bad Request`: Datos de validación incorrectos
/// - `404 Not Found`: Cliente no encontrado
/// - `500 Internal Server Error`: Error de base de datos
#[post("/customers/{id}/reservations")]
async fn make_reservation(
    db: web::Data<Gateway>,
    path: web::Path<i64>,
    data: web::Json<MakeReservation>,
) -> AppResult<impl Responder> {
    let customer = Customer::get(db.get_ref(), CustomerId(path.into_inner())).await?;
    let start_at = parse_start_at(&data.start_at)?;

    let reservation = NewReservation::new(
        customer.id(),
        data.num_guests,
        start_at,
        data.notes.as_deref(),
    )?
    .save(db.get_ref())
    .await?;

    Ok(HttpResponse::Created().json(ReservationResponse::from(&reservation)))
}

/// Configura las rutas relacionadas con reservas
///
/// # Rutas disponibles
/// - `GET /customers/{id}/reservations` - Reservas del cliente
/// - `POST /customers/{id}/reservations` - Nueva reserva
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(get_reservations);
    cfg.service(make_reservation);
}
