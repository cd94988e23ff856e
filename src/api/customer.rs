//! # API de Clientes
//!
//! Este módulo maneja todas las operaciones relacionadas con clientes:
//! - Listado y búsqueda por nombre
//! - Ranking de mejores clientes
//! - Alta y edición
//! - Detalle con sus reservas

use actix_web::{get, post, put, web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::reservation::ReservationResponse;
use super::AppResult;
use crate::db::{Customer, CustomerId, Gateway, NewCustomer};

/// Formulario de alta y edición de clientes
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CustomerForm {
    /// Nombre (obligatorio)
    #[serde(default)]
    first_name: String,
    /// Apellido (obligatorio)
    #[serde(default)]
    last_name: String,
    phone: Option<String>,
    notes: Option<String>,
}

impl CustomerForm {
    fn validate(&self) -> AppResult<NewCustomer> {
        NewCustomer::new(
            &self.first_name,
            &self.last_name,
            self.phone.as_deref(),
            self.notes.as_deref(),
        )
    }
}

/// Parámetros de consulta del listado
#[derive(Deserialize)]
struct SearchQuery {
    /// Fragmento del nombre completo, sin distinguir mayúsculas
    search: Option<String>,
}

/// Cliente tal como se envía al frontend
#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CustomerResponse {
    pub id: CustomerId,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub notes: Option<String>,
}

impl From<&Customer> for CustomerResponse {
    fn from(customer: &Customer) -> Self {
        CustomerResponse {
            id: customer.id(),
            first_name: customer.first_name.clone(),
            last_name: customer.last_name.clone(),
            full_name: customer.full_name(),
            phone: customer.phone.clone(),
            notes: customer.notes.clone(),
        }
    }
}

fn to_responses(customers: &[Customer]) -> Vec<CustomerResponse> {
    customers.iter().map(CustomerResponse::from).collect()
}

/// Lista los clientes, filtrados por `?search=` si viene en la consulta
///
/// # Respuesta
/// ```json
/// [
///   {
///     "id": 1,
///     "firstName": "Ada",
///     "lastName": "Lovelace",
///     "fullName": "Ada Lovelace",
///     "phone": "555-0100",
///     "notes": null
///   }
/// ]
/// ```
#[get("/customers")]
async fn list_customers(
    db: web::Data<Gateway>,
    query: web::Query<SearchQuery>,
) -> AppResult<impl Responder> {
    let customers = Customer::search(db.get_ref(), query.search.as_deref()).await?;

    Ok(HttpResponse::Ok().json(to_responses(&customers)))
}

/// Los diez clientes con más reservas
#[get("/customers/top-ten")]
async fn top_ten_customers(db: web::Data<Gateway>) -> AppResult<impl Responder> {
    let customers = Customer::best_customers(db.get_ref()).await?;

    Ok(HttpResponse::Ok().json(to_responses(&customers)))
}

/// Da de alta un cliente
///
/// # Errores
/// - `400 Bad Request`: falta el nombre o el apellido
/// - `500 Internal Server Error`: Error de base de datos
#[post("/customers")]
async fn create_customer(
    db: web::Data<Gateway>,
    data: web::Json<CustomerForm>,
) -> AppResult<impl Responder> {
    let customer = data.validate()?.save(db.get_ref()).await?;

    Ok(HttpResponse::Created().json(CustomerResponse::from(&customer)))
}

/// Detalle de un cliente con sus reservas
///
/// # Respuesta
/// ```json
/// {
///   "customer": { "id": 1, "firstName": "Ada", "...": "..." },
///   "reservations": [ { "id": 1, "numGuests": 4, "...": "..." } ]
/// }
/// ```
///
/// # Errores
/// - `404 Not Found`: Cliente no encontrado
#[get("/customers/{id}")]
async fn customer_detail(
    db: web::Data<Gateway>,
    path: web::Path<i64>,
) -> AppResult<impl Responder> {
    let customer = Customer::get(db.get_ref(), CustomerId(path.into_inner())).await?;
    let reservations = customer.get_reservations(db.get_ref()).await?;

    let reservations: Vec<ReservationResponse> =
        reservations.iter().map(ReservationResponse::from).collect();

    Ok(HttpResponse::Ok().json(json!({
        "customer": CustomerResponse::from(&customer),
        "reservations": reservations,
    })))
}

/// Edita los datos de un cliente; el ID no cambia
///
/// # Errores
/// - `400 Bad Request`: falta el nombre o el apellido
/// - `404 Not Found`: Cliente no encontrado
#[put("/customers/{id}")]
async fn edit_customer(
    db: web::Data<Gateway>,
    path: web::Path<i64>,
    data: web::Json<CustomerForm>,
) -> AppResult<impl Responder> {
    let changes = data.validate()?;
    let mut customer = Customer::get(db.get_ref(), CustomerId(path.into_inner())).await?;

    customer.first_name = changes.first_name;
    customer.last_name = changes.last_name;
    customer.phone = changes.phone;
    customer.notes = changes.notes;
    customer.save(db.get_ref()).await?;

    Ok(HttpResponse::Ok().json(CustomerResponse::from(&customer)))
}

/// Configura las rutas relacionadas con clientes
///
/// # Rutas disponibles
/// - `GET /customers` - Listar o buscar clientes
/// - `GET /customers/top-ten` - Mejores clientes
/// - `POST /customers` - Alta de cliente
/// - `GET /customers/{id}` - Detalle con reservas
/// - `PUT /customers/{id}` - Edición de cliente
///
/// `top-ten` se registra antes que `{id}` para que no lo capture la ruta dinámica.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_customers);
    cfg.service(top_ten_customers);
    cfg.service(create_customer);
    cfg.service(customer_detail);
    cfg.service(edit_customer);
}
