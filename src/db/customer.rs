//! # Clientes
//!
//! Un cliente tiene dos estados:
//!
//! - [`NewCustomer`]: transitorio, sin ID. `save()` lo consume, inserta la fila
//!   y devuelve el [`Customer`] persistente con el ID asignado por la base de datos.
//! - [`Customer`]: persistente. `save()` actualiza la fila existente por ID.

use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use std::fmt;

use super::gateway::Gateway;
use super::reservation::Reservation;
use super::{column, optional_text, required_text};
use crate::errors::{AppError, AppResult};

/// Número de clientes que devuelve [`Customer::best_customers`]
pub const BEST_CUSTOMERS_LIMIT: i64 = 10;

const SELECT_COLUMNS: &str = "c.id AS id, c.first_name AS first_name, c.last_name AS last_name, \
     c.phone AS phone, c.notes AS notes";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(pub i64);

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Cliente aún no guardado
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCustomer {
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub notes: Option<String>,
}

impl NewCustomer {
    /// Valida los datos de entrada
    ///
    /// Nombre y apellido son obligatorios. Los campos opcionales vacíos se
    /// guardan como ausentes.
    ///
    /// # Errores
    /// - `ValidationWithField`: nombre o apellido vacíos
    pub fn new(
        first_name: &str,
        last_name: &str,
        phone: Option<&str>,
        notes: Option<&str>,
    ) -> AppResult<Self> {
        Ok(Self {
            first_name: required_text("firstName", first_name)?,
            last_name: required_text("lastName", last_name)?,
            phone: optional_text(phone),
            notes: optional_text(notes),
        })
    }

    /// Inserta el cliente y devuelve su versión persistente
    ///
    /// Los campos se vuelven a validar y normalizar antes de insertar. El ID se
    /// recupera con `RETURNING` en la misma sentencia que la inserción.
    ///
    /// # Errores
    /// - `ValidationWithField`: nombre o apellido vacíos
    pub async fn save(self, db: &Gateway) -> AppResult<Customer> {
        let new = Self::new(
            &self.first_name,
            &self.last_name,
            self.phone.as_deref(),
            self.notes.as_deref(),
        )?;

        let rows = db
            .query(
                r#"
                INSERT INTO customers (first_name, last_name, phone, notes)
                VALUES ($1, $2, $3, $4)
                RETURNING id
                "#,
                vec![
                    new.first_name.clone().into(),
                    new.last_name.clone().into(),
                    new.phone.clone().into(),
                    new.notes.clone().into(),
                ],
            )
            .await?;

        let row = rows
            .first()
            .ok_or_else(|| AppError::internal_trace("INSERT de cliente sin ID devuelto", None))?;
        let id = CustomerId(column(row, "id")?);

        tracing::info!(customer_id = %id, "Cliente creado");

        Ok(Customer {
            id,
            first_name: new.first_name,
            last_name: new.last_name,
            phone: new.phone,
            notes: new.notes,
        })
    }
}

/// Cliente guardado en la base de datos
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    id: CustomerId,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub notes: Option<String>,
}

impl Customer {
    /// Construye un cliente a partir de una fila de `customers`
    ///
    /// # Errores
    /// - `ValidationWithField`: columna ausente, tipo incorrecto o nombre vacío
    pub fn from_row(row: &SqliteRow) -> AppResult<Self> {
        let first_name: String = column(row, "first_name")?;
        let last_name: String = column(row, "last_name")?;
        required_text("first_name", &first_name)?;
        required_text("last_name", &last_name)?;

        Ok(Self {
            id: CustomerId(column(row, "id")?),
            first_name,
            last_name,
            phone: column(row, "phone")?,
            notes: column(row, "notes")?,
        })
    }

    pub fn id(&self) -> CustomerId {
        self.id
    }

    /// Nombre y apellido separados por un espacio
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Busca un cliente por ID
    ///
    /// # Errores
    /// - `NotFoundWithId`: no existe ningún cliente con ese ID
    pub async fn get(db: &Gateway, id: CustomerId) -> AppResult<Customer> {
        let rows = db
            .query(
                &format!("SELECT {SELECT_COLUMNS} FROM customers AS c WHERE c.id = $1"),
                vec![id.0.into()],
            )
            .await?;

        match rows.first() {
            Some(row) => Self::from_row(row),
            None => Err(AppError::not_found_id("Cliente", id)),
        }
    }

    /// Todos los clientes, ordenados por apellido y nombre
    ///
    /// La comparación es la binaria de SQLite: distingue mayúsculas y ordena
    /// por bytes. El ID desempata entre homónimos.
    pub async fn all(db: &Gateway) -> AppResult<Vec<Customer>> {
        let rows = db
            .query(
                &format!(
                    "SELECT {SELECT_COLUMNS} FROM customers AS c \
                     ORDER BY c.last_name, c.first_name, c.id"
                ),
                vec![],
            )
            .await?;

        rows.iter().map(Self::from_row).collect()
    }

    /// Clientes cuyo nombre completo contiene `term`, sin distinguir mayúsculas
    ///
    /// Un término ausente o en blanco equivale a [`Customer::all`]. El orden es
    /// el mismo que el de `all()`. La comparación usa `to_lowercase()`, que
    /// pliega mayúsculas Unicode.
    pub async fn search(db: &Gateway, term: Option<&str>) -> AppResult<Vec<Customer>> {
        let customers = Self::all(db).await?;

        let term = match term.map(str::trim) {
            Some(t) if !t.is_empty() => t.to_lowercase(),
            _ => return Ok(customers),
        };

        Ok(customers
            .into_iter()
            .filter(|c| c.full_name().to_lowercase().contains(&term))
            .collect())
    }

    /// Los diez clientes con más reservas
    ///
    /// Solo entran clientes con al menos una reserva. Orden: número de
    /// reservas descendente y, a igualdad, ID ascendente.
    pub async fn best_customers(db: &Gateway) -> AppResult<Vec<Customer>> {
        let rows = db
            .query(
                &format!(
                    "SELECT {SELECT_COLUMNS}, COUNT(r.id) AS reservation_count \
                     FROM customers AS c \
                     JOIN reservations AS r ON r.customer_id = c.id \
                     GROUP BY c.id \
                     ORDER BY reservation_count DESC, c.id ASC \
                     LIMIT $1"
                ),
                vec![BEST_CUSTOMERS_LIMIT.into()],
            )
            .await?;

        rows.iter().map(Self::from_row).collect()
    }

    /// Reservas de este cliente en orden cronológico
    pub async fn get_reservations(&self, db: &Gateway) -> AppResult<Vec<Reservation>> {
        Reservation::get_reservations_for_customer(db, self.id).await
    }

    /// Actualiza nombre, apellido, teléfono y notas
    ///
    /// Los campos se normalizan igual que en [`NewCustomer::new`] y el cliente
    /// adopta los valores guardados. Guardar dos veces sin cambios deja la fila igual.
    ///
    /// # Errores
    /// - `ValidationWithField`: nombre o apellido vacíos
    /// - `NotFoundWithId`: la fila ya no existe
    pub async fn save(&mut self, db: &Gateway) -> AppResult<()> {
        let changes = NewCustomer::new(
            &self.first_name,
            &self.last_name,
            self.phone.as_deref(),
            self.notes.as_deref(),
        )?;

        let rows = db
            .query(
                r#"
                UPDATE customers
                SET first_name = $1,
                    last_name = $2,
                    phone = $3,
                    notes = $4
                WHERE id = $5
                RETURNING id
                "#,
                vec![
                    changes.first_name.clone().into(),
                    changes.last_name.clone().into(),
                    changes.phone.clone().into(),
                    changes.notes.clone().into(),
                    self.id.0.into(),
                ],
            )
            .await?;

        if rows.is_empty() {
            return Err(AppError::not_found_id("Cliente", self.id));
        }

        self.first_name = changes.first_name;
        self.last_name = changes.last_name;
        self.phone = changes.phone;
        self.notes = changes.notes;

        tracing::debug!(customer_id = %self.id, "Cliente actualizado");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::reservation::NewReservation;
    use chrono::NaiveDate;
    use sqlx::Row;

    async fn customer(db: &Gateway, first: &str, last: &str) -> Customer {
        NewCustomer::new(first, last, None, None)
            .unwrap()
            .save(db)
            .await
            .unwrap()
    }

    async fn book(db: &Gateway, customer: &Customer, day: u32) {
        let start_at = NaiveDate::from_ymd_opt(2024, 5, day)
            .unwrap()
            .and_hms_opt(19, 0, 0)
            .unwrap();
        NewReservation::new(customer.id(), 2, start_at, None)
            .unwrap()
            .save(db)
            .await
            .unwrap();
    }

    async fn count_rows(db: &Gateway) -> i64 {
        let rows = db
            .query("SELECT COUNT(*) AS total FROM customers", vec![])
            .await
            .unwrap();
        rows[0].try_get("total").unwrap()
    }

    #[test]
    fn new_customer_requires_names() {
        let err = NewCustomer::new("  ", "Lovelace", None, None).unwrap_err();
        assert!(err.is_validation());

        let err = NewCustomer::new("Ada", "", None, None).unwrap_err();
        assert!(err.to_string().contains("lastName"));
    }

    #[test]
    fn new_customer_trims_optional_fields() {
        let new = NewCustomer::new(" Ada ", "Lovelace", Some("  "), Some(" vip ")).unwrap();

        assert_eq!(new.first_name, "Ada");
        assert_eq!(new.phone, None);
        assert_eq!(new.notes.as_deref(), Some("vip"));
    }

    #[tokio::test]
    async fn save_then_get_returns_same_fields() {
        let db = Gateway::in_memory().await.unwrap();
        let saved = NewCustomer::new("Ada", "Lovelace", Some("555-0100"), Some("prefiere ventana"))
            .unwrap()
            .save(&db)
            .await
            .unwrap();

        let fetched = Customer::get(&db, saved.id()).await.unwrap();

        assert_eq!(fetched, saved);
        assert_eq!(fetched.full_name(), "Ada Lovelace");
    }

    #[tokio::test]
    async fn get_unknown_id_is_not_found() {
        let db = Gateway::in_memory().await.unwrap();

        let err = Customer::get(&db, CustomerId(404)).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn save_on_persistent_customer_updates_in_place() {
        let db = Gateway::in_memory().await.unwrap();
        let mut ada = NewCustomer::new("Ada", "Lovelace", Some("555-0100"), None)
            .unwrap()
            .save(&db)
            .await
            .unwrap();
        let id = ada.id();

        ada.phone = Some("555-0199".to_string());
        ada.save(&db).await.unwrap();
        ada.save(&db).await.unwrap();

        assert_eq!(ada.id(), id);
        assert_eq!(count_rows(&db).await, 1);
        let fetched = Customer::get(&db, id).await.unwrap();
        assert_eq!(fetched.phone.as_deref(), Some("555-0199"));
    }

    #[tokio::test]
    async fn save_rejects_blank_names() {
        let db = Gateway::in_memory().await.unwrap();
        let mut ada = customer(&db, "Ada", "Lovelace").await;

        ada.first_name = "   ".to_string();
        let err = ada.save(&db).await.unwrap_err();

        assert!(err.is_validation());
        let fetched = Customer::get(&db, ada.id()).await.unwrap();
        assert_eq!(fetched.first_name, "Ada");
    }

    #[tokio::test]
    async fn all_orders_by_last_then_first_name() {
        let db = Gateway::in_memory().await.unwrap();
        customer(&db, "Grace", "Hopper").await;
        customer(&db, "Ada", "Lovelace").await;
        customer(&db, "Alan", "Hopper").await;
        customer(&db, "edsger", "dijkstra").await;

        let names: Vec<String> = Customer::all(&db)
            .await
            .unwrap()
            .iter()
            .map(Customer::full_name)
            .collect();

        // Orden binario: las mayúsculas van antes que las minúsculas
        assert_eq!(
            names,
            vec!["Alan Hopper", "Grace Hopper", "Ada Lovelace", "edsger dijkstra"]
        );
    }

    #[tokio::test]
    async fn search_is_case_insensitive_substring() {
        let db = Gateway::in_memory().await.unwrap();
        customer(&db, "John", "Smith").await;
        customer(&db, "Ada", "Lovelace").await;

        for term in ["smith", "SMI", "hn sm"] {
            let found = Customer::search(&db, Some(term)).await.unwrap();
            assert_eq!(found.len(), 1, "término {term}");
            assert_eq!(found[0].last_name, "Smith");
        }

        assert!(Customer::search(&db, Some("turing")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn search_folds_accented_names() {
        let db = Gateway::in_memory().await.unwrap();
        customer(&db, "Ángel", "Núñez").await;
        customer(&db, "John", "Smith").await;

        for term in ["ángel", "NÚÑEZ", "el nú"] {
            let found = Customer::search(&db, Some(term)).await.unwrap();
            assert_eq!(found.len(), 1, "término {term}");
            assert_eq!(found[0].first_name, "Ángel");
        }
    }

    #[tokio::test]
    async fn new_customer_literal_is_validated_on_save() {
        let db = Gateway::in_memory().await.unwrap();
        customer(&db, "Ada", "Lovelace").await;

        let blank = NewCustomer {
            first_name: String::new(),
            last_name: "  ".to_string(),
            phone: None,
            notes: None,
        };
        let err = blank.save(&db).await.unwrap_err();
        assert!(err.is_validation());

        let untrimmed = NewCustomer {
            first_name: " Grace ".to_string(),
            last_name: "Hopper".to_string(),
            phone: Some("   ".to_string()),
            notes: None,
        };
        let grace = untrimmed.save(&db).await.unwrap();
        assert_eq!(grace.first_name, "Grace");
        assert_eq!(grace.phone, None);

        assert_eq!(Customer::all(&db).await.unwrap().len(), 2);
        assert_eq!(count_rows(&db).await, 2);
    }

    #[tokio::test]
    async fn update_normalizes_like_insert() {
        let db = Gateway::in_memory().await.unwrap();
        let mut ada = customer(&db, "Ada", "Lovelace").await;

        ada.first_name = " Ada ".to_string();
        ada.phone = Some("   ".to_string());
        ada.notes = Some(" vip ".to_string());
        ada.save(&db).await.unwrap();

        let stored = Customer::get(&db, ada.id()).await.unwrap();
        assert_eq!(stored.first_name, "Ada");
        assert_eq!(stored.phone, None);
        assert_eq!(stored.notes.as_deref(), Some("vip"));
        assert_eq!(stored, ada);
    }

    #[tokio::test]
    async fn empty_search_equals_all() {
        let db = Gateway::in_memory().await.unwrap();
        customer(&db, "John", "Smith").await;
        customer(&db, "Ada", "Lovelace").await;

        let all = Customer::all(&db).await.unwrap();
        assert_eq!(Customer::search(&db, Some("")).await.unwrap(), all);
        assert_eq!(Customer::search(&db, Some("   ")).await.unwrap(), all);
        assert_eq!(Customer::search(&db, None).await.unwrap(), all);
    }

    #[tokio::test]
    async fn search_treats_wildcards_literally() {
        let db = Gateway::in_memory().await.unwrap();
        customer(&db, "John", "Smith").await;

        assert!(Customer::search(&db, Some("%")).await.unwrap().is_empty());
        assert!(Customer::search(&db, Some("_")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn best_customers_ranks_by_reservation_count() {
        let db = Gateway::in_memory().await.unwrap();
        let a = customer(&db, "Ana", "A").await;
        let b = customer(&db, "Bea", "B").await;
        let c = customer(&db, "Cid", "C").await;
        let _no_reservations = customer(&db, "Dan", "D").await;

        book(&db, &a, 1).await;
        for day in 1..=3 {
            book(&db, &b, day).await;
        }
        book(&db, &c, 2).await;

        let ids: Vec<CustomerId> = Customer::best_customers(&db)
            .await
            .unwrap()
            .iter()
            .map(Customer::id)
            .collect();

        // Empate entre a y c: gana el ID menor
        assert_eq!(ids, vec![b.id(), a.id(), c.id()]);
    }

    #[tokio::test]
    async fn best_customers_returns_at_most_ten() {
        let db = Gateway::in_memory().await.unwrap();
        for i in 0..12 {
            let c = customer(&db, &format!("Cliente{i}"), "Frecuente").await;
            book(&db, &c, 1).await;
        }

        let best = Customer::best_customers(&db).await.unwrap();

        assert_eq!(best.len(), 10);
        let ids: Vec<i64> = best.iter().map(|c| c.id().0).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }
}
