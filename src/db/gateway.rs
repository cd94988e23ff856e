//! # Pasarela de almacenamiento
//!
//! Único punto de acceso a la base de datos relacional. Recibe una plantilla
//! SQL con marcadores posicionales (`$1`, `$2`, ...) y la lista ordenada de
//! valores a enlazar, y devuelve las filas resultantes. Cada llamada es un
//! único viaje de ida y vuelta a SQLite; no hay reintentos.

use chrono::NaiveDateTime;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use std::str::FromStr;

use crate::api::middleware::ErrorLogExt;
use crate::errors::{AppError, AppResult};

/// Esquema de la base de datos
///
/// `reservations.customer_id` referencia `customers.id`; SQLite aplica la
/// clave foránea porque sqlx activa `foreign_keys` en cada conexión.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS customers (
        id         INTEGER PRIMARY KEY AUTOINCREMENT,
        first_name TEXT NOT NULL,
        last_name  TEXT NOT NULL,
        phone      TEXT,
        notes      TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS reservations (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        customer_id INTEGER NOT NULL REFERENCES customers (id),
        start_at    DATETIME NOT NULL,
        num_guests  INTEGER NOT NULL CHECK (num_guests > 0),
        notes       TEXT
    )
    "#,
    "CREATE INDEX IF NOT EXISTS reservations_customer_id_idx ON reservations (customer_id)",
    "CREATE INDEX IF NOT EXISTS customers_name_idx ON customers (last_name, first_name)",
];

/// Valor enlazable a un marcador posicional de la plantilla
#[derive(Debug, Clone, PartialEq)]
pub enum BindValue {
    Int(i64),
    Text(String),
    Timestamp(NaiveDateTime),
    Null,
}

impl From<i64> for BindValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for BindValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<&str> for BindValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for BindValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<NaiveDateTime> for BindValue {
    fn from(value: NaiveDateTime) -> Self {
        Self::Timestamp(value)
    }
}

impl<T: Into<BindValue>> From<Option<T>> for BindValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Conexión compartida a la base de datos
#[derive(Debug, Clone)]
pub struct Gateway {
    pool: SqlitePool,
}

impl Gateway {
    /// Abre el pool de conexiones
    ///
    /// Las bases de datos en memoria viven mientras viva su conexión, así que
    /// para `sqlite::memory:` el pool se fija a una única conexión que nunca
    /// se recicla.
    ///
    /// # Errores
    /// - `Validation`: URL de conexión mal formada
    /// - `Store`: no se puede abrir la base de datos
    pub async fn connect(database_url: &str, max_connections: u32) -> AppResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| AppError::validation_field("DATABASE_URL", &e.to_string()))?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool_options = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(max_connections)
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .log_error_context("connecting to SQLite")
            .map_err(|e| AppError::store("connect", e))?;

        tracing::info!(database_url = %database_url, "Conexión a SQLite establecida");

        Ok(Self { pool })
    }

    /// Base de datos en memoria con el esquema ya creado
    pub async fn in_memory() -> AppResult<Self> {
        let gateway = Self::connect("sqlite::memory:", 1).await?;
        gateway.init_schema().await?;
        Ok(gateway)
    }

    /// Crea tablas e índices si no existen
    pub async fn init_schema(&self) -> AppResult<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .log_error_context("creating schema")
                .map_err(|e| AppError::store("init_schema", e))?;
        }

        tracing::info!("Esquema de base de datos listo");
        Ok(())
    }

    /// Ejecuta una plantilla SQL con sus valores posicionales
    ///
    /// Devuelve las filas en el orden que produce la consulta; las columnas se
    /// leen por su alias con [`sqlx::Row::try_get`].
    ///
    /// # Errores
    /// - `Store`: fallo de conexión, violación de restricción o SQL inválido
    pub async fn query(&self, sql: &str, binds: Vec<BindValue>) -> AppResult<Vec<SqliteRow>> {
        tracing::debug!(sql = %sql.trim(), binds = ?binds, "Executing query");

        let mut query = sqlx::query(sql);
        for value in binds {
            query = match value {
                BindValue::Int(v) => query.bind(v),
                BindValue::Text(v) => query.bind(v),
                BindValue::Timestamp(v) => query.bind(v),
                BindValue::Null => query.bind(None::<String>),
            };
        }

        query
            .fetch_all(&self.pool)
            .await
            .log_error_context("executing query")
            .map_err(|e| AppError::store(operation_name(sql), e))
    }
}

/// Primera palabra de la plantilla (`select`, `insert`, ...) para los errores
fn operation_name(sql: &str) -> &str {
    sql.split_whitespace().next().unwrap_or("query")
}
