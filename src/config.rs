//! # Configuración
//!
//! El servidor se configura mediante variables de entorno (archivo `.env`):
//!
//! ```env
//! DATABASE_URL=sqlite://lunchly.db
//! DATABASE_MAX_CONNECTIONS=5
//! BIND_ADDRESS=0.0.0.0:8080
//! RUST_LOG=debug,sqlx=warn
//! ```

use crate::errors::{AppError, AppResult};
use std::env;
use tracing_subscriber::filter::{Directive, EnvFilter};

pub const DEFAULT_DATABASE_URL: &str = "sqlite://lunchly.db";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

/// Directivas de logging que se añaden siempre sobre `RUST_LOG`
pub const DEFAULT_LOG_DIRECTIVES: &[&str] = &["lunchly=debug", "sqlx=warn", "actix_web=info"];

/// Añade [`DEFAULT_LOG_DIRECTIVES`] al filtro recibido (normalmente el de `RUST_LOG`)
pub fn log_filter(base: EnvFilter) -> EnvFilter {
    DEFAULT_LOG_DIRECTIVES
        .iter()
        .filter_map(|directive| directive.parse::<Directive>().ok())
        .fold(base, EnvFilter::add_directive)
}

/// Configuración del servidor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// URL de conexión SQLite (`sqlite://fichero.db` o `sqlite::memory:`)
    pub database_url: String,

    /// Tamaño máximo del pool de conexiones
    pub max_connections: u32,

    /// Dirección y puerto del servidor HTTP
    pub bind_address: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
        }
    }
}

impl Config {
    /// Lee la configuración de las variables de entorno del proceso
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Construye la configuración a partir de una función de búsqueda de claves
    ///
    /// Las claves ausentes toman su valor por defecto.
    ///
    /// # Errores
    /// - `ValidationWithField`: si `DATABASE_MAX_CONNECTIONS` no es un entero positivo
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| {
                    AppError::validation_field(
                        "DATABASE_MAX_CONNECTIONS",
                        &format!("debe ser un entero positivo, recibido '{}'", raw),
                    )
                })?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let bind_address = lookup("BIND_ADDRESS")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        Ok(Self {
            database_url,
            max_connections,
            bind_address,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn missing_keys_use_defaults() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn reads_all_keys() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("DATABASE_MAX_CONNECTIONS", "12"),
            ("BIND_ADDRESS", "127.0.0.1:3000"),
        ]))
        .unwrap();

        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.max_connections, 12);
        assert_eq!(config.bind_address, "127.0.0.1:3000");
    }

    #[test]
    fn log_filter_keeps_base_and_adds_defaults() {
        let filter = log_filter(EnvFilter::new("info,hyper=trace"))
            .to_string()
            .to_lowercase();

        assert!(filter.contains("hyper=trace"), "{filter}");
        for directive in DEFAULT_LOG_DIRECTIVES {
            assert!(filter.contains(directive), "{filter} sin {directive}");
        }
    }

    #[test]
    fn rejects_invalid_pool_size() {
        for raw in ["cero", "0", "-3"] {
            let err = Config::from_lookup(lookup_from(&[("DATABASE_MAX_CONNECTIONS", raw)]))
                .unwrap_err();
            assert!(err.is_validation(), "{raw} debería ser rechazado");
        }
    }
}
