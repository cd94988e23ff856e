//! # Lunchly Server
//!
//! Servidor web del gestor de reservas construido con Rust, Actix Web y SQLite.
//!
//! ## Ejecución
//!
//! ```bash
//! # 1. Configurar variables de entorno
//! cp .env.example .env
//!
//! # 2. Compilar y ejecutar
//! cargo run
//!
//! # 3. Acceder al servidor
//! # http://localhost:8080/customers
//! ```

use actix_web::{dev::Service, middleware::Logger, web, App, HttpServer};
use tracing_subscriber::EnvFilter;

use lunchly::api::{self, middleware::log_request};
use lunchly::config::{log_filter, Config};
use lunchly::db::Gateway;

/// Función principal que inicia el servidor web
///
/// 1. Carga variables de entorno desde `.env`
/// 2. Configura el sistema de logging con tracing
/// 3. Abre la base de datos y crea el esquema si falta
/// 4. Arranca el servidor HTTP con logging de peticiones y las rutas de la API
///
/// # Errores
///
/// Retorna `std::io::Error` si la configuración es inválida, no se puede abrir
/// la base de datos o no se puede bindear al puerto.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(EnvFilter::from_default_env()))
        .init();

    tracing::info!("Iniciando Lunchly Server...");

    let config = Config::from_env().map_err(to_io_error)?;

    let db = match Gateway::connect(&config.database_url, config.max_connections).await {
        Ok(db) => db,
        Err(e) => {
            tracing::error!("Error conectando a la base de datos: {}", e);
            return Err(to_io_error(e));
        }
    };
    db.init_schema().await.map_err(to_io_error)?;

    tracing::info!("Servidor iniciando en {}", config.bind_address);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(db.clone()))
            .wrap(Logger::default())
            .wrap_fn(|req, srv| {
                log_request(&req);
                srv.call(req)
            })
            .configure(api::init_routes)
    })
    .bind(&config.bind_address)?
    .run()
    .await
}

fn to_io_error(e: lunchly::AppError) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
}
