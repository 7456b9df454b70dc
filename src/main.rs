use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use jbox_booking_service::{
    api::{self, AppState},
    config::AppConfig,
    database::{MongoDB, Repositories},
    middleware::SecurityHeaders,
};

fn build_cors(allowed_origins: &[String]) -> Cors {
    let cors = if allowed_origins.is_empty() {
        Cors::default().allow_any_origin()
    } else {
        allowed_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
    };

    cors.allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allowed_headers(vec![
            actix_web::http::header::CONTENT_TYPE,
            actix_web::http::header::ACCEPT,
        ])
        .max_age(3600)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("❌ Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    log::info!("🚀 Starting JBox Booking Service...");
    log::info!("📊 Database: {}", config.database.name);

    // Initialize MongoDB connection
    let db = match MongoDB::new(&config.database).await {
        Ok(db) => Arc::new(db),
        Err(e) => {
            log::error!("❌ Database connection error: {}", e);
            std::process::exit(1);
        }
    };

    log::info!("✅ MongoDB connected successfully");

    let state = web::Data::new(AppState::new(
        Repositories::new(db.clone(), db),
        config.bcrypt_cost,
    ));

    let bind_address = config.bind_address();
    let cors_origins = config.cors_allowed_origins.clone();

    log::info!("🌐 Server starting on {}", bind_address);
    log::info!("📚 Swagger UI available at: http://{}/swagger-ui/", bind_address);

    HttpServer::new(move || {
        let openapi = api::swagger::ApiDoc::openapi();

        App::new()
            .app_data(state.clone())
            .wrap(build_cors(&cors_origins))
            .wrap(SecurityHeaders)
            .wrap(Logger::default())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi)
            )
            .configure(api::configure)
    })
    .bind(bind_address)?
    .run()
    .await
}
