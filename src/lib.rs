use actix_cors::Cors;
use actix_web::middleware::Compress;
use actix_web::{http::header, web, App, HttpServer};
use actix_web_prometheus::PrometheusMetricsBuilder;
use chrono;
use dotenvy;
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

pub mod config;
pub mod forecast_catalog;
pub mod mailer;
pub mod numerology;
pub mod pdf;
pub mod render_api;
pub mod reports;
pub mod state;
pub mod storage;

pub use crate::state::AppState;

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_type: &str, message: &str) -> Self {
        Self {
            error: error_type.to_string(),
            message: message.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn not_found(message: &str) -> Self {
        Self::new("NotFound", message)
    }

    pub fn bad_request(message: &str) -> Self {
        Self::new("BadRequest", message)
    }

    pub fn internal_error(message: &str) -> Self {
        Self::new("InternalServerError", message)
    }
}

pub async fn run() -> std::io::Result<()> {
    if std::env::var("RUST_LOG").is_err() {
        unsafe {
            std::env::set_var("RUST_LOG", "info");
        }
    }
    env_logger::init();

    #[derive(OpenApi)]
    #[openapi(
        paths(
            crate::numerology::handlers::get_family_numbers,
            crate::numerology::handlers::get_star_sum,
            crate::reports::handlers::personality_report,
            crate::reports::handlers::child_report,
            crate::reports::handlers::finances_report,
            crate::reports::handlers::forecast_report,
            crate::reports::handlers::compatibility_report
        ),
        components(
            schemas(
                numerology::triangles::TriangleNumbers,
                numerology::triangles::MissionNumbers,
                numerology::star::StarSumNumbers,
                reports::handlers::ReportRequest,
                reports::handlers::ForecastRequest,
                reports::handlers::CompatibilityRequest,
                reports::handlers::ReportResponse,
                ErrorResponse,
            )
        ),
        tags(
            (name = "Numbers", description = "Derived-number JSON endpoints."),
            (name = "Reports", description = "PDF report generation and email dispatch.")
        ),
        servers(
            (url = "http://127.0.0.1:8080", description = "Localhost Staging server")
        )
    )]
    struct ApiDoc;

    dotenvy::dotenv().ok(); // Load .env file

    let app_config = match crate::config::AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid configuration, check your .env: {}", e);
            std::process::exit(1);
        }
    };
    let bind_addr = app_config.bind_addr.clone();
    let app_state = match AppState::new_with_config(app_config) {
        Ok(state) => web::Data::new(state),
        Err(e) => {
            log::error!("Failed to initialise application state: {}", e);
            std::process::exit(1);
        }
    };

    let prometheus = PrometheusMetricsBuilder::new("numerologija_server")
        .endpoint("/metrics")
        .build()
        .expect("Failed to create Prometheus metrics middleware");

    log::info!("Starting server at http://{}", bind_addr);

    HttpServer::new(move || {
        let app_state = app_state.clone();
        let prometheus = prometheus.clone();
        let cors = Cors::default()
            .allowed_origin("http://localhost:5173")
            .allowed_origin("http://localhost:3000")
            .allowed_origin("http://localhost:8080")
            .allowed_origin("http://127.0.0.1:8080")
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allowed_headers(vec![
                header::AUTHORIZATION,
                header::ACCEPT,
                header::CONTENT_TYPE,
            ])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .wrap(Compress::default())
            .wrap(prometheus)
            .wrap(cors)
            .app_data(app_state)
            .service(
                web::scope("/api")
                    .configure(numerology::handlers::config)
                    .configure(reports::handlers::config),
            )
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
    })
    .bind(bind_addr.as_str())?
    .run()
    .await
}
