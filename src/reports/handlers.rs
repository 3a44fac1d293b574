//! POST endpoints that generate a report and email it.

use crate::numerology::BirthDate;
use crate::reports::{ReportError, ReportKind};
use crate::state::AppState;
use crate::ErrorResponse;
use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReportRequest {
    /// Birthdate in DD.MM.YYYY form.
    pub date: String,
    /// Recipient address for the finished PDF.
    pub email: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ForecastRequest {
    pub date: String,
    pub email: String,
    /// Calendar year the forecast covers.
    pub target_year: u32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CompatibilityRequest {
    /// Your birthdate in DD.MM.YYYY form.
    pub date_you: String,
    /// Partner birthdate in DD.MM.YYYY form.
    pub date_partner: String,
    pub email: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReportResponse {
    pub report: String,
    pub filename: String,
    pub pages: usize,
    pub emailed: String,
}

fn error_response(e: ReportError) -> HttpResponse {
    match &e {
        ReportError::InvalidDate(msg) => {
            HttpResponse::BadRequest().json(ErrorResponse::bad_request(&msg.to_string()))
        }
        ReportError::MissingAsset(path) => HttpResponse::NotFound().json(
            ErrorResponse::not_found(&format!("no asset for slide: {}", path)),
        ),
        other => {
            log::error!("report generation failed: {}", other);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("report generation failed"))
        }
    }
}

fn parse_inputs(date: &str, email: &str) -> Result<BirthDate, HttpResponse> {
    if !email.contains('@') {
        return Err(HttpResponse::BadRequest()
            .json(ErrorResponse::bad_request("invalid email address")));
    }
    BirthDate::parse(date)
        .map_err(|e| HttpResponse::BadRequest().json(ErrorResponse::bad_request(&e.to_string())))
}

async fn dispatch(
    state: &AppState,
    kind: ReportKind,
    email: &str,
    result: Result<crate::reports::GeneratedReport, ReportError>,
) -> HttpResponse {
    let report = match result {
        Ok(report) => report,
        Err(e) => return error_response(e),
    };
    if let Err(e) = state.mailer.send_report(email, kind, &report).await {
        return error_response(ReportError::Email(e));
    }
    HttpResponse::Ok().json(ReportResponse {
        report: kind.as_str().to_string(),
        filename: report.filename,
        pages: report.pages,
        emailed: email.to_string(),
    })
}

#[utoipa::path(
    context_path = "/api",
    tag = "Reports",
    post,
    path = "/reports/personality",
    request_body = ReportRequest,
    responses(
        (status = 200, description = "Report generated and emailed", body = ReportResponse),
        (status = 400, description = "Invalid date or email", body = ErrorResponse),
        (status = 404, description = "A required slide asset is missing", body = ErrorResponse)
    )
)]
pub async fn personality_report(
    req: web::Json<ReportRequest>,
    state: web::Data<AppState>,
) -> impl Responder {
    let date = match parse_inputs(&req.date, &req.email) {
        Ok(d) => d,
        Err(resp) => return resp,
    };
    let result = state.generator.personality(date, state.numbers.as_ref()).await;
    dispatch(&state, ReportKind::Personality, &req.email, result).await
}

#[utoipa::path(
    context_path = "/api",
    tag = "Reports",
    post,
    path = "/reports/child",
    request_body = ReportRequest,
    responses(
        (status = 200, description = "Report generated and emailed", body = ReportResponse),
        (status = 400, description = "Invalid date or email", body = ErrorResponse),
        (status = 404, description = "A required slide asset is missing", body = ErrorResponse)
    )
)]
pub async fn child_report(
    req: web::Json<ReportRequest>,
    state: web::Data<AppState>,
) -> impl Responder {
    let date = match parse_inputs(&req.date, &req.email) {
        Ok(d) => d,
        Err(resp) => return resp,
    };
    let result = state.generator.child(date).await;
    dispatch(&state, ReportKind::Child, &req.email, result).await
}

#[utoipa::path(
    context_path = "/api",
    tag = "Reports",
    post,
    path = "/reports/finances",
    request_body = ReportRequest,
    responses(
        (status = 200, description = "Report generated and emailed", body = ReportResponse),
        (status = 400, description = "Invalid date or email", body = ErrorResponse),
        (status = 404, description = "A required slide asset is missing", body = ErrorResponse)
    )
)]
pub async fn finances_report(
    req: web::Json<ReportRequest>,
    state: web::Data<AppState>,
) -> impl Responder {
    let date = match parse_inputs(&req.date, &req.email) {
        Ok(d) => d,
        Err(resp) => return resp,
    };
    let result = state.generator.finances(date).await;
    dispatch(&state, ReportKind::Finances, &req.email, result).await
}

#[utoipa::path(
    context_path = "/api",
    tag = "Reports",
    post,
    path = "/reports/forecast",
    request_body = ForecastRequest,
    responses(
        (status = 200, description = "Report generated and emailed", body = ReportResponse),
        (status = 400, description = "Invalid date or email", body = ErrorResponse),
        (status = 404, description = "A required slide asset is missing", body = ErrorResponse)
    )
)]
pub async fn forecast_report(
    req: web::Json<ForecastRequest>,
    state: web::Data<AppState>,
) -> impl Responder {
    let date = match parse_inputs(&req.date, &req.email) {
        Ok(d) => d,
        Err(resp) => return resp,
    };
    let result = state
        .generator
        .forecast(date, req.target_year, state.catalog.as_ref())
        .await;
    dispatch(&state, ReportKind::Forecast, &req.email, result).await
}

#[utoipa::path(
    context_path = "/api",
    tag = "Reports",
    post,
    path = "/reports/compatibility",
    request_body = CompatibilityRequest,
    responses(
        (status = 200, description = "Report generated and emailed", body = ReportResponse),
        (status = 400, description = "Invalid date or email", body = ErrorResponse),
        (status = 404, description = "A required slide asset is missing", body = ErrorResponse)
    )
)]
pub async fn compatibility_report(
    req: web::Json<CompatibilityRequest>,
    state: web::Data<AppState>,
) -> impl Responder {
    let you = match parse_inputs(&req.date_you, &req.email) {
        Ok(d) => d,
        Err(resp) => return resp,
    };
    let partner = match BirthDate::parse(&req.date_partner) {
        Ok(d) => d,
        Err(e) => {
            return HttpResponse::BadRequest()
                .json(ErrorResponse::bad_request(&e.to_string()))
        }
    };
    let result = state
        .generator
        .compatibility(you, partner, state.numbers.as_ref())
        .await;
    dispatch(&state, ReportKind::Compatibility, &req.email, result).await
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/reports/personality").route(web::post().to(personality_report)))
        .service(web::resource("/reports/child").route(web::post().to(child_report)))
        .service(web::resource("/reports/finances").route(web::post().to(finances_report)))
        .service(web::resource("/reports/forecast").route(web::post().to(forecast_report)))
        .service(
            web::resource("/reports/compatibility").route(web::post().to(compatibility_report)),
        );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast_catalog::{CatalogError, ForecastCatalog, ForecastImage};
    use crate::mailer::{MailError, Mailer};
    use crate::pdf::PageArtist;
    use crate::render_api::{LocalNumbers, Overlay, OverlaySource, RenderApiError};
    use crate::reports::generator::ReportGenerator;
    use crate::reports::GeneratedReport;
    use crate::storage::{AssetStore, StorageError};
    use actix_web::{test, App};
    use async_trait::async_trait;
    use image::codecs::jpeg::JpegEncoder;
    use image::codecs::png::PngEncoder;
    use image::{ExtendedColorType, ImageEncoder, Rgb, RgbImage, Rgba, RgbaImage};
    use std::collections::HashSet;
    use std::sync::Arc;

    fn jpeg_bytes() -> Vec<u8> {
        let img = RgbImage::from_pixel(160, 90, Rgb([60, 60, 120]));
        let mut out = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut out, 80);
        encoder
            .write_image(img.as_raw(), 160, 90, ExtendedColorType::Rgb8)
            .unwrap();
        out
    }

    fn png_bytes() -> Vec<u8> {
        let img = RgbaImage::from_pixel(80, 80, Rgba([0, 180, 90, 200]));
        let mut out = Vec::new();
        PngEncoder::new(&mut out)
            .write_image(img.as_raw(), 80, 80, ExtendedColorType::Rgba8)
            .unwrap();
        out
    }

    struct StubStore {
        missing: HashSet<String>,
    }

    #[async_trait]
    impl AssetStore for StubStore {
        async fn fetch(&self, path: &str) -> Result<Vec<u8>, StorageError> {
            if self.missing.contains(path) {
                return Err(StorageError::NotFound(path.to_string()));
            }
            Ok(jpeg_bytes())
        }

        async fn fetch_url(&self, url: &str) -> Result<Vec<u8>, StorageError> {
            if self.missing.contains(url) {
                return Err(StorageError::NotFound(url.to_string()));
            }
            Ok(jpeg_bytes())
        }
    }

    struct StubOverlays;

    #[async_trait]
    impl OverlaySource for StubOverlays {
        async fn fetch_overlay(&self, _overlay: &Overlay) -> Result<Vec<u8>, RenderApiError> {
            Ok(png_bytes())
        }
    }

    struct StubCatalog;

    #[async_trait]
    impl ForecastCatalog for StubCatalog {
        async fn gada_image(&self, gada_cipars: u32) -> Result<Option<String>, CatalogError> {
            Ok(Some(format!("https://img.example/gada/{gada_cipars}.jpg")))
        }

        async fn menesa_images(
            &self,
            menesa_cipars: u32,
        ) -> Result<Vec<ForecastImage>, CatalogError> {
            Ok(vec![ForecastImage {
                image_url: format!("https://img.example/menesa/{menesa_cipars}.jpg"),
                variant: "1.1".to_string(),
            }])
        }
    }

    struct NullMailer;

    #[async_trait]
    impl Mailer for NullMailer {
        async fn send_report(
            &self,
            _to: &str,
            _kind: ReportKind,
            _report: &GeneratedReport,
        ) -> Result<(), MailError> {
            Ok(())
        }
    }

    fn state(missing: HashSet<String>) -> web::Data<AppState> {
        let generator = ReportGenerator::new(
            Arc::new(StubStore { missing }),
            Arc::new(StubOverlays),
            Arc::new(PageArtist::without_font()),
        );
        web::Data::new(AppState {
            generator,
            numbers: Arc::new(LocalNumbers),
            catalog: Arc::new(StubCatalog),
            mailer: Arc::new(NullMailer),
        })
    }

    async fn post_json(
        state: web::Data<AppState>,
        uri: &str,
        body: serde_json::Value,
    ) -> (u16, serde_json::Value) {
        let app = test::init_service(
            App::new()
                .app_data(state)
                .service(web::scope("/api").configure(config)),
        )
        .await;
        let req = test::TestRequest::post()
            .uri(uri)
            .set_json(body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        let status = resp.status().as_u16();
        let body: serde_json::Value = test::read_body_json(resp).await;
        (status, body)
    }

    #[actix_web::test]
    async fn test_malformed_date_is_400_error_json() {
        let (status, body) = post_json(
            state(HashSet::new()),
            "/api/reports/finances",
            serde_json::json!({ "date": "1990-07-15", "email": "user@example.com" }),
        )
        .await;
        assert_eq!(status, 400);
        assert_eq!(body["error"], "BadRequest");
        assert!(body["message"].as_str().unwrap().contains("DD.MM.YYYY"));
    }

    #[actix_web::test]
    async fn test_invalid_email_is_400_error_json() {
        let (status, body) = post_json(
            state(HashSet::new()),
            "/api/reports/child",
            serde_json::json!({ "date": "01.01.2000", "email": "not-an-address" }),
        )
        .await;
        assert_eq!(status, 400);
        assert_eq!(body["error"], "BadRequest");
    }

    #[actix_web::test]
    async fn test_missing_required_asset_is_404_error_json() {
        let mut missing = HashSet::new();
        missing.insert("finanses/main/1.jpg".to_string());
        let (status, body) = post_json(
            state(missing),
            "/api/reports/finances",
            serde_json::json!({ "date": "15.07.1990", "email": "user@example.com" }),
        )
        .await;
        assert_eq!(status, 404);
        assert_eq!(body["error"], "NotFound");
        assert!(body["message"]
            .as_str()
            .unwrap()
            .contains("finanses/main/1.jpg"));
    }

    #[actix_web::test]
    async fn test_generated_report_response_shape() {
        let (status, body) = post_json(
            state(HashSet::new()),
            "/api/reports/finances",
            serde_json::json!({ "date": "15.07.1990", "email": "user@example.com" }),
        )
        .await;
        assert_eq!(status, 200);
        assert_eq!(body["report"], "finances");
        assert_eq!(body["filename"], "FINANSES_REALIZACIJA_15071990.pdf");
        assert_eq!(body["emailed"], "user@example.com");
        assert!(body["pages"].as_u64().unwrap() > 5);
    }
}
