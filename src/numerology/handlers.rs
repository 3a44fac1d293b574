//! JSON endpoints for the derived numbers.

use crate::numerology::star::star_sum;
use crate::numerology::triangles::{mission_numbers, Family};
use crate::numerology::BirthDate;
use crate::ErrorResponse;
use actix_web::{
    web::{self, Path, Query},
    HttpResponse, Responder,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct DateQuery {
    /// Birthdate in DD.MM.YYYY form.
    pub date: String,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct CoupleQuery {
    /// First birthdate in DD.MM.YYYY form.
    pub date_a: String,
    /// Second birthdate in DD.MM.YYYY form.
    pub date_b: String,
}

fn parse_date(raw: &str) -> Result<BirthDate, HttpResponse> {
    BirthDate::parse(raw)
        .map_err(|e| HttpResponse::BadRequest().json(ErrorResponse::bad_request(&e.to_string())))
}

#[utoipa::path(
    context_path = "/api",
    tag = "Numbers",
    get,
    path = "/numbers/{family}",
    responses(
        (status = 200, description = "Derived numbers for the family"),
        (status = 400, description = "Unknown family or invalid date", body = ErrorResponse)
    ),
    params(
        ("family" = String, Path, description = "personiba, dzimta, finanses, attiecibas, veseliba or misija"),
        DateQuery
    )
)]
pub async fn get_family_numbers(
    family: Path<String>,
    query: Query<DateQuery>,
) -> impl Responder {
    let date = match parse_date(&query.date) {
        Ok(d) => d,
        Err(resp) => return resp,
    };
    let segment = family.into_inner();
    if segment == "misija" {
        return HttpResponse::Ok().json(mission_numbers(date));
    }
    match Family::from_segment(&segment) {
        Some(family) => HttpResponse::Ok().json(family.numbers(date)),
        None => HttpResponse::BadRequest().json(ErrorResponse::bad_request(&format!(
            "unknown family: {}",
            segment
        ))),
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Numbers",
    get,
    path = "/numbers/star-sum",
    responses(
        (status = 200, description = "Raw pairwise outer-star sums for a couple"),
        (status = 400, description = "Invalid date", body = ErrorResponse)
    ),
    params(CoupleQuery)
)]
pub async fn get_star_sum(query: Query<CoupleQuery>) -> impl Responder {
    let a = match parse_date(&query.date_a) {
        Ok(d) => d,
        Err(resp) => return resp,
    };
    let b = match parse_date(&query.date_b) {
        Ok(d) => d,
        Err(resp) => return resp,
    };
    HttpResponse::Ok().json(star_sum(a, b))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/numbers/star-sum").route(web::get().to(get_star_sum)))
        .service(web::resource("/numbers/{family}").route(web::get().to(get_family_numbers)));
}
