//! HTTP handlers for the certificate form.

use actix_web::{web, HttpResponse, Responder};
use chrono::Local;
use log::{error, info, warn};

use super::models::{IssueReport, IssueRequest, VerificationSummary, VerifyRequest};
use super::pages::{render_form, render_results};
use super::service::CertificateError;
use crate::db::AppState;
use crate::ErrorResponse;

fn error_response(err: CertificateError) -> HttpResponse {
    match err {
        CertificateError::NotFound(_) => {
            HttpResponse::NotFound().json(ErrorResponse::not_found(&err.to_string()))
        }
        CertificateError::Validation(message) => {
            HttpResponse::BadRequest().json(ErrorResponse::bad_request(&message))
        }
        CertificateError::Store(e) => {
            error!("Record store failure: {}", e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("No se pudieron leer los registros"))
        }
        CertificateError::NothingGenerated(report) => HttpResponse::InternalServerError()
            .content_type("text/html; charset=utf-8")
            .body(render_results(&report)),
    }
}

pub async fn index() -> impl Responder {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(render_form())
}

#[utoipa::path(
    post,
    path = "/api/verify",
    tag = "Certificates",
    request_body(content = VerifyRequest, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Latest title and contract status", body = VerificationSummary),
        (status = 400, description = "Invalid ID", body = ErrorResponse),
        (status = 404, description = "No records for this ID", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse)
    )
)]
pub async fn verify(state: web::Data<AppState>, form: web::Form<VerifyRequest>) -> impl Responder {
    info!("Executing verify handler");
    match state.service.verify(&form).await {
        Ok(summary) => HttpResponse::Ok().json(summary),
        Err(e) => {
            warn!("Verification failed: {}", e);
            error_response(e)
        }
    }
}

#[utoipa::path(
    post,
    path = "/generate",
    tag = "Certificates",
    request_body(content = IssueRequest, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "HTML page listing one entry per employer", body = IssueReport, content_type = "text/html"),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "No records for this ID", body = ErrorResponse),
        (status = 500, description = "No certificate could be generated", body = IssueReport, content_type = "text/html")
    )
)]
pub async fn generate(state: web::Data<AppState>, form: web::Form<IssueRequest>) -> impl Responder {
    info!("Executing generate handler");
    let today = Local::now().date_naive();
    match state.service.issue(&form, today).await {
        Ok(report) => HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(render_results(&report)),
        Err(e) => {
            warn!("Certificate generation failed: {}", e);
            error_response(e)
        }
    }
}

pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

pub async fn certificate_metrics() -> impl Responder {
    match crate::metrics::gather_text() {
        Ok(text) => HttpResponse::Ok()
            .content_type("text/plain; version=0.0.4")
            .body(text),
        Err(e) => {
            error!("Failed to encode certificate metrics: {}", e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("No se pudieron leer las métricas"))
        }
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/").route(web::get().to(index)))
        .service(web::resource("/generate").route(web::post().to(generate)))
        .service(web::resource("/health").route(web::get().to(health)))
        .service(web::resource("/certificates/metrics").route(web::get().to(certificate_metrics)))
        .service(web::resource("/api/verify").route(web::post().to(verify)));
}
