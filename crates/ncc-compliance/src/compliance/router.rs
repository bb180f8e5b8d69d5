use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};

use super::calculations::{
    thermal_energy_load, total_cooling_load, total_heating_load, CalculationKind,
    CalculationOutput,
};
use super::domain::{Project, ProjectId};
use super::repository::{ProjectRepository, RepositoryError};
use super::service::{ComplianceService, ComplianceServiceError};

/// Router builder exposing rule resolution, the project store, and the calculations.
pub fn compliance_router<R>(service: Arc<ComplianceService<R>>) -> Router
where
    R: ProjectRepository + 'static,
{
    Router::new()
        .route("/api/v1/compliance/resolve", post(resolve_handler::<R>))
        .route(
            "/api/v1/projects",
            post(register_handler::<R>).get(list_handler::<R>),
        )
        .route("/api/v1/projects/:project_id", get(project_handler::<R>))
        .route(
            "/api/v1/projects/:project_id/compliance",
            get(check_handler::<R>),
        )
        .route("/api/v1/rules/sections", get(sections_handler::<R>))
        .route("/api/v1/rules/reload", post(reload_handler::<R>))
        .route(
            "/api/v1/calculations/:calculation",
            post(calculation_handler),
        )
        .with_state(service)
}

fn error_response(status: StatusCode, message: impl ToString) -> Response {
    let payload = json!({
        "error": message.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}

fn service_error_response(error: ComplianceServiceError) -> Response {
    let status = match &error {
        ComplianceServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ComplianceServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        ComplianceServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        ComplianceServiceError::Repository(RepositoryError::Unavailable(_))
        | ComplianceServiceError::Rules(_)
        | ComplianceServiceError::Resolve(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error_response(status, error)
}

pub(crate) async fn resolve_handler<R>(
    State(service): State<Arc<ComplianceService<R>>>,
    axum::Json(project): axum::Json<Project>,
) -> Response
where
    R: ProjectRepository + 'static,
{
    match service.resolve(&project) {
        Ok(result) => (StatusCode::OK, axum::Json(result)).into_response(),
        Err(other) => service_error_response(other),
    }
}

pub(crate) async fn register_handler<R>(
    State(service): State<Arc<ComplianceService<R>>>,
    axum::Json(project): axum::Json<Project>,
) -> Response
where
    R: ProjectRepository + 'static,
{
    match service.register(project) {
        Ok(record) => (StatusCode::CREATED, axum::Json(record)).into_response(),
        Err(other) => service_error_response(other),
    }
}

pub(crate) async fn list_handler<R>(State(service): State<Arc<ComplianceService<R>>>) -> Response
where
    R: ProjectRepository + 'static,
{
    match service.list() {
        Ok(records) => (StatusCode::OK, axum::Json(records)).into_response(),
        Err(other) => service_error_response(other),
    }
}

pub(crate) async fn project_handler<R>(
    State(service): State<Arc<ComplianceService<R>>>,
    Path(project_id): Path<String>,
) -> Response
where
    R: ProjectRepository + 'static,
{
    match service.get(&ProjectId(project_id)) {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(other) => service_error_response(other),
    }
}

pub(crate) async fn check_handler<R>(
    State(service): State<Arc<ComplianceService<R>>>,
    Path(project_id): Path<String>,
) -> Response
where
    R: ProjectRepository + 'static,
{
    match service.check(&ProjectId(project_id)) {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(other) => service_error_response(other),
    }
}

pub(crate) async fn sections_handler<R>(
    State(service): State<Arc<ComplianceService<R>>>,
) -> Response
where
    R: ProjectRepository + 'static,
{
    let table = match service.rules().get() {
        Ok(table) => table,
        Err(err) => return error_response(StatusCode::INTERNAL_SERVER_ERROR, err),
    };

    let sections: Vec<Value> = table
        .sections()
        .map(|section| {
            json!({
                "name": section.name,
                "kind": section.document.kind(),
            })
        })
        .collect();
    (StatusCode::OK, axum::Json(json!({ "sections": sections }))).into_response()
}

pub(crate) async fn reload_handler<R>(State(service): State<Arc<ComplianceService<R>>>) -> Response
where
    R: ProjectRepository + 'static,
{
    match service.reload_rules() {
        Ok(table) => {
            let payload = json!({
                "reloaded": true,
                "sections": table.len(),
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(other) => service_error_response(other),
    }
}

pub(crate) async fn calculation_handler(
    Path(calculation): Path<String>,
    axum::Json(options): axum::Json<Value>,
) -> Response {
    let kind = match calculation.parse::<CalculationKind>() {
        Ok(kind) => kind,
        Err(err) => return error_response(StatusCode::NOT_FOUND, err),
    };

    match run_calculation(kind, options) {
        Ok(output) => (StatusCode::OK, axum::Json(output)).into_response(),
        Err(err) => error_response(StatusCode::BAD_REQUEST, err),
    }
}

fn run_calculation(
    kind: CalculationKind,
    options: Value,
) -> Result<CalculationOutput, serde_json::Error> {
    let options = match options {
        Value::Null => Value::Object(Default::default()),
        other => other,
    };

    Ok(match kind {
        CalculationKind::TotalHeatingLoad => total_heating_load(&serde_json::from_value(options)?),
        CalculationKind::TotalCoolingLoad => total_cooling_load(&serde_json::from_value(options)?),
        CalculationKind::ThermalEnergyLoad => {
            thermal_energy_load(&serde_json::from_value(options)?)
        }
    })
}
