use super::error::ApiResult;
use super::state::AppState;
use crate::core::{Employee, EmployeeChanges, EmployeeId, MirrorEmployee, MirrorId};
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
}

pub async fn healthcheck() -> Json<HealthStatus> {
    Json(HealthStatus { status: "ok" })
}

// Document mirror

pub async fn list_mirror_employees(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<MirrorEmployee>>> {
    Ok(Json(state.mirror.list().await?))
}

pub async fn create_mirror_employee(
    State(state): State<AppState>,
    Json(payload): Json<MirrorEmployee>,
) -> ApiResult<(StatusCode, Json<MirrorEmployee>)> {
    let saved = state.mirror.save(payload).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

pub async fn get_mirror_employee(
    State(state): State<AppState>,
    Path(id): Path<MirrorId>,
) -> ApiResult<Json<MirrorEmployee>> {
    Ok(Json(state.mirror.get(&id).await?))
}

pub async fn update_mirror_employee(
    State(state): State<AppState>,
    Path(id): Path<MirrorId>,
    Json(payload): Json<EmployeeChanges>,
) -> ApiResult<Json<MirrorEmployee>> {
    Ok(Json(state.mirror.update(&id, payload).await?))
}

pub async fn delete_mirror_employee(
    State(state): State<AppState>,
    Path(id): Path<MirrorId>,
) -> ApiResult<Json<MirrorEmployee>> {
    Ok(Json(state.mirror.delete(&id).await?))
}

pub async fn resynchronize_mirror(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<MirrorEmployee>>> {
    Ok(Json(state.mirror.resynchronize().await?))
}

pub async fn reconcile_mirror(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<MirrorEmployee>>> {
    Ok(Json(state.mirror.reconcile().await?))
}

// Store of record

pub async fn list_employees(State(state): State<AppState>) -> ApiResult<Json<Vec<Employee>>> {
    Ok(Json(state.employees.list().await?))
}

pub async fn create_employee(
    State(state): State<AppState>,
    Json(payload): Json<Employee>,
) -> ApiResult<(StatusCode, Json<Employee>)> {
    let saved = state.employees.save(payload).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

pub async fn get_employee(
    State(state): State<AppState>,
    Path(id): Path<EmployeeId>,
) -> ApiResult<Json<Employee>> {
    Ok(Json(state.employees.get(id).await?))
}

pub async fn update_employee(
    State(state): State<AppState>,
    Path(id): Path<EmployeeId>,
    Json(payload): Json<EmployeeChanges>,
) -> ApiResult<Json<Employee>> {
    Ok(Json(state.employees.update(id, payload).await?))
}

pub async fn delete_employee(
    State(state): State<AppState>,
    Path(id): Path<EmployeeId>,
) -> ApiResult<Json<Employee>> {
    Ok(Json(state.employees.delete(id).await?))
}

pub async fn mirror_employee(
    State(state): State<AppState>,
    Path(id): Path<EmployeeId>,
) -> ApiResult<Json<MirrorEmployee>> {
    Ok(Json(state.employees.mirror(id).await?))
}
