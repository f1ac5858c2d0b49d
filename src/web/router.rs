use super::handlers::{
    create_employee, create_mirror_employee, delete_employee, delete_mirror_employee,
    get_employee, get_mirror_employee, healthcheck, list_employees, list_mirror_employees,
    mirror_employee, reconcile_mirror, resynchronize_mirror, update_employee,
    update_mirror_employee,
};
use super::state::AppState;
use axum::Router;
use axum::http::Method;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route(
            "/mongo/employees",
            get(list_mirror_employees).post(create_mirror_employee),
        )
        .route("/mongo/employees/sync", post(resynchronize_mirror))
        .route("/mongo/employees/reconcile", post(reconcile_mirror))
        .route(
            "/mongo/employees/:id",
            get(get_mirror_employee)
                .put(update_mirror_employee)
                .delete(delete_mirror_employee),
        )
        .route("/employees", get(list_employees).post(create_employee))
        .route(
            "/employees/:id",
            get(get_employee).put(update_employee).delete(delete_employee),
        )
        .route("/employees/:id/mirror", post(mirror_employee))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_headers(Any)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::DELETE,
                    Method::OPTIONS,
                ]),
        )
        .with_state(state)
}
