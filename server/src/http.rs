use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};

use anyhow::Context;
use axum::{
    Json, Router,
    extract::{Path, State},
    http::{self, HeaderName, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::get,
};
use platform_api::ApiResult;
use platform_db::DbPool;
use products_hr::{CollectionModel, EMPLOYEES_PATH, Employee, EmployeeController, EntityModel};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{info, instrument};

use crate::config::AppConfig;

/// Backing store behind the controller, kept around for health checks.
#[derive(Clone)]
pub enum Store {
    Memory,
    Database(DbPool),
}

impl Store {
    async fn healthy(&self) -> bool {
        match self {
            Store::Memory => true,
            Store::Database(pool) => platform_db::ping(pool).await,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub employees: EmployeeController,
    pub store: Store,
    pub config: Arc<AppConfig>,
}

#[derive(Clone, Debug)]
pub struct ServeConfig {
    addr: SocketAddr,
}

impl ServeConfig {
    pub fn new(host: IpAddr, port: u16) -> Self {
        Self {
            addr: SocketAddr::from((host, port)),
        }
    }
}

pub async fn serve(config: ServeConfig, state: AppState) -> anyhow::Result<()> {
    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;

    info!(%config.addr, "payroll server listening");
    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;
    Ok(())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed = origins
        .iter()
        .filter_map(|origin| origin.parse::<HeaderValue>().ok())
        .collect::<Vec<_>>();
    let layer = CorsLayer::new()
        .allow_headers([http::header::CONTENT_TYPE])
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE]);
    // Credentials cannot be combined with a wildcard origin.
    if allowed.is_empty() {
        layer.allow_origin(AllowOrigin::any())
    } else {
        layer
            .allow_credentials(true)
            .allow_origin(AllowOrigin::list(allowed))
    }
}

pub fn build_router(state: AppState) -> Router {
    let request_id = MakeRequestUuid;
    let header_name = HeaderName::from_static("x-request-id");
    let item_path = format!("{EMPLOYEES_PATH}/{{id}}");
    Router::new()
        .route("/health", get(health_handler))
        .route(EMPLOYEES_PATH, get(all_handler).post(new_employee_handler))
        .route(
            &item_path,
            get(one_handler).put(update_handler).delete(delete_handler),
        )
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(header_name.clone(), request_id))
                .layer(PropagateRequestIdLayer::new(header_name))
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&state.config.cors_allowed_origins)),
        )
        .with_state(state)
}

#[instrument(name = "http.employees.all", skip_all)]
async fn all_handler(State(state): State<AppState>) -> ApiResult<Json<CollectionModel>> {
    Ok(Json(state.employees.all().await?))
}

#[instrument(name = "http.employees.create", skip_all)]
async fn new_employee_handler(
    State(state): State<AppState>,
    Json(employee): Json<Employee>,
) -> ApiResult<Json<Employee>> {
    Ok(Json(state.employees.new_employee(employee).await?))
}

#[instrument(name = "http.employees.one", skip(state))]
async fn one_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<EntityModel<Employee>>> {
    Ok(Json(state.employees.one(id).await?))
}

#[instrument(name = "http.employees.update", skip(state, employee))]
async fn update_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(employee): Json<Employee>,
) -> ApiResult<Json<Employee>> {
    Ok(Json(
        state.employees.update_existing_employee(employee, id).await?,
    ))
}

#[instrument(name = "http.employees.delete", skip(state))]
async fn delete_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.employees.delete_employee(id).await?;
    Ok(StatusCode::OK)
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let store_ok = state.store.healthy().await;
    Json(HealthResponse {
        ok: store_ok,
        store_ok,
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    store_ok: bool,
    version: &'static str,
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install CTRL+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        signal(SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    };
    info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use products_hr::{
        EmployeeRepository, InMemoryEmployeeRepository, RepositoryError, RepositoryResult,
        preload,
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn test_config() -> Arc<AppConfig> {
        Arc::new(AppConfig {
            cors_allowed_origins: vec!["http://localhost:5173".into()],
            preload_sample_data: None,
        })
    }

    fn app_with(repository: Arc<dyn EmployeeRepository>) -> Router {
        build_router(AppState {
            employees: EmployeeController::new(repository),
            store: Store::Memory,
            config: test_config(),
        })
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, body.to_vec())
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    fn json_req(method: Method, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(http::header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn as_json(body: &[u8]) -> Value {
        serde_json::from_slice(body).unwrap()
    }

    #[tokio::test]
    async fn lists_employees_as_hal_collection() {
        let repo = InMemoryEmployeeRepository::new();
        preload(&repo).await.unwrap();
        let app = app_with(Arc::new(repo));

        let (status, body) = send(&app, get_req("/employees")).await;
        assert_eq!(status, StatusCode::OK);
        let body = as_json(&body);
        assert_eq!(body["_links"], json!({"self": {"href": "/employees"}}));
        let list = body["_embedded"]["employeeList"].as_array().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0]["id"], 1);
        assert_eq!(list[0]["name"], "Bilbo Baggins");
        assert_eq!(list[0]["role"], "burglar");
        assert_eq!(list[1]["id"], 2);
        assert_eq!(list[1]["name"], "Frodo Baggins");
        assert_eq!(
            list[1]["_links"],
            json!({"self": {"href": "/employees/2"}, "employees": {"href": "/employees"}})
        );
    }

    #[tokio::test]
    async fn empty_store_lists_an_empty_collection() {
        let app = app_with(Arc::new(InMemoryEmployeeRepository::new()));
        let (status, body) = send(&app, get_req("/employees")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            as_json(&body),
            json!({"_embedded": {"employeeList": []}, "_links": {"self": {"href": "/employees"}}})
        );
    }

    #[tokio::test]
    async fn reads_single_employee_with_links() {
        let repo = InMemoryEmployeeRepository::new();
        preload(&repo).await.unwrap();
        let app = app_with(Arc::new(repo));

        let (status, body) = send(&app, get_req("/employees/1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            as_json(&body),
            json!({
                "id": 1,
                "name": "Bilbo Baggins",
                "role": "burglar",
                "_links": {
                    "self": {"href": "/employees/1"},
                    "employees": {"href": "/employees"}
                }
            })
        );
    }

    #[tokio::test]
    async fn missing_employee_is_a_404_with_message() {
        let app = app_with(Arc::new(InMemoryEmployeeRepository::new()));
        let (status, body) = send(&app, get_req("/employees/1")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(String::from_utf8(body).unwrap(), "Employee with ID 1 not found");
    }

    #[tokio::test]
    async fn non_numeric_id_is_rejected() {
        let app = app_with(Arc::new(InMemoryEmployeeRepository::new()));
        let (status, _) = send(&app, get_req("/employees/bilbo")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn create_update_and_delete() {
        let app = app_with(Arc::new(InMemoryEmployeeRepository::new()));

        let (status, body) = send(
            &app,
            json_req(
                Method::POST,
                "/employees",
                json!({"name": "Samwise Gamgee", "role": "gardener"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            as_json(&body),
            json!({"id": 1, "name": "Samwise Gamgee", "role": "gardener"})
        );

        let (status, body) = send(
            &app,
            json_req(
                Method::PUT,
                "/employees/1",
                json!({"name": "Samwise Gamgee", "role": "ringbearer"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(as_json(&body)["role"], "ringbearer");
        assert_eq!(as_json(&body)["id"], 1);

        let delete = Request::delete("/employees/1").body(Body::empty()).unwrap();
        let (status, body) = send(&app, delete).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.is_empty());

        let (status, _) = send(&app, get_req("/employees/1")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn put_on_unknown_id_creates_a_new_record() {
        let app = app_with(Arc::new(InMemoryEmployeeRepository::new()));
        let (status, body) = send(
            &app,
            json_req(
                Method::PUT,
                "/employees/999",
                json!({"name": "New", "role": "Hire"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(as_json(&body), json!({"id": 1, "name": "New", "role": "Hire"}));
    }

    #[tokio::test]
    async fn deleting_unknown_id_succeeds() {
        let app = app_with(Arc::new(InMemoryEmployeeRepository::new()));
        let delete = Request::delete("/employees/77").body(Body::empty()).unwrap();
        let (status, _) = send(&app, delete).await;
        assert_eq!(status, StatusCode::OK);
    }

    struct BrokenRepository;

    #[async_trait]
    impl EmployeeRepository for BrokenRepository {
        async fn find_all(&self) -> RepositoryResult<Vec<Employee>> {
            Err(RepositoryError::Unavailable("primary down".into()))
        }

        async fn find_by_id(&self, _id: i64) -> RepositoryResult<Option<Employee>> {
            Err(RepositoryError::Unavailable("primary down".into()))
        }

        async fn save(&self, _employee: Employee) -> RepositoryResult<Employee> {
            Err(RepositoryError::Unavailable("primary down".into()))
        }

        async fn delete_by_id(&self, _id: i64) -> RepositoryResult<()> {
            Err(RepositoryError::Unavailable("primary down".into()))
        }
    }

    #[tokio::test]
    async fn repository_failures_are_masked_500s() {
        let app = app_with(Arc::new(BrokenRepository));
        for request in [
            get_req("/employees"),
            get_req("/employees/1"),
            json_req(Method::POST, "/employees", json!({"name": "x"})),
        ] {
            let (status, body) = send(&app, request).await;
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(String::from_utf8(body).unwrap(), "internal server error");
        }
    }

    #[tokio::test]
    async fn health_reports_store_and_request_id() {
        let app = app_with(Arc::new(InMemoryEmployeeRepository::new()));
        let response = app.clone().oneshot(get_req("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body = as_json(&body);
        assert_eq!(body["ok"], true);
        assert_eq!(body["store_ok"], true);
    }
}
