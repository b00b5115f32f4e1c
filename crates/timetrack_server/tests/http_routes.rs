use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::time::Duration;
use tempfile::TempDir;
use timetrack_core::db::{open_pool, PoolConfig};
use timetrack_server::{build_router, AppState, PeopleInfoClient};
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct TestApp {
    router: Router,
    _dir: TempDir,
}

fn app_with(people_api: Option<PeopleInfoClient>) -> TestApp {
    let dir = TempDir::new().unwrap();
    let pool = open_pool(dir.path().join("timetrack.db"), &PoolConfig::default()).unwrap();
    TestApp {
        router: build_router(AppState::new(pool, people_api)),
        _dir: dir,
    }
}

fn app() -> TestApp {
    app_with(None)
}

impl TestApp {
    async fn call(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    async fn register(&self, passport: &str) -> i64 {
        let (status, body) = self
            .call(
                Method::POST,
                "/persons",
                Some(json!({ "passportNumber": passport })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["person_id"].as_i64().unwrap()
    }

    async fn create_task(&self, person_id: i64, name: &str) -> i64 {
        let (status, body) = self
            .call(
                Method::POST,
                &format!("/persons/{person_id}/tasks"),
                Some(json!({ "task_name": name })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["task_id"].as_i64().unwrap()
    }
}

#[tokio::test]
async fn health_reports_ok() {
    let app = app();
    let (status, body) = app.call(Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn task_lifecycle_over_http() {
    let app = app();
    let person_id = app.register("1234 567890").await;
    let task_id = app.create_task(person_id, "write report").await;

    let (status, body) = app.call(Method::GET, &format!("/tasks/{task_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "write report");
    assert!(body["started_at"].is_null());

    let (status, body) = app
        .call(Method::PUT, &format!("/tasks/{task_id}/start"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["started_at"].is_string());

    let (status, body) = app
        .call(Method::PUT, &format!("/tasks/{task_id}/stop"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["duration_secs"], 0);
    assert_eq!(body["all_time"], "00 ч 00 м");

    let (status, body) = app
        .call(
            Method::POST,
            &format!("/persons/{person_id}/tasks/report"),
            Some(json!({})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["task_name"], "write report");
    assert_eq!(rows[0]["all_time"], "00 ч 00 м");
}

#[tokio::test]
async fn error_kinds_map_to_status_codes() {
    let app = app();
    let person_id = app.register("1234 567890").await;
    let task_id = app.create_task(person_id, "review").await;

    // NotFound
    let (status, body) = app.call(Method::GET, "/tasks/9999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());

    // PreconditionFailed
    let (status, _) = app
        .call(Method::PUT, &format!("/tasks/{task_id}/stop"), None)
        .await;
    assert_eq!(status, StatusCode::PRECONDITION_REQUIRED);

    // Conflict
    let (status, _) = app
        .call(Method::PUT, &format!("/tasks/{task_id}/start"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app
        .call(Method::PUT, &format!("/tasks/{task_id}/start"), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Validation
    let (status, _) = app
        .call(
            Method::POST,
            &format!("/persons/{person_id}/tasks"),
            Some(json!({ "task_name": "   " })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn registration_rejects_malformed_and_duplicate_passports() {
    let app = app();
    for raw in ["123 567890", "1234-567890", "12a4 567890"] {
        let (status, _) = app
            .call(Method::POST, "/persons", Some(json!({ "passportNumber": raw })))
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{raw}");
    }

    app.register("1234 567890").await;
    let (status, _) = app
        .call(
            Method::POST,
            "/persons",
            Some(json!({ "passportNumber": "1234 567890" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn person_update_search_and_delete() {
    let app = app();
    let first = app.register("1111 111111").await;
    let second = app.register("2222 222222").await;

    let (status, _) = app
        .call(
            Method::PUT,
            &format!("/persons/{second}"),
            Some(json!({ "surname": "Petrov", "address": "" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .call(
            Method::POST,
            "/persons/search?page=1&limit=10",
            Some(json!({ "surname": "Petrov" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let found = body.as_array().unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["id"], second);
    assert_eq!(found[0]["passport_series"], "2222");

    let (status, _) = app
        .call(Method::PUT, &format!("/persons/{second}"), Some(json!({ "name": "" })))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = app
        .call(
            Method::POST,
            "/persons/search",
            Some(json!({ "id": second.to_string() })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["surname"], "Petrov");

    let (status, body) = app
        .call(Method::POST, "/persons/search?page=2&limit=1", Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap()[0]["id"], second);

    let (status, _) = app
        .call(Method::DELETE, &format!("/persons/{first}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.call(Method::GET, &format!("/persons/{first}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app
        .call(Method::DELETE, &format!("/persons/{first}"), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn report_validates_dates() {
    let app = app();
    let person_id = app.register("1234 567890").await;
    let uri = format!("/persons/{person_id}/tasks/report");

    let (status, _) = app
        .call(Method::POST, &uri, Some(json!({ "start": "2024-01-01" })))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = app
        .call(
            Method::POST,
            &uri,
            Some(json!({ "start": "02.01.2024", "end": "01.01.2024" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = app
        .call(
            Method::POST,
            &uri,
            Some(json!({ "start": "01.01.2024", "end": "01.01.2024" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn registration_uses_people_lookup() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/info"))
        .and(query_param("passportSerie", "1234"))
        .and(query_param("passportNumber", "567890"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "surname": "Ivanov",
            "name": "Ivan",
            "patronymic": "Ivanovich",
            "address": "Moscow"
        })))
        .mount(&server)
        .await;
    let client = PeopleInfoClient::new(server.uri(), Duration::from_secs(5)).unwrap();
    let app = app_with(Some(client));

    let person_id = app.register("1234 567890").await;
    let (status, body) = app
        .call(Method::GET, &format!("/persons/{person_id}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["surname"], "Ivanov");
    assert_eq!(body["address"], "Moscow");
}

#[tokio::test]
async fn failed_lookup_is_service_unavailable() {
    let server = MockServer::start().await;
    Mock::given(path("/info"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;
    let client = PeopleInfoClient::new(server.uri(), Duration::from_secs(5)).unwrap();
    let app = app_with(Some(client));

    let (status, body) = app
        .call(
            Method::POST,
            "/persons",
            Some(json!({ "passportNumber": "1234 567890" })),
        )
        .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["error"].as_str().unwrap().contains("502"));
}
