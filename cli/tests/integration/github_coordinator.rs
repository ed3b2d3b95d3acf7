//! `GithubCoordinator` against a local fake of the runners REST API.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use serde_json::json;

use ec2_runner_cli::application::UnitLog;
use ec2_runner_cli::application::ports::{CoordinatorApi, LogLevel, LogSink};
use ec2_runner_cli::application::services::registry;
use ec2_runner_cli::domain::{RegistryError, UnitId};
use ec2_runner_cli::infra::github::GithubCoordinator;

const TOKEN: &str = "s3cret";
const RUNNERS: &str = "/repos/acme/widgets/actions/runners";

#[derive(Clone, Default)]
struct Fake {
    runners: usize,
    deleted: Arc<Mutex<Vec<u64>>>,
    pages: Arc<Mutex<Vec<(u32, u32)>>>,
}

#[derive(serde::Deserialize)]
struct PageQuery {
    per_page: u32,
    page: u32,
}

fn authorized(headers: &HeaderMap) -> bool {
    let bearer = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        == Some(&format!("Bearer {TOKEN}"));
    let accept = headers.get("accept").and_then(|v| v.to_str().ok())
        == Some("application/vnd.github+json");
    let version = headers
        .get("x-github-api-version")
        .and_then(|v| v.to_str().ok())
        == Some("2022-11-28");
    bearer && accept && version && headers.contains_key("user-agent")
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        axum::Json(json!({"message": "Bad credentials"})),
    )
        .into_response()
}

async fn registration_token(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    (
        StatusCode::CREATED,
        axum::Json(json!({"token": "REG123", "expires_at": "2030-01-01T00:00:00Z"})),
    )
        .into_response()
}

async fn list_runners(
    State(fake): State<Fake>,
    headers: HeaderMap,
    Query(q): Query<PageQuery>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    fake.pages.lock().expect("lock").push((q.page, q.per_page));
    let start = ((q.page - 1) * q.per_page) as usize;
    let runners: Vec<_> = (start..fake.runners.min(start + q.per_page as usize))
        .map(|i| {
            json!({
                "id": i + 1,
                "name": format!("ip-{i}"),
                "os": "linux",
                "status": if i % 2 == 0 { "online" } else { "offline" },
                "busy": false,
                "labels": [
                    {"id": 1, "name": "self-hosted", "type": "read-only"},
                    {"id": 2, "name": format!("unit{i}-0000abcd"), "type": "custom"}
                ]
            })
        })
        .collect();
    axum::Json(json!({"total_count": fake.runners, "runners": runners})).into_response()
}

async fn delete_runner(
    State(fake): State<Fake>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    fake.deleted.lock().expect("lock").push(id);
    StatusCode::NO_CONTENT.into_response()
}

async fn serve(fake: Fake) -> SocketAddr {
    let app = Router::new()
        .route(
            &format!("{RUNNERS}/registration-token"),
            post(registration_token),
        )
        .route(RUNNERS, get(list_runners))
        .route(&format!("{RUNNERS}/{{id}}"), delete(delete_runner))
        .with_state(fake);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    addr
}

fn client(addr: SocketAddr, token: &str) -> GithubCoordinator {
    GithubCoordinator::new(&format!("http://{addr}/"), "acme/widgets", token).expect("client")
}

struct Quiet;
impl LogSink for Quiet {
    fn log(&self, _: LogLevel, _: &str) {}
}

#[tokio::test]
async fn registration_token_is_returned() {
    let addr = serve(Fake::default()).await;
    let token = client(addr, TOKEN)
        .create_registration_token()
        .await
        .expect("token");
    assert_eq!(token, "REG123");
}

#[tokio::test]
async fn bad_credentials_surface_status_and_body() {
    let addr = serve(Fake::default()).await;
    let err = client(addr, "wrong")
        .create_registration_token()
        .await
        .expect_err("expected Err");
    match err.downcast_ref::<RegistryError>() {
        Some(RegistryError::Status { status, body, .. }) => {
            assert_eq!(*status, 401);
            assert!(body.contains("Bad credentials"), "{body}");
        }
        other => panic!("unexpected error: {other:?} / {err:#}"),
    }
}

#[tokio::test]
async fn find_worker_pages_through_the_real_client() {
    let fake = Fake {
        runners: 150,
        ..Fake::default()
    };
    let pages = Arc::clone(&fake.pages);
    let addr = serve(fake).await;

    let found = registry::find_worker(&client(addr, TOKEN), "unit120-0000abcd")
        .await
        .expect("find")
        .expect("worker");

    assert_eq!(found.id, 121);
    assert!(found.is_online());
    assert_eq!(*pages.lock().expect("lock"), [(1, 100), (2, 100)]);
}

#[tokio::test]
async fn remove_worker_deletes_by_id() {
    let fake = Fake {
        runners: 3,
        ..Fake::default()
    };
    let deleted = Arc::clone(&fake.deleted);
    let addr = serve(fake).await;
    let unit = UnitId::single();
    let log = UnitLog::new(&Quiet, &unit);

    registry::remove_worker(&client(addr, TOKEN), "unit1-0000abcd", &log)
        .await
        .expect("remove");
    registry::remove_worker(&client(addr, TOKEN), "missing", &log)
        .await
        .expect("absent is fine");

    assert_eq!(*deleted.lock().expect("lock"), [2]);
}
