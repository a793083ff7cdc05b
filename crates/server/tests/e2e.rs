use std::net::SocketAddr;
use std::sync::Arc;

use axum::{http::HeaderMap, routing::get, Json, Router};
use common::remote::HostedDataClient;
use reqwest::StatusCode as HttpStatusCode;
use serde_json::{json, Value};
use tokio::net::TcpListener;

use models::user_detail::UserRecord;
use server::routes;
use server::startup::build_cors;
use server::state::AppState;
use service::remote::HostedTableSource;
use service::user_record::repository::mock::MockUserRecordRepository;
use service::user_record::RecordService;

struct TestApp {
    base_url: String,
    repo: Arc<MockUserRecordRepository>,
}

async fn serve(app: Router) -> anyhow::Result<String> {
    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await { eprintln!("server error: {}", e); }
    });
    Ok(format!("http://{}:{}", addr.ip(), addr.port()))
}

/// Stand-in for the hosted data API; echoes the credentials it received.
async fn start_remote_stub() -> anyhow::Result<String> {
    async fn rows(headers: HeaderMap) -> Json<Value> {
        let h = |name: &str| headers.get(name).and_then(|v| v.to_str().ok()).unwrap_or("").to_string();
        Json(json!([{
            "user_id": "R1",
            "opening_date": "2024-01-15T00:00:00+00:00",
            "seen_apikey": h("apikey"),
            "seen_authorization": h("authorization"),
        }]))
    }
    serve(Router::new().route("/rest/v1/user_details", get(rows))).await
}

async fn start_server_with(repo: MockUserRecordRepository, remote_base: &str) -> anyhow::Result<TestApp> {
    let repo = Arc::new(repo);
    let client = HostedDataClient::new(remote_base, "anon-key");
    let records = RecordService::new(repo.clone(), Arc::new(HostedTableSource::new(client, "user_details")));
    let app = routes::build_router(AppState::new(records), build_cors());
    let base_url = serve(app).await?;
    Ok(TestApp { base_url, repo })
}

async fn start_server() -> anyhow::Result<TestApp> {
    // Port 1 refuses connections: remote calls fail fast.
    start_server_with(MockUserRecordRepository::default(), "http://127.0.0.1:1").await
}

fn is_day_date(v: &Value) -> bool {
    let Some(s) = v.as_str() else { return false };
    let b = s.as_bytes();
    b.len() == 10
        && b[4] == b'-'
        && b[7] == b'-'
        && b.iter().enumerate().all(|(i, c)| i == 4 || i == 7 || c.is_ascii_digit())
}

fn u1() -> Value {
    json!({"user_id": "U1", "account_type": "savings", "opening_date": "2024-01-15", "closing_date": null, "lop": 2})
}

#[tokio::test]
async fn e2e_public_health() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = reqwest::get(format!("{}/health", app.base_url)).await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn e2e_create_echoes_record_and_lists_it() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = reqwest::Client::new();

    let res = c.post(format!("{}/users", app.base_url)).json(&u1()).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert_eq!(res.json::<Value>().await?, u1());

    let res = c.get(format!("{}/users", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body, json!({"data": [u1()]}));

    let res = c.get(format!("{}/active-users", app.base_url)).send().await?;
    let body = res.json::<Value>().await?;
    assert_eq!(body["data"][0]["user_id"], "U1");
    Ok(())
}

#[tokio::test]
async fn e2e_active_users_excludes_closed_accounts() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = reqwest::Client::new();

    c.post(format!("{}/users", app.base_url)).json(&u1()).send().await?;
    let closed = json!({"user_id": "U2", "account_type": "current", "opening_date": "2023-03-01", "closing_date": "2024-06-01", "lop": 0});
    let res = c.post(format!("{}/users", app.base_url)).json(&closed).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);

    let all = c.get(format!("{}/users", app.base_url)).send().await?.json::<Value>().await?;
    let active = c.get(format!("{}/active-users", app.base_url)).send().await?.json::<Value>().await?;

    let all = all["data"].as_array().cloned().unwrap_or_default();
    let active = active["data"].as_array().cloned().unwrap_or_default();
    assert_eq!(all.len(), 2);
    let expected: Vec<Value> = all.iter().filter(|r| r["closing_date"].is_null()).cloned().collect();
    assert_eq!(active, expected);

    for row in &all {
        assert!(is_day_date(&row["opening_date"]), "bad opening_date {}", row["opening_date"]);
        assert!(row["closing_date"].is_null() || is_day_date(&row["closing_date"]));
    }
    Ok(())
}

#[tokio::test]
async fn e2e_duplicate_user_id_is_a_500_and_first_row_survives() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = reqwest::Client::new();

    c.post(format!("{}/users", app.base_url)).json(&u1()).send().await?;
    let dup = json!({"user_id": "U1", "account_type": "current", "opening_date": "2020-01-01", "closing_date": null, "lop": 9});
    let res = c.post(format!("{}/users", app.base_url)).json(&dup).send().await?;
    assert_eq!(res.status(), HttpStatusCode::INTERNAL_SERVER_ERROR);
    let body = res.json::<Value>().await?;
    assert!(body["error"].as_str().is_some_and(|m| !m.is_empty()));

    let all = c.get(format!("{}/users", app.base_url)).send().await?.json::<Value>().await?;
    assert_eq!(all, json!({"data": [u1()]}));
    Ok(())
}

#[tokio::test]
async fn e2e_malformed_date_is_rejected() -> anyhow::Result<()> {
    let app = start_server().await?;
    let bad = json!({"user_id": "U1", "account_type": "savings", "opening_date": "15-01-2024", "closing_date": null, "lop": 2});
    let res = reqwest::Client::new().post(format!("{}/users", app.base_url)).json(&bad).send().await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);
    let body = res.json::<Value>().await?;
    assert!(body["error"].as_str().is_some_and(|m| m.contains("opening_date")));
    assert_eq!(app.repo.calls(), 0);
    Ok(())
}

#[tokio::test]
async fn e2e_store_failure_is_a_500_with_message() -> anyhow::Result<()> {
    let app = start_server_with(MockUserRecordRepository::failing("connection refused"), "http://127.0.0.1:1").await?;
    for path in ["users", "active-users"] {
        let res = reqwest::get(format!("{}/{}", app.base_url, path)).await?;
        assert_eq!(res.status(), HttpStatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(res.json::<Value>().await?, json!({"error": "connection refused"}));
    }
    Ok(())
}

#[tokio::test]
async fn e2e_supabase_data_passes_remote_body_through() -> anyhow::Result<()> {
    let remote = start_remote_stub().await?;
    let app = start_server_with(MockUserRecordRepository::default(), &remote).await?;

    let res = reqwest::get(format!("{}/supabase-data", app.base_url)).await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body = res.json::<Value>().await?;
    let row = &body["data"][0];
    assert_eq!(row["seen_apikey"], "anon-key");
    assert_eq!(row["seen_authorization"], "Bearer anon-key");
    // remote formatting is left as-is
    assert_eq!(row["opening_date"], "2024-01-15T00:00:00+00:00");
    assert_eq!(app.repo.calls(), 0);
    Ok(())
}

#[tokio::test]
async fn e2e_unreachable_remote_is_a_500_without_store_access() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = reqwest::get(format!("{}/supabase-data", app.base_url)).await?;
    assert_eq!(res.status(), HttpStatusCode::INTERNAL_SERVER_ERROR);
    let body = res.json::<Value>().await?;
    assert!(body["error"].as_str().is_some_and(|m| !m.is_empty()));
    assert_eq!(app.repo.calls(), 0);
    Ok(())
}

#[tokio::test]
async fn e2e_lop_accepts_any_numeric() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = reqwest::Client::new();

    for (user_id, lop) in [("F1", json!(2.5)), ("F2", json!(3_000_000_000i64)), ("F3", json!(-1))] {
        let body = json!({"user_id": user_id, "account_type": "savings", "opening_date": "2024-01-15", "closing_date": null, "lop": lop});
        let res = c.post(format!("{}/users", app.base_url)).json(&body).send().await?;
        assert_eq!(res.status(), HttpStatusCode::OK, "lop {lop}");
        assert_eq!(res.json::<Value>().await?, body);
    }
    Ok(())
}

#[tokio::test]
async fn e2e_unreadable_bodies_answer_with_error_json() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = reqwest::Client::new();

    let null_lop = json!({"user_id": "U1", "account_type": "savings", "opening_date": "2024-01-15", "closing_date": null, "lop": null});
    let missing_field = json!({"user_id": "U1", "opening_date": "2024-01-15", "lop": 2});
    for body in [null_lop, missing_field] {
        let res = c.post(format!("{}/users", app.base_url)).json(&body).send().await?;
        assert!(res.status().is_client_error(), "status {}", res.status());
        assert!(res
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/json")));
        let err = res.json::<Value>().await?;
        assert!(err["error"].as_str().is_some_and(|m| !m.is_empty()), "body {err}");
    }

    let res = c
        .post(format!("{}/users", app.base_url))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);
    assert!(res.json::<Value>().await?["error"].is_string());

    assert_eq!(app.repo.calls(), 0);
    Ok(())
}

#[tokio::test]
async fn e2e_seeded_closed_rows_stay_out_of_active_users() -> anyhow::Result<()> {
    let seeded: Vec<UserRecord> = serde_json::from_value(json!([
        {"user_id": "S1", "account_type": "savings", "opening_date": "2022-05-01", "closing_date": null, "lop": 1},
        {"user_id": "S2", "account_type": "current", "opening_date": "2021-01-10", "closing_date": "2024-06-01", "lop": 0.5},
    ]))?;
    let app = start_server_with(MockUserRecordRepository::with_rows(seeded), "http://127.0.0.1:1").await?;

    let active = reqwest::get(format!("{}/active-users", app.base_url)).await?.json::<Value>().await?;
    assert_eq!(
        active,
        json!({"data": [{"user_id": "S1", "account_type": "savings", "opening_date": "2022-05-01", "closing_date": null, "lop": 1}]})
    );

    let all = reqwest::get(format!("{}/users", app.base_url)).await?.json::<Value>().await?;
    assert_eq!(all["data"][1]["closing_date"], "2024-06-01");
    assert_eq!(all["data"][1]["lop"], json!(0.5));
    Ok(())
}
