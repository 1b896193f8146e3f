use std::net::SocketAddr;

use axum::Router;
use migration::MigratorTrait;
use models::{school, student};
use reqwest::StatusCode as HttpStatusCode;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

use server::{routes, state::ServerState};

struct TestApp {
    base_url: String,
    gracia_id: i32,
    eixample_id: i32,
}

impl TestApp {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Serve the router over a private in-memory database seeded with two
/// schools: Escola Gracia (capacity 2, full) and Escola Eixample (capacity 100).
async fn start_server() -> anyhow::Result<TestApp> {
    let db = models::db::connect_with_config(&configs::DatabaseConfig::in_memory()).await?;
    migration::Migrator::up(&db, None).await?;

    let gracia = school::create(&db, "Escola Gracia", 2).await?;
    let eixample = school::create(&db, "Escola Eixample", 100).await?;
    student::create(&db, "ST-000001", "Jordi", "Pujol", gracia.id).await?;
    student::create(&db, "ST-000002", "Maria", "Doblas", gracia.id).await?;

    let app: Router = routes::build_router(ServerState::new(db), CorsLayer::very_permissive());
    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    let base_url = format!("http://{}:{}", addr.ip(), addr.port());

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await { eprintln!("server error: {}", e); }
    });

    Ok(TestApp { base_url, gracia_id: gracia.id, eixample_id: eixample.id })
}

fn client() -> reqwest::Client {
    reqwest::Client::new()
}

async fn assert_error(res: reqwest::Response, status: HttpStatusCode) -> anyhow::Result<Value> {
    assert_eq!(res.status(), status);
    let body = res.json::<Value>().await?;
    assert!(body["error"].is_string(), "expected error body, got {body}");
    Ok(body)
}

#[tokio::test]
async fn e2e_public_health() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = client().get(app.url("/health")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn e2e_openapi_document_served() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = client().get(app.url("/api-docs/openapi.json")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body = res.json::<Value>().await?;
    assert!(body["paths"]["/schools/search"].is_object());
    Ok(())
}

// ---- schools ----

#[tokio::test]
async fn e2e_create_school() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = client()
        .post(app.url("/schools"))
        .json(&json!({"name": "Escola Nova", "capacity": 50}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::CREATED);
    let body = res.json::<Value>().await?;
    assert_eq!(body["name"], "Escola Nova");
    assert_eq!(body["capacity"], 50);
    assert_eq!(body["student_count"], 0);
    assert!(body.get("students").is_none(), "create never nests students");

    // the returned id is stable
    let id = body["id"].as_i64().unwrap();
    let res = client().get(app.url(&format!("/schools/{id}"))).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let fetched = res.json::<Value>().await?;
    assert_eq!(fetched["name"], "Escola Nova");
    assert_eq!(fetched["capacity"], 50);
    Ok(())
}

#[tokio::test]
async fn e2e_create_school_incomplete() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();
    let res = c.post(app.url("/schools")).json(&json!({"name": "Escola Nova"})).send().await?;
    assert_error(res, HttpStatusCode::BAD_REQUEST).await?;

    let res = c.post(app.url("/schools")).json(&json!({"capacity": 5})).send().await?;
    assert_error(res, HttpStatusCode::BAD_REQUEST).await?;

    let res = c
        .post(app.url("/schools"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await?;
    assert_error(res, HttpStatusCode::BAD_REQUEST).await?;
    Ok(())
}

#[tokio::test]
async fn e2e_create_school_non_positive_capacity() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = client()
        .post(app.url("/schools"))
        .json(&json!({"name": "Escola Buida", "capacity": 0}))
        .send()
        .await?;
    assert_error(res, HttpStatusCode::BAD_REQUEST).await?;
    Ok(())
}

#[tokio::test]
async fn e2e_create_school_duplicate() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = client()
        .post(app.url("/schools"))
        .json(&json!({"name": "Escola Gracia", "capacity": 2}))
        .send()
        .await?;
    let body = assert_error(res, HttpStatusCode::BAD_REQUEST).await?;
    assert_eq!(body["error"], "School name must be unique");
    Ok(())
}

#[tokio::test]
async fn e2e_delete_school_then_get_is_404() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();
    let path = app.url(&format!("/schools/{}", app.gracia_id));

    let res = c.delete(&path).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body["message"], "School deleted successfully");

    assert_error(c.get(&path).send().await?, HttpStatusCode::NOT_FOUND).await?;
    assert_error(c.delete(&path).send().await?, HttpStatusCode::NOT_FOUND).await?;

    // its students went with it
    assert_error(c.get(app.url("/students/ST-000001")).send().await?, HttpStatusCode::NOT_FOUND).await?;
    Ok(())
}

#[tokio::test]
async fn e2e_delete_school_nonexistent() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = client().delete(app.url("/schools/58")).send().await?;
    assert_error(res, HttpStatusCode::NOT_FOUND).await?;
    Ok(())
}

#[tokio::test]
async fn e2e_get_all_schools_nests_students() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = client().get(app.url("/schools")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let data = res.json::<Vec<Value>>().await?;
    assert_eq!(data.len(), 2);

    let gracia = data.iter().find(|s| s["name"] == "Escola Gracia").unwrap();
    assert_eq!(gracia["student_count"], 2);
    let students = gracia["students"].as_array().unwrap();
    assert_eq!(students.len(), 2);
    assert_eq!(students[0]["first_name"], "Jordi");

    let eixample = data.iter().find(|s| s["name"] == "Escola Eixample").unwrap();
    assert_eq!(eixample["students"], json!([]));
    Ok(())
}

#[tokio::test]
async fn e2e_get_school_by_id() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = client().get(app.url(&format!("/schools/{}", app.gracia_id))).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let data = res.json::<Value>().await?;
    assert_eq!(data["id"], app.gracia_id);
    assert_eq!(data["name"], "Escola Gracia");
    assert_eq!(data["capacity"], 2);
    assert_eq!(data["student_count"], 2);
    assert_eq!(
        data["students"][1],
        json!({"id": "ST-000002", "first_name": "Maria", "last_name": "Doblas", "school_id": app.gracia_id})
    );
    Ok(())
}

#[tokio::test]
async fn e2e_get_school_unknown_or_malformed_id() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();
    assert_error(c.get(app.url("/schools/52")).send().await?, HttpStatusCode::NOT_FOUND).await?;
    assert_error(c.get(app.url("/schools/abc")).send().await?, HttpStatusCode::NOT_FOUND).await?;
    Ok(())
}

#[tokio::test]
async fn e2e_search_school() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();

    let res = c.get(app.url("/schools/search?query=grac")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let data = res.json::<Vec<Value>>().await?;
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["name"], "Escola Gracia");
    assert_eq!(data[0]["student_count"], 2);
    assert!(data[0].get("students").is_none(), "search never nests students");

    let res = c.get(app.url("/schools/search?query=nowhere")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert_eq!(res.json::<Value>().await?, json!([]));
    Ok(())
}

#[tokio::test]
async fn e2e_search_school_missing_query() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();
    assert_error(c.get(app.url("/schools/search")).send().await?, HttpStatusCode::BAD_REQUEST).await?;
    assert_error(c.get(app.url("/schools/search?query=")).send().await?, HttpStatusCode::BAD_REQUEST).await?;
    Ok(())
}

#[tokio::test]
async fn e2e_search_whitespace_query_is_searched() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();

    let res = c.get(app.url("/schools/search?query=%20")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert_eq!(res.json::<Vec<Value>>().await?.len(), 2);

    let res = c.get(app.url("/students/search?query=%20")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert_eq!(res.json::<Value>().await?, json!([]));
    Ok(())
}

#[tokio::test]
async fn e2e_search_malformed_query_string_is_json_error() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();
    for path in ["/schools/search?query=a&query=b", "/students/search?query=a&query=b"] {
        let body = assert_error(c.get(app.url(path)).send().await?, HttpStatusCode::BAD_REQUEST).await?;
        assert_eq!(body["error"], "Query parameter required");
    }
    Ok(())
}

// ---- students ----

#[tokio::test]
async fn e2e_create_student_incomplete() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = client()
        .post(app.url("/students"))
        .json(&json!({"first_name": "Maria", "last_name": "Vila"}))
        .send()
        .await?;
    assert_error(res, HttpStatusCode::BAD_REQUEST).await?;
    Ok(())
}

#[tokio::test]
async fn e2e_create_student_nonexistent_school() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = client()
        .post(app.url("/students"))
        .json(&json!({"id": "ST-000003", "first_name": "Maria", "last_name": "Vila", "school_id": 102}))
        .send()
        .await?;
    let body = assert_error(res, HttpStatusCode::NOT_FOUND).await?;
    assert_eq!(body["error"], "School not found");
    Ok(())
}

#[tokio::test]
async fn e2e_create_student_success() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = client()
        .post(app.url("/students"))
        .json(&json!({"id": "ST-000003", "first_name": "Maria", "last_name": "Vila", "school_id": app.eixample_id}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::CREATED);
    let body = res.json::<Value>().await?;
    assert_eq!(
        body,
        json!({"id": "ST-000003", "first_name": "Maria", "last_name": "Vila", "school_id": app.eixample_id})
    );
    Ok(())
}

#[tokio::test]
async fn e2e_create_student_capacity_error_persists_nothing() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();
    let res = c
        .post(app.url("/students"))
        .json(&json!({"id": "ST-FAIL00", "first_name": "Overflow", "last_name": "User", "school_id": app.gracia_id}))
        .send()
        .await?;
    let body = assert_error(res, HttpStatusCode::FORBIDDEN).await?;
    assert_eq!(body["error"], "School is at maximum capacity");

    let all = c.get(app.url("/students")).send().await?.json::<Vec<Value>>().await?;
    assert_eq!(all.len(), 2);
    Ok(())
}

#[tokio::test]
async fn e2e_create_student_already_exists() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = client()
        .post(app.url("/students"))
        .json(&json!({"id": "ST-000001", "first_name": "Jordi", "last_name": "Pujol", "school_id": app.eixample_id}))
        .send()
        .await?;
    let body = assert_error(res, HttpStatusCode::CONFLICT).await?;
    assert_eq!(body["error"], "Student ID already exists");
    Ok(())
}

#[tokio::test]
async fn e2e_delete_student_twice() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();

    let res = c.delete(app.url("/students/ST-000001")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert_eq!(res.json::<Value>().await?["message"], "Student deleted successfully");

    assert_error(c.get(app.url("/students/ST-000001")).send().await?, HttpStatusCode::NOT_FOUND).await?;
    assert_error(c.delete(app.url("/students/ST-000001")).send().await?, HttpStatusCode::NOT_FOUND).await?;
    Ok(())
}

#[tokio::test]
async fn e2e_get_students() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = client().get(app.url("/students")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let data = res.json::<Vec<Value>>().await?;
    assert_eq!(data.len(), 2);
    assert_eq!(data[0]["first_name"], "Jordi");
    assert_eq!(data[1]["first_name"], "Maria");
    assert!(data[0].get("students").is_none());
    Ok(())
}

#[tokio::test]
async fn e2e_get_student_by_id() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();
    let res = c.get(app.url("/students/ST-000001")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert_eq!(res.json::<Value>().await?["last_name"], "Pujol");

    assert_error(c.get(app.url("/students/102")).send().await?, HttpStatusCode::NOT_FOUND).await?;
    Ok(())
}

#[tokio::test]
async fn e2e_search_student() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();

    let res = c.get(app.url("/students/search?query=Pujo")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert_eq!(res.json::<Vec<Value>>().await?.len(), 1);

    let res = c.get(app.url("/students/search?query=Jor")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert_eq!(res.json::<Vec<Value>>().await?.len(), 1);

    let res = c.get(app.url("/students/search?query=zzz")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert_eq!(res.json::<Value>().await?, json!([]));

    assert_error(c.get(app.url("/students/search")).send().await?, HttpStatusCode::BAD_REQUEST).await?;
    Ok(())
}

// ---- end to end scenario ----

#[tokio::test]
async fn e2e_capacity_scenario() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();

    // third student in the capacity-2 school
    let res = c
        .post(app.url("/students"))
        .json(&json!({"id": "ST-000003", "first_name": "Pau", "last_name": "Serra", "school_id": app.gracia_id}))
        .send()
        .await?;
    assert_error(res, HttpStatusCode::FORBIDDEN).await?;

    // room in the capacity-100 school
    let res = c
        .post(app.url("/students"))
        .json(&json!({"id": "ST-000003", "first_name": "Pau", "last_name": "Serra", "school_id": app.eixample_id}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::CREATED);

    let res = c.delete(app.url(&format!("/schools/{}", app.gracia_id))).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let res = c.get(app.url(&format!("/schools/{}", app.gracia_id))).send().await?;
    assert_error(res, HttpStatusCode::NOT_FOUND).await?;

    let eixample = c
        .get(app.url(&format!("/schools/{}", app.eixample_id)))
        .send()
        .await?
        .json::<Value>()
        .await?;
    assert_eq!(eixample["student_count"], 1);
    Ok(())
}
