use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use parking_lot::Mutex;
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::task::JoinHandle;

use rolegate::config::ClientConfig;
use rolegate::error::AppError;
use rolegate::gateway::models::UserQuery;
use rolegate::gateway::{AdminGateway, ApiClient, AuthGateway, ManagerGateway};
use rolegate::identity::{Gender, LoginRequest, RegisterRequest, Screen, SessionContext, SessionStore};

#[derive(Default)]
struct Seen {
    auth: Vec<(String, Option<String>)>,
    bodies: Vec<(String, Value)>,
    queries: Vec<HashMap<String, String>>,
}

type Shared = Arc<Mutex<Seen>>;

fn jwt(payload: Value) -> String {
    let head = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let body = URL_SAFE_NO_PAD.encode(payload.to_string().as_bytes());
    format!("{}.{}.sig", head, body)
}

fn note(seen: &Shared, route: &str, headers: &HeaderMap) {
    let bearer = headers.get("authorization").and_then(|v| v.to_str().ok()).map(str::to_string);
    seen.lock().auth.push((route.to_string(), bearer));
}

async fn login(State(seen): State<Shared>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    seen.lock().bodies.push(("login".into(), body.clone()));
    let email = body["email"].as_str().unwrap_or_default().to_string();
    match body["password"].as_str().unwrap_or_default() {
        "good" => (StatusCode::OK, Json(json!({
            "success": true,
            "token": jwt(json!({ "sub": "u1", "role": ["Manager"] })),
            "userID": "u1",
            "email": email,
            "personName": "Ana"
        }))),
        "admin" => (StatusCode::OK, Json(json!({
            "success": true,
            "token": jwt(json!({ "sub": "a1", "role": "Admin" })),
            "userID": "a1",
            "email": email
        }))),
        "plain" => (StatusCode::OK, Json(json!({
            "success": true,
            "token": jwt(json!({ "sub": "p1" })),
            "userID": "p1",
            "email": email
        }))),
        "nosuccess" => (StatusCode::OK, Json(json!({ "success": false, "token": "x.y.z", "message": "Account locked" }))),
        "blank" => (StatusCode::OK, Json(json!({ "success": true, "token": "   ", "userID": "u9" }))),
        _ => (StatusCode::UNAUTHORIZED, Json(json!({ "message": "Invalid credentials" }))),
    }
}

async fn register(State(seen): State<Shared>, Json(body): Json<Value>) -> Json<Value> {
    seen.lock().bodies.push(("register".into(), body.clone()));
    Json(json!({
        "success": true,
        "token": jwt(json!({ "roles": [body["roleName"].clone()] })),
        "userID": "new1",
        "email": body["email"].clone(),
        "personName": body["personName"].clone()
    }))
}

async fn admin_users(State(seen): State<Shared>, headers: HeaderMap, Query(q): Query<HashMap<String, String>>) -> Json<Value> {
    note(&seen, "admin/users", &headers);
    seen.lock().queries.push(q);
    Json(json!({
        "Users": [
            { "UserID": "u1", "Email": "a@x", "IsActive": true, "Roles": [{ "name": "Manager" }] },
            { "userID": "u2", "email": "b@x", "roles": ["User"] }
        ],
        "Pagination": { "CurrentPage": 2, "PageSize": 2, "TotalCount": 5, "TotalPages": 3 }
    }))
}

async fn admin_user(State(seen): State<Shared>, headers: HeaderMap, Path(id): Path<String>) -> (StatusCode, Json<Value>) {
    note(&seen, "admin/user", &headers);
    if id == "missing" {
        return (StatusCode::NOT_FOUND, Json(json!({ "message": "User not found" })));
    }
    (StatusCode::OK, Json(json!({ "user": { "userID": id, "email": "c@x", "roles": [] }, "roles": ["Admin"] })))
}

async fn admin_set_role(State(seen): State<Shared>, headers: HeaderMap, Path(id): Path<String>, Json(body): Json<Value>) -> Json<Value> {
    note(&seen, "admin/set-role", &headers);
    seen.lock().bodies.push((format!("set-role:{}", id), body));
    Json(json!({ "Message": "Role updated" }))
}

async fn manager_tasks(State(seen): State<Shared>, headers: HeaderMap) -> Json<Value> {
    note(&seen, "manager/tasks", &headers);
    Json(json!({ "data": { "Tasks": [{ "id": 1 }, { "id": 2 }] } }))
}

async fn manager_profile(State(seen): State<Shared>, headers: HeaderMap) -> Json<Value> {
    note(&seen, "manager/profile", &headers);
    Json(json!({ "profile": { "user": { "userId": "u1", "email": "a@x", "name": "Ana" } }, "roles": ["Manager"] }))
}

async fn forbidden(State(seen): State<Shared>, headers: HeaderMap) -> StatusCode {
    note(&seen, "admin/settings", &headers);
    StatusCode::FORBIDDEN
}

// Mock backend on an ephemeral localhost port; abort the handle to stop it.
async fn start_backend() -> (JoinHandle<()>, String, Shared) {
    let seen: Shared = Arc::new(Mutex::new(Seen::default()));
    let app = Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/register", post(register))
        .route("/api/admin/users", get(admin_users))
        .route("/api/admin/users/{id}", get(admin_user))
        .route("/api/admin/users/{id}/roles", post(admin_set_role))
        .route("/api/admin/settings", get(forbidden))
        .route("/api/manager/tasks", get(manager_tasks))
        .route("/api/manager/profile", get(manager_profile))
        .with_state(seen.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind 127.0.0.1:0");
    let addr = listener.local_addr().expect("local addr");
    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            eprintln!("mock backend error: {e:?}");
        }
    });
    (handle, format!("http://{}/api", addr), seen)
}

fn client(api_url: &str, dir: &TempDir) -> (ApiClient, SessionContext) {
    let config = ClientConfig { api_url: api_url.to_string(), timeout_ms: 5_000, session_dir: dir.path().to_path_buf() };
    let store = SessionStore::on_disk(dir.path());
    let ctx = SessionContext::new(store.clone());
    ctx.init();
    let api = ApiClient::new(config, store).expect("http client");
    (api, ctx)
}

fn login_req(password: &str) -> LoginRequest {
    LoginRequest { email: "ana@example.com".into(), password: password.into() }
}

#[tokio::test]
async fn login_persists_session_across_restart() {
    let (handle, url, _seen) = start_backend().await;
    let dir = TempDir::new().unwrap();
    let (api, ctx) = client(&url, &dir);

    let s = AuthGateway::new(api, ctx.clone()).login(&login_req("good")).await.unwrap();
    assert_eq!(s.user_id, "u1");
    assert!(ctx.is_manager());
    assert_eq!(ctx.dashboard(), Screen::ManagerDashboard);

    // a fresh context over the same directory sees the same session
    let (_api2, ctx2) = client(&url, &dir);
    assert_eq!(ctx2.current().map(|s| s.user_id), Some("u1".to_string()));
    assert_eq!(ctx2.route(Screen::Login), Screen::ManagerDashboard);
    handle.abort();
}

#[tokio::test]
async fn rejected_logins_leave_store_empty() {
    let (handle, url, _seen) = start_backend().await;
    let dir = TempDir::new().unwrap();
    let (api, ctx) = client(&url, &dir);
    let auth = AuthGateway::new(api, ctx.clone());

    let e = auth.login(&login_req("wrong")).await.unwrap_err();
    assert!(e.is_auth(), "{e:?}");
    let e = auth.login(&login_req("nosuccess")).await.unwrap_err();
    assert!(matches!(e, AppError::Auth { .. }), "{e:?}");
    assert!(e.message().contains("Account locked"));
    let e = auth.login(&login_req("blank")).await.unwrap_err();
    assert!(e.is_auth(), "{e:?}");

    assert!(!ctx.is_authenticated());
    assert_eq!(ctx.store().get_token(), None);
    assert!(ctx.store().load().is_none());
    handle.abort();
}

#[tokio::test]
async fn failed_login_keeps_previous_session() {
    let (handle, url, _seen) = start_backend().await;
    let dir = TempDir::new().unwrap();
    let (api, ctx) = client(&url, &dir);
    let auth = AuthGateway::new(api, ctx.clone());

    auth.login(&login_req("good")).await.unwrap();
    assert!(auth.login(&login_req("wrong")).await.is_err());
    assert_eq!(ctx.current().map(|s| s.user_id), Some("u1".to_string()));
    handle.abort();
}

#[tokio::test]
async fn register_sends_integer_gender_and_signs_in() {
    let (handle, url, seen) = start_backend().await;
    let dir = TempDir::new().unwrap();
    let (api, ctx) = client(&url, &dir);

    let req = RegisterRequest {
        email: "new@example.com".into(),
        password: "pw".into(),
        person_name: "Nia".into(),
        gender: Gender::Female,
        role_name: "Admin".into(),
    };
    AuthGateway::new(api, ctx.clone()).register(&req).await.unwrap();

    let body = seen.lock().bodies.iter().find(|(k, _)| k == "register").map(|(_, b)| b.clone()).unwrap();
    assert_eq!(body["gender"], json!(1));
    assert_eq!(body["personName"], json!("Nia"));
    assert_eq!(body["roleName"], json!("Admin"));
    assert!(ctx.is_admin());
    assert_eq!(ctx.dashboard(), Screen::AdminDashboard);
    handle.abort();
}

#[tokio::test]
async fn resource_calls_carry_bearer_token() {
    let (handle, url, seen) = start_backend().await;
    let dir = TempDir::new().unwrap();
    let (api, ctx) = client(&url, &dir);
    let s = AuthGateway::new(api.clone(), ctx).login(&login_req("admin")).await.unwrap();

    let admin = AdminGateway::new(api.clone());
    let q = UserQuery { page: 2, page_size: 2, search_term: Some("a".into()), role_filter: None };
    let page = admin.users(&q).await.unwrap();
    assert_eq!(page.data.len(), 2);
    assert_eq!(page.data[0].roles, vec!["Manager".to_string()]);
    assert_eq!(page.pagination.total_pages, 3);
    assert!(page.pagination.has_next());

    let tasks = ManagerGateway::new(api).tasks().await.unwrap();
    assert_eq!(tasks.len(), 2);

    let seen = seen.lock();
    let expected = format!("Bearer {}", s.token);
    assert!(seen.auth.iter().all(|(_, b)| b.as_deref() == Some(expected.as_str())), "{:?}", seen.auth);
    let query = &seen.queries[0];
    assert_eq!(query.get("pageSize").map(String::as_str), Some("2"));
    assert_eq!(query.get("searchTerm").map(String::as_str), Some("a"));
    assert!(!query.contains_key("roleFilter"));
    drop(seen);
    handle.abort();
}

#[tokio::test]
async fn backend_decides_authorization_not_routing() {
    let (handle, url, seen) = start_backend().await;
    let dir = TempDir::new().unwrap();
    let (api, ctx) = client(&url, &dir);
    AuthGateway::new(api.clone(), ctx.clone()).login(&login_req("plain")).await.unwrap();

    // routing would bounce this user, but the gateway still asks the backend
    assert_eq!(ctx.route(Screen::UserManagement), Screen::UserDashboard);
    let admin = AdminGateway::new(api);
    let u = admin.user_by_id("u7").await.unwrap();
    assert_eq!(u.roles, vec!["Admin".to_string()]);

    let e = admin.system_settings().await.unwrap_err();
    assert!(matches!(e, AppError::Forbidden { .. }), "{e:?}");
    assert_eq!(e.http_status(), 403);
    let e = admin.user_by_id("missing").await.unwrap_err();
    assert!(matches!(e, AppError::NotFound { .. }), "{e:?}");
    assert_eq!(e.message(), "User not found");
    assert_eq!(seen.lock().auth.len(), 3);
    handle.abort();
}

#[tokio::test]
async fn role_update_posts_role_name() {
    let (handle, url, seen) = start_backend().await;
    let dir = TempDir::new().unwrap();
    let (api, ctx) = client(&url, &dir);
    AuthGateway::new(api.clone(), ctx).login(&login_req("admin")).await.unwrap();

    let admin = AdminGateway::new(api);
    assert_eq!(admin.update_user_role("u 2", "Manager").await.unwrap().message, "Role updated");
    assert!(admin.update_user_role("u2", "  ").await.is_err());
    assert!(admin.user_by_id(" ").await.is_err());

    let seen = seen.lock();
    let (key, body) = seen.bodies.iter().find(|(k, _)| k.starts_with("set-role")).unwrap();
    assert_eq!(key, "set-role:u 2");
    assert_eq!(body, &json!({ "roleName": "Manager" }));
    drop(seen);
    handle.abort();
}

#[tokio::test]
async fn manager_profile_reads_nested_shape() {
    let (handle, url, _seen) = start_backend().await;
    let dir = TempDir::new().unwrap();
    let (api, ctx) = client(&url, &dir);
    AuthGateway::new(api.clone(), ctx).login(&login_req("good")).await.unwrap();

    let p = ManagerGateway::new(api).profile().await.unwrap();
    assert_eq!(p.user.name.as_deref(), Some("Ana"));
    assert_eq!(p.roles, vec!["Manager".to_string()]);
    handle.abort();
}

#[tokio::test]
async fn logout_clears_disk_and_calls_go_unauthenticated() {
    let (handle, url, seen) = start_backend().await;
    let dir = TempDir::new().unwrap();
    let (api, ctx) = client(&url, &dir);
    let auth = AuthGateway::new(api.clone(), ctx.clone());
    auth.login(&login_req("good")).await.unwrap();
    auth.logout();

    assert!(!ctx.is_authenticated());
    assert_eq!(ctx.route(Screen::ManagerTasks), Screen::Login);
    let (_api2, ctx2) = client(&url, &dir);
    assert!(ctx2.current().is_none());

    ManagerGateway::new(api).tasks().await.unwrap();
    assert_eq!(seen.lock().auth.last().map(|(_, b)| b.clone()), Some(None));
    handle.abort();
}

#[tokio::test]
async fn unreachable_backend_is_a_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let dir = TempDir::new().unwrap();
    let (api, ctx) = client(&format!("http://{}/api", addr), &dir);

    let e = AuthGateway::new(api, ctx.clone()).login(&login_req("good")).await.unwrap_err();
    assert!(matches!(e, AppError::Transport { .. }), "{e:?}");
    assert!(!ctx.is_authenticated());
}
