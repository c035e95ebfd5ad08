#![allow(dead_code)]

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::PgPool;
use tempfile::TempDir;
use tower::ServiceExt;

use panotour_api::auth::jwt::JwtConfig;
use panotour_api::auth::password::hash_password;
use panotour_api::config::ServerConfig;
use panotour_api::router::build_app_router;
use panotour_api::state::AppState;
use panotour_db::models::user::{CreateUser, User};
use panotour_db::repositories::UserRepo;

pub const PUBLIC_BASE_URL: &str = "http://localhost:8000";
pub const TEST_PASSWORD: &str = "test_password_123";

/// Build a test `ServerConfig` with safe defaults, storing uploads under
/// `upload_dir`.
pub fn test_config(upload_dir: &std::path::Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        upload_dir: upload_dir.to_path_buf(),
        public_base_url: PUBLIC_BASE_URL.to_string(),
        cookie_secure: false,
        session_cleanup_interval_secs: 3600,
        admin_seed: None,
        jwt: JwtConfig {
            secret: "integration-test-secret-long-enough".to_string(),
            access_token_expiry_mins: 120,
            refresh_token_expiry_days: 365,
        },
    }
}

/// The application under test plus the temporary upload directory that
/// must outlive it.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub upload_dir: TempDir,
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Response {
        self.send(request(Method::GET, uri, token).body(Body::empty()).unwrap())
            .await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> Response {
        self.send(request(Method::DELETE, uri, token).body(Body::empty()).unwrap())
            .await
    }

    pub async fn json(&self, method: Method, uri: &str, body: Value, token: Option<&str>) -> Response {
        self.send(
            request(method, uri, token)
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn post_json(&self, uri: &str, body: Value, token: Option<&str>) -> Response {
        self.json(Method::POST, uri, body, token).await
    }

    pub async fn put_json(&self, uri: &str, body: Value, token: Option<&str>) -> Response {
        self.json(Method::PUT, uri, body, token).await
    }

    /// POST with only a `Cookie` header.
    pub async fn post_with_cookie(&self, uri: &str, cookie: Option<&str>, token: Option<&str>) -> Response {
        let mut builder = request(Method::POST, uri, token);
        if let Some(cookie) = cookie {
            builder = builder.header(COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    /// Log in through the API, returning the access token and the
    /// `refreshToken=...` cookie pair.
    pub async fn login(&self, email: &str, password: &str) -> (String, String) {
        let response = self
            .post_json(
                "/api/auth/login",
                serde_json::json!({ "email": email, "password": password }),
                None,
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let cookie = refresh_cookie_pair(&response).expect("login must set the refresh cookie");
        let json = body_json(response).await;
        let token = json["accessToken"]
            .as_str()
            .expect("login must return accessToken")
            .to_string();
        (token, cookie)
    }

    /// Create a user directly in the database and log them in.
    pub async fn user_with_token(&self, username: &str, admin: bool) -> (User, String) {
        let user = create_user(&self.state.pool, username, admin).await;
        let (token, _) = self.login(&user.email, TEST_PASSWORD).await;
        (user, token)
    }
}

/// Build the full application router, exactly as production does, on top of
/// a fresh temporary upload directory.
pub async fn build_test_app(pool: PgPool) -> TestApp {
    let upload_dir = TempDir::new().expect("temp dir");
    let state = AppState::new(pool, test_config(upload_dir.path()));
    state.media.ensure_dirs().await.expect("upload dirs");
    let router = build_app_router(state.clone());
    TestApp {
        router,
        state,
        upload_dir,
    }
}

fn request(method: Method, uri: &str, token: Option<&str>) -> axum::http::request::Builder {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    builder
}

/// Create a user with [`TEST_PASSWORD`] and email `{username}@test.com`.
pub async fn create_user(pool: &PgPool, username: &str, admin: bool) -> User {
    let password_hash = hash_password(TEST_PASSWORD).expect("hashing should succeed");
    UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
            email: format!("{username}@test.com"),
            password_hash,
            is_admin: admin,
        },
    )
    .await
    .expect("user creation should succeed")
}

pub async fn body_json(response: Response) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body must be JSON")
}

/// The raw `Set-Cookie` header for the refresh token, if any.
pub fn refresh_set_cookie(response: &Response) -> Option<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("refreshToken="))
        .map(str::to_string)
}

/// The `refreshToken=<value>` pair from the response, ready to send back as
/// a `Cookie` header.
pub fn refresh_cookie_pair(response: &Response) -> Option<String> {
    refresh_set_cookie(response).map(|raw| raw.split(';').next().unwrap_or_default().to_string())
}

/// One file part of a multipart body.
pub struct FilePart<'a> {
    pub field: &'a str,
    pub filename: &'a str,
    pub content_type: &'a str,
    pub data: &'a [u8],
}

const BOUNDARY: &str = "panotour-test-boundary";

/// Build a `multipart/form-data` POST request.
pub fn multipart_request(uri: &str, token: Option<&str>, parts: &[FilePart<'_>]) -> Request<Body> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                part.field, part.filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", part.content_type).as_bytes());
        body.extend_from_slice(part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    request(Method::POST, uri, token)
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}
