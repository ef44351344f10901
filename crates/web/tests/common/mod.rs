//! Shared test harness: builds the real application router (same middleware
//! stack as `main.rs`) on a per-test database and drives it with
//! `tower::ServiceExt::oneshot`, carrying the session cookie between
//! requests like a browser would.

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{Method, Request, Response};
use axum::Router;
use tower::ServiceExt;

use ecocusco_db::DbPool;
use ecocusco_web::config::AppConfig;
use ecocusco_web::router::build_app_router;
use ecocusco_web::state::AppState;
use ecocusco_web::views::ViewEngine;

/// Build a test `AppConfig` with safe defaults. Uploads land in a
/// process-temp directory; nothing reads env vars.
pub fn test_config() -> AppConfig {
    AppConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        database_url: "sqlite::memory:".to_string(),
        debug: false,
        session_lifetime_mins: 120,
        reset_token_expiry_mins: 60,
        uploads_dir: std::env::temp_dir()
            .join("ecocusco-test-uploads")
            .to_string_lossy()
            .into_owned(),
        max_upload_bytes: 5 * 1024 * 1024,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
    }
}

/// Build the full application router against the given pool, mirroring the
/// construction in `main.rs`.
pub fn build_test_app(pool: DbPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        views: Arc::new(ViewEngine::new().expect("templates should compile")),
    };
    build_app_router(state, &config)
}

/// A cookie-carrying client over the in-process router.
pub struct TestClient {
    app: Router,
    cookie: Option<String>,
}

impl TestClient {
    pub fn new(pool: DbPool) -> Self {
        TestClient {
            app: build_test_app(pool),
            cookie: None,
        }
    }

    pub async fn get(&mut self, path: &str) -> Response<Body> {
        self.request(Method::GET, path, None).await
    }

    /// POST an urlencoded form.
    pub async fn post_form(&mut self, path: &str, fields: &[(&str, &str)]) -> Response<Body> {
        let body = serialize_form(fields);
        self.request(
            Method::POST,
            path,
            Some(("application/x-www-form-urlencoded".to_string(), body)),
        )
        .await
    }

    /// POST a multipart form (text fields only; good enough for the report
    /// forms, whose photo input is optional).
    pub async fn post_multipart(&mut self, path: &str, fields: &[(&str, &str)]) -> Response<Body> {
        let (content_type, body) = multipart_body(fields);
        self.request(Method::POST, path, Some((content_type, body)))
            .await
    }

    /// Send a JSON body with the given method.
    pub async fn send_json(
        &mut self,
        method: Method,
        path: &str,
        json: serde_json::Value,
    ) -> Response<Body> {
        self.request(
            method,
            path,
            Some(("application/json".to_string(), json.to_string())),
        )
        .await
    }

    async fn request(
        &mut self,
        method: Method,
        path: &str,
        body: Option<(String, String)>,
    ) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(cookie) = self.cookie.as_deref() {
            builder = builder.header(COOKIE, cookie);
        }
        let request = match body {
            Some((content_type, body)) => builder
                .header(CONTENT_TYPE, content_type)
                .body(Body::from(body))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("router should not fail");

        // Adopt any newly issued session cookie, like a browser.
        if let Some(set_cookie) = response.headers().get(SET_COOKIE) {
            if let Ok(raw) = set_cookie.to_str() {
                if let Some(pair) = raw.split(';').next() {
                    self.cookie = Some(pair.to_string());
                }
            }
        }
        response
    }

    /// GET a form page and pull the CSRF token out of the hidden field.
    pub async fn fetch_csrf(&mut self, path: &str) -> String {
        let response = self.get(path).await;
        assert!(
            response.status().is_success(),
            "expected a form page at {path}, got {}",
            response.status()
        );
        let html = body_string(response).await;
        extract_csrf(&html).expect("form should embed a _token field")
    }
}

/// Read a response body to a string.
pub async fn body_string(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("body should be readable");
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Read a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("body should be readable");
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

/// The `Location` header of a redirect response.
pub fn location(response: &Response<Body>) -> String {
    response
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

fn serialize_form(fields: &[(&str, &str)]) -> String {
    let map: HashMap<&str, &str> = fields.iter().copied().collect();
    serde_urlencoded_encode(&map)
}

// Tiny urlencoded encoder -- enough for ASCII + the characters our tests
// use, without pulling another dev-dependency.
fn serde_urlencoded_encode(map: &HashMap<&str, &str>) -> String {
    fn escape(value: &str) -> String {
        let mut out = String::new();
        for byte in value.bytes() {
            match byte {
                b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                    out.push(byte as char)
                }
                b' ' => out.push('+'),
                other => out.push_str(&format!("%{other:02X}")),
            }
        }
        out
    }
    map.iter()
        .map(|(k, v)| format!("{}={}", escape(k), escape(v)))
        .collect::<Vec<_>>()
        .join("&")
}

const BOUNDARY: &str = "ecocusco-test-boundary";

fn multipart_body(fields: &[(&str, &str)]) -> (String, String) {
    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));
    (
        format!("multipart/form-data; boundary={BOUNDARY}"),
        body,
    )
}

fn extract_csrf(html: &str) -> Option<String> {
    let marker = "name=\"_token\" value=\"";
    let start = html.find(marker)? + marker.len();
    let end = html[start..].find('"')? + start;
    Some(html[start..end].to_string())
}

/// Register a user through the real registration flow and leave the client
/// logged in. Returns the user's email.
pub async fn register_user(client: &mut TestClient, nombre: &str, email: &str) -> String {
    let csrf = client.fetch_csrf("/register").await;
    let response = client
        .post_form(
            "/register",
            &[
                ("_token", csrf.as_str()),
                ("nombre", nombre),
                ("email", email),
                ("password", "secret1"),
                ("password_confirmation", "secret1"),
            ],
        )
        .await;
    assert_eq!(
        location(&response),
        "/dashboard",
        "registration should land on the dashboard"
    );
    email.to_string()
}
