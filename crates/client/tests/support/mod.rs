//! Mock TecnoQuality backend for integration tests.
//!
//! One axum server plays all four services; tests point every base URL at it
//! with `ClientConfig::single_host`.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};

use tecnoquality_client::{App, ClientConfig};

pub const HTML_PAGE: &str = "<!DOCTYPE html><html><body><h1>502 Bad Gateway</h1></body></html>";

/// How an endpoint answers.
#[derive(Debug, Clone)]
pub enum Reply {
    Json(u16, Value),
    /// 200 with an HTML error page.
    Html,
    /// 200 with no body.
    Empty,
    Status(u16),
    /// Wait, then answer with the inner reply.
    After(Duration, Box<Reply>),
    /// Never answer.
    Hang,
}

impl Reply {
    pub fn ok(value: Value) -> Self {
        Reply::Json(200, value)
    }

    pub fn after(delay: Duration, reply: Reply) -> Self {
        Reply::After(delay, Box::new(reply))
    }

    async fn respond(self) -> Response {
        let mut reply = self;
        loop {
            match reply {
                Reply::Json(status, body) => return (status_code(status), Json(body)).into_response(),
                Reply::Html => return Html(HTML_PAGE).into_response(),
                Reply::Empty => return StatusCode::OK.into_response(),
                Reply::Status(status) => return status_code(status).into_response(),
                Reply::After(delay, inner) => {
                    tokio::time::sleep(delay).await;
                    reply = *inner;
                }
                Reply::Hang => std::future::pending::<()>().await,
            }
        }
    }
}

fn status_code(status: u16) -> StatusCode {
    StatusCode::from_u16(status).unwrap()
}

/// Scripted replies and request counters.
#[derive(Debug)]
pub struct Backend {
    verify: Mutex<Reply>,
    login: Mutex<Reply>,
    logout: Mutex<Reply>,
    login_body: Mutex<Option<Value>>,
    verify_hits: AtomicUsize,
    login_hits: AtomicUsize,
    logout_hits: AtomicUsize,
    requests: AtomicUsize,
}

impl Default for Backend {
    fn default() -> Self {
        Self {
            verify: Mutex::new(Reply::Status(401)),
            login: Mutex::new(Reply::Status(401)),
            logout: Mutex::new(Reply::ok(json!({ "success": true }))),
            login_body: Mutex::new(None),
            verify_hits: AtomicUsize::new(0),
            login_hits: AtomicUsize::new(0),
            logout_hits: AtomicUsize::new(0),
            requests: AtomicUsize::new(0),
        }
    }
}

impl Backend {
    pub fn on_verify(&self, reply: Reply) {
        *self.verify.lock().unwrap() = reply;
    }

    pub fn on_login(&self, reply: Reply) {
        *self.login.lock().unwrap() = reply;
    }

    pub fn on_logout(&self, reply: Reply) {
        *self.logout.lock().unwrap() = reply;
    }

    pub fn login_body(&self) -> Option<Value> {
        self.login_body.lock().unwrap().clone()
    }

    pub fn verify_hits(&self) -> usize {
        self.verify_hits.load(Ordering::SeqCst)
    }

    pub fn login_hits(&self) -> usize {
        self.login_hits.load(Ordering::SeqCst)
    }

    pub fn logout_hits(&self) -> usize {
        self.logout_hits.load(Ordering::SeqCst)
    }

    /// Every request served, on any route.
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    fn hit(&self, counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::SeqCst);
        self.requests.fetch_add(1, Ordering::SeqCst);
    }
}

async fn verify(State(backend): State<Arc<Backend>>) -> Response {
    backend.hit(&backend.verify_hits);
    let reply = backend.verify.lock().unwrap().clone();
    reply.respond().await
}

async fn login(State(backend): State<Arc<Backend>>, Json(body): Json<Value>) -> Response {
    backend.hit(&backend.login_hits);
    *backend.login_body.lock().unwrap() = Some(body);
    let reply = backend.login.lock().unwrap().clone();
    let mut response = reply.respond().await;
    if response.status().is_success() {
        response
            .headers_mut()
            .insert(header::SET_COOKIE, "token=session-abc; Path=/; HttpOnly".parse().unwrap());
    }
    response
}

async fn logout(State(backend): State<Arc<Backend>>) -> Response {
    backend.hit(&backend.logout_hits);
    let reply = backend.logout.lock().unwrap().clone();
    reply.respond().await
}

async fn other(backend: &Backend, reply: Reply) -> Response {
    backend.requests.fetch_add(1, Ordering::SeqCst);
    reply.respond().await
}

pub async fn spawn_backend() -> (TestServer, Arc<Backend>) {
    let backend = Arc::new(Backend::default());

    let app = Router::new()
        .route("/Usuario/verify-token", post(verify))
        .route("/Usuario/login", post(login))
        .route("/Usuario/logout", post(logout))
        .route(
            "/unauthorized",
            get(|State(b): State<Arc<Backend>>| async move { other(&b, Reply::Status(401)).await }),
        )
        .route(
            "/html",
            get(|State(b): State<Arc<Backend>>| async move { other(&b, Reply::Html).await }),
        )
        .route(
            "/html-json",
            get(|State(b): State<Arc<Backend>>| async move {
                other(&b, Reply::ok(json!("<!doctype HTML><html></html>"))).await
            }),
        )
        .route(
            "/data",
            get(|State(b): State<Arc<Backend>>| async move {
                other(&b, Reply::ok(json!({ "id": 1, "note": "<!DOCTYPE html> in a field" }))).await
            }),
        )
        .route(
            "/fail",
            get(|State(b): State<Arc<Backend>>| async move {
                b.requests.fetch_add(1, Ordering::SeqCst);
                (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response()
            }),
        )
        .route(
            "/slow",
            get(|State(b): State<Arc<Backend>>| async move {
                other(&b, Reply::after(Duration::from_secs(5), Reply::Empty)).await
            }),
        )
        .route(
            "/cookie",
            get(|State(b): State<Arc<Backend>>, headers: HeaderMap| async move {
                b.requests.fetch_add(1, Ordering::SeqCst);
                let cookie = headers
                    .get(header::COOKIE)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_owned);
                Json(json!({ "cookie": cookie }))
            }),
        )
        .with_state(backend.clone());

    (TestServer::spawn(app).await, backend)
}

pub struct TestServer {
    pub base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(app: Router) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    pub fn config(&self) -> ClientConfig {
        ClientConfig::single_host(&self.base_url)
    }

    pub fn app(&self) -> App {
        App::new(self.config()).unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub fn ana_login() -> Value {
    json!({ "rol_usuario": 2, "nombre": "Ana", "id_usuario": 42 })
}

/// Poll `cond` until it holds; panics after two seconds.
pub async fn eventually(what: &str, cond: impl Fn() -> bool) {
    for _ in 0..200 {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("timed out waiting for {what}");
}
