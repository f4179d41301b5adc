//! Shared helpers: a real server on an ephemeral port backed by the
//! in-memory store, and a cookie-keeping client that does not follow
//! redirects.

#![allow(dead_code)]

use library::api::{serve, AppState, SharedState};
use library::api::form::FormData;
use library::config::Config;
use library::models::{Op, User};
use library::resources::{save, Resource, SaveContext};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{redirect::Policy, Client, Response};
use serde_json::Value;
use std::net::SocketAddr;
use tempfile::TempDir;

pub const EMAIL: &str = "librarian@example.com";
pub const PASSWORD: &str = "correct horse";

pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub state: SharedState,
    _uploads: TempDir,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(|_| {}).await
    }

    pub async fn spawn_with(configure: impl FnOnce(&mut Config)) -> Self {
        let uploads = TempDir::new().expect("Failed to create upload dir");
        let mut config = Config::in_memory();
        config.server.upload_dir = uploads.path().to_path_buf();
        config.auth.bcrypt_cost = 4;
        configure(&mut config);

        let state = AppState::build(config).await.expect("Failed to build state");
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().unwrap();
        tokio::spawn(serve(listener, state.clone()));

        Self {
            addr,
            client: new_client(),
            state,
            _uploads: uploads,
        }
    }

    /// Spawn with a librarian account already signed in
    pub async fn signed_in() -> Self {
        let app = Self::spawn().await;
        app.create_user(EMAIL, PASSWORD).await;
        let response = app.login(EMAIL, PASSWORD).await;
        assert_eq!(response.status(), 302, "login failed");
        app
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// A second browser with its own cookie jar
    pub fn other_client(&self) -> Client {
        new_client()
    }

    pub fn upload_root(&self) -> &std::path::Path {
        self._uploads.path()
    }

    pub async fn get(&self, path: &str) -> Response {
        self.client.get(self.url(path)).send().await.unwrap()
    }

    pub async fn get_json(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .header(ACCEPT, "application/json")
            .send()
            .await
            .unwrap()
    }

    pub async fn post_form(&self, path: &str, pairs: &[(&str, &str)]) -> Response {
        self.client
            .post(self.url(path))
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(encode_form(pairs))
            .send()
            .await
            .unwrap()
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> Response {
        self.client
            .post(self.url(path))
            .header(ACCEPT, "application/json")
            .json(body)
            .send()
            .await
            .unwrap()
    }

    pub async fn put_json(&self, path: &str, body: &Value) -> Response {
        self.client
            .put(self.url(path))
            .header(ACCEPT, "application/json")
            .json(body)
            .send()
            .await
            .unwrap()
    }

    pub async fn delete_json(&self, path: &str) -> Response {
        self.client
            .delete(self.url(path))
            .header(ACCEPT, "application/json")
            .send()
            .await
            .unwrap()
    }

    pub async fn login(&self, email: &str, password: &str) -> Response {
        login_with(&self.client, &self.url("/auth"), email, password).await
    }

    /// Insert a user straight into the store
    pub async fn create_user(&self, email: &str, password: &str) -> User {
        let form = FormData::from_pairs([
            ("email", email),
            ("name", "Test Librarian"),
            ("password", password),
            ("password_confirmation", password),
        ]);
        let mut user = User::default();
        user.bind(&form).unwrap();
        let ctx = SaveContext {
            op: Op::Create,
            form: &form,
            uploads: &self.state.uploads,
            auth: &self.state.config.auth,
        };
        let mut tx = self.state.db.begin().await.unwrap();
        let errors = save(&mut tx, &mut user, &ctx).await.unwrap();
        assert!(!errors.has_any(), "user not created: {:?}", errors);
        tx.commit().await.unwrap();
        user
    }

    pub async fn delete_user(&self, user: &User) {
        let mut tx = self.state.db.begin().await.unwrap();
        assert!(tx.destroy::<User>(user.id).await.unwrap());
        tx.commit().await.unwrap();
    }

    pub async fn count<R: Resource>(&self) -> u64 {
        let mut tx = self.state.db.begin().await.unwrap();
        let count = tx.count::<R>().await.unwrap();
        tx.rollback().await.unwrap();
        count
    }
}

pub async fn login_with(client: &Client, url: &str, email: &str, password: &str) -> Response {
    client
        .post(url)
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(encode_form(&[("email", email), ("password", password)]))
        .send()
        .await
        .unwrap()
}

pub fn location(response: &Response) -> String {
    response
        .headers()
        .get("location")
        .expect("missing Location header")
        .to_str()
        .unwrap()
        .to_string()
}

fn new_client() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(Policy::none())
        .build()
        .expect("Failed to build client")
}

/// `application/x-www-form-urlencoded` body
pub fn encode_form(pairs: &[(&str, &str)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", encode_component(k), encode_component(v)))
        .collect::<Vec<_>>()
        .join("&")
}

fn encode_component(value: &str) -> String {
    let mut out = String::new();
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            b' ' => out.push('+'),
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}
