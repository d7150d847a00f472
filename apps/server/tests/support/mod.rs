#![allow(dead_code)]

pub mod assertions;
pub mod builders;
pub mod fixtures;
pub mod shared;

use anyhow::Context as _;
use axum::{
    body::{Body, Bytes},
    http::{HeaderMap, HeaderName, HeaderValue, Method, Request, StatusCode},
    Router,
};
use costura::{
    api::create_router,
    config::StorageBackend,
    db::{MemoryStore, Repositories},
    integrations::{DevOtpProvider, DevPaymentGateway},
    AppState, Config,
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt as _;

pub use assertions::*;
pub use builders::*;
pub use fixtures::*;

pub const TEST_OTP_CODE: &str = "123456";
pub const TEST_WEBHOOK_SECRET: &str = "whsec_test_secret";

/// The router over a fresh in-process memory store.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

impl TestApp {
    pub async fn new() -> anyhow::Result<Self> {
        Self::new_with_config(|_| {}).await
    }

    pub async fn new_with_config(configure: impl FnOnce(&mut Config)) -> anyhow::Result<Self> {
        let shared = shared::shared().await?;
        let mut config = shared.base_config.clone();
        configure(&mut config);

        let state = AppState::with_components(
            config.clone(),
            Repositories::memory(MemoryStore::new()),
            Arc::new(DevOtpProvider::new(TEST_OTP_CODE.to_string())),
            Arc::new(DevPaymentGateway::new(config.payment.success_url.clone())),
        )
        .context("initialize AppState")?;
        let router = create_router(state.clone());

        Ok(Self { router, state })
    }

    /// Same router, backed by PostgreSQL at `database_url`.
    pub async fn postgres(database_url: &str) -> anyhow::Result<Self> {
        let shared = shared::shared().await?;
        let mut config = shared.base_config.clone();
        config.database.backend = StorageBackend::Postgres;
        config.database.url = Some(database_url.to_string());
        config.database.pool_min_size = 0;
        config.database.pool_max_size = 2;

        let state = AppState::new(config)
            .await
            .context("initialize postgres AppState")?;
        let router = create_router(state.clone());
        Ok(Self { router, state })
    }

    /// Same router, backed by Firestore (usually the emulator named by
    /// `FIRESTORE_EMULATOR_HOST`) in `project_id`.
    pub async fn firestore(project_id: &str) -> anyhow::Result<Self> {
        let shared = shared::shared().await?;
        let mut config = shared.base_config.clone();
        config.database.backend = StorageBackend::Firestore;
        config.database.firestore_project_id = Some(project_id.to_string());

        let state = AppState::new(config)
            .await
            .context("initialize firestore AppState")?;
        let router = create_router(state.clone());
        Ok(Self { router, state })
    }

    pub async fn request(
        &self,
        method: Method,
        path_and_query: &str,
        body: Option<Bytes>,
    ) -> anyhow::Result<(StatusCode, HeaderMap, Bytes)> {
        self.request_with_extra_headers(method, path_and_query, body, &[])
            .await
    }

    /// Request with `Authorization: Bearer <token>`.
    pub async fn request_as(
        &self,
        token: &str,
        method: Method,
        path_and_query: &str,
        body: Option<Bytes>,
    ) -> anyhow::Result<(StatusCode, HeaderMap, Bytes)> {
        let bearer = format!("Bearer {token}");
        self.request_with_extra_headers(
            method,
            path_and_query,
            body,
            &[("authorization", bearer.as_str())],
        )
        .await
    }

    pub async fn request_with_extra_headers(
        &self,
        method: Method,
        path_and_query: &str,
        body: Option<Bytes>,
        extra_headers: &[(&str, &str)],
    ) -> anyhow::Result<(StatusCode, HeaderMap, Bytes)> {
        let mut request = Request::builder()
            .method(method)
            .uri(path_and_query)
            .header("host", "example.org")
            .header("content-type", "application/json")
            .body(match body {
                Some(bytes) => Body::from(bytes),
                None => Body::empty(),
            })
            .context("build request")?;

        for (name, value) in extra_headers {
            request.headers_mut().insert(
                name.parse::<HeaderName>().context("parse header name")?,
                value.parse::<HeaderValue>().context("parse header value")?,
            );
        }

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .context("dispatch request")?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .context("read response body")?;

        Ok((status, headers, body))
    }

    /// POST a JSON value and parse the JSON reply.
    pub async fn post_json(
        &self,
        path: &str,
        token: Option<&str>,
        value: &Value,
    ) -> anyhow::Result<(StatusCode, Value)> {
        let body = Some(to_json_body(value)?);
        let (status, _, bytes) = match token {
            Some(token) => self.request_as(token, Method::POST, path, body).await?,
            None => self.request(Method::POST, path, body).await?,
        };
        Ok((status, parse_json(&bytes)?))
    }

    pub async fn get_json(&self, path: &str) -> anyhow::Result<(StatusCode, Value)> {
        let (status, _, bytes) = self.request(Method::GET, path, None).await?;
        Ok((status, parse_json(&bytes)?))
    }

    /// Register a dressmaker and return its id.
    pub async fn create_dressmaker(&self, payload: &Value) -> anyhow::Result<String> {
        let (status, body) = self.post_json("/dressmakers", None, payload).await?;
        assert_status(status, StatusCode::CREATED, "create dressmaker");
        body["data"]["id"]
            .as_str()
            .map(str::to_string)
            .context("created dressmaker has an id")
    }

    /// Register a user and return its id.
    pub async fn create_user(&self, payload: &Value) -> anyhow::Result<String> {
        let (status, body) = self.post_json("/users", None, payload).await?;
        assert_status(status, StatusCode::CREATED, "create user");
        body["data"]["id"]
            .as_str()
            .map(str::to_string)
            .context("created user has an id")
    }

    /// Log in at `path` (`/dressmakers/auth` or `/users/auth`) and return the token.
    pub async fn login(&self, path: &str, email: &str, password: &str) -> anyhow::Result<String> {
        let (status, body) = self
            .post_json(
                path,
                None,
                &serde_json::json!({ "email": email, "password": password }),
            )
            .await?;
        assert_status(status, StatusCode::OK, "login");
        body["token"]
            .as_str()
            .map(str::to_string)
            .context("login returns a token")
    }
}
