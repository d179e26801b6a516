use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use super::Repository;
use crate::config::ApiConfig;
use crate::entity::{Chapter, EntityKind, Member, Record, Submission};
use crate::error::AdminError;
use crate::session::SessionContext;

/// Shared HTTP client for the LMS REST API.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    session: Arc<SessionContext>,
}

impl ApiClient {
    pub fn new(config: &ApiConfig, session: Arc<SessionContext>) -> Result<Self, AdminError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .timeout(config.timeout())
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    /// Repository for one record type, sharing this client's connection pool and session.
    pub fn repository<E: Record>(&self) -> HttpRepository<E> {
        HttpRepository {
            api: self.clone(),
            _record: PhantomData,
        }
    }

    pub fn session(&self) -> &Arc<SessionContext> {
        &self.session
    }

    /// Chapters belonging to a course.
    pub async fn course_chapters(&self, course_id: i32) -> Result<Vec<Chapter>, AdminError> {
        self.related(EntityKind::Course, course_id, "chapters").await
    }

    /// Users enrolled in a course.
    pub async fn course_members(&self, course_id: i32) -> Result<Vec<Member>, AdminError> {
        self.related(EntityKind::Course, course_id, "users").await
    }

    /// Learner progress rows for a chapter, including assignment submissions.
    pub async fn chapter_submissions(&self, chapter_id: i32) -> Result<Vec<Submission>, AdminError> {
        self.related(EntityKind::Chapter, chapter_id, "userchapter").await
    }

    /// `GET /{kind}/{id}/{relation}`.
    #[instrument(skip(self), fields(kind = %kind))]
    async fn related<T: DeserializeOwned>(
        &self,
        kind: EntityKind,
        id: i32,
        relation: &str,
    ) -> Result<Vec<T>, AdminError> {
        let request = self
            .http
            .get(format!("{}/{kind}/{id}/{relation}", self.base_url));
        let body = read_json(self.send(kind, request, Some(id)).await?).await?;
        serde_json::from_value(unwrap_list(body))
            .map_err(|e| AdminError::Network(format!("Unexpected {kind} {relation} payload: {e}")))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.session.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(
        &self,
        kind: EntityKind,
        request: RequestBuilder,
        id: Option<i32>,
    ) -> Result<Response, AdminError> {
        let response = self.authorize(request).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body);
        warn!(%kind, ?id, status = status.as_u16(), %message, "Request failed");
        Err(status_error(kind, id, status, message))
    }
}

async fn read_json(response: Response) -> Result<Value, AdminError> {
    response
        .json::<Value>()
        .await
        .map_err(|e| AdminError::Network(format!("Invalid response body: {e}")))
}

/// [`Repository`] over `/{kind}` and `/{kind}/{id}`.
pub struct HttpRepository<E> {
    api: ApiClient,
    _record: PhantomData<fn() -> E>,
}

impl<E> Clone for HttpRepository<E> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            _record: PhantomData,
        }
    }
}

impl<E: Record> HttpRepository<E> {
    fn collection_url(&self) -> String {
        format!("{}/{}", self.api.base_url, E::KIND)
    }

    fn record_url(&self, id: i32) -> String {
        format!("{}/{}/{id}", self.api.base_url, E::KIND)
    }

    async fn send(&self, request: RequestBuilder, id: Option<i32>) -> Result<Response, AdminError> {
        self.api.send(E::KIND, request, id).await
    }
}

#[async_trait]
impl<E: Record> Repository<E> for HttpRepository<E> {
    #[instrument(skip(self, draft), fields(kind = %E::KIND))]
    async fn create(&self, draft: &E::Draft) -> Result<i32, AdminError> {
        let request = self.api.http.post(self.collection_url()).json(draft);
        let body = read_json(self.send(request, None).await?).await?;
        let id = extract_created_id(E::KIND, &body).ok_or_else(|| {
            AdminError::Network(format!("Server did not return a {} id", E::KIND))
        })?;
        debug!(id, "Record created");
        Ok(id)
    }

    #[instrument(skip(self, patch), fields(kind = %E::KIND))]
    async fn update(&self, id: i32, patch: &E::Patch) -> Result<(), AdminError> {
        let request = self.api.http.put(self.record_url(id)).json(patch);
        self.send(request, Some(id)).await?;
        debug!("Record updated");
        Ok(())
    }

    #[instrument(skip(self), fields(kind = %E::KIND))]
    async fn delete(&self, id: i32) -> Result<(), AdminError> {
        let request = self.api.http.delete(self.record_url(id));
        self.send(request, Some(id)).await?;
        debug!("Record deleted");
        Ok(())
    }

    #[instrument(skip(self), fields(kind = %E::KIND))]
    async fn get(&self, id: i32) -> Result<E, AdminError> {
        let request = self.api.http.get(self.record_url(id));
        let body = read_json(self.send(request, Some(id)).await?).await?;
        serde_json::from_value(unwrap_record(E::KIND, body))
            .map_err(|e| AdminError::Network(format!("Unexpected {} payload: {e}", E::KIND)))
    }

    #[instrument(skip(self), fields(kind = %E::KIND))]
    async fn list(&self) -> Result<Vec<E>, AdminError> {
        let request = self.api.http.get(self.collection_url());
        let body = read_json(self.send(request, None).await?).await?;
        serde_json::from_value(unwrap_list(body))
            .map_err(|e| AdminError::Network(format!("Unexpected {} list payload: {e}", E::KIND)))
    }
}

/// The backend answers create with `{kind: {id}}`, `{id}` or `{data: {id}}`.
fn extract_created_id(kind: EntityKind, body: &Value) -> Option<i32> {
    [&body[kind.as_str()]["id"], &body["id"], &body["data"]["id"]]
        .into_iter()
        .find_map(|v| v.as_i64())
        .and_then(|id| i32::try_from(id).ok())
}

fn unwrap_record(kind: EntityKind, body: Value) -> Value {
    if body.get("id").is_some() {
        return body;
    }
    match body {
        Value::Object(mut map) => map
            .remove(kind.as_str())
            .or_else(|| map.remove("data"))
            .unwrap_or(Value::Object(map)),
        other => other,
    }
}

fn unwrap_list(body: Value) -> Value {
    match body {
        Value::Object(mut map) => map.remove("data").unwrap_or(Value::Object(map)),
        other => other,
    }
}

fn error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        for key in ["message", "error"] {
            if let Some(msg) = value.get(key).and_then(Value::as_str) {
                return msg.to_string();
            }
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "no error details".to_string()
    } else {
        trimmed.chars().take(200).collect()
    }
}

fn status_error(kind: EntityKind, id: Option<i32>, status: StatusCode, message: String) -> AdminError {
    match status {
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => AdminError::Validation(message),
        StatusCode::NOT_FOUND => match id {
            Some(id) => AdminError::NotFound(format!("{kind} {id}")),
            None => AdminError::NotFound(kind.to_string()),
        },
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            AdminError::Session(format!("Not authorized ({status}): {message}"))
        }
        _ => AdminError::Network(format!("{status}: {message}")),
    }
}
