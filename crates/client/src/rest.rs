//! `reqwest`-backed implementations of the gateway traits.

use crate::gateway::{ResourceApi, ScheduleApi};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use medoffice_types::{
    ApiError, ApiResult, CollectionName, FieldMap, ListQuery, Page, Record, RecordId, SlotProposal,
};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Longest error-body excerpt carried into an `ApiError::Server` message.
const ERROR_BODY_EXCERPT: usize = 200;

/// Shared connection state: base URL, bearer token and the HTTP client.
///
/// One connection serves any number of per-collection clients. No request
/// timeout is configured beyond the transport default; a hung request
/// leaves the caller suspended (known limitation, see the controller
/// tests).
#[derive(Clone, Debug)]
pub struct ApiConnection {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiConnection {
    /// Creates a connection for `base_url`, validating it up front.
    ///
    /// The bearer token, when present, is attached to every request.
    pub fn new(base_url: &str, token: Option<String>) -> ApiResult<Self> {
        let parsed = reqwest::Url::parse(base_url)
            .map_err(|e| ApiError::Network(format!("invalid base url {base_url:?}: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::Network(format!(
                "invalid base url {base_url:?}: unsupported scheme"
            )));
        }
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ApiError::Network(format!("failed to build http client: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    /// A client for one collection endpoint.
    pub fn resource(&self, collection: CollectionName) -> RestClient {
        RestClient {
            conn: self.clone(),
            collection,
        }
    }

    /// A client for the scheduling endpoints of one collection
    /// (normally `appointments`).
    pub fn schedule(&self, collection: CollectionName) -> ScheduleClient {
        ScheduleClient {
            conn: self.clone(),
            collection,
        }
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        let mut req = self.http.request(method, url);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        req
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> ApiResult<reqwest::Response> {
        let resp = req
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        classify(resp).await
    }
}

/// Maps a non-success response onto the error taxonomy; success responses
/// pass through for the caller to decode.
async fn classify(resp: reqwest::Response) -> ApiResult<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let code = status.as_u16();
    match code {
        401 | 403 => Err(ApiError::Auth { status: code }),
        404 => Err(ApiError::NotFound),
        400 => {
            let body = resp.text().await.unwrap_or_default();
            Err(validation_error(&body))
        }
        _ => {
            let body = resp.text().await.unwrap_or_default();
            let message: String = body.chars().take(ERROR_BODY_EXCERPT).collect();
            Err(ApiError::Server {
                status: code,
                message,
            })
        }
    }
}

/// Parses a 400 body into field-level messages when the backend provides
/// them (`{"field": ["msg", …]}`), falling back to a generic message.
fn validation_error(body: &str) -> ApiError {
    let mut message = "invalid input".to_string();
    let mut field_errors = BTreeMap::new();

    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        for (key, value) in map {
            match (key.as_str(), value) {
                ("detail", Value::String(detail)) => message = detail,
                (_, Value::Array(items)) => {
                    let messages: Vec<String> = items
                        .into_iter()
                        .filter_map(|v| match v {
                            Value::String(s) => Some(s),
                            _ => None,
                        })
                        .collect();
                    if !messages.is_empty() {
                        field_errors.insert(key, messages);
                    }
                }
                (_, Value::String(single)) => {
                    field_errors.insert(key, vec![single]);
                }
                _ => {}
            }
        }
    }

    ApiError::Validation {
        message,
        field_errors,
    }
}

fn decode_error(e: impl std::fmt::Display) -> ApiError {
    ApiError::Decode(e.to_string())
}

/// The paginated envelope list endpoints return.
#[derive(Debug, Deserialize)]
struct ListEnvelope {
    count: u64,
    next: Option<String>,
    #[allow(dead_code)]
    previous: Option<String>,
    results: Vec<Record>,
}

/// REST access to one backend collection.
#[derive(Clone, Debug)]
pub struct RestClient {
    conn: ApiConnection,
    collection: CollectionName,
}

impl RestClient {
    pub fn collection(&self) -> &CollectionName {
        &self.collection
    }

    fn collection_url(&self) -> String {
        format!("{}/{}/", self.conn.base_url, self.collection)
    }

    fn record_url(&self, id: &RecordId) -> String {
        format!("{}/{}/{}/", self.conn.base_url, self.collection, id)
    }
}

#[async_trait]
impl ResourceApi for RestClient {
    async fn list(&self, query: &ListQuery) -> ApiResult<Page> {
        tracing::debug!(collection = %self.collection, page = query.page_index, "list");
        let req = self
            .conn
            .request(reqwest::Method::GET, &self.collection_url())
            .query(&query.to_query_pairs());
        let resp = self.conn.send(req).await?;
        let envelope: ListEnvelope = resp.json().await.map_err(decode_error)?;
        Page::new(
            envelope.results,
            envelope.count,
            query.page_index,
            query.page_size,
        )
        .map_err(decode_error)
    }

    async fn list_all(&self, query: &ListQuery) -> ApiResult<Vec<Record>> {
        tracing::debug!(collection = %self.collection, "list_all");
        let mut records = Vec::new();
        let mut next_url: Option<String> = None;

        loop {
            let req = match &next_url {
                // Follow-up pages come back as absolute `next` links.
                Some(url) => self.conn.request(reqwest::Method::GET, url),
                None => self
                    .conn
                    .request(reqwest::Method::GET, &self.collection_url())
                    .query(&query.to_unpaginated_pairs()),
            };
            let resp = self.conn.send(req).await?;
            let body: Value = resp.json().await.map_err(decode_error)?;

            if body.is_array() {
                // Pagination disabled server-side: one bare array.
                let batch: Vec<Record> = serde_json::from_value(body).map_err(decode_error)?;
                records.extend(batch);
                return Ok(records);
            }

            let envelope: ListEnvelope = serde_json::from_value(body).map_err(decode_error)?;
            records.extend(envelope.results);
            match envelope.next {
                Some(url) => next_url = Some(url),
                None => return Ok(records),
            }
        }
    }

    async fn get(&self, id: &RecordId) -> ApiResult<Record> {
        let req = self.conn.request(reqwest::Method::GET, &self.record_url(id));
        let resp = self.conn.send(req).await?;
        resp.json().await.map_err(decode_error)
    }

    async fn create(&self, payload: &FieldMap) -> ApiResult<Record> {
        let req = self
            .conn
            .request(reqwest::Method::POST, &self.collection_url())
            .json(payload);
        let resp = self.conn.send(req).await?;
        resp.json().await.map_err(decode_error)
    }

    async fn update(&self, id: &RecordId, payload: &FieldMap) -> ApiResult<Record> {
        let req = self
            .conn
            .request(reqwest::Method::PATCH, &self.record_url(id))
            .json(payload);
        let resp = self.conn.send(req).await?;
        resp.json().await.map_err(decode_error)
    }

    async fn delete(&self, id: &RecordId) -> ApiResult<()> {
        let req = self
            .conn
            .request(reqwest::Method::DELETE, &self.record_url(id));
        self.conn.send(req).await?;
        Ok(())
    }
}

/// Wire shape of the availability endpoint.
#[derive(Debug, Deserialize)]
struct SlotEnvelope {
    resource: Value,
    date: NaiveDate,
    times: Vec<String>,
}

/// Scheduling calls for one collection endpoint.
#[derive(Clone, Debug)]
pub struct ScheduleClient {
    conn: ApiConnection,
    collection: CollectionName,
}

impl ScheduleClient {
    fn slots_url(&self) -> String {
        format!("{}/{}/available_slots/", self.conn.base_url, self.collection)
    }

    fn record_url(&self, id: &RecordId) -> String {
        format!("{}/{}/{}/", self.conn.base_url, self.collection, id)
    }
}

fn id_from_value(value: &Value) -> Option<RecordId> {
    match value {
        Value::String(s) if !s.is_empty() => Some(RecordId::new(s.clone())),
        Value::Number(n) => n.as_i64().map(RecordId::from),
        _ => None,
    }
}

fn parse_slot_time(raw: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .ok()
}

#[async_trait]
impl ScheduleApi for ScheduleClient {
    async fn slot_proposal(
        &self,
        resource_id: &RecordId,
        date: NaiveDate,
    ) -> ApiResult<SlotProposal> {
        tracing::debug!(resource = %resource_id, %date, "slot_proposal");
        let req = self
            .conn
            .request(reqwest::Method::GET, &self.slots_url())
            .query(&[
                ("resource", resource_id.as_str().to_string()),
                ("date", date.to_string()),
            ]);
        let resp = self.conn.send(req).await?;
        let envelope: SlotEnvelope = resp.json().await.map_err(decode_error)?;

        let resource_id = id_from_value(&envelope.resource)
            .ok_or_else(|| ApiError::Decode("availability response has no resource id".into()))?;
        let mut candidate_times = Vec::with_capacity(envelope.times.len());
        for raw in &envelope.times {
            match parse_slot_time(raw) {
                Some(time) => candidate_times.push(time),
                None => {
                    return Err(ApiError::Decode(format!("unparseable slot time {raw:?}")));
                }
            }
        }
        Ok(SlotProposal {
            resource_id,
            date: envelope.date,
            candidate_times,
        })
    }

    async fn commit_reschedule(
        &self,
        appointment_id: &RecordId,
        resource_id: &RecordId,
        date: NaiveDate,
        time: NaiveTime,
    ) -> ApiResult<Record> {
        tracing::debug!(appointment = %appointment_id, %date, %time, "commit_reschedule");
        let payload = serde_json::json!({
            "resource": resource_id.as_str(),
            "date": date.to_string(),
            "time": time.format("%H:%M").to_string(),
        });
        let req = self
            .conn
            .request(reqwest::Method::PATCH, &self.record_url(appointment_id))
            .json(&payload);
        let resp = self.conn.send(req).await?;
        resp.json().await.map_err(decode_error)
    }
}
