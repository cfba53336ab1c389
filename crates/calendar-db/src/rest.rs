use calendar_types::{Category, Event, NewEvent};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde_json::json;
use tracing::{debug, info};

use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::query::{self, EventQuery};
use crate::schema::EVENTS_TABLE;
use crate::EventStore;

/// Events store reached through the hosted project's REST endpoint.
pub struct RestStore {
    client: Client,
    rest_url: String,
    config: StoreConfig,
}

impl RestStore {
    /// Builds an authenticated client and proves the endpoint answers and
    /// accepts the key. No retry.
    pub async fn connect(config: StoreConfig) -> Result<Self, StoreError> {
        let store = Self::new(config)?;

        let response = store.send(store.client.get(format!("{}/", store.rest_url))).await?;
        let status = response.status().as_u16();
        if matches!(status, 401 | 403) {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::from_response(status, &body));
        }

        info!("Connected to store at {}", store.config.endpoint);
        Ok(store)
    }

    /// Client construction without the network probe.
    pub fn new(config: StoreConfig) -> Result<Self, StoreError> {
        let endpoint = Url::parse(&config.endpoint)
            .map_err(|e| StoreError::InvalidConfig(format!("endpoint {:?}: {}", config.endpoint, e)))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(StoreError::InvalidConfig(format!(
                "endpoint scheme must be http or https, got {:?}",
                endpoint.scheme()
            )));
        }
        if config.api_key.is_empty() {
            return Err(StoreError::InvalidConfig("api key is empty".into()));
        }

        let key = HeaderValue::from_str(&config.api_key)
            .map_err(|_| StoreError::InvalidConfig("api key is not a valid header value".into()))?;
        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", config.api_key))
            .map_err(|_| StoreError::InvalidConfig("api key is not a valid header value".into()))?;
        bearer.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| StoreError::InvalidConfig(format!("http client: {}", e)))?;

        let rest_url = format!("{}/rest/v1", config.endpoint.trim_end_matches('/'));

        Ok(Self {
            client,
            rest_url,
            config,
        })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn table_url(&self) -> String {
        format!("{}/{}", self.rest_url, EVENTS_TABLE)
    }

    /// Sends a request, mapping transport failures. The response status is
    /// not inspected.
    async fn send(&self, request: RequestBuilder) -> Result<Response, StoreError> {
        request.send().await.map_err(|e| self.transport_error(e))
    }

    /// Sends a request and turns any non-success status into a typed error.
    async fn execute(&self, request: RequestBuilder) -> Result<Response, StoreError> {
        let response = self.send(request).await?;
        self.check(response).await
    }

    async fn check(&self, response: Response) -> Result<Response, StoreError> {
        let status = response.status();
        debug!(status = status.as_u16(), url = %response.url(), "store response");

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(StoreError::from_response(status.as_u16(), &body))
    }

    fn transport_error(&self, error: reqwest::Error) -> StoreError {
        if error.is_timeout() {
            return StoreError::Timeout(self.config.timeout);
        }
        if error.is_decode() {
            return StoreError::Decode(error.to_string());
        }
        StoreError::Unreachable {
            url: self.config.endpoint.clone(),
            source: error,
        }
    }
}

impl EventStore for RestStore {
    async fn execute_sql(&self, sql: &str) -> Result<(), StoreError> {
        let url = format!("{}/rpc/{}", self.rest_url, self.config.sql_function);
        debug!(function = %self.config.sql_function, "executing DDL statement");

        self.execute(self.client.post(url).json(&json!({ "sql": sql })))
            .await?;
        Ok(())
    }

    async fn select_events(&self, query: &EventQuery) -> Result<Vec<Event>, StoreError> {
        let params = query.to_params();
        debug!(?params, "selecting events");

        let response = self
            .execute(self.client.get(self.table_url()).query(&params))
            .await?;
        response.json::<Vec<Event>>().await.map_err(|e| self.transport_error(e))
    }

    async fn insert_events(&self, events: &[NewEvent]) -> Result<usize, StoreError> {
        debug!(rows = events.len(), "inserting events");

        let response = self
            .execute(
                self.client
                    .post(self.table_url())
                    .header("Prefer", "return=representation")
                    .json(events),
            )
            .await?;
        let inserted = response
            .json::<Vec<Event>>()
            .await
            .map_err(|e| self.transport_error(e))?;
        Ok(inserted.len())
    }

    async fn count_events(&self, category: Option<Category>) -> Result<u64, StoreError> {
        let params = query::count_params(category);
        debug!(?params, "counting events");

        let response = self
            .send(
                self.client
                    .head(self.table_url())
                    .header("Prefer", "count=exact")
                    .query(&params),
            )
            .await?;
        // HEAD answers carry no error body to read a code from.
        if response.status() == StatusCode::NOT_FOUND {
            return Err(StoreError::RelationAbsent(EVENTS_TABLE.to_string()));
        }
        let response = self.check(response).await?;

        let range = response
            .headers()
            .get("content-range")
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| StoreError::Decode("count response has no Content-Range header".into()))?;
        query::parse_content_range(range)
    }
}
