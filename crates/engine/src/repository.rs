use std::fmt;
use std::future::Future;
use std::time::Duration;

use odyssey_admin_protocol::{CreateMapRequest, GameMap, MapId};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoError {
    /// The server answered outside the 2xx range. The body is not inspected.
    Status(u16),
    /// The request never produced a response (connect, timeout, ...).
    Transport(String),
    /// A 2xx response whose body was not the expected JSON.
    Decode(String),
    InvalidUrl(String),
}

impl RepoError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status(code) => Some(*code),
            _ => None,
        }
    }
}

impl fmt::Display for RepoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status(code) => write!(f, "HTTP {code}"),
            Self::Transport(msg) => write!(f, "transport error: {msg}"),
            Self::Decode(msg) => write!(f, "invalid response body: {msg}"),
            Self::InvalidUrl(msg) => write!(f, "invalid url: {msg}"),
        }
    }
}

impl std::error::Error for RepoError {}

/// Storage of maps as seen from the editor.
///
/// `create` sends only the name; the server fills in tiles, links, version and
/// timestamp. `update` is a full-document replace.
pub trait MapRepository: Send + Sync + 'static {
    fn list(
        &self,
        query: Option<&str>,
    ) -> impl Future<Output = Result<Vec<GameMap>, RepoError>> + Send;

    fn get(&self, id: MapId) -> impl Future<Output = Result<GameMap, RepoError>> + Send;

    fn create(&self, name: &str) -> impl Future<Output = Result<GameMap, RepoError>> + Send;

    fn update(&self, map: &GameMap) -> impl Future<Output = Result<(), RepoError>> + Send;

    fn delete(&self, id: MapId) -> impl Future<Output = Result<(), RepoError>> + Send;
}

/// reqwest client for `/admin/maps`. Nothing is retried.
#[derive(Debug, Clone)]
pub struct HttpMapRepository {
    client: Client,
    base: Url,
}

impl HttpMapRepository {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, RepoError> {
        // A trailing slash keeps any path prefix when joining relative paths.
        let normalized = format!("{}/", base_url.trim().trim_end_matches('/'));
        let base = Url::parse(&normalized).map_err(|e| RepoError::InvalidUrl(e.to_string()))?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| RepoError::Transport(e.to_string()))?;

        Ok(Self { client, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn url(&self, path: &str) -> Result<Url, RepoError> {
        self.base
            .join(path)
            .map_err(|e| RepoError::InvalidUrl(e.to_string()))
    }

    fn map_url(&self, id: MapId) -> Result<Url, RepoError> {
        self.url(&format!("admin/maps/{id}"))
    }
}

impl MapRepository for HttpMapRepository {
    async fn list(&self, query: Option<&str>) -> Result<Vec<GameMap>, RepoError> {
        let mut url = self.url("admin/maps")?;
        if let Some(q) = query.filter(|q| !q.is_empty()) {
            url.query_pairs_mut().append_pair("q", q);
        }
        log::debug!("GET {url}");
        let resp = self.client.get(url).send().await.map_err(transport)?;
        decode(ensure_success(resp)?).await
    }

    async fn get(&self, id: MapId) -> Result<GameMap, RepoError> {
        let url = self.map_url(id)?;
        log::debug!("GET {url}");
        let resp = self.client.get(url).send().await.map_err(transport)?;
        decode(ensure_success(resp)?).await
    }

    async fn create(&self, name: &str) -> Result<GameMap, RepoError> {
        let url = self.url("admin/maps")?;
        log::debug!("POST {url} name={name:?}");
        let body = CreateMapRequest {
            name: name.to_string(),
        };
        let resp = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(transport)?;
        decode(ensure_success(resp)?).await
    }

    async fn update(&self, map: &GameMap) -> Result<(), RepoError> {
        let url = self.map_url(map.id)?;
        log::debug!("PUT {url}");
        let resp = self
            .client
            .put(url)
            .json(map)
            .send()
            .await
            .map_err(transport)?;
        ensure_success(resp)?;
        Ok(())
    }

    async fn delete(&self, id: MapId) -> Result<(), RepoError> {
        let url = self.map_url(id)?;
        log::debug!("DELETE {url}");
        let resp = self.client.delete(url).send().await.map_err(transport)?;
        ensure_success(resp)?;
        Ok(())
    }
}

fn transport(err: reqwest::Error) -> RepoError {
    RepoError::Transport(err.to_string())
}

fn ensure_success(resp: Response) -> Result<Response, RepoError> {
    let status = resp.status();
    if status.is_success() {
        Ok(resp)
    } else {
        Err(RepoError::Status(status.as_u16()))
    }
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, RepoError> {
    let body = resp.bytes().await.map_err(transport)?;
    serde_json::from_slice(&body).map_err(|e| RepoError::Decode(e.to_string()))
}
