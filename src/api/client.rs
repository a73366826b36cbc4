//! Shared request plumbing for every resource client

use reqwest::{header::CONTENT_TYPE, Method, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{
    config::ApiConfig,
    error::{ClientError, ClientResult},
    session::Session,
};

/// Low-level API client: URL building, auth headers and status mapping.
///
/// Cloning is cheap; the underlying connection pool is shared.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Session,
}

/// List endpoints answer with a bare array or a `{ "data": [...] }` envelope
#[derive(Deserialize)]
#[serde(untagged)]
enum ListResponse<T> {
    Items(Vec<T>),
    Envelope { data: Vec<T> },
}

impl<T> ListResponse<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            ListResponse::Items(items) => items,
            ListResponse::Envelope { data } => data,
        }
    }
}

impl ApiClient {
    pub fn new(config: &ApiConfig, session: Session) -> ClientResult<Self> {
        let parsed = reqwest::Url::parse(&config.base_url)
            .map_err(|e| ClientError::InvalidBaseUrl(format!("{}: {}", config.base_url, e)))?;
        if parsed.cannot_be_a_base() || !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClientError::InvalidBaseUrl(config.base_url.clone()));
        }

        let http = reqwest::Client::builder()
            .user_agent(concat!("library-console/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ClientError::Transport {
                operation: "Build HTTP client".to_string(),
                source: e,
            })?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `{base}/{segment}/{segment}...`
    pub fn url(&self, segments: &[&str]) -> String {
        let mut url = self.base_url.clone();
        for segment in segments {
            url.push('/');
            url.push_str(segment.trim_matches('/'));
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let url = self.url(segments);
        tracing::debug!("{} {}", method, url);

        let builder = self
            .http
            .request(method, url)
            .header(CONTENT_TYPE, "application/json");

        match self.session.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send the request and return the raw body of a 2xx response
    async fn fetch(&self, operation: &str, builder: RequestBuilder) -> ClientResult<Vec<u8>> {
        let response = builder.send().await.map_err(|e| {
            tracing::error!(operation, "Request failed: {}", e);
            ClientError::Transport {
                operation: operation.to_string(),
                source: e,
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(operation, status = status.as_u16(), body = %body, "Request rejected");

            if status == StatusCode::UNAUTHORIZED {
                return Err(ClientError::Unauthorized);
            }
            return Err(ClientError::Operation {
                operation: operation.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(|e| {
            tracing::error!(operation, "Failed to read response body: {}", e);
            ClientError::Transport {
                operation: operation.to_string(),
                source: e,
            }
        })?;

        Ok(bytes.to_vec())
    }

    fn decode<T: DeserializeOwned>(operation: &str, body: &[u8]) -> ClientResult<T> {
        serde_json::from_slice(body).map_err(|e| {
            tracing::error!(operation, "Failed to parse response: {}", e);
            ClientError::Decode {
                operation: operation.to_string(),
                source: e,
            }
        })
    }

    /// Empty or non-JSON bodies fall back to the empty value of `T`.
    /// JSON that does not fit `T` is still a decode error.
    fn decode_or_default<T: DeserializeOwned + Default>(operation: &str, body: &[u8]) -> ClientResult<T> {
        let value: serde_json::Value = match serde_json::from_slice(body) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(operation, "Response body is not JSON, using empty value: {}", e);
                return Ok(T::default());
            }
        };

        serde_json::from_value(value).map_err(|e| {
            tracing::error!(operation, "Failed to parse response: {}", e);
            ClientError::Decode {
                operation: operation.to_string(),
                source: e,
            }
        })
    }

    pub async fn get<T: DeserializeOwned>(&self, operation: &str, segments: &[&str]) -> ClientResult<T> {
        let body = self.fetch(operation, self.request(Method::GET, segments)).await?;
        Self::decode(operation, &body)
    }

    pub async fn get_list<T: DeserializeOwned>(&self, operation: &str, segments: &[&str]) -> ClientResult<Vec<T>> {
        let body = self.fetch(operation, self.request(Method::GET, segments)).await?;
        Self::decode::<ListResponse<T>>(operation, &body).map(ListResponse::into_vec)
    }

    pub async fn get_list_lenient<T: DeserializeOwned>(
        &self,
        operation: &str,
        segments: &[&str],
    ) -> ClientResult<Vec<T>> {
        let body = self.fetch(operation, self.request(Method::GET, segments)).await?;
        let list: Option<ListResponse<T>> = Self::decode_or_default(operation, &body)?;
        Ok(list.map(ListResponse::into_vec).unwrap_or_default())
    }

    pub async fn post<B, T>(&self, operation: &str, segments: &[&str], payload: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = self.request(Method::POST, segments).json(payload);
        let body = self.fetch(operation, builder).await?;
        Self::decode(operation, &body)
    }

    /// POST without a body; unreadable responses yield `T::default()`
    pub async fn post_empty_lenient<T>(&self, operation: &str, segments: &[&str]) -> ClientResult<T>
    where
        T: DeserializeOwned + Default,
    {
        let body = self.fetch(operation, self.request(Method::POST, segments)).await?;
        Self::decode_or_default(operation, &body)
    }

    pub async fn patch<B, T>(&self, operation: &str, segments: &[&str], payload: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = self.request(Method::PATCH, segments).json(payload);
        let body = self.fetch(operation, builder).await?;
        Self::decode(operation, &body)
    }

    /// DELETE whose only signal is success; the body is ignored
    pub async fn delete(&self, operation: &str, segments: &[&str]) -> ClientResult<bool> {
        self.fetch(operation, self.request(Method::DELETE, segments)).await?;
        Ok(true)
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("session", &self.session)
            .finish()
    }
}
