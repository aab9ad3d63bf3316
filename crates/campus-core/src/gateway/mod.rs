//! The single chokepoint for backend HTTP calls.
//!
//! Every request runs through [`AuthInterceptor`]: the outbound stage adds
//! the bearer token, the inbound stage turns a 401 into a session clear plus
//! a redirect to sign-in. Requests are never retried.

mod error;
mod interceptor;

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

pub use error::GatewayError;
pub use interceptor::{AuthInterceptor, is_authorization_failure};

use crate::config::Config;
use crate::navigation::Navigator;
use crate::session::SessionStore;

/// User-Agent sent with every backend request.
pub const USER_AGENT: &str = concat!("campus-admin/", env!("CARGO_PKG_VERSION"));

pub type GatewayResult<T> = Result<T, GatewayError>;

pub struct Gateway {
    client: reqwest::Client,
    base_url: Url,
    interceptor: AuthInterceptor,
    store: Arc<dyn SessionStore>,
    navigator: Arc<dyn Navigator>,
}

impl Gateway {
    /// Creates a gateway rooted at `base_url`.
    pub fn new(
        base_url: Url,
        timeout: Option<Duration>,
        store: Arc<dyn SessionStore>,
        navigator: Arc<dyn Navigator>,
    ) -> GatewayResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let mut builder = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(GatewayError::Transport)?;
        Ok(Self::with_client(client, base_url, store, navigator))
    }

    /// Creates a gateway from loaded config; `override_url` wins over the file.
    pub fn from_config(
        config: &Config,
        override_url: Option<&str>,
        store: Arc<dyn SessionStore>,
        navigator: Arc<dyn Navigator>,
    ) -> anyhow::Result<Self> {
        let base_url = config.resolve_base_url(override_url)?;
        Ok(Self::new(base_url, config.timeout(), store, navigator)?)
    }

    pub fn with_client(
        client: reqwest::Client,
        mut base_url: Url,
        store: Arc<dyn SessionStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        // Joining relative paths needs a trailing slash on the base.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let interceptor = AuthInterceptor::new(Arc::clone(&store), Arc::clone(&navigator));
        Self {
            client,
            base_url,
            interceptor,
            store,
            navigator,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    /// Resolves an endpoint path against the base URL.
    pub fn url(&self, path: &str) -> GatewayResult<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|source| GatewayError::InvalidUrl {
                path: path.to_string(),
                source,
            })
    }

    pub fn request(&self, method: Method, path: &str) -> GatewayResult<RequestBuilder> {
        Ok(self.request_to(method, self.url(path)?))
    }

    /// Starts a request to an already resolved URL.
    pub fn request_to(&self, method: Method, url: Url) -> RequestBuilder {
        self.client.request(method, url)
    }

    /// Resolves `path` and appends `segment` percent-encoded as one path segment.
    pub fn url_with_segment(&self, path: &str, segment: &str) -> GatewayResult<Url> {
        let mut url = self.url(path)?;
        url.path_segments_mut()
            .map_err(|()| GatewayError::InvalidUrl {
                path: path.to_string(),
                source: url::ParseError::RelativeUrlWithCannotBeABaseBase,
            })?
            .pop_if_empty()
            .push(segment);
        Ok(url)
    }

    /// Sends a request through both interceptor stages.
    ///
    /// Non-success statuses come back as errors; the body of a business
    /// error is preserved for the caller.
    pub async fn execute(&self, builder: RequestBuilder) -> GatewayResult<Response> {
        let mut request = builder.build().map_err(GatewayError::Transport)?;
        self.interceptor.before_send(&mut request)?;

        let method = request.method().clone();
        let path = request.url().path().to_string();
        tracing::debug!(%method, %path, "backend request");

        let response = self
            .client
            .execute(request)
            .await
            .map_err(GatewayError::Transport)?;
        let status = response.status();
        tracing::debug!(%method, %path, status = status.as_u16(), "backend response");

        self.interceptor.after_response(status)?;

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::from_status(status.as_u16(), &body));
        }

        Ok(response)
    }

    /// Sends `GET path` with an explicit token and reports the status.
    ///
    /// The inbound stage is skipped: a rejection here is not treated as an
    /// authorization failure of the current session, so the caller decides
    /// how to react.
    pub async fn probe(&self, path: &str, token: &str) -> GatewayResult<StatusCode> {
        let mut request = self
            .request(Method::GET, path)?
            .build()
            .map_err(GatewayError::Transport)?;
        request
            .headers_mut()
            .insert(AUTHORIZATION, interceptor::bearer_header(token)?);

        let response = self
            .client
            .execute(request)
            .await
            .map_err(GatewayError::Transport)?;
        Ok(response.status())
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> GatewayResult<T> {
        let response = self.execute(self.request(Method::GET, path)?).await?;
        decode(path, response).await
    }

    pub async fn get_json_at<T: DeserializeOwned>(&self, url: Url) -> GatewayResult<T> {
        let path = url.path().to_string();
        let response = self.execute(self.request_to(Method::GET, url)).await?;
        decode(&path, response).await
    }

    pub async fn get_json_with_query<T, Q>(&self, path: &str, query: &Q) -> GatewayResult<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let builder = self.request(Method::GET, path)?.query(query);
        let response = self.execute(builder).await?;
        decode(path, response).await
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> GatewayResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = self.request(Method::POST, path)?.json(body);
        let response = self.execute(builder).await?;
        decode(path, response).await
    }

    /// POSTs a JSON body and ignores the response body.
    pub async fn post_empty<B>(&self, path: &str, body: &B) -> GatewayResult<StatusCode>
    where
        B: Serialize + ?Sized,
    {
        let builder = self.request(Method::POST, path)?.json(body);
        let response = self.execute(builder).await?;
        Ok(response.status())
    }
}

async fn decode<T: DeserializeOwned>(path: &str, response: Response) -> GatewayResult<T> {
    let bytes = response.bytes().await.map_err(GatewayError::Transport)?;
    serde_json::from_slice(&bytes).map_err(|source| GatewayError::Decode {
        path: path.to_string(),
        source,
    })
}
