//! REST client
//!
//! Thin wrapper over `reqwest` that knows how to authenticate against a
//! SharePoint site, address its `_api` endpoints and turn failed responses
//! into storage errors. It performs no retries.

use bytes::Bytes;
use log::{debug, error};
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderValue};
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;

use crate::config::{AdapterConfig, Credentials};
use crate::error::{RemoteError, StorageError, classify_response};
use crate::remote::endpoints;
use crate::remote::models::ContextInfo;

const ODATA_JSON: &str = "application/json;odata=nometadata";

/// Query parameters: OData alias name and its literal value
pub type Params<'a> = [(&'a str, String)];

/// Authenticated client for one SharePoint site
pub struct RestClient {
    http: Client,
    site_url: Url,
    credentials: Credentials,
}

impl RestClient {
    pub fn new(config: &AdapterConfig) -> Result<Self, StorageError> {
        let site_url = Url::parse(&config.url).map_err(|e| {
            config::ConfigError::Message(format!("url is not a valid URL ({}): {}", config.url, e))
        })?;
        let credentials = config.credentials()?;

        let http = Client::builder().timeout(config.timeout()).build()?;

        Ok(Self {
            http,
            site_url,
            credentials,
        })
    }

    /// The configured site URL
    pub fn site_url(&self) -> &Url {
        &self.site_url
    }

    /// Path component of the site URL, e.g. `/sites/team`
    pub fn site_path(&self) -> &str {
        self.site_url.path()
    }

    fn endpoint(&self, resource: &str) -> String {
        format!(
            "{}/_api/{}",
            self.site_url.as_str().trim_end_matches('/'),
            resource
        )
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request.header(ACCEPT, HeaderValue::from_static(ODATA_JSON));
        match &self.credentials {
            Credentials::Token(token) => request.bearer_auth(token),
            Credentials::Password { username, password } => {
                request.basic_auth(username, Some(password))
            }
        }
    }

    /// Send a request and hand back the response if the service accepted it.
    async fn send(&self, request: RequestBuilder, target: &str) -> Result<Response, StorageError> {
        let response = request.send().await.map_err(|e| {
            error!("Request for {} could not be sent: {}", target, e);
            StorageError::from(e)
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.bytes().await.unwrap_or_default();
        Err(classify_response(status.as_u16(), &body, target))
    }

    /// Request digest for mutating calls. Bearer-token sessions do not
    /// need one; password sessions fetch a fresh digest every time.
    async fn form_digest(&self) -> Result<Option<String>, StorageError> {
        if let Credentials::Token(_) = self.credentials {
            return Ok(None);
        }

        let request = self
            .authorize(self.http.post(self.endpoint(endpoints::CONTEXT_INFO)))
            .body(Vec::new());
        let response = self.send(request, "contextinfo").await?;
        let info: ContextInfo = decode(response).await?;
        Ok(Some(info.form_digest_value))
    }

    async fn mutating(
        &self,
        resource: &str,
        params: &Params<'_>,
    ) -> Result<RequestBuilder, StorageError> {
        let mut request = self
            .authorize(self.http.post(self.endpoint(resource)))
            .query(params);
        if let Some(digest) = self.form_digest().await? {
            request = request.header("X-RequestDigest", digest);
        }
        Ok(request)
    }

    /// GET a resource and decode its JSON body
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        resource: &str,
        params: &Params<'_>,
        target: &str,
    ) -> Result<T, StorageError> {
        debug!("GET {} for {}", resource, target);
        let request = self
            .authorize(self.http.get(self.endpoint(resource)))
            .query(params);
        let response = self.send(request, target).await?;
        decode(response).await
    }

    /// GET an absolute link handed out by the service, such as the
    /// `odata.nextLink` of a paged collection. Links to another origin are
    /// refused so credentials never leave the site.
    pub async fn get_json_link<T: DeserializeOwned>(
        &self,
        link: &str,
        target: &str,
    ) -> Result<T, StorageError> {
        let url = self.site_url.join(link).map_err(|e| {
            RemoteError::Decode(format!("unusable link {}: {}", link, e))
        })?;
        if url.origin() != self.site_url.origin() {
            return Err(RemoteError::Decode(format!(
                "link {} points outside {}",
                link, self.site_url
            ))
            .into());
        }

        debug!("GET {} for {}", url, target);
        let request = self.authorize(self.http.get(url));
        let response = self.send(request, target).await?;
        decode(response).await
    }

    /// GET a resource and hand back the raw response for streaming
    pub async fn get_raw(
        &self,
        resource: &str,
        params: &Params<'_>,
        target: &str,
    ) -> Result<Response, StorageError> {
        debug!("GET {} for {}", resource, target);
        let request = self
            .authorize(self.http.get(self.endpoint(resource)))
            .query(params);
        self.send(request, target).await
    }

    /// GET a resource's full body
    pub async fn get_bytes(
        &self,
        resource: &str,
        params: &Params<'_>,
        target: &str,
    ) -> Result<Bytes, StorageError> {
        let response = self.get_raw(resource, params, target).await?;
        Ok(response.bytes().await?)
    }

    /// POST a binary body and decode the JSON answer
    pub async fn post_json<T: DeserializeOwned>(
        &self,
        resource: &str,
        params: &Params<'_>,
        body: Bytes,
        target: &str,
    ) -> Result<T, StorageError> {
        debug!("POST {} ({} bytes) for {}", resource, body.len(), target);
        let request = self
            .mutating(resource, params)
            .await?
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(body);
        let response = self.send(request, target).await?;
        decode(response).await
    }

    /// POST with an empty body, ignoring any answer
    pub async fn post(
        &self,
        resource: &str,
        params: &Params<'_>,
        target: &str,
    ) -> Result<(), StorageError> {
        debug!("POST {} for {}", resource, target);
        let request = self.mutating(resource, params).await?.body(Vec::new());
        self.send(request, target).await?;
        Ok(())
    }

    /// Delete a resource via the `X-HTTP-Method` override
    pub async fn delete(
        &self,
        resource: &str,
        params: &Params<'_>,
        target: &str,
    ) -> Result<(), StorageError> {
        debug!("DELETE {} for {}", resource, target);
        let request = self
            .mutating(resource, params)
            .await?
            .header("X-HTTP-Method", "DELETE")
            .header("If-Match", "*")
            .body(Vec::new());
        self.send(request, target).await?;
        Ok(())
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, StorageError> {
    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(|e| {
        let preview = String::from_utf8_lossy(&body[..body.len().min(200)]).to_string();
        StorageError::Remote(RemoteError::Decode(format!("{}. Body: {}", e, preview)))
    })
}
