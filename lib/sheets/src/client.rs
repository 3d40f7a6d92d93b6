use std::sync::Arc;

use chrono::Utc;
use hyper::body::{self, Bytes};
use hyper::client::HttpConnector;
use hyper::header::{AUTHORIZATION, CONTENT_TYPE};
use hyper::{Body, Method, Request};
use hyper_tls::HttpsConnector;
use log::{debug, trace};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::Mutex;
use url::Url;

use crate::api::{Endpoints, FileList};
use crate::token::{self, AccessToken, TokenResponse};
use crate::{Error, Result, ServiceAccountKey, Spreadsheet};

type HttpClient = hyper::Client<HttpsConnector<HttpConnector>>;

/// Authorized Sheets/Drive client. The access token is cached and renewed
/// shortly before it expires.
pub struct Client {
    http: HttpClient,
    endpoints: Endpoints,
    key: ServiceAccountKey,
    token: Mutex<Option<AccessToken>>,
}

impl Client {
    pub fn new(key: ServiceAccountKey) -> Arc<Self> {
        Self::with_endpoints(key, Endpoints::default())
    }

    pub(crate) fn with_endpoints(key: ServiceAccountKey, endpoints: Endpoints) -> Arc<Self> {
        let https = HttpsConnector::new();
        let http = hyper::Client::builder().build::<_, Body>(https);

        Arc::new(Self {
            http,
            endpoints,
            key,
            token: Mutex::new(None),
        })
    }

    pub(crate) fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Opens the first spreadsheet visible to the service account with this exact name.
    pub async fn open(self: &Arc<Self>, name: &str) -> Result<Spreadsheet> {
        let list: FileList = self.get_json(self.endpoints.files_url(name)?).await?;

        let file = list
            .files
            .into_iter()
            .next()
            .ok_or_else(|| Error::SpreadsheetNotFound(name.to_owned()))?;

        debug!("opened spreadsheet {} ({})", file.name, file.id);

        Ok(Spreadsheet::new(self.clone(), file.id, file.name))
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let bytes = self.send(Method::GET, url, None).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub(crate) async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<Value>,
    ) -> Result<Bytes> {
        let token = self.access_token().await?;

        trace!("{} {}", method, url);

        let builder = Request::builder()
            .method(method)
            .uri(url.as_str())
            .header(AUTHORIZATION, format!("Bearer {token}"));

        let request = match body {
            Some(body) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body)?))?,
            None => builder.body(Body::empty())?,
        };

        self.perform(request).await
    }

    async fn access_token(&self) -> Result<String> {
        let mut token = self.token.lock().await;
        let now = Utc::now().timestamp();

        if let Some(cached) = token.as_ref().filter(|cached| cached.is_fresh_at(now)) {
            return Ok(cached.value.clone());
        }

        let assertion = token::create_assertion_at(&self.key, now)?;

        let request = Request::builder()
            .method(Method::POST)
            .uri(self.key.token_uri.as_str())
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(token::token_request_body(&assertion)?))?;

        let bytes = self.perform(request).await?;
        let response: TokenResponse = serde_json::from_slice(&bytes)?;
        let fresh = AccessToken::from_response(response, now);

        debug!(
            "issued access token for {} valid until {}",
            self.key.client_email, fresh.expires_at
        );

        let value = fresh.value.clone();
        *token = Some(fresh);

        Ok(value)
    }

    async fn perform(&self, request: Request<Body>) -> Result<Bytes> {
        let response = self.http.request(request).await?;
        let status = response.status();
        let bytes = body::to_bytes(response.into_body()).await?;

        if status.is_success() {
            Ok(bytes)
        } else {
            Err(Error::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            })
        }
    }
}
