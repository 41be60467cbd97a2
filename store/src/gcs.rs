//! Google Cloud Storage provider, speaking the JSON API over reqwest.

use crate::{ObjectStore, StoreError};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::StatusCode;
use serde::Deserialize;
use url::Url;

const DEFAULT_ENDPOINT: &str = "https://storage.googleapis.com";

/// Object reader for a single GCS bucket.
///
/// The endpoint is overridable so tests (and S3-compatible gateways exposing
/// the same JSON surface) can point it elsewhere. Authentication is an
/// optional static bearer token; public buckets need none.
#[derive(Debug)]
pub struct GcsStore {
    client: reqwest::Client,
    bucket: String,
    base: Url,
    bearer_token: Option<String>,
}

impl GcsStore {
    pub fn new(bucket: &str, endpoint: Option<&str>) -> Result<Self, StoreError> {
        let base = Url::parse(endpoint.unwrap_or(DEFAULT_ENDPOINT))?;
        if base.cannot_be_a_base() {
            return Err(StoreError::OpaqueEndpoint(base.to_string()));
        }
        Ok(Self {
            client: reqwest::Client::new(),
            bucket: bucket.to_string(),
            base,
            bearer_token: None,
        })
    }

    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    /// `{base}/storage/v1/b/{bucket}/o[/{key}]`, with the key percent-encoded
    /// as a single segment (slashes become `%2F` per the JSON API).
    fn object_url(&self, key: Option<&str>) -> Url {
        let mut url = self.base.clone();
        // The constructor rejects opaque bases, so segments are available.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.extend(["storage", "v1", "b", self.bucket.as_str(), "o"]);
            if let Some(key) = key {
                segments.push(key);
            }
        }
        url
    }

    fn request(&self, url: Url) -> reqwest::RequestBuilder {
        let req = self.client.get(url);
        match &self.bearer_token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    items: Vec<ObjectItem>,
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
struct ObjectItem {
    name: String,
}

#[async_trait]
impl ObjectStore for GcsStore {
    async fn list(&self) -> Result<Vec<String>, StoreError> {
        let mut keys = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = self.object_url(None);
            url.query_pairs_mut()
                .append_pair("fields", "items/name,nextPageToken");
            if let Some(token) = &page_token {
                url.query_pairs_mut().append_pair("pageToken", token);
            }

            let response = self.request(url).send().await?;
            if !response.status().is_success() {
                return Err(StoreError::UnexpectedStatus {
                    status: response.status().as_u16(),
                    context: format!("list of bucket {}", self.bucket),
                });
            }

            let page: ListResponse = response.json().await?;
            keys.extend(page.items.into_iter().map(|item| item.name));

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        tracing::debug!(bucket = %self.bucket, count = keys.len(), "listed bucket");
        Ok(keys)
    }

    async fn get(&self, key: &str) -> Result<Option<Bytes>, StoreError> {
        let mut url = self.object_url(Some(key));
        url.query_pairs_mut().append_pair("alt", "media");

        let response = self.request(url).send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => Ok(Some(response.bytes().await?)),
            status => Err(StoreError::UnexpectedStatus {
                status: status.as_u16(),
                context: format!("object {key}"),
            }),
        }
    }
}
