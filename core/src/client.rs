//! Authenticated request builder and executor for the Raindrop API.
//!
//! # Design
//! Every operation is split the same way: a `build_*` method produces an
//! `HttpRequest` without touching the network, and an executing method of
//! the same name (minus the prefix) sends it through the client's
//! `Transport` and wraps the outcome in an `OperationResponse`. Executing
//! methods never fail early; construction and transport errors travel
//! inside the wrapper. Status codes and bodies are left to the caller.

use std::fmt;

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::filter::Filter;
use crate::http::{default_agent, HttpMethod, HttpRequest, Transport};
use crate::response::OperationResponse;
use crate::types::{BulkUpdate, Collection, IdList, LinkBody, Raindrop, RaindropList};

/// Public REST endpoint of the Raindrop service.
pub const DEFAULT_BASE_URL: &str = "https://api.raindrop.io/rest/v1";

/// Bearer token presented on every request.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn token(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Value for the `authorization` header.
    pub fn authorization(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Client for the Raindrop REST API.
///
/// Holds the base URL, the credential, and a transport handle; none of them
/// change after construction, so a client can be cloned and shared freely.
#[derive(Debug, Clone)]
pub struct RaindropClient<T = ureq::Agent> {
    base_url: String,
    credential: Credential,
    transport: T,
}

impl RaindropClient<ureq::Agent> {
    /// Client backed by a blocking `ureq` agent.
    pub fn new(base_url: &str, credential: Credential) -> Self {
        Self::with_transport(base_url, credential, default_agent())
    }
}

impl<T> RaindropClient<T> {
    pub fn with_transport(base_url: &str, credential: Credential, transport: T) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            credential,
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Join `route` onto the base URL. The request carries the parsed,
    /// normalized form so the transport never sees raw input.
    fn url(&self, route: &str) -> Result<String, ApiError> {
        let url = format!("{}/{route}", self.base_url);
        url::Url::parse(&url)
            .map(String::from)
            .map_err(|e| ApiError::InvalidUrl {
                url,
                reason: e.to_string(),
            })
    }

    fn read(&self, route: &str) -> Result<HttpRequest, ApiError> {
        Ok(HttpRequest {
            method: HttpMethod::Get,
            path: self.url(route)?,
            headers: vec![("authorization".to_string(), self.credential.authorization())],
            body: None,
        })
    }

    fn write<B: Serialize>(
        &self,
        method: HttpMethod,
        route: &str,
        input: &B,
    ) -> Result<HttpRequest, ApiError> {
        let path = self.url(route)?;
        let body =
            serde_json::to_string(input).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        Ok(HttpRequest {
            method,
            path,
            headers: vec![
                ("authorization".to_string(), self.credential.authorization()),
                ("content-type".to_string(), "application/json".to_string()),
            ],
            body: Some(body),
        })
    }

    fn remove(&self, route: &str) -> Result<HttpRequest, ApiError> {
        Ok(HttpRequest {
            method: HttpMethod::Delete,
            ..self.read(route)?
        })
    }

    // -- collections --------------------------------------------------------

    pub fn build_get_root_collections(&self) -> Result<HttpRequest, ApiError> {
        self.read("collections/")
    }

    pub fn build_get_child_collections(&self) -> Result<HttpRequest, ApiError> {
        self.read("collections/childrens")
    }

    pub fn build_get_collection(&self, id: i64) -> Result<HttpRequest, ApiError> {
        self.read(&format!("collection/{id}"))
    }

    pub fn build_create_collection(&self, input: &Collection) -> Result<HttpRequest, ApiError> {
        self.write(HttpMethod::Post, "collection/", input)
    }

    pub fn build_update_collection(
        &self,
        id: i64,
        input: &Collection,
    ) -> Result<HttpRequest, ApiError> {
        self.write(HttpMethod::Put, &format!("collection/{id}"), input)
    }

    pub fn build_delete_collection(&self, id: i64) -> Result<HttpRequest, ApiError> {
        self.remove(&format!("collection/{id}"))
    }

    pub fn build_delete_collections(&self, input: &IdList) -> Result<HttpRequest, ApiError> {
        self.write(HttpMethod::Delete, "collections/", input)
    }

    // -- raindrops ----------------------------------------------------------

    pub fn build_get_raindrop(&self, id: i64) -> Result<HttpRequest, ApiError> {
        self.read(&format!("raindrop/{id}"))
    }

    pub fn build_create_raindrop(&self, input: &Raindrop) -> Result<HttpRequest, ApiError> {
        self.write(HttpMethod::Post, "raindrop/", input)
    }

    pub fn build_update_raindrop(&self, id: i64, input: &Raindrop) -> Result<HttpRequest, ApiError> {
        self.write(HttpMethod::Put, &format!("raindrop/{id}"), input)
    }

    pub fn build_delete_raindrop(&self, id: i64) -> Result<HttpRequest, ApiError> {
        self.remove(&format!("raindrop/{id}"))
    }

    pub fn build_get_raindrops(&self, filter: &Filter) -> Result<HttpRequest, ApiError> {
        self.read(&format!(
            "raindrops/{}{}",
            filter.collection_id,
            filter.query_string()
        ))
    }

    pub fn build_create_raindrops(
        &self,
        collection_id: i64,
        input: &RaindropList,
    ) -> Result<HttpRequest, ApiError> {
        self.write(HttpMethod::Post, &format!("raindrops/{collection_id}"), input)
    }

    pub fn build_update_raindrops(
        &self,
        collection_id: i64,
        input: &BulkUpdate,
    ) -> Result<HttpRequest, ApiError> {
        self.write(HttpMethod::Put, &format!("raindrops/{collection_id}"), input)
    }

    pub fn build_delete_raindrops(
        &self,
        collection_id: i64,
        input: &IdList,
    ) -> Result<HttpRequest, ApiError> {
        self.write(HttpMethod::Delete, &format!("raindrops/{collection_id}"), input)
    }

    // -- suggestions and highlights -----------------------------------------

    pub fn build_suggest_for_link(&self, input: &LinkBody) -> Result<HttpRequest, ApiError> {
        self.write(HttpMethod::Post, "raindrop/suggest/", input)
    }

    pub fn build_suggest_for_raindrop(&self, id: i64) -> Result<HttpRequest, ApiError> {
        self.read(&format!("raindrop/{id}/suggest/"))
    }

    /// Highlights across all collections, or one collection when the filter
    /// names it.
    pub fn build_get_highlights(&self, filter: &Filter) -> Result<HttpRequest, ApiError> {
        let route = if filter.collection_id == 0 {
            "highlights".to_string()
        } else {
            format!("highlights/{}", filter.collection_id)
        };
        self.read(&format!("{route}{}", filter.query_string()))
    }
}

impl<T: Transport> RaindropClient<T> {
    /// Send a built request, capturing any failure in the wrapper.
    pub fn execute(&self, request: Result<HttpRequest, ApiError>) -> OperationResponse {
        let request = match request {
            Ok(request) => request,
            Err(e) => {
                warn!(error = %e, "request construction failed");
                return OperationResponse::from_error(e);
            }
        };

        debug!(
            method = %request.method,
            path = %request.path,
            body_len = request.body.as_ref().map_or(0, String::len),
            "dispatching request"
        );
        let outcome = self.transport.send(&request);
        match &outcome {
            Ok(response) => debug!(status = response.status, path = %request.path, "response received"),
            Err(e) => warn!(error = %e, path = %request.path, "request failed"),
        }
        OperationResponse::from(outcome)
    }

    pub fn get_root_collections(&self) -> OperationResponse {
        self.execute(self.build_get_root_collections())
    }

    pub fn get_child_collections(&self) -> OperationResponse {
        self.execute(self.build_get_child_collections())
    }

    pub fn get_collection(&self, id: i64) -> OperationResponse {
        self.execute(self.build_get_collection(id))
    }

    pub fn create_collection(&self, input: &Collection) -> OperationResponse {
        self.execute(self.build_create_collection(input))
    }

    pub fn update_collection(&self, id: i64, input: &Collection) -> OperationResponse {
        self.execute(self.build_update_collection(id, input))
    }

    pub fn delete_collection(&self, id: i64) -> OperationResponse {
        self.execute(self.build_delete_collection(id))
    }

    pub fn delete_collections(&self, input: &IdList) -> OperationResponse {
        self.execute(self.build_delete_collections(input))
    }

    pub fn get_raindrop(&self, id: i64) -> OperationResponse {
        self.execute(self.build_get_raindrop(id))
    }

    pub fn create_raindrop(&self, input: &Raindrop) -> OperationResponse {
        self.execute(self.build_create_raindrop(input))
    }

    pub fn update_raindrop(&self, id: i64, input: &Raindrop) -> OperationResponse {
        self.execute(self.build_update_raindrop(id, input))
    }

    pub fn delete_raindrop(&self, id: i64) -> OperationResponse {
        self.execute(self.build_delete_raindrop(id))
    }

    pub fn get_raindrops(&self, filter: &Filter) -> OperationResponse {
        self.execute(self.build_get_raindrops(filter))
    }

    pub fn create_raindrops(&self, collection_id: i64, input: &RaindropList) -> OperationResponse {
        self.execute(self.build_create_raindrops(collection_id, input))
    }

    pub fn update_raindrops(&self, collection_id: i64, input: &BulkUpdate) -> OperationResponse {
        self.execute(self.build_update_raindrops(collection_id, input))
    }

    pub fn delete_raindrops(&self, collection_id: i64, input: &IdList) -> OperationResponse {
        self.execute(self.build_delete_raindrops(collection_id, input))
    }

    pub fn suggest_for_link(&self, input: &LinkBody) -> OperationResponse {
        self.execute(self.build_suggest_for_link(input))
    }

    pub fn suggest_for_raindrop(&self, id: i64) -> OperationResponse {
        self.execute(self.build_suggest_for_raindrop(id))
    }

    pub fn get_highlights(&self, filter: &Filter) -> OperationResponse {
        self.execute(self.build_get_highlights(filter))
    }
}
