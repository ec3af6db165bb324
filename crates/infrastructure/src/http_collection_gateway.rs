use std::sync::Arc;

use async_trait::async_trait;
use partilha_application::{
    CollectionGateway, CredentialProvider, Mutation, MutationKind, ResponseEnvelope,
};
use partilha_core::GatewayError;
use partilha_domain::{EntityId, RequestDescriptor};
use reqwest::{Method, header};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

mod wire;

use wire::WireResponse;

const SERVICE_KEY_HEADER: &str = "apikey";
const SERVER_MESSAGE_FIELDS: [&str; 3] = ["message", "detail", "error"];

/// REST implementation of the collection gateway.
///
/// Resources live at `{base}/{resource}/` and records at
/// `{base}/{resource}/{id}/`. Every request carries the current bearer token;
/// without one the request is never sent.
pub struct HttpCollectionGateway {
    http_client: reqwest::Client,
    base_url: Url,
    credentials: Arc<dyn CredentialProvider>,
    service_key: Option<String>,
    update_method: Method,
}

impl HttpCollectionGateway {
    /// Creates a gateway rooted at `base_url`.
    #[must_use]
    pub fn new(
        http_client: reqwest::Client,
        base_url: Url,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Self {
        Self {
            http_client,
            base_url,
            credentials,
            service_key: None,
            update_method: Method::PUT,
        }
    }

    /// Sends `key` as the `apikey` header on every request.
    #[must_use]
    pub fn with_service_key(mut self, key: impl Into<String>) -> Self {
        self.service_key = Some(key.into());
        self
    }

    /// Sends updates as `PATCH` instead of `PUT`.
    #[must_use]
    pub fn with_patch_updates(mut self) -> Self {
        self.update_method = Method::PATCH;
        self
    }

    fn resource_url(
        &self,
        resource: &str,
        entity_id: Option<&EntityId>,
    ) -> Result<Url, GatewayError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|()| {
                GatewayError::Unknown(format!("base url '{}' cannot hold paths", self.base_url))
            })?;
            segments
                .pop_if_empty()
                .extend(resource.split('/').filter(|segment| !segment.is_empty()));
            if let Some(entity_id) = entity_id {
                segments.push(&entity_id.to_string());
            }
            segments.push("");
        }

        Ok(url)
    }

    async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<&Value>,
        descriptor: Option<&RequestDescriptor>,
    ) -> Result<ResponseEnvelope, GatewayError> {
        let token = self
            .credentials
            .bearer_token()
            .await
            .ok_or(GatewayError::Unauthenticated)?;

        debug!(method = %method, url = %url, "sending collection request");
        let mut request = self
            .http_client
            .request(method.clone(), url.clone())
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(header::ACCEPT, "application/json");
        if let Some(service_key) = &self.service_key {
            request = request.header(SERVICE_KEY_HEADER, service_key);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        // Once the status line arrived, body failures keep the HTTP status.
        let received = response.bytes().await;

        if !status.is_success() {
            let server_message = match &received {
                Ok(bytes) => server_message(bytes),
                Err(error) => {
                    warn!(url = %url, error = %error, "failed to read error response body");
                    None
                }
            };
            warn!(
                method = %method,
                url = %url,
                status = status.as_u16(),
                message = server_message.as_deref().unwrap_or_default(),
                "collection request failed"
            );
            return Err(GatewayError::Http {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_owned(),
                server_message,
            });
        }

        let bytes = received.map_err(transport_error)?;
        decode_body(&bytes, descriptor)
    }
}

#[async_trait]
impl CollectionGateway for HttpCollectionGateway {
    async fn execute(
        &self,
        resource: &str,
        descriptor: &RequestDescriptor,
    ) -> Result<ResponseEnvelope, GatewayError> {
        let mut url = self.resource_url(resource, None)?;
        if !descriptor.params().is_empty() {
            url.query_pairs_mut().extend_pairs(descriptor.params());
        }

        self.send(Method::GET, url, None, Some(descriptor)).await
    }

    async fn mutate(
        &self,
        resource: &str,
        mutation: Mutation,
    ) -> Result<ResponseEnvelope, GatewayError> {
        let method = match mutation.kind {
            MutationKind::Create => Method::POST,
            MutationKind::Update => self.update_method.clone(),
            MutationKind::Delete => Method::DELETE,
        };
        if mutation.kind != MutationKind::Create && mutation.entity_id.is_none() {
            return Err(GatewayError::Unknown(format!(
                "{method} on '{resource}' requires an entity id"
            )));
        }

        let url = self.resource_url(resource, mutation.entity_id.as_ref())?;
        self.send(method, url, mutation.payload.as_ref(), None).await
    }
}

fn transport_error(error: reqwest::Error) -> GatewayError {
    if error.is_builder() {
        return GatewayError::Unknown(format!("invalid collection request: {error}"));
    }

    GatewayError::Network(error.to_string())
}

fn decode_body(
    bytes: &[u8],
    descriptor: Option<&RequestDescriptor>,
) -> Result<ResponseEnvelope, GatewayError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(ResponseEnvelope::ok(Vec::new()));
    }

    let body: Value = serde_json::from_slice(bytes)
        .map_err(|error| GatewayError::Unknown(format!("unexpected response body: {error}")))?;
    let response = WireResponse::from_value(body)
        .map_err(|error| GatewayError::Unknown(format!("unexpected response body: {error}")))?;

    Ok(response.normalize(descriptor))
}

fn server_message(bytes: &[u8]) -> Option<String> {
    let body: Value = serde_json::from_slice(bytes).ok()?;

    SERVER_MESSAGE_FIELDS.iter().find_map(|field| {
        body.get(field)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|message| !message.is_empty())
            .map(ToOwned::to_owned)
    })
}
