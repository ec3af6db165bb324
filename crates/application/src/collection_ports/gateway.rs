use async_trait::async_trait;
use partilha_core::GatewayError;
use partilha_domain::{EntityId, RequestDescriptor};
use serde_json::Value;

use super::ResponseEnvelope;

/// Write operation kinds supported by collection resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    /// Creates a new record.
    Create,
    /// Replaces fields of an existing record.
    Update,
    /// Removes an existing record.
    Delete,
}

/// One write request against a collection resource.
#[derive(Debug, Clone, PartialEq)]
pub struct Mutation {
    /// Operation kind.
    pub kind: MutationKind,
    /// Target record, required for updates and deletes.
    pub entity_id: Option<EntityId>,
    /// JSON body, absent for deletes.
    pub payload: Option<Value>,
}

impl Mutation {
    /// Creates a create request.
    #[must_use]
    pub fn create(payload: Value) -> Self {
        Self {
            kind: MutationKind::Create,
            entity_id: None,
            payload: Some(payload),
        }
    }

    /// Creates an update request.
    #[must_use]
    pub fn update(entity_id: EntityId, payload: Value) -> Self {
        Self {
            kind: MutationKind::Update,
            entity_id: Some(entity_id),
            payload: Some(payload),
        }
    }

    /// Creates a delete request.
    #[must_use]
    pub fn delete(entity_id: EntityId) -> Self {
        Self {
            kind: MutationKind::Delete,
            entity_id: Some(entity_id),
            payload: None,
        }
    }
}

/// Port executing listing and write requests against the remote backend.
#[async_trait]
pub trait CollectionGateway: Send + Sync {
    /// Lists one page of a resource.
    async fn execute(
        &self,
        resource: &str,
        descriptor: &RequestDescriptor,
    ) -> Result<ResponseEnvelope, GatewayError>;

    /// Applies one write request to a resource.
    async fn mutate(
        &self,
        resource: &str,
        mutation: Mutation,
    ) -> Result<ResponseEnvelope, GatewayError>;
}
