//! Collection controller: the list/filter/mutate state machine shared by every
//! entity page.
//!
//! Reads settle into [`CollectionState`]; writes return their error to the
//! caller and leave the state alone. Overlapping fetches are fenced by a
//! sequence number so only the most recently issued one commits.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use partilha_core::classification::{LOAD_FAILURE_MESSAGE, UNKNOWN_ERROR_MESSAGE};
use partilha_core::{ClassifiedError, GatewayError, classify};
use partilha_domain::{
    CollectionEntity, DEFAULT_PAGE_SIZE, EntityId, FilterSet, PageInfo, RequestDescriptor,
    StatusTally,
};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::collection_ports::{CollectionGateway, Mutation, ResponseEnvelope};

/// Lifecycle phase of one collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionPhase {
    /// A fetch is outstanding (also the initial phase).
    Loading,
    /// The last fetch committed data.
    Ready,
    /// The last fetch failed; items may be stale.
    Failed,
}

/// Snapshot of one collection as rendered by consumers.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionState<E> {
    items: Vec<E>,
    phase: CollectionPhase,
    error: Option<String>,
    pagination: PageInfo,
}

impl<E> CollectionState<E> {
    fn initial(page_size: u32) -> Self {
        Self {
            items: Vec::new(),
            phase: CollectionPhase::Loading,
            error: None,
            pagination: PageInfo::numbered(1, page_size, 0, None),
        }
    }

    /// Returns the last committed records.
    #[must_use]
    pub fn items(&self) -> &[E] {
        &self.items
    }

    /// Returns the lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> CollectionPhase {
        self.phase
    }

    /// Returns whether a fetch is outstanding.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.phase == CollectionPhase::Loading
    }

    /// Returns the localized error of the last failed fetch.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Returns the last known pagination metadata.
    #[must_use]
    pub fn pagination(&self) -> &PageInfo {
        &self.pagination
    }
}

/// Filter and page of one listing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionQuery {
    /// Consumer filters.
    pub filter: FilterSet,
    /// One-based page number.
    pub page: u32,
}

impl CollectionQuery {
    /// Creates a query for one page.
    #[must_use]
    pub fn new(filter: FilterSet, page: u32) -> Self {
        Self {
            filter,
            page: page.max(1),
        }
    }

    fn descriptor(&self, default_page_size: u32) -> RequestDescriptor {
        let page_size = self.filter.page_size.unwrap_or(default_page_size);
        let filter = self
            .filter
            .clone()
            .with_page(self.page)
            .with_page_size(page_size);

        RequestDescriptor::build(&filter)
    }
}

impl Default for CollectionQuery {
    fn default() -> Self {
        Self::new(FilterSet::default(), 1)
    }
}

#[derive(Debug)]
struct QueryHistory {
    initial: CollectionQuery,
    last_issued: Option<CollectionQuery>,
}

impl QueryHistory {
    fn active(&self) -> CollectionQuery {
        self.last_issued
            .clone()
            .unwrap_or_else(|| self.initial.clone())
    }
}

/// Stateful controller for one entity collection.
pub struct CollectionController<E: CollectionEntity> {
    gateway: Arc<dyn CollectionGateway>,
    page_size: u32,
    state: RwLock<CollectionState<E>>,
    queries: Mutex<QueryHistory>,
    issued: AtomicU64,
}

impl<E: CollectionEntity> CollectionController<E> {
    /// Creates a controller whose first fetch will use `initial`.
    #[must_use]
    pub fn new(gateway: Arc<dyn CollectionGateway>, initial: CollectionQuery) -> Self {
        Self {
            gateway,
            page_size: DEFAULT_PAGE_SIZE,
            state: RwLock::new(CollectionState::initial(DEFAULT_PAGE_SIZE)),
            queries: Mutex::new(QueryHistory {
                initial,
                last_issued: None,
            }),
            issued: AtomicU64::new(0),
        }
    }

    /// Overrides the page size used when filters do not choose one.
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        let page_size = page_size.max(1);
        self.page_size = page_size;
        self.state = RwLock::new(CollectionState::initial(page_size));
        self
    }

    /// Returns the resource path this controller manages.
    #[must_use]
    pub fn resource(&self) -> &'static str {
        E::RESOURCE
    }

    /// Returns a snapshot of the current state.
    pub async fn state(&self) -> CollectionState<E> {
        self.state.read().await.clone()
    }

    /// Counts the current items per status without fetching.
    pub async fn stats(&self) -> StatusTally<E::Status> {
        StatusTally::of(self.state.read().await.items())
    }

    /// Returns the query the next refresh would issue.
    pub async fn active_query(&self) -> CollectionQuery {
        self.queries.lock().await.active()
    }

    /// Fetches one page and commits the outcome.
    pub async fn fetch(&self, filter: FilterSet, page: u32) {
        self.run(CollectionQuery::new(filter, page)).await;
    }

    /// Fetches only when filter or page differ by value from the last fetch.
    ///
    /// Returns whether a fetch was issued.
    pub async fn sync(&self, filter: FilterSet, page: u32) -> bool {
        let query = CollectionQuery::new(filter, page);
        let descriptor = query.descriptor(self.page_size);
        let Some(sequence) = self.begin(query, Issue::IfChanged).await else {
            return false;
        };

        self.complete(&descriptor, sequence).await;
        true
    }

    /// Re-runs the last issued query, or the initial one before any fetch.
    pub async fn refresh(&self) {
        let query = self.active_query().await;
        self.run(query).await;
    }

    /// Creates a record and reloads the collection on success.
    pub async fn create<P>(&self, payload: &P) -> Result<(), ClassifiedError>
    where
        P: Serialize + Sync,
    {
        let payload = encode_payload(payload)?;
        self.mutate(Mutation::create(payload)).await
    }

    /// Updates a record and reloads the collection on success.
    pub async fn update<P>(&self, id: &EntityId, payload: &P) -> Result<(), ClassifiedError>
    where
        P: Serialize + Sync,
    {
        let payload = encode_payload(payload)?;
        self.mutate(Mutation::update(id.clone(), payload)).await
    }

    /// Deletes a record and reloads the collection on success.
    pub async fn delete(&self, id: &EntityId) -> Result<(), ClassifiedError> {
        self.mutate(Mutation::delete(id.clone())).await
    }

    async fn mutate(&self, mutation: Mutation) -> Result<(), ClassifiedError> {
        let kind = mutation.kind;
        let outcome = self
            .gateway
            .mutate(E::RESOURCE, mutation)
            .await
            .and_then(ResponseEnvelope::into_result);

        match outcome {
            Ok(_) => {
                debug!(resource = E::RESOURCE, kind = ?kind, "mutation applied, reloading");
                self.refresh().await;
                Ok(())
            }
            Err(error) => {
                warn!(
                    resource = E::RESOURCE,
                    kind = ?kind,
                    error = %error,
                    "collection mutation failed"
                );
                Err(classify(error))
            }
        }
    }

    async fn run(&self, query: CollectionQuery) {
        let descriptor = query.descriptor(self.page_size);
        if let Some(sequence) = self.begin(query, Issue::Always).await {
            self.complete(&descriptor, sequence).await;
        }
    }

    async fn complete(&self, descriptor: &RequestDescriptor, sequence: u64) {
        debug!(
            resource = E::RESOURCE,
            sequence,
            params = ?descriptor.params(),
            "fetching collection"
        );
        let outcome = self.gateway.execute(E::RESOURCE, descriptor).await;
        let settlement = settle::<E>(outcome);

        let mut state = self.state.write().await;
        if sequence != self.issued.load(Ordering::SeqCst) {
            debug!(
                resource = E::RESOURCE,
                sequence, "discarding stale collection response"
            );
            return;
        }

        match settlement {
            Settlement::Loaded { items, pagination } => {
                state.items = items;
                if let Some(pagination) = pagination {
                    state.pagination = pagination;
                }
                state.error = None;
                state.phase = CollectionPhase::Ready;
            }
            Settlement::Failed(message) => {
                state.error = Some(message);
                state.phase = CollectionPhase::Failed;
            }
        }
    }

    async fn begin(&self, query: CollectionQuery, issue: Issue) -> Option<u64> {
        // Comparison, sequence, active query and phase change together under
        // the state lock.
        let mut state = self.state.write().await;
        let mut queries = self.queries.lock().await;
        if issue == Issue::IfChanged && queries.last_issued.as_ref() == Some(&query) {
            return None;
        }

        queries.last_issued = Some(query);
        let sequence = self.issued.fetch_add(1, Ordering::SeqCst) + 1;

        state.phase = CollectionPhase::Loading;
        state.error = None;

        Some(sequence)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Issue {
    Always,
    IfChanged,
}

enum Settlement<E> {
    Loaded {
        items: Vec<E>,
        pagination: Option<PageInfo>,
    },
    Failed(String),
}

fn settle<E: CollectionEntity>(
    outcome: Result<ResponseEnvelope, GatewayError>,
) -> Settlement<E> {
    let envelope = match outcome {
        Ok(envelope) => envelope,
        Err(error) => {
            warn!(resource = E::RESOURCE, error = %error, "collection fetch failed");
            return Settlement::Failed(classify(error).user_message());
        }
    };

    if !envelope.success {
        warn!(
            resource = E::RESOURCE,
            message = envelope.message.as_deref().unwrap_or_default(),
            "collection fetch rejected"
        );
        let message = envelope
            .message
            .filter(|message| !message.trim().is_empty())
            .unwrap_or_else(|| LOAD_FAILURE_MESSAGE.to_owned());
        return Settlement::Failed(message);
    }

    let items = envelope
        .data
        .into_iter()
        .map(serde_json::from_value::<E>)
        .collect::<Result<Vec<_>, _>>();

    match items {
        Ok(items) => Settlement::Loaded {
            items,
            pagination: envelope.pagination,
        },
        Err(error) => {
            warn!(
                resource = E::RESOURCE,
                error = %error,
                "collection payload did not match the entity shape"
            );
            Settlement::Failed(UNKNOWN_ERROR_MESSAGE.to_owned())
        }
    }
}

fn encode_payload<P: Serialize>(payload: &P) -> Result<Value, ClassifiedError> {
    serde_json::to_value(payload).map_err(|error| {
        classify(GatewayError::Unknown(format!(
            "failed to encode mutation payload: {error}"
        )))
    })
}

#[cfg(test)]
mod tests;
