//! Debounced OSC search used by partnership forms.

use std::sync::Arc;
use std::time::Duration;

use partilha_core::classify;
use partilha_domain::{CollectionEntity, FilterSet, Osc, RequestDescriptor};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::collection_ports::{CollectionGateway, ResponseEnvelope};
use crate::debounce::Debouncer;

/// Quiet period between the last keystroke and the lookup.
pub const OSC_LOOKUP_DELAY: Duration = Duration::from_millis(500);

/// Shortest trimmed query that triggers a lookup.
pub const OSC_LOOKUP_MIN_CHARS: usize = 2;

const OSC_LOOKUP_LIMIT: u32 = 10;

/// Published state of the OSC lookup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OscLookupState {
    /// Trimmed query the state belongs to.
    pub query: String,
    /// Matching organizations.
    pub results: Vec<Osc>,
    /// Whether a lookup for `query` is scheduled or in flight.
    pub loading: bool,
    /// Localized error of the last lookup.
    pub error: Option<String>,
}

/// Search-as-you-type lookup over the OSC collection.
pub struct OscLookupService {
    gateway: Arc<dyn CollectionGateway>,
    debouncer: Debouncer,
    delay: Duration,
    state: Arc<watch::Sender<OscLookupState>>,
}

impl OscLookupService {
    /// Creates a lookup service with the default quiet period.
    #[must_use]
    pub fn new(gateway: Arc<dyn CollectionGateway>) -> Self {
        let (state, _) = watch::channel(OscLookupState::default());
        Self {
            gateway,
            debouncer: Debouncer::new(),
            delay: OSC_LOOKUP_DELAY,
            state: Arc::new(state),
        }
    }

    /// Overrides the quiet period.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Subscribes to lookup state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<OscLookupState> {
        self.state.subscribe()
    }

    /// Returns the current lookup state.
    #[must_use]
    pub fn current(&self) -> OscLookupState {
        self.state.borrow().clone()
    }

    /// Records a new query and schedules its lookup after the quiet period.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn query_changed(&self, query: &str) {
        let query = query.trim().to_owned();

        if query.chars().count() < OSC_LOOKUP_MIN_CHARS {
            self.debouncer.cancel_pending();
            self.state.send_replace(OscLookupState {
                query,
                ..OscLookupState::default()
            });
            return;
        }

        self.state.send_modify(|state| {
            state.query = query.clone();
            state.loading = true;
            state.error = None;
        });

        let gateway = Arc::clone(&self.gateway);
        let state = Arc::clone(&self.state);
        self.debouncer
            .schedule(self.delay, lookup(gateway, state, query));
    }

    /// Cancels a scheduled lookup that has not started yet.
    pub fn cancel(&self) {
        self.debouncer.cancel_pending();
        self.state.send_modify(|state| state.loading = false);
    }
}

async fn lookup(
    gateway: Arc<dyn CollectionGateway>,
    state: Arc<watch::Sender<OscLookupState>>,
    query: String,
) {
    let descriptor = RequestDescriptor::build(
        &FilterSet::default()
            .with_search(query.as_str())
            .with_page(1)
            .with_page_size(OSC_LOOKUP_LIMIT),
    );
    debug!(query = %query, "looking up OSCs");

    let outcome = gateway
        .execute(Osc::RESOURCE, &descriptor)
        .await
        .and_then(ResponseEnvelope::into_result);

    let (results, error) = match outcome {
        Ok(envelope) => {
            let results = envelope
                .data
                .into_iter()
                .filter_map(|value| match serde_json::from_value::<Osc>(value) {
                    Ok(osc) => Some(osc),
                    Err(error) => {
                        warn!(error = %error, "skipping OSC lookup result with unexpected shape");
                        None
                    }
                })
                .collect();
            (results, None)
        }
        Err(error) => {
            warn!(query = %query, error = %error, "OSC lookup failed");
            (Vec::new(), Some(classify(error).user_message()))
        }
    };

    state.send_if_modified(|current| {
        if current.query != query {
            return false;
        }

        current.results = results;
        current.loading = false;
        current.error = error;
        true
    });
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use partilha_core::GatewayError;
    use partilha_domain::RequestDescriptor;
    use serde_json::json;
    use tokio::sync::Mutex;

    use super::{OscLookupService, OscLookupState};
    use crate::collection_ports::{CollectionGateway, Mutation, ResponseEnvelope};

    #[derive(Default)]
    struct RecordingGateway {
        searches: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl CollectionGateway for RecordingGateway {
        async fn execute(
            &self,
            resource: &str,
            descriptor: &RequestDescriptor,
        ) -> Result<ResponseEnvelope, GatewayError> {
            assert_eq!(resource, "oscs");
            let search = descriptor.get("search").unwrap_or_default().to_owned();
            self.searches.lock().await.push(search.clone());
            if self.fail {
                return Err(GatewayError::Network("timeout".to_owned()));
            }

            Ok(ResponseEnvelope::ok(vec![json!({
                "id": 1,
                "name": format!("Instituto {search}"),
                "status": "active"
            })]))
        }

        async fn mutate(
            &self,
            _resource: &str,
            _mutation: Mutation,
        ) -> Result<ResponseEnvelope, GatewayError> {
            Err(GatewayError::Unknown("read-only".to_owned()))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn typing_within_quiet_period_issues_one_lookup() {
        let gateway = Arc::new(RecordingGateway::default());
        let service = OscLookupService::new(gateway.clone());

        service.query_changed("nutr");
        tokio::time::sleep(Duration::from_millis(200)).await;
        service.query_changed("nutri");
        tokio::time::sleep(Duration::from_millis(600)).await;

        assert_eq!(*gateway.searches.lock().await, vec!["nutri".to_owned()]);
        let state = service.current();
        assert_eq!(state.query, "nutri");
        assert!(!state.loading);
        assert_eq!(state.results.len(), 1);
        assert_eq!(state.results[0].name, "Instituto nutri");
    }

    #[tokio::test(start_paused = true)]
    async fn short_queries_clear_results_without_lookup() {
        let gateway = Arc::new(RecordingGateway::default());
        let service = OscLookupService::new(gateway.clone());

        service.query_changed("nutri");
        tokio::time::sleep(Duration::from_millis(100)).await;
        service.query_changed(" n ");
        tokio::time::sleep(Duration::from_millis(600)).await;

        assert!(gateway.searches.lock().await.is_empty());
        assert_eq!(
            service.current(),
            OscLookupState {
                query: "n".to_owned(),
                ..OscLookupState::default()
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn failed_lookup_publishes_localized_error() {
        let gateway = Arc::new(RecordingGateway {
            fail: true,
            ..RecordingGateway::default()
        });
        let service = OscLookupService::new(gateway.clone()).with_delay(Duration::from_millis(50));
        let mut receiver = service.subscribe();

        service.query_changed("banco de alimentos");
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert!(receiver.has_changed().unwrap_or(false));
        let state = receiver.borrow_and_update().clone();
        assert!(state.results.is_empty());
        assert_eq!(
            state.error.as_deref(),
            Some(partilha_core::classification::NETWORK_ERROR_MESSAGE)
        );
    }
}
