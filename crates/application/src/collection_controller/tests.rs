use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::sync::{Mutex, oneshot};

use partilha_core::classification::{
    LOAD_FAILURE_MESSAGE, NETWORK_ERROR_MESSAGE, UNKNOWN_ERROR_MESSAGE,
};
use partilha_core::{ErrorKind, GatewayError};
use partilha_domain::{
    EntityId, FilterSet, PageInfo, RecordStatus, RequestDescriptor, StatusValue, Store,
};

use crate::collection_ports::{CollectionGateway, Mutation, MutationKind, ResponseEnvelope};

use super::{CollectionController, CollectionPhase, CollectionQuery};

type GatewayResult = Result<ResponseEnvelope, GatewayError>;

enum Scripted {
    Ready(GatewayResult),
    Gated(oneshot::Receiver<GatewayResult>),
}

#[derive(Default)]
struct ScriptedGateway {
    listings: Mutex<VecDeque<Scripted>>,
    mutation_results: Mutex<VecDeque<GatewayResult>>,
    executed: Mutex<Vec<RequestDescriptor>>,
    mutations: Mutex<Vec<Mutation>>,
}

impl ScriptedGateway {
    async fn push_listing(&self, result: GatewayResult) {
        self.listings.lock().await.push_back(Scripted::Ready(result));
    }

    async fn push_gated_listing(&self) -> oneshot::Sender<GatewayResult> {
        let (sender, receiver) = oneshot::channel();
        self.listings
            .lock()
            .await
            .push_back(Scripted::Gated(receiver));
        sender
    }

    async fn push_mutation(&self, result: GatewayResult) {
        self.mutation_results.lock().await.push_back(result);
    }

    async fn executed(&self) -> Vec<RequestDescriptor> {
        self.executed.lock().await.clone()
    }
}

#[async_trait]
impl CollectionGateway for ScriptedGateway {
    async fn execute(
        &self,
        resource: &str,
        descriptor: &RequestDescriptor,
    ) -> Result<ResponseEnvelope, GatewayError> {
        assert_eq!(resource, "stores");
        self.executed.lock().await.push(descriptor.clone());
        let next = self.listings.lock().await.pop_front();

        match next {
            Some(Scripted::Ready(result)) => result,
            Some(Scripted::Gated(receiver)) => receiver
                .await
                .unwrap_or_else(|_| Err(GatewayError::Unknown("gate dropped".to_owned()))),
            None => Ok(ResponseEnvelope::ok(Vec::new())),
        }
    }

    async fn mutate(
        &self,
        _resource: &str,
        mutation: Mutation,
    ) -> Result<ResponseEnvelope, GatewayError> {
        self.mutations.lock().await.push(mutation);
        self.mutation_results
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Ok(ResponseEnvelope::ok(Vec::new())))
    }
}

fn store(id: i64, status: RecordStatus) -> Value {
    json!({
        "id": id,
        "name": format!("Loja {id}"),
        "state": "SP",
        "status": status.as_str(),
    })
}

fn three_active_stores() -> ResponseEnvelope {
    ResponseEnvelope::ok(vec![
        store(1, RecordStatus::Ativa),
        store(2, RecordStatus::Ativa),
        store(3, RecordStatus::Ativa),
    ])
    .with_pagination(PageInfo::cursor(1, 20, 3, None, None))
}

fn controller(gateway: &Arc<ScriptedGateway>) -> CollectionController<Store> {
    CollectionController::new(gateway.clone(), CollectionQuery::default())
}

fn active_filter() -> FilterSet {
    FilterSet::default().with_status(RecordStatus::Ativa)
}

#[tokio::test]
async fn controller_starts_loading_with_default_pagination() {
    let gateway = Arc::new(ScriptedGateway::default());
    let controller = controller(&gateway);

    let state = controller.state().await;
    assert_eq!(state.phase(), CollectionPhase::Loading);
    assert!(state.items().is_empty());
    assert_eq!(state.pagination().limit(), 20);
    assert!(gateway.executed().await.is_empty());
}

#[tokio::test]
async fn fetch_with_status_filter_commits_items_and_pagination() {
    let gateway = Arc::new(ScriptedGateway::default());
    gateway.push_listing(Ok(three_active_stores())).await;
    let controller = controller(&gateway);

    controller.fetch(active_filter(), 1).await;

    let state = controller.state().await;
    assert_eq!(state.phase(), CollectionPhase::Ready);
    assert_eq!(state.items().len(), 3);
    assert_eq!(state.pagination().total_pages(), 1);
    assert!(state.error().is_none());

    let executed = gateway.executed().await;
    assert_eq!(executed.len(), 1);
    assert_eq!(executed[0].get("status"), Some("Ativa"));
    assert_eq!(executed[0].page(), Some(1));
    assert_eq!(executed[0].page_size(), Some(20));
}

#[tokio::test]
async fn network_failure_keeps_previous_items() {
    let gateway = Arc::new(ScriptedGateway::default());
    gateway.push_listing(Ok(three_active_stores())).await;
    gateway
        .push_listing(Err(GatewayError::Network("connection reset".to_owned())))
        .await;
    let controller = controller(&gateway);

    controller.fetch(active_filter(), 1).await;
    controller.fetch(active_filter(), 2).await;

    let state = controller.state().await;
    assert_eq!(state.phase(), CollectionPhase::Failed);
    assert_eq!(state.error(), Some(NETWORK_ERROR_MESSAGE));
    assert_eq!(state.items().len(), 3);
}

#[tokio::test]
async fn rejected_listing_without_message_uses_generic_sentence() {
    let gateway = Arc::new(ScriptedGateway::default());
    gateway.push_listing(Ok(ResponseEnvelope::failed(None))).await;
    let controller = controller(&gateway);

    controller.refresh().await;

    let state = controller.state().await;
    assert_eq!(state.phase(), CollectionPhase::Failed);
    assert_eq!(state.error(), Some(LOAD_FAILURE_MESSAGE));
}

#[tokio::test]
async fn rejected_listing_surfaces_server_message() {
    let gateway = Arc::new(ScriptedGateway::default());
    gateway
        .push_listing(Ok(ResponseEnvelope::failed(Some(
            "Filtro de regional inválido".to_owned(),
        ))))
        .await;
    let controller = controller(&gateway);

    controller.refresh().await;

    let state = controller.state().await;
    assert_eq!(state.error(), Some("Filtro de regional inválido"));
}

#[tokio::test]
async fn http_failure_renders_localized_sentence() {
    let gateway = Arc::new(ScriptedGateway::default());
    gateway
        .push_listing(Err(GatewayError::Http {
            status: 403,
            status_text: "Forbidden".to_owned(),
            server_message: Some("role admin required".to_owned()),
        }))
        .await;
    let controller = controller(&gateway);

    controller.refresh().await;

    let state = controller.state().await;
    assert_eq!(
        state.error(),
        Some("Você não tem permissão para realizar esta ação.")
    );
}

#[tokio::test]
async fn missing_pagination_keeps_previous_metadata() {
    let gateway = Arc::new(ScriptedGateway::default());
    gateway.push_listing(Ok(three_active_stores())).await;
    gateway
        .push_listing(Ok(ResponseEnvelope::ok(vec![store(4, RecordStatus::Inativa)])))
        .await;
    let controller = controller(&gateway);

    controller.fetch(active_filter(), 1).await;
    controller.fetch(FilterSet::default(), 1).await;

    let state = controller.state().await;
    assert_eq!(state.phase(), CollectionPhase::Ready);
    assert_eq!(state.items().len(), 1);
    assert_eq!(state.pagination().total(), 3);
}

#[tokio::test]
async fn undecodable_items_fail_without_replacing_data() {
    let gateway = Arc::new(ScriptedGateway::default());
    gateway.push_listing(Ok(three_active_stores())).await;
    gateway
        .push_listing(Ok(ResponseEnvelope::ok(vec![json!({"id": "x"})])))
        .await;
    let controller = controller(&gateway);

    controller.fetch(FilterSet::default(), 1).await;
    controller.fetch(FilterSet::default(), 2).await;

    let state = controller.state().await;
    assert_eq!(state.phase(), CollectionPhase::Failed);
    assert_eq!(state.error(), Some(UNKNOWN_ERROR_MESSAGE));
    assert_eq!(state.items().len(), 3);
}

#[tokio::test]
async fn create_conflict_is_returned_and_state_is_untouched() {
    let gateway = Arc::new(ScriptedGateway::default());
    gateway.push_listing(Ok(three_active_stores())).await;
    gateway
        .push_mutation(Err(GatewayError::Http {
            status: 409,
            status_text: "Conflict".to_owned(),
            server_message: Some("cnpj already registered".to_owned()),
        }))
        .await;
    let controller = controller(&gateway);
    controller.fetch(active_filter(), 1).await;
    let before = controller.state().await;

    let result = controller
        .create(&json!({"name": "Loja Nova", "status": "Pendente"}))
        .await;

    assert!(result.is_err());
    let error = result.err().unwrap_or_else(|| unreachable!());
    assert_eq!(error.status(), 409);
    assert_eq!(
        error.user_message(),
        "Conflito: já existe um registro com estes dados."
    );
    assert_eq!(controller.state().await, before);
    assert!(controller.state().await.error().is_none());
    assert_eq!(gateway.executed().await.len(), 1);
}

#[tokio::test]
async fn successful_delete_reloads_active_query_once() {
    let gateway = Arc::new(ScriptedGateway::default());
    gateway.push_listing(Ok(three_active_stores())).await;
    gateway
        .push_listing(Ok(ResponseEnvelope::ok(vec![
            store(1, RecordStatus::Ativa),
            store(2, RecordStatus::Ativa),
        ])))
        .await;
    let controller = controller(&gateway);
    controller.fetch(active_filter(), 2).await;

    let result = controller.delete(&EntityId::Numeric(3)).await;

    assert!(result.is_ok());
    let executed = gateway.executed().await;
    assert_eq!(executed.len(), 2);
    assert_eq!(executed[0], executed[1]);
    assert_eq!(controller.state().await.items().len(), 2);

    let mutations = gateway.mutations.lock().await.clone();
    assert_eq!(mutations.len(), 1);
    assert_eq!(mutations[0].kind, MutationKind::Delete);
    assert_eq!(mutations[0].entity_id, Some(EntityId::Numeric(3)));
    assert!(mutations[0].payload.is_none());
}

#[tokio::test]
async fn update_sends_identifier_and_payload() {
    let gateway = Arc::new(ScriptedGateway::default());
    let controller = controller(&gateway);

    let result = controller
        .update(&EntityId::Numeric(8), &json!({"status": "Inativa"}))
        .await;

    assert!(result.is_ok());
    let mutations = gateway.mutations.lock().await.clone();
    assert_eq!(mutations[0].kind, MutationKind::Update);
    assert_eq!(mutations[0].payload, Some(json!({"status": "Inativa"})));
    assert_eq!(gateway.executed().await.len(), 1);
}

#[tokio::test]
async fn rejected_mutation_envelope_is_an_error() {
    let gateway = Arc::new(ScriptedGateway::default());
    gateway
        .push_mutation(Ok(ResponseEnvelope::failed(Some(
            "Loja já vinculada".to_owned(),
        ))))
        .await;
    let controller = controller(&gateway);

    let result = controller.create(&json!({"name": "X"})).await;

    assert!(result.is_err());
    let error = result.err().unwrap_or_else(|| unreachable!());
    assert_eq!(error.kind(), ErrorKind::Unknown);
    assert_eq!(error.user_message(), "Loja já vinculada");
    assert!(gateway.executed().await.is_empty());
}

#[tokio::test]
async fn unauthenticated_mutation_maps_to_reauthentication() {
    let gateway = Arc::new(ScriptedGateway::default());
    gateway.push_mutation(Err(GatewayError::Unauthenticated)).await;
    let controller = controller(&gateway);

    let result = controller.delete(&EntityId::Numeric(1)).await;

    let error = result.err().unwrap_or_else(|| unreachable!());
    assert_eq!(error.kind(), ErrorKind::Unauthenticated);
}

#[tokio::test]
async fn sync_compares_filters_by_value() {
    let gateway = Arc::new(ScriptedGateway::default());
    let controller = controller(&gateway);

    assert!(controller.sync(active_filter(), 1).await);
    assert!(!controller.sync(active_filter(), 1).await);
    assert!(controller.sync(active_filter(), 2).await);
    assert!(
        controller
            .sync(active_filter().with_search("centro"), 2)
            .await
    );

    assert_eq!(gateway.executed().await.len(), 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_syncs_with_one_query_issue_one_fetch() {
    let gateway = Arc::new(ScriptedGateway::default());
    let controller = Arc::new(controller(&gateway));

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let controller = controller.clone();
            tokio::spawn(async move { controller.sync(active_filter(), 1).await })
        })
        .collect();

    let mut issued = 0;
    for task in tasks {
        if task.await.unwrap_or(false) {
            issued += 1;
        }
    }

    assert_eq!(issued, 1);
    assert_eq!(gateway.executed().await.len(), 1);
}

#[tokio::test]
async fn refresh_before_any_fetch_uses_initial_query() {
    let gateway = Arc::new(ScriptedGateway::default());
    let controller: CollectionController<Store> = CollectionController::new(
        gateway.clone(),
        CollectionQuery::new(FilterSet::default().with_search("norte"), 3),
    )
    .with_page_size(50);

    controller.refresh().await;

    let executed = gateway.executed().await;
    assert_eq!(executed[0].get("search"), Some("norte"));
    assert_eq!(executed[0].page(), Some(3));
    assert_eq!(executed[0].page_size(), Some(50));
}

#[tokio::test]
async fn stale_response_does_not_overwrite_newer_state() {
    let gateway = Arc::new(ScriptedGateway::default());
    let gate = gateway.push_gated_listing().await;
    gateway
        .push_listing(Ok(ResponseEnvelope::ok(vec![store(9, RecordStatus::Pendente)])))
        .await;
    let controller = Arc::new(controller(&gateway));

    let slow = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.fetch(FilterSet::default(), 1).await })
    };
    while gateway.executed().await.is_empty() {
        tokio::task::yield_now().await;
    }

    controller.fetch(FilterSet::default(), 2).await;
    let _ = gate.send(Ok(three_active_stores()));
    assert!(slow.await.is_ok());

    let state = controller.state().await;
    assert_eq!(state.phase(), CollectionPhase::Ready);
    assert_eq!(state.items().len(), 1);
    assert_eq!(state.items()[0].id, 9);
    assert_eq!(controller.active_query().await.page, 2);
}

#[tokio::test]
async fn stats_count_current_items_without_fetching() {
    let gateway = Arc::new(ScriptedGateway::default());
    gateway
        .push_listing(Ok(ResponseEnvelope::ok(vec![
            store(1, RecordStatus::Ativa),
            store(2, RecordStatus::Inativa),
            store(3, RecordStatus::Pendente),
            store(4, RecordStatus::Ativa),
        ])))
        .await;
    let controller = controller(&gateway);
    controller.refresh().await;

    let stats = controller.stats().await;

    assert_eq!(stats.total(), 4);
    assert_eq!(stats.count(RecordStatus::Ativa), 2);
    assert_eq!(
        stats.count(RecordStatus::Ativa)
            + stats.count(RecordStatus::Inativa)
            + stats.count(RecordStatus::Pendente),
        stats.total()
    );
    assert_eq!(gateway.executed().await.len(), 1);
}
