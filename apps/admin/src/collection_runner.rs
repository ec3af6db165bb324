use std::sync::Arc;

use partilha_application::{CollectionController, CollectionGateway, CollectionQuery};
use partilha_core::{AppError, AppResult};
use partilha_domain::{
    Campaign, CollectionEntity, Contact, Loja, Osc, Partnership, Regional, Store, StoreExternal,
};
use serde_json::{Value, json};
use tracing::info;

use crate::admin_command::{CollectionAction, Resource};

/// Runs one collection action and returns the JSON to print.
pub async fn run(
    gateway: Arc<dyn CollectionGateway>,
    page_size: u32,
    resource: Resource,
    action: CollectionAction,
) -> AppResult<Value> {
    match resource {
        Resource::Stores => run_entity::<Store>(gateway, page_size, action).await,
        Resource::Lojas => run_entity::<Loja>(gateway, page_size, action).await,
        Resource::Oscs => run_entity::<Osc>(gateway, page_size, action).await,
        Resource::Regionals => run_entity::<Regional>(gateway, page_size, action).await,
        Resource::Partnerships => run_entity::<Partnership>(gateway, page_size, action).await,
        Resource::Campaigns => run_entity::<Campaign>(gateway, page_size, action).await,
        Resource::Contacts => run_entity::<Contact>(gateway, page_size, action).await,
        Resource::StoresExternal => run_entity::<StoreExternal>(gateway, page_size, action).await,
    }
}

async fn run_entity<E: CollectionEntity>(
    gateway: Arc<dyn CollectionGateway>,
    page_size: u32,
    action: CollectionAction,
) -> AppResult<Value> {
    let controller =
        CollectionController::<E>::new(gateway, CollectionQuery::default()).with_page_size(page_size);

    match action {
        CollectionAction::List(filter) => {
            load(&controller, filter).await?;
            let state = controller.state().await;
            Ok(json!({
                "items": state.items(),
                "pagination": state.pagination(),
            }))
        }
        CollectionAction::Stats(filter) => {
            load(&controller, filter).await?;
            serde_json::to_value(controller.stats().await).map_err(|error| {
                AppError::Internal(format!("failed to encode status tally: {error}"))
            })
        }
        CollectionAction::Create(payload) => {
            controller.create(&payload).await?;
            info!(resource = E::RESOURCE, "record created");
            Ok(json!({ "resource": E::RESOURCE, "result": "created" }))
        }
        CollectionAction::Update(id, payload) => {
            controller.update(&id, &payload).await?;
            info!(resource = E::RESOURCE, id = %id, "record updated");
            Ok(json!({ "resource": E::RESOURCE, "id": id, "result": "updated" }))
        }
        CollectionAction::Delete(id) => {
            controller.delete(&id).await?;
            info!(resource = E::RESOURCE, id = %id, "record deleted");
            Ok(json!({ "resource": E::RESOURCE, "id": id, "result": "deleted" }))
        }
    }
}

async fn load<E: CollectionEntity>(
    controller: &CollectionController<E>,
    filter: partilha_domain::FilterSet,
) -> AppResult<()> {
    let page = filter.page.unwrap_or(1);
    controller.fetch(filter, page).await;

    match controller.state().await.error() {
        Some(message) => Err(AppError::Internal(message.to_owned())),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use partilha_application::{CollectionGateway, Mutation, ResponseEnvelope};
    use partilha_core::{AppError, GatewayError};
    use partilha_domain::{FilterSet, RequestDescriptor};
    use serde_json::json;
    use tokio::sync::Mutex;

    use super::run;
    use crate::admin_command::{CollectionAction, Resource};

    #[derive(Default)]
    struct CannedGateway {
        listings: Mutex<Vec<String>>,
        conflict: bool,
    }

    #[async_trait]
    impl CollectionGateway for CannedGateway {
        async fn execute(
            &self,
            resource: &str,
            _descriptor: &RequestDescriptor,
        ) -> Result<ResponseEnvelope, GatewayError> {
            self.listings.lock().await.push(resource.to_owned());
            Ok(ResponseEnvelope::ok(vec![
                json!({"id": 1, "name": "Centro", "status": "Ativa"}),
                json!({"id": 2, "name": "Norte", "status": "Ativa"}),
                json!({"id": 3, "name": "Sul", "status": "Pendente"}),
            ]))
        }

        async fn mutate(
            &self,
            _resource: &str,
            _mutation: Mutation,
        ) -> Result<ResponseEnvelope, GatewayError> {
            if self.conflict {
                return Err(GatewayError::Http {
                    status: 409,
                    status_text: "Conflict".to_owned(),
                    server_message: Some("duplicate key".to_owned()),
                });
            }
            Ok(ResponseEnvelope::ok(Vec::new()))
        }
    }

    #[tokio::test]
    async fn stats_counts_every_declared_status() {
        let gateway = Arc::new(CannedGateway::default());

        let output = run(
            gateway.clone(),
            20,
            Resource::Regionals,
            CollectionAction::Stats(FilterSet::default()),
        )
        .await
        .unwrap_or_default();

        assert_eq!(output["total"], json!(3));
        assert_eq!(output["counts"]["Ativa"], json!(2));
        assert_eq!(output["counts"]["Inativa"], json!(0));
        assert_eq!(output["counts"]["Pendente"], json!(1));
        assert_eq!(*gateway.listings.lock().await, vec!["regionals".to_owned()]);
    }

    #[tokio::test]
    async fn failed_mutation_reports_the_localized_sentence() {
        let gateway = Arc::new(CannedGateway {
            conflict: true,
            ..CannedGateway::default()
        });

        let outcome = run(
            gateway.clone(),
            20,
            Resource::Stores,
            CollectionAction::Create(json!({"name": "Centro"})),
        )
        .await;

        assert!(matches!(
            outcome,
            Err(AppError::Internal(ref message))
                if message == "Conflito: já existe um registro com estes dados."
        ));
        assert!(gateway.listings.lock().await.is_empty());
    }

    #[tokio::test]
    async fn successful_delete_reloads_once() {
        let gateway = Arc::new(CannedGateway::default());

        let outcome = run(
            gateway.clone(),
            20,
            Resource::Stores,
            CollectionAction::Delete(partilha_domain::EntityId::from(2_i64)),
        )
        .await;

        assert!(outcome.is_ok());
        assert_eq!(gateway.listings.lock().await.len(), 1);
    }
}
