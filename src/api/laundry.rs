use async_graphql::{Context, Object, Result};
use tracing::{error, info};

use crate::{
    api::{
        self,
        item::{items_from, Item},
    },
    filter::QueryDescriptor,
    inventory::{Id, Movement, MovementAction, Status},
    outbound::ListOptions,
    reference::ReferenceSnapshot,
};

#[derive(Default)]
pub(super) struct LaundryQuery;

#[Object]
impl LaundryQuery {
    /// Every dirty item, most recently updated first.
    async fn dirty_items(&self, ctx: &Context<'_>) -> Result<Vec<Item>> {
        let records = api::service(ctx)?
            .execute(
                &QueryDescriptor::with_status(Status::Dirty),
                ListOptions::recent(None),
            )
            .await
            .inspect_err(|e| error!("Problem while loading dirty items. {e}"))?;
        Ok(items_from(records, ctx.data::<ReferenceSnapshot>()?))
    }
}

#[derive(Default)]
pub(super) struct LaundryMutation;

#[Object]
impl LaundryMutation {
    /// Marks the selected items clean and returns how many were updated.
    async fn mark_clean(&self, ctx: &Context<'_>, ids: Vec<String>) -> Result<usize> {
        let mut selected: Vec<Id> = Vec::with_capacity(ids.len());
        for id in ids {
            if !selected.contains(&id) {
                selected.push(id);
            }
        }
        if selected.is_empty() {
            return Ok(0);
        }

        let service = api::service(ctx)?;
        service.set_status(&selected, Status::Clean).await?;
        let movements: Vec<Movement> = selected
            .iter()
            .map(|id| Movement::bare(id.clone(), MovementAction::MarkedClean))
            .collect();
        api::record_movements(service, &movements).await;
        info!(count = selected.len(), "marked items clean");
        Ok(selected.len())
    }
}
