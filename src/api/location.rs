use async_graphql::{Context, Object, Result};
use tracing::error;

use crate::{api, inventory::NamedRef, reference::ReferenceSnapshot};

#[derive(Default)]
pub(super) struct LocationQuery;

#[Object]
impl LocationQuery {
    /// People known when the server started.
    async fn people(&self, ctx: &Context<'_>) -> Result<Vec<NamedRef>> {
        Ok(ctx.data::<ReferenceSnapshot>()?.people.clone())
    }

    /// Places known when the server started.
    async fn places(&self, ctx: &Context<'_>) -> Result<Vec<NamedRef>> {
        Ok(ctx.data::<ReferenceSnapshot>()?.places.clone())
    }

    /// Containers inside a place, fetched on demand.
    async fn containers(&self, ctx: &Context<'_>, place_id: String) -> Result<Vec<NamedRef>> {
        Ok(api::service(ctx)?
            .containers(&place_id)
            .await
            .inspect_err(|e| error!("Problem while loading containers of {place_id}. {e}"))?)
    }

    /// Slots inside a container, fetched on demand.
    async fn slots(&self, ctx: &Context<'_>, container_id: String) -> Result<Vec<NamedRef>> {
        Ok(api::service(ctx)?
            .slots(&container_id)
            .await
            .inspect_err(|e| error!("Problem while loading slots of {container_id}. {e}"))?)
    }
}
