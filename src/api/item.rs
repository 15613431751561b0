use std::io::Read;

use async_graphql::{Context, InputObject, Object, Result, SimpleObject, Upload};
use tracing::{error, info};
use uuid::Uuid;

use crate::{
    api::{self, DateTimeUtc, Limits},
    filter::{self, FilterInput},
    inventory::{non_empty, ItemRecord, Movement, MovementAction, NewItem, Status},
    outbound::ListOptions,
    reference::ReferenceSnapshot,
};

const PHOTO_DIR: &str = "items";
const DEFAULT_PHOTO_EXTENSION: &str = "jpg";

#[derive(SimpleObject, Debug)]
pub(crate) struct Item {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) category: Option<String>,
    #[graphql(name = "type")]
    pub(crate) item_type: Option<String>,
    pub(crate) brand: Option<String>,
    pub(crate) size_label: Option<String>,
    pub(crate) tags: Vec<String>,
    pub(crate) status: Status,
    pub(crate) photo_url: Option<String>,
    pub(crate) owner_id: Option<String>,
    /// Owner name from the reference data, if known.
    pub(crate) owner_name: Option<String>,
    pub(crate) place_id: Option<String>,
    /// Place name from the reference data, if known.
    pub(crate) place_name: Option<String>,
    pub(crate) container_id: Option<String>,
    pub(crate) slot_id: Option<String>,
    /// One-line "brand • type • size • status • tags" description.
    pub(crate) summary: String,
    pub(crate) updated_at: Option<DateTimeUtc>,
}

impl Item {
    pub(crate) fn new(record: ItemRecord, reference: &ReferenceSnapshot) -> Self {
        let summary = summary(&record);
        let owner_name = record
            .owner_id
            .as_deref()
            .and_then(|id| reference.person(id))
            .map(|p| p.name.clone());
        let place_name = record
            .place_id
            .as_deref()
            .and_then(|id| reference.place(id))
            .map(|p| p.name.clone());
        Item {
            id: record.id,
            name: record.name,
            category: record.category,
            item_type: record.item_type,
            brand: record.brand,
            size_label: record.size_label,
            tags: record.tags.unwrap_or_default(),
            status: record.status,
            photo_url: record.photo_url,
            owner_id: record.owner_id,
            owner_name,
            place_id: record.place_id,
            place_name,
            container_id: record.container_id,
            slot_id: record.slot_id,
            summary,
            updated_at: record.updated_at.map(DateTimeUtc),
        }
    }
}

fn summary(record: &ItemRecord) -> String {
    let or_dash = |value: Option<&str>| match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => "—".to_string(),
    };
    let kind = record
        .item_type
        .as_deref()
        .filter(|t| !t.is_empty())
        .or(record.category.as_deref());
    let mut summary = format!(
        "{} • {} • {} • {}",
        or_dash(record.brand.as_deref()),
        or_dash(kind),
        or_dash(record.size_label.as_deref()),
        record.status.as_str()
    );
    if let Some(tags) = record.tags.as_deref().filter(|tags| !tags.is_empty()) {
        summary.push_str(" • tags: ");
        summary.push_str(&tags.join(", "));
    }
    summary
}

pub(crate) fn items_from(records: Vec<ItemRecord>, reference: &ReferenceSnapshot) -> Vec<Item> {
    records
        .into_iter()
        .map(|record| Item::new(record, reference))
        .collect()
}

#[derive(InputObject, Debug, Default)]
pub(crate) struct ItemFilter {
    /// Case-insensitive substring of the item name.
    name: Option<String>,
    /// Exact owner id.
    owner_id: Option<String>,
    /// Exact place id.
    place_id: Option<String>,
    status: Option<Status>,
    /// Case-insensitive substring of the brand.
    brand: Option<String>,
    /// Case-insensitive substring of the type, e.g. "pants".
    #[graphql(name = "type")]
    item_type: Option<String>,
    /// Case-insensitive substring of the size label, e.g. "34x32".
    size_label: Option<String>,
    /// Required tags separated by spaces or commas, e.g. "storm school".
    tags: Option<String>,
}

impl From<ItemFilter> for FilterInput {
    fn from(filter: ItemFilter) -> Self {
        FilterInput {
            name_search: filter.name.unwrap_or_default(),
            owner_id: filter.owner_id,
            place_id: filter.place_id,
            status: filter.status,
            brand_contains: filter.brand.unwrap_or_default(),
            type_contains: filter.item_type.unwrap_or_default(),
            size_label_contains: filter.size_label.unwrap_or_default(),
            tags_raw: filter.tags.unwrap_or_default(),
        }
    }
}

#[derive(Default)]
pub(super) struct ItemQuery;

#[Object]
impl ItemQuery {
    /// Items matching every given filter, most recently updated first.
    async fn items(
        &self,
        ctx: &Context<'_>,
        #[graphql(default)] filter: ItemFilter,
    ) -> Result<Vec<Item>> {
        let descriptor = filter::compile(&filter.into());
        let limits = ctx.data::<Limits>()?;
        let records = api::service(ctx)?
            .execute(&descriptor, ListOptions::recent(Some(limits.search)))
            .await
            .inspect_err(|e| error!("Problem while searching items. {e}"))?;
        Ok(items_from(records, ctx.data::<ReferenceSnapshot>()?))
    }
}

#[derive(InputObject, Debug, Default)]
pub(crate) struct NewItemInput {
    name: String,
    owner_id: Option<String>,
    /// e.g. "clothes", "toys".
    category: Option<String>,
    #[graphql(name = "type")]
    item_type: Option<String>,
    brand: Option<String>,
    color: Option<String>,
    size_label: Option<String>,
    waist: Option<f64>,
    inseam: Option<f64>,
    shoe_size: Option<f64>,
    /// e.g. "FR2".
    fr_rating: Option<String>,
    season: Option<String>,
    notes: Option<String>,
    #[graphql(default)]
    status: Status,
    place_id: Option<String>,
    container_id: Option<String>,
    slot_id: Option<String>,
    /// Tags separated by spaces or commas.
    tags: Option<String>,
}

impl NewItemInput {
    fn into_new_item(self, photo_url: Option<String>) -> NewItem {
        NewItem {
            tags: filter::parse_tags(self.tags.as_deref().unwrap_or_default()),
            name: self.name,
            owner_id: non_empty(self.owner_id),
            category: non_empty(self.category),
            item_type: non_empty(self.item_type),
            brand: non_empty(self.brand),
            color: non_empty(self.color),
            size_label: non_empty(self.size_label),
            waist: self.waist,
            inseam: self.inseam,
            shoe_size: self.shoe_size,
            fr_rating: non_empty(self.fr_rating),
            season: non_empty(self.season),
            notes: non_empty(self.notes),
            status: self.status,
            place_id: non_empty(self.place_id),
            container_id: non_empty(self.container_id),
            slot_id: non_empty(self.slot_id),
            photo_url,
        }
    }
}

/// Storage path for a new photo; the extension comes from the uploaded file
/// name.
fn photo_path(filename: &str) -> String {
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty())
        .unwrap_or(DEFAULT_PHOTO_EXTENSION)
        .to_lowercase();
    format!("{PHOTO_DIR}/{}.{extension}", Uuid::new_v4())
}

#[derive(Default)]
pub(super) struct ItemMutation;

#[Object]
impl ItemMutation {
    /// Flips an item between dirty and clean and logs the movement.
    async fn toggle_dirty(&self, ctx: &Context<'_>, id: String) -> Result<Item> {
        let service = api::service(ctx)?;
        let Some(mut record) = service.item(&id).await? else {
            return Err(format!("no item with id {id}").into());
        };
        let next = record.status.toggled();
        service
            .set_status(std::slice::from_ref(&record.id), next)
            .await?;
        api::record_movements(service, &[Movement::in_place(&record, next.into())]).await;
        info!(%id, status = next.as_str(), "toggled item status");
        record.status = next;
        Ok(Item::new(record, ctx.data::<ReferenceSnapshot>()?))
    }

    /// Adds an item, uploading its photo first when one is attached.
    async fn add_item(
        &self,
        ctx: &Context<'_>,
        input: NewItemInput,
        photo: Option<Upload>,
    ) -> Result<Item> {
        if input.name.is_empty() {
            return Err("Name required".into());
        }
        let service = api::service(ctx)?;

        let photo_url = match photo {
            Some(upload) => {
                let value = upload.value(ctx)?;
                let path = photo_path(&value.filename);
                let content_type = value.content_type.clone();
                let bytes = tokio::task::spawn_blocking(move || {
                    let mut bytes = Vec::new();
                    value.into_read().read_to_end(&mut bytes)?;
                    Ok::<_, std::io::Error>(bytes)
                })
                .await??;
                let url = service
                    .upload_photo(&path, content_type.as_deref(), bytes)
                    .await
                    .inspect_err(|e| error!("Problem while uploading photo. {e}"))?;
                Some(url)
            }
            None => None,
        };

        let record = service
            .insert_item(&input.into_new_item(photo_url))
            .await
            .inspect_err(|e| error!("Problem while adding item. {e}"))?;
        api::record_movements(service, &[Movement::in_place(&record, MovementAction::Created)])
            .await;
        info!(id = %record.id, name = %record.name, "added item");
        Ok(Item::new(record, ctx.data::<ReferenceSnapshot>()?))
    }
}
