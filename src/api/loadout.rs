use async_graphql::{Context, InputObject, Object, Result, SimpleObject};
use tracing::{error, info};

use crate::{
    api::{
        self,
        item::{items_from, Item},
        Limits,
    },
    filter::{LoadoutFilter, QueryDescriptor},
    grouping::{self, GroupTree},
    inventory::{ResultRow, Status},
    outbound::ListOptions,
    reference::ReferenceSnapshot,
};

#[derive(SimpleObject, Debug)]
pub(crate) struct PackedItem {
    item_id: String,
    name: String,
    brand: Option<String>,
    size_label: Option<String>,
    /// The row as it appears in the copied list, e.g. "- Jacket (Carhartt, L)".
    line: String,
}

impl From<&ResultRow> for PackedItem {
    fn from(row: &ResultRow) -> Self {
        Self {
            item_id: row.item_id.clone(),
            name: row.name.clone(),
            brand: row.brand.clone(),
            size_label: row.size_label.clone(),
            line: grouping::describe(row),
        }
    }
}

#[derive(SimpleObject, Debug)]
pub(crate) struct LoadoutSlot {
    name: String,
    items: Vec<PackedItem>,
}

#[derive(SimpleObject, Debug)]
pub(crate) struct LoadoutContainer {
    name: String,
    slots: Vec<LoadoutSlot>,
}

#[derive(SimpleObject, Debug)]
pub(crate) struct LoadoutPlace {
    name: String,
    containers: Vec<LoadoutContainer>,
}

/// A packing list grouped by where each item lives.
#[derive(SimpleObject, Debug)]
pub(crate) struct Loadout {
    /// Rows in the order the data service returned them.
    rows: Vec<PackedItem>,
    places: Vec<LoadoutPlace>,
    /// The indented plain-text list, one entry per line.
    lines: Vec<String>,
    /// `lines` joined with newlines, ready to copy.
    text: String,
    item_count: usize,
}

impl Loadout {
    fn new(rows: &[ResultRow]) -> Self {
        let tree = grouping::group(rows);
        let lines = grouping::render_lines(&tree);
        Self {
            rows: rows.iter().map(PackedItem::from).collect(),
            places: places(&tree),
            text: grouping::render_text(&tree),
            item_count: tree.rows().count(),
            lines,
        }
    }
}

fn places(tree: &GroupTree) -> Vec<LoadoutPlace> {
    tree.places()
        .map(|(place, containers)| LoadoutPlace {
            name: place.to_string(),
            containers: containers
                .iter()
                .map(|(container, slots)| LoadoutContainer {
                    name: container.to_string(),
                    slots: slots
                        .iter()
                        .map(|(slot, rows)| LoadoutSlot {
                            name: slot.to_string(),
                            items: rows.iter().map(PackedItem::from).collect(),
                        })
                        .collect(),
                })
                .collect(),
        })
        .collect()
}

#[derive(InputObject, Debug, Default)]
pub(crate) struct LoadoutFilterInput {
    /// Pack only items owned by one of these people.
    owner_ids: Option<Vec<String>>,
    /// Case-insensitive substring of the type.
    #[graphql(name = "type")]
    item_type: Option<String>,
    /// Case-insensitive substring of the brand.
    brand: Option<String>,
    /// Case-insensitive substring of the size label.
    size_label: Option<String>,
    /// Required tags separated by spaces or commas, e.g. "storm fr".
    tags: Option<String>,
    min_waist: Option<f64>,
    max_waist: Option<f64>,
    inseam: Option<f64>,
    /// Statuses to pack from. Defaults to clean and in use.
    status_in: Option<Vec<Status>>,
}

impl From<LoadoutFilterInput> for LoadoutFilter {
    fn from(input: LoadoutFilterInput) -> Self {
        LoadoutFilter {
            owner_ids: input.owner_ids.unwrap_or_default(),
            brand_contains: input.brand.unwrap_or_default(),
            type_contains: input.item_type.unwrap_or_default(),
            size_label_contains: input.size_label.unwrap_or_default(),
            tags_raw: input.tags.unwrap_or_default(),
            min_waist: input.min_waist,
            max_waist: input.max_waist,
            inseam_eq: input.inseam,
            status_in: input.status_in,
        }
    }
}

#[derive(Default)]
pub(super) struct LoadoutQuery;

#[Object]
impl LoadoutQuery {
    /// Items offered for picking a loadout by hand.
    async fn pack_candidates(&self, ctx: &Context<'_>, limit: Option<usize>) -> Result<Vec<Item>> {
        let limit = limit.unwrap_or(ctx.data::<Limits>()?.candidates);
        let options = ListOptions {
            limit: Some(limit),
            order_by_recency_descending: false,
        };
        let records = api::service(ctx)?
            .execute(&QueryDescriptor::default(), options)
            .await
            .inspect_err(|e| error!("Problem while loading pack candidates. {e}"))?;
        Ok(items_from(records, ctx.data::<ReferenceSnapshot>()?))
    }

    /// Builds a loadout from hand-picked items.
    async fn loadout_by_ids(&self, ctx: &Context<'_>, ids: Vec<String>) -> Result<Loadout> {
        if ids.is_empty() {
            return Err("Pick some items from the grid.".into());
        }
        let rows = api::service(ctx)?
            .pack_by_ids(&ids)
            .await
            .inspect_err(|e| error!("Problem while packing by ids. {e}"))?;
        info!(picked = ids.len(), packed = rows.len(), "built loadout from selection");
        Ok(Loadout::new(&rows))
    }

    /// Builds a loadout from declarative filters.
    async fn loadout_by_filters(
        &self,
        ctx: &Context<'_>,
        #[graphql(default)] filter: LoadoutFilterInput,
    ) -> Result<Loadout> {
        let payload = LoadoutFilter::from(filter).compile();
        let rows = api::service(ctx)?
            .pack_by_filters(&payload)
            .await
            .inspect_err(|e| error!("Problem while packing by filters. {e}"))?;
        info!(packed = rows.len(), "built loadout from filters");
        Ok(Loadout::new(&rows))
    }
}
