use async_graphql::{Enum, SimpleObject};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifiers are opaque strings assigned by the data service.
pub(crate) type Id = String;

/// The laundry/availability state of an item.
#[derive(Enum, Copy, Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum Status {
    #[default]
    Clean,
    Dirty,
    InUse,
    Missing,
}

impl Status {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Status::Clean => "clean",
            Status::Dirty => "dirty",
            Status::InUse => "in_use",
            Status::Missing => "missing",
        }
    }

    /// The status a quick dirty/clean toggle moves an item to.
    pub(crate) fn toggled(self) -> Self {
        if self == Status::Dirty {
            Status::Clean
        } else {
            Status::Dirty
        }
    }
}

/// An item as stored by the data service.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub(crate) struct ItemRecord {
    pub(crate) id: Id,
    pub(crate) name: String,
    pub(crate) category: Option<String>,
    #[serde(rename = "type")]
    pub(crate) item_type: Option<String>,
    pub(crate) brand: Option<String>,
    pub(crate) size_label: Option<String>,
    #[serde(default)]
    pub(crate) tags: Option<Vec<String>>,
    #[serde(default)]
    pub(crate) status: Status,
    pub(crate) photo_url: Option<String>,
    pub(crate) owner_id: Option<Id>,
    pub(crate) place_id: Option<Id>,
    pub(crate) container_id: Option<Id>,
    pub(crate) slot_id: Option<Id>,
    pub(crate) updated_at: Option<DateTime<Utc>>,
}

/// Columns requested for every item listing.
pub(crate) const ITEM_COLUMNS: &str = "id,name,category,type,brand,size_label,tags,status,\
photo_url,owner_id,place_id,container_id,slot_id,updated_at";

/// A flat loadout row as returned by the packing procedures.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub(crate) struct ResultRow {
    pub(crate) item_id: Id,
    pub(crate) name: String,
    pub(crate) brand: Option<String>,
    pub(crate) size_label: Option<String>,
    pub(crate) place_name: Option<String>,
    pub(crate) container_name: Option<String>,
    pub(crate) slot_name: Option<String>,
}

/// An `{id, name}` pair for people, places, containers and slots.
#[derive(SimpleObject, Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub(crate) struct NamedRef {
    pub(crate) id: Id,
    pub(crate) name: String,
}

/// Insert payload for a new item. `None` fields are stored as null.
#[derive(Clone, Debug, Default, Serialize, PartialEq)]
pub(crate) struct NewItem {
    pub(crate) name: String,
    pub(crate) owner_id: Option<Id>,
    pub(crate) category: Option<String>,
    #[serde(rename = "type")]
    pub(crate) item_type: Option<String>,
    pub(crate) brand: Option<String>,
    pub(crate) color: Option<String>,
    pub(crate) size_label: Option<String>,
    pub(crate) waist: Option<f64>,
    pub(crate) inseam: Option<f64>,
    pub(crate) shoe_size: Option<f64>,
    pub(crate) fr_rating: Option<String>,
    pub(crate) season: Option<String>,
    pub(crate) notes: Option<String>,
    pub(crate) status: Status,
    pub(crate) place_id: Option<Id>,
    pub(crate) container_id: Option<Id>,
    pub(crate) slot_id: Option<Id>,
    pub(crate) tags: Vec<String>,
    pub(crate) photo_url: Option<String>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum MovementAction {
    Created,
    MarkedDirty,
    MarkedClean,
}

impl From<Status> for MovementAction {
    fn from(status: Status) -> Self {
        if status == Status::Dirty {
            MovementAction::MarkedDirty
        } else {
            MovementAction::MarkedClean
        }
    }
}

/// Audit record of a status or location change.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub(crate) struct Movement {
    pub(crate) item_id: Id,
    pub(crate) action: MovementAction,
    pub(crate) to_place_id: Option<Id>,
    pub(crate) to_container_id: Option<Id>,
    pub(crate) to_slot_id: Option<Id>,
}

impl Movement {
    /// A movement that leaves the item where it currently is.
    pub(crate) fn in_place(item: &ItemRecord, action: MovementAction) -> Self {
        Self {
            item_id: item.id.clone(),
            action,
            to_place_id: item.place_id.clone(),
            to_container_id: item.container_id.clone(),
            to_slot_id: item.slot_id.clone(),
        }
    }

    pub(crate) fn bare(item_id: Id, action: MovementAction) -> Self {
        Self {
            item_id,
            action,
            to_place_id: None,
            to_container_id: None,
            to_slot_id: None,
        }
    }
}

/// Returns `None` for absent or empty strings.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
