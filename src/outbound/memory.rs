//! In-memory [`DataService`] used by the schema tests.

use std::sync::Mutex;

use async_trait::async_trait;

use super::{DataService, ListOptions, QueryError};
use crate::{
    filter::{Field, Operator, PackFilter, Predicate, QueryDescriptor, Value},
    inventory::{Id, ItemRecord, Movement, NamedRef, NewItem, ResultRow, Status},
};

#[derive(Default)]
pub(crate) struct MemoryService {
    pub(crate) items: Mutex<Vec<ItemRecord>>,
    /// Rows the packing procedures answer with.
    pub(crate) rows: Vec<ResultRow>,
    pub(crate) people: Vec<NamedRef>,
    pub(crate) places: Vec<NamedRef>,
    /// `(place_id, container)` pairs.
    pub(crate) containers: Vec<(Id, NamedRef)>,
    /// `(container_id, slot)` pairs.
    pub(crate) slots: Vec<(Id, NamedRef)>,
    pub(crate) movements: Mutex<Vec<Movement>>,
    pub(crate) pack_filters: Mutex<Vec<PackFilter>>,
    /// `(path, content type, size)` of every uploaded photo.
    pub(crate) uploads: Mutex<Vec<(String, Option<String>, usize)>>,
    pub(crate) status_calls: Mutex<usize>,
    pub(crate) unavailable: bool,
    /// Fails only `record_movements`, leaving every other call working.
    pub(crate) movements_unavailable: bool,
}

impl MemoryService {
    pub(crate) fn with_items(items: Vec<ItemRecord>) -> Self {
        Self {
            items: Mutex::new(items),
            ..Self::default()
        }
    }

    fn check(&self) -> Result<(), QueryError> {
        if self.unavailable {
            return Err(QueryError::Backend {
                status: 503,
                message: "service unavailable".to_string(),
            });
        }
        Ok(())
    }
}

fn column(item: &ItemRecord, field: Field) -> Option<&str> {
    match field {
        Field::Name => Some(item.name.as_str()),
        Field::OwnerId => item.owner_id.as_deref(),
        Field::PlaceId => item.place_id.as_deref(),
        Field::Status => Some(item.status.as_str()),
        Field::Brand => item.brand.as_deref(),
        Field::Type => item.item_type.as_deref(),
        Field::SizeLabel => item.size_label.as_deref(),
        Field::Tags => None,
    }
}

fn matches(item: &ItemRecord, predicate: &Predicate) -> bool {
    match (&predicate.operator, &predicate.value) {
        (Operator::Equals, Value::Text(text)) => column(item, predicate.field) == Some(text.as_str()),
        (Operator::SubstringCaseInsensitive, Value::Text(text)) => column(item, predicate.field)
            .is_some_and(|value| value.to_lowercase().contains(&text.to_lowercase())),
        (Operator::ContainsAllOf, Value::Tags(tags)) => {
            let have = item.tags.as_deref().unwrap_or_default();
            tags.iter().all(|tag| have.contains(tag))
        }
        _ => false,
    }
}

#[async_trait]
impl DataService for MemoryService {
    async fn execute(
        &self,
        descriptor: &QueryDescriptor,
        options: ListOptions,
    ) -> Result<Vec<ItemRecord>, QueryError> {
        self.check()?;
        let mut found: Vec<ItemRecord> = self
            .items
            .lock()
            .unwrap()
            .iter()
            .filter(|item| descriptor.predicates.iter().all(|p| matches(item, p)))
            .cloned()
            .collect();
        if options.order_by_recency_descending {
            found.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        }
        if let Some(limit) = options.limit {
            found.truncate(limit);
        }
        Ok(found)
    }

    async fn item(&self, id: &str) -> Result<Option<ItemRecord>, QueryError> {
        self.check()?;
        Ok(self
            .items
            .lock()
            .unwrap()
            .iter()
            .find(|item| item.id == id)
            .cloned())
    }

    async fn pack_by_ids(&self, ids: &[Id]) -> Result<Vec<ResultRow>, QueryError> {
        self.check()?;
        Ok(self
            .rows
            .iter()
            .filter(|row| ids.contains(&row.item_id))
            .cloned()
            .collect())
    }

    async fn pack_by_filters(&self, filter: &PackFilter) -> Result<Vec<ResultRow>, QueryError> {
        self.check()?;
        self.pack_filters.lock().unwrap().push(filter.clone());
        Ok(self.rows.clone())
    }

    async fn set_status(&self, ids: &[Id], status: Status) -> Result<(), QueryError> {
        self.check()?;
        *self.status_calls.lock().unwrap() += 1;
        for item in self.items.lock().unwrap().iter_mut() {
            if ids.contains(&item.id) {
                item.status = status;
            }
        }
        Ok(())
    }

    async fn record_movements(&self, movements: &[Movement]) -> Result<(), QueryError> {
        self.check()?;
        if self.movements_unavailable {
            return Err(QueryError::Backend {
                status: 500,
                message: "movements unavailable".to_string(),
            });
        }
        self.movements.lock().unwrap().extend_from_slice(movements);
        Ok(())
    }

    async fn insert_item(&self, item: &NewItem) -> Result<ItemRecord, QueryError> {
        self.check()?;
        let mut items = self.items.lock().unwrap();
        let record = ItemRecord {
            id: format!("item-{}", items.len() + 1),
            name: item.name.clone(),
            category: item.category.clone(),
            item_type: item.item_type.clone(),
            brand: item.brand.clone(),
            size_label: item.size_label.clone(),
            tags: Some(item.tags.clone()),
            status: item.status,
            photo_url: item.photo_url.clone(),
            owner_id: item.owner_id.clone(),
            place_id: item.place_id.clone(),
            container_id: item.container_id.clone(),
            slot_id: item.slot_id.clone(),
            updated_at: None,
        };
        items.push(record.clone());
        Ok(record)
    }

    async fn upload_photo(
        &self,
        path: &str,
        content_type: Option<&str>,
        bytes: Vec<u8>,
    ) -> Result<String, QueryError> {
        self.check()?;
        self.uploads.lock().unwrap().push((
            path.to_string(),
            content_type.map(str::to_string),
            bytes.len(),
        ));
        Ok(format!("memory://{path}"))
    }

    async fn people(&self) -> Result<Vec<NamedRef>, QueryError> {
        self.check()?;
        Ok(self.people.clone())
    }

    async fn places(&self) -> Result<Vec<NamedRef>, QueryError> {
        self.check()?;
        Ok(self.places.clone())
    }

    async fn containers(&self, place_id: &str) -> Result<Vec<NamedRef>, QueryError> {
        self.check()?;
        Ok(self
            .containers
            .iter()
            .filter(|(parent, _)| parent == place_id)
            .map(|(_, container)| container.clone())
            .collect())
    }

    async fn slots(&self, container_id: &str) -> Result<Vec<NamedRef>, QueryError> {
        self.check()?;
        Ok(self
            .slots
            .iter()
            .filter(|(parent, _)| parent == container_id)
            .map(|(_, slot)| slot.clone())
            .collect())
    }
}
