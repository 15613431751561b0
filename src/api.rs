mod item;
mod laundry;
mod loadout;
mod location;

use std::sync::Arc;

use async_graphql::{
    Context, EmptySubscription, InputValueError, InputValueResult, MergedObject, Result, Scalar,
    ScalarType, Value,
};
use chrono::{DateTime, SecondsFormat, Utc};
use tracing::warn;

use crate::{inventory::Movement, outbound::DataService, reference::ReferenceSnapshot};

/// A set of queries defined in the schema.
///
/// This is exposed only for [`Schema`], and not used directly.
#[derive(Default, MergedObject)]
pub(crate) struct Query(
    item::ItemQuery,
    laundry::LaundryQuery,
    loadout::LoadoutQuery,
    location::LocationQuery,
);

/// A set of mutations defined in the schema.
#[derive(Default, MergedObject)]
pub(crate) struct Mutation(item::ItemMutation, laundry::LaundryMutation);

pub(crate) type Schema = async_graphql::Schema<Query, Mutation, EmptySubscription>;

/// How many items a listing asks the data service for.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Limits {
    /// Item search results.
    pub(crate) search: usize,
    /// Items offered for manual loadout selection.
    pub(crate) candidates: usize,
}

#[derive(Debug, PartialEq, PartialOrd, Clone, Copy)]
pub(crate) struct DateTimeUtc(DateTime<Utc>);

#[Scalar]
impl ScalarType for DateTimeUtc {
    fn parse(value: Value) -> InputValueResult<Self> {
        match &value {
            Value::String(s) => Ok(DateTimeUtc(s.parse()?)),
            _ => Err(InputValueError::expected_type(value)),
        }
    }

    fn to_value(&self) -> Value {
        Value::String(self.0.to_rfc3339_opts(SecondsFormat::Secs, true))
    }
}

pub(crate) fn schema(
    service: Arc<dyn DataService>,
    reference: ReferenceSnapshot,
    limits: Limits,
) -> Schema {
    Schema::build(Query::default(), Mutation::default(), EmptySubscription)
        .data(service)
        .data(reference)
        .data(limits)
        .finish()
}

fn service<'a>(ctx: &Context<'a>) -> Result<&'a Arc<dyn DataService>> {
    ctx.data::<Arc<dyn DataService>>()
}

/// Appends to the movement log after the change itself has been stored. A
/// failure is logged and does not fail the mutation.
async fn record_movements(service: &Arc<dyn DataService>, movements: &[Movement]) {
    if let Err(e) = service.record_movements(movements).await {
        warn!(count = movements.len(), "Problem while recording movements. {e}");
    }
}

#[cfg(test)]
struct TestSchema {
    service: Arc<crate::outbound::memory::MemoryService>,
    schema: Schema,
}

#[cfg(test)]
impl TestSchema {
    fn new() -> Self {
        Self::with_service(crate::outbound::memory::MemoryService::default())
    }

    fn with_service(service: crate::outbound::memory::MemoryService) -> Self {
        let service = Arc::new(service);
        let reference = ReferenceSnapshot {
            people: service.people.clone(),
            places: service.places.clone(),
        };
        let limits = Limits {
            search: 100,
            candidates: 200,
        };
        let schema = schema(service.clone(), reference, limits);
        Self { service, schema }
    }

    async fn execute(&self, query: &str) -> async_graphql::Response {
        let request: async_graphql::Request = query.into();
        self.schema.execute(request).await
    }
}
