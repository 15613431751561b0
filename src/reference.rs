use tracing::{info, warn};

use crate::{inventory::NamedRef, outbound::DataService};

/// People and places loaded once at startup.
///
/// The snapshot is read-only; it is handed to the schema as data rather than
/// kept in a global.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct ReferenceSnapshot {
    pub(crate) people: Vec<NamedRef>,
    pub(crate) places: Vec<NamedRef>,
}

impl ReferenceSnapshot {
    /// Loads both lists. A failed list is logged and left empty so the
    /// dashboard still starts.
    pub(crate) async fn load(service: &dyn DataService) -> Self {
        let (people, places) = tokio::join!(service.people(), service.places());
        let people = people.unwrap_or_else(|e| {
            warn!("Problem while loading people. {e}");
            Vec::new()
        });
        let places = places.unwrap_or_else(|e| {
            warn!("Problem while loading places. {e}");
            Vec::new()
        });
        info!(
            people = people.len(),
            places = places.len(),
            "loaded reference data"
        );
        Self { people, places }
    }

    pub(crate) fn person(&self, id: &str) -> Option<&NamedRef> {
        self.people.iter().find(|p| p.id == id)
    }

    pub(crate) fn place(&self, id: &str) -> Option<&NamedRef> {
        self.places.iter().find(|p| p.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::ReferenceSnapshot;
    use crate::{inventory::NamedRef, outbound::memory::MemoryService};

    fn named(id: &str, name: &str) -> NamedRef {
        NamedRef {
            id: id.to_string(),
            name: name.to_string(),
        }
    }

    #[tokio::test]
    async fn load_and_lookup() {
        let service = MemoryService {
            people: vec![named("p1", "Sam"), named("p2", "Alex")],
            places: vec![named("h", "Home")],
            ..MemoryService::default()
        };
        let snapshot = ReferenceSnapshot::load(&service).await;
        assert_eq!(snapshot.people.len(), 2);
        assert_eq!(snapshot.person("p2").map(|p| p.name.as_str()), Some("Alex"));
        assert_eq!(snapshot.place("h").map(|p| p.name.as_str()), Some("Home"));
        assert!(snapshot.place("p1").is_none());
    }

    #[tokio::test]
    async fn load_failure_is_empty() {
        let service = MemoryService {
            people: vec![named("p1", "Sam")],
            unavailable: true,
            ..MemoryService::default()
        };
        assert_eq!(
            ReferenceSnapshot::load(&service).await,
            ReferenceSnapshot::default()
        );
    }
}
