//! Translation of user-entered filter fields into backend-agnostic query
//! descriptors.

use serde::Serialize;

use crate::inventory::{Id, Status};

/// Filter fields as entered on the search form. Empty means "no constraint".
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct FilterInput {
    pub(crate) name_search: String,
    pub(crate) owner_id: Option<Id>,
    pub(crate) place_id: Option<Id>,
    pub(crate) status: Option<Status>,
    pub(crate) brand_contains: String,
    pub(crate) type_contains: String,
    pub(crate) size_label_contains: String,
    pub(crate) tags_raw: String,
}

/// Item columns a predicate can constrain.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum Field {
    Name,
    OwnerId,
    PlaceId,
    Status,
    Brand,
    Type,
    SizeLabel,
    Tags,
}

impl Field {
    /// The backend column name.
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::OwnerId => "owner_id",
            Field::PlaceId => "place_id",
            Field::Status => "status",
            Field::Brand => "brand",
            Field::Type => "type",
            Field::SizeLabel => "size_label",
            Field::Tags => "tags",
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum Operator {
    Equals,
    /// Unanchored, case-insensitive match anywhere in the target.
    SubstringCaseInsensitive,
    /// The target tag set must be a superset of the value.
    ContainsAllOf,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(untagged)]
pub(crate) enum Value {
    Text(String),
    Tags(Vec<String>),
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub(crate) struct Predicate {
    pub(crate) field: Field,
    pub(crate) operator: Operator,
    pub(crate) value: Value,
}

impl Predicate {
    fn equals(field: Field, value: &str) -> Self {
        Self {
            field,
            operator: Operator::Equals,
            value: Value::Text(value.to_string()),
        }
    }

    fn substring(field: Field, value: &str) -> Self {
        Self {
            field,
            operator: Operator::SubstringCaseInsensitive,
            value: Value::Text(value.to_string()),
        }
    }
}

/// An ordered conjunction of predicates.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub(crate) struct QueryDescriptor {
    pub(crate) predicates: Vec<Predicate>,
}

impl QueryDescriptor {
    /// A descriptor that selects items with the given status only.
    pub(crate) fn with_status(status: Status) -> Self {
        Self {
            predicates: vec![Predicate::equals(Field::Status, status.as_str())],
        }
    }

    pub(crate) fn find(&self, field: Field) -> Option<&Predicate> {
        self.predicates.iter().find(|p| p.field == field)
    }
}

/// Compiles form input into a query descriptor.
///
/// Predicates always come out in the order name, owner, place, status, brand,
/// type, size label, tags. Empty fields produce nothing.
pub(crate) fn compile(input: &FilterInput) -> QueryDescriptor {
    let mut predicates = Vec::new();

    if !input.name_search.is_empty() {
        predicates.push(Predicate::substring(Field::Name, &input.name_search));
    }
    if let Some(owner_id) = input.owner_id.as_deref().filter(|id| !id.is_empty()) {
        predicates.push(Predicate::equals(Field::OwnerId, owner_id));
    }
    if let Some(place_id) = input.place_id.as_deref().filter(|id| !id.is_empty()) {
        predicates.push(Predicate::equals(Field::PlaceId, place_id));
    }
    if let Some(status) = input.status {
        predicates.push(Predicate::equals(Field::Status, status.as_str()));
    }
    for (field, text) in [
        (Field::Brand, &input.brand_contains),
        (Field::Type, &input.type_contains),
        (Field::SizeLabel, &input.size_label_contains),
    ] {
        if !text.is_empty() {
            predicates.push(Predicate::substring(field, text));
        }
    }

    let tags = parse_tags(&input.tags_raw);
    if !tags.is_empty() {
        predicates.push(Predicate {
            field: Field::Tags,
            operator: Operator::ContainsAllOf,
            value: Value::Tags(tags),
        });
    }

    QueryDescriptor { predicates }
}

/// Splits raw tag text on runs of whitespace and commas, lowercasing each
/// token. Repeated tags keep their first position.
pub(crate) fn parse_tags(raw: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for token in raw.split(|c: char| c == ',' || c.is_whitespace()) {
        if token.is_empty() {
            continue;
        }
        let tag = token.to_lowercase();
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    tags
}

/// Loadout filter form.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct LoadoutFilter {
    pub(crate) owner_ids: Vec<Id>,
    pub(crate) brand_contains: String,
    pub(crate) type_contains: String,
    pub(crate) size_label_contains: String,
    pub(crate) tags_raw: String,
    pub(crate) min_waist: Option<f64>,
    pub(crate) max_waist: Option<f64>,
    pub(crate) inseam_eq: Option<f64>,
    /// Statuses to pack from; `None` skips dirty and missing items.
    pub(crate) status_in: Option<Vec<Status>>,
}

pub(crate) const DEFAULT_PACK_STATUSES: [Status; 2] = [Status::Clean, Status::InUse];

/// Arguments of the `quick_pack_filter` procedure.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub(crate) struct PackFilter {
    pub(crate) owner_ids: Option<Vec<Id>>,
    pub(crate) brand_like: Option<String>,
    pub(crate) type_like: Option<String>,
    pub(crate) min_waist: Option<f64>,
    pub(crate) max_waist: Option<f64>,
    pub(crate) inseam_eq: Option<f64>,
    pub(crate) size_label_like: Option<String>,
    pub(crate) required_tags: Option<Vec<String>>,
    pub(crate) status_in: Vec<Status>,
}

impl LoadoutFilter {
    /// Compiles the form into the procedure payload. The text and tag fields
    /// go through [`compile`] so both searches share one normalization.
    pub(crate) fn compile(&self) -> PackFilter {
        let descriptor = compile(&FilterInput {
            brand_contains: self.brand_contains.clone(),
            type_contains: self.type_contains.clone(),
            size_label_contains: self.size_label_contains.clone(),
            tags_raw: self.tags_raw.clone(),
            ..FilterInput::default()
        });
        let like = |field| match descriptor.find(field).map(|p| &p.value) {
            Some(Value::Text(text)) => Some(format!("%{text}%")),
            _ => None,
        };
        let required_tags = match descriptor.find(Field::Tags).map(|p| &p.value) {
            Some(Value::Tags(tags)) => Some(tags.clone()),
            _ => None,
        };

        let owner_ids: Vec<Id> = self
            .owner_ids
            .iter()
            .filter(|id| !id.is_empty())
            .cloned()
            .collect();

        PackFilter {
            owner_ids: (!owner_ids.is_empty()).then_some(owner_ids),
            brand_like: like(Field::Brand),
            type_like: like(Field::Type),
            min_waist: self.min_waist,
            max_waist: self.max_waist,
            inseam_eq: self.inseam_eq,
            size_label_like: like(Field::SizeLabel),
            required_tags,
            status_in: self
                .status_in
                .clone()
                .unwrap_or_else(|| DEFAULT_PACK_STATUSES.to_vec()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(field: Field, operator: Operator, value: &str) -> Predicate {
        Predicate {
            field,
            operator,
            value: Value::Text(value.to_string()),
        }
    }

    #[test]
    fn empty_input_compiles_to_nothing() {
        assert!(compile(&FilterInput::default()).predicates.is_empty());
    }

    #[test]
    fn empty_ids_are_no_constraint() {
        let input = FilterInput {
            owner_id: Some(String::new()),
            place_id: Some(String::new()),
            ..FilterInput::default()
        };
        assert!(compile(&input).predicates.is_empty());
    }

    #[test]
    fn tags_example() {
        let input = FilterInput {
            tags_raw: "Storm, School  donate".to_string(),
            ..FilterInput::default()
        };
        assert_eq!(
            compile(&input).predicates,
            vec![Predicate {
                field: Field::Tags,
                operator: Operator::ContainsAllOf,
                value: Value::Tags(vec![
                    "storm".to_string(),
                    "school".to_string(),
                    "donate".to_string()
                ]),
            }]
        );
    }

    #[test]
    fn separator_style_and_case_do_not_matter() {
        let expected = parse_tags("storm school donate");
        for raw in [
            "storm,school,donate",
            "STORM, School,donate",
            " ,storm\tschool\n,,donate, ",
            "Storm storm school donate DONATE",
        ] {
            assert_eq!(parse_tags(raw), expected, "{raw:?}");
        }
    }

    #[test]
    fn tag_parsing_is_idempotent() {
        let once = parse_tags("B a, b  A");
        assert_eq!(once, vec!["b".to_string(), "a".to_string()]);
        assert_eq!(parse_tags(&once.join(" ")), once);
    }

    #[test]
    fn separators_only_yield_no_tag_predicate() {
        let input = FilterInput {
            tags_raw: " , ,\t".to_string(),
            ..FilterInput::default()
        };
        assert!(compile(&input).predicates.is_empty());
    }

    #[test]
    fn every_field_in_fixed_order() {
        let input = FilterInput {
            name_search: "jacket".to_string(),
            owner_id: Some("p1".to_string()),
            place_id: Some("pl1".to_string()),
            status: Some(Status::InUse),
            brand_contains: "carhartt".to_string(),
            type_contains: "pants".to_string(),
            size_label_contains: "34x32".to_string(),
            tags_raw: "storm".to_string(),
        };
        let descriptor = compile(&input);
        assert_eq!(
            descriptor.predicates,
            vec![
                text(Field::Name, Operator::SubstringCaseInsensitive, "jacket"),
                text(Field::OwnerId, Operator::Equals, "p1"),
                text(Field::PlaceId, Operator::Equals, "pl1"),
                text(Field::Status, Operator::Equals, "in_use"),
                text(Field::Brand, Operator::SubstringCaseInsensitive, "carhartt"),
                text(Field::Type, Operator::SubstringCaseInsensitive, "pants"),
                text(Field::SizeLabel, Operator::SubstringCaseInsensitive, "34x32"),
                Predicate {
                    field: Field::Tags,
                    operator: Operator::ContainsAllOf,
                    value: Value::Tags(vec!["storm".to_string()]),
                },
            ]
        );
        assert_eq!(compile(&input), descriptor);
    }

    #[test]
    fn descriptor_serializes_with_column_names() {
        let descriptor = compile(&FilterInput {
            brand_contains: "Carhartt".to_string(),
            ..FilterInput::default()
        });
        assert_eq!(
            serde_json::to_value(&descriptor).unwrap(),
            serde_json::json!({"predicates": [
                {"field": "brand", "operator": "substring_case_insensitive", "value": "Carhartt"}
            ]})
        );
    }

    #[test]
    fn loadout_filter_defaults() {
        let payload = LoadoutFilter::default().compile();
        assert_eq!(
            payload,
            PackFilter {
                owner_ids: None,
                brand_like: None,
                type_like: None,
                min_waist: None,
                max_waist: None,
                inseam_eq: None,
                size_label_like: None,
                required_tags: None,
                status_in: vec![Status::Clean, Status::InUse],
            }
        );
    }

    #[test]
    fn loadout_filter_patterns_and_tags() {
        let filter = LoadoutFilter {
            owner_ids: vec!["p1".to_string(), String::new(), "p2".to_string()],
            brand_contains: "Carhartt".to_string(),
            type_contains: "pants".to_string(),
            size_label_contains: "34x32".to_string(),
            tags_raw: "Storm FR".to_string(),
            min_waist: Some(32.0),
            status_in: Some(vec![Status::Clean]),
            ..LoadoutFilter::default()
        };
        let payload = filter.compile();
        assert_eq!(
            payload.owner_ids,
            Some(vec!["p1".to_string(), "p2".to_string()])
        );
        assert_eq!(payload.brand_like.as_deref(), Some("%Carhartt%"));
        assert_eq!(payload.type_like.as_deref(), Some("%pants%"));
        assert_eq!(payload.size_label_like.as_deref(), Some("%34x32%"));
        assert_eq!(
            payload.required_tags,
            Some(vec!["storm".to_string(), "fr".to_string()])
        );
        assert_eq!(payload.min_waist, Some(32.0));
        assert_eq!(payload.status_in, vec![Status::Clean]);

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["status_in"], serde_json::json!(["clean"]));
        assert_eq!(json["max_waist"], serde_json::Value::Null);
    }
}
