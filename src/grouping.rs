//! Grouping of flat loadout rows into a Place → Container → Slot tree.

use std::collections::HashMap;

use crate::inventory::ResultRow;

/// Key used for a row whose place, container or slot name is missing.
pub(crate) const PLACEHOLDER: &str = "—";

/// A string-keyed map that iterates in first-insertion order.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct OrderedGroups<V> {
    entries: Vec<(String, V)>,
    positions: HashMap<String, usize>,
}

impl<V> Default for OrderedGroups<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            positions: HashMap::new(),
        }
    }
}

impl<V> OrderedGroups<V> {
    /// Returns the value under `key`, inserting `make()` at the end first if
    /// the key is new.
    pub(crate) fn get_or_insert_with(&mut self, key: &str, make: impl FnOnce() -> V) -> &mut V {
        let index = if let Some(&index) = self.positions.get(key) {
            index
        } else {
            let index = self.entries.len();
            self.entries.push((key.to_string(), make()));
            self.positions.insert(key.to_string(), index);
            index
        };
        &mut self.entries[index].1
    }

    #[cfg(test)]
    pub(crate) fn get(&self, key: &str) -> Option<&V> {
        self.positions.get(key).map(|&index| &self.entries[index].1)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    #[cfg(test)]
    pub(crate) fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }
}

pub(crate) type SlotGroups = OrderedGroups<Vec<ResultRow>>;
pub(crate) type ContainerGroups = OrderedGroups<SlotGroups>;

/// Rows grouped by place, then container, then slot, each level in
/// first-seen order.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct GroupTree {
    places: OrderedGroups<ContainerGroups>,
}

impl GroupTree {
    pub(crate) fn places(&self) -> impl Iterator<Item = (&str, &ContainerGroups)> {
        self.places.iter()
    }

    #[cfg(test)]
    pub(crate) fn place(&self, name: &str) -> Option<&ContainerGroups> {
        self.places.get(name)
    }

    /// Every row in traversal order.
    pub(crate) fn rows(&self) -> impl Iterator<Item = &ResultRow> {
        self.places
            .iter()
            .flat_map(|(_, containers)| containers.iter())
            .flat_map(|(_, slots)| slots.iter())
            .flat_map(|(_, rows)| rows.iter())
    }
}

fn level_key(name: Option<&str>) -> &str {
    match name {
        Some(name) if !name.is_empty() => name,
        _ => PLACEHOLDER,
    }
}

/// Builds a fresh tree from `rows` without touching them.
pub(crate) fn group(rows: &[ResultRow]) -> GroupTree {
    let mut tree = GroupTree::default();
    for row in rows {
        tree.places
            .get_or_insert_with(level_key(row.place_name.as_deref()), ContainerGroups::default)
            .get_or_insert_with(level_key(row.container_name.as_deref()), SlotGroups::default)
            .get_or_insert_with(level_key(row.slot_name.as_deref()), Vec::new)
            .push(row.clone());
    }
    tree
}

/// Formats one row as a list entry, `?` standing in for missing values.
pub(crate) fn describe(row: &ResultRow) -> String {
    format!(
        "- {} ({}, {})",
        row.name,
        row.brand.as_deref().unwrap_or("?"),
        row.size_label.as_deref().unwrap_or("?")
    )
}

/// Flattens the tree into indented lines: place, container, slot, then one
/// line per row.
pub(crate) fn render_lines(tree: &GroupTree) -> Vec<String> {
    let mut lines = Vec::new();
    for (place, containers) in tree.places() {
        lines.push(place.to_string());
        for (container, slots) in containers.iter() {
            lines.push(format!("  {container}"));
            for (slot, rows) in slots.iter() {
                lines.push(format!("    {slot}"));
                lines.extend(rows.iter().map(|row| format!("      {}", describe(row))));
            }
        }
    }
    lines
}

/// The rendered list as a single newline-separated text.
pub(crate) fn render_text(tree: &GroupTree) -> String {
    render_lines(tree).join("\n")
}
