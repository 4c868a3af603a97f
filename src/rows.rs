//! Packing of issued items into printed table rows.
//!
//! Items are grouped by `(model, category)` in the order each group is first
//! seen, serials are sorted within a group, and every ten serials become one
//! logical row printed as up to two physical lines (four serials with the model
//! name, then six more).

use itertools::Itertools;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::hash::Hash;

/// Serials printed on the first line of a row, after the model name.
pub const SERIALS_FIRST_LINE: usize = 4;
/// Serials printed on the second line of a row.
pub const SERIALS_SECOND_LINE: usize = 6;
/// Serials folded into one logical row.
pub const SERIALS_PER_ROW: usize = SERIALS_FIRST_LINE + SERIALS_SECOND_LINE;

/// One piece of equipment currently issued to the custodian.
///
/// Missing and `null` fields both read as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IssuedItem {
    #[serde(deserialize_with = "null_as_empty")]
    pub model: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub category: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub serial: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub asset_tag: String,
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl IssuedItem {
    pub fn new(model: &str, category: &str, serial: &str, asset_tag: &str) -> Self {
        Self {
            model: model.to_string(),
            category: category.to_string(),
            serial: serial.to_string(),
            asset_tag: asset_tag.to_string(),
        }
    }

    /// The serial as printed: `SERIAL` or `SERIAL [AT:TAG]`.
    pub fn display_serial(&self) -> String {
        let serial = self.serial.trim();
        match self.asset_tag.trim() {
            "" => serial.to_string(),
            tag => format!("{serial} [AT:{tag}]"),
        }
    }
}

/// One printed table entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogicalRow {
    /// `"<model> - S/N: a, b, c, d"`
    pub line1: String,
    /// `"S/N: e, f, ..."` when the row holds more than four serials.
    pub line2: Option<String>,
    pub quantity: usize,
}

impl LogicalRow {
    fn from_pack(model: &str, pack: &[String]) -> Self {
        let split = pack.len().min(SERIALS_FIRST_LINE);
        let (first, rest) = pack.split_at(split);
        Self {
            line1: format!("{} - S/N: {}", model, first.iter().join(", ")),
            line2: (!rest.is_empty()).then(|| format!("S/N: {}", rest.iter().join(", "))),
            quantity: pack.len(),
        }
    }
}

/// Groups values by key, remembering the order in which keys first appeared.
#[derive(Debug, Clone)]
pub struct OrderedGroups<K, V> {
    index: HashMap<K, usize>,
    groups: Vec<(K, Vec<V>)>,
}

impl<K: Eq + Hash + Clone, V> OrderedGroups<K, V> {
    pub fn new() -> Self {
        Self { index: HashMap::new(), groups: Vec::new() }
    }

    pub fn push(&mut self, key: K, value: V) {
        match self.index.get(&key) {
            Some(&slot) => self.groups[slot].1.push(value),
            None => {
                self.index.insert(key.clone(), self.groups.len());
                self.groups.push((key, vec![value]));
            }
        }
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &[V])> {
        self.groups.iter().map(|(key, values)| (key, values.as_slice()))
    }
}

impl<K: Eq + Hash + Clone, V> Default for OrderedGroups<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> IntoIterator for OrderedGroups<K, V> {
    type Item = (K, Vec<V>);
    type IntoIter = std::vec::IntoIter<(K, Vec<V>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.into_iter()
    }
}

impl<K: Eq + Hash + Clone, V> FromIterator<(K, V)> for OrderedGroups<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut groups = Self::new();
        for (key, value) in iter {
            groups.push(key, value);
        }
        groups
    }
}

/// Packs `items` into logical rows.
///
/// Every item lands in exactly one row; rows of one `(model, category)` group
/// are contiguous and their serials sorted, so the result does not depend on
/// the order of items within a group.
pub fn build_rows(items: &[IssuedItem]) -> Vec<LogicalRow> {
    let groups: OrderedGroups<(&str, &str), String> = items
        .iter()
        .map(|item| ((item.model.as_str(), item.category.as_str()), item.display_serial()))
        .collect();

    let mut rows = Vec::new();
    for ((model, _category), mut serials) in groups {
        serials.sort_unstable();
        rows.extend(
            serials
                .chunks(SERIALS_PER_ROW)
                .map(|pack| LogicalRow::from_pack(model, pack)),
        );
    }

    log::debug!("Packed {} items into {} rows", items.len(), rows.len());
    rows
}
