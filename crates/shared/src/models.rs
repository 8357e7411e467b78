//! Data models for the scrape pipeline.
//!
//! Categories are discovered from the catalog, icons are collected per
//! category into a [`CategoryIconMap`], and the two JSON artifacts are
//! projections of that map plus [`ScrapeMetadata`].

use chrono::{Local, NaiveDateTime, SubsecRound, Timelike};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A category filter discovered on the catalog page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    /// Id of the category's input element, used to re-find its control
    pub id: String,
    /// Normalized name (lowercase, `[a-z0-9-]` only)
    pub name: String,
}

/// Icons per category name, in the order categories were scraped.
///
/// An entry is written once; later inserts under the same name are refused.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryIconMap(IndexMap<String, Vec<String>>);

impl CategoryIconMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a category's icons. Returns `false` (and leaves the map
    /// untouched) if the category already has an entry.
    pub fn insert(&mut self, name: impl Into<String>, icons: Vec<String>) -> bool {
        match self.0.entry(name.into()) {
            indexmap::map::Entry::Occupied(_) => false,
            indexmap::map::Entry::Vacant(slot) => {
                slot.insert(icons);
                true
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.0.get(name).map(Vec::as_slice)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of icon counts over all categories
    pub fn total_icons(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(name, icons)| (name.as_str(), icons.as_slice()))
    }

    /// Category names in lexicographic order
    pub fn sorted_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.0.keys().cloned().collect();
        names.sort();
        names
    }

    /// Icon count per category, keyed in lexicographic order
    pub fn counts(&self) -> BTreeMap<String, usize> {
        self.0
            .iter()
            .map(|(name, icons)| (name.clone(), icons.len()))
            .collect()
    }
}

/// Run-level totals written into both artifacts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeMetadata {
    #[serde(with = "iso_micros")]
    pub scrape_date: NaiveDateTime,
    pub total_categories: usize,
    pub total_icons: usize,
}

impl ScrapeMetadata {
    /// Totals for `map`, stamped with `scrape_date`
    pub fn for_map(map: &CategoryIconMap, scrape_date: NaiveDateTime) -> Self {
        Self {
            scrape_date,
            total_categories: map.len(),
            total_icons: map.total_icons(),
        }
    }

    /// Totals for `map`, stamped with the current local time to the
    /// microsecond
    pub fn now(map: &CategoryIconMap) -> Self {
        Self::for_map(map, Local::now().naive_local().trunc_subsecs(6))
    }
}

/// `YYYY-MM-DDTHH:MM:SS[.ffffff]`: six fraction digits, omitted when zero.
/// Reading accepts any fraction length.
mod iso_micros {
    use super::*;
    use serde::{Deserializer, Serializer};

    const WHOLE_SECONDS: &str = "%Y-%m-%dT%H:%M:%S";
    const MICROS: &str = "%Y-%m-%dT%H:%M:%S%.6f";

    pub fn serialize<S: Serializer>(date: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        let format = if date.nanosecond() == 0 {
            WHOLE_SECONDS
        } else {
            MICROS
        };
        serializer.collect_str(&date.format(format))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Artifact A: every scraped category with its icons
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDump {
    pub metadata: ScrapeMetadata,
    pub categories: CategoryIconMap,
}

/// Artifact B: category names and counts without the icon lists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub metadata: ScrapeMetadata,
    pub category_names: Vec<String>,
    pub category_counts: BTreeMap<String, usize>,
}

impl CategorySummary {
    /// Project `map` into a summary carrying `metadata`
    pub fn derive(map: &CategoryIconMap, metadata: ScrapeMetadata) -> Self {
        Self {
            metadata,
            category_names: map.sorted_names(),
            category_counts: map.counts(),
        }
    }

    /// Whether the counts agree with the metadata totals
    pub fn is_consistent(&self) -> bool {
        self.category_counts.values().sum::<usize>() == self.metadata.total_icons
            && self.category_names.len() == self.metadata.total_categories
            && self.category_names.len() == self.category_counts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn icons(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn sample_map() -> CategoryIconMap {
        let mut map = CategoryIconMap::new();
        map.insert("travel", icons(&["fa-solid fa-plane", "fa-solid fa-car"]));
        map.insert("animals", icons(&["fa-solid fa-cat", "fa-solid fa-dog", "fa-solid fa-fish"]));
        map
    }

    #[test]
    fn test_insert_refuses_overwrite() {
        let mut map = sample_map();
        assert!(!map.insert("travel", icons(&["fa-solid fa-train"])));
        assert_eq!(map.get("travel").map(<[String]>::len), Some(2));
    }

    #[test]
    fn test_serializes_in_insertion_order() {
        let json = serde_json::to_string(&sample_map()).unwrap();
        let travel = json.find("travel").unwrap();
        let animals = json.find("animals").unwrap();
        assert!(travel < animals);
    }

    #[test]
    fn test_summary_is_sorted_and_consistent() {
        let map = sample_map();
        let summary = CategorySummary::derive(&map, ScrapeMetadata::now(&map));

        assert_eq!(summary.category_names, vec!["animals", "travel"]);
        assert_eq!(summary.category_counts["animals"], 3);
        assert_eq!(summary.metadata.total_icons, 5);
        assert_eq!(summary.metadata.total_categories, 2);
        assert!(summary.is_consistent());
    }

    #[test]
    fn test_stale_metadata_is_inconsistent() {
        let map = sample_map();
        let mut metadata = ScrapeMetadata::now(&map);
        metadata.total_icons += 1;
        assert!(!CategorySummary::derive(&map, metadata).is_consistent());
    }

    #[test]
    fn test_reads_fractional_iso_timestamp() {
        let json = r#"{
            "metadata": {"scrape_date": "2025-11-05T10:12:33.123456", "total_categories": 1, "total_icons": 1},
            "categories": {"animals": ["fa-solid fa-cat"]}
        }"#;
        let dump: CategoryDump = serde_json::from_str(json).unwrap();
        assert_eq!(dump.categories.len(), 1);
        assert_eq!(dump.metadata.scrape_date.to_string(), "2025-11-05 10:12:33.123456");
    }

    #[test]
    fn test_scrape_date_is_written_to_the_microsecond() {
        let map = CategoryIconMap::new();
        let metadata = ScrapeMetadata::now(&map);
        assert_eq!(metadata.scrape_date.nanosecond() % 1_000, 0);

        let date: NaiveDateTime = "2025-11-05T10:12:33.292616162".parse().unwrap();
        let json = serde_json::to_value(ScrapeMetadata::for_map(&map, date.trunc_subsecs(6))).unwrap();
        assert_eq!(json["scrape_date"], "2025-11-05T10:12:33.292616");

        let json = serde_json::to_value(ScrapeMetadata::for_map(&map, date.trunc_subsecs(0))).unwrap();
        assert_eq!(json["scrape_date"], "2025-11-05T10:12:33");

        let date: NaiveDateTime = "2025-11-05T10:12:33.120".parse().unwrap();
        let json = serde_json::to_value(ScrapeMetadata::for_map(&map, date)).unwrap();
        assert_eq!(json["scrape_date"], "2025-11-05T10:12:33.120000");
    }
}
