use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::collections::HashMap;
use tabled::Tabled;

/// One upgrade transaction line from the export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpgradeRecord {
    #[serde(rename = "Period")]
    pub period: String,
    #[serde(rename = "Client")]
    pub client: String,
    #[serde(rename = "Vendor")]
    pub vendor: String,
    #[serde(rename = "Process")]
    pub process: String,
    #[serde(rename = "Plan")]
    pub plan: String,
    /// Always finite. Missing or unparseable input resolves to `0.0`.
    #[serde(rename = "Diff")]
    pub diff: f64,
    /// The sixth column exactly as it appeared in the file.
    #[serde(rename = "RawDiff")]
    pub raw_diff: String,
}

/// Anything that can be summed into a [`Tally`].
pub trait Accumulate: Copy + Default {
    fn accumulate(&mut self, other: Self);
}

impl Accumulate for f64 {
    fn accumulate(&mut self, other: Self) {
        *self += other;
    }
}

impl Accumulate for usize {
    fn accumulate(&mut self, other: Self) {
        *self += other;
    }
}

/// A string-keyed running total that remembers the order in which keys were
/// first seen. Ranking ties fall back to that order, so iteration must be
/// deterministic.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Tally<V> {
    entries: Vec<(String, V)>,
    index: HashMap<String, usize>,
}

impl<V: Accumulate> Tally<V> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Adds `amount` to `key`, appending the key if it has not been seen yet.
    pub fn add(&mut self, key: &str, amount: V) {
        match self.index.get(key) {
            Some(&i) => self.entries[i].1.accumulate(amount),
            None => {
                self.index.insert(key.to_string(), self.entries.len());
                let mut value = V::default();
                value.accumulate(amount);
                self.entries.push((key.to_string(), value));
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<V> {
        self.index.get(key).map(|&i| self.entries[i].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, V)> + '_ {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl<V: Accumulate + PartialOrd> Tally<V> {
    /// Entries sorted by value, largest first. Equal values keep first-seen order.
    pub fn ranked(&self) -> Vec<(String, V)> {
        let mut sorted = self.entries.clone();
        sorted.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        sorted
    }
}

impl<V: Serialize> Serialize for Tally<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Cumulative `diff` per vendor.
pub type VendorAggregate = Tally<f64>;

/// Number of records per plan.
pub type PlanAggregate = Tally<usize>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BestSeller {
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedVendor {
    pub name: String,
    pub value: f64,
    /// `value` relative to the top vendor, where the top vendor is 100.
    pub percentage: f64,
}

/// Snapshot derived from one parsed dataset. Rebuilt from scratch on every load.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStatistics {
    pub total_records: usize,
    pub total_value: f64,
    pub best_seller: BestSeller,
    pub top3_vendors: Vec<RankedVendor>,
    pub vendor_data: VendorAggregate,
    pub plan_data: PlanAggregate,
}

#[derive(Debug, Clone, Tabled)]
pub struct RecordRow {
    #[tabled(rename = "Period")]
    pub period: String,
    #[tabled(rename = "Client")]
    pub client: String,
    #[tabled(rename = "Vendor")]
    pub vendor: String,
    #[tabled(rename = "Process")]
    pub process: String,
    #[tabled(rename = "New Plan")]
    pub plan: String,
    #[tabled(rename = "Diff")]
    pub diff: String,
}

#[derive(Debug, Clone, Tabled)]
pub struct LeaderboardRow {
    #[tabled(rename = "")]
    pub medal: String,
    #[tabled(rename = "Vendor")]
    pub vendor: String,
    #[tabled(rename = "Total")]
    pub total: String,
    #[tabled(rename = "Share")]
    pub bar: String,
}

#[derive(Debug, Clone, Tabled)]
pub struct VendorBarRow {
    #[tabled(rename = "Vendor")]
    pub vendor: String,
    #[tabled(rename = "Total")]
    pub total: String,
    #[tabled(rename = "")]
    pub bar: String,
}

#[derive(Debug, Clone, Tabled)]
pub struct PlanRow {
    #[tabled(rename = "Plan")]
    pub plan: String,
    #[tabled(rename = "Records")]
    pub records: usize,
    #[tabled(rename = "Share %")]
    pub share: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tally_keeps_first_seen_order() {
        let mut t: Tally<f64> = Tally::new();
        t.add("b", 1.0);
        t.add("a", 2.0);
        t.add("b", 3.0);
        let keys: Vec<&str> = t.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(t.get("b"), Some(4.0));
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn tally_ranked_ties_follow_insertion() {
        let mut t: Tally<usize> = Tally::new();
        t.add("x", 1);
        t.add("y", 2);
        t.add("z", 1);
        let ranked = t.ranked();
        assert_eq!(
            ranked,
            vec![("y".to_string(), 2), ("x".to_string(), 1), ("z".to_string(), 1)]
        );
    }

    #[test]
    fn tally_serializes_as_ordered_object() {
        let mut t: Tally<usize> = Tally::new();
        t.add("Gold", 1);
        t.add("", 1);
        t.add("Gold", 1);
        assert_eq!(serde_json::to_string(&t).unwrap(), r#"{"Gold":2,"":1}"#);
    }
}
