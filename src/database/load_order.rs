//! Foreign-key load order
//!
//! Kahn's algorithm over a table -> dependencies map. Tables are placed in
//! levels: level 1 has no dependencies, each later level only depends on
//! earlier ones. Every level is sorted by name so the result is stable.
//! Tables that can never be placed (cycles, self references, or references
//! to tables outside the map) are appended in name order with level `-1`.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Level given to tables that cannot be ordered
pub const UNRESOLVED_LEVEL: i64 = -1;

/// Total order plus the level of each table
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct LoadOrder {
    pub order: Vec<String>,
    pub levels: BTreeMap<String, i64>,
}

impl LoadOrder {
    pub fn level(&self, table: &str) -> Option<i64> {
        self.levels.get(table).copied()
    }

    /// Tables tagged with the unresolved level
    pub fn unresolved(&self) -> Vec<&str> {
        self.order
            .iter()
            .filter(|t| self.levels.get(t.as_str()) == Some(&UNRESOLVED_LEVEL))
            .map(String::as_str)
            .collect()
    }
}

/// Compute the load order of `dependencies` (table -> tables it depends on)
pub fn calculate_load_order(dependencies: &BTreeMap<String, Vec<String>>) -> LoadOrder {
    let deps: BTreeMap<&str, BTreeSet<&str>> = dependencies
        .iter()
        .map(|(table, deps)| (table.as_str(), deps.iter().map(String::as_str).collect()))
        .collect();

    let mut remaining: BTreeMap<&str, usize> =
        deps.iter().map(|(table, deps)| (*table, deps.len())).collect();

    let mut result = LoadOrder::default();
    let mut ready: Vec<&str> = remaining
        .iter()
        .filter(|(_, count)| **count == 0)
        .map(|(table, _)| *table)
        .collect();
    let mut level = 1;

    while !ready.is_empty() {
        ready.sort_unstable();
        let batch = std::mem::take(&mut ready);

        for table in batch {
            result.order.push(table.to_string());
            result.levels.insert(table.to_string(), level);

            for (dependent, dependent_deps) in &deps {
                if !dependent_deps.contains(&table) {
                    continue;
                }
                if let Some(count) = remaining.get_mut(dependent) {
                    *count -= 1;
                    if *count == 0 {
                        ready.push(*dependent);
                    }
                }
            }
        }

        level += 1;
    }

    for table in deps.keys() {
        if !result.levels.contains_key(*table) {
            result.order.push(table.to_string());
            result.levels.insert(table.to_string(), UNRESOLVED_LEVEL);
        }
    }

    result
}
