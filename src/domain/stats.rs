use serde::Serialize;
use std::collections::BTreeMap;

/// Named counters collected during one traversal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Statistics {
    counters: BTreeMap<String, u64>,
}

impl Statistics {
    pub const SYMBOL_USAGES: &'static str = "symbol-usages-emitted";
    pub const NAME_USAGES: &'static str = "name-usages-emitted";
    pub const MISSING_IMPLEMENTS: &'static str = "warning-missing-implements-node";
    pub const DIAGNOSTICS: &'static str = "diagnostics-emitted";
    pub const REFUSED_DIAGNOSTIC_EDGES: &'static str = "refused-diagnostic-edges";
    pub const METADATA_LOAD_FAILURES: &'static str = "metadata-load-failures";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, name: &str) {
        self.add(name, 1);
    }

    pub fn add(&mut self, name: &str, amount: u64) {
        *self.counters.entry(name.to_string()).or_insert(0) += amount;
    }

    pub fn get(&self, name: &str) -> u64 {
        self.counters.get(name).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counters.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Adds every counter of `other` into `self`.
    pub fn merge(&mut self, other: &Statistics) {
        for (name, value) in other.iter() {
            self.add(name, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate_and_merge() {
        let mut a = Statistics::new();
        a.increment(Statistics::NAME_USAGES);
        a.increment(Statistics::NAME_USAGES);
        let mut b = Statistics::new();
        b.add(Statistics::NAME_USAGES, 3);
        b.increment(Statistics::DIAGNOSTICS);
        a.merge(&b);
        assert_eq!(a.get(Statistics::NAME_USAGES), 5);
        assert_eq!(a.get(Statistics::DIAGNOSTICS), 1);
        assert_eq!(a.get("missing"), 0);
    }
}
