use std::collections::BTreeMap;

/// A per-service causal log: each entry is a service id mapped to a counter
/// that only ever increases. Every checker owns one of these per in-flight
/// order; it is never merged across services (see DESIGN.md).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VectorClock {
    entries: BTreeMap<String, u64>,
}

impl VectorClock {
    /// A fresh clock with a single entry, as returned by `InitOrder`.
    pub fn init(service_id: &str) -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(service_id.to_owned(), 1);
        Self { entries }
    }

    pub fn entries(&self) -> &BTreeMap<String, u64> {
        &self.entries
    }

    /// Increments this clock's own entry by one, as every local event does.
    pub fn increment(&mut self, service_id: &str) {
        *self.entries.entry(service_id.to_owned()).or_insert(0) += 1;
    }

    /// `self` is dominated by `other` iff, for every key `self` holds,
    /// `self[k] <= other[k]`. Keys `other` holds that `self` lacks are
    /// treated as `0` on the `self` side and therefore never violate
    /// domination.
    pub fn is_dominated_by(&self, other: &Self) -> bool {
        self.entries
            .iter()
            .all(|(key, value)| other.entries.get(key).copied().unwrap_or(0) >= *value)
    }
}

impl From<BTreeMap<String, u64>> for VectorClock {
    fn from(entries: BTreeMap<String, u64>) -> Self {
        Self { entries }
    }
}
