use std::collections::BTreeMap;

/// Running total per class name. Absent classes read as zero.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ClassCounters {
    counts: BTreeMap<String, u64>,
}

impl ClassCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one to `class_name` and returns the new total.
    pub fn increment(&mut self, class_name: &str) -> u64 {
        if let Some(count) = self.counts.get_mut(class_name) {
            *count += 1;
            return *count;
        }

        self.counts.insert(class_name.to_string(), 1);
        1
    }

    #[inline]
    pub fn get(&self, class_name: &str) -> u64 {
        self.counts.get(class_name).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    #[inline]
    pub fn snapshot(&self) -> BTreeMap<String, u64> {
        self.counts.clone()
    }

    #[inline]
    pub fn clear(&mut self) {
        self.counts.clear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_increment() {
        let mut counters = ClassCounters::new();

        assert_eq!(counters.get("bolt"), 0);
        assert_eq!(counters.increment("bolt"), 1);
        assert_eq!(counters.increment("bolt"), 2);
        assert_eq!(counters.increment("nut"), 1);
        assert_eq!(counters.total(), 3);
    }

    #[test]
    fn test_clear() {
        let mut counters = ClassCounters::new();
        counters.increment("bolt");
        counters.clear();

        assert_eq!(counters.get("bolt"), 0);
        assert!(counters.snapshot().is_empty());
    }
}
