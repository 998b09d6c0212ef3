use crate::models::ECLevel;

/// Byte-mode capacity of the largest symbol (version 40) at each level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityTable {
    max_bytes: [usize; 4],
}

/// Capacities used for pre-flight validation
pub const CAPACITY_TABLE: CapacityTable = CapacityTable {
    max_bytes: [2953, 2331, 1663, 1273],
};

impl CapacityTable {
    /// Maximum UTF-8 byte length encodable at `level`
    pub const fn max_bytes(&self, level: ECLevel) -> usize {
        self.max_bytes[level as usize]
    }

    /// Highest-redundancy level that still fits `len` bytes
    pub fn best_level_for(&self, len: usize) -> Option<ECLevel> {
        ECLevel::ALL
            .iter()
            .rev()
            .copied()
            .find(|&level| len <= self.max_bytes(level))
    }
}

impl Default for CapacityTable {
    fn default() -> Self {
        CAPACITY_TABLE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_values() {
        assert_eq!(CAPACITY_TABLE.max_bytes(ECLevel::L), 2953);
        assert_eq!(CAPACITY_TABLE.max_bytes(ECLevel::M), 2331);
        assert_eq!(CAPACITY_TABLE.max_bytes(ECLevel::Q), 1663);
        assert_eq!(CAPACITY_TABLE.max_bytes(ECLevel::H), 1273);
    }

    #[test]
    fn test_capacity_decreases_with_redundancy() {
        for pair in ECLevel::ALL.windows(2) {
            assert!(CAPACITY_TABLE.max_bytes(pair[0]) > CAPACITY_TABLE.max_bytes(pair[1]));
        }
    }

    #[test]
    fn test_best_level_for() {
        assert_eq!(CAPACITY_TABLE.best_level_for(10), Some(ECLevel::H));
        assert_eq!(CAPACITY_TABLE.best_level_for(1274), Some(ECLevel::Q));
        assert_eq!(CAPACITY_TABLE.best_level_for(2953), Some(ECLevel::L));
        assert_eq!(CAPACITY_TABLE.best_level_for(2954), None);
    }
}
