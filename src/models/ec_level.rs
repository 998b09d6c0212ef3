use std::fmt;
use std::str::FromStr;

/// Error correction level, ordered from least to most redundancy
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum ECLevel {
    /// Low (~7% recovery capacity)
    L = 0,
    /// Medium (~15% recovery capacity)
    #[default]
    M = 1,
    /// Quartile (~25% recovery capacity)
    Q = 2,
    /// High (~30% recovery capacity)
    H = 3,
}

impl ECLevel {
    /// All levels, lowest redundancy first
    pub const ALL: [ECLevel; 4] = [ECLevel::L, ECLevel::M, ECLevel::Q, ECLevel::H];

    /// Level from its position in [`ECLevel::ALL`]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Single-letter name
    pub fn letter(&self) -> char {
        match self {
            ECLevel::L => 'L',
            ECLevel::M => 'M',
            ECLevel::Q => 'Q',
            ECLevel::H => 'H',
        }
    }

    /// Human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            ECLevel::L => "Low (L)",
            ECLevel::M => "Medium (M)",
            ECLevel::Q => "Quartile (Q)",
            ECLevel::H => "High (H)",
        }
    }

    /// Next level with more data capacity, if any
    pub fn lower(&self) -> Option<Self> {
        match self {
            ECLevel::L => None,
            ECLevel::M => Some(ECLevel::L),
            ECLevel::Q => Some(ECLevel::M),
            ECLevel::H => Some(ECLevel::Q),
        }
    }
}

impl fmt::Display for ECLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ECLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "L" | "LOW" => Ok(ECLevel::L),
            "M" | "MEDIUM" => Ok(ECLevel::M),
            "Q" | "QUARTILE" => Ok(ECLevel::Q),
            "H" | "HIGH" => Ok(ECLevel::H),
            other => Err(format!("unknown error correction level '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering() {
        assert!(ECLevel::L < ECLevel::M);
        assert!(ECLevel::Q < ECLevel::H);
        assert_eq!(ECLevel::default(), ECLevel::M);
    }

    #[test]
    fn test_parse() {
        assert_eq!("q".parse::<ECLevel>(), Ok(ECLevel::Q));
        assert_eq!("High".parse::<ECLevel>(), Ok(ECLevel::H));
        assert!("X".parse::<ECLevel>().is_err());
    }

    #[test]
    fn test_from_index() {
        assert_eq!(ECLevel::from_index(0), Some(ECLevel::L));
        assert_eq!(ECLevel::from_index(3), Some(ECLevel::H));
        assert_eq!(ECLevel::from_index(4), None);
    }
}
