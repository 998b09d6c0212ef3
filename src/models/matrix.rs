/// Immutable square grid of QR modules, packed one bit per module (true = dark)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleMatrix {
    size: usize,
    data: Vec<u8>,
}

impl ModuleMatrix {
    /// Build a matrix of `size` x `size` modules, asking `dark(x, y)` for each one
    pub fn from_fn<F>(size: usize, mut dark: F) -> Self
    where
        F: FnMut(usize, usize) -> bool,
    {
        let bytes_needed = (size * size).div_ceil(8);
        let mut data = vec![0u8; bytes_needed];
        for y in 0..size {
            for x in 0..size {
                if dark(x, y) {
                    let index = y * size + x;
                    data[index / 8] |= 1 << (index % 8);
                }
            }
        }
        Self { size, data }
    }

    /// Build from row-major module colours; `None` when the count is not a perfect square
    pub fn from_modules(modules: &[bool]) -> Option<Self> {
        let size = (modules.len() as f64).sqrt().round() as usize;
        if size * size != modules.len() {
            return None;
        }
        Some(Self::from_fn(size, |x, y| modules[y * size + x]))
    }

    /// Modules per side
    pub fn size(&self) -> usize {
        self.size
    }

    /// Module at (x, y); anything outside the grid reads as light
    pub fn get(&self, x: usize, y: usize) -> bool {
        if x >= self.size || y >= self.size {
            return false;
        }
        let index = y * self.size + x;
        (self.data[index / 8] >> (index % 8)) & 1 == 1
    }

    /// Number of dark modules
    pub fn dark_count(&self) -> usize {
        self.data.iter().map(|b| b.count_ones() as usize).sum()
    }

    /// Get raw data as bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_matrix() {
        let matrix = ModuleMatrix::from_fn(8, |x, y| x == 3 && y == 4);
        assert_eq!(matrix.size(), 8);
        assert!(matrix.get(3, 4));
        assert!(!matrix.get(4, 3));
        assert_eq!(matrix.dark_count(), 1);
    }

    #[test]
    fn test_out_of_bounds() {
        let matrix = ModuleMatrix::from_fn(8, |_, _| true);
        assert!(!matrix.get(10, 10));
    }

    #[test]
    fn test_from_modules() {
        let modules = [true, false, false, true];
        let matrix = ModuleMatrix::from_modules(&modules).unwrap();
        assert_eq!(matrix.size(), 2);
        assert!(matrix.get(0, 0));
        assert!(matrix.get(1, 1));
        assert!(ModuleMatrix::from_modules(&[true, false, true]).is_none());
    }
}
