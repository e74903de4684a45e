use crate::symbol::EncodingError;

/// Side length of a finder pattern, in modules.
pub const FINDER_SIZE: usize = 7;

/// The smallest symbol (version 1) is 21 modules wide.
pub const MIN_MODULE_COUNT: usize = 21;

/// Square grid of dark (`true`) / light (`false`) modules, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleMatrix {
    count: usize,
    modules: Vec<bool>,
}

impl ModuleMatrix {
    /// Build a matrix by asking `is_dark(row, col)` for every cell.
    pub fn from_fn<F>(count: usize, mut is_dark: F) -> Result<ModuleMatrix, EncodingError>
    where
        F: FnMut(usize, usize) -> bool,
    {
        if count < MIN_MODULE_COUNT {
            return Err(EncodingError::InvalidMatrix { count });
        }

        let mut modules = Vec::with_capacity(count * count);
        for row in 0..count {
            for col in 0..count {
                modules.push(is_dark(row, col));
            }
        }
        Ok(ModuleMatrix { count, modules })
    }

    #[cfg(test)]
    pub fn from_rows(rows: &[Vec<bool>]) -> Result<ModuleMatrix, EncodingError> {
        let count = rows.len();
        if rows.iter().any(|row| row.len() != count) {
            return Err(EncodingError::InvalidMatrix { count });
        }
        ModuleMatrix::from_fn(count, |row, col| rows[row][col])
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn is_dark(&self, row: usize, col: usize) -> bool {
        self.modules[row * self.count + col]
    }

    /// Whether the cell lies in one of the three 7×7 corner finder zones.
    pub fn is_finder_zone(&self, row: usize, col: usize) -> bool {
        let far = self.count - FINDER_SIZE;
        (row < FINDER_SIZE && col < FINDER_SIZE)
            || (row < FINDER_SIZE && col >= far)
            || (row >= far && col < FINDER_SIZE)
    }

    /// Top-left corners `(x, y)` of the finder zones: top-left, top-right, bottom-left.
    pub fn finder_origins(&self) -> [(usize, usize); 3] {
        let far = self.count - FINDER_SIZE;
        [(0, 0), (far, 0), (0, far)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_undersized_matrices() {
        assert!(matches!(
            ModuleMatrix::from_fn(7, |_, _| true),
            Err(EncodingError::InvalidMatrix { count: 7 })
        ));
    }

    #[test]
    fn rejects_ragged_rows() {
        let mut rows = vec![vec![false; 21]; 21];
        rows[3].pop();
        assert!(ModuleMatrix::from_rows(&rows).is_err());
    }

    #[test]
    fn finder_zones_cover_three_corners_only() {
        let matrix = ModuleMatrix::from_fn(25, |_, _| false).expect("valid matrix");
        let zone_cells = (0..25)
            .flat_map(|r| (0..25).map(move |c| (r, c)))
            .filter(|&(r, c)| matrix.is_finder_zone(r, c))
            .count();
        assert_eq!(zone_cells, 3 * 49);

        assert!(matrix.is_finder_zone(0, 0));
        assert!(matrix.is_finder_zone(6, 24));
        assert!(matrix.is_finder_zone(24, 6));
        assert!(!matrix.is_finder_zone(24, 24));
        assert!(!matrix.is_finder_zone(7, 7));
        assert_eq!(matrix.finder_origins(), [(0, 0), (18, 0), (0, 18)]);
    }
}
