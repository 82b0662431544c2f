//! Uniform grid broad phase
//!
//! Buckets entity indices by `floor(pos / cell_size)`. The grid is rebuilt from
//! scratch every tick and keeps nothing between ticks.

use std::collections::HashMap;

use glam::Vec2;

use super::entity::Entity;

/// Integer cell coordinate
pub type CellKey = (i32, i32);

#[derive(Debug, Clone)]
pub struct SpatialGrid {
    cell_size: f32,
    cells: HashMap<CellKey, Vec<usize>>,
}

impl SpatialGrid {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            cells: HashMap::new(),
        }
    }

    #[inline]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Cell containing `pos`
    #[inline]
    pub fn key(&self, pos: Vec2) -> CellKey {
        (
            (pos.x / self.cell_size).floor() as i32,
            (pos.y / self.cell_size).floor() as i32,
        )
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    pub fn insert(&mut self, index: usize, pos: Vec2) {
        let key = self.key(pos);
        self.cells.entry(key).or_default().push(index);
    }

    /// Clear and re-insert every entity at its current position
    pub fn rebuild(&mut self, entities: &[Entity]) {
        self.clear();
        for (i, entity) in entities.iter().enumerate() {
            self.insert(i, entity.pos);
        }
    }

    /// Indices sharing the cell of `pos`, in insertion order (includes the
    /// querying entity itself)
    pub fn query(&self, pos: Vec2) -> &[usize] {
        self.cells
            .get(&self.key(pos))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Indices in the 3×3 block of cells around `pos`, written into `out`
    pub fn query_neighborhood_into(&self, pos: Vec2, out: &mut Vec<usize>) {
        out.clear();
        let (cx, cy) = self.key(pos);
        for dy in -1..=1 {
            for dx in -1..=1 {
                let key = (cx.saturating_add(dx), cy.saturating_add(dy));
                if let Some(bucket) = self.cells.get(&key) {
                    out.extend_from_slice(bucket);
                }
            }
        }
    }

    /// Number of non-empty cells
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_floors_negative_coordinates() {
        let grid = SpatialGrid::new(100.0);
        assert_eq!(grid.key(Vec2::new(0.0, 0.0)), (0, 0));
        assert_eq!(grid.key(Vec2::new(99.9, 199.9)), (0, 1));
        assert_eq!(grid.key(Vec2::new(-0.1, -100.0)), (-1, -1));
        assert_eq!(grid.key(Vec2::new(-100.1, 0.0)), (-2, 0));
    }

    #[test]
    fn test_query_returns_same_cell_including_self() {
        let mut grid = SpatialGrid::new(100.0);
        grid.insert(0, Vec2::new(10.0, 10.0));
        grid.insert(1, Vec2::new(90.0, 50.0));
        grid.insert(2, Vec2::new(110.0, 10.0));

        assert_eq!(grid.query(Vec2::new(10.0, 10.0)), &[0, 1]);
        assert_eq!(grid.query(Vec2::new(110.0, 10.0)), &[2]);
        assert!(grid.query(Vec2::new(-500.0, 0.0)).is_empty());
    }

    #[test]
    fn test_same_cell_misses_border_straddlers() {
        // 20 units apart, but on opposite sides of x = 100
        let mut grid = SpatialGrid::new(100.0);
        grid.insert(0, Vec2::new(90.0, 50.0));
        grid.insert(1, Vec2::new(110.0, 50.0));

        assert_eq!(grid.query(Vec2::new(90.0, 50.0)), &[0]);

        let mut out = Vec::new();
        grid.query_neighborhood_into(Vec2::new(90.0, 50.0), &mut out);
        assert_eq!(out, vec![0, 1]);
    }

    #[test]
    fn test_clear_resets_buckets() {
        let mut grid = SpatialGrid::new(100.0);
        grid.insert(0, Vec2::ZERO);
        assert_eq!(grid.cell_count(), 1);
        grid.clear();
        assert_eq!(grid.cell_count(), 0);
        assert!(grid.query(Vec2::ZERO).is_empty());
    }

    #[test]
    fn test_neighborhood_skips_far_cells() {
        let mut grid = SpatialGrid::new(100.0);
        grid.insert(0, Vec2::new(50.0, 50.0));
        grid.insert(1, Vec2::new(-50.0, -50.0));
        grid.insert(2, Vec2::new(250.0, 50.0));

        let mut out = vec![99];
        grid.query_neighborhood_into(Vec2::new(50.0, 50.0), &mut out);
        assert_eq!(out, vec![1, 0]);
    }
}
