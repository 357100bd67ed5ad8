//! Cell occupancy and same-colour clusters
//!
//! Clusters are the connected components of the 4-neighbour grid graph
//! restricted to equal colours. They are rebuilt wholesale by
//! `recompute_clusters` with a union-find over every adjacent pair; cells
//! never carry a cluster container of their own, only a cluster id.

use serde::{Deserialize, Serialize};

use crate::layout::Cell;

/// Index of a ball in the board's ball list
pub type BallId = usize;
/// Index of a cluster in the current partition
pub type ClusterId = usize;
/// Colour index, `0..num_colors`
pub type ColorIndex = u8;

/// Occupancy grid plus the cluster partition derived from it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grid {
    columns: usize,
    rows: usize,
    /// Column-major: `cells[col * rows + row]`
    cells: Vec<Option<BallId>>,
    /// Colour of each ball, by id
    colors: Vec<ColorIndex>,
    /// Cluster id of each occupied cell (same indexing as `cells`)
    cluster_ids: Vec<Option<ClusterId>>,
    /// Members of each cluster, in column-major order
    clusters: Vec<Vec<Cell>>,
}

impl Grid {
    /// Empty grid with no balls
    pub fn new(columns: usize, rows: usize) -> Self {
        Self {
            columns,
            rows,
            cells: vec![None; columns * rows],
            colors: Vec::new(),
            cluster_ids: vec![None; columns * rows],
            clusters: Vec::new(),
        }
    }

    /// Build a clustered grid from a column-major colour layout.
    /// Ball ids are assigned in layout order to occupied cells.
    pub fn from_colors(columns: usize, rows: usize, layout: &[Option<ColorIndex>]) -> Self {
        let mut grid = Self::new(columns, rows);
        for (idx, color) in layout.iter().take(columns * rows).enumerate() {
            if let Some(color) = *color {
                let id = grid.add_ball(color);
                grid.cells[idx] = Some(id);
            }
        }
        grid.recompute_clusters();
        grid
    }

    #[inline]
    pub fn columns(&self) -> usize {
        self.columns
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    fn index(&self, cell: Cell) -> Option<usize> {
        (cell.col < self.columns && cell.row < self.rows).then(|| cell.col * self.rows + cell.row)
    }

    #[inline]
    fn cell_of_index(&self, idx: usize) -> Cell {
        Cell::new(idx / self.rows, idx % self.rows)
    }

    /// Register a new ball colour; the ball is not placed anywhere yet
    pub fn add_ball(&mut self, color: ColorIndex) -> BallId {
        self.colors.push(color);
        self.colors.len() - 1
    }

    /// Ball occupying a cell
    #[inline]
    pub fn get(&self, cell: Cell) -> Option<BallId> {
        self.index(cell).and_then(|i| self.cells[i])
    }

    /// Place (or clear, with `None`) a cell. Clusters are stale until the
    /// next `recompute_clusters`.
    pub fn set(&mut self, cell: Cell, ball: Option<BallId>) {
        if let Some(i) = self.index(cell) {
            self.cells[i] = ball;
        }
    }

    /// Clear a cell, returning its previous occupant
    pub fn take(&mut self, cell: Cell) -> Option<BallId> {
        self.index(cell).and_then(|i| self.cells[i].take())
    }

    #[inline]
    pub fn color_of(&self, ball: BallId) -> Option<ColorIndex> {
        self.colors.get(ball).copied()
    }

    pub fn color_at(&self, cell: Cell) -> Option<ColorIndex> {
        self.get(cell).and_then(|b| self.color_of(b))
    }

    pub fn is_occupied(&self, cell: Cell) -> bool {
        self.get(cell).is_some()
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }

    pub fn column_is_empty(&self, col: usize) -> bool {
        (0..self.rows).all(|row| !self.is_occupied(Cell::new(col, row)))
    }

    /// Rebuild the cluster partition from scratch.
    ///
    /// Every occupied cell starts as a singleton; all horizontal pairs
    /// (left to right) and then all vertical pairs (top to bottom) are
    /// unioned when their colours match. O(columns x rows).
    pub fn recompute_clusters(&mut self) {
        let n = self.cells.len();
        let mut sets = DisjointSets::new(n);

        for col in 0..self.columns.saturating_sub(1) {
            for row in 0..self.rows {
                self.union_if_same_color(&mut sets, Cell::new(col, row), Cell::new(col + 1, row));
            }
        }
        for col in 0..self.columns {
            for row in 0..self.rows.saturating_sub(1) {
                self.union_if_same_color(&mut sets, Cell::new(col, row), Cell::new(col, row + 1));
            }
        }

        // Number the roots in first-seen order so ids are deterministic
        let mut root_to_cluster: Vec<Option<ClusterId>> = vec![None; n];
        self.clusters.clear();
        for idx in 0..n {
            if self.cells[idx].is_none() {
                self.cluster_ids[idx] = None;
                continue;
            }
            let root = sets.find(idx);
            let id = match root_to_cluster[root] {
                Some(id) => id,
                None => {
                    let id = self.clusters.len();
                    root_to_cluster[root] = Some(id);
                    self.clusters.push(Vec::new());
                    id
                }
            };
            self.cluster_ids[idx] = Some(id);
            let cell = self.cell_of_index(idx);
            self.clusters[id].push(cell);
        }
    }

    fn union_if_same_color(&self, sets: &mut DisjointSets, a: Cell, b: Cell) {
        let (Some(ia), Some(ib)) = (self.index(a), self.index(b)) else {
            return;
        };
        match (self.color_at(a), self.color_at(b)) {
            (Some(ca), Some(cb)) if ca == cb => sets.union(ia, ib),
            _ => {}
        }
    }

    /// Cluster id of an occupied cell
    pub fn cluster_id(&self, cell: Cell) -> Option<ClusterId> {
        self.index(cell).and_then(|i| self.cluster_ids[i])
    }

    /// All cells in the cluster containing `cell` (empty for an empty cell)
    pub fn cluster_of(&self, cell: Cell) -> &[Cell] {
        self.cluster_id(cell)
            .and_then(|id| self.clusters.get(id))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn cluster_size(&self, cell: Cell) -> usize {
        self.cluster_of(cell).len()
    }

    pub fn clusters(&self) -> &[Vec<Cell>] {
        &self.clusters
    }

    /// True if some cluster can be removed (size >= 2)
    pub fn has_clusters(&self) -> bool {
        self.clusters.iter().any(|c| c.len() >= 2)
    }

    /// Largest cluster, first in column-major order on ties
    pub fn largest_cluster(&self) -> Option<&[Cell]> {
        self.clusters
            .iter()
            .fold(None::<&Vec<Cell>>, |best, c| match best {
                Some(b) if b.len() >= c.len() => Some(b),
                _ => Some(c),
            })
            .map(Vec::as_slice)
    }
}

/// Union-find with path halving and union by size
#[derive(Debug)]
struct DisjointSets {
    parent: Vec<usize>,
    size: Vec<usize>,
}

impl DisjointSets {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            size: vec![1; n],
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let (mut ra, mut rb) = (self.find(a), self.find(b));
        if ra == rb {
            return;
        }
        if self.size[ra] < self.size[rb] {
            std::mem::swap(&mut ra, &mut rb);
        }
        self.parent[rb] = ra;
        self.size[ra] += self.size[rb];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::VecDeque;

    /// Parse rows of characters; '.' is empty, digits are colours
    fn grid_from_rows(rows: &[&str]) -> Grid {
        let height = rows.len();
        let width = rows[0].len();
        let mut layout = vec![None; width * height];
        for (row, line) in rows.iter().enumerate() {
            for (col, ch) in line.chars().enumerate() {
                layout[col * height + row] = ch.to_digit(10).map(|d| d as u8);
            }
        }
        Grid::from_colors(width, height, &layout)
    }

    /// Flood fill reference for the partition
    fn flood_cluster(grid: &Grid, start: Cell) -> Vec<Cell> {
        let Some(color) = grid.color_at(start) else {
            return Vec::new();
        };
        let mut seen = vec![false; grid.columns() * grid.rows()];
        let mut queue = VecDeque::from([start]);
        seen[start.col * grid.rows() + start.row] = true;
        let mut out = Vec::new();
        while let Some(cell) = queue.pop_front() {
            out.push(cell);
            let mut neighbours = Vec::with_capacity(4);
            if cell.col > 0 {
                neighbours.push(Cell::new(cell.col - 1, cell.row));
            }
            if cell.row > 0 {
                neighbours.push(Cell::new(cell.col, cell.row - 1));
            }
            neighbours.push(Cell::new(cell.col + 1, cell.row));
            neighbours.push(Cell::new(cell.col, cell.row + 1));
            for n in neighbours {
                if grid.color_at(n) == Some(color) && !seen[n.col * grid.rows() + n.row] {
                    seen[n.col * grid.rows() + n.row] = true;
                    queue.push_back(n);
                }
            }
        }
        out.sort_unstable();
        out
    }

    fn partition(grid: &Grid) -> Vec<Vec<Cell>> {
        let mut clusters: Vec<Vec<Cell>> = grid
            .clusters()
            .iter()
            .map(|c| {
                let mut c = c.clone();
                c.sort_unstable();
                c
            })
            .collect();
        clusters.sort();
        clusters
    }

    #[test]
    fn test_empty_cell_has_no_cluster() {
        let grid = grid_from_rows(&["0.", "00"]);
        assert_eq!(grid.cluster_id(Cell::new(1, 0)), None);
        assert!(grid.cluster_of(Cell::new(1, 0)).is_empty());
        assert_eq!(grid.cluster_size(Cell::new(0, 0)), 3);
    }

    #[test]
    fn test_isolated_ball_is_singleton() {
        let grid = grid_from_rows(&["010", "000"]);
        assert_eq!(grid.cluster_size(Cell::new(1, 0)), 1);
        assert_eq!(grid.cluster_size(Cell::new(0, 0)), 5);
    }

    #[test]
    fn test_diagonal_is_not_adjacent() {
        let grid = grid_from_rows(&["01", "10"]);
        assert_eq!(grid.clusters().len(), 4);
        assert!(!grid.has_clusters());
    }

    #[test]
    fn test_staircase_needs_both_directions() {
        // 0s form a staircase: only connected through alternating steps
        let grid = grid_from_rows(&["0011", "1001", "1100"]);
        assert_eq!(grid.cluster_size(Cell::new(0, 0)), 6);
        assert_eq!(grid.cluster_id(Cell::new(0, 0)), grid.cluster_id(Cell::new(3, 2)));
    }

    #[test]
    fn test_u_shape_merges_late() {
        // Two arms meet only at the bottom row
        let grid = grid_from_rows(&["010", "010", "000"]);
        assert_eq!(grid.cluster_size(Cell::new(0, 0)), 7);
        assert_eq!(grid.cluster_size(Cell::new(1, 0)), 2);
    }

    #[test]
    fn test_largest_cluster() {
        let grid = grid_from_rows(&["0011", "0211", "2211"]);
        let largest = grid.largest_cluster().unwrap();
        assert_eq!(largest.len(), 6);
        assert_eq!(grid.color_at(largest[0]), Some(1));
    }

    #[test]
    fn test_set_and_take_do_not_recluster() {
        let mut grid = grid_from_rows(&["00"]);
        let id = grid.take(Cell::new(1, 0)).unwrap();
        assert_eq!(grid.cluster_size(Cell::new(0, 0)), 2);
        grid.recompute_clusters();
        assert_eq!(grid.cluster_size(Cell::new(0, 0)), 1);
        grid.set(Cell::new(1, 0), Some(id));
        grid.recompute_clusters();
        assert_eq!(grid.cluster_size(Cell::new(1, 0)), 2);
    }

    fn arb_grid() -> impl Strategy<Value = Grid> {
        (1usize..8, 1usize..8).prop_flat_map(|(cols, rows)| {
            proptest::collection::vec(proptest::option::weighted(0.8, 0u8..3), cols * rows)
                .prop_map(move |layout| Grid::from_colors(cols, rows, &layout))
        })
    }

    proptest! {
        #[test]
        fn prop_clusters_match_flood_fill(grid in arb_grid()) {
            for col in 0..grid.columns() {
                for row in 0..grid.rows() {
                    let cell = Cell::new(col, row);
                    let mut ours = grid.cluster_of(cell).to_vec();
                    ours.sort_unstable();
                    prop_assert_eq!(ours, flood_cluster(&grid, cell));
                }
            }
        }

        #[test]
        fn prop_adjacent_same_color_share_cluster(grid in arb_grid()) {
            for col in 0..grid.columns() {
                for row in 0..grid.rows() {
                    let a = Cell::new(col, row);
                    for b in [Cell::new(col + 1, row), Cell::new(col, row + 1)] {
                        if let (Some(ca), Some(cb)) = (grid.color_at(a), grid.color_at(b)) {
                            prop_assert_eq!(ca == cb, grid.cluster_id(a) == grid.cluster_id(b));
                        }
                    }
                }
            }
        }

        #[test]
        fn prop_partition_covers_occupied_cells(grid in arb_grid()) {
            let total: usize = grid.clusters().iter().map(Vec::len).sum();
            prop_assert_eq!(total, grid.occupied_count());
        }

        #[test]
        fn prop_recompute_is_idempotent(grid in arb_grid()) {
            let mut again = grid.clone();
            again.recompute_clusters();
            prop_assert_eq!(partition(&grid), partition(&again));
            prop_assert_eq!(grid.clusters(), again.clusters());
        }
    }
}
