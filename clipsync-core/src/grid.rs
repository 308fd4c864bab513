//! Sparse lane x column x row cache of step attributes.
//!
//! Cells are allocated on first write (or first host observation) and are
//! never removed, only overwritten. Unallocated cells read as
//! `StepAttributes::EMPTY`. Allocation runs under the grid mutex so two
//! callers racing on the same absent cell end up sharing one instance.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use clipsync_types::{GridDims, StepAttributes, StepPosition};

use crate::error::GridError;

/// Shared handle to one materialized cell.
pub type StepCell = Arc<RwLock<StepAttributes>>;

type RowCells = Vec<Option<StepCell>>;
type ColumnCells = Vec<Option<RowCells>>;

pub struct StepGrid {
    dims: GridDims,
    lanes: Mutex<Vec<Option<ColumnCells>>>,
}

fn read_cell(cell: &StepCell) -> StepAttributes {
    cell.read().unwrap_or_else(PoisonError::into_inner).clone()
}

fn write_cell(cell: &StepCell, attributes: &StepAttributes) {
    cell.write()
        .unwrap_or_else(PoisonError::into_inner)
        .copy_from(attributes);
}

fn cell_is_set(cell: &StepCell) -> bool {
    cell.read().unwrap_or_else(PoisonError::into_inner).is_set()
}

fn empty_slots<T>(len: usize) -> Vec<Option<T>> {
    (0..len).map(|_| None).collect()
}

impl StepGrid {
    pub fn new(dims: GridDims) -> Self {
        Self {
            lanes: Mutex::new(empty_slots(dims.lanes)),
            dims,
        }
    }

    pub fn dims(&self) -> GridDims {
        self.dims
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Option<ColumnCells>>> {
        self.lanes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn check(&self, position: StepPosition) -> Result<(), GridError> {
        if self.dims.contains(position) {
            Ok(())
        } else {
            Err(GridError::OutOfRange {
                position,
                dims: self.dims,
            })
        }
    }

    fn cell(&self, position: StepPosition) -> Option<StepCell> {
        let lanes = self.lock();
        let cell = lanes
            .get(position.lane)?
            .as_ref()?
            .get(position.column)?
            .as_ref()?
            .get(position.row)?
            .clone();
        cell
    }

    pub fn is_materialized(&self, position: StepPosition) -> bool {
        self.cell(position).is_some()
    }

    /// Cached content, `None` when the cell was never materialized.
    pub fn try_get(&self, position: StepPosition) -> Result<Option<StepAttributes>, GridError> {
        self.check(position)?;
        Ok(self.cell(position).map(|cell| read_cell(&cell)))
    }

    /// Cached content or the empty value. Out-of-range positions are logged.
    pub fn get(&self, position: StepPosition) -> StepAttributes {
        match self.try_get(position) {
            Ok(Some(step)) => step,
            Ok(None) => StepAttributes::EMPTY,
            Err(e) => {
                log::warn!(target: "grid", "read dropped: {}", e);
                StepAttributes::EMPTY
            }
        }
    }

    /// Materialize the cell if needed and hand back the shared handle.
    pub fn get_or_create(&self, position: StepPosition) -> Result<StepCell, GridError> {
        self.check(position)?;
        let dims = self.dims;
        let mut lanes = self.lock();
        let columns = lanes[position.lane].get_or_insert_with(|| empty_slots(dims.columns));
        let rows = columns[position.column].get_or_insert_with(|| empty_slots(dims.rows));
        let cell = rows[position.row]
            .get_or_insert_with(|| Arc::new(RwLock::new(StepAttributes::EMPTY)));
        Ok(Arc::clone(cell))
    }

    /// Overwrite a cell with a copy of `attributes`.
    pub fn store(&self, position: StepPosition, attributes: &StepAttributes) -> Result<(), GridError> {
        let cell = self.get_or_create(position)?;
        write_cell(&cell, attributes);
        Ok(())
    }

    /// Mutate a cell in place, materializing it first.
    pub fn update<R>(
        &self,
        position: StepPosition,
        f: impl FnOnce(&mut StepAttributes) -> R,
    ) -> Result<R, GridError> {
        let cell = self.get_or_create(position)?;
        let mut guard = cell.write().unwrap_or_else(PoisonError::into_inner);
        Ok(f(&mut guard))
    }

    /// Reset a materialized cell to empty. Absent cells stay absent.
    pub fn clear_step(&self, position: StepPosition) -> Result<(), GridError> {
        self.check(position)?;
        if let Some(cell) = self.cell(position) {
            write_cell(&cell, &StepAttributes::EMPTY);
        }
        Ok(())
    }

    pub fn clear_row(&self, lane: usize, row: usize) {
        let lanes = self.lock();
        let Some(Some(columns)) = lanes.get(lane) else {
            return;
        };
        for rows in columns.iter().flatten() {
            if let Some(Some(cell)) = rows.get(row) {
                write_cell(cell, &StepAttributes::EMPTY);
            }
        }
    }

    pub fn clear_lane(&self, lane: usize) {
        let lanes = self.lock();
        if let Some(Some(columns)) = lanes.get(lane) {
            clear_columns(columns);
        }
    }

    pub fn clear_all(&self) {
        let lanes = self.lock();
        for columns in lanes.iter().flatten() {
            clear_columns(columns);
        }
    }

    /// Move a step's content to another row of the same lane and column.
    pub fn move_step(&self, position: StepPosition, new_row: usize) -> Result<(), GridError> {
        let target = position.with_row(new_row);
        self.check(position)?;
        self.check(target)?;
        if position == target {
            return Ok(());
        }
        let content = self.get(position);
        self.store(target, &content)?;
        self.clear_step(position)
    }

    // --- aggregate queries ---

    /// Whether any column of `lane` holds a non-Off step on `row`.
    pub fn has_row_data(&self, lane: usize, row: usize) -> bool {
        if !self.lane_in_range(lane) {
            return false;
        }
        let lanes = self.lock();
        let Some(Some(columns)) = lanes.get(lane) else {
            return false;
        };
        row_has_data(columns, row)
    }

    /// Whether any lane holds a non-Off step on `row`.
    pub fn has_any_row_data(&self, row: usize) -> bool {
        let lanes = self.lock();
        lanes.iter().flatten().any(|columns| row_has_data(columns, row))
    }

    pub fn lowest_row_with_data(&self, lane: usize) -> Option<usize> {
        self.lane_row_span(lane).map(|(low, _)| low)
    }

    pub fn highest_row_with_data(&self, lane: usize) -> Option<usize> {
        self.lane_row_span(lane).map(|(_, high)| high)
    }

    pub fn lowest_row_with_data_any(&self) -> Option<usize> {
        self.row_span_any().map(|(low, _)| low)
    }

    pub fn highest_row_with_data_any(&self) -> Option<usize> {
        self.row_span_any().map(|(_, high)| high)
    }

    fn lane_in_range(&self, lane: usize) -> bool {
        if lane < self.dims.lanes {
            return true;
        }
        log::warn!(target: "grid", "lane {} outside grid {}", lane, self.dims);
        false
    }

    fn lane_row_span(&self, lane: usize) -> Option<(usize, usize)> {
        if !self.lane_in_range(lane) {
            return None;
        }
        let lanes = self.lock();
        row_span(lanes.get(lane)?.as_ref()?)
    }

    fn row_span_any(&self) -> Option<(usize, usize)> {
        let lanes = self.lock();
        lanes
            .iter()
            .flatten()
            .filter_map(row_span)
            .reduce(|(lo, hi), (l, h)| (lo.min(l), hi.max(h)))
    }
}

fn clear_columns(columns: &ColumnCells) {
    for cell in columns.iter().flatten().flatten().flatten() {
        write_cell(cell, &StepAttributes::EMPTY);
    }
}

fn row_has_data(columns: &ColumnCells, row: usize) -> bool {
    columns.iter().flatten().any(|rows| match rows.get(row) {
        Some(Some(cell)) => cell_is_set(cell),
        _ => false,
    })
}

/// Lowest and highest row holding a non-Off step, across all columns.
fn row_span(columns: &ColumnCells) -> Option<(usize, usize)> {
    let mut span: Option<(usize, usize)> = None;
    for rows in columns.iter().flatten() {
        for (row, slot) in rows.iter().enumerate() {
            let Some(cell) = slot else { continue };
            if !cell_is_set(cell) {
                continue;
            }
            span = Some(match span {
                Some((lo, hi)) => (lo.min(row), hi.max(row)),
                None => (row, row),
            });
        }
    }
    span
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipsync_types::StepState;
    use std::thread;

    fn grid() -> StepGrid {
        StepGrid::new(GridDims::new(16, 32, 128))
    }

    fn note() -> StepAttributes {
        StepAttributes::note(0.8, 0.25)
    }

    #[test]
    fn unwritten_cell_reads_empty_without_materializing() {
        let g = grid();
        let p = StepPosition::new(2, 3, 60);
        assert_eq!(g.get(p), StepAttributes::EMPTY);
        assert_eq!(g.try_get(p).unwrap(), None);
        assert!(!g.is_materialized(p));
    }

    #[test]
    fn out_of_range_reads_empty() {
        let g = grid();
        let p = StepPosition::new(99, 0, 0);
        assert_eq!(g.get(p), StepAttributes::EMPTY);
        assert!(matches!(g.try_get(p), Err(GridError::OutOfRange { .. })));
        assert!(g.get_or_create(StepPosition::new(0, 0, 128)).is_err());
        assert!(g.store(StepPosition::new(0, 32, 0), &note()).is_err());
    }

    #[test]
    fn store_then_get() {
        let g = grid();
        let p = StepPosition::new(0, 4, 36);
        g.store(p, &note()).unwrap();
        assert_eq!(g.get(p).state(), StepState::Onset);
        assert_eq!(g.get(p).velocity(), 0.8);
    }

    #[test]
    fn get_or_create_returns_same_instance() {
        let g = grid();
        let p = StepPosition::new(1, 1, 1);
        let a = g.get_or_create(p).unwrap();
        let b = g.get_or_create(p).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn racing_creators_share_one_cell() {
        let g = Arc::new(grid());
        let p = StepPosition::new(5, 10, 64);
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let g = Arc::clone(&g);
                thread::spawn(move || {
                    let cell = g.get_or_create(p).unwrap();
                    cell.write().unwrap().set_velocity(i as f64 / 10.0);
                    cell
                })
            })
            .collect();
        let cells: Vec<StepCell> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for cell in &cells[1..] {
            assert!(Arc::ptr_eq(&cells[0], cell));
        }
        let final_velocity = g.get(p).velocity();
        assert_eq!(final_velocity, cells[0].read().unwrap().velocity());
    }

    #[test]
    fn update_mutates_in_place() {
        let g = grid();
        let p = StepPosition::new(0, 0, 0);
        let handle = g.get_or_create(p).unwrap();
        g.update(p, |s| s.set_pan(0.5)).unwrap();
        assert_eq!(handle.read().unwrap().pan(), 0.5);
    }

    #[test]
    fn row_span_per_lane() {
        let g = grid();
        for (column, row) in [(0, 5), (3, 2), (7, 7)] {
            g.store(StepPosition::new(0, column, row), &note()).unwrap();
        }
        assert_eq!(g.lowest_row_with_data(0), Some(2));
        assert_eq!(g.highest_row_with_data(0), Some(7));
        assert_eq!(g.lowest_row_with_data(1), None);
        assert_eq!(g.highest_row_with_data(1), None);
        assert!(g.has_row_data(0, 5));
        assert!(!g.has_row_data(0, 6));
        assert!(!g.has_row_data(1, 5));
    }

    #[test]
    fn off_cells_do_not_count_as_data() {
        let g = grid();
        let p = StepPosition::new(0, 0, 40);
        g.get_or_create(p).unwrap();
        assert!(!g.has_row_data(0, 40));
        assert_eq!(g.lowest_row_with_data(0), None);
    }

    #[test]
    fn global_span_covers_all_lanes() {
        let g = grid();
        g.store(StepPosition::new(3, 0, 50), &note()).unwrap();
        g.store(StepPosition::new(9, 4, 12), &note()).unwrap();
        assert_eq!(g.lowest_row_with_data_any(), Some(12));
        assert_eq!(g.highest_row_with_data_any(), Some(50));
        assert!(g.has_any_row_data(50));
        assert!(!g.has_any_row_data(51));
    }

    #[test]
    fn queries_on_bad_lane_return_none() {
        let g = grid();
        assert_eq!(g.lowest_row_with_data(99), None);
        assert!(!g.has_row_data(99, 0));
        assert_eq!(g.lowest_row_with_data_any(), None);
    }

    #[test]
    fn clears_overwrite_but_keep_cells() {
        let g = grid();
        let a = StepPosition::new(0, 0, 10);
        let b = StepPosition::new(0, 1, 10);
        let c = StepPosition::new(1, 0, 20);
        for p in [a, b, c] {
            g.store(p, &note()).unwrap();
        }

        g.clear_row(0, 10);
        assert!(!g.get(a).is_set());
        assert!(!g.get(b).is_set());
        assert!(g.is_materialized(a));
        assert!(g.get(c).is_set());

        g.clear_lane(1);
        assert!(!g.get(c).is_set());

        g.store(a, &note()).unwrap();
        g.clear_all();
        assert!(!g.get(a).is_set());

        g.store(b, &note()).unwrap();
        g.clear_step(b).unwrap();
        assert!(!g.get(b).is_set());
    }

    #[test]
    fn move_step_transfers_content() {
        let g = grid();
        let p = StepPosition::new(0, 2, 60);
        g.store(p, &note()).unwrap();
        g.move_step(p, 64).unwrap();
        assert!(!g.get(p).is_set());
        assert_eq!(g.get(p.with_row(64)).velocity(), 0.8);
        assert!(g.move_step(p.with_row(64), 200).is_err());
    }
}
