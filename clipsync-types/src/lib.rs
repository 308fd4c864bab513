//! # clipsync-types
//!
//! Shared type definitions for the clipsync step-clip cache.
//! Positions, grid dimensions and the per-step attribute store live here so
//! hosts, controllers and the sync engine agree on one vocabulary.

pub mod range;
pub mod state;

pub use state::*;

/// Maximum number of independent note lanes (one per MIDI channel).
pub const MAX_LANES: usize = 16;

/// Maximum number of pitch rows (one per MIDI note).
pub const MAX_ROWS: usize = 128;

/// Address of one step in the grid: note lane, time column, pitch row.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct StepPosition {
    pub lane: usize,
    pub column: usize,
    pub row: usize,
}

impl StepPosition {
    pub fn new(lane: usize, column: usize, row: usize) -> Self {
        Self { lane, column, row }
    }

    /// Same lane and column, different pitch row.
    pub fn with_row(self, row: usize) -> Self {
        Self { row, ..self }
    }
}

impl std::fmt::Display for StepPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(lane {}, column {}, row {})", self.lane, self.column, self.row)
    }
}

/// Fixed capacity of a step grid, decided when the clip view is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GridDims {
    pub lanes: usize,
    pub columns: usize,
    pub rows: usize,
}

impl GridDims {
    pub fn new(lanes: usize, columns: usize, rows: usize) -> Self {
        Self { lanes, columns, rows }
    }

    pub fn contains(&self, position: StepPosition) -> bool {
        position.lane < self.lanes && position.column < self.columns && position.row < self.rows
    }
}

impl Default for GridDims {
    fn default() -> Self {
        Self {
            lanes: MAX_LANES,
            columns: 32,
            rows: MAX_ROWS,
        }
    }
}

impl std::fmt::Display for GridDims {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}x{}", self.lanes, self.columns, self.rows)
    }
}
