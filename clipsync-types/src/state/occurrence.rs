//! Occurrence conditions: when a step fires relative to what played before.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Occurrence {
    #[default]
    Always,
    /// Only on the first loop iteration
    First,
    NotFirst,
    /// Only if the previous step on this key played
    Prev,
    NotPrev,
    /// Only if any note on the same lane played on the previous step
    PrevChannel,
    NotPrevChannel,
    /// Only if the same key played on the previous step
    PrevKey,
    NotPrevKey,
    /// Only while fill mode is active
    Fill,
    NotFill,
}

impl Occurrence {
    /// All conditions in their fixed order.
    pub fn all() -> &'static [Occurrence] {
        &[
            Occurrence::Always,
            Occurrence::First,
            Occurrence::NotFirst,
            Occurrence::Prev,
            Occurrence::NotPrev,
            Occurrence::PrevChannel,
            Occurrence::NotPrevChannel,
            Occurrence::PrevKey,
            Occurrence::NotPrevKey,
            Occurrence::Fill,
            Occurrence::NotFill,
        ]
    }

    pub fn index(self) -> usize {
        Self::all().iter().position(|&o| o == self).unwrap_or(0)
    }

    /// Look up by list index; out-of-range indices clamp to the ends.
    pub fn from_index(index: usize) -> Occurrence {
        let all = Self::all();
        all[index.min(all.len() - 1)]
    }

    /// The following condition, staying on the last one at the end.
    pub fn next(self) -> Occurrence {
        Self::from_index(self.index() + 1)
    }

    /// The preceding condition, staying on the first one at the start.
    pub fn prev(self) -> Occurrence {
        Self::from_index(self.index().saturating_sub(1))
    }

    pub fn name(self) -> &'static str {
        match self {
            Occurrence::Always => "Always",
            Occurrence::First => "First",
            Occurrence::NotFirst => "Not First",
            Occurrence::Prev => "Prev",
            Occurrence::NotPrev => "Not Prev",
            Occurrence::PrevChannel => "Prev Channel",
            Occurrence::NotPrevChannel => "Not Prev Channel",
            Occurrence::PrevKey => "Prev Key",
            Occurrence::NotPrevKey => "Not Prev Key",
            Occurrence::Fill => "Fill",
            Occurrence::NotFill => "Not Fill",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_clamps_at_end() {
        assert_eq!(Occurrence::Always.next(), Occurrence::First);
        assert_eq!(Occurrence::Fill.next(), Occurrence::NotFill);
        assert_eq!(Occurrence::NotFill.next(), Occurrence::NotFill);
    }

    #[test]
    fn prev_clamps_at_start() {
        assert_eq!(Occurrence::First.prev(), Occurrence::Always);
        assert_eq!(Occurrence::Always.prev(), Occurrence::Always);
    }

    #[test]
    fn index_round_trips_through_list() {
        for (i, &o) in Occurrence::all().iter().enumerate() {
            assert_eq!(o.index(), i);
        }
        assert_eq!(Occurrence::from_index(999), Occurrence::NotFill);
    }
}
