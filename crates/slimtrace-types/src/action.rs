use crate::record::Record;

/// A declarative edit proposed by a strategy (spec §3). Strategies never
/// mutate their input; every edit they want is expressed as an `Action` and
/// folded by the applier.
#[derive(Debug, Clone)]
pub enum Action {
    /// Remove the record at this index entirely.
    Drop(usize),
    /// Substitute a rewritten record. The replacement must keep `uuid` and
    /// `parent_uuid` identical to the original.
    Replace(usize, Record),
    /// Collapse the contiguous, inclusive range `[first, last]` into one
    /// synthetic record. Its `uuid`/`parent_uuid` must equal the first
    /// original record's.
    ReplaceRange(usize, usize, Record),
}

impl Action {
    /// The highest record index this action touches, used to sort actions
    /// back-to-front before folding so earlier indices stay valid.
    pub fn max_index(&self) -> usize {
        match self {
            Action::Drop(i) => *i,
            Action::Replace(i, _) => *i,
            Action::ReplaceRange(_, last, _) => *last,
        }
    }

    /// The lowest record index this action touches.
    pub fn min_index(&self) -> usize {
        match self {
            Action::Drop(i) => *i,
            Action::Replace(i, _) => *i,
            Action::ReplaceRange(first, _, _) => *first,
        }
    }

    /// Whether this action's index span overlaps another's — a strategy bug
    /// per spec §4.4 ("this is a strategy bug if violated").
    pub fn overlaps(&self, other: &Action) -> bool {
        self.min_index() <= other.max_index() && other.min_index() <= self.max_index()
    }
}

/// The declarative result of running one strategy over a record sequence.
#[derive(Debug, Clone, Default)]
pub struct StrategyResult {
    pub strategy_name: String,
    pub actions: Vec<Action>,
    pub removed_count: usize,
    pub modified_count: usize,
    pub bytes_saved: i64,
    /// Non-fatal diagnostics, e.g. an overlapping action that was dropped,
    /// or a record orphaned by this strategy's edits.
    pub warnings: Vec<String>,
    pub orphaned_count: usize,
}

impl StrategyResult {
    pub fn empty(strategy_name: impl Into<String>) -> Self {
        StrategyResult {
            strategy_name: strategy_name.into(),
            ..Default::default()
        }
    }

    pub fn is_noop(&self) -> bool {
        self.actions.is_empty()
    }
}
