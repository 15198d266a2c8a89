use super::Rider;
use std::ops::{Index, IndexMut, RangeInclusive};

/// The riders on a route, in pickup order.
///
/// Riders are addressed by their 1-based position, so the indices are always
/// exactly `1..=len()`: riders are only ever appended and never removed or
/// re-ordered. The newest rider (index `len()`) is the one being inserted into
/// the route; everyone before it is an *active* rider.
///
/// The insertion engine takes the ledger by value, rewrites the detour state
/// of the affected riders, and hands it back, so a ledger is never observed
/// half-updated.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RouteLedger {
    riders: Vec<Rider>,
    insertion_point: Option<usize>,
}

impl RouteLedger {
    /// An empty route
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a rider, returning its index.
    ///
    /// Only the first rider on a route may be bootstrapped. Any previously
    /// applied insertion point referred to a different newest rider, so it is
    /// forgotten.
    pub fn push(&mut self, rider: Rider) -> Result<usize, LedgerError> {
        let idx = self.riders.len() + 1;
        if rider.is_bootstrapped() && idx > 1 {
            return Err(LedgerError::MisplacedBootstrap(idx));
        }
        self.riders.push(rider);
        self.insertion_point = None;
        Ok(idx)
    }

    /// The number of riders on the route, including the newest
    pub fn len(&self) -> usize {
        self.riders.len()
    }

    /// Whether the route has no riders
    pub fn is_empty(&self) -> bool {
        self.riders.is_empty()
    }

    /// The rider at `idx`, if there is one
    pub fn get(&self, idx: usize) -> Option<&Rider> {
        idx.checked_sub(1).and_then(|i| self.riders.get(i))
    }

    /// The rider at `idx`, mutably
    pub fn get_mut(&mut self, idx: usize) -> Option<&mut Rider> {
        idx.checked_sub(1).and_then(move |i| self.riders.get_mut(i))
    }

    /// The rider at `idx`, or an error naming the missing index
    pub fn rider(&self, idx: usize) -> Result<&Rider, LedgerError> {
        self.get(idx).ok_or(LedgerError::UnknownRider(idx))
    }

    /// The index of the rider being inserted
    pub fn newest_index(&self) -> Option<usize> {
        (!self.riders.is_empty()).then_some(self.riders.len())
    }

    /// The rider being inserted
    pub fn newest(&self) -> Option<&Rider> {
        self.riders.last()
    }

    /// The indices of all riders already on the route, `1..=N-1`.
    ///
    /// Empty when the route holds fewer than two riders.
    pub fn active_indices(&self) -> RangeInclusive<usize> {
        1..=self.riders.len().saturating_sub(1)
    }

    /// The index of the last active rider, `N-1`, which is also the last one picked up
    pub fn last_active_index(&self) -> Option<usize> {
        (self.riders.len() >= 2).then(|| self.riders.len() - 1)
    }

    /// Iterates over `(index, rider)` pairs in pickup order
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Rider)> {
        self.riders.iter().enumerate().map(|(i, rider)| (i + 1, rider))
    }

    /// Iterates mutably over `(index, rider)` pairs in pickup order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (usize, &mut Rider)> {
        self.riders
            .iter_mut()
            .enumerate()
            .map(|(i, rider)| (i + 1, rider))
    }

    /// The drop-off position `t_j` last applied to the newest rider, if any
    pub fn insertion_point(&self) -> Option<usize> {
        self.insertion_point
    }

    /// Records that the newest rider is dropped off right after the rider at `t_j`.
    pub fn record_insertion(&mut self, t_j: usize) -> Result<(), LedgerError> {
        self.check_insertion_point(t_j)?;
        self.insertion_point = Some(t_j);
        Ok(())
    }

    /// Ensures there is at least one active rider and a newest rider to insert.
    pub fn check_insertable(&self) -> Result<(), LedgerError> {
        if self.riders.len() < 2 {
            Err(LedgerError::TooFewRiders(self.riders.len()))
        } else {
            Ok(())
        }
    }

    /// Ensures `t_j` is a valid drop-off position, `1..=N`.
    pub fn check_insertion_point(&self, t_j: usize) -> Result<(), LedgerError> {
        self.check_insertable()?;
        let newest = self.riders.len();
        if (1..=newest).contains(&t_j) {
            Ok(())
        } else {
            Err(LedgerError::InsertionPointOutOfRange { t_j, newest })
        }
    }
}

impl TryFrom<Vec<Rider>> for RouteLedger {
    type Error = LedgerError;

    fn try_from(riders: Vec<Rider>) -> Result<Self, Self::Error> {
        let mut ledger = Self::new();
        for rider in riders {
            ledger.push(rider)?;
        }
        Ok(ledger)
    }
}

/// 1-based access; panics on an index outside `1..=len()`, like slice indexing.
impl Index<usize> for RouteLedger {
    type Output = Rider;

    fn index(&self, idx: usize) -> &Self::Output {
        &self.riders[idx - 1]
    }
}

impl IndexMut<usize> for RouteLedger {
    fn index_mut(&mut self, idx: usize) -> &mut Self::Output {
        &mut self.riders[idx - 1]
    }
}

/// Errors raised when a route ledger does not satisfy an operation's preconditions
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum LedgerError {
    /// Inserting requires at least one active rider plus the newest rider
    #[error("a route needs at least two riders to insert into, found {0}")]
    TooFewRiders(usize),
    /// The drop-off position must be one of `1..=N`
    #[error("insertion point {t_j} lies outside 1..={newest}")]
    InsertionPointOutOfRange {
        /// The offending position
        t_j: usize,
        /// The index of the newest rider
        newest: usize,
    },
    /// No rider exists at the given index
    #[error("no rider at index {0}")]
    UnknownRider(usize),
    /// Only the newest rider on the route can be priced
    #[error("rider {rider} is not the newest rider ({newest})")]
    NotNewest {
        /// The requested rider
        rider: usize,
        /// The index of the newest rider
        newest: usize,
    },
    /// A bootstrapped rider can only open a route
    #[error("rider {0} is bootstrapped, but only the first rider may be")]
    MisplacedBootstrap(usize),
    /// The newest rider has not been placed on the route yet
    #[error("no insertion point has been applied for the newest rider")]
    InsertionPending,
}
