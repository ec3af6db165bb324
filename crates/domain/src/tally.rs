use std::collections::BTreeMap;

use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::entity::CollectionEntity;
use crate::status::StatusValue;

/// Per-status counts over one in-memory listing.
///
/// Every declared status value is present, so counts always sum to `total`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusTally<S: StatusValue> {
    counts: BTreeMap<S, usize>,
    total: usize,
}

impl<S: StatusValue> StatusTally<S> {
    /// Counts statuses in a single pass.
    pub fn from_statuses(statuses: impl IntoIterator<Item = S>) -> Self {
        let mut counts: BTreeMap<S, usize> =
            S::all().iter().map(|status| (*status, 0)).collect();
        let mut total = 0_usize;

        for status in statuses {
            *counts.entry(status).or_default() += 1;
            total += 1;
        }

        Self { counts, total }
    }

    /// Counts the statuses of a listing.
    pub fn of<E>(items: &[E]) -> Self
    where
        E: CollectionEntity<Status = S>,
    {
        Self::from_statuses(items.iter().map(CollectionEntity::status))
    }

    /// Returns the number of records with one status.
    #[must_use]
    pub fn count(&self, status: S) -> usize {
        self.counts.get(&status).copied().unwrap_or_default()
    }

    /// Returns the number of records counted.
    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    /// Returns the share of one status in percent, `0.0` for an empty listing.
    #[must_use]
    pub fn percentage(&self, status: S) -> f64 {
        if self.total == 0 {
            return 0.0;
        }

        self.count(status) as f64 * 100.0 / self.total as f64
    }

    /// Iterates over `(status, count)` in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (S, usize)> + '_ {
        S::all().iter().map(|status| (*status, self.count(*status)))
    }
}

impl<S: StatusValue> Serialize for StatusTally<S> {
    fn serialize<Ser>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error>
    where
        Ser: Serializer,
    {
        let counts: BTreeMap<&'static str, usize> = self
            .iter()
            .map(|(status, count)| (status.as_str(), count))
            .collect();

        let mut state = serializer.serialize_struct("StatusTally", 2)?;
        state.serialize_field("total", &self.total)?;
        state.serialize_field("counts", &counts)?;
        state.end()
    }
}
