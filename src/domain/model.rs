use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// An applicant placed in a slot, with the rank that slot had in the
/// applicant's preference list (1 = first choice).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    pub applicant: String,
    pub rank: usize,
}

impl Allocation {
    pub fn new(applicant: impl Into<String>, rank: usize) -> Self {
        Self {
            applicant: applicant.into(),
            rank,
        }
    }
}

/// One slot's column of the final table. `None` entries are padding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotAssignment {
    pub slot: String,
    pub entries: Vec<Option<Allocation>>,
}

impl SlotAssignment {
    pub fn allocations(&self) -> impl Iterator<Item = &Allocation> {
        self.entries.iter().flatten()
    }

    pub fn occupancy(&self) -> usize {
        self.allocations().count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AllocationEvent {
    Placed {
        applicant: String,
        slot: String,
        rank: usize,
    },
    Displaced {
        applicant: String,
        displaced: String,
        slot: String,
        rank: usize,
        displaced_rank: usize,
    },
    Exhausted {
        applicant: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationOutcome {
    pub capacity: usize,
    pub slots: Vec<SlotAssignment>,
    pub leftover_applicants: Vec<String>,
    pub leftover_preferences: BTreeMap<String, Vec<String>>,
    pub events: Vec<AllocationEvent>,
}

impl AllocationOutcome {
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn slot(&self, name: &str) -> Option<&SlotAssignment> {
        self.slots.iter().find(|s| s.slot == name)
    }

    pub fn slot_of(&self, applicant: &str) -> Option<&str> {
        self.slots
            .iter()
            .find(|s| s.allocations().any(|a| a.applicant == applicant))
            .map(|s| s.slot.as_str())
    }

    pub fn placed_count(&self) -> usize {
        self.slots.iter().map(SlotAssignment::occupancy).sum()
    }

    pub fn leftover_count(&self) -> usize {
        self.leftover_applicants.len()
    }

    pub fn is_complete(&self) -> bool {
        self.leftover_applicants.is_empty()
    }
}

/// Everything the allocator consumes, as produced by the score sheet loader.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreferenceInput {
    pub applicants: Vec<String>,
    pub slots: Vec<String>,
    pub preferences: HashMap<String, Vec<String>>,
}

/// A raw score sheet row. `scores` is aligned with the slot column order.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreRow {
    pub applicant: String,
    pub scores: Vec<Option<f64>>,
}
