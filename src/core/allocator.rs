//! Capacity-bounded preference matching.
//!
//! Applicants are taken from a working pool in order and walk their
//! preference list from rank 1. A slot with room takes them outright. A full
//! slot takes them only if it holds an occupant who ranked it worse; the
//! *first* such occupant in insertion order is evicted (not the worst one) and
//! goes to the back of the pool. An applicant that fits nowhere is skipped by
//! advancing the cursor, and the run ends once everyone is placed or the
//! cursor runs off the end of the pool.

use crate::domain::model::{Allocation, AllocationEvent, AllocationOutcome, SlotAssignment};
use crate::utils::error::{AllocError, Result};
use std::collections::{BTreeMap, HashMap, HashSet};

/// `ceil(applicants / slots)`, shared by every slot.
pub fn capacity_for(applicant_count: usize, slot_count: usize) -> Result<usize> {
    if slot_count == 0 {
        return Err(AllocError::InvalidCapacityConfiguration);
    }
    Ok(applicant_count.div_ceil(slot_count))
}

/// Runs the allocation over borrowed inputs. Nothing passed in is mutated.
pub fn allocate(
    applicants: &[String],
    slots: &[String],
    preferences: &HashMap<String, Vec<String>>,
) -> Result<AllocationOutcome> {
    let mut context = AllocationContext::new(applicants, slots, preferences)?;
    context.run();
    Ok(context.finish())
}

/// All mutable state of one allocation run.
///
/// Applicants live in an arena (`applicants`); the pool and slot tables hold
/// arena indices.
pub struct AllocationContext<'a> {
    applicants: &'a [String],
    slots: &'a [String],
    preferences: Vec<Vec<usize>>,
    capacity: usize,
    pool: Vec<usize>,
    cursor: usize,
    table: Vec<Vec<(usize, usize)>>,
    placed: Vec<bool>,
    placed_count: usize,
    events: Vec<AllocationEvent>,
}

impl<'a> AllocationContext<'a> {
    pub fn new(
        applicants: &'a [String],
        slots: &'a [String],
        preferences: &HashMap<String, Vec<String>>,
    ) -> Result<Self> {
        let capacity = capacity_for(applicants.len(), slots.len())?;

        let mut slot_index = HashMap::with_capacity(slots.len());
        for (idx, slot) in slots.iter().enumerate() {
            if slot_index.insert(slot.as_str(), idx).is_some() {
                return Err(AllocError::ValidationError {
                    message: format!("slot '{}' is listed more than once", slot),
                });
            }
        }

        let mut seen = HashSet::with_capacity(applicants.len());
        let mut ranked = Vec::with_capacity(applicants.len());
        for applicant in applicants {
            if !seen.insert(applicant.as_str()) {
                return Err(AllocError::DuplicateApplicant {
                    applicant: applicant.clone(),
                });
            }
            let list = preferences
                .get(applicant)
                .ok_or_else(|| AllocError::MissingPreferenceData {
                    applicant: applicant.clone(),
                })?;
            let resolved = list
                .iter()
                .map(|slot| {
                    slot_index
                        .get(slot.as_str())
                        .copied()
                        .ok_or_else(|| AllocError::UnknownSlot {
                            applicant: applicant.clone(),
                            slot: slot.clone(),
                        })
                })
                .collect::<Result<Vec<_>>>()?;
            ranked.push(resolved);
        }

        tracing::debug!(
            "Allocating {} applicants over {} slots (capacity {})",
            applicants.len(),
            slots.len(),
            capacity
        );

        Ok(Self {
            applicants,
            slots,
            preferences: ranked,
            capacity,
            pool: (0..applicants.len()).collect(),
            cursor: 0,
            table: vec![Vec::with_capacity(capacity); slots.len()],
            placed: vec![false; applicants.len()],
            placed_count: 0,
            events: Vec::new(),
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drives the pool until everyone is placed or the cursor passes the end.
    ///
    /// Entries before the cursor are always applicants that already fit
    /// nowhere; evicted applicants are appended behind it and get visited.
    pub fn run(&mut self) {
        while self.placed_count < self.applicants.len() {
            let candidate = self.pool[self.cursor];
            if !self.try_place(candidate) {
                self.events.push(AllocationEvent::Exhausted {
                    applicant: self.applicants[candidate].clone(),
                });
                tracing::debug!("{} fits nowhere, skipping", self.applicants[candidate]);
                self.cursor += 1;
            }

            if self.cursor >= self.pool.len() {
                break;
            }
        }
    }

    fn try_place(&mut self, candidate: usize) -> bool {
        for position in 0..self.preferences[candidate].len() {
            let slot = self.preferences[candidate][position];
            let rank = position + 1;
            let occupancy = self.table[slot].len();

            if occupancy < self.capacity {
                self.table[slot].push((candidate, rank));
                self.mark_placed(candidate);
                self.events.push(AllocationEvent::Placed {
                    applicant: self.applicants[candidate].clone(),
                    slot: self.slots[slot].clone(),
                    rank,
                });
                tracing::debug!(
                    "{} -> {} (rank {})",
                    self.applicants[candidate],
                    self.slots[slot],
                    rank
                );
                return true;
            }

            if occupancy == self.capacity {
                // First occupant that likes this slot less, not the one that likes it least.
                let victim_at = self.table[slot]
                    .iter()
                    .position(|&(_, occupant_rank)| occupant_rank > rank);

                if let Some(at) = victim_at {
                    let (victim, victim_rank) = self.table[slot].remove(at);
                    self.table[slot].push((candidate, rank));
                    self.mark_placed(candidate);
                    self.mark_displaced(victim);
                    self.events.push(AllocationEvent::Displaced {
                        applicant: self.applicants[candidate].clone(),
                        displaced: self.applicants[victim].clone(),
                        slot: self.slots[slot].clone(),
                        rank,
                        displaced_rank: victim_rank,
                    });
                    tracing::debug!(
                        "{} -> {} (rank {}), displacing {} (rank {})",
                        self.applicants[candidate],
                        self.slots[slot],
                        rank,
                        self.applicants[victim],
                        victim_rank
                    );
                    return true;
                }
            }
        }
        false
    }

    // The candidate is always the pool entry under the cursor.
    fn mark_placed(&mut self, candidate: usize) {
        debug_assert_eq!(self.pool[self.cursor], candidate);
        self.pool.remove(self.cursor);
        self.placed[candidate] = true;
        self.placed_count += 1;
    }

    fn mark_displaced(&mut self, victim: usize) {
        debug_assert!(self.placed[victim]);
        self.placed[victim] = false;
        self.placed_count -= 1;
        self.pool.push(victim);
    }

    /// Pads every slot to capacity and collects the leftovers.
    pub fn finish(self) -> AllocationOutcome {
        let capacity = self.capacity;
        let applicants = self.applicants;

        let slots = self
            .slots
            .iter()
            .zip(self.table)
            .map(|(slot, occupants)| {
                let mut entries: Vec<Option<Allocation>> = occupants
                    .into_iter()
                    .map(|(idx, rank)| Some(Allocation::new(applicants[idx].clone(), rank)))
                    .collect();
                entries.resize(capacity, None);
                SlotAssignment {
                    slot: slot.clone(),
                    entries,
                }
            })
            .collect();

        let leftover_applicants: Vec<String> =
            self.pool.iter().map(|&idx| applicants[idx].clone()).collect();

        let leftover_preferences: BTreeMap<String, Vec<String>> = self
            .pool
            .iter()
            .map(|&idx| {
                let names = self.preferences[idx]
                    .iter()
                    .map(|&slot| self.slots[slot].clone())
                    .collect();
                (applicants[idx].clone(), names)
            })
            .collect();

        tracing::info!(
            "Allocation finished: {} placed, {} left over",
            self.placed_count,
            leftover_applicants.len()
        );

        AllocationOutcome {
            capacity,
            slots,
            leftover_applicants,
            leftover_preferences,
            events: self.events,
        }
    }
}
