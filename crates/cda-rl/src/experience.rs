//! Experience replay store for RL
//!
//! Transitions live in a fixed number of slots. Each slot owns one block of
//! the store's [`BlockAllocator`], sized for a full record; once every slot is
//! filled the oldest slot is overwritten in place.

use rand::Rng;

use cda_core::Transition;

use crate::allocator::BlockAllocator;
use crate::error::{RLError, Result};

/// Allocator units for one record: state, next state, action, reward, terminal
fn record_size(state_dim: usize) -> usize {
    2 * state_dim + 3
}

#[derive(Debug, Clone)]
struct Slot {
    address: usize,
    transition: Transition,
}

/// Capacity-bounded ring buffer of transitions
#[derive(Debug, Clone)]
pub struct ExperienceStore {
    slots: Vec<Slot>,
    capacity: usize,
    state_dim: usize,
    seq: u64,
    allocator: BlockAllocator,
}

impl ExperienceStore {
    /// Create a store holding up to `capacity` transitions of dimension `state_dim`
    pub fn new(capacity: usize, state_dim: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(RLError::InvalidParameter(
                "store capacity must be positive".to_string(),
            ));
        }
        if state_dim == 0 {
            return Err(RLError::InvalidParameter(
                "state dimension must be positive".to_string(),
            ));
        }

        let units = capacity.checked_mul(record_size(state_dim)).ok_or_else(|| {
            RLError::InvalidParameter(format!(
                "store of {capacity} records of dimension {state_dim} exceeds the address space"
            ))
        })?;
        let allocator = BlockAllocator::try_new(units)?;

        let mut slots = Vec::new();
        slots.try_reserve_exact(capacity).map_err(|_| {
            RLError::InvalidParameter(format!("cannot reserve {capacity} store slots"))
        })?;

        Ok(Self {
            slots,
            capacity,
            state_dim,
            seq: 0,
            allocator,
        })
    }

    /// Add a transition, overwriting the oldest one when full
    pub fn add(&mut self, transition: Transition) -> Result<()> {
        self.check(&transition)?;

        if self.slots.len() < self.capacity {
            let address = self.allocator.allocate(record_size(self.state_dim))?;
            self.slots.push(Slot {
                address,
                transition,
            });
        } else {
            let idx = (self.seq % self.capacity as u64) as usize;
            let slot = &mut self.slots[idx];
            debug_assert!(self.allocator.is_allocated(slot.address));
            slot.transition = transition;
        }

        self.seq += 1;
        Ok(())
    }

    fn check(&self, transition: &Transition) -> Result<()> {
        if transition.state.is_empty() || transition.next_state.is_empty() {
            return Err(RLError::InvalidTransition(
                "state vectors cannot be empty".to_string(),
            ));
        }
        if transition.state.len() != self.state_dim {
            return Err(RLError::InvalidTransition(format!(
                "state has {} components, expected {}",
                transition.state.len(),
                self.state_dim
            )));
        }
        if transition.next_state.len() != self.state_dim {
            return Err(RLError::InvalidTransition(format!(
                "next state has {} components, expected {}",
                transition.next_state.len(),
                self.state_dim
            )));
        }
        Ok(())
    }

    /// Sample up to `batch_size` distinct transitions uniformly at random
    pub fn sample<R: Rng + ?Sized>(&self, batch_size: usize, rng: &mut R) -> Result<Vec<Transition>> {
        if self.slots.is_empty() {
            return Err(RLError::EmptyStore);
        }

        let amount = batch_size.min(self.slots.len());
        Ok(rand::seq::index::sample(rng, self.slots.len(), amount)
            .into_iter()
            .map(|idx| self.slots[idx].transition.clone())
            .collect())
    }

    /// Number of stored transitions
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Maximum number of stored transitions
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Transitions added since construction or the last clear
    pub fn total_added(&self) -> u64 {
        self.seq
    }

    /// Allocator units currently reserved for records
    pub fn reserved_units(&self) -> usize {
        self.allocator.allocated()
    }

    /// Stored transitions in slot order
    pub fn iter(&self) -> impl Iterator<Item = &Transition> {
        self.slots.iter().map(|slot| &slot.transition)
    }

    /// Drop every transition; slot storage stays reserved
    pub fn clear(&mut self) {
        self.slots.clear();
        self.allocator.reset();
        self.seq = 0;
    }
}
