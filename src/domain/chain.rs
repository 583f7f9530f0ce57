/// PlatformChain: the append-only sequence of platforms.
///
/// ## Indices
///
/// Every slot gets the next sequential index and keeps it forever.
/// `target_index` is the slot the player must land on next;
/// `last_index` is the most recently appended slot.
///
/// ## Retention window
///
/// Only the newest `retain` slots stay in memory. Pruning never touches
/// the target or anything after it, so the engine always sees the slots
/// it needs; older indices simply answer `None` from `get()`.

use std::collections::VecDeque;

use rand::Rng;

use crate::config::ChainConfig;
use super::entity::ColorTag;

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct PlatformSlot {
    pub index: usize,
    pub offset: f32,
    pub color: ColorTag,
}

#[derive(Clone, Debug)]
pub struct PlatformChain {
    slots: VecDeque<PlatformSlot>,
    last_index: usize,
    target_index: usize,
    spacing: f32,
    retain: usize,
    palette: Vec<ColorTag>,
}

impl PlatformChain {
    /// Seed the chain with the landing platform (index 0) and the first
    /// target (index 1).
    pub fn seeded<R: Rng>(cfg: &ChainConfig, rng: &mut R) -> Self {
        let palette = if cfg.palette.is_empty() {
            ColorTag::ALL.to_vec()
        } else {
            cfg.palette.clone()
        };
        let mut chain = PlatformChain {
            slots: VecDeque::with_capacity(cfg.retain.max(2) + 1),
            last_index: 0,
            target_index: 1,
            spacing: cfg.platform_spacing,
            retain: cfg.retain.max(2),
            palette,
        };
        let landing = PlatformSlot {
            index: 0,
            offset: cfg.landing_offset,
            color: chain.pick_color(rng),
        };
        let next = PlatformSlot {
            index: 1,
            offset: cfg.first_target_offset,
            color: chain.pick_color(rng),
        };
        chain.slots.push_back(landing);
        chain.slots.push_back(next);
        chain.last_index = 1;
        chain
    }

    /// Append a platform one spacing beyond the current target.
    pub fn append<R: Rng>(&mut self, rng: &mut R) -> PlatformSlot {
        let slot = PlatformSlot {
            index: self.last_index + 1,
            offset: self.target().offset - self.spacing,
            color: self.pick_color(rng),
        };
        self.slots.push_back(slot);
        self.last_index = slot.index;
        self.prune();
        slot
    }

    /// Point the chain at a new target.
    ///
    /// # Panics
    ///
    /// Panics if `new_index` is past the last appended slot.
    pub fn advance_target(&mut self, new_index: usize) {
        assert!(
            new_index <= self.last_index,
            "target {} past last platform {}", new_index, self.last_index
        );
        self.target_index = new_index;
        self.prune();
    }

    pub fn target(&self) -> &PlatformSlot {
        // Target is never pruned, so the lookup always succeeds
        let pos = self.target_index - self.first_index();
        &self.slots[pos]
    }

    pub fn last(&self) -> &PlatformSlot {
        &self.slots[self.slots.len() - 1]
    }

    pub fn get(&self, index: usize) -> Option<&PlatformSlot> {
        let first = self.first_index();
        if index < first {
            return None;
        }
        self.slots.get(index - first)
    }

    pub fn target_index(&self) -> usize {
        self.target_index
    }

    pub fn last_index(&self) -> usize {
        self.last_index
    }

    /// Logical length: every slot ever appended, retained or not.
    pub fn len(&self) -> usize {
        self.last_index + 1
    }

    /// Slots still held in memory, oldest first.
    pub fn retained(&self) -> impl Iterator<Item = &PlatformSlot> {
        self.slots.iter()
    }

    // ── Internal ──

    fn first_index(&self) -> usize {
        self.slots.front().map_or(0, |s| s.index)
    }

    fn pick_color<R: Rng>(&self, rng: &mut R) -> ColorTag {
        self.palette[rng.gen_range(0..self.palette.len())]
    }

    fn prune(&mut self) {
        while self.slots.len() > self.retain {
            match self.slots.front() {
                Some(front) if front.index < self.target_index => {
                    self.slots.pop_front();
                }
                _ => break,
            }
        }
    }
}
