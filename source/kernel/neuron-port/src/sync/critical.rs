// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Per-core critical-section nesting counters.
//!
//! Each counter starts at [`CRITICAL_NESTING_BOOT_SENTINEL`] so that a stray
//! exit during boot never reaches zero and never unmasks interrupts. The
//! scheduler resets a core's counter to zero when it starts on that core.

use core::sync::atomic::{AtomicUsize, Ordering};

use crate::config::{CRITICAL_NESTING_BOOT_SENTINEL, MAX_CORES};
use crate::types::CoreId;

/// Nesting depth per core. Only the owning core writes its slot.
pub struct CriticalNesting {
    counts: [AtomicUsize; MAX_CORES],
}

impl CriticalNesting {
    pub const fn new() -> Self {
        Self { counts: [const { AtomicUsize::new(CRITICAL_NESTING_BOOT_SENTINEL) }; MAX_CORES] }
    }

    fn slot(&self, core: CoreId) -> &AtomicUsize {
        port_assert!(core.as_index() < MAX_CORES, "core {} out of range", core);
        &self.counts[core.as_index()]
    }

    pub fn get(&self, core: CoreId) -> usize {
        self.slot(core).load(Ordering::Relaxed)
    }

    /// Increments and returns the new depth.
    pub fn increment(&self, core: CoreId) -> usize {
        self.slot(core).fetch_add(1, Ordering::Relaxed).wrapping_add(1)
    }

    /// Decrements and returns the new depth. Unbalanced exits are not detected.
    pub fn decrement(&self, core: CoreId) -> usize {
        self.slot(core).fetch_sub(1, Ordering::Relaxed).wrapping_sub(1)
    }

    pub fn reset(&self, core: CoreId) {
        self.slot(core).store(0, Ordering::Relaxed);
    }
}

impl Default for CriticalNesting {
    fn default() -> Self {
        Self::new()
    }
}
