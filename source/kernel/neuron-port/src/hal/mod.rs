// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Hardware abstraction layer traits consumed by the port.

pub mod host;
#[cfg(any(target_arch = "riscv32", target_arch = "riscv64"))]
pub mod riscv;

use crate::pmp::EntryConfig;
use crate::types::{CoreId, InterruptState, LockId};

/// Bank of indivisible test-and-set cells, one per [`LockId`].
///
/// A cell is either free or held. Claiming is a single atomic read-and-clear;
/// the hardware guarantees at most one claimant observes the free state.
pub trait LockRegisters: Sync {
    /// Attempts to claim the cell, returning true when the caller now holds it.
    fn try_claim(&self, lock: LockId) -> bool;
    /// Reports whether the cell currently reads free. Does not claim.
    fn is_free(&self, lock: LockId) -> bool;
    /// Publishes the cell as free again.
    fn release(&self, lock: LockId);
}

impl<T: LockRegisters + ?Sized> LockRegisters for &T {
    fn try_claim(&self, lock: LockId) -> bool {
        (**self).try_claim(lock)
    }

    fn is_free(&self, lock: LockId) -> bool {
        (**self).is_free(lock)
    }

    fn release(&self, lock: LockId) {
        (**self).release(lock)
    }
}

/// Identity and interrupt mask of the core executing the call.
pub trait CoreContext {
    /// Returns the identifier of the calling core.
    fn core_id(&self) -> CoreId;
    /// Masks interrupts on the calling core.
    fn disable_interrupts(&self);
    /// Unmasks interrupts on the calling core.
    fn enable_interrupts(&self);
    /// Reports whether interrupts are currently unmasked.
    fn interrupts_enabled(&self) -> bool;

    /// Masks interrupts and returns the state observed before masking.
    fn mask_interrupts_from_isr(&self) -> InterruptState {
        let state = InterruptState::from_enabled(self.interrupts_enabled());
        self.disable_interrupts();
        state
    }

    /// Restores exactly the state captured by [`CoreContext::mask_interrupts_from_isr`].
    fn restore_interrupts_from_isr(&self, state: InterruptState) {
        if state.were_enabled() {
            self.enable_interrupts();
        } else {
            self.disable_interrupts();
        }
    }
}

/// Physical memory protection unit.
pub trait PmpRegisters {
    /// Number of entries implemented by the unit.
    fn region_count(&self) -> usize;
    /// Programs entry `index` with `config` and an already encoded address word.
    fn set_region(&mut self, index: usize, config: EntryConfig, address: usize);
    /// Reads back entry `index` as `(config, address word)`.
    fn region(&self, index: usize) -> (EntryConfig, usize);
}
