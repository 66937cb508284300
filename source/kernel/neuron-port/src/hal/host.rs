// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Host-side models of the lock bank, per-core interrupt masks and PMP unit.
//!
//! Used by unit and integration tests where real cores are simulated with
//! threads; each `HostCore` handle stands for one physical core.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use crate::config::{HW_PMP_REGIONS, MAX_CORES, SPINLOCK_COUNT};
use crate::pmp::{config_word_index, extract_config_byte, ConfigBytes, EntryConfig};
use crate::types::{CoreId, LockId};

use super::{CoreContext, LockRegisters, PmpRegisters};

const CELL_FREE: u32 = 1;
const CELL_HELD: u32 = 0;

/// Test-and-set cells backed by atomics. A cell reads 1 while free.
pub struct HostLockBank {
    cells: [AtomicU32; SPINLOCK_COUNT],
}

impl HostLockBank {
    pub const fn new() -> Self {
        Self { cells: [const { AtomicU32::new(CELL_FREE) }; SPINLOCK_COUNT] }
    }
}

impl Default for HostLockBank {
    fn default() -> Self {
        Self::new()
    }
}

impl LockRegisters for HostLockBank {
    fn try_claim(&self, lock: LockId) -> bool {
        self.cells[lock.index()].swap(CELL_HELD, Ordering::AcqRel) == CELL_FREE
    }

    fn is_free(&self, lock: LockId) -> bool {
        self.cells[lock.index()].load(Ordering::Acquire) == CELL_FREE
    }

    fn release(&self, lock: LockId) {
        self.cells[lock.index()].store(CELL_FREE, Ordering::Release);
    }
}

/// Interrupt-enable flags for every simulated core. Cores boot with interrupts masked.
pub struct HostCores {
    irq: [AtomicBool; MAX_CORES],
}

impl HostCores {
    pub const fn new() -> Self {
        Self { irq: [const { AtomicBool::new(false) }; MAX_CORES] }
    }

    /// Handle that executes as core `id`.
    pub fn core(&self, id: u16) -> HostCore<'_> {
        port_assert!((id as usize) < MAX_CORES, "core {} out of range", id);
        HostCore { id: CoreId::from_raw(id), irq: &self.irq[id as usize] }
    }
}

impl Default for HostCores {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy)]
pub struct HostCore<'a> {
    id: CoreId,
    irq: &'a AtomicBool,
}

impl CoreContext for HostCore<'_> {
    fn core_id(&self) -> CoreId {
        self.id
    }

    fn disable_interrupts(&self) {
        self.irq.store(false, Ordering::SeqCst);
    }

    fn enable_interrupts(&self) {
        self.irq.store(true, Ordering::SeqCst);
    }

    fn interrupts_enabled(&self) -> bool {
        self.irq.load(Ordering::SeqCst)
    }
}

/// Register file of a 16-entry PMP unit with packed configuration words.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostPmp {
    cfg: [u32; HW_PMP_REGIONS / 4],
    addr: [usize; HW_PMP_REGIONS],
}

impl HostPmp {
    pub const fn new() -> Self {
        Self { cfg: [0; HW_PMP_REGIONS / 4], addr: [0; HW_PMP_REGIONS] }
    }

    /// Raw configuration words as the hardware would expose them.
    pub fn config_words(&self) -> &[u32] {
        &self.cfg
    }
}

impl Default for HostPmp {
    fn default() -> Self {
        Self::new()
    }
}

impl PmpRegisters for HostPmp {
    fn region_count(&self) -> usize {
        HW_PMP_REGIONS
    }

    fn set_region(&mut self, index: usize, config: EntryConfig, address: usize) {
        ConfigBytes::new(&mut self.cfg).set(index, config);
        self.addr[index] = address;
    }

    fn region(&self, index: usize) -> (EntryConfig, usize) {
        let byte = extract_config_byte(self.cfg[config_word_index(index)], index);
        (EntryConfig::from_byte(byte), self.addr[index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pmp::{AddressMode, PmpPermissions};

    #[test]
    fn cell_claims_once_until_released() {
        let bank = HostLockBank::new();
        assert!(bank.try_claim(LockId::Queue));
        assert!(!bank.is_free(LockId::Queue));
        assert!(!bank.try_claim(LockId::Queue));
        assert!(bank.is_free(LockId::Timer));
        bank.release(LockId::Queue);
        assert!(bank.try_claim(LockId::Queue));
    }

    #[test]
    fn isr_mask_round_trip() {
        let cores = HostCores::new();
        let core = cores.core(1);
        core.enable_interrupts();
        let saved = core.mask_interrupts_from_isr();
        assert!(!core.interrupts_enabled());
        assert!(!cores.core(0).interrupts_enabled());
        core.restore_interrupts_from_isr(saved);
        assert!(core.interrupts_enabled());
    }

    #[test]
    fn pmp_words_pack_per_entry() {
        let mut pmp = HostPmp::new();
        let tor = EntryConfig::new(PmpPermissions::READ, AddressMode::Tor);
        pmp.set_region(6, tor, 0x400);
        assert_eq!(pmp.config_words(), &[0, 0x0009_0000, 0, 0]);
        assert_eq!(pmp.region(6), (tor, 0x400));
    }
}
