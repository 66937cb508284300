// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: Recursive cross-core spinlocks over a bank of hardware test-and-set cells
//! OWNERS: @kernel-sync-team
//! STATUS: Functional
//! API_STABILITY: Unstable
//! TEST_COVERAGE: Unit tests below + tests/spinlock_smp.rs (threaded virtual cores)
//! PUBLIC API: RecursiveSpinlocks::{acquire, try_acquire, release, owner, recursion_depth}
//! DEPENDS_ON: hal::LockRegisters
//! INVARIANTS: depth[id] > 0 <=> exactly one core mask has bit id <=> cell reads held
//!             Acquire fence after claim; Release fence before the cell is published free

use core::hint::spin_loop;
use core::sync::atomic::{fence, AtomicU8, Ordering};

use crate::config::{MAX_CORES, MAX_RECURSION_DEPTH, SPINLOCK_COUNT};
use crate::hal::LockRegisters;
use crate::types::{CoreId, LockId};

/// Ownership and recursion bookkeeping for every reserved lock cell.
///
/// Mask and depth words are only written by the core that holds the
/// corresponding cell; the hardware cell is the sole arbiter between cores.
pub struct RecursiveSpinlocks<R> {
    registers: R,
    owned_by_core: [AtomicU8; MAX_CORES],
    depth: [AtomicU8; SPINLOCK_COUNT],
}

impl<R: LockRegisters> RecursiveSpinlocks<R> {
    pub const fn new(registers: R) -> Self {
        Self {
            registers,
            owned_by_core: [const { AtomicU8::new(0) }; MAX_CORES],
            depth: [const { AtomicU8::new(0) }; SPINLOCK_COUNT],
        }
    }

    pub fn registers(&self) -> &R {
        &self.registers
    }

    fn mask_of(&self, core: CoreId) -> &AtomicU8 {
        port_assert!(core.as_index() < MAX_CORES, "core {} out of range", core);
        &self.owned_by_core[core.as_index()]
    }

    /// Returns true when `core` already holds `lock`; bumps its depth if so.
    fn reenter(&self, core: CoreId, lock: LockId) -> bool {
        if self.mask_of(core).load(Ordering::Relaxed) & lock.mask() == 0 {
            return false;
        }
        let depth = &self.depth[lock.index()];
        port_assert!(
            depth.load(Ordering::Relaxed) != MAX_RECURSION_DEPTH,
            "lock {} recursion exceeds {}",
            lock,
            MAX_RECURSION_DEPTH
        );
        depth.fetch_add(1, Ordering::Relaxed);
        true
    }

    fn take_ownership(&self, core: CoreId, lock: LockId) {
        fence(Ordering::Acquire);
        let depth = &self.depth[lock.index()];
        port_assert!(
            depth.load(Ordering::Relaxed) == 0,
            "lock {} claimed with stale depth {}",
            lock,
            depth.load(Ordering::Relaxed)
        );
        depth.store(1, Ordering::Relaxed);
        self.mask_of(core).fetch_or(lock.mask(), Ordering::Relaxed);
    }

    /// Busy-waits until `core` holds `lock`. Reentrant for the current owner.
    pub fn acquire(&self, core: CoreId, lock: LockId) {
        if self.reenter(core, lock) {
            return;
        }
        while !self.registers.try_claim(lock) {
            spin_loop();
        }
        self.take_ownership(core, lock);
    }

    /// Single claim attempt. Always succeeds for the current owner.
    pub fn try_acquire(&self, core: CoreId, lock: LockId) -> bool {
        if self.reenter(core, lock) {
            return true;
        }
        if !self.registers.try_claim(lock) {
            return false;
        }
        self.take_ownership(core, lock);
        true
    }

    /// Drops one level of ownership; frees the cell when the depth reaches zero.
    pub fn release(&self, core: CoreId, lock: LockId) {
        let mask = self.mask_of(core);
        port_assert!(
            mask.load(Ordering::Relaxed) & lock.mask() != 0,
            "core {} releasing lock {} it does not hold",
            core,
            lock
        );
        let depth = &self.depth[lock.index()];
        port_assert!(depth.load(Ordering::Relaxed) != 0, "lock {} released at depth 0", lock);

        if depth.fetch_sub(1, Ordering::Relaxed) == 1 {
            mask.fetch_and(!lock.mask(), Ordering::Relaxed);
            fence(Ordering::Release);
            self.registers.release(lock);
        }
    }

    /// Core currently holding `lock`, if any.
    pub fn owner(&self, lock: LockId) -> Option<CoreId> {
        self.owned_by_core
            .iter()
            .position(|mask| mask.load(Ordering::Relaxed) & lock.mask() != 0)
            .map(|idx| CoreId::from_raw(idx as u16))
    }

    pub fn is_held_by(&self, core: CoreId, lock: LockId) -> bool {
        self.mask_of(core).load(Ordering::Relaxed) & lock.mask() != 0
    }

    /// Outstanding acquisitions of `lock`; zero while free.
    pub fn recursion_depth(&self, lock: LockId) -> u8 {
        self.depth[lock.index()].load(Ordering::Relaxed)
    }
}
