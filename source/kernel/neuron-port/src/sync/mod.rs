// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: Port synchronization surface consumed by the scheduler and kernel objects
//! OWNERS: @kernel-sync-team
//! STATUS: Functional
//! API_STABILITY: Unstable
//! TEST_COVERAGE: Unit tests per variant + tests_prop.rs + tests/{lock_group,critical_nesting}.rs
//! PUBLIC API: PortSync, ActivePort, new_port(), SmpPort, UniPort, LockGroup, ObjectKind
//! DEPENDS_ON: hal::{CoreContext, LockRegisters}
//! INVARIANTS: Interrupts re-enabled only when a core's nesting returns to zero
//!             ISR variants restore exactly the state captured on entry
//!             Variant chosen at build time by the `smp` feature

use crate::hal::{CoreContext, LockRegisters};
use crate::types::{InterruptState, LockId};

mod critical;
mod group;
mod smp;
mod spinlock;
#[cfg(test)]
mod tests_prop;
mod uni;

pub use critical::CriticalNesting;
pub use group::{with_group, GroupGuard, LockGroup, ObjectKind};
pub use smp::SmpPort;
pub use spinlock::RecursiveSpinlocks;
pub use uni::UniPort;

/// Lock and critical-section operations, keyed by the calling core.
pub trait PortSync {
    /// Acquires `group` from task context: mask, task lock, ISR lock, nest.
    fn lock_group<C: CoreContext>(&self, cpu: &C, group: LockGroup);

    /// Reverses [`PortSync::lock_group`]; unmasks when nesting returns to zero.
    fn unlock_group<C: CoreContext>(&self, cpu: &C, group: LockGroup);

    /// Acquires the ISR half of `group` with interrupts masked.
    fn lock_group_from_isr<C: CoreContext>(&self, cpu: &C, group: LockGroup) -> InterruptState;

    fn unlock_group_from_isr<C: CoreContext>(&self, cpu: &C, group: LockGroup, state: InterruptState);

    /// Raw spinlock acquisition without touching the interrupt mask.
    fn take_spinlock<C: CoreContext>(&self, cpu: &C, lock: LockId);

    fn release_spinlock<C: CoreContext>(&self, cpu: &C, lock: LockId);

    /// Nesting depth of the calling core.
    fn critical_nesting<C: CoreContext>(&self, cpu: &C) -> usize;

    /// Clears the boot sentinel of the calling core.
    fn scheduler_started<C: CoreContext>(&self, cpu: &C);

    fn is_started(&self) -> bool;

    fn enter_critical<C: CoreContext>(&self, cpu: &C) {
        self.lock_group(cpu, LockGroup::KERNEL);
    }

    fn exit_critical<C: CoreContext>(&self, cpu: &C) {
        self.unlock_group(cpu, LockGroup::KERNEL);
    }

    fn enter_critical_from_isr<C: CoreContext>(&self, cpu: &C) -> InterruptState {
        self.lock_group_from_isr(cpu, LockGroup::KERNEL)
    }

    fn exit_critical_from_isr<C: CoreContext>(&self, cpu: &C, state: InterruptState) {
        self.unlock_group_from_isr(cpu, LockGroup::KERNEL, state);
    }
}

#[cfg(feature = "smp")]
pub type ActivePort<R> = SmpPort<R>;
#[cfg(not(feature = "smp"))]
pub type ActivePort<R> = UniPort<R>;

/// Builds the port variant selected for this build.
#[cfg(feature = "smp")]
pub fn new_port<R: LockRegisters>(registers: R) -> ActivePort<R> {
    SmpPort::new(registers)
}

/// Builds the single-core port. The bank is accepted so board code is the same
/// for both builds and is dropped unused: one core never contends for a cell.
#[cfg(not(feature = "smp"))]
pub fn new_port<R: LockRegisters>(registers: R) -> ActivePort<R> {
    drop(registers);
    UniPort::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::host::{HostCores, HostLockBank};

    #[test]
    fn balanced_sections_leave_every_cell_free() {
        let bank = HostLockBank::new();
        let port = new_port(&bank);
        let cores = HostCores::new();
        let cpu = cores.core(0);
        port.scheduler_started(&cpu);

        port.enter_critical(&cpu);
        port.lock_group(&cpu, LockGroup::QUEUE);
        port.unlock_group(&cpu, LockGroup::QUEUE);
        port.exit_critical(&cpu);

        assert!(LockId::ALL.iter().all(|&lock| bank.is_free(lock)));
        assert_eq!(port.critical_nesting(&cpu), 0);
    }
}
