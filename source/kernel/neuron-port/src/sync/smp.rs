// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Multicore port: granular lock groups over recursive hardware spinlocks.

use core::sync::atomic::{AtomicBool, Ordering};

use crate::hal::{CoreContext, LockRegisters};
use crate::types::{InterruptState, LockId};

use super::{CriticalNesting, LockGroup, PortSync, RecursiveSpinlocks};

pub struct SmpPort<R> {
    locks: RecursiveSpinlocks<R>,
    nesting: CriticalNesting,
    started: AtomicBool,
}

impl<R: LockRegisters> SmpPort<R> {
    pub const fn new(registers: R) -> Self {
        Self {
            locks: RecursiveSpinlocks::new(registers),
            nesting: CriticalNesting::new(),
            started: AtomicBool::new(false),
        }
    }

    pub fn spinlocks(&self) -> &RecursiveSpinlocks<R> {
        &self.locks
    }
}

impl<R: LockRegisters> PortSync for SmpPort<R> {
    fn lock_group<C: CoreContext>(&self, cpu: &C, group: LockGroup) {
        let core = cpu.core_id();
        cpu.disable_interrupts();
        self.locks.acquire(core, group.task);
        self.locks.acquire(core, group.isr);
        self.nesting.increment(core);
    }

    fn unlock_group<C: CoreContext>(&self, cpu: &C, group: LockGroup) {
        let core = cpu.core_id();
        let remaining = self.nesting.decrement(core);
        self.locks.release(core, group.isr);
        self.locks.release(core, group.task);
        if remaining == 0 {
            cpu.enable_interrupts();
        }
    }

    fn lock_group_from_isr<C: CoreContext>(&self, cpu: &C, group: LockGroup) -> InterruptState {
        let core = cpu.core_id();
        let state = cpu.mask_interrupts_from_isr();
        self.locks.acquire(core, group.isr);
        self.nesting.increment(core);
        state
    }

    fn unlock_group_from_isr<C: CoreContext>(&self, cpu: &C, group: LockGroup, state: InterruptState) {
        let core = cpu.core_id();
        self.nesting.decrement(core);
        self.locks.release(core, group.isr);
        cpu.restore_interrupts_from_isr(state);
    }

    fn take_spinlock<C: CoreContext>(&self, cpu: &C, lock: LockId) {
        self.locks.acquire(cpu.core_id(), lock);
    }

    fn release_spinlock<C: CoreContext>(&self, cpu: &C, lock: LockId) {
        self.locks.release(cpu.core_id(), lock);
    }

    fn critical_nesting<C: CoreContext>(&self, cpu: &C) -> usize {
        self.nesting.get(cpu.core_id())
    }

    fn scheduler_started<C: CoreContext>(&self, cpu: &C) {
        let core = cpu.core_id();
        self.nesting.reset(core);
        self.started.store(true, Ordering::Release);
        log_info!(target: "port", "core {} scheduler started", core);
    }

    fn is_started(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CRITICAL_NESTING_BOOT_SENTINEL;
    use crate::hal::host::{HostCores, HostLockBank};

    fn started(port: &SmpPort<HostLockBank>, cores: &HostCores) {
        port.scheduler_started(&cores.core(0));
        port.scheduler_started(&cores.core(1));
    }

    #[test]
    fn nested_critical_sections_unmask_on_last_exit() {
        let port = SmpPort::new(HostLockBank::new());
        let cores = HostCores::new();
        started(&port, &cores);
        let cpu = cores.core(0);
        cpu.enable_interrupts();

        port.enter_critical(&cpu);
        port.enter_critical(&cpu);
        assert!(!cpu.interrupts_enabled());
        assert_eq!(port.spinlocks().recursion_depth(LockId::Task), 2);
        port.exit_critical(&cpu);
        assert!(!cpu.interrupts_enabled());
        port.exit_critical(&cpu);
        assert!(cpu.interrupts_enabled());
        assert_eq!(port.spinlocks().owner(LockId::Isr), None);
    }

    #[test]
    fn boot_sentinel_keeps_interrupts_masked() {
        let port = SmpPort::new(HostLockBank::new());
        let cores = HostCores::new();
        let cpu = cores.core(0);
        port.enter_critical(&cpu);
        port.exit_critical(&cpu);
        assert_eq!(port.critical_nesting(&cpu), CRITICAL_NESTING_BOOT_SENTINEL);
        assert!(!cpu.interrupts_enabled());
        assert!(!port.is_started());
    }

    #[test]
    fn isr_group_restores_saved_mask() {
        let port = SmpPort::new(HostLockBank::new());
        let cores = HostCores::new();
        started(&port, &cores);
        let cpu = cores.core(1);

        // ISR nested inside a task critical section keeps interrupts masked.
        port.enter_critical(&cpu);
        let state = port.lock_group_from_isr(&cpu, LockGroup::QUEUE);
        assert_eq!(port.critical_nesting(&cpu), 2);
        port.unlock_group_from_isr(&cpu, LockGroup::QUEUE, state);
        assert!(!cpu.interrupts_enabled());
        port.exit_critical(&cpu);
        assert!(cpu.interrupts_enabled());

        let state = port.enter_critical_from_isr(&cpu);
        assert!(state.were_enabled());
        assert!(port.spinlocks().is_held_by(cpu.core_id(), LockId::Isr));
        assert!(!port.spinlocks().is_held_by(cpu.core_id(), LockId::Task));
        port.exit_critical_from_isr(&cpu, state);
        assert!(cpu.interrupts_enabled());
    }

    #[test]
    fn shared_object_group_recurses_on_one_cell() {
        let port = SmpPort::new(HostLockBank::new());
        let cores = HostCores::new();
        started(&port, &cores);
        let cpu = cores.core(0);
        port.lock_group(&cpu, LockGroup::TIMER);
        assert_eq!(port.spinlocks().recursion_depth(LockId::Timer), 2);
        port.unlock_group(&cpu, LockGroup::TIMER);
        assert!(port.spinlocks().registers().is_free(LockId::Timer));
    }

    #[test]
    fn raw_spinlock_leaves_mask_alone() {
        let port = SmpPort::new(HostLockBank::new());
        let cores = HostCores::new();
        let cpu = cores.core(0);
        cpu.enable_interrupts();
        port.take_spinlock(&cpu, LockId::User);
        assert!(cpu.interrupts_enabled());
        assert_eq!(port.spinlocks().owner(LockId::User), Some(cpu.core_id()));
        port.release_spinlock(&cpu, LockId::User);
        assert_eq!(port.spinlocks().owner(LockId::User), None);
    }
}
