// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Single-core port: lock groups reduce to interrupt masking and nesting.

use core::marker::PhantomData;
use core::sync::atomic::{AtomicBool, Ordering};

use crate::hal::{CoreContext, LockRegisters};
use crate::types::{InterruptState, LockId};

use super::{CriticalNesting, LockGroup, PortSync};

/// Single-core port.
///
/// `R` only names the lock bank type the SMP build would use, so `ActivePort<R>`
/// has the same shape in both builds. No lock cell is ever touched.
pub struct UniPort<R> {
    nesting: CriticalNesting,
    started: AtomicBool,
    _registers: PhantomData<fn() -> R>,
}

impl<R: LockRegisters> UniPort<R> {
    pub const fn new() -> Self {
        Self { nesting: CriticalNesting::new(), started: AtomicBool::new(false), _registers: PhantomData }
    }
}

impl<R: LockRegisters> Default for UniPort<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: LockRegisters> PortSync for UniPort<R> {
    fn lock_group<C: CoreContext>(&self, cpu: &C, _group: LockGroup) {
        cpu.disable_interrupts();
        self.nesting.increment(cpu.core_id());
    }

    fn unlock_group<C: CoreContext>(&self, cpu: &C, _group: LockGroup) {
        if self.nesting.decrement(cpu.core_id()) == 0 {
            cpu.enable_interrupts();
        }
    }

    fn lock_group_from_isr<C: CoreContext>(&self, cpu: &C, _group: LockGroup) -> InterruptState {
        let state = cpu.mask_interrupts_from_isr();
        self.nesting.increment(cpu.core_id());
        state
    }

    fn unlock_group_from_isr<C: CoreContext>(&self, cpu: &C, _group: LockGroup, state: InterruptState) {
        self.nesting.decrement(cpu.core_id());
        cpu.restore_interrupts_from_isr(state);
    }

    fn take_spinlock<C: CoreContext>(&self, _cpu: &C, _lock: LockId) {}

    fn release_spinlock<C: CoreContext>(&self, _cpu: &C, _lock: LockId) {}

    fn critical_nesting<C: CoreContext>(&self, cpu: &C) -> usize {
        self.nesting.get(cpu.core_id())
    }

    fn scheduler_started<C: CoreContext>(&self, cpu: &C) {
        self.nesting.reset(cpu.core_id());
        self.started.store(true, Ordering::Release);
        log_info!(target: "port", "scheduler started (single core)");
    }

    fn is_started(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::host::{HostCores, HostLockBank};

    #[test]
    fn critical_sections_nest_without_locks() {
        let port: UniPort<HostLockBank> = UniPort::new();
        let cores = HostCores::new();
        let cpu = cores.core(0);
        port.scheduler_started(&cpu);
        assert!(port.is_started());
        cpu.enable_interrupts();

        port.enter_critical(&cpu);
        port.lock_group(&cpu, LockGroup::QUEUE);
        assert_eq!(port.critical_nesting(&cpu), 2);
        port.unlock_group(&cpu, LockGroup::QUEUE);
        assert!(!cpu.interrupts_enabled());
        port.exit_critical(&cpu);
        assert!(cpu.interrupts_enabled());
    }

    #[test]
    fn isr_variant_restores_masked_state() {
        let port: UniPort<HostLockBank> = UniPort::new();
        let cores = HostCores::new();
        let cpu = cores.core(0);
        port.scheduler_started(&cpu);

        let state = port.enter_critical_from_isr(&cpu);
        assert!(!state.were_enabled());
        port.exit_critical_from_isr(&cpu, state);
        assert!(!cpu.interrupts_enabled());
        assert_eq!(port.critical_nesting(&cpu), 0);
    }
}
