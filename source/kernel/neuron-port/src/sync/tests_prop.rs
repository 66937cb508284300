// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: Property tests for recursive lock ownership and critical nesting
//! INVARIANTS: Held <=> acquires exceed releases; cell free exactly when depth is zero

#![cfg(test)]

use proptest::prelude::*;

use super::*;
use crate::hal::host::{HostCores, HostLockBank};
use crate::types::{CoreId, LockId};

const CORE0: CoreId = CoreId::from_raw(0);
const CORE1: CoreId = CoreId::from_raw(1);

fn lock_id() -> impl Strategy<Value = LockId> {
    (0u8..7).prop_map(|raw| LockId::try_from(raw).unwrap_or(LockId::User))
}

proptest! {
    #[test]
    fn recursion_symmetry(lock in lock_id(), ops in proptest::collection::vec(any::<bool>(), 0..64)) {
        let locks = RecursiveSpinlocks::new(HostLockBank::new());
        let mut outstanding = 0u32;
        for acquire in ops {
            if acquire {
                locks.acquire(CORE0, lock);
                outstanding += 1;
            } else if outstanding > 0 {
                locks.release(CORE0, lock);
                outstanding -= 1;
            }
            prop_assert_eq!(locks.is_held_by(CORE0, lock), outstanding > 0);
            prop_assert_eq!(u32::from(locks.recursion_depth(lock)), outstanding);
            prop_assert_eq!(locks.registers().is_free(lock), outstanding == 0);
            prop_assert_eq!(locks.try_acquire(CORE1, lock), outstanding == 0);
            if outstanding == 0 {
                locks.release(CORE1, lock);
            }
        }
    }

    #[test]
    fn balanced_sections_unmask_exactly_at_zero(depth in 1usize..32) {
        let port = SmpPort::new(HostLockBank::new());
        let cores = HostCores::new();
        let cpu = cores.core(0);
        port.scheduler_started(&cpu);
        cpu.enable_interrupts();

        for _ in 0..depth {
            port.enter_critical(&cpu);
        }
        for remaining in (0..depth).rev() {
            port.exit_critical(&cpu);
            prop_assert_eq!(port.critical_nesting(&cpu), remaining);
            prop_assert_eq!(cpu.interrupts_enabled(), remaining == 0);
        }
    }
}
