// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: Compile-time port configuration (core count, lock ids, PMP geometry)
//! OWNERS: @kernel-arch-team
//! STATUS: Functional
//! API_STABILITY: Unstable
//! TEST_COVERAGE: Static assertions below
//! PUBLIC API: MAX_CORES, SPINLOCK_COUNT, TASK_PMP_SLOTS, CRITICAL_NESTING_BOOT_SENTINEL, ...
//! INVARIANTS: Lock ownership fits one byte per core; task PMP slots fit the hardware unit

use static_assertions::const_assert;

/// Number of physical cores served by the port.
pub const MAX_CORES: usize = 2;

/// Number of hardware lock cells reserved for the kernel (ISR, task, event group,
/// queue, stream buffer, timer, user).
pub const SPINLOCK_COUNT: usize = 7;

/// Deepest recursion a single owner may stack on one lock.
pub const MAX_RECURSION_DEPTH: u8 = u8::MAX;

/// Initial per-core nesting value. Keeps `exit_critical` from unmasking
/// interrupts before the scheduler hands a core its first task.
pub const CRITICAL_NESTING_BOOT_SENTINEL: usize = 0xaaaa_aaaa;

/// Application regions a task may declare in addition to its stack.
pub const CONFIGURABLE_REGIONS: usize = 3;

/// Task protection slots: stack start/end plus a start/end pair per region.
pub const TASK_PMP_SLOTS: usize = 2 + 2 * CONFIGURABLE_REGIONS;

/// Configuration bytes packed into one 32-bit configuration word.
pub const PMP_ENTRIES_PER_WORD: usize = 4;

/// Configuration words needed to hold every task slot.
pub const TASK_PMP_CONFIG_WORDS: usize = TASK_PMP_SLOTS.div_ceil(PMP_ENTRIES_PER_WORD);

/// Address registers hold the physical address shifted by the 4-byte granule.
pub const PMP_ADDRESS_SHIFT: u32 = 2;

/// Shift applied to the base of a naturally aligned power-of-two region.
pub const PMP_NAPOT_SHIFT: u32 = 3;

/// Smallest region the NAPOT encoding can describe.
pub const PMP_MIN_NAPOT_SIZE: usize = 8;

/// Entries implemented by the hardware protection unit (rv32 pmpcfg0-3).
pub const HW_PMP_REGIONS: usize = 16;

const_assert!(MAX_CORES >= 1);
const_assert!(SPINLOCK_COUNT <= u8::BITS as usize);
const_assert!(TASK_PMP_SLOTS <= HW_PMP_REGIONS);
const_assert!(TASK_PMP_CONFIG_WORDS * PMP_ENTRIES_PER_WORD >= TASK_PMP_SLOTS);
const_assert!(PMP_MIN_NAPOT_SIZE.is_power_of_two());
