// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: NEURON RTOS port layer (recursive spinlocks, critical nesting, lock groups, PMP tables)
//! OWNERS: @kernel-arch-team
//! STATUS: Functional
//! API_STABILITY: Unstable
//! TEST_COVERAGE: Unit + proptest modules per subsystem; integration tests under tests/
//! PUBLIC API: sync::PortSync, sync::ActivePort, pmp::store_task_mpu_settings(), boot::start_scheduler()
//! DEPENDS_ON: bitflags, spin (log sink), riscv (CSR access), static_assertions
//! INVARIANTS: No allocation; no blocking other than spinning on hardware lock cells
//!
//! Build variants: feature `smp` selects the multicore lock strategy, feature
//! `mpu` enables protection-table installation on scheduler start.

#![cfg_attr(not(test), no_std)]
#![forbid(clippy::unwrap_used)]

#[macro_use]
pub mod diag;
#[macro_use]
pub mod assert;

pub mod boot;
pub mod config;
pub mod ecall;
pub mod hal;
pub mod pmp;
pub mod sync;
pub mod types;

pub use boot::{activate_task, start_scheduler, TaskLayout};
pub use pmp::{
    store_task_mpu_settings, MemoryRegion, PmpError, RegionAttributes, StackBounds, TaskMpuSettings,
};
pub use sync::{new_port, ActivePort, LockGroup, ObjectKind, PortSync};
pub use types::{CoreId, InterruptState, LockId};
