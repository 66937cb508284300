// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: Static system region table installed once at scheduler start
//! OWNERS: @kernel-mm-team
//! PUBLIC API: SystemRegion, SystemLayout, default_system_regions(), setup_mpu(), load_task_settings()
//! DEPENDS_ON: hal::PmpRegisters
//! INVARIANTS: Encoding chosen by each entry's explicit mode; table validated before any register write

use crate::config::TASK_PMP_SLOTS;
use crate::hal::PmpRegisters;

use super::encode::{napot_address, tor_address};
use super::task::TaskMpuSettings;
use super::{AddressMode, EntryConfig, PmpError, PmpPermissions};

/// Entries in the default table: task placeholders followed by five system regions.
pub const SYSTEM_TABLE_LEN: usize = TASK_PMP_SLOTS + 5;

/// Fixed region programmed into the protection unit at start-up.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct SystemRegion {
    pub base: usize,
    pub size: usize,
    pub config: EntryConfig,
}

impl SystemRegion {
    pub const fn new(base: usize, size: usize, config: EntryConfig) -> Self {
        Self { base, size, config }
    }

    const fn placeholder() -> Self {
        Self { base: 0, size: 0, config: EntryConfig::OFF }
    }
}

/// Link-time addresses the system table is built from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SystemLayout {
    pub privileged_functions_start: usize,
    pub privileged_data_start: usize,
    pub uart_base: usize,
}

impl SystemLayout {
    pub const PRIVILEGED_FUNCTIONS_SIZE: usize = 32 * 1024;
    pub const PRIVILEGED_DATA_SIZE: usize = 64 * 1024;
    pub const UNPRIVILEGED_FUNCTIONS_SIZE: usize = 512 * 1024;
    pub const UNPRIVILEGED_DATA_SIZE: usize = 512 * 1024;
    pub const UART_SIZE: usize = 128;
}

const fn napot(perms: PmpPermissions) -> EntryConfig {
    EntryConfig::new(perms, AddressMode::Napot)
}

/// Builds the default table for `layout`.
///
/// The first [`TASK_PMP_SLOTS`] entries are disabled placeholders that each task
/// overwrites on activation; the system regions follow.
pub fn default_system_regions(layout: &SystemLayout) -> [SystemRegion; SYSTEM_TABLE_LEN] {
    let mut table = [SystemRegion::placeholder(); SYSTEM_TABLE_LEN];
    let system = [
        SystemRegion::new(
            layout.privileged_functions_start,
            SystemLayout::PRIVILEGED_FUNCTIONS_SIZE,
            napot(PmpPermissions::empty()),
        ),
        SystemRegion::new(
            layout.privileged_data_start,
            SystemLayout::PRIVILEGED_DATA_SIZE,
            napot(PmpPermissions::empty()),
        ),
        SystemRegion::new(
            layout.privileged_functions_start,
            SystemLayout::UNPRIVILEGED_FUNCTIONS_SIZE,
            napot(PmpPermissions::READ.union(PmpPermissions::EXECUTE)),
        ),
        SystemRegion::new(
            layout.privileged_data_start,
            SystemLayout::UNPRIVILEGED_DATA_SIZE,
            napot(PmpPermissions::READ.union(PmpPermissions::WRITE)),
        ),
        SystemRegion::new(
            layout.uart_base,
            SystemLayout::UART_SIZE,
            napot(PmpPermissions::READ.union(PmpPermissions::WRITE)),
        ),
    ];
    table[TASK_PMP_SLOTS..].copy_from_slice(&system);
    table
}

/// Address word for `region` according to its configured mode.
pub fn system_region_address(region: &SystemRegion) -> Result<usize, PmpError> {
    match region.config.mode {
        AddressMode::Napot => napot_address(region.base, region.size),
        AddressMode::Off | AddressMode::Tor | AddressMode::Na4 => Ok(tor_address(region.base)),
    }
}

/// Disables every hardware entry, then programs `table` from entry 0.
///
/// All addresses are encoded before the first register write; on error the
/// unit is left untouched.
pub fn setup_mpu<M: PmpRegisters>(pmp: &mut M, table: &[SystemRegion]) -> Result<(), PmpError> {
    let capacity = pmp.region_count();
    if table.len() > capacity {
        return Err(PmpError::TableFull { entries: table.len(), capacity });
    }
    for region in table {
        system_region_address(region)?;
    }

    for index in 0..capacity {
        pmp.set_region(index, EntryConfig::OFF, 0);
    }
    for (index, region) in table.iter().enumerate() {
        let address = system_region_address(region)?;
        pmp.set_region(index, region.config, address);
    }

    list_regions(pmp);
    Ok(())
}

/// Copies a compiled task table into the task slots of the unit.
pub fn load_task_settings<M: PmpRegisters>(pmp: &mut M, settings: &TaskMpuSettings) {
    for (slot, entry) in settings.entries().enumerate() {
        pmp.set_region(slot, entry.config, entry.address);
    }
}

/// Logs every hardware entry.
pub fn list_regions<M: PmpRegisters>(pmp: &M) {
    for index in 0..pmp.region_count() {
        let (config, address) = pmp.region(index);
        log_debug!(target: "pmp", "PMP {} : {:#010x} {}", index, address, config);
    }
}
