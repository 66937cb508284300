// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: Per-task protection table compiler (stack bounds + declared regions)
//! OWNERS: @kernel-mm-team
//! PUBLIC API: TaskMpuSettings, MemoryRegion, RegionAttributes, StackBounds, store_task_mpu_settings()
//! INVARIANTS: Stack pair in slots 0-1; declared regions packed from slot 2 in order; zero-length skipped

use bitflags::bitflags;

use crate::config::{CONFIGURABLE_REGIONS, TASK_PMP_CONFIG_WORDS, TASK_PMP_SLOTS};

use super::encode::{config_word_index, extract_config_byte, tor_address, ConfigBytes};
use super::{AddressMode, EntryConfig, PmpPermissions};

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
    /// Access requested by a task for one of its declared regions.
    pub struct RegionAttributes: u32 {
        const READ_ONLY = 1 << 0;
        const READ_WRITE = 1 << 1;
        const PRIVILEGED_RW_UNPRIVILEGED_RO = 1 << 2;
    }
}

impl RegionAttributes {
    /// Permission bits granted to the TOR entry that closes the region.
    pub fn permissions(self) -> PmpPermissions {
        let mut perms = PmpPermissions::empty();
        if self.intersects(Self::READ_ONLY | Self::PRIVILEGED_RW_UNPRIVILEGED_RO) {
            perms |= PmpPermissions::READ;
        }
        if self.contains(Self::READ_WRITE) {
            perms |= PmpPermissions::READ | PmpPermissions::WRITE;
        }
        perms
    }
}

/// Memory region declared by a task owner. Consumed by the compiler, not retained.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct MemoryRegion {
    pub base: usize,
    pub len: usize,
    pub attributes: RegionAttributes,
}

impl MemoryRegion {
    pub const fn new(base: usize, len: usize, attributes: RegionAttributes) -> Self {
        Self { base, len, attributes }
    }

    /// Zero-length placeholder; contributes no table entries.
    pub const fn unused() -> Self {
        Self { base: 0, len: 0, attributes: RegionAttributes::empty() }
    }
}

/// Lowest stack address and stack size in bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct StackBounds {
    pub bottom: usize,
    pub depth_bytes: usize,
}

impl StackBounds {
    pub const fn new(bottom: usize, depth_bytes: usize) -> Self {
        Self { bottom, depth_bytes }
    }

    pub const fn top(self) -> usize {
        self.bottom + self.depth_bytes
    }
}

/// One compiled slot: configuration plus encoded address word.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProtectionEntry {
    pub config: EntryConfig,
    pub address: usize,
}

/// Protection table owned by a task and restored on every switch to it.
///
/// Layout is consumed by the context-switch path: configuration words first,
/// four bytes per word with the low byte for the lowest slot, then one address
/// word per slot.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TaskMpuSettings {
    pub pmpcfg: [u32; TASK_PMP_CONFIG_WORDS],
    pub pmpaddr: [usize; TASK_PMP_SLOTS],
}

impl Default for TaskMpuSettings {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskMpuSettings {
    pub const fn new() -> Self {
        Self { pmpcfg: [0; TASK_PMP_CONFIG_WORDS], pmpaddr: [0; TASK_PMP_SLOTS] }
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }

    pub fn entry(&self, slot: usize) -> ProtectionEntry {
        let word = self.pmpcfg[config_word_index(slot)];
        ProtectionEntry {
            config: EntryConfig::from_byte(extract_config_byte(word, slot)),
            address: self.pmpaddr[slot],
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = ProtectionEntry> + '_ {
        (0..TASK_PMP_SLOTS).map(move |slot| self.entry(slot))
    }

    fn set(&mut self, slot: usize, config: EntryConfig, raw_address: usize) {
        ConfigBytes::new(&mut self.pmpcfg).set(slot, config);
        self.pmpaddr[slot] = tor_address(raw_address);
        log_trace!(
            target: "pmp",
            "slot {} cfg {:#04x} word {:#010x} addr {:#x}",
            slot,
            config.to_byte(),
            self.pmpcfg[config_word_index(slot)],
            self.pmpaddr[slot]
        );
    }
}

const START_ENTRY: EntryConfig = EntryConfig::OFF;
const STACK_END_ENTRY: EntryConfig =
    EntryConfig::new(PmpPermissions::READ.union(PmpPermissions::WRITE), AddressMode::Tor);

/// Compiles a task's stack bounds and declared regions into `settings`.
///
/// The table is cleared first. A non-empty stack occupies slots 0 (OFF at the
/// bottom) and 1 (TOR read/write at the top). Declared regions are emitted from
/// slot 2 as an OFF entry at the base followed by a TOR entry at `base + len`
/// carrying the region's permissions. Zero-length regions are skipped without
/// consuming slots. `None` leaves every region slot disabled.
pub fn store_task_mpu_settings(
    settings: &mut TaskMpuSettings,
    regions: Option<&[MemoryRegion]>,
    stack: StackBounds,
) {
    settings.clear();

    if stack.depth_bytes > 0 {
        settings.set(0, START_ENTRY, stack.bottom);
        settings.set(1, STACK_END_ENTRY, stack.top());
    }

    let Some(regions) = regions else {
        log_debug!(target: "pmp", "no region list; region slots left disabled");
        return;
    };

    port_assert!(
        regions.len() <= CONFIGURABLE_REGIONS,
        "{} regions declared, {} supported",
        regions.len(),
        CONFIGURABLE_REGIONS
    );

    let mut slot = 2;
    for region in regions.iter().take(CONFIGURABLE_REGIONS).filter(|r| r.len > 0) {
        let end = EntryConfig::new(region.attributes.permissions(), AddressMode::Tor);
        settings.set(slot, START_ENTRY, region.base);
        settings.set(slot + 1, end, region.base + region.len);
        slot += 2;
    }
}
