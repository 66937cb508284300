// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: RISC-V PMP region compiler (task tables + static system table)
//! OWNERS: @kernel-mm-team
//! STATUS: Functional
//! API_STABILITY: Unstable
//! TEST_COVERAGE: Unit tests per submodule + property tests (tests_prop.rs)
//! PUBLIC API: EntryConfig, AddressMode, PmpPermissions, PmpError, store_task_mpu_settings(), setup_mpu()
//! DEPENDS_ON: hal::PmpRegisters, config (slot geometry)
//! INVARIANTS: Config bytes packed four per word, low byte = lowest slot; addresses stored >> 2

use bitflags::bitflags;
use core::fmt;

mod encode;
mod system;
mod task;
#[cfg(test)]
mod tests_prop;

pub use encode::{
    config_byte_shift, config_word_index, extract_config_byte, insert_config_byte, napot_address,
    tor_address, ConfigBytes,
};
pub use system::{
    default_system_regions, list_regions, load_task_settings, setup_mpu, system_region_address,
    SystemLayout, SystemRegion, SYSTEM_TABLE_LEN,
};
pub use task::{
    store_task_mpu_settings, MemoryRegion, ProtectionEntry, RegionAttributes, StackBounds,
    TaskMpuSettings,
};

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
    /// Permission and lock bits of a PMP configuration byte.
    pub struct PmpPermissions: u8 {
        const READ = 1 << 0;
        const WRITE = 1 << 1;
        const EXECUTE = 1 << 2;
        const LOCKED = 1 << 7;
    }
}

/// Address matching mode held in bits 3-4 of a configuration byte.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum AddressMode {
    /// Entry disabled; its address still bounds a following TOR entry.
    #[default]
    Off = 0,
    /// Top of range: matches `[previous address, this address)`.
    Tor = 1,
    /// Naturally aligned four-byte region.
    Na4 = 2,
    /// Naturally aligned power-of-two region.
    Napot = 3,
}

impl AddressMode {
    const SHIFT: u8 = 3;
    const MASK: u8 = 0b11 << Self::SHIFT;

    const fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0 => AddressMode::Off,
            1 => AddressMode::Tor,
            2 => AddressMode::Na4,
            _ => AddressMode::Napot,
        }
    }
}

/// Decoded PMP configuration byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct EntryConfig {
    pub permissions: PmpPermissions,
    pub mode: AddressMode,
}

impl EntryConfig {
    /// Disabled entry with no permissions.
    pub const OFF: Self = Self::new(PmpPermissions::empty(), AddressMode::Off);

    pub const fn new(permissions: PmpPermissions, mode: AddressMode) -> Self {
        Self { permissions, mode }
    }

    /// Encodes the hardware byte: R/W/X in bits 0-2, A in bits 3-4, L in bit 7.
    pub const fn to_byte(self) -> u8 {
        self.permissions.bits() | ((self.mode as u8) << AddressMode::SHIFT)
    }

    pub const fn from_byte(byte: u8) -> Self {
        Self {
            permissions: PmpPermissions::from_bits_truncate(byte),
            mode: AddressMode::from_bits((byte & AddressMode::MASK) >> AddressMode::SHIFT),
        }
    }

    pub const fn readable(self) -> bool {
        self.permissions.contains(PmpPermissions::READ)
    }

    pub const fn writable(self) -> bool {
        self.permissions.contains(PmpPermissions::WRITE)
    }

    pub const fn executable(self) -> bool {
        self.permissions.contains(PmpPermissions::EXECUTE)
    }

    pub const fn locked(self) -> bool {
        self.permissions.contains(PmpPermissions::LOCKED)
    }
}

impl fmt::Display for EntryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "R {} W {} X {} L {} A {}",
            self.readable() as u8,
            self.writable() as u8,
            self.executable() as u8,
            self.locked() as u8,
            self.mode as u8
        )
    }
}

/// Errors produced while validating protection tables.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PmpError {
    /// NAPOT region size is not a power of two.
    NotPowerOfTwo { size: usize },
    /// NAPOT region is smaller than the eight-byte minimum.
    TooSmall { size: usize },
    /// NAPOT base is not aligned to the region size.
    Misaligned { base: usize, size: usize },
    /// Table holds more entries than the hardware implements.
    TableFull { entries: usize, capacity: usize },
}

impl fmt::Display for PmpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PmpError::NotPowerOfTwo { size } => write!(f, "region size {:#x} is not a power of two", size),
            PmpError::TooSmall { size } => write!(f, "region size {:#x} below NAPOT minimum", size),
            PmpError::Misaligned { base, size } => {
                write!(f, "region base {:#x} not aligned to size {:#x}", base, size)
            }
            PmpError::TableFull { entries, capacity } => {
                write!(f, "{} entries exceed {} hardware regions", entries, capacity)
            }
        }
    }
}
