// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: Newtypes shared by the lock, nesting and ISR paths
//! OWNERS: @kernel-sync-team
//! PUBLIC API: CoreId, LockId, InvalidLockId, InterruptState
//! INVARIANTS: LockId is always < SPINLOCK_COUNT; CoreId indexes per-core arrays

use core::fmt;

use crate::config::SPINLOCK_COUNT;

/// Physical core identifier used to index per-core port state.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct CoreId(u16);

impl CoreId {
    pub const BOOT: Self = Self(0);

    #[inline]
    pub const fn from_raw(raw: u16) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn as_raw(self) -> u16 {
        self.0
    }

    #[inline]
    pub const fn as_index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for CoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_raw())
    }
}

/// Hardware lock cell reserved for one kernel subsystem.
///
/// **ABI STABILITY**: discriminants select the hardware cell and the bit in the
/// per-core ownership mask. Renumbering is a breaking change.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum LockId {
    Isr = 0,
    Task = 1,
    EventGroup = 2,
    Queue = 3,
    StreamBuffer = 4,
    Timer = 5,
    User = 6,
}

impl LockId {
    pub const ALL: [LockId; SPINLOCK_COUNT] = [
        LockId::Isr,
        LockId::Task,
        LockId::EventGroup,
        LockId::Queue,
        LockId::StreamBuffer,
        LockId::Timer,
        LockId::User,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Bit owned by this lock in a core's ownership mask.
    #[inline]
    pub const fn mask(self) -> u8 {
        1u8 << (self as u8)
    }
}

/// Raw lock number outside the reserved range.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct InvalidLockId(pub u8);

impl TryFrom<u8> for LockId {
    type Error = InvalidLockId;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        LockId::ALL.get(raw as usize).copied().ok_or(InvalidLockId(raw))
    }
}

impl fmt::Display for LockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LockId::Isr => "isr",
            LockId::Task => "task",
            LockId::EventGroup => "event-group",
            LockId::Queue => "queue",
            LockId::StreamBuffer => "stream-buffer",
            LockId::Timer => "timer",
            LockId::User => "user",
        };
        f.write_str(name)
    }
}

/// Interrupt mask observed on ISR entry, handed back on ISR exit.
///
/// The raw value is platform defined (mstatus.MIE on RISC-V); callers treat it
/// as opaque and only pass it back to the matching restore call.
#[must_use = "the saved interrupt state must be restored"]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(transparent)]
pub struct InterruptState(usize);

impl InterruptState {
    const ENABLED: usize = 1;

    #[inline]
    pub const fn from_raw(raw: usize) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn from_enabled(enabled: bool) -> Self {
        if enabled {
            Self(Self::ENABLED)
        } else {
            Self(0)
        }
    }

    #[inline]
    pub const fn raw(self) -> usize {
        self.0
    }

    /// Returns true when interrupts were enabled at the time of the save.
    #[inline]
    pub const fn were_enabled(self) -> bool {
        self.0 != 0
    }
}
