// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Machine-mode environment call identifiers used by unprivileged tasks.
//!
//! The identifier travels in `a7`; `a0` carries the argument and the result.

use core::fmt;

/// **ABI STABILITY**: values are shared with the trap handler.
#[repr(usize)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MachineEcall {
    Yield = 0,
    IsPrivileged = 1,
    RaisePriority = 2,
    SetInterruptMask = 3,
    ClearInterruptMask = 4,
}

impl MachineEcall {
    pub const fn id(self) -> usize {
        self as usize
    }
}

/// Environment call number with no assigned meaning.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct UnknownEcall(pub usize);

impl fmt::Display for UnknownEcall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown machine ecall {}", self.0)
    }
}

impl TryFrom<usize> for MachineEcall {
    type Error = UnknownEcall;

    fn try_from(raw: usize) -> Result<Self, Self::Error> {
        Ok(match raw {
            0 => MachineEcall::Yield,
            1 => MachineEcall::IsPrivileged,
            2 => MachineEcall::RaisePriority,
            3 => MachineEcall::SetInterruptMask,
            4 => MachineEcall::ClearInterruptMask,
            other => return Err(UnknownEcall(other)),
        })
    }
}

/// Issues `call` with `arg` in `a0` and returns the handler's `a0`.
///
/// # Safety
///
/// A machine-mode trap handler implementing [`MachineEcall`] must be installed.
#[cfg(any(target_arch = "riscv32", target_arch = "riscv64"))]
#[inline]
pub unsafe fn ecall(call: MachineEcall, arg: usize) -> usize {
    let mut a0 = arg;
    unsafe {
        core::arch::asm!("ecall", inout("a0") a0, in("a7") call.id(), options(nostack));
    }
    a0
}
