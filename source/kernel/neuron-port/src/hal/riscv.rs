// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! HAL implementation for RISC-V harts running in machine mode.
//!
//! Interrupt masking uses `mstatus.MIE`; the lock bank is the SIO-style block
//! of memory-mapped test-and-set cells where a read claims a cell (non-zero
//! result means the claim succeeded) and any write frees it.

use core::ptr::{read_volatile, write_volatile};

use ::riscv::register::{mhartid, mstatus};

use crate::config::SPINLOCK_COUNT;
use crate::types::{CoreId, LockId};

use super::{CoreContext, LockRegisters};

/// The hart executing the call.
#[derive(Clone, Copy, Default)]
pub struct Hart;

impl CoreContext for Hart {
    fn core_id(&self) -> CoreId {
        CoreId::from_raw(mhartid::read() as u16)
    }

    fn disable_interrupts(&self) {
        // SAFETY: clearing MIE only masks machine interrupts on this hart.
        unsafe { mstatus::clear_mie() }
    }

    fn enable_interrupts(&self) {
        // SAFETY: callers only unmask once the outermost critical section ends.
        unsafe { mstatus::set_mie() }
    }

    fn interrupts_enabled(&self) -> bool {
        mstatus::read().mie()
    }
}

/// Memory-mapped hardware spinlock cells.
pub struct SioLockRegisters {
    /// Address of the cell backing [`LockId::Isr`]; later ids follow at 4-byte stride.
    first_cell: usize,
    /// Address of the status register holding one "held" bit per cell.
    status: usize,
    /// Hardware cell number of the first reserved lock.
    first_index: u32,
}

impl SioLockRegisters {
    const CELL_STRIDE: usize = 4;

    /// # Safety
    ///
    /// `cell_base` must be the address of hardware spinlock 0 and `status` the
    /// address of the spinlock status register. The cells
    /// `first_index..first_index + SPINLOCK_COUNT` must be reserved for the port
    /// and must fit the 32-bit status register (`first_index + SPINLOCK_COUNT <= 32`).
    /// A range past bit 31 panics.
    pub const unsafe fn new(cell_base: usize, status: usize, first_index: u32) -> Self {
        assert!(
            first_index as usize + SPINLOCK_COUNT <= u32::BITS as usize,
            "spinlock range exceeds the status register"
        );
        Self {
            first_cell: cell_base + first_index as usize * Self::CELL_STRIDE,
            status,
            first_index,
        }
    }

    fn cell(&self, lock: LockId) -> usize {
        self.first_cell + lock.index() * Self::CELL_STRIDE
    }

    fn status_bit(&self, lock: LockId) -> u32 {
        1 << (self.first_index + lock.index() as u32)
    }
}

// SAFETY: the cells are hardware-arbitrated; concurrent access from any hart is
// the intended use.
unsafe impl Sync for SioLockRegisters {}

impl LockRegisters for SioLockRegisters {
    fn try_claim(&self, lock: LockId) -> bool {
        // SAFETY: `new` guarantees the address is a reserved spinlock cell.
        unsafe { read_volatile(self.cell(lock) as *const u32) != 0 }
    }

    fn is_free(&self, lock: LockId) -> bool {
        // SAFETY: status register address supplied to `new`.
        let held = unsafe { read_volatile(self.status as *const u32) };
        held & self.status_bit(lock) == 0
    }

    fn release(&self, lock: LockId) {
        // SAFETY: `new` guarantees the address is a reserved spinlock cell.
        unsafe { write_volatile(self.cell(lock) as *mut u32, 1) }
    }
}

#[cfg(target_arch = "riscv32")]
pub use self::csr::CsrPmp;

#[cfg(target_arch = "riscv32")]
mod csr {
    use core::arch::asm;

    use crate::config::HW_PMP_REGIONS;
    use crate::hal::PmpRegisters;
    use crate::pmp::{config_word_index, extract_config_byte, insert_config_byte, EntryConfig};

    macro_rules! csr_read {
        ($($csr:literal),+) => {{
            let value: usize;
            // SAFETY: reading a PMP CSR has no side effects in machine mode.
            unsafe { asm!(concat!("csrr {0}, ", $($csr),+), out(reg) value, options(nomem, nostack)) };
            value
        }};
    }

    macro_rules! csr_write {
        ($($csr:literal),+ => $value:expr) => {{
            let value: usize = $value;
            // SAFETY: caller owns the PMP unit; writes take effect for lower privilege modes.
            unsafe { asm!(concat!("csrw ", $($csr),+, ", {0}"), in(reg) value, options(nostack)) };
        }};
    }

    /// PMP unit programmed through the rv32 CSRs `pmpcfg0-3` and `pmpaddr0-15`.
    pub struct CsrPmp;

    fn read_cfg(word: usize) -> u32 {
        (match word {
            0 => csr_read!("pmpcfg0"),
            1 => csr_read!("pmpcfg1"),
            2 => csr_read!("pmpcfg2"),
            _ => csr_read!("pmpcfg3"),
        }) as u32
    }

    fn write_cfg(word: usize, value: u32) {
        match word {
            0 => csr_write!("pmpcfg0" => value as usize),
            1 => csr_write!("pmpcfg1" => value as usize),
            2 => csr_write!("pmpcfg2" => value as usize),
            _ => csr_write!("pmpcfg3" => value as usize),
        }
    }

    macro_rules! addr_table {
        ($($n:literal),*) => {
            fn read_addr(index: usize) -> usize {
                match index {
                    $($n => csr_read!("pmpaddr", $n),)*
                    _ => 0,
                }
            }

            fn write_addr(index: usize, value: usize) {
                match index {
                    $($n => csr_write!("pmpaddr", $n => value),)*
                    _ => {}
                }
            }
        };
    }

    addr_table!(0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15);

    impl PmpRegisters for CsrPmp {
        fn region_count(&self) -> usize {
            HW_PMP_REGIONS
        }

        fn set_region(&mut self, index: usize, config: EntryConfig, address: usize) {
            let word = config_word_index(index);
            // Address first: a TOR entry must never match against a stale bound.
            write_addr(index, address);
            write_cfg(word, insert_config_byte(read_cfg(word), index, config.to_byte()));
        }

        fn region(&self, index: usize) -> (EntryConfig, usize) {
            let byte = extract_config_byte(read_cfg(config_word_index(index)), index);
            (EntryConfig::from_byte(byte), read_addr(index))
        }
    }
}
