// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Pure encoders for PMP configuration words and address registers.

use crate::config::{PMP_ADDRESS_SHIFT, PMP_ENTRIES_PER_WORD, PMP_MIN_NAPOT_SIZE, PMP_NAPOT_SHIFT};

use super::{EntryConfig, PmpError};

/// Configuration word holding `slot`.
#[inline]
pub const fn config_word_index(slot: usize) -> usize {
    slot / PMP_ENTRIES_PER_WORD
}

/// Bit offset of `slot` inside its configuration word.
#[inline]
pub const fn config_byte_shift(slot: usize) -> u32 {
    ((slot % PMP_ENTRIES_PER_WORD) * 8) as u32
}

/// Replaces the byte for `slot` in `word`, preserving the other three bytes.
#[inline]
pub const fn insert_config_byte(word: u32, slot: usize, byte: u8) -> u32 {
    let shift = config_byte_shift(slot);
    (word & !(0xff << shift)) | ((byte as u32) << shift)
}

#[inline]
pub const fn extract_config_byte(word: u32, slot: usize) -> u8 {
    (word >> config_byte_shift(slot)) as u8
}

/// Address register value for a TOR/OFF boundary.
#[inline]
pub const fn tor_address(addr: usize) -> usize {
    addr >> PMP_ADDRESS_SHIFT
}

/// Address register value for a naturally aligned power-of-two region.
pub fn napot_address(base: usize, size: usize) -> Result<usize, PmpError> {
    if !size.is_power_of_two() {
        return Err(PmpError::NotPowerOfTwo { size });
    }
    if size < PMP_MIN_NAPOT_SIZE {
        return Err(PmpError::TooSmall { size });
    }
    if base & (size - 1) != 0 {
        return Err(PmpError::Misaligned { base, size });
    }
    Ok((base >> PMP_NAPOT_SHIFT) | ((size / PMP_MIN_NAPOT_SIZE) - 1))
}

/// Byte-addressed view over word-addressed configuration registers.
pub struct ConfigBytes<'a> {
    words: &'a mut [u32],
}

impl<'a> ConfigBytes<'a> {
    pub fn new(words: &'a mut [u32]) -> Self {
        Self { words }
    }

    /// Number of slots the view can address.
    pub fn capacity(&self) -> usize {
        self.words.len() * PMP_ENTRIES_PER_WORD
    }

    pub fn set(&mut self, slot: usize, config: EntryConfig) {
        let word = &mut self.words[config_word_index(slot)];
        *word = insert_config_byte(*word, slot, config.to_byte());
    }

    pub fn get(&self, slot: usize) -> EntryConfig {
        EntryConfig::from_byte(extract_config_byte(self.words[config_word_index(slot)], slot))
    }
}
