// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: Property tests for the protection table compiler
//! INVARIANTS: Packing never disturbs neighbour bytes; compiled regions keep declaration order

#![cfg(test)]

use proptest::prelude::*;

use super::*;
use crate::config::{CONFIGURABLE_REGIONS, TASK_PMP_SLOTS};

fn attributes() -> impl Strategy<Value = RegionAttributes> {
    prop_oneof![
        Just(RegionAttributes::READ_ONLY),
        Just(RegionAttributes::READ_WRITE),
        Just(RegionAttributes::PRIVILEGED_RW_UNPRIVILEGED_RO),
    ]
}

fn region() -> impl Strategy<Value = MemoryRegion> {
    (0usize..0x1000_0000, prop_oneof![Just(0usize), 4usize..0x1_0000], attributes())
        .prop_map(|(base, len, attributes)| MemoryRegion::new(base & !3, len, attributes))
}

proptest! {
    #[test]
    fn insert_touches_only_its_byte(word in any::<u32>(), slot in 0usize..4, byte in any::<u8>()) {
        let updated = insert_config_byte(word, slot, byte);
        prop_assert_eq!(extract_config_byte(updated, slot), byte);
        for other in (0..4).filter(|s| *s != slot) {
            prop_assert_eq!(extract_config_byte(updated, other), extract_config_byte(word, other));
        }
    }

    #[test]
    fn stack_top_is_shifted_end(bottom in 0usize..0x4000_0000, depth in 1usize..0x10_0000) {
        let mut settings = TaskMpuSettings::new();
        store_task_mpu_settings(&mut settings, Some(&[]), StackBounds::new(bottom, depth));
        prop_assert_eq!(settings.pmpaddr[0], bottom >> 2);
        prop_assert_eq!(settings.pmpaddr[1], (bottom + depth) >> 2);
    }

    #[test]
    fn regions_pack_in_order_without_gaps(
        regions in proptest::collection::vec(region(), 0..=CONFIGURABLE_REGIONS),
    ) {
        let mut settings = TaskMpuSettings::new();
        store_task_mpu_settings(&mut settings, Some(&regions), StackBounds::new(0x8000_0000, 0x400));

        let used: Vec<_> = regions.iter().filter(|r| r.len > 0).collect();
        for (pair, region) in used.iter().enumerate() {
            let start = settings.entry(2 + 2 * pair);
            let end = settings.entry(3 + 2 * pair);
            prop_assert_eq!(start, ProtectionEntry { config: EntryConfig::OFF, address: region.base >> 2 });
            prop_assert_eq!(end.address, (region.base + region.len) >> 2);
            prop_assert_eq!(end.config.mode, AddressMode::Tor);
            prop_assert_eq!(end.config.permissions, region.attributes.permissions());
        }
        for slot in (2 + 2 * used.len())..TASK_PMP_SLOTS {
            prop_assert_eq!(settings.entry(slot), ProtectionEntry { config: EntryConfig::OFF, address: 0 });
        }
    }

    #[test]
    fn napot_mask_recovers_size(order in 3u32..24, frame in 0usize..0x100) {
        let size = 1usize << order;
        let base = frame * size;
        let encoded = napot_address(base, size).expect("aligned power of two");
        let mask = size / 8 - 1;
        prop_assert_eq!(encoded & mask, mask);
        prop_assert_eq!(encoded & !mask, base >> 3);
    }
}
