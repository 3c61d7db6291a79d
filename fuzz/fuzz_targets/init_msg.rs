// SPDX-FileCopyrightText: Copyright The pmu-abi Contributors.
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Decodes init messages from the test data with every firmware ABI and checks that queue
//! lookups never fail on a buffer large enough for the message.

#![no_main]

use libfuzzer_sys::fuzz_target;
use pmu_abi::{ChipFamily, Error, PmuAbi};

const FAMILIES: [ChipFamily; 6] = [
    ChipFamily::Gm20b,
    ChipFamily::Gp10b,
    ChipFamily::Gp10x,
    ChipFamily::Gv11b,
    ChipFamily::Gv10x,
    ChipFamily::Tu10x,
];

fuzz_target!(|data: &[u8]| {
    let Some((&queue_id, msg)) = data.split_first() else {
        return;
    };

    for family in FAMILIES {
        let mut abi = PmuAbi::new();
        abi.publish(family.into()).unwrap();

        let size = abi.init_msg_size().unwrap();
        let result = abi.init_msg_queue_params(msg, queue_id as u32);

        match queue_id {
            0 | 1 | 4 if msg.len() >= size => {
                let params = result.unwrap();
                assert!(params.size <= u16::MAX as u32);
                assert!(params.offset <= 6 * u16::MAX as u32);
                abi.init_msg_sw_managed_area_size(msg).unwrap();
            }
            0 | 1 | 4 => assert_eq!(result, Err(Error::InvalidBufferSize)),
            id => assert_eq!(result, Err(Error::InvalidQueueId(id as u32))),
        }
    }
});
