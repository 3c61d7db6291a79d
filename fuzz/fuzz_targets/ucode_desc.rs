// SPDX-FileCopyrightText: Copyright The pmu-abi Contributors.
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Parses a ucode descriptor from the test data, selects its ABI and checks that the decoded
//! fields match the input bytes.

#![no_main]

use libfuzzer_sys::fuzz_target;
use pmu_abi::{AbiBundle, ChipFamily, Error, UcodeDesc};

fuzz_target!(|data: &[u8]| {
    let Ok(desc) = UcodeDesc::parse(data) else {
        assert!(data.len() < UcodeDesc::SIZE);
        return;
    };

    let word = |offset: usize| {
        u32::from_le_bytes([
            data[offset],
            data[offset + 1],
            data[offset + 2],
            data[offset + 3],
        ])
    };
    assert_eq!(desc.descriptor_size, word(0));
    assert_eq!(desc.app_version, word(12));
    assert_eq!(desc.app_size, word(100));
    assert_eq!(desc.compressed, word(392));
    assert!(desc.overlays().len() <= 32);

    match AbiBundle::select(desc.app_version) {
        Ok(bundle) => assert_eq!(u32::from(bundle.family()), desc.app_version),
        Err(e) => {
            assert_eq!(e, Error::UnsupportedVersion(desc.app_version));
            assert!(ChipFamily::try_from(desc.app_version).is_err());
        }
    }
});
