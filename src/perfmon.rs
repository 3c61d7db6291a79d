// SPDX-FileCopyrightText: Copyright The pmu-abi Contributors.
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Perfmon counter records and perfmon commands.
//!
//! Only the encoding is handled here. Sampling policy belongs to the caller.

use core::mem::{offset_of, size_of};

use crate::pmuif::{
    pmu_perfmon_cmd_init_v1, pmu_perfmon_cmd_init_v2, pmu_perfmon_cmd_init_v3,
    pmu_perfmon_cmd_start_v1, pmu_perfmon_cmd_start_v2, pmu_perfmon_cmd_start_v3,
    pmu_perfmon_counter_v2,
};
use crate::{record, record_mut, Error};

/// Size of the largest perfmon counter revision.
pub const PERFMON_COUNTER_MAX_SIZE: usize = size_of::<pmu_perfmon_counter_v2>();

/// Decoded perfmon counter.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct PerfmonCounter {
    pub index: u8,
    pub flags: u8,
    pub group_id: u8,
    pub valid: u8,
    pub upper_threshold: u16,
    pub lower_threshold: u16,
    pub scale: u32,
}

/// Accessors of one perfmon counter revision.
pub trait PerfmonCounterAbi {
    fn size(&self) -> usize;
    fn set_upper_threshold(&self, buf: &mut [u8], threshold: u16) -> Result<(), Error>;
    fn set_lower_threshold(&self, buf: &mut [u8], threshold: u16) -> Result<(), Error>;
    fn set_valid(&self, buf: &mut [u8], valid: u8) -> Result<(), Error>;
    fn set_index(&self, buf: &mut [u8], index: u8) -> Result<(), Error>;
    fn set_group_id(&self, buf: &mut [u8], group_id: u8) -> Result<(), Error>;
    fn counter(&self, buf: &[u8]) -> Result<PerfmonCounter, Error>;
}

pub struct PerfmonCounterV2;

impl PerfmonCounterAbi for PerfmonCounterV2 {
    fn size(&self) -> usize {
        size_of::<pmu_perfmon_counter_v2>()
    }

    fn set_upper_threshold(&self, buf: &mut [u8], threshold: u16) -> Result<(), Error> {
        record_mut::<pmu_perfmon_counter_v2>(buf)?.upper_threshold = threshold;
        Ok(())
    }

    fn set_lower_threshold(&self, buf: &mut [u8], threshold: u16) -> Result<(), Error> {
        record_mut::<pmu_perfmon_counter_v2>(buf)?.lower_threshold = threshold;
        Ok(())
    }

    fn set_valid(&self, buf: &mut [u8], valid: u8) -> Result<(), Error> {
        record_mut::<pmu_perfmon_counter_v2>(buf)?.valid = valid;
        Ok(())
    }

    fn set_index(&self, buf: &mut [u8], index: u8) -> Result<(), Error> {
        record_mut::<pmu_perfmon_counter_v2>(buf)?.index = index;
        Ok(())
    }

    fn set_group_id(&self, buf: &mut [u8], group_id: u8) -> Result<(), Error> {
        record_mut::<pmu_perfmon_counter_v2>(buf)?.group_id = group_id;
        Ok(())
    }

    fn counter(&self, buf: &[u8]) -> Result<PerfmonCounter, Error> {
        let raw = record::<pmu_perfmon_counter_v2>(buf)?;

        Ok(PerfmonCounter {
            index: raw.index,
            flags: raw.flags,
            group_id: raw.group_id,
            valid: raw.valid,
            upper_threshold: raw.upper_threshold,
            lower_threshold: raw.lower_threshold,
            scale: raw.scale,
        })
    }
}

/// Perfmon start command, without its counter allocation.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct PerfmonStart {
    pub cmd_type: u8,
    pub group_id: u8,
    pub state_id: u8,
    pub flags: u8,
}

/// Perfmon init command, without its counter allocation.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct PerfmonInit {
    pub cmd_type: u8,
    pub to_decrease_count: u8,
    pub base_counter_id: u8,
    pub sample_period_us: u32,
    pub num_counters: u8,
    pub samples_in_moving_avg: u8,
    pub sample_buffer: u16,
}

/// A perfmon command to be encoded with the active ABI.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PerfmonCmd {
    Start(PerfmonStart),
    Init(PerfmonInit),
}

/// Accessors of one perfmon command revision.
///
/// The counter allocation embedded in each command is filled through the
/// [`crate::allocation::AllocationAbi`] of the same bundle, at the offset reported here.
pub trait PerfmonCmdAbi {
    fn start_size(&self) -> usize;
    fn start_counter_alloc_offset(&self) -> usize;
    fn start_set_cmd_type(&self, buf: &mut [u8], value: u8) -> Result<(), Error>;
    fn start_set_group_id(&self, buf: &mut [u8], value: u8) -> Result<(), Error>;
    fn start_set_state_id(&self, buf: &mut [u8], value: u8) -> Result<(), Error>;
    fn start_set_flags(&self, buf: &mut [u8], value: u8) -> Result<(), Error>;
    fn start_flags(&self, buf: &[u8]) -> Result<u8, Error>;
    fn start(&self, buf: &[u8]) -> Result<PerfmonStart, Error>;

    fn init_size(&self) -> usize;
    fn init_counter_alloc_offset(&self) -> usize;
    fn init_set_cmd_type(&self, buf: &mut [u8], value: u8) -> Result<(), Error>;
    fn init_set_sample_buffer(&self, buf: &mut [u8], value: u16) -> Result<(), Error>;
    fn init_set_dec_cnt(&self, buf: &mut [u8], value: u8) -> Result<(), Error>;
    fn init_set_base_cnt_id(&self, buf: &mut [u8], value: u8) -> Result<(), Error>;
    fn init_set_samp_period_us(&self, buf: &mut [u8], value: u32) -> Result<(), Error>;
    fn init_set_num_cnt(&self, buf: &mut [u8], value: u8) -> Result<(), Error>;
    fn init_set_mov_avg(&self, buf: &mut [u8], value: u8) -> Result<(), Error>;
    fn init(&self, buf: &[u8]) -> Result<PerfmonInit, Error>;

    /// Writes every field of `cmd` and returns the size of the encoded command.
    fn pack(&self, buf: &mut [u8], cmd: &PerfmonCmd) -> Result<usize, Error> {
        match cmd {
            PerfmonCmd::Start(start) => {
                self.start_set_cmd_type(buf, start.cmd_type)?;
                self.start_set_group_id(buf, start.group_id)?;
                self.start_set_state_id(buf, start.state_id)?;
                self.start_set_flags(buf, start.flags)?;
                Ok(self.start_size())
            }
            PerfmonCmd::Init(init) => {
                self.init_set_cmd_type(buf, init.cmd_type)?;
                self.init_set_dec_cnt(buf, init.to_decrease_count)?;
                self.init_set_base_cnt_id(buf, init.base_counter_id)?;
                self.init_set_samp_period_us(buf, init.sample_period_us)?;
                self.init_set_num_cnt(buf, init.num_counters)?;
                self.init_set_mov_avg(buf, init.samples_in_moving_avg)?;
                self.init_set_sample_buffer(buf, init.sample_buffer)?;
                Ok(self.init_size())
            }
        }
    }
}

/// The command revisions only differ in the embedded allocation record.
macro_rules! perfmon_cmd_abi {
    ($name:ident, $start:ty, $init:ty) => {
        pub struct $name;

        impl PerfmonCmdAbi for $name {
            fn start_size(&self) -> usize {
                size_of::<$start>()
            }

            fn start_counter_alloc_offset(&self) -> usize {
                offset_of!($start, counter_alloc)
            }

            fn start_set_cmd_type(&self, buf: &mut [u8], value: u8) -> Result<(), Error> {
                record_mut::<$start>(buf)?.cmd_type = value;
                Ok(())
            }

            fn start_set_group_id(&self, buf: &mut [u8], value: u8) -> Result<(), Error> {
                record_mut::<$start>(buf)?.group_id = value;
                Ok(())
            }

            fn start_set_state_id(&self, buf: &mut [u8], value: u8) -> Result<(), Error> {
                record_mut::<$start>(buf)?.state_id = value;
                Ok(())
            }

            fn start_set_flags(&self, buf: &mut [u8], value: u8) -> Result<(), Error> {
                record_mut::<$start>(buf)?.flags = value;
                Ok(())
            }

            fn start_flags(&self, buf: &[u8]) -> Result<u8, Error> {
                Ok(record::<$start>(buf)?.flags)
            }

            fn start(&self, buf: &[u8]) -> Result<PerfmonStart, Error> {
                let raw = record::<$start>(buf)?;

                Ok(PerfmonStart {
                    cmd_type: raw.cmd_type,
                    group_id: raw.group_id,
                    state_id: raw.state_id,
                    flags: raw.flags,
                })
            }

            fn init_size(&self) -> usize {
                size_of::<$init>()
            }

            fn init_counter_alloc_offset(&self) -> usize {
                offset_of!($init, counter_alloc)
            }

            fn init_set_cmd_type(&self, buf: &mut [u8], value: u8) -> Result<(), Error> {
                record_mut::<$init>(buf)?.cmd_type = value;
                Ok(())
            }

            fn init_set_sample_buffer(&self, buf: &mut [u8], value: u16) -> Result<(), Error> {
                record_mut::<$init>(buf)?.sample_buffer = value;
                Ok(())
            }

            fn init_set_dec_cnt(&self, buf: &mut [u8], value: u8) -> Result<(), Error> {
                record_mut::<$init>(buf)?.to_decrease_count = value;
                Ok(())
            }

            fn init_set_base_cnt_id(&self, buf: &mut [u8], value: u8) -> Result<(), Error> {
                record_mut::<$init>(buf)?.base_counter_id = value;
                Ok(())
            }

            fn init_set_samp_period_us(&self, buf: &mut [u8], value: u32) -> Result<(), Error> {
                record_mut::<$init>(buf)?.sample_period_us = value;
                Ok(())
            }

            fn init_set_num_cnt(&self, buf: &mut [u8], value: u8) -> Result<(), Error> {
                record_mut::<$init>(buf)?.num_counters = value;
                Ok(())
            }

            fn init_set_mov_avg(&self, buf: &mut [u8], value: u8) -> Result<(), Error> {
                record_mut::<$init>(buf)?.samples_in_moving_avg = value;
                Ok(())
            }

            fn init(&self, buf: &[u8]) -> Result<PerfmonInit, Error> {
                let raw = record::<$init>(buf)?;

                Ok(PerfmonInit {
                    cmd_type: raw.cmd_type,
                    to_decrease_count: raw.to_decrease_count,
                    base_counter_id: raw.base_counter_id,
                    sample_period_us: raw.sample_period_us,
                    num_counters: raw.num_counters,
                    samples_in_moving_avg: raw.samples_in_moving_avg,
                    sample_buffer: raw.sample_buffer,
                })
            }
        }
    };
}

perfmon_cmd_abi!(
    PerfmonCmdV1,
    pmu_perfmon_cmd_start_v1,
    pmu_perfmon_cmd_init_v1
);
perfmon_cmd_abi!(
    PerfmonCmdV2,
    pmu_perfmon_cmd_start_v2,
    pmu_perfmon_cmd_init_v2
);
perfmon_cmd_abi!(
    PerfmonCmdV3,
    pmu_perfmon_cmd_start_v3,
    pmu_perfmon_cmd_init_v3
);
