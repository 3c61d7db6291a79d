// SPDX-FileCopyrightText: Copyright The pmu-abi Contributors.
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command line argument blocks, copied to the top of PMU DMEM before the falcon is started.

use core::mem::size_of;

use crate::pmuif::{
    pmu_cmdline_args_v3, pmu_cmdline_args_v4, pmu_cmdline_args_v5, pmu_cmdline_args_v6,
};
use crate::{record, record_mut, DmaSurface, Error, MemDesc};

/// Accessors of one command line block revision.
///
/// Getters return the fields as stored, so the trace DMA base is in 256 byte units on v3 and v4
/// and a byte address on later revisions.
pub trait CmdlineArgsAbi {
    /// Size of the block in bytes.
    fn size(&self) -> usize;

    fn set_cpu_freq(&self, buf: &mut [u8], freq_hz: u32) -> Result<(), Error>;

    fn set_secure_mode(&self, buf: &mut [u8], val: u8) -> Result<(), Error>;

    fn set_trace_size(&self, buf: &mut [u8], size: u32) -> Result<(), Error>;

    /// Points the falcon trace buffer at `surface`.
    fn set_trace_dma_base(&self, buf: &mut [u8], surface: &DmaSurface) -> Result<(), Error>;

    fn set_trace_dma_idx(&self, buf: &mut [u8], idx: u32) -> Result<(), Error>;

    /// Describes the super surface. Only v6 has one, other revisions ignore the call.
    fn config_super_surface(&self, _buf: &mut [u8], _surface: &DmaSurface) -> Result<(), Error> {
        Ok(())
    }

    fn cpu_freq(&self, buf: &[u8]) -> Result<u32, Error>;

    fn secure_mode(&self, buf: &[u8]) -> Result<u8, Error>;

    fn trace_size(&self, buf: &[u8]) -> Result<u32, Error>;

    fn trace_dma_base(&self, buf: &[u8]) -> Result<u64, Error>;

    fn trace_dma_idx(&self, buf: &[u8]) -> Result<u32, Error>;
}

/// The v3 and v4 blocks store the trace buffer base in 256 byte units, truncated to 32 bits.
fn trace_dma_base_units(surface: &DmaSurface) -> u32 {
    (surface.gpu_va as u32) / 0x100
}

pub struct CmdlineArgsV3;

impl CmdlineArgsAbi for CmdlineArgsV3 {
    fn size(&self) -> usize {
        size_of::<pmu_cmdline_args_v3>()
    }

    fn set_cpu_freq(&self, buf: &mut [u8], freq_hz: u32) -> Result<(), Error> {
        record_mut::<pmu_cmdline_args_v3>(buf)?.cpu_freq_hz = freq_hz;
        Ok(())
    }

    fn set_secure_mode(&self, buf: &mut [u8], val: u8) -> Result<(), Error> {
        record_mut::<pmu_cmdline_args_v3>(buf)?.secure_mode = val;
        Ok(())
    }

    fn set_trace_size(&self, buf: &mut [u8], size: u32) -> Result<(), Error> {
        record_mut::<pmu_cmdline_args_v3>(buf)?.falc_trace_size = size;
        Ok(())
    }

    fn set_trace_dma_base(&self, buf: &mut [u8], surface: &DmaSurface) -> Result<(), Error> {
        record_mut::<pmu_cmdline_args_v3>(buf)?.falc_trace_dma_base =
            trace_dma_base_units(surface);
        Ok(())
    }

    fn set_trace_dma_idx(&self, buf: &mut [u8], idx: u32) -> Result<(), Error> {
        record_mut::<pmu_cmdline_args_v3>(buf)?.falc_trace_dma_idx = idx;
        Ok(())
    }

    fn cpu_freq(&self, buf: &[u8]) -> Result<u32, Error> {
        Ok(record::<pmu_cmdline_args_v3>(buf)?.cpu_freq_hz)
    }

    fn secure_mode(&self, buf: &[u8]) -> Result<u8, Error> {
        Ok(record::<pmu_cmdline_args_v3>(buf)?.secure_mode)
    }

    fn trace_size(&self, buf: &[u8]) -> Result<u32, Error> {
        Ok(record::<pmu_cmdline_args_v3>(buf)?.falc_trace_size)
    }

    fn trace_dma_base(&self, buf: &[u8]) -> Result<u64, Error> {
        Ok(record::<pmu_cmdline_args_v3>(buf)?.falc_trace_dma_base as u64)
    }

    fn trace_dma_idx(&self, buf: &[u8]) -> Result<u32, Error> {
        Ok(record::<pmu_cmdline_args_v3>(buf)?.falc_trace_dma_idx)
    }
}

pub struct CmdlineArgsV4;

impl CmdlineArgsAbi for CmdlineArgsV4 {
    fn size(&self) -> usize {
        size_of::<pmu_cmdline_args_v4>()
    }

    fn set_cpu_freq(&self, buf: &mut [u8], freq_hz: u32) -> Result<(), Error> {
        record_mut::<pmu_cmdline_args_v4>(buf)?.cpu_freq_hz = freq_hz;
        Ok(())
    }

    fn set_secure_mode(&self, buf: &mut [u8], val: u8) -> Result<(), Error> {
        record_mut::<pmu_cmdline_args_v4>(buf)?.secure_mode = val;
        Ok(())
    }

    fn set_trace_size(&self, buf: &mut [u8], size: u32) -> Result<(), Error> {
        record_mut::<pmu_cmdline_args_v4>(buf)?.falc_trace_size = size;
        Ok(())
    }

    fn set_trace_dma_base(&self, buf: &mut [u8], surface: &DmaSurface) -> Result<(), Error> {
        let args = record_mut::<pmu_cmdline_args_v4>(buf)?;
        args.dma_addr.dma_base = trace_dma_base_units(surface);
        args.dma_addr.dma_base1 = 0;
        args.dma_addr.dma_offset = 0;
        Ok(())
    }

    fn set_trace_dma_idx(&self, buf: &mut [u8], idx: u32) -> Result<(), Error> {
        record_mut::<pmu_cmdline_args_v4>(buf)?.falc_trace_dma_idx = idx;
        Ok(())
    }

    fn cpu_freq(&self, buf: &[u8]) -> Result<u32, Error> {
        Ok(record::<pmu_cmdline_args_v4>(buf)?.cpu_freq_hz)
    }

    fn secure_mode(&self, buf: &[u8]) -> Result<u8, Error> {
        Ok(record::<pmu_cmdline_args_v4>(buf)?.secure_mode)
    }

    fn trace_size(&self, buf: &[u8]) -> Result<u32, Error> {
        Ok(record::<pmu_cmdline_args_v4>(buf)?.falc_trace_size)
    }

    fn trace_dma_base(&self, buf: &[u8]) -> Result<u64, Error> {
        let args = record::<pmu_cmdline_args_v4>(buf)?;
        Ok((args.dma_addr.dma_base1 as u64) << 32 | args.dma_addr.dma_base as u64)
    }

    fn trace_dma_idx(&self, buf: &[u8]) -> Result<u32, Error> {
        Ok(record::<pmu_cmdline_args_v4>(buf)?.falc_trace_dma_idx)
    }
}

/// Falcon clock the v5 and v6 firmware is always started with.
const PMU_CPU_FREQ_HZ: u32 = 204_000_000;

/// The trace buffer size and DMA index live in the surface descriptor on v5 and v6, so the
/// dedicated setters are no-ops there.
macro_rules! cmdline_v5_accessors {
    ($raw:ty) => {
        fn set_cpu_freq(&self, buf: &mut [u8], _freq_hz: u32) -> Result<(), Error> {
            record_mut::<$raw>(buf)?.cpu_freq_hz = PMU_CPU_FREQ_HZ;
            Ok(())
        }

        fn set_secure_mode(&self, buf: &mut [u8], val: u8) -> Result<(), Error> {
            record_mut::<$raw>(buf)?.secure_mode = val;
            Ok(())
        }

        fn set_trace_size(&self, _buf: &mut [u8], _size: u32) -> Result<(), Error> {
            Ok(())
        }

        fn set_trace_dma_base(&self, buf: &mut [u8], surface: &DmaSurface) -> Result<(), Error> {
            record_mut::<$raw>(buf)?.trace_buf = MemDesc::from_surface(surface).into();
            Ok(())
        }

        fn set_trace_dma_idx(&self, _buf: &mut [u8], _idx: u32) -> Result<(), Error> {
            Ok(())
        }

        fn cpu_freq(&self, buf: &[u8]) -> Result<u32, Error> {
            Ok(record::<$raw>(buf)?.cpu_freq_hz)
        }

        fn secure_mode(&self, buf: &[u8]) -> Result<u8, Error> {
            Ok(record::<$raw>(buf)?.secure_mode)
        }

        fn trace_size(&self, buf: &[u8]) -> Result<u32, Error> {
            Ok(MemDesc::from(&record::<$raw>(buf)?.trace_buf).size())
        }

        fn trace_dma_base(&self, buf: &[u8]) -> Result<u64, Error> {
            Ok(MemDesc::from(&record::<$raw>(buf)?.trace_buf).address)
        }

        fn trace_dma_idx(&self, buf: &[u8]) -> Result<u32, Error> {
            Ok(MemDesc::from(&record::<$raw>(buf)?.trace_buf).dma_idx() as u32)
        }
    };
}

pub struct CmdlineArgsV5;

impl CmdlineArgsAbi for CmdlineArgsV5 {
    fn size(&self) -> usize {
        size_of::<pmu_cmdline_args_v5>()
    }

    cmdline_v5_accessors!(pmu_cmdline_args_v5);
}

pub struct CmdlineArgsV6;

impl CmdlineArgsV6 {
    /// Reads back the super surface descriptor.
    pub fn super_surface(&self, buf: &[u8]) -> Result<MemDesc, Error> {
        Ok(MemDesc::from(
            &record::<pmu_cmdline_args_v6>(buf)?.super_surface,
        ))
    }
}

impl CmdlineArgsAbi for CmdlineArgsV6 {
    fn size(&self) -> usize {
        size_of::<pmu_cmdline_args_v6>()
    }

    cmdline_v5_accessors!(pmu_cmdline_args_v6);

    fn config_super_surface(&self, buf: &mut [u8], surface: &DmaSurface) -> Result<(), Error> {
        record_mut::<pmu_cmdline_args_v6>(buf)?.super_surface =
            MemDesc::from_surface(surface).into();
        Ok(())
    }
}
