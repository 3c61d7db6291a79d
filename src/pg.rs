// SPDX-FileCopyrightText: Copyright The pmu-abi Contributors.
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Power-gating engine buffer load commands.
//!
//! The v1 and v2 setters OR into the DMA address, so they expect a zeroed command buffer.
//! Use [`PgEngBufLoadAbi::set_dma_addr`] to store a full 64-bit address in one go.

use core::mem::size_of;

use crate::pmuif::{
    pmu_pg_cmd_eng_buf_load_v0, pmu_pg_cmd_eng_buf_load_v1, pmu_pg_cmd_eng_buf_load_v2,
};
use crate::{record, record_mut, Error};

/// Header shared by every revision of the command.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct PgEngBufLoadHeader {
    pub cmd_type: u8,
    pub engine_id: u8,
    pub buf_idx: u8,
    pub pad: u8,
}

/// Accessors of one engine buffer load command revision.
pub trait PgEngBufLoadAbi {
    /// Size of the command in bytes.
    fn size(&self) -> usize;

    fn set_cmd_type(&self, buf: &mut [u8], value: u8) -> Result<(), Error>;
    fn set_engine_id(&self, buf: &mut [u8], value: u8) -> Result<(), Error>;
    fn set_buf_idx(&self, buf: &mut [u8], value: u8) -> Result<(), Error>;
    fn set_pad(&self, buf: &mut [u8], value: u8) -> Result<(), Error>;
    fn set_buf_size(&self, buf: &mut [u8], value: u16) -> Result<(), Error>;
    fn set_dma_base(&self, buf: &mut [u8], addr: u64) -> Result<(), Error>;
    fn set_dma_offset(&self, buf: &mut [u8], value: u8) -> Result<(), Error>;
    fn set_dma_idx(&self, buf: &mut [u8], value: u8) -> Result<(), Error>;

    /// Stores `addr` as the buffer address, replacing whatever was there.
    fn set_dma_addr(&self, buf: &mut [u8], addr: u64) -> Result<(), Error>;

    fn header(&self, buf: &[u8]) -> Result<PgEngBufLoadHeader, Error>;

    /// Buffer size field as stored. On v2 this is the whole descriptor parameter word.
    fn buf_size(&self, buf: &[u8]) -> Result<u32, Error>;

    /// Raw DMA base field. On v0 this is in 256 byte units.
    fn dma_base(&self, buf: &[u8]) -> Result<u64, Error>;

    fn dma_idx(&self, buf: &[u8]) -> Result<u8, Error>;

    /// Buffer address as written by [`PgEngBufLoadAbi::set_dma_addr`].
    fn dma_addr(&self, buf: &[u8]) -> Result<u64, Error>;
}

macro_rules! pg_header_accessors {
    ($raw:ty) => {
        fn size(&self) -> usize {
            size_of::<$raw>()
        }

        fn set_cmd_type(&self, buf: &mut [u8], value: u8) -> Result<(), Error> {
            record_mut::<$raw>(buf)?.cmd_type = value;
            Ok(())
        }

        fn set_engine_id(&self, buf: &mut [u8], value: u8) -> Result<(), Error> {
            record_mut::<$raw>(buf)?.engine_id = value;
            Ok(())
        }

        fn set_buf_idx(&self, buf: &mut [u8], value: u8) -> Result<(), Error> {
            record_mut::<$raw>(buf)?.buf_idx = value;
            Ok(())
        }

        fn set_pad(&self, buf: &mut [u8], value: u8) -> Result<(), Error> {
            record_mut::<$raw>(buf)?.pad = value;
            Ok(())
        }

        fn header(&self, buf: &[u8]) -> Result<PgEngBufLoadHeader, Error> {
            let raw = record::<$raw>(buf)?;

            Ok(PgEngBufLoadHeader {
                cmd_type: raw.cmd_type,
                engine_id: raw.engine_id,
                buf_idx: raw.buf_idx,
                pad: raw.pad,
            })
        }
    };
}

pub struct PgEngBufLoadV0;

impl PgEngBufLoadV0 {
    const DMA_BASE_SHIFT: u32 = 8;
    const DMA_OFFSET_MASK: u64 = 0xff;
}

impl PgEngBufLoadAbi for PgEngBufLoadV0 {
    pg_header_accessors!(pmu_pg_cmd_eng_buf_load_v0);

    fn set_buf_size(&self, buf: &mut [u8], value: u16) -> Result<(), Error> {
        record_mut::<pmu_pg_cmd_eng_buf_load_v0>(buf)?.buf_size = value;
        Ok(())
    }

    /// Only the low 32 bits of `addr` are encoded, in 256 byte units.
    fn set_dma_base(&self, buf: &mut [u8], addr: u64) -> Result<(), Error> {
        record_mut::<pmu_pg_cmd_eng_buf_load_v0>(buf)?.dma_base =
            (addr as u32) >> Self::DMA_BASE_SHIFT;
        Ok(())
    }

    fn set_dma_offset(&self, buf: &mut [u8], value: u8) -> Result<(), Error> {
        record_mut::<pmu_pg_cmd_eng_buf_load_v0>(buf)?.dma_offset = value;
        Ok(())
    }

    fn set_dma_idx(&self, buf: &mut [u8], value: u8) -> Result<(), Error> {
        record_mut::<pmu_pg_cmd_eng_buf_load_v0>(buf)?.dma_idx = value;
        Ok(())
    }

    fn set_dma_addr(&self, buf: &mut [u8], addr: u64) -> Result<(), Error> {
        let cmd = record_mut::<pmu_pg_cmd_eng_buf_load_v0>(buf)?;
        cmd.dma_base = (addr >> Self::DMA_BASE_SHIFT) as u32;
        cmd.dma_offset = (addr & Self::DMA_OFFSET_MASK) as u8;
        Ok(())
    }

    fn buf_size(&self, buf: &[u8]) -> Result<u32, Error> {
        Ok(record::<pmu_pg_cmd_eng_buf_load_v0>(buf)?.buf_size as u32)
    }

    fn dma_base(&self, buf: &[u8]) -> Result<u64, Error> {
        Ok(record::<pmu_pg_cmd_eng_buf_load_v0>(buf)?.dma_base as u64)
    }

    fn dma_idx(&self, buf: &[u8]) -> Result<u8, Error> {
        Ok(record::<pmu_pg_cmd_eng_buf_load_v0>(buf)?.dma_idx)
    }

    fn dma_addr(&self, buf: &[u8]) -> Result<u64, Error> {
        let cmd = record::<pmu_pg_cmd_eng_buf_load_v0>(buf)?;
        Ok((cmd.dma_base as u64) << Self::DMA_BASE_SHIFT | cmd.dma_offset as u64)
    }
}

pub struct PgEngBufLoadV1;

impl PgEngBufLoadAbi for PgEngBufLoadV1 {
    pg_header_accessors!(pmu_pg_cmd_eng_buf_load_v1);

    fn set_buf_size(&self, buf: &mut [u8], value: u16) -> Result<(), Error> {
        record_mut::<pmu_pg_cmd_eng_buf_load_v1>(buf)?.dma_desc.dma_size = value;
        Ok(())
    }

    fn set_dma_base(&self, buf: &mut [u8], addr: u64) -> Result<(), Error> {
        let dma_addr = &mut record_mut::<pmu_pg_cmd_eng_buf_load_v1>(buf)?.dma_desc.dma_addr;
        dma_addr.lo |= addr as u32;
        dma_addr.hi |= (addr >> 32) as u32;
        Ok(())
    }

    fn set_dma_offset(&self, buf: &mut [u8], value: u8) -> Result<(), Error> {
        record_mut::<pmu_pg_cmd_eng_buf_load_v1>(buf)?.dma_desc.dma_addr.lo |= value as u32;
        Ok(())
    }

    fn set_dma_idx(&self, buf: &mut [u8], value: u8) -> Result<(), Error> {
        record_mut::<pmu_pg_cmd_eng_buf_load_v1>(buf)?.dma_desc.dma_idx = value;
        Ok(())
    }

    fn set_dma_addr(&self, buf: &mut [u8], addr: u64) -> Result<(), Error> {
        let dma_addr = &mut record_mut::<pmu_pg_cmd_eng_buf_load_v1>(buf)?.dma_desc.dma_addr;
        dma_addr.lo = addr as u32;
        dma_addr.hi = (addr >> 32) as u32;
        Ok(())
    }

    fn buf_size(&self, buf: &[u8]) -> Result<u32, Error> {
        Ok(record::<pmu_pg_cmd_eng_buf_load_v1>(buf)?.dma_desc.dma_size as u32)
    }

    fn dma_base(&self, buf: &[u8]) -> Result<u64, Error> {
        self.dma_addr(buf)
    }

    fn dma_idx(&self, buf: &[u8]) -> Result<u8, Error> {
        Ok(record::<pmu_pg_cmd_eng_buf_load_v1>(buf)?.dma_desc.dma_idx)
    }

    fn dma_addr(&self, buf: &[u8]) -> Result<u64, Error> {
        let dma_addr = record::<pmu_pg_cmd_eng_buf_load_v1>(buf)?.dma_desc.dma_addr;
        Ok((dma_addr.hi as u64) << 32 | dma_addr.lo as u64)
    }
}

pub struct PgEngBufLoadV2;

impl PgEngBufLoadV2 {
    const DMA_IDX_SHIFT: u32 = 24;
}

impl PgEngBufLoadAbi for PgEngBufLoadV2 {
    pg_header_accessors!(pmu_pg_cmd_eng_buf_load_v2);

    fn set_buf_size(&self, buf: &mut [u8], value: u16) -> Result<(), Error> {
        record_mut::<pmu_pg_cmd_eng_buf_load_v2>(buf)?.dma_desc.params = value as u32;
        Ok(())
    }

    /// Writes the low 32 bits of `addr` into both halves of the address, as the firmware
    /// interface always did.
    fn set_dma_base(&self, buf: &mut [u8], addr: u64) -> Result<(), Error> {
        let address = &mut record_mut::<pmu_pg_cmd_eng_buf_load_v2>(buf)?.dma_desc.address;
        address.lo = addr as u32;
        address.hi = addr as u32;
        Ok(())
    }

    fn set_dma_offset(&self, buf: &mut [u8], value: u8) -> Result<(), Error> {
        let address = &mut record_mut::<pmu_pg_cmd_eng_buf_load_v2>(buf)?.dma_desc.address;
        address.lo |= value as u32;
        address.hi |= value as u32;
        Ok(())
    }

    fn set_dma_idx(&self, buf: &mut [u8], value: u8) -> Result<(), Error> {
        record_mut::<pmu_pg_cmd_eng_buf_load_v2>(buf)?.dma_desc.params |=
            (value as u32) << Self::DMA_IDX_SHIFT;
        Ok(())
    }

    fn set_dma_addr(&self, buf: &mut [u8], addr: u64) -> Result<(), Error> {
        let address = &mut record_mut::<pmu_pg_cmd_eng_buf_load_v2>(buf)?.dma_desc.address;
        address.lo = addr as u32;
        address.hi = (addr >> 32) as u32;
        Ok(())
    }

    fn buf_size(&self, buf: &[u8]) -> Result<u32, Error> {
        Ok(record::<pmu_pg_cmd_eng_buf_load_v2>(buf)?.dma_desc.params)
    }

    fn dma_base(&self, buf: &[u8]) -> Result<u64, Error> {
        self.dma_addr(buf)
    }

    fn dma_idx(&self, buf: &[u8]) -> Result<u8, Error> {
        let params = record::<pmu_pg_cmd_eng_buf_load_v2>(buf)?.dma_desc.params;
        Ok((params >> Self::DMA_IDX_SHIFT) as u8)
    }

    fn dma_addr(&self, buf: &[u8]) -> Result<u64, Error> {
        let address = record::<pmu_pg_cmd_eng_buf_load_v2>(buf)?.dma_desc.address;
        Ok((address.hi as u64) << 32 | address.lo as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [&dyn PgEngBufLoadAbi; 3] = [&PgEngBufLoadV0, &PgEngBufLoadV1, &PgEngBufLoadV2];

    #[test]
    fn command_sizes() {
        for abi in ALL {
            assert_eq!(abi.size(), 16);
        }
    }

    #[test]
    fn header_fields() {
        for abi in ALL {
            let mut buf = [0u8; 16];
            abi.set_cmd_type(&mut buf, 8).unwrap();
            abi.set_engine_id(&mut buf, 0).unwrap();
            abi.set_buf_idx(&mut buf, 2).unwrap();
            abi.set_pad(&mut buf, 0).unwrap();

            assert_eq!(
                abi.header(&buf),
                Ok(PgEngBufLoadHeader {
                    cmd_type: 8,
                    engine_id: 0,
                    buf_idx: 2,
                    pad: 0,
                })
            );
            assert_eq!(&buf[..4], &[8, 0, 2, 0]);
        }
    }

    #[test]
    fn v0_shifts_dma_base() {
        let abi = PgEngBufLoadV0;
        let mut buf = [0u8; 16];

        abi.set_dma_base(&mut buf, 0x1234_5600).unwrap();
        abi.set_dma_offset(&mut buf, 0x78).unwrap();
        abi.set_dma_idx(&mut buf, 3).unwrap();
        abi.set_buf_size(&mut buf, 0x800).unwrap();

        assert_eq!(abi.dma_base(&buf), Ok(0x12_3456));
        assert_eq!(abi.dma_addr(&buf), Ok(0x1234_5678));
        assert_eq!(abi.dma_idx(&buf), Ok(3));
        assert_eq!(abi.buf_size(&buf), Ok(0x800));
        assert_eq!(&buf[8..12], &0x12_3456_u32.to_le_bytes());

        abi.set_dma_base(&mut buf, 0x0000_0012_3456_7800).unwrap();
        assert_eq!(abi.dma_base(&buf), Ok(0x34_5678));
    }

    #[test]
    fn v1_ors_into_address() {
        let abi = PgEngBufLoadV1;
        let mut buf = [0u8; 16];

        abi.set_dma_base(&mut buf, 0x0000_0002_8000_0000).unwrap();
        abi.set_dma_offset(&mut buf, 0x40).unwrap();
        abi.set_dma_idx(&mut buf, 1).unwrap();
        abi.set_buf_size(&mut buf, 0x1000).unwrap();

        assert_eq!(abi.dma_addr(&buf), Ok(0x0000_0002_8000_0040));
        assert_eq!(abi.dma_idx(&buf), Ok(1));
        assert_eq!(abi.buf_size(&buf), Ok(0x1000));
    }

    #[test]
    fn v2_reproduces_truncated_base() {
        let abi = PgEngBufLoadV2;
        let mut buf = [0u8; 16];

        abi.set_dma_base(&mut buf, 0x0000_0003_0010_0000).unwrap();
        assert_eq!(abi.dma_addr(&buf), Ok(0x0010_0000_0010_0000));

        abi.set_dma_offset(&mut buf, 0x20).unwrap();
        assert_eq!(abi.dma_addr(&buf), Ok(0x0010_0020_0010_0020));

        abi.set_buf_size(&mut buf, 0x400).unwrap();
        abi.set_dma_idx(&mut buf, 2).unwrap();
        assert_eq!(abi.buf_size(&buf), Ok(0x0200_0400));
        assert_eq!(abi.dma_idx(&buf), Ok(2));
    }

    #[test]
    fn dma_addr_halves_are_independent() {
        for abi in [&PgEngBufLoadV1 as &dyn PgEngBufLoadAbi, &PgEngBufLoadV2] {
            let mut buf = [0u8; 16];

            abi.set_dma_addr(&mut buf, 0xdead_beef_0000_1000).unwrap();
            assert_eq!(abi.dma_addr(&buf), Ok(0xdead_beef_0000_1000));
            assert_eq!(&buf[4..8], &0x0000_1000_u32.to_le_bytes());
            assert_eq!(&buf[8..12], &0xdead_beef_u32.to_le_bytes());

            abi.set_dma_addr(&mut buf, 0x0000_0001_ffff_f000).unwrap();
            assert_eq!(abi.dma_addr(&buf), Ok(0x0000_0001_ffff_f000));
        }
    }

    #[test]
    fn short_command() {
        for abi in ALL {
            let mut buf = [0u8; 15];
            assert_eq!(abi.set_dma_addr(&mut buf, 0), Err(Error::InvalidBufferSize));
            assert_eq!(abi.header(&buf), Err(Error::InvalidBufferSize));
        }
    }
}
