// SPDX-FileCopyrightText: Copyright The pmu-abi Contributors.
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Generic DMEM/FB allocation records.
//!
//! Commands that pass a buffer to the PMU embed an allocation record. The DMEM part is
//! present in every revision. The frame buffer part is only usable from v3 onwards.

use core::mem::{offset_of, size_of};

use crate::pmuif::{pmu_allocation_v1, pmu_allocation_v2, pmu_allocation_v3, pmu_dmem};
use crate::{record, record_mut, Error, MemDesc};

/// Accessors of one allocation record revision.
pub trait AllocationAbi {
    /// Size of the record in bytes.
    fn size(&self) -> usize;

    fn dmem_size(&self, buf: &[u8]) -> Result<u16, Error>;

    fn set_dmem_size(&self, buf: &mut [u8], size: u16) -> Result<(), Error>;

    fn dmem_offset(&self, buf: &[u8]) -> Result<u32, Error>;

    fn set_dmem_offset(&self, buf: &mut [u8], offset: u32) -> Result<(), Error>;

    /// Byte position of the DMEM offset field inside the record.
    fn dmem_offset_pos(&self) -> usize {
        offset_of!(pmu_dmem, offset)
    }

    /// Byte range `(offset, size)` of the frame buffer part inside the record.
    fn fb_span(&self) -> Result<(usize, usize), Error> {
        Err(Error::NoFbAllocation)
    }

    fn fb(&self, _buf: &[u8]) -> Result<MemDesc, Error> {
        Err(Error::NoFbAllocation)
    }

    fn set_fb(&self, _buf: &mut [u8], _desc: MemDesc) -> Result<(), Error> {
        Err(Error::NoFbAllocation)
    }
}

pub struct AllocationV1;

impl AllocationAbi for AllocationV1 {
    fn size(&self) -> usize {
        size_of::<pmu_allocation_v1>()
    }

    fn dmem_size(&self, buf: &[u8]) -> Result<u16, Error> {
        Ok(record::<pmu_allocation_v1>(buf)?.dmem.size)
    }

    fn set_dmem_size(&self, buf: &mut [u8], size: u16) -> Result<(), Error> {
        record_mut::<pmu_allocation_v1>(buf)?.dmem.size = size;
        Ok(())
    }

    fn dmem_offset(&self, buf: &[u8]) -> Result<u32, Error> {
        Ok(record::<pmu_allocation_v1>(buf)?.dmem.offset)
    }

    fn set_dmem_offset(&self, buf: &mut [u8], offset: u32) -> Result<(), Error> {
        record_mut::<pmu_allocation_v1>(buf)?.dmem.offset = offset;
        Ok(())
    }
}

pub struct AllocationV2;

impl AllocationAbi for AllocationV2 {
    fn size(&self) -> usize {
        size_of::<pmu_allocation_v2>()
    }

    fn dmem_size(&self, buf: &[u8]) -> Result<u16, Error> {
        Ok(record::<pmu_allocation_v2>(buf)?.dmem.size)
    }

    fn set_dmem_size(&self, buf: &mut [u8], size: u16) -> Result<(), Error> {
        record_mut::<pmu_allocation_v2>(buf)?.dmem.size = size;
        Ok(())
    }

    fn dmem_offset(&self, buf: &[u8]) -> Result<u32, Error> {
        Ok(record::<pmu_allocation_v2>(buf)?.dmem.offset)
    }

    fn set_dmem_offset(&self, buf: &mut [u8], offset: u32) -> Result<(), Error> {
        record_mut::<pmu_allocation_v2>(buf)?.dmem.offset = offset;
        Ok(())
    }
}

pub struct AllocationV3;

impl AllocationAbi for AllocationV3 {
    fn size(&self) -> usize {
        size_of::<pmu_allocation_v3>()
    }

    fn dmem_size(&self, buf: &[u8]) -> Result<u16, Error> {
        Ok(record::<pmu_allocation_v3>(buf)?.dmem.size)
    }

    fn set_dmem_size(&self, buf: &mut [u8], size: u16) -> Result<(), Error> {
        record_mut::<pmu_allocation_v3>(buf)?.dmem.size = size;
        Ok(())
    }

    fn dmem_offset(&self, buf: &[u8]) -> Result<u32, Error> {
        Ok(record::<pmu_allocation_v3>(buf)?.dmem.offset)
    }

    fn set_dmem_offset(&self, buf: &mut [u8], offset: u32) -> Result<(), Error> {
        record_mut::<pmu_allocation_v3>(buf)?.dmem.offset = offset;
        Ok(())
    }

    fn fb_span(&self) -> Result<(usize, usize), Error> {
        Ok((
            offset_of!(pmu_allocation_v3, fb),
            size_of::<crate::pmuif::flcn_mem_desc_v0>(),
        ))
    }

    fn fb(&self, buf: &[u8]) -> Result<MemDesc, Error> {
        Ok(MemDesc::from(&record::<pmu_allocation_v3>(buf)?.fb))
    }

    fn set_fb(&self, buf: &mut [u8], desc: MemDesc) -> Result<(), Error> {
        record_mut::<pmu_allocation_v3>(buf)?.fb = desc.into();
        Ok(())
    }
}
