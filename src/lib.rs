// SPDX-FileCopyrightText: Copyright The pmu-abi Contributors.
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Firmware ABI dispatch and engine bring-up for the GPU PMU falcon.
//!
//! The PMU firmware shipped for each chip family uses its own revision of every command and
//! message record. This crate selects the matching set of record accessors once, from the
//! `app_version` found in the ucode descriptor, and exposes them through the
//! version-independent [`PmuAbi`]. It also drives the reset, scrub and enable sequence of the
//! PMU engine through the [`EngineControl`] hardware trait.

#![cfg_attr(not(test), no_std)]

use num_enum::{IntoPrimitive, TryFromPrimitive};
use thiserror::Error;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

pub mod allocation;
pub mod cmdline;
pub mod dispatch;
pub mod engine;
pub mod firmware;
pub mod init_msg;
pub mod perfmon;
pub mod pg;
pub mod pmu;
mod pmuif;
pub mod registry;

pub use dispatch::PmuAbi;
pub use engine::{EngineControl, EngineState, PmuEngine};
pub use firmware::{FirmwareLoader, LoadedFirmware, UcodeDesc};
pub use pmu::{Capabilities, Pmu};
pub use registry::AbiBundle;

/// Errors returned by this crate.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum Error {
    #[error("Unsupported PMU firmware version {0}")]
    UnsupportedVersion(u32),
    #[error("Failed to load firmware blob {name}")]
    FirmwareLoad { name: &'static str },
    #[error("Timed out waiting for the falcon memory scrub")]
    ScrubTimeout,
    #[error("Timed out waiting for the falcon to become idle")]
    EnableTimeout,
    #[error("PMU firmware ABI not initialized")]
    NotInitialized,
    #[error("Invalid buffer size")]
    InvalidBufferSize,
    #[error("Malformed descriptor")]
    MalformedDescriptor,
    #[error("Invalid queue ID {0}")]
    InvalidQueueId(u32),
    #[error("Allocation has no frame buffer part")]
    NoFbAllocation,
    #[error("Hardware error {0}")]
    Hardware(i32),
}

/// An `app_version` couldn't be converted to a [`ChipFamily`] because no firmware ABI is known
/// for it.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
#[error("Unsupported PMU firmware version {0}")]
pub struct UnsupportedVersionError(u32);

impl From<UnsupportedVersionError> for Error {
    fn from(value: UnsupportedVersionError) -> Self {
        Self::UnsupportedVersion(value.0)
    }
}

/// Chip families, identified by the `app_version` of the PMU ucode built for them.
#[derive(Clone, Copy, Debug, Eq, IntoPrimitive, PartialEq, TryFromPrimitive)]
#[num_enum(error_type(name = UnsupportedVersionError, constructor = UnsupportedVersionError))]
#[repr(u32)]
pub enum ChipFamily {
    Gm20b = 20490253,
    Gp10b = 23782727,
    Gp10x = 24076634,
    Gv11b = 25005711,
    Gv10x = 25633490,
    Tu10x = 25622342,
}

/// The queue ID couldn't be converted to a [`QueueId`].
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
#[error("Invalid queue ID {0}")]
pub struct InvalidQueueIdError(u32);

impl From<InvalidQueueIdError> for Error {
    fn from(value: InvalidQueueIdError) -> Self {
        Self::InvalidQueueId(value.0)
    }
}

/// Host side queues described by the init message.
#[derive(Clone, Copy, Debug, Eq, IntoPrimitive, PartialEq, TryFromPrimitive)]
#[num_enum(error_type(name = InvalidQueueIdError, constructor = InvalidQueueIdError))]
#[repr(u32)]
pub enum QueueId {
    /// High priority command queue
    Hpq = 0,
    /// Low priority command queue
    Lpq = 1,
    /// Message queue, PMU to host
    Message = 4,
}

/// GPU virtual mapping of a buffer, as handed out by the DMA allocator.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct DmaSurface {
    pub gpu_va: u64,
    pub size: u32,
}

/// Falcon memory descriptor: a 64-bit DMA address, a 24-bit size and an 8-bit DMA index.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct MemDesc {
    pub address: u64,
    pub params: u32,
}

impl MemDesc {
    const SIZE_MASK: u32 = 0x00ff_ffff;
    const DMA_IDX_SHIFT: usize = 24;

    /// DMA index of a virtually addressed surface.
    pub const DMAIDX_VIRT: u8 = 1;

    pub fn new(address: u64, size: u32, dma_idx: u8) -> Self {
        Self {
            address,
            params: (size & Self::SIZE_MASK) | ((dma_idx as u32) << Self::DMA_IDX_SHIFT),
        }
    }

    /// Describes a virtually mapped surface. The size is truncated to 24 bits.
    pub fn from_surface(surface: &DmaSurface) -> Self {
        Self::new(surface.gpu_va, surface.size, Self::DMAIDX_VIRT)
    }

    pub fn size(&self) -> u32 {
        self.params & Self::SIZE_MASK
    }

    pub fn dma_idx(&self) -> u8 {
        (self.params >> Self::DMA_IDX_SHIFT) as u8
    }
}

impl From<&pmuif::flcn_mem_desc_v0> for MemDesc {
    fn from(raw: &pmuif::flcn_mem_desc_v0) -> Self {
        let (lo, hi) = (raw.address.lo, raw.address.hi);
        Self {
            address: (hi as u64) << 32 | lo as u64,
            params: raw.params,
        }
    }
}

impl From<MemDesc> for pmuif::flcn_mem_desc_v0 {
    fn from(desc: MemDesc) -> Self {
        Self {
            address: pmuif::falc_u64 {
                lo: desc.address as u32,
                hi: (desc.address >> 32) as u32,
            },
            params: desc.params,
        }
    }
}

/// Views the start of `buf` as the raw record `T`.
pub(crate) fn record<T: FromBytes + KnownLayout + Immutable>(buf: &[u8]) -> Result<&T, Error> {
    T::ref_from_prefix(buf)
        .map(|(raw, _)| raw)
        .map_err(|_| Error::InvalidBufferSize)
}

/// Views the start of `buf` as the raw record `T` for writing.
pub(crate) fn record_mut<T: FromBytes + IntoBytes + KnownLayout>(
    buf: &mut [u8],
) -> Result<&mut T, Error> {
    T::mut_from_prefix(buf)
        .map(|(raw, _)| raw)
        .map_err(|_| Error::InvalidBufferSize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chip_family_from_app_version() {
        assert_eq!(ChipFamily::try_from(20490253), Ok(ChipFamily::Gm20b));
        assert_eq!(ChipFamily::try_from(25622342), Ok(ChipFamily::Tu10x));
        assert_eq!(u32::from(ChipFamily::Gv11b), 25005711);

        let err: Error = ChipFamily::try_from(0).unwrap_err().into();
        assert_eq!(err, Error::UnsupportedVersion(0));
    }

    #[test]
    fn queue_id_conversion() {
        assert_eq!(QueueId::try_from(0), Ok(QueueId::Hpq));
        assert_eq!(QueueId::try_from(1), Ok(QueueId::Lpq));
        assert_eq!(QueueId::try_from(4), Ok(QueueId::Message));

        for id in [2, 3, 5, u32::MAX] {
            let err: Error = QueueId::try_from(id).unwrap_err().into();
            assert_eq!(err, Error::InvalidQueueId(id));
        }
    }

    #[test]
    fn mem_desc_params() {
        let desc = MemDesc::from_surface(&DmaSurface {
            gpu_va: 0x1_2345_6000,
            size: 0x0300_1000,
        });
        assert_eq!(desc.address, 0x1_2345_6000);
        assert_eq!(desc.size(), 0x1000);
        assert_eq!(desc.dma_idx(), MemDesc::DMAIDX_VIRT);
        assert_eq!(desc.params, 0x0100_1000);

        let raw = pmuif::flcn_mem_desc_v0::from(desc);
        assert_eq!({ raw.address.lo }, 0x2345_6000);
        assert_eq!({ raw.address.hi }, 0x1);
        assert_eq!(MemDesc::from(&raw), desc);
    }

    #[test]
    fn short_buffer_is_rejected() {
        let buf = [0u8; 11];
        assert_eq!(
            record::<pmuif::flcn_mem_desc_v0>(&buf).err(),
            Some(Error::InvalidBufferSize)
        );

        let mut buf = [0u8; 16];
        assert!(record_mut::<pmuif::flcn_mem_desc_v0>(&mut buf).is_ok());
    }
}
