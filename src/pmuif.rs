// SPDX-FileCopyrightText: Copyright The pmu-abi Contributors.
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Raw PMU firmware interface records.
//!
//! Every record is little-endian and packed. Padding the firmware expects is spelled out as
//! explicit `pad`/`reserved` fields so the byte offsets below are exactly what the falcon reads.

#![allow(non_camel_case_types)]

use zerocopy_derive::*;

/// 64-bit falcon address split in two words.
#[derive(Default, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C, packed)]
pub(crate) struct falc_u64 {
    /// Offset 0, length 4: Low word
    pub(crate) lo: u32,
    /// Offset 4, length 4: High word
    pub(crate) hi: u32,
}

/// DMEM part of an allocation.
#[derive(Default, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C, packed)]
pub(crate) struct pmu_dmem {
    /// Offset 0, length 2: Size of the DMEM region in bytes
    pub(crate) size: u16,
    /// Offset 2, length 2: Reserved (MBZ)
    pub(crate) pad: u16,
    /// Offset 4, length 4: DMEM byte offset
    pub(crate) offset: u32,
}

#[derive(Default, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C, packed)]
pub(crate) struct pmu_mem_v1 {
    /// Offset 0, length 4: DMA base in 256 byte units
    pub(crate) dma_base: u32,
    /// Offset 4, length 1: Offset inside the first 256 byte unit
    pub(crate) dma_offset: u8,
    /// Offset 5, length 1: DMA aperture index
    pub(crate) dma_idx: u8,
    /// Offset 6, length 2: Size of the FB region
    pub(crate) fb_size: u16,
}

#[derive(Default, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C, packed)]
pub(crate) struct pmu_mem_desc_v0 {
    /// Offset 0, length 8: DMA address
    pub(crate) dma_addr: falc_u64,
    /// Offset 8, length 2: Maximum size of the surface
    pub(crate) dma_sizemax: u16,
    /// Offset 10, length 1: DMA aperture index
    pub(crate) dma_idx: u8,
    /// Offset 11, length 1: Reserved (MBZ)
    pub(crate) pad: u8,
}

/// Falcon memory descriptor used from GP10X onwards.
#[derive(Default, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C, packed)]
pub(crate) struct flcn_mem_desc_v0 {
    /// Offset 0, length 8: DMA address
    pub(crate) address: falc_u64,
    /// Offset 8, length 4: Parameters
    /// - Bits\[31:24\]: DMA aperture index.
    /// - Bits\[23:0\]: Size of the surface in bytes.
    pub(crate) params: u32,
}

#[derive(Default, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C, packed)]
pub(crate) struct flcn_mem_desc {
    /// Offset 0, length 8: DMA address
    pub(crate) dma_addr: falc_u64,
    /// Offset 8, length 2: Size of the surface
    pub(crate) dma_size: u16,
    /// Offset 10, length 1: DMA aperture index
    pub(crate) dma_idx: u8,
    /// Offset 11, length 1: Reserved (MBZ)
    pub(crate) pad: u8,
}

/// Perfmon counter descriptor, shared by every supported firmware.
#[derive(Default, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C, packed)]
pub(crate) struct pmu_perfmon_counter_v2 {
    /// Offset 0, length 1: Counter index
    pub(crate) index: u8,
    /// Offset 1, length 1: Flags
    pub(crate) flags: u8,
    /// Offset 2, length 1: Domain group the counter samples
    pub(crate) group_id: u8,
    /// Offset 3, length 1: Non-zero if the counter is valid
    pub(crate) valid: u8,
    /// Offset 4, length 2: Upper threshold in units of 0.01%
    pub(crate) upper_threshold: u16,
    /// Offset 6, length 2: Lower threshold in units of 0.01%
    pub(crate) lower_threshold: u16,
    /// Offset 8, length 4: Scale
    pub(crate) scale: u32,
}

#[derive(Default, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C, packed)]
pub(crate) struct pmu_cmdline_args_v3 {
    /// Offset 0, length 4: Reserved
    pub(crate) reserved: u32,
    /// Offset 4, length 4: Falcon clock in Hz
    pub(crate) cpu_freq_hz: u32,
    /// Offset 8, length 4: Size of the falcon trace buffer
    pub(crate) falc_trace_size: u32,
    /// Offset 12, length 4: Trace buffer DMA base in 256 byte units
    pub(crate) falc_trace_dma_base: u32,
    /// Offset 16, length 4: Trace buffer DMA aperture index
    pub(crate) falc_trace_dma_idx: u32,
    /// Offset 20, length 1: Secure mode
    pub(crate) secure_mode: u8,
    /// Offset 21, length 1: Raise privilege level
    pub(crate) raise_priv_sec: u8,
    /// Offset 22, length 2: Reserved (MBZ)
    pub(crate) pad: [u8; 2],
    /// Offset 24, length 8: GC6 context
    pub(crate) gc6_ctx: pmu_mem_v1,
}

#[derive(Default, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C, packed)]
pub(crate) struct falc_dma_addr {
    /// Offset 0, length 4: DMA base in 256 byte units
    pub(crate) dma_base: u32,
    /// Offset 4, length 4: Upper bits of the DMA base
    pub(crate) dma_base1: u32,
    /// Offset 8, length 1: Offset inside the first 256 byte unit
    pub(crate) dma_offset: u8,
    /// Offset 9, length 3: Reserved (MBZ)
    pub(crate) pad: [u8; 3],
}

#[derive(Default, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C, packed)]
pub(crate) struct pmu_cmdline_args_v4 {
    /// Offset 0, length 4: Reserved
    pub(crate) reserved: u32,
    /// Offset 4, length 4: Falcon clock in Hz
    pub(crate) cpu_freq_hz: u32,
    /// Offset 8, length 4: Size of the falcon trace buffer
    pub(crate) falc_trace_size: u32,
    /// Offset 12, length 12: Trace buffer DMA address
    pub(crate) dma_addr: falc_dma_addr,
    /// Offset 24, length 4: Trace buffer DMA aperture index
    pub(crate) falc_trace_dma_idx: u32,
    /// Offset 28, length 1: Secure mode
    pub(crate) secure_mode: u8,
    /// Offset 29, length 1: Raise privilege level
    pub(crate) raise_priv_sec: u8,
    /// Offset 30, length 2: Reserved (MBZ)
    pub(crate) pad0: [u8; 2],
    /// Offset 32, length 12: GC6 context
    pub(crate) gc6_ctx: pmu_mem_desc_v0,
    /// Offset 44, length 4: Reserved (MBZ)
    pub(crate) pad1: [u8; 4],
}

#[derive(Default, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C, packed)]
pub(crate) struct pmu_cmdline_args_v5 {
    /// Offset 0, length 4: Falcon clock in Hz
    pub(crate) cpu_freq_hz: u32,
    /// Offset 4, length 12: Trace buffer surface
    pub(crate) trace_buf: flcn_mem_desc_v0,
    /// Offset 16, length 1: Secure mode
    pub(crate) secure_mode: u8,
    /// Offset 17, length 1: Raise privilege level
    pub(crate) raise_priv_sec: u8,
    /// Offset 18, length 2: Reserved (MBZ)
    pub(crate) pad: [u8; 2],
    /// Offset 20, length 12: GC6 context
    pub(crate) gc6_ctx: flcn_mem_desc_v0,
    /// Offset 32, length 12: Init data surface
    pub(crate) init_data_dma_info: flcn_mem_desc_v0,
    /// Offset 44, length 4: Reserved
    pub(crate) dummy: u32,
}

/// Shares the layout of [`pmu_cmdline_args_v5`] up to and including `gc6_ctx`.
#[derive(Default, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C, packed)]
pub(crate) struct pmu_cmdline_args_v6 {
    /// Offset 0, length 4: Falcon clock in Hz
    pub(crate) cpu_freq_hz: u32,
    /// Offset 4, length 12: Trace buffer surface
    pub(crate) trace_buf: flcn_mem_desc_v0,
    /// Offset 16, length 1: Secure mode
    pub(crate) secure_mode: u8,
    /// Offset 17, length 1: Raise privilege level
    pub(crate) raise_priv_sec: u8,
    /// Offset 18, length 2: Reserved (MBZ)
    pub(crate) pad: [u8; 2],
    /// Offset 20, length 12: GC6 context
    pub(crate) gc6_ctx: flcn_mem_desc_v0,
    /// Offset 32, length 12: GC6 BSOD context
    pub(crate) gc6_bsod_ctx: flcn_mem_desc_v0,
    /// Offset 44, length 12: Super surface
    pub(crate) super_surface: flcn_mem_desc_v0,
    /// Offset 56, length 4: Flags
    pub(crate) flags: u32,
}

#[derive(Default, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C, packed)]
pub(crate) struct pmu_allocation_v1 {
    /// Offset 0, length 8: DMEM region
    pub(crate) dmem: pmu_dmem,
    /// Offset 8, length 8: FB region (not exposed at this version)
    pub(crate) fb: pmu_mem_v1,
}

#[derive(Default, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C, packed)]
pub(crate) struct pmu_allocation_v2 {
    /// Offset 0, length 8: DMEM region
    pub(crate) dmem: pmu_dmem,
    /// Offset 8, length 12: FB region (not exposed at this version)
    pub(crate) fb: pmu_mem_desc_v0,
}

#[derive(Default, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C, packed)]
pub(crate) struct pmu_allocation_v3 {
    /// Offset 0, length 8: DMEM region
    pub(crate) dmem: pmu_dmem,
    /// Offset 8, length 12: FB region
    pub(crate) fb: flcn_mem_desc_v0,
}

/// Number of queue entries in the v1 init message.
pub(crate) const PMU_QUEUE_COUNT: usize = 5;
pub(crate) const PMU_QUEUE_COUNT_FOR_V3: usize = 3;
pub(crate) const PMU_QUEUE_COUNT_FOR_V4: usize = 5;
pub(crate) const PMU_QUEUE_COUNT_FOR_V5: usize = 4;

#[derive(Default, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C, packed)]
pub(crate) struct pmu_queue_info_v1 {
    /// Offset 0, length 2: Queue size in bytes
    pub(crate) size: u16,
    /// Offset 2, length 2: Queue DMEM offset
    pub(crate) offset: u16,
    /// Offset 4, length 1: Queue register index
    pub(crate) index: u8,
    /// Offset 5, length 1: Reserved
    pub(crate) pad: u8,
}

#[derive(Default, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C, packed)]
pub(crate) struct pmu_init_msg_pmu_v1 {
    /// Offset 0, length 1: Message type
    pub(crate) msg_type: u8,
    /// Offset 1, length 1: Reserved
    pub(crate) pad: u8,
    /// Offset 2, length 2: OS debug entry point
    pub(crate) os_debug_entry_point: u16,
    /// Offset 4, length 30: Queue descriptors indexed by queue id
    pub(crate) queue_info: [pmu_queue_info_v1; PMU_QUEUE_COUNT],
    /// Offset 34, length 2: Offset of the SW managed DMEM area
    pub(crate) sw_managed_area_offset: u16,
    /// Offset 36, length 2: Size of the SW managed DMEM area
    pub(crate) sw_managed_area_size: u16,
}

#[derive(Default, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C, packed)]
pub(crate) struct pmu_init_msg_pmu_v3 {
    /// Offset 0, length 1: Message type
    pub(crate) msg_type: u8,
    /// Offset 1, length 3: Queue register indices
    pub(crate) queue_index: [u8; PMU_QUEUE_COUNT_FOR_V3],
    /// Offset 4, length 6: Queue sizes, laid out back to back from `queue_offset`
    pub(crate) queue_size: [u16; PMU_QUEUE_COUNT_FOR_V3],
    /// Offset 10, length 2: DMEM offset of the first queue
    pub(crate) queue_offset: u16,
    /// Offset 12, length 2: Offset of the SW managed DMEM area
    pub(crate) sw_managed_area_offset: u16,
    /// Offset 14, length 2: Size of the SW managed DMEM area
    pub(crate) sw_managed_area_size: u16,
    /// Offset 16, length 2: OS debug entry point
    pub(crate) os_debug_entry_point: u16,
    /// Offset 18, length 18: Reserved
    pub(crate) dummy: [u8; 18],
}

#[derive(Default, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C, packed)]
pub(crate) struct pmu_init_msg_pmu_v4 {
    /// Offset 0, length 1: Message type
    pub(crate) msg_type: u8,
    /// Offset 1, length 5: Queue register indices
    pub(crate) queue_index: [u8; PMU_QUEUE_COUNT_FOR_V4],
    /// Offset 6, length 10: Queue sizes, laid out back to back from `queue_offset`
    pub(crate) queue_size: [u16; PMU_QUEUE_COUNT_FOR_V4],
    /// Offset 16, length 2: DMEM offset of the first queue
    pub(crate) queue_offset: u16,
    /// Offset 18, length 2: Offset of the SW managed DMEM area
    pub(crate) sw_managed_area_offset: u16,
    /// Offset 20, length 2: Size of the SW managed DMEM area
    pub(crate) sw_managed_area_size: u16,
    /// Offset 22, length 2: OS debug entry point
    pub(crate) os_debug_entry_point: u16,
    /// Offset 24, length 18: Reserved
    pub(crate) dummy: [u8; 18],
}

#[derive(Default, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C, packed)]
pub(crate) struct pmu_init_msg_pmu_v5 {
    /// Offset 0, length 1: Message type
    pub(crate) msg_type: u8,
    /// Offset 1, length 1: Falcon status
    pub(crate) flcn_status: u8,
    /// Offset 2, length 4: Queue register indices
    pub(crate) queue_index: [u8; PMU_QUEUE_COUNT_FOR_V5],
    /// Offset 6, length 8: Queue sizes, laid out back to back from `queue_offset`
    pub(crate) queue_size: [u16; PMU_QUEUE_COUNT_FOR_V5],
    /// Offset 14, length 2: DMEM offset of the first queue
    pub(crate) queue_offset: u16,
    /// Offset 16, length 2: Offset of the SW managed DMEM area
    pub(crate) sw_managed_area_offset: u16,
    /// Offset 18, length 2: Size of the SW managed DMEM area
    pub(crate) sw_managed_area_size: u16,
    /// Offset 20, length 2: OS debug entry point
    pub(crate) os_debug_entry_point: u16,
    /// Offset 22, length 18: Reserved
    pub(crate) dummy: [u8; 18],
    /// Offset 40, length 2: Reserved
    pub(crate) pad: [u8; 2],
}

#[derive(Default, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C, packed)]
pub(crate) struct pmu_perfmon_cmd_start_v1 {
    /// Offset 0, length 1: Command type
    pub(crate) cmd_type: u8,
    /// Offset 1, length 1: Domain group
    pub(crate) group_id: u8,
    /// Offset 2, length 1: Pstate
    pub(crate) state_id: u8,
    /// Offset 3, length 1: Flags
    pub(crate) flags: u8,
    /// Offset 4, length 16: Counter array allocation
    pub(crate) counter_alloc: pmu_allocation_v1,
}

#[derive(Default, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C, packed)]
pub(crate) struct pmu_perfmon_cmd_start_v2 {
    /// Offset 0, length 1: Command type
    pub(crate) cmd_type: u8,
    /// Offset 1, length 1: Domain group
    pub(crate) group_id: u8,
    /// Offset 2, length 1: Pstate
    pub(crate) state_id: u8,
    /// Offset 3, length 1: Flags
    pub(crate) flags: u8,
    /// Offset 4, length 20: Counter array allocation
    pub(crate) counter_alloc: pmu_allocation_v2,
}

#[derive(Default, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C, packed)]
pub(crate) struct pmu_perfmon_cmd_start_v3 {
    /// Offset 0, length 1: Command type
    pub(crate) cmd_type: u8,
    /// Offset 1, length 1: Domain group
    pub(crate) group_id: u8,
    /// Offset 2, length 1: Pstate
    pub(crate) state_id: u8,
    /// Offset 3, length 1: Flags
    pub(crate) flags: u8,
    /// Offset 4, length 20: Counter array allocation
    pub(crate) counter_alloc: pmu_allocation_v3,
}

#[derive(Default, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C, packed)]
pub(crate) struct pmu_perfmon_cmd_init_v1 {
    /// Offset 0, length 1: Command type
    pub(crate) cmd_type: u8,
    /// Offset 1, length 1: Samples below the lower threshold before decreasing
    pub(crate) to_decrease_count: u8,
    /// Offset 2, length 1: First counter id
    pub(crate) base_counter_id: u8,
    /// Offset 3, length 1: Reserved
    pub(crate) pad: u8,
    /// Offset 4, length 4: Sampling period in microseconds
    pub(crate) sample_period_us: u32,
    /// Offset 8, length 16: Counter array allocation
    pub(crate) counter_alloc: pmu_allocation_v1,
    /// Offset 24, length 1: Number of counters
    pub(crate) num_counters: u8,
    /// Offset 25, length 1: Moving average window
    pub(crate) samples_in_moving_avg: u8,
    /// Offset 26, length 2: DMEM offset of the sample buffer
    pub(crate) sample_buffer: u16,
}

#[derive(Default, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C, packed)]
pub(crate) struct pmu_perfmon_cmd_init_v2 {
    /// Offset 0, length 1: Command type
    pub(crate) cmd_type: u8,
    /// Offset 1, length 1: Samples below the lower threshold before decreasing
    pub(crate) to_decrease_count: u8,
    /// Offset 2, length 1: First counter id
    pub(crate) base_counter_id: u8,
    /// Offset 3, length 1: Reserved
    pub(crate) pad: u8,
    /// Offset 4, length 4: Sampling period in microseconds
    pub(crate) sample_period_us: u32,
    /// Offset 8, length 20: Counter array allocation
    pub(crate) counter_alloc: pmu_allocation_v2,
    /// Offset 28, length 1: Number of counters
    pub(crate) num_counters: u8,
    /// Offset 29, length 1: Moving average window
    pub(crate) samples_in_moving_avg: u8,
    /// Offset 30, length 2: DMEM offset of the sample buffer
    pub(crate) sample_buffer: u16,
}

#[derive(Default, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C, packed)]
pub(crate) struct pmu_perfmon_cmd_init_v3 {
    /// Offset 0, length 1: Command type
    pub(crate) cmd_type: u8,
    /// Offset 1, length 1: Samples below the lower threshold before decreasing
    pub(crate) to_decrease_count: u8,
    /// Offset 2, length 1: First counter id
    pub(crate) base_counter_id: u8,
    /// Offset 3, length 1: Reserved
    pub(crate) pad: u8,
    /// Offset 4, length 4: Sampling period in microseconds
    pub(crate) sample_period_us: u32,
    /// Offset 8, length 20: Counter array allocation
    pub(crate) counter_alloc: pmu_allocation_v3,
    /// Offset 28, length 1: Number of counters
    pub(crate) num_counters: u8,
    /// Offset 29, length 1: Moving average window
    pub(crate) samples_in_moving_avg: u8,
    /// Offset 30, length 2: DMEM offset of the sample buffer
    pub(crate) sample_buffer: u16,
}

#[derive(Default, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C, packed)]
pub(crate) struct pmu_pg_cmd_eng_buf_load_v0 {
    /// Offset 0, length 1: Command type
    pub(crate) cmd_type: u8,
    /// Offset 1, length 1: Power-gated engine
    pub(crate) engine_id: u8,
    /// Offset 2, length 1: Sequencer buffer index
    pub(crate) buf_idx: u8,
    /// Offset 3, length 1: Pad
    pub(crate) pad: u8,
    /// Offset 4, length 2: Buffer size
    pub(crate) buf_size: u16,
    /// Offset 6, length 2: Reserved (MBZ)
    pub(crate) reserved0: [u8; 2],
    /// Offset 8, length 4: DMA base in 256 byte units
    pub(crate) dma_base: u32,
    /// Offset 12, length 1: Offset inside the first 256 byte unit
    pub(crate) dma_offset: u8,
    /// Offset 13, length 1: DMA aperture index
    pub(crate) dma_idx: u8,
    /// Offset 14, length 2: Reserved (MBZ)
    pub(crate) reserved1: [u8; 2],
}

#[derive(Default, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C, packed)]
pub(crate) struct pmu_pg_cmd_eng_buf_load_v1 {
    /// Offset 0, length 1: Command type
    pub(crate) cmd_type: u8,
    /// Offset 1, length 1: Power-gated engine
    pub(crate) engine_id: u8,
    /// Offset 2, length 1: Sequencer buffer index
    pub(crate) buf_idx: u8,
    /// Offset 3, length 1: Pad
    pub(crate) pad: u8,
    /// Offset 4, length 12: Buffer surface
    pub(crate) dma_desc: flcn_mem_desc,
}

#[derive(Default, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C, packed)]
pub(crate) struct pmu_pg_cmd_eng_buf_load_v2 {
    /// Offset 0, length 1: Command type
    pub(crate) cmd_type: u8,
    /// Offset 1, length 1: Power-gated engine
    pub(crate) engine_id: u8,
    /// Offset 2, length 1: Sequencer buffer index
    pub(crate) buf_idx: u8,
    /// Offset 3, length 1: Pad
    pub(crate) pad: u8,
    /// Offset 4, length 12: Buffer surface
    pub(crate) dma_desc: flcn_mem_desc_v0,
}

pub(crate) const PMU_UCODE_NB_MAX_DATE_LENGTH: usize = 64;
pub(crate) const PMU_UCODE_NB_MAX_OVERLAY: usize = 32;

/// Ucode descriptor found at the start of the non-secure blob and of the secure descriptor blob.
#[derive(FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C, packed)]
pub(crate) struct pmu_ucode_desc {
    /// Offset 0, length 4: Size of this descriptor, the ucode image follows it
    pub(crate) descriptor_size: u32,
    /// Offset 4, length 4: Size of the whole image
    pub(crate) image_size: u32,
    /// Offset 8, length 4: Version of the tools that built the image
    pub(crate) tools_version: u32,
    /// Offset 12, length 4: Application version, selects the firmware ABI
    pub(crate) app_version: u32,
    /// Offset 16, length 64: Build date, NUL padded
    pub(crate) date: [u8; PMU_UCODE_NB_MAX_DATE_LENGTH],
    /// Offset 80, length 4
    pub(crate) bootloader_start_offset: u32,
    /// Offset 84, length 4
    pub(crate) bootloader_size: u32,
    /// Offset 88, length 4
    pub(crate) bootloader_imem_offset: u32,
    /// Offset 92, length 4
    pub(crate) bootloader_entry_point: u32,
    /// Offset 96, length 4
    pub(crate) app_start_offset: u32,
    /// Offset 100, length 4
    pub(crate) app_size: u32,
    /// Offset 104, length 4
    pub(crate) app_imem_offset: u32,
    /// Offset 108, length 4
    pub(crate) app_imem_entry: u32,
    /// Offset 112, length 4
    pub(crate) app_dmem_offset: u32,
    /// Offset 116, length 4
    pub(crate) app_resident_code_offset: u32,
    /// Offset 120, length 4
    pub(crate) app_resident_code_size: u32,
    /// Offset 124, length 4
    pub(crate) app_resident_data_offset: u32,
    /// Offset 128, length 4
    pub(crate) app_resident_data_size: u32,
    /// Offset 132, length 4: Number of valid entries in `load_ovl`
    pub(crate) nb_overlays: u32,
    /// Offset 136, length 256: Overlay (start, size) pairs
    pub(crate) load_ovl: [[u32; 2]; PMU_UCODE_NB_MAX_OVERLAY],
    /// Offset 392, length 4: Non-zero if the image is compressed
    pub(crate) compressed: u32,
}

// Catch layout drift against the sizes the firmware expects.
const _: () = {
    use core::mem::size_of;

    assert!(size_of::<pmu_perfmon_counter_v2>() == 12);
    assert!(size_of::<pmu_cmdline_args_v3>() == 32);
    assert!(size_of::<pmu_cmdline_args_v4>() == 48);
    assert!(size_of::<pmu_cmdline_args_v5>() == 48);
    assert!(size_of::<pmu_cmdline_args_v6>() == 60);
    assert!(size_of::<pmu_allocation_v1>() == 16);
    assert!(size_of::<pmu_allocation_v2>() == 20);
    assert!(size_of::<pmu_allocation_v3>() == 20);
    assert!(size_of::<pmu_init_msg_pmu_v1>() == 38);
    assert!(size_of::<pmu_init_msg_pmu_v3>() == 36);
    assert!(size_of::<pmu_init_msg_pmu_v4>() == 42);
    assert!(size_of::<pmu_init_msg_pmu_v5>() == 42);
    assert!(size_of::<pmu_perfmon_cmd_start_v1>() == 20);
    assert!(size_of::<pmu_perfmon_cmd_start_v2>() == 24);
    assert!(size_of::<pmu_perfmon_cmd_start_v3>() == 24);
    assert!(size_of::<pmu_perfmon_cmd_init_v1>() == 28);
    assert!(size_of::<pmu_perfmon_cmd_init_v2>() == 32);
    assert!(size_of::<pmu_perfmon_cmd_init_v3>() == 32);
    assert!(size_of::<pmu_pg_cmd_eng_buf_load_v0>() == 16);
    assert!(size_of::<pmu_pg_cmd_eng_buf_load_v1>() == 16);
    assert!(size_of::<pmu_pg_cmd_eng_buf_load_v2>() == 16);
    assert!(size_of::<pmu_ucode_desc>() == 396);
};
