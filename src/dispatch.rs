// SPDX-FileCopyrightText: Copyright The pmu-abi Contributors.
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Version independent access to the PMU firmware records.

use log::debug;

use crate::init_msg::QueueParams;
use crate::perfmon::{PerfmonCmd, PerfmonCounter, PerfmonInit, PerfmonStart};
use crate::pg::PgEngBufLoadHeader;
use crate::registry::AbiBundle;
use crate::{ChipFamily, DmaSurface, Error, MemDesc, QueueId};

/// The firmware ABI in use.
///
/// Every method forwards to the accessor of the published [`AbiBundle`] and fails with
/// [`Error::NotInitialized`] until [`PmuAbi::publish`] has succeeded.
#[derive(Clone, Copy, Debug, Default)]
pub struct PmuAbi {
    bundle: Option<AbiBundle>,
}

impl PmuAbi {
    pub const fn new() -> Self {
        Self { bundle: None }
    }

    /// Selects the bundle matching `app_version` and makes it the active one.
    ///
    /// On failure the previously published bundle, if any, stays active.
    pub fn publish(&mut self, app_version: u32) -> Result<ChipFamily, Error> {
        let bundle = AbiBundle::select(app_version)?;
        self.install(bundle);
        Ok(bundle.family())
    }

    /// Makes an already selected bundle the active one.
    pub fn install(&mut self, bundle: AbiBundle) {
        debug!(
            "PMU firmware ABI for {:?}: {:?}",
            bundle.family(),
            bundle.versions()
        );
        self.bundle = Some(bundle);
    }

    pub fn clear(&mut self) {
        self.bundle = None;
    }

    pub fn is_initialized(&self) -> bool {
        self.bundle.is_some()
    }

    pub fn bundle(&self) -> Result<&AbiBundle, Error> {
        self.bundle.as_ref().ok_or(Error::NotInitialized)
    }

    pub fn family(&self) -> Result<ChipFamily, Error> {
        Ok(self.bundle()?.family())
    }

    pub fn zbc_save(&self) -> Result<bool, Error> {
        Ok(self.bundle()?.zbc_save())
    }

    pub fn zbc_table_update_cmd_id(&self) -> Result<u32, Error> {
        Ok(self.bundle()?.zbc_table_update_cmd_id())
    }

    // Perfmon counter

    pub fn perfmon_counter_size(&self) -> Result<usize, Error> {
        Ok(self.bundle()?.perfmon_counter.size())
    }

    pub fn perfmon_counter_index(&self) -> Result<u8, Error> {
        Ok(self.bundle()?.perfmon_counter_index())
    }

    pub fn perfmon_counter_group_id(&self) -> Result<u8, Error> {
        Ok(self.bundle()?.perfmon_counter_group_id())
    }

    /// Writes the counter index and domain group expected by the firmware into `buf`.
    pub fn pin_perfmon_counter(&self, buf: &mut [u8]) -> Result<(), Error> {
        let bundle = self.bundle()?;
        bundle
            .perfmon_counter
            .set_index(buf, bundle.perfmon_counter_index())?;
        bundle
            .perfmon_counter
            .set_group_id(buf, bundle.perfmon_counter_group_id())
    }

    pub fn set_perfmon_counter_upper_threshold(
        &self,
        buf: &mut [u8],
        threshold: u16,
    ) -> Result<(), Error> {
        self.bundle()?
            .perfmon_counter
            .set_upper_threshold(buf, threshold)
    }

    pub fn set_perfmon_counter_lower_threshold(
        &self,
        buf: &mut [u8],
        threshold: u16,
    ) -> Result<(), Error> {
        self.bundle()?
            .perfmon_counter
            .set_lower_threshold(buf, threshold)
    }

    pub fn set_perfmon_counter_valid(&self, buf: &mut [u8], valid: u8) -> Result<(), Error> {
        self.bundle()?.perfmon_counter.set_valid(buf, valid)
    }

    pub fn set_perfmon_counter_index(&self, buf: &mut [u8], index: u8) -> Result<(), Error> {
        self.bundle()?.perfmon_counter.set_index(buf, index)
    }

    pub fn set_perfmon_counter_group_id(&self, buf: &mut [u8], group_id: u8) -> Result<(), Error> {
        self.bundle()?.perfmon_counter.set_group_id(buf, group_id)
    }

    pub fn perfmon_counter(&self, buf: &[u8]) -> Result<PerfmonCounter, Error> {
        self.bundle()?.perfmon_counter.counter(buf)
    }

    // Command line arguments

    pub fn cmdline_args_size(&self) -> Result<usize, Error> {
        Ok(self.bundle()?.cmdline.size())
    }

    pub fn set_cmdline_cpu_freq(&self, buf: &mut [u8], freq_hz: u32) -> Result<(), Error> {
        self.bundle()?.cmdline.set_cpu_freq(buf, freq_hz)
    }

    pub fn set_cmdline_secure_mode(&self, buf: &mut [u8], val: u8) -> Result<(), Error> {
        self.bundle()?.cmdline.set_secure_mode(buf, val)
    }

    pub fn set_cmdline_trace_size(&self, buf: &mut [u8], size: u32) -> Result<(), Error> {
        self.bundle()?.cmdline.set_trace_size(buf, size)
    }

    pub fn set_cmdline_trace_dma_base(
        &self,
        buf: &mut [u8],
        surface: &DmaSurface,
    ) -> Result<(), Error> {
        self.bundle()?.cmdline.set_trace_dma_base(buf, surface)
    }

    pub fn set_cmdline_trace_dma_idx(&self, buf: &mut [u8], idx: u32) -> Result<(), Error> {
        self.bundle()?.cmdline.set_trace_dma_idx(buf, idx)
    }

    pub fn config_cmdline_super_surface(
        &self,
        buf: &mut [u8],
        surface: &DmaSurface,
    ) -> Result<(), Error> {
        self.bundle()?.cmdline.config_super_surface(buf, surface)
    }

    pub fn cmdline_cpu_freq(&self, buf: &[u8]) -> Result<u32, Error> {
        self.bundle()?.cmdline.cpu_freq(buf)
    }

    pub fn cmdline_secure_mode(&self, buf: &[u8]) -> Result<u8, Error> {
        self.bundle()?.cmdline.secure_mode(buf)
    }

    pub fn cmdline_trace_size(&self, buf: &[u8]) -> Result<u32, Error> {
        self.bundle()?.cmdline.trace_size(buf)
    }

    pub fn cmdline_trace_dma_base(&self, buf: &[u8]) -> Result<u64, Error> {
        self.bundle()?.cmdline.trace_dma_base(buf)
    }

    pub fn cmdline_trace_dma_idx(&self, buf: &[u8]) -> Result<u32, Error> {
        self.bundle()?.cmdline.trace_dma_idx(buf)
    }

    // Allocations

    pub fn allocation_size(&self) -> Result<usize, Error> {
        Ok(self.bundle()?.allocation.size())
    }

    pub fn allocation_dmem_size(&self, buf: &[u8]) -> Result<u16, Error> {
        self.bundle()?.allocation.dmem_size(buf)
    }

    pub fn set_allocation_dmem_size(&self, buf: &mut [u8], size: u16) -> Result<(), Error> {
        self.bundle()?.allocation.set_dmem_size(buf, size)
    }

    pub fn allocation_dmem_offset(&self, buf: &[u8]) -> Result<u32, Error> {
        self.bundle()?.allocation.dmem_offset(buf)
    }

    pub fn set_allocation_dmem_offset(&self, buf: &mut [u8], offset: u32) -> Result<(), Error> {
        self.bundle()?.allocation.set_dmem_offset(buf, offset)
    }

    pub fn allocation_dmem_offset_pos(&self) -> Result<usize, Error> {
        Ok(self.bundle()?.allocation.dmem_offset_pos())
    }

    pub fn allocation_fb_span(&self) -> Result<(usize, usize), Error> {
        self.bundle()?.allocation.fb_span()
    }

    pub fn allocation_fb(&self, buf: &[u8]) -> Result<MemDesc, Error> {
        self.bundle()?.allocation.fb(buf)
    }

    pub fn set_allocation_fb(&self, buf: &mut [u8], desc: MemDesc) -> Result<(), Error> {
        self.bundle()?.allocation.set_fb(buf, desc)
    }

    // Init message

    pub fn init_msg_size(&self) -> Result<usize, Error> {
        Ok(self.bundle()?.init_msg.size())
    }

    /// Looks up a queue by its raw ID. IDs other than HPQ, LPQ and the message queue fail with
    /// [`Error::InvalidQueueId`].
    pub fn init_msg_queue_params(&self, buf: &[u8], queue_id: u32) -> Result<QueueParams, Error> {
        let bundle = self.bundle()?;
        bundle.init_msg.queue_params(buf, QueueId::try_from(queue_id)?)
    }

    pub fn init_msg_sw_managed_area_offset(&self, buf: &[u8]) -> Result<u16, Error> {
        self.bundle()?.init_msg.sw_managed_area_offset(buf)
    }

    pub fn init_msg_sw_managed_area_size(&self, buf: &[u8]) -> Result<u16, Error> {
        self.bundle()?.init_msg.sw_managed_area_size(buf)
    }

    // Perfmon commands

    pub fn perfmon_cmd_start_size(&self) -> Result<usize, Error> {
        Ok(self.bundle()?.perfmon_cmd.start_size())
    }

    pub fn perfmon_cmd_start_counter_alloc_offset(&self) -> Result<usize, Error> {
        Ok(self.bundle()?.perfmon_cmd.start_counter_alloc_offset())
    }

    pub fn perfmon_start_set_cmd_type(&self, buf: &mut [u8], value: u8) -> Result<(), Error> {
        self.bundle()?.perfmon_cmd.start_set_cmd_type(buf, value)
    }

    pub fn perfmon_start_set_group_id(&self, buf: &mut [u8], value: u8) -> Result<(), Error> {
        self.bundle()?.perfmon_cmd.start_set_group_id(buf, value)
    }

    pub fn perfmon_start_set_state_id(&self, buf: &mut [u8], value: u8) -> Result<(), Error> {
        self.bundle()?.perfmon_cmd.start_set_state_id(buf, value)
    }

    pub fn perfmon_start_set_flags(&self, buf: &mut [u8], value: u8) -> Result<(), Error> {
        self.bundle()?.perfmon_cmd.start_set_flags(buf, value)
    }

    pub fn perfmon_start_flags(&self, buf: &[u8]) -> Result<u8, Error> {
        self.bundle()?.perfmon_cmd.start_flags(buf)
    }

    pub fn perfmon_start(&self, buf: &[u8]) -> Result<PerfmonStart, Error> {
        self.bundle()?.perfmon_cmd.start(buf)
    }

    pub fn perfmon_cmd_init_size(&self) -> Result<usize, Error> {
        Ok(self.bundle()?.perfmon_cmd.init_size())
    }

    pub fn perfmon_cmd_init_counter_alloc_offset(&self) -> Result<usize, Error> {
        Ok(self.bundle()?.perfmon_cmd.init_counter_alloc_offset())
    }

    pub fn perfmon_init_set_cmd_type(&self, buf: &mut [u8], value: u8) -> Result<(), Error> {
        self.bundle()?.perfmon_cmd.init_set_cmd_type(buf, value)
    }

    pub fn perfmon_init_set_sample_buffer(&self, buf: &mut [u8], value: u16) -> Result<(), Error> {
        self.bundle()?.perfmon_cmd.init_set_sample_buffer(buf, value)
    }

    pub fn perfmon_init_set_dec_cnt(&self, buf: &mut [u8], value: u8) -> Result<(), Error> {
        self.bundle()?.perfmon_cmd.init_set_dec_cnt(buf, value)
    }

    pub fn perfmon_init_set_base_cnt_id(&self, buf: &mut [u8], value: u8) -> Result<(), Error> {
        self.bundle()?.perfmon_cmd.init_set_base_cnt_id(buf, value)
    }

    pub fn perfmon_init_set_samp_period_us(
        &self,
        buf: &mut [u8],
        value: u32,
    ) -> Result<(), Error> {
        self.bundle()?.perfmon_cmd.init_set_samp_period_us(buf, value)
    }

    pub fn perfmon_init_set_num_cnt(&self, buf: &mut [u8], value: u8) -> Result<(), Error> {
        self.bundle()?.perfmon_cmd.init_set_num_cnt(buf, value)
    }

    pub fn perfmon_init_set_mov_avg(&self, buf: &mut [u8], value: u8) -> Result<(), Error> {
        self.bundle()?.perfmon_cmd.init_set_mov_avg(buf, value)
    }

    pub fn perfmon_init(&self, buf: &[u8]) -> Result<PerfmonInit, Error> {
        self.bundle()?.perfmon_cmd.init(buf)
    }

    /// Encodes `cmd` and returns its size.
    pub fn pack_perfmon_cmd(&self, buf: &mut [u8], cmd: &PerfmonCmd) -> Result<usize, Error> {
        self.bundle()?.perfmon_cmd.pack(buf, cmd)
    }

    // PG engine buffer load

    pub fn pg_eng_buf_load_size(&self) -> Result<usize, Error> {
        Ok(self.bundle()?.pg.size())
    }

    pub fn pg_eng_buf_load_set_cmd_type(&self, buf: &mut [u8], value: u8) -> Result<(), Error> {
        self.bundle()?.pg.set_cmd_type(buf, value)
    }

    pub fn pg_eng_buf_load_set_engine_id(&self, buf: &mut [u8], value: u8) -> Result<(), Error> {
        self.bundle()?.pg.set_engine_id(buf, value)
    }

    pub fn pg_eng_buf_load_set_buf_idx(&self, buf: &mut [u8], value: u8) -> Result<(), Error> {
        self.bundle()?.pg.set_buf_idx(buf, value)
    }

    pub fn pg_eng_buf_load_set_pad(&self, buf: &mut [u8], value: u8) -> Result<(), Error> {
        self.bundle()?.pg.set_pad(buf, value)
    }

    pub fn pg_eng_buf_load_set_buf_size(&self, buf: &mut [u8], value: u16) -> Result<(), Error> {
        self.bundle()?.pg.set_buf_size(buf, value)
    }

    pub fn pg_eng_buf_load_set_dma_base(&self, buf: &mut [u8], addr: u64) -> Result<(), Error> {
        self.bundle()?.pg.set_dma_base(buf, addr)
    }

    pub fn pg_eng_buf_load_set_dma_offset(&self, buf: &mut [u8], value: u8) -> Result<(), Error> {
        self.bundle()?.pg.set_dma_offset(buf, value)
    }

    pub fn pg_eng_buf_load_set_dma_idx(&self, buf: &mut [u8], value: u8) -> Result<(), Error> {
        self.bundle()?.pg.set_dma_idx(buf, value)
    }

    pub fn pg_eng_buf_load_set_dma_addr(&self, buf: &mut [u8], addr: u64) -> Result<(), Error> {
        self.bundle()?.pg.set_dma_addr(buf, addr)
    }

    pub fn pg_eng_buf_load_header(&self, buf: &[u8]) -> Result<PgEngBufLoadHeader, Error> {
        self.bundle()?.pg.header(buf)
    }

    pub fn pg_eng_buf_load_buf_size(&self, buf: &[u8]) -> Result<u32, Error> {
        self.bundle()?.pg.buf_size(buf)
    }

    pub fn pg_eng_buf_load_dma_base(&self, buf: &[u8]) -> Result<u64, Error> {
        self.bundle()?.pg.dma_base(buf)
    }

    pub fn pg_eng_buf_load_dma_idx(&self, buf: &[u8]) -> Result<u8, Error> {
        self.bundle()?.pg.dma_idx(buf)
    }

    pub fn pg_eng_buf_load_dma_addr(&self, buf: &[u8]) -> Result<u64, Error> {
        self.bundle()?.pg.dma_addr(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GM20B: u32 = 20490253;
    const GP10X: u32 = 24076634;
    const TU10X: u32 = 25622342;

    #[test]
    fn not_initialized() {
        let abi = PmuAbi::new();
        let mut buf = [0u8; 64];

        assert!(!abi.is_initialized());
        assert_eq!(abi.cmdline_args_size(), Err(Error::NotInitialized));
        assert_eq!(abi.set_cmdline_cpu_freq(&mut buf, 1), Err(Error::NotInitialized));
        assert_eq!(abi.init_msg_queue_params(&buf, 0), Err(Error::NotInitialized));
        assert_eq!(abi.pg_eng_buf_load_set_dma_base(&mut buf, 0), Err(Error::NotInitialized));
        assert_eq!(abi.allocation_fb_span(), Err(Error::NotInitialized));
        assert_eq!(abi.zbc_save(), Err(Error::NotInitialized));
        assert_eq!(buf, [0u8; 64]);
    }

    #[test]
    fn publish_selects_bundle() {
        let mut abi = PmuAbi::new();

        assert_eq!(abi.publish(GP10X), Ok(ChipFamily::Gp10x));
        assert!(abi.is_initialized());
        assert_eq!(abi.cmdline_args_size(), Ok(48));
        assert_eq!(abi.init_msg_size(), Ok(36));
        assert_eq!(abi.allocation_fb_span(), Ok((8, 12)));
        assert_eq!(abi.zbc_save(), Ok(true));
        assert_eq!(abi.perfmon_counter_index(), Ok(3));
    }

    #[test]
    fn failed_publish_keeps_bundle() {
        let mut abi = PmuAbi::new();
        assert_eq!(abi.publish(0), Err(Error::UnsupportedVersion(0)));
        assert!(!abi.is_initialized());

        abi.publish(GM20B).unwrap();
        assert_eq!(abi.publish(0), Err(Error::UnsupportedVersion(0)));
        assert_eq!(abi.family(), Ok(ChipFamily::Gm20b));
        assert_eq!(abi.cmdline_args_size(), Ok(32));
    }

    #[test]
    fn pin_perfmon_counter_keeps_thresholds() {
        let mut abi = PmuAbi::new();
        let mut buf = [0u8; 12];
        assert_eq!(abi.pin_perfmon_counter(&mut buf), Err(Error::NotInitialized));

        abi.publish(GM20B).unwrap();
        abi.set_perfmon_counter_upper_threshold(&mut buf, 3000).unwrap();
        abi.pin_perfmon_counter(&mut buf).unwrap();

        let counter = abi.perfmon_counter(&buf).unwrap();
        assert_eq!(counter.index, 3);
        assert_eq!(counter.group_id, 0);
        assert_eq!(counter.upper_threshold, 3000);
        assert_eq!(abi.pin_perfmon_counter(&mut buf[..4]), Err(Error::InvalidBufferSize));
    }

    #[test]
    fn queue_id_validation() {
        let mut abi = PmuAbi::new();
        abi.publish(TU10X).unwrap();

        let buf = [0u8; 42];
        assert_eq!(abi.init_msg_queue_params(&buf, 2), Err(Error::InvalidQueueId(2)));
        assert_eq!(abi.init_msg_queue_params(&buf, 5), Err(Error::InvalidQueueId(5)));
        assert!(abi.init_msg_queue_params(&buf, 4).is_ok());
    }

    #[test]
    fn perfmon_start_with_counter_alloc() {
        let mut abi = PmuAbi::new();
        abi.publish(TU10X).unwrap();

        let mut buf = [0u8; 24];
        let cmd = PerfmonCmd::Start(PerfmonStart {
            cmd_type: 1,
            group_id: abi.perfmon_counter_group_id().unwrap(),
            state_id: 0,
            flags: 0x06,
        });
        assert_eq!(abi.pack_perfmon_cmd(&mut buf, &cmd), Ok(24));

        let offset = abi.perfmon_cmd_start_counter_alloc_offset().unwrap();
        abi.set_allocation_dmem_size(&mut buf[offset..], 36).unwrap();
        abi.set_allocation_dmem_offset(&mut buf[offset..], 0x2c0).unwrap();
        abi.set_allocation_fb(&mut buf[offset..], MemDesc::new(0x10_0000, 0x100, 1))
            .unwrap();

        assert_eq!(abi.perfmon_start_flags(&buf), Ok(0x06));
        assert_eq!(abi.allocation_dmem_size(&buf[offset..]), Ok(36));
        assert_eq!(abi.allocation_dmem_offset(&buf[offset..]), Ok(0x2c0));
        assert_eq!(
            abi.allocation_fb(&buf[offset..]).map(|desc| desc.size()),
            Ok(0x100)
        );
    }

    #[test]
    fn clear_unpublishes() {
        let mut abi = PmuAbi::new();
        abi.publish(GM20B).unwrap();
        abi.clear();
        assert_eq!(abi.pg_eng_buf_load_size(), Err(Error::NotInitialized));
    }
}
