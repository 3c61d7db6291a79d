// SPDX-FileCopyrightText: Copyright The pmu-abi Contributors.
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The PMU unit: capability gate, firmware load, ABI publication and engine reset.

use log::debug;

use crate::dispatch::PmuAbi;
use crate::engine::{EngineControl, PmuEngine};
use crate::firmware::{self, FirmwareLoader, LoadedFirmware};
use crate::perfmon::PERFMON_COUNTER_MAX_SIZE;
use crate::Error;

/// PMU related features of the GPU.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Capabilities {
    /// The LS PMU is present and used.
    pub ls_pmu: bool,
    /// Secure boot, the ucode comes as separate image, descriptor and signature blobs.
    pub priv_security: bool,
    pub perfmon: bool,
    pub can_elpg: bool,
    pub elpg_enabled: bool,
    pub aelpg_enabled: bool,
    /// The firmware saves the ZBC table. Set from the loaded firmware.
    pub zbc_save: bool,
    /// Mask the PMU interrupt before putting the engine in reset.
    pub manage_irq: bool,
}

pub struct Pmu<H: EngineControl, B> {
    caps: Capabilities,
    abi: PmuAbi,
    engine: PmuEngine<H>,
    firmware: Option<LoadedFirmware<B>>,
    perfmon_counter: [u8; PERFMON_COUNTER_MAX_SIZE],
}

impl<H: EngineControl, B: AsRef<[u8]>> Pmu<H, B> {
    pub fn new(hal: H, caps: Capabilities) -> Self {
        Self {
            caps,
            abi: PmuAbi::new(),
            engine: PmuEngine::new(hal, caps.manage_irq),
            firmware: None,
            perfmon_counter: [0; PERFMON_COUNTER_MAX_SIZE],
        }
    }

    pub fn caps(&self) -> &Capabilities {
        &self.caps
    }

    pub fn abi(&self) -> &PmuAbi {
        &self.abi
    }

    pub fn engine(&self) -> &PmuEngine<H> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut PmuEngine<H> {
        &mut self.engine
    }

    pub fn firmware(&self) -> Option<&LoadedFirmware<B>> {
        self.firmware.as_ref()
    }

    /// The perfmon counter record, pinned to the firmware's counter index and group once the
    /// ABI is published.
    pub fn perfmon_counter(&self) -> &[u8] {
        &self.perfmon_counter
    }

    /// Turns off every PMU feature if the chip has no usable PMU.
    pub fn early_init(&mut self) {
        if !self.caps.ls_pmu {
            return;
        }

        if !self.engine.hal().is_pmu_supported() {
            debug!("PMU not supported, disabling LS PMU features");
            self.caps.ls_pmu = false;
            self.caps.can_elpg = false;
            self.caps.elpg_enabled = false;
            self.caps.aelpg_enabled = false;
            self.caps.perfmon = false;
        }
    }

    /// Loads the firmware and publishes its ABI.
    ///
    /// Runs the [`Pmu::early_init`] gate first. Does nothing if the firmware is already loaded,
    /// which is the case when the GPU comes back from railgating, or if the LS PMU is not used.
    pub fn init_sw<L: FirmwareLoader<Blob = B>>(&mut self, loader: &mut L) -> Result<(), Error> {
        if self.firmware.is_some() {
            debug!("skip pmu init for unrailgate sequence");
            return Ok(());
        }

        self.early_init();
        if !self.caps.ls_pmu {
            return Ok(());
        }

        let fw = firmware::load(loader, self.caps.priv_security)?;
        let bundle = fw.bundle();

        self.abi.install(bundle);
        self.caps.zbc_save = bundle.zbc_save();
        self.firmware = Some(fw);
        self.abi.pin_perfmon_counter(&mut self.perfmon_counter)
    }

    /// Puts the engine in reset and brings it back up.
    pub fn reset(&mut self) -> Result<(), Error> {
        self.engine.reset()
    }

    /// Releases the firmware and unpublishes the ABI.
    pub fn remove_support<L: FirmwareLoader<Blob = B>>(&mut self, loader: &mut L) {
        if let Some(fw) = self.firmware.take() {
            fw.release(loader);
        }
        self.abi.clear();
        self.perfmon_counter = [0; PERFMON_COUNTER_MAX_SIZE];
    }
}
