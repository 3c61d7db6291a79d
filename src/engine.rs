// SPDX-FileCopyrightText: Copyright The pmu-abi Contributors.
// SPDX-License-Identifier: MIT OR Apache-2.0

//! PMU engine reset and enable sequence.

use log::{debug, error};

use crate::Error;

/// Chip specific engine operations.
///
/// Every wait is expected to be bounded by the implementation and attempted once.
pub trait EngineControl {
    /// Takes the engine out of reset if `enable`, puts it in reset otherwise.
    fn reset_engine(&mut self, enable: bool) -> Result<(), Error>;

    fn is_engine_in_reset(&self) -> bool;

    fn enable_irq(&mut self, enable: bool);

    /// Waits for the falcon IMEM/DMEM scrub to finish.
    fn wait_scrub_complete(&mut self) -> Result<(), Error>;

    /// Waits for the falcon to become idle.
    fn wait_idle(&mut self) -> Result<(), Error>;

    /// Loads the second level clock gating settings of the PMU.
    fn slcg_load_enable(&mut self) {}

    /// Loads the block level clock gating settings of the PMU.
    fn blcg_load_enable(&mut self) {}

    /// Whether the chip has a usable PMU.
    fn is_pmu_supported(&self) -> bool {
        true
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum EngineState {
    /// Not touched yet.
    #[default]
    Disabled,
    InReset,
    /// Out of reset, memory scrub not confirmed.
    ScrubbingPending,
    Enabled,
}

/// Drives the engine through reset, scrub and enable.
pub struct PmuEngine<H: EngineControl> {
    hal: H,
    state: EngineState,
    manage_irq: bool,
}

impl<H: EngineControl> PmuEngine<H> {
    /// When `manage_irq` is set the PMU interrupt is masked before the engine is put in reset.
    pub fn new(hal: H, manage_irq: bool) -> Self {
        Self {
            hal,
            state: EngineState::Disabled,
            manage_irq,
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn hal(&self) -> &H {
        &self.hal
    }

    pub fn hal_mut(&mut self) -> &mut H {
        &mut self.hal
    }

    pub fn into_hal(self) -> H {
        self.hal
    }

    /// Brings the engine out of reset and waits until it is scrubbed and idle.
    ///
    /// A scrub timeout puts the engine back in reset. An idle timeout leaves it out of reset in
    /// [`EngineState::ScrubbingPending`].
    pub fn enable(&mut self) -> Result<(), Error> {
        debug!("PMU engine enable");

        if let Err(e) = self.hal.reset_engine(true) {
            error!("PMU engine reset release failed: {e}");
            return Err(e);
        }

        self.hal.slcg_load_enable();
        self.hal.blcg_load_enable();
        self.state = EngineState::ScrubbingPending;

        if self.hal.wait_scrub_complete().is_err() {
            error!("Falcon mem scrubbing timeout");
            if let Err(e) = self.hal.reset_engine(false) {
                error!("Failed to put PMU engine back in reset: {e}");
            }
            self.state = EngineState::InReset;
            return Err(Error::ScrubTimeout);
        }

        if self.hal.wait_idle().is_err() {
            error!("Falcon idle timeout");
            return Err(Error::EnableTimeout);
        }

        self.state = EngineState::Enabled;
        debug!("PMU engine enabled");
        Ok(())
    }

    /// Puts the engine in reset. Only records the state if the hardware reports it already is.
    pub fn disable(&mut self) -> Result<(), Error> {
        debug!("PMU engine disable");

        if self.hal.is_engine_in_reset() {
            debug!("PMU engine already in reset");
            self.state = EngineState::InReset;
            return Ok(());
        }

        if self.manage_irq {
            self.hal.enable_irq(false);
        }

        if let Err(e) = self.hal.reset_engine(false) {
            error!("PMU engine reset failed: {e}");
            return Err(e);
        }

        self.state = EngineState::InReset;
        Ok(())
    }

    /// Disables then re-enables the engine.
    pub fn reset(&mut self) -> Result<(), Error> {
        debug!("PMU engine reset");

        self.disable()?;
        self.enable()?;

        debug!("PMU engine reset done");
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq)]
    pub(crate) enum Call {
        Reset(bool),
        EnableIrq(bool),
        Scrub,
        Idle,
        Slcg,
        Blcg,
    }

    #[derive(Default)]
    pub(crate) struct MockEngine {
        pub(crate) calls: Vec<Call>,
        pub(crate) in_reset: bool,
        pub(crate) scrub_fails: bool,
        pub(crate) idle_fails: bool,
        pub(crate) reset_error: Option<i32>,
        pub(crate) unsupported: bool,
    }

    impl EngineControl for MockEngine {
        fn reset_engine(&mut self, enable: bool) -> Result<(), Error> {
            self.calls.push(Call::Reset(enable));
            if let Some(code) = self.reset_error {
                return Err(Error::Hardware(code));
            }
            self.in_reset = !enable;
            Ok(())
        }

        fn is_engine_in_reset(&self) -> bool {
            self.in_reset
        }

        fn enable_irq(&mut self, enable: bool) {
            self.calls.push(Call::EnableIrq(enable));
        }

        fn wait_scrub_complete(&mut self) -> Result<(), Error> {
            self.calls.push(Call::Scrub);
            if self.scrub_fails {
                Err(Error::Hardware(-110))
            } else {
                Ok(())
            }
        }

        fn wait_idle(&mut self) -> Result<(), Error> {
            self.calls.push(Call::Idle);
            if self.idle_fails {
                Err(Error::Hardware(-110))
            } else {
                Ok(())
            }
        }

        fn slcg_load_enable(&mut self) {
            self.calls.push(Call::Slcg);
        }

        fn blcg_load_enable(&mut self) {
            self.calls.push(Call::Blcg);
        }

        fn is_pmu_supported(&self) -> bool {
            !self.unsupported
        }
    }

    #[test]
    fn enable_sequence() {
        let mut engine = PmuEngine::new(MockEngine::default(), true);
        assert_eq!(engine.state(), EngineState::Disabled);

        engine.enable().unwrap();
        assert_eq!(engine.state(), EngineState::Enabled);
        assert_eq!(
            engine.hal().calls,
            [
                Call::Reset(true),
                Call::Slcg,
                Call::Blcg,
                Call::Scrub,
                Call::Idle
            ]
        );
    }

    #[test]
    fn scrub_timeout_puts_engine_back_in_reset() {
        let hal = MockEngine {
            scrub_fails: true,
            ..Default::default()
        };
        let mut engine = PmuEngine::new(hal, true);

        assert_eq!(engine.enable(), Err(Error::ScrubTimeout));
        assert_eq!(engine.state(), EngineState::InReset);

        let calls = &engine.hal().calls;
        assert_eq!(calls.iter().filter(|c| **c == Call::Reset(false)).count(), 1);
        assert_eq!(calls.last(), Some(&Call::Reset(false)));
        assert!(!calls.contains(&Call::Idle));
        assert!(engine.hal().in_reset);
    }

    #[test]
    fn idle_timeout_stays_out_of_reset() {
        let hal = MockEngine {
            idle_fails: true,
            ..Default::default()
        };
        let mut engine = PmuEngine::new(hal, true);

        assert_eq!(engine.enable(), Err(Error::EnableTimeout));
        assert_eq!(engine.state(), EngineState::ScrubbingPending);
        assert!(!engine.hal().in_reset);
        assert!(!engine.hal().calls.contains(&Call::Reset(false)));
    }

    #[test]
    fn disable_in_reset_is_noop() {
        let hal = MockEngine {
            in_reset: true,
            ..Default::default()
        };
        let mut engine = PmuEngine::new(hal, true);

        assert_eq!(engine.disable(), Ok(()));
        assert!(engine.hal().calls.is_empty());
        assert_eq!(engine.state(), EngineState::InReset);
    }

    #[test]
    fn disable_tracks_reset_done_elsewhere() {
        let mut engine = PmuEngine::new(MockEngine::default(), true);
        engine.enable().unwrap();
        assert_eq!(engine.state(), EngineState::Enabled);

        engine.hal_mut().in_reset = true;
        let calls = engine.hal().calls.len();

        assert_eq!(engine.disable(), Ok(()));
        assert_eq!(engine.state(), EngineState::InReset);
        assert_eq!(engine.hal().calls.len(), calls);
        assert!(!engine.hal().calls.contains(&Call::Reset(false)));
    }

    #[test]
    fn disable_masks_irq_first() {
        let mut engine = PmuEngine::new(MockEngine::default(), true);

        engine.disable().unwrap();
        assert_eq!(engine.state(), EngineState::InReset);
        assert_eq!(
            engine.hal().calls,
            [Call::EnableIrq(false), Call::Reset(false)]
        );

        let mut engine = PmuEngine::new(MockEngine::default(), false);
        engine.disable().unwrap();
        assert_eq!(engine.hal().calls, [Call::Reset(false)]);
    }

    #[test]
    fn disable_propagates_reset_error() {
        let hal = MockEngine {
            reset_error: Some(-5),
            ..Default::default()
        };
        let mut engine = PmuEngine::new(hal, false);

        assert_eq!(engine.disable(), Err(Error::Hardware(-5)));
        assert_eq!(engine.state(), EngineState::Disabled);
    }

    #[test]
    fn reset_skips_enable_on_disable_failure() {
        let hal = MockEngine {
            reset_error: Some(-5),
            ..Default::default()
        };
        let mut engine = PmuEngine::new(hal, false);

        assert_eq!(engine.reset(), Err(Error::Hardware(-5)));
        assert_eq!(engine.hal().calls, [Call::Reset(false)]);
    }

    #[test]
    fn reset_cycles_engine() {
        let mut engine = PmuEngine::new(MockEngine::default(), false);

        engine.reset().unwrap();
        assert_eq!(engine.state(), EngineState::Enabled);
        assert_eq!(
            engine.into_hal().calls,
            [
                Call::Reset(false),
                Call::Reset(true),
                Call::Slcg,
                Call::Blcg,
                Call::Scrub,
                Call::Idle
            ]
        );
    }
}
