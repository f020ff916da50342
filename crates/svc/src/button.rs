//! Button debounce and press classification.
//!
//! [`Debouncer`] is a pure tick-driven state machine: feed it one sample per
//! tick and it reports classification edges while the button is held and the
//! final class once a release has been confirmed. Timing lives entirely in
//! the tick count, so the machine can be stepped deterministically in tests.

use crate::error::ConfigError;
use hal::ButtonStatus;

/// Debounce phase of the button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebounceState {
    /// Released and stable.
    WaitPress,
    /// Press seen, waiting for it to hold for the debounce period.
    DebounceActive,
    /// Confirmed press; the press counter runs.
    WaitRelease,
    /// Release seen, waiting for it to hold for the debounce period.
    DebounceInactive,
}

/// Press duration bucket. Ordered by duration.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PressClass {
    Initial,
    Short,
    Long,
    Blocked,
}

/// Outcome of one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEvent {
    /// The held press crossed into a new class.
    Classified(PressClass),
    /// A release was confirmed; carries the class the press had reached.
    Released(PressClass),
}

/// Debounce timing and classification thresholds, in milliseconds.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceConfig {
    /// Sampling period.
    pub tick_ms: u32,
    /// How long a new level must hold before it is believed.
    pub debounce_ms: u32,
    pub short_ms: u32,
    pub long_ms: u32,
    pub blocked_ms: u32,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            tick_ms: 1,
            debounce_ms: 40,
            short_ms: 100,
            long_ms: 2000,
            blocked_ms: 8000,
        }
    }
}

impl DebounceConfig {
    pub fn builder() -> DebounceConfigBuilder {
        DebounceConfigBuilder::default()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_ms == 0 {
            return Err(ConfigError::ZeroTick);
        }
        if !(self.short_ms < self.long_ms && self.long_ms < self.blocked_ms) {
            return Err(ConfigError::ThresholdOrder {
                short_ms: self.short_ms,
                long_ms: self.long_ms,
                blocked_ms: self.blocked_ms,
            });
        }
        Ok(())
    }

    /// Debounce period expressed in whole ticks, rounded up.
    pub fn debounce_ticks(&self) -> u32 {
        self.debounce_ms.div_ceil(self.tick_ms.max(1))
    }

    /// Class of a press held for `held_ms`.
    pub fn classify(&self, held_ms: u32) -> PressClass {
        if held_ms >= self.blocked_ms {
            PressClass::Blocked
        } else if held_ms >= self.long_ms {
            PressClass::Long
        } else if held_ms >= self.short_ms {
            PressClass::Short
        } else {
            PressClass::Initial
        }
    }
}

/// Builder for [`DebounceConfig`]
#[derive(Debug, Default)]
pub struct DebounceConfigBuilder {
    config: DebounceConfig,
}

impl DebounceConfigBuilder {
    pub fn tick_ms(mut self, ms: u32) -> Self {
        self.config.tick_ms = ms;
        self
    }

    pub fn debounce_ms(mut self, ms: u32) -> Self {
        self.config.debounce_ms = ms;
        self
    }

    /// Set the short, long and blocked thresholds.
    pub fn thresholds(mut self, short_ms: u32, long_ms: u32, blocked_ms: u32) -> Self {
        self.config.short_ms = short_ms;
        self.config.long_ms = long_ms;
        self.config.blocked_ms = blocked_ms;
        self
    }

    pub fn build(self) -> Result<DebounceConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Debounce and classification state machine.
#[derive(Debug, Clone)]
pub struct Debouncer {
    config: DebounceConfig,
    debounce_ticks: u32,
    state: DebounceState,
    timer: u32,
    held_ms: u32,
    class: PressClass,
}

impl Debouncer {
    pub fn new(config: DebounceConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            debounce_ticks: config.debounce_ticks(),
            config,
            state: DebounceState::WaitPress,
            timer: 0,
            held_ms: 0,
            class: PressClass::Initial,
        })
    }

    pub fn config(&self) -> &DebounceConfig {
        &self.config
    }

    pub fn state(&self) -> DebounceState {
        self.state
    }

    /// Class reached by the current press so far.
    pub fn class(&self) -> PressClass {
        self.class
    }

    /// Time the current press has been held since it was confirmed.
    pub fn held_ms(&self) -> u32 {
        self.held_ms
    }

    /// Advance one tick with the sampled button state.
    pub fn tick(&mut self, status: ButtonStatus) -> Option<ButtonEvent> {
        let pressed = status.is_pressed();

        match self.state {
            DebounceState::WaitPress => {
                if pressed {
                    self.timer = self.debounce_ticks;
                    self.state = DebounceState::DebounceActive;
                }
            }
            DebounceState::DebounceActive => {
                if !pressed {
                    self.state = DebounceState::WaitPress;
                } else if self.timer > 0 {
                    self.timer -= 1;
                } else {
                    self.held_ms = 0;
                    self.state = DebounceState::WaitRelease;
                }
            }
            DebounceState::WaitRelease => {
                if !pressed {
                    self.timer = self.debounce_ticks;
                    self.state = DebounceState::DebounceInactive;
                }
            }
            DebounceState::DebounceInactive => {
                if pressed {
                    // Release bounce: the press continues and keeps its count.
                    self.state = DebounceState::WaitRelease;
                } else if self.timer > 0 {
                    self.timer -= 1;
                } else {
                    self.state = DebounceState::WaitPress;
                    return Some(self.on_released());
                }
            }
        }

        if self.state == DebounceState::WaitRelease {
            self.held_ms = self.held_ms.saturating_add(self.config.tick_ms);
            return self.on_held();
        }
        None
    }

    fn on_held(&mut self) -> Option<ButtonEvent> {
        let class = self.config.classify(self.held_ms);
        if class == self.class {
            return None;
        }
        self.class = class;
        Some(ButtonEvent::Classified(class))
    }

    fn on_released(&mut self) -> ButtonEvent {
        let last = self.class;
        self.class = PressClass::Initial;
        ButtonEvent::Released(last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRESSED: ButtonStatus = ButtonStatus::Pressed;
    const RELEASED: ButtonStatus = ButtonStatus::Released;

    /// Feed `ticks` identical samples, returning `(tick, event)` pairs.
    fn run(debouncer: &mut Debouncer, status: ButtonStatus, ticks: u32) -> Vec<(u32, ButtonEvent)> {
        (0..ticks)
            .filter_map(|tick| debouncer.tick(status).map(|event| (tick, event)))
            .collect()
    }

    fn debouncer() -> Debouncer {
        Debouncer::new(DebounceConfig::default()).unwrap()
    }

    #[test]
    fn default_thresholds_classify() {
        let config = DebounceConfig::default();
        assert_eq!(config.classify(0), PressClass::Initial);
        assert_eq!(config.classify(99), PressClass::Initial);
        assert_eq!(config.classify(100), PressClass::Short);
        assert_eq!(config.classify(1999), PressClass::Short);
        assert_eq!(config.classify(2000), PressClass::Long);
        assert_eq!(config.classify(7999), PressClass::Long);
        assert_eq!(config.classify(8000), PressClass::Blocked);
        assert_eq!(config.classify(u32::MAX), PressClass::Blocked);
    }

    #[test]
    fn builder_validates() {
        assert_eq!(
            DebounceConfig::builder().tick_ms(0).build(),
            Err(ConfigError::ZeroTick)
        );
        assert!(matches!(
            DebounceConfig::builder().thresholds(100, 100, 200).build(),
            Err(ConfigError::ThresholdOrder { .. })
        ));

        let config = DebounceConfig::builder()
            .tick_ms(5)
            .debounce_ms(12)
            .thresholds(50, 500, 5000)
            .build()
            .unwrap();
        assert_eq!(config.debounce_ticks(), 3);
        assert_eq!(config.classify(500), PressClass::Long);
    }

    #[test]
    fn press_is_confirmed_after_debounce() {
        let mut d = debouncer();

        d.tick(PRESSED);
        assert_eq!(d.state(), DebounceState::DebounceActive);
        // Timer counts 40 down to zero, then one more tick confirms.
        run(&mut d, PRESSED, 40);
        assert_eq!(d.state(), DebounceState::DebounceActive);
        d.tick(PRESSED);
        assert_eq!(d.state(), DebounceState::WaitRelease);
        assert_eq!(d.held_ms(), 1);
    }

    #[test]
    fn noise_never_reaches_wait_release() {
        let mut d = debouncer();
        let mut events = Vec::new();

        for tick in 0..1000u32 {
            let status = ButtonStatus::from((tick / 10) % 2 == 0);
            events.extend(d.tick(status));
            assert_ne!(d.state(), DebounceState::WaitRelease);
        }
        assert!(events.is_empty());
    }

    #[test]
    fn long_hold_classifies_each_edge_once() {
        let mut d = debouncer();
        let events = run(&mut d, PRESSED, 5000);

        assert_eq!(
            events.iter().map(|(_, e)| *e).collect::<Vec<_>>(),
            vec![
                ButtonEvent::Classified(PressClass::Short),
                ButtonEvent::Classified(PressClass::Long),
            ]
        );
        // 41 debounce ticks before counting starts.
        assert_eq!(events[0].0, 41 + 99);
        assert_eq!(events[1].0, 41 + 1999);
    }

    #[test]
    fn release_reports_last_class_and_resets() {
        let mut d = debouncer();
        run(&mut d, PRESSED, 9000);
        assert_eq!(d.class(), PressClass::Blocked);

        let events = run(&mut d, RELEASED, 100);
        assert_eq!(events, vec![(41, ButtonEvent::Released(PressClass::Blocked))]);
        assert_eq!(d.state(), DebounceState::WaitPress);
        assert_eq!(d.class(), PressClass::Initial);
    }

    #[test]
    fn release_bounce_keeps_press_count() {
        let mut d = debouncer();
        run(&mut d, PRESSED, 541);
        let held = d.held_ms();

        run(&mut d, RELEASED, 10);
        assert_eq!(d.state(), DebounceState::DebounceInactive);
        d.tick(PRESSED);
        assert_eq!(d.state(), DebounceState::WaitRelease);
        assert_eq!(d.held_ms(), held + 1);
        assert_eq!(d.class(), PressClass::Short);
    }

    #[test]
    fn short_press_release_then_next_press_starts_fresh() {
        let mut d = debouncer();
        let events = run(&mut d, PRESSED, 541);
        assert_eq!(events.len(), 1);

        let events = run(&mut d, RELEASED, 100);
        assert_eq!(events, vec![(41, ButtonEvent::Released(PressClass::Short))]);

        let events = run(&mut d, PRESSED, 541);
        assert_eq!(events, vec![(140, ButtonEvent::Classified(PressClass::Short))]);
    }

    #[test]
    fn quick_tap_releases_as_initial() {
        let mut d = debouncer();
        assert!(run(&mut d, PRESSED, 60).is_empty());
        let events = run(&mut d, RELEASED, 60);
        assert_eq!(events, vec![(41, ButtonEvent::Released(PressClass::Initial))]);
    }
}
