//! Settings builder and the frozen runtime settings it produces.
//!
//! A mutable builder assembled while the state machine is stopped, turned into
//! an immutable record by [`SettingsBuilder::build`].
//! `tick()` only ever sees the frozen [`Settings`]; [`crate::machine::StateMachine::reset`]
//! is the sole way back to a configurable state.

use crate::error::ConfigError;

/// Which FIFO count the `MOV x, STATUS` source compares against `status_n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusSel {
    Tx,
    Rx,
}

/// Immutable, validated configuration consumed by `tick()`.
#[derive(Debug, Clone)]
pub struct Settings {
    pub sideset_count: u8,
    pub sideset_opt: bool,
    pub sideset_to_pindirs: bool,
    pub sideset_base: Option<u8>,

    pub in_base: Option<u8>,
    pub out_base: Option<u8>,
    pub set_base: Option<u8>,
    pub jmp_pin: Option<u8>,

    pub out_count: u8,
    pub set_count: u8,

    pub push_threshold: u8,
    pub pull_threshold: u8,

    pub in_shift_right: bool,
    pub out_shift_right: bool,
    pub autopush_enable: bool,
    pub autopull_enable: bool,

    pub wrap_start: u8,
    pub wrap_end: u8,

    pub status_sel: StatusSel,
    pub status_n: u8,
}

impl Settings {
    /// Total width, in bits, of the side-set field (data bits plus the optional enable bit).
    pub fn sideset_width(&self) -> u8 {
        self.sideset_count + self.sideset_opt as u8
    }
}

/// Chained builder for assembling a [`Settings`] value before the state machine runs.
#[derive(Debug, Clone)]
pub struct SettingsBuilder {
    sideset_count: u8,
    sideset_opt: bool,
    sideset_to_pindirs: bool,
    sideset_base: Option<u8>,
    in_base: Option<u8>,
    out_base: Option<u8>,
    set_base: Option<u8>,
    jmp_pin: Option<u8>,
    out_count: u32,
    set_count: u32,
    push_threshold: u32,
    pull_threshold: u32,
    in_shift_right: bool,
    out_shift_right: bool,
    autopush_enable: bool,
    autopull_enable: bool,
    wrap_start: u8,
    wrap_end: u8,
    status_sel: StatusSel,
    status_n: u8,
}

impl Default for SettingsBuilder {
    fn default() -> Self {
        SettingsBuilder {
            sideset_count: 0,
            sideset_opt: false,
            sideset_to_pindirs: false,
            sideset_base: None,
            in_base: None,
            out_base: None,
            set_base: None,
            jmp_pin: None,
            out_count: 0,
            set_count: 0,
            push_threshold: 32,
            pull_threshold: 32,
            in_shift_right: true,
            out_shift_right: true,
            autopush_enable: false,
            autopull_enable: false,
            wrap_start: 0,
            wrap_end: 31,
            status_sel: StatusSel::Tx,
            status_n: 1,
        }
    }
}

impl SettingsBuilder {
    pub fn sideset(
        &mut self,
        count: u8,
        opt: bool,
        to_pindirs: bool,
        base: Option<u8>,
    ) -> &mut Self {
        self.sideset_count = count;
        self.sideset_opt = opt;
        self.sideset_to_pindirs = to_pindirs;
        self.sideset_base = base;
        self
    }

    pub fn in_base(&mut self, base: Option<u8>) -> &mut Self {
        self.in_base = base;
        self
    }

    pub fn out_pins(&mut self, base: Option<u8>, count: u32) -> &mut Self {
        self.out_base = base;
        self.out_count = count;
        self
    }

    pub fn set_pins(&mut self, base: Option<u8>, count: u32) -> &mut Self {
        self.set_base = base;
        self.set_count = count;
        self
    }

    pub fn jmp_pin(&mut self, pin: Option<u8>) -> &mut Self {
        self.jmp_pin = pin;
        self
    }

    pub fn push_threshold(&mut self, n: u32) -> &mut Self {
        self.push_threshold = n;
        self
    }

    pub fn pull_threshold(&mut self, n: u32) -> &mut Self {
        self.pull_threshold = n;
        self
    }

    pub fn shift_dirs(&mut self, in_shift_right: bool, out_shift_right: bool) -> &mut Self {
        self.in_shift_right = in_shift_right;
        self.out_shift_right = out_shift_right;
        self
    }

    pub fn autopush(&mut self, enable: bool) -> &mut Self {
        self.autopush_enable = enable;
        self
    }

    pub fn autopull(&mut self, enable: bool) -> &mut Self {
        self.autopull_enable = enable;
        self
    }

    pub fn wrap(&mut self, start: u8, end: u8) -> &mut Self {
        self.wrap_start = start;
        self.wrap_end = end;
        self
    }

    pub fn status(&mut self, sel: StatusSel, n: u8) -> &mut Self {
        self.status_sel = sel;
        self.status_n = n;
        self
    }

    /// Validate and freeze the builder into a runtime [`Settings`] record.
    pub fn build(&self) -> Result<Settings, ConfigError> {
        if self.out_count > 32 {
            return Err(ConfigError::OutCountOutOfRange(self.out_count));
        }
        if self.set_count > 32 {
            return Err(ConfigError::SetCountOutOfRange(self.set_count));
        }
        if self.sideset_count > 5 {
            return Err(ConfigError::SidesetCountOutOfRange(
                self.sideset_count as u32,
            ));
        }
        if self.sideset_count + self.sideset_opt as u8 > 5 {
            return Err(ConfigError::SidesetCountOutOfRange(
                self.sideset_count as u32 + self.sideset_opt as u32,
            ));
        }
        if !(1..=32).contains(&self.push_threshold) {
            return Err(ConfigError::PushThresholdOutOfRange(self.push_threshold));
        }
        if !(1..=32).contains(&self.pull_threshold) {
            return Err(ConfigError::PullThresholdOutOfRange(self.pull_threshold));
        }
        if self.wrap_start > self.wrap_end || self.wrap_end > 31 {
            return Err(ConfigError::InvalidWrap {
                wrap_start: self.wrap_start,
                wrap_end: self.wrap_end,
            });
        }

        Ok(Settings {
            sideset_count: self.sideset_count,
            sideset_opt: self.sideset_opt,
            sideset_to_pindirs: self.sideset_to_pindirs,
            sideset_base: self.sideset_base,
            in_base: self.in_base,
            out_base: self.out_base,
            set_base: self.set_base,
            jmp_pin: self.jmp_pin,
            out_count: self.out_count as u8,
            set_count: self.set_count as u8,
            push_threshold: self.push_threshold as u8,
            pull_threshold: self.pull_threshold as u8,
            in_shift_right: self.in_shift_right,
            out_shift_right: self.out_shift_right,
            autopush_enable: self.autopush_enable,
            autopull_enable: self.autopull_enable,
            wrap_start: self.wrap_start,
            wrap_end: self.wrap_end,
            status_sel: self.status_sel,
            status_n: self.status_n,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_build_cleanly() {
        let settings = SettingsBuilder::default().build().unwrap();
        assert_eq!(settings.wrap_end, 31);
        assert_eq!(settings.push_threshold, 32);
    }

    #[test]
    fn rejects_out_of_range_counts() {
        let mut builder = SettingsBuilder::default();
        builder.out_pins(Some(0), 33);
        assert!(matches!(
            builder.build(),
            Err(ConfigError::OutCountOutOfRange(33))
        ));
    }

    #[test]
    fn rejects_inverted_wrap_window() {
        let mut builder = SettingsBuilder::default();
        builder.wrap(10, 5);
        assert!(matches!(
            builder.build(),
            Err(ConfigError::InvalidWrap { .. })
        ));
    }

    #[test]
    fn rejects_sideset_plus_opt_bit_over_five() {
        let mut builder = SettingsBuilder::default();
        builder.sideset(5, true, false, Some(0));
        assert!(matches!(
            builder.build(),
            Err(ConfigError::SidesetCountOutOfRange(6))
        ));
    }

    #[test]
    fn allows_sideset_plus_opt_bit_at_five() {
        let mut builder = SettingsBuilder::default();
        builder.sideset(4, true, false, Some(0));
        let settings = builder.build().unwrap();
        assert_eq!(settings.sideset_width(), 5);
    }
}
