//! GPIO staging and merge: the three-tier priority (OUT/SET < side-set < external)
//! applied separately to pin values and pin directions.
//!
//! Each source array is tri-valued (`Option<bool>`, unset between cycles) rather than
//! the `-1` sentinel the original emulator used, so the merge can't forget to reset a cell.

const PIN_COUNT: usize = 32;

#[derive(Debug, Clone)]
pub struct Gpio {
    /// Merged pin values, always 0/1 after a merge.
    pub raw_data: [bool; PIN_COUNT],
    /// Merged pin directions, `false` = output, `true` = input.
    pub pindirs: [bool; PIN_COUNT],

    pub external_data: [Option<bool>; PIN_COUNT],
    pub out_data: [Option<bool>; PIN_COUNT],
    pub set_data: [Option<bool>; PIN_COUNT],
    pub sideset_data: [Option<bool>; PIN_COUNT],

    pub out_pindirs: [Option<bool>; PIN_COUNT],
    pub set_pindirs: [Option<bool>; PIN_COUNT],
    pub sideset_pindirs: [Option<bool>; PIN_COUNT],
}

impl Default for Gpio {
    fn default() -> Self {
        Gpio {
            raw_data: [false; PIN_COUNT],
            pindirs: [false; PIN_COUNT],
            external_data: [None; PIN_COUNT],
            out_data: [None; PIN_COUNT],
            set_data: [None; PIN_COUNT],
            sideset_data: [None; PIN_COUNT],
            out_pindirs: [None; PIN_COUNT],
            set_pindirs: [None; PIN_COUNT],
            sideset_pindirs: [None; PIN_COUNT],
        }
    }
}

impl Gpio {
    /// Clear all source-staging cells to "untouched this cycle". Called at the start
    /// of every `tick()`, including stalled and delay-countdown cycles.
    pub fn clear_sources(&mut self) {
        self.external_data = [None; PIN_COUNT];
        self.out_data = [None; PIN_COUNT];
        self.set_data = [None; PIN_COUNT];
        self.sideset_data = [None; PIN_COUNT];
        self.out_pindirs = [None; PIN_COUNT];
        self.set_pindirs = [None; PIN_COUNT];
        self.sideset_pindirs = [None; PIN_COUNT];
    }

    /// Recompute `pindirs` and `raw_data` from the staged sources, in priority order
    /// low to high: OUT, SET, side-set, external (external is values-only).
    pub fn merge(&mut self) {
        for pin in 0..PIN_COUNT {
            if let Some(dir) = self.out_pindirs[pin] {
                self.pindirs[pin] = dir;
            }
            if let Some(dir) = self.set_pindirs[pin] {
                self.pindirs[pin] = dir;
            }
            if let Some(dir) = self.sideset_pindirs[pin] {
                self.pindirs[pin] = dir;
            }
        }

        for pin in 0..PIN_COUNT {
            let is_input = self.pindirs[pin];
            let mut value = None;
            for bit in [
                self.out_data[pin],
                self.set_data[pin],
                self.sideset_data[pin],
            ]
            .into_iter()
            .flatten()
            {
                if is_input {
                    log::warn!("gpio{pin}: value write ignored, pin configured as input");
                } else {
                    value = Some(bit);
                }
            }
            if let Some(bit) = self.external_data[pin] {
                if is_input {
                    log::warn!(
                        "gpio{pin}: external drive while pin configured as output (bus contention)"
                    );
                }
                value = Some(bit);
            }
            if let Some(bit) = value {
                self.raw_data[pin] = bit;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn external_always_wins() {
        let mut gpio = Gpio::default();
        gpio.out_data[0] = Some(true);
        gpio.external_data[0] = Some(false);
        gpio.merge();
        assert!(!gpio.raw_data[0]);
    }

    #[test]
    fn sideset_beats_set_and_out() {
        let mut gpio = Gpio::default();
        gpio.out_data[1] = Some(true);
        gpio.set_data[1] = Some(true);
        gpio.sideset_data[1] = Some(false);
        gpio.merge();
        assert!(!gpio.raw_data[1]);
    }

    #[test]
    fn untouched_pin_keeps_previous_value() {
        let mut gpio = Gpio::default();
        gpio.raw_data[2] = true;
        gpio.merge();
        assert!(gpio.raw_data[2]);
    }

    #[test]
    fn value_write_to_input_pin_is_ignored() {
        let mut gpio = Gpio::default();
        gpio.pindirs[3] = true;
        gpio.out_data[3] = Some(true);
        gpio.merge();
        assert!(!gpio.raw_data[3]);
    }
}
