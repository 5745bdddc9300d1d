//! String-keyed reflection over a [`StateMachine`], for host tooling (the demo
//! driver, scripted test harnesses) that wants to peek or poke state by name
//! instead of reaching into the struct directly.

use crate::machine::StateMachine;

fn parse_index(name: &str, prefix: &str, limit: usize) -> Option<usize> {
    let i: usize = name.strip_prefix(prefix)?.parse().ok()?;
    (i < limit).then_some(i)
}

/// Read a named variable. Returns `0` for an unknown name. `clock` truncates to
/// `u32`, same as every other field here; reach into `sm.clock` directly for the
/// full 64-bit count.
pub fn get_var(sm: &StateMachine, name: &str) -> u32 {
    match name {
        "pc" => return sm.regs.pc as u32,
        "clock" => return sm.clock as u32,
        "x" => return sm.regs.x,
        "y" => return sm.regs.y,
        "isr" => return sm.regs.isr,
        "osr" => return sm.regs.osr,
        "isr_shift_count" => return sm.regs.isr_shift_count as u32,
        "osr_shift_count" => return sm.regs.osr_shift_count as u32,
        "delay" => return sm.regs.delay as u32,
        "tx_fifo_count" => return sm.fifo.tx_count as u32,
        "rx_fifo_count" => return sm.fifo.rx_count as u32,
        "push_is_stalling" => return sm.fifo.push_is_stalling as u32,
        "pull_is_stalling" => return sm.fifo.pull_is_stalling as u32,
        "wait_is_stalling" => return sm.wait_is_stalling as u32,
        _ => {}
    }
    if let Some(i) = parse_index(name, "gpio", 32) {
        return sm.gpio.raw_data[i] as u32;
    }
    if let Some(i) = parse_index(name, "pindir", 32) {
        return sm.gpio.pindirs[i] as u32;
    }
    if let Some(i) = parse_index(name, "irq", 8) {
        return sm.irq_flags[i] as u32;
    }
    if let Some(i) = parse_index(name, "tx_fifo", 4) {
        return sm.fifo.tx[i];
    }
    if let Some(i) = parse_index(name, "rx_fifo", 4) {
        return sm.fifo.rx[i];
    }
    0
}

/// Write a named variable. Silently ignores an unknown name or a read-only one
/// (the FIFO words and counts are derived and not settable this way).
pub fn set_var(sm: &mut StateMachine, name: &str, value: u32) {
    match name {
        "pc" => {
            sm.regs.pc = value as u8;
            return;
        }
        "clock" => {
            sm.clock = value as u64;
            return;
        }
        "x" => {
            sm.regs.x = value;
            return;
        }
        "y" => {
            sm.regs.y = value;
            return;
        }
        "isr" => {
            sm.regs.isr = value;
            return;
        }
        "osr" => {
            sm.regs.osr = value;
            return;
        }
        "isr_shift_count" => {
            sm.regs.isr_shift_count = value as u8;
            return;
        }
        "osr_shift_count" => {
            sm.regs.osr_shift_count = value as u8;
            return;
        }
        "delay" => {
            sm.regs.delay = value as u8;
            return;
        }
        _ => {}
    }
    if let Some(i) = parse_index(name, "gpio", 32) {
        sm.gpio.raw_data[i] = value != 0;
        return;
    }
    if let Some(i) = parse_index(name, "pindir", 32) {
        sm.gpio.pindirs[i] = value != 0;
        return;
    }
    if let Some(i) = parse_index(name, "irq", 8) {
        sm.irq_flags[i] = value != 0;
    }
}

/// Tick `sm` until the named field equals `target` or `max_cycles` elapse.
/// Returns whether the target was reached (`false` means it timed out).
pub fn run_until(sm: &mut StateMachine, name: &str, target: u32, max_cycles: u64) -> bool {
    for _ in 0..max_cycles {
        if get_var(sm, name) == target {
            return true;
        }
        sm.tick();
    }
    get_var(sm, name) == target
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::SettingsBuilder;

    fn sm() -> StateMachine {
        StateMachine::new(0, SettingsBuilder::default().build().unwrap(), [0; 32])
    }

    #[test]
    fn reads_and_writes_fixed_names() {
        let mut sm = sm();
        set_var(&mut sm, "x", 42);
        assert_eq!(get_var(&sm, "x"), 42);
    }

    #[test]
    fn reads_and_writes_indexed_names() {
        let mut sm = sm();
        set_var(&mut sm, "gpio3", 1);
        assert_eq!(get_var(&sm, "gpio3"), 1);
        assert_eq!(get_var(&sm, "gpio31"), 0);
        assert_eq!(get_var(&sm, "gpio32"), 0);
    }

    #[test]
    fn unknown_name_is_zero_and_ignored() {
        assert_eq!(get_var(&sm(), "not_a_var"), 0);
        let mut sm = sm();
        set_var(&mut sm, "not_a_var", 1);
        assert_eq!(get_var(&sm, "x"), 0);
    }

    #[test]
    fn run_until_stops_on_target() {
        let mut sm = sm();
        sm.program[0] = 0x0000; // JMP always, 0 -- spins forever
        let hit = run_until(&mut sm, "clock", 5, 10);
        assert!(hit);
        assert_eq!(sm.clock, 5);
    }

    #[test]
    fn run_until_times_out() {
        let mut sm = sm();
        sm.program[0] = 0x0000;
        let hit = run_until(&mut sm, "clock", 100, 5);
        assert!(!hit);
        assert_eq!(sm.clock, 5);
    }
}
