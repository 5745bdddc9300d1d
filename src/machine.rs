//! The sequencer: per-cycle orchestration, instruction dispatch, and the nine
//! opcode handlers.

use crate::fifo::Fifo;
use crate::gpio::Gpio;
use crate::instruction::{
    decode, resolve_irq_index, split_delay_sideset, InSource, Instruction, JmpCondition, MovDest,
    MovOp, MovSrc, OutDest, SetDest, WaitSource,
};
use crate::settings::{Settings, StatusSel};
use crate::shift;

/// Scratch and shift registers, program counter, and delay counter.
#[derive(Debug, Clone, Default)]
pub struct Registers {
    pub x: u32,
    pub y: u32,
    pub isr: u32,
    pub osr: u32,
    pub isr_shift_count: u8,
    pub osr_shift_count: u8,
    pub pc: u8,
    pub delay: u8,
}

/// One PIO state machine: program memory, registers, settings, GPIO staging,
/// FIFOs, and the shared IRQ flags it can see.
#[derive(Debug, Clone)]
pub struct StateMachine {
    pub program: [u16; 32],
    pub current_instruction: u16,
    /// This state machine's index (0..=3), used for IRQ relative addressing.
    pub number: u8,
    pub clock: u64,
    pub regs: Registers,
    pub settings: Settings,
    pub gpio: Gpio,
    pub fifo: Fifo,
    pub irq_flags: [bool; 8],
    pub irq_is_waiting: bool,
    pub wait_is_stalling: bool,

    jmp_to: Option<u8>,
    skip_increase_pc: bool,
    delay_delay: bool,
    skip_delay: bool,
    exec_command: bool,
}

impl StateMachine {
    pub fn new(number: u8, settings: Settings, program: [u16; 32]) -> Self {
        StateMachine {
            program,
            current_instruction: 0,
            number,
            clock: 0,
            regs: Registers::default(),
            settings,
            gpio: Gpio::default(),
            fifo: Fifo::default(),
            irq_flags: [false; 8],
            irq_is_waiting: false,
            wait_is_stalling: false,
            jmp_to: None,
            skip_increase_pc: false,
            delay_delay: false,
            skip_delay: false,
            exec_command: false,
        }
    }

    /// Reload settings (and optionally the program image), zeroing everything else.
    /// The only transition back to a configurable state.
    pub fn reset(&mut self, settings: Settings, program: Option<[u16; 32]>) {
        if let Some(program) = program {
            self.program = program;
        }
        self.settings = settings;
        self.current_instruction = 0;
        self.clock = 0;
        self.regs = Registers::default();
        self.gpio = Gpio::default();
        self.fifo = Fifo::default();
        self.irq_flags = [false; 8];
        self.irq_is_waiting = false;
        self.wait_is_stalling = false;
        self.jmp_to = None;
        self.skip_increase_pc = false;
        self.delay_delay = false;
        self.skip_delay = false;
        self.exec_command = false;
    }

    /// Advance exactly one clock cycle.
    pub fn tick(&mut self) {
        // 1. Delay countdown.
        if self.regs.delay > 0 && !self.delay_delay {
            self.regs.delay -= 1;
            self.gpio.clear_sources();
            self.gpio.merge();
            self.clock += 1;
            return;
        }

        // 2. Fetch.
        if self.exec_command {
            self.exec_command = false;
        } else {
            self.current_instruction = self.program[self.regs.pc as usize];
        }

        // 3. Clear control flags.
        self.jmp_to = None;
        self.skip_increase_pc = false;
        self.delay_delay = false;
        self.skip_delay = false;
        self.gpio.clear_sources();

        // 4. Decode delay/side-set.
        let field = ((self.current_instruction >> 8) & 0b1_1111) as u8;
        let (delay_field, _) = split_delay_sideset(field, self.settings.sideset_width());

        // 5. Apply side-set, unconditionally (even if the instruction stalls).
        self.apply_side_set(field);

        // 6. Dispatch.
        let instr = decode(self.current_instruction);
        // Only OUT and PULL touch OSR/osr_shift_count directly; MOV (even MOV osr, x)
        // doesn't interact with the autopull threshold, so it still gets a post-step.
        let handles_osr_itself =
            matches!(instr, Instruction::Out { .. } | Instruction::Pull { .. });
        self.dispatch(instr);

        // 7. Autopull post-step.
        if !handles_osr_itself
            && self.settings.autopull_enable
            && self.regs.osr_shift_count >= self.settings.pull_threshold
            && self.fifo.tx_count > 0
        {
            self.regs.osr = self.fifo.pop_tx();
            self.regs.osr_shift_count = 0;
            self.fifo.pull_is_stalling = false;
        }

        // 8. PC update. A taken jump always wins, even though JMP also sets
        // skip_increase_pc (to suppress the default +1/wrap, not the jump itself).
        if let Some(addr) = self.jmp_to {
            self.regs.pc = addr;
        } else if self.skip_increase_pc {
            // stalled: unchanged
        } else if self.regs.pc == self.settings.wrap_end {
            self.regs.pc = self.settings.wrap_start;
        } else {
            self.regs.pc += 1;
        }

        // 9. Install delay.
        if self.skip_delay {
            self.regs.delay = 0;
        } else if self.delay_delay {
            // leave regs.delay alone; it starts counting once the stall clears.
        } else {
            self.regs.delay = delay_field;
        }

        // 10. GPIO merge.
        self.gpio.merge();

        // 11. Clock.
        self.clock += 1;
    }

    fn apply_side_set(&mut self, field: u8) {
        let width = self.settings.sideset_width();
        if width == 0 {
            return;
        }
        let mut side_bits = field >> (5 - width);
        if self.settings.sideset_opt {
            let enable = (side_bits >> (width - 1)) & 1;
            if enable == 0 {
                return;
            }
            side_bits = if width > 1 {
                side_bits & ((1 << (width - 1)) - 1)
            } else {
                0
            };
        }
        let Some(base) = self.settings.sideset_base else {
            log::warn!("sideset_base unset, skipping side-set");
            return;
        };
        for k in 0..self.settings.sideset_count as u32 {
            let bit = (side_bits >> k) & 1 == 1;
            let pin = (base as u32 + k) as usize % 32;
            if self.settings.sideset_to_pindirs {
                self.gpio.sideset_pindirs[pin] = Some(bit);
            } else {
                self.gpio.sideset_data[pin] = Some(bit);
            }
        }
    }

    fn dispatch(&mut self, instr: Instruction) {
        match instr {
            Instruction::Jmp { condition, address } => self.exec_jmp(condition, address),
            Instruction::Wait { polarity, source } => self.exec_wait(polarity, source),
            Instruction::In { source, count } => self.exec_in(source, count),
            Instruction::Out { dest, count } => self.exec_out(dest, count),
            Instruction::Push { if_full, block } => self.exec_push(if_full, block),
            Instruction::Pull { if_empty, block } => self.exec_pull(if_empty, block),
            Instruction::Mov { dest, op, src } => self.exec_mov(dest, op, src),
            Instruction::Irq { clear, wait, index } => self.exec_irq(clear, wait, index),
            Instruction::Set { dest, data } => self.exec_set(dest, data),
        }
    }

    fn exec_jmp(&mut self, condition: JmpCondition, address: u8) {
        let taken = match condition {
            JmpCondition::Always => true,
            JmpCondition::XIsZero => self.regs.x == 0,
            JmpCondition::XDecNonZero => {
                let taken = self.regs.x != 0;
                self.regs.x = self.regs.x.wrapping_sub(1);
                taken
            }
            JmpCondition::YIsZero => self.regs.y == 0,
            JmpCondition::YDecNonZero => {
                let taken = self.regs.y != 0;
                self.regs.y = self.regs.y.wrapping_sub(1);
                taken
            }
            JmpCondition::XNotEqY => self.regs.x != self.regs.y,
            JmpCondition::Pin => match self.settings.jmp_pin {
                Some(pin) => self.gpio.raw_data[pin as usize],
                None => {
                    log::warn!("jmp_pin unset, JMP PIN not taken");
                    false
                }
            },
            JmpCondition::NotOsre => self.regs.osr_shift_count < self.settings.pull_threshold,
        };
        if taken {
            self.jmp_to = Some(address);
            self.skip_increase_pc = true;
        }
    }

    fn exec_wait(&mut self, polarity: bool, source: WaitSource) {
        let met = match source {
            WaitSource::Gpio(pin) => self.gpio.raw_data[pin as usize] == polarity,
            WaitSource::Pin(index) => match self.settings.in_base {
                Some(base) => {
                    let pin = (base as u32 + index as u32) as usize % 32;
                    self.gpio.raw_data[pin] == polarity
                }
                None => {
                    log::warn!("in_base unset, WAIT PIN not met");
                    false
                }
            },
            WaitSource::Irq(index) => {
                let irq_num = resolve_irq_index(index, self.number) as usize;
                let met = self.irq_flags[irq_num] == polarity;
                if met && polarity {
                    self.irq_flags[irq_num] = false;
                }
                met
            }
            WaitSource::Reserved => {
                log::error!("WAIT: reserved source, treating as never met");
                false
            }
        };

        if met {
            self.wait_is_stalling = false;
        } else {
            self.skip_increase_pc = true;
            self.delay_delay = true;
            self.wait_is_stalling = true;
        }
    }

    fn exec_in(&mut self, source: InSource, count: u8) {
        if self.fifo.push_is_stalling {
            if self.fifo.rx_has_room() {
                self.fifo.push_rx(self.regs.isr);
                self.regs.isr = 0;
                self.regs.isr_shift_count = 0;
                self.fifo.push_is_stalling = false;
            } else {
                self.skip_increase_pc = true;
                self.delay_delay = true;
            }
            return;
        }

        let mask = shift::mask(count);
        let data = match source {
            InSource::Pins => match self.settings.in_base {
                Some(base) => self.gather_pins(base, count),
                None => {
                    log::warn!("in_base unset, IN PINS reads 0");
                    0
                }
            },
            InSource::X => self.regs.x & mask,
            InSource::Y => self.regs.y & mask,
            InSource::Null => 0,
            InSource::Isr => self.regs.isr & mask,
            InSource::Osr => self.regs.osr & mask,
            InSource::Reserved(code) => {
                log::error!("IN: reserved source {code:#05b}, no-op");
                return;
            }
        };

        self.regs.isr = if self.settings.in_shift_right {
            shift::shift_in_right(self.regs.isr, data, count)
        } else {
            shift::shift_in_left(self.regs.isr, data, count)
        };
        self.regs.isr_shift_count = shift::saturating_add_count(self.regs.isr_shift_count, count);

        if self.settings.autopush_enable
            && self.regs.isr_shift_count >= self.settings.push_threshold
        {
            if self.fifo.rx_has_room() {
                self.fifo.push_rx(self.regs.isr);
                self.regs.isr = 0;
                self.regs.isr_shift_count = 0;
                self.fifo.push_is_stalling = false;
            } else {
                self.skip_increase_pc = true;
                self.delay_delay = true;
                self.fifo.push_is_stalling = true;
            }
        }
    }

    fn exec_out(&mut self, dest: OutDest, count: u8) {
        if self.settings.autopull_enable
            && self.regs.osr_shift_count >= self.settings.pull_threshold
        {
            if self.fifo.tx_count > 0 {
                self.regs.osr = self.fifo.pop_tx();
            }
            self.regs.osr_shift_count = 0;
            self.skip_increase_pc = true;
            self.delay_delay = true;
            self.fifo.pull_is_stalling = true;
            return;
        }

        let osr_before = self.regs.osr;
        let (data, new_osr) = if self.settings.out_shift_right {
            shift::shift_out_right(self.regs.osr, count)
        } else {
            shift::shift_out_left(self.regs.osr, count)
        };
        self.regs.osr = new_osr;
        self.regs.osr_shift_count = shift::saturating_add_count(self.regs.osr_shift_count, count);

        match dest {
            OutDest::Pins => match self.settings.out_base {
                Some(base) => self.scatter_pins(base, count, data, true),
                None => log::warn!("out_base unset, OUT PINS no-op"),
            },
            OutDest::X => self.regs.x = data,
            OutDest::Y => self.regs.y = data,
            OutDest::Null => {}
            OutDest::Pindirs => match self.settings.out_base {
                Some(base) => self.scatter_pins(base, count, data, false),
                None => log::warn!("out_base unset, OUT PINDIRS no-op"),
            },
            OutDest::Pc => {
                self.jmp_to = Some((data & 0x1F) as u8);
                self.skip_increase_pc = true;
            }
            OutDest::Isr => {
                self.regs.isr = data;
                self.regs.isr_shift_count = count;
            }
            OutDest::Exec => {
                self.current_instruction = (osr_before & 0xFFFF) as u16;
                self.exec_command = true;
                self.skip_increase_pc = true;
                self.skip_delay = true;
            }
        }
    }

    fn exec_push(&mut self, if_full: bool, block: bool) {
        if self.fifo.rx_has_room() {
            self.fifo.push_is_stalling = false;
            let should_push = !if_full || self.regs.isr_shift_count >= self.settings.push_threshold;
            if should_push {
                self.fifo.push_rx(self.regs.isr);
                self.regs.isr = 0;
                self.regs.isr_shift_count = 0;
            }
        } else if block {
            self.skip_increase_pc = true;
            self.delay_delay = true;
            self.fifo.push_is_stalling = true;
        } else {
            self.regs.isr = 0;
            self.regs.isr_shift_count = 0;
            self.fifo.push_is_stalling = false;
        }
    }

    fn exec_pull(&mut self, if_empty: bool, block: bool) {
        if self.fifo.tx_count > 0 {
            self.fifo.pull_is_stalling = false;
            let should_pull =
                !if_empty || self.regs.osr_shift_count >= self.settings.pull_threshold;
            if should_pull {
                self.regs.osr = self.fifo.pop_tx();
                self.regs.osr_shift_count = 0;
            }
        } else if block {
            self.skip_increase_pc = true;
            self.delay_delay = true;
            self.fifo.pull_is_stalling = true;
        } else {
            self.regs.osr = self.regs.x;
            self.fifo.pull_is_stalling = false;
        }
    }

    fn exec_mov(&mut self, dest: MovDest, op: MovOp, src: MovSrc) {
        let data = match src {
            MovSrc::Pins => match self.settings.in_base {
                Some(base) => self.gather_pins(base, 32),
                None => {
                    log::warn!("in_base unset, MOV *, PINS reads 0");
                    0
                }
            },
            MovSrc::X => self.regs.x,
            MovSrc::Y => self.regs.y,
            MovSrc::Null => 0,
            MovSrc::Status => self.status(),
            MovSrc::Isr => self.regs.isr,
            MovSrc::Osr => self.regs.osr,
            MovSrc::Reserved => {
                log::error!("MOV: reserved source, no-op");
                return;
            }
        };

        let data = match op {
            MovOp::None => data,
            MovOp::Invert => !data,
            MovOp::BitReverse => data.reverse_bits(),
            MovOp::Reserved => {
                log::error!("MOV: reserved op, no-op");
                return;
            }
        };

        match dest {
            MovDest::Pins => match self.settings.out_base {
                Some(base) => self.scatter_pins(base, self.settings.out_count, data, true),
                None => log::warn!("out_base unset, MOV PINS, src no-op"),
            },
            MovDest::X => self.regs.x = data,
            MovDest::Y => self.regs.y = data,
            MovDest::Reserved => log::error!("MOV: reserved destination, no-op"),
            MovDest::Exec => {
                self.current_instruction = data as u16;
                self.exec_command = true;
                self.skip_increase_pc = true;
                self.skip_delay = true;
            }
            MovDest::Pc => {
                self.jmp_to = Some((data & 0x1F) as u8);
                self.skip_increase_pc = true;
            }
            MovDest::Isr => {
                self.regs.isr = data;
                self.regs.isr_shift_count = 0;
            }
            MovDest::Osr => {
                self.regs.osr = data;
                self.regs.osr_shift_count = 0;
            }
        }
    }

    fn exec_irq(&mut self, clear: bool, wait: bool, index: u8) {
        let irq_num = resolve_irq_index(index, self.number) as usize;

        if self.irq_is_waiting {
            if self.irq_flags[irq_num] {
                self.skip_increase_pc = true;
                self.delay_delay = true;
            } else {
                self.irq_is_waiting = false;
            }
            return;
        }

        if clear {
            self.irq_flags[irq_num] = false;
        } else {
            self.irq_flags[irq_num] = true;
            if wait {
                self.irq_is_waiting = true;
                self.skip_increase_pc = true;
                self.delay_delay = true;
            }
        }
    }

    fn exec_set(&mut self, dest: SetDest, data: u8) {
        match dest {
            SetDest::Pins => match self.settings.set_base {
                Some(base) => {
                    for k in 0..self.settings.set_count as u32 {
                        let pin = (base as u32 + k) as usize % 32;
                        self.gpio.set_data[pin] = Some((data as u32 >> k) & 1 == 1);
                    }
                }
                None => log::warn!("set_base unset, SET PINS no-op"),
            },
            SetDest::X => self.regs.x = data as u32,
            SetDest::Y => self.regs.y = data as u32,
            SetDest::Pindirs => match self.settings.set_base {
                Some(base) => {
                    for k in 0..self.settings.set_count as u32 {
                        let pin = (base as u32 + k) as usize % 32;
                        self.gpio.set_pindirs[pin] = Some((data as u32 >> k) & 1 == 1);
                    }
                }
                None => log::warn!("set_base unset, SET PINDIRS no-op"),
            },
            SetDest::Reserved(code) => log::error!("SET: reserved destination {code:#05b}, no-op"),
        }
    }

    fn status(&self) -> u32 {
        let below = match self.settings.status_sel {
            StatusSel::Tx => self.fifo.tx_count < self.settings.status_n,
            StatusSel::Rx => self.fifo.rx_count < self.settings.status_n,
        };
        if below {
            u32::MAX
        } else {
            0
        }
    }

    fn gather_pins(&self, base: u8, count: u8) -> u32 {
        let mut data = 0u32;
        for i in 0..count as u32 {
            let pin = (base as u32 + i) as usize % 32;
            if self.gpio.raw_data[pin] {
                data |= 1 << i;
            }
        }
        data
    }

    /// Stamp the OUT-tier `out_data`/`out_pindirs` (`as_value == true`/`false`) for
    /// `count` pins starting at `base`. Used by OUT and MOV *, PINS, which share the
    /// OUT priority tier; SET writes its own `set_data`/`set_pindirs` tier directly.
    fn scatter_pins(&mut self, base: u8, count: u8, data: u32, as_value: bool) {
        for k in 0..count as u32 {
            let pin = (base as u32 + k) as usize % 32;
            let bit = Some((data >> k) & 1 == 1);
            if as_value {
                self.gpio.out_data[pin] = bit;
            } else {
                self.gpio.out_pindirs[pin] = bit;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::SettingsBuilder;

    fn program(words: &[u16]) -> [u16; 32] {
        let mut program = [0u16; 32];
        program[..words.len()].copy_from_slice(words);
        program
    }

    #[test]
    fn ws2812_bit_stream_pulse_widths() {
        let mut builder = SettingsBuilder::default();
        builder
            .sideset(1, false, false, Some(22))
            .pull_threshold(24)
            .shift_dirs(true, false)
            .autopull(true)
            .wrap(0, 3);
        let settings = builder.build().unwrap();
        let mut sm = StateMachine::new(0, settings, program(&[0x6321, 0x1223, 0x1200, 0xA242]));
        sm.fifo.tx = [0xBAAB_FF00, 0, 0, 0];
        sm.fifo.tx_count = 1;
        sm.regs.osr_shift_count = 24; // OSR already exhausted: the first OUT autopulls.

        // The very first OUT stalls one cycle to refill the OSR from the FIFO.
        sm.tick();
        assert_eq!(sm.fifo.tx_count, 0);

        // Bit 0 of 0xBAABFF00 (MSB-first) is 1: 6 cycles high, 4 cycles low.
        let mut high = 0;
        for _ in 0..10 {
            sm.tick();
            if sm.gpio.raw_data[22] {
                high += 1;
            }
        }
        assert_eq!(high, 6);

        // Bit 1 is 0: 3 cycles high, 7 cycles low.
        let mut high = 0;
        for _ in 0..10 {
            sm.tick();
            if sm.gpio.raw_data[22] {
                high += 1;
            }
        }
        assert_eq!(high, 3);
    }

    #[test]
    fn jmp_x_dec_three_cycle_countdown() {
        let settings = SettingsBuilder::default().build().unwrap();
        let mut sm = StateMachine::new(0, settings, program(&[0x0040]));
        sm.regs.x = 3;

        sm.tick();
        assert_eq!(sm.regs.x, 2);
        assert_eq!(sm.regs.pc, 0);
        sm.tick();
        assert_eq!(sm.regs.x, 1);
        sm.tick();
        assert_eq!(sm.regs.x, 0);
        assert_eq!(sm.regs.pc, 0);

        // Fourth tick: x == 0, condition fails, x wraps, pc advances past the loop.
        sm.tick();
        assert_eq!(sm.regs.x, 0xFFFF_FFFF);
        assert_eq!(sm.regs.pc, 1);
    }

    #[test]
    fn push_block_stall_then_drains() {
        let settings = SettingsBuilder::default().build().unwrap();
        let mut sm = StateMachine::new(0, settings, program(&[0x8020]));
        sm.regs.isr = 0x00AB_CDEF;
        sm.regs.isr_shift_count = 20;
        sm.fifo.rx_count = 4;

        sm.tick();
        assert!(sm.fifo.push_is_stalling);
        assert_eq!(sm.regs.pc, 0);
        assert_eq!(sm.regs.isr, 0x00AB_CDEF);

        sm.fifo.rx_count = 3;
        sm.tick();
        assert_eq!(sm.regs.isr, 0);
        assert_eq!(sm.fifo.rx_count, 4);
        assert_eq!(sm.fifo.rx[3], 0x00AB_CDEF);
        assert_eq!(sm.regs.pc, 1);
    }

    #[test]
    fn pull_non_blocking_on_empty_fifo() {
        let settings = SettingsBuilder::default().build().unwrap();
        let mut sm = StateMachine::new(0, settings, program(&[0x8080]));
        sm.regs.x = 0xCAFE_BABE;
        sm.fifo.tx_count = 0;
        sm.regs.osr = 0x00AB_CDEF;

        sm.tick();
        assert_eq!(sm.regs.osr, 0xCAFE_BABE);
        assert!(!sm.fifo.pull_is_stalling);
        assert_eq!(sm.regs.pc, 1);
    }

    #[test]
    fn autopull_post_step_on_non_out_instruction() {
        let mut builder = SettingsBuilder::default();
        builder.autopull(true).pull_threshold(32);
        let settings = builder.build().unwrap();
        let mut sm = StateMachine::new(0, settings, program(&[0xA042]));
        sm.regs.osr_shift_count = 32;
        sm.fifo.tx = [0xDEAD_BEEF, 0, 0, 0];
        sm.fifo.tx_count = 1;

        sm.tick();
        assert_eq!(sm.regs.osr, 0xDEAD_BEEF);
        assert_eq!(sm.regs.osr_shift_count, 0);
        assert_eq!(sm.fifo.tx_count, 0);
        assert_eq!(sm.regs.pc, 1);
    }

    #[test]
    fn irq_wait_self_clear() {
        let settings = SettingsBuilder::default().build().unwrap();
        let mut sm = StateMachine::new(0, settings, program(&[0xC020]));

        sm.tick();
        assert!(sm.irq_flags[0]);
        assert!(sm.irq_is_waiting);
        assert_eq!(sm.regs.pc, 0);

        sm.tick();
        assert!(sm.irq_is_waiting);
        assert_eq!(sm.regs.pc, 0);

        sm.irq_flags[0] = false;
        sm.tick();
        assert!(!sm.irq_is_waiting);
        assert_eq!(sm.regs.pc, 1);
    }

    #[test]
    fn autopush_stall_holds_until_rx_fifo_drains() {
        let mut builder = SettingsBuilder::default();
        builder.autopush(true).push_threshold(8);
        let settings = builder.build().unwrap();
        let mut sm = StateMachine::new(0, settings, program(&[0x4028])); // IN X, 8
        sm.regs.x = 0xFF;
        sm.fifo.rx_count = 4; // full: no room

        sm.tick();
        assert!(sm.fifo.push_is_stalling);
        assert_eq!(sm.regs.pc, 0, "stalled: PC must not move off the IN");

        // Re-entry while still full must re-assert the stall, not let PC drift.
        sm.tick();
        assert!(sm.fifo.push_is_stalling);
        assert_eq!(sm.regs.pc, 0);

        sm.fifo.rx_count = 3; // room opens up
        sm.tick();
        assert!(!sm.fifo.push_is_stalling);
        assert_eq!(sm.fifo.rx_count, 4);
        assert_eq!(sm.regs.isr, 0);
        assert_eq!(sm.regs.pc, 1);
    }

    #[test]
    fn out_to_pc_masks_to_five_bits() {
        let settings = SettingsBuilder::default().build().unwrap();
        // OUT PC, 32: dest=0b101, count field 0 (-> 32).
        let mut sm = StateMachine::new(0, settings, program(&[0x60A0]));
        sm.regs.osr = 0xFFFF_FFFF;

        sm.tick();
        assert_eq!(sm.regs.pc, 0x1F, "PC must stay within the 32-word program");
    }
}
