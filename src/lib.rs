//! A cycle-accurate emulator for the RP2040 PIO state machine instruction set.
//!
//! [`machine::StateMachine::tick`] is the sole mutation point: it fetches, decodes,
//! dispatches, and retires exactly one clock cycle. Everything else in this crate
//! either feeds that method (instruction decoding, the shift unit, GPIO staging,
//! FIFOs, settings) or observes it from outside (the reflection facade, the INI
//! config loader, the demo driver).

pub mod config;
pub mod error;
pub mod fifo;
pub mod gpio;
pub mod instruction;
pub mod machine;
pub mod reflect;
pub mod settings;
pub mod shift;

pub use error::ConfigError;
pub use machine::StateMachine;
pub use settings::{Settings, SettingsBuilder, StatusSel};
