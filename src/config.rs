//! INI configuration loader: a `[settings]` section mirroring [`SettingsBuilder`]'s
//! fields, and an optional `[program]` section of `i0`..`i31` 16-bit hex words.
//!
//! Not part of the original emulator (which built its [`Settings`] in code); this
//! module gives the demo driver a file format to drive without recompiling.

use std::path::Path;

use configparser::ini::Ini;

use crate::error::ConfigError;
use crate::settings::{Settings, SettingsBuilder, StatusSel};

const SETTINGS: &str = "settings";
const PROGRAM: &str = "program";

fn get_u8(ini: &Ini, key: &str, default: u8) -> Result<u8, ConfigError> {
    match ini.get(SETTINGS, key) {
        None => Ok(default),
        Some(value) => value.parse().map_err(|_| ConfigError::InvalidValue {
            key: key.into(),
            value,
        }),
    }
}

fn get_opt_u8(ini: &Ini, key: &str) -> Result<Option<u8>, ConfigError> {
    match ini.get(SETTINGS, key) {
        None => Ok(None),
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                key: key.into(),
                value,
            }),
    }
}

fn get_bool(ini: &Ini, key: &str, default: bool) -> Result<bool, ConfigError> {
    match ini
        .getboolcoerce(SETTINGS, key)
        .map_err(|_| ConfigError::InvalidValue {
            key: key.into(),
            value: ini.get(SETTINGS, key).unwrap_or_default(),
        })? {
        Some(value) => Ok(value),
        None => Ok(default),
    }
}

/// Load a `[settings]` section into a [`SettingsBuilder`] (unset keys keep the
/// builder's defaults) and, if present, a `[program]` section into a 32-word
/// instruction memory image.
pub fn load(path: impl AsRef<Path>) -> Result<(SettingsBuilder, Option<[u16; 32]>), ConfigError> {
    let mut ini = Ini::new();
    ini.load(path.as_ref()).map_err(ConfigError::Ini)?;

    let mut builder = SettingsBuilder::default();

    let sideset_count = get_u8(&ini, "sideset_count", 0)?;
    let sideset_opt = get_bool(&ini, "sideset_opt", false)?;
    let sideset_to_pindirs = get_bool(&ini, "sideset_to_pindirs", false)?;
    let sideset_base = get_opt_u8(&ini, "sideset_base")?;
    builder.sideset(sideset_count, sideset_opt, sideset_to_pindirs, sideset_base);

    builder.in_base(get_opt_u8(&ini, "in_base")?);
    builder.out_pins(
        get_opt_u8(&ini, "out_base")?,
        get_u8(&ini, "out_count", 0)? as u32,
    );
    builder.set_pins(
        get_opt_u8(&ini, "set_base")?,
        get_u8(&ini, "set_count", 0)? as u32,
    );
    builder.jmp_pin(get_opt_u8(&ini, "jmp_pin")?);
    builder.push_threshold(get_u8(&ini, "push_threshold", 32)? as u32);
    builder.pull_threshold(get_u8(&ini, "pull_threshold", 32)? as u32);
    builder.shift_dirs(
        get_bool(&ini, "in_shift_right", true)?,
        get_bool(&ini, "out_shift_right", true)?,
    );
    builder.autopush(get_bool(&ini, "autopush_enable", false)?);
    builder.autopull(get_bool(&ini, "autopull_enable", false)?);
    builder.wrap(
        get_u8(&ini, "wrap_start", 0)?,
        get_u8(&ini, "wrap_end", 31)?,
    );

    let status_sel = match ini.get(SETTINGS, "status_sel").as_deref() {
        None | Some("tx") => StatusSel::Tx,
        Some("rx") => StatusSel::Rx,
        Some(other) => {
            return Err(ConfigError::InvalidValue {
                key: "status_sel".into(),
                value: other.into(),
            })
        }
    };
    builder.status(status_sel, get_u8(&ini, "status_n", 1)?);

    let program = load_program(&ini)?;

    Ok((builder, program))
}

/// Freeze a loaded builder, for callers that just want a ready-to-run [`Settings`].
pub fn load_and_build(
    path: impl AsRef<Path>,
) -> Result<(Settings, Option<[u16; 32]>), ConfigError> {
    let (builder, program) = load(path)?;
    Ok((builder.build()?, program))
}

fn load_program(ini: &Ini) -> Result<Option<[u16; 32]>, ConfigError> {
    if !ini.sections().iter().any(|s| s == PROGRAM) {
        return Ok(None);
    }
    let mut program = [0u16; 32];
    for (i, word) in program.iter_mut().enumerate() {
        let key = format!("i{i}");
        if let Some(value) = ini.get(PROGRAM, &key) {
            *word = u16::from_str_radix(value.trim_start_matches("0x"), 16).map_err(|_| {
                ConfigError::BadInstruction {
                    key,
                    value: value.clone(),
                }
            })?;
        }
    }
    Ok(Some(program))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(contents: &str) -> std::path::PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("pio_sim_test_{}.ini", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn loads_settings_and_program() {
        let path = write_temp(
            "[settings]\n\
             sideset_count = 1\n\
             sideset_base = 22\n\
             out_base = 0\n\
             out_count = 1\n\
             autopull_enable = true\n\
             pull_threshold = 24\n\
             \n\
             [program]\n\
             i0 = 0x6021\n\
             i1 = 0x1223\n",
        );
        let (builder, program) = load(&path).unwrap();
        let settings = builder.build().unwrap();
        assert_eq!(settings.sideset_count, 1);
        assert_eq!(settings.sideset_base, Some(22));
        assert!(settings.autopull_enable);
        let program = program.unwrap();
        assert_eq!(program[0], 0x6021);
        assert_eq!(program[1], 0x1223);
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn missing_program_section_is_none() {
        let path = write_temp("[settings]\nout_count = 1\n");
        let (_, program) = load(&path).unwrap();
        assert!(program.is_none());
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn bad_instruction_word_is_an_error() {
        let path = write_temp("[program]\ni0 = not_hex\n");
        assert!(matches!(
            load(&path),
            Err(ConfigError::BadInstruction { .. })
        ));
        std::fs::remove_file(path).ok();
    }
}
