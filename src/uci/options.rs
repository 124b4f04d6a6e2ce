use std::fmt::Write as _;

use super::UciError;
use crate::engine::{EngineConfig, EngineController, MAX_HASH_MB, MAX_MULTI_PV, MAX_THREADS};

pub const MAX_MOVE_OVERHEAD_MS: u64 = 5000;
pub const MAX_CONTEMPT: i32 = 100;

/// The `option ...` lines announced in reply to `uci`.
#[must_use]
pub fn option_lines(defaults: &EngineConfig) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "option name Hash type spin default {} min 1 max {MAX_HASH_MB}",
        defaults.hash_mb
    );
    let _ = writeln!(
        out,
        "option name Threads type spin default {} min 1 max {MAX_THREADS}",
        defaults.threads
    );
    let _ = writeln!(
        out,
        "option name MultiPV type spin default {} min 1 max {MAX_MULTI_PV}",
        defaults.multi_pv
    );
    let _ = writeln!(out, "option name Ponder type check default {}", defaults.ponder);
    let _ = writeln!(
        out,
        "option name Move Overhead type spin default {} min 0 max {MAX_MOVE_OVERHEAD_MS}",
        defaults.move_overhead_ms
    );
    let _ = writeln!(
        out,
        "option name Contempt type spin default {} min -{MAX_CONTEMPT} max {MAX_CONTEMPT}",
        defaults.contempt
    );
    let _ = write!(out, "option name Clear Hash type button");
    out
}

fn parse_value<T: std::str::FromStr>(name: &str, value: Option<&str>) -> Result<T, UciError> {
    let raw = value.unwrap_or_default().trim();
    raw.parse::<T>().map_err(|_| UciError::InvalidValue {
        name: name.to_string(),
        value: raw.to_string(),
    })
}

/// Apply `setoption`. Option names are case-insensitive; numeric values
/// are clamped into the announced range.
pub fn apply_setoption(
    engine: &mut EngineController,
    name: &str,
    value: Option<&str>,
) -> Result<(), UciError> {
    match name.trim().to_ascii_lowercase().as_str() {
        "hash" => {
            let mb = parse_value::<usize>(name, value)?;
            engine.resize_hash(mb)?;
        }
        "threads" => engine.set_threads(parse_value(name, value)?),
        "multipv" => engine.set_multi_pv(parse_value(name, value)?),
        "ponder" => {
            let on = match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
                Some("true") => true,
                Some("false") => false,
                _ => {
                    return Err(UciError::InvalidValue {
                        name: name.to_string(),
                        value: value.unwrap_or_default().to_string(),
                    })
                }
            };
            engine.set_ponder(on);
        }
        "move overhead" => {
            let ms = parse_value::<u64>(name, value)?;
            engine.set_move_overhead(ms.min(MAX_MOVE_OVERHEAD_MS));
        }
        "contempt" => {
            let cp = parse_value::<i32>(name, value)?;
            engine.set_contempt(cp.clamp(-MAX_CONTEMPT, MAX_CONTEMPT));
        }
        "clear hash" => engine.clear_hash(),
        _ => return Err(UciError::UnknownOption(name.to_string())),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> EngineController {
        EngineController::try_new(EngineConfig {
            hash_mb: 2,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn announces_every_option() {
        let lines = option_lines(&EngineConfig::default());
        for name in ["Hash", "Threads", "MultiPV", "Ponder", "Move Overhead", "Contempt", "Clear Hash"] {
            assert!(lines.contains(&format!("option name {name} type")), "{name}");
        }
        assert!(lines.contains("min -100 max 100"));
    }

    #[test]
    fn values_are_applied_and_clamped() {
        let mut engine = engine();
        apply_setoption(&mut engine, "Threads", Some("4")).unwrap();
        apply_setoption(&mut engine, "multipv", Some("3")).unwrap();
        apply_setoption(&mut engine, "Contempt", Some("250")).unwrap();
        apply_setoption(&mut engine, "Move Overhead", Some("10")).unwrap();
        apply_setoption(&mut engine, "Ponder", Some("true")).unwrap();
        apply_setoption(&mut engine, "Hash", Some("1")).unwrap();
        apply_setoption(&mut engine, "Clear Hash", None).unwrap();

        let config = engine.config();
        assert_eq!(config.threads, 4);
        assert_eq!(config.multi_pv, 3);
        assert_eq!(config.contempt, MAX_CONTEMPT);
        assert_eq!(config.move_overhead_ms, 10);
        assert!(config.ponder);
        assert_eq!(config.hash_mb, 1);
    }

    #[test]
    fn bad_input_is_rejected() {
        let mut engine = engine();
        assert!(matches!(
            apply_setoption(&mut engine, "Threads", Some("many")),
            Err(UciError::InvalidValue { .. })
        ));
        assert!(matches!(
            apply_setoption(&mut engine, "Style", Some("solid")),
            Err(UciError::UnknownOption(_))
        ));
        assert_eq!(engine.config().threads, 1);
    }
}
