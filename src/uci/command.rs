//! Tokenising of UCI input lines into typed commands.

use crate::engine::{GoParams, TimeControl};

/// Where a `position` command starts from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PositionSource {
    StartPos,
    Fen(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UciCommand {
    Uci,
    IsReady,
    UciNewGame,
    Position {
        source: PositionSource,
        moves: Vec<String>,
    },
    Go(GoParams),
    SetOption {
        name: String,
        value: Option<String>,
    },
    Perft(usize),
    /// `d`: print the current position.
    Display,
    Debug,
    Stop,
    PonderHit,
    Quit,
    Unknown(String),
}

/// Parse one input line. Blank lines yield `None`; a `position` command
/// without a start position yields `None` too, after a warning.
pub fn parse_uci_command(line: &str) -> Option<UciCommand> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let (&head, args) = parts.split_first()?;

    let cmd = match head {
        "uci" => UciCommand::Uci,
        "isready" => UciCommand::IsReady,
        "ucinewgame" => UciCommand::UciNewGame,
        "position" => parse_position(args)?,
        "go" => UciCommand::Go(parse_go(args)),
        "setoption" => {
            let (name, value) = parse_setoption(args)?;
            UciCommand::SetOption { name, value }
        }
        "perft" => {
            let depth = args.first().and_then(|v| v.parse::<usize>().ok()).unwrap_or(1);
            UciCommand::Perft(depth)
        }
        "d" => UciCommand::Display,
        "debug" => UciCommand::Debug,
        "stop" => UciCommand::Stop,
        "ponderhit" => UciCommand::PonderHit,
        "quit" => UciCommand::Quit,
        _ => UciCommand::Unknown(line.trim().to_string()),
    };
    Some(cmd)
}

fn parse_position(args: &[&str]) -> Option<UciCommand> {
    let moves_at = args.iter().position(|&t| t == "moves");
    let (setup, moves) = match moves_at {
        Some(idx) => (&args[..idx], &args[idx + 1..]),
        None => (args, &[][..]),
    };
    let source = match setup.split_first() {
        Some((&"startpos", _)) => PositionSource::StartPos,
        Some((&"fen", fen)) if !fen.is_empty() => PositionSource::Fen(fen.join(" ")),
        _ => {
            log::warn!("position command without start position: {args:?}");
            return None;
        }
    };
    Some(UciCommand::Position {
        source,
        moves: moves.iter().map(|m| (*m).to_string()).collect(),
    })
}

/// Clock values may arrive negative from some GUIs; treat them as zero.
fn parse_ms(token: Option<&&str>, key: &str) -> Option<u64> {
    let raw = token?;
    match raw.parse::<i64>() {
        Ok(v) => Some(v.max(0) as u64),
        Err(_) => {
            log::warn!("ignoring malformed go {key} value '{raw}'");
            None
        }
    }
}

/// Parse `go` arguments. Malformed values are skipped with a warning.
#[must_use]
pub fn parse_go(args: &[&str]) -> GoParams {
    let mut params = GoParams::default();
    let (mut wtime, mut btime, mut winc, mut binc) = (None, None, None, None);
    let mut movestogo = None;
    let mut movetime = None;

    let mut i = 0;
    while i < args.len() {
        let key = args[i];
        let value = args.get(i + 1);
        let mut consumed = 2;
        match key {
            "wtime" => wtime = parse_ms(value, key),
            "btime" => btime = parse_ms(value, key),
            "winc" => winc = parse_ms(value, key),
            "binc" => binc = parse_ms(value, key),
            "movestogo" => movestogo = parse_ms(value, key),
            "movetime" => movetime = parse_ms(value, key),
            "depth" => params.depth = parse_ms(value, key).map(|d| d.min(u64::from(u32::MAX)) as u32),
            "nodes" => params.nodes = parse_ms(value, key),
            "infinite" => {
                params.infinite = true;
                consumed = 1;
            }
            "ponder" => {
                params.ponder = true;
                consumed = 1;
            }
            _ => {
                log::warn!("ignoring unknown go token '{key}'");
                consumed = 1;
            }
        }
        i += consumed;
    }

    params.time = if let Some(time_ms) = movetime {
        TimeControl::MoveTime { time_ms }
    } else if wtime.is_some() || btime.is_some() {
        TimeControl::Clock {
            wtime_ms: wtime.unwrap_or(0),
            btime_ms: btime.unwrap_or(0),
            winc_ms: winc.unwrap_or(0),
            binc_ms: binc.unwrap_or(0),
            movestogo,
        }
    } else {
        TimeControl::Infinite
    };
    params
}

/// Split `name <words..> [value <words..>]`; names may contain spaces.
#[must_use]
pub fn parse_setoption(args: &[&str]) -> Option<(String, Option<String>)> {
    let mut name_parts: Vec<&str> = Vec::new();
    let mut value_parts: Vec<&str> = Vec::new();
    let mut in_value = None;

    for &part in args {
        match part {
            "name" if in_value.is_none() => in_value = Some(false),
            "value" if in_value == Some(false) => in_value = Some(true),
            _ => match in_value {
                Some(false) => name_parts.push(part),
                Some(true) => value_parts.push(part),
                None => {}
            },
        }
    }

    if name_parts.is_empty() {
        return None;
    }
    let value = (!value_parts.is_empty()).then(|| value_parts.join(" "));
    Some((name_parts.join(" "), value))
}
