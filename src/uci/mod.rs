//! Universal Chess Interface (UCI) front end.
//!
//! A thin line protocol over [`EngineController`]: commands are read from
//! stdin, replies go to stdout, diagnostics go through `log` to stderr.

use std::fmt;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;

use crate::board::{Board, FenError, MoveParseError};
use crate::engine::{EngineConfig, EngineController};
use crate::tt::TtError;

pub mod command;
pub mod options;
pub mod report;

use command::{parse_uci_command, PositionSource, UciCommand};

pub const ENGINE_NAME: &str = "Supranova";
pub const ENGINE_AUTHOR: &str = "the Supranova developers";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UciError {
    InvalidFen(FenError),
    InvalidMove {
        notation: String,
        error: MoveParseError,
    },
    UnknownOption(String),
    InvalidValue {
        name: String,
        value: String,
    },
    Hash(TtError),
}

impl fmt::Display for UciError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UciError::InvalidFen(e) => write!(f, "invalid FEN: {e}"),
            UciError::InvalidMove { notation, error } => {
                write!(f, "invalid move '{notation}': {error}")
            }
            UciError::UnknownOption(name) => write!(f, "unknown option '{name}'"),
            UciError::InvalidValue { name, value } => {
                write!(f, "invalid value '{value}' for option '{name}'")
            }
            UciError::Hash(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for UciError {}

impl From<FenError> for UciError {
    fn from(e: FenError) -> Self {
        UciError::InvalidFen(e)
    }
}

impl From<TtError> for UciError {
    fn from(e: TtError) -> Self {
        UciError::Hash(e)
    }
}

/// Build the position a `position` command describes. Nothing is
/// modified on failure.
pub fn build_position(source: &PositionSource, moves: &[String]) -> Result<Board, UciError> {
    let mut board = match source {
        PositionSource::StartPos => Board::new(),
        PositionSource::Fen(fen) => Board::from_fen(fen)?,
    };
    for notation in moves {
        let mv = board.parse_move(notation).map_err(|error| UciError::InvalidMove {
            notation: notation.clone(),
            error,
        })?;
        board.make_move(mv);
    }
    Ok(board)
}

/// Output shared with the search coordinator, which prints `info` and
/// `bestmove` lines from its own thread.
type SharedOutput<W> = Arc<Mutex<W>>;

fn send<W: Write>(out: &Mutex<W>, line: &str) {
    let mut out = out.lock();
    if let Err(e) = writeln!(out, "{line}").and_then(|()| out.flush()) {
        log::warn!("failed to write protocol output: {e}");
    }
}

/// One protocol session bound to an engine and an output sink.
pub struct UciSession<W: Write + Send + 'static> {
    engine: EngineController,
    out: SharedOutput<W>,
}

impl<W: Write + Send + 'static> UciSession<W> {
    pub fn new(mut engine: EngineController, out: W) -> Self {
        let out = Arc::new(Mutex::new(out));
        let info_out = Arc::clone(&out);
        engine.set_info_callback(Some(Arc::new(move |info| {
            send(&info_out, &report::info_line(info));
        })));
        UciSession { engine, out }
    }

    #[must_use]
    pub fn engine(&self) -> &EngineController {
        &self.engine
    }

    #[must_use]
    pub fn output(&self) -> &SharedOutput<W> {
        &self.out
    }

    fn reply(&self, line: &str) {
        send(&self.out, line);
    }

    /// Handle one input line. Returns `false` on `quit`.
    pub fn handle_line(&mut self, line: &str) -> bool {
        let Some(cmd) = parse_uci_command(line) else {
            return true;
        };
        match cmd {
            UciCommand::Uci => {
                self.reply(&format!("id name {ENGINE_NAME} {}", env!("CARGO_PKG_VERSION")));
                self.reply(&format!("id author {ENGINE_AUTHOR}"));
                self.reply(&options::option_lines(&EngineConfig::default()));
                self.reply("uciok");
            }
            UciCommand::IsReady => self.reply("readyok"),
            UciCommand::UciNewGame => self.engine.new_game(),
            UciCommand::Position { source, moves } => match build_position(&source, &moves) {
                Ok(board) => self.engine.set_board(board),
                Err(e) => {
                    log::warn!("rejected position command: {e}");
                    self.reply(&format!("info string {e}"));
                }
            },
            UciCommand::Go(params) => self.go(&params),
            UciCommand::SetOption { name, value } => {
                if let Err(e) = options::apply_setoption(&mut self.engine, &name, value.as_deref()) {
                    log::warn!("setoption failed: {e}");
                    self.reply(&format!("info string {e}"));
                }
            }
            UciCommand::Perft(depth) => {
                let mut board = self.engine.board().clone();
                let start = Instant::now();
                let nodes = board.perft(depth);
                self.reply(&format!(
                    "info string perft depth {depth} nodes {nodes} time {}",
                    start.elapsed().as_millis()
                ));
            }
            UciCommand::Display => {
                self.reply(&format!("info string fen {}", self.engine.board().to_fen()));
            }
            UciCommand::Debug => {}
            UciCommand::Stop => self.engine.signal_stop(),
            UciCommand::PonderHit => self.engine.ponderhit(),
            UciCommand::Quit => {
                self.engine.stop_search();
                return false;
            }
            UciCommand::Unknown(text) => log::warn!("ignoring unknown command '{text}'"),
        }
        true
    }

    fn go(&mut self, params: &crate::engine::GoParams) {
        let out = Arc::clone(&self.out);
        let started = self.engine.start_search(params, move |result| {
            send(&out, &report::bestmove_line(&result));
        });
        if let Err(e) = started {
            log::warn!("could not start background search: {e}; searching inline");
            let result = self.engine.search_blocking(params);
            self.reply(&report::bestmove_line(&result));
        }
    }

    /// Wait for the current search, if any, to deliver its result.
    pub fn finish(&mut self) {
        self.engine.stop_search();
    }
}

/// Run the protocol on stdin/stdout until `quit` or end of input.
pub fn run_uci_loop() -> io::Result<()> {
    let engine = EngineController::try_new(EngineConfig::default())
        .map_err(|e| io::Error::new(io::ErrorKind::OutOfMemory, e))?;
    let mut session = UciSession::new(engine, io::stdout());

    for line in io::stdin().lock().lines() {
        if !session.handle_line(&line?) {
            return Ok(());
        }
    }
    session.finish();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_with_moves() {
        let moves = vec!["e2e4".to_string(), "e7e5".to_string()];
        let board = build_position(&PositionSource::StartPos, &moves).unwrap();
        assert_eq!(
            board.to_fen(),
            "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq e6 0 2"
        );
    }

    #[test]
    fn illegal_move_is_reported() {
        let moves = vec!["e2e4".to_string(), "e2e4".to_string()];
        let err = build_position(&PositionSource::StartPos, &moves).unwrap_err();
        assert!(matches!(err, UciError::InvalidMove { ref notation, .. } if notation == "e2e4"));
    }

    #[test]
    fn bad_fen_is_reported() {
        let err = build_position(&PositionSource::Fen("not a fen".into()), &[]).unwrap_err();
        assert!(matches!(err, UciError::InvalidFen(_)));
    }
}
