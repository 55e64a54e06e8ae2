//! External UCI engine as a blocking searcher.
//!
//! Architecture:
//! - Engine I/O runs on OS threads (reader/writer) connected by channels
//! - A search holds the process lock, sends the position and waits on the
//!   event channel until `bestmove` arrives
//! - Parsed analysis of the last search is kept for the UI

use std::collections::{HashMap, HashSet, VecDeque};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::Mutex;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use shakmaty::fen::Fen;
use shakmaty::uci::UciMove;
use shakmaty::{Chess, EnPassantMode, Move, Position};
use thiserror::Error;

use crate::domain::ai_config::SearchParams;
use crate::domain::facade::FacadeError;
use crate::domain::uci::{UciCommand, UciInfo, UciOutput, UciOutputKind};
use crate::engine::Searcher;

/// How long the engine gets to answer `uci` and `isready`
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Maximum number of output lines to keep in history
const MAX_OUTPUT_LINES: usize = 200;

/// Principal variations requested when the move may be randomised
const RANDOM_MULTI_PV: u32 = 4;

#[derive(Error, Debug)]
pub enum UciError {
    #[error("failed to start engine {path:?}: {source}")]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to open engine {0}")]
    Pipe(&'static str),

    #[error("engine exited")]
    Exited,

    #[error("engine i/o error: {0}")]
    Io(String),

    #[error("engine did not answer {0} in time")]
    Timeout(&'static str),

    #[error("engine reported no best move")]
    NoBestMove,

    #[error("engine move {0:?} is not playable here")]
    BadMove(String),
}

/// Messages sent from the engine reader thread
#[derive(Debug)]
enum EngineEvent {
    /// A line of output from the engine
    Output(String),
    /// Engine process exited
    Exited,
    /// Error occurred
    Error(String),
}

/// The running engine process and its channels
struct EngineProcess {
    child: Child,
    commands: Sender<String>,
    events: Receiver<EngineEvent>,
    /// Option names advertised during the handshake
    options: HashSet<String>,
    /// Recent output lines (for diagnostics)
    output_lines: VecDeque<UciOutput>,
}

impl EngineProcess {
    fn spawn(path: &Path, args: &[String]) -> Result<Self, UciError> {
        let mut child = Command::new(path)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| UciError::Spawn {
                path: path.to_path_buf(),
                source,
            })?;

        let stdin = child.stdin.take().ok_or(UciError::Pipe("stdin"))?;
        let stdout = child.stdout.take().ok_or(UciError::Pipe("stdout"))?;

        let (event_tx, event_rx) = mpsc::channel::<EngineEvent>();
        let (cmd_tx, cmd_rx) = mpsc::channel::<String>();

        // Reader thread (OS thread for blocking I/O)
        thread::spawn(move || {
            let reader = BufReader::new(stdout);
            for line in reader.lines() {
                match line {
                    Ok(text) => {
                        if event_tx.send(EngineEvent::Output(text)).is_err() {
                            return;
                        }
                    }
                    Err(e) => {
                        let _ = event_tx.send(EngineEvent::Error(e.to_string()));
                        break;
                    }
                }
            }
            let _ = event_tx.send(EngineEvent::Exited);
        });

        // Writer thread
        thread::spawn(move || {
            let mut writer = stdin;
            while let Ok(cmd) = cmd_rx.recv() {
                if writeln!(writer, "{}", cmd).is_err() || writer.flush().is_err() {
                    break;
                }
            }
        });

        Ok(Self {
            child,
            commands: cmd_tx,
            events: event_rx,
            options: HashSet::new(),
            output_lines: VecDeque::new(),
        })
    }

    fn send(&self, cmd: UciCommand) -> Result<(), UciError> {
        let line = cmd.to_uci_string();
        tracing::debug!(target: "uci", "> {}", line);
        self.commands.send(line).map_err(|_| UciError::Exited)
    }

    /// Wait for the next line of output, up to `deadline` when one is given
    fn next_output(
        &mut self,
        deadline: Option<Instant>,
        waiting_for: &'static str,
    ) -> Result<UciOutputKind, UciError> {
        let event = match deadline {
            Some(deadline) => {
                let remaining = deadline.saturating_duration_since(Instant::now());
                match self.events.recv_timeout(remaining) {
                    Ok(event) => event,
                    Err(RecvTimeoutError::Timeout) => return Err(UciError::Timeout(waiting_for)),
                    Err(RecvTimeoutError::Disconnected) => return Err(UciError::Exited),
                }
            }
            None => self.events.recv().map_err(|_| UciError::Exited)?,
        };
        match event {
            EngineEvent::Output(line) => {
                tracing::debug!(target: "uci", "< {}", line);
                let output = UciOutput::new(line);
                let kind = output.kind.clone();
                self.output_lines.push_back(output);
                while self.output_lines.len() > MAX_OUTPUT_LINES {
                    self.output_lines.pop_front();
                }
                Ok(kind)
            }
            EngineEvent::Exited => Err(UciError::Exited),
            EngineEvent::Error(e) => Err(UciError::Io(e)),
        }
    }

    /// `uci` ... `uciok`, collecting the engine name and its options
    fn handshake(&mut self) -> Result<Option<String>, UciError> {
        self.send(UciCommand::Uci)?;
        let deadline = Some(Instant::now() + HANDSHAKE_TIMEOUT);
        let mut name = None;
        loop {
            match self.next_output(deadline, "uci")? {
                UciOutputKind::UciOk => break,
                UciOutputKind::Id(id) => {
                    if let Some(n) = id.strip_prefix("name ") {
                        name = Some(n.trim().to_string());
                    }
                }
                UciOutputKind::Option(option) => {
                    self.options.insert(option);
                }
                _ => {}
            }
        }
        self.sync()?;
        Ok(name)
    }

    /// `isready` ... `readyok`
    fn sync(&mut self) -> Result<(), UciError> {
        self.send(UciCommand::IsReady)?;
        let deadline = Some(Instant::now() + HANDSHAKE_TIMEOUT);
        while self.next_output(deadline, "isready")? != UciOutputKind::ReadyOk {}
        Ok(())
    }

    /// The last `count` raw lines received
    fn recent_output(&self, count: usize) -> Vec<&str> {
        let skip = self.output_lines.len().saturating_sub(count);
        self.output_lines
            .iter()
            .skip(skip)
            .map(|o| o.raw.as_str())
            .collect()
    }

    fn set_option_if_supported(&self, name: &str, value: impl ToString) -> Result<(), UciError> {
        if self.options.contains(name) {
            self.send(UciCommand::set_option(name, value))?;
        }
        Ok(())
    }

    /// Configure, search, and collect analysis until `bestmove`.
    ///
    /// The search runs to completion. Its `bestmove` is always consumed here,
    /// so no reply can leak into the next search.
    fn search(&mut self, fen: String, params: &SearchParams) -> Result<(String, Vec<UciInfo>), UciError> {
        let multi_pv = if params.randomness > 0 { RANDOM_MULTI_PV } else { 1 };
        self.set_option_if_supported("Hash", params.memory_mb)?;
        self.set_option_if_supported("MultiPV", multi_pv)?;
        self.set_option_if_supported("QuiescenceDepth", params.quiescence_depth)?;
        self.set_option_if_supported("CheckExtension", params.check_extension)?;
        self.sync()?;

        self.send(UciCommand::PositionFen(fen))?;
        self.send(UciCommand::GoDepth(params.total_depth()))?;

        let mut lines: HashMap<u32, UciInfo> = HashMap::new();
        loop {
            match self.next_output(None, "go")? {
                UciOutputKind::Info(info) if info.has_analysis() => {
                    lines.insert(info.multipv.unwrap_or(1), info);
                }
                UciOutputKind::BestMove(mv) => return Ok((mv, final_lines(lines))),
                _ => {}
            }
        }
    }
}

impl Drop for EngineProcess {
    fn drop(&mut self) {
        let _ = self.send(UciCommand::Quit);
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Deepest lines only, best first
fn final_lines(lines: HashMap<u32, UciInfo>) -> Vec<UciInfo> {
    let max_depth = lines.values().filter_map(|l| l.depth).max();
    let mut result: Vec<UciInfo> = lines
        .into_values()
        .filter(|l| l.depth == max_depth)
        .collect();
    result.sort_by_key(|l| l.multipv.unwrap_or(1));
    result
}

/// Pick among lines within `randomness` centipawns of the best one.
///
/// Falls back to the engine's best move when there is nothing to choose from.
pub(crate) fn pick_candidate<R: Rng>(
    lines: &[UciInfo],
    bestmove: &str,
    randomness: u32,
    rng: &mut R,
) -> String {
    if randomness == 0 {
        return bestmove.to_string();
    }
    let scored: Vec<(i32, &str)> = lines
        .iter()
        .filter_map(|l| Some((l.score?.as_centipawns(), l.best_move()?)))
        .collect();
    let Some(best) = scored.iter().map(|(cp, _)| *cp).max() else {
        return bestmove.to_string();
    };
    let window = randomness as i32;
    let candidates: Vec<&str> = scored
        .iter()
        .filter(|(cp, _)| best - *cp <= window)
        .map(|(_, mv)| *mv)
        .collect();
    candidates
        .choose(rng)
        .map(|mv| mv.to_string())
        .unwrap_or_else(|| bestmove.to_string())
}

/// A UCI engine process used as the AI
pub struct UciSearcher {
    name: String,
    process: Mutex<EngineProcess>,
    rng: Mutex<StdRng>,
    last_analysis: Mutex<Vec<UciInfo>>,
}

impl UciSearcher {
    /// Spawn the engine and complete the UCI handshake
    pub fn spawn(path: &Path, args: &[String]) -> Result<Self, UciError> {
        let mut process = EngineProcess::spawn(path, args)?;
        let name = process
            .handshake()?
            .unwrap_or_else(|| path.display().to_string());
        process.send(UciCommand::UciNewGame)?;
        tracing::info!(engine = %name, options = process.options.len(), "engine ready");

        Ok(Self {
            name,
            process: Mutex::new(process),
            rng: Mutex::new(StdRng::from_entropy()),
            last_analysis: Mutex::new(Vec::new()),
        })
    }

    fn search(&self, position: &Chess, params: &SearchParams) -> Result<Move, UciError> {
        let fen = Fen::from_position(position, EnPassantMode::Legal).to_string();
        // held until the analysis is stored
        let mut process = self.process.lock().unwrap_or_else(|e| e.into_inner());
        let (bestmove, lines) = process.search(fen, params).inspect_err(|e| {
            tracing::warn!(error = %e, recent = ?process.recent_output(5), "engine search failed");
        })?;
        if bestmove == "(none)" || bestmove == "0000" {
            return Err(UciError::NoBestMove);
        }

        let chosen = {
            let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
            pick_candidate(&lines, &bestmove, params.randomness, &mut *rng)
        };
        if chosen != bestmove {
            tracing::debug!(%bestmove, %chosen, "randomised engine move");
        }
        *self.last_analysis.lock().unwrap_or_else(|e| e.into_inner()) = lines;
        drop(process);

        chosen
            .parse::<UciMove>()
            .ok()
            .and_then(|uci| uci.to_move(position).ok())
            .ok_or(UciError::BadMove(chosen))
    }
}

impl Searcher for UciSearcher {
    fn name(&self) -> &str {
        &self.name
    }

    fn choose_move(&self, position: &Chess, params: &SearchParams) -> Result<Move, FacadeError> {
        self.search(position, params)
            .map_err(|e| FacadeError::Search(e.to_string()))
    }

    fn last_analysis(&self) -> Vec<UciInfo> {
        self.last_analysis
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_default()
    }
}
