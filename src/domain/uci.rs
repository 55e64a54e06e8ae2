//! UCI (Universal Chess Interface) protocol types and utilities.
//!
//! This module only builds command lines and parses engine output. Process
//! handling lives in the engine layer.

/// UCI commands that can be sent to an engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UciCommand {
    /// Initialize UCI mode
    Uci,
    /// Check if engine is ready
    IsReady,
    /// Set a new game
    UciNewGame,
    /// Set an engine option
    SetOption { name: String, value: String },
    /// Set the position to search from
    PositionFen(String),
    /// Search to a fixed depth
    GoDepth(u32),
    /// Quit the engine
    Quit,
}

impl UciCommand {
    pub fn set_option(name: &str, value: impl ToString) -> Self {
        UciCommand::SetOption {
            name: name.to_string(),
            value: value.to_string(),
        }
    }

    /// Convert command to UCI protocol string
    pub fn to_uci_string(&self) -> String {
        match self {
            UciCommand::Uci => "uci".to_string(),
            UciCommand::IsReady => "isready".to_string(),
            UciCommand::UciNewGame => "ucinewgame".to_string(),
            UciCommand::SetOption { name, value } => {
                format!("setoption name {} value {}", name, value)
            }
            UciCommand::PositionFen(fen) => format!("position fen {}", fen),
            UciCommand::GoDepth(d) => format!("go depth {}", d),
            UciCommand::Quit => "quit".to_string(),
        }
    }
}

/// Engine output line, categorised
#[derive(Debug, Clone, PartialEq)]
pub enum UciOutputKind {
    /// "uciok" - engine is ready for UCI
    UciOk,
    /// "readyok" - engine is ready
    ReadyOk,
    /// "info ..." - analysis information
    Info(UciInfo),
    /// "bestmove <move> [ponder <move>]" - search result, ponder move dropped
    BestMove(String),
    /// "id name ..." / "id author ..."
    Id(String),
    /// "option name <name> type ..." - only the name is kept
    Option(String),
    /// Unknown/other output
    Other,
}

impl UciOutputKind {
    /// Parse a raw UCI output line into a categorized type
    pub fn parse(line: &str) -> Self {
        let line = line.trim();

        if line == "uciok" {
            UciOutputKind::UciOk
        } else if line == "readyok" {
            UciOutputKind::ReadyOk
        } else if let Some(rest) = line.strip_prefix("info ") {
            UciOutputKind::Info(UciInfo::parse(rest))
        } else if let Some(rest) = line.strip_prefix("bestmove ") {
            let mv = rest.split_whitespace().next().unwrap_or_default();
            UciOutputKind::BestMove(mv.to_string())
        } else if let Some(rest) = line.strip_prefix("id ") {
            UciOutputKind::Id(rest.to_string())
        } else if let Some(rest) = line.strip_prefix("option ") {
            UciOutputKind::Option(parse_option_name(rest))
        } else {
            UciOutputKind::Other
        }
    }
}

/// Option names may contain spaces: everything between `name` and `type`.
fn parse_option_name(rest: &str) -> String {
    let rest = rest.strip_prefix("name ").unwrap_or(rest);
    let end = rest.find(" type ").unwrap_or(rest.len());
    rest[..end].trim().to_string()
}

/// A UCI output line as received, plus its parsed form
#[derive(Debug, Clone)]
pub struct UciOutput {
    /// The raw line from the engine
    pub raw: String,
    pub kind: UciOutputKind,
}

impl UciOutput {
    pub fn new(line: String) -> Self {
        let kind = UciOutputKind::parse(&line);
        Self { raw: line, kind }
    }
}

/// Engine evaluation score
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Score {
    /// Centipawn score from the side to move
    Centipawns(i32),
    /// Mate in N moves (negative = side to move gets mated)
    Mate(i32),
}

impl Score {
    /// Format score for display (e.g., "+0.35" or "M3" or "-M2")
    pub fn display(&self) -> String {
        match self {
            Score::Centipawns(cp) => format!("{:+.2}", *cp as f64 / 100.0),
            Score::Mate(moves) if *moves > 0 => format!("M{}", moves),
            Score::Mate(moves) => format!("-M{}", moves.abs()),
        }
    }

    /// Numeric value for comparison (centipawns, or large value for mate)
    pub fn as_centipawns(&self) -> i32 {
        match self {
            Score::Centipawns(cp) => *cp,
            Score::Mate(moves) if *moves > 0 => 10000 - *moves,
            Score::Mate(moves) => -10000 - *moves,
        }
    }
}

/// Parsed UCI info line
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UciInfo {
    pub depth: Option<u32>,
    pub seldepth: Option<u32>,
    /// Multi-PV line number (1-indexed)
    pub multipv: Option<u32>,
    pub score: Option<Score>,
    pub nodes: Option<u64>,
    pub nps: Option<u64>,
    /// Time spent in milliseconds
    pub time: Option<u64>,
    /// Principal variation as UCI moves
    pub pv: Vec<String>,
    pub hashfull: Option<u32>,
}

/// Keywords that end a `pv` token run
const INFO_KEYWORDS: &[&str] = &[
    "depth",
    "seldepth",
    "multipv",
    "score",
    "nodes",
    "nps",
    "time",
    "hashfull",
    "currmove",
    "currmovenumber",
    "tbhits",
    "string",
    "refutation",
    "currline",
];

impl UciInfo {
    /// Parse a UCI info string (the part after "info ")
    pub fn parse(info_str: &str) -> Self {
        let mut info = UciInfo::default();
        let mut tokens = info_str.split_whitespace().peekable();

        while let Some(token) = tokens.next() {
            match token {
                "depth" => info.depth = tokens.next().and_then(|t| t.parse().ok()),
                "seldepth" => info.seldepth = tokens.next().and_then(|t| t.parse().ok()),
                "multipv" => info.multipv = tokens.next().and_then(|t| t.parse().ok()),
                "nodes" => info.nodes = tokens.next().and_then(|t| t.parse().ok()),
                "nps" => info.nps = tokens.next().and_then(|t| t.parse().ok()),
                "time" => info.time = tokens.next().and_then(|t| t.parse().ok()),
                "hashfull" => info.hashfull = tokens.next().and_then(|t| t.parse().ok()),
                "score" => {
                    let kind = tokens.next();
                    let value = tokens.next().and_then(|t| t.parse::<i32>().ok());
                    info.score = match (kind, value) {
                        (Some("cp"), Some(cp)) => Some(Score::Centipawns(cp)),
                        (Some("mate"), Some(m)) => Some(Score::Mate(m)),
                        _ => info.score,
                    };
                    // "lowerbound" / "upperbound" markers carry no value
                    while tokens
                        .peek()
                        .is_some_and(|t| *t == "lowerbound" || *t == "upperbound")
                    {
                        tokens.next();
                    }
                }
                "pv" => {
                    while let Some(mv) = tokens.next_if(|t| !INFO_KEYWORDS.contains(t)) {
                        info.pv.push(mv.to_string());
                    }
                }
                // free text runs to the end of the line
                "string" => break,
                _ => {}
            }
        }

        info
    }

    /// Depth, score and a PV are all present
    pub fn has_analysis(&self) -> bool {
        self.depth.is_some() && self.score.is_some() && !self.pv.is_empty()
    }

    /// First move of the principal variation
    pub fn best_move(&self) -> Option<&str> {
        self.pv.first().map(String::as_str)
    }
}
