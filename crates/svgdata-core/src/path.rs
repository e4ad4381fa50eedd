// Path data (`d` attribute) tokenizer, parser and serializer.
//
// Parsing runs in two stages: tokens are grouped into commands with exactly
// `arity` parameters, then the commands are replayed against a cursor to
// split them into subpaths and resolve absolute start/end points.

use regex::Regex;
use serde::{Serialize, Serializer};
use std::fmt::{self, Write as _};
use std::str::FromStr;
use std::sync::OnceLock;

use crate::model::Point;
use crate::serde_f64::{self, fmt_f64};
use crate::units::NUMBER_PATTERN;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PathError {
    #[error("unknown command in path data: {0:?}")]
    UnknownCommand(char),

    #[error("path command {command} needs {expected} parameters, found {found}")]
    InsufficientParameters {
        command: char,
        expected: usize,
        found: usize,
    },

    #[error("path command {command} takes {expected} parameters, got {found}")]
    WrongParameterCount {
        command: char,
        expected: usize,
        found: usize,
    },

    #[error("unexpected number {value} after path command {command}")]
    UnexpectedNumber { command: char, value: f64 },

    #[error("invalid number in {0:?}")]
    InvalidNumber(String),

    #[error("odd number of coordinates in point list ({0})")]
    OddPointCount(usize),
}

pub type PathResult<T> = Result<T, PathError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    MoveTo,
    ClosePath,
    LineTo,
    HorizontalLineTo,
    VerticalLineTo,
    CurveTo,
    SmoothCurveTo,
    QuadTo,
    SmoothQuadTo,
    ArcTo,
}

impl CommandKind {
    pub fn arity(self) -> usize {
        match self {
            CommandKind::MoveTo => 2,
            CommandKind::ClosePath => 0,
            CommandKind::LineTo => 2,
            CommandKind::HorizontalLineTo => 1,
            CommandKind::VerticalLineTo => 1,
            CommandKind::CurveTo => 6,
            CommandKind::SmoothCurveTo => 4,
            CommandKind::QuadTo => 4,
            CommandKind::SmoothQuadTo => 2,
            CommandKind::ArcTo => 7,
        }
    }

    /// Index of the end point's x coordinate for commands that end on an
    /// explicit `(x, y)` pair.
    fn end_point_index(self) -> Option<usize> {
        match self {
            CommandKind::MoveTo | CommandKind::LineTo | CommandKind::SmoothQuadTo => Some(0),
            CommandKind::SmoothCurveTo | CommandKind::QuadTo => Some(2),
            CommandKind::CurveTo => Some(4),
            CommandKind::ArcTo => Some(5),
            CommandKind::ClosePath
            | CommandKind::HorizontalLineTo
            | CommandKind::VerticalLineTo => None,
        }
    }
}

/// A command letter: its kind plus absolute (upper case) or relative (lower
/// case) interpretation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Command {
    pub kind: CommandKind,
    pub relative: bool,
}

impl Command {
    pub const MOVE_TO: Command = Command::absolute(CommandKind::MoveTo);
    pub const LINE_TO: Command = Command::absolute(CommandKind::LineTo);
    pub const CLOSE_PATH: Command = Command::absolute(CommandKind::ClosePath);

    pub const fn absolute(kind: CommandKind) -> Self {
        Self {
            kind,
            relative: false,
        }
    }

    pub const fn relative(kind: CommandKind) -> Self {
        Self {
            kind,
            relative: true,
        }
    }

    pub fn from_letter(letter: char) -> Option<Self> {
        let kind = match letter.to_ascii_uppercase() {
            'M' => CommandKind::MoveTo,
            'Z' => CommandKind::ClosePath,
            'L' => CommandKind::LineTo,
            'H' => CommandKind::HorizontalLineTo,
            'V' => CommandKind::VerticalLineTo,
            'C' => CommandKind::CurveTo,
            'S' => CommandKind::SmoothCurveTo,
            'Q' => CommandKind::QuadTo,
            'T' => CommandKind::SmoothQuadTo,
            'A' => CommandKind::ArcTo,
            _ => return None,
        };
        Some(Self {
            kind,
            relative: letter.is_ascii_lowercase(),
        })
    }

    pub fn letter(self) -> char {
        let upper = match self.kind {
            CommandKind::MoveTo => 'M',
            CommandKind::ClosePath => 'Z',
            CommandKind::LineTo => 'L',
            CommandKind::HorizontalLineTo => 'H',
            CommandKind::VerticalLineTo => 'V',
            CommandKind::CurveTo => 'C',
            CommandKind::SmoothCurveTo => 'S',
            CommandKind::QuadTo => 'Q',
            CommandKind::SmoothQuadTo => 'T',
            CommandKind::ArcTo => 'A',
        };
        if self.relative {
            upper.to_ascii_lowercase()
        } else {
            upper
        }
    }

    pub fn arity(self) -> usize {
        self.kind.arity()
    }

    pub fn is_move(self) -> bool {
        self.kind == CommandKind::MoveTo
    }

    pub fn is_close(self) -> bool {
        self.kind == CommandKind::ClosePath
    }

    /// The command implied by surplus parameters: extra pairs after a move
    /// are line segments.
    fn repeated(self) -> Self {
        match self.kind {
            CommandKind::MoveTo => Self {
                kind: CommandKind::LineTo,
                relative: self.relative,
            },
            _ => self,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char(self.letter())
    }
}

impl Serialize for Command {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_char(self.letter())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathCommand {
    command: Command,
    #[serde(serialize_with = "serde_f64::ser_vec_f64_compact")]
    params: Vec<f64>,
    start: Point,
    end: Point,
}

impl PathCommand {
    /// Build a command; `params` must hold exactly `command.arity()` values.
    /// Start and end points are resolved once the command is placed in a
    /// [`PathData`].
    pub fn new(command: Command, params: Vec<f64>) -> PathResult<Self> {
        if params.len() != command.arity() {
            return Err(PathError::WrongParameterCount {
                command: command.letter(),
                expected: command.arity(),
                found: params.len(),
            });
        }
        Ok(Self::unresolved(command, params))
    }

    fn unresolved(command: Command, params: Vec<f64>) -> Self {
        Self {
            command,
            params,
            start: Point::default(),
            end: Point::default(),
        }
    }

    pub fn command(&self) -> Command {
        self.command
    }

    pub fn params(&self) -> &[f64] {
        &self.params
    }

    /// Absolute cursor position before the command.
    pub fn start(&self) -> Point {
        self.start
    }

    /// Absolute cursor position after the command.
    pub fn end(&self) -> Point {
        self.end
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SubPath {
    commands: Vec<PathCommand>,
    start: Point,
    end: Point,
}

impl SubPath {
    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    pub fn start(&self) -> Point {
        self.start
    }

    pub fn end(&self) -> Point {
        self.end
    }

    pub fn is_closed(&self) -> bool {
        self.commands.last().is_some_and(|c| c.command.is_close())
    }

    /// Record `cmd`, moving `cursor` to where the command ends.
    fn apply(&mut self, cursor: &mut Point, mut cmd: PathCommand) {
        cmd.start = *cursor;
        let rel = cmd.command.relative;
        let p = &cmd.params;

        let next = match cmd.command.kind {
            CommandKind::ClosePath => self.start,
            CommandKind::HorizontalLineTo => Point {
                x: if rel { cursor.x + p[0] } else { p[0] },
                y: cursor.y,
            },
            CommandKind::VerticalLineTo => Point {
                x: cursor.x,
                y: if rel { cursor.y + p[0] } else { p[0] },
            },
            kind => {
                let i = kind.end_point_index().unwrap_or(0);
                if rel {
                    Point::new(cursor.x + p[i], cursor.y + p[i + 1])
                } else {
                    Point::new(p[i], p[i + 1])
                }
            }
        };

        if cmd.command.is_move() {
            self.start = next;
        }
        *cursor = next;
        cmd.end = next;
        self.end = next;
        self.commands.push(cmd);
    }
}

/// Parsed path data: an ordered list of subpaths, each beginning with a move.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PathData {
    subpaths: Vec<SubPath>,
}

impl PathData {
    pub fn parse(d: &str) -> PathResult<Self> {
        let tokens = tokenize(d)?;
        let commands = group_commands(tokens)?;
        Ok(Self::from_commands(commands))
    }

    /// Split `commands` into subpaths and resolve their coordinates, the same
    /// way parsed input is handled.
    pub fn from_commands(commands: impl IntoIterator<Item = PathCommand>) -> Self {
        let mut resolver = Resolver::default();
        for cmd in commands {
            resolver.push(cmd);
        }
        Self {
            subpaths: resolver.finish(),
        }
    }

    pub fn subpaths(&self) -> &[SubPath] {
        &self.subpaths
    }

    pub fn is_empty(&self) -> bool {
        self.subpaths.is_empty()
    }

    pub fn commands(&self) -> impl Iterator<Item = &PathCommand> {
        self.subpaths.iter().flat_map(|s| s.commands.iter())
    }
}

impl FromStr for PathData {
    type Err = PathError;

    fn from_str(s: &str) -> PathResult<Self> {
        Self::parse(s)
    }
}

/// Serialized form: each command letter directly followed by its
/// space-separated parameters, no separators between commands.
impl fmt::Display for PathData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for cmd in self.commands() {
            f.write_char(cmd.command.letter())?;
            for (i, p) in cmd.params.iter().enumerate() {
                if i > 0 {
                    f.write_char(' ')?;
                }
                f.write_str(&fmt_f64(*p))?;
            }
        }
        Ok(())
    }
}

#[derive(Default)]
struct Resolver {
    cursor: Point,
    finished: Vec<SubPath>,
    current: Option<SubPath>,
}

impl Resolver {
    fn push(&mut self, cmd: PathCommand) {
        let mut sub = match self.current.take() {
            Some(sub) if !cmd.command.is_move() => sub,
            previous => {
                self.finished.extend(previous);
                let mut sub = SubPath::default();
                if !cmd.command.is_move() {
                    let implicit = PathCommand::unresolved(
                        Command::MOVE_TO,
                        vec![self.cursor.x, self.cursor.y],
                    );
                    sub.apply(&mut self.cursor, implicit);
                }
                sub
            }
        };

        let closes = cmd.command.is_close();
        sub.apply(&mut self.cursor, cmd);
        if closes {
            self.finished.push(sub);
        } else {
            self.current = Some(sub);
        }
    }

    fn finish(mut self) -> Vec<SubPath> {
        self.finished.extend(self.current.take());
        self.finished
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Command(Command),
    Number(f64),
    End,
}

fn number_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(&format!("^{NUMBER_PATTERN}")).expect("valid number regex"))
}

fn trim_separators(s: &str) -> &str {
    s.trim_start_matches([' ', '\t', '\r', '\n', ','])
}

/// Split a leading number off `s`, if there is one.
fn take_number(s: &str) -> PathResult<Option<(f64, &str)>> {
    let Some(m) = number_regex().find(s) else {
        return Ok(None);
    };
    let value = m
        .as_str()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| PathError::InvalidNumber(m.as_str().to_string()))?;
    Ok(Some((value, &s[m.end()..])))
}

fn tokenize(d: &str) -> PathResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut rest = d;
    loop {
        rest = trim_separators(rest);
        let Some(c) = rest.chars().next() else {
            break;
        };

        if let Some((value, tail)) = take_number(rest)? {
            tokens.push(Token::Number(value));
            rest = tail;
        } else {
            let command = Command::from_letter(c).ok_or(PathError::UnknownCommand(c))?;
            tokens.push(Token::Command(command));
            rest = &rest[c.len_utf8()..];
        }
    }
    tokens.push(Token::End);
    Ok(tokens)
}

/// Group tokens into commands, expanding implicit repetition.
fn group_commands(tokens: Vec<Token>) -> PathResult<Vec<PathCommand>> {
    let mut out = Vec::new();
    let mut tokens = tokens.into_iter().peekable();
    // Bare leading numbers are line segments.
    let mut current = Command::LINE_TO;

    loop {
        match tokens.peek().copied() {
            None | Some(Token::End) => break,
            Some(Token::Command(c)) => {
                current = c;
                tokens.next();
            }
            Some(Token::Number(value)) => {
                if current.arity() == 0 {
                    return Err(PathError::UnexpectedNumber {
                        command: current.letter(),
                        value,
                    });
                }
            }
        }

        let arity = current.arity();
        let mut params = Vec::with_capacity(arity);
        while params.len() < arity {
            match tokens.next_if(|t| matches!(t, Token::Number(_))) {
                Some(Token::Number(n)) => params.push(n),
                _ => {
                    return Err(PathError::InsufficientParameters {
                        command: current.letter(),
                        expected: arity,
                        found: params.len(),
                    });
                }
            }
        }

        out.push(PathCommand::unresolved(current, params));
        current = current.repeated();
    }

    Ok(out)
}

/// Parse a `points` list (polyline/polygon): numbers separated by whitespace
/// and/or commas, taken pairwise.
pub fn parse_points(s: &str) -> PathResult<Vec<Point>> {
    let mut coords = Vec::new();
    let mut rest = trim_separators(s);
    while !rest.is_empty() {
        let Some((value, tail)) = take_number(rest)? else {
            return Err(PathError::InvalidNumber(rest.to_string()));
        };
        coords.push(value);
        rest = trim_separators(tail);
    }

    if coords.len() % 2 != 0 {
        return Err(PathError::OddPointCount(coords.len()));
    }
    Ok(coords
        .chunks_exact(2)
        .map(|pair| Point::new(pair[0], pair[1]))
        .collect())
}

pub fn format_points(points: &[Point]) -> String {
    let mut out = String::new();
    for (i, p) in points.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(&fmt_f64(p.x));
        out.push(',');
        out.push_str(&fmt_f64(p.y));
    }
    out
}
