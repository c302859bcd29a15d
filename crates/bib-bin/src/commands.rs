//! REPL command line parsing.
//!
//! Converts a raw input line beginning with ':' into a `ParsedCommand`.
//! Parsing is pure classification; bad arguments become
//! `ParsedCommand::Invalid` carrying the usage string, which the runtime
//! prints as-is.

use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedCommand {
    New,
    Open(Option<PathBuf>),
    Save,
    SaveAs,
    Close,
    Quit,
    Copy { start: usize, end: usize },
    Cut { start: usize, end: usize },
    Paste(Option<usize>),
    Insert { offset: usize, text: String },
    Delete { start: usize, end: usize },
    Caret(usize),
    Print,
    Status,
    Help,
    Invalid { usage: &'static str },
    Unknown(String),
}

impl ParsedCommand {
    /// Stable name for logging; never includes user text.
    pub fn name(&self) -> &'static str {
        match self {
            ParsedCommand::New => "new",
            ParsedCommand::Open(_) => "open",
            ParsedCommand::Save => "save",
            ParsedCommand::SaveAs => "saveas",
            ParsedCommand::Close => "close",
            ParsedCommand::Quit => "quit",
            ParsedCommand::Copy { .. } => "copy",
            ParsedCommand::Cut { .. } => "cut",
            ParsedCommand::Paste(_) => "paste",
            ParsedCommand::Insert { .. } => "insert",
            ParsedCommand::Delete { .. } => "delete",
            ParsedCommand::Caret(_) => "caret",
            ParsedCommand::Print => "print",
            ParsedCommand::Status => "status",
            ParsedCommand::Help => "help",
            ParsedCommand::Invalid { .. } => "invalid",
            ParsedCommand::Unknown(_) => "unknown",
        }
    }
}

pub const HELP: &[(&str, &str)] = &[
    (":new", "open an empty document in the editor"),
    (":open [PATH]", "open PATH, or pick a file"),
    (":save", "save to the backing file (asks when untitled)"),
    (":saveas", "save to a newly picked file"),
    (":close", "close the editor view"),
    (":q, :quit", "quit (asks about unsaved changes)"),
    (":copy S E", "copy chars [S, E) to the clipboard"),
    (":cut S E", "cut chars [S, E) to the clipboard"),
    (":paste [OFFSET]", "paste at OFFSET or at the caret"),
    (":insert OFFSET TEXT", "insert TEXT (\\n for newline)"),
    (":delete S E", "delete chars [S, E)"),
    (":caret N", "move the caret"),
    (":print", "show the document"),
    (":status", "show document status"),
];

pub struct CommandParser;

impl CommandParser {
    pub fn parse(raw: &str) -> ParsedCommand {
        let s = raw.trim_start();
        let Some(body) = s.strip_prefix(':') else {
            return ParsedCommand::Unknown(s.trim_end().to_string());
        };
        let (name, rest) = match body.find(char::is_whitespace) {
            Some(i) => (&body[..i], &body[i..]),
            None => (body, ""),
        };
        match name {
            "new" => ParsedCommand::New,
            "open" | "e" => {
                let path = rest.trim();
                ParsedCommand::Open((!path.is_empty()).then(|| PathBuf::from(path)))
            }
            "save" | "w" => ParsedCommand::Save,
            "saveas" => ParsedCommand::SaveAs,
            "close" => ParsedCommand::Close,
            "q" | "quit" => ParsedCommand::Quit,
            "copy" => range(rest)
                .map(|(start, end)| ParsedCommand::Copy { start, end })
                .unwrap_or(ParsedCommand::Invalid {
                    usage: ":copy START END",
                }),
            "cut" => range(rest)
                .map(|(start, end)| ParsedCommand::Cut { start, end })
                .unwrap_or(ParsedCommand::Invalid {
                    usage: ":cut START END",
                }),
            "delete" => range(rest)
                .map(|(start, end)| ParsedCommand::Delete { start, end })
                .unwrap_or(ParsedCommand::Invalid {
                    usage: ":delete START END",
                }),
            "paste" => match rest.trim() {
                "" => ParsedCommand::Paste(None),
                arg => arg
                    .parse()
                    .map(|offset| ParsedCommand::Paste(Some(offset)))
                    .unwrap_or(ParsedCommand::Invalid {
                        usage: ":paste [OFFSET]",
                    }),
            },
            "caret" => rest
                .trim()
                .parse()
                .map(ParsedCommand::Caret)
                .unwrap_or(ParsedCommand::Invalid { usage: ":caret N" }),
            "insert" => insert(rest).unwrap_or(ParsedCommand::Invalid {
                usage: ":insert OFFSET TEXT",
            }),
            "print" => ParsedCommand::Print,
            "status" => ParsedCommand::Status,
            "help" | "h" => ParsedCommand::Help,
            _ => ParsedCommand::Unknown(body.trim_end().to_string()),
        }
    }
}

fn range(args: &str) -> Option<(usize, usize)> {
    let mut parts = args.split_whitespace();
    let start = parts.next()?.parse().ok()?;
    let end = parts.next()?.parse().ok()?;
    parts.next().is_none().then_some((start, end))
}

// Text starts after the single separator following the offset; further
// whitespace is part of the inserted text.
fn insert(args: &str) -> Option<ParsedCommand> {
    let args = args.trim_start();
    let (offset, text) = match args.find(char::is_whitespace) {
        Some(i) => {
            let sep = args[i..].chars().next().map_or(1, char::len_utf8);
            (&args[..i], &args[i + sep..])
        }
        None => (args, ""),
    };
    let offset = offset.parse().ok()?;
    if text.is_empty() {
        return None;
    }
    Some(ParsedCommand::Insert {
        offset,
        text: text.replace("\\n", "\n"),
    })
}
