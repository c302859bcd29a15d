//! Line ending detection, normalization and re-expansion.
//!
//! Buffers hold LF-only text. Loading records the dominant style of the source
//! so writes (and fingerprints) reproduce it.

use std::borrow::Cow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    #[default]
    Lf,
    Cr,
    Crlf,
}

impl LineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::Cr => "\r",
            LineEnding::Crlf => "\r\n",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LineEnding::Lf => "LF",
            LineEnding::Cr => "CR",
            LineEnding::Crlf => "CRLF",
        }
    }

    /// Re-expand LF-only text into this style.
    pub fn expand(self, normalized: &str) -> Cow<'_, str> {
        match self {
            LineEnding::Lf => Cow::Borrowed(normalized),
            other => Cow::Owned(normalized.replace('\n', other.as_str())),
        }
    }
}

/// Outcome of `normalize_line_endings`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedText {
    /// LF-only content.
    pub text: String,
    /// Majority style of the input (LF when the input has no line breaks).
    pub style: LineEnding,
    /// More than one style was present.
    pub mixed: bool,
}

#[derive(Default)]
struct Counts {
    crlf: usize,
    lf: usize,
    cr: usize,
}

impl Counts {
    fn scan(input: &str) -> Self {
        let bytes = input.as_bytes();
        let mut counts = Counts::default();
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'\r' if bytes.get(i + 1) == Some(&b'\n') => {
                    counts.crlf += 1;
                    i += 1;
                }
                b'\r' => counts.cr += 1,
                b'\n' => counts.lf += 1,
                _ => {}
            }
            i += 1;
        }
        counts
    }

    // Ties resolve CRLF > LF > CR.
    fn majority(&self) -> LineEnding {
        let mut style = LineEnding::Lf;
        let mut max = 0;
        for (candidate, count) in [
            (LineEnding::Crlf, self.crlf),
            (LineEnding::Lf, self.lf),
            (LineEnding::Cr, self.cr),
        ] {
            if count > max {
                max = count;
                style = candidate;
            }
        }
        style
    }

    fn mixed(&self) -> bool {
        [self.crlf, self.lf, self.cr]
            .iter()
            .filter(|c| **c > 0)
            .count()
            > 1
    }
}

/// Detect the line ending style of `input` and rewrite it to LF-only.
pub fn normalize_line_endings(input: &str) -> NormalizedText {
    let counts = Counts::scan(input);
    let style = counts.majority();
    let mixed = counts.mixed();
    if counts.crlf == 0 && counts.cr == 0 {
        return NormalizedText {
            text: input.to_string(),
            style,
            mixed,
        };
    }
    // '\r' is ASCII so splitting on it never lands inside a multi-byte sequence.
    let mut text = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(pos) = rest.find('\r') {
        text.push_str(&rest[..pos]);
        text.push('\n');
        rest = &rest[pos + 1..];
        if let Some(stripped) = rest.strip_prefix('\n') {
            rest = stripped;
        }
    }
    text.push_str(rest);
    debug_assert!(!text.contains('\r'));
    NormalizedText { text, style, mixed }
}
