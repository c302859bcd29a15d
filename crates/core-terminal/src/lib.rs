//! Terminal backend abstraction and crossterm implementation.
//!
//! The shell runs line-oriented in the normal screen buffer: no raw mode and no
//! alternate screen, so prompts can be answered with ordinary line input.

use anyhow::Result;
use crossterm::{
    execute, queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor},
    terminal::SetTitle,
};
use std::io::{Stdout, Write, stdout};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Plain,
    /// View banners and titles.
    Heading,
    /// Informational notices (saved, cancelled...).
    Notice,
    Error,
}

pub trait TerminalBackend {
    fn set_title(&mut self, title: &str) -> Result<()>;
    fn write_line(&mut self, line: &str, style: LineStyle) -> Result<()>;
    /// Write `prompt` without a newline and flush so it is visible before the
    /// next line is read.
    fn write_prompt(&mut self, prompt: &str) -> Result<()>;
}

pub struct CrosstermBackend<W: Write = Stdout> {
    out: W,
    styled: bool,
}

impl Default for CrosstermBackend<Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl CrosstermBackend<Stdout> {
    pub fn new() -> Self {
        Self {
            out: stdout(),
            styled: true,
        }
    }
}

impl<W: Write> CrosstermBackend<W> {
    /// Backend over an arbitrary writer; no colors or attributes are emitted.
    pub fn plain(out: W) -> Self {
        Self { out, styled: false }
    }

    pub fn writer(&self) -> &W {
        &self.out
    }

    pub fn into_writer(self) -> W {
        self.out
    }
}

impl<W: Write> TerminalBackend for CrosstermBackend<W> {
    fn set_title(&mut self, title: &str) -> Result<()> {
        if self.styled {
            execute!(self.out, SetTitle(title))?;
        }
        Ok(())
    }

    fn write_line(&mut self, line: &str, style: LineStyle) -> Result<()> {
        let color = match style {
            LineStyle::Plain => None,
            LineStyle::Heading => Some(Color::Cyan),
            LineStyle::Notice => Some(Color::DarkGrey),
            LineStyle::Error => Some(Color::Red),
        };
        match color.filter(|_| self.styled) {
            Some(color) => {
                if style == LineStyle::Heading {
                    queue!(self.out, SetAttribute(Attribute::Bold))?;
                }
                queue!(
                    self.out,
                    SetForegroundColor(color),
                    Print(line),
                    ResetColor,
                    SetAttribute(Attribute::Reset),
                    Print("\n")
                )?;
            }
            None => queue!(self.out, Print(line), Print("\n"))?,
        }
        self.out.flush()?;
        Ok(())
    }

    fn write_prompt(&mut self, prompt: &str) -> Result<()> {
        execute!(self.out, Print(prompt))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(backend: CrosstermBackend<Vec<u8>>) -> String {
        String::from_utf8(backend.into_writer()).unwrap()
    }

    #[test]
    fn plain_backend_writes_bare_lines() {
        let mut backend = CrosstermBackend::plain(Vec::new());
        backend.write_line("hello", LineStyle::Heading).unwrap();
        backend.write_line("oops", LineStyle::Error).unwrap();
        backend.write_prompt("> ").unwrap();
        assert_eq!(output(backend), "hello\noops\n> ");
    }

    #[test]
    fn plain_backend_skips_title_sequences() {
        let mut backend = CrosstermBackend::plain(Vec::new());
        backend.set_title("Editing: a.ritual").unwrap();
        assert!(output(backend).is_empty());
    }
}
