//! Everything the navigation engine needs from the operator's terminal:
//! print a line, clear the screen, and read a line, a secret, or a yes/no.
//!
//! Reads fail with [`Cancelled`] when the operator aborts them.

use anyhow::Result;
use console::{Key, Term, style};
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

use crate::error::Cancelled;

pub trait Terminal {
    fn line(&mut self, text: &str);

    fn clear(&mut self);

    fn read_line(&mut self, prompt: &str) -> Result<String>;

    /// Like [`Terminal::read_line`] but without echoing what is typed.
    fn read_secret(&mut self, prompt: &str) -> Result<String>;

    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool>;

    /// Wait for the operator to press Enter. Returns whatever they typed first.
    fn pause(&mut self, prompt: &str) -> Result<String> {
        self.read_line(&style(prompt).dim().to_string())
    }
}

// ── Styled output helpers ────────────────────────────────────

/// Tell the operator their input was rejected. They get to retry straight away.
pub fn error_line(term: &mut dyn Terminal, message: &str) {
    term.line(&style(format!("❌ {message}")).red().to_string());
}

/// De-emphasised context shown above an input.
pub fn hint(term: &mut dyn Terminal, text: &str) {
    term.line(&style(text).dim().to_string());
}

/// `label: value` with the value in bold.
pub fn info_line(term: &mut dyn Terminal, label: &str, value: impl std::fmt::Display) {
    term.line(&format!("{}: {}", label.trim(), bold(value)));
}

pub fn bold(value: impl std::fmt::Display) -> String {
    style(value.to_string()).bold().to_string()
}

// ── Interactive terminal ─────────────────────────────────────

/// The real TTY. Keys are read one at a time in raw mode, so Ctrl+C arrives
/// as a key press and becomes [`Cancelled`] rather than a signal.
pub struct ConsoleTerminal {
    term: Term,
    clear_screen: bool,
}

impl ConsoleTerminal {
    pub fn new(clear_screen: bool) -> Self {
        Self {
            term: Term::stdout(),
            clear_screen,
        }
    }

    fn read_after(&self, shown: &str, echo: bool) -> Result<String> {
        // Without a TTY every key reads as unknown and the line never ends
        if !self.term.is_term() {
            return Err(Cancelled.into());
        }
        let mut out = &self.term;
        out.write_all(shown.as_bytes())?;
        out.flush()?;
        read_keys(|| self.term.read_key_raw(), &mut out, echo)
    }
}

/// An interrupted read is the operator cancelling; other I/O errors pass through.
pub fn cancel_on_interrupt(err: io::Error) -> anyhow::Error {
    if err.kind() == io::ErrorKind::Interrupted {
        Cancelled.into()
    } else {
        err.into()
    }
}

/// Collect keys into a line until Enter.
///
/// With `echo` off nothing typed is written to `out`. Ctrl+C, Ctrl+D on an
/// empty line, or an interrupted read cancel the line.
pub fn read_keys<W: Write>(
    mut next_key: impl FnMut() -> io::Result<Key>,
    out: &mut W,
    echo: bool,
) -> Result<String> {
    let mut line = String::new();
    loop {
        let key = match next_key() {
            Ok(key) => key,
            Err(e) => {
                writeln!(out)?;
                return Err(cancel_on_interrupt(e));
            }
        };

        match key {
            Key::Enter => {
                writeln!(out)?;
                return Ok(line);
            }
            Key::CtrlC => {
                writeln!(out)?;
                return Err(Cancelled.into());
            }
            Key::Char('\u{4}') if line.is_empty() => {
                writeln!(out)?;
                return Err(Cancelled.into());
            }
            Key::Char(c) if !c.is_control() => {
                line.push(c);
                if echo {
                    write!(out, "{c}")?;
                }
            }
            Key::Backspace => {
                if line.pop().is_some() && echo {
                    write!(out, "\x08 \x08")?;
                }
            }
            _ => {}
        }
        out.flush()?;
    }
}

impl Terminal for ConsoleTerminal {
    fn line(&mut self, text: &str) {
        let _ = self.term.write_line(text);
    }

    fn clear(&mut self) {
        if self.clear_screen {
            let _ = self.term.clear_screen();
        }
    }

    fn read_line(&mut self, prompt: &str) -> Result<String> {
        self.read_after(&format!("{prompt}: "), true)
    }

    fn read_secret(&mut self, prompt: &str) -> Result<String> {
        self.read_after(&format!("{prompt}: "), false)
    }

    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool> {
        confirm_by_line(self, prompt, default)
    }

    fn pause(&mut self, prompt: &str) -> Result<String> {
        self.read_after(&style(prompt).dim().to_string(), true)
    }
}

// ── Line-oriented terminal ───────────────────────────────────

/// Plain reads and writes, for when stdin or stdout isn't a TTY.
/// End of input counts as a cancel.
pub struct PlainTerminal<R, W> {
    input: R,
    output: W,
}

impl PlainTerminal<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> PlainTerminal<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn prompt_and_read(&mut self, prompt: &str) -> Result<String> {
        write!(self.output, "{prompt}: ")?;
        self.output.flush()?;

        let mut buf = String::new();
        if self.input.read_line(&mut buf)? == 0 {
            writeln!(self.output)?;
            return Err(Cancelled.into());
        }
        Ok(buf.trim_end_matches(['\r', '\n']).to_string())
    }
}

impl<R: BufRead, W: Write> Terminal for PlainTerminal<R, W> {
    fn line(&mut self, text: &str) {
        let _ = writeln!(self.output, "{text}");
    }

    fn clear(&mut self) {}

    fn read_line(&mut self, prompt: &str) -> Result<String> {
        self.prompt_and_read(prompt)
    }

    fn read_secret(&mut self, prompt: &str) -> Result<String> {
        self.prompt_and_read(prompt)
    }

    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool> {
        confirm_by_line(self, prompt, default)
    }
}

/// Ask a yes/no question as a line read, re-asking until it parses.
fn confirm_by_line(term: &mut dyn Terminal, prompt: &str, default: bool) -> Result<bool> {
    let choices = if default { "[Y/n]" } else { "[y/N]" };
    loop {
        let answer = term.read_line(&format!("{prompt} {choices}"))?;
        match parse_yes_no(&answer, default) {
            Some(choice) => return Ok(choice),
            None => error_line(term, "Answer y or n"),
        }
    }
}

fn parse_yes_no(answer: &str, default: bool) -> Option<bool> {
    match answer.trim().to_lowercase().as_str() {
        "" => Some(default),
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

// ── Scripted terminal ────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scripted {
    Line(String),
    Cancel,
}

/// A terminal that replays queued answers and records everything printed.
///
/// Output is stored without ANSI styling. Running out of answers behaves
/// like end of input, so a misbehaving loop can't spin forever.
#[derive(Debug, Default)]
pub struct ScriptedTerminal {
    inputs: VecDeque<Scripted>,
    output: Vec<String>,
    prompts: Vec<String>,
    clears: usize,
}

impl ScriptedTerminal {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut term = Self::default();
        for answer in answers {
            term.answer(answer);
        }
        term
    }

    pub fn answer(&mut self, answer: impl Into<String>) -> &mut Self {
        self.inputs.push_back(Scripted::Line(answer.into()));
        self
    }

    pub fn cancel(&mut self) -> &mut Self {
        self.inputs.push_back(Scripted::Cancel);
        self
    }

    pub fn output(&self) -> &[String] {
        &self.output
    }

    pub fn transcript(&self) -> String {
        self.output.join("\n")
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.output.iter().any(|line| line.contains(needle))
    }

    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    pub fn clears(&self) -> usize {
        self.clears
    }

    pub fn remaining(&self) -> usize {
        self.inputs.len()
    }

    fn next(&mut self, prompt: &str, echo: bool) -> Result<String> {
        let prompt = console::strip_ansi_codes(prompt).to_string();
        self.prompts.push(prompt.clone());
        match self.inputs.pop_front() {
            Some(Scripted::Line(answer)) => {
                let shown = if echo { answer.as_str() } else { "" };
                self.output.push(format!("{prompt}: {shown}"));
                Ok(answer)
            }
            Some(Scripted::Cancel) | None => {
                self.output.push(format!("{prompt}: ^C"));
                Err(Cancelled.into())
            }
        }
    }
}

impl Terminal for ScriptedTerminal {
    fn line(&mut self, text: &str) {
        self.output.push(console::strip_ansi_codes(text).to_string());
    }

    fn clear(&mut self) {
        self.clears += 1;
    }

    fn read_line(&mut self, prompt: &str) -> Result<String> {
        self.next(prompt, true)
    }

    fn read_secret(&mut self, prompt: &str) -> Result<String> {
        self.next(prompt, false)
    }

    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool> {
        loop {
            let answer = self.next(prompt, true)?;
            if let Some(choice) = parse_yes_no(&answer, default) {
                return Ok(choice);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::is_cancelled;

    #[test]
    fn test_scripted_answers_in_order() {
        let mut term = ScriptedTerminal::new(["alice", "y"]);
        assert_eq!(term.read_line("Username").unwrap(), "alice");
        assert!(term.confirm("Continue?", false).unwrap());
        assert!(term.contains("Username: alice"));
    }

    #[test]
    fn test_scripted_cancel_and_exhaustion() {
        let mut term = ScriptedTerminal::default();
        term.cancel();
        assert!(is_cancelled(&term.read_line("x").unwrap_err()));
        assert!(is_cancelled(&term.read_line("y").unwrap_err()));
    }

    #[test]
    fn test_scripted_secret_not_echoed() {
        let mut term = ScriptedTerminal::new(["hunter2"]);
        assert_eq!(term.read_secret("Password").unwrap(), "hunter2");
        assert!(!term.transcript().contains("hunter2"));
    }

    #[test]
    fn test_output_is_unstyled() {
        let mut term = ScriptedTerminal::default();
        error_line(&mut term, "Nope");
        info_line(&mut term, "Username ", "alice");
        assert_eq!(term.output(), ["❌ Nope", "Username: alice"]);
    }

    #[test]
    fn test_plain_terminal_reads_lines() {
        let input = io::Cursor::new("bob\r\nmaybe\n\n");
        let mut term = PlainTerminal::new(input, Vec::new());
        assert_eq!(term.read_line("Name").unwrap(), "bob");
        // "maybe" is rejected, then the empty answer takes the default
        assert!(term.confirm("Sure?", true).unwrap());
        assert!(is_cancelled(&term.read_line("Again").unwrap_err()));

        let out = String::from_utf8(term.into_output()).unwrap();
        assert!(out.contains("Name: "));
        assert!(out.contains("Answer y or n"));
    }

    /// Helper: feed `read_keys` from a fixed list of key events
    fn keys(events: Vec<io::Result<Key>>) -> impl FnMut() -> io::Result<Key> {
        let mut events = VecDeque::from(events);
        move || events.pop_front().expect("ran out of keys")
    }

    #[test]
    fn test_read_keys_builds_the_line() {
        let mut out = Vec::new();
        let typed = read_keys(
            keys(vec![
                Ok(Key::Char('h')),
                Ok(Key::Char('x')),
                Ok(Key::Backspace),
                Ok(Key::Char('i')),
                Ok(Key::ArrowLeft),
                Ok(Key::Enter),
            ]),
            &mut out,
            true,
        )
        .unwrap();
        assert_eq!(typed, "hi");
        assert!(String::from_utf8(out).unwrap().starts_with("hx"));
    }

    #[test]
    fn test_read_keys_hides_secrets() {
        let mut out = Vec::new();
        let typed = read_keys(
            keys(vec![Ok(Key::Char('p')), Ok(Key::Char('w')), Ok(Key::Enter)]),
            &mut out,
            false,
        )
        .unwrap();
        assert_eq!(typed, "pw");
        assert_eq!(out, b"\n");
    }

    #[test]
    fn test_ctrl_c_cancels_a_secret() {
        let mut out = Vec::new();
        let err = read_keys(
            keys(vec![Ok(Key::Char('p')), Ok(Key::CtrlC)]),
            &mut out,
            false,
        )
        .unwrap_err();
        assert!(is_cancelled(&err));
    }

    #[test]
    fn test_interrupted_read_cancels() {
        let mut out = Vec::new();
        let err = read_keys(
            keys(vec![Err(io::Error::from(io::ErrorKind::Interrupted))]),
            &mut out,
            false,
        )
        .unwrap_err();
        assert!(is_cancelled(&err));
    }

    #[test]
    fn test_ctrl_d_cancels_only_an_empty_line() {
        let mut out = Vec::new();
        let err = read_keys(keys(vec![Ok(Key::Char('\u{4}'))]), &mut out, true).unwrap_err();
        assert!(is_cancelled(&err));

        let typed = read_keys(
            keys(vec![Ok(Key::Char('a')), Ok(Key::Char('\u{4}')), Ok(Key::Enter)]),
            &mut out,
            true,
        )
        .unwrap();
        assert_eq!(typed, "a");
    }

    #[test]
    fn test_other_read_errors_are_not_cancels() {
        let err = cancel_on_interrupt(io::Error::other("device gone"));
        assert!(!is_cancelled(&err));
        assert!(err.is::<io::Error>());

        let mut out = Vec::new();
        let err = read_keys(
            keys(vec![Err(io::Error::from(io::ErrorKind::BrokenPipe))]),
            &mut out,
            true,
        )
        .unwrap_err();
        assert!(!is_cancelled(&err));
    }

    #[test]
    fn test_parse_yes_no() {
        assert_eq!(parse_yes_no(" YES ", false), Some(true));
        assert_eq!(parse_yes_no("n", true), Some(false));
        assert_eq!(parse_yes_no("", false), Some(false));
        assert_eq!(parse_yes_no("perhaps", true), None);
    }
}
