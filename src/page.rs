//! Pages: leaf menu actions, and the executor that runs them.
//!
//! Running a page goes Entering → Running → Succeeded / Cancelled / Failed.
//! The page's title sits on the breadcrumb trail exactly while the page is
//! running, whichever way it ends.

use anyhow::Result;
use console::style;

use crate::app::App;
use crate::error::{is_cancelled, is_store_failure, kind_name};
use crate::session::Session;

/// Typing this at the error prompt re-raises the error instead of recovering.
pub const DEBUG_KEYWORD: &str = "raise";

/// What an action asks the executor to do once it returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Done,
    /// Run the action again straight away, without leaving the page.
    Restart,
}

/// What to do after an action fails with an unexpected error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Recovery {
    /// Start the page over.
    #[default]
    Restart,
    /// Give up and go back to whatever opened the page.
    Return,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    Succeeded,
    /// The action failed and the operator was sent back.
    Failed,
}

pub type Action = Box<dyn Fn(&mut Session<'_>) -> Result<Flow>>;
pub type Visibility = Box<dyn Fn(&App) -> bool>;

pub struct Page {
    pub label: String,
    pub title: String,
    pub description: Option<String>,
    pub visible: Option<Visibility>,
    pub clear_at_start: bool,
    pub pause_at_end: bool,
    pub recovery: Recovery,
    action: Action,
}

impl Page {
    pub fn new(
        label: impl Into<String>,
        action: impl Fn(&mut Session<'_>) -> Result<Flow> + 'static,
    ) -> Self {
        let label = label.into();
        Self {
            title: label.clone(),
            label,
            description: None,
            visible: None,
            clear_at_start: true,
            pause_at_end: true,
            recovery: Recovery::default(),
            action: Box::new(action),
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn visible_when(mut self, predicate: impl Fn(&App) -> bool + 'static) -> Self {
        self.visible = Some(Box::new(predicate));
        self
    }

    pub fn clear_at_start(mut self, clear: bool) -> Self {
        self.clear_at_start = clear;
        self
    }

    pub fn pause_at_end(mut self, pause: bool) -> Self {
        self.pause_at_end = pause;
        self
    }

    pub fn recovery(mut self, recovery: Recovery) -> Self {
        self.recovery = recovery;
        self
    }

    pub fn is_visible(&self, app: &App) -> bool {
        self.visible.as_ref().is_none_or(|predicate| predicate(app))
    }

    pub fn execute(&self, session: &mut Session<'_>) -> Result<PageOutcome> {
        self.execute_with(session, self.recovery)
    }

    /// Run the page with an explicit recovery policy.
    ///
    /// Cancellation and storage failures are passed on to the caller. Any
    /// other error is shown to the operator and handled by `recovery`, unless
    /// they type [`DEBUG_KEYWORD`] at the prompt, in which case it is returned.
    pub fn execute_with(
        &self,
        session: &mut Session<'_>,
        recovery: Recovery,
    ) -> Result<PageOutcome> {
        loop {
            // Entering
            if self.clear_at_start {
                session.term.clear();
            }
            session.trail.push(self.title.as_str());
            session.show_trail();

            // Running
            let err = match self.run_action(session) {
                Ok(()) => return self.succeed(session),
                Err(err) => err,
            };

            if is_cancelled(&err) {
                session.term.line(&style("\nAborted").red().to_string());
                session.trail.pop();
                tracing::debug!(page = %self.title, "page cancelled");
                return Err(err);
            }
            if is_store_failure(&err) {
                session.trail.pop();
                return Err(err);
            }

            // Failed
            tracing::debug!(page = %self.title, error = %err, "page action failed");
            let typed = self.report_failure(session, &err, recovery);
            session.trail.pop();

            let typed = typed?;
            if typed.trim().eq_ignore_ascii_case(DEBUG_KEYWORD) {
                return Err(err);
            }

            match recovery {
                Recovery::Restart => continue,
                Recovery::Return => return Ok(PageOutcome::Failed),
            }
        }
    }

    fn run_action(&self, session: &mut Session<'_>) -> Result<()> {
        while (self.action)(session)? == Flow::Restart {
            tracing::debug!(page = %self.title, "action asked to restart");
        }
        Ok(())
    }

    fn succeed(&self, session: &mut Session<'_>) -> Result<PageOutcome> {
        let paused = if self.pause_at_end {
            session.term.line("");
            session.term.pause("Press Enter to continue...").map(|_| ())
        } else {
            Ok(())
        };
        session.trail.pop();
        paused?;
        Ok(PageOutcome::Succeeded)
    }

    /// Show the error and wait for acknowledgement; returns what was typed.
    fn report_failure(
        &self,
        session: &mut Session<'_>,
        err: &anyhow::Error,
        recovery: Recovery,
    ) -> Result<String> {
        session.term.line(
            &style(format!(
                "Encountered an error while running '{}'",
                self.title
            ))
            .red()
            .to_string(),
        );
        session.term.line(&format!("{}: {err:#}", kind_name(err)));
        session.term.line("");

        let action = match recovery {
            Recovery::Restart => "try again",
            Recovery::Return => "return to the previous screen",
        };
        session.term.pause(&format!("Press Enter to {action}..."))
    }
}

impl std::fmt::Debug for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Page")
            .field("label", &self.label)
            .field("title", &self.title)
            .field("recovery", &self.recovery)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::error::{Cancelled, SettingsError, StoreError};
    use crate::term::ScriptedTerminal;
    use std::cell::Cell;
    use std::rc::Rc;

    fn app(dir: &std::path::Path) -> App {
        App::open(dir, Config::default()).unwrap()
    }

    #[test]
    fn test_success_pauses_and_balances() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut term = ScriptedTerminal::new([""]);
        let mut session = Session::new(&mut term, app(tmp.path()));
        session.trail.push("Main");

        let page = Page::new("Hello", |s: &mut Session<'_>| {
            assert_eq!(s.trail.current(), Some("Hello"));
            s.term.line("hi there");
            Ok(Flow::Done)
        });
        assert_eq!(page.execute(&mut session).unwrap(), PageOutcome::Succeeded);
        assert_eq!(session.trail.depth(), 1);
        drop(session);

        assert!(term.contains("Main › Hello"));
        assert!(term.contains("hi there"));
        assert_eq!(term.clears(), 1);
        assert_eq!(term.remaining(), 0);
    }

    #[test]
    fn test_internal_restart_loops_until_done() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut term = ScriptedTerminal::default();
        let mut session = Session::new(&mut term, app(tmp.path()));

        let runs = Rc::new(Cell::new(0));
        let counter = runs.clone();
        let page = Page::new("Retry", move |_: &mut Session<'_>| {
            counter.set(counter.get() + 1);
            Ok(if counter.get() < 3 { Flow::Restart } else { Flow::Done })
        })
        .pause_at_end(false)
        .clear_at_start(false);

        assert_eq!(page.execute(&mut session).unwrap(), PageOutcome::Succeeded);
        assert_eq!(runs.get(), 3);
        assert_eq!(session.trail.depth(), 0);
        drop(session);
        // Entered once only
        assert_eq!(term.output().iter().filter(|l| *l == "Retry").count(), 1);
        assert_eq!(term.clears(), 0);
    }

    #[test]
    fn test_cancel_pops_and_propagates() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut term = ScriptedTerminal::default();
        let mut session = Session::new(&mut term, app(tmp.path()));

        let page = Page::new("Ask", |s: &mut Session<'_>| {
            s.term.read_line("Name")?;
            Ok(Flow::Done)
        });
        let err = page.execute(&mut session).unwrap_err();
        assert!(is_cancelled(&err));
        assert_eq!(session.trail.depth(), 0);
    }

    #[test]
    fn test_cancel_during_pause_still_balances() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut term = ScriptedTerminal::default();
        term.cancel();
        let mut session = Session::new(&mut term, app(tmp.path()));

        let page = Page::new("Show", |_: &mut Session<'_>| Ok(Flow::Done));
        assert!(is_cancelled(&page.execute(&mut session).unwrap_err()));
        assert_eq!(session.trail.depth(), 0);
    }

    #[test]
    fn test_restart_recovery_retries_same_page() {
        let tmp = tempfile::TempDir::new().unwrap();
        // Acknowledge the error, then the final pause
        let mut term = ScriptedTerminal::new(["", ""]);
        let mut session = Session::new(&mut term, app(tmp.path()));

        let runs = Rc::new(Cell::new(0));
        let counter = runs.clone();
        let page = Page::new("Flaky", move |_: &mut Session<'_>| {
            counter.set(counter.get() + 1);
            if counter.get() == 1 {
                anyhow::bail!("first run fails");
            }
            Ok(Flow::Done)
        });

        assert_eq!(page.execute(&mut session).unwrap(), PageOutcome::Succeeded);
        assert_eq!(runs.get(), 2);
        assert_eq!(session.trail.depth(), 0);
        drop(session);

        assert!(term.contains("Encountered an error while running 'Flaky'"));
        assert!(term.contains("Error: first run fails"));
        assert!(term.prompts().iter().any(|p| p == "Press Enter to try again..."));
    }

    #[test]
    fn test_return_recovery_gives_up() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut term = ScriptedTerminal::new([""]);
        let mut session = Session::new(&mut term, app(tmp.path()));
        session.trail.push("Main");

        let page = Page::new("Broken", |_: &mut Session<'_>| {
            Err(SettingsError::NotFound("a.b".into()).into())
        })
        .recovery(Recovery::Return);

        assert_eq!(page.execute(&mut session).unwrap(), PageOutcome::Failed);
        assert_eq!(session.trail.depth(), 1);
        drop(session);
        assert!(term.contains("SettingsError: Setting does not exist: a.b"));
        assert!(
            term.prompts()
                .iter()
                .any(|p| p == "Press Enter to return to the previous screen...")
        );
    }

    #[test]
    fn test_debug_keyword_reraises() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut term = ScriptedTerminal::new(["RAISE"]);
        let mut session = Session::new(&mut term, app(tmp.path()));

        let page = Page::new("Broken", |_: &mut Session<'_>| anyhow::bail!("kaboom"));
        let err = page.execute(&mut session).unwrap_err();
        assert_eq!(err.to_string(), "kaboom");
        assert_eq!(session.trail.depth(), 0);
    }

    #[test]
    fn test_cancel_at_error_prompt_propagates() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut term = ScriptedTerminal::default();
        let mut session = Session::new(&mut term, app(tmp.path()));

        let page = Page::new("Broken", |_: &mut Session<'_>| anyhow::bail!("kaboom"));
        let err = page.execute(&mut session).unwrap_err();
        assert!(err.is::<Cancelled>());
        assert_eq!(session.trail.depth(), 0);
    }

    #[test]
    fn test_store_errors_are_not_recovered() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut term = ScriptedTerminal::default();
        let mut session = Session::new(&mut term, app(tmp.path()));

        let page = Page::new("Disk", |_: &mut Session<'_>| {
            Err(StoreError::Read {
                path: "x.json".into(),
                source: std::io::Error::other("disk on fire"),
            }
            .into())
        });
        let err = page.execute(&mut session).unwrap_err();
        assert!(err.is::<StoreError>());
        assert_eq!(session.trail.depth(), 0);
        drop(session);
        assert!(!term.contains("Encountered an error"));
    }

    #[test]
    fn test_visibility() {
        let tmp = tempfile::TempDir::new().unwrap();
        let app = app(tmp.path());
        let always = Page::new("A", |_: &mut Session<'_>| Ok(Flow::Done));
        let signed_in = Page::new("B", |_: &mut Session<'_>| Ok(Flow::Done))
            .visible_when(|app| app.signed_in());
        assert!(always.is_visible(&app));
        assert!(!signed_in.is_visible(&app));
    }
}
