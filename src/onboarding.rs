//! The first-run setup guide.
//!
//! A fixed sequence of pages shown once. The id of the stage being run is
//! saved before the stage starts, so an interrupted guide picks up where it
//! left off the next time it is shown.

use anyhow::Result;
use console::style;

use crate::page::{Flow, Page, Recovery};
use crate::session::Session;
use crate::settings::Settings;
use crate::term::{bold, hint};
use crate::ui;

pub struct Stage {
    pub id: &'static str,
    pub page: Page,
}

impl Stage {
    pub fn new(id: &'static str, page: Page) -> Self {
        Self { id, page }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardOutcome {
    /// The operator said no; the guide won't be offered again.
    Declined,
    Completed,
}

pub struct Wizard {
    title: String,
    stages: Vec<Stage>,
}

impl Wizard {
    pub fn new(title: impl Into<String>, stages: Vec<Stage>) -> Self {
        Self {
            title: title.into(),
            stages,
        }
    }

    /// The guide shipped with the application.
    pub fn standard() -> Self {
        Self::new(
            "Setup guide",
            vec![
                Stage::new("welcome", Page::new("Welcome", welcome)),
                Stage::new(
                    "create_account",
                    Page::new("Create an account", ui::create_account),
                ),
                Stage::new(
                    "log_in",
                    Page::new("Log in", ui::log_in).pause_at_end(false),
                ),
            ],
        )
    }

    pub fn stage_ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.stages.iter().map(|stage| stage.id)
    }

    pub fn should_offer(settings: &Settings) -> Result<bool> {
        Ok(settings.onboarding_show()?)
    }

    /// Put the guide back to "never started" so it is offered again.
    pub fn reset(settings: &mut Settings) -> Result<()> {
        settings.set_onboarding_stage(None)?;
        settings.set_onboarding_show(true)?;
        Ok(())
    }

    pub fn show(&self, session: &mut Session<'_>) -> Result<WizardOutcome> {
        session.trail.push(self.title.as_str());
        let result = self.run(session);
        session.trail.pop();
        result
    }

    fn run(&self, session: &mut Session<'_>) -> Result<WizardOutcome> {
        let start = match session.app.settings.onboarding_stage()? {
            None => {
                session.term.clear();
                session.show_trail();
                let wanted = session
                    .term
                    .confirm("This looks like your first visit. Take the setup guide?", true)?;
                if !wanted {
                    session.app.settings.set_onboarding_show(false)?;
                    hint(session.term, "No problem. You can replay it from the Settings menu.");
                    tracing::info!("Setup guide declined");
                    return Ok(WizardOutcome::Declined);
                }
                0
            }
            Some(id) => match self.stages.iter().position(|stage| stage.id == id) {
                Some(index) => {
                    tracing::debug!(stage = %id, "resuming setup guide");
                    index
                }
                None => {
                    tracing::warn!(stage = %id, "Unknown setup stage, starting from the beginning");
                    0
                }
            },
        };

        let total = self.stages.len();
        for (index, stage) in self.stages.iter().enumerate().skip(start) {
            session.app.settings.set_onboarding_stage(Some(stage.id))?;
            session
                .trail
                .replace(format!("{} ({}/{})", self.title, index + 1, total));
            stage.page.execute_with(session, Recovery::Restart)?;
        }
        session.trail.replace(self.title.as_str());

        session.app.settings.set_onboarding_show(false)?;
        tracing::info!("Setup guide completed");

        session.term.line("");
        session
            .term
            .line(&style("✅ You're all set!").green().bold().to_string());
        session.term.pause("Press Enter to go to the main menu...")?;
        Ok(WizardOutcome::Completed)
    }
}

fn welcome(session: &mut Session<'_>) -> Result<Flow> {
    let term = &mut *session.term;
    term.line(&format!("Welcome to {}!", bold("Rollcall")));
    term.line("");
    hint(
        term,
        "Rollcall keeps its records in plain files in your data directory.",
    );
    hint(
        term,
        "Pick options from numbered menus. Enter 0 to go back, or press Ctrl+C to cancel what you're doing.",
    );
    term.line("");
    term.line("Next you'll create an account and log in with it.");
    Ok(Flow::Done)
}
