use anyhow::Result;
use console::style;
use std::path::Path;

use rollcall::app::App;
use rollcall::config::Config;
use rollcall::error::is_cancelled;
use rollcall::onboarding::{Wizard, WizardOutcome};
use rollcall::session::Session;
use rollcall::term::Terminal;
use rollcall::ui;

pub fn run(dir: &Path, cfg: &Config) -> Result<()> {
    let mut app = App::open(dir, cfg.clone())?;

    // A finished or declined guide starts over; one in progress resumes
    if !Wizard::should_offer(&app.settings)? {
        Wizard::reset(&mut app.settings)?;
    }

    super::with_terminal(cfg, |term| {
        let mut session = Session::new(term, app);
        session.trail.push(ui::APP_TITLE);
        let outcome = Wizard::standard().show(&mut session);
        session.trail.pop();
        report(session.term, outcome)
    })
}

/// Tell the operator what to do next. A cancelled guide is not a failure.
fn report(term: &mut dyn Terminal, outcome: Result<WizardOutcome>) -> Result<()> {
    let message = match outcome {
        Ok(WizardOutcome::Completed) => format!(
            "  {} Run {} to open the menu",
            style("✓").green(),
            style("rollcall").bold()
        ),
        Ok(WizardOutcome::Declined) => return Ok(()),
        Err(e) if is_cancelled(&e) => format!(
            "  {} Setup paused. Run {} to continue.",
            style("→").dim(),
            style("rollcall init").bold()
        ),
        Err(e) => return Err(e),
    };
    term.line(&message);
    Ok(())
}
