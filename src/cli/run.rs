use anyhow::Result;
use std::path::Path;

use rollcall::app::App;
use rollcall::config::Config;
use rollcall::error::is_cancelled;
use rollcall::onboarding::Wizard;
use rollcall::session::Session;
use rollcall::ui;

pub fn run(dir: &Path, cfg: &Config) -> Result<()> {
    let app = App::open(dir, cfg.clone())?;

    super::with_terminal(cfg, |term| {
        let mut session = Session::new(term, app);

        if Wizard::should_offer(&session.app.settings)? {
            session.trail.push(ui::APP_TITLE);
            let guided = Wizard::standard().show(&mut session);
            session.trail.pop();
            match guided {
                Ok(_) => {}
                // Progress is saved; the guide resumes next time
                Err(e) if is_cancelled(&e) => return Ok(()),
                Err(e) => return Err(e),
            }
        }

        ui::main_menu().show(&mut session, true)
    })
}
