use anyhow::Result;
use std::path::Path;

use rollcall::app::App;
use rollcall::config::Config;
use rollcall::onboarding::Wizard;

pub fn run(dir: &Path, cfg: &Config) -> Result<()> {
    let app = App::open(dir, cfg.clone())?;
    let settings = &app.settings;

    println!("rollcall status\n");
    println!("  Data directory:  {}", dir.display());
    println!("  Accounts file:   {}", app.accounts.path().display());
    println!("  Settings file:   {}", settings.store().path().display());
    println!("  Students file:   {}", app.students.path().display());
    println!();
    println!("  Accounts:        {}", app.accounts.len());
    println!("  Students:        {}", app.students.len());

    let stage = settings.onboarding_stage()?;
    let setup = match (Wizard::should_offer(settings)?, stage.as_deref()) {
        (true, None) => "not started".to_string(),
        (true, Some(stage)) => {
            let total = Wizard::standard().stage_ids().count();
            let position = Wizard::standard()
                .stage_ids()
                .position(|id| id == stage)
                .map(|i| format!("{}/{total}", i + 1))
                .unwrap_or_else(|| "unknown stage".to_string());
            format!("in progress at {stage} ({position})")
        }
        (false, Some(_)) => "complete".to_string(),
        (false, None) => "declined".to_string(),
    };
    println!("  Setup guide:     {setup}");

    Ok(())
}
