//! The pages of the terminal interface and the menu tree that holds them.

use anyhow::Result;

use crate::inputs;
use crate::menu::{Menu, Submenu};
use crate::onboarding::Wizard;
use crate::page::{Flow, Page, Recovery};
use crate::reports;
use crate::session::Session;
use crate::students::{NewStudent, show_student};
use crate::term::{bold, error_line, hint, info_line};

pub const APP_TITLE: &str = "Rollcall";

pub fn main_menu() -> Menu {
    Menu::new(
        APP_TITLE,
        vec![
            Page::new("Log in", log_in)
                .pause_at_end(false)
                .visible_when(|app| !app.signed_in() && !app.accounts.is_empty())
                .into(),
            Page::new("Create account", create_account)
                .visible_when(|app| !app.signed_in())
                .into(),
            Page::new("Register new student", register_student)
                .visible_when(|app| app.signed_in())
                .into(),
            Page::new("Get a student's details", show_student_info)
                .visible_when(|app| app.signed_in() && !app.students.is_empty())
                .into(),
            reports::reports_menu().into(),
            Submenu::new(
                "Account",
                "Account",
                vec![
                    Page::new("Account details", account_details).into(),
                    Page::new("Log out", log_out).clear_at_start(false).into(),
                ],
            )
            .visible_when(|app| app.signed_in())
            .into(),
            Submenu::new(
                "Settings",
                "Settings",
                vec![
                    Page::new("Replay the setup guide", replay_setup_guide)
                        .pause_at_end(false)
                        .description("Walk through the first-run guide again")
                        .into(),
                    Page::new("Trigger a test error", trigger_error)
                        .pause_at_end(false)
                        .recovery(Recovery::Return)
                        .description("Fail on purpose to check how errors are reported")
                        .into(),
                ],
            )
            .into(),
        ],
    )
}

pub fn log_in(session: &mut Session<'_>) -> Result<Flow> {
    if let Some(username) = session.app.username() {
        let line = format!("Already logged in as {}", bold(username));
        session.term.line(&line);
        return Ok(Flow::Done);
    }

    let username = inputs::text(session.term, "Username", "Enter your username")?;
    let Some(account) = session.app.accounts.get(&username).cloned() else {
        error_line(
            session.term,
            &format!("No account exists with the username {}", bold(&username)),
        );
        return Ok(Flow::Restart);
    };

    let attempts = session.app.config.max_password_attempts;
    if !session
        .app
        .accounts
        .authenticate(session.term, &account.username, attempts)?
    {
        return Ok(Flow::Done);
    }

    session.term.line(&format!("Logged in as {}", bold(&account.username)));
    tracing::debug!(username = %account.username, "signed in");
    session.app.current_account = Some(account);
    Ok(Flow::Done)
}

/// Keep asking until the operator picks a username nobody has taken.
fn ask_for_new_username(session: &mut Session<'_>) -> Result<String> {
    let mut show_tip = true;
    loop {
        let username = inputs::new_username(session.term, "Create a username")?;
        if !session.app.accounts.exists(&username) {
            return Ok(username);
        }

        error_line(
            session.term,
            &format!(
                "There's already an account with the username {}",
                bold(username.to_lowercase())
            ),
        );
        if show_tip {
            hint(session.term, "Tip: Pick another username or try logging in instead.");
            show_tip = false;
        }
    }
}

pub fn create_account(session: &mut Session<'_>) -> Result<Flow> {
    hint(
        session.term,
        "Your username will identify you as an individual, and you'll enter it to access this system.",
    );
    let username = ask_for_new_username(session)?;
    session.term.line("");

    hint(
        session.term,
        "Your password is a secret phrase that proves who you are when you log in. It cannot be reset, so keep it safe!",
    );
    hint(
        session.term,
        "Note: You won't be able to see your password while you're typing it.",
    );
    let password_hash = inputs::new_password(session.term, "Set your password")?;
    session.term.line("");

    let created = session.app.accounts.add(&username, &password_hash)?;
    let line = format!("Created a new account called {}", bold(&created.username));
    session.term.line(&line);
    Ok(Flow::Done)
}

pub fn account_details(session: &mut Session<'_>) -> Result<Flow> {
    let username = session.app.username().unwrap_or("nobody").to_string();
    let total = session.app.accounts.len();
    info_line(session.term, "Signed in as", username);
    info_line(session.term, "Accounts on this system", total);
    Ok(Flow::Done)
}

pub fn log_out(session: &mut Session<'_>) -> Result<Flow> {
    match session.app.current_account.take() {
        Some(account) => {
            session
                .term
                .line(&format!("Logged out of account {}", bold(&account.username)));
        }
        None => session.term.line("Nobody is signed in!"),
    }
    Ok(Flow::Done)
}

pub fn replay_setup_guide(session: &mut Session<'_>) -> Result<Flow> {
    Wizard::reset(&mut session.app.settings)?;
    Wizard::standard().show(session)?;
    Ok(Flow::Done)
}

pub fn register_student(session: &mut Session<'_>) -> Result<Flow> {
    hint(session.term, "Enter the new student's details below.");
    let forename = inputs::name(session.term, "Forename")?;
    let surname = inputs::name(session.term, "Surname")?;
    let birthday = inputs::past_date(session.term, "Birthday (YYYY-MM-DD)")?;
    let tutor_group = inputs::tutor_group(session.term, "Tutor group")?;
    let home_address = inputs::multiline(session.term, "Home address")?;
    let home_phone = inputs::phone_number(session.term, "Home phone number")?;
    session.term.line("");

    let student = session.app.students.add(NewStudent {
        surname,
        forename,
        birthday,
        tutor_group,
        home_address,
        home_phone,
    })?;
    let (full_name, email, id) = (
        student.full_name.clone(),
        student.school_email.clone(),
        student.id,
    );

    let line = format!("Registered student {} (ID #{id})", bold(&full_name));
    session.term.line(&line);
    info_line(session.term, "School email address", email);
    info_line(session.term, "ID number", id);
    Ok(Flow::Done)
}

pub fn show_student_info(session: &mut Session<'_>) -> Result<Flow> {
    hint(
        session.term,
        "Each student has a numerical ID that is used to uniquely identify them.",
    );
    let id = inputs::positive_integer(session.term, "Enter unique ID")?;
    session.term.line("");

    let Some(student) = session.app.students.get(id) else {
        error_line(session.term, &format!("No students with the ID {}", bold(id)));
        return Ok(Flow::Restart);
    };
    show_student(session.term, student);
    Ok(Flow::Done)
}

pub fn trigger_error(_: &mut Session<'_>) -> Result<Flow> {
    anyhow::bail!("Manually-triggered error for debugging")
}
