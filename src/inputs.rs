//! Validated prompts. Each keeps asking until the operator gives an
//! acceptable answer or cancels; rejections never escape as errors.

use anyhow::Result;
use chrono::{Local, NaiveDate};

use crate::password;
use crate::term::{Terminal, error_line, hint};

pub const MAX_USERNAME_LEN: usize = 64;

/// Some non-blank text, trimmed.
pub fn text(term: &mut dyn Terminal, prompt: &str, error_message: &str) -> Result<String> {
    loop {
        let raw = term.read_line(prompt)?;
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            return Ok(trimmed.to_string());
        }
        error_line(term, error_message);
    }
}

/// A username for a new account: 1 to 64 letters, digits, `_`, `.`, `-` or spaces.
pub fn new_username(term: &mut dyn Terminal, prompt: &str) -> Result<String> {
    loop {
        let raw = text(term, prompt, "Enter a username")?;
        match validate_username(&raw) {
            Ok(()) => return Ok(raw),
            Err(message) => error_line(term, message),
        }
    }
}

pub fn validate_username(username: &str) -> Result<(), &'static str> {
    let length = username.chars().count();
    if !(1..=MAX_USERNAME_LEN).contains(&length) {
        return Err("Enter a username made up of 1–64 characters");
    }
    let allowed = |c: char| c.is_alphanumeric() || matches!(c, '_' | '.' | '-' | ' ');
    if !username.chars().all(allowed) {
        return Err("Only use letters, numbers, ., -, _, and spaces");
    }
    Ok(())
}

/// A password, hidden while typed. Must not be empty.
pub fn password(term: &mut dyn Terminal, prompt: &str, error_message: &str) -> Result<String> {
    loop {
        let raw = term.read_secret(prompt)?;
        if !raw.is_empty() {
            return Ok(raw);
        }
        error_line(term, error_message);
    }
}

/// Ask for a new password and return its hash, ready to store.
pub fn new_password(term: &mut dyn Terminal, prompt: &str) -> Result<String> {
    let raw = password(term, prompt, "Enter a password to keep your account secure")?;
    password::hash(&raw)
}

/// A person's name: letters from any script, spaces, `-`, `.` and `'`.
pub fn name(term: &mut dyn Terminal, prompt: &str) -> Result<String> {
    loop {
        let raw = text(term, prompt, "Enter a name")?;
        let allowed =
            |c: char| c.is_alphabetic() || c.is_whitespace() || matches!(c, '-' | '.' | '\'');
        if raw.chars().all(allowed) {
            return Ok(raw);
        }
        error_line(term, "Only use letters, ., -, ', and spaces");
    }
}

/// A `YYYY-MM-DD` date that isn't after today.
pub fn past_date(term: &mut dyn Terminal, prompt: &str) -> Result<NaiveDate> {
    past_date_from(term, prompt, Local::now().date_naive())
}

pub fn past_date_from(
    term: &mut dyn Terminal,
    prompt: &str,
    today: NaiveDate,
) -> Result<NaiveDate> {
    loop {
        let raw = text(term, prompt, "Enter a date")?;
        match NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
            Ok(date) if date <= today => return Ok(date),
            Ok(_) => error_line(term, "Enter a date that's in the past"),
            Err(_) => error_line(term, "Enter a valid date in the format YYYY-MM-DD"),
        }
    }
}

/// A tutor group such as `7CA` or `12A`: a year number then letters. Returned uppercase.
pub fn tutor_group(term: &mut dyn Terminal, prompt: &str) -> Result<String> {
    loop {
        let raw = text(term, prompt, "Enter a tutor group")?.to_uppercase();
        let letters_from = raw.find(|c: char| !c.is_ascii_digit()).unwrap_or(raw.len());
        let (year, letters) = raw.split_at(letters_from);
        let letters_ok = !letters.is_empty() && letters.chars().all(|c| c.is_ascii_uppercase());
        if !year.is_empty() && letters_ok {
            return Ok(raw);
        }
        error_line(term, "Enter a tutor group in a format like 13AX");
    }
}

/// Digits, with optional spaces, `+`, `-` and brackets.
pub fn phone_number(term: &mut dyn Terminal, prompt: &str) -> Result<String> {
    loop {
        let raw = text(term, prompt, "Enter a phone number")?;
        let digits = raw.chars().filter(char::is_ascii_digit).count();
        let allowed = |c: char| c.is_ascii_digit() || matches!(c, ' ' | '+' | '-' | '(' | ')');
        if digits >= 3 && raw.chars().all(allowed) {
            return Ok(raw);
        }
        error_line(term, "Only use numbers, spaces, +, - and brackets");
    }
}

/// Several lines of text, finished with an empty line. At least one line.
pub fn multiline(term: &mut dyn Terminal, prompt: &str) -> Result<String> {
    hint(term, "Press Enter on an empty line to finish.");
    let mut lines = vec![text(term, prompt, "Enter at least one line")?];
    loop {
        let raw = term.read_line("...")?;
        let line = raw.trim();
        if line.is_empty() {
            return Ok(lines.join("\n"));
        }
        lines.push(line.to_string());
    }
}

/// A whole number of at least 1.
pub fn positive_integer(term: &mut dyn Terminal, prompt: &str) -> Result<u32> {
    loop {
        let raw = text(term, prompt, "Enter a number")?;
        match raw.parse::<u32>() {
            Ok(n) if n > 0 => return Ok(n),
            _ => error_line(term, "Enter a whole number, 1 or more"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::is_cancelled;
    use crate::term::ScriptedTerminal;

    #[test]
    fn test_text_reprompts_on_blank() {
        let mut term = ScriptedTerminal::new(["   ", "", "  hello  "]);
        assert_eq!(text(&mut term, "Say", "Enter some text").unwrap(), "hello");
        assert_eq!(
            term.output()
                .iter()
                .filter(|l| l.contains("Enter some text"))
                .count(),
            2
        );
    }

    #[test]
    fn test_username_rules() {
        assert!(validate_username("alice.b-c_d 2").is_ok());
        assert!(validate_username("Zoë").is_ok());
        assert!(validate_username("bad!name").is_err());
        assert!(validate_username(&"x".repeat(65)).is_err());
        assert!(validate_username(&"x".repeat(64)).is_ok());
    }

    #[test]
    fn test_new_username_reprompts() {
        let mut term = ScriptedTerminal::new(["no/slashes", "fine"]);
        assert_eq!(new_username(&mut term, "Create a username").unwrap(), "fine");
        assert!(term.contains("Only use letters"));
    }

    #[test]
    fn test_cancel_propagates() {
        let mut term = ScriptedTerminal::default();
        term.answer("").cancel();
        let err = password(&mut term, "Password", "Enter a password").unwrap_err();
        assert!(is_cancelled(&err));
    }

    #[test]
    fn test_name_rules() {
        let mut term = ScriptedTerminal::new(["R2-D2", "Siobhán O'Neil-Smith"]);
        assert_eq!(name(&mut term, "Forename").unwrap(), "Siobhán O'Neil-Smith");
        assert!(term.contains("Only use letters, ., -, ', and spaces"));
    }

    #[test]
    fn test_past_date() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let mut term = ScriptedTerminal::new(["14/09/2012", "2026-03-02", "2026-03-01"]);
        assert_eq!(past_date_from(&mut term, "Birthday", today).unwrap(), today);
        assert!(term.contains("Enter a valid date in the format YYYY-MM-DD"));
        assert!(term.contains("Enter a date that's in the past"));
    }

    #[test]
    fn test_tutor_group() {
        let mut term = ScriptedTerminal::new(["CA7", "12", "7-A", "13ax"]);
        assert_eq!(tutor_group(&mut term, "Tutor group").unwrap(), "13AX");
        assert_eq!(
            term.output()
                .iter()
                .filter(|l| l.contains("format like 13AX"))
                .count(),
            3
        );
    }

    #[test]
    fn test_phone_number() {
        let mut term = ScriptedTerminal::new(["call me", "+44 (0)1234 567-890"]);
        assert_eq!(
            phone_number(&mut term, "Home phone number").unwrap(),
            "+44 (0)1234 567-890"
        );
    }

    #[test]
    fn test_multiline_until_blank() {
        let mut term = ScriptedTerminal::new(["", "1 Tree Road", " Leafield ", ""]);
        assert_eq!(
            multiline(&mut term, "Home address").unwrap(),
            "1 Tree Road\nLeafield"
        );
    }

    #[test]
    fn test_positive_integer() {
        let mut term = ScriptedTerminal::new(["0", "-3", "three", "42"]);
        assert_eq!(positive_integer(&mut term, "Enter unique ID").unwrap(), 42);
    }

    #[test]
    fn test_new_password_is_hashed() {
        let mut term = ScriptedTerminal::new(["s3cret"]);
        let stored = new_password(&mut term, "Set your password").unwrap();
        assert_ne!(stored, "s3cret");
        assert!(crate::password::verify("s3cret", &stored));
    }
}
