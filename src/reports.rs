//! Read-only reports over the pupil records.

use anyhow::Result;
use chrono::{Datelike, Local, NaiveDate};
use console::style;

use crate::inputs;
use crate::menu::Submenu;
use crate::page::{Flow, Page};
use crate::session::Session;
use crate::students::{Student, format_date};
use crate::term::{Terminal, hint};

/// How far ahead the birthday report looks, in days.
pub const BIRTHDAY_WINDOW: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameField {
    Surname,
    Forename,
}

/// The next time `birthday` comes round, on or after `today`. A 29 February
/// birthday falls on the 28th in other years.
pub fn next_birthday(birthday: NaiveDate, today: NaiveDate) -> NaiveDate {
    let in_year = |year: i32| {
        birthday
            .with_year(year)
            .or_else(|| NaiveDate::from_ymd_opt(year, 2, 28))
            .unwrap_or(today)
    };
    let this_year = in_year(today.year());
    if this_year >= today {
        this_year
    } else {
        in_year(today.year() + 1)
    }
}

/// Students with a birthday in the next [`BIRTHDAY_WINDOW`] days, soonest first.
pub fn upcoming_birthdays(students: &[Student], today: NaiveDate) -> Vec<(&Student, NaiveDate)> {
    let mut upcoming: Vec<_> = students
        .iter()
        .map(|student| (student, next_birthday(student.birthday, today)))
        .filter(|(_, next)| (*next - today).num_days() <= BIRTHDAY_WINDOW)
        .collect();
    upcoming.sort_by_key(|(student, next)| (*next, student.id));
    upcoming
}

/// Students whose name starts with `prefix` (ignoring case), sorted by that name.
pub fn names_starting_with<'s>(
    students: &'s [Student],
    field: NameField,
    prefix: &str,
) -> Vec<&'s Student> {
    let prefix = prefix.to_lowercase();
    let mut matches: Vec<&Student> = students
        .iter()
        .filter(|student| name_of(student, field).to_lowercase().starts_with(&prefix))
        .collect();
    matches.sort_by(|a, b| name_of(a, field).cmp(name_of(b, field)).then(a.id.cmp(&b.id)));
    matches
}

fn name_of(student: &Student, field: NameField) -> &str {
    match field {
        NameField::Surname => &student.surname,
        NameField::Forename => &student.forename,
    }
}

fn report_line(term: &mut dyn Terminal, index: usize, text: &str, suffix: Option<&str>) {
    let number = style(format!("{:>3})", index + 1)).dim();
    match suffix {
        Some(suffix) => term.line(&format!("{number} {text} {}", style(suffix).dim())),
        None => term.line(&format!("{number} {text}")),
    }
}

fn nobody(term: &mut dyn Terminal) {
    hint(term, "No students match this report.");
}

fn birthdays_page(session: &mut Session<'_>) -> Result<Flow> {
    let today = Local::now().date_naive();
    let students = session.app.students.all();
    let upcoming = upcoming_birthdays(students, today);

    if upcoming.is_empty() {
        nobody(session.term);
    }
    for (i, (student, next)) in upcoming.iter().enumerate() {
        report_line(session.term, i, &format_date(*next), Some(student.full_name.as_str()));
    }
    Ok(Flow::Done)
}

fn names_page(session: &mut Session<'_>, field: NameField) -> Result<Flow> {
    let label = match field {
        NameField::Surname => "Include surnames that start with",
        NameField::Forename => "Include forenames that start with",
    };
    let prefix = inputs::text(session.term, label, "Enter at least one letter")?;
    session.term.line("");

    let students = session.app.students.all();
    let matches = names_starting_with(students, field, &prefix);
    if matches.is_empty() {
        nobody(session.term);
    }
    for (i, student) in matches.iter().enumerate() {
        let name = match field {
            NameField::Surname => format!("{}, {}", student.surname, student.forename),
            NameField::Forename => format!("{} {}", student.forename, student.surname),
        };
        report_line(session.term, i, &name, None);
    }
    Ok(Flow::Done)
}

pub fn reports_menu() -> Submenu {
    Submenu::new(
        "View student reports",
        "Reports",
        vec![
            Page::new("Upcoming birthdays", birthdays_page)
                .description(
                    "Students whose birthdays are in the next 30 days. \
                     Handy for the noticeboard, or for wishing someone a happy birthday.",
                )
                .into(),
            Page::new("Surnames starting with...", |s: &mut Session<'_>| {
                names_page(s, NameField::Surname)
            })
            .description(
                "Students whose surnames begin with the letters you choose, sorted alphabetically. \
                 Useful for deciding who leaves the classroom first, or as a last resort for the register.",
            )
            .into(),
            Page::new("Forenames starting with...", |s: &mut Session<'_>| {
                names_page(s, NameField::Forename)
            })
            .description(
                "Students whose forenames begin with the letters you choose, sorted alphabetically. \
                 Helps spot similar names that could be confused.",
            )
            .into(),
        ],
    )
    .visible_when(|app| app.signed_in())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn student(id: u32, forename: &str, surname: &str, birthday: NaiveDate) -> Student {
        Student {
            id,
            surname: surname.into(),
            forename: forename.into(),
            full_name: format!("{forename} {surname}"),
            birthday,
            tutor_group: "9A".into(),
            home_address: String::new(),
            home_phone: String::new(),
            school_email: format!("{}@x", surname.to_lowercase()),
        }
    }

    #[test]
    fn test_next_birthday() {
        let today = date(2026, 6, 10);
        assert_eq!(next_birthday(date(2012, 6, 10), today), date(2026, 6, 10));
        assert_eq!(next_birthday(date(2012, 7, 1), today), date(2026, 7, 1));
        assert_eq!(next_birthday(date(2012, 1, 5), today), date(2027, 1, 5));
        assert_eq!(next_birthday(date(2012, 2, 29), today), date(2027, 2, 28));
    }

    #[test]
    fn test_upcoming_birthdays_window_and_order() {
        let students = vec![
            student(1, "Ada", "Lovelace", date(2012, 7, 9)),
            student(2, "Alan", "Turing", date(2012, 6, 20)),
            student(3, "Grace", "Hopper", date(2012, 7, 11)),
            student(4, "Edsger", "Dijkstra", date(2012, 6, 9)),
        ];
        let found: Vec<u32> = upcoming_birthdays(&students, date(2026, 6, 10))
            .iter()
            .map(|(s, _)| s.id)
            .collect();
        // 9 July is exactly 29 days away; 11 July and yesterday are out
        assert_eq!(found, [2, 1]);
    }

    #[test]
    fn test_upcoming_birthdays_cross_new_year() {
        let students = vec![student(1, "Ada", "Lovelace", date(2012, 1, 3))];
        assert_eq!(upcoming_birthdays(&students, date(2026, 12, 20)).len(), 1);
    }

    #[test]
    fn test_names_starting_with() {
        let students = vec![
            student(1, "Bea", "Smith", date(2012, 1, 1)),
            student(2, "amy", "Stone", date(2012, 1, 1)),
            student(3, "Sam", "Archer", date(2012, 1, 1)),
        ];
        let surnames: Vec<u32> = names_starting_with(&students, NameField::Surname, "S")
            .iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(surnames, [1, 2]);

        let forenames = names_starting_with(&students, NameField::Forename, "A");
        assert_eq!(forenames.len(), 1);
        assert_eq!(forenames[0].id, 2);
        assert!(names_starting_with(&students, NameField::Surname, "z").is_empty());
    }
}
