//! Pupil records, kept as a JSON array in `students.json`.

use anyhow::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::StoreError;
use crate::store::DocumentStore;
use crate::term::{Terminal, bold, info_line};

pub const EMAIL_DOMAIN: &str = "tree-road.edu";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: u32,
    pub surname: String,
    pub forename: String,
    pub full_name: String,
    /// Stored as `YYYY-MM-DD`.
    pub birthday: NaiveDate,
    pub tutor_group: String,
    pub home_address: String,
    pub home_phone: String,
    pub school_email: String,
}

/// What the operator types in when registering a student. The id and the
/// school email address are generated.
#[derive(Debug, Clone)]
pub struct NewStudent {
    pub surname: String,
    pub forename: String,
    pub birthday: NaiveDate,
    pub tutor_group: String,
    pub home_address: String,
    pub home_phone: String,
}

#[derive(Debug)]
pub struct StudentStore {
    store: DocumentStore<Vec<Student>>,
}

impl StudentStore {
    pub fn open(path: impl Into<PathBuf>, seed: Option<&Path>) -> Result<Self, StoreError> {
        Ok(Self {
            store: DocumentStore::open(path, Vec::new(), seed)?,
        })
    }

    pub fn path(&self) -> &Path {
        self.store.path()
    }

    pub fn all(&self) -> &[Student] {
        self.store.data()
    }

    pub fn len(&self) -> usize {
        self.store.data().len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.data().is_empty()
    }

    pub fn get(&self, id: u32) -> Option<&Student> {
        self.store.data().iter().find(|student| student.id == id)
    }

    pub fn get_by_email(&self, email: &str) -> Option<&Student> {
        let wanted = email.to_lowercase();
        self.store
            .data()
            .iter()
            .find(|student| student.school_email == wanted)
    }

    /// One more than the highest id in use.
    pub fn next_id(&self) -> u32 {
        self.store
            .data()
            .iter()
            .map(|student| student.id)
            .max()
            .map_or(1, |id| id + 1)
    }

    /// `surname` + first letter of `forename` at the school domain, with a
    /// number appended when that address is already taken.
    pub fn generate_email(&self, surname: &str, forename: &str) -> String {
        let surname: String = surname
            .chars()
            .filter(|c| c.is_alphanumeric())
            .flat_map(char::to_lowercase)
            .collect();
        let initial: String = forename
            .chars()
            .find(|c| c.is_alphanumeric())
            .into_iter()
            .flat_map(char::to_lowercase)
            .collect();

        let mut discriminator = 0u32;
        loop {
            let suffix = if discriminator == 0 {
                String::new()
            } else {
                discriminator.to_string()
            };
            let candidate = format!("{surname}{initial}{suffix}@{EMAIL_DOMAIN}");
            if self.get_by_email(&candidate).is_none() {
                return candidate;
            }
            discriminator += 1;
        }
    }

    /// Normalise and store a new student, then save.
    pub fn add(&mut self, new: NewStudent) -> Result<&Student> {
        let surname = title_case(new.surname.trim());
        let forename = title_case(new.forename.trim());
        let student = Student {
            id: self.next_id(),
            school_email: self.generate_email(&surname, &forename),
            full_name: format!("{forename} {surname}"),
            surname,
            forename,
            birthday: new.birthday,
            tutor_group: new.tutor_group.trim().to_uppercase(),
            home_address: new.home_address,
            home_phone: new.home_phone,
        };

        tracing::debug!(id = student.id, "registering student");
        let data = self.store.data_mut();
        data.push(student);
        let index = data.len() - 1;
        self.store.save()?;
        Ok(&self.store.data()[index])
    }
}

/// Capitalise the first letter of every word; a word starts after anything
/// that isn't a letter ("o'neil-smith" becomes "O'Neil-Smith").
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for c in text.chars() {
        if at_word_start {
            out.extend(c.to_uppercase());
        } else {
            out.extend(c.to_lowercase());
        }
        at_word_start = !c.is_alphabetic();
    }
    out
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%-d %B %Y").to_string()
}

pub fn show_student(term: &mut dyn Terminal, student: &Student) {
    let id = console::style(format!("(#{})", student.id)).dim();
    term.line(&format!("Details for {} {id}", bold(&student.full_name)));
    info_line(term, "Surname", &student.surname);
    info_line(term, "Forename", &student.forename);
    info_line(term, "Birthday", format_date(student.birthday));
    info_line(term, "Tutor group", &student.tutor_group);
    info_line(term, "Home address", student.home_address.replace('\n', ", "));
    info_line(term, "Home phone number", &student.home_phone);
    info_line(term, "School email address", &student.school_email);
}
