//! Numbered menus of pages and nested submenus.

use anyhow::Result;
use console::style;

use crate::app::App;
use crate::error::is_cancelled;
use crate::page::{Page, Visibility};
use crate::session::Session;
use crate::term::{Terminal, error_line, hint};

pub enum MenuItem {
    Page(Page),
    Submenu(Submenu),
}

impl MenuItem {
    pub fn label(&self) -> &str {
        match self {
            MenuItem::Page(page) => &page.label,
            MenuItem::Submenu(sub) => &sub.label,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            MenuItem::Page(page) => page.description.as_deref(),
            MenuItem::Submenu(sub) => sub.description.as_deref(),
        }
    }

    pub fn is_visible(&self, app: &App) -> bool {
        match self {
            MenuItem::Page(page) => page.is_visible(app),
            MenuItem::Submenu(sub) => sub.is_visible(app),
        }
    }

    pub fn execute(&self, session: &mut Session<'_>) -> Result<()> {
        match self {
            MenuItem::Page(page) => page.execute(session).map(|_| ()),
            MenuItem::Submenu(sub) => sub.menu.show(session, false),
        }
    }
}

impl From<Page> for MenuItem {
    fn from(page: Page) -> Self {
        MenuItem::Page(page)
    }
}

impl From<Submenu> for MenuItem {
    fn from(sub: Submenu) -> Self {
        MenuItem::Submenu(sub)
    }
}

pub struct Submenu {
    pub label: String,
    pub description: Option<String>,
    pub visible: Option<Visibility>,
    pub menu: Menu,
}

impl Submenu {
    pub fn new(label: impl Into<String>, title: impl Into<String>, items: Vec<MenuItem>) -> Self {
        Self {
            label: label.into(),
            description: None,
            visible: None,
            menu: Menu::new(title, items),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn visible_when(mut self, predicate: impl Fn(&App) -> bool + 'static) -> Self {
        self.visible = Some(Box::new(predicate));
        self
    }

    pub fn is_visible(&self, app: &App) -> bool {
        self.visible.as_ref().is_none_or(|predicate| predicate(app))
    }
}

pub struct Menu {
    pub title: String,
    pub items: Vec<MenuItem>,
}

impl Menu {
    pub fn new(title: impl Into<String>, items: Vec<MenuItem>) -> Self {
        Self {
            title: title.into(),
            items,
        }
    }

    /// Show the menu, let the operator pick an item, and run it.
    ///
    /// With `looping` the menu comes back after each action until the operator
    /// picks 0 or cancels the selection. The menu's title is on the trail for
    /// as long as it is open.
    pub fn show(&self, session: &mut Session<'_>, looping: bool) -> Result<()> {
        session.trail.push(self.title.as_str());
        let result = self.run(session, looping);
        session.trail.pop();
        result
    }

    fn run(&self, session: &mut Session<'_>, looping: bool) -> Result<()> {
        loop {
            // Predicates see the state as it is right now, not when the menu was built
            let visible: Vec<&MenuItem> = self
                .items
                .iter()
                .filter(|item| item.is_visible(&session.app))
                .collect();

            if visible.is_empty() {
                session
                    .term
                    .line(&style("No options available. Goodbye!").red().to_string());
                return Ok(());
            }

            session.term.clear();
            render(session, &visible);

            let Some(index) = prompt_selection(session.term, visible.len())? else {
                return Ok(());
            };
            session.term.line("");

            let item = visible[index];
            tracing::debug!(item = item.label(), "menu item selected");
            match item.execute(session) {
                Ok(()) => {}
                Err(e) if is_cancelled(&e) => {
                    tracing::debug!(item = item.label(), "action cancelled");
                }
                Err(e) => return Err(e),
            }

            if !looping {
                return Ok(());
            }
        }
    }
}

fn render(session: &mut Session<'_>, visible: &[&MenuItem]) {
    // Items with descriptions get spread out so each one reads as a block
    let spaced = visible.iter().any(|item| item.description().is_some());

    session.show_trail();
    if spaced {
        session.term.line("");
    }

    for (i, item) in visible.iter().enumerate() {
        if spaced && i > 0 {
            session.term.line("");
        }
        if let Some(description) = item.description() {
            hint(session.term, description);
        }
        session.term.line(&format!("{}) {}", i + 1, item.label()));
    }

    if spaced {
        session.term.line("");
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Exit,
    Item(usize),
}

/// Parse a 1-indexed menu choice out of `max` items.
pub fn parse_selection(raw: &str, max: usize) -> Result<Selection, String> {
    let raw = raw.trim();
    if raw.is_empty() || !raw.chars().all(|c| c.is_ascii_digit()) {
        return Err("Your selection must be a positive number!".to_string());
    }
    let out_of_bounds = || format!("Selection out of bounds: Must be below {}", max + 1);
    let selection: usize = raw.parse().map_err(|_| out_of_bounds())?;

    match selection {
        0 => Ok(Selection::Exit),
        n if n > max => Err(out_of_bounds()),
        n => Ok(Selection::Item(n - 1)),
    }
}

/// Ask for a choice until a valid one is given. `None` means leave the menu.
fn prompt_selection(term: &mut dyn Terminal, max: usize) -> Result<Option<usize>> {
    loop {
        let raw = match term.read_line("Pick an option") {
            Ok(raw) => raw,
            Err(e) if is_cancelled(&e) => {
                term.line(&style("Cancelled!").red().to_string());
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        match parse_selection(&raw, max) {
            Ok(Selection::Exit) => return Ok(None),
            Ok(Selection::Item(index)) => return Ok(Some(index)),
            Err(message) => error_line(term, &message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_selection() {
        assert_eq!(parse_selection("0", 3), Ok(Selection::Exit));
        assert_eq!(parse_selection("1", 3), Ok(Selection::Item(0)));
        assert_eq!(parse_selection(" 3 ", 3), Ok(Selection::Item(2)));
        assert_eq!(
            parse_selection("4", 3),
            Err("Selection out of bounds: Must be below 4".to_string())
        );
        assert!(parse_selection("-1", 3).is_err());
        assert!(parse_selection("two", 3).is_err());
        assert!(parse_selection("", 3).is_err());
        assert!(parse_selection("99999999999999999999999", 3).is_err());
    }
}
