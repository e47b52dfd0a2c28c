use console::style;

const SEPARATOR: &str = " › ";

/// Titles of the pages the operator has navigated through, outermost first.
///
/// The trail does no checking of its own: whoever pushes a title is
/// responsible for popping it again on every way out.
#[derive(Debug, Clone, Default)]
pub struct Breadcrumbs {
    entries: Vec<String>,
}

impl Breadcrumbs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a title and return its index.
    pub fn push(&mut self, title: impl Into<String>) -> usize {
        self.entries.push(title.into());
        self.entries.len() - 1
    }

    pub fn pop(&mut self) -> Option<String> {
        self.entries.pop()
    }

    /// Swap the current title for another one (or push it onto an empty trail).
    pub fn replace(&mut self, title: impl Into<String>) -> usize {
        self.entries.pop();
        self.push(title)
    }

    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    pub fn current(&self) -> Option<&str> {
        self.entries.last().map(String::as_str)
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// One display line, with the current page in bold.
    pub fn render(&self) -> String {
        let Some((current, parents)) = self.entries.split_last() else {
            return String::new();
        };

        let mut line = String::new();
        for parent in parents {
            line.push_str(&style(parent).dim().to_string());
            line.push_str(&style(SEPARATOR).dim().to_string());
        }
        line.push_str(&style(current).bold().to_string());
        line
    }
}
