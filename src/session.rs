use crate::app::App;
use crate::breadcrumbs::Breadcrumbs;
use crate::term::Terminal;

/// Everything a page action can touch, passed explicitly down the call chain.
pub struct Session<'t> {
    pub term: &'t mut dyn Terminal,
    pub trail: Breadcrumbs,
    pub app: App,
}

impl<'t> Session<'t> {
    pub fn new(term: &'t mut dyn Terminal, app: App) -> Self {
        Self {
            term,
            trail: Breadcrumbs::new(),
            app,
        }
    }

    /// Print the breadcrumb trail on its own line.
    pub fn show_trail(&mut self) {
        let line = self.trail.render();
        self.term.line(&line);
    }
}
