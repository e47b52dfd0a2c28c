//! Menu-driven terminal front end: breadcrumb navigation, pages with error
//! recovery, a resumable setup guide, and JSON document storage underneath.

pub mod accounts;
pub mod app;
pub mod breadcrumbs;
pub mod config;
pub mod error;
pub mod inputs;
pub mod menu;
pub mod onboarding;
pub mod page;
pub mod password;
pub mod reports;
pub mod session;
pub mod settings;
pub mod store;
pub mod students;
pub mod term;
pub mod ui;
