mod app;

pub use app::{App, ConfirmAction, Focus, InputMode, Row};
