//! Terminal UI for the ModuMentor chat client.
//!
//! - [`app`] -- [`TuiApp`] state, key handling, and event draining.
//! - [`ui`] -- ratatui rendering of the header, message log, action
//!   sidebar, and input box.
//! - [`run`] -- terminal setup and the draw-and-poll loop.

pub mod app;
pub mod error;
pub mod run;
pub mod ui;

pub use app::{AppAction, TuiApp};
pub use error::{Result, TuiError};
pub use run::run_tui;
