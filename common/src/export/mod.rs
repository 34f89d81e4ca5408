//! Export core modules shared across CLI and other front ends.

pub mod calendar_core;

pub use calendar_core::{output_file_name, project, CALENDAR_HEADERS};
