//! Command implementations for the CLI.

pub mod check;
pub mod run;

pub use check::CheckCommand;
pub use run::RunCommand;
