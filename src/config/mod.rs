pub mod cli;
pub mod types;

pub use cli::CliArgs;
pub use types::{Config, FileTypeTable, LibraryKind, Resolution};
