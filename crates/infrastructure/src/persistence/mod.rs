//! Local persistence.

mod token_file;

pub use token_file::{FileTokenStore, TokenFileError};
