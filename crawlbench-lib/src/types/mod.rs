mod error;
mod outcome;

pub use error::ErrorKind;
pub use outcome::Outcome;

/// The result type alias used across the library.
pub type Result<T> = std::result::Result<T, ErrorKind>;
