pub mod error;
pub mod types;

pub use error::GalaxyToolError;
pub use types::*;
