// Sat Oct 17 2026 - Alex

pub mod core;
pub mod error;
pub mod artifact;
pub mod export;

pub use self::core::{ArtifactLocator, Exposure, Shared};
pub use error::CastsError;
pub use artifact::current_artifact;
pub use export::{exported_c_str, resolve_c_str};
