pub mod error;
pub mod params;
pub mod session;
pub mod types;
pub mod validation;

pub mod development;

#[cfg(feature = "sensitivity")]
pub mod sensitivity;

pub use error::DevModelError;
pub use params::ParameterSet;
pub use session::DealSession;
pub use types::*;

/// Standard result type for all devmodel operations
pub type DevModelResult<T> = Result<T, DevModelError>;
