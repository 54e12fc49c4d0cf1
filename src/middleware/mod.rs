pub mod auth;
pub mod csrf;
pub mod response;

pub use auth::{require_user, CurrentUser};
pub use csrf::{csrf_error_handler, csrf_protection};
pub use response::{EnvelopeError, EnvelopeResult, StatusEnvelope};
