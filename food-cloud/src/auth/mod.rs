//! Session tokens and request authentication

pub mod extractor;
pub mod session;

pub use extractor::AuthUser;
pub use session::{AdminIdentity, SessionIssuer};
