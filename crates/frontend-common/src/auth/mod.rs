//! Authentication state shared by club portal front ends

pub mod error_messages;
pub mod store;

pub use error_messages::user_friendly_error;
pub use store::{AuthAction, AuthState, AuthStatus, AuthStore};
