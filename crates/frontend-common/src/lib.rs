//! Shared front-end logic for the club portal
//!
//! Front ends (the CLI today) build on three pieces: the [`AuthStore`] that
//! tracks who is signed in, client-side [`forms`] validation, and
//! [`user_friendly_error`] for turning client errors into readable text.

pub mod auth;
pub mod forms;

pub use auth::{AuthState, AuthStatus, AuthStore, user_friendly_error};
pub use forms::{PaymentForm, RegistrationForm, ValidationError};
