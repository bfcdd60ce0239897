//! User-friendly error message mappings

use club_http::ClientError;

/// Convert a client error into a message fit for an end user
///
/// Validation failures keep the backend's field messages; everything else
/// maps to a fixed sentence so transport details never reach the screen.
pub fn user_friendly_error(error: &ClientError) -> String {
    if let Some(fields) = error.field_errors()
        && !fields.is_empty()
    {
        return fields.to_string();
    }

    if error.is_transport() {
        return "Could not reach the server. Check your connection and try again.".to_string();
    }

    match error {
        ClientError::AuthenticationFailed(_) => {
            "Your session has expired. Please log in again.".to_string()
        }
        ClientError::Forbidden(_) => "You do not have permission to do that.".to_string(),
        ClientError::NotFound(_) => "The requested item could not be found.".to_string(),
        ClientError::BadRequest(message) if !message.trim().is_empty() => message.clone(),
        ClientError::BadRequest(_) => "The request was rejected. Check your input.".to_string(),
        ClientError::ServerError { .. } => {
            "The server ran into a problem. Please try again later.".to_string()
        }
        ClientError::Serialization(_) => "The server sent an unexpected response.".to_string(),
        ClientError::Request(_) | ClientError::InvalidRequest(_) | ClientError::Configuration(_) => {
            "Something went wrong. Please try again.".to_string()
        }
    }
}
