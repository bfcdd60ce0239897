//! Event and achievement endpoints
//!
//! Listing endpoints are public; the client sends them without credentials.

use super::request::ApiRequest;
use super::{ApiClient, ClientError};
use crate::types::{Achievement, Event, EventRegistration, ListResponse};

pub const EVENTS_PATH: &str = "/events/";
pub const ACHIEVEMENTS_PATH: &str = "/achievements/";

impl ApiClient {
    /// List published events
    pub async fn list_events(&self) -> Result<Vec<Event>, ClientError> {
        let page: ListResponse<Event> = self.execute(ApiRequest::get(EVENTS_PATH)).await?;
        Ok(page.into_items())
    }

    /// Get a single event
    pub async fn get_event(&self, id: i64) -> Result<Event, ClientError> {
        self.execute(ApiRequest::get(format!("{EVENTS_PATH}{id}/")))
            .await
    }

    /// Register the signed-in member for an event
    ///
    /// Posted outside `/events/`, which is public and never carries credentials.
    pub async fn register_for_event(&self, id: i64) -> Result<EventRegistration, ClientError> {
        let request = ApiRequest::post("/registrations/").json(&serde_json::json!({ "event": id }))?;
        self.execute(request).await
    }

    /// List club achievements
    pub async fn list_achievements(&self) -> Result<Vec<Achievement>, ClientError> {
        let page: ListResponse<Achievement> =
            self.execute(ApiRequest::get(ACHIEVEMENTS_PATH)).await?;
        Ok(page.into_items())
    }
}
