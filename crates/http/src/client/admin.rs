//! Admin dashboard endpoints

use super::request::ApiRequest;
use super::{ApiClient, ClientError};
use crate::types::{
    Event, EventInput, EventRegistration, ListResponse, Payment, PaymentReview, PaymentStatus,
    UserProfile, UserUpdate,
};

const ADMIN_USERS_PATH: &str = "/admin/users/";
const ADMIN_PAYMENTS_PATH: &str = "/admin/payments/";
const ADMIN_EVENTS_PATH: &str = "/admin/events/";
const ADMIN_REGISTRATIONS_PATH: &str = "/admin/registrations/";

impl ApiClient {
    /// List all accounts
    pub async fn list_users(&self) -> Result<Vec<UserProfile>, ClientError> {
        let page: ListResponse<UserProfile> =
            self.execute(ApiRequest::get(ADMIN_USERS_PATH)).await?;
        Ok(page.into_items())
    }

    /// Change account flags
    pub async fn update_user(&self, id: i64, update: &UserUpdate) -> Result<UserProfile, ClientError> {
        let request = ApiRequest::patch(format!("{ADMIN_USERS_PATH}{id}/")).json(update)?;
        self.execute(request).await
    }

    pub async fn delete_user(&self, id: i64) -> Result<(), ClientError> {
        self.execute_empty(ApiRequest::delete(format!("{ADMIN_USERS_PATH}{id}/")))
            .await
    }

    /// Payments awaiting review
    pub async fn list_pending_payments(&self) -> Result<Vec<Payment>, ClientError> {
        let request = ApiRequest::get(format!("{ADMIN_PAYMENTS_PATH}?status=pending"));
        let page: ListResponse<Payment> = self.execute(request).await?;
        Ok(page.into_items())
    }

    /// Approve or reject a payment
    pub async fn review_payment(
        &self,
        id: i64,
        status: PaymentStatus,
        remarks: Option<String>,
    ) -> Result<Payment, ClientError> {
        let request = ApiRequest::patch(format!("{ADMIN_PAYMENTS_PATH}{id}/"))
            .json(&PaymentReview { status, remarks })?;
        self.execute(request).await
    }

    /// Registrations for one event
    pub async fn list_registrations(&self, event_id: i64) -> Result<Vec<EventRegistration>, ClientError> {
        let request = ApiRequest::get(format!("{ADMIN_REGISTRATIONS_PATH}?event={event_id}"));
        let page: ListResponse<EventRegistration> = self.execute(request).await?;
        Ok(page.into_items())
    }

    pub async fn create_event(&self, event: &EventInput) -> Result<Event, ClientError> {
        let request = ApiRequest::post(ADMIN_EVENTS_PATH).json(event)?;
        self.execute(request).await
    }

    pub async fn update_event(&self, id: i64, event: &EventInput) -> Result<Event, ClientError> {
        let request = ApiRequest::patch(format!("{ADMIN_EVENTS_PATH}{id}/")).json(event)?;
        self.execute(request).await
    }

    pub async fn delete_event(&self, id: i64) -> Result<(), ClientError> {
        self.execute_empty(ApiRequest::delete(format!("{ADMIN_EVENTS_PATH}{id}/")))
            .await
    }
}
