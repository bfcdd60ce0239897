//! Membership and event payment endpoints

use super::request::{ApiRequest, FilePart, MultipartBody};
use super::{ApiClient, ClientError};
use crate::types::{ListResponse, Payment};

pub const PAYMENTS_PATH: &str = "/payments/";

/// A payment receipt to upload
#[derive(Debug, Clone)]
pub struct PaymentSubmission {
    pub purpose: String,
    pub amount: String,
    pub transaction_id: String,
    pub event: Option<i64>,
    pub receipt: FilePart,
}

impl PaymentSubmission {
    fn into_multipart(self) -> MultipartBody {
        MultipartBody::new()
            .text("purpose", self.purpose)
            .text("amount", self.amount)
            .text("transaction_id", self.transaction_id)
            .text_opt("event", self.event.map(|id| id.to_string()))
            .file("receipt", self.receipt)
    }
}

impl ApiClient {
    /// List the signed-in member's payments
    pub async fn list_payments(&self) -> Result<Vec<Payment>, ClientError> {
        let page: ListResponse<Payment> = self.execute(ApiRequest::get(PAYMENTS_PATH)).await?;
        Ok(page.into_items())
    }

    /// Get one payment
    pub async fn get_payment(&self, id: i64) -> Result<Payment, ClientError> {
        self.execute(ApiRequest::get(format!("{PAYMENTS_PATH}{id}/")))
            .await
    }

    /// Upload a receipt for review
    pub async fn submit_payment(&self, submission: PaymentSubmission) -> Result<Payment, ClientError> {
        let request = ApiRequest::post(format!("{PAYMENTS_PATH}submit/"))
            .multipart(submission.into_multipart());
        self.execute(request).await
    }
}
