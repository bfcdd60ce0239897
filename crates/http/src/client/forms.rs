//! External registration form descriptors

use super::request::ApiRequest;
use super::{ApiClient, ClientError};
use crate::types::{FormEmbed, ListResponse};

pub const FORMS_PATH: &str = "/forms/";

impl ApiClient {
    /// Active forms the portal should embed
    pub async fn list_forms(&self) -> Result<Vec<FormEmbed>, ClientError> {
        let page: ListResponse<FormEmbed> = self.execute(ApiRequest::get(FORMS_PATH)).await?;
        Ok(page
            .into_items()
            .into_iter()
            .filter(|form| form.is_active)
            .collect())
    }
}
