//! Authentication and profile endpoints

use super::request::{ApiRequest, FilePart, MultipartBody};
use super::{ApiClient, ClientError};
use crate::types::{
    AuthResponse, LoginRequest, ProfileUpdate, RegisterRequest, TokenRefreshRequest,
    TokenRefreshResponse, UserProfile,
};

pub const LOGIN_PATH: &str = "/auth/login/";
pub const REGISTER_PATH: &str = "/auth/register/";
pub const PROFILE_PATH: &str = "/auth/profile/";
pub const TOKEN_REFRESH_PATH: &str = "/auth/token/refresh/";

impl ApiClient {
    /// Exchange credentials for a token pair and the user record
    ///
    /// The session is not touched; storing the tokens is up to the caller.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ClientError> {
        let request = ApiRequest::post(LOGIN_PATH).json(&LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        })?;
        self.execute(request).await
    }

    /// Create an account
    pub async fn register(&self, data: &RegisterRequest) -> Result<AuthResponse, ClientError> {
        let request = ApiRequest::post(REGISTER_PATH).json(data)?;
        self.execute(request).await
    }

    /// Get the signed-in user's profile
    pub async fn profile(&self) -> Result<UserProfile, ClientError> {
        self.execute(ApiRequest::get(PROFILE_PATH)).await
    }

    /// Update profile fields
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserProfile, ClientError> {
        let request = ApiRequest::put(PROFILE_PATH).json(update)?;
        self.execute(request).await
    }

    /// Replace the profile picture
    pub async fn upload_profile_image(&self, image: FilePart) -> Result<UserProfile, ClientError> {
        let request =
            ApiRequest::put(PROFILE_PATH).multipart(MultipartBody::new().file("profile_image", image));
        self.execute(request).await
    }

    /// Call the refresh endpoint directly, outside the interceptors
    pub async fn refresh_access_token(
        &self,
        refresh_token: &str,
    ) -> Result<TokenRefreshResponse, ClientError> {
        let request = ApiRequest::post(TOKEN_REFRESH_PATH).json(&TokenRefreshRequest {
            refresh: refresh_token.to_string(),
        })?;

        let response = self.dispatch(&request).await?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}
