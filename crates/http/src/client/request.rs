//! Request descriptors
//!
//! An [`ApiRequest`] is plain data so the client can resubmit it after a
//! token refresh. Bodies are rebuilt into reqwest types on every send.

use super::error::ClientError;
use bytes::Bytes;
use reqwest::Method;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use reqwest::multipart::{Form, Part};
use serde::Serialize;
use serde_json::Value;

/// One outbound call
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the base URL, or an absolute URL
    pub path: String,
    pub headers: HeaderMap,
    pub body: RequestBody,
}

/// Request payload
#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(Value),
    Multipart(MultipartBody),
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            body: RequestBody::Empty,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Attach a JSON body
    ///
    /// # Errors
    ///
    /// Returns an error if `body` cannot be serialized
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, ClientError> {
        self.body = RequestBody::Json(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Attach a multipart body
    pub fn multipart(mut self, body: MultipartBody) -> Self {
        self.body = RequestBody::Multipart(body);
        self
    }

    /// Set a header, replacing any previous value
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Set `Authorization: Bearer <token>`
    ///
    /// Returns `false` when the token cannot be expressed as a header value.
    pub fn set_bearer(&mut self, token: &str) -> bool {
        match HeaderValue::from_str(&format!("Bearer {token}")) {
            Ok(mut value) => {
                value.set_sensitive(true);
                self.headers.insert(AUTHORIZATION, value);
                true
            }
            Err(_) => false,
        }
    }

    /// Drop any `Authorization` header
    pub fn clear_authorization(&mut self) -> bool {
        self.headers.remove(AUTHORIZATION).is_some()
    }

    pub fn authorization(&self) -> Option<&HeaderValue> {
        self.headers.get(AUTHORIZATION)
    }
}

/// A file attached to a multipart body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl FilePart {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Multipart form data that can be rebuilt for every attempt
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartBody {
    text: Vec<(String, String)>,
    files: Vec<(String, FilePart)>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.text.push((name.into(), value.into()));
        self
    }

    /// Add a text field only when a value is present
    pub fn text_opt(self, name: impl Into<String>, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(value) => self.text(name, value),
            None => self,
        }
    }

    pub fn file(mut self, name: impl Into<String>, file: FilePart) -> Self {
        self.files.push((name.into(), file));
        self
    }

    pub fn text_fields(&self) -> &[(String, String)] {
        &self.text
    }

    pub fn file_fields(&self) -> &[(String, FilePart)] {
        &self.files
    }

    /// Build a fresh reqwest form
    ///
    /// # Errors
    ///
    /// Returns an error if a file part carries an invalid content type
    pub fn to_form(&self) -> Result<Form, ClientError> {
        let mut form = Form::new();
        for (name, value) in &self.text {
            form = form.text(name.clone(), value.clone());
        }
        for (name, file) in &self.files {
            let part = Part::bytes(file.bytes.to_vec())
                .file_name(file.file_name.clone())
                .mime_str(&file.content_type)
                .map_err(|err| {
                    ClientError::InvalidRequest(format!(
                        "invalid content type '{}' for {name}: {err}",
                        file.content_type
                    ))
                })?;
            form = form.part(name.clone(), part);
        }
        Ok(form)
    }
}
