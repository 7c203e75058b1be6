//! Authenticated session handed to the checkout components

use shared::client::LoginResponse;
use shared::models::{Role, UserInfo};
use shared::navigation::{MenuItem, menu_for};

use crate::error::{ClientError, ClientResult};

/// Who is using the client, and the token their calls carry.
///
/// Built once after login and passed by value into [`crate::CheckoutFlow`]
/// and [`crate::ReturnHandler`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    token: Option<String>,
    user: UserInfo,
}

impl Session {
    /// Creates a session for a known user without a token.
    pub fn new(user: UserInfo) -> Self {
        Self { token: None, user }
    }

    /// Sets the bearer token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Builds a session from the login endpoint's response.
    pub fn from_login(response: LoginResponse) -> ClientResult<Self> {
        if !response.is_success() {
            return match response.message.as_str() {
                "Incorrect password" => Err(ClientError::Unauthorized),
                "No record found with this name" => Err(ClientError::NotFound(response.message)),
                _ => Err(ClientError::InvalidResponse(response.message)),
            };
        }

        let user = response
            .user
            .ok_or_else(|| ClientError::InvalidResponse("Missing user data".to_string()))?;
        let token = response
            .token
            .ok_or_else(|| ClientError::InvalidResponse("Missing token".to_string()))?;

        Ok(Self::new(user).with_token(token))
    }

    /// Returns the bearer token if available.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Returns the current user.
    pub fn user(&self) -> &UserInfo {
        &self.user
    }

    pub fn role(&self) -> Role {
        self.user.role
    }

    /// Sidebar entries for this user's role.
    pub fn menu(&self) -> Vec<MenuItem> {
        menu_for(self.user.role, Some(&self.user.id))
    }
}
