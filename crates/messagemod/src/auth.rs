//! Authentication hook for establishing sender identity.
//!
//! The submission handler never trusts an identity declared inside a
//! payload. Identity is assigned exactly once per connection, during the
//! handshake, by whatever implements [`Authenticator`]. The framework calls
//! it with the token from the `Hello` frame and attaches the returned
//! [`SenderId`] to every submission on that connection.

use messagemod_protocol::SenderId;
use uuid::Uuid;

/// The token presented during the handshake was rejected.
#[derive(Debug, thiserror::Error)]
#[error("authentication failed: {0}")]
pub struct AuthError(pub String);

/// Validates a client's handshake token and returns their identity.
pub trait Authenticator: Send + Sync + 'static {
    /// Validates the given token and returns the sender's identity.
    ///
    /// `token` is whatever the client put in its `Hello` frame; `None`
    /// when the client sent no token at all.
    fn authenticate(
        &self,
        token: Option<&str>,
    ) -> impl std::future::Future<Output = Result<SenderId, AuthError>> + Send;
}

/// Accepts the token as a literal UUID and uses it as the identity.
///
/// Suitable when an upstream launcher or session service hands the client
/// a UUID it has already verified.
pub struct TokenAuth;

impl Authenticator for TokenAuth {
    async fn authenticate(
        &self,
        token: Option<&str>,
    ) -> Result<SenderId, AuthError> {
        let token = token
            .ok_or_else(|| AuthError("missing token".into()))?;
        let uuid = Uuid::parse_str(token)
            .map_err(|_| AuthError("token must be a UUID".into()))?;
        Ok(SenderId(uuid))
    }
}

/// Assigns every connection a fresh random identity.
///
/// For development and demos only — identities do not survive reconnects.
pub struct AnonymousAuth;

impl Authenticator for AnonymousAuth {
    async fn authenticate(
        &self,
        _token: Option<&str>,
    ) -> Result<SenderId, AuthError> {
        Ok(SenderId::random())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_token_auth_accepts_uuid() {
        let uuid = Uuid::new_v4();
        let id = TokenAuth
            .authenticate(Some(&uuid.to_string()))
            .await
            .unwrap();
        assert_eq!(id, SenderId(uuid));
    }

    #[tokio::test]
    async fn test_token_auth_rejects_missing_token() {
        let err = TokenAuth.authenticate(None).await.unwrap_err();
        assert!(err.to_string().contains("missing token"));
    }

    #[tokio::test]
    async fn test_token_auth_rejects_non_uuid() {
        let err = TokenAuth
            .authenticate(Some("not-a-uuid"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("UUID"));
    }

    #[tokio::test]
    async fn test_anonymous_auth_assigns_distinct_identities() {
        let a = AnonymousAuth.authenticate(None).await.unwrap();
        let b = AnonymousAuth.authenticate(None).await.unwrap();
        assert_ne!(a, b);
    }
}
