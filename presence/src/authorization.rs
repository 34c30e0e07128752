//! Subscription authorization

use std::sync::Arc;

use crate::contact::Contact;

/// Request sent to a contact asking to see their presence
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AuthorizationRequest {
    pub reason: String,
}

impl AuthorizationRequest {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationResponseCode {
    Accept,
    Reject,
    Ignore,
}

/// Answer to an [`AuthorizationRequest`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationResponse {
    pub code: AuthorizationResponseCode,
    pub reason: Option<String>,
}

impl AuthorizationResponse {
    pub fn accept() -> Self {
        Self {
            code: AuthorizationResponseCode::Accept,
            reason: None,
        }
    }

    pub fn reject(reason: impl Into<String>) -> Self {
        Self {
            code: AuthorizationResponseCode::Reject,
            reason: Some(reason.into()),
        }
    }

    pub fn is_rejected(&self) -> bool {
        self.code == AuthorizationResponseCode::Reject
    }
}

/// Decides on subscriptions in both directions
///
/// The subscribing side creates the request and is told the outcome. The
/// subscribed-to side, if it has a handler, decides.
pub trait AuthorizationHandler: Send + Sync {
    fn create_authorization_request(&self, contact: &Arc<Contact>) -> AuthorizationRequest;

    fn process_authorization_request(
        &self,
        request: &AuthorizationRequest,
        from: &Arc<Contact>,
    ) -> AuthorizationResponse;

    fn process_authorization_response(&self, response: &AuthorizationResponse, contact: &Arc<Contact>);
}

/// Handler that grants every request
#[derive(Debug, Default, Clone, Copy)]
pub struct AcceptAll;

impl AuthorizationHandler for AcceptAll {
    fn create_authorization_request(&self, _contact: &Arc<Contact>) -> AuthorizationRequest {
        AuthorizationRequest::new("Please add me to your contact list")
    }

    fn process_authorization_request(
        &self,
        _request: &AuthorizationRequest,
        _from: &Arc<Contact>,
    ) -> AuthorizationResponse {
        AuthorizationResponse::accept()
    }

    fn process_authorization_response(&self, _response: &AuthorizationResponse, _contact: &Arc<Contact>) {}
}
