//! Guard layer for mutating admin requests.
//!
//! A [`Guarded`] extractor runs, in order: session authentication, the
//! action's capability check, form parsing and the anti-forgery token check.
//! Handlers only ever see requests that passed all of them, so no mutation
//! can happen on a rejected request.

use std::marker::PhantomData;

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Request},
    Form,
};
use serde::de::DeserializeOwned;

use crate::{
    error::{AppError, PageError},
    models::{user::UserClaims, Capability},
    AppState,
};

use super::SessionUser;

/// Form submission carrying an anti-forgery token
pub trait NonceCarrier {
    fn nonce(&self) -> &str;
}

/// A mutating action: the capability it requires and the scope of its token
pub trait GuardedAction: Send + Sync + 'static {
    type Form: DeserializeOwned + NonceCarrier + Send;

    const CAPABILITY: Capability;

    /// Single-use tokens are burned on verification; shared ones stay valid
    /// until they expire
    const SINGLE_USE: bool = true;

    /// Token scope for this submission
    fn nonce_action(form: &Self::Form) -> String;
}

/// A request that passed authentication, the capability check and the token
/// check for action `A`
pub struct Guarded<A: GuardedAction> {
    pub claims: UserClaims,
    pub form: A::Form,
    _action: PhantomData<A>,
}

#[async_trait]
impl<A: GuardedAction> FromRequest<AppState> for Guarded<A> {
    type Rejection = PageError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let (mut parts, body) = req.into_parts();
        let SessionUser(claims) = SessionUser::from_request_parts(&mut parts, state).await?;
        claims.require(A::CAPABILITY)?;

        let req = Request::from_parts(parts, body);
        let Form(form) = Form::<A::Form>::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;

        let action = A::nonce_action(&form);
        let nonces = &state.services.nonces;
        if A::SINGLE_USE {
            nonces.consume(claims.user_id, &action, form.nonce()).await?;
        } else {
            nonces.verify(claims.user_id, &action, form.nonce()).await?;
        }

        Ok(Guarded {
            claims,
            form,
            _action: PhantomData,
        })
    }
}
