//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! The cookie carries the signed-in member and a random store key. The store
//! key selects the member's [`crate::domain::SessionStore`]; it is rotated on
//! every sign-in so a new session never sees a previous session's slices.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use tracing::warn;
use uuid::Uuid;

use crate::domain::{Error, SignedInMember};
use crate::domain::content::Verify;

pub(crate) const MEMBER_KEY: &str = "member";
pub(crate) const STORE_KEY: &str = "store_key";

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Wrap an actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Persist `member` and assign a fresh store key.
    pub fn sign_in(&self, member: &SignedInMember) -> Result<String, Error> {
        self.0.renew();
        let store_key = Uuid::new_v4().to_string();
        self.0
            .insert(MEMBER_KEY, member)
            .and_then(|()| self.0.insert(STORE_KEY, &store_key))
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))?;
        Ok(store_key)
    }

    /// Drop everything held in the cookie. Returns the old store key.
    pub fn sign_out(&self) -> Option<String> {
        let store_key = self.store_key();
        self.0.purge();
        store_key
    }

    /// The signed-in member, if the cookie holds a valid one.
    pub fn member(&self) -> Result<Option<SignedInMember>, Error> {
        let member = self
            .0
            .get::<SignedInMember>(MEMBER_KEY)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))?;
        Ok(member.filter(|member| match member.verify() {
            Ok(()) => true,
            Err(error) => {
                warn!(%error, "invalid member in session cookie");
                false
            }
        }))
    }

    /// Require a signed-in member or return `401 Unauthorized`.
    pub fn require_member(&self) -> Result<SignedInMember, Error> {
        self.member()?
            .ok_or_else(|| Error::unauthorized("sign-in required"))
    }

    /// Require a signed-in admin: `401` when signed out, `403` otherwise.
    pub fn require_admin(&self) -> Result<SignedInMember, Error> {
        let member = self.require_member()?;
        if member.is_admin() {
            Ok(member)
        } else {
            Err(Error::forbidden("admin role required"))
        }
    }

    /// Key of this session's slice store, if assigned.
    pub fn store_key(&self) -> Option<String> {
        self.0.get::<String>(STORE_KEY).ok().flatten()
    }

    /// Store key for the current session, creating one when a member is
    /// signed in but the cookie predates store keys.
    pub fn ensure_store_key(&self) -> Result<String, Error> {
        if let Some(key) = self.store_key() {
            return Ok(key);
        }
        let key = Uuid::new_v4().to_string();
        self.0
            .insert(STORE_KEY, &key)
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))?;
        Ok(key)
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}
