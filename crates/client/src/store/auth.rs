//! Auth slice: the lifecycle of sign-up, sign-in and sign-out requests.
//!
//! The identity itself lives in the [`SessionStore`]; this slice only
//! tracks whether an auth request is in flight and how the last one ended.

use std::future::Future;

use secrecy::{ExposeSecret, SecretString};

use super::profile::ProfileSlice;
use super::resource::{AsyncResource, Lifecycle, Slice};
use crate::api::{Backend, Credentials, GoogleLoginRequest, RegisterRequest};
use crate::error::ClientError;
use crate::session::SessionStore;

const REGISTER_FAILED: &str = "Registration failed";
const GOOGLE_FAILED: &str = "Google sign-in failed";
const LOGOUT_FAILED: &str = "Logout failed";
const PASSWORD_MISMATCH: &str = "Passwords do not match";

#[derive(Debug)]
pub struct AuthSlice {
    slice: Slice<()>,
}

impl Default for AuthSlice {
    fn default() -> Self {
        Self {
            slice: Slice::new("auth", ()),
        }
    }
}

impl AuthSlice {
    pub async fn register(
        &self,
        backend: &impl Backend,
        session: &SessionStore,
        profile: &ProfileSlice,
        request: RegisterRequest,
        confirm_password: &SecretString,
    ) -> Lifecycle {
        if request.password.expose_secret() != confirm_password.expose_secret() {
            return self.slice.reject_locally("register", PASSWORD_MISMATCH);
        }
        self.sign_in("register", REGISTER_FAILED, session, profile, backend.register(&request))
            .await
    }

    pub async fn login_with_google(
        &self,
        backend: &impl Backend,
        session: &SessionStore,
        profile: &ProfileSlice,
        request: GoogleLoginRequest,
    ) -> Lifecycle {
        self.sign_in(
            "login_with_google",
            GOOGLE_FAILED,
            session,
            profile,
            backend.google_login(&request),
        )
        .await
    }

    /// End the server session, then the local one. The local session is
    /// cleared even when the backend call fails.
    pub async fn logout(&self, backend: &impl Backend, session: &SessionStore) -> Lifecycle {
        let outcome = self
            .slice
            .run("logout", LOGOUT_FAILED, backend.logout(), |_, ()| {})
            .await;
        session.clear();
        outcome
    }

    /// Establish the session before the slice settles, so observers never
    /// see a fulfilled sign-in without a session.
    async fn sign_in<F>(
        &self,
        op: &'static str,
        fallback: &str,
        session: &SessionStore,
        profile: &ProfileSlice,
        request: F,
    ) -> Lifecycle
    where
        F: Future<Output = Result<Credentials, ClientError>>,
    {
        let establish = async {
            let Credentials { user, token } = request.await?;
            session.set_credentials(user.clone(), token);
            profile.seed(&user);
            Ok::<(), ClientError>(())
        };
        self.slice.run(op, fallback, establish, |_, ()| {}).await
    }

    #[must_use]
    pub fn snapshot(&self) -> AsyncResource<()> {
        self.slice.snapshot()
    }
}
