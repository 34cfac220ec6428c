//! Global handling of unauthorized responses.

use reqwest::StatusCode;
use tracing::warn;

use crate::error::{ClientError, add_breadcrumb};
use crate::gate::{LOGIN_PATH, Navigator};
use crate::session::SessionStore;

/// Inspect a response status before the caller sees it.
///
/// On 401 the session is cleared and the user is sent to the login page,
/// then [`ClientError::Unauthorized`] is returned for the caller to
/// propagate. Any other status passes through.
///
/// # Errors
///
/// Returns `ClientError::Unauthorized` when `status` is 401.
pub fn intercept(
    status: StatusCode,
    session: &SessionStore,
    navigator: &dyn Navigator,
) -> Result<(), ClientError> {
    if status != StatusCode::UNAUTHORIZED {
        return Ok(());
    }

    warn!("Backend rejected credentials, signing out");
    add_breadcrumb("auth", "unauthorized response", None);
    session.clear();
    navigator.navigate(LOGIN_PATH);
    Err(ClientError::Unauthorized)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::testing::{RecordingNavigator, sample_user};
    use secrecy::SecretString;

    #[test]
    fn test_unauthorized_clears_session_and_redirects() {
        let session = SessionStore::in_memory();
        session.set_credentials(sample_user(), SecretString::from("tok"));
        let navigator = RecordingNavigator::default();

        let result = intercept(StatusCode::UNAUTHORIZED, &session, &navigator);

        assert!(matches!(result, Err(ClientError::Unauthorized)));
        assert!(!session.is_authenticated());
        assert_eq!(navigator.visited(), vec![LOGIN_PATH.to_string()]);
    }

    #[test]
    fn test_other_statuses_pass_through() {
        let session = SessionStore::in_memory();
        session.set_credentials(sample_user(), SecretString::from("tok"));
        let navigator = RecordingNavigator::default();

        for status in [StatusCode::OK, StatusCode::FORBIDDEN, StatusCode::INTERNAL_SERVER_ERROR] {
            intercept(status, &session, &navigator).unwrap();
        }

        assert!(session.is_authenticated());
        assert!(navigator.visited().is_empty());
    }
}
