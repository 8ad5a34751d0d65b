//! `capture sign-out`

use capture_domain::Result;

use crate::context::AppContext;
use crate::utils::execute_logged;

/// Drop the cached session and delete the stored anonymous user
///
/// The next command registers a new user.
///
/// # Errors
/// Returns [`capture_domain::CaptureError::Storage`] when the credentials
/// cannot be deleted.
pub async fn sign_out(ctx: &AppContext) -> Result<()> {
    execute_logged("sign_out", || async { ctx.sessions().sign_out().await }).await
}
