//! Conversions from external infrastructure errors into domain errors.

use capture_domain::CaptureError;
use keyring::Error as KeyringError;
use reqwest::Error as HttpError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub CaptureError);

impl From<InfraError> for CaptureError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<CaptureError> for InfraError {
    fn from(value: CaptureError) -> Self {
        InfraError(value)
    }
}

trait IntoCaptureError {
    fn into_capture(self) -> CaptureError;
}

/* -------------------------------------------------------------------------- */
/* keyring::Error → CaptureError */
/* -------------------------------------------------------------------------- */

impl IntoCaptureError for KeyringError {
    fn into_capture(self) -> CaptureError {
        use KeyringError::*;

        let description = self.to_string();

        match self {
            NoEntry => CaptureError::Storage("keychain entry not found".into()),
            BadEncoding(_) => {
                CaptureError::Storage("credential in keychain is not valid UTF-8".into())
            }
            TooLong(name, limit) => CaptureError::Storage(format!(
                "keychain attribute '{name}' exceeds platform limit ({limit})"
            )),
            Invalid(attr, reason) => {
                CaptureError::Storage(format!("keychain attribute '{attr}' is invalid: {reason}"))
            }
            Ambiguous(entries) => CaptureError::Storage(format!(
                "multiple keychain entries matched request ({} results)",
                entries.len()
            )),
            PlatformFailure(err) => {
                CaptureError::Storage(format!("keychain platform error: {err}"))
            }
            NoStorageAccess(err) => {
                CaptureError::Storage(format!("unable to access secure storage: {err}"))
            }
            _ => CaptureError::Storage(description),
        }
    }
}

impl From<KeyringError> for InfraError {
    fn from(value: KeyringError) -> Self {
        InfraError(value.into_capture())
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → CaptureError */
/* -------------------------------------------------------------------------- */

impl IntoCaptureError for HttpError {
    fn into_capture(self) -> CaptureError {
        if self.is_timeout() {
            return CaptureError::Timeout(format!("HTTP request timed out: {self}"));
        }

        if self.is_connect() {
            return CaptureError::Network(format!("HTTP connection failure: {self}"));
        }

        if self.is_decode() {
            return CaptureError::Decode(format!("HTTP response could not be decoded: {self}"));
        }

        if self.is_builder() {
            return CaptureError::Internal(format!("invalid HTTP request: {self}"));
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return match code {
                401 | 403 => CaptureError::Auth(message),
                400..=499 => CaptureError::Validation(message),
                _ => CaptureError::Server { status: code, message },
            };
        }

        CaptureError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_capture())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
