//! Anonymous user credential generation

use capture_domain::constants::GENERATED_PASSWORD_LENGTH;
use capture_domain::UserCredentials;
use rand::distributions::Alphanumeric;
use rand::Rng;
use uuid::Uuid;

/// Generate credentials for a new anonymous user
///
/// The username is `<uuid>@<email_domain>`, the password a random
/// alphanumeric string.
pub fn generate_credentials(email_domain: &str) -> UserCredentials {
    let username = format!("{}@{}", Uuid::new_v4(), email_domain);
    let password: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_PASSWORD_LENGTH)
        .map(char::from)
        .collect();

    UserCredentials::new(username, password)
}
