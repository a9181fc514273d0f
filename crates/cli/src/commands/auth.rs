//! Session commands: login, register, logout, whoami.

use secrecy::SecretString;

use electromart_core::UserProfile;
use electromart_storefront::session::Registration;

use super::{CliError, Context};

/// Sign in and persist the session.
///
/// # Errors
///
/// Returns `CliError::Auth` with the API's reason on failure.
pub async fn login(ctx: &Context, email: &str, password: String) -> Result<(), CliError> {
    let user = ctx
        .auth
        .login(email, &SecretString::from(password))
        .await?;

    tracing::info!("Signed in as {}", summary(&user));
    Ok(())
}

/// Create an account and sign in.
///
/// # Errors
///
/// Returns `CliError::Auth` with the API's reason on failure.
pub async fn register(
    ctx: &Context,
    name: String,
    email: String,
    password: String,
    phone: Option<String>,
) -> Result<(), CliError> {
    let registration = Registration {
        name,
        email,
        password: SecretString::from(password),
        phone,
    };
    let user = ctx.auth.register(&registration).await?;

    tracing::info!(
        "Welcome, {}! You start with {} points at {} tier.",
        user.first_name(),
        user.loyalty_points,
        user.loyalty_tier
    );
    Ok(())
}

/// Clear the stored session.
pub fn logout(ctx: &Context) {
    ctx.auth.logout();
    tracing::info!("Signed out");
}

/// Print the signed-in user.
///
/// # Errors
///
/// Returns `CliError::NotSignedIn` without a session.
pub async fn whoami(ctx: &Context, refresh: bool) -> Result<(), CliError> {
    if refresh && ctx.auth.refresh_profile().await.is_none() {
        tracing::warn!("Could not refresh points; showing the stored profile");
    }

    let user = ctx.auth.context().user().ok_or(CliError::NotSignedIn)?;
    tracing::info!("{} <{}>", summary(&user), user.email);
    if let Some(phone) = &user.phone {
        tracing::info!("Phone: {phone}");
    }
    Ok(())
}

fn summary(user: &UserProfile) -> String {
    format!(
        "{} ({} pts, {} tier)",
        user.name, user.loyalty_points, user.loyalty_tier
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_includes_points_and_tier() {
        let user: UserProfile = serde_json::from_str(
            r#"{"id": "u1", "name": "Asha Rao", "email": "a@x.com",
                "loyalty_points": 120, "loyalty_tier": "silver"}"#,
        )
        .unwrap_or_else(|e| panic!("bad fixture: {e}"));
        assert_eq!(summary(&user), "Asha Rao (120 pts, silver tier)");
    }
}
