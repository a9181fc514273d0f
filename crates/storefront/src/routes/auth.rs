//! Authentication route handlers.
//!
//! Login and registration go through the [`AuthManager`](crate::session::AuthManager);
//! a failure re-renders the form with the reason inline and keeps whatever
//! session was active before.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use secrecy::SecretString;
use serde::Deserialize;
use tracing::instrument;

use crate::filters;
use crate::session::Registration;
use crate::state::AppState;
use crate::views::HeaderView;

use super::safe_next;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub next: Option<String>,
}

/// Registration form data.
#[derive(Deserialize)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    pub next: Option<String>,
}

/// Where to go after a form action.
#[derive(Debug, Deserialize)]
pub struct NextForm {
    pub next: Option<String>,
}

// =============================================================================
// Query Types
// =============================================================================

/// Query parameters for the auth pages.
#[derive(Debug, Deserialize)]
pub struct AuthQuery {
    pub next: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub header: HeaderView,
    pub error: Option<String>,
    pub email: String,
    pub next: String,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub header: HeaderView,
    pub error: Option<String>,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub next: String,
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(
    State(state): State<AppState>,
    Query(query): Query<AuthQuery>,
) -> impl IntoResponse {
    LoginTemplate {
        header: state.header(),
        error: None,
        email: String::new(),
        next: safe_next(query.next.as_deref()),
    }
}

/// Handle login form submission.
#[instrument(skip(state, form), fields(email = %form.email))]
pub async fn login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    let next = safe_next(form.next.as_deref());

    let password = SecretString::from(form.password);
    match state.auth().login(&form.email, &password).await {
        Ok(_) => Redirect::to(&next).into_response(),
        Err(failure) => (
            StatusCode::UNAUTHORIZED,
            LoginTemplate {
                header: state.header(),
                error: Some(failure.reason),
                email: form.email,
                next,
            },
        )
            .into_response(),
    }
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
pub async fn register_page(
    State(state): State<AppState>,
    Query(query): Query<AuthQuery>,
) -> impl IntoResponse {
    RegisterTemplate {
        header: state.header(),
        error: None,
        name: String::new(),
        email: String::new(),
        phone: String::new(),
        next: safe_next(query.next.as_deref()),
    }
}

/// Handle registration form submission.
///
/// The API credits the welcome bonus; the new balance arrives with the
/// profile.
#[instrument(skip(state, form), fields(email = %form.email))]
pub async fn register(State(state): State<AppState>, Form(form): Form<RegisterForm>) -> Response {
    let next = safe_next(form.next.as_deref());
    let registration = Registration {
        name: form.name,
        email: form.email,
        password: SecretString::from(form.password),
        phone: form.phone,
    };

    match state.auth().register(&registration).await {
        Ok(_) => Redirect::to(&next).into_response(),
        Err(failure) => (
            StatusCode::BAD_REQUEST,
            RegisterTemplate {
                header: state.header(),
                error: Some(failure.reason),
                name: registration.name,
                email: registration.email,
                phone: registration.phone.unwrap_or_default(),
                next,
            },
        )
            .into_response(),
    }
}

// =============================================================================
// Session Routes
// =============================================================================

/// Handle logout.
pub async fn logout(State(state): State<AppState>) -> Redirect {
    state.auth().logout();
    Redirect::to("/")
}

/// Refetch points and tier for the signed-in user.
pub async fn refresh(State(state): State<AppState>, Form(form): Form<NextForm>) -> Redirect {
    state.auth().refresh_profile().await;
    Redirect::to(&safe_next(form.next.as_deref()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_login_template_shows_inline_error() {
        let html = LoginTemplate {
            header: HeaderView::default(),
            error: Some("Invalid credentials".to_string()),
            email: "a@x.com".to_string(),
            next: "/loyalty".to_string(),
        }
        .render()
        .unwrap();

        assert!(html.contains("Invalid credentials"));
        assert!(html.contains(r#"value="a@x.com""#));
        assert!(html.contains(r#"value="/loyalty""#));
    }

    #[test]
    fn test_register_template_keeps_fields() {
        let html = RegisterTemplate {
            header: HeaderView::default(),
            error: Some("User already exists".to_string()),
            name: "Asha Rao".to_string(),
            email: "taken@x.com".to_string(),
            phone: String::new(),
            next: "/".to_string(),
        }
        .render()
        .unwrap();

        assert!(html.contains("User already exists"));
        assert!(html.contains(r#"value="Asha Rao""#));
    }
}
