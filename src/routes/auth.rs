use std::sync::Arc;

use anyhow::anyhow;
use axum::{
    body::Bytes,
    extract::{Extension, Form, Multipart},
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tokio::task;
use tower_sessions::Session;
use tracing::info;

use crate::error::AppError;
use crate::model::user::User;
use crate::session::{flash, log_in, log_out, take_flash};
use crate::templates;
use crate::verify::Verifier;

// Fields collected from the multipart signup form
#[derive(Debug, Default)]
struct SignupFields {
    full_name: String,
    email: String,
    password: String,
    role: String,
    college: String,
    member_code: String,
}

impl SignupFields {
    fn any_missing(&self) -> bool {
        self.full_name.is_empty()
            || self.email.is_empty()
            || self.password.is_empty()
            || self.role.is_empty()
            || self.college.is_empty()
            || self.member_code.is_empty()
    }
}

// Payload for login
#[derive(Deserialize)]
struct LoginForm {
    email: String,
    password: String,
}

#[derive(Serialize)]
struct FormPage {
    flash: Option<String>,
}

// Create auth router (signup, login, logout)
pub fn auth_router() -> Router {
    Router::new()
        .route("/signup", get(signup_page).post(signup_submit))
        .route("/login", get(login_page).post(login_submit))
        .route("/logout", get(logout))
}

async fn signup_page(session: Session) -> Result<Response, AppError> {
    let flash = take_flash(&session).await?;
    Ok(templates::render("signup", &FormPage { flash })?.into_response())
}

async fn signup_submit(
    Extension(pool): Extension<SqlitePool>,
    Extension(verifier): Extension<Arc<Verifier>>,
    session: Session,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let mut fields = SignupFields::default();
    let mut image: Option<Bytes> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "full_name" => fields.full_name = field.text().await?.trim().to_string(),
            "email" => fields.email = field.text().await?.trim().to_lowercase(),
            "password" => fields.password = field.text().await?.trim().to_string(),
            "role" => fields.role = field.text().await?,
            "college" => fields.college = field.text().await?.trim().to_string(),
            "member_code" => fields.member_code = field.text().await?.trim().to_string(),
            "id_image" => image = Some(field.bytes().await?),
            _ => {}
        }
    }

    if fields.any_missing() || image.as_deref().unwrap_or_default().is_empty() {
        flash(&session, "All fields are required.").await?;
        return Ok(Redirect::to("/signup").into_response());
    }
    let image = image.unwrap_or_default();

    // Step 1: barcode, step 2: OCR fallback. The chain is blocking
    // (image decode plus one outbound call), so keep it off the executor.
    let expected = fields.member_code.clone();
    let chain = verifier.clone();
    let verdict = task::spawn_blocking(move || chain.verify(&image, &expected))
        .await
        .map_err(|e| anyhow!("verification task failed: {e}"))??;

    if !verdict.verified {
        flash(
            &session,
            format!("❌ ID verification failed: {}.", verdict.reason),
        )
        .await?;
        return Ok(Redirect::to("/signup").into_response());
    }

    let password_hash = bcrypt::hash(&fields.password, bcrypt::DEFAULT_COST)?;

    let result = sqlx::query(
        "INSERT INTO users (full_name, email, password_hash, role, college, member_code, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&fields.full_name)
    .bind(&fields.email)
    .bind(&password_hash)
    .bind(&fields.role)
    .bind(&fields.college)
    .bind(&fields.member_code)
    .bind(Utc::now().naive_utc())
    .execute(&pool)
    .await;

    if let Err(e) = result {
        if is_unique_violation(&e) {
            flash(&session, "Email already registered.").await?;
            return Ok(Redirect::to("/signup").into_response());
        }
        return Err(e.into());
    }

    info!("New account registered: {}", fields.email);

    // Auto login after signup
    log_in(&session, &fields.email).await?;
    flash(&session, "✅ Signup successful! You are now logged in.").await?;
    Ok(Redirect::to("/home").into_response())
}

async fn login_page(session: Session) -> Result<Response, AppError> {
    let flash = take_flash(&session).await?;
    Ok(templates::render("login", &FormPage { flash })?.into_response())
}

async fn login_submit(
    Extension(pool): Extension<SqlitePool>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let email = form.email.trim().to_lowercase();

    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = ?")
        .bind(&email)
        .fetch_optional(&pool)
        .await?;

    // One generic rejection; do not reveal whether the email exists.
    let ok = match &user {
        Some(user) => bcrypt::verify(form.password.trim(), &user.password_hash)?,
        None => false,
    };

    if !ok {
        flash(&session, "Invalid credentials. Try again.").await?;
        return Ok(Redirect::to("/login").into_response());
    }

    info!("Login successful: {email}");
    log_in(&session, &email).await?;
    Ok(Redirect::to("/home").into_response())
}

async fn logout(session: Session) -> Result<Response, AppError> {
    log_out(&session).await?;
    flash(&session, "You have been logged out.").await?;
    Ok(Redirect::to("/").into_response())
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.message().contains("UNIQUE constraint failed"))
}
