use axum::{
    extract::Extension,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use serde::Serialize;
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::error::AppError;
use crate::session::{current_user, flash, take_flash};
use crate::templates;

#[derive(Serialize)]
struct Page {
    flash: Option<String>,
}

#[derive(Serialize)]
struct HomePage {
    flash: Option<String>,
    full_name: String,
    role: String,
    college: String,
}

#[derive(Serialize)]
struct ProfilePage {
    flash: Option<String>,
    email: String,
}

// Create pages router (landing + session-gated views)
pub fn pages_router() -> Router {
    Router::new()
        .route("/", get(landing))
        .route("/home", get(home))
        .route("/profile", get(profile))
}

async fn landing(session: Session) -> Result<Response, AppError> {
    let flash = take_flash(&session).await?;
    Ok(templates::render("landing", &Page { flash })?.into_response())
}

async fn home(
    Extension(pool): Extension<SqlitePool>,
    session: Session,
) -> Result<Response, AppError> {
    let Some(email) = current_user(&session).await? else {
        return login_gate(&session).await;
    };

    let row: Option<(String, String, String)> =
        sqlx::query_as("SELECT full_name, role, college FROM users WHERE email = ?")
            .bind(&email)
            .fetch_optional(&pool)
            .await?;

    // A session can outlive its row if the database file is replaced.
    let Some((full_name, role, college)) = row else {
        return login_gate(&session).await;
    };

    let flash = take_flash(&session).await?;
    Ok(templates::render(
        "home",
        &HomePage {
            flash,
            full_name,
            role,
            college,
        },
    )?
    .into_response())
}

async fn profile(session: Session) -> Result<Response, AppError> {
    let Some(email) = current_user(&session).await? else {
        return login_gate(&session).await;
    };

    let flash = take_flash(&session).await?;
    Ok(templates::render("profile", &ProfilePage { flash, email })?.into_response())
}

async fn login_gate(session: &Session) -> Result<Response, AppError> {
    flash(session, "Please log in first.").await?;
    Ok(Redirect::to("/login").into_response())
}
