use tower_sessions::{session::Error, Session};

const USER_KEY: &str = "user";
const FLASH_KEY: &str = "flash";

/// Email of the account this browser is authenticated as, if any.
pub async fn current_user(session: &Session) -> Result<Option<String>, Error> {
    session.get::<String>(USER_KEY).await
}

pub async fn log_in(session: &Session, email: &str) -> Result<(), Error> {
    session.insert(USER_KEY, email).await
}

pub async fn log_out(session: &Session) -> Result<(), Error> {
    session.remove::<String>(USER_KEY).await.map(|_| ())
}

/// Queue a one-shot message for the next rendered page.
pub async fn flash(session: &Session, message: impl Into<String>) -> Result<(), Error> {
    session.insert(FLASH_KEY, message.into()).await
}

/// Consume the queued message, if any.
pub async fn take_flash(session: &Session) -> Result<Option<String>, Error> {
    session.remove::<String>(FLASH_KEY).await
}
