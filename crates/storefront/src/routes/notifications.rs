//! Notice queue handler.

use axum::Json;
use tower_sessions::Session;
use tracing::instrument;

use crate::notifications::{self, Notice};

/// Return and clear the visitor's queued notices.
#[instrument(skip_all)]
pub async fn drain(session: Session) -> Json<Vec<Notice>> {
    Json(notifications::drain(&session).await)
}
