use std::sync::Arc;

use backend::{model::LocationUpdate, Backend};
use model::{location::LocationSample, session::Session};

use crate::TrackingError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    Pushed,
    /// Nobody is signed in, nothing was sent.
    Skipped,
}

/// Sends position samples to the backend.
///
/// Every sample is sent at most once. A failed push is not retried, the next
/// sample supersedes it anyway.
pub struct LocationSync<B: Backend> {
    backend: Arc<B>,
}

impl<B: Backend> LocationSync<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }

    pub async fn push(
        &self,
        session: Option<&Session>,
        sample: &LocationSample,
    ) -> Result<PushOutcome, TrackingError> {
        let Some(session) = session.filter(|session| session.is_authenticated()) else {
            return Ok(PushOutcome::Skipped);
        };

        self.backend
            .update_location(&session.auth_token, &LocationUpdate::from(sample.point))
            .await?;
        Ok(PushOutcome::Pushed)
    }
}
