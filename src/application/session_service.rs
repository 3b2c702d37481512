use std::sync::Arc;

use tracing::instrument;
use uuid::Uuid;

use crate::data::user_repository::UserRepository;
use crate::domain::{error::DomainError, user::User};

/// Resolves session cookie tokens to user identities and mints new
/// identities on first contact.
#[derive(Clone)]
pub struct SessionService<R: UserRepository + 'static> {
    repo: Arc<R>,
}

impl<R> SessionService<R>
where
    R: UserRepository + 'static,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Read-only lookup; an unknown token is an authorization failure.
    pub async fn resolve(&self, session_id: Uuid) -> Result<User, DomainError> {
        self.repo
            .find_by_session_id(session_id)
            .await?
            .ok_or(DomainError::Unauthorized)
    }

    #[instrument(skip(self))]
    pub async fn start_session(&self) -> Result<User, DomainError> {
        self.repo.create(User::new()).await
    }
}
