//! Session repository: Postgres-backed [`SessionStore`].

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
    sea_query::Expr,
};
use somon_core::auth::{AuthError, NewSession, Session, SessionStore};
use somon_shared::types::{AccountId, SessionId};

use crate::entities::sessions;

/// Session repository keyed by token hash.
#[derive(Debug, Clone)]
pub struct SessionRepository {
    db: DatabaseConnection,
}

impl SessionRepository {
    /// Creates a new session repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Deletes sessions that expired before `cutoff`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub async fn purge_expired(&self, cutoff: DateTime<Utc>) -> Result<u64, AuthError> {
        let result = sessions::Entity::delete_many()
            .filter(sessions::Column::ExpiresAt.lt(cutoff))
            .exec(&self.db)
            .await
            .map_err(store_err)?;

        Ok(result.rows_affected)
    }
}

#[allow(clippy::needless_pass_by_value)]
fn store_err(err: DbErr) -> AuthError {
    AuthError::Store(err.to_string())
}

fn session_from_model(model: sessions::Model) -> Session {
    Session {
        id: SessionId::from_uuid(model.id),
        account_id: AccountId::from_uuid(model.account_id),
        expires_at: model.expires_at.with_timezone(&Utc),
        revoked_at: model.revoked_at.map(|t| t.with_timezone(&Utc)),
        created_at: model.created_at.with_timezone(&Utc),
    }
}

impl SessionStore for SessionRepository {
    async fn create(&self, input: NewSession) -> Result<Session, AuthError> {
        let session = sessions::ActiveModel {
            id: Set(SessionId::new().into_inner()),
            account_id: Set(input.account_id.into_inner()),
            token_hash: Set(input.token_hash),
            expires_at: Set(input.expires_at.into()),
            revoked_at: Set(None),
            created_at: Set(Utc::now().into()),
        };

        let model = session.insert(&self.db).await.map_err(store_err)?;
        Ok(session_from_model(model))
    }

    async fn find_active(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Session>, AuthError> {
        let model = sessions::Entity::find()
            .filter(sessions::Column::TokenHash.eq(token_hash))
            .filter(sessions::Column::RevokedAt.is_null())
            .filter(sessions::Column::ExpiresAt.gt(now))
            .one(&self.db)
            .await
            .map_err(store_err)?;

        Ok(model.map(session_from_model))
    }

    async fn revoke(&self, token_hash: &str) -> Result<bool, AuthError> {
        let result = sessions::Entity::update_many()
            .col_expr(sessions::Column::RevokedAt, Expr::value(Utc::now()))
            .filter(sessions::Column::TokenHash.eq(token_hash))
            .filter(sessions::Column::RevokedAt.is_null())
            .exec(&self.db)
            .await
            .map_err(store_err)?;

        Ok(result.rows_affected > 0)
    }
}
