//! SQLite Repository Implementations

use chrono::Utc;
use sqlx::SqlitePool;
use sqlx::migrate::Migrator;
use uuid::Uuid;

use crate::domain::entity::{
    player::Player,
    session::{SessionRecord, SessionState},
    shop_item::ShopItem,
};
use crate::domain::repository::{PlayerRepository, SessionRepository, ShopRepository};
use crate::domain::value_object::{
    player_id::PlayerId, player_password::HashedPassword, user_name::UserName,
};
use crate::error::{ClassroomError, ClassroomResult, ValidationError};

/// Schema migrations under `database/migrations`
pub static MIGRATOR: Migrator = sqlx::migrate!("../../../database/migrations");

/// SQLite-backed classroom repository
///
/// Every query checks a connection out of the pool and returns it when the
/// query finishes.
#[derive(Clone)]
pub struct SqliteClassroomRepository {
    pool: SqlitePool,
}

impl SqliteClassroomRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

// ============================================================================
// Player Repository Implementation
// ============================================================================

impl PlayerRepository for SqliteClassroomRepository {
    async fn find_by_username(&self, username: &UserName) -> ClassroomResult<Option<Player>> {
        let row = sqlx::query_as::<_, PlayerRow>(
            r#"
            SELECT
                id,
                username,
                password
            FROM Players
            WHERE username = ?1
            "#,
        )
        .bind(username.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(PlayerRow::into_player).transpose()
    }

    async fn insert(
        &self,
        username: &UserName,
        password_hash: &HashedPassword,
    ) -> ClassroomResult<PlayerId> {
        let result = sqlx::query("INSERT INTO Players (username, password) VALUES (?1, ?2)")
            .bind(username.as_str())
            .bind(password_hash.as_phc_string())
            .execute(&self.pool)
            .await;

        match result {
            Ok(done) => Ok(PlayerId::new(done.last_insert_rowid())),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                tracing::warn!(
                    username = %username,
                    "Concurrent registration lost the race on the unique index"
                );
                Err(ValidationError::UsernameTaken.into())
            }
            Err(e) => Err(e.into()),
        }
    }
}

// ============================================================================
// Shop Repository Implementation
// ============================================================================

impl ShopRepository for SqliteClassroomRepository {
    async fn list_items(&self) -> ClassroomResult<Vec<ShopItem>> {
        let rows = sqlx::query_as::<_, ShopItemRow>(
            r#"
            SELECT
                id,
                name,
                description,
                price
            FROM ShopItem
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ShopItemRow::into_item).collect())
    }
}

// ============================================================================
// Session Repository Implementation
// ============================================================================

impl SessionRepository for SqliteClassroomRepository {
    async fn find_by_id(&self, session_id: Uuid) -> ClassroomResult<Option<SessionRecord>> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT
                session_id,
                state,
                created_at_ms,
                updated_at_ms,
                expires_at_ms
            FROM sessions
            WHERE session_id = ?1
            "#,
        )
        .bind(session_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(SessionRow::into_record).transpose()
    }

    async fn save(&self, session: &SessionRecord) -> ClassroomResult<()> {
        let state = serde_json::to_string(&session.state)?;

        sqlx::query(
            r#"
            INSERT INTO sessions (
                session_id,
                state,
                created_at_ms,
                updated_at_ms,
                expires_at_ms
            ) VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT (session_id) DO UPDATE SET
                state = excluded.state,
                updated_at_ms = excluded.updated_at_ms,
                expires_at_ms = excluded.expires_at_ms
            "#,
        )
        .bind(session.session_id.to_string())
        .bind(state)
        .bind(session.created_at_ms)
        .bind(session.updated_at_ms)
        .bind(session.expires_at_ms)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, session_id: Uuid) -> ClassroomResult<()> {
        sqlx::query("DELETE FROM sessions WHERE session_id = ?1")
            .bind(session_id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn cleanup_expired(&self) -> ClassroomResult<u64> {
        let now_ms = Utc::now().timestamp_millis();

        let deleted = sqlx::query(
            "DELETE FROM sessions WHERE expires_at_ms IS NOT NULL AND expires_at_ms < ?1",
        )
        .bind(now_ms)
        .execute(&self.pool)
        .await?
        .rows_affected();

        tracing::info!(sessions_deleted = deleted, "Cleaned up expired sessions");

        Ok(deleted)
    }
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct PlayerRow {
    id: i64,
    username: String,
    password: String,
}

impl PlayerRow {
    fn into_player(self) -> ClassroomResult<Player> {
        let username = UserName::from_input(Some(self.username)).ok_or_else(|| {
            ClassroomError::Internal(format!("Player {} has an empty username", self.id))
        })?;
        let password_hash = HashedPassword::from_stored(self.password);
        if !password_hash.is_supported() {
            tracing::warn!(player_id = self.id, "Stored digest format is not supported; login will fail");
        }

        Ok(Player {
            id: PlayerId::new(self.id),
            username,
            password_hash,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ShopItemRow {
    id: i64,
    name: String,
    description: Option<String>,
    price: i64,
}

impl ShopItemRow {
    fn into_item(self) -> ShopItem {
        ShopItem {
            id: self.id,
            name: self.name,
            description: self.description,
            price: self.price,
        }
    }
}

#[derive(sqlx::FromRow)]
struct SessionRow {
    session_id: String,
    state: String,
    created_at_ms: i64,
    updated_at_ms: i64,
    expires_at_ms: Option<i64>,
}

impl SessionRow {
    fn into_record(self) -> ClassroomResult<SessionRecord> {
        let session_id = self
            .session_id
            .parse()
            .map_err(|e| ClassroomError::Internal(format!("Invalid stored session id: {e}")))?;
        let state: SessionState = serde_json::from_str(&self.state)?;

        Ok(SessionRecord {
            session_id,
            state,
            created_at_ms: self.created_at_ms,
            updated_at_ms: self.updated_at_ms,
            expires_at_ms: self.expires_at_ms,
        })
    }
}
