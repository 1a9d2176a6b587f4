//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::{user::User, verification_token::VerificationToken};
use crate::domain::repository::{UserRepository, VerificationTokenRepository};
use crate::domain::value_object::{
    auth_provider::AuthProvider,
    email::Email,
    user_id::{UserId, VerificationTokenId},
    user_password::UserPassword,
    verification_code::VerificationCode,
};
use crate::error::{AuthError, AuthResult};

/// Unique constraint names from the migration
const USERS_EMAIL_KEY: &str = "users_email_key";
const USERS_EXTERNAL_SUBJECT_KEY: &str = "users_external_subject_key";

/// SQLSTATE unique_violation
const UNIQUE_VIOLATION: &str = "23505";

/// PostgreSQL-backed identity repository
#[derive(Clone)]
pub struct PgIdentityRepository {
    pool: PgPool,
}

impl PgIdentityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert_user(&self, user: &User) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (
                user_id,
                external_subject,
                email,
                password_hash,
                provider,
                given_name,
                family_name,
                is_verified,
                disabled,
                created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(user.user_id.as_uuid())
        .bind(user.external_subject.as_deref())
        .bind(user.email.as_str())
        .bind(user.password_hash.as_ref().map(|p| p.as_phc_string()))
        .bind(user.provider.code())
        .bind(user.given_name.as_deref())
        .bind(user.family_name.as_deref())
        .bind(user.is_verified)
        .bind(user.disabled)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_unique_violation)?;

        Ok(())
    }
}

/// Turn a unique violation into the typed conflict it stands for
fn map_unique_violation(err: sqlx::Error) -> AuthError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
            match db_err.constraint() {
                Some(USERS_EMAIL_KEY) => return AuthError::EmailTaken,
                Some(USERS_EXTERNAL_SUBJECT_KEY) => return AuthError::ExternalSubjectTaken,
                _ => {}
            }
        }
    }
    AuthError::Database(err)
}

// ============================================================================
// User Repository Implementation
// ============================================================================

impl UserRepository for PgIdentityRepository {
    async fn create_local(&self, user: &User) -> AuthResult<()> {
        if user.password_hash.is_none() {
            return Err(AuthError::Internal(
                "local account without password digest".to_string(),
            ));
        }
        self.insert_user(user).await
    }

    async fn create_federated(&self, user: &User) -> AuthResult<()> {
        if user.external_subject.is_none() {
            return Err(AuthError::Internal(
                "federated account without external subject".to_string(),
            ));
        }
        self.insert_user(user).await
    }

    async fn update_federated_profile(
        &self,
        email: &Email,
        given_name: Option<&str>,
        family_name: Option<&str>,
        is_verified: bool,
    ) -> AuthResult<()> {
        let updated = sqlx::query(
            r#"
            UPDATE users SET
                given_name = $2,
                family_name = $3,
                is_verified = $4
            WHERE email = $1
            "#,
        )
        .bind(email.as_str())
        .bind(given_name)
        .bind(family_name)
        .bind(is_verified)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if updated == 0 {
            return Err(AuthError::UserNotFound);
        }
        Ok(())
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT
                user_id,
                external_subject,
                email,
                password_hash,
                provider,
                given_name,
                family_name,
                is_verified,
                disabled,
                created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_user()).transpose()
    }

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT
                user_id,
                external_subject,
                email,
                password_hash,
                provider,
                given_name,
                family_name,
                is_verified,
                disabled,
                created_at
            FROM users
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_user()).transpose()
    }

    async fn mark_verified(&self, user_id: &UserId) -> AuthResult<()> {
        let updated = sqlx::query("UPDATE users SET is_verified = TRUE WHERE user_id = $1")
            .bind(user_id.as_uuid())
            .execute(&self.pool)
            .await?
            .rows_affected();

        if updated == 0 {
            return Err(AuthError::UserNotFound);
        }
        Ok(())
    }

    async fn set_disabled(&self, user_id: &UserId, disabled: bool) -> AuthResult<()> {
        let updated = sqlx::query("UPDATE users SET disabled = $2 WHERE user_id = $1")
            .bind(user_id.as_uuid())
            .bind(disabled)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if updated == 0 {
            return Err(AuthError::UserNotFound);
        }
        Ok(())
    }
}

// ============================================================================
// Verification Token Repository Implementation
// ============================================================================

impl VerificationTokenRepository for PgIdentityRepository {
    async fn create(&self, token: &VerificationToken) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO verification_tokens (
                id,
                token,
                user_id,
                created_at,
                expires_at
            ) VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(token.id.as_uuid())
        .bind(token.token.as_str())
        .bind(token.user_id.as_uuid())
        .bind(token.created_at)
        .bind(token.expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_latest(&self, user_id: &UserId) -> AuthResult<Option<VerificationToken>> {
        let row = sqlx::query_as::<_, VerificationTokenRow>(
            r#"
            SELECT
                id,
                token,
                user_id,
                created_at,
                expires_at
            FROM verification_tokens
            WHERE user_id = $1
            ORDER BY created_at DESC, token_seq DESC
            LIMIT 1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_token()))
    }

    async fn delete_all_for_user(&self, user_id: &UserId) -> AuthResult<u64> {
        let deleted = sqlx::query("DELETE FROM verification_tokens WHERE user_id = $1")
            .bind(user_id.as_uuid())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted)
    }
}

// ============================================================================
// Row types
// ============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    user_id: Uuid,
    external_subject: Option<String>,
    email: String,
    password_hash: Option<String>,
    provider: String,
    given_name: Option<String>,
    family_name: Option<String>,
    is_verified: bool,
    disabled: bool,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> AuthResult<User> {
        let provider = AuthProvider::from_code(&self.provider).ok_or_else(|| {
            AuthError::Internal(format!("Invalid provider code: {}", self.provider))
        })?;

        Ok(User {
            user_id: UserId::from_uuid(self.user_id),
            external_subject: self.external_subject,
            email: Email::from_trusted(self.email),
            password_hash: self.password_hash.map(UserPassword::from_db),
            provider,
            given_name: self.given_name,
            family_name: self.family_name,
            is_verified: self.is_verified,
            disabled: self.disabled,
            created_at: self.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct VerificationTokenRow {
    id: Uuid,
    token: String,
    user_id: Uuid,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl VerificationTokenRow {
    fn into_token(self) -> VerificationToken {
        VerificationToken {
            id: VerificationTokenId::from_uuid(self.id),
            token: VerificationCode::from_db(self.token),
            user_id: UserId::from_uuid(self.user_id),
            created_at: self.created_at,
            expires_at: self.expires_at,
        }
    }
}
