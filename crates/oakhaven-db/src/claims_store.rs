//! Persistence for the out-of-scope identity/feedback surface: the
//! `github_claims`, `referrals`, and `feedback` tables.
//!
//! These back [`oakhaven_agents::reflection`]'s referral links and
//! feedback tokens. The HTTP registration flow that would populate
//! `github_claims` is not implemented by this crate; these tables exist
//! so that surface has somewhere to write when it is.

use chrono::Utc;
use oakhaven_types::ResidentId;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::DbError;

/// Operations on the `github_claims`, `referrals`, and `feedback` tables.
pub struct ClaimsStore<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ClaimsStore<'a> {
    /// Create a new claims store bound to a connection pool.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Record that `resident` claimed the given `GitHub` login.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Sqlite`] if the write fails.
    pub async fn record_github_claim(&self, resident: ResidentId, github_login: &str) -> Result<(), DbError> {
        sqlx::query(
            r"INSERT INTO github_claims (resident_id, github_login, claimed_at) VALUES (?, ?, ?)
              ON CONFLICT (resident_id) DO UPDATE SET github_login = excluded.github_login, claimed_at = excluded.claimed_at",
        )
        .bind(resident.into_inner())
        .bind(github_login)
        .bind(Utc::now().to_rfc3339())
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// Mint a referral code for `referrer`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Sqlite`] if the write fails.
    pub async fn record_referral(&self, code: &str, referrer: ResidentId) -> Result<(), DbError> {
        sqlx::query("INSERT INTO referrals (code, referrer_resident_id, claimed_resident_id, created_at) VALUES (?, ?, NULL, ?)")
            .bind(code)
            .bind(referrer.into_inner())
            .bind(Utc::now().to_rfc3339())
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Mark a referral code as claimed by a newly arrived resident.
    ///
    /// Returns `false` if the code does not exist or was already claimed.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Sqlite`] if the write fails.
    pub async fn claim_referral(&self, code: &str, claimed_by: ResidentId) -> Result<bool, DbError> {
        let result = sqlx::query(
            "UPDATE referrals SET claimed_resident_id = ? WHERE code = ? AND claimed_resident_id IS NULL",
        )
        .bind(claimed_by.into_inner())
        .bind(code)
        .execute(self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Issue a feedback token for `resident` at the given world time.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Sqlite`] if the write fails.
    pub async fn issue_feedback_token(&self, token: &str, resident: ResidentId, issued_at_world_seconds: u64) -> Result<(), DbError> {
        sqlx::query(
            "INSERT INTO feedback (token, resident_id, issued_at_world_seconds, redeemed, response_text) VALUES (?, ?, ?, 0, NULL)",
        )
        .bind(token)
        .bind(resident.into_inner())
        .bind(i64::try_from(issued_at_world_seconds).unwrap_or(i64::MAX))
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// Record a redeemed feedback token's free-text response.
    ///
    /// Returns `false` if the token does not exist or was already
    /// redeemed.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Sqlite`] if the write fails.
    pub async fn redeem_feedback_token(&self, token: &str, response_text: &str) -> Result<bool, DbError> {
        let result = sqlx::query("UPDATE feedback SET redeemed = 1, response_text = ? WHERE token = ? AND redeemed = 0")
            .bind(response_text)
            .bind(token)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Fetch a feedback token's current state, if it exists.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Sqlite`] if the query fails.
    pub async fn get_feedback_token(&self, token: &str) -> Result<Option<FeedbackRow>, DbError> {
        let row = sqlx::query_as::<_, FeedbackRow>("SELECT * FROM feedback WHERE token = ?")
            .bind(token)
            .fetch_optional(self.pool)
            .await?;
        Ok(row)
    }
}

/// A row from the `feedback` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FeedbackRow {
    /// The feedback token.
    pub token: String,
    /// The resident it was issued to.
    pub resident_id: Uuid,
    /// World-seconds timestamp the token was issued.
    pub issued_at_world_seconds: i64,
    /// Whether the token has been redeemed.
    pub redeemed: bool,
    /// Free-text response, once redeemed.
    pub response_text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::SqlitePool as OakhavenPool;

    #[tokio::test]
    async fn github_claim_upserts_on_conflict() {
        let pool = OakhavenPool::connect_in_memory().await.unwrap();
        pool.run_migrations().await.unwrap();
        let store = ClaimsStore::new(pool.pool());
        let resident = ResidentId::new();

        store.record_github_claim(resident, "octocat").await.unwrap();
        store.record_github_claim(resident, "octocat2").await.unwrap();
    }

    #[tokio::test]
    async fn referral_can_be_claimed_exactly_once() {
        let pool = OakhavenPool::connect_in_memory().await.unwrap();
        pool.run_migrations().await.unwrap();
        let store = ClaimsStore::new(pool.pool());
        let referrer = ResidentId::new();

        store.record_referral("ABC123", referrer).await.unwrap();
        assert!(store.claim_referral("ABC123", ResidentId::new()).await.unwrap());
        assert!(!store.claim_referral("ABC123", ResidentId::new()).await.unwrap());
    }

    #[tokio::test]
    async fn feedback_token_redeems_once() {
        let pool = OakhavenPool::connect_in_memory().await.unwrap();
        pool.run_migrations().await.unwrap();
        let store = ClaimsStore::new(pool.pool());
        let resident = ResidentId::new();

        store.issue_feedback_token("tok-1", resident, 100).await.unwrap();
        assert!(store.redeem_feedback_token("tok-1", "loved it").await.unwrap());
        assert!(!store.redeem_feedback_token("tok-1", "again").await.unwrap());

        let row = store.get_feedback_token("tok-1").await.unwrap().unwrap();
        assert!(row.redeemed);
        assert_eq!(row.response_text.as_deref(), Some("loved it"));
        assert_eq!(row.issued_at_world_seconds, 100);
    }
}
