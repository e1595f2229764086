//! PostgreSQL implementation of SubscriptionStore.
//!
//! One row per user in `subscriptions`; `put` is an upsert that overwrites
//! every column, matching the full-replace contract of the port.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::DatabaseConfig;
use crate::domain::foundation::{DomainError, ErrorCode, Timestamp, UserId};
use crate::domain::subscription::{ManagementUrls, SubscriptionRecord, SubscriptionStatus, Tier};
use crate::ports::SubscriptionStore;

pub struct PostgresSubscriptionStore {
    pool: PgPool,
}

impl PostgresSubscriptionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Builds a pool from config and, if enabled, applies migrations.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DomainError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.acquire_timeout())
            .connect(&config.url)
            .await
            .map_err(|e| DomainError::database(format!("Failed to connect: {}", e)))?;

        if config.run_migrations {
            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .map_err(|e| DomainError::database(format!("Migration failed: {}", e)))?;
        }

        Ok(Self::new(pool))
    }
}

/// Database row representation of a subscription.
#[derive(Debug, sqlx::FromRow)]
struct SubscriptionRow {
    user_id: String,
    tier: String,
    status: String,
    variant_id: i64,
    sub_id: String,
    customer_id: String,
    email: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
    customer_portal_url: String,
    update_payment_method_url: String,
    customer_portal_update_subscription_url: String,
}

impl TryFrom<SubscriptionRow> for SubscriptionRecord {
    type Error = DomainError;

    fn try_from(row: SubscriptionRow) -> Result<Self, Self::Error> {
        let tier = Tier::parse(&row.tier).ok_or_else(|| {
            DomainError::database(format!("Invalid tier value: {}", row.tier))
        })?;

        Ok(SubscriptionRecord {
            user_id: UserId::new(row.user_id)?,
            tier,
            status: SubscriptionStatus::from(row.status),
            variant_id: row.variant_id,
            subscription_id: row.sub_id,
            customer_id: row.customer_id,
            email: row.email,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
            expires_at: row.expires_at.map(Timestamp::from_datetime),
            urls: ManagementUrls {
                customer_portal: row.customer_portal_url,
                update_payment_method: row.update_payment_method_url,
                customer_portal_update_subscription: row.customer_portal_update_subscription_url,
            },
        })
    }
}

const SELECT_COLUMNS: &str = r#"
    SELECT user_id, tier, status, variant_id, sub_id, customer_id, email,
           created_at, updated_at, expires_at, customer_portal_url,
           update_payment_method_url, customer_portal_update_subscription_url
    FROM subscriptions
"#;

fn db_error(action: &str, e: sqlx::Error) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, format!("Failed to {}: {}", action, e))
}

#[async_trait]
impl SubscriptionStore for PostgresSubscriptionStore {
    async fn get(&self, user_id: &UserId) -> Result<Option<SubscriptionRecord>, DomainError> {
        let query = format!("{} WHERE user_id = $1", SELECT_COLUMNS);
        let row: Option<SubscriptionRow> = sqlx::query_as(&query)
            .bind(user_id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("get subscription", e))?;

        row.map(SubscriptionRecord::try_from).transpose()
    }

    async fn put(&self, record: &SubscriptionRecord) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO subscriptions (
                user_id, tier, status, variant_id, sub_id, customer_id, email,
                created_at, updated_at, expires_at, customer_portal_url,
                update_payment_method_url, customer_portal_update_subscription_url
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            ON CONFLICT (user_id) DO UPDATE SET
                tier = EXCLUDED.tier,
                status = EXCLUDED.status,
                variant_id = EXCLUDED.variant_id,
                sub_id = EXCLUDED.sub_id,
                customer_id = EXCLUDED.customer_id,
                email = EXCLUDED.email,
                created_at = EXCLUDED.created_at,
                updated_at = EXCLUDED.updated_at,
                expires_at = EXCLUDED.expires_at,
                customer_portal_url = EXCLUDED.customer_portal_url,
                update_payment_method_url = EXCLUDED.update_payment_method_url,
                customer_portal_update_subscription_url = EXCLUDED.customer_portal_update_subscription_url
            "#,
        )
        .bind(record.user_id.as_str())
        .bind(record.tier.as_str())
        .bind(record.status.as_str())
        .bind(record.variant_id)
        .bind(&record.subscription_id)
        .bind(&record.customer_id)
        .bind(&record.email)
        .bind(*record.created_at.as_datetime())
        .bind(*record.updated_at.as_datetime())
        .bind(record.expires_at.map(|t| *t.as_datetime()))
        .bind(&record.urls.customer_portal)
        .bind(&record.urls.update_payment_method)
        .bind(&record.urls.customer_portal_update_subscription)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("save subscription", e))?;

        Ok(())
    }

    async fn delete(&self, user_id: &UserId) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM subscriptions WHERE user_id = $1")
            .bind(user_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("delete subscription", e))?;
        Ok(())
    }

    async fn list(&self, limit: usize) -> Result<Vec<SubscriptionRecord>, DomainError> {
        let query = format!("{} ORDER BY updated_at DESC LIMIT $1", SELECT_COLUMNS);
        let rows: Vec<SubscriptionRow> = sqlx::query_as(&query)
            .bind(i64::try_from(limit).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("list subscriptions", e))?;

        rows.into_iter().map(SubscriptionRecord::try_from).collect()
    }
}
