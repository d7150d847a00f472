use async_trait::async_trait;
use sqlx::{postgres::PgRow, PgPool, Row};
use uuid::Uuid;

use super::map_write_error;
use crate::{
    db::traits::SubscriptionRepository,
    error::{Error, Result},
    models::{Periodicity, Plan, PlanName, Price, Subscription, SubscriptionStatus},
};

const SUBSCRIPTION_COLUMNS: &str = "id, dressmaker_id, plan_name, plan_periodicity, \
     price_amount, price_precision, price_currency, status, started_at, expires_at, \
     canceled_at, grace_until, gateway_id, payment_url, created_at, updated_at";

#[derive(Clone)]
pub struct PostgresSubscriptionRepository {
    pool: PgPool,
}

impl PostgresSubscriptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn corrupt(column: &str, value: &str) -> Error {
    Error::Internal(format!("unexpected {column} value '{value}'"))
}

fn subscription_from_row(row: &PgRow) -> Result<Subscription> {
    let name: String = row.try_get("plan_name")?;
    let periodicity: String = row.try_get("plan_periodicity")?;
    let status: String = row.try_get("status")?;
    let precision: i16 = row.try_get("price_precision")?;

    Ok(Subscription {
        id: row.try_get("id")?,
        dressmaker_id: row.try_get("dressmaker_id")?,
        plan: Plan {
            name: PlanName::parse(&name).ok_or_else(|| corrupt("plan_name", &name))?,
            periodicity: Periodicity::parse(&periodicity)
                .ok_or_else(|| corrupt("plan_periodicity", &periodicity))?,
            price: Price {
                amount: row.try_get("price_amount")?,
                precision: u8::try_from(precision)
                    .map_err(|_| corrupt("price_precision", &precision.to_string()))?,
                currency: row.try_get("price_currency")?,
            },
        },
        status: SubscriptionStatus::parse(&status).ok_or_else(|| corrupt("status", &status))?,
        started_at: row.try_get("started_at")?,
        expires_at: row.try_get("expires_at")?,
        canceled_at: row.try_get("canceled_at")?,
        grace_until: row.try_get("grace_until")?,
        gateway_id: row.try_get("gateway_id")?,
        payment_url: row.try_get("payment_url")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl SubscriptionRepository for PostgresSubscriptionRepository {
    async fn create_for_dressmaker(&self, subscription: &Subscription) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let locked = sqlx::query("SELECT id FROM dressmakers WHERE id = $1 FOR UPDATE")
            .bind(subscription.dressmaker_id)
            .fetch_optional(&mut *tx)
            .await?;
        if locked.is_none() {
            return Err(Error::not_found("dressmaker"));
        }

        sqlx::query(
            r#"
            INSERT INTO subscriptions (
                id, dressmaker_id, plan_name, plan_periodicity, price_amount, price_precision,
                price_currency, status, started_at, expires_at, canceled_at, grace_until,
                gateway_id, payment_url, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            "#,
        )
        .bind(subscription.id)
        .bind(subscription.dressmaker_id)
        .bind(subscription.plan.name.as_str())
        .bind(subscription.plan.periodicity.as_str())
        .bind(subscription.plan.price.amount)
        .bind(i16::from(subscription.plan.price.precision))
        .bind(&subscription.plan.price.currency)
        .bind(subscription.status.as_str())
        .bind(subscription.started_at)
        .bind(subscription.expires_at)
        .bind(subscription.canceled_at)
        .bind(subscription.grace_until)
        .bind(&subscription.gateway_id)
        .bind(&subscription.payment_url)
        .bind(subscription.created_at)
        .bind(subscription.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, "subscription"))?;

        sqlx::query("UPDATE dressmakers SET subscription_id = $2, updated_at = $3 WHERE id = $1")
            .bind(subscription.dressmaker_id)
            .bind(subscription.id)
            .bind(subscription.created_at)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Subscription>> {
        let row = sqlx::query(&format!(
            "SELECT {SUBSCRIPTION_COLUMNS} FROM subscriptions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(subscription_from_row).transpose()
    }

    async fn find_by_gateway_id(&self, gateway_id: &str) -> Result<Option<Subscription>> {
        let row = sqlx::query(&format!(
            "SELECT {SUBSCRIPTION_COLUMNS} FROM subscriptions WHERE gateway_id = $1"
        ))
        .bind(gateway_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(subscription_from_row).transpose()
    }

    async fn update(&self, subscription: &Subscription) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE subscriptions
            SET status = $2, started_at = $3, expires_at = $4, canceled_at = $5,
                grace_until = $6, gateway_id = $7, payment_url = $8, updated_at = $9
            WHERE id = $1
            "#,
        )
        .bind(subscription.id)
        .bind(subscription.status.as_str())
        .bind(subscription.started_at)
        .bind(subscription.expires_at)
        .bind(subscription.canceled_at)
        .bind(subscription.grace_until)
        .bind(&subscription.gateway_id)
        .bind(&subscription.payment_url)
        .bind(subscription.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "subscription"))?;

        if result.rows_affected() == 0 {
            return Err(Error::not_found("subscription"));
        }
        Ok(())
    }
}
