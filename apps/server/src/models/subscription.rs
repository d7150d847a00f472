//! Plans and dressmaker subscriptions

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::config::PlanPrices;
use crate::error::{Error, Result};

pub const PLAN_CURRENCY: &str = "BRL";
pub const PLAN_PRECISION: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanName {
    Standard,
    Pro,
}

impl PlanName {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanName::Standard => "standard",
            PlanName::Pro => "pro",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "standard" => Some(PlanName::Standard),
            "pro" => Some(PlanName::Pro),
            _ => None,
        }
    }
}

impl fmt::Display for PlanName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Periodicity {
    Monthly,
    Yearly,
}

impl Periodicity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Periodicity::Monthly => "monthly",
            Periodicity::Yearly => "yearly",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "monthly" => Some(Periodicity::Monthly),
            "yearly" => Some(Periodicity::Yearly),
            _ => None,
        }
    }

    /// Billing interval name understood by the payment gateway.
    pub fn interval(&self) -> &'static str {
        match self {
            Periodicity::Monthly => "month",
            Periodicity::Yearly => "year",
        }
    }

    pub fn duration(&self) -> Duration {
        match self {
            Periodicity::Monthly => Duration::days(30),
            Periodicity::Yearly => Duration::days(365),
        }
    }
}

impl fmt::Display for Periodicity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Minor units
    pub amount: i64,
    pub precision: u8,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub name: PlanName,
    pub periodicity: Periodicity,
    pub price: Price,
}

impl Plan {
    pub fn builder() -> PlanBuilder {
        PlanBuilder::default()
    }

    /// Plan priced from the configured table.
    pub fn priced(name: PlanName, periodicity: Periodicity, prices: &PlanPrices) -> Result<Self> {
        let amount = match (name, periodicity) {
            (PlanName::Standard, Periodicity::Monthly) => prices.monthly_standard,
            (PlanName::Standard, Periodicity::Yearly) => prices.yearly_standard,
            (PlanName::Pro, Periodicity::Monthly) => prices.monthly_pro,
            (PlanName::Pro, Periodicity::Yearly) => prices.yearly_pro,
        };
        Self::builder()
            .name(name)
            .periodicity(periodicity)
            .price(amount)
            .build()
    }

    /// Product name shown on the checkout page.
    pub fn product_name(&self) -> &'static str {
        match (self.name, self.periodicity) {
            (PlanName::Standard, Periodicity::Monthly) => "Inscrição Standard - Mensal",
            (PlanName::Standard, Periodicity::Yearly) => "Inscrição Standard - Anual",
            (PlanName::Pro, Periodicity::Monthly) => "Inscrição Pro - Mensal",
            (PlanName::Pro, Periodicity::Yearly) => "Inscrição Pro - Anual",
        }
    }
}

#[derive(Debug, Default)]
pub struct PlanBuilder {
    name: Option<PlanName>,
    periodicity: Option<Periodicity>,
    amount: Option<i64>,
}

impl PlanBuilder {
    pub fn name(mut self, name: PlanName) -> Self {
        self.name = Some(name);
        self
    }

    pub fn periodicity(mut self, periodicity: Periodicity) -> Self {
        self.periodicity = Some(periodicity);
        self
    }

    pub fn price(mut self, amount: i64) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn build(self) -> Result<Plan> {
        let name = self
            .name
            .ok_or_else(|| Error::Validation("plan type is required".to_string()))?;
        let periodicity = self
            .periodicity
            .ok_or_else(|| Error::Validation("periodicity is required".to_string()))?;
        let amount = self
            .amount
            .ok_or_else(|| Error::Validation("price is required".to_string()))?;
        if amount <= 0 {
            return Err(Error::Validation("price must be positive".to_string()));
        }

        Ok(Plan {
            name,
            periodicity,
            price: Price {
                amount,
                precision: PLAN_PRECISION,
                currency: PLAN_CURRENCY.to_string(),
            },
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Pending,
    Active,
    Canceled,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Pending => "pending",
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Canceled => "canceled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(SubscriptionStatus::Pending),
            "active" => Some(SubscriptionStatus::Active),
            "canceled" => Some(SubscriptionStatus::Canceled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: Uuid,
    pub dressmaker_id: Uuid,
    pub plan: Plan,
    pub status: SubscriptionStatus,
    pub started_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canceled_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grace_until: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway_id: Option<String>,
    #[serde(rename = "paymentURL", skip_serializing_if = "Option::is_none")]
    pub payment_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubscription {
    pub plan_type: PlanName,
    pub periodicity_type: Periodicity,
}

impl Subscription {
    pub fn pending(dressmaker_id: Uuid, plan: Plan, now: DateTime<Utc>) -> Self {
        let expires_at = now + plan.periodicity.duration();
        Self {
            id: Uuid::new_v4(),
            dressmaker_id,
            plan,
            status: SubscriptionStatus::Pending,
            started_at: now,
            expires_at,
            canceled_at: None,
            grace_until: None,
            gateway_id: None,
            payment_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.status == SubscriptionStatus::Active && !self.has_expired(now)
    }

    pub fn has_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    pub fn is_in_grace_period(&self, now: DateTime<Utc>) -> bool {
        self.grace_until.is_some_and(|until| now < until)
    }

    pub fn activate(&mut self, gateway_id: Option<String>, now: DateTime<Utc>) {
        self.status = SubscriptionStatus::Active;
        if gateway_id.is_some() {
            self.gateway_id = gateway_id;
        }
        self.updated_at = now;
    }

    /// Cancel now; a positive grace period keeps access until `now + grace_days`.
    pub fn cancel(&mut self, grace_days: i64, now: DateTime<Utc>) {
        self.status = SubscriptionStatus::Canceled;
        self.canceled_at = Some(now);
        self.grace_until = (grace_days > 0).then(|| now + Duration::days(grace_days));
        self.updated_at = now;
    }

    /// Start a fresh billing period.
    pub fn renew(&mut self, now: DateTime<Utc>) {
        self.started_at = now;
        self.expires_at = now + self.plan.periodicity.duration();
        self.status = SubscriptionStatus::Active;
        self.canceled_at = None;
        self.grace_until = None;
        self.updated_at = now;
    }
}
