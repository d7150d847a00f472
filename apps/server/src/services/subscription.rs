//! Subscription checkout and payment webhook handling

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    auth::{Principal, PrincipalKind},
    config::Config,
    db::Repositories,
    error::{Error, Result},
    integrations::{verify_webhook_signature, CheckoutRequest, PaymentGateway, WebhookEvent},
    models::{CreateSubscription, Plan, Subscription},
};

pub const CHECKOUT_COMPLETED: &str = "checkout.session.completed";
pub const INVOICE_PAID: &str = "invoice.paid";
pub const SUBSCRIPTION_DELETED: &str = "customer.subscription.deleted";

/// What a webhook delivery changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum WebhookOutcome {
    Activated { subscription_id: Uuid },
    Renewed { subscription_id: Uuid },
    Canceled { subscription_id: Uuid },
    Ignored { event_type: String },
}

pub struct SubscriptionService {
    config: Arc<Config>,
    repos: Repositories,
    payments: Arc<dyn PaymentGateway>,
}

impl SubscriptionService {
    pub fn new(config: Arc<Config>, repos: Repositories, payments: Arc<dyn PaymentGateway>) -> Self {
        Self {
            config,
            repos,
            payments,
        }
    }

    /// Start a pending subscription and open a checkout for it.
    pub async fn create(
        &self,
        principal: &Principal,
        input: &CreateSubscription,
    ) -> Result<Subscription> {
        principal.require(PrincipalKind::Dressmaker)?;
        let dressmaker = self
            .repos
            .dressmakers
            .find_by_id(principal.subject)
            .await?
            .ok_or_else(|| Error::not_found("dressmaker"))?;

        let plan = Plan::priced(
            input.plan_type,
            input.periodicity_type,
            &self.config.payment.prices,
        )?;
        let mut subscription = Subscription::pending(dressmaker.id, plan, Utc::now());

        let url = self
            .payments
            .create_checkout(&CheckoutRequest {
                subscription: &subscription,
                dressmaker: &dressmaker,
            })
            .await?;
        subscription.payment_url = Some(url);

        self.repos
            .subscriptions
            .create_for_dressmaker(&subscription)
            .await?;
        tracing::info!(
            subscription_id = %subscription.id,
            dressmaker_id = %dressmaker.id,
            plan = %subscription.plan.name,
            "Subscription created"
        );
        Ok(subscription)
    }

    /// Verify and apply one webhook delivery.
    pub async fn handle_webhook(
        &self,
        payload: &[u8],
        signature: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<WebhookOutcome> {
        let signature = signature
            .ok_or_else(|| Error::Validation("missing Stripe-Signature header".to_string()))?;
        verify_webhook_signature(
            payload,
            signature,
            &self.config.payment.webhook_secret,
            self.config.payment.webhook_tolerance_seconds,
            now.timestamp(),
        )?;

        let event: WebhookEvent = serde_json::from_slice(payload)
            .map_err(|e| Error::Validation(format!("could not parse webhook JSON: {e}")))?;
        let object = &event.data.object;

        let outcome = match event.kind.as_str() {
            CHECKOUT_COMPLETED => {
                let id = object
                    .pointer("/metadata/subscription_id")
                    .and_then(Value::as_str)
                    .and_then(|s| Uuid::parse_str(s).ok())
                    .ok_or_else(|| {
                        Error::Validation("checkout session has no subscription_id".to_string())
                    })?;
                let mut subscription = self
                    .repos
                    .subscriptions
                    .find_by_id(id)
                    .await?
                    .ok_or_else(|| Error::not_found("subscription"))?;
                subscription.activate(reference_id(object.get("subscription")), now);
                self.repos.subscriptions.update(&subscription).await?;
                WebhookOutcome::Activated {
                    subscription_id: subscription.id,
                }
            }
            INVOICE_PAID => {
                let mut subscription = self
                    .by_gateway_id(reference_id(object.get("subscription")))
                    .await?;
                subscription.renew(now);
                self.repos.subscriptions.update(&subscription).await?;
                WebhookOutcome::Renewed {
                    subscription_id: subscription.id,
                }
            }
            SUBSCRIPTION_DELETED => {
                let mut subscription = self.by_gateway_id(reference_id(object.get("id"))).await?;
                subscription.cancel(self.config.payment.grace_period_days, now);
                self.repos.subscriptions.update(&subscription).await?;
                WebhookOutcome::Canceled {
                    subscription_id: subscription.id,
                }
            }
            other => WebhookOutcome::Ignored {
                event_type: other.to_string(),
            },
        };

        tracing::info!(event_type = %event.kind, outcome = ?outcome, "Webhook processed");
        Ok(outcome)
    }

    async fn by_gateway_id(&self, gateway_id: Option<String>) -> Result<Subscription> {
        let gateway_id = gateway_id
            .ok_or_else(|| Error::Validation("event has no subscription reference".to_string()))?;
        self.repos
            .subscriptions
            .find_by_gateway_id(&gateway_id)
            .await?
            .ok_or_else(|| Error::not_found("subscription"))
    }
}

/// The provider sends references either as a bare id or as an expanded object.
fn reference_id(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(id) if !id.is_empty() => Some(id.clone()),
        Value::Object(map) => map.get("id").and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reference_id_accepts_string_or_object() {
        assert_eq!(reference_id(Some(&json!("sub_1"))).as_deref(), Some("sub_1"));
        assert_eq!(
            reference_id(Some(&json!({"id": "sub_2"}))).as_deref(),
            Some("sub_2")
        );
        assert_eq!(reference_id(Some(&json!(null))), None);
        assert_eq!(reference_id(Some(&json!(""))), None);
        assert_eq!(reference_id(None), None);
    }
}
