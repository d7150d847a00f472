//! Checkout sessions and webhook verification for the payment provider

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use serde_json::Value;
use sha2::Sha256;
use std::{sync::Arc, time::Duration};

use crate::{
    config::{PaymentConfig, PaymentProviderKind},
    error::{Error, Result},
    models::{Dressmaker, Subscription},
};

type HmacSha256 = Hmac<Sha256>;

pub struct CheckoutRequest<'a> {
    pub subscription: &'a Subscription,
    pub dressmaker: &'a Dressmaker,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Open a hosted checkout for `request` and return the URL to send the payer to.
    async fn create_checkout(&self, request: &CheckoutRequest<'_>) -> Result<String>;
}

pub fn build_gateway(config: &PaymentConfig) -> anyhow::Result<Arc<dyn PaymentGateway>> {
    Ok(match config.provider {
        PaymentProviderKind::Stripe => Arc::new(StripeCheckout::new(config)?),
        PaymentProviderKind::Disabled => Arc::new(DevPaymentGateway::new(config.success_url.clone())),
    })
}

fn upstream(message: impl Into<String>) -> Error {
    Error::Upstream {
        service: "payment",
        message: message.into(),
    }
}

/// Stripe Checkout Sessions with inline recurring prices.
pub struct StripeCheckout {
    http: reqwest::Client,
    base_url: String,
    secret_key: String,
    success_url: String,
    cancel_url: String,
}

#[derive(Debug, Deserialize)]
struct CheckoutSession {
    url: Option<String>,
}

impl StripeCheckout {
    pub fn new(config: &PaymentConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            secret_key: config.secret_key.clone(),
            success_url: config.success_url.clone(),
            cancel_url: config.cancel_url.clone(),
        })
    }

    fn session_form(&self, request: &CheckoutRequest<'_>) -> Vec<(&'static str, String)> {
        let plan = &request.subscription.plan;
        vec![
            ("mode", "subscription".to_string()),
            ("customer_email", request.dressmaker.email.clone()),
            ("success_url", self.success_url.clone()),
            ("cancel_url", self.cancel_url.clone()),
            (
                "line_items[0][price_data][currency]",
                plan.price.currency.to_lowercase(),
            ),
            (
                "line_items[0][price_data][unit_amount]",
                plan.price.amount.to_string(),
            ),
            (
                "line_items[0][price_data][product_data][name]",
                plan.product_name().to_string(),
            ),
            (
                "line_items[0][price_data][recurring][interval]",
                plan.periodicity.interval().to_string(),
            ),
            ("line_items[0][quantity]", "1".to_string()),
            (
                "metadata[subscription_id]",
                request.subscription.id.to_string(),
            ),
            ("metadata[dressmaker_id]", request.dressmaker.id.to_string()),
        ]
    }
}

#[async_trait]
impl PaymentGateway for StripeCheckout {
    async fn create_checkout(&self, request: &CheckoutRequest<'_>) -> Result<String> {
        let res = self
            .http
            .post(format!("{}/v1/checkout/sessions", self.base_url))
            .bearer_auth(&self.secret_key)
            .form(&self.session_form(request))
            .send()
            .await
            .map_err(|e| upstream(format!("request failed: {e}")))?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(upstream(format!("checkout returned HTTP {status}: {body}")));
        }

        let session: CheckoutSession = res
            .json()
            .await
            .map_err(|e| upstream(format!("checkout parse failed: {e}")))?;

        tracing::info!(
            subscription_id = %request.subscription.id,
            "Checkout session created"
        );
        session
            .url
            .ok_or_else(|| upstream("checkout session has no url"))
    }
}

/// Development gateway: no provider call, points straight at the success URL.
pub struct DevPaymentGateway {
    success_url: String,
}

impl DevPaymentGateway {
    pub fn new(success_url: String) -> Self {
        Self { success_url }
    }
}

#[async_trait]
impl PaymentGateway for DevPaymentGateway {
    async fn create_checkout(&self, request: &CheckoutRequest<'_>) -> Result<String> {
        let separator = if self.success_url.contains('?') { '&' } else { '?' };
        Ok(format!(
            "{}{}session_id=dev_{}",
            self.success_url,
            separator,
            request.subscription.id.simple()
        ))
    }
}

/// A webhook event, reduced to the fields the subscription flow reads.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub kind: String,
    pub data: WebhookData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookData {
    pub object: Value,
}

fn signature_error(message: &str) -> Error {
    Error::Validation(format!("invalid webhook signature: {message}"))
}

/// Check a `Stripe-Signature` header (`t=<unix>,v1=<hex>`) against `payload`.
///
/// Any `v1` entry may match. The timestamp must be within `tolerance_seconds`
/// of `now`.
pub fn verify_webhook_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    tolerance_seconds: i64,
    now: i64,
) -> Result<()> {
    let mut timestamp = None;
    let mut signatures = Vec::new();
    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = value.parse::<i64>().ok(),
            Some(("v1", value)) => signatures.push(value),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or_else(|| signature_error("missing timestamp"))?;
    if signatures.is_empty() {
        return Err(signature_error("missing v1 signature"));
    }
    // `t=` is attacker-controlled; an unrepresentable skew is out of tolerance
    let tolerance = u64::try_from(tolerance_seconds).unwrap_or(0);
    let within = now
        .checked_sub(timestamp)
        .map(i64::unsigned_abs)
        .is_some_and(|skew| skew <= tolerance);
    if !within {
        return Err(signature_error("timestamp outside tolerance"));
    }

    let matched = signatures.iter().any(|candidate| {
        let Ok(expected) = hex::decode(candidate) else {
            return false;
        };
        signed_payload_mac(payload, secret, timestamp)
            .map(|mac| mac.verify_slice(&expected).is_ok())
            .unwrap_or(false)
    });

    if matched {
        Ok(())
    } else {
        Err(signature_error("no matching signature"))
    }
}

/// Build a signature header for `payload` the way the provider does.
pub fn sign_webhook_payload(payload: &[u8], secret: &str, timestamp: i64) -> Result<String> {
    let mac = signed_payload_mac(payload, secret, timestamp)?;
    Ok(format!(
        "t={timestamp},v1={}",
        hex::encode(mac.finalize().into_bytes())
    ))
}

fn signed_payload_mac(payload: &[u8], secret: &str, timestamp: i64) -> Result<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| Error::Internal(format!("invalid webhook secret: {e}")))?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(mac)
}
