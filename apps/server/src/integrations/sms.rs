//! One-time-password delivery over SMS

use async_trait::async_trait;
use serde::Deserialize;
use std::{sync::Arc, time::Duration};

use crate::{
    config::{SmsConfig, SmsProviderKind},
    error::{Error, Result},
};

#[async_trait]
pub trait OtpProvider: Send + Sync {
    /// Start a verification by sending a code to `phone`.
    async fn send(&self, phone: &str) -> Result<()>;

    /// Check a code; `Ok(false)` when it is wrong or expired.
    async fn verify(&self, phone: &str, code: &str) -> Result<bool>;
}

pub fn build_provider(config: &SmsConfig) -> anyhow::Result<Arc<dyn OtpProvider>> {
    Ok(match config.provider {
        SmsProviderKind::Twilio => Arc::new(TwilioVerify::new(config)?),
        SmsProviderKind::Disabled => Arc::new(DevOtpProvider::new(config.dev_code.clone())),
    })
}

fn upstream(message: impl Into<String>) -> Error {
    Error::Upstream {
        service: "sms",
        message: message.into(),
    }
}

/// Twilio Verify v2 over its REST API.
pub struct TwilioVerify {
    http: reqwest::Client,
    base_url: String,
    account_sid: String,
    auth_token: String,
    service_sid: String,
    channel: String,
}

#[derive(Debug, Deserialize)]
struct VerificationCheck {
    status: Option<String>,
}

impl TwilioVerify {
    pub fn new(config: &SmsConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            account_sid: config.account_sid.clone(),
            auth_token: config.auth_token.clone(),
            service_sid: config.service_sid.clone(),
            channel: config.channel.clone(),
        })
    }

    fn endpoint(&self, resource: &str) -> String {
        format!("{}/v2/Services/{}/{}", self.base_url, self.service_sid, resource)
    }

    async fn post(&self, resource: &str, form: &[(&str, &str)]) -> Result<reqwest::Response> {
        self.http
            .post(self.endpoint(resource))
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(form)
            .send()
            .await
            .map_err(|e| upstream(format!("request failed: {e}")))
    }
}

#[async_trait]
impl OtpProvider for TwilioVerify {
    async fn send(&self, phone: &str) -> Result<()> {
        let res = self
            .post("Verifications", &[("To", phone), ("Channel", self.channel.as_str())])
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(upstream(format!("verification returned HTTP {status}: {body}")));
        }

        tracing::info!("Verification code sent");
        Ok(())
    }

    async fn verify(&self, phone: &str, code: &str) -> Result<bool> {
        let res = self
            .post("VerificationCheck", &[("To", phone), ("Code", code)])
            .await?;

        // No pending verification for this number (expired or already used)
        if res.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(false);
        }
        if !res.status().is_success() {
            return Err(upstream(format!(
                "verification check returned HTTP {}",
                res.status()
            )));
        }

        let check: VerificationCheck = res
            .json()
            .await
            .map_err(|e| upstream(format!("verification check parse failed: {e}")))?;
        Ok(check.status.as_deref() == Some("approved"))
    }
}

/// Development provider: sends nothing and accepts a fixed code.
pub struct DevOtpProvider {
    code: String,
}

impl DevOtpProvider {
    pub fn new(code: String) -> Self {
        Self { code }
    }
}

#[async_trait]
impl OtpProvider for DevOtpProvider {
    async fn send(&self, phone: &str) -> Result<()> {
        tracing::info!(phone = %phone, "SMS provider disabled; not sending verification code");
        Ok(())
    }

    async fn verify(&self, _phone: &str, code: &str) -> Result<bool> {
        Ok(!self.code.is_empty() && code == self.code)
    }
}
