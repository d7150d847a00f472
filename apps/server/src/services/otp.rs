//! Phone verification: send a code, check it, enable the account

use serde::Deserialize;
use std::sync::Arc;

use crate::{
    auth::{Principal, PrincipalKind},
    db::Repositories,
    error::{Error, Result},
    integrations::OtpProvider,
};

#[derive(Debug, Clone, Deserialize)]
pub struct SendCode {
    #[serde(default)]
    pub phone: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VerifyCode {
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub code: String,
}

pub struct OtpService {
    provider: Arc<dyn OtpProvider>,
    repos: Repositories,
}

impl OtpService {
    pub fn new(provider: Arc<dyn OtpProvider>, repos: Repositories) -> Self {
        Self { provider, repos }
    }

    pub async fn send(&self, input: &SendCode) -> Result<()> {
        let phone = required_phone(&input.phone)?;
        self.provider.send(phone).await
    }

    /// Check the code and enable the principal's account.
    ///
    /// `kind` is the account kind the route verifies; it must match the caller.
    pub async fn verify(
        &self,
        principal: &Principal,
        kind: PrincipalKind,
        input: &VerifyCode,
    ) -> Result<()> {
        principal.require(kind)?;
        let phone = required_phone(&input.phone)?;
        let code = input.code.trim();
        if code.is_empty() {
            return Err(Error::Validation("code is required".to_string()));
        }

        if !self.provider.verify(phone, code).await? {
            return Err(Error::Validation("invalid code".to_string()));
        }

        match kind {
            PrincipalKind::Dressmaker => {
                let mut dressmaker = self
                    .repos
                    .dressmakers
                    .find_by_id(principal.subject)
                    .await?
                    .ok_or_else(|| Error::not_found("dressmaker"))?;
                dressmaker.enable();
                self.repos.dressmakers.update(&dressmaker).await?;
            }
            PrincipalKind::User => {
                let mut user = self
                    .repos
                    .users
                    .find_by_id(principal.subject)
                    .await?
                    .ok_or_else(|| Error::not_found("user"))?;
                user.enable();
                self.repos.users.update(&user).await?;
            }
        }

        tracing::info!(subject = %principal.subject, kind = %kind, "Phone verified");
        Ok(())
    }
}

fn required_phone(phone: &str) -> Result<&str> {
    let phone = phone.trim();
    if phone.is_empty() {
        return Err(Error::Validation("phone is required".to_string()));
    }
    Ok(phone)
}
