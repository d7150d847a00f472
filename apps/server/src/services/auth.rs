//! Email/password login for both principal kinds

use serde::{Deserialize, Serialize};

use crate::{
    auth::{AuthManager, Principal, PrincipalKind},
    db::Repositories,
    error::{Error, Result},
    models::{Dressmaker, User},
    services::password::verify_password,
};

#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Session<T> {
    pub token: String,
    pub user: T,
}

pub struct AuthService {
    auth: AuthManager,
    repos: Repositories,
}

impl AuthService {
    pub fn new(auth: AuthManager, repos: Repositories) -> Self {
        Self { auth, repos }
    }

    pub async fn login_dressmaker(&self, credentials: &Credentials) -> Result<Session<Dressmaker>> {
        let email = normalize(credentials)?;
        let dressmaker = self.repos.dressmakers.find_by_email(&email).await?;
        let dressmaker = check(dressmaker, |d| &d.password_hash, &credentials.password).await?;

        let token = self.auth.issue(&Principal {
            subject: dressmaker.id,
            kind: PrincipalKind::Dressmaker,
        })?;
        Ok(Session {
            token,
            user: dressmaker,
        })
    }

    pub async fn login_user(&self, credentials: &Credentials) -> Result<Session<User>> {
        let email = normalize(credentials)?;
        let user = self.repos.users.find_by_email(&email).await?;
        let user = check(user, |u| &u.password_hash, &credentials.password).await?;

        let token = self.auth.issue(&Principal {
            subject: user.id,
            kind: PrincipalKind::User,
        })?;
        Ok(Session { token, user })
    }
}

fn normalize(credentials: &Credentials) -> Result<String> {
    let email = credentials.email.trim().to_lowercase();
    if email.is_empty() || credentials.password.is_empty() {
        return Err(Error::Validation(
            "email and password are required".to_string(),
        ));
    }
    Ok(email)
}

/// Unknown account and wrong password fail the same way.
async fn check<T>(
    account: Option<T>,
    hash: impl Fn(&T) -> &String,
    password: &str,
) -> Result<T> {
    let Some(account) = account else {
        return Err(Error::InvalidCredentials);
    };
    if verify_password(password, hash(&account)).await? {
        Ok(account)
    } else {
        Err(Error::InvalidCredentials)
    }
}
