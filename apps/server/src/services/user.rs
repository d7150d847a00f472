use std::sync::Arc;
use validator::Validate;

use crate::{
    config::Config,
    db::Repositories,
    error::{Error, Result},
    models::{CreateUser, User},
    services::password::hash_password,
};

pub struct UserService {
    config: Arc<Config>,
    repos: Repositories,
}

impl UserService {
    pub fn new(config: Arc<Config>, repos: Repositories) -> Self {
        Self { config, repos }
    }

    pub async fn create(&self, input: CreateUser) -> Result<User> {
        input.validate()?;
        input.location.validate()?;

        let email = input.email.trim().to_lowercase();
        if self.repos.users.exists_by_email(&email).await? {
            return Err(Error::already_exists("user"));
        }

        let hash = hash_password(&input.password, self.config.auth.bcrypt_cost).await?;
        let user = User::new(input, hash);
        self.repos.users.create(&user).await?;
        tracing::info!(user_id = %user.id, "User registered");
        Ok(user)
    }
}
