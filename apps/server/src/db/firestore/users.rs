use async_trait::async_trait;
use firestore::FirestoreDb;
use uuid::Uuid;

use super::{first_where, get_by_id, insert, put};
use crate::{
    db::{
        layout::{UserDoc, USERS},
        traits::UserRepository,
    },
    error::{Error, Result},
    models::User,
};

#[derive(Clone)]
pub struct FirestoreUserRepository {
    db: FirestoreDb,
}

impl FirestoreUserRepository {
    pub fn new(db: FirestoreDb) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for FirestoreUserRepository {
    async fn create(&self, user: &User) -> Result<()> {
        if self.exists_by_email(&user.email).await? {
            return Err(Error::already_exists("user"));
        }
        insert(&self.db, USERS, user.id, &UserDoc::from(user)).await
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool> {
        Ok(self.find_by_email(email).await?.is_some())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let doc: Option<UserDoc> = first_where(&self.db, USERS, "Email", email.to_string()).await?;
        Ok(doc.map(User::from))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let doc: Option<UserDoc> = get_by_id(&self.db, USERS, id).await?;
        Ok(doc.map(User::from))
    }

    async fn update(&self, user: &User) -> Result<()> {
        if self.find_by_id(user.id).await?.is_none() {
            return Err(Error::not_found("user"));
        }
        put(&self.db, USERS, user.id, &UserDoc::from(user)).await
    }
}
