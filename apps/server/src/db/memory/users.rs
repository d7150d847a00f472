use async_trait::async_trait;
use uuid::Uuid;

use super::{by_email, by_id, decode, encode, MemoryStore};
use crate::{
    db::{layout::UserDoc, traits::UserRepository},
    error::{Error, Result},
    models::User,
};

fn from_doc(doc: &serde_json::Value) -> Result<User> {
    decode::<UserDoc>(doc).map(User::from)
}

#[derive(Clone)]
pub struct MemoryUserRepository {
    store: MemoryStore,
}

impl MemoryUserRepository {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn create(&self, user: &User) -> Result<()> {
        let doc = encode(&UserDoc::from(user))?;
        let mut collections = self.store.write().await;
        if collections.users.first(&by_email(&user.email)).is_some() {
            return Err(Error::already_exists("user"));
        }
        collections.users.insert(doc);
        Ok(())
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool> {
        let collections = self.store.read().await;
        Ok(collections.users.first(&by_email(email)).is_some())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let collections = self.store.read().await;
        collections
            .users
            .first(&by_email(email))
            .map(from_doc)
            .transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let collections = self.store.read().await;
        collections
            .users
            .first(&by_id(id))
            .map(from_doc)
            .transpose()
    }

    async fn update(&self, user: &User) -> Result<()> {
        let doc = encode(&UserDoc::from(user))?;
        let mut collections = self.store.write().await;
        if collections.users.replace(&by_id(user.id), doc) {
            Ok(())
        } else {
            Err(Error::not_found("user"))
        }
    }
}
