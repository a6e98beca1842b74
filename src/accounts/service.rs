use crate::{
    accounts::{AccountError, Credentials, TokenAuthority, UserAccount},
    processing::{
        mappers::{decode_account, materialize},
        sanitize::{validate_password, validate_username},
    },
    store::{Predicate, RecordStore, StoreError},
};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Keyword field holding the account username.
const USERNAME_FIELD: &str = "username";

/// Abstraction over account operations used by the HTTP surface.
#[async_trait]
pub trait AccountApi: Send + Sync {
    /// Register a new account; usernames are unique.
    async fn signup(&self, account: UserAccount) -> Result<(), AccountError>;

    /// Check credentials and return a signed bearer token.
    async fn login(&self, credentials: Credentials) -> Result<String, AccountError>;
}

/// Accounts stored in their own collection, keyed by username.
pub struct AccountService {
    records: Arc<dyn RecordStore>,
    collection: String,
    tokens: Arc<TokenAuthority>,
}

impl AccountService {
    /// Build a service over the user collection and a shared token authority.
    pub fn new(
        records: Arc<dyn RecordStore>,
        collection: impl Into<String>,
        tokens: Arc<TokenAuthority>,
    ) -> Self {
        Self {
            records,
            collection: collection.into(),
            tokens,
        }
    }

    fn by_username(username: &str) -> Predicate {
        Predicate::Term {
            field: USERNAME_FIELD.to_string(),
            value: username.to_string(),
        }
    }
}

#[async_trait]
impl AccountApi for AccountService {
    async fn signup(&self, account: UserAccount) -> Result<(), AccountError> {
        validate_username(&account.username)?;
        validate_password(&account.password)?;

        // Count then put: two concurrent signups for one name can both pass the check.
        let existing = self
            .records
            .count_matches(&self.collection, &Self::by_username(&account.username))
            .await?;
        if existing > 0 {
            tracing::info!(username = %account.username, "Signup rejected; username taken");
            return Err(AccountError::UsernameTaken(account.username));
        }

        let document: Value = serde_json::to_value(&account).map_err(StoreError::from)?;
        self.records
            .put(&self.collection, &account.username, &document)
            .await?;
        tracing::info!(username = %account.username, "User added");
        Ok(())
    }

    async fn login(&self, credentials: Credentials) -> Result<String, AccountError> {
        let Credentials { username, password } = credentials;
        let hits = self
            .records
            .search(&self.collection, &Self::by_username(&username))
            .await?;
        let (accounts, _) = materialize("user", hits, decode_account);

        let matched = !password.is_empty()
            && accounts
                .iter()
                .any(|account| account.username == username && account.password == password);
        if !matched {
            tracing::info!(username = %username, "Login rejected");
            return Err(AccountError::InvalidCredentials);
        }

        let token = self.tokens.issue(&username)?;
        tracing::info!(username = %username, "Login succeeded");
        Ok(token)
    }
}
