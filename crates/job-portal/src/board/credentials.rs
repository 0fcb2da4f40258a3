use std::sync::Arc;

use hmac::Hmac;
use scrypt::password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString};
use scrypt::{Params, Scrypt};
use sha2::Sha256;
use tracing::{info, warn};

use super::domain::{Identity, NewUser, User, UserId, UserRole};
use super::error::BoardError;
use super::repository::{BoardRepository, RepositoryError};
use super::validation;

pub(crate) type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("hmac key rejected")]
    InvalidKey,
    #[error("password hashing failed: {0}")]
    Hash(String),
}

/// Opaque password hashing so the store never depends on a concrete primitive.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<String, CredentialError>;
    fn verify(&self, password: &str, stored: &str) -> bool;
}

/// scrypt with a random per-user salt, stored as a PHC string (`$scrypt$ln=15,r=8,p=1$...`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScryptHasher {
    log_n: u8,
    r: u32,
    p: u32,
}

impl ScryptHasher {
    pub fn new(log_n: u8, r: u32, p: u32) -> Result<Self, CredentialError> {
        let hasher = Self { log_n, r, p };
        hasher.params()?;
        Ok(hasher)
    }

    fn params(&self) -> Result<Params, CredentialError> {
        Params::new(self.log_n, self.r, self.p, Params::RECOMMENDED_LEN)
            .map_err(|err| CredentialError::Hash(err.to_string()))
    }
}

impl Default for ScryptHasher {
    /// N = 2^15, r = 8, p = 1.
    fn default() -> Self {
        Self {
            log_n: 15,
            r: 8,
            p: 1,
        }
    }
}

impl PasswordHasher for ScryptHasher {
    fn hash(&self, password: &str) -> Result<String, CredentialError> {
        let salt = SaltString::encode_b64(uuid::Uuid::new_v4().as_bytes())
            .map_err(|err| CredentialError::Hash(err.to_string()))?;
        let hash = Scrypt
            .hash_password_customized(password.as_bytes(), None, None, self.params()?, &salt)
            .map_err(|err| CredentialError::Hash(err.to_string()))?;
        Ok(hash.to_string())
    }

    fn verify(&self, password: &str, stored: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(stored) else {
            return false;
        };
        Scrypt.verify_password(password.as_bytes(), &parsed).is_ok()
    }
}

/// Registers users and verifies username/password pairs.
pub struct CredentialStore<R> {
    repository: Arc<R>,
    hasher: Arc<dyn PasswordHasher>,
}

impl<R> CredentialStore<R>
where
    R: BoardRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self::with_hasher(repository, Arc::new(ScryptHasher::default()))
    }

    pub fn with_hasher(repository: Arc<R>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { repository, hasher }
    }

    pub fn register(
        &self,
        username: &str,
        password: &str,
        is_employer: bool,
    ) -> Result<User, BoardError> {
        let (username, password) = validation::credentials(username, password)?;
        if self.repository.user_by_username(username)?.is_some() {
            return Err(BoardError::UsernameTaken);
        }

        let user = NewUser {
            username: username.to_string(),
            password_hash: self.hasher.hash(password)?,
            role: UserRole::from_employer_flag(is_employer),
        };
        let stored = self.repository.insert_user(user).map_err(|err| match err {
            RepositoryError::Conflict => BoardError::UsernameTaken,
            other => other.into(),
        })?;

        info!(user_id = %stored.id, role = stored.role.label(), "user registered");
        Ok(stored)
    }

    /// Unknown usernames and wrong passwords are indistinguishable to the caller.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<Identity, BoardError> {
        let user = self.repository.user_by_username(username.trim())?;
        match user {
            Some(user) if self.hasher.verify(password, &user.password_hash) => Ok(user.identity()),
            _ => {
                warn!(username = username.trim(), "rejected login attempt");
                Err(BoardError::InvalidCredentials)
            }
        }
    }

    pub fn identity(&self, user_id: UserId) -> Result<Option<Identity>, BoardError> {
        Ok(self.repository.user(user_id)?.map(|user| user.identity()))
    }

    pub fn user_count(&self) -> Result<usize, BoardError> {
        Ok(self.repository.count_users()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::InMemoryBoardRepository;

    #[test]
    fn hashes_are_salted_phc_strings_that_verify() {
        let hasher = ScryptHasher::default();
        let first = hasher.hash("hunter2").expect("hash");
        let second = hasher.hash("hunter2").expect("hash");

        assert!(first.starts_with("$scrypt$ln=15,r=8,p=1$"), "{first}");
        assert!(!first.contains("hunter2"));
        assert_ne!(first, second);
        assert!(hasher.verify("hunter2", &first));
        assert!(hasher.verify("hunter2", &second));
        assert!(!hasher.verify("hunter3", &first));
    }

    #[test]
    fn verification_reads_cost_from_the_stored_hash() {
        let cheap = ScryptHasher::new(10, 8, 1).expect("params");
        let stored = cheap.hash("hunter2").expect("hash");

        assert!(stored.starts_with("$scrypt$ln=10,r=8,p=1$"));
        assert!(ScryptHasher::default().verify("hunter2", &stored));
    }

    #[test]
    fn malformed_hashes_never_verify() {
        let hasher = ScryptHasher::default();
        assert!(!hasher.verify("pw", ""));
        assert!(!hasher.verify("pw", "plaintext"));
        assert!(!hasher.verify("pw", "$scrypt$ln=15,r=8,p=1$zz$zz"));
        assert!(!hasher.verify("pw", "hmac-sha256$00$00"));
    }

    #[test]
    fn store_persists_only_the_scrypt_hash() {
        let repository = Arc::new(InMemoryBoardRepository::default());
        let store = CredentialStore::new(repository.clone());
        let user = store.register("initech", "correct horse", true).expect("registered");

        assert!(user.password_hash.starts_with("$scrypt$"));
        assert!(!user.password_hash.contains("correct horse"));
        assert_eq!(
            store.authenticate("initech", "correct horse").expect("login").user_id,
            user.id
        );
        assert!(matches!(
            store.authenticate("initech", "wrong horse"),
            Err(BoardError::InvalidCredentials)
        ));
    }
}
