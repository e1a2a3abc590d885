//! Account registration and credential verification.

use std::sync::Arc;

use crate::domain::{Registration, User};
use crate::error::DomainError;
use crate::ports::{AuthError, BaseRepository, PasswordService, UserRepository};
use crate::service::ServiceError;

/// Credential store operations over the user repository and hasher.
pub struct AccountService {
    users: Arc<dyn UserRepository>,
    passwords: Arc<dyn PasswordService>,
}

impl AccountService {
    pub fn new(users: Arc<dyn UserRepository>, passwords: Arc<dyn PasswordService>) -> Self {
        Self { users, passwords }
    }

    /// Register a new account. The email is normalized to lowercase before
    /// the uniqueness check and storage; the password only ever leaves this
    /// method as a salted hash.
    pub async fn register(&self, registration: Registration) -> Result<User, ServiceError> {
        registration.validate()?;

        let email = registration.normalized_email();
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(DomainError::Duplicate("email is already registered".into()).into());
        }

        let password_hash = self.passwords.hash(&registration.password)?;
        let mut user = User::new(registration.username.trim().to_string(), email, password_hash);
        if let Some(bio) = registration.bio {
            user.bio = bio;
        }

        Ok(self.users.insert(user).await?)
    }

    /// Fetch an account by id.
    pub async fn get(&self, id: uuid::Uuid) -> Result<User, ServiceError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| {
                ServiceError::Domain(DomainError::NotFound {
                    entity_type: "user",
                    id,
                })
            })
    }

    /// Verify credentials, distinguishing an unknown email from a wrong
    /// password.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, ServiceError> {
        let email = email.trim().to_lowercase();
        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !self.passwords.verify(password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials.into());
        }

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use uuid::Uuid;

    use super::*;
    use crate::error::RepoError;
    use crate::ports::BaseRepository;

    #[derive(Default)]
    struct FakeUserRepo {
        users: Mutex<Vec<User>>,
    }

    #[async_trait]
    impl BaseRepository<User, Uuid> for FakeUserRepo {
        async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
            Ok(self.users.lock().unwrap().iter().find(|u| u.id == id).cloned())
        }

        async fn insert(&self, user: User) -> Result<User, RepoError> {
            self.users.lock().unwrap().push(user.clone());
            Ok(user)
        }

        async fn delete(&self, id: Uuid) -> Result<bool, RepoError> {
            let mut users = self.users.lock().unwrap();
            let before = users.len();
            users.retain(|u| u.id != id);
            Ok(users.len() < before)
        }
    }

    #[async_trait]
    impl UserRepository for FakeUserRepo {
        async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
            Ok(self
                .users
                .lock()
                .unwrap()
                .iter()
                .find(|u| u.email == email)
                .cloned())
        }
    }

    /// Reversible stand-in so tests can assert hashing happened.
    struct FakeHasher;

    impl PasswordService for FakeHasher {
        fn hash(&self, password: &str) -> Result<String, AuthError> {
            Ok(format!("hashed:{password}"))
        }

        fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
            Ok(hash == format!("hashed:{password}"))
        }
    }

    fn service() -> (AccountService, Arc<FakeUserRepo>) {
        let repo = Arc::new(FakeUserRepo::default());
        let service = AccountService::new(repo.clone(), Arc::new(FakeHasher));
        (service, repo)
    }

    fn registration() -> Registration {
        Registration {
            username: "ana_dev".into(),
            email: "Ana@Example.com".into(),
            password: "Abc123".into(),
            bio: None,
        }
    }

    #[tokio::test]
    async fn register_stores_normalized_email_and_hash() {
        let (service, repo) = service();

        let user = service.register(registration()).await.unwrap();

        assert_eq!(user.email, "ana@example.com");
        assert_eq!(user.password_hash, "hashed:Abc123");
        assert_eq!(repo.users.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected_without_second_record() {
        let (service, repo) = service();
        service.register(registration()).await.unwrap();

        let mut again = registration();
        again.username = "other_user".into();
        let err = service.register(again).await.unwrap_err();

        assert!(matches!(
            err,
            ServiceError::Domain(DomainError::Duplicate(_))
        ));
        assert_eq!(repo.users.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn invalid_registration_writes_nothing() {
        let (service, repo) = service();
        let mut reg = registration();
        reg.password = "weak".into();

        assert!(service.register(reg).await.is_err());
        assert!(repo.users.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn authenticate_roundtrip() {
        let (service, _repo) = service();
        service.register(registration()).await.unwrap();

        // Lookup is case-insensitive on the email.
        let user = service.authenticate("ANA@example.com", "Abc123").await.unwrap();
        assert_eq!(user.username, "ana_dev");

        let err = service.authenticate("ana@example.com", "Wrong1x").await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Auth(AuthError::InvalidCredentials)
        ));

        let err = service.authenticate("nobody@example.com", "Abc123").await.unwrap_err();
        assert!(matches!(err, ServiceError::Auth(AuthError::UserNotFound)));
    }
}
