use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Avatar assigned to accounts that never uploaded one.
pub const DEFAULT_AVATAR: &str = "default.png";

const USERNAME_MIN: usize = 3;
const USERNAME_MAX: usize = 20;
const PASSWORD_MIN: usize = 6;
const BIO_MAX: usize = 150;

/// User entity - an account that can authenticate against the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    /// Stored lowercase; lookups normalize before comparing.
    pub email: String,
    /// Salted one-way hash. Never serialized out of the persistence layer.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub bio: String,
    pub avatar: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with generated id, timestamps and defaults.
    pub fn new(username: String, email: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            username,
            email,
            password_hash,
            bio: String::new(),
            avatar: DEFAULT_AVATAR.to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Unvalidated registration input.
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub bio: Option<String>,
}

impl Registration {
    pub fn validate(&self) -> Result<(), DomainError> {
        let username = self.username.trim();
        if username.chars().count() < USERNAME_MIN || username.chars().count() > USERNAME_MAX {
            return Err(DomainError::Validation(format!(
                "username must be {USERNAME_MIN}-{USERNAME_MAX} characters"
            )));
        }
        if !is_valid_email(self.email.trim()) {
            return Err(DomainError::Validation("email is not valid".into()));
        }
        if !is_strong_password(&self.password) {
            return Err(DomainError::Validation(format!(
                "password needs at least {PASSWORD_MIN} characters with upper case, \
                 lower case and a digit"
            )));
        }
        if let Some(bio) = &self.bio {
            if bio.chars().count() > BIO_MAX {
                return Err(DomainError::Validation(format!(
                    "bio must be at most {BIO_MAX} characters"
                )));
            }
        }
        Ok(())
    }

    /// Email as it is stored and looked up.
    pub fn normalized_email(&self) -> String {
        self.email.trim().to_lowercase()
    }
}

fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace)
        && !domain.contains('@')
}

fn is_strong_password(password: &str) -> bool {
    password.chars().count() >= PASSWORD_MIN
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration() -> Registration {
        Registration {
            username: "ana_dev".into(),
            email: "Ana@Example.com".into(),
            password: "Abc123".into(),
            bio: None,
        }
    }

    #[test]
    fn valid_registration_passes() {
        assert!(registration().validate().is_ok());
    }

    #[test]
    fn username_length_is_bounded() {
        let mut reg = registration();
        reg.username = "ab".into();
        assert!(reg.validate().is_err());

        reg.username = "a".repeat(21);
        assert!(reg.validate().is_err());
    }

    #[test]
    fn email_syntax_is_checked() {
        for bad in ["not-an-email", "a@b", "a b@c.com", "@c.com", "a@.com"] {
            let mut reg = registration();
            reg.email = bad.into();
            assert!(reg.validate().is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn email_is_normalized_to_lowercase() {
        assert_eq!(registration().normalized_email(), "ana@example.com");
    }

    #[test]
    fn weak_passwords_are_rejected() {
        for bad in ["Ab1", "abc123", "ABC123", "Abcdef"] {
            let mut reg = registration();
            reg.password = bad.into();
            assert!(reg.validate().is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn long_bio_is_rejected() {
        let mut reg = registration();
        reg.bio = Some("x".repeat(151));
        assert!(reg.validate().is_err());
    }

    #[test]
    fn new_user_gets_defaults() {
        let user = User::new("ana".into(), "ana@example.com".into(), "hash".into());
        assert_eq!(user.avatar, DEFAULT_AVATAR);
        assert!(user.bio.is_empty());
    }
}
