use sqlx::FromRow;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,                     // storage-generated key
    pub uuid: Uuid,                  // public identifier
    pub fname: String,
    pub lname: String,
    pub email: String,
    pub password: String,            // Argon2 hash, never plaintext
    pub role: String,
    // row bookkeeping, not part of any response
    #[allow(dead_code)]
    pub created_at: OffsetDateTime,
    #[allow(dead_code)]
    pub updated_at: OffsetDateTime,
}

/// Values for an insert. `password` must already be hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub uuid: Uuid,
    pub fname: String,
    pub lname: String,
    pub email: String,
    pub password: String,
    pub role: String,
}

/// Partial update; `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
    pub fname: Option<String>,
    pub lname: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        self.fname.is_none()
            && self.lname.is_none()
            && self.email.is_none()
            && self.password.is_none()
            && self.role.is_none()
    }
}

/// Row selector shared by every repository operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserFilter {
    Id(i64),
    Uuid(Uuid),
    Email(String),
    Fname(String),
    /// Literal substring of `fname` or `lname`; empty matches everything.
    NameContains(String),
}

impl UserFilter {
    pub fn matches(&self, user: &User) -> bool {
        match self {
            UserFilter::Id(id) => user.id == *id,
            UserFilter::Uuid(uuid) => user.uuid == *uuid,
            UserFilter::Email(email) => user.email == *email,
            UserFilter::Fname(fname) => user.fname == *fname,
            UserFilter::NameContains(needle) => {
                user.fname.contains(needle.as_str()) || user.lname.contains(needle.as_str())
            }
        }
    }
}

/// Columns guarded by a unique index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Uuid,
    Email,
    Fname,
}

impl UniqueField {
    fn from_constraint(name: &str) -> Option<Self> {
        match name {
            "users_uuid_key" => Some(UniqueField::Uuid),
            "users_email_key" => Some(UniqueField::Email),
            "users_fname_key" => Some(UniqueField::Fname),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate value for unique column {0:?}")]
    Duplicate(UniqueField),
    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        let duplicate = e
            .as_database_error()
            .filter(|db_err| db_err.is_unique_violation())
            .and_then(|db_err| db_err.constraint())
            .and_then(UniqueField::from_constraint);
        match duplicate {
            Some(field) => StoreError::Duplicate(field),
            None => StoreError::Database(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn sample() -> User {
        User {
            id: 7,
            uuid: Uuid::new_v4(),
            fname: "ann".into(),
            lname: "lee".into(),
            email: "a@x.com".into(),
            password: "$argon2id$stub".into(),
            role: "staff".into(),
            created_at: datetime!(2024-01-01 0:00 UTC),
            updated_at: datetime!(2024-01-01 0:00 UTC),
        }
    }

    #[test]
    fn name_filter_checks_both_name_columns() {
        let user = sample();
        assert!(UserFilter::NameContains(String::new()).matches(&user));
        assert!(UserFilter::NameContains("nn".into()).matches(&user));
        assert!(UserFilter::NameContains("ee".into()).matches(&user));
        assert!(!UserFilter::NameContains("ANN".into()).matches(&user));
        assert!(!UserFilter::NameContains("bob".into()).matches(&user));
    }

    #[test]
    fn exact_filters() {
        let user = sample();
        assert!(UserFilter::Id(7).matches(&user));
        assert!(UserFilter::Uuid(user.uuid).matches(&user));
        assert!(UserFilter::Email("a@x.com".into()).matches(&user));
        assert!(!UserFilter::Fname("an".into()).matches(&user));
    }

    #[test]
    fn non_database_errors_stay_database_errors() {
        let err = StoreError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, StoreError::Database(sqlx::Error::RowNotFound)));
        assert!(UserChanges::default().is_empty());
    }
}
