use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;

use crate::users::{
    repo::UserRepository,
    repo_types::{NewUser, StoreError, UniqueField, User, UserChanges, UserFilter},
};

#[derive(Default)]
struct Table {
    next_id: i64,
    rows: Vec<User>,
}

impl Table {
    /// Mirrors the unique indexes of the `users` table. `skip` is the row being updated.
    fn check_unique(
        &self,
        skip: Option<i64>,
        uuid: Option<&uuid::Uuid>,
        email: Option<&str>,
        fname: Option<&str>,
    ) -> Result<(), StoreError> {
        for row in self.rows.iter().filter(|r| Some(r.id) != skip) {
            if uuid.is_some_and(|u| *u == row.uuid) {
                return Err(StoreError::Duplicate(UniqueField::Uuid));
            }
            if email.is_some_and(|e| e == row.email) {
                return Err(StoreError::Duplicate(UniqueField::Email));
            }
            if fname.is_some_and(|f| f == row.fname) {
                return Err(StoreError::Duplicate(UniqueField::Fname));
            }
        }
        Ok(())
    }
}

/// Process-local user store with the same constraints as the Postgres table.
#[derive(Default)]
pub struct InMemoryUserRepo {
    table: RwLock<Table>,
}

impl InMemoryUserRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepo {
    async fn find_all(&self, filter: &UserFilter) -> Result<Vec<User>, StoreError> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .iter()
            .filter(|row| filter.matches(row))
            .cloned()
            .collect())
    }

    async fn find_one(&self, filter: &UserFilter) -> Result<Option<User>, StoreError> {
        let table = self.table.read().await;
        Ok(table.rows.iter().find(|row| filter.matches(row)).cloned())
    }

    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        let mut table = self.table.write().await;
        table.check_unique(None, Some(&user.uuid), Some(&user.email), Some(&user.fname))?;

        table.next_id += 1;
        let now = OffsetDateTime::now_utc();
        let row = User {
            id: table.next_id,
            uuid: user.uuid,
            fname: user.fname,
            lname: user.lname,
            email: user.email,
            password: user.password,
            role: user.role,
            created_at: now,
            updated_at: now,
        };
        table.rows.push(row.clone());
        Ok(row)
    }

    async fn update(&self, filter: &UserFilter, changes: &UserChanges) -> Result<u64, StoreError> {
        if changes.is_empty() {
            return Ok(0);
        }

        let mut table = self.table.write().await;
        let targets: Vec<i64> = table
            .rows
            .iter()
            .filter(|row| filter.matches(row))
            .map(|row| row.id)
            .collect();
        for id in &targets {
            table.check_unique(
                Some(*id),
                None,
                changes.email.as_deref(),
                changes.fname.as_deref(),
            )?;
        }

        let now = OffsetDateTime::now_utc();
        for row in table.rows.iter_mut().filter(|row| targets.contains(&row.id)) {
            if let Some(v) = &changes.fname {
                row.fname = v.clone();
            }
            if let Some(v) = &changes.lname {
                row.lname = v.clone();
            }
            if let Some(v) = &changes.email {
                row.email = v.clone();
            }
            if let Some(v) = &changes.password {
                row.password = v.clone();
            }
            if let Some(v) = &changes.role {
                row.role = v.clone();
            }
            row.updated_at = now;
        }
        Ok(targets.len() as u64)
    }

    async fn destroy(&self, filter: &UserFilter) -> Result<u64, StoreError> {
        let mut table = self.table.write().await;
        let before = table.rows.len();
        table.rows.retain(|row| !filter.matches(row));
        Ok((before - table.rows.len()) as u64)
    }
}
