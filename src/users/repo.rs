use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::users::repo_types::{NewUser, StoreError, User, UserChanges, UserFilter};

const USER_COLUMNS: &str = "id, uuid, fname, lname, email, password, role, created_at, updated_at";

/// Storage capabilities the user controller relies on.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// All matching users, ordered by internal id.
    async fn find_all(&self, filter: &UserFilter) -> Result<Vec<User>, StoreError>;
    async fn find_one(&self, filter: &UserFilter) -> Result<Option<User>, StoreError>;
    async fn create(&self, user: NewUser) -> Result<User, StoreError>;
    /// Applies `changes` to matching rows and returns how many were touched.
    async fn update(&self, filter: &UserFilter, changes: &UserChanges) -> Result<u64, StoreError>;
    async fn destroy(&self, filter: &UserFilter) -> Result<u64, StoreError>;
}

#[derive(Clone)]
pub struct PgUserRepo {
    pool: PgPool,
}

impl PgUserRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Escapes LIKE metacharacters so the needle matches literally.
fn escape_like(needle: &str) -> String {
    let mut out = String::with_capacity(needle.len());
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &UserFilter) {
    match filter {
        UserFilter::Id(id) => {
            qb.push(" WHERE id = ").push_bind(*id);
        }
        UserFilter::Uuid(uuid) => {
            qb.push(" WHERE uuid = ").push_bind(*uuid);
        }
        UserFilter::Email(email) => {
            qb.push(" WHERE email = ").push_bind(email.clone());
        }
        UserFilter::Fname(fname) => {
            qb.push(" WHERE fname = ").push_bind(fname.clone());
        }
        UserFilter::NameContains(needle) => {
            let pattern = format!("%{}%", escape_like(needle));
            qb.push(" WHERE (fname LIKE ")
                .push_bind(pattern.clone())
                .push(" OR lname LIKE ")
                .push_bind(pattern)
                .push(")");
        }
    }
}

fn build_update(filter: &UserFilter, changes: &UserChanges) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::<Postgres>::new("UPDATE users SET ");
    let mut set = qb.separated(", ");
    let columns = [
        ("fname", &changes.fname),
        ("lname", &changes.lname),
        ("email", &changes.email),
        ("password", &changes.password),
        ("role", &changes.role),
    ];
    for (column, value) in columns {
        if let Some(value) = value {
            set.push(format!("{column} = "))
                .push_bind_unseparated(value.clone());
        }
    }
    set.push("updated_at = now()");
    push_filter(&mut qb, filter);
    qb
}

#[async_trait]
impl UserRepository for PgUserRepo {
    async fn find_all(&self, filter: &UserFilter) -> Result<Vec<User>, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {USER_COLUMNS} FROM users"));
        push_filter(&mut qb, filter);
        qb.push(" ORDER BY id ASC");
        let rows = qb.build_query_as::<User>().fetch_all(&self.pool).await?;
        Ok(rows)
    }

    async fn find_one(&self, filter: &UserFilter) -> Result<Option<User>, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {USER_COLUMNS} FROM users"));
        push_filter(&mut qb, filter);
        qb.push(" ORDER BY id ASC LIMIT 1");
        let row = qb.build_query_as::<User>().fetch_optional(&self.pool).await?;
        Ok(row)
    }

    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        let row = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (uuid, fname, lname, email, password, role)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user.uuid)
        .bind(user.fname)
        .bind(user.lname)
        .bind(user.email)
        .bind(user.password)
        .bind(user.role)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update(&self, filter: &UserFilter, changes: &UserChanges) -> Result<u64, StoreError> {
        if changes.is_empty() {
            return Ok(0);
        }

        let mut qb = build_update(filter, changes);
        let result = qb.build().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn destroy(&self, filter: &UserFilter) -> Result<u64, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new("DELETE FROM users");
        push_filter(&mut qb, filter);
        let result = qb.build().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}
