use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::users::{
    dto::{CreateUserRequest, ProfileView, UpdateUserRequest, UserView},
    error::UserError,
    password::hash_password,
    repo::UserRepository,
    repo_types::{NewUser, User, UserChanges, UserFilter},
};

/// Treats empty strings like missing fields.
fn supplied(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn hash(plain: &str) -> Result<String, UserError> {
    hash_password(plain).map_err(UserError::Hash)
}

async fn find_by_uuid(repo: &dyn UserRepository, uuid: Uuid) -> Result<Option<User>, UserError> {
    Ok(repo.find_one(&UserFilter::Uuid(uuid)).await?)
}

async fn email_taken(repo: &dyn UserRepository, email: &str) -> Result<bool, UserError> {
    Ok(repo
        .find_one(&UserFilter::Email(email.to_owned()))
        .await?
        .is_some())
}

async fn fname_taken(repo: &dyn UserRepository, fname: &str) -> Result<bool, UserError> {
    Ok(repo
        .find_one(&UserFilter::Fname(fname.to_owned()))
        .await?
        .is_some())
}

/// Users whose first or last name contains `search`; everyone when it is empty.
pub async fn list_users(
    repo: &dyn UserRepository,
    search: Option<&str>,
) -> Result<Vec<UserView>, UserError> {
    let needle = search.unwrap_or_default().to_owned();
    let users = repo.find_all(&UserFilter::NameContains(needle)).await?;
    Ok(users.into_iter().map(UserView::from).collect())
}

pub async fn get_user(repo: &dyn UserRepository, uuid: Uuid) -> Result<Option<UserView>, UserError> {
    Ok(find_by_uuid(repo, uuid).await?.map(UserView::from))
}

pub async fn get_profile(
    repo: &dyn UserRepository,
    uuid: Uuid,
) -> Result<Option<ProfileView>, UserError> {
    debug!(%uuid, "profile requested");
    Ok(find_by_uuid(repo, uuid).await?.map(ProfileView::from))
}

/// Validates in a fixed order and stops at the first failure.
pub async fn create_user(
    repo: &dyn UserRepository,
    req: CreateUserRequest,
) -> Result<User, UserError> {
    if req.password != req.conf_password {
        warn!("create rejected: password confirmation mismatch");
        return Err(UserError::PasswordMismatch);
    }
    let Some(role) = supplied(&req.role).map(str::to_owned) else {
        warn!("create rejected: role missing");
        return Err(UserError::RoleRequired);
    };
    if email_taken(repo, &req.email).await? {
        warn!(email = %req.email, "create rejected: email taken");
        return Err(UserError::EmailTaken);
    }
    if fname_taken(repo, &req.fname).await? {
        warn!(fname = %req.fname, "create rejected: fname taken");
        return Err(UserError::UsernameTaken);
    }
    for (field, value) in [
        ("fname", &req.fname),
        ("lname", &req.lname),
        ("email", &req.email),
        ("password", &req.password),
    ] {
        if value.is_empty() {
            return Err(UserError::Empty(field));
        }
    }

    let password = hash(&req.password)?;
    let user = repo
        .create(NewUser {
            uuid: Uuid::new_v4(),
            fname: req.fname,
            lname: req.lname,
            email: req.email,
            password,
            role,
        })
        .await?;

    info!(uuid = %user.uuid, fname = %user.fname, "user created");
    Ok(user)
}

/// Partial update shared by the admin and self-profile endpoints.
///
/// Fields equal to the stored value are skipped, so `email` and `fname`
/// are only checked for collisions when they actually change.
pub async fn update_user(
    repo: &dyn UserRepository,
    uuid: Uuid,
    req: UpdateUserRequest,
) -> Result<(), UserError> {
    let user = find_by_uuid(repo, uuid).await?.ok_or(UserError::NotFound)?;
    let mut changes = UserChanges::default();

    if let Some(email) = supplied(&req.email).filter(|e| *e != user.email) {
        if email_taken(repo, email).await? {
            warn!(%uuid, email, "update rejected: email taken");
            return Err(UserError::EmailTaken);
        }
        changes.email = Some(email.to_owned());
    }

    if let Some(fname) = supplied(&req.fname).filter(|f| *f != user.fname) {
        if fname_taken(repo, fname).await? {
            warn!(%uuid, fname, "update rejected: fname taken");
            return Err(UserError::UsernameTaken);
        }
        changes.fname = Some(fname.to_owned());
    }

    changes.lname = supplied(&req.lname)
        .filter(|l| *l != user.lname)
        .map(str::to_owned);

    if let Some(password) = supplied(&req.password) {
        if req.conf_password.as_deref() != Some(password) {
            warn!(%uuid, "update rejected: password confirmation mismatch");
            return Err(UserError::PasswordMismatch);
        }
        changes.password = Some(hash(password)?);
    }

    changes.role = supplied(&req.role).map(str::to_owned);

    if changes.is_empty() {
        debug!(%uuid, "update with nothing to change");
        return Ok(());
    }

    repo.update(&UserFilter::Uuid(uuid), &changes).await?;
    info!(%uuid, "user updated");
    Ok(())
}

pub async fn delete_user(repo: &dyn UserRepository, uuid: Uuid) -> Result<(), UserError> {
    let user = find_by_uuid(repo, uuid).await?.ok_or(UserError::NotFound)?;
    repo.destroy(&UserFilter::Id(user.id)).await?;
    info!(%uuid, id = user.id, "user deleted");
    Ok(())
}
