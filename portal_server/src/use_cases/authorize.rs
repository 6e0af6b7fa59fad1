use crate::domain::auth::Viewer;
use crate::domain::entities::{Id, User};
use crate::domain::ports::AdministratorStore;
use crate::domain::result::Rejection;
use crate::use_cases::validated::read_rejection;

// Permission checks applied before a command runs. Anonymous viewers get
// 401, authenticated viewers without the right get 403.

const NOT_AUTHENTICATED: &str = "authentication credentials were not provided";

fn authenticated(viewer: &Viewer) -> Result<&User, Rejection> {
    viewer
        .user()
        .ok_or_else(|| Rejection::unauthorized(NOT_AUTHENTICATED))
}

pub fn require_superuser(viewer: &Viewer) -> Result<(), Rejection> {
    authenticated(viewer)?;
    if viewer.is_superuser() {
        Ok(())
    } else {
        Err(Rejection::forbidden("superuser privileges are required"))
    }
}

pub fn require_self_or_superuser(viewer: &Viewer, user_id: Id) -> Result<(), Rejection> {
    let user = authenticated(viewer)?;
    if user.is_superuser || user.id == user_id {
        Ok(())
    } else {
        Err(Rejection::forbidden("you may only change your own account"))
    }
}

/// Superusers and administrators of `school_id` may manage its data.
pub async fn require_school_manager<S>(
    store: &S,
    viewer: &Viewer,
    school_id: Id,
) -> Result<(), Rejection>
where
    S: AdministratorStore,
{
    let user = authenticated(viewer)?;
    if viewer.is_superuser() {
        return Ok(());
    }

    let administrator = store
        .administrator(school_id, user.id)
        .await
        .map_err(|err| read_rejection("administrator", err))?;
    match administrator {
        Some(_) => Ok(()),
        None => Err(Rejection::forbidden(
            "you are not an administrator of this school",
        )),
    }
}
