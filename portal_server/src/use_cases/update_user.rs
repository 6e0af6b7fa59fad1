use serde::Deserialize;
use tracing::info;

use crate::domain::entities::{Id, User};
use crate::domain::ports::UserStore;
use crate::domain::result::{Rejection, ResultCommand};
use crate::domain::validation::{FieldChecks, Validate, ValidationErrors};
use crate::use_cases::register_user::{PERSON_NAME_MAX, PERSON_NAME_MIN, require_user};
use crate::use_cases::validated::{run_validated, storage_rejection};

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateUserInput {
    pub user_id: Id,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

impl Validate for UpdateUserInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        FieldChecks::new()
            .id("user_id", self.user_id)
            .optional_text(
                "first_name",
                self.first_name.as_deref(),
                PERSON_NAME_MIN,
                PERSON_NAME_MAX,
            )
            .optional_text(
                "last_name",
                self.last_name.as_deref(),
                PERSON_NAME_MIN,
                PERSON_NAME_MAX,
            )
            .finish()
    }
}

pub struct UpdateUserUseCase<S> {
    pub store: S,
}

impl<S> UpdateUserUseCase<S>
where
    S: UserStore,
{
    pub async fn execute(&self, input: UpdateUserInput) -> ResultCommand<User> {
        run_validated(input, |input| self.update(input)).await
    }

    async fn update(&self, input: UpdateUserInput) -> Result<User, Rejection> {
        let mut user = require_user(&self.store, input.user_id).await?;
        if let Some(first_name) = input.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = input.last_name {
            user.last_name = last_name;
        }

        let user = self
            .store
            .update_user(user)
            .await
            .map_err(|err| storage_rejection("update_user", "email", "user", err))?;

        info!(user_id = user.id, "user updated");
        Ok(user)
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SetUserActiveInput {
    pub user_id: Id,
    pub is_active: bool,
}

impl Validate for SetUserActiveInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        FieldChecks::new().id("user_id", self.user_id).finish()
    }
}

// Deactivated users keep their data but stop authenticating.
pub struct SetUserActiveUseCase<S> {
    pub store: S,
}

impl<S> SetUserActiveUseCase<S>
where
    S: UserStore,
{
    pub async fn execute(&self, input: SetUserActiveInput) -> ResultCommand<User> {
        run_validated(input, |input| self.apply(input)).await
    }

    async fn apply(&self, input: SetUserActiveInput) -> Result<User, Rejection> {
        let user = require_user(&self.store, input.user_id).await?;
        if user.is_active == input.is_active {
            return Ok(user);
        }

        let user = self
            .store
            .update_user(User {
                is_active: input.is_active,
                ..user
            })
            .await
            .map_err(|err| storage_rejection("update_user", "email", "user", err))?;

        info!(user_id = user.id, is_active = user.is_active, "user activation changed");
        Ok(user)
    }
}
