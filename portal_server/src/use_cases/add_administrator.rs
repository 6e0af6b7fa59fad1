use serde::Deserialize;
use tracing::info;

use crate::domain::entities::{Administrator, Id};
use crate::domain::ports::{AdministratorStore, SchoolStore, UserStore};
use crate::domain::result::{Rejection, ResultCommand};
use crate::domain::validation::{FieldChecks, Validate, ValidationErrors};
use crate::use_cases::find_school::require_school;
use crate::use_cases::register_user::require_user;
use crate::use_cases::validated::{read_rejection, run_validated, storage_rejection};

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AddAdministratorInput {
    pub school_id: Id,
    pub user_id: Id,
}

impl Validate for AddAdministratorInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        FieldChecks::new()
            .id("school_id", self.school_id)
            .id("user_id", self.user_id)
            .finish()
    }
}

// Grants a user management rights over a school.
pub struct AddAdministratorUseCase<S> {
    pub store: S,
}

impl<S> AddAdministratorUseCase<S>
where
    S: SchoolStore + UserStore + AdministratorStore,
{
    pub async fn execute(&self, input: AddAdministratorInput) -> ResultCommand<Administrator> {
        run_validated(input, |input| self.add(input)).await
    }

    async fn add(&self, input: AddAdministratorInput) -> Result<Administrator, Rejection> {
        let school = require_school(&self.store, input.school_id).await?;
        let user = require_user(&self.store, input.user_id).await?;
        if !user.is_active {
            return Err(Rejection::bad_request("user_id", "user is inactive"));
        }

        let existing = self
            .store
            .administrator(school.id, user.id)
            .await
            .map_err(|err| read_rejection("administrator", err))?;
        if existing.is_some() {
            return Err(Rejection::conflict("user_id", "administrator"));
        }

        let administrator = self
            .store
            .insert_administrator(school.id, user.id)
            .await
            .map_err(|err| {
                storage_rejection("insert_administrator", "user_id", "administrator", err)
            })?;

        info!(school_id = school.id, user_id = user.id, "administrator added");
        Ok(administrator)
    }
}
