use serde::Deserialize;
use tracing::info;

use crate::domain::entities::{Id, NewStaff, Staff};
use crate::domain::ports::{SchoolStore, StaffStore};
use crate::domain::result::{Rejection, ResultCommand};
use crate::domain::validation::{FieldChecks, Validate, ValidationErrors};
use crate::use_cases::find_school::require_school;
use crate::use_cases::register_user::{PERSON_NAME_MAX, PERSON_NAME_MIN, normalize_email};
use crate::use_cases::validated::{run_validated, storage_rejection};

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateStaffInput {
    pub school_id: Id,
    pub first_name: String,
    pub last_name: String,
    pub position: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl Validate for CreateStaffInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        FieldChecks::new()
            .id("school_id", self.school_id)
            .text("first_name", &self.first_name, PERSON_NAME_MIN, PERSON_NAME_MAX)
            .text("last_name", &self.last_name, PERSON_NAME_MIN, PERSON_NAME_MAX)
            .text("position", &self.position, 2, 100)
            .optional_email("email", self.email.as_deref())
            .finish()
    }
}

pub struct CreateStaffUseCase<S> {
    pub store: S,
}

impl<S> CreateStaffUseCase<S>
where
    S: SchoolStore + StaffStore,
{
    pub async fn execute(&self, input: CreateStaffInput) -> ResultCommand<Staff> {
        run_validated(input, |input| self.create(input)).await
    }

    async fn create(&self, input: CreateStaffInput) -> Result<Staff, Rejection> {
        let school = require_school(&self.store, input.school_id).await?;

        let staff = self
            .store
            .insert_staff(NewStaff {
                school_id: school.id,
                first_name: input.first_name,
                last_name: input.last_name,
                position: input.position,
                email: input.email.as_deref().map(normalize_email),
            })
            .await
            .map_err(|err| storage_rejection("insert_staff", "email", "staff member", err))?;

        info!(staff_id = staff.id, school_id = school.id, "staff member created");
        Ok(staff)
    }
}
