use serde::Deserialize;
use tracing::info;

use crate::domain::entities::{Id, School, slugify};
use crate::domain::ports::SchoolStore;
use crate::domain::result::{Rejection, ResultCommand};
use crate::domain::validation::{FieldChecks, Validate, ValidationErrors};
use crate::use_cases::create_school::{ADDRESS_MAX, SCHOOL_NAME_MAX, SCHOOL_NAME_MIN};
use crate::use_cases::find_school::require_school;
use crate::use_cases::validated::{read_rejection, run_validated, storage_rejection};

// Partial update; absent members keep their stored value.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateSchoolInput {
    pub school_id: Id,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl Validate for UpdateSchoolInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut checks = FieldChecks::new();
        checks
            .id("school_id", self.school_id)
            .optional_text("name", self.name.as_deref(), SCHOOL_NAME_MIN, SCHOOL_NAME_MAX)
            .optional_email("email", self.email.as_deref())
            .phone("phone", self.phone.as_deref())
            .optional_text("address", self.address.as_deref(), 1, ADDRESS_MAX);
        if let Some(name) = self.name.as_deref().filter(|name| !name.trim().is_empty()) {
            checks.check(
                !slugify(name).is_empty(),
                "name",
                "name must contain letters or digits",
            );
        }
        checks.finish()
    }
}

pub struct UpdateSchoolUseCase<S> {
    pub store: S,
}

impl<S> UpdateSchoolUseCase<S>
where
    S: SchoolStore,
{
    pub async fn execute(&self, input: UpdateSchoolInput) -> ResultCommand<School> {
        run_validated(input, |input| self.update(input)).await
    }

    async fn update(&self, input: UpdateSchoolInput) -> Result<School, Rejection> {
        let mut school = require_school(&self.store, input.school_id).await?;

        if let Some(name) = input.name {
            let slug = slugify(&name);
            if slug != school.slug {
                let taken = self
                    .store
                    .school_by_slug(&slug)
                    .await
                    .map_err(|err| read_rejection("school_by_slug", err))?;
                if taken.is_some_and(|other| other.id != school.id) {
                    return Err(Rejection::conflict("name", "school"));
                }
            }
            school.name = name;
            school.slug = slug;
        }
        if let Some(email) = input.email {
            school.email = Some(email.to_lowercase());
        }
        if input.phone.is_some() {
            school.phone = input.phone;
        }
        if input.address.is_some() {
            school.address = input.address;
        }
        if let Some(is_active) = input.is_active {
            school.is_active = is_active;
        }

        let school = self
            .store
            .update_school(school)
            .await
            .map_err(|err| storage_rejection("update_school", "name", "school", err))?;

        info!(school_id = school.id, "school updated");
        Ok(school)
    }
}
