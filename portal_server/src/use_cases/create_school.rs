use serde::Deserialize;
use tracing::info;

use crate::domain::entities::{NewSchool, School, slugify};
use crate::domain::ports::{Clock, SchoolStore};
use crate::domain::result::{Rejection, ResultCommand};
use crate::domain::validation::{FieldChecks, Validate, ValidationErrors};
use crate::use_cases::validated::{read_rejection, run_validated, storage_rejection};

pub(crate) const SCHOOL_NAME_MIN: usize = 4;
pub(crate) const SCHOOL_NAME_MAX: usize = 150;
pub(crate) const ADDRESS_MAX: usize = 255;

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateSchoolInput {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

impl Validate for CreateSchoolInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut checks = FieldChecks::new();
        checks
            .text("name", &self.name, SCHOOL_NAME_MIN, SCHOOL_NAME_MAX)
            .optional_email("email", self.email.as_deref())
            .phone("phone", self.phone.as_deref())
            .optional_text("address", self.address.as_deref(), 1, ADDRESS_MAX);
        // A name made only of symbols would produce an empty slug.
        if !self.name.trim().is_empty() {
            checks.check(
                !slugify(&self.name).is_empty(),
                "name",
                "name must contain letters or digits",
            );
        }
        checks.finish()
    }
}

// School creation use case with injected dependencies.
pub struct CreateSchoolUseCase<C, S> {
    pub clock: C,
    pub store: S,
}

impl<C, S> CreateSchoolUseCase<C, S>
where
    C: Clock,
    S: SchoolStore,
{
    pub async fn execute(&self, input: CreateSchoolInput) -> ResultCommand<School> {
        run_validated(input, |input| self.create(input)).await
    }

    async fn create(&self, input: CreateSchoolInput) -> Result<School, Rejection> {
        let slug = slugify(&input.name);
        let existing = self
            .store
            .school_by_slug(&slug)
            .await
            .map_err(|err| read_rejection("school_by_slug", err))?;
        if existing.is_some() {
            return Err(Rejection::conflict("name", "school"));
        }

        let school = self
            .store
            .insert_school(NewSchool {
                name: input.name,
                slug,
                email: input.email.map(|email| email.to_lowercase()),
                phone: input.phone,
                address: input.address,
                created_at: self.clock.now(),
            })
            .await
            .map_err(|err| storage_rejection("insert_school", "name", "school", err))?;

        info!(school_id = school.id, slug = %school.slug, "school created");
        Ok(school)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::result::ErrorCode;
    use crate::use_cases::test_support::{FailureFlags, FixedClock, NOW, RecordingStore};

    fn input(name: &str) -> CreateSchoolInput {
        CreateSchoolInput {
            name: name.to_string(),
            email: None,
            phone: None,
            address: None,
        }
    }

    fn use_case(store: RecordingStore) -> CreateSchoolUseCase<FixedClock, RecordingStore> {
        CreateSchoolUseCase {
            clock: FixedClock(NOW),
            store,
        }
    }

    #[tokio::test]
    async fn when_payload_is_valid_then_school_is_stored_and_returned() {
        let store = RecordingStore::new();
        let use_case = use_case(store.clone());

        let result = use_case
            .execute(CreateSchoolInput {
                email: Some("Office@Lincoln.edu".to_string()),
                ..input("Lincoln High School")
            })
            .await;

        assert!(result.status());
        let school = result.into_query().expect("expected created school");
        assert_eq!(school.slug, "lincoln-high-school");
        assert_eq!(school.email.as_deref(), Some("office@lincoln.edu"));
        assert_eq!(school.created_at.timestamp(), NOW as i64);
        assert_eq!(
            store.school_by_id(school.id).await.expect("lookup"),
            Some(school)
        );
    }

    #[tokio::test]
    async fn when_name_has_three_characters_then_returns_name_error_without_writing() {
        let store = RecordingStore::new();
        let use_case = use_case(store.clone());

        let result = use_case.execute(input("Abc")).await;

        assert!(!result.status());
        assert_eq!(result.error_code(), Some(ErrorCode::BAD_REQUEST));
        let errors = result.errors().expect("expected errors");
        assert_eq!(errors[0].field, "name");
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn when_name_has_four_characters_then_school_is_created() {
        let result = use_case(RecordingStore::new()).execute(input("Abcd")).await;

        assert!(result.status());
    }

    #[tokio::test]
    async fn when_name_has_no_letters_or_digits_then_returns_name_error() {
        let result = use_case(RecordingStore::new()).execute(input("!!!!")).await;

        let errors = result.errors().expect("expected errors");
        assert_eq!(errors[0].field, "name");
        assert_eq!(errors[0].message, "name must contain letters or digits");
    }

    #[tokio::test]
    async fn when_several_fields_are_invalid_then_all_errors_are_reported() {
        let result = use_case(RecordingStore::new())
            .execute(CreateSchoolInput {
                name: "Ab".to_string(),
                email: Some("nope".to_string()),
                phone: Some("123".to_string()),
                address: None,
            })
            .await;

        let fields: Vec<&str> = result
            .errors()
            .expect("expected errors")
            .iter()
            .map(|e| e.field.as_str())
            .collect();
        assert_eq!(fields, ["name", "email", "phone"]);
    }

    #[tokio::test]
    async fn when_slug_is_already_taken_then_returns_already_exists_on_name() {
        let store = RecordingStore::new();
        store.seed_school("Lincoln High").await;

        let result = use_case(store.clone()).execute(input("LINCOLN high")).await;

        assert_eq!(result.error_code(), Some(ErrorCode::BAD_REQUEST));
        let errors = result.errors().expect("expected errors");
        assert_eq!(errors[0].field, "name");
        assert_eq!(errors[0].code(), Some("already-exists"));
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn when_store_insert_fails_then_returns_internal_error() {
        let store = RecordingStore::new().with_failures(FailureFlags {
            writes: true,
            ..Default::default()
        });

        let result = use_case(store).execute(input("Lincoln High")).await;

        assert_eq!(result.error_code(), Some(ErrorCode::INTERNAL));
    }
}
