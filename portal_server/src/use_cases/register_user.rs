use serde::Deserialize;
use tracing::info;

use crate::domain::entities::{Id, NewUser, User};
use crate::domain::ports::{Clock, UserStore};
use crate::domain::result::{Rejection, ResultCommand};
use crate::domain::validation::{FieldChecks, Validate, ValidationErrors};
use crate::use_cases::validated::{read_rejection, run_validated, storage_rejection};

pub(crate) const PERSON_NAME_MIN: usize = 2;
pub(crate) const PERSON_NAME_MAX: usize = 100;

// Existence check shared by the user-facing commands.
pub(crate) async fn require_user<S>(store: &S, user_id: Id) -> Result<User, Rejection>
where
    S: UserStore,
{
    store
        .user_by_id(user_id)
        .await
        .map_err(|err| read_rejection("user_by_id", err))?
        .ok_or_else(|| Rejection::not_found("user_id", "user"))
}

// Emails are compared case-insensitively by storing them lowercased.
pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterUserInput {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl Validate for RegisterUserInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        FieldChecks::new()
            .email("email", &normalize_email(&self.email))
            .text("first_name", &self.first_name, PERSON_NAME_MIN, PERSON_NAME_MAX)
            .text("last_name", &self.last_name, PERSON_NAME_MIN, PERSON_NAME_MAX)
            .finish()
    }
}

pub struct RegisterUserUseCase<C, S> {
    pub clock: C,
    pub store: S,
}

impl<C, S> RegisterUserUseCase<C, S>
where
    C: Clock,
    S: UserStore,
{
    pub async fn execute(&self, input: RegisterUserInput) -> ResultCommand<User> {
        run_validated(input, |input| self.register(input)).await
    }

    async fn register(&self, input: RegisterUserInput) -> Result<User, Rejection> {
        let email = normalize_email(&input.email);
        let existing = self
            .store
            .user_by_email(&email)
            .await
            .map_err(|err| read_rejection("user_by_email", err))?;
        if existing.is_some() {
            return Err(Rejection::conflict("email", "user"));
        }

        let user = self
            .store
            .insert_user(NewUser {
                email,
                first_name: input.first_name,
                last_name: input.last_name,
                created_at: self.clock.now(),
            })
            .await
            .map_err(|err| storage_rejection("insert_user", "email", "user", err))?;

        info!(user_id = user.id, "user registered");
        Ok(user)
    }
}
