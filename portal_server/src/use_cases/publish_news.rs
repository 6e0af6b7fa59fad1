use serde::Deserialize;
use tracing::info;

use crate::domain::entities::{Id, NewNews, News};
use crate::domain::ports::{Clock, NewsStore, SchoolStore, UserStore};
use crate::domain::result::{ErrorCode, Rejection, ResultCommand};
use crate::domain::validation::{FieldChecks, Validate, ValidationErrors};
use crate::use_cases::find_school::require_school;
use crate::use_cases::register_user::require_user;
use crate::use_cases::validated::{run_validated, storage_rejection};

const TITLE_MIN: usize = 4;
const TITLE_MAX: usize = 200;
const BODY_MAX: usize = 20_000;

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PublishNewsInput {
    pub school_id: Id,
    // Filled from the authenticated viewer by the HTTP layer.
    #[serde(default)]
    pub author_id: Id,
    pub title: String,
    pub body: String,
}

impl Validate for PublishNewsInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        FieldChecks::new()
            .id("school_id", self.school_id)
            .id("author_id", self.author_id)
            .text("title", &self.title, TITLE_MIN, TITLE_MAX)
            .check(!self.body.trim().is_empty(), "body", "this field may not be blank")
            .check(
                self.body.chars().count() <= BODY_MAX,
                "body",
                "news body is too long",
            )
            .finish()
    }
}

pub struct PublishNewsUseCase<C, S> {
    pub clock: C,
    pub store: S,
}

impl<C, S> PublishNewsUseCase<C, S>
where
    C: Clock,
    S: SchoolStore + UserStore + NewsStore,
{
    pub async fn execute(&self, input: PublishNewsInput) -> ResultCommand<News> {
        run_validated(input, |input| self.publish(input)).await
    }

    async fn publish(&self, input: PublishNewsInput) -> Result<News, Rejection> {
        let school = require_school(&self.store, input.school_id).await?;
        let author = require_user(&self.store, input.author_id)
            .await
            .map_err(|rejection| match rejection.code() {
                ErrorCode::NOT_FOUND => Rejection::not_found("author_id", "author"),
                _ => rejection,
            })?;

        let news = self
            .store
            .insert_news(NewNews {
                school_id: school.id,
                author_id: author.id,
                title: input.title,
                body: input.body,
                published_at: self.clock.now(),
            })
            .await
            .map_err(|err| storage_rejection("insert_news", "title", "news", err))?;

        info!(news_id = news.id, school_id = school.id, "news published");
        Ok(news)
    }
}
