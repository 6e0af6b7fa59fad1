use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::auth::Claims;
use crate::domain::entities::{
    Administrator, CalendarEvent, Grade, Id, NewCalendarEvent, NewNews, NewOfficeHour,
    NewRepository, NewSchool, NewStaff, NewUser, News, OfficeHour, Repository, School, Staff,
    User,
};
use crate::domain::errors::{AuthError, StoreResult};

// Ports for persistence used by the portal commands. Adapters report
// uniqueness violations as `StoreError::Conflict`.

#[async_trait]
pub trait SchoolStore: Send + Sync {
    async fn insert_school(&self, school: NewSchool) -> StoreResult<School>;
    async fn update_school(&self, school: School) -> StoreResult<School>;
    async fn school_by_id(&self, id: Id) -> StoreResult<Option<School>>;
    async fn school_by_slug(&self, slug: &str) -> StoreResult<Option<School>>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert_user(&self, user: NewUser) -> StoreResult<User>;
    async fn update_user(&self, user: User) -> StoreResult<User>;
    async fn user_by_id(&self, id: Id) -> StoreResult<Option<User>>;
    async fn user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
}

#[async_trait]
pub trait AdministratorStore: Send + Sync {
    async fn insert_administrator(&self, school_id: Id, user_id: Id)
    -> StoreResult<Administrator>;
    async fn administrator(&self, school_id: Id, user_id: Id)
    -> StoreResult<Option<Administrator>>;
}

#[async_trait]
pub trait NewsStore: Send + Sync {
    async fn insert_news(&self, news: NewNews) -> StoreResult<News>;
}

#[async_trait]
pub trait CalendarStore: Send + Sync {
    async fn insert_event(&self, event: NewCalendarEvent) -> StoreResult<CalendarEvent>;
}

#[async_trait]
pub trait StaffStore: Send + Sync {
    async fn insert_staff(&self, staff: NewStaff) -> StoreResult<Staff>;
}

#[async_trait]
pub trait GradeStore: Send + Sync {
    async fn insert_grade(&self, school_id: Id, name: String) -> StoreResult<Grade>;
    async fn grade_by_id(&self, id: Id) -> StoreResult<Option<Grade>>;
    async fn grade_by_name(&self, school_id: Id, name: &str) -> StoreResult<Option<Grade>>;
}

#[async_trait]
pub trait RepositoryStore: Send + Sync {
    async fn insert_repository(&self, repository: NewRepository) -> StoreResult<Repository>;
}

#[async_trait]
pub trait OfficeHourStore: Send + Sync {
    async fn insert_office_hour(&self, office_hour: NewOfficeHour) -> StoreResult<OfficeHour>;
}

/// Everything the HTTP layer needs from a storage backend.
pub trait PortalStore:
    SchoolStore
    + UserStore
    + AdministratorStore
    + NewsStore
    + CalendarStore
    + StaffStore
    + GradeStore
    + RepositoryStore
    + OfficeHourStore
    + Clone
    + 'static
{
}

impl<T> PortalStore for T where
    T: SchoolStore
        + UserStore
        + AdministratorStore
        + NewsStore
        + CalendarStore
        + StaffStore
        + GradeStore
        + RepositoryStore
        + OfficeHourStore
        + Clone
        + 'static
{
}

// Port for signing and verifying bearer tokens.
pub trait TokenCodec: Send + Sync {
    fn encode(&self, claims: &Claims) -> Result<String, AuthError>;
    // `now` is epoch seconds; expiry is checked against it.
    fn decode(&self, token: &str, now: u64) -> Result<Claims, AuthError>;
}

// Port for retrieving the current time.
pub trait Clock: Send + Sync {
    fn now_epoch_seconds(&self) -> u64;

    fn now(&self) -> DateTime<Utc> {
        i64::try_from(self.now_epoch_seconds())
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .unwrap_or_default()
    }
}
