use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::entities::{
    Administrator, CalendarEvent, Grade, Id, NewCalendarEvent, NewNews, NewOfficeHour,
    NewRepository, NewSchool, NewStaff, NewUser, News, OfficeHour, Repository, School, Staff,
    User, slugify,
};
use crate::domain::errors::{StoreError, StoreResult};
use crate::domain::ports::{
    AdministratorStore, CalendarStore, Clock, GradeStore, NewsStore, OfficeHourStore,
    RepositoryStore, SchoolStore, StaffStore, UserStore,
};
use crate::interface_adapters::memory_store::InMemoryPortalStore;

pub(crate) const NOW: u64 = 1_700_000_000;

// Shared fixed time source for deterministic use-case tests.
#[derive(Clone, Copy)]
pub(crate) struct FixedClock(pub(crate) u64);

impl Clock for FixedClock {
    fn now_epoch_seconds(&self) -> u64 {
        self.0
    }
}

pub(crate) fn fixed_now() -> DateTime<Utc> {
    FixedClock(NOW).now()
}

pub(crate) fn sample_user(id: Id, email: &str) -> User {
    User {
        id,
        email: email.to_string(),
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        is_active: true,
        is_superuser: false,
        created_at: fixed_now(),
    }
}

#[derive(Clone, Copy, Default)]
pub(crate) struct FailureFlags {
    pub reads: bool,
    pub writes: bool,
}

// Store double that records write attempts and can simulate backend failure.
// Seeding helpers bypass both so fixtures are never affected.
#[derive(Clone)]
pub(crate) struct RecordingStore {
    inner: InMemoryPortalStore,
    failures: FailureFlags,
    writes: Arc<AtomicUsize>,
}

impl RecordingStore {
    pub(crate) fn new() -> Self {
        Self {
            inner: InMemoryPortalStore::new(),
            failures: FailureFlags::default(),
            writes: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub(crate) fn with_failures(mut self, failures: FailureFlags) -> Self {
        self.failures = failures;
        self
    }

    pub(crate) fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub(crate) async fn seed_school(&self, name: &str) -> School {
        self.inner
            .insert_school(NewSchool {
                name: name.to_string(),
                slug: slugify(name),
                email: None,
                phone: None,
                address: None,
                created_at: fixed_now(),
            })
            .await
            .expect("seed school")
    }

    pub(crate) async fn seed_user(&self, email: &str) -> User {
        self.inner
            .insert_user(NewUser {
                email: email.to_string(),
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
                created_at: fixed_now(),
            })
            .await
            .expect("seed user")
    }

    pub(crate) async fn seed_superuser(&self, email: &str) -> User {
        let user = self.seed_user(email).await;
        self.inner
            .update_user(User {
                is_superuser: true,
                ..user
            })
            .await
            .expect("promote user")
    }

    pub(crate) async fn seed_inactive_user(&self, email: &str) -> User {
        let user = self.seed_user(email).await;
        self.inner
            .update_user(User {
                is_active: false,
                ..user
            })
            .await
            .expect("deactivate user")
    }

    pub(crate) async fn seed_administrator(&self, school_id: Id, user_id: Id) -> Administrator {
        self.inner
            .insert_administrator(school_id, user_id)
            .await
            .expect("seed administrator")
    }

    pub(crate) async fn seed_grade(&self, school_id: Id, name: &str) -> Grade {
        self.inner
            .insert_grade(school_id, name.to_string())
            .await
            .expect("seed grade")
    }

    fn read(&self) -> StoreResult<()> {
        if self.failures.reads {
            return Err(StoreError::Backend("read failed".to_string()));
        }
        Ok(())
    }

    fn write(&self) -> StoreResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.failures.writes {
            return Err(StoreError::Backend("write failed".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl SchoolStore for RecordingStore {
    async fn insert_school(&self, school: NewSchool) -> StoreResult<School> {
        self.write()?;
        self.inner.insert_school(school).await
    }

    async fn update_school(&self, school: School) -> StoreResult<School> {
        self.write()?;
        self.inner.update_school(school).await
    }

    async fn school_by_id(&self, id: Id) -> StoreResult<Option<School>> {
        self.read()?;
        self.inner.school_by_id(id).await
    }

    async fn school_by_slug(&self, slug: &str) -> StoreResult<Option<School>> {
        self.read()?;
        self.inner.school_by_slug(slug).await
    }
}

#[async_trait]
impl UserStore for RecordingStore {
    async fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        self.write()?;
        self.inner.insert_user(user).await
    }

    async fn update_user(&self, user: User) -> StoreResult<User> {
        self.write()?;
        self.inner.update_user(user).await
    }

    async fn user_by_id(&self, id: Id) -> StoreResult<Option<User>> {
        self.read()?;
        self.inner.user_by_id(id).await
    }

    async fn user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        self.read()?;
        self.inner.user_by_email(email).await
    }
}

#[async_trait]
impl AdministratorStore for RecordingStore {
    async fn insert_administrator(
        &self,
        school_id: Id,
        user_id: Id,
    ) -> StoreResult<Administrator> {
        self.write()?;
        self.inner.insert_administrator(school_id, user_id).await
    }

    async fn administrator(
        &self,
        school_id: Id,
        user_id: Id,
    ) -> StoreResult<Option<Administrator>> {
        self.read()?;
        self.inner.administrator(school_id, user_id).await
    }
}

#[async_trait]
impl NewsStore for RecordingStore {
    async fn insert_news(&self, news: NewNews) -> StoreResult<News> {
        self.write()?;
        self.inner.insert_news(news).await
    }
}

#[async_trait]
impl CalendarStore for RecordingStore {
    async fn insert_event(&self, event: NewCalendarEvent) -> StoreResult<CalendarEvent> {
        self.write()?;
        self.inner.insert_event(event).await
    }
}

#[async_trait]
impl StaffStore for RecordingStore {
    async fn insert_staff(&self, staff: NewStaff) -> StoreResult<Staff> {
        self.write()?;
        self.inner.insert_staff(staff).await
    }
}

#[async_trait]
impl GradeStore for RecordingStore {
    async fn insert_grade(&self, school_id: Id, name: String) -> StoreResult<Grade> {
        self.write()?;
        self.inner.insert_grade(school_id, name).await
    }

    async fn grade_by_id(&self, id: Id) -> StoreResult<Option<Grade>> {
        self.read()?;
        self.inner.grade_by_id(id).await
    }

    async fn grade_by_name(&self, school_id: Id, name: &str) -> StoreResult<Option<Grade>> {
        self.read()?;
        self.inner.grade_by_name(school_id, name).await
    }
}

#[async_trait]
impl RepositoryStore for RecordingStore {
    async fn insert_repository(&self, repository: NewRepository) -> StoreResult<Repository> {
        self.write()?;
        self.inner.insert_repository(repository).await
    }
}

#[async_trait]
impl OfficeHourStore for RecordingStore {
    async fn insert_office_hour(&self, office_hour: NewOfficeHour) -> StoreResult<OfficeHour> {
        self.write()?;
        self.inner.insert_office_hour(office_hour).await
    }
}
