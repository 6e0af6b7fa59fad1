use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::entities::{
    Administrator, CalendarEvent, Grade, Id, NewCalendarEvent, NewNews, NewOfficeHour,
    NewRepository, NewSchool, NewStaff, NewUser, News, OfficeHour, Repository, School, Staff,
    User,
};
use crate::domain::errors::{StoreError, StoreResult};
use crate::domain::ports::{
    AdministratorStore, CalendarStore, GradeStore, NewsStore, OfficeHourStore, RepositoryStore,
    SchoolStore, StaffStore, UserStore,
};

#[derive(Default)]
struct Tables {
    // Single id sequence shared by every table.
    last_id: Id,
    schools: BTreeMap<Id, School>,
    users: BTreeMap<Id, User>,
    administrators: Vec<Administrator>,
    news: Vec<News>,
    events: Vec<CalendarEvent>,
    staff: Vec<Staff>,
    grades: BTreeMap<Id, Grade>,
    repositories: Vec<Repository>,
    office_hours: Vec<OfficeHour>,
}

impl Tables {
    fn next_id(&mut self) -> Id {
        self.last_id += 1;
        self.last_id
    }
}

// In-memory store adapter. Enforces the same uniqueness rules as the
// PostgreSQL schema so commands behave identically on both.
#[derive(Clone, Default)]
pub struct InMemoryPortalStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryPortalStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SchoolStore for InMemoryPortalStore {
    async fn insert_school(&self, school: NewSchool) -> StoreResult<School> {
        let mut tables = self.tables.lock().await;
        if tables.schools.values().any(|s| s.slug == school.slug) {
            return Err(StoreError::Conflict(format!("school slug {}", school.slug)));
        }

        let id = tables.next_id();
        let school = School {
            id,
            name: school.name,
            slug: school.slug,
            email: school.email,
            phone: school.phone,
            address: school.address,
            is_active: true,
            created_at: school.created_at,
        };
        tables.schools.insert(id, school.clone());
        Ok(school)
    }

    async fn update_school(&self, school: School) -> StoreResult<School> {
        let mut tables = self.tables.lock().await;
        if tables
            .schools
            .values()
            .any(|s| s.slug == school.slug && s.id != school.id)
        {
            return Err(StoreError::Conflict(format!("school slug {}", school.slug)));
        }

        match tables.schools.get_mut(&school.id) {
            Some(existing) => {
                *existing = school.clone();
                Ok(school)
            }
            None => Err(StoreError::Backend(format!("school {} does not exist", school.id))),
        }
    }

    async fn school_by_id(&self, id: Id) -> StoreResult<Option<School>> {
        let tables = self.tables.lock().await;
        Ok(tables.schools.get(&id).cloned())
    }

    async fn school_by_slug(&self, slug: &str) -> StoreResult<Option<School>> {
        let tables = self.tables.lock().await;
        Ok(tables.schools.values().find(|s| s.slug == slug).cloned())
    }
}

#[async_trait]
impl UserStore for InMemoryPortalStore {
    async fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        let mut tables = self.tables.lock().await;
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict(format!("user email {}", user.email)));
        }

        let id = tables.next_id();
        let user = User {
            id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            is_active: true,
            is_superuser: false,
            created_at: user.created_at,
        };
        tables.users.insert(id, user.clone());
        Ok(user)
    }

    async fn update_user(&self, user: User) -> StoreResult<User> {
        let mut tables = self.tables.lock().await;
        if tables
            .users
            .values()
            .any(|u| u.email == user.email && u.id != user.id)
        {
            return Err(StoreError::Conflict(format!("user email {}", user.email)));
        }

        match tables.users.get_mut(&user.id) {
            Some(existing) => {
                *existing = user.clone();
                Ok(user)
            }
            None => Err(StoreError::Backend(format!("user {} does not exist", user.id))),
        }
    }

    async fn user_by_id(&self, id: Id) -> StoreResult<Option<User>> {
        let tables = self.tables.lock().await;
        Ok(tables.users.get(&id).cloned())
    }

    async fn user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.lock().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }
}

#[async_trait]
impl AdministratorStore for InMemoryPortalStore {
    async fn insert_administrator(
        &self,
        school_id: Id,
        user_id: Id,
    ) -> StoreResult<Administrator> {
        let mut tables = self.tables.lock().await;
        if tables
            .administrators
            .iter()
            .any(|a| a.school_id == school_id && a.user_id == user_id)
        {
            return Err(StoreError::Conflict(format!(
                "administrator {user_id} of school {school_id}"
            )));
        }

        let administrator = Administrator {
            id: tables.next_id(),
            school_id,
            user_id,
        };
        tables.administrators.push(administrator.clone());
        Ok(administrator)
    }

    async fn administrator(
        &self,
        school_id: Id,
        user_id: Id,
    ) -> StoreResult<Option<Administrator>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .administrators
            .iter()
            .find(|a| a.school_id == school_id && a.user_id == user_id)
            .cloned())
    }
}

#[async_trait]
impl NewsStore for InMemoryPortalStore {
    async fn insert_news(&self, news: NewNews) -> StoreResult<News> {
        let mut tables = self.tables.lock().await;
        let news = News {
            id: tables.next_id(),
            school_id: news.school_id,
            author_id: news.author_id,
            title: news.title,
            body: news.body,
            published_at: news.published_at,
        };
        tables.news.push(news.clone());
        Ok(news)
    }
}

#[async_trait]
impl CalendarStore for InMemoryPortalStore {
    async fn insert_event(&self, event: NewCalendarEvent) -> StoreResult<CalendarEvent> {
        let mut tables = self.tables.lock().await;
        let event = CalendarEvent {
            id: tables.next_id(),
            school_id: event.school_id,
            title: event.title,
            description: event.description,
            starts_on: event.starts_on,
            ends_on: event.ends_on,
        };
        tables.events.push(event.clone());
        Ok(event)
    }
}

#[async_trait]
impl StaffStore for InMemoryPortalStore {
    async fn insert_staff(&self, staff: NewStaff) -> StoreResult<Staff> {
        let mut tables = self.tables.lock().await;
        let staff = Staff {
            id: tables.next_id(),
            school_id: staff.school_id,
            first_name: staff.first_name,
            last_name: staff.last_name,
            position: staff.position,
            email: staff.email,
        };
        tables.staff.push(staff.clone());
        Ok(staff)
    }
}

#[async_trait]
impl GradeStore for InMemoryPortalStore {
    async fn insert_grade(&self, school_id: Id, name: String) -> StoreResult<Grade> {
        let mut tables = self.tables.lock().await;
        if tables
            .grades
            .values()
            .any(|g| g.school_id == school_id && g.name == name)
        {
            return Err(StoreError::Conflict(format!("grade {name} of school {school_id}")));
        }

        let id = tables.next_id();
        let grade = Grade {
            id,
            school_id,
            name,
        };
        tables.grades.insert(id, grade.clone());
        Ok(grade)
    }

    async fn grade_by_id(&self, id: Id) -> StoreResult<Option<Grade>> {
        let tables = self.tables.lock().await;
        Ok(tables.grades.get(&id).cloned())
    }

    async fn grade_by_name(&self, school_id: Id, name: &str) -> StoreResult<Option<Grade>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .grades
            .values()
            .find(|g| g.school_id == school_id && g.name == name)
            .cloned())
    }
}

#[async_trait]
impl RepositoryStore for InMemoryPortalStore {
    async fn insert_repository(&self, repository: NewRepository) -> StoreResult<Repository> {
        let mut tables = self.tables.lock().await;
        let repository = Repository {
            id: tables.next_id(),
            school_id: repository.school_id,
            grade_id: repository.grade_id,
            title: repository.title,
            url: repository.url,
        };
        tables.repositories.push(repository.clone());
        Ok(repository)
    }
}

#[async_trait]
impl OfficeHourStore for InMemoryPortalStore {
    async fn insert_office_hour(&self, office_hour: NewOfficeHour) -> StoreResult<OfficeHour> {
        let mut tables = self.tables.lock().await;
        let office_hour = OfficeHour {
            id: tables.next_id(),
            school_id: office_hour.school_id,
            title: office_hour.title,
            time_groups: office_hour.time_groups,
        };
        tables.office_hours.push(office_hour.clone());
        Ok(office_hour)
    }
}
