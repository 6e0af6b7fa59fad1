use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

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

const SCHOOL_COLUMNS: &str = "id, name, slug, email, phone, address, is_active, created_at";
const USER_COLUMNS: &str = "id, email, first_name, last_name, is_active, is_superuser, created_at";

// PostgreSQL-backed store. Uniqueness is enforced by the schema's indexes.
#[derive(Clone)]
pub struct PostgresPortalStore {
    pub db: PgPool,
}

impl PostgresPortalStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn store_error(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::Conflict(db.constraint().unwrap_or_else(|| db.message()).to_string())
        }
        _ => StoreError::Backend(err.to_string()),
    }
}

fn school_from_row(row: &PgRow) -> Result<School, sqlx::Error> {
    Ok(School {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        slug: row.try_get("slug")?,
        email: row.try_get("email")?,
        phone: row.try_get("phone")?,
        address: row.try_get("address")?,
        is_active: row.try_get("is_active")?,
        created_at: row.try_get("created_at")?,
    })
}

fn user_from_row(row: &PgRow) -> Result<User, sqlx::Error> {
    Ok(User {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        is_active: row.try_get("is_active")?,
        is_superuser: row.try_get("is_superuser")?,
        created_at: row.try_get("created_at")?,
    })
}

fn grade_from_row(row: &PgRow) -> Result<Grade, sqlx::Error> {
    Ok(Grade {
        id: row.try_get("id")?,
        school_id: row.try_get("school_id")?,
        name: row.try_get("name")?,
    })
}

fn administrator_from_row(row: &PgRow) -> Result<Administrator, sqlx::Error> {
    Ok(Administrator {
        id: row.try_get("id")?,
        school_id: row.try_get("school_id")?,
        user_id: row.try_get("user_id")?,
    })
}

#[async_trait]
impl SchoolStore for PostgresPortalStore {
    async fn insert_school(&self, school: NewSchool) -> StoreResult<School> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO schools (name, slug, email, phone, address, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {SCHOOL_COLUMNS}
            "#
        ))
        .bind(school.name)
        .bind(school.slug)
        .bind(school.email)
        .bind(school.phone)
        .bind(school.address)
        .bind(school.created_at)
        .fetch_one(&self.db)
        .await
        .map_err(store_error)?;

        school_from_row(&row).map_err(store_error)
    }

    async fn update_school(&self, school: School) -> StoreResult<School> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE schools
            SET name = $2, slug = $3, email = $4, phone = $5, address = $6, is_active = $7
            WHERE id = $1
            RETURNING {SCHOOL_COLUMNS}
            "#
        ))
        .bind(school.id)
        .bind(school.name)
        .bind(school.slug)
        .bind(school.email)
        .bind(school.phone)
        .bind(school.address)
        .bind(school.is_active)
        .fetch_optional(&self.db)
        .await
        .map_err(store_error)?
        .ok_or_else(|| StoreError::Backend(format!("school {} vanished during update", school.id)))?;

        school_from_row(&row).map_err(store_error)
    }

    async fn school_by_id(&self, id: Id) -> StoreResult<Option<School>> {
        let row = sqlx::query(&format!("SELECT {SCHOOL_COLUMNS} FROM schools WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .map_err(store_error)?;

        row.as_ref()
            .map(school_from_row)
            .transpose()
            .map_err(store_error)
    }

    async fn school_by_slug(&self, slug: &str) -> StoreResult<Option<School>> {
        let row = sqlx::query(&format!("SELECT {SCHOOL_COLUMNS} FROM schools WHERE slug = $1"))
            .bind(slug)
            .fetch_optional(&self.db)
            .await
            .map_err(store_error)?;

        row.as_ref()
            .map(school_from_row)
            .transpose()
            .map_err(store_error)
    }
}

#[async_trait]
impl UserStore for PostgresPortalStore {
    async fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO users (email, first_name, last_name, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user.email)
        .bind(user.first_name)
        .bind(user.last_name)
        .bind(user.created_at)
        .fetch_one(&self.db)
        .await
        .map_err(store_error)?;

        user_from_row(&row).map_err(store_error)
    }

    async fn update_user(&self, user: User) -> StoreResult<User> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE users
            SET email = $2, first_name = $3, last_name = $4, is_active = $5, is_superuser = $6
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user.id)
        .bind(user.email)
        .bind(user.first_name)
        .bind(user.last_name)
        .bind(user.is_active)
        .bind(user.is_superuser)
        .fetch_optional(&self.db)
        .await
        .map_err(store_error)?
        .ok_or_else(|| StoreError::Backend(format!("user {} vanished during update", user.id)))?;

        user_from_row(&row).map_err(store_error)
    }

    async fn user_by_id(&self, id: Id) -> StoreResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .map_err(store_error)?;

        row.as_ref().map(user_from_row).transpose().map_err(store_error)
    }

    async fn user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(email)
            .fetch_optional(&self.db)
            .await
            .map_err(store_error)?;

        row.as_ref().map(user_from_row).transpose().map_err(store_error)
    }
}

#[async_trait]
impl AdministratorStore for PostgresPortalStore {
    async fn insert_administrator(
        &self,
        school_id: Id,
        user_id: Id,
    ) -> StoreResult<Administrator> {
        let row = sqlx::query(
            r#"
            INSERT INTO administrators (school_id, user_id)
            VALUES ($1, $2)
            RETURNING id, school_id, user_id
            "#,
        )
        .bind(school_id)
        .bind(user_id)
        .fetch_one(&self.db)
        .await
        .map_err(store_error)?;

        administrator_from_row(&row).map_err(store_error)
    }

    async fn administrator(
        &self,
        school_id: Id,
        user_id: Id,
    ) -> StoreResult<Option<Administrator>> {
        let row = sqlx::query(
            "SELECT id, school_id, user_id FROM administrators WHERE school_id = $1 AND user_id = $2",
        )
        .bind(school_id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await
        .map_err(store_error)?;

        row.as_ref()
            .map(administrator_from_row)
            .transpose()
            .map_err(store_error)
    }
}

#[async_trait]
impl NewsStore for PostgresPortalStore {
    async fn insert_news(&self, news: NewNews) -> StoreResult<News> {
        let id: Id = sqlx::query_scalar(
            r#"
            INSERT INTO news (school_id, author_id, title, body, published_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(news.school_id)
        .bind(news.author_id)
        .bind(&news.title)
        .bind(&news.body)
        .bind(news.published_at)
        .fetch_one(&self.db)
        .await
        .map_err(store_error)?;

        Ok(News {
            id,
            school_id: news.school_id,
            author_id: news.author_id,
            title: news.title,
            body: news.body,
            published_at: news.published_at,
        })
    }
}

#[async_trait]
impl CalendarStore for PostgresPortalStore {
    async fn insert_event(&self, event: NewCalendarEvent) -> StoreResult<CalendarEvent> {
        let id: Id = sqlx::query_scalar(
            r#"
            INSERT INTO calendar_events (school_id, title, description, starts_on, ends_on)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(event.school_id)
        .bind(&event.title)
        .bind(&event.description)
        .bind(event.starts_on)
        .bind(event.ends_on)
        .fetch_one(&self.db)
        .await
        .map_err(store_error)?;

        Ok(CalendarEvent {
            id,
            school_id: event.school_id,
            title: event.title,
            description: event.description,
            starts_on: event.starts_on,
            ends_on: event.ends_on,
        })
    }
}

#[async_trait]
impl StaffStore for PostgresPortalStore {
    async fn insert_staff(&self, staff: NewStaff) -> StoreResult<Staff> {
        let id: Id = sqlx::query_scalar(
            r#"
            INSERT INTO staff (school_id, first_name, last_name, position, email)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(staff.school_id)
        .bind(&staff.first_name)
        .bind(&staff.last_name)
        .bind(&staff.position)
        .bind(&staff.email)
        .fetch_one(&self.db)
        .await
        .map_err(store_error)?;

        Ok(Staff {
            id,
            school_id: staff.school_id,
            first_name: staff.first_name,
            last_name: staff.last_name,
            position: staff.position,
            email: staff.email,
        })
    }
}

#[async_trait]
impl GradeStore for PostgresPortalStore {
    async fn insert_grade(&self, school_id: Id, name: String) -> StoreResult<Grade> {
        let row = sqlx::query(
            "INSERT INTO grades (school_id, name) VALUES ($1, $2) RETURNING id, school_id, name",
        )
        .bind(school_id)
        .bind(name)
        .fetch_one(&self.db)
        .await
        .map_err(store_error)?;

        grade_from_row(&row).map_err(store_error)
    }

    async fn grade_by_id(&self, id: Id) -> StoreResult<Option<Grade>> {
        let row = sqlx::query("SELECT id, school_id, name FROM grades WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .map_err(store_error)?;

        row.as_ref().map(grade_from_row).transpose().map_err(store_error)
    }

    async fn grade_by_name(&self, school_id: Id, name: &str) -> StoreResult<Option<Grade>> {
        let row =
            sqlx::query("SELECT id, school_id, name FROM grades WHERE school_id = $1 AND name = $2")
                .bind(school_id)
                .bind(name)
                .fetch_optional(&self.db)
                .await
                .map_err(store_error)?;

        row.as_ref().map(grade_from_row).transpose().map_err(store_error)
    }
}

#[async_trait]
impl RepositoryStore for PostgresPortalStore {
    async fn insert_repository(&self, repository: NewRepository) -> StoreResult<Repository> {
        let id: Id = sqlx::query_scalar(
            r#"
            INSERT INTO repositories (school_id, grade_id, title, url)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(repository.school_id)
        .bind(repository.grade_id)
        .bind(&repository.title)
        .bind(&repository.url)
        .fetch_one(&self.db)
        .await
        .map_err(store_error)?;

        Ok(Repository {
            id,
            school_id: repository.school_id,
            grade_id: repository.grade_id,
            title: repository.title,
            url: repository.url,
        })
    }
}

#[async_trait]
impl OfficeHourStore for PostgresPortalStore {
    async fn insert_office_hour(&self, office_hour: NewOfficeHour) -> StoreResult<OfficeHour> {
        let mut tx = self.db.begin().await.map_err(store_error)?;

        let id: Id = sqlx::query_scalar(
            "INSERT INTO office_hours (school_id, title) VALUES ($1, $2) RETURNING id",
        )
        .bind(office_hour.school_id)
        .bind(&office_hour.title)
        .fetch_one(&mut *tx)
        .await
        .map_err(store_error)?;

        for (position, group) in office_hour.time_groups.iter().enumerate() {
            let position = i32::try_from(position)
                .map_err(|_| StoreError::Backend("too many time groups".to_string()))?;
            sqlx::query(
                r#"
                INSERT INTO office_hour_time_groups (office_hour_id, position, day, opens_at, closes_at)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(id)
            .bind(position)
            .bind(group.day.as_str())
            .bind(group.opens_at)
            .bind(group.closes_at)
            .execute(&mut *tx)
            .await
            .map_err(store_error)?;
        }

        tx.commit().await.map_err(store_error)?;

        Ok(OfficeHour {
            id,
            school_id: office_hour.school_id,
            title: office_hour.title,
            time_groups: office_hour.time_groups,
        })
    }
}
