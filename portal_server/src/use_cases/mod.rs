// Use cases layer: portal commands and request authorization.

pub mod add_administrator;
pub mod authorize;
pub mod create_calendar_event;
pub mod create_grade;
pub mod create_office_hour;
pub mod create_repository;
pub mod create_school;
pub mod create_staff;
pub mod find_school;
pub mod publish_news;
pub mod register_user;
pub mod resolve_viewer;
pub mod update_school;
pub mod update_user;
pub mod validated;

#[cfg(test)]
pub(crate) mod test_support;

pub use validated::run_validated;
