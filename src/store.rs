use crate::models::{Catalog, RecentCourse, RevenueEvent, Role, UserRecord};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::{env, fmt, path::Path, path::PathBuf};
use tokio::fs;

#[derive(Debug)]
pub struct StoreError {
    pub message: String,
}

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for StoreError {}

/// Read-only query surface the dashboard aggregations run against.
///
/// Payment queries are `Option`-valued: `None` means no payment ledger is
/// configured, and callers answer with the price-times-enrollment revenue
/// proxy. A genuine read failure is an `Err` and never triggers the proxy.
#[async_trait]
pub trait DashboardStore: Send + Sync {
    async fn count_users(&self, role: Role) -> Result<u64, StoreError>;
    async fn count_courses(&self) -> Result<u64, StoreError>;
    async fn recent_users(&self, role: Role, limit: usize) -> Result<Vec<UserRecord>, StoreError>;
    async fn recent_courses(&self, limit: usize) -> Result<Vec<RecentCourse>, StoreError>;
    async fn student_registrations(&self) -> Result<Vec<DateTime<Utc>>, StoreError>;
    async fn payment_total(&self) -> Result<Option<f64>, StoreError>;
    async fn payment_events(&self) -> Result<Option<Vec<RevenueEvent>>, StoreError>;
    async fn course_revenue_events(&self) -> Result<Vec<RevenueEvent>, StoreError>;
}

/// Store over a catalog snapshot held in memory after the startup load.
pub struct JsonStore {
    catalog: Catalog,
}

impl JsonStore {
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl DashboardStore for JsonStore {
    async fn count_users(&self, role: Role) -> Result<u64, StoreError> {
        Ok(self.catalog.users.iter().filter(|user| user.role == role).count() as u64)
    }

    async fn count_courses(&self) -> Result<u64, StoreError> {
        Ok(self.catalog.courses.len() as u64)
    }

    async fn recent_users(&self, role: Role, limit: usize) -> Result<Vec<UserRecord>, StoreError> {
        let mut users: Vec<UserRecord> = self
            .catalog
            .users
            .iter()
            .filter(|user| user.role == role)
            .cloned()
            .collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        users.truncate(limit);
        Ok(users)
    }

    async fn recent_courses(&self, limit: usize) -> Result<Vec<RecentCourse>, StoreError> {
        let mut courses: Vec<RecentCourse> = self
            .catalog
            .courses
            .iter()
            .map(|course| RecentCourse {
                title: course.title.clone(),
                instructor_name: self
                    .catalog
                    .users
                    .iter()
                    .find(|user| user.id == course.instructor_id)
                    .map(|user| user.name.clone()),
                created_at: course.created_at,
            })
            .collect();
        courses.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        courses.truncate(limit);
        Ok(courses)
    }

    async fn student_registrations(&self) -> Result<Vec<DateTime<Utc>>, StoreError> {
        Ok(self
            .catalog
            .users
            .iter()
            .filter(|user| user.role == Role::Student)
            .map(|user| user.created_at)
            .collect())
    }

    async fn payment_total(&self) -> Result<Option<f64>, StoreError> {
        Ok(self
            .catalog
            .payments
            .as_ref()
            .map(|payments| payments.iter().map(|payment| payment.amount).sum()))
    }

    async fn payment_events(&self) -> Result<Option<Vec<RevenueEvent>>, StoreError> {
        Ok(self.catalog.payments.as_ref().map(|payments| {
            payments
                .iter()
                .map(|payment| RevenueEvent {
                    amount: payment.amount,
                    date: payment.created_at,
                })
                .collect()
        }))
    }

    async fn course_revenue_events(&self) -> Result<Vec<RevenueEvent>, StoreError> {
        Ok(self
            .catalog
            .courses
            .iter()
            .map(|course| RevenueEvent {
                amount: course.price * course.enrolled_count as f64,
                date: course.created_at,
            })
            .collect())
    }
}

pub fn resolve_data_path() -> Result<PathBuf, std::io::Error> {
    if let Ok(path) = env::var("LMS_DATA_PATH") {
        return Ok(PathBuf::from(path));
    }

    Ok(PathBuf::from("data/catalog.json"))
}

/// A missing catalog file is a fresh deployment and yields an empty catalog.
/// An unreadable or malformed file is an error, so the service never starts
/// up silently serving zeros.
pub async fn load_catalog(path: &Path) -> Result<Catalog, StoreError> {
    match fs::read(path).await {
        Ok(bytes) => serde_json::from_slice(&bytes)
            .map_err(|err| StoreError::new(format!("failed to parse catalog file: {err}"))),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Catalog::default()),
        Err(err) => Err(StoreError::new(format!(
            "failed to read catalog file: {err}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CourseRecord;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    fn user(id: u64, name: &str, role: Role, created_at: DateTime<Utc>) -> UserRecord {
        UserRecord {
            id,
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            role,
            created_at,
        }
    }

    fn course(id: u64, title: &str, instructor_id: u64, created_at: DateTime<Utc>) -> CourseRecord {
        CourseRecord {
            id,
            title: title.to_string(),
            price: 25.0,
            enrolled_count: 4,
            instructor_id,
            created_at,
        }
    }

    #[tokio::test]
    async fn recent_users_sorts_descending_and_limits() {
        let store = JsonStore::new(Catalog {
            users: vec![
                user(1, "Ada", Role::Student, utc(2025, 3, 1)),
                user(2, "Bo", Role::Student, utc(2025, 5, 1)),
                user(3, "Cy", Role::Student, utc(2025, 4, 1)),
                user(4, "Dana", Role::Instructor, utc(2025, 6, 1)),
            ],
            ..Catalog::default()
        });

        let recent = store.recent_users(Role::Student, 2).await.unwrap();
        let names: Vec<&str> = recent.iter().map(|user| user.name.as_str()).collect();
        assert_eq!(names, ["Bo", "Cy"]);
    }

    #[tokio::test]
    async fn recent_courses_resolves_instructor_names() {
        let store = JsonStore::new(Catalog {
            users: vec![user(7, "Dana", Role::Instructor, utc(2025, 1, 1))],
            courses: vec![course(1, "Rust Basics", 7, utc(2025, 5, 2)), course(2, "Orphaned", 99, utc(2025, 5, 3))],
            payments: None,
        });

        let recent = store.recent_courses(5).await.unwrap();
        assert_eq!(recent[0].title, "Orphaned");
        assert!(recent[0].instructor_name.is_none());
        assert_eq!(recent[1].instructor_name.as_deref(), Some("Dana"));
    }

    #[tokio::test]
    async fn payment_queries_are_none_without_ledger() {
        let store = JsonStore::new(Catalog::default());
        assert!(store.payment_total().await.unwrap().is_none());
        assert!(store.payment_events().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn load_catalog_treats_missing_file_as_empty() {
        let path = std::env::temp_dir().join("lms_dashboard_missing_catalog.json");
        let catalog = load_catalog(&path).await.unwrap();
        assert!(catalog.users.is_empty());
        assert!(catalog.payments.is_none());
    }

    #[tokio::test]
    async fn load_catalog_rejects_malformed_file() {
        let path = std::env::temp_dir().join(format!(
            "lms_dashboard_bad_catalog_{}.json",
            std::process::id()
        ));
        tokio::fs::write(&path, b"{not json").await.unwrap();
        let result = load_catalog(&path).await;
        assert!(result.is_err());
        let _ = tokio::fs::remove_file(&path).await;
    }
}
