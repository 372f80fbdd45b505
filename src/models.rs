use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Instructor,
    Admin,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseRecord {
    pub id: u64,
    pub title: String,
    pub price: f64,
    #[serde(default)]
    pub enrolled_count: u64,
    pub instructor_id: u64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub amount: f64,
    pub created_at: DateTime<Utc>,
}

/// `payments` is `None` when the deployment has no payment ledger.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Catalog {
    #[serde(default)]
    pub users: Vec<UserRecord>,
    #[serde(default)]
    pub courses: Vec<CourseRecord>,
    #[serde(default)]
    pub payments: Option<Vec<PaymentRecord>>,
}

#[derive(Debug, Clone)]
pub struct RevenueEvent {
    pub amount: f64,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct RecentCourse {
    pub title: String,
    pub instructor_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub total_students: u64,
    pub total_instructors: u64,
    pub total_courses: u64,
    pub total_revenue: f64,
}

#[derive(Debug, Serialize)]
pub struct MonthPoint {
    pub month: String,
    pub value: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Student,
    Course,
    Instructor,
}

#[derive(Debug, Serialize)]
pub struct ActivityEntry {
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub activity: &'static str,
    pub details: String,
    pub date: DateTime<Utc>,
}
