use crate::models::{
    ActivityEntry, ActivityKind, MonthPoint, RecentCourse, RevenueEvent, Role, StatsResponse,
    UserRecord,
};
use crate::store::{DashboardStore, StoreError};
use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};

const WINDOW_MONTHS: u32 = 6;
const RECENT_FETCH: usize = 5;
const ACTIVITY_CAP: usize = 8;

#[derive(Debug, Clone)]
pub struct MonthBucket {
    pub key: String,
    pub label: String,
    pub total: f64,
}

pub async fn summary_stats(store: &dyn DashboardStore) -> Result<StatsResponse, StoreError> {
    let (total_students, total_instructors, total_courses) = tokio::try_join!(
        store.count_users(Role::Student),
        store.count_users(Role::Instructor),
        store.count_courses(),
    )?;

    let total_revenue = match store.payment_total().await? {
        Some(total) => total,
        None => store
            .course_revenue_events()
            .await?
            .iter()
            .map(|event| event.amount)
            .sum(),
    };

    Ok(StatsResponse {
        total_students,
        total_instructors,
        total_courses,
        total_revenue,
    })
}

pub async fn monthly_revenue(
    store: &dyn DashboardStore,
    now: DateTime<Utc>,
) -> Result<Vec<MonthPoint>, StoreError> {
    let events = match store.payment_events().await? {
        Some(events) => events,
        None => store.course_revenue_events().await?,
    };

    Ok(to_points(accumulate(month_window(now.date_naive()), &events)))
}

pub async fn monthly_registrations(
    store: &dyn DashboardStore,
    now: DateTime<Utc>,
) -> Result<Vec<MonthPoint>, StoreError> {
    let events: Vec<RevenueEvent> = store
        .student_registrations()
        .await?
        .into_iter()
        .map(|date| RevenueEvent { amount: 1.0, date })
        .collect();

    Ok(to_points(accumulate(month_window(now.date_naive()), &events)))
}

pub async fn recent_activity(store: &dyn DashboardStore) -> Result<Vec<ActivityEntry>, StoreError> {
    let (students, courses, instructors) = tokio::try_join!(
        store.recent_users(Role::Student, RECENT_FETCH),
        store.recent_courses(RECENT_FETCH),
        store.recent_users(Role::Instructor, RECENT_FETCH),
    )?;

    Ok(merge_activity(students, courses, instructors))
}

/// Six zeroed buckets covering the current calendar month and the five
/// before it, oldest first. Anchoring at day 1 keeps the month stepping
/// exact across year boundaries.
pub fn month_window(now: NaiveDate) -> Vec<MonthBucket> {
    let anchor = now.with_day(1).unwrap_or(now);
    (0..WINDOW_MONTHS)
        .rev()
        .map(|back| {
            let first = anchor.checked_sub_months(Months::new(back)).unwrap_or(anchor);
            MonthBucket {
                key: month_key(first),
                label: first.format("%b %Y").to_string(),
                total: 0.0,
            }
        })
        .collect()
}

/// Adds each event to the bucket matching its month key. Events outside the
/// window have no matching bucket and are dropped.
pub fn accumulate(mut buckets: Vec<MonthBucket>, events: &[RevenueEvent]) -> Vec<MonthBucket> {
    for event in events {
        let key = month_key(event.date.date_naive());
        if let Some(bucket) = buckets.iter_mut().find(|bucket| bucket.key == key) {
            bucket.total += event.amount;
        }
    }
    buckets
}

fn to_points(buckets: Vec<MonthBucket>) -> Vec<MonthPoint> {
    buckets
        .into_iter()
        .map(|bucket| MonthPoint {
            month: bucket.label,
            value: bucket.total.round() as i64,
        })
        .collect()
}

/// Concatenates students, courses, and instructors, sorts by date
/// descending, and caps the feed. The sort is stable, so same-timestamp
/// entries keep concatenation order.
pub fn merge_activity(
    students: Vec<UserRecord>,
    courses: Vec<RecentCourse>,
    instructors: Vec<UserRecord>,
) -> Vec<ActivityEntry> {
    let mut activities =
        Vec::with_capacity(students.len() + courses.len() + instructors.len());

    for student in students {
        activities.push(ActivityEntry {
            kind: ActivityKind::Student,
            activity: "New Student Registration",
            details: format!("{} registered", student.name),
            date: student.created_at,
        });
    }

    for course in courses {
        let instructor = course.instructor_name.as_deref().unwrap_or("Unknown");
        activities.push(ActivityEntry {
            kind: ActivityKind::Course,
            activity: "New Course Published",
            details: format!("{} by {}", course.title, instructor),
            date: course.created_at,
        });
    }

    for instructor in instructors {
        activities.push(ActivityEntry {
            kind: ActivityKind::Instructor,
            activity: "New Instructor",
            details: format!("{} joined as instructor", instructor.name),
            date: instructor.created_at,
        });
    }

    activities.sort_by(|a, b| b.date.cmp(&a.date));
    activities.truncate(ACTIVITY_CAP);
    activities
}

fn month_key(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}
