//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods that
//! accept `&DbPool` as the first argument. Every mutation returns `Result`;
//! there are no sentinel return values to forget to check.

pub mod password_reset_repo;
pub mod report_repo;
pub mod session_repo;
pub mod user_repo;

pub use password_reset_repo::PasswordResetRepo;
pub use report_repo::ReportRepo;
pub use session_repo::SessionRepo;
pub use user_repo::UserRepo;

use serde::Serialize;

/// Hard ceiling on page size; anything above is clamped, not rejected.
pub const MAX_PER_PAGE: i64 = 100;
/// Default page size for listings.
pub const DEFAULT_PER_PAGE: i64 = 10;

/// One page of results plus the pagination metadata the spec requires.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub current_page: i64,
    pub per_page: i64,
    pub total: i64,
    /// `ceil(total / per_page)`, never below 1 so page links always render.
    pub last_page: i64,
    pub has_more: bool,
}

impl<T> Page<T> {
    /// Assemble a page from a fetched slice and the total row count.
    pub fn new(data: Vec<T>, current_page: i64, per_page: i64, total: i64) -> Self {
        let last_page = last_page(total, per_page);
        Page {
            data,
            current_page,
            per_page,
            total,
            last_page,
            has_more: current_page < last_page,
        }
    }
}

pub fn clamp_page(page: Option<i64>) -> i64 {
    page.unwrap_or(1).max(1)
}

pub fn clamp_per_page(per_page: Option<i64>) -> i64 {
    per_page
        .unwrap_or(DEFAULT_PER_PAGE)
        .clamp(1, MAX_PER_PAGE)
}

fn last_page(total: i64, per_page: i64) -> i64 {
    ((total + per_page - 1) / per_page).max(1)
}
