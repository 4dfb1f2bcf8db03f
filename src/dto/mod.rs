//! Response shapes returned by the JSON API.

use serde::Serialize;

use crate::pagination::Paginated;

pub mod invoices;

#[derive(Serialize)]
/// Standard list envelope: items plus the pagination window.
pub struct ListResponse<T> {
    pub total: usize,
    #[serde(flatten)]
    pub page: Paginated<T>,
}

impl<T> ListResponse<T> {
    pub fn new(items: Vec<T>, total: usize, current_page: usize, per_page: usize) -> Self {
        let total_pages = total.div_ceil(per_page.max(1));
        Self {
            total,
            page: Paginated::new(items, current_page, total_pages),
        }
    }
}

#[derive(Serialize)]
/// Uniform error body.
pub struct ErrorResponse {
    pub error: String,
}
