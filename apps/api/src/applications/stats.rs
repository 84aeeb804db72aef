use serde::Serialize;

use crate::models::application::{
    ApplicationRow, INTERVIEW_STATUSES, STATUS_OFFER, STATUS_REJECTED,
};

/// Dashboard counters for one user's applications.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplicationStats {
    pub total: usize,
    pub active_interviews: usize,
    pub offers: usize,
    pub rejections: usize,
}

pub fn compute_stats(rows: &[ApplicationRow]) -> ApplicationStats {
    let count = |pred: &dyn Fn(&str) -> bool| rows.iter().filter(|r| pred(&r.status)).count();

    ApplicationStats {
        total: rows.len(),
        active_interviews: count(&|s| INTERVIEW_STATUSES.contains(&s)),
        offers: count(&|s| s == STATUS_OFFER),
        rejections: count(&|s| s == STATUS_REJECTED),
    }
}
