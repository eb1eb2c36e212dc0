//! Moderation queue for user-submitted prices.
//!
//! Submissions wait as `pending` until an administrator approves or rejects
//! them. The queue is in-memory only; approved entries are not written back to
//! any data source.

use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::models::SubmissionId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Food,
    Drink,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Pending,
    Approved,
    Rejected,
}

/// Price report as sent by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSubmission {
    pub restaurant: String,
    #[serde(default)]
    pub address: String,
    pub item: String,
    pub category: Category,
    pub price: f64,
    /// Day the price was observed.
    pub date: NaiveDate,
    pub submitted_by: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub id: SubmissionId,
    #[serde(flatten)]
    pub entry: NewSubmission,
    pub status: SubmissionStatus,
    pub submitted_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModerationStats {
    pub pending: usize,
    pub approved_today: usize,
    pub rejected_today: usize,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ModerationError {
    #[error("Invalid submission: {0}")]
    Invalid(String),

    #[error("Submission {0} not found")]
    NotFound(SubmissionId),

    #[error("Submission {id} is already {status:?}")]
    AlreadyReviewed {
        id: SubmissionId,
        status: SubmissionStatus,
    },
}

impl NewSubmission {
    fn validate(&self) -> Result<(), ModerationError> {
        for (field, value) in [
            ("restaurant", &self.restaurant),
            ("item", &self.item),
            ("submitted_by", &self.submitted_by),
        ] {
            if value.trim().is_empty() {
                return Err(ModerationError::Invalid(format!("{} must not be empty", field)));
            }
        }
        if !self.price.is_finite() || self.price <= 0.0 {
            return Err(ModerationError::Invalid(format!(
                "price must be a positive number, got {}",
                self.price
            )));
        }
        Ok(())
    }
}

#[derive(Default)]
struct QueueState {
    next_id: i64,
    entries: BTreeMap<SubmissionId, Submission>,
}

/// In-memory moderation queue, shared between clones.
#[derive(Clone, Default)]
pub struct SubmissionQueue {
    state: Arc<RwLock<QueueState>>,
}

impl SubmissionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue pre-filled with a few pending reports, for demos.
    pub fn with_samples() -> Self {
        let queue = Self::new();
        let samples = [
            ("Campus Café", "123 University Ave", "Espresso", Category::Drink, 3.5, 17, "user11"),
            ("The Green Bean", "789 Main St", "Sandwich", Category::Food, 7.5, 17, "user12"),
            ("Student Union Grill", "456 College St", "Chicken Wrap", Category::Food, 8.0, 16, "user13"),
        ];
        for (restaurant, address, item, category, price, day, user) in samples {
            let Some(date) = NaiveDate::from_ymd_opt(2026, 1, day) else {
                continue;
            };
            let entry = NewSubmission {
                restaurant: restaurant.to_string(),
                address: address.to_string(),
                item: item.to_string(),
                category,
                price,
                date,
                submitted_by: user.to_string(),
            };
            if let Err(e) = queue.submit(entry) {
                log::warn!("Skipping sample submission: {}", e);
            }
        }
        queue
    }

    /// Validate and enqueue a report as pending.
    pub fn submit(&self, entry: NewSubmission) -> Result<Submission, ModerationError> {
        entry.validate()?;

        let mut state = self.state.write();
        state.next_id += 1;
        let id = SubmissionId::new(state.next_id);
        let submission = Submission {
            id,
            entry,
            status: SubmissionStatus::Pending,
            submitted_at: Utc::now(),
            reviewed_at: None,
        };
        state.entries.insert(id, submission.clone());
        log::info!("Submission {} queued for review", id);
        Ok(submission)
    }

    /// Pending submissions, oldest first.
    pub fn pending(&self) -> Vec<Submission> {
        self.state
            .read()
            .entries
            .values()
            .filter(|s| s.status == SubmissionStatus::Pending)
            .cloned()
            .collect()
    }

    pub fn get(&self, id: SubmissionId) -> Option<Submission> {
        self.state.read().entries.get(&id).cloned()
    }

    pub fn approve(&self, id: SubmissionId) -> Result<Submission, ModerationError> {
        self.review(id, SubmissionStatus::Approved)
    }

    pub fn reject(&self, id: SubmissionId) -> Result<Submission, ModerationError> {
        self.review(id, SubmissionStatus::Rejected)
    }

    fn review(
        &self,
        id: SubmissionId,
        outcome: SubmissionStatus,
    ) -> Result<Submission, ModerationError> {
        let mut state = self.state.write();
        let submission = state
            .entries
            .get_mut(&id)
            .ok_or(ModerationError::NotFound(id))?;

        if submission.status != SubmissionStatus::Pending {
            return Err(ModerationError::AlreadyReviewed {
                id,
                status: submission.status,
            });
        }

        submission.status = outcome;
        submission.reviewed_at = Some(Utc::now());
        log::info!("Submission {} marked {:?}", id, outcome);
        Ok(submission.clone())
    }

    /// Counts for the current UTC day.
    pub fn stats(&self) -> ModerationStats {
        self.stats_on(Utc::now().date_naive())
    }

    /// Pending count plus reviews completed on `day` (UTC).
    pub fn stats_on(&self, day: NaiveDate) -> ModerationStats {
        let state = self.state.read();
        let mut stats = ModerationStats::default();
        for submission in state.entries.values() {
            let reviewed_on_day = submission
                .reviewed_at
                .is_some_and(|at| at.date_naive() == day);
            match submission.status {
                SubmissionStatus::Pending => stats.pending += 1,
                SubmissionStatus::Approved if reviewed_on_day => stats.approved_today += 1,
                SubmissionStatus::Rejected if reviewed_on_day => stats.rejected_today += 1,
                _ => {}
            }
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(price: f64) -> NewSubmission {
        NewSubmission {
            restaurant: "Coffee Corner".to_string(),
            address: String::new(),
            item: "Cappuccino".to_string(),
            category: Category::Drink,
            price,
            date: NaiveDate::from_ymd_opt(2026, 1, 18).unwrap(),
            submitted_by: "user7".to_string(),
        }
    }

    #[test]
    fn test_samples_are_pending() {
        let queue = SubmissionQueue::with_samples();
        let pending = queue.pending();

        assert_eq!(pending.len(), 3);
        assert_eq!(pending[0].entry.item, "Espresso");
        assert_eq!(queue.stats().pending, 3);
    }

    #[test]
    fn test_submit_validates() {
        let queue = SubmissionQueue::new();

        assert!(queue.submit(report(2.5)).is_ok());
        assert!(matches!(queue.submit(report(0.0)), Err(ModerationError::Invalid(_))));
        assert!(matches!(queue.submit(report(f64::NAN)), Err(ModerationError::Invalid(_))));

        let mut blank = report(2.5);
        blank.item = "  ".to_string();
        assert!(matches!(queue.submit(blank), Err(ModerationError::Invalid(_))));

        assert_eq!(queue.pending().len(), 1);
    }

    #[test]
    fn test_approve_and_reject() {
        let queue = SubmissionQueue::new();
        let a = queue.submit(report(2.5)).unwrap();
        let b = queue.submit(report(3.0)).unwrap();

        let approved = queue.approve(a.id).unwrap();
        assert_eq!(approved.status, SubmissionStatus::Approved);
        assert!(approved.reviewed_at.is_some());
        queue.reject(b.id).unwrap();

        let stats = queue.stats();
        assert_eq!(stats.pending, 0);
        assert_eq!(stats.approved_today, 1);
        assert_eq!(stats.rejected_today, 1);

        let yesterday = Utc::now().date_naive().pred_opt().unwrap();
        assert_eq!(queue.stats_on(yesterday).approved_today, 0);
    }

    #[test]
    fn test_only_pending_can_be_reviewed() {
        let queue = SubmissionQueue::new();
        let s = queue.submit(report(2.5)).unwrap();
        queue.approve(s.id).unwrap();

        assert_eq!(
            queue.reject(s.id),
            Err(ModerationError::AlreadyReviewed {
                id: s.id,
                status: SubmissionStatus::Approved
            })
        );
        assert_eq!(
            queue.approve(SubmissionId::new(99)),
            Err(ModerationError::NotFound(SubmissionId::new(99)))
        );
        assert_eq!(queue.get(s.id).unwrap().status, SubmissionStatus::Approved);
    }
}
