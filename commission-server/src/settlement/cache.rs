//! Per-batch lookup cache
//!
//! Keyed lookups shared by the workers of one `settle` call. Period and
//! record ids are only inserted after the order that produced them has
//! committed, so a rolled-back order never leaves a dangling id behind.
//! Writes always go through the SQL increment path regardless of hits.

use super::rates::RateBook;
use dashmap::DashMap;
use shared::models::{Period, User};
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct SettlementCache {
    periods: DashMap<Period, i64>,
    /// (beneficiary_id, period_id) → record id
    records: DashMap<(i64, i64), i64>,
    users: DashMap<i64, User>,
    rate_books: DashMap<i64, Arc<RateBook>>,
}

impl SettlementCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn period_id(&self, period: Period) -> Option<i64> {
        self.periods.get(&period).map(|v| *v.value())
    }

    pub fn record_id(&self, beneficiary_id: i64, period_id: i64) -> Option<i64> {
        self.records.get(&(beneficiary_id, period_id)).map(|v| *v.value())
    }

    pub fn user(&self, user_id: i64) -> Option<User> {
        self.users.get(&user_id).map(|u| u.value().clone())
    }

    pub fn rate_book(&self, company_id: i64) -> Option<Arc<RateBook>> {
        self.rate_books.get(&company_id).map(|b| b.value().clone())
    }

    pub fn insert_rate_book(&self, book: RateBook) -> Arc<RateBook> {
        let book = Arc::new(book);
        self.rate_books.insert(book.company_id, Arc::clone(&book));
        book
    }

    /// Upstream users are read-only here, so they can be cached on read
    pub fn insert_user(&self, user: User) {
        self.users.insert(user.id, user);
    }

    /// Remember ids created or touched by a committed order
    pub fn absorb(&self, period: Period, period_id: i64, records: &[(i64, i64)]) {
        self.periods.insert(period, period_id);
        for &(beneficiary_id, record_id) in records {
            self.records.insert((beneficiary_id, period_id), record_id);
        }
    }

    /// Drop a record id that turned out to be stale
    pub fn forget_record(&self, beneficiary_id: i64, period_id: i64) {
        self.records.remove(&(beneficiary_id, period_id));
    }
}
