//! Settlement engine
//!
//! Batch entry point. Orders are independent and run concurrently; each one
//! is a single `BEGIN IMMEDIATE` transaction:
//!
//! ```text
//! pre-check ─→ BEGIN IMMEDIATE ─→ re-check ─→ plan ─→ beneficiaries ─→ writes ─→ COMMIT
//!                     └──────────────── any error ─→ ROLLBACK ──────────────────┘
//! ```
//!
//! A rejected or failed order never aborts the batch. A company without a
//! default commission rate is aborted as a whole before any of its orders run.

use super::aggregator::{self, AppliedOrder};
use super::cache::SettlementCache;
use super::eligibility::{self, Eligibility};
use super::error::{Inconsistency, SettlementError, SettlementResult};
use super::plan::{self, SettlementPlan};
use super::proration::ProrationBase;
use super::rates::RateBook;
use crate::db::repository::{RepoError, line, order, rate, record, user};
use chrono::NaiveDate;
use futures::StreamExt;
use rust_decimal::Decimal;
use shared::models::{
    AbortedCompany, CommissionLine, CommissionRate, CommissionRateUpsert, CommissionRecord,
    FailedOrder, Period, PeriodSummary, RejectedOrder, RejectionReason, SettledOrder,
    SettlementSummary,
};
use sqlx::{SqliteConnection, SqlitePool};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

/// Engine tuning, taken from the server config
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    /// Orders settled in parallel
    pub worker_concurrency: usize,
    pub proration_base: ProrationBase,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            worker_concurrency: 4,
            proration_base: ProrationBase::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SettlementEngine {
    pool: SqlitePool,
    config: EngineConfig,
}

/// Outcome of one order inside a batch
enum OrderOutcome {
    Settled(SettledOrder),
    Rejected(RejectionReason),
    Failed(SettlementError),
}

impl SettlementEngine {
    pub fn new(pool: SqlitePool, config: EngineConfig) -> Self {
        Self { pool, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Settle the given orders
    ///
    /// Only systemic failures (the rate pre-pass cannot read storage) are
    /// returned as `Err`; everything per-order lands in the summary.
    pub async fn settle(&self, order_ids: &[String]) -> SettlementResult<SettlementSummary> {
        let mut seen = HashSet::new();
        let order_ids: Vec<String> = order_ids
            .iter()
            .filter(|id| seen.insert(id.as_str()))
            .cloned()
            .collect();

        let mut summary = SettlementSummary::default();
        if order_ids.is_empty() {
            return Ok(summary);
        }

        let cache = Arc::new(SettlementCache::new());
        let aborted = self.load_rate_books(&order_ids, &cache).await?;
        let blocked: HashSet<&str> = aborted
            .iter()
            .flat_map(|a| a.order_ids.iter().map(String::as_str))
            .collect();
        let runnable: Vec<String> = order_ids
            .iter()
            .filter(|id| !blocked.contains(id.as_str()))
            .cloned()
            .collect();
        summary.aborted = aborted;

        tracing::info!(
            orders = order_ids.len(),
            runnable = runnable.len(),
            aborted_companies = summary.aborted.len(),
            "Settlement batch started"
        );

        let concurrency = self.config.worker_concurrency.max(1);
        let mut outcomes: Vec<(usize, String, OrderOutcome)> =
            futures::stream::iter(runnable.into_iter().enumerate())
                .map(|(idx, order_id)| {
                    let cache = Arc::clone(&cache);
                    async move {
                        let outcome = self.settle_one(&order_id, &cache).await;
                        (idx, order_id, outcome)
                    }
                })
                .buffer_unordered(concurrency)
                .collect()
                .await;
        outcomes.sort_by_key(|(idx, _, _)| *idx);

        for (_, order_id, outcome) in outcomes {
            match outcome {
                OrderOutcome::Settled(settled) => summary.settled.push(settled),
                OrderOutcome::Rejected(reason) => {
                    summary.rejected.push(RejectedOrder { order_id, reason })
                }
                OrderOutcome::Failed(err) => summary.failed.push(FailedOrder {
                    order_id,
                    code: err.code().to_string(),
                    message: err.to_string(),
                    retryable: err.is_retryable(),
                }),
            }
        }

        tracing::info!(
            settled = summary.settled.len(),
            rejected = summary.rejected.len(),
            failed = summary.failed.len(),
            aborted = summary.aborted.len(),
            lines = summary.lines_written(),
            "Settlement batch finished"
        );
        Ok(summary)
    }

    /// Settle every confirmed, unsettled order dated on or before `until`
    pub async fn settle_until(
        &self,
        until: NaiveDate,
        company_id: Option<i64>,
    ) -> SettlementResult<SettlementSummary> {
        let order_ids = order::find_candidates(&self.pool, until, company_id).await?;
        tracing::info!(%until, ?company_id, candidates = order_ids.len(), "Collected settlement candidates");
        self.settle(&order_ids).await
    }

    /// Rate pre-pass: cache a rate book per company, abort companies without one
    async fn load_rate_books(
        &self,
        order_ids: &[String],
        cache: &SettlementCache,
    ) -> SettlementResult<Vec<AbortedCompany>> {
        let mut by_company: BTreeMap<i64, Vec<String>> = BTreeMap::new();
        for (order_id, company_id) in order::find_company_ids(&self.pool, order_ids).await? {
            by_company.entry(company_id).or_default().push(order_id);
        }

        let mut conn = self.pool.acquire().await?;
        let mut aborted = Vec::new();
        for (company_id, mut ids) in by_company {
            let rates = rate::find_by_company(&mut conn, company_id).await?;
            match RateBook::from_rates(company_id, &rates) {
                Some(book) => {
                    cache.insert_rate_book(book);
                }
                None => {
                    let err = SettlementError::RateNotConfigured { company_id };
                    tracing::error!(company_id, orders = ids.len(), "{err}; company skipped");
                    // keep the caller's ordering
                    ids.sort_by_key(|id| order_ids.iter().position(|o| o == id));
                    aborted.push(AbortedCompany {
                        company_id,
                        code: err.code().to_string(),
                        message: err.to_string(),
                        order_ids: ids,
                    });
                }
            }
        }
        Ok(aborted)
    }

    async fn settle_one(&self, order_id: &str, cache: &SettlementCache) -> OrderOutcome {
        let result = match self.precheck(order_id).await {
            Ok(Eligibility::Eligible) => self.settle_in_transaction(order_id, cache).await,
            Ok(Eligibility::Rejected(reason)) => Err(SettlementError::Rejected(reason)),
            Err(e) => Err(e),
        };

        match result {
            Ok(settled) => {
                tracing::info!(
                    order_id,
                    period = %settled.period,
                    lines = settled.lines,
                    beneficiaries = settled.beneficiaries,
                    total = %settled.total_attributed,
                    "Order settled"
                );
                OrderOutcome::Settled(settled)
            }
            Err(SettlementError::Rejected(reason)) => {
                tracing::debug!(order_id, %reason, "Order rejected");
                OrderOutcome::Rejected(reason)
            }
            Err(err) => {
                tracing::warn!(order_id, code = err.code(), error = %err, "Order left pending");
                OrderOutcome::Failed(err)
            }
        }
    }

    /// Cheap check outside any transaction, so rejected orders never take the write lock
    async fn precheck(&self, order_id: &str) -> SettlementResult<Eligibility> {
        let mut conn = self.pool.acquire().await?;
        let (_, eligibility) = eligibility::check(&mut conn, order_id).await?;
        Ok(eligibility)
    }

    async fn settle_in_transaction(
        &self,
        order_id: &str,
        cache: &SettlementCache,
    ) -> SettlementResult<SettledOrder> {
        // IMMEDIATE takes the write lock up front: the re-check and the
        // writes below see the same committed state. Dropping `tx`
        // uncommitted rolls back.
        let mut tx = self.pool.begin_with("BEGIN IMMEDIATE").await?;

        let (plan, applied) = match self.settle_locked(&mut *tx, order_id, cache).await {
            Ok(done) => done,
            Err(e) => {
                if let Err(rollback) = tx.rollback().await {
                    tracing::warn!(order_id, error = %rollback, "Rollback failed");
                }
                return Err(e);
            }
        };
        tx.commit().await?;

        if !applied.records.is_empty() {
            cache.absorb(applied.period, applied.period_id, &applied.records);
        }
        Ok(SettledOrder {
            order_id: plan.order_id.clone(),
            period: plan.period,
            payment_ratio: plan.ratio.normalize(),
            lines: applied.lines_written,
            beneficiaries: applied.records.len(),
            total_attributed: plan.total_attributed(),
        })
    }

    async fn settle_locked(
        &self,
        conn: &mut SqliteConnection,
        order_id: &str,
        cache: &SettlementCache,
    ) -> SettlementResult<(SettlementPlan, AppliedOrder)> {
        let (snapshot, eligibility) = eligibility::check(&mut *conn, order_id).await?;
        if let Eligibility::Rejected(reason) = eligibility {
            return Err(SettlementError::Rejected(reason));
        }

        let company_id = snapshot
            .order
            .company_id
            .ok_or(SettlementError::Rejected(RejectionReason::MissingCompany))?;
        if cache.rate_book(company_id).is_none() {
            return Err(SettlementError::RateNotConfigured { company_id });
        }

        let plan = plan::build(&snapshot, self.config.proration_base)?;
        let rates = self.beneficiary_rates(&mut *conn, &plan, cache).await?;

        let applied = if plan.contributions.is_empty() {
            line::mark_empty(&mut *conn, &plan.order_id, plan.order_date)
                .await
                .map_err(SettlementError::from)
                .map(|()| AppliedOrder {
                    period: plan.period,
                    period_id: 0,
                    records: Vec::new(),
                    lines_written: 0,
                })
        } else {
            aggregator::apply(&mut *conn, &plan, &rates, cache).await
        };

        let applied = applied.map_err(|e| match e {
            // lost a race with another run that settled the same order
            SettlementError::Storage(RepoError::Duplicate(_)) => {
                SettlementError::Rejected(RejectionReason::AlreadySettled)
            }
            other => other,
        })?;
        if applied.lines_written == 0 {
            tracing::debug!(order_id, "Order settled with nothing to attribute");
        }
        Ok((plan, applied))
    }

    /// Every beneficiary must be a known user of some company. The rate comes
    /// from the beneficiary's own company and role, never the order's.
    async fn beneficiary_rates(
        &self,
        conn: &mut SqliteConnection,
        plan: &SettlementPlan,
        cache: &SettlementCache,
    ) -> SettlementResult<HashMap<i64, Decimal>> {
        let mut rates = HashMap::new();
        for beneficiary_id in plan.beneficiary_ids() {
            let user = match cache.user(beneficiary_id) {
                Some(u) => u,
                None => {
                    let u = user::find_by_id(&mut *conn, beneficiary_id).await?.ok_or(
                        Inconsistency::UnknownBeneficiary {
                            user_id: beneficiary_id,
                        },
                    )?;
                    cache.insert_user(u.clone());
                    u
                }
            };
            let home_company = user.company_id.ok_or(Inconsistency::BeneficiaryWithoutCompany {
                user_id: beneficiary_id,
            })?;
            let book = self.rate_book(&mut *conn, home_company, cache).await?;
            rates.insert(beneficiary_id, book.rate_for(user.role.as_deref()));
        }
        Ok(rates)
    }

    async fn rate_book(
        &self,
        conn: &mut SqliteConnection,
        company_id: i64,
        cache: &SettlementCache,
    ) -> SettlementResult<Arc<RateBook>> {
        if let Some(book) = cache.rate_book(company_id) {
            return Ok(book);
        }
        let rates = rate::find_by_company(&mut *conn, company_id).await?;
        let book = RateBook::from_rates(company_id, &rates)
            .ok_or(SettlementError::RateNotConfigured { company_id })?;
        Ok(cache.insert_rate_book(book))
    }

    // ========== Queries ==========

    pub async fn get_record(
        &self,
        beneficiary_id: i64,
        period: Period,
    ) -> SettlementResult<Option<CommissionRecord>> {
        Ok(record::find_by_beneficiary_period(&self.pool, beneficiary_id, period).await?)
    }

    /// Audit lines of a record; `None` when the record does not exist
    pub async fn list_lines(&self, record_id: i64) -> SettlementResult<Option<Vec<CommissionLine>>> {
        if record::find_by_id(&self.pool, record_id).await?.is_none() {
            return Ok(None);
        }
        Ok(Some(line::list_by_record(&self.pool, record_id).await?))
    }

    pub async fn list_records(&self, period: Period) -> SettlementResult<Vec<CommissionRecord>> {
        Ok(record::list_by_period(&self.pool, period).await?)
    }

    pub async fn period_summary(&self, period: Period) -> SettlementResult<PeriodSummary> {
        Ok(record::period_summary(&self.pool, period).await?)
    }

    // ========== Rate configuration ==========

    pub async fn list_rates(&self, company_id: i64) -> SettlementResult<Vec<CommissionRate>> {
        let mut conn = self.pool.acquire().await?;
        Ok(rate::find_by_company(&mut conn, company_id).await?)
    }

    pub async fn set_rate(
        &self,
        company_id: i64,
        data: CommissionRateUpsert,
    ) -> SettlementResult<CommissionRate> {
        let saved = rate::upsert(&self.pool, company_id, data).await?;
        tracing::info!(company_id, role = ?saved.role, rate = %saved.rate, "Commission rate updated");
        Ok(saved)
    }
}
