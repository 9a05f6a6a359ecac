use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Datelike, Duration, NaiveDate};
use log::debug;

use super::dashboard_model::*;
use super::dashboard_traits::{DashboardServiceTrait, PolicyDocumentStoreTrait};
use crate::errors::{Error, Result, ValidationError};
use crate::events::{IntegrationEvent, IntegrationEventHandler};
use crate::utils::time_utils::{next_month_start, start_of_month, start_of_week, start_of_year};

const MAX_TREND_PERIODS: usize = 3660;

/// Sales aggregations over the policy document store.
pub struct DashboardService {
    store: Arc<dyn PolicyDocumentStoreTrait>,
}

impl DashboardService {
    pub fn new(store: Arc<dyn PolicyDocumentStoreTrait>) -> Self {
        Self { store }
    }
}

impl DashboardServiceTrait for DashboardService {
    fn total_sales(&self, filter: &SalesFilter) -> Result<TotalSales> {
        let mut per_product: BTreeMap<String, SalesResult> = BTreeMap::new();
        let mut total = SalesResult::default();
        for doc in self.store.query(filter)? {
            per_product
                .entry(doc.product_code.clone())
                .or_default()
                .add(&doc);
            total.add(&doc);
        }
        Ok(TotalSales {
            per_product: per_product
                .into_iter()
                .map(|(product_code, sales)| ProductSales {
                    product_code,
                    sales,
                })
                .collect(),
            total,
        })
    }

    fn agents_sales(&self, filter: &SalesFilter) -> Result<AgentsSales> {
        let mut per_agent: BTreeMap<String, SalesResult> = BTreeMap::new();
        let mut total = SalesResult::default();
        for doc in self.store.query(filter)? {
            per_agent
                .entry(doc.agent_login.clone())
                .or_default()
                .add(&doc);
            total.add(&doc);
        }
        let mut per_agent: Vec<AgentSales> = per_agent
            .into_iter()
            .map(|(agent_login, sales)| AgentSales { agent_login, sales })
            .collect();
        // Best sellers first; BTreeMap order breaks ties by login
        per_agent.sort_by(|a, b| b.sales.premium_amount.cmp(&a.sales.premium_amount));
        Ok(AgentsSales { per_agent, total })
    }

    fn sales_trends(&self, query: &SalesTrendsQuery) -> Result<SalesTrends> {
        if query.sales_date_to < query.sales_date_from {
            return Err(ValidationError::InvalidDateRange(format!(
                "salesDateTo {} precedes salesDateFrom {}",
                query.sales_date_to, query.sales_date_from
            ))
            .into());
        }

        let mut periods: Vec<PeriodSales> = Vec::new();
        let mut start = period_start(query.unit, query.sales_date_from);
        while start <= query.sales_date_to {
            if periods.len() >= MAX_TREND_PERIODS {
                return Err(ValidationError::InvalidInput(format!(
                    "Sales trend range spans more than {} periods",
                    MAX_TREND_PERIODS
                ))
                .into());
            }
            periods.push(PeriodSales {
                period: period_label(query.unit, start),
                period_start: start,
                sales: SalesResult::default(),
            });
            start = match next_period(query.unit, start) {
                Some(next) => next,
                None => break,
            };
        }

        let filter = SalesFilter {
            product_code: query.product_code.clone(),
            sales_date_from: Some(query.sales_date_from),
            sales_date_to: Some(query.sales_date_to),
        };
        for doc in self.store.query(&filter)? {
            let bucket = period_start(query.unit, doc.sales_date());
            if let Some(period) = periods.iter_mut().find(|p| p.period_start == bucket) {
                period.sales.add(&doc);
            }
        }

        Ok(SalesTrends {
            unit: query.unit,
            periods,
        })
    }
}

#[async_trait]
impl IntegrationEventHandler for DashboardService {
    fn name(&self) -> &'static str {
        "dashboard"
    }

    async fn handle(&self, event: &IntegrationEvent) -> Result<()> {
        match event {
            IntegrationEvent::PolicyCreated(e) => {
                self.store
                    .upsert(PolicyDocument {
                        policy_number: e.policy_number.clone(),
                        product_code: e.product_code.clone(),
                        agent_login: e.agent_login.clone(),
                        policy_from: e.policy_from,
                        policy_to: e.policy_to,
                        total_premium: e.total_premium,
                        terminated: false,
                    })
                    .await
            }
            IntegrationEvent::PolicyTerminated(e) => {
                let mut doc = self
                    .store
                    .find(&e.policy_number)?
                    .ok_or_else(|| Error::not_found("PolicyDocument", e.policy_number.clone()))?;
                if doc.terminated {
                    debug!("Policy {} already terminated in projection", e.policy_number);
                    return Ok(());
                }
                doc.total_premium -= e.amount_to_return;
                doc.policy_to = e.termination_date;
                doc.terminated = true;
                self.store.upsert(doc).await
            }
        }
    }
}

fn period_start(unit: TimeUnit, date: NaiveDate) -> NaiveDate {
    match unit {
        TimeUnit::Day => date,
        TimeUnit::Week => start_of_week(date),
        TimeUnit::Month => start_of_month(date),
        TimeUnit::Year => start_of_year(date),
    }
}

fn next_period(unit: TimeUnit, start: NaiveDate) -> Option<NaiveDate> {
    match unit {
        TimeUnit::Day => start.checked_add_signed(Duration::days(1)),
        TimeUnit::Week => start.checked_add_signed(Duration::days(7)),
        TimeUnit::Month => next_month_start(start),
        TimeUnit::Year => NaiveDate::from_ymd_opt(start.year() + 1, 1, 1),
    }
}

fn period_label(unit: TimeUnit, start: NaiveDate) -> String {
    match unit {
        TimeUnit::Day => start.format("%Y-%m-%d").to_string(),
        TimeUnit::Week => {
            let week = start.iso_week();
            format!("{}-W{:02}", week.year(), week.week())
        }
        TimeUnit::Month => start.format("%Y-%m").to_string(),
        TimeUnit::Year => start.format("%Y").to_string(),
    }
}
