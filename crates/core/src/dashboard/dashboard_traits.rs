use async_trait::async_trait;

use crate::dashboard::dashboard_model::*;
use crate::errors::Result;

/// Queryable store of policy documents.
#[async_trait]
pub trait PolicyDocumentStoreTrait: Send + Sync {
    fn find(&self, policy_number: &str) -> Result<Option<PolicyDocument>>;
    fn query(&self, filter: &SalesFilter) -> Result<Vec<PolicyDocument>>;
    async fn upsert(&self, document: PolicyDocument) -> Result<()>;
}

/// Trait for sales dashboard queries
pub trait DashboardServiceTrait: Send + Sync {
    fn total_sales(&self, filter: &SalesFilter) -> Result<TotalSales>;
    fn agents_sales(&self, filter: &SalesFilter) -> Result<AgentsSales>;
    fn sales_trends(&self, query: &SalesTrendsQuery) -> Result<SalesTrends>;
}
