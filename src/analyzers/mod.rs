//! Usage aggregation: active users, growth, seasonality, cohort churn and
//! LTV/CAC.
//!
//! Every function here is a pure computation over [`crate::events::UsageData`]
//! slices; [`aggregate::build_dashboard`] runs them all in one pass.

pub mod activity;
pub mod aggregate;
pub mod cohort;
pub mod ltv;
pub mod seasonality;
pub mod types;
pub mod utility;
