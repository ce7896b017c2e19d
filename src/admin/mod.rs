//! Admin-only back office: circle rates, subscription plans and the dashboard.
//! Listing circle rates is open to every authenticated role.

pub mod circle_rates;
pub mod dashboard;
pub mod subscriptions;

pub use subscriptions::{find_plan, SubscriptionPlan, PLANS};
