//! Discount-aware meal planning: turns a location and meal wishes into a
//! ranked basket of clearance offers plus meal ideas that use them.

pub mod cache;
pub mod config;
pub mod discounts;
pub mod error;
pub mod geo;
pub mod meals;
pub mod optimizer;
pub mod planner;
pub mod telemetry;
