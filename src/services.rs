pub mod analytics_service;
pub mod auth;
pub mod authorization;
pub mod distribution_service;
pub mod lead_service;
pub mod pipeline_service;
pub mod reassignment_service;

#[cfg(test)]
pub mod testutil;
