pub mod analytics;
pub mod assignment;
pub mod auth;
pub mod leads;
pub mod pipelines;
