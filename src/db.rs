pub mod user_repo;
pub use user_repo::UserRepository;
pub mod lead_repo;
pub use lead_repo::LeadRepository;
pub mod assignment_repo;
pub use assignment_repo::AssignmentRepository;
pub mod pipeline_repo;
pub use pipeline_repo::PipelineRepository;
pub mod call_log_repo;
pub use call_log_repo::CallLogRepository;
