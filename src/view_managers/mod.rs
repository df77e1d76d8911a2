pub mod analytics_manager;
pub mod submit_manager;

pub(crate) use analytics_manager::AnalyticsManager;
pub(crate) use submit_manager::SubmitManager;
