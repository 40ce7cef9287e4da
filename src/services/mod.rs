pub mod cache_service;
pub mod chart_service;
pub mod dashboard_service;
pub mod directory_service;
pub mod eligibility_service;
pub mod form_service;
pub mod history_service;
pub mod info_service;
pub mod permission_service;
pub mod session_service;
pub mod summary_service;
pub mod transfer_service;
pub mod wallet_service;
