pub mod change_service;
pub mod chart_service;
pub mod dedup_service;
pub mod mail_service;
pub mod monitor_service;
pub mod threshold_service;
