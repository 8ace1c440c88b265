pub mod scan_config;
pub mod settings;
pub mod units;
