pub mod charts;
pub mod config;
pub mod logging;
pub mod match_dataset;
pub mod match_metrics;
pub mod pipeline;
pub mod report_tables;
pub mod team_stats;
