pub mod advanced_fetch;
pub mod analysis;
pub mod fixture;
pub mod form;
pub mod h2h_rule;
pub mod http_client;
pub mod market;
pub mod metrics;
pub mod report;
pub mod scorers;
pub mod series;
pub mod stat_extract;
pub mod suggestions;
