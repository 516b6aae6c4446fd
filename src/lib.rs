pub mod audit;
pub mod data_files;
pub mod league_config;
pub mod orchestrator;
pub mod prop_engine;
pub mod sheet;
pub mod stats;
pub mod store;
pub mod team_names;
pub mod total_engine;
