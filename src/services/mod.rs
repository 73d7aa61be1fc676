pub mod dashboard_engine;
pub mod history;
pub mod leaderboard;
pub mod lifecycle;
pub mod prediction_workflow;
pub mod transport;
pub mod visualizations;
