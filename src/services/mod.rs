pub mod chart_service;
pub mod history_service;
pub mod leaderboard_client;
pub mod leaderboard_service;
pub mod pixel_font;
pub mod ranking;
pub mod scheduler;
pub mod update_service;
