pub mod history;
pub mod leaderboard;
pub mod track;
