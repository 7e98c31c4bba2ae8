pub mod activity;
pub mod chat;
pub mod dashboard;
pub mod feedback;
pub mod health;
pub mod scores;
