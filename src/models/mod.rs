pub mod activity;
pub mod score;
pub mod usage;
