pub mod ai;
pub mod cooldown;
pub mod date_window;
pub mod day_projector;
pub mod extract;
pub mod feedback;
pub mod prompts;
pub mod scoring;
