pub mod command;
pub mod inputs;
pub mod jobs;
pub mod runner;
pub mod separator;
