pub mod app;
pub mod cli;
pub mod domain;
pub mod infra;

pub fn init(level: infra::logging::LogLevel) {
    infra::logging::init(level);
}
