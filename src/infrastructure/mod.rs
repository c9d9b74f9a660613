// Infrastructure: external concerns (engine log destination)

pub mod log_sink;

pub use log_sink::EngineLog;
