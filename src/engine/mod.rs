// Engine adapters: concrete implementations of EngineService, plus exhaustive enumeration

pub mod enumerate;
pub mod factory;
#[cfg(feature = "highs")]
pub mod highs_engine;
pub mod microlp_engine;

pub use enumerate::SolutionCount;
pub use factory::EngineFactory;
#[cfg(feature = "highs")]
pub use highs_engine::HighsEngine;
pub use microlp_engine::MicrolpEngine;
