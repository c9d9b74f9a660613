use crate::domain::{engine_service::EngineService, error::Result, value_objects::SolverBackend};
#[cfg(not(feature = "highs"))]
use crate::domain::error::SolverError;
use crate::engine::MicrolpEngine;
#[cfg(feature = "highs")]
use crate::engine::HighsEngine;

/// Factory for creating engine instances based on configuration
pub struct EngineFactory;

impl EngineFactory {
    /// Create an engine for a specific backend
    pub fn create_from_backend(backend: SolverBackend) -> Result<Box<dyn EngineService>> {
        match backend {
            SolverBackend::Auto => Ok(Self::default_engine()),
            SolverBackend::Microlp => Ok(Box::new(MicrolpEngine::new())),
            SolverBackend::Highs => Self::highs(),
        }
    }

    /// Get the default engine (HiGHS when compiled in, microlp otherwise)
    pub fn default_engine() -> Box<dyn EngineService> {
        match Self::highs() {
            Ok(engine) => engine,
            Err(_) => Box::new(MicrolpEngine::new()),
        }
    }

    #[cfg(feature = "highs")]
    fn highs() -> Result<Box<dyn EngineService>> {
        Ok(Box::new(HighsEngine::new()))
    }

    #[cfg(not(feature = "highs"))]
    fn highs() -> Result<Box<dyn EngineService>> {
        Err(SolverError::EngineFailure(
            "HiGHS support not compiled in (enable the `highs` feature)".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_microlp() {
        let engine = EngineFactory::create_from_backend(SolverBackend::Microlp).expect("microlp");
        assert_eq!(engine.name(), "microlp");
    }

    #[cfg(not(feature = "highs"))]
    #[test]
    fn auto_falls_back_to_microlp() {
        let engine = EngineFactory::create_from_backend(SolverBackend::Auto).expect("auto");
        assert_eq!(engine.name(), "microlp");
        assert!(matches!(
            EngineFactory::create_from_backend(SolverBackend::Highs),
            Err(SolverError::EngineFailure(_))
        ));
    }

    #[cfg(feature = "highs")]
    #[test]
    fn auto_prefers_highs() {
        let engine = EngineFactory::create_from_backend(SolverBackend::Auto).expect("auto");
        assert_eq!(engine.name(), "HiGHS");
    }
}
