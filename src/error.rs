// Errores del generador de horarios.

use chrono::NaiveTime;
use thiserror::Error;

use crate::models::{Day, SectionId};

/// Error de una petición de generación. Toda validación ocurre antes de
/// empezar la búsqueda; nada dentro de la búsqueda es recuperable.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeneratorError {
    /// `groups` mal formado o identificadores que no existen.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Opción ausente o con un valor que no pasa su validador.
    #[error("invalid value for option '{key}': {reason}")]
    InvalidOption { key: String, reason: String },

    /// Franja con `start >= end` entregada por el colaborador de datos.
    #[error("invalid timeslot {day} {start}-{end}: start must be before end")]
    InvalidTimeslot { day: Day, start: NaiveTime, end: NaiveTime },

    /// Búsqueda cancelada (token o deadline). Distinto de "sin resultados".
    #[error("search aborted after exploring {explored} nodes")]
    SearchAborted { explored: u64 },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl GeneratorError {
    pub fn option(key: &str, reason: impl Into<String>) -> Self {
        GeneratorError::InvalidOption { key: key.to_string(), reason: reason.into() }
    }
}

/// Errores del colaborador que materializa secciones.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolveError {
    #[error("section {0} not found")]
    NotFound(SectionId),

    #[error("catalog error: {0}")]
    Catalog(String),
}

impl From<ResolveError> for GeneratorError {
    fn from(e: ResolveError) -> Self {
        GeneratorError::InvalidInput(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GeneratorError>;
