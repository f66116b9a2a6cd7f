// Configuración de proceso del generador (no de la petición).
//
// Se lee del entorno, cargando antes un `.env` si existe:
//   TIMETABLE_THREADS              hilos para explorar las ramas del grupo 0 (default: núcleos)
//   TIMETABLE_DEADLINE_MS          tiempo máximo de búsqueda en ms (default: sin límite)
//   TIMETABLE_INCLUDE_UNSCHEDULED  "1"/"true" para aceptar secciones sin reuniones

use std::env;
use std::time::Duration;

use crate::error::{GeneratorError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Cantidad de hilos; 1 = búsqueda secuencial.
    pub threads: usize,
    /// Límite de tiempo para la búsqueda; al vencer se obtiene `SearchAborted`.
    pub deadline: Option<Duration>,
    /// Si es true, las secciones sin reuniones forman un bucket de firma vacía
    /// que nunca choca. Si es false se descartan antes de buscar.
    pub include_unscheduled_sections: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            threads: num_cpus::get().max(1),
            deadline: None,
            include_unscheduled_sections: false,
        }
    }
}

fn load_dotenv() {
    let _ = dotenv::dotenv();
}

impl GeneratorConfig {
    pub fn sequential() -> Self {
        GeneratorConfig { threads: 1, ..Default::default() }
    }

    pub fn from_env() -> Result<Self> {
        load_dotenv();
        Self::from_lookup(|k| env::var(k).ok())
    }

    /// Igual que `from_env` pero con una función de búsqueda inyectable (tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = GeneratorConfig::default();

        if let Some(v) = lookup("TIMETABLE_THREADS") {
            let n: usize = v
                .trim()
                .parse()
                .map_err(|_| {
                    let msg = format!("TIMETABLE_THREADS='{}' is not a positive integer", v);
                    GeneratorError::Config(msg)
                })?;
            if n == 0 {
                let msg = "TIMETABLE_THREADS must be at least 1".to_string();
                return Err(GeneratorError::Config(msg));
            }
            cfg.threads = n;
        }

        if let Some(v) = lookup("TIMETABLE_DEADLINE_MS") {
            let ms: u64 = v
                .trim()
                .parse()
                .map_err(|_| {
                    let msg = format!("TIMETABLE_DEADLINE_MS='{}' is not an integer", v);
                    GeneratorError::Config(msg)
                })?;
            cfg.deadline = Some(Duration::from_millis(ms));
        }

        if let Some(v) = lookup("TIMETABLE_INCLUDE_UNSCHEDULED") {
            cfg.include_unscheduled_sections = match v.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" | "" => false,
                other => {
                    return Err(GeneratorError::Config(format!(
                        "TIMETABLE_INCLUDE_UNSCHEDULED='{}' is not a boolean",
                        other
                    )));
                }
            };
        }

        Ok(cfg)
    }
}
