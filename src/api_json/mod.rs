use serde_json::Value;

use crate::error::{GeneratorError, Result};
use crate::models::SectionId;

pub mod options;

pub use options::{validate_options, Options};

/// Petición de generación ya validada.
///
/// # Estructura del JSON esperado:
/// ```json
/// {
///   "groups": [[101, 102, 103], [201], [301, 302]],
///   "options": {
///     "minimum_start_time": "09:00",
///     "minimum_interval": null,
///     "maximum_interval": "03:00",
///     "allow_consec": 3,
///     "allow_one_class_a_day": false,
///     "allow_only_open_section": true,
///     "allow_run": true
///   }
/// }
/// ```
///
/// # Campos:
/// - `groups`: lista de grupos; cada grupo son los ids de secciones
///   mutuamente excluyentes de un mismo ramo (se elige exactamente una).
/// - `options`: ver [`options::validate_options`]. Todas las claves salvo
///   `allow_run` deben estar presentes (las opcionales pueden venir en `null`).
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    pub groups: Vec<Vec<SectionId>>,
    pub options: Options,
}

impl GenerateRequest {
    pub fn new(groups: Vec<Vec<SectionId>>, options: Options) -> Self {
        GenerateRequest { groups, options }
    }
}

pub fn parse_json_input(json_str: &str) -> Result<GenerateRequest> {
    let value: Value = serde_json::from_str(json_str)
        .map_err(|e| GeneratorError::InvalidInput(format!("invalid JSON body: {}", e)))?;
    parse_generate_request(&value)
}

/// Valida `groups` y `options` antes de tocar ningún dato. Los grupos se
/// validan primero: una petición con ambos campos malos reporta `InvalidInput`.
pub fn parse_generate_request(body: &Value) -> Result<GenerateRequest> {
    let groups = match body.get("groups") {
        None | Some(Value::Null) => {
            return Err(GeneratorError::InvalidInput("groups are required".to_string()));
        }
        Some(v) => validate_groups(v)?,
    };
    let options = match body.get("options") {
        None | Some(Value::Null) => {
            return Err(GeneratorError::option("options", "options are required"));
        }
        Some(v) => Options::from_json(v)?,
    };
    Ok(GenerateRequest { groups, options })
}

/// `groups` debe ser una lista de listas de enteros.
pub fn validate_groups(value: &Value) -> Result<Vec<Vec<SectionId>>> {
    let outer = value
        .as_array()
        .ok_or_else(|| {
            GeneratorError::InvalidInput("Invalid groups: expected a list of lists".to_string())
        })?;

    let mut groups = Vec::with_capacity(outer.len());
    for (gi, g) in outer.iter().enumerate() {
        let inner = g
            .as_array()
            .ok_or_else(|| {
                GeneratorError::InvalidInput(format!("Invalid groups: group {} is not a list", gi))
            })?;
        let mut ids = Vec::with_capacity(inner.len());
        for id in inner {
            let id = id
                .as_i64()
                .ok_or_else(|| {
                    let msg = format!("Invalid section ID {} in group {}", id, gi);
                    GeneratorError::InvalidInput(msg)
                })?;
            ids.push(id);
        }
        groups.push(ids);
    }
    Ok(groups)
}
