/// Validación de las opciones de generación.
///
/// Cada opción reconocida es una fila `(clave, requerida, parser)` en
/// `OPTIONS_TABLE`. Se recorren todas en orden; la primera que falte o no se
/// pueda convertir aborta la petición completa (nunca se aplica una
/// configuración parcial ni se sustituye un valor inválido por un default).
/// Las claves desconocidas se ignoran.
use chrono::{Duration, NaiveTime};
use serde_json::{Map, Value};

use crate::error::{GeneratorError, Result};
use crate::models::hhmm;

/// Opciones tipadas que controlan qué restricciones están activas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Excluye secciones con alguna reunión antes de esta hora.
    pub minimum_start_time: Option<NaiveTime>,
    /// Brecha mínima entre dos clases del mismo día.
    pub minimum_interval: Option<Duration>,
    /// Brecha máxima entre dos clases del mismo día.
    pub maximum_interval: Option<Duration>,
    /// Largo máximo de una racha de clases consecutivas. `None` = sin regla.
    pub allow_consec: Option<u32>,
    pub allow_one_class_a_day: bool,
    pub allow_only_open_section: bool,
    /// `false` activa la regla de factibilidad de caminata.
    pub allow_run: bool,
}

impl Default for Options {
    /// Todas las reglas apagadas.
    fn default() -> Self {
        Options {
            minimum_start_time: None,
            minimum_interval: None,
            maximum_interval: None,
            allow_consec: None,
            allow_one_class_a_day: true,
            allow_only_open_section: false,
            allow_run: true,
        }
    }
}

impl Options {
    pub fn walking_rule_active(&self) -> bool {
        !self.allow_run
    }

    pub fn from_json(value: &Value) -> Result<Options> {
        match value {
            Value::Object(map) => validate_options(map),
            Value::Null => Err(GeneratorError::option("options", "options are required")),
            other => {
                Err(GeneratorError::option("options", format!("expected an object, got {}", other)))
            }
        }
    }
}

type Parser = fn(&Value, &mut Options) -> std::result::Result<(), String>;

/// `(clave, debe estar presente, parser)`.
const OPTIONS_TABLE: &[(&str, bool, Parser)] = &[
    ("minimum_start_time", true, parse_minimum_start_time),
    ("minimum_interval", true, parse_minimum_interval),
    ("maximum_interval", true, parse_maximum_interval),
    ("allow_consec", true, parse_allow_consec),
    ("allow_one_class_a_day", true, parse_allow_one_class_a_day),
    ("allow_only_open_section", true, parse_allow_only_open_section),
    ("allow_run", false, parse_allow_run),
];

pub fn recognized_keys() -> impl Iterator<Item = &'static str> {
    OPTIONS_TABLE.iter().map(|(k, _, _)| *k)
}

/// Valida y convierte el mapa de opciones recibido.
pub fn validate_options(raw: &Map<String, Value>) -> Result<Options> {
    let mut opts = Options::default();

    for (key, required, parser) in OPTIONS_TABLE {
        match raw.get(*key) {
            None if *required => return Err(GeneratorError::option(key, "missing option")),
            None => continue,
            Some(v) => parser(v, &mut opts).map_err(|reason| GeneratorError::option(key, reason))?,
        }
    }

    for key in raw.keys() {
        if !recognized_keys().any(|k| k == key.as_str()) {
            log::debug!("opción desconocida '{}' ignorada", key);
        }
    }

    Ok(opts)
}

fn parse_time(v: &Value) -> std::result::Result<NaiveTime, String> {
    let s = v.as_str().ok_or_else(|| format!("expected \"HH:MM\" string, got {}", v))?;
    hhmm::parse(s).ok_or_else(|| format!("'{}' is not a valid HH:MM time", s))
}

/// "HH:MM" interpretado como duración (01:30 = 90 minutos).
fn parse_duration(v: &Value) -> std::result::Result<Duration, String> {
    let t = parse_time(v)?;
    Ok(t.signed_duration_since(NaiveTime::default()))
}

fn parse_bool(v: &Value) -> std::result::Result<bool, String> {
    v.as_bool().ok_or_else(|| format!("expected a boolean, got {}", v))
}

fn parse_minimum_start_time(v: &Value, o: &mut Options) -> std::result::Result<(), String> {
    o.minimum_start_time = if v.is_null() { None } else { Some(parse_time(v)?) };
    Ok(())
}

fn parse_minimum_interval(v: &Value, o: &mut Options) -> std::result::Result<(), String> {
    o.minimum_interval = if v.is_null() { None } else { Some(parse_duration(v)?) };
    Ok(())
}

fn parse_maximum_interval(v: &Value, o: &mut Options) -> std::result::Result<(), String> {
    o.maximum_interval = if v.is_null() { None } else { Some(parse_duration(v)?) };
    Ok(())
}

/// Entero o string con un entero. Valores < 1 desactivan la regla.
fn parse_allow_consec(v: &Value, o: &mut Options) -> std::result::Result<(), String> {
    let n: i64 = match v {
        Value::Null => {
            o.allow_consec = None;
            return Ok(());
        }
        Value::Number(n) => n.as_i64().ok_or_else(|| format!("expected an integer, got {}", n))?,
        Value::String(s) => {
            s.trim().parse::<i64>().map_err(|_| format!("'{}' is not an integer", s))?
        }
        other => return Err(format!("expected an integer, got {}", other)),
    };
    o.allow_consec = if n < 1 {
        None
    } else {
        Some(u32::try_from(n).map_err(|_| format!("{} is too large", n))?)
    };
    Ok(())
}

fn parse_allow_one_class_a_day(v: &Value, o: &mut Options) -> std::result::Result<(), String> {
    o.allow_one_class_a_day = parse_bool(v)?;
    Ok(())
}

fn parse_allow_only_open_section(v: &Value, o: &mut Options) -> std::result::Result<(), String> {
    o.allow_only_open_section = parse_bool(v)?;
    Ok(())
}

fn parse_allow_run(v: &Value, o: &mut Options) -> std::result::Result<(), String> {
    o.allow_run = if v.is_null() { true } else { parse_bool(v)? };
    Ok(())
}
