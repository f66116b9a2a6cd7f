// --- Generador de Horarios - ejecución offline ---
//
// Lee un archivo JSON (o stdin si no se pasa ruta) con la forma:
// {
//   "catalog": [ { "id": 1, "timeslots": [...], "open_seats": 10, ... }, ... ],
//   "request": { "groups": [[1, 2], [3]], "options": { ... } },
//   "count": false
// }
// e imprime los horarios generados (o sólo su cantidad) como JSON.

use std::error::Error;
use std::io::Read;

use serde_json::{json, Value};
use timetable_wizard::{GeneratorConfig, InMemoryCatalog, TimetableGenerator};

fn read_input() -> Result<String, Box<dyn Error>> {
    let mut raw = String::new();
    match std::env::args().nth(1) {
        Some(path) if path != "-" => raw = std::fs::read_to_string(&path)?,
        _ => {
            std::io::stdin().read_to_string(&mut raw)?;
        }
    }
    Ok(raw)
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    log::info!("=== Generador de Horarios (offline) ===");

    let input: Value = serde_json::from_str(&read_input()?)?;
    let raw_catalog = input.get("catalog").cloned().unwrap_or_else(|| json!([]));
    let catalog = InMemoryCatalog::from_json_value(raw_catalog)?;
    log::info!("catálogo cargado: {} secciones", catalog.len());

    let config = GeneratorConfig::from_env()?;
    log::debug!("configuración: {:?}", config);

    let request = input.get("request").cloned().unwrap_or(Value::Null);
    let count_only = input.get("count").and_then(Value::as_bool).unwrap_or(false);
    let generator = TimetableGenerator::new(catalog, config);

    let out = if count_only {
        json!({ "count": generator.count_json(&request)? })
    } else {
        let tables = generator.generate_json(&request)?;
        json!({ "count": tables.len(), "timetables": tables })
    };
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
