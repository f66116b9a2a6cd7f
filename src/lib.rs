// Biblioteca raíz del crate `timetable_wizard`.
// Reexporta los módulos principales y el generador que orquesta el flujo
// resolve -> bucketing -> búsqueda -> expansión.
pub mod algorithm;
pub mod api_json;
pub mod config;
pub mod error;
pub mod models;
pub mod resolver;

pub use algorithm::{count_timetables, generate_timetables, CancelToken, TimetableGenerator};
pub use api_json::{parse_generate_request, GenerateRequest, Options};
pub use config::GeneratorConfig;
pub use error::{GeneratorError, ResolveError};
pub use models::{CandidateSection, Day, SectionId, Timeslot, Timetable};
pub use resolver::{InMemoryCatalog, SectionResolver};
