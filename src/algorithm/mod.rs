// Módulo de alto nivel del generador de horarios
// Declarar submódulos (archivos en la carpeta `src/algorithm`)
pub mod bucket;
pub mod conflict;
pub mod expand;
pub mod filters;
pub mod generate;
pub mod search;

// Reexportar la API pública del orquestador y de la búsqueda
pub use bucket::{bucket_groups, to_timeslot_groups, TimeslotGroup, TimeslotSignature};
pub use conflict::{ConstraintSet, Violation};
pub use generate::{count_timetables, generate_timetables, TimetableGenerator};
pub use search::{search, CancelToken, SearchControl, SearchOutcome, Skeleton};
