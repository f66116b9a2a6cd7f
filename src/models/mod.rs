// Estructuras de datos principales del generador de horarios.
//
// Todo lo que vive aquí es un valor inmutable construido por petición: el
// resolver entrega `CandidateSection`s ya materializadas y el generador nunca
// las modifica, sólo las agrupa y las copia al resultado.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::error::GeneratorError;

/// Identificador opaco de una sección abierta (el `id` de la base de datos).
pub type SectionId = i64;

/// Día de la semana de una reunión.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Day {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl Day {
    /// Código corto usado por el catálogo ("M", "Tu", "W", ...).
    pub fn code(self) -> &'static str {
        match self {
            Day::Mon => "M",
            Day::Tue => "Tu",
            Day::Wed => "W",
            Day::Thu => "Th",
            Day::Fri => "F",
            Day::Sat => "Sa",
            Day::Sun => "Su",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

impl FromStr for Day {
    type Err = GeneratorError;

    /// Acepta los códigos del catálogo ("M", "Tu", "Th"...), nombres en inglés
    /// ("Mon", "Tuesday") y las abreviaturas en castellano ("LU", "MA", "MIE"...).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tok = s.trim();
        let day = match tok {
            "M" => Day::Mon,
            "Tu" => Day::Tue,
            "W" => Day::Wed,
            "Th" => Day::Thu,
            "F" => Day::Fri,
            "Sa" => Day::Sat,
            "Su" => Day::Sun,
            _ => {
                let upper = tok.to_uppercase();
                let prefix: String = upper.chars().take(3).collect();
                match prefix.as_str() {
                    "MON" | "LU" | "LUN" => Day::Mon,
                    "TUE" | "MA" | "MAR" => Day::Tue,
                    "WED" | "MI" | "MIE" | "MIÉ" => Day::Wed,
                    "THU" | "JU" | "JUE" => Day::Thu,
                    "FRI" | "VI" | "VIE" => Day::Fri,
                    "SAT" | "SA" | "SAB" | "SÁB" => Day::Sat,
                    "SUN" | "DO" | "DOM" => Day::Sun,
                    _ => return Err(GeneratorError::InvalidInput(format!("unknown day '{}'", s))),
                }
            }
        };
        Ok(day)
    }
}

impl TryFrom<String> for Day {
    type Error = GeneratorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Day> for String {
    fn from(d: Day) -> Self {
        d.code().to_string()
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Coordenadas geográficas de un edificio (grados decimales).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Valor por defecto que el catálogo guarda cuando no conoce la ubicación.
    pub const PLACEHOLDER: Coordinates = Coordinates { latitude: 0.0, longitude: 0.0 };

    /// True si son las coordenadas "desconocidas". Comparación exacta de bits:
    /// sólo `(0.0, 0.0)` literal cuenta como placeholder.
    pub fn is_placeholder(&self) -> bool {
        self.latitude.to_bits() == Self::PLACEHOLDER.latitude.to_bits()
            && self.longitude.to_bits() == Self::PLACEHOLDER.longitude.to_bits()
    }
}

/// Sala donde ocurre una reunión.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub building: String,
    #[serde(default)]
    pub room: String,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
}

impl Location {
    /// Coordenadas utilizables para estimar caminatas (ni ausentes ni placeholder).
    pub fn known_coordinates(&self) -> Option<Coordinates> {
        self.coordinates.filter(|c| !c.is_placeholder())
    }
}

/// Una franja semanal ocupada: día + inicio + fin (+ sala opcional).
///
/// Invariante: `start < end`. Sólo se construye a través de [`Timeslot::new`]
/// o deserializando, y ambos caminos lo validan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTimeslot")]
pub struct Timeslot {
    day: Day,
    #[serde(with = "hhmm")]
    start: NaiveTime,
    #[serde(with = "hhmm")]
    end: NaiveTime,
    location: Option<Location>,
}

#[derive(Deserialize)]
struct RawTimeslot {
    day: Day,
    #[serde(with = "hhmm")]
    start: NaiveTime,
    #[serde(with = "hhmm")]
    end: NaiveTime,
    #[serde(default)]
    location: Option<Location>,
}

impl TryFrom<RawTimeslot> for Timeslot {
    type Error = GeneratorError;

    fn try_from(raw: RawTimeslot) -> Result<Self, Self::Error> {
        Timeslot::new(raw.day, raw.start, raw.end, raw.location)
    }
}

impl Timeslot {
    pub fn new(
        day: Day,
        start: NaiveTime,
        end: NaiveTime,
        location: Option<Location>,
    ) -> Result<Self, GeneratorError> {
        if start >= end {
            return Err(GeneratorError::InvalidTimeslot { day, start, end });
        }
        Ok(Timeslot { day, start, end, location })
    }

    pub fn day(&self) -> Day {
        self.day
    }

    pub fn start(&self) -> NaiveTime {
        self.start
    }

    pub fn end(&self) -> NaiveTime {
        self.end
    }

    pub fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }

    /// Clave sin sala, usada para agrupar secciones con el mismo horario.
    pub fn key(&self) -> SlotKey {
        SlotKey { day: self.day, start: self.start, end: self.end }
    }
}

/// `(día, inicio, fin)` de una franja. Orden total: día, luego inicio, luego fin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SlotKey {
    pub day: Day,
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    #[serde(with = "hhmm")]
    pub end: NaiveTime,
}

/// Metadatos de presentación; el generador no los mira, sólo los devuelve.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionMeta {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub course_code: String,
    #[serde(default)]
    pub section_code: String,
    #[serde(default)]
    pub instructors: Vec<String>,
    #[serde(default)]
    pub credits: i32,
}

/// Sección candidata ya resuelta por el colaborador de datos.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateSection {
    pub id: SectionId,
    #[serde(default)]
    pub timeslots: Vec<Timeslot>,
    #[serde(default)]
    pub seats: i32,
    #[serde(default)]
    pub open_seats: i32,
    #[serde(default)]
    pub waitlist: i32,
    #[serde(flatten)]
    pub meta: SectionMeta,
}

impl CandidateSection {
    pub fn new(id: SectionId, timeslots: Vec<Timeslot>, open_seats: i32) -> Self {
        CandidateSection {
            id,
            timeslots,
            seats: open_seats.max(0),
            open_seats,
            waitlist: 0,
            meta: SectionMeta::default(),
        }
    }

    pub fn with_meta(mut self, meta: SectionMeta) -> Self {
        self.meta = meta;
        self
    }

    pub fn has_open_seats(&self) -> bool {
        self.open_seats > 0
    }

    pub fn is_unscheduled(&self) -> bool {
        self.timeslots.is_empty()
    }
}

/// Un horario concreto: una sección por grupo, en el orden de los grupos.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Timetable {
    pub sections: Vec<CandidateSection>,
}

impl Timetable {
    pub fn section_ids(&self) -> Vec<SectionId> {
        self.sections.iter().map(|s| s.id).collect()
    }

    pub fn timeslots(&self) -> impl Iterator<Item = &Timeslot> {
        self.sections.iter().flat_map(|s| s.timeslots.iter())
    }
}

/// (De)serialización de horas como "HH:MM" (también acepta "HH:MM:SS").
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn parse(s: &str) -> Option<NaiveTime> {
        let t = s.trim();
        NaiveTime::parse_from_str(t, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(t, "%H:%M:%S"))
            .ok()
    }

    pub fn serialize<S: Serializer>(t: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&t.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse(&s).ok_or_else(|| {
            let msg = format!("invalid time '{}', expected HH:MM", s);
            serde::de::Error::custom(msg)
        })
    }
}
