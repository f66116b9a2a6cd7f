// Funciones para detectar conflictos entre conjuntos de franjas horarias.
//
// Cada predicado responde "¿viola la regla?" comparando el candidato contra lo
// ya comprometido en el horario parcial. Los intervalos son semiabiertos
// [inicio, fin): una clase que termina 9:50 y otra que empieza 9:50 no chocan.

use std::collections::BTreeMap;
use std::fmt;

use chrono::Duration;

use crate::api_json::Options;
use crate::models::{Coordinates, Day, SlotKey, Timeslot};

/// Dos clases del mismo día separadas por a lo más esto son consecutivas.
pub fn consecutive_gap() -> Duration {
    Duration::minutes(15)
}

/// Velocidad de caminata conservadora (metros por minuto, ~4 km/h).
pub const WALKING_SPEED_M_PER_MIN: f64 = 67.0;

const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Regla que rechazó una inserción.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    Overlap,
    TooShortInterval,
    TooLongInterval,
    TooManyConsecutive,
    WalkingInfeasible,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Violation::Overlap => "overlap",
            Violation::TooShortInterval => "too short interval",
            Violation::TooLongInterval => "too long interval",
            Violation::TooManyConsecutive => "too many consecutive classes",
            Violation::WalkingInfeasible => "walking infeasible",
        };
        f.write_str(s)
    }
}

/// Ordena dos franjas del mismo día por inicio y devuelve la brecha
/// `inicio(después) - fin(antes)` (negativa si se solapan).
fn gap_between(a: &SlotKey, b: &SlotKey) -> Duration {
    let (before, after) = if a.start < b.start { (a, b) } else { (b, a) };
    after.start.signed_duration_since(before.end)
}

/// True si alguna franja de `a` comparte día con alguna de `b` y sus
/// intervalos se intersectan.
pub fn overlap(a: &[SlotKey], b: &[SlotKey]) -> bool {
    a.iter()
        .any(|x| b.iter().any(|y| x.day == y.day && x.start < y.end && y.start < x.end))
}

/// True si algún par del mismo día queda separado por menos de `min`.
pub fn too_short_interval(a: &[SlotKey], b: &[SlotKey], min: Duration) -> bool {
    a.iter()
        .any(|x| b.iter().any(|y| x.day == y.day && gap_between(x, y) < min))
}

/// True si algún par del mismo día queda separado por más de `max`.
pub fn too_long_interval(a: &[SlotKey], b: &[SlotKey], max: Duration) -> bool {
    a.iter()
        .any(|x| b.iter().any(|y| x.day == y.day && gap_between(x, y) > max))
}

/// True si, al agregar `candidate` a lo ya comprometido, algún día queda con
/// una racha de más de `max` clases consecutivas (brecha <= 15 minutos).
///
/// Sólo se revisan los días que toca el candidato; el resto no cambió.
pub fn too_many_consecutive<'a, I>(candidate: &[SlotKey], committed: I, max: u32) -> bool
where
    I: IntoIterator<Item = &'a [SlotKey]>,
{
    if candidate.is_empty() {
        return false;
    }

    let mut by_day: BTreeMap<Day, Vec<SlotKey>> = BTreeMap::new();
    for k in candidate {
        by_day.entry(k.day).or_default().push(*k);
    }
    for set in committed {
        for k in set {
            if let Some(v) = by_day.get_mut(&k.day) {
                v.push(*k);
            }
        }
    }

    let limit = consecutive_gap();
    for day_slots in by_day.values_mut() {
        day_slots.sort_unstable_by_key(|k| (k.start, k.end));
        let mut run = 1u32;
        for pair in day_slots.windows(2) {
            if pair[1].start.signed_duration_since(pair[0].end) <= limit {
                run += 1;
                if run > max {
                    return true;
                }
            } else {
                run = 1;
            }
        }
    }
    false
}

/// Distancia en metros entre dos puntos (haversine).
pub fn distance_m(a: Coordinates, b: Coordinates) -> f64 {
    let (lat1, lat2) = (a.latitude.to_radians(), b.latitude.to_radians());
    let dlat = lat2 - lat1;
    let dlon = (b.longitude - a.longitude).to_radians();
    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}

/// Minutos necesarios para caminar entre dos puntos.
pub fn walking_minutes(a: Coordinates, b: Coordinates) -> f64 {
    distance_m(a, b) / WALKING_SPEED_M_PER_MIN
}

/// True si existe un par de clases consecutivas (mismo día, brecha entre 0 y
/// 15 minutos) entre `a` y `b` cuya brecha no alcanza para caminar de una
/// sala a la otra. Sin coordenadas conocidas en ambos extremos se asume que
/// sí alcanza.
pub fn walking_infeasible(a: &[Timeslot], b: &[Timeslot]) -> bool {
    let limit = consecutive_gap();
    a.iter().any(|x| {
        b.iter().any(|y| {
            if x.day() != y.day() {
                return false;
            }
            let gap = gap_between(&x.key(), &y.key());
            if gap < Duration::zero() || gap > limit {
                return false;
            }
            let (Some(cx), Some(cy)) = (
                x.location().and_then(|l| l.known_coordinates()),
                y.location().and_then(|l| l.known_coordinates()),
            ) else {
                return false;
            };
            (gap.num_seconds() as f64 / 60.0) < walking_minutes(cx, cy)
        })
    })
}

/// Regla de caminata para una sección concreta contra las ya elegidas.
/// Se evalúa al expandir porque los buckets no distinguen salas.
pub fn check_walking<'a, I>(candidate: &[Timeslot], placed: I) -> Result<(), Violation>
where
    I: IntoIterator<Item = &'a [Timeslot]>,
{
    if placed.into_iter().any(|p| walking_infeasible(candidate, p)) {
        return Err(Violation::WalkingInfeasible);
    }
    Ok(())
}

/// Restricciones por inserción activas para una petición.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstraintSet {
    pub minimum_interval: Option<Duration>,
    pub maximum_interval: Option<Duration>,
    pub max_consecutive: Option<u32>,
}

impl ConstraintSet {
    pub fn from_options(options: &Options) -> Self {
        ConstraintSet {
            minimum_interval: options.minimum_interval,
            maximum_interval: options.maximum_interval,
            max_consecutive: options.allow_consec,
        }
    }

    /// Revisa si `candidate` puede entrar al horario parcial `committed`.
    /// Las reglas de a pares se evalúan contra cada bucket ya puesto, no sólo
    /// contra el último.
    pub fn check(&self, candidate: &[SlotKey], committed: &[&[SlotKey]]) -> Result<(), Violation> {
        for placed in committed {
            if overlap(candidate, placed) {
                return Err(Violation::Overlap);
            }
            if let Some(min) = self.minimum_interval {
                if too_short_interval(candidate, placed, min) {
                    return Err(Violation::TooShortInterval);
                }
            }
            if let Some(max) = self.maximum_interval {
                if too_long_interval(candidate, placed, max) {
                    return Err(Violation::TooLongInterval);
                }
            }
        }
        if let Some(max) = self.max_consecutive {
            if too_many_consecutive(candidate, committed.iter().copied(), max) {
                return Err(Violation::TooManyConsecutive);
            }
        }
        Ok(())
    }

    pub fn insertable(&self, candidate: &[SlotKey], committed: &[&[SlotKey]]) -> bool {
        self.check(candidate, committed).is_ok()
    }
}
