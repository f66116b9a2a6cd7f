// Agrupación de secciones por firma horaria.
//
// Dos secciones con exactamente las mismas franjas (día, inicio, fin) son
// intercambiables para detectar choques: sólo una "representante" participa
// del backtracking y el resto se recupera al expandir el esqueleto.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::{CandidateSection, SlotKey};

/// Conjunto ordenado y sin duplicados de `(día, inicio, fin)` de una sección.
///
/// Es independiente del orden en que llegan las reuniones y de la sala.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TimeslotSignature(Vec<SlotKey>);

impl TimeslotSignature {
    pub fn of(section: &CandidateSection) -> Self {
        Self::from_keys(section.timeslots.iter().map(|t| t.key()))
    }

    pub fn from_keys<I: IntoIterator<Item = SlotKey>>(keys: I) -> Self {
        let mut v: Vec<SlotKey> = keys.into_iter().collect();
        v.sort_unstable();
        v.dedup();
        TimeslotSignature(v)
    }

    pub fn slots(&self) -> &[SlotKey] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Un bucket: una firma y todas las secciones del grupo que la comparten,
/// ordenadas por id.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeslotGroup {
    pub signature: TimeslotSignature,
    pub sections: Vec<CandidateSection>,
}

impl TimeslotGroup {
    pub fn slots(&self) -> &[SlotKey] {
        self.signature.slots()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

/// Particiona un grupo en buckets por firma.
///
/// Los buckets salen en orden ascendente de firma y las secciones de cada uno
/// ordenadas por id, así que permutar la entrada no cambia el resultado.
/// Las secciones sin reuniones se descartan salvo que `include_unscheduled`
/// sea true, en cuyo caso forman el bucket de firma vacía.
pub fn to_timeslot_groups(
    sections: &[CandidateSection],
    include_unscheduled: bool,
) -> Vec<TimeslotGroup> {
    let mut by_signature: BTreeMap<TimeslotSignature, Vec<CandidateSection>> = BTreeMap::new();

    for s in sections {
        if s.is_unscheduled() && !include_unscheduled {
            log::debug!("sección {} sin reuniones: descartada", s.id);
            continue;
        }
        by_signature.entry(TimeslotSignature::of(s)).or_default().push(s.clone());
    }

    by_signature
        .into_iter()
        .map(|(signature, mut sections)| {
            sections.sort_by_key(|s| s.id);
            TimeslotGroup { signature, sections }
        })
        .collect()
}

/// Aplica `to_timeslot_groups` a cada grupo manteniendo el orden de grupos.
pub fn bucket_groups(
    groups: &[Vec<CandidateSection>],
    include_unscheduled: bool,
) -> Vec<Vec<TimeslotGroup>> {
    groups.iter().map(|g| to_timeslot_groups(g, include_unscheduled)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Day, Timeslot};
    use chrono::NaiveTime;

    fn ts(day: Day, h1: u32, m1: u32, h2: u32, m2: u32) -> Timeslot {
        Timeslot::new(
            day,
            NaiveTime::from_hms_opt(h1, m1, 0).unwrap(),
            NaiveTime::from_hms_opt(h2, m2, 0).unwrap(),
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_signature_is_order_independent_and_deduped() {
        let a = CandidateSection::new(1, vec![ts(Day::Wed, 9, 0, 9, 50), ts(Day::Mon, 9, 0, 9, 50)], 1);
        let b = CandidateSection::new(
            2,
            vec![ts(Day::Mon, 9, 0, 9, 50), ts(Day::Wed, 9, 0, 9, 50), ts(Day::Mon, 9, 0, 9, 50)],
            1,
        );
        assert_eq!(TimeslotSignature::of(&a), TimeslotSignature::of(&b));
        assert_eq!(TimeslotSignature::of(&b).slots().len(), 2);
        assert_eq!(TimeslotSignature::of(&a).slots()[0].day, Day::Mon);
    }

    #[test]
    fn test_identical_schedules_share_bucket() {
        let secs = vec![
            CandidateSection::new(3, vec![ts(Day::Tue, 10, 0, 11, 15)], 1),
            CandidateSection::new(1, vec![ts(Day::Tue, 10, 0, 11, 15)], 1),
            CandidateSection::new(2, vec![ts(Day::Thu, 10, 0, 11, 15)], 1),
        ];
        let buckets = to_timeslot_groups(&secs, false);
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].sections.iter().map(|s| s.id).collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(buckets[1].sections[0].id, 2);
    }

    #[test]
    fn test_unscheduled_sections_policy() {
        let secs = vec![CandidateSection::new(1, vec![], 1), CandidateSection::new(2, vec![ts(Day::Fri, 8, 0, 9, 0)], 1)];
        assert_eq!(to_timeslot_groups(&secs, false).len(), 1);

        let with_empty = to_timeslot_groups(&secs, true);
        assert_eq!(with_empty.len(), 2);
        // la firma vacía ordena primero
        assert!(with_empty[0].signature.is_empty());
    }
}
