// Expansión de esqueletos a horarios concretos.
//
// Cada esqueleto elige un bucket por grupo; los horarios concretos son el
// producto cartesiano de "qué sección dentro de cada bucket". Sin la regla de
// caminata el conteo es directamente el producto de los tamaños de bucket.
// Con la regla activa las salas importan, así que el producto se recorre con
// backtracking podando las elecciones que no dan tiempo para caminar.

use crate::algorithm::bucket::TimeslotGroup;
use crate::algorithm::conflict::check_walking;
use crate::algorithm::search::{SearchControl, Skeleton};
use crate::error::Result;
use crate::models::{CandidateSection, Timetable};

/// Cantidad de horarios concretos de un esqueleto (producto de tamaños).
pub fn skeleton_count(skeleton: &Skeleton, groups: &[Vec<TimeslotGroup>]) -> u64 {
    skeleton
        .iter()
        .enumerate()
        .fold(1u64, |acc, (g, &b)| acc.saturating_mul(groups[g][b].len() as u64))
}

struct Realizer<'a, F: FnMut(&[&'a CandidateSection]) -> Result<()>> {
    buckets: Vec<&'a TimeslotGroup>,
    walking: bool,
    control: &'a SearchControl,
    picked: Vec<&'a CandidateSection>,
    emit: F,
}

impl<'a, F: FnMut(&[&'a CandidateSection]) -> Result<()>> Realizer<'a, F> {
    fn run(&mut self) -> Result<()> {
        let depth = self.picked.len();
        if depth == self.buckets.len() {
            return (self.emit)(&self.picked[..]);
        }
        let bucket = self.buckets[depth];
        for section in &bucket.sections {
            self.control.tick()?;
            if self.walking {
                let placed = self.picked.iter().map(|p| p.timeslots.as_slice());
                if let Err(v) = check_walking(&section.timeslots, placed) {
                    log::trace!("sección {} descartada: {}", section.id, v);
                    continue;
                }
            }
            self.picked.push(section);
            let res = self.run();
            self.picked.pop();
            res?;
        }
        Ok(())
    }
}

fn realize_skeleton<'a, F>(
    skeleton: &Skeleton,
    groups: &'a [Vec<TimeslotGroup>],
    walking: bool,
    control: &'a SearchControl,
    emit: F,
) -> Result<()>
where
    F: FnMut(&[&'a CandidateSection]) -> Result<()>,
{
    let buckets: Vec<&'a TimeslotGroup> =
        skeleton.iter().enumerate().map(|(g, &b)| &groups[g][b]).collect();
    let mut r =
        Realizer { picked: Vec::with_capacity(buckets.len()), buckets, walking, control, emit };
    r.run()
}

/// Materializa todos los horarios concretos, en orden de esqueleto y, dentro
/// de cada esqueleto, con el grupo 0 como ciclo más externo.
pub fn realize_timetables(
    skeletons: &[Skeleton],
    groups: &[Vec<TimeslotGroup>],
    walking: bool,
    control: &SearchControl,
) -> Result<Vec<Timetable>> {
    let mut out = Vec::new();
    for sk in skeletons {
        realize_skeleton(sk, groups, walking, control, |picked| {
            out.push(Timetable { sections: picked.iter().map(|s| (*s).clone()).collect() });
            Ok(())
        })?;
    }
    Ok(out)
}

/// Cuenta los horarios concretos sin materializarlos. Coincide siempre con el
/// largo de `realize_timetables` para las mismas entradas.
pub fn count_timetables(
    skeletons: &[Skeleton],
    groups: &[Vec<TimeslotGroup>],
    walking: bool,
    control: &SearchControl,
) -> Result<u64> {
    if !walking {
        let total = skeletons
            .iter()
            .fold(0u64, |acc, sk| acc.saturating_add(skeleton_count(sk, groups)));
        return Ok(total);
    }
    let mut total = 0u64;
    for sk in skeletons {
        realize_skeleton(sk, groups, true, control, |_| {
            total = total.saturating_add(1);
            Ok(())
        })?;
    }
    Ok(total)
}
