/// Filtros sobre buckets (antes de buscar) y sobre horarios completos
/// (después de buscar).
///
/// Los filtros previos reducen el espacio de búsqueda sacando secciones que
/// el estudiante no quiere ver. Los posteriores necesitan ver el horario
/// entero, por eso no pueden ser restricciones por inserción.
use chrono::NaiveTime;

use crate::algorithm::bucket::TimeslotGroup;
use crate::algorithm::search::Skeleton;
use crate::api_json::Options;
use crate::models::SlotKey;

/// Saca las secciones sin cupos (`open_seats <= 0`). Los buckets que quedan
/// vacíos desaparecen.
pub fn exclude_not_opened_sections(groups: &mut [Vec<TimeslotGroup>]) {
    for group in groups.iter_mut() {
        for bucket in group.iter_mut() {
            bucket.sections.retain(|s| s.has_open_seats());
        }
        group.retain(|b| !b.is_empty());
    }
}

/// Saca los buckets con alguna reunión que empieza antes de `min_start`.
/// Todas las reuniones deben empezar a esa hora o después.
pub fn exclude_early_classes(groups: &mut [Vec<TimeslotGroup>], min_start: NaiveTime) {
    for group in groups.iter_mut() {
        group.retain(|b| b.slots().iter().all(|k| k.start >= min_start));
    }
}

/// Aplica los filtros previos activos según las opciones.
pub fn apply_pre_filters(groups: &mut [Vec<TimeslotGroup>], options: &Options) {
    if options.allow_only_open_section {
        exclude_not_opened_sections(groups);
    }
    if let Some(min_start) = options.minimum_start_time {
        exclude_early_classes(groups, min_start);
    }
}

/// Clases por día (lunes..domingo) de un conjunto de franjas.
pub fn classes_per_day<'a, I>(slots: I) -> [usize; 7]
where
    I: IntoIterator<Item = &'a SlotKey>,
{
    let mut per_day = [0usize; 7];
    for k in slots {
        per_day[k.day.index()] += 1;
    }
    per_day
}

/// True si algún día tiene dos o más clases. Un horario donde cada día con
/// clases tiene exactamente una (o que no tiene clases) no cumple.
pub fn has_day_with_multiple_classes<'a, I>(slots: I) -> bool
where
    I: IntoIterator<Item = &'a SlotKey>,
{
    classes_per_day(slots).iter().any(|&n| n >= 2)
}

/// Franjas de un esqueleto: la unión de las firmas de los buckets elegidos.
pub fn skeleton_slots<'a>(
    skeleton: &'a Skeleton,
    groups: &'a [Vec<TimeslotGroup>],
) -> impl Iterator<Item = &'a SlotKey> + 'a {
    skeleton.iter().enumerate().flat_map(move |(g, &b)| groups[g][b].slots().iter())
}

/// Descarta los esqueletos con "una clase por día" (ver
/// [`has_day_with_multiple_classes`]). No depende de qué sección concreta se
/// elija dentro de cada bucket, así que se evalúa antes de expandir.
pub fn exclude_one_class_a_day_tables(
    skeletons: Vec<Skeleton>,
    groups: &[Vec<TimeslotGroup>],
) -> Vec<Skeleton> {
    skeletons
        .into_iter()
        .filter(|sk| has_day_with_multiple_classes(skeleton_slots(sk, groups)))
        .collect()
}

/// Aplica los filtros posteriores activos según las opciones.
pub fn apply_post_filters(
    skeletons: Vec<Skeleton>,
    groups: &[Vec<TimeslotGroup>],
    options: &Options,
) -> Vec<Skeleton> {
    if options.allow_one_class_a_day {
        return skeletons;
    }
    let before = skeletons.len();
    let kept = exclude_one_class_a_day_tables(skeletons, groups);
    log::debug!("filtro una-clase-por-día: {} -> {} esqueletos", before, kept.len());
    kept
}
