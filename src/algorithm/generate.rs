// generate.rs - Orquestador del generador de horarios
//
// Pipeline:
// PHASE 1: resolve
//   - Pedir al resolver las secciones de todos los grupos en una sola llamada
// PHASE 2: bucketing + filtros previos
//   - Agrupar cada grupo por firma horaria
//   - Sacar secciones sin cupo / buckets que empiezan antes de la hora mínima
// PHASE 3: search
//   - Backtracking sobre buckets con las restricciones por inserción
//   - Filtro "una clase por día" sobre los esqueletos
// PHASE 4: expand / count
//   - Producto cartesiano dentro de cada bucket (con poda por caminata si aplica)

use std::time::Instant;

use serde_json::Value;

use crate::algorithm::bucket::{bucket_groups, TimeslotGroup};
use crate::algorithm::conflict::ConstraintSet;
use crate::algorithm::expand::{count_timetables as count_expanded, realize_timetables};
use crate::algorithm::filters::{apply_post_filters, apply_pre_filters};
use crate::algorithm::search::{search, CancelToken, SearchControl, Skeleton};
use crate::api_json::{parse_generate_request, GenerateRequest, Options};
use crate::config::GeneratorConfig;
use crate::error::Result;
use crate::models::{CandidateSection, Timetable};
use crate::resolver::SectionResolver;

/// Esqueletos válidos junto con los buckets sobre los que se definen.
struct Prepared {
    groups: Vec<Vec<TimeslotGroup>>,
    skeletons: Vec<Skeleton>,
}

fn prepare(
    groups: Vec<Vec<CandidateSection>>,
    options: &Options,
    config: &GeneratorConfig,
    control: &SearchControl,
) -> Result<Prepared> {
    log::info!("📋 PHASE 2: bucketing + filtros previos");
    let mut buckets = bucket_groups(&groups, config.include_unscheduled_sections);
    let total_sections: usize = groups.iter().map(Vec::len).sum();
    let total_buckets: usize = buckets.iter().map(Vec::len).sum();
    log::info!(
        "   ✓ {} secciones en {} grupos -> {} buckets",
        total_sections,
        groups.len(),
        total_buckets
    );

    apply_pre_filters(&mut buckets, options);
    if let Some(g) = buckets.iter().position(Vec::is_empty) {
        log::warn!("   ⚠️  grupo {} sin opciones tras los filtros: no hay horarios", g);
    }

    log::info!("📋 PHASE 3: search (hilos={})", config.threads);
    let constraints = ConstraintSet::from_options(options);
    let outcome = search(&buckets, &constraints, control, config.threads)?;
    log::info!(
        "   ✓ {} esqueletos ({} nodos explorados)",
        outcome.skeletons.len(),
        outcome.explored
    );

    let skeletons = apply_post_filters(outcome.skeletons, &buckets, options);
    Ok(Prepared { groups: buckets, skeletons })
}

fn control_for(config: &GeneratorConfig, cancel: CancelToken) -> SearchControl {
    let deadline = config.deadline.map(|d| Instant::now() + d);
    SearchControl::new(cancel, deadline)
}

fn run_generate(
    groups: Vec<Vec<CandidateSection>>,
    options: &Options,
    config: &GeneratorConfig,
    cancel: CancelToken,
) -> Result<Vec<Timetable>> {
    let control = control_for(config, cancel);
    let prepared = prepare(groups, options, config, &control)?;

    log::info!("📋 PHASE 4: expand");
    let walking = options.walking_rule_active();
    let tables = realize_timetables(&prepared.skeletons, &prepared.groups, walking, &control)?;
    log::info!("✅ {} horarios generados", tables.len());
    Ok(tables)
}

fn run_count(
    groups: Vec<Vec<CandidateSection>>,
    options: &Options,
    config: &GeneratorConfig,
    cancel: CancelToken,
) -> Result<u64> {
    let control = control_for(config, cancel);
    let prepared = prepare(groups, options, config, &control)?;

    log::info!("📋 PHASE 4: count");
    let walking = options.walking_rule_active();
    let n = count_expanded(&prepared.skeletons, &prepared.groups, walking, &control)?;
    log::info!("✅ {} horarios posibles", n);
    Ok(n)
}

/// Genera todos los horarios a partir de secciones ya materializadas.
pub fn generate_timetables(
    groups: Vec<Vec<CandidateSection>>,
    options: &Options,
    config: &GeneratorConfig,
) -> Result<Vec<Timetable>> {
    run_generate(groups, options, config, CancelToken::new())
}

/// Cuenta los horarios que `generate_timetables` produciría con las mismas entradas.
pub fn count_timetables(
    groups: Vec<Vec<CandidateSection>>,
    options: &Options,
    config: &GeneratorConfig,
) -> Result<u64> {
    run_count(groups, options, config, CancelToken::new())
}

/// Generador completo: resolver de secciones + configuración de proceso.
///
/// ```ignore
/// let generator = TimetableGenerator::new(catalog, GeneratorConfig::from_env()?);
/// let tables = generator.generate_json(&body)?;
/// ```
pub struct TimetableGenerator<R: SectionResolver> {
    resolver: R,
    config: GeneratorConfig,
    cancel: CancelToken,
}

impl<R: SectionResolver> TimetableGenerator<R> {
    pub fn new(resolver: R, config: GeneratorConfig) -> Self {
        TimetableGenerator { resolver, config, cancel: CancelToken::new() }
    }

    /// Usa un token externo; cancelarlo aborta la búsqueda en curso.
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    fn resolve(&self, request: &GenerateRequest) -> Result<Vec<Vec<CandidateSection>>> {
        log::info!("📋 PHASE 1: resolve ({} grupos)", request.groups.len());
        let groups = self.resolver.resolve(&request.groups)?;
        log::info!("   ✓ secciones resueltas");
        Ok(groups)
    }

    pub fn generate(&self, request: &GenerateRequest) -> Result<Vec<Timetable>> {
        let groups = self.resolve(request)?;
        run_generate(groups, &request.options, &self.config, self.cancel.clone())
    }

    pub fn count(&self, request: &GenerateRequest) -> Result<u64> {
        let groups = self.resolve(request)?;
        run_count(groups, &request.options, &self.config, self.cancel.clone())
    }

    /// Valida `{groups, options}` y genera.
    pub fn generate_json(&self, body: &Value) -> Result<Vec<Timetable>> {
        let request = parse_generate_request(body)?;
        self.generate(&request)
    }

    pub fn count_json(&self, body: &Value) -> Result<u64> {
        let request = parse_generate_request(body)?;
        self.count(&request)
    }
}
