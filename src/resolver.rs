// Colaborador que materializa secciones a partir de ids.
//
// El generador nunca consulta datos por su cuenta: recibe todo lo que necesita
// en una sola llamada `resolve(groups)` antes de empezar la búsqueda.

use std::collections::{BTreeSet, HashMap};

use crate::error::ResolveError;
use crate::models::{CandidateSection, SectionId};

/// Secciones resueltas por grupo, en el orden de los grupos.
pub type ResolveResult = Result<Vec<Vec<CandidateSection>>, ResolveError>;

/// Resolución por lotes: ids agrupados -> secciones con sus reuniones y cupos.
pub trait SectionResolver {
    /// Devuelve, para cada grupo, sus secciones en el mismo orden de grupos.
    /// Los ids repetidos dentro de un grupo se colapsan.
    fn resolve(&self, groups: &[Vec<SectionId>]) -> ResolveResult;
}

/// Catálogo en memoria indexado por id de sección.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    sections: HashMap<SectionId, CandidateSection>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, section: CandidateSection) -> Option<CandidateSection> {
        self.sections.insert(section.id, section)
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn get(&self, id: SectionId) -> Option<&CandidateSection> {
        self.sections.get(&id)
    }

    /// Carga un arreglo JSON de secciones. Un id duplicado es un error de catálogo.
    pub fn from_json_value(value: serde_json::Value) -> Result<Self, ResolveError> {
        let list: Vec<CandidateSection> = serde_json::from_value(value)
            .map_err(|e| ResolveError::Catalog(format!("invalid catalog: {}", e)))?;
        list.into_iter().try_fold(Self::new(), |mut cat, s| {
            let id = s.id;
            match cat.insert(s) {
                Some(_) => Err(ResolveError::Catalog(format!("duplicate section id {}", id))),
                None => Ok(cat),
            }
        })
    }
}

impl FromIterator<CandidateSection> for InMemoryCatalog {
    fn from_iter<I: IntoIterator<Item = CandidateSection>>(iter: I) -> Self {
        let mut cat = InMemoryCatalog::new();
        for s in iter {
            cat.insert(s);
        }
        cat
    }
}

impl SectionResolver for InMemoryCatalog {
    fn resolve(&self, groups: &[Vec<SectionId>]) -> ResolveResult {
        groups
            .iter()
            .map(|ids| {
                // BTreeSet: deduplica y deja el grupo ordenado por id
                let unique: BTreeSet<SectionId> = ids.iter().copied().collect();
                unique
                    .into_iter()
                    .map(|id| self.sections.get(&id).cloned().ok_or(ResolveError::NotFound(id)))
                    .collect()
            })
            .collect()
    }
}

/// Permite usar una clausura como resolver (útil para mocks en tests).
impl<F> SectionResolver for F
where
    F: Fn(&[Vec<SectionId>]) -> ResolveResult,
{
    fn resolve(&self, groups: &[Vec<SectionId>]) -> ResolveResult {
        self(groups)
    }
}
