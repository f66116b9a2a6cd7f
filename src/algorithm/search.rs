//! Búsqueda por backtracking de esqueletos de horario.
//!
//! Un esqueleto elige un bucket (no una sección) por grupo. La búsqueda
//! recorre los grupos en orden fijo; en la profundidad `d` prueba cada bucket
//! del grupo `d` en su orden de enumeración y sólo baja si el bucket es
//! insertable contra todo lo ya comprometido. Los esqueletos salen en orden
//! lexicográfico (el grupo 0 es el ciclo más externo), también cuando las
//! ramas del grupo 0 se exploran en paralelo.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use crate::algorithm::bucket::TimeslotGroup;
use crate::algorithm::conflict::ConstraintSet;
use crate::error::{GeneratorError, Result};
use crate::models::SlotKey;

/// Índice de bucket elegido por cada grupo.
pub type Skeleton = Vec<usize>;

/// Cada cuántos nodos se consulta el reloj para el deadline.
const DEADLINE_CHECK_EVERY: u64 = 256;

/// Token de cancelación compartible entre hilos.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Estado de control compartido por todos los hilos de una búsqueda.
#[derive(Debug)]
pub struct SearchControl {
    cancel: CancelToken,
    deadline: Option<Instant>,
    explored: AtomicU64,
    aborted: AtomicBool,
}

impl SearchControl {
    pub fn new(cancel: CancelToken, deadline: Option<Instant>) -> Self {
        SearchControl {
            cancel,
            deadline,
            explored: AtomicU64::new(0),
            aborted: AtomicBool::new(false),
        }
    }

    pub fn unbounded() -> Self {
        Self::new(CancelToken::new(), None)
    }

    pub fn explored(&self) -> u64 {
        self.explored.load(Ordering::Relaxed)
    }

    /// Cuenta un nodo y devuelve error si la búsqueda debe detenerse.
    pub fn tick(&self) -> Result<()> {
        let n = self.explored.fetch_add(1, Ordering::Relaxed) + 1;
        if self.aborted.load(Ordering::Relaxed) || self.cancel.is_cancelled() {
            return Err(self.abort());
        }
        if let Some(deadline) = self.deadline {
            if (n == 1 || n % DEADLINE_CHECK_EVERY == 0) && Instant::now() >= deadline {
                return Err(self.abort());
            }
        }
        Ok(())
    }

    fn abort(&self) -> GeneratorError {
        self.aborted.store(true, Ordering::Relaxed);
        GeneratorError::SearchAborted { explored: self.explored() }
    }
}

/// Resultado de una búsqueda completa.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome {
    pub skeletons: Vec<Skeleton>,
    pub explored: u64,
}

struct Backtracker<'a> {
    groups: &'a [Vec<TimeslotGroup>],
    constraints: &'a ConstraintSet,
    control: &'a SearchControl,
    chosen: Skeleton,
    committed: Vec<&'a [SlotKey]>,
    out: Vec<Skeleton>,
}

impl<'a> Backtracker<'a> {
    fn new(
        groups: &'a [Vec<TimeslotGroup>],
        constraints: &'a ConstraintSet,
        control: &'a SearchControl,
    ) -> Self {
        Backtracker {
            groups,
            constraints,
            control,
            chosen: Vec::with_capacity(groups.len()),
            committed: Vec::with_capacity(groups.len()),
            out: Vec::new(),
        }
    }

    /// Intenta poner el bucket `b` del grupo actual y seguir bajando.
    fn try_bucket(&mut self, b: usize) -> Result<()> {
        self.control.tick()?;
        let depth = self.chosen.len();
        let groups = self.groups;
        let bucket: &'a TimeslotGroup = &groups[depth][b];
        if let Err(v) = self.constraints.check(bucket.slots(), &self.committed) {
            log::trace!("grupo {} bucket {} rechazado: {}", depth, b, v);
            return Ok(());
        }

        self.chosen.push(b);
        self.committed.push(bucket.slots());
        let res = self.descend();
        self.committed.pop();
        self.chosen.pop();
        res
    }

    fn descend(&mut self) -> Result<()> {
        let depth = self.chosen.len();
        debug_assert_eq!(depth, self.committed.len());
        if depth == self.groups.len() {
            self.out.push(self.chosen.clone());
            return Ok(());
        }
        for b in 0..self.groups[depth].len() {
            self.try_bucket(b)?;
        }
        Ok(())
    }
}

/// Explora sólo la rama `branch` del grupo 0.
fn explore_branch(
    groups: &[Vec<TimeslotGroup>],
    constraints: &ConstraintSet,
    control: &SearchControl,
    branch: usize,
) -> Result<Vec<Skeleton>> {
    let mut bt = Backtracker::new(groups, constraints, control);
    bt.try_bucket(branch)?;
    Ok(bt.out)
}

/// Enumera todos los esqueletos válidos.
///
/// Con `threads > 1` y al menos dos buckets en el grupo 0, cada rama del
/// grupo 0 es una unidad de trabajo independiente; los resultados se
/// etiquetan con el índice de rama y se concatenan en ese orden.
pub fn search(
    groups: &[Vec<TimeslotGroup>],
    constraints: &ConstraintSet,
    control: &SearchControl,
    threads: usize,
) -> Result<SearchOutcome> {
    if groups.is_empty() {
        // sin grupos hay exactamente un horario: el vacío
        return Ok(SearchOutcome { skeletons: vec![Vec::new()], explored: 0 });
    }

    let branches = groups[0].len();
    let workers = threads.min(branches);

    let skeletons = if workers <= 1 {
        let mut bt = Backtracker::new(groups, constraints, control);
        bt.descend()?;
        bt.out
    } else {
        log::debug!("explorando {} ramas del grupo 0 con {} hilos", branches, workers);
        let next = AtomicUsize::new(0);
        let mut tagged: Vec<(usize, Result<Vec<Skeleton>>)> = Vec::with_capacity(branches);

        thread::scope(|s| {
            let handles: Vec<_> = (0..workers)
                .map(|_| {
                    s.spawn(|| {
                        let mut part = Vec::new();
                        loop {
                            let b = next.fetch_add(1, Ordering::Relaxed);
                            if b >= branches {
                                break;
                            }
                            let r = explore_branch(groups, constraints, control, b);
                            let stop = r.is_err();
                            part.push((b, r));
                            if stop {
                                break;
                            }
                        }
                        part
                    })
                })
                .collect();
            for h in handles {
                match h.join() {
                    Ok(part) => tagged.extend(part),
                    Err(panic) => std::panic::resume_unwind(panic),
                }
            }
        });

        tagged.sort_by_key(|(b, _)| *b);
        let mut all = Vec::new();
        for (_, r) in tagged {
            all.extend(r?);
        }
        all
    };

    Ok(SearchOutcome { skeletons, explored: control.explored() })
}
