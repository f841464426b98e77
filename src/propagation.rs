use crate::prelude::*;
use log::{debug, trace, warn};
use std::collections::{HashMap, HashSet};

/// Resolves the gene distribution of every individual in a pedigree.
///
/// Individuals with an observed trait are pinned to a certain genotype,
/// founders with nothing observed get the founder prior and everyone else is
/// derived from their parents.
#[derive(Debug, Clone, Default)]
pub struct Propagator {
    founder_prior: Option<GeneDistribution>,
}

impl Propagator {
    pub fn new() -> Self {
        Self {
            founder_prior: None,
        }
    }

    /// Distribution for founders whose trait is unknown.
    ///
    /// Without a prior such founders get `GeneDistribution::zero()`, which
    /// carries no mass and makes every descendant without an observed
    /// ancestor on both sides resolve to zero as well.
    pub fn founder_prior(&mut self, prior: GeneDistribution) -> &mut Self {
        self.founder_prior = Some(prior);
        self
    }

    /// Resolves every individual of `pedigree`.
    ///
    /// Each ancestor is derived at most once per call. Results are not kept
    /// between calls.
    pub fn resolve(&self, pedigree: &Pedigree) -> Result<Results> {
        let mut resolved: HashMap<&str, GeneDistribution> = HashMap::new();
        for id in pedigree.ids() {
            self.resolve_individual(pedigree, id, &mut resolved)?;
        }

        let results: Results = pedigree
            .ids()
            .map(|id| (id.to_string(), PersonResult::new(id, resolved[id])))
            .collect();

        debug!(
            "Resolved {} individuals, {} derived from parents",
            results.len(),
            pedigree
                .iter()
                .filter(|x| !x.observed().is_known() && !x.is_founder())
                .count()
        );
        Ok(results)
    }

    /// Resolves `id` and any unresolved ancestors into `resolved`.
    ///
    /// Walks the ancestry with an explicit stack so deep pedigrees cannot
    /// exhaust the call stack. A frame is visited twice: once to queue its
    /// parents and once to combine them.
    fn resolve_individual<'p>(
        &self,
        pedigree: &'p Pedigree,
        id: &'p str,
        resolved: &mut HashMap<&'p str, GeneDistribution>,
    ) -> Result<()> {
        let mut stack: Vec<(&'p str, bool)> = vec![(id, false)];
        let mut on_path: HashSet<&'p str> = HashSet::new();

        while let Some((current, parents_ready)) = stack.pop() {
            if resolved.contains_key(current) {
                continue;
            }

            // Present in the pedigree: roots come from it and parents are
            // checked before they are queued.
            let individual = match pedigree.get(current) {
                Some(individual) => individual,
                None => {
                    return Err(Error::UnresolvedAncestry {
                        id: id.into(),
                        parent: current.into(),
                    })
                }
            };

            if let Some(gene) = GeneDistribution::observed(individual.observed()) {
                trace!("{}: observed {:?}", current, individual.observed());
                resolved.insert(current, gene);
                continue;
            }

            let parents = match individual.parents() {
                Some(parents) => parents,
                None => {
                    let gene = match self.founder_prior {
                        Some(prior) => prior,
                        None => {
                            warn!("{}: founder with unknown trait, no probability mass assigned", current);
                            GeneDistribution::zero()
                        }
                    };
                    resolved.insert(current, gene);
                    continue;
                }
            };

            if parents_ready {
                let father = resolved[parents.father()];
                let mother = resolved[parents.mother()];
                let gene = offspring(&father, &mother);
                trace!("{}: derived {:?} from {} and {}", current, gene, parents.father(), parents.mother());
                resolved.insert(current, gene);
                on_path.remove(current);
                continue;
            }

            if !on_path.insert(current) {
                return Err(Error::CyclicAncestry { id: current.into() });
            }
            stack.push((current, true));
            for parent in [parents.father(), parents.mother()] {
                if !pedigree.contains(parent) {
                    return Err(Error::UnresolvedAncestry {
                        id: current.into(),
                        parent: parent.into(),
                    });
                }
                if !resolved.contains_key(parent) {
                    stack.push((parent, false));
                }
            }
        }
        Ok(())
    }
}

pub trait Propagate {
    fn resolve(&self) -> Result<Results>;
}

impl Propagate for Pedigree {
    fn resolve(&self) -> Result<Results> {
        Propagator::new().resolve(self)
    }
}

/// Resolves every individual of `pedigree` with the default `Propagator`.
pub fn resolve(pedigree: &Pedigree) -> Result<Results> {
    Propagator::new().resolve(pedigree)
}
