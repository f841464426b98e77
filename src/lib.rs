#![crate_name = "heredity"]
use log::debug;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::ops::Index;

pub mod prelude;

pub mod cli;
pub mod error;
pub mod inheritance;
pub mod observable;
pub mod propagation;
pub mod report;

pub use error::{Error, Result};
pub use propagation::resolve;

pub type Individuals = HashMap<String, Individual>;
pub type Results = BTreeMap<String, PersonResult>;
pub type GeneCount = usize;

/// Matrix views of a resolved pedigree.
///
/// Rows follow the id order of `Results`.
pub trait ResultsExt {
    /// Gene-count probabilities, one row per individual and one column
    /// per copy count (0, 1, 2).
    fn gene_matrix(&self) -> Result<ndarray::Array2<f64>>;

    /// Trait probability of every individual.
    fn trait_vector(&self) -> ndarray::Array1<f64>;

    /// Expected number of individuals expressing the trait.
    fn expected_affected(&self) -> f64;
}

impl ResultsExt for Results {
    fn gene_matrix(&self) -> Result<ndarray::Array2<f64>> {
        let data = self
            .values()
            .flat_map(|result| result.gene().as_array().to_vec())
            .collect::<Vec<_>>();
        Ok(ndarray::Array2::from_shape_vec((self.len(), 3), data)?)
    }

    fn trait_vector(&self) -> ndarray::Array1<f64> {
        ndarray::Array1::from(
            self.values()
                .map(|result| result.trait_probability())
                .collect::<Vec<_>>(),
        )
    }

    fn expected_affected(&self) -> f64 {
        self.trait_vector().sum()
    }
}

/// What is known about an individual's trait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObservedTrait {
    Present,
    Absent,
    Unknown,
}

impl ObservedTrait {
    /// Parses the literal flags used by pedigree files: `"1"`, `"0"` or empty.
    pub fn from_flag(flag: &str) -> Option<Self> {
        match flag {
            "1" => Some(Self::Present),
            "0" => Some(Self::Absent),
            "" => Some(Self::Unknown),
            _ => None,
        }
    }

    pub fn is_known(&self) -> bool {
        *self != Self::Unknown
    }
}

impl From<Option<bool>> for ObservedTrait {
    fn from(flag: Option<bool>) -> Self {
        match flag {
            Some(true) => Self::Present,
            Some(false) => Self::Absent,
            None => Self::Unknown,
        }
    }
}

/// Both recorded parents of a non-founder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parents {
    mother: String,
    father: String,
}

impl Parents {
    pub fn new(mother: &str, father: &str) -> Self {
        Self {
            mother: mother.into(),
            father: father.into(),
        }
    }

    pub fn mother(&self) -> &str {
        &self.mother
    }

    pub fn father(&self) -> &str {
        &self.father
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Individual {
    id: String,
    parents: Option<Parents>,
    observed: ObservedTrait,
}

impl Individual {
    /// An individual with no recorded parents.
    pub fn founder(id: &str, observed: ObservedTrait) -> Self {
        Self {
            id: id.into(),
            parents: None,
            observed,
        }
    }

    pub fn child(id: &str, mother: &str, father: &str, observed: ObservedTrait) -> Self {
        Self {
            id: id.into(),
            parents: Some(Parents::new(mother, father)),
            observed,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn parents(&self) -> Option<&Parents> {
        self.parents.as_ref()
    }

    pub fn observed(&self) -> ObservedTrait {
        self.observed
    }

    pub fn is_founder(&self) -> bool {
        self.parents.is_none()
    }
}

/// One unvalidated row of pedigree input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub name: String,
    pub mother: Option<String>,
    pub father: Option<String>,
    pub trait_flag: Option<bool>,
}

impl RawRecord {
    pub fn new(name: &str, mother: Option<&str>, father: Option<&str>, trait_flag: Option<bool>) -> Self {
        Self {
            name: name.into(),
            mother: mother.map(String::from),
            father: father.map(String::from),
            trait_flag,
        }
    }
}

/// The members of a family and their parent links.
///
/// Iteration follows insertion order, which is the order records were read in.
#[derive(Debug, Clone, Default)]
pub struct Pedigree {
    individuals: Individuals,
    order: Vec<String>,
}

impl Pedigree {
    /// Constructs a new empty `Pedigree`
    ///
    /// Individuals added with `insert()` are not validated; use
    /// `from_records()` to build a checked pedigree.
    pub fn new() -> Self {
        Self {
            individuals: Individuals::new(),
            order: vec![],
        }
    }

    /// Builds a pedigree from raw records.
    ///
    /// Every record must carry both parents or neither, and every parent
    /// must itself appear somewhere in `records`. Names must be non-empty
    /// and unique: a repeated name is an error instead of the later record
    /// silently replacing the earlier one. Cycles are not detected here.
    pub fn from_records<I>(records: I) -> Result<Self>
    where
        I: IntoIterator<Item = RawRecord>,
    {
        let records: Vec<RawRecord> = records.into_iter().collect();

        let mut names = HashSet::new();
        for record in records.iter() {
            if record.name.is_empty() {
                return Err(malformed(&record.name, "name is empty"));
            }
            if !names.insert(record.name.as_str()) {
                return Err(malformed(&record.name, "name appears more than once"));
            }
        }

        let mut pedigree = Self::new();
        for record in records.iter() {
            let observed = ObservedTrait::from(record.trait_flag);
            let individual = match (&record.mother, &record.father) {
                (None, None) => Individual::founder(&record.name, observed),
                (Some(mother), Some(father)) => {
                    for parent in [mother, father] {
                        if !names.contains(parent.as_str()) {
                            return Err(malformed(
                                &record.name,
                                &format!("parent '{}' is not in the pedigree", parent),
                            ));
                        }
                    }
                    Individual::child(&record.name, mother, father, observed)
                }
                _ => {
                    return Err(malformed(
                        &record.name,
                        "exactly one of mother and father is recorded",
                    ));
                }
            };
            pedigree.insert(individual);
        }

        debug!(
            "Built pedigree of {} individuals ({} founders)",
            pedigree.len(),
            pedigree.iter().filter(|x| x.is_founder()).count()
        );
        Ok(pedigree)
    }

    /// Adds an individual, replacing any previous one with the same id.
    pub fn insert(&mut self, individual: Individual) -> Option<Individual> {
        let id = individual.id.clone();
        let previous = self.individuals.insert(id.clone(), individual);
        if previous.is_none() {
            self.order.push(id);
        }
        previous
    }

    pub fn get(&self, id: &str) -> Option<&Individual> {
        self.individuals.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.individuals.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Individuals in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Individual> + '_ {
        self.order.iter().map(move |id| &self.individuals[id])
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.order.iter().map(|id| id.as_str())
    }
}

fn malformed(id: &str, reason: &str) -> Error {
    Error::MalformedRecord {
        id: id.into(),
        reason: reason.into(),
    }
}

/// Builds a checked `Pedigree` from raw records.
pub fn build_pedigree<I>(records: I) -> Result<Pedigree>
where
    I: IntoIterator<Item = RawRecord>,
{
    Pedigree::from_records(records)
}

/// Probability of carrying 0, 1 or 2 copies of the variant allele.
///
/// Resolved distributions sum to 1, except those derived from founders whose
/// trait is unknown, which carry no mass at all.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeneDistribution([f64; 3]);

impl GeneDistribution {
    pub fn new(zero: f64, one: f64, two: f64) -> Self {
        Self([zero, one, two])
    }

    /// All mass on a single copy count.
    ///
    /// # Panics
    /// Panics if `copies` is greater than 2.
    pub fn certain(copies: GeneCount) -> Self {
        let mut probabilities = [0.0; 3];
        probabilities[copies] = 1.0;
        Self(probabilities)
    }

    /// The empty distribution given to founders with nothing observed.
    pub fn zero() -> Self {
        Self([0.0; 3])
    }

    /// The degenerate distribution implied by an observation, if any.
    ///
    /// Expressing the trait means two copies, not expressing it means none.
    pub fn observed(observed: ObservedTrait) -> Option<Self> {
        match observed {
            ObservedTrait::Present => Some(Self::certain(2)),
            ObservedTrait::Absent => Some(Self::certain(0)),
            ObservedTrait::Unknown => None,
        }
    }

    pub fn probability(&self, copies: GeneCount) -> f64 {
        self.0[copies]
    }

    pub fn as_array(&self) -> [f64; 3] {
        self.0
    }

    pub fn total(&self) -> f64 {
        self.0.iter().sum()
    }

    pub fn is_normalized(&self, tolerance: f64) -> bool {
        self.0.iter().all(|p| *p >= 0.0) && (self.total() - 1.0).abs() <= tolerance
    }

    /// The trait is expressed exactly when two copies are carried.
    pub fn trait_probability(&self) -> f64 {
        self.0[2]
    }
}

impl Index<GeneCount> for GeneDistribution {
    type Output = f64;

    fn index(&self, copies: GeneCount) -> &f64 {
        &self.0[copies]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PersonResult {
    id: String,
    gene: GeneDistribution,
    trait_probability: f64,
}

impl PersonResult {
    pub fn new(id: &str, gene: GeneDistribution) -> Self {
        Self {
            id: id.into(),
            gene,
            trait_probability: gene.trait_probability(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn gene(&self) -> &GeneDistribution {
        &self.gene
    }

    pub fn trait_probability(&self) -> f64 {
        self.trait_probability
    }
}
