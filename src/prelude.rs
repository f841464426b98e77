pub use crate::error::{Error, Result};
pub use crate::inheritance::{offspring, transmission_probability};
pub use crate::observable::{load_pedigree, CsvBuilder};
pub use crate::propagation::{resolve, Propagate, Propagator};
pub use crate::{
    build_pedigree, GeneCount, GeneDistribution, Individual, ObservedTrait, Parents, Pedigree,
    PersonResult, RawRecord, Results, ResultsExt,
};
