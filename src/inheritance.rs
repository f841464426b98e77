use crate::prelude::*;

/// Probability mass a parent hands down for a single allele.
///
/// `variant` is the mass of passing the variant allele on and `wild` the mass
/// of passing the other one. They sum to the parent's total mass, so a
/// normalized parent gives `wild == 1 - variant`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transmission {
    pub variant: f64,
    pub wild: f64,
}

impl Transmission {
    pub fn from_parent(gene: &GeneDistribution) -> Self {
        Self {
            variant: gene[2] + 0.5 * gene[1],
            wild: gene[0] + 0.5 * gene[1],
        }
    }
}

/// Probability that a parent with this distribution passes on the variant allele.
pub fn transmission_probability(gene: &GeneDistribution) -> f64 {
    Transmission::from_parent(gene).variant
}

/// Gene distribution of a child given both parents' distributions.
///
/// Each parent transmits one allele independently and the child's copy count
/// is their sum. No mutation is modelled. Parents without any mass (unknown
/// founders) yield a child without any mass.
pub fn offspring(father: &GeneDistribution, mother: &GeneDistribution) -> GeneDistribution {
    let f = Transmission::from_parent(father);
    let m = Transmission::from_parent(mother);
    GeneDistribution::new(
        f.wild * m.wild,
        f.variant * m.wild + f.wild * m.variant,
        f.variant * m.variant,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-12;

    fn assert_close(actual: &GeneDistribution, expected: [f64; 3]) {
        for copies in 0..3 {
            assert!(
                (actual[copies] - expected[copies]).abs() < TOLERANCE,
                "{:?} != {:?}",
                actual,
                expected
            );
        }
    }

    /// Child distribution when both parents' genotypes are certain.
    fn certain_parents(father: GeneCount, mother: GeneCount) -> [f64; 3] {
        match (father.max(mother), father.min(mother)) {
            (2, 2) => [0.0, 0.0, 1.0],
            (2, 1) => [0.0, 0.5, 0.5],
            (2, 0) => [0.0, 1.0, 0.0],
            (1, 1) => [0.25, 0.5, 0.25],
            (1, 0) => [0.5, 0.5, 0.0],
            _ => [1.0, 0.0, 0.0],
        }
    }

    #[test]
    fn test_transmission_probability() {
        assert_eq!(transmission_probability(&GeneDistribution::certain(2)), 1.0);
        assert_eq!(transmission_probability(&GeneDistribution::certain(1)), 0.5);
        assert_eq!(transmission_probability(&GeneDistribution::certain(0)), 0.0);
        assert_eq!(transmission_probability(&GeneDistribution::new(0.25, 0.5, 0.25)), 0.5);
        assert!((transmission_probability(&GeneDistribution::new(0.2, 0.4, 0.4)) - 0.6).abs() < TOLERANCE);
    }

    #[test]
    fn test_offspring_of_affected_and_unaffected() {
        let child = offspring(&GeneDistribution::certain(2), &GeneDistribution::certain(0));
        assert_eq!(child.as_array(), [0.0, 1.0, 0.0]);
        assert_eq!(child.trait_probability(), 0.0);
    }

    #[test]
    fn test_offspring_of_affected_and_carrier() {
        let child = offspring(&GeneDistribution::certain(2), &GeneDistribution::certain(1));
        assert_close(&child, [0.0, 0.5, 0.5]);
        assert_eq!(child.trait_probability(), 0.5);
    }

    #[test]
    fn test_offspring_of_two_carriers() {
        let carrier = GeneDistribution::certain(1);
        let child = offspring(&carrier, &carrier);
        assert_close(&child, [0.25, 0.5, 0.25]);
    }

    #[test]
    fn test_offspring_of_unknown_founders_has_no_mass() {
        let child = offspring(&GeneDistribution::zero(), &GeneDistribution::zero());
        assert_eq!(child, GeneDistribution::zero());
    }

    #[test]
    fn test_offspring_matches_certain_genotype_table() {
        for father in 0..3 {
            for mother in 0..3 {
                let child = offspring(&GeneDistribution::certain(father), &GeneDistribution::certain(mother));
                assert_close(&child, certain_parents(father, mother));
            }
        }
    }

    #[test]
    fn test_offspring_is_commutative_and_normalized() {
        let parents = [
            GeneDistribution::new(0.1, 0.6, 0.3),
            GeneDistribution::new(0.7, 0.2, 0.1),
            GeneDistribution::new(0.0, 0.5, 0.5),
        ];
        for father in parents.iter() {
            for mother in parents.iter() {
                let child = offspring(father, mother);
                assert_eq!(child, offspring(mother, father));
                assert!(child.is_normalized(1e-9));
                assert!((child.trait_probability()
                    - transmission_probability(father) * transmission_probability(mother))
                .abs()
                    < TOLERANCE);
            }
        }
    }
}
