use crate::prelude::*;
use std::io::Write;

/// Writes gene and trait probabilities for every individual, in pedigree order.
///
/// Copy counts are listed from 2 down to 0. Every individual of `pedigree`
/// must have a result.
pub fn write_report<W: Write>(pedigree: &Pedigree, results: &Results, writer: &mut W) -> Result<()> {
    for id in pedigree.ids() {
        let result = match results.get(id) {
            Some(result) => result,
            None => return Err(Error::MissingResult { id: id.into() }),
        };
        writeln!(writer, "{}:", id)?;
        writeln!(writer, "  Gene:")?;
        for copies in (0..3).rev() {
            writeln!(writer, "    {}: {:.4}", copies, result.gene()[copies])?;
        }
        writeln!(writer, "  Trait: {:.4}", result.trait_probability())?;
    }
    Ok(())
}
