use crate::prelude::*;
use log::debug;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Column positions of the four pedigree fields.
#[derive(Debug, Clone, Copy)]
struct Columns {
    name: usize,
    mother: usize,
    father: usize,
    trait_flag: usize,
}

/// Produces `RawRecord`s from delimited pedigree data
///
/// `Csv` implements Iterator so it can be passed
/// directly to `build_pedigree()` after collecting.
pub struct Csv {
    records: std::iter::Enumerate<csv::StringRecordsIntoIter<Box<dyn Read>>>,
    columns: Columns,
}

impl Csv {
    fn new(records: csv::StringRecordsIntoIter<Box<dyn Read>>, columns: Columns) -> Self {
        Self {
            records: records.into_iter().enumerate(),
            columns,
        }
    }

    fn to_record(&self, idx: usize, row: &csv::StringRecord) -> Result<RawRecord> {
        let field = move |i: usize| row.get(i).unwrap_or("");
        let name = field(self.columns.name);
        let optional = |value: &str| {
            if value.is_empty() {
                None
            } else {
                Some(value.to_string())
            }
        };

        let flag = field(self.columns.trait_flag);
        let trait_flag = match ObservedTrait::from_flag(flag) {
            Some(ObservedTrait::Present) => Some(true),
            Some(ObservedTrait::Absent) => Some(false),
            Some(ObservedTrait::Unknown) => None,
            None => {
                return Err(Error::MalformedRecord {
                    id: if name.is_empty() { format!("row {}", idx + 1) } else { name.into() },
                    reason: format!("trait must be '1', '0' or empty, found '{}'", flag),
                });
            }
        };

        Ok(RawRecord {
            name: name.into(),
            mother: optional(field(self.columns.mother)),
            father: optional(field(self.columns.father)),
            trait_flag,
        })
    }
}

impl Iterator for Csv {
    type Item = Result<RawRecord>;

    fn next(&mut self) -> Option<Result<RawRecord>> {
        match self.records.next()? {
            (idx, Ok(row)) => Some(self.to_record(idx, &row)),
            (_, Err(e)) => Some(Err(e.into())),
        }
    }
}

pub struct CsvBuilder {
    delimiter: u8,
    trim: bool,
    name_field: String,
    mother_field: String,
    father_field: String,
    trait_field: String,
}

impl CsvBuilder {
    /// Construct a new Csv builder
    ///
    /// Defaults to comma separated data with the columns
    /// `name`, `mother`, `father` and `trait`.
    pub fn new() -> Self {
        Self {
            delimiter: b',',
            trim: true,
            name_field: "name".to_owned(),
            mother_field: "mother".to_owned(),
            father_field: "father".to_owned(),
            trait_field: "trait".to_owned(),
        }
    }

    pub fn delimiter(&mut self, delimiter: u8) -> &mut Self {
        self.delimiter = delimiter;
        self
    }

    pub fn trim(&mut self, trim: bool) -> &mut Self {
        self.trim = trim;
        self
    }

    pub fn name_field(&mut self, name_field: &str) -> &mut Self {
        self.name_field = name_field.to_owned();
        self
    }

    pub fn mother_field(&mut self, mother_field: &str) -> &mut Self {
        self.mother_field = mother_field.to_owned();
        self
    }

    pub fn father_field(&mut self, father_field: &str) -> &mut Self {
        self.father_field = father_field.to_owned();
        self
    }

    pub fn trait_field(&mut self, trait_field: &str) -> &mut Self {
        self.trait_field = trait_field.to_owned();
        self
    }

    pub fn from_reader(&self, reader: Box<dyn Read>) -> Result<Csv> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .delimiter(self.delimiter)
            .trim(if self.trim { csv::Trim::All } else { csv::Trim::None })
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        let position = |field: &str| {
            headers
                .iter()
                .position(|h| h == field)
                .ok_or_else(|| Error::MalformedRecord {
                    id: "header".into(),
                    reason: format!("missing '{}' column", field),
                })
        };
        let columns = Columns {
            name: position(&self.name_field)?,
            mother: position(&self.mother_field)?,
            father: position(&self.father_field)?,
            trait_flag: position(&self.trait_field)?,
        };

        Ok(Csv::new(rdr.into_records(), columns))
    }

    pub fn from_path<P: AsRef<Path>>(&self, path: P) -> Result<Csv> {
        self.from_reader(Box::new(File::open(path)?))
    }
}

impl Default for CsvBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Checks that `path` ends with the given extension, ignoring case.
pub fn check_file_extension<'a>(path: &'a Path, expected: &str) -> Result<&'a Path> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case(expected) => Ok(path),
        _ => Err(Error::FileType {
            path: path.display().to_string(),
            expected: expected.to_string(),
        }),
    }
}

/// Reads a `.csv` pedigree file and builds the pedigree.
pub fn load_pedigree<P: AsRef<Path>>(path: P) -> Result<Pedigree> {
    let path = check_file_extension(path.as_ref(), "csv")?;
    let records = CsvBuilder::new()
        .from_path(path)?
        .collect::<Result<Vec<_>>>()?;
    debug!("Read {} records from {}", records.len(), path.display());
    build_pedigree(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;
    use std::io::Write;

    const FAMILY: &str = "name,mother,father,trait\nHarry,Lily,James,\nJames,,,1\nLily,,,0\n";

    fn read(data: &'static str) -> Result<Vec<RawRecord>, Box<dyn Error>> {
        Ok(CsvBuilder::new()
            .from_reader(Box::new(data.as_bytes()))?
            .collect::<crate::Result<Vec<_>>>()?)
    }

    #[test]
    fn test_csv_reads_records() -> Result<(), Box<dyn Error>> {
        let records = read(FAMILY)?;
        assert_eq!(
            records,
            vec![
                RawRecord::new("Harry", Some("Lily"), Some("James"), None),
                RawRecord::new("James", None, None, Some(true)),
                RawRecord::new("Lily", None, None, Some(false)),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_csv_columns_in_any_order() -> Result<(), Box<dyn Error>> {
        let records = read("trait,father,name,mother\n1,,James,\n,James,Harry,Lily\n0,,Lily,\n")?;
        assert_eq!(records[1], RawRecord::new("Harry", Some("Lily"), Some("James"), None));
        Ok(())
    }

    #[test]
    fn test_csv_custom_fields_and_delimiter() -> Result<(), Box<dyn Error>> {
        let records = CsvBuilder::new()
            .delimiter(b'\t')
            .name_field("animal")
            .mother_field("dam")
            .father_field("sire")
            .trait_field("affected")
            .from_reader(Box::new("animal\tdam\tsire\taffected\nbella\t\t\t1\n".as_bytes()))?
            .collect::<crate::Result<Vec<_>>>()?;
        assert_eq!(records, vec![RawRecord::new("bella", None, None, Some(true))]);
        Ok(())
    }

    #[test]
    fn test_csv_rejects_unknown_trait_flag() {
        let err = read("name,mother,father,trait\nHarry,,,maybe\n").unwrap_err();
        assert!(err.to_string().contains("maybe"));
    }

    #[test]
    fn test_csv_rejects_missing_column() {
        let result = CsvBuilder::new().from_reader(Box::new("name,mother,father\nHarry,,\n".as_bytes()));
        assert!(matches!(result, Err(crate::Error::MalformedRecord { .. })));
    }

    #[test]
    fn test_check_file_extension() {
        assert!(check_file_extension(Path::new("family.csv"), "csv").is_ok());
        assert!(check_file_extension(Path::new("FAMILY.CSV"), "csv").is_ok());
        assert!(matches!(
            check_file_extension(Path::new("family.txt"), "csv"),
            Err(crate::Error::FileType { .. })
        ));
        assert!(check_file_extension(Path::new("family"), "csv").is_err());
    }

    #[test]
    fn test_load_pedigree_from_file() -> Result<(), Box<dyn Error>> {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile()?;
        file.write_all(FAMILY.as_bytes())?;
        let pedigree = load_pedigree(file.path())?;
        assert_eq!(pedigree.len(), 3);
        assert!(pedigree.get("Harry").unwrap().parents().is_some());
        Ok(())
    }

    #[test]
    fn test_load_pedigree_rejects_other_extensions() -> Result<(), Box<dyn Error>> {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile()?;
        file.write_all(FAMILY.as_bytes())?;
        assert!(matches!(
            load_pedigree(file.path()),
            Err(crate::Error::FileType { .. })
        ));
        Ok(())
    }
}
