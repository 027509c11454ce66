pub use crate::config::*;

/// A builder for collecting enrollment records.
///
/// The builder checks each record as it is added, which is what readers of
/// raw files should use.
///
/// ```
/// pub use recap_engine::builder::Builder;
/// # use recap_engine::RecapErrors;
///
/// let mut builder = Builder::new()
///     .institutions(&["Universitas Ciputra Surabaya".to_string()])?;
///
/// builder.add_record_simple("20231", "Universitas Ciputra Surabaya", "01", "A", "S1", 30)?;
/// builder.add_record_simple("20231", "Universitas Ciputra Surabaya", "02", "B", "S1", 70)?;
///
/// let table = builder
///     .compute(&["20231".to_string()], &["A".to_string()])?
///     .unwrap();
/// assert_eq!(table.rows[0].cells[0].percent, 30.0);
///
/// # Ok::<(), RecapErrors>(())
/// ```
pub struct Builder {
    pub(crate) _institutions: Vec<String>,
    pub(crate) _records: Vec<Record>,
}

impl Builder {
    /// A new builder, comparing the default target institutions.
    pub fn new() -> Builder {
        Builder {
            _institutions: default_target_institutions(),
            _records: Vec::new(),
        }
    }

    pub fn institutions(self, names: &[String]) -> Result<Builder, RecapErrors> {
        if names.is_empty() {
            return Err(RecapErrors::NoTargetInstitutions);
        }
        for (idx, name) in names.iter().enumerate() {
            if names[..idx].contains(name) {
                return Err(RecapErrors::DuplicateInstitution(name.clone()));
            }
        }
        Ok(Builder {
            _institutions: names.to_vec(),
            _records: self._records,
        })
    }

    /// Adds a record from its individual fields.
    pub fn add_record_simple(
        &mut self,
        term_id: &str,
        institution_name: &str,
        program_code: &str,
        program_name: &str,
        degree_level: &str,
        student_count: u64,
    ) -> Result<(), RecapErrors> {
        self.add_record(Record {
            term_id: term_id.to_string(),
            institution_name: institution_name.to_string(),
            program_code: program_code.to_string(),
            program_name: program_name.to_string(),
            degree_level: degree_level.to_string(),
            student_count,
        })
    }

    /// Adds a record. All the text fields must contain something other than blanks.
    pub fn add_record(&mut self, record: Record) -> Result<(), RecapErrors> {
        let fields = [
            ("term_id", &record.term_id),
            ("institution_name", &record.institution_name),
            ("program_code", &record.program_code),
            ("program_name", &record.program_name),
            ("degree_level", &record.degree_level),
        ];
        for (field, value) in fields {
            if value.trim().is_empty() {
                return Err(RecapErrors::EmptyField { field });
            }
        }
        self._records.push(record);
        Ok(())
    }

    pub fn records(&self) -> &[Record] {
        &self._records
    }

    pub fn compute(
        &self,
        terms: &[String],
        programs: &[String],
    ) -> Result<Option<RecapTable>, RecapErrors> {
        crate::compute_recap(
            &self._records,
            &Selection::new(terms, programs),
            &self._institutions,
        )
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_fields_are_rejected() {
        let mut builder = Builder::new();
        assert_eq!(
            builder.add_record_simple("20231", "  ", "01", "A", "S1", 3),
            Err(RecapErrors::EmptyField {
                field: "institution_name"
            })
        );
        assert_eq!(
            builder.add_record_simple("20231", "X", "01", "A", "", 3),
            Err(RecapErrors::EmptyField {
                field: "degree_level"
            })
        );
        assert!(builder.records().is_empty());
    }

    #[test]
    fn duplicate_institutions_are_rejected() {
        let names = vec!["X".to_string(), "Y".to_string(), "X".to_string()];
        assert!(matches!(
            Builder::new().institutions(&names),
            Err(RecapErrors::DuplicateInstitution(n)) if n == "X"
        ));
    }
}
