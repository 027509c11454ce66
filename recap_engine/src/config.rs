// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// Identifier of an academic term (for example `20231`).
///
/// It is opaque: terms are only compared, sorted and matched.
pub type TermId = String;

/// One row of the raw enrollment data.
///
/// The same (term, institution, program code) combination may appear several
/// times. Such rows are summed, never overwritten.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct Record {
    pub term_id: TermId,
    pub institution_name: String,
    pub program_code: String,
    pub program_name: String,
    pub degree_level: String,
    pub student_count: u64,
}

/// The terms and programs chosen by the user.
///
/// A single term selection is simply a selection with one term.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct Selection {
    pub terms: Vec<TermId>,
    /// Program names (not codes).
    pub programs: Vec<String>,
}

impl Selection {
    pub fn new(terms: &[String], programs: &[String]) -> Selection {
        Selection {
            terms: terms.to_vec(),
            programs: programs.to_vec(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty() || self.programs.is_empty()
    }
}

/// The institutions compared by default.
pub const TARGET_INSTITUTIONS: [&str; 5] = [
    "Universitas Ciputra Surabaya",
    "Universitas Katolik Widya Mandala Surabaya",
    "Universitas Kristen Petra",
    "Universitas Surabaya",
    "Universitas Bunda Mulia",
];

pub fn default_target_institutions() -> Vec<String> {
    TARGET_INSTITUTIONS.iter().map(|s| s.to_string()).collect()
}

// ******** Output data structures *********

/// The count and share of one program at one institution.
#[derive(PartialEq, Debug, Clone)]
pub struct InstitutionCell {
    pub institution: String,
    pub count: u64,
    /// Percentage of the institution total, rounded to 2 decimals.
    /// It is not clamped to 100.
    pub percent: f64,
}

/// One line of the recap: a single program across all the target institutions.
#[derive(PartialEq, Debug, Clone)]
pub struct RecapRow {
    pub code: String,
    pub program_name: String,
    pub degree_level: String,
    /// One cell per target institution, in the order of the target list.
    pub cells: Vec<InstitutionCell>,
}

/// A program code that maps to more than one (name, degree level) pair
/// in the raw data.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CatalogAmbiguity {
    pub code: String,
    /// All the (program name, degree level) pairs seen for this code, in order of appearance.
    pub variants: Vec<(String, String)>,
}

#[derive(PartialEq, Debug, Clone)]
pub struct RecapTable {
    /// The target institutions, in the order requested.
    pub institutions: Vec<String>,
    /// The selected terms, sorted and deduplicated.
    pub terms: Vec<TermId>,
    pub rows: Vec<RecapRow>,
    /// Student totals per institution across all programs of the selected terms.
    /// These are the denominators of the percentages.
    pub totals: Vec<(String, u64)>,
    pub ambiguities: Vec<CatalogAmbiguity>,
}

impl RecapTable {
    pub fn total_for(&self, institution: &str) -> Option<u64> {
        self.totals
            .iter()
            .find(|(name, _)| name == institution)
            .map(|(_, total)| *total)
    }
}

/// A single bar in the comparison chart.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ChartPoint {
    pub code: String,
    pub program_name: String,
    pub institution: String,
    pub count: u64,
}

/// Errors that prevent the recap from being computed.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum RecapErrors {
    NoTargetInstitutions,
    DuplicateInstitution(String),
    /// A required text field of a record was empty.
    EmptyField {
        field: &'static str,
    },
}

impl Error for RecapErrors {}

impl Display for RecapErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecapErrors::NoTargetInstitutions => write!(f, "no target institution provided"),
            RecapErrors::DuplicateInstitution(name) => {
                write!(f, "institution {:?} appears twice in the target list", name)
            }
            RecapErrors::EmptyField { field } => write!(f, "empty value for field {}", field),
        }
    }
}
