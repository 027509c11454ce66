use crate::recap::*;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "recapName")]
    pub recap_name: Option<String>,
    #[serde(rename = "outputDirectory")]
    pub output_directory: Option<String>,
    #[serde(rename = "generateChart")]
    pub generate_chart: Option<bool>,
}

/// The names of the columns in the header of a data file.
/// Missing entries take the PDDikti export names.
#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColumnNames {
    pub term: Option<String>,
    pub institution: Option<String>,
    #[serde(rename = "programCode")]
    pub program_code: Option<String>,
    #[serde(rename = "programName")]
    pub program_name: Option<String>,
    #[serde(rename = "degreeLevel")]
    pub degree_level: Option<String>,
    #[serde(rename = "studentCount")]
    pub student_count: Option<String>,
}

impl ColumnNames {
    /// (field, column name) pairs in record order.
    pub fn resolved(&self) -> [(&'static str, String); 6] {
        let pick = |x: &Option<String>, default: &str| x.clone().unwrap_or_else(|| default.to_string());
        [
            ("term", pick(&self.term, "id_smt")),
            ("institution", pick(&self.institution, "nama_pt")),
            ("programCode", pick(&self.program_code, "kode_prodi")),
            ("programName", pick(&self.program_name, "nm_prodi")),
            ("degreeLevel", pick(&self.degree_level, "nm_jenj_didik")),
            ("studentCount", pick(&self.student_count, "jumlah_mhs")),
        ]
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FileSource {
    pub provider: String,
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
    pub columns: Option<ColumnNames>,
}

impl FileSource {
    pub fn column_names(&self) -> ColumnNames {
        self.columns.clone().unwrap_or_default()
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct SelectionConfig {
    #[serde(default)]
    pub terms: Vec<String>,
    #[serde(default)]
    pub programs: Vec<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecapConfig {
    #[serde(rename = "outputSettings", default)]
    pub output_settings: OutputSettings,
    #[serde(rename = "dataSources", default)]
    pub data_sources: Vec<FileSource>,
    #[serde(rename = "targetInstitutions")]
    pub target_institutions: Option<Vec<String>>,
    #[serde(default)]
    pub selection: SelectionConfig,
}

pub fn read_config(path: &str) -> RecapResult<RecapConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: RecapConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    debug!("read_config: {:?}", config);
    Ok(config)
}

pub fn read_summary(path: &str) -> RecapResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}
