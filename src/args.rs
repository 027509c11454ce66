use clap::Parser;

/// This is a program to recap student enrollment per study program across universities.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON file describing the data sources, the target institutions
    /// and the selection. See the manual for the format.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,
    /// (file path) A reference file containing a recap summary in JSON format. If provided, rekap will
    /// check that the computed summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary of the recap will be written in JSON format to the given
    /// location.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path or empty) The file containing the raw enrollment data. Setting this option overrides the
    /// data sources of the --config option.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (default xlsx) The type of the input: xlsx or csv.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (default: the first worksheet) When using an Excel file, indicates the name of the worksheet to use.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    /// (repeatable) A term to include, for example 20231. At least one is required.
    #[clap(long, value_parser)]
    pub term: Vec<String>,

    /// (repeatable) The name of a study program to include. At least one is required.
    #[clap(long, value_parser)]
    pub program: Vec<String>,

    /// (repeatable, optional) The institutions to compare, in order. Replaces the default list of five
    /// universities.
    #[clap(long, value_parser)]
    pub institution: Vec<String>,

    /// (file or directory path) If specified, the recap is written as an Excel file. If the path is a
    /// directory, the file is named after the selected terms.
    #[clap(short, long, value_parser)]
    pub export: Option<String>,

    /// (file path) If specified, the chart data is written in CSV format to the given location.
    #[clap(long, value_parser)]
    pub chart: Option<String>,

    /// If passed as an argument, prints the terms and programs found in the input and stops.
    #[clap(long, takes_value = false)]
    pub list: bool,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
