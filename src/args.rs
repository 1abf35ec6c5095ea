use clap::Parser;

/// A command line dashboard over the framing scores of militant organizations.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON configuration describing the data source, the identity remap table
    /// and the chart axes. Every field of the configuration is optional.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) A reference summary in JSON format. If provided, framedash will check that the
    /// computed summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary of the selection will be written in JSON
    /// format to the given location.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path or empty) The table of group-year scores. Setting this option overrides the path that
    /// may be specified with the --config option. Defaults to ./data/group_years_regions.csv
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (default csv) The type of the input: csv or xlsx.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// When using an Excel file, indicates the name of the worksheet to use. Defaults to the first one.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    /// (default: the first region of the table) The region to select.
    #[clap(long, value_parser)]
    pub region: Option<String>,

    /// The group to select in the region.
    #[clap(long, value_parser)]
    pub group: Option<String>,

    /// (default trajectory) The chart to produce: trajectory or changes.
    #[clap(long, value_parser)]
    pub view: Option<String>,

    /// If passed as an argument, reads selection commands from the standard input and prints a summary
    /// after each of them.
    #[clap(long, takes_value = false)]
    pub interactive: bool,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
