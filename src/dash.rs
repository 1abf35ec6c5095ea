use log::{debug, info, warn};

use framing_shift::selection::*;
use framing_shift::*;
use snafu::prelude::*;

use std::fs;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::dash::config_reader::*;

pub mod config_reader;
pub mod io_common;
pub mod io_csv;
pub mod io_xlsx;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum DashError {
    #[snafu(display("Data file {path} is unavailable: {source}"))]
    DataUnavailable {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error opening Excel file {path}: {source}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("Excel file {path} has no worksheet or no header row"))]
    EmptyExcel { path: String },
    #[snafu(display("{path}:{lineno}: unexpected cell {content}"))]
    ExcelWrongCellType {
        path: String,
        lineno: usize,
        content: String,
    },
    #[snafu(display("{path}:{lineno}: cannot parse line: {source}"))]
    CsvLineParse {
        source: csv::Error,
        path: String,
        lineno: usize,
    },
    #[snafu(display("Required column {column} is missing from {path}"))]
    MissingColumn { column: String, path: String },
    #[snafu(display("{path}:{lineno}: cannot read column {column} from {content:?}"))]
    MalformedCell {
        path: String,
        lineno: usize,
        column: String,
        content: String,
    },
    #[snafu(display("Error opening JSON file {path}: {source}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON file {path}: {source}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Error serializing the summary: {source}"))]
    SerializingJson { source: serde_json::Error },
    #[snafu(display("Invalid display settings: {source}"))]
    InvalidDisplay { source: FramingErrors },
    #[snafu(display("Error writing to {path}: {source}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error reading commands: {source}"))]
    ReadingCommands { source: std::io::Error },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

impl DashError {
    /// The data file is missing or cannot be opened.
    pub fn is_data_unavailable(&self) -> bool {
        matches!(
            self,
            DashError::DataUnavailable { .. } | DashError::OpeningExcel { .. }
        )
    }

    /// The data file does not have the expected columns or content.
    pub fn is_schema_error(&self) -> bool {
        matches!(
            self,
            DashError::MissingColumn { .. }
                | DashError::MalformedCell { .. }
                | DashError::CsvLineParse { .. }
                | DashError::EmptyExcel { .. }
                | DashError::ExcelWrongCellType { .. }
        )
    }
}

pub type DashResult<T> = Result<T, DashError>;

/// Where the records are read from, after merging the configuration and the flags.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ResolvedSource {
    pub provider: Provider,
    pub path: String,
    pub worksheet_name: Option<String>,
    pub columns: Columns,
}

pub fn resolve_source(
    config: &DashConfig,
    config_dir: Option<&Path>,
    args: &Args,
) -> DashResult<ResolvedSource> {
    let ds = config.data_source.clone().unwrap_or_default();
    // The flags win over the configuration file.
    let path = match (&args.input, &ds.file_path, config_dir) {
        (Some(p), _, _) => p.clone(),
        (None, Some(p), Some(dir)) => {
            let pb: PathBuf = dir.join(p);
            pb.as_path().display().to_string()
        }
        (None, Some(p), None) => p.clone(),
        (None, None, _) => DEFAULT_DATA_PATH.to_string(),
    };
    let provider = match args.input_type.as_ref().or(ds.provider.as_ref()) {
        Some(s) => parse_provider(s)?,
        None if path.to_lowercase().ends_with(".xlsx") => Provider::Xlsx,
        None => Provider::Csv,
    };
    Ok(ResolvedSource {
        provider,
        path,
        worksheet_name: args
            .excel_worksheet_name
            .clone()
            .or(ds.excel_worksheet_name),
        columns: config.columns(),
    })
}

/// Reads the whole table. Nothing is returned if any row fails.
pub fn load_records(source: &ResolvedSource) -> DashResult<Vec<GroupYearRecord>> {
    info!("Attempting to read data file {:?}", source.path);
    let records = match source.provider {
        Provider::Csv => io_csv::read_csv_records(&source.path, &source.columns),
        Provider::Xlsx => io_xlsx::read_xlsx_records(
            &source.path,
            source.worksheet_name.as_deref(),
            &source.columns,
        ),
    }?;
    info!("Read {} records from {:?}", records.len(), source.path);
    Ok(records)
}

/// Loads, resolves and checks the base table.
pub fn build_context(source: &ResolvedSource, remap: &IdentityRemap) -> DashResult<DataContext> {
    let records = load_records(source)?;
    let ctx = DataContext::resolved(&records, remap);

    let divergences = change_divergences(ctx.records());
    if !divergences.is_empty() {
        warn!(
            "{} group-years have a change flag that does not match a sign change of the score",
            divergences.len()
        );
        for d in divergences.iter() {
            debug!("divergence: {:?}", d);
        }
    }
    Ok(ctx)
}

pub fn parse_view(s: &str) -> DashResult<ViewKind> {
    match s.to_lowercase().as_str() {
        "trajectory" => Ok(ViewKind::Trajectory),
        "changes" => Ok(ViewKind::Changes),
        x => whatever!("Unknown view {:?}, expected trajectory or changes", x),
    }
}

fn range_to_json(range: &DisplayRange) -> JSValue {
    json!([range.first_year, range.last_year])
}

pub fn chart_to_json(chart: &ChartView) -> JSValue {
    match chart {
        ChartView::Trajectory(t) => {
            let points: Vec<JSValue> = t
                .points
                .iter()
                .map(|p| json!({"year": p.year, "value": p.value}))
                .collect();
            json!({
                "kind": "trajectory",
                "title": t.title,
                "points": points,
                "xRange": range_to_json(&t.range),
                "yRange": [t.range.y_min, t.range.y_max],
                "hline": t.hline,
            })
        }
        ChartView::Changes(c) => {
            let bars: Vec<JSValue> = c
                .bars
                .iter()
                .map(|b| {
                    json!({
                        "groupId": b.group_id,
                        "name": b.group_name,
                        "label": b.label,
                        "count": b.count,
                    })
                })
                .collect();
            let yearly: Vec<JSValue> = c
                .yearly
                .iter()
                .map(|y| json!({"year": y.year, "count": y.count}))
                .collect();
            json!({
                "kind": "changes",
                "region": c.region,
                "bars": bars,
                "yearly": yearly,
                "xRange": range_to_json(&c.range),
            })
        }
        ChartView::Empty => json!({"kind": "empty"}),
    }
}

pub fn build_summary_js(ctx: &DataContext, session: &Session) -> JSValue {
    let state = session.state();
    json!({
        "regions": ctx.regions(),
        "selection": {
            "region": state.region(),
            "group": state.group(),
        },
        "groupOptions": session.group_options(),
        "chart": chart_to_json(&session.chart()),
    })
}

fn write_output(out: Option<&str>, content: &str) -> DashResult<()> {
    match out {
        None | Some("stdout") => {
            println!("{}", content);
            Ok(())
        }
        Some(path) => {
            info!("Writing summary to {:?}", path);
            fs::write(path, content).context(WritingOutputSnafu { path })
        }
    }
}

/// Compares the summary with a reference summary, printing the differences.
fn check_reference(summary: &JSValue, reference_path: &str) -> DashResult<()> {
    let summary_ref = read_summary(reference_path)?;
    let pretty_ref = serde_json::to_string_pretty(&summary_ref).context(SerializingJsonSnafu {})?;
    let pretty = serde_json::to_string_pretty(summary).context(SerializingJsonSnafu {})?;
    if pretty_ref != pretty {
        warn!("Found differences with the reference summary");
        print_diff(pretty_ref.as_str(), pretty.as_str(), "\n");
        whatever!("Difference detected between computed summary and reference summary")
    }
    info!("Summary matches reference {:?}", reference_path);
    Ok(())
}

/// A command of the interactive mode.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum Command {
    Select(SelectionEvent),
    View(ViewKind),
    Quit,
}

pub fn parse_command(line: &str) -> DashResult<Option<Command>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((v, r)) => (v, r.trim()),
        None => (line, ""),
    };
    let cmd = match (verb, rest) {
        ("region", r) if !r.is_empty() => Command::Select(SelectionEvent::SelectRegion(r.to_string())),
        ("group", g) if !g.is_empty() => Command::Select(SelectionEvent::SelectGroup(g.to_string())),
        ("clear", "") => Command::Select(SelectionEvent::ClearGroup),
        ("view", v) => Command::View(parse_view(v)?),
        ("quit", "") | ("exit", "") => Command::Quit,
        _ => whatever!("Cannot understand command {:?}", line),
    };
    Ok(Some(cmd))
}

/// Reads commands line by line and writes one summary per line of output after
/// each change of the selection. Commands that cannot be understood are skipped.
pub fn run_interactive<R: BufRead, W: Write>(
    ctx: &DataContext,
    session: &mut Session,
    input: R,
    out: &mut W,
) -> DashResult<()> {
    emit_summary_line(ctx, session, out)?;
    for line_r in input.lines() {
        let line = line_r.context(ReadingCommandsSnafu {})?;
        let cmd = match parse_command(&line) {
            Ok(Some(c)) => c,
            Ok(None) => continue,
            Err(e) => {
                warn!("{}", e);
                continue;
            }
        };
        debug!("run_interactive: command {:?}", cmd);
        match cmd {
            Command::Select(ev) => {
                let t = session.apply(ev);
                debug!("run_interactive: new state {:?}", t.state);
            }
            Command::View(v) => {
                session.set_view(v);
            }
            Command::Quit => break,
        }
        emit_summary_line(ctx, session, out)?;
    }
    Ok(())
}

fn emit_summary_line<W: Write>(ctx: &DataContext, session: &Session, out: &mut W) -> DashResult<()> {
    let js = build_summary_js(ctx, session);
    let line = serde_json::to_string(&js).context(SerializingJsonSnafu {})?;
    writeln!(out, "{}", line).context(WritingOutputSnafu { path: "stdout" })
}

pub fn run_dashboard(args: &Args) -> DashResult<()> {
    let config = match &args.config {
        Some(p) => read_config(p)?,
        None => DashConfig::default(),
    };
    let config_dir = args
        .config
        .as_ref()
        .and_then(|p| Path::new(p.as_str()).parent());
    let source = resolve_source(&config, config_dir, args)?;
    debug!("run_dashboard: source: {:?}", source);

    let range = config.display_range()?;
    let view = match &args.view {
        Some(v) => parse_view(v)?,
        None => ViewKind::Trajectory,
    };

    let ctx = build_context(&source, &config.identity_remap())?;

    let mut session = match &args.region {
        Some(r) => {
            let mut s = Session::new(&ctx, range, view);
            s.apply(SelectionEvent::SelectRegion(r.clone()));
            s
        }
        None => Session::with_default_region(&ctx, range, view),
    };
    if let Some(g) = &args.group {
        session.apply(SelectionEvent::SelectGroup(g.clone()));
    }
    info!("Selection: {:?}", session.state());

    if args.interactive {
        let stdin = std::io::stdin();
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        return run_interactive(&ctx, &mut session, stdin.lock(), &mut handle);
    }

    let summary = build_summary_js(&ctx, &session);
    let pretty = serde_json::to_string_pretty(&summary).context(SerializingJsonSnafu {})?;
    write_output(args.out.as_deref(), &pretty)?;

    if let Some(reference) = &args.reference {
        check_reference(&summary, reference)?;
    }
    Ok(())
}
