use std::fs;

use framing_shift::{DisplayRange, IdentityRemap, IdentityRemapEntry};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;
use snafu::prelude::*;

use crate::dash::*;

pub const DEFAULT_DATA_PATH: &str = "./data/group_years_regions.csv";

#[derive(PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashConfig {
    #[serde(rename = "dataSource")]
    pub data_source: Option<DataSource>,
    #[serde(rename = "identityRemap")]
    pub identity_remap: Option<Vec<RemapEntry>>,
    pub display: Option<DisplaySettings>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataSource {
    pub provider: Option<String>,
    #[serde(rename = "filePath")]
    pub file_path: Option<String>,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
    pub columns: Option<ColumnNames>,
}

/// The names of the columns in the header of the data file.
#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColumnNames {
    pub year: Option<String>,
    pub region: Option<String>,
    #[serde(rename = "groupName")]
    pub group_name: Option<String>,
    #[serde(rename = "groupId")]
    pub group_id: Option<String>,
    #[serde(rename = "frameScore")]
    pub frame_score: Option<String>,
    #[serde(rename = "deltaFlag")]
    pub delta_flag: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct RemapEntry {
    #[serde(rename = "groupId")]
    pub group_id: u32,
    pub suffix: String,
}

#[derive(PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisplaySettings {
    #[serde(rename = "firstYear")]
    pub first_year: Option<i32>,
    #[serde(rename = "lastYear")]
    pub last_year: Option<i32>,
    #[serde(rename = "yMin")]
    pub y_min: Option<f64>,
    #[serde(rename = "yMax")]
    pub y_max: Option<f64>,
}

/// The column names after applying the defaults.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Columns {
    pub year: String,
    pub region: String,
    pub group_name: String,
    pub group_id: String,
    pub frame_score: String,
    pub delta_flag: String,
}

impl Default for Columns {
    fn default() -> Self {
        Columns {
            year: "year".to_string(),
            region: "region".to_string(),
            group_name: "ucdp_name".to_string(),
            group_id: "ucdp_dset_id".to_string(),
            frame_score: "propdiff".to_string(),
            delta_flag: "delta1".to_string(),
        }
    }
}

impl ColumnNames {
    pub fn columns(&self) -> Columns {
        let d = Columns::default();
        Columns {
            year: self.year.clone().unwrap_or(d.year),
            region: self.region.clone().unwrap_or(d.region),
            group_name: self.group_name.clone().unwrap_or(d.group_name),
            group_id: self.group_id.clone().unwrap_or(d.group_id),
            frame_score: self.frame_score.clone().unwrap_or(d.frame_score),
            delta_flag: self.delta_flag.clone().unwrap_or(d.delta_flag),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Provider {
    Csv,
    Xlsx,
}

pub fn parse_provider(s: &str) -> DashResult<Provider> {
    match s.to_lowercase().as_str() {
        "csv" => Ok(Provider::Csv),
        "xlsx" | "excel" => Ok(Provider::Xlsx),
        x => whatever!("Unknown input type {:?}, expected csv or xlsx", x),
    }
}

impl DashConfig {
    pub fn identity_remap(&self) -> IdentityRemap {
        match &self.identity_remap {
            Some(entries) => IdentityRemap {
                entries: entries
                    .iter()
                    .map(|e| IdentityRemapEntry {
                        group_id: e.group_id,
                        suffix: e.suffix.clone(),
                    })
                    .collect(),
            },
            None => IdentityRemap::default(),
        }
    }

    pub fn display_range(&self) -> DashResult<DisplayRange> {
        let d = DisplayRange::DEFAULT;
        match &self.display {
            Some(ds) => DisplayRange::new(
                ds.first_year.unwrap_or(d.first_year),
                ds.last_year.unwrap_or(d.last_year),
                ds.y_min.unwrap_or(d.y_min),
                ds.y_max.unwrap_or(d.y_max),
            )
            .context(InvalidDisplaySnafu {}),
            None => Ok(d),
        }
    }

    pub fn columns(&self) -> Columns {
        self.data_source
            .as_ref()
            .and_then(|ds| ds.columns.as_ref())
            .map(|c| c.columns())
            .unwrap_or_default()
    }
}

pub fn read_config(path: &str) -> DashResult<DashConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: DashConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })?;
    debug!("read_config: {:?}", config);
    Ok(config)
}

pub fn read_summary(path: &str) -> DashResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })?;
    Ok(js)
}
