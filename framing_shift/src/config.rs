// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// One row of the source table: the framing score of one organization for one year.
#[derive(PartialEq, Debug, Clone)]
pub struct GroupYearRecord {
    /// Identifier in the source dataset. Two organizations may share a display name
    /// under different identifiers, see [`IdentityRemap`].
    pub group_id: u32,
    pub group_name: String,
    pub region: String,
    pub year: i32,
    /// The framing shift signal, in [-1, 1].
    pub frame_score: f64,
    /// True if this group-year was classified as a change point.
    pub delta_flag: bool,
}

/// One entry of the identity remap table.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct IdentityRemapEntry {
    pub group_id: u32,
    pub suffix: String,
}

/// The static table used to split display names that are shared by several
/// dataset identifiers.
///
/// Every record whose identifier appears in the table gets the corresponding suffix
/// appended to its display name.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct IdentityRemap {
    pub entries: Vec<IdentityRemapEntry>,
}

impl IdentityRemap {
    /// The two identifiers of the source dataset that share one display name.
    pub const DEFAULT_ENTRIES: [(u32, &'static str); 2] = [(289, "1"), (328, "2")];

    pub fn new(entries: &[(u32, &str)]) -> IdentityRemap {
        IdentityRemap {
            entries: entries
                .iter()
                .map(|(group_id, suffix)| IdentityRemapEntry {
                    group_id: *group_id,
                    suffix: suffix.to_string(),
                })
                .collect(),
        }
    }

    pub fn suffix_for(&self, group_id: u32) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.group_id == group_id)
            .map(|e| e.suffix.as_str())
    }
}

impl Default for IdentityRemap {
    fn default() -> Self {
        IdentityRemap::new(&IdentityRemap::DEFAULT_ENTRIES)
    }
}

// ******** Output data structures *********

/// Number of change points for one region in one year.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RegionYearTotal {
    pub year: i32,
    pub region: String,
    pub count: u64,
}

/// Number of change points for one group over all the years.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct GroupChangeTotal {
    pub group_id: u32,
    pub group_name: String,
    pub region: String,
    pub count: u64,
    /// The name shortened for display on a chart axis.
    pub label: String,
}

#[derive(PartialEq, Debug, Clone, Copy)]
pub struct SeriesPoint {
    pub year: i32,
    pub value: f64,
}

/// A group-year where the change flag and the sign of the framing score disagree.
#[derive(PartialEq, Debug, Clone)]
pub struct ChangeDivergence {
    pub group_id: u32,
    pub group_name: String,
    pub year: i32,
    pub delta_flag: bool,
    pub sign_crossed: bool,
}

/// Errors that prevent building a chart.
#[derive(PartialEq, Debug, Clone)]
pub enum FramingErrors {
    /// The first year comes after the last year.
    InvalidYearRange(i32, i32),
    /// The lower bound of the score axis is not below the upper bound.
    InvalidScoreRange(f64, f64),
}

impl Error for FramingErrors {}

impl Display for FramingErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FramingErrors::InvalidYearRange(a, b) => {
                write!(f, "invalid year range: {} > {}", a, b)
            }
            FramingErrors::InvalidScoreRange(a, b) => {
                write!(f, "invalid score range: {} >= {}", a, b)
            }
        }
    }
}

// ********* Configuration **********

/// The fixed axes of the charts.
#[derive(PartialEq, Debug, Clone, Copy)]
pub struct DisplayRange {
    pub first_year: i32,
    pub last_year: i32,
    pub y_min: f64,
    pub y_max: f64,
}

impl DisplayRange {
    pub const DEFAULT: DisplayRange = DisplayRange {
        first_year: 1991,
        last_year: 2020,
        y_min: -1.0,
        y_max: 1.0,
    };

    pub fn new(
        first_year: i32,
        last_year: i32,
        y_min: f64,
        y_max: f64,
    ) -> Result<DisplayRange, FramingErrors> {
        if first_year > last_year {
            return Err(FramingErrors::InvalidYearRange(first_year, last_year));
        }
        // Also rejects NaN bounds.
        if !(y_min < y_max) {
            return Err(FramingErrors::InvalidScoreRange(y_min, y_max));
        }
        Ok(DisplayRange {
            first_year,
            last_year,
            y_min,
            y_max,
        })
    }
}

impl Default for DisplayRange {
    fn default() -> Self {
        DisplayRange::DEFAULT
    }
}
