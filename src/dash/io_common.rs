// Primitives shared by the readers: header lookup and cell parsing.

use framing_shift::GroupYearRecord;
use snafu::prelude::*;

use crate::dash::config_reader::Columns;
use crate::dash::*;

/// Position of each required column in a row.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ColumnIndex {
    year: usize,
    region: usize,
    group_name: usize,
    group_id: usize,
    frame_score: usize,
    delta_flag: usize,
    columns: Columns,
}

impl ColumnIndex {
    /// Finds the required columns in a header row. Extra columns are ignored.
    pub fn from_header(header: &[String], columns: &Columns, path: &str) -> DashResult<ColumnIndex> {
        let find = |name: &String| -> DashResult<usize> {
            header
                .iter()
                .position(|h| h.trim() == name.as_str())
                .context(MissingColumnSnafu {
                    column: name.clone(),
                    path,
                })
        };
        Ok(ColumnIndex {
            year: find(&columns.year)?,
            region: find(&columns.region)?,
            group_name: find(&columns.group_name)?,
            group_id: find(&columns.group_id)?,
            frame_score: find(&columns.frame_score)?,
            delta_flag: find(&columns.delta_flag)?,
            columns: columns.clone(),
        })
    }

    /// Reads one record from the cells of a row.
    ///
    /// lineno is the position of the row in the file, starting at 1 with the header.
    pub fn read_record<S: AsRef<str>>(
        &self,
        cells: &[S],
        lineno: usize,
        path: &str,
    ) -> DashResult<GroupYearRecord> {
        let cell = |idx: usize, column: &String| -> DashResult<String> {
            cells
                .get(idx)
                .map(|s| s.as_ref().trim().to_string())
                .context(MalformedCellSnafu {
                    path,
                    lineno,
                    column: column.clone(),
                    content: "<missing>".to_string(),
                })
        };
        let malformed = |column: &String, content: &String| MalformedCellSnafu {
            path,
            lineno,
            column: column.clone(),
            content: content.clone(),
        };

        let year_s = cell(self.year, &self.columns.year)?;
        let year = parse_integer(&year_s)
            .and_then(|y| i32::try_from(y).ok())
            .context(malformed(&self.columns.year, &year_s))?;

        let gid_s = cell(self.group_id, &self.columns.group_id)?;
        let group_id = parse_integer(&gid_s)
            .and_then(|g| u32::try_from(g).ok())
            .context(malformed(&self.columns.group_id, &gid_s))?;

        let score_s = cell(self.frame_score, &self.columns.frame_score)?;
        let frame_score = parse_score(&score_s).context(malformed(&self.columns.frame_score, &score_s))?;

        let flag_s = cell(self.delta_flag, &self.columns.delta_flag)?;
        let delta_flag = parse_flag(&flag_s).context(malformed(&self.columns.delta_flag, &flag_s))?;

        let group_name = cell(self.group_name, &self.columns.group_name)?;
        ensure!(
            !group_name.is_empty(),
            MalformedCellSnafu {
                path,
                lineno,
                column: self.columns.group_name.clone(),
                content: group_name,
            }
        );
        let region = cell(self.region, &self.columns.region)?;

        Ok(GroupYearRecord {
            group_id,
            group_name,
            region,
            year,
            frame_score,
            delta_flag,
        })
    }
}

/// Integers, possibly written as floats by the exporting tool ("2001.0").
pub fn parse_integer(s: &str) -> Option<i64> {
    s.parse::<i64>().ok().or_else(|| {
        s.parse::<f64>()
            .ok()
            .filter(|f| f.is_finite() && f.fract() == 0.0)
            .map(|f| f as i64)
    })
}

/// A finite score. Missing values are not accepted.
pub fn parse_score(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|f| f.is_finite())
}

pub fn parse_flag(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        x => match parse_integer(x) {
            Some(1) => Some(true),
            Some(0) => Some(false),
            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn scalar_parsing() {
        assert_eq!(parse_integer("2001"), Some(2001));
        assert_eq!(parse_integer("289.0"), Some(289));
        assert_eq!(parse_integer("289.5"), None);
        assert_eq!(parse_integer(""), None);
        assert_eq!(parse_score("-0.25"), Some(-0.25));
        assert_eq!(parse_score("nan"), None);
        assert_eq!(parse_score(""), None);
        assert_eq!(parse_flag("1"), Some(true));
        assert_eq!(parse_flag("0.0"), Some(false));
        assert_eq!(parse_flag("True"), Some(true));
        assert_eq!(parse_flag("2"), None);
    }

    #[test]
    fn columns_in_any_order() {
        let h = header(&[
            "delta1",
            "extra",
            "propdiff",
            "ucdp_dset_id",
            "ucdp_name",
            "region",
            "year",
        ]);
        let idx = ColumnIndex::from_header(&h, &Columns::default(), "t.csv").unwrap();
        let r = idx
            .read_record(&["1", "x", "0.5", "289.0", " BRA ", "South America", "2001"], 2, "t.csv")
            .unwrap();
        assert_eq!(r.group_id, 289);
        assert_eq!(r.group_name, "BRA");
        assert_eq!(r.region, "South America");
        assert_eq!(r.year, 2001);
        assert_eq!(r.frame_score, 0.5);
        assert!(r.delta_flag);
    }

    #[test]
    fn missing_column() {
        let h = header(&["year", "region", "ucdp_name", "ucdp_dset_id", "delta1"]);
        match ColumnIndex::from_header(&h, &Columns::default(), "t.csv") {
            Err(DashError::MissingColumn { column, .. }) => assert_eq!(column, "propdiff"),
            x => panic!("unexpected {:?}", x),
        }
    }

    #[test]
    fn malformed_cell() {
        let h = header(&["year", "region", "ucdp_name", "ucdp_dset_id", "propdiff", "delta1"]);
        let idx = ColumnIndex::from_header(&h, &Columns::default(), "t.csv").unwrap();
        match idx.read_record(&["2001", "Asia", "X", "3", "", "0"], 7, "t.csv") {
            Err(DashError::MalformedCell {
                lineno, column, ..
            }) => {
                assert_eq!(lineno, 7);
                assert_eq!(column, "propdiff");
            }
            x => panic!("unexpected {:?}", x),
        }
        assert!(idx.read_record(&["2001", "Asia"], 8, "t.csv").is_err());
    }
}
