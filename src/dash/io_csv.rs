// Primitives for reading CSV files.

use std::fs::File;

use framing_shift::GroupYearRecord;
use log::debug;
use snafu::prelude::*;

use crate::dash::config_reader::Columns;
use crate::dash::io_common::ColumnIndex;
use crate::dash::*;

// I/O failures of the reader (a directory, a read error midway) mean the data is unavailable.
fn csv_failure(err: csv::Error, path: &str, lineno: usize) -> DashError {
    if !err.is_io_error() {
        return DashError::CsvLineParse {
            source: err,
            path: path.to_string(),
            lineno,
        };
    }
    let source = match err.into_kind() {
        csv::ErrorKind::Io(source) => source,
        other => std::io::Error::new(std::io::ErrorKind::Other, format!("{:?}", other)),
    };
    DashError::DataUnavailable {
        source,
        path: path.to_string(),
    }
}

pub fn read_csv_records(path: &str, columns: &Columns) -> DashResult<Vec<GroupYearRecord>> {
    let file = File::open(path).context(DataUnavailableSnafu { path })?;
    let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_reader(file);

    let header: Vec<String> = rdr
        .headers()
        .map_err(|e| csv_failure(e, path, 1))?
        .iter()
        .map(|s| s.to_string())
        .collect();
    debug!("read_csv_records: header: {:?}", header);
    let idx = ColumnIndex::from_header(&header, columns, path)?;

    let mut res: Vec<GroupYearRecord> = Vec::new();
    for (i, line_r) in rdr.records().enumerate() {
        // The header is line 1.
        let lineno = i + 2;
        let line = line_r.map_err(|e| csv_failure(e, path, lineno))?;
        let cells: Vec<&str> = line.iter().collect();
        res.push(idx.read_record(&cells, lineno, path)?);
    }
    debug!("read_csv_records: {} records from {:?}", res.len(), path);
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_tmp(content: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[test]
    fn reads_pandas_export() {
        let f = write_tmp(
            ",year,region,ucdp_name,ucdp_dset_id,propdiff,delta1\n\
             0,2001.0,Asia,Taliban,12.0,0.25,1.0\n\
             1,2002.0,Asia,Taliban,12.0,-0.5,0.0\n",
        );
        let path = f.path().to_str().unwrap();
        let recs = read_csv_records(path, &Columns::default()).unwrap();
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].year, 2001);
        assert_eq!(recs[0].group_id, 12);
        assert!(recs[0].delta_flag);
        assert_eq!(recs[1].frame_score, -0.5);
        assert!(!recs[1].delta_flag);
    }

    #[test]
    fn missing_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("nothing.csv");
        match read_csv_records(p.to_str().unwrap(), &Columns::default()) {
            Err(DashError::DataUnavailable { .. }) => {}
            x => panic!("unexpected {:?}", x),
        }
    }

    #[test]
    fn directory_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        match read_csv_records(dir.path().to_str().unwrap(), &Columns::default()) {
            Err(e @ DashError::DataUnavailable { .. }) => {
                assert!(e.is_data_unavailable());
                assert!(!e.is_schema_error());
            }
            x => panic!("unexpected {:?}", x),
        }
    }

    #[test]
    fn ragged_line_is_a_schema_error() {
        let f = write_tmp(
            "year,region,ucdp_name,ucdp_dset_id,propdiff,delta1\n\
             2001,Asia,X,3,0.1,0\n\
             2002,Asia,X\n",
        );
        match read_csv_records(f.path().to_str().unwrap(), &Columns::default()) {
            Err(e @ DashError::CsvLineParse { lineno: 3, .. }) => assert!(e.is_schema_error()),
            x => panic!("unexpected {:?}", x),
        }
    }

    #[test]
    fn missing_column_is_a_schema_error() {
        let f = write_tmp("year,region,ucdp_name,propdiff,delta1\n2001,Asia,X,0.1,0\n");
        let res = read_csv_records(f.path().to_str().unwrap(), &Columns::default());
        match res {
            Err(e @ DashError::MissingColumn { .. }) => {
                assert!(e.is_schema_error());
                assert!(e.to_string().contains("ucdp_dset_id"));
            }
            x => panic!("unexpected {:?}", x),
        }
    }

    #[test]
    fn bad_cell_reports_the_line() {
        let f = write_tmp(
            "year,region,ucdp_name,ucdp_dset_id,propdiff,delta1\n\
             2001,Asia,X,3,0.1,0\n\
             2002,Asia,X,3,0.2,maybe\n",
        );
        match read_csv_records(f.path().to_str().unwrap(), &Columns::default()) {
            Err(DashError::MalformedCell {
                lineno, content, ..
            }) => {
                assert_eq!(lineno, 3);
                assert_eq!(content, "maybe");
            }
            x => panic!("unexpected {:?}", x),
        }
    }

    #[test]
    fn empty_file_has_no_columns() {
        let f = write_tmp("");
        assert!(matches!(
            read_csv_records(f.path().to_str().unwrap(), &Columns::default()),
            Err(DashError::MissingColumn { .. })
        ));
    }
}
