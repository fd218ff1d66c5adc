//! Dataset helpers.
//!
//! A dataset is a single row-major [`Matrix`] of shape `(rows, features + classes)`:
//! the leading columns are inputs, the trailing `classes` columns a one-hot target.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::debug;

use crate::matrix::{Matrix, MatrixViewMut};
use crate::{Error, Result};

/// Load a classification dataset from CSV text.
///
/// Each line holds `features` comma-separated floats followed by an integer class
/// label (`1` or `1.0`); further fields are ignored. The label is one-hot encoded
/// into `classes` target columns. The first `skip_lines` lines are dropped unread.
///
/// Lines that do not parse are skipped. A label outside `0..classes` is an error.
pub fn load_csv<R: BufRead>(
    reader: R,
    features: usize,
    classes: usize,
    skip_lines: usize,
) -> Result<Matrix> {
    if features == 0 || classes == 0 {
        return Err(Error::InvalidConfig(
            "features and classes must be > 0".to_owned(),
        ));
    }

    let cols = features + classes;
    let mut data = Vec::new();
    let mut rows = 0;
    let mut skipped = 0;

    for (line_no, line) in reader.lines().enumerate().skip(skip_lines) {
        let line = line?;
        let Some((values, label)) = parse_line(&line, features) else {
            debug!(line = line_no + 1, "skipping malformed csv line");
            skipped += 1;
            continue;
        };
        if label < 0 || label as usize >= classes {
            return Err(Error::InvalidData(format!(
                "line {}: class label {label} outside 0..{classes}",
                line_no + 1
            )));
        }

        let start = data.len();
        data.extend_from_slice(&values);
        data.resize(start + cols, 0.0);
        data[start + features + label as usize] = 1.0;
        rows += 1;
    }

    debug!(rows, skipped, features, classes, "csv dataset loaded");
    Matrix::from_vec(rows, cols, data)
}

/// [`load_csv`] over the file at `path`.
pub fn load_csv_file<P: AsRef<Path>>(
    path: P,
    features: usize,
    classes: usize,
    skip_lines: usize,
) -> Result<Matrix> {
    let file = File::open(path)?;
    load_csv(BufReader::new(file), features, classes, skip_lines)
}

fn parse_line(line: &str, features: usize) -> Option<(Vec<f32>, i64)> {
    let mut fields = line.split(',').map(str::trim);
    let values = fields
        .by_ref()
        .take(features)
        .map(|f| f.parse::<f32>().ok())
        .collect::<Option<Vec<_>>>()?;
    if values.len() != features {
        return None;
    }
    let label = parse_label(fields.next()?)?;
    Some((values, label))
}

/// Integer label; an integral float such as `2.0` is accepted as well.
fn parse_label(field: &str) -> Option<i64> {
    if let Ok(label) = field.parse::<i64>() {
        return Some(label);
    }
    let value = field.parse::<f64>().ok()?;
    (value.is_finite() && value.fract() == 0.0).then_some(value as i64)
}

/// Split `data` into training rows `[0, floor(rows * train_fraction))` and test
/// rows for the remainder.
///
/// Panics unless `0.0 <= train_fraction <= 1.0`.
pub fn train_test_split<S>(
    data: &mut Matrix<S>,
    train_fraction: f32,
) -> (MatrixViewMut<'_>, MatrixViewMut<'_>)
where
    S: AsRef<[f32]> + AsMut<[f32]>,
{
    assert!(
        (0.0..=1.0).contains(&train_fraction),
        "train fraction {train_fraction} outside [0, 1]"
    );
    // Computed in f32 so that e.g. 10 rows at 0.7 give 7, not 6.
    let mid = ((data.rows() as f32 * train_fraction) as usize).min(data.rows());
    data.split_rows_at_mut(mid)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Cursor;

    const IRIS_LIKE: &str = "\
sepal_length,sepal_width,petal_length,petal_width,class
5.1,3.5,1.4,0.2,0
7.0,3.2,4.7,1.4,1

not,a,number,row,2
6.3,3.3,6.0,2.5,2
";

    #[test]
    fn loads_and_one_hot_encodes() {
        let m = load_csv(Cursor::new(IRIS_LIKE), 4, 3, 1).unwrap();
        assert_eq!((m.rows(), m.cols()), (3, 7));
        assert_eq!(m.row(0), &[5.1, 3.5, 1.4, 0.2, 1.0, 0.0, 0.0]);
        assert_eq!(m.row(1), &[7.0, 3.2, 4.7, 1.4, 0.0, 1.0, 0.0]);
        assert_eq!(m.row(2), &[6.3, 3.3, 6.0, 2.5, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn header_without_skip_is_just_a_malformed_line() {
        let m = load_csv(Cursor::new(IRIS_LIKE), 4, 3, 0).unwrap();
        assert_eq!(m.rows(), 3);
    }

    #[test]
    fn short_lines_are_skipped() {
        let m = load_csv(Cursor::new("1.0,2.0\n1.0,2.0,1\n"), 2, 2, 0).unwrap();
        assert_eq!(m.as_slice(), &[1.0, 2.0, 0.0, 1.0]);
    }

    #[test]
    fn integral_float_labels_are_accepted() {
        let text = "5.1,3.5,1.4,0.2,1.0\n0.1,0.2,0.3,0.4,1.5\n";
        let m = load_csv(Cursor::new(text), 4, 3, 0).unwrap();
        assert_eq!(m.rows(), 1);
        assert_eq!(m.row(0), &[5.1, 3.5, 1.4, 0.2, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn rejects_out_of_range_labels() {
        for text in ["1.0,3\n", "1.0,-1\n"] {
            assert!(matches!(
                load_csv(Cursor::new(text), 1, 3, 0),
                Err(Error::InvalidData(_))
            ));
        }
    }

    #[test]
    fn missing_file_is_io_error() {
        assert!(matches!(
            load_csv_file("/definitely/not/here.csv", 4, 3, 0),
            Err(Error::Io(_))
        ));
    }

    #[test]
    fn split_uses_floor_of_fraction() {
        let mut m = Matrix::from_vec(5, 1, vec![0.0, 1.0, 2.0, 3.0, 4.0]).unwrap();
        let (train, test) = train_test_split(&mut m, 0.7);
        assert_eq!(train.as_slice(), &[0.0, 1.0, 2.0]);
        assert_eq!(test.as_slice(), &[3.0, 4.0]);

        let (train, test) = train_test_split(&mut m, 1.0);
        assert_eq!((train.rows(), test.rows()), (5, 0));
    }

    #[test]
    fn split_counts_are_not_lost_to_rounding() {
        let mut m = Matrix::zeros(10, 1);
        for (fraction, expected) in [(0.7, 7), (0.9, 9), (0.3, 3), (0.8, 8)] {
            let (train, test) = train_test_split(&mut m, fraction);
            assert_eq!((train.rows(), test.rows()), (expected, 10 - expected));
        }

        let mut m = Matrix::zeros(150, 1);
        let (train, test) = train_test_split(&mut m, 0.8);
        assert_eq!((train.rows(), test.rows()), (120, 30));
    }
}
