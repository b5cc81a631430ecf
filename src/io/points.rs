//! Point-file ingest.
//!
//! The input format is plain text, one `x,y` pair per line:
//!
//! - blank lines and `#` comments are skipped
//! - a leading `x,y` header row is tolerated (case-insensitive)
//! - both coordinates must parse as finite numbers
//!
//! Malformed content is a data error (exit code 3) reported with its
//! 1-based line number; an unreadable file is a usage error (exit code 2).

use std::fs;
use std::path::Path;

use crate::domain::DataPoint;
use crate::error::AppError;

/// Read and parse a point file.
pub fn load_points(path: &Path) -> Result<Vec<DataPoint>, AppError> {
    let text = fs::read_to_string(path).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to read points file '{}': {e}", path.display()),
        )
    })?;
    parse_points(&text)
}

/// Parse point-file text into data points.
pub fn parse_points(text: &str) -> Result<Vec<DataPoint>, AppError> {
    let mut out = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        // Tolerate one header row, but only before any data line.
        if out.is_empty() && trimmed.eq_ignore_ascii_case("x,y") {
            continue;
        }
        let Some((x_raw, y_raw)) = trimmed.split_once(',') else {
            return Err(AppError::new(
                3,
                format!("Line {line}: expected `x,y`, got '{trimmed}'"),
            ));
        };
        let x = parse_number(x_raw, line, "x")?;
        let y = parse_number(y_raw, line, "y")?;
        out.push(DataPoint::new(x, y));
    }
    Ok(out)
}

fn parse_number(raw: &str, line: usize, name: &str) -> Result<f64, AppError> {
    let trimmed = raw.trim();
    let value = trimmed
        .parse::<f64>()
        .map_err(|_| AppError::new(3, format!("Line {line}: invalid {name} value '{trimmed}'")))?;
    if !value.is_finite() {
        return Err(AppError::new(
            3,
            format!("Line {line}: non-finite {name} value '{trimmed}'"),
        ));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_pairs_with_whitespace() {
        let pts = parse_points("1,2\n  3.5 , -4.25  \n").unwrap();
        assert_eq!(pts.len(), 2);
        assert_eq!(pts[0], DataPoint::new(1.0, 2.0));
        assert_eq!(pts[1], DataPoint::new(3.5, -4.25));
    }

    #[test]
    fn skips_comments_blanks_and_header() {
        let text = "# sampled from a circle\nX,Y\n\n0,1\n1,0\n";
        let pts = parse_points(text).unwrap();
        assert_eq!(pts.len(), 2);
    }

    #[test]
    fn header_is_only_tolerated_before_data() {
        let err = parse_points("1,2\nx,y\n").unwrap_err();
        assert_eq!(err.exit_code(), 3);
        assert!(err.to_string().contains("Line 2"));
    }

    #[test]
    fn missing_comma_reports_the_line() {
        let err = parse_points("0,1\n2 3\n").unwrap_err();
        assert_eq!(err.exit_code(), 3);
        assert!(err.to_string().contains("Line 2"));
        assert!(err.to_string().contains("expected `x,y`"));
    }

    #[test]
    fn rejects_unparseable_and_non_finite_values() {
        let err = parse_points("a,1\n").unwrap_err();
        assert_eq!(err.exit_code(), 3);
        assert!(err.to_string().contains("invalid x value"));

        let err = parse_points("1,NaN\n").unwrap_err();
        assert_eq!(err.exit_code(), 3);
        assert!(err.to_string().contains("non-finite y value"));

        let err = parse_points("inf,0\n").unwrap_err();
        assert!(err.to_string().contains("non-finite x value"));
    }

    #[test]
    fn empty_input_is_an_empty_list() {
        assert!(parse_points("").unwrap().is_empty());
        assert!(parse_points("# only comments\n\n").unwrap().is_empty());
    }

    #[test]
    fn missing_file_is_a_usage_error() {
        let err = load_points(Path::new("/nonexistent/points.txt")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
