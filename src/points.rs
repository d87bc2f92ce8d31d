use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use glam::Vec3;
use log::{error, info, warn};
use thiserror::Error;

/// Field labels in the order they appear on every data line.
const FIELDS: [&str; 6] = ["X", "Y", "Z", "r", "g", "b"];

/// A single colored point read from a point file.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32, z: f32, r: f32, g: f32, b: f32) -> Self {
        Self { x, y, z, r, g, b }
    }

    pub fn position(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }
}

/// Failure to read a point file from disk.
#[derive(Debug, Error)]
pub enum PointFileError {
    #[error("unable to open point file {}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("unable to read point file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Reason a data line was not turned into a point.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineError {
    #[error("expected `{0}:` label")]
    MissingLabel(&'static str),
    #[error("expected `,` before `{0}:`")]
    MissingSeparator(&'static str),
    #[error("value for `{0}` is not a number")]
    InvalidNumber(&'static str),
}

/// A line that was skipped while parsing.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedLine {
    /// 1-based line number within the file, header included.
    pub line_number: usize,
    pub content: String,
    pub reason: LineError,
}

/// Points parsed from a file together with the lines that were skipped.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PointCloud {
    pub points: Vec<Point>,
    pub rejected: Vec<RejectedLine>,
}

impl PointCloud {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Axis aligned `(min, max)` of all positions, or `None` for an empty cloud.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let mut positions = self.points.iter().map(Point::position);
        let first = positions.next()?;
        Some(positions.fold((first, first), |(min, max), p| (min.min(p), max.max(p))))
    }

    /// Interleaved vertex data for this cloud, see [`convert_points_to_floats`].
    pub fn to_floats(&self, scale: f32) -> Vec<f32> {
        convert_points_to_floats(&self.points, scale)
    }
}

/// Parses point data held in memory.
///
/// The first line is a header and is always ignored. Every following line
/// must read `X: <f>, Y: <f>, Z: <f>, r: <f>, g: <f>, b: <f>`; anything else
/// is recorded in [`PointCloud::rejected`] and parsing continues.
pub fn parse_points(data: &str) -> PointCloud {
    let mut cloud = PointCloud::default();
    for (index, line) in data.lines().enumerate().skip(1) {
        match parse_line(line) {
            Ok(point) => cloud.points.push(point),
            Err(reason) => cloud.rejected.push(RejectedLine {
                line_number: index + 1,
                content: line.to_string(),
                reason,
            }),
        }
    }
    cloud
}

/// Reads and parses a point file, surfacing I/O failures to the caller.
///
/// Bytes that are not valid UTF-8 are replaced rather than failing the whole
/// file, so a mangled header is still skipped and a mangled data line is only
/// rejected on its own.
pub fn try_load_points<P: AsRef<Path>>(path: P) -> Result<PointCloud, PointFileError> {
    let path = path.as_ref();
    let mut file = File::open(path).map_err(|source| PointFileError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .map_err(|source| PointFileError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    let cloud = parse_points(&String::from_utf8_lossy(&bytes));
    for rejected in &cloud.rejected {
        warn!(
            "Failed to read line {} ({}): {}",
            rejected.line_number, rejected.reason, rejected.content
        );
    }
    info!(
        "Loaded {} point(s) from {} ({} line(s) skipped)",
        cloud.len(),
        path.display(),
        cloud.rejected.len()
    );
    Ok(cloud)
}

/// Best-effort loader: an unreadable file is logged and yields an empty cloud.
pub fn load_cloud<P: AsRef<Path>>(path: P) -> PointCloud {
    try_load_points(path).unwrap_or_else(|err| {
        error!("{err}: {}", source_message(&err));
        PointCloud::default()
    })
}

/// Best-effort loader returning only the parsed points, see [`load_cloud`].
pub fn load_points<P: AsRef<Path>>(path: P) -> Vec<Point> {
    load_cloud(path).points
}

/// Flattens points into `x, y, z, r, g, b` runs with the position scaled.
pub fn convert_points_to_floats(points: &[Point], scale: f32) -> Vec<f32> {
    let mut floats = Vec::with_capacity(points.len() * 6);
    for point in points {
        floats.extend_from_slice(&[
            point.x * scale,
            point.y * scale,
            point.z * scale,
            point.r,
            point.g,
            point.b,
        ]);
    }
    floats
}

fn source_message(err: &PointFileError) -> String {
    match err {
        PointFileError::Open { source, .. } | PointFileError::Read { source, .. } => {
            source.to_string()
        }
    }
}

fn parse_line(line: &str) -> Result<Point, LineError> {
    let mut rest = line;
    let mut values = [0.0f32; 6];
    for (index, label) in FIELDS.iter().copied().enumerate() {
        if index > 0 {
            rest = rest
                .strip_prefix(',')
                .ok_or(LineError::MissingSeparator(label))?
                .trim_start();
        }
        rest = rest
            .strip_prefix(label)
            .and_then(|tail| tail.strip_prefix(':'))
            .ok_or(LineError::MissingLabel(label))?;
        let (value, tail) = scan_float(rest.trim_start()).ok_or(LineError::InvalidNumber(label))?;
        values[index] = value;
        rest = tail;
    }
    let [x, y, z, r, g, b] = values;
    Ok(Point::new(x, y, z, r, g, b))
}

/// Reads the longest decimal float prefix of `input`, `scanf` style.
fn scan_float(input: &str) -> Option<(f32, &str)> {
    let bytes = input.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    if let Some(len) = special_float_len(&input[end..]) {
        end += len;
        let value = input[..end].parse::<f32>().ok()?;
        return Some((value, &input[end..]));
    }
    let int_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut digits = end - int_start;
    if bytes.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while bytes.get(frac_end).is_some_and(u8::is_ascii_digit) {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        end = frac_end;
    }
    if digits == 0 {
        return None;
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }
    let value = input[..end].parse::<f32>().ok()?;
    Some((value, &input[end..]))
}

/// Length of a leading `inf`, `infinity` or `nan` token, ignoring case.
fn special_float_len(input: &str) -> Option<usize> {
    let starts_with = |word: &str| {
        input
            .get(..word.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(word))
    };
    ["infinity", "inf", "nan"]
        .into_iter()
        .find(|word| starts_with(*word))
        .map(str::len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = "header\n\
        X: 1.0, Y: 2.0, Z: 3.0, r: 0.1, g: 0.2, b: 0.3\n\
        garbage line\n\
        X: -1.0, Y: 0.0, Z: 0.0, r: 1.0, g: 0.0, b: 0.0\n";

    #[test]
    fn header_only_yields_no_points() {
        let cloud = parse_points("X: 1.0, Y: 2.0, Z: 3.0, r: 0.1, g: 0.2, b: 0.3\n");
        assert!(cloud.is_empty());
        assert!(cloud.rejected.is_empty());
        assert!(cloud.bounds().is_none());
    }

    #[test]
    fn keeps_points_in_file_order() {
        let data = "count 3\n\
            X: 0, Y: 0, Z: 0, r: 1, g: 0, b: 0\n\
            X: 1, Y: 0, Z: 0, r: 0, g: 1, b: 0\n\
            X: 2, Y: 0, Z: 0, r: 0, g: 0, b: 1\n";
        let cloud = parse_points(data);
        let xs: Vec<f32> = cloud.points.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn malformed_lines_are_skipped_and_reported() {
        let data = "header\n\
            X: 1.0, Y: 2.0, Z: 3.0, r: 0.1, g: 0.2\n\
            X: 4.0, Y: 5.0, Z: 6.0, r: 0.4, g: 0.5, b: 0.6\n";
        let cloud = parse_points(data);
        assert_eq!(cloud.points, vec![Point::new(4.0, 5.0, 6.0, 0.4, 0.5, 0.6)]);
        assert_eq!(cloud.rejected.len(), 1);
        assert_eq!(cloud.rejected[0].line_number, 2);
        assert_eq!(cloud.rejected[0].reason, LineError::MissingSeparator("b"));
    }

    #[test]
    fn rejects_non_numeric_values() {
        let cloud = parse_points("h\nX: one, Y: 2, Z: 3, r: 0, g: 0, b: 0\n");
        assert!(cloud.is_empty());
        assert_eq!(cloud.rejected[0].reason, LineError::InvalidNumber("X"));
    }

    #[test]
    fn tolerates_exponents_crlf_and_trailing_text() {
        let data = "h\r\nX: 1e2, Y:-2.5, Z: .5, r: 1., g: +0.25, b: 0.75 extra\r\n";
        let cloud = parse_points(data);
        assert_eq!(
            cloud.points,
            vec![Point::new(100.0, -2.5, 0.5, 1.0, 0.25, 0.75)]
        );
    }

    #[test]
    fn accepts_infinity_and_nan_tokens() {
        let cloud = parse_points("h\nX: inf, Y: -Infinity, Z: NaN, r: 0, g: 0, b: 0\n");
        assert_eq!(cloud.len(), 1);
        let point = cloud.points[0];
        assert_eq!(point.x, f32::INFINITY);
        assert_eq!(point.y, f32::NEG_INFINITY);
        assert!(point.z.is_nan());
    }

    #[test]
    fn non_utf8_header_is_still_skipped() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"Spiralpunkter \xf8\xe6\xe5\n").unwrap();
        file.write_all(b"X: 1, Y: 2, Z: 3, r: 0.5, g: 0.5, b: 0.5\n").unwrap();

        let points = load_points(file.path());
        assert_eq!(points, vec![Point::new(1.0, 2.0, 3.0, 0.5, 0.5, 0.5)]);
    }

    #[test]
    fn non_utf8_data_line_is_rejected_alone() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"header\n").unwrap();
        file.write_all(b"X: 1, Y: 0, Z: 0, r: 1, g: 0, b: 0\n").unwrap();
        file.write_all(b"\xff garbage\n").unwrap();
        file.write_all(b"X: 2, Y: 0, Z: 0, r: 0, g: 1, b: 0\n").unwrap();

        let cloud = try_load_points(file.path()).unwrap();
        let xs: Vec<f32> = cloud.points.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![1.0, 2.0]);
        assert_eq!(cloud.rejected.len(), 1);
        assert_eq!(cloud.rejected[0].line_number, 3);
        assert_eq!(cloud.rejected[0].reason, LineError::MissingLabel("X"));
    }

    #[test]
    fn converter_scales_positions_only() {
        let points = [Point::new(2.0, -4.0, 8.0, 0.1, 0.2, 0.3)];
        for scale in [0.0, -1.0, 0.25] {
            let floats = convert_points_to_floats(&points, scale);
            assert_eq!(floats.len(), 6);
            assert_eq!(&floats[..3], &[2.0 * scale, -4.0 * scale, 8.0 * scale]);
            assert_eq!(&floats[3..], &[0.1, 0.2, 0.3]);
        }
    }

    #[test]
    fn sample_file_converts_end_to_end() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let points = load_points(file.path());
        assert_eq!(
            convert_points_to_floats(&points, 0.5),
            vec![0.5, 1.0, 1.5, 0.1, 0.2, 0.3, -0.5, 0.0, 0.0, 1.0, 0.0, 0.0]
        );
    }

    #[test]
    fn missing_file_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.txt");
        assert!(load_points(&path).is_empty());
        assert_eq!(load_cloud(&path), PointCloud::default());
        assert!(matches!(
            try_load_points(&path),
            Err(PointFileError::Open { .. })
        ));
    }

    #[test]
    fn bounds_cover_all_points() {
        let cloud = parse_points(SAMPLE);
        let (min, max) = cloud.bounds().unwrap();
        assert_eq!(min, Vec3::new(-1.0, 0.0, 0.0));
        assert_eq!(max, Vec3::new(1.0, 2.0, 3.0));
    }
}
