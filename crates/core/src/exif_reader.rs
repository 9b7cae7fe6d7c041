use crate::fs_util::{ensure_dir, RootAccessError};
use exif::{In, Reader, Tag, Value};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

pub const EXIF_EXTENSIONS: &[&str] = &["jpg", "jpeg", "tiff", "tif"];

#[derive(Debug, Error)]
pub enum ExifError {
    #[error("image file does not exist: {}", .0.display())]
    NotFound(PathBuf),
    #[error("unsupported image format: {ext} (supported: jpg, jpeg, tiff, tif)")]
    UnsupportedFormat { path: PathBuf, ext: String },
    #[error("failed to open image file {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to decode EXIF data in {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: exif::Error,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExifField {
    pub tag: String,
    pub ifd: String,
    pub value: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GpsCoordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExifReport {
    pub path: PathBuf,
    pub fields: Vec<ExifField>,
    pub gps: Option<GpsCoordinates>,
}

#[derive(Debug, Default)]
pub struct ExifTargets {
    pub files: Vec<PathBuf>,
    pub warnings: Vec<(PathBuf, String)>,
}

pub fn is_exif_candidate(path: &Path) -> bool {
    path.extension()
        .map(|ext| {
            let ext = ext.to_string_lossy();
            EXIF_EXTENSIONS
                .iter()
                .any(|supported| ext.eq_ignore_ascii_case(supported))
        })
        .unwrap_or(false)
}

/// Reads every EXIF field of one image. The extension is checked before the
/// file is opened, so unsupported files never reach the decoder.
pub fn read_exif_report(path: &Path) -> Result<ExifReport, ExifError> {
    if !path.exists() {
        return Err(ExifError::NotFound(path.to_path_buf()));
    }
    if !is_exif_candidate(path) {
        let ext = path
            .extension()
            .map(|v| format!(".{}", v.to_string_lossy()))
            .unwrap_or_default();
        return Err(ExifError::UnsupportedFormat {
            path: path.to_path_buf(),
            ext,
        });
    }

    let file = File::open(path).map_err(|source| ExifError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let mut buf = BufReader::new(file);
    let exif = Reader::new()
        .read_from_container(&mut buf)
        .map_err(|source| ExifError::Decode {
            path: path.to_path_buf(),
            source,
        })?;

    let fields = exif
        .fields()
        .map(|field| ExifField {
            tag: field.tag.to_string(),
            ifd: field.ifd_num.to_string(),
            value: field.display_value().with_unit(&exif).to_string(),
        })
        .collect();

    Ok(ExifReport {
        path: path.to_path_buf(),
        fields,
        gps: gps_coordinates(&exif),
    })
}

/// Supported images under `dir`, sorted by name. Only `dir` itself is
/// listed unless `recursive` is set.
pub fn collect_exif_targets(dir: &Path, recursive: bool) -> Result<ExifTargets, RootAccessError> {
    ensure_dir(dir)?;

    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut targets = ExifTargets::default();
    for entry in WalkDir::new(dir).max_depth(max_depth).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                let path = err.path().unwrap_or(dir).to_path_buf();
                targets.warnings.push((path, err.to_string()));
                continue;
            }
        };
        if entry.file_type().is_dir() {
            continue;
        }
        if is_exif_candidate(entry.path()) {
            targets.files.push(entry.into_path());
        }
    }

    Ok(targets)
}

fn gps_coordinates(exif: &exif::Exif) -> Option<GpsCoordinates> {
    let mut latitude = degrees(exif, Tag::GPSLatitude)?;
    let mut longitude = degrees(exif, Tag::GPSLongitude)?;
    if reference(exif, Tag::GPSLatitudeRef) == Some('S') {
        latitude = -latitude;
    }
    if reference(exif, Tag::GPSLongitudeRef) == Some('W') {
        longitude = -longitude;
    }
    Some(GpsCoordinates {
        latitude,
        longitude,
    })
}

// degrees, minutes, seconds
fn degrees(exif: &exif::Exif, tag: Tag) -> Option<f64> {
    let field = exif.get_field(tag, In::PRIMARY)?;
    match &field.value {
        Value::Rational(parts) if !parts.is_empty() => Some(
            parts
                .iter()
                .take(3)
                .zip([1.0, 60.0, 3600.0])
                .map(|(part, scale)| part.to_f64() / scale)
                .sum(),
        ),
        _ => None,
    }
}

fn reference(exif: &exif::Exif, tag: Tag) -> Option<char> {
    match &exif.get_field(tag, In::PRIMARY)?.value {
        Value::Ascii(values) => values
            .first()
            .and_then(|v| v.first())
            .map(|b| b.to_ascii_uppercase() as char),
        _ => None,
    }
}
