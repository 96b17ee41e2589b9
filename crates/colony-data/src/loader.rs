//! Locating and parsing the two data files of a settlement directory.
//!
//! Each file may be RON, TOML or JSON, chosen by extension. Only one format
//! per file may be present.

use serde::de::DeserializeOwned;
use std::fmt::Display;
use std::path::{Path, PathBuf};

/// Errors that can occur while loading settlement data.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    #[error("required file '{file}' not found in {dir}")]
    MissingRequired { file: String, dir: PathBuf },

    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    #[error("conflicting formats: {a} and {b}")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// A settlement names a building type that was never defined.
    #[error("unknown building type '{name}' in {file}")]
    UnresolvedRef { file: PathBuf, name: String },

    #[error("building type '{name}' defined twice in {file}")]
    DuplicateName { file: PathBuf, name: String },

    /// A building type's figures cannot describe a real building.
    #[error("invalid building type '{name}' in {file}: {detail}")]
    InvalidBuilding {
        file: PathBuf,
        name: String,
        detail: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl DataLoadError {
    pub(crate) fn parse(path: &Path, detail: impl Display) -> Self {
        DataLoadError::Parse {
            file: path.to_path_buf(),
            detail: detail.to_string(),
        }
    }
}

const EXTENSIONS: [&str; 3] = ["ron", "toml", "json"];

/// Find `{base_name}.{ron,toml,json}` in `dir`. Exactly one must exist.
pub(crate) fn locate(dir: &Path, base_name: &str) -> Result<PathBuf, DataLoadError> {
    let mut found: Option<PathBuf> = None;
    for ext in EXTENSIONS {
        let candidate = dir.join(format!("{base_name}.{ext}"));
        if !candidate.exists() {
            continue;
        }
        if let Some(existing) = found {
            return Err(DataLoadError::ConflictingFormats {
                a: existing,
                b: candidate,
            });
        }
        found = Some(candidate);
    }
    found.ok_or_else(|| DataLoadError::MissingRequired {
        file: base_name.to_string(),
        dir: dir.to_path_buf(),
    })
}

/// Parse a whole file as `T`.
pub(crate) fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    read(path, None)
}

/// Parse a list of `T`. RON and JSON files hold the list itself; a TOML file
/// holds it under `toml_key` as an array of tables.
pub(crate) fn read_list<T: DeserializeOwned>(
    path: &Path,
    toml_key: &str,
) -> Result<Vec<T>, DataLoadError> {
    read(path, Some(toml_key))
}

fn read<T: DeserializeOwned>(path: &Path, toml_key: Option<&str>) -> Result<T, DataLoadError> {
    let ext = path.extension().and_then(|e| e.to_str());
    if !ext.is_some_and(|ext| EXTENSIONS.contains(&ext)) {
        return Err(DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        });
    }
    let content = std::fs::read_to_string(path)?;

    match (ext, toml_key) {
        (Some("ron"), _) => ron::from_str(&content).map_err(|e| DataLoadError::parse(path, e)),
        (Some("json"), _) => {
            serde_json::from_str(&content).map_err(|e| DataLoadError::parse(path, e))
        }
        (_, None) => toml::from_str(&content).map_err(|e| DataLoadError::parse(path, e)),
        (_, Some(key)) => {
            let mut table: toml::Table =
                toml::from_str(&content).map_err(|e| DataLoadError::parse(path, e))?;
            let list = table
                .remove(key)
                .ok_or_else(|| DataLoadError::parse(path, format!("missing key '{key}'")))?;
            list.try_into()
                .map_err(|e: toml::de::Error| DataLoadError::parse(path, e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{BuildingTypeData, SettlementData};
    use std::fs;

    fn make_test_dir(suffix: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "colony_data_loader_{suffix}_{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn cleanup(dir: &Path) {
        let _ = fs::remove_dir_all(dir);
    }

    const RON_TYPES: &str = r#"[
        (name: "Lander Hab", full_power: 10.0, power_down_power: 4.0),
        (name: "Workshop", full_power: 6.0, power_down_power: 1.0),
    ]"#;

    const JSON_TYPES: &str = r#"[
        {"name": "Lander Hab", "full_power": 10.0, "power_down_power": 4.0},
        {"name": "Workshop", "full_power": 6.0, "power_down_power": 1.0}
    ]"#;

    const TOML_TYPES: &str = r#"
[[buildings]]
name = "Lander Hab"
full_power = 10.0
power_down_power = 4.0

[[buildings]]
name = "Workshop"
full_power = 6.0
power_down_power = 1.0
"#;

    #[test]
    fn locate_single_file() {
        let dir = make_test_dir("locate_found");
        fs::write(dir.join("buildings.toml"), "").unwrap();
        assert_eq!(locate(&dir, "buildings").unwrap(), dir.join("buildings.toml"));
        cleanup(&dir);
    }

    #[test]
    fn locate_missing_names_the_file() {
        let dir = make_test_dir("locate_missing");
        let result = locate(&dir, "settlement");
        assert!(matches!(
            result,
            Err(DataLoadError::MissingRequired { ref file, .. }) if file == "settlement"
        ));
        cleanup(&dir);
    }

    #[test]
    fn locate_rejects_two_formats() {
        let dir = make_test_dir("locate_conflict");
        fs::write(dir.join("buildings.ron"), "[]").unwrap();
        fs::write(dir.join("buildings.json"), "[]").unwrap();
        assert!(matches!(
            locate(&dir, "buildings"),
            Err(DataLoadError::ConflictingFormats { .. })
        ));
        cleanup(&dir);
    }

    #[test]
    fn read_list_all_formats() {
        let dir = make_test_dir("list_formats");
        for (file, content) in [
            ("a.ron", RON_TYPES),
            ("b.json", JSON_TYPES),
            ("c.toml", TOML_TYPES),
        ] {
            let path = dir.join(file);
            fs::write(&path, content).unwrap();

            let types: Vec<BuildingTypeData> = read_list(&path, "buildings").unwrap();
            assert_eq!(types.len(), 2, "{file}");
            assert_eq!(types[0].name, "Lander Hab");
            assert!((types[1].power_down_power - 1.0).abs() < f64::EPSILON);
        }
        cleanup(&dir);
    }

    #[test]
    fn read_list_toml_missing_key() {
        let dir = make_test_dir("list_toml_missing");
        let path = dir.join("buildings.toml");
        fs::write(&path, r#"foo = "bar""#).unwrap();

        let result: Result<Vec<BuildingTypeData>, _> = read_list(&path, "buildings");
        assert!(matches!(
            result,
            Err(DataLoadError::Parse { ref detail, .. }) if detail.contains("buildings")
        ));
        cleanup(&dir);
    }

    #[test]
    fn read_document_toml_settlement() {
        let dir = make_test_dir("doc_toml");
        let path = dir.join("settlement.toml");
        fs::write(&path, "name = \"Gale Base\"\nbuildings = []\n").unwrap();

        let data: SettlementData = read_document(&path).unwrap();
        assert_eq!(data.name, "Gale Base");
        assert!(data.buildings.is_empty());
        cleanup(&dir);
    }

    #[test]
    fn read_rejects_unknown_extension() {
        for name in ["buildings.yaml", "buildings"] {
            let result: Result<SettlementData, _> = read_document(Path::new(name));
            assert!(matches!(result, Err(DataLoadError::UnsupportedFormat { .. })));
        }
    }

    #[test]
    fn read_reports_parse_and_io_errors() {
        let dir = make_test_dir("read_errors");
        let path = dir.join("bad.ron");
        fs::write(&path, "this is not valid RON {{{").unwrap();

        let result: Result<Vec<BuildingTypeData>, _> = read_document(&path);
        assert!(matches!(result, Err(DataLoadError::Parse { .. })));

        let result: Result<Vec<BuildingTypeData>, _> = read_document(&dir.join("gone.json"));
        assert!(matches!(result, Err(DataLoadError::Io(_))));
        cleanup(&dir);
    }

    #[test]
    fn error_display_messages() {
        let e = DataLoadError::MissingRequired {
            file: "settlement".to_string(),
            dir: PathBuf::from("/data"),
        };
        assert!(e.to_string().contains("settlement"));
        assert!(e.to_string().contains("/data"));

        let e = DataLoadError::UnresolvedRef {
            file: PathBuf::from("settlement.ron"),
            name: "Greenhouse".to_string(),
        };
        assert!(e.to_string().contains("unknown building type 'Greenhouse'"));

        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let data_err: DataLoadError = io_err.into();
        assert!(data_err.to_string().contains("file not found"));
    }
}
