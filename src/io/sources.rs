//! Source resolution: turning a `SourceSpec` into readable inputs.
//!
//! Directory resolution is a best-effort heuristic, mirroring how sample
//! datasets tend to get renamed in practice:
//!
//! 1. if every expected file exists, use them in order
//! 2. otherwise list `*.csv` files (sorted by name) and keep those whose name
//!    contains one of [`FUZZY_MARKERS`]
//! 3. take the first two candidates; fewer than two is `InsufficientSources`

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::data::RemoteClient;
use crate::domain::{CanonicalTable, SourceSpec};
use crate::error::LoadError;
use crate::io::ingest::{RawSource, build_canonical, read_source};

/// File-name fragments that mark a plausible sales sample.
pub const FUZZY_MARKERS: [&str; 4] = ["parte", "muestra", "sample", "test"];

/// How many sources the fuzzy fallback needs.
pub const REQUIRED_SOURCES: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocation {
    Local(PathBuf),
    Remote(String),
}

/// A source chosen for loading, with a display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSource {
    pub name: String,
    pub location: SourceLocation,
}

impl ResolvedSource {
    fn local(path: PathBuf) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            name,
            location: SourceLocation::Local(path),
        }
    }
}

/// Resolve, read, and normalize every source of `spec` into a canonical table.
pub fn load_table(spec: &SourceSpec) -> Result<CanonicalTable, LoadError> {
    let resolved = resolve_sources(spec)?;
    let raw = read_sources(&resolved)?;
    Ok(build_canonical(raw))
}

/// Decide which sources to read, without reading them.
pub fn resolve_sources(spec: &SourceSpec) -> Result<Vec<ResolvedSource>, LoadError> {
    match spec {
        SourceSpec::Directory { dir, expected } => resolve_directory(dir, expected),
        SourceSpec::Files(paths) => {
            if paths.is_empty() {
                return Err(LoadError::InsufficientSources {
                    found: 0,
                    candidates: Vec::new(),
                });
            }
            let missing: Vec<String> = paths
                .iter()
                .filter(|p| !p.is_file())
                .map(|p| p.display().to_string())
                .collect();
            if !missing.is_empty() {
                return Err(LoadError::SourceNotFound { attempted: missing });
            }
            Ok(paths.iter().cloned().map(ResolvedSource::local).collect())
        }
        SourceSpec::Remote(urls) => {
            if urls.is_empty() {
                return Err(LoadError::InsufficientSources {
                    found: 0,
                    candidates: Vec::new(),
                });
            }
            Ok(urls
                .iter()
                .map(|u| ResolvedSource {
                    name: u.clone(),
                    location: SourceLocation::Remote(u.clone()),
                })
                .collect())
        }
    }
}

fn resolve_directory(dir: &Path, expected: &[String]) -> Result<Vec<ResolvedSource>, LoadError> {
    if !dir.is_dir() {
        return Err(LoadError::SourceNotFound {
            attempted: vec![dir.display().to_string()],
        });
    }

    let expected_paths: Vec<PathBuf> = expected.iter().map(|name| dir.join(name)).collect();
    let missing: Vec<&PathBuf> = expected_paths.iter().filter(|p| !p.is_file()).collect();
    if !expected_paths.is_empty() && missing.is_empty() {
        return Ok(expected_paths.into_iter().map(ResolvedSource::local).collect());
    }

    warn!(
        missing = ?missing.iter().map(|p| p.display().to_string()).collect::<Vec<_>>(),
        "expected source files not found; trying fuzzy match"
    );

    let listing = list_csv_files(dir).map_err(|e| {
        warn!(dir = %dir.display(), error = %e, "failed to list directory");
        LoadError::SourceNotFound {
            attempted: vec![dir.display().to_string()],
        }
    })?;
    let candidates = fuzzy_candidates(&listing);

    if candidates.len() < REQUIRED_SOURCES {
        return Err(LoadError::InsufficientSources {
            found: candidates.len(),
            candidates,
        });
    }

    let chosen: Vec<String> = candidates.into_iter().take(REQUIRED_SOURCES).collect();
    info!(chosen = ?chosen, "using fuzzy-matched sources");
    Ok(chosen
        .into_iter()
        .map(|name| ResolvedSource::local(dir.join(name)))
        .collect())
}

/// `*.csv` file names in `dir`, sorted so that "listing order" is reproducible.
fn list_csv_files(dir: &Path) -> std::io::Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.to_lowercase().ends_with(".csv") {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

/// File names that look like sales sample parts, in input order.
pub fn fuzzy_candidates(file_names: &[String]) -> Vec<String> {
    file_names
        .iter()
        .filter(|name| {
            let lower = name.to_lowercase();
            FUZZY_MARKERS.iter().any(|m| lower.contains(m))
        })
        .cloned()
        .collect()
}

/// Read every resolved source, in order.
pub fn read_sources(sources: &[ResolvedSource]) -> Result<Vec<RawSource>, LoadError> {
    let mut remote: Option<RemoteClient> = None;
    let mut out = Vec::with_capacity(sources.len());

    for src in sources {
        let raw = match &src.location {
            SourceLocation::Local(path) => {
                let file = File::open(path).map_err(|e| {
                    warn!(path = %path.display(), error = %e, "failed to open source");
                    LoadError::SourceNotFound {
                        attempted: vec![path.display().to_string()],
                    }
                })?;
                read_source(&src.name, file)?
            }
            SourceLocation::Remote(url) => {
                let client = remote.get_or_insert_with(RemoteClient::new);
                let body = client.fetch_text(url)?;
                read_source(&src.name, body.as_bytes())?
            }
        };
        out.push(raw);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Column;

    const PART: &str = "date,store_nbr,family,sales\n2016-01-01,1,BREAD,10\n2016-01-02,2,DAIRY,5\n";

    fn write(dir: &Path, name: &str, body: &str) {
        fs::write(dir.join(name), body).unwrap();
    }

    #[test]
    fn expected_files_are_preferred() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "parte_1_muestra.csv", PART);
        write(tmp.path(), "parte_2_muestra.csv", PART);
        write(tmp.path(), "a_sample.csv", PART);

        let resolved = resolve_sources(&SourceSpec::directory(tmp.path())).unwrap();
        let names: Vec<_> = resolved.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["parte_1_muestra.csv", "parte_2_muestra.csv"]);
    }

    #[test]
    fn fuzzy_match_with_exactly_two_candidates_loads() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "ventas_parte1.csv", PART);
        write(tmp.path(), "ventas_parte2.CSV", PART);
        write(tmp.path(), "stores.csv", PART);

        let table = load_table(&SourceSpec::directory(tmp.path())).unwrap();
        assert_eq!(table.len(), 4);
        assert_eq!(table.sources().len(), 2);
        assert_eq!(table.sources()[0].name, "ventas_parte1.csv");
        assert!(table.has(Column::Family));
    }

    #[test]
    fn fuzzy_match_with_one_candidate_fails() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "muestra.csv", PART);
        write(tmp.path(), "stores.csv", PART);
        write(tmp.path(), "notes.txt", "sample");

        let err = load_table(&SourceSpec::directory(tmp.path())).unwrap_err();
        assert_eq!(
            err,
            LoadError::InsufficientSources {
                found: 1,
                candidates: vec!["muestra.csv".to_string()],
            }
        );
    }

    #[test]
    fn fuzzy_match_with_no_candidates_fails() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "stores.csv", PART);
        let err = load_table(&SourceSpec::directory(tmp.path())).unwrap_err();
        assert!(matches!(err, LoadError::InsufficientSources { found: 0, .. }));
    }

    #[test]
    fn missing_directory_is_source_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let gone = tmp.path().join("nope");
        let err = resolve_sources(&SourceSpec::directory(&gone)).unwrap_err();
        assert!(matches!(err, LoadError::SourceNotFound { .. }));
    }

    #[test]
    fn explicit_files_report_missing_paths() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "a.csv", PART);
        let spec = SourceSpec::Files(vec![tmp.path().join("a.csv"), tmp.path().join("b.csv")]);
        match resolve_sources(&spec).unwrap_err() {
            LoadError::SourceNotFound { attempted } => {
                assert_eq!(attempted.len(), 1);
                assert!(attempted[0].ends_with("b.csv"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn malformed_file_surfaces_as_malformed_source() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "a.csv", PART);
        write(tmp.path(), "b.csv", "date,sales\n2016-01-01\n");
        let spec = SourceSpec::Files(vec![tmp.path().join("a.csv"), tmp.path().join("b.csv")]);
        let err = load_table(&spec).unwrap_err();
        assert!(matches!(err, LoadError::MalformedSource { ref source_name, .. } if source_name == "b.csv"));
    }

    #[test]
    fn fuzzy_candidates_keep_listing_order() {
        let names = vec![
            "a_test.csv".to_string(),
            "b.csv".to_string(),
            "c_SAMPLE.csv".to_string(),
            "d_muestra.csv".to_string(),
        ];
        assert_eq!(
            fuzzy_candidates(&names),
            vec![
                "a_test.csv".to_string(),
                "c_SAMPLE.csv".to_string(),
                "d_muestra.csv".to_string()
            ]
        );
    }
}
