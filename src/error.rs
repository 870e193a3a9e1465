//! Error types.
//!
//! - `LoadError`: fatal to a load cycle (no canonical table is produced)
//! - `ViewError`: fatal to a single view only (the view is skipped)
//! - `AppError`: front-end boundary error carrying a process exit code

use thiserror::Error;

use crate::domain::Column;

/// Exit code for input/configuration problems.
pub const EXIT_INPUT: u8 = 2;
/// Exit code for "no usable data" (malformed source, empty table).
pub const EXIT_DATA: u8 = 3;
/// Exit code for runtime failures (terminal, network, export I/O).
pub const EXIT_RUNTIME: u8 = 4;

/// Why a load cycle failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("source not found (attempted: {})", attempted.join(", "))]
    SourceNotFound { attempted: Vec<String> },

    #[error("malformed source '{source_name}': {reason}")]
    MalformedSource { source_name: String, reason: String },

    #[error(
        "insufficient sources: need 2, found {found} plausible candidate(s){}",
        fmt_candidates(candidates)
    )]
    InsufficientSources { found: usize, candidates: Vec<String> },
}

fn fmt_candidates(candidates: &[String]) -> String {
    if candidates.is_empty() {
        String::new()
    } else {
        format!(" [{}]", candidates.join(", "))
    }
}

/// Why a view did not render.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewError {
    #[error("view '{view}' requires column `{}`, which is not present", column.name())]
    MissingColumn { view: &'static str, column: Column },
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

impl From<LoadError> for AppError {
    fn from(err: LoadError) -> Self {
        let code = match err {
            LoadError::MalformedSource { .. } => EXIT_DATA,
            LoadError::SourceNotFound { .. } | LoadError::InsufficientSources { .. } => EXIT_INPUT,
        };
        AppError::new(code, format!("Failed to load sales data: {err}"))
    }
}

impl From<ViewError> for AppError {
    fn from(err: ViewError) -> Self {
        AppError::new(EXIT_DATA, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_errors_map_to_exit_codes() {
        let not_found: AppError = LoadError::SourceNotFound {
            attempted: vec!["a.csv".to_string()],
        }
        .into();
        assert_eq!(not_found.exit_code(), EXIT_INPUT);
        assert!(not_found.to_string().contains("a.csv"));

        let malformed: AppError = LoadError::MalformedSource {
            source_name: "b.csv".to_string(),
            reason: "bad row".to_string(),
        }
        .into();
        assert_eq!(malformed.exit_code(), EXIT_DATA);
    }

    #[test]
    fn insufficient_sources_lists_candidates() {
        let err = LoadError::InsufficientSources {
            found: 1,
            candidates: vec!["parte_x.csv".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "insufficient sources: need 2, found 1 plausible candidate(s) [parte_x.csv]"
        );
    }
}
