//! Recoverable build issues and the aggregate report.
//!
//! None of these abort a build. Reference errors exclude the affected objects
//! from the output graph; geometry warnings only describe a correction.

use thiserror::Error;

use crate::core::types::Vec3;

use super::validate::ValidationIssue;

/// A parent reference that cannot be resolved.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ReferenceError {
    #[error("object '{object}' references unknown parent '{parent}'")]
    Dangling { object: String, parent: String },

    #[error("object '{object}' is part of a parent cycle: {}", chain.join(" -> "))]
    Cycle { object: String, chain: Vec<String> },

    #[error("object '{object}' excluded because ancestor '{ancestor}' did not resolve")]
    Orphaned { object: String, ancestor: String },

    #[error("duplicate object id '{id}' (object {index} excluded)")]
    DuplicateObjectId { id: String, index: usize },

    #[error("duplicate room name '{name}' (room {index} excluded)")]
    DuplicateRoomName { name: String, index: usize },
}

impl ReferenceError {
    /// Identifier of the excluded object or room.
    pub fn subject(&self) -> &str {
        match self {
            ReferenceError::Dangling { object, .. }
            | ReferenceError::Cycle { object, .. }
            | ReferenceError::Orphaned { object, .. } => object,
            ReferenceError::DuplicateObjectId { id, .. } => id,
            ReferenceError::DuplicateRoomName { name, .. } => name,
        }
    }
}

/// A non-fatal geometric correction.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum GeometryWarning {
    #[error("object '{object}' clamped into room '{room}' bounds: {from} -> {to}")]
    Clamped {
        object: String,
        room: String,
        from: Vec3,
        to: Vec3,
    },

    #[error("{location}: '{field}' replaced by default")]
    VectorReplaced { location: String, field: String },

    #[error("object '{object}' moved {offset:.2} vertically to rest on '{parent}'")]
    Aligned {
        object: String,
        parent: String,
        offset: f32,
    },
}

/// Everything a build had to say besides its output graph.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BuildReport {
    pub schema_issues: Vec<ValidationIssue>,
    pub reference_errors: Vec<ReferenceError>,
    pub warnings: Vec<GeometryWarning>,
}

impl BuildReport {
    /// True when no issue of any kind was recorded.
    pub fn is_clean(&self) -> bool {
        self.schema_issues.is_empty() && self.reference_errors.is_empty() && self.warnings.is_empty()
    }

    /// Ids of objects and rooms left out of the output graph.
    pub fn excluded(&self) -> Vec<&str> {
        self.reference_errors.iter().map(ReferenceError::subject).collect()
    }

    /// One-line counts summary.
    pub fn summary(&self) -> String {
        format!(
            "{} schema issues, {} reference errors, {} geometry warnings",
            self.schema_issues.len(),
            self.reference_errors.len(),
            self.warnings.len()
        )
    }

    /// Log every entry at a level matching its severity.
    pub fn log(&self) {
        for issue in &self.schema_issues {
            log::warn!("{}", issue);
        }
        for error in &self.reference_errors {
            log::error!("{}", error);
        }
        for warning in &self.warnings {
            log::info!("{}", warning);
        }
        log::info!("Build report: {}", self.summary());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_message() {
        let err = ReferenceError::Cycle {
            object: "a".into(),
            chain: vec!["a".into(), "b".into(), "a".into()],
        };
        assert_eq!(err.to_string(), "object 'a' is part of a parent cycle: a -> b -> a");
        assert_eq!(err.subject(), "a");
    }

    #[test]
    fn test_report_summary_and_excluded() {
        let mut report = BuildReport::default();
        assert!(report.is_clean());

        report.reference_errors.push(ReferenceError::Dangling {
            object: "lamp".into(),
            parent: "ghost".into(),
        });
        report.warnings.push(GeometryWarning::Aligned {
            object: "lamp".into(),
            parent: "table".into(),
            offset: 5.0,
        });

        assert!(!report.is_clean());
        assert_eq!(report.excluded(), vec!["lamp"]);
        assert_eq!(report.summary(), "0 schema issues, 1 reference errors, 1 geometry warnings");
    }
}
