// ABOUTME: Diagnostics accumulator for non-fatal warnings during a promotion step.
// ABOUTME: Collects warnings that shouldn't fail a command but should be shown to users.

/// Collects non-fatal warnings during client operations.
#[derive(Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Record a warning, auto-logging it via tracing.
    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!("{}", warning.message);
        self.warnings.push(warning);
    }

    /// Get all collected warnings.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Check if any warnings were collected.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// A non-fatal warning.
#[derive(Debug, Clone)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    /// Logout failed; the session will expire on its own.
    pub fn logout(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::Logout,
            message: message.into(),
        }
    }

    /// A commit object had no task to run.
    pub fn missing_task(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::MissingTask,
            message: message.into(),
        }
    }

    /// A selection of objects to run came back empty.
    pub fn nothing_to_run(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::NothingToRun,
            message: message.into(),
        }
    }

    /// Values could not be handed to later pipeline steps.
    pub fn pipeline_env(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::PipelineEnv,
            message: message.into(),
        }
    }
}

/// Categories of warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    Logout,
    /// Object without an appContextId.
    MissingTask,
    NothingToRun,
    /// GITHUB_ENV not set, so session ids were not exported.
    PipelineEnv,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostics_starts_empty() {
        let diag = Diagnostics::default();
        assert!(!diag.has_warnings());
        assert!(diag.warnings().is_empty());
    }

    #[test]
    fn diagnostics_collects_warnings() {
        let mut diag = Diagnostics::default();

        diag.warn(Warning::logout("session already expired"));
        diag.warn(Warning::missing_task("object obj-9 has no appContextId"));

        assert!(diag.has_warnings());
        assert_eq!(diag.warnings().len(), 2);
    }

    #[test]
    fn warning_constructors_set_correct_kind() {
        assert_eq!(Warning::logout("t").kind, WarningKind::Logout);
        assert_eq!(Warning::missing_task("t").kind, WarningKind::MissingTask);
        assert_eq!(Warning::nothing_to_run("t").kind, WarningKind::NothingToRun);
        assert_eq!(Warning::pipeline_env("t").kind, WarningKind::PipelineEnv);
    }
}
