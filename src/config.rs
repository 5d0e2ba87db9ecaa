//! Run configuration for the dump pipeline.
//!
//! Built once from command-line flags and passed explicitly into
//! [`DumpPipeline`](crate::engine::DumpPipeline). Nothing here is global.

// ============================================================================
// CONFIGURATION TYPES
// ============================================================================

/// How user-facing failures (unreadable path, syntax error) are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailureMode {
    /// Emit a structured `error` document on stdout.
    #[default]
    Document,
    /// Abort the process with a panic carrying the error message.
    Panic,
}

/// What gets printed for a successful run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// The canonical JSON document.
    #[default]
    Json,
    /// The lowered input tree in Rust debug form.
    Builtin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DumpConfig {
    pub failure_mode: FailureMode,
    pub format: OutputFormat,
    /// Indent JSON output. Ignored for the builtin format.
    pub pretty: bool,
}

impl DumpConfig {
    pub fn from_flags(panic: bool, builtin_dump: bool, pretty: bool) -> Self {
        Self {
            failure_mode: if panic {
                FailureMode::Panic
            } else {
                FailureMode::Document
            },
            format: if builtin_dump {
                OutputFormat::Builtin
            } else {
                OutputFormat::Json
            },
            pretty,
        }
    }

    pub fn panics(&self) -> bool {
        self.failure_mode == FailureMode::Panic
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_emit_compact_json_documents() {
        let config = DumpConfig::default();
        assert_eq!(config.failure_mode, FailureMode::Document);
        assert_eq!(config.format, OutputFormat::Json);
        assert!(!config.pretty);
        assert!(!config.panics());
    }

    #[test]
    fn flags_map_onto_modes() {
        let config = DumpConfig::from_flags(true, true, false);
        assert!(config.panics());
        assert_eq!(config.format, OutputFormat::Builtin);
        assert_eq!(DumpConfig::from_flags(false, false, false), DumpConfig::default());
    }
}
