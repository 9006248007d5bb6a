/// Bytes of context reported before each match unless configured otherwise.
pub const DEFAULT_CONTEXT_BYTES: usize = 16;

/// Knobs for a gadget scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanConfig {
    pub context_bytes: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            context_bytes: DEFAULT_CONTEXT_BYTES,
        }
    }
}

impl ScanConfig {
    /// Builds a config from a raw, user-supplied context value.
    ///
    /// Missing or malformed values fall back to the default.
    pub fn from_context_arg(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::default();
        };

        match raw.trim().parse::<usize>() {
            Ok(context_bytes) => Self { context_bytes },
            Err(err) => {
                log::warn!(
                    "Invalid context value {raw:?} ({err}); using default ({DEFAULT_CONTEXT_BYTES})"
                );
                Self::default()
            }
        }
    }
}
