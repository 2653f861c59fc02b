//! Configurable limits for bounded decoding.

/// Limits enforced while decoding a document.
///
/// Header counts and pool lengths are checked against these limits before any
/// table is read, so a corrupt header cannot drive large allocations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Maximum input size in bytes.
    pub max_file_bytes: usize,

    /// Maximum number of events.
    pub max_events: usize,

    /// Maximum number of instruction records.
    pub max_instructions: usize,

    /// Maximum number of layer records.
    pub max_layers: usize,

    /// Maximum number of parameter records.
    pub max_parameters: usize,

    /// Maximum number of linked-file records.
    pub max_linked_files: usize,

    /// Maximum length of the argument or string pool in bytes.
    pub max_pool_bytes: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            // Shipped scripts stay well under a few megabytes.
            max_file_bytes: 64 * 1024 * 1024,
            max_events: 64 * 1024,
            max_instructions: 1024 * 1024,
            max_layers: 64 * 1024,
            max_parameters: 1024 * 1024,
            max_linked_files: 1024,
            max_pool_bytes: 32 * 1024 * 1024,
        }
    }
}

impl Limits {
    /// Creates limits suitable for testing with smaller values.
    #[must_use]
    pub const fn for_testing() -> Self {
        Self {
            max_file_bytes: 64 * 1024,
            max_events: 64,
            max_instructions: 256,
            max_layers: 16,
            max_parameters: 256,
            max_linked_files: 8,
            max_pool_bytes: 16 * 1024,
        }
    }

    /// Creates limits with no restrictions (use with caution).
    #[must_use]
    pub const fn unlimited() -> Self {
        Self {
            max_file_bytes: usize::MAX,
            max_events: usize::MAX,
            max_instructions: usize::MAX,
            max_layers: usize::MAX,
            max_parameters: usize::MAX,
            max_linked_files: usize::MAX,
            max_pool_bytes: usize::MAX,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_limits_are_reasonable() {
        let limits = Limits::default();
        assert!(limits.max_file_bytes >= 1024 * 1024);
        assert!(limits.max_events >= 1024);
        assert!(limits.max_instructions >= limits.max_events);
    }

    #[test]
    fn testing_limits_smaller() {
        let test_limits = Limits::for_testing();
        let default_limits = Limits::default();

        assert!(test_limits.max_file_bytes < default_limits.max_file_bytes);
        assert!(test_limits.max_events < default_limits.max_events);
        assert!(test_limits.max_pool_bytes < default_limits.max_pool_bytes);
    }

    #[test]
    fn unlimited_limits() {
        let limits = Limits::unlimited();
        assert_eq!(limits.max_file_bytes, usize::MAX);
        assert_eq!(limits.max_events, usize::MAX);
        assert_eq!(limits.max_pool_bytes, usize::MAX);
    }

    #[test]
    fn limits_const_constructible() {
        const LIMITS: Limits = Limits::for_testing();
        assert_eq!(LIMITS.max_events, 64);
    }
}
