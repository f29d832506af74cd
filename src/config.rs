use crate::pattern::PatternStep;

/// Pattern schedule used for the eight AES S-box coordinate functions.
pub fn default_schedule() -> Vec<PatternStep> {
    vec![
        PatternStep::Double {
            high: 6,
            middle: 5,
            low: 4,
            common: 4,
        },
        PatternStep::Single {
            high: 6,
            low: 5,
            common: 5,
        },
        PatternStep::Single {
            high: 7,
            low: 5,
            common: 5,
        },
        PatternStep::Single {
            high: 7,
            low: 6,
            common: 6,
        },
        PatternStep::Virtual {
            high: 4,
            middle: 3,
            common: 2,
        },
        PatternStep::Single {
            high: 4,
            low: 3,
            common: 3,
        },
        PatternStep::Single {
            high: 5,
            low: 4,
            common: 4,
        },
    ]
}

/// Configuration of a [`SynthesisSession`][crate::session::SynthesisSession].
///
/// Use `SessionConfig::default()` for the standard schedule with both
/// catalogs enabled.
///
/// # Examples
///
/// ```
/// use anf_synth::config::SessionConfig;
/// use anf_synth::pattern::PatternStep;
///
/// let config = SessionConfig {
///     schedule: vec![PatternStep::Single { high: 3, low: 2, common: 2 }],
///     reuse_patterns: false,
///     ..SessionConfig::default()
/// };
/// assert!(config.reuse_xor_merges);
/// ```
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SessionConfig {
    /// Pattern steps run in order for every function.
    pub schedule: Vec<PatternStep>,
    /// Offer catalogued patterns before each fresh search.
    pub reuse_patterns: bool,
    /// Consult the XOR merge catalog before creating a merge gate.
    pub reuse_xor_merges: bool,
    /// Hash-consing table has `2^table_bits` buckets.
    pub table_bits: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            schedule: default_schedule(),
            reuse_patterns: true,
            reuse_xor_merges: true,
            table_bits: 16,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::PatternKind;

    #[test]
    fn test_default_schedule() {
        let config = SessionConfig::default();
        assert_eq!(config.schedule.len(), 7);
        assert_eq!(config.schedule[0].kind(), PatternKind::Double);
        assert_eq!(config.schedule[4].kind(), PatternKind::Virtual);
        assert_eq!(config.table_bits, 16);
        assert!(config.reuse_patterns && config.reuse_xor_merges);
    }
}
