use crate::ooxml::opc::pending::DEFAULT_MAX_PASSES;

/// Configuration options for comment thread extraction.
///
/// # Examples
///
/// ```rust
/// use longan::ExtractOptions;
///
/// let options = ExtractOptions::new()
///     .with_max_passes(4)
///     .with_strict_fragments(true);
/// assert_eq!(options.max_passes, 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Full passes over deferred parts before giving up
    pub max_passes: usize,
    /// Treat every malformed fragment as fatal instead of logging and skipping it
    pub strict_fragments: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            max_passes: DEFAULT_MAX_PASSES,
            strict_fragments: false,
        }
    }
}

impl ExtractOptions {
    /// Create a new `ExtractOptions` with default values.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the retry cap for deferred parts.
    #[inline]
    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = max_passes;
        self
    }

    /// Set whether malformed fragments abort the extraction.
    #[inline]
    pub fn with_strict_fragments(mut self, strict: bool) -> Self {
        self.strict_fragments = strict;
        self
    }
}
