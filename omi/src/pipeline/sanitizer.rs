//! Output leak screen.
//!
//! Literal substring removal of markers that would reveal the internal
//! preamble, a mode's role name, or a structural tag. This is a best-effort
//! screen and not a security boundary: a reworded or partially echoed
//! instruction passes through, and legitimate text that happens to contain a
//! marker is stripped too.

/// Removed from every reply, in this order.
pub const LEAK_MARKERS: &[&str] = &[
    "<output_lang>",
    "</output_lang>",
    "OUTPUT_LANGUAGE:",
    "Role: Data Compressor",
    "Role: Tech Lead",
    "Role: Logic Architect",
    "Role: Optimizer",
    "Mermaid Graph",
    "System:",
    "CRITICAL PROTOCOL:",
];

#[derive(Debug, Clone)]
pub struct Sanitizer {
    markers: Vec<String>,
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self::new(LEAK_MARKERS.iter().copied())
    }
}

impl Sanitizer {
    /// Empty markers are dropped; they would match everywhere.
    pub fn new<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            markers: markers
                .into_iter()
                .map(Into::into)
                .filter(|marker: &String| !marker.is_empty())
                .collect(),
        }
    }

    pub fn markers(&self) -> &[String] {
        &self.markers
    }

    /// Strips every marker and trims surrounding whitespace. Total and
    /// idempotent.
    pub fn sanitize(&self, text: &str) -> String {
        let mut clean = text.to_string();

        // Removing one marker can splice a new one together, so repeat until
        // none is left. Each pass that finds a marker shortens the text.
        while self.contains_marker(&clean) {
            for marker in &self.markers {
                if clean.contains(marker.as_str()) {
                    clean = clean.replace(marker.as_str(), "");
                }
            }
        }

        clean.trim().to_string()
    }

    fn contains_marker(&self, text: &str) -> bool {
        self.markers.iter().any(|marker| text.contains(marker.as_str()))
    }
}
