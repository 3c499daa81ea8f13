//! Runtime secret redaction.
//!
//! Scrubs registered secret values from every line before it reaches the
//! terminal or the log file.

use std::borrow::Cow;

/// Mask substituted for every registered secret.
pub const MASK: &str = "***";

/// Exact, case-sensitive substring scrubber.
///
/// Registration is append-only and takes effect for subsequent messages;
/// already-rendered lines are never rewritten.
#[derive(Debug, Default)]
pub struct SecretRedactor {
    secrets: Vec<String>,
}

impl SecretRedactor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a secret value. Empty values are ignored.
    pub fn register(&mut self, value: &str) {
        if value.is_empty() {
            return;
        }
        self.secrets.push(value.to_string());
    }

    /// Replace every occurrence of every registered secret with [`MASK`].
    pub fn redact<'a>(&self, text: &'a str) -> Cow<'a, str> {
        let mut out = Cow::Borrowed(text);
        for secret in &self.secrets {
            if out.contains(secret.as_str()) {
                out = Cow::Owned(out.replace(secret.as_str(), MASK));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_secrets_is_passthrough() {
        let redactor = SecretRedactor::new();
        assert!(matches!(
            redactor.redact("token=XYZ"),
            Cow::Borrowed("token=XYZ")
        ));
    }

    #[test]
    fn test_masks_single_secret() {
        let mut redactor = SecretRedactor::new();
        redactor.register("XYZ");
        assert_eq!(redactor.redact("token=XYZ"), "token=***");
    }

    #[test]
    fn test_masks_every_occurrence() {
        let mut redactor = SecretRedactor::new();
        redactor.register("s3cret");
        assert_eq!(
            redactor.redact("s3cret and again s3cret"),
            "*** and again ***"
        );
    }

    #[test]
    fn test_masks_multiple_secrets() {
        let mut redactor = SecretRedactor::new();
        redactor.register("alpha");
        redactor.register("beta");
        assert_eq!(redactor.redact("alpha/beta"), "***/***");
    }

    #[test]
    fn test_case_sensitive() {
        let mut redactor = SecretRedactor::new();
        redactor.register("Token");
        assert_eq!(redactor.redact("token Token"), "token ***");
    }

    #[test]
    fn test_empty_secret_ignored() {
        let mut redactor = SecretRedactor::new();
        redactor.register("");
        assert_eq!(redactor.redact("unchanged"), "unchanged");
    }

    #[test]
    fn test_substring_match() {
        let mut redactor = SecretRedactor::new();
        redactor.register("XYZ");
        assert_eq!(redactor.redact("prefixXYZsuffix"), "prefix***suffix");
    }
}
