//! Loading the list of domains to probe.

use crate::error::DomainProbeError;
use crate::utils::{normalize_domain_line, validate_domain};
use std::collections::HashSet;
use std::fs;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

/// Ordered, de-duplicated list of domains, read once and never modified.
///
/// Entries that fail host validation are kept so that they still show up
/// in the report (as unreachable `invalid_domain`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DomainList {
    domains: Vec<String>,
}

impl DomainList {
    /// Parse list text: one domain per line, `#` comments, blank lines ignored.
    ///
    /// Duplicates keep their first position.
    pub fn parse(content: &str) -> Self {
        let mut seen = HashSet::new();
        let mut domains = Vec::new();

        for (idx, line) in content.lines().enumerate() {
            let Some(domain) = normalize_domain_line(line) else {
                continue;
            };

            if let Err(e) = validate_domain(&domain) {
                warn!(line = idx + 1, "{}", e);
            }

            if seen.insert(domain.clone()) {
                domains.push(domain);
            } else {
                debug!(line = idx + 1, domain = %domain, "Skipping duplicate domain");
            }
        }

        Self { domains }
    }

    /// Read and parse a domain list file.
    ///
    /// # Errors
    ///
    /// Returns `DomainProbeError::FileError` if the file is missing,
    /// unreadable, or not valid UTF-8. An empty file is not an error.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, DomainProbeError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(DomainProbeError::file_error(
                path.to_string_lossy(),
                "File not found",
            ));
        }

        let bytes = fs::read(path).map_err(|e| {
            DomainProbeError::file_error(path.to_string_lossy(), format!("Failed to read: {}", e))
        })?;

        let content = String::from_utf8(bytes).map_err(|e| {
            DomainProbeError::file_error(
                path.to_string_lossy(),
                format!("File is not valid UTF-8 text: {}", e.utf8_error()),
            )
        })?;

        let list = Self::parse(&content);
        debug!(path = %path.display(), domains = list.len(), "Loaded domain list");
        Ok(list)
    }

    /// Read and parse a domain list from any reader (e.g. stdin).
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self, DomainProbeError> {
        let mut content = String::new();
        reader.read_to_string(&mut content).map_err(|e| {
            DomainProbeError::file_error("<stdin>", format!("Failed to read: {}", e))
        })?;
        Ok(Self::parse(&content))
    }

    pub fn domains(&self) -> &[String] {
        &self.domains
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.domains.iter()
    }
}

impl From<Vec<String>> for DomainList {
    fn from(domains: Vec<String>) -> Self {
        Self::parse(&domains.join("\n"))
    }
}

impl<'a> IntoIterator for &'a DomainList {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.domains.iter()
    }
}
