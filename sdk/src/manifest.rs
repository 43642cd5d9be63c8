use {
    crate::{crypto, error::Error},
    anyhow::{Result, ensure},
    itertools::Itertools,
    ldseal_protocol::{CipherEnvelope, ManifestRecord, Password},
    std::path::{Path, PathBuf},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub label: String,
    pub password: Password,
}

/// Passwords of all solutions sealed in one document, in the order the solutions were closed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PasswordManifest {
    entries: Vec<ManifestEntry>,
    master_password: Option<Password>,
}

impl PasswordManifest {
    #[must_use]
    #[inline]
    pub fn new(master_password: Option<Password>) -> Self {
        Self {
            entries: Vec::new(),
            master_password,
        }
    }

    #[inline]
    pub fn record(&mut self, label: String, password: Password) {
        self.entries.push(ManifestEntry { label, password });
    }

    #[must_use]
    #[inline]
    pub fn contains(&self, label: &str) -> bool {
        self.entries.iter().any(|entry| entry.label == label)
    }

    #[must_use]
    #[inline]
    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    #[must_use]
    #[inline]
    pub fn master_password(&self) -> Option<&Password> {
        self.master_password.as_ref()
    }

    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Manifest records as written to JSON. Empty if no solution was sealed.
    #[must_use]
    #[inline]
    pub fn records(&self) -> Vec<ManifestRecord> {
        if self.entries.is_empty() {
            return Vec::new();
        }
        let passwords = ManifestRecord::Passwords(
            self.entries
                .iter()
                .map(|entry| {
                    (
                        entry.label.clone(),
                        entry.password.as_unmasked_str().to_owned(),
                    )
                })
                .collect(),
        );
        self.master_password
            .iter()
            .map(|master| ManifestRecord::MasterPassword(master.as_unmasked_str().to_owned()))
            .chain([passwords])
            .collect()
    }

    #[inline]
    pub fn to_json_pretty(&self) -> Result<String, Error> {
        Ok(serde_json::to_string_pretty(&self.records())?)
    }

    /// Manifest sealed under the master password, to be embedded into the page.
    ///
    /// Returns `None` if there are no entries or no master password.
    #[inline]
    pub fn embedded_envelope(&self) -> Result<Option<CipherEnvelope>, Error> {
        let Some(master_password) = &self.master_password else {
            return Ok(None);
        };
        if self.entries.is_empty() {
            return Ok(None);
        }
        let json = serde_json::to_string(&self.records())?;
        Ok(Some(crypto::seal(master_password, json.as_bytes())?))
    }

    /// Human-readable `- label: \t password` lines.
    #[must_use]
    #[inline]
    pub fn listing(&self) -> String {
        let master = self
            .master_password
            .iter()
            .map(|master| ("master password", master));
        let entries = self
            .entries
            .iter()
            .map(|entry| (entry.label.as_str(), &entry.password));
        master
            .chain(entries)
            .map(|(label, password)| format!("- {label}: \t {}\n", password.as_unmasked_str()))
            .join("")
    }

    #[must_use]
    #[inline]
    pub fn listing_path(path: &Path) -> PathBuf {
        path.with_extension("md")
    }

    /// Contents of the unencrypted manifest file at `path` and, optionally, of
    /// the listing next to it. Nothing is written here.
    ///
    /// An empty manifest is still written as `[]`.
    #[inline]
    pub fn external_files(&self, path: &Path, with_listing: bool) -> Result<Vec<(PathBuf, String)>> {
        let json = if self.entries.is_empty() {
            "[]".to_owned()
        } else {
            self.to_json_pretty()?
        };
        let mut files = vec![(path.to_owned(), json)];
        if with_listing {
            let listing_path = Self::listing_path(path);
            ensure!(
                listing_path != path,
                "password listing would overwrite the password manifest {}",
                path.display()
            );
            files.push((listing_path, self.listing()));
        }
        Ok(files)
    }
}
