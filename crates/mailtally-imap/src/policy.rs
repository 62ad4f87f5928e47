//! Which folders get scanned.
//!
//! A folder is skipped when any of its flags is in the exclusionary set:
//! it cannot be selected (`\Noselect`, `\NonExistent`) or it is a virtual
//! view whose messages also live in real folders (`\All`, `\Important`), so
//! counting it would double the totals.

use crate::types::{FolderFlag, FolderFlags};

/// Result of checking a folder's flags against the policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagClassification {
    /// True when the folder should be selected and scanned.
    pub selectable: bool,
    /// Exclusionary flags that matched, in the order listed.
    pub excluded_by: Vec<FolderFlag>,
    /// Tokens outside the known vocabulary.
    pub unknown: Vec<String>,
}

/// Exclusion rules for folder flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderFlagPolicy {
    exclusionary: Vec<FolderFlag>,
}

impl Default for FolderFlagPolicy {
    fn default() -> Self {
        Self {
            exclusionary: vec![
                FolderFlag::NoSelect,
                FolderFlag::NonExistent,
                FolderFlag::All,
                FolderFlag::Important,
            ],
        }
    }
}

impl FolderFlagPolicy {
    /// Creates a policy with a custom exclusionary set.
    #[must_use]
    pub fn with_exclusions(exclusionary: impl IntoIterator<Item = FolderFlag>) -> Self {
        let mut policy = Self {
            exclusionary: Vec::new(),
        };
        for flag in exclusionary {
            if !policy.exclusionary.contains(&flag) {
                policy.exclusionary.push(flag);
            }
        }
        policy
    }

    /// Returns the exclusionary flags.
    #[must_use]
    pub fn exclusionary(&self) -> &[FolderFlag] {
        &self.exclusionary
    }

    /// Returns true if the flag excludes a folder from scanning.
    #[must_use]
    pub fn excludes(&self, flag: &FolderFlag) -> bool {
        self.exclusionary.contains(flag)
    }

    /// Classifies a folder's flags.
    #[must_use]
    pub fn classify(&self, flags: &FolderFlags) -> FlagClassification {
        let excluded_by: Vec<FolderFlag> =
            flags.iter().filter(|f| self.excludes(f)).cloned().collect();

        FlagClassification {
            selectable: excluded_by.is_empty(),
            excluded_by,
            unknown: flags.unknown().map(str::to_string).collect(),
        }
    }
}
