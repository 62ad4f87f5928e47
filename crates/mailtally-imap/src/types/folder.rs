//! Folder listing types.

use crate::error::DecodeResult;
use crate::mutf7;

/// Folder flag from a LIST response, normalized at decode time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FolderFlag {
    /// Folder cannot be selected.
    NoSelect,
    /// Folder does not exist (RFC 5258, implies `\Noselect`).
    NonExistent,
    /// Folder has no children.
    HasNoChildren,
    /// Folder has children.
    HasChildren,
    /// Folder is marked for attention.
    Marked,
    /// Folder is not marked.
    Unmarked,
    /// Folder is subscribed.
    Subscribed,
    // SPECIAL-USE attributes (RFC 6154)
    /// All messages (virtual folder).
    All,
    /// Archive folder.
    Archive,
    /// Drafts folder.
    Drafts,
    /// Flagged/starred messages (virtual folder).
    Flagged,
    /// Junk/spam folder.
    Junk,
    /// Sent folder.
    Sent,
    /// Trash folder.
    Trash,
    /// Important messages (RFC 8457).
    Important,
    /// Unrecognised token, kept as received.
    Unknown(String),
}

impl FolderFlag {
    /// Parses a folder flag token.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "\\NOSELECT" => Self::NoSelect,
            "\\NONEXISTENT" => Self::NonExistent,
            "\\HASNOCHILDREN" => Self::HasNoChildren,
            "\\HASCHILDREN" => Self::HasChildren,
            "\\MARKED" => Self::Marked,
            "\\UNMARKED" => Self::Unmarked,
            "\\SUBSCRIBED" => Self::Subscribed,
            "\\ALL" => Self::All,
            "\\ARCHIVE" => Self::Archive,
            "\\DRAFTS" => Self::Drafts,
            "\\FLAGGED" => Self::Flagged,
            "\\JUNK" | "\\SPAM" => Self::Junk,
            "\\SENT" => Self::Sent,
            "\\TRASH" => Self::Trash,
            "\\IMPORTANT" => Self::Important,
            _ => Self::Unknown(s.to_string()),
        }
    }

    /// Returns the canonical wire spelling.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::NoSelect => "\\Noselect",
            Self::NonExistent => "\\NonExistent",
            Self::HasNoChildren => "\\HasNoChildren",
            Self::HasChildren => "\\HasChildren",
            Self::Marked => "\\Marked",
            Self::Unmarked => "\\Unmarked",
            Self::Subscribed => "\\Subscribed",
            Self::All => "\\All",
            Self::Archive => "\\Archive",
            Self::Drafts => "\\Drafts",
            Self::Flagged => "\\Flagged",
            Self::Junk => "\\Junk",
            Self::Sent => "\\Sent",
            Self::Trash => "\\Trash",
            Self::Important => "\\Important",
            Self::Unknown(s) => s,
        }
    }

    /// Returns true unless the flag is outside the known vocabulary.
    #[must_use]
    pub const fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }
}

impl std::fmt::Display for FolderFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Set of folder flags, in the order first seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderFlags {
    flags: Vec<FolderFlag>,
}

impl FolderFlags {
    /// Creates an empty flag set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a flag unless already present.
    pub fn insert(&mut self, flag: FolderFlag) {
        if !self.flags.contains(&flag) {
            self.flags.push(flag);
        }
    }

    /// Returns true if the flag is present.
    #[must_use]
    pub fn contains(&self, flag: &FolderFlag) -> bool {
        self.flags.contains(flag)
    }

    /// Returns an iterator over the flags.
    pub fn iter(&self) -> impl Iterator<Item = &FolderFlag> {
        self.flags.iter()
    }

    /// Returns the unrecognised tokens.
    pub fn unknown(&self) -> impl Iterator<Item = &str> {
        self.flags.iter().filter_map(|f| match f {
            FolderFlag::Unknown(s) => Some(s.as_str()),
            _ => None,
        })
    }

    /// Returns the number of flags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.flags.len()
    }

    /// Returns true if there are no flags.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}

impl FromIterator<FolderFlag> for FolderFlags {
    fn from_iter<I: IntoIterator<Item = FolderFlag>>(iter: I) -> Self {
        let mut flags = Self::new();
        for flag in iter {
            flags.insert(flag);
        }
        flags
    }
}

impl std::fmt::Display for FolderFlags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, flag) in self.flags.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{flag}")?;
        }
        Ok(())
    }
}

/// One decoded LIST entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderEntry {
    /// Folder name as sent by the server (modified UTF-7).
    pub name: String,
    /// Hierarchy delimiter, absent for flat namespaces (`NIL`).
    pub delimiter: Option<char>,
    /// Folder flags.
    pub flags: FolderFlags,
}

impl FolderEntry {
    /// Returns the human-readable folder name.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is not valid modified UTF-7.
    pub fn display_name(&self) -> DecodeResult<String> {
        mutf7::decode(&self.name)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(FolderFlag::parse("\\NOSELECT"), FolderFlag::NoSelect);
        assert_eq!(FolderFlag::parse("\\noselect"), FolderFlag::NoSelect);
        assert_eq!(
            FolderFlag::parse("\\hasnochildren"),
            FolderFlag::HasNoChildren
        );
    }

    #[test]
    fn spam_is_junk() {
        assert_eq!(FolderFlag::parse("\\Spam"), FolderFlag::Junk);
    }

    #[test]
    fn unknown_token_is_kept() {
        let flag = FolderFlag::parse("\\XCustom");
        assert_eq!(flag, FolderFlag::Unknown("\\XCustom".to_string()));
        assert!(!flag.is_known());
        assert_eq!(flag.as_str(), "\\XCustom");
    }

    #[test]
    fn flags_deduplicate_and_display() {
        let flags: FolderFlags = ["\\HasChildren", "\\hasCHILDREN", "\\Sent"]
            .into_iter()
            .map(FolderFlag::parse)
            .collect();
        assert_eq!(flags.len(), 2);
        assert_eq!(flags.to_string(), "\\HasChildren \\Sent");
    }

    #[test]
    fn unknown_iterator() {
        let flags: FolderFlags = ["\\Sent", "$Custom"]
            .into_iter()
            .map(FolderFlag::parse)
            .collect();
        assert_eq!(flags.unknown().collect::<Vec<_>>(), vec!["$Custom"]);
    }

    #[test]
    fn display_name_decodes_modified_utf7() {
        let entry = FolderEntry {
            name: "Entw&APw-rfe".to_string(),
            delimiter: Some('/'),
            flags: FolderFlags::new(),
        };
        assert_eq!(entry.display_name().unwrap(), "Entwürfe");
    }
}
