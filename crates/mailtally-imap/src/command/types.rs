//! FETCH item definitions.

/// FETCH items to request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FetchItems {
    /// `FAST` macro: `FLAGS INTERNALDATE RFC822.SIZE`.
    #[default]
    Fast,
    /// Explicit list of attributes.
    Items(Vec<FetchAttribute>),
}

impl FetchItems {
    /// Attributes needed for mailbox statistics, UID included.
    #[must_use]
    pub fn statistics() -> Self {
        Self::Items(vec![
            FetchAttribute::Uid,
            FetchAttribute::Flags,
            FetchAttribute::InternalDate,
            FetchAttribute::Rfc822Size,
        ])
    }
}

/// Individual FETCH attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchAttribute {
    /// Message flags.
    Flags,
    /// Internal date.
    InternalDate,
    /// RFC822 size.
    Rfc822Size,
    /// Unique identifier.
    Uid,
}

impl FetchAttribute {
    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            Self::Flags => "FLAGS",
            Self::InternalDate => "INTERNALDATE",
            Self::Rfc822Size => "RFC822.SIZE",
            Self::Uid => "UID",
        }
    }
}
