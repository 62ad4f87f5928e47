//! Core IMAP types.

#![allow(clippy::missing_const_for_fn)]

mod flags;
mod folder;
mod sequence;
mod status;

pub use flags::{Flag, Flags};
pub use folder::{FolderEntry, FolderFlag, FolderFlags};
pub use sequence::{SeqNum, SequenceSet};
pub use status::Status;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse() {
        assert_eq!(Status::parse("ok"), Some(Status::Ok));
        assert_eq!(Status::parse("NO"), Some(Status::No));
        assert_eq!(Status::parse("BAD"), Some(Status::Bad));
        assert_eq!(Status::parse("MAYBE"), None);
        assert!(Status::PreAuth.is_ok());
        assert!(!Status::No.is_ok());
    }
}
