//! A small, self-contained mnemonic-to-[`ErrorKind`] table.
//!
//! The real error-code table and string-to-number mapping is an external
//! collaborator of the core (see the crate's top-level docs); this module
//! supplies a table just large enough to run the core and its tests.

/// A classification of server-reported error mnemonics.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum ErrorKind {
    NoEntry,
    AlreadyExists,
    NotDirectory,
    PermissionDenied,
    NotOwner,
    TooManyArgs,
    InvalidArgument,
    NoMemory,
    DoesNotExist,
    Busy,
    Interrupted,
    Io,
    NotEmpty,
    RolledBack,
    Again,
}

/// Maps a server error mnemonic (e.g. `"ENOENT"`) to an [`ErrorKind`].
///
/// Unknown mnemonics map to [`ErrorKind::InvalidArgument`]; the caller is
/// expected to log that fact.
pub(crate) fn lookup(mnemonic: &str) -> ErrorKind {
    match mnemonic {
        "ENOENT" => ErrorKind::NoEntry,
        "EEXIST" => ErrorKind::AlreadyExists,
        "ENOTDIR" => ErrorKind::NotDirectory,
        "EACCES" => ErrorKind::PermissionDenied,
        "EPERM" => ErrorKind::NotOwner,
        "E2BIG" => ErrorKind::TooManyArgs,
        "EINVAL" => ErrorKind::InvalidArgument,
        "ENOMEM" => ErrorKind::NoMemory,
        "ENOSYS" => ErrorKind::DoesNotExist,
        "EBUSY" => ErrorKind::Busy,
        "EINTR" => ErrorKind::Interrupted,
        "EIO" => ErrorKind::Io,
        "ENOTEMPTY" => ErrorKind::NotEmpty,
        "EROFS" => ErrorKind::RolledBack,
        "EAGAIN" => ErrorKind::Again,
        other => {
            log::warn!("unknown server error mnemonic {other:?}, mapping to InvalidArgument");
            ErrorKind::InvalidArgument
        }
    }
}
