//! CLI Exit Code Registry
//!
//! Single source of truth for `authmap` exit codes. Scripts rely on them.
//!
//! | Code | Meaning                                               |
//! |------|-------------------------------------------------------|
//! | 0    | Success                                               |
//! | 1    | General error (unspecified)                           |
//! | 2    | Usage error (bad args)                                |
//! | 3    | Config cannot be read, parsed or validated            |
//! | 4    | A dataset failed to load (missing field, bad file)    |
//! | 5    | An output could not be written                        |
//! | 6    | Alias conflicts found and `--fail-on-conflict` is set |

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
#[allow(dead_code)]
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required input.
pub const EXIT_USAGE: u8 = 2;

/// Config file unreadable, malformed, or failing validation.
pub const EXIT_INVALID_CONFIG: u8 = 3;

/// Dataset load failure: unreadable source, malformed rows, or a descriptor
/// naming a field the source does not have.
pub const EXIT_LOAD: u8 = 4;

/// Report, export or JSON output could not be written.
pub const EXIT_WRITE: u8 = 5;

/// Type alias inference hit conflicting categories (last write won).
pub const EXIT_ALIAS_CONFLICT: u8 = 6;
