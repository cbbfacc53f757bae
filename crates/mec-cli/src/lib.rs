//! # mec-cli -- MEC Admin Console Command-Line Interface
//!
//! A command-line controller over the console engine: every subcommand
//! builds the same [`EntityScreen`](mec_console::EntityScreen) a page
//! would, drives it against the live admin API and maps the outcome to an
//! exit code.
//!
//! ## Subcommands
//!
//! - `list`, `show` -- read records (showing an enquiry marks it opened)
//! - `options` -- choices for a reference field such as `client_id`
//! - `create`, `update` -- edit through a form session, with uploads
//! - `delete`, `delete-many` -- confirmed deletion, media released after
//! - `toggle` -- flip a boolean field
//! - `dashboard` -- count cards and the month comparison
//! - `upload`, `release` -- raw media storage access
//!
//! ## Crate Policy
//!
//! - Argument parsing is separated from command execution.
//! - Console behaviour lives in `mec-console`; commands only sequence it.

pub mod commands;
pub mod edit;
pub mod notice;
