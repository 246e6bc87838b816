//! # pbv-cli: Playbook Directory Validator
//!
//! Provides the `pbv` command-line interface:
//!
//! ```bash
//! pbv vm-provisioning/ansible
//! pbv --fallback --exclude vault.yml ansible/
//! pbv --schemas schemas/ansible.yml --format json ansible/
//! ```
//!
//! ## Configuration
//!
//! Defaults, then `PBV_*` environment variables, then flags. See
//! [`config::ValidatorConfig`].
//!
//! ## Output
//!
//! Reports go to stdout; logs go to stderr, so the report can be piped
//! unchanged.

pub mod config;
pub mod report;
pub mod validate;

pub use config::{ConfigError, ValidatorConfig};
pub use validate::{execute, run_validate, OutputFormat, ValidateArgs};
