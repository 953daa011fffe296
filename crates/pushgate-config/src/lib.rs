//! Check configuration for pushgate.
//!
//! A repository declares its checks in `.pushgate.yml` (or `.yaml`, `.json`,
//! `.toml`) at its root. [`Config::discover_from`] finds and parses the file,
//! layers command-line overrides on top, and validates the result.
//!
//! ```yaml
//! fail_fast: true
//! checks:
//!   - name: fmt
//!     run: cargo fmt --check
//!   - name: unit
//!     command: cargo test --workspace
//!     requires: cargo
//!     env:
//!       RUST_BACKTRACE: 1
//!   - name: ps-lint
//!     command: Invoke-ScriptAnalyzer -Path scripts
//!     shell: pwsh
//!     os: windows
//! ```

mod discovery;
mod model;
mod validation;

pub use discovery::{CONFIG_FILE_NAMES, discover_config_file};
pub use model::{
    CheckSpec, CliOverrides, Config, ConfigSource, DEFAULT_MAX_PARALLEL, DEFAULT_TAIL_LINES,
    Settings,
};
