//! Manifest loading and decoding.
//!
//! A manifest declares which units must be installed and which must be
//! loaded. It may be written as a static PowerShell data file (`.psd1`),
//! JSON, or YAML:
//!
//! ```powershell
//! @{
//!     RequiredModules = @('Az.Storage')
//!     ImportedModules = @('Microsoft.PowerShell.Utility')
//!     MyModules       = @('MyCompany.Tools')
//! }
//! ```
//!
//! - Record definitions in [`schema`]
//! - Reading and format detection in [`loader`]
//! - The data-file language in [`data_file`]

pub mod data_file;
pub mod loader;
pub mod schema;

pub use data_file::DataFileError;
pub use loader::{load_manifest, parse_manifest, validate_manifest_path, ManifestFormat};
pub use schema::{
    is_valid_unit_name, Manifest, Pass, CUSTOM_KEY, IMPORTED_KEY, KNOWN_KEYS, REQUIRED_KEY,
};
