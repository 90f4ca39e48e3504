//! Access to the environment being audited.
//!
//! Every predicate reads the environment through the [`EnvironmentReader`]
//! trait so checks can run against the live process or against a fixed
//! snapshot:
//!
//! - [`SystemEnvironment`] - tools on `PATH` and process environment variables
//! - [`StaticEnvironment`] - an in-memory snapshot, usually loaded from YAML

pub mod snapshot;
pub mod system;

pub use snapshot::StaticEnvironment;
pub use system::{resolve_tool_path, SystemEnvironment};

/// Read-only view of the environment requirements are checked against.
///
/// "Extensions" are named components that report a version (a runtime
/// module, a tool on `PATH`). "Ini" values are named configuration options.
pub trait EnvironmentReader {
    /// Whether the named extension is available.
    fn is_extension_loaded(&self, name: &str) -> bool;

    /// Reported version of the named extension, if it reports one.
    fn extension_version(&self, name: &str) -> Option<String>;

    /// Raw value of a configuration option. `None` when unset.
    fn ini_value(&self, name: &str) -> Option<String>;

    /// Free-form description of the hosting server, shown in report footers.
    fn server_info(&self) -> String {
        String::new()
    }
}

impl<T: EnvironmentReader + ?Sized> EnvironmentReader for &T {
    fn is_extension_loaded(&self, name: &str) -> bool {
        (**self).is_extension_loaded(name)
    }

    fn extension_version(&self, name: &str) -> Option<String> {
        (**self).extension_version(name)
    }

    fn ini_value(&self, name: &str) -> Option<String> {
        (**self).ini_value(name)
    }

    fn server_info(&self) -> String {
        (**self).server_info()
    }
}

impl<T: EnvironmentReader + ?Sized> EnvironmentReader for Box<T> {
    fn is_extension_loaded(&self, name: &str) -> bool {
        (**self).is_extension_loaded(name)
    }

    fn extension_version(&self, name: &str) -> Option<String> {
        (**self).extension_version(name)
    }

    fn ini_value(&self, name: &str) -> Option<String> {
        (**self).ini_value(name)
    }

    fn server_info(&self) -> String {
        (**self).server_info()
    }
}
