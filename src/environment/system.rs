//! Live environment reader.
//!
//! Extensions are executables on `PATH`; their version is taken from the
//! first dotted version number printed by `<tool> --version`. Configuration
//! options come from environment variables: `ENVAUDIT_INI_<NAME>` wins over
//! the bare `<NAME>`, where the option name is upper-cased with `.` and `-`
//! replaced by `_` (`upload_max_filesize` → `UPLOAD_MAX_FILESIZE`).

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::LazyLock;

use regex::Regex;

use super::EnvironmentReader;

/// Prefix for environment variables that override configuration options.
pub const INI_ENV_PREFIX: &str = "ENVAUDIT_INI_";

/// Regex for pulling a version number out of `--version` output.
static VERSION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d+(?:\.\d+)+(?:[-+][0-9A-Za-z.]+)?").expect("VERSION_REGEX must compile")
});

type EnvFn = Box<dyn Fn(&str) -> Option<String>>;

/// Reads the environment of the running process.
pub struct SystemEnvironment {
    path_entries: Vec<PathBuf>,
    env_fn: EnvFn,
    versions: RefCell<HashMap<String, Option<String>>>,
}

impl SystemEnvironment {
    /// Read from actual environment variables and the system `PATH`.
    pub fn new() -> Self {
        Self::with_env(parse_system_path(), |key: &str| std::env::var(key).ok())
    }

    /// Read with a custom `PATH` and env var lookup function.
    ///
    /// This allows testing without modifying actual environment variables.
    pub fn with_env<F>(path_entries: Vec<PathBuf>, env_fn: F) -> Self
    where
        F: Fn(&str) -> Option<String> + 'static,
    {
        Self {
            path_entries,
            env_fn: Box::new(env_fn),
            versions: RefCell::new(HashMap::new()),
        }
    }

    /// `PATH` entries searched for extensions.
    pub fn path_entries(&self) -> &[PathBuf] {
        &self.path_entries
    }

    fn probe_version(&self, name: &str) -> Option<String> {
        let binary = resolve_tool_path(name, &self.path_entries)?;
        let output = match Command::new(&binary)
            .arg("--version")
            .stdin(Stdio::null())
            .output()
        {
            Ok(output) => output,
            Err(e) => {
                tracing::debug!("Failed to run {} --version: {}", binary.display(), e);
                return None;
            }
        };

        // Some tools print their version on stderr.
        let text = format!(
            "{}\n{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        let version = extract_version(&text);
        tracing::debug!("Probed {} version: {:?}", name, version);
        version
    }
}

impl Default for SystemEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SystemEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemEnvironment")
            .field("path_entries", &self.path_entries)
            .finish_non_exhaustive()
    }
}

impl EnvironmentReader for SystemEnvironment {
    fn is_extension_loaded(&self, name: &str) -> bool {
        resolve_tool_path(name, &self.path_entries).is_some()
    }

    fn extension_version(&self, name: &str) -> Option<String> {
        if let Some(cached) = self.versions.borrow().get(name) {
            return cached.clone();
        }
        let version = self.probe_version(name);
        self.versions
            .borrow_mut()
            .insert(name.to_string(), version.clone());
        version
    }

    fn ini_value(&self, name: &str) -> Option<String> {
        let key = ini_env_key(name);
        (self.env_fn)(&format!("{}{}", INI_ENV_PREFIX, key)).or_else(|| (self.env_fn)(&key))
    }

    fn server_info(&self) -> String {
        (self.env_fn)("SERVER_SOFTWARE").unwrap_or_default()
    }
}

/// Environment variable name for a configuration option.
pub fn ini_env_key(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '.' | '-' => '_',
            c => c.to_ascii_uppercase(),
        })
        .collect()
}

/// First version number in a tool's `--version` output.
pub fn extract_version(output: &str) -> Option<String> {
    VERSION_REGEX
        .find(output)
        .map(|m| m.as_str().to_string())
}

/// Check whether a file has executable permission bits set.
#[cfg(unix)]
pub fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

/// On Windows, executability is determined by file extension, not permission bits.
#[cfg(not(unix))]
pub fn is_executable(_path: &Path) -> bool {
    true
}

/// Resolve a tool's binary path by iterating over `PATH` entries.
///
/// Returns the first match that exists and is executable.
pub fn resolve_tool_path(tool: &str, path_entries: &[PathBuf]) -> Option<PathBuf> {
    if tool.is_empty() || tool.contains(['/', '\\']) {
        return None;
    }
    for dir in path_entries {
        let candidate = dir.join(tool);
        if candidate.is_file() && is_executable(&candidate) {
            return Some(candidate);
        }
        #[cfg(windows)]
        {
            let exe = dir.join(format!("{}.exe", tool));
            if exe.is_file() {
                return Some(exe);
            }
        }
    }
    None
}

/// Parse the system `PATH` environment variable into a list of directories.
pub fn parse_system_path() -> Vec<PathBuf> {
    std::env::var_os("PATH")
        .map(|path| std::env::split_paths(&path).collect())
        .unwrap_or_default()
}
