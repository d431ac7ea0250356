// src/config.rs

// dependencies
use crate::errors::ConfigError;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Name of the config file looked up in the home directory.
pub const DEFAULT_CONFIG_FILE: &str = "hf.conf";

/// Address used when no config file exists.
pub const DEFAULT_ADDRESS: &str = ":8000";

// struct type which represents one address served from one directory
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Binding {
    pub address: String,
    pub root_dir: PathBuf,
}

impl Binding {
    pub fn new<A, D>(address: A, root_dir: D) -> Self
    where
        A: Into<String>,
        D: Into<PathBuf>,
    {
        Binding {
            address: address.into(),
            root_dir: root_dir.into(),
        }
    }

    /// The address in a form the socket resolver accepts.
    ///
    /// A bare `:port` means every interface.
    pub fn socket_addr(&self) -> String {
        if self.address.starts_with(':') {
            format!("0.0.0.0{}", self.address)
        } else {
            self.address.clone()
        }
    }
}

// struct type which holds every binding, keyed by address
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Bindings {
    dirs: BTreeMap<String, PathBuf>,
}

impl Bindings {
    pub fn new() -> Self {
        Bindings::default()
    }

    pub fn default_binding() -> Self {
        let mut bindings = Bindings::new();
        bindings.insert(DEFAULT_ADDRESS, ".");
        bindings
    }

    // a repeated address replaces the earlier directory
    pub fn insert<A, D>(&mut self, address: A, root_dir: D)
    where
        A: Into<String>,
        D: Into<PathBuf>,
    {
        self.dirs.insert(address.into(), root_dir.into());
    }

    pub fn get(&self, address: &str) -> Option<&Path> {
        self.dirs.get(address).map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.dirs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Binding> + '_ {
        self.dirs
            .iter()
            .map(|(address, root_dir)| Binding::new(address.clone(), root_dir.clone()))
    }
}

impl FromIterator<Binding> for Bindings {
    fn from_iter<I: IntoIterator<Item = Binding>>(iter: I) -> Self {
        let mut bindings = Bindings::new();
        for binding in iter {
            bindings.insert(binding.address, binding.root_dir);
        }
        bindings
    }
}

// struct type which represents everything the supervisor needs to start
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bindings: Bindings,
    pub dir_listing: bool,
}

/// Parses the line-oriented bindings format.
///
/// Each line that is neither blank nor a `#` comment holds an address and a
/// directory separated by whitespace. Both fields are trimmed.
pub fn parse_config(text: &str) -> Result<Bindings, ConfigError> {
    let mut bindings = Bindings::new();

    for (index, raw_line) in text.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (address, dir) = line
            .split_once(char::is_whitespace)
            .ok_or_else(|| ConfigError::BadLine {
                line: index + 1,
                content: line.to_string(),
            })?;

        bindings.insert(address.trim(), dir.trim());
    }

    Ok(bindings)
}

/// Loads bindings from `path`, falling back to `:8000 -> .` when the file
/// does not exist.
pub fn load_config(path: &Path) -> Result<Bindings, ConfigError> {
    match fs::read_to_string(path) {
        Ok(text) => parse_config(&text),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Bindings::default_binding()),
        Err(source) => Err(ConfigError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    dirs::home_dir()
        .map(|home| home.join(DEFAULT_CONFIG_FILE))
        .ok_or(ConfigError::NoHomeDir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn trims_both_fields() {
        let bindings = parse_config("  :9000   ./public  \n").unwrap();

        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings.get(":9000"), Some(Path::new("./public")));
    }

    #[test]
    fn skips_comments_and_blank_lines() {
        let text = "# sites\n\n   \n:8001 /srv/a\n  # indented comment\n127.0.0.1:8002\t/srv/b\n";
        let bindings = parse_config(text).unwrap();

        let collected: Vec<Binding> = bindings.iter().collect();
        assert_eq!(
            collected,
            vec![
                Binding::new(":8001", "/srv/a"),
                Binding::new("127.0.0.1:8002", "/srv/b"),
            ]
        );
    }

    #[test]
    fn directory_may_contain_spaces() {
        let bindings = parse_config(":8000 /srv/my site").unwrap();
        assert_eq!(bindings.get(":8000"), Some(Path::new("/srv/my site")));
    }

    #[test]
    fn later_address_wins() {
        let bindings = parse_config(":8000 first\n:8000 second\n").unwrap();

        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings.get(":8000"), Some(Path::new("second")));
    }

    #[test]
    fn line_without_separator_is_rejected() {
        let result = parse_config(":8000 .\n:9000\n");

        match result {
            Err(ConfigError::BadLine { line, content }) => {
                assert_eq!(line, 2);
                assert_eq!(content, ":9000");
            }
            other => panic!("expected BadLine, got {:?}", other),
        }
    }

    #[test]
    fn missing_file_yields_default_binding() {
        let dir = tempdir().unwrap();
        let bindings = load_config(&dir.path().join("absent.conf")).unwrap();

        assert_eq!(bindings, Bindings::default_binding());
        assert_eq!(bindings.get(":8000"), Some(Path::new(".")));
        assert_eq!(bindings.len(), 1);
    }

    #[test]
    fn unreadable_path_is_an_error() {
        // a directory cannot be read as a config file
        let dir = tempdir().unwrap();
        let result = load_config(dir.path());

        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn loads_file_from_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hf.conf");
        fs::write(&path, ":8080 www\n").unwrap();

        let bindings = load_config(&path).unwrap();
        assert_eq!(bindings.get(":8080"), Some(Path::new("www")));
    }

    #[test]
    fn port_only_address_listens_everywhere() {
        assert_eq!(Binding::new(":8000", ".").socket_addr(), "0.0.0.0:8000");
        assert_eq!(
            Binding::new("127.0.0.1:8000", ".").socket_addr(),
            "127.0.0.1:8000"
        );
    }
}
