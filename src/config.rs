//! Configuration: where user templates live.
//!
//! ```toml
//! [RSysTradiVariant]
//! file = "/etc/rsyslog-templates.conf"
//! ```
//!
//! Other sections may be present and are ignored. The files are TOML and use
//! their own names, so INI files of other log tools (`/etc/logtools.cfg`,
//! `~/.logtoolsrc`) are never read.

use crate::catalog::TemplateCatalog;
use crate::error::{Error, Result};
use crate::registry::ParserRegistry;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};

/// System-wide configuration file.
pub const SYSTEM_CONFIG: &str = "/etc/rsytmpl.toml";

/// Per-user configuration file, relative to `$HOME`.
pub const USER_CONFIG: &str = ".rsytmpl.toml";

/// The `[RSysTradiVariant]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TemplateSection {
    /// File holding extra template definitions.
    pub file: Option<PathBuf>,
}

/// Parsed configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Config {
    #[serde(rename = "RSysTradiVariant", default)]
    pub templates: Option<TemplateSection>,
}

impl FromStr for Config {
    type Err = Error;

    /// Load configuration from a TOML string.
    fn from_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

impl Config {
    /// Load configuration from a file.
    ///
    /// A relative template `file` is resolved against the directory of `path`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = content
            .parse()
            .map_err(|e: Error| Error::config(path, e.to_string()))?;

        if let Some(file) = config.templates.as_mut().and_then(|s| s.file.as_mut()) {
            if file.is_relative() {
                if let Some(dir) = path.parent() {
                    *file = dir.join(&*file);
                }
            }
        }
        debug!("Loaded configuration {}: {:?}", path.display(), config);
        Ok(config)
    }

    /// The default locations: [`SYSTEM_CONFIG`], then [`USER_CONFIG`] under `home`.
    pub fn default_paths(home: Option<&Path>) -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(SYSTEM_CONFIG)];
        if let Some(home) = home {
            paths.push(home.join(USER_CONFIG));
        }
        paths
    }

    /// Load the default locations, with `home` taken from `$HOME`.
    ///
    /// Missing files are skipped; a later file overrides an earlier one.
    pub fn load_default() -> Result<Self> {
        let home = std::env::var_os("HOME").map(PathBuf::from);
        Self::load_layered(&Self::default_paths(home.as_deref()))
    }

    /// Load several files in order, skipping those that do not exist.
    pub fn load_layered<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        let mut merged = Self::default();
        for path in paths {
            let path = path.as_ref();
            if !path.is_file() {
                debug!("No configuration at {}", path.display());
                continue;
            }
            merged.merge(Self::from_file(path)?);
        }
        Ok(merged)
    }

    fn merge(&mut self, other: Self) {
        if let Some(file) = other.templates.and_then(|s| s.file) {
            self.templates = Some(TemplateSection { file: Some(file) });
        }
    }

    /// The configured template file, if any.
    pub fn template_file(&self) -> Option<&Path> {
        self.templates.as_ref()?.file.as_deref()
    }

    /// Merge the configured template file into `catalog` and register the new
    /// names in `registry`. Returns the names added.
    pub fn apply(
        &self,
        catalog: &mut TemplateCatalog,
        registry: Option<&mut ParserRegistry>,
    ) -> Result<Vec<String>> {
        let Some(file) = self.template_file() else {
            return Ok(Vec::new());
        };

        let added = catalog.extend_from_file(file).map_err(|e| match e {
            Error::Io { source } => Error::config(file, source.to_string()),
            other => other,
        })?;
        info!(
            "Added {} template(s) from {}: {:?}",
            added.len(),
            file.display(),
            added
        );

        if let Some(registry) = registry {
            registry.register_new(catalog, &added)?;
        }
        Ok(added)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    #[test]
    fn test_parse_section() {
        let config: Config = r#"
[logparse]
parser = "CommonLogFormat"

[RSysTradiVariant]
file = "/tmp/templates.conf"
"#
        .parse()
        .unwrap();
        assert_eq!(config.template_file(), Some(Path::new("/tmp/templates.conf")));
    }

    #[test]
    fn test_no_section() {
        let config: Config = "[other]\nkey = 1\n".parse().unwrap();
        assert_eq!(config.template_file(), None);
        let mut catalog = TemplateCatalog::builtin().unwrap();
        assert!(config.apply(&mut catalog, None).unwrap().is_empty());
        assert_eq!(catalog.len(), 5);
    }

    #[test]
    fn test_invalid_toml() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "this is not valid toml {{{{").unwrap();
        assert!(matches!(
            Config::from_file(file.path()).unwrap_err(),
            Error::Config { .. }
        ));
    }

    #[test]
    fn test_relative_file_and_apply() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("extra.conf"),
            "# mine\n$template Pri,\"%PRI%%TIMESTAMP% %msg%\"\n",
        )
        .unwrap();
        let config_path = dir.path().join("rsytmpl.toml");
        std::fs::write(&config_path, "[RSysTradiVariant]\nfile = \"extra.conf\"\n").unwrap();

        let config = Config::from_file(&config_path).unwrap();
        assert_eq!(config.template_file(), Some(dir.path().join("extra.conf").as_path()));

        let mut catalog = TemplateCatalog::builtin().unwrap();
        let mut registry = ParserRegistry::from_catalog(&catalog);
        let added = config.apply(&mut catalog, Some(&mut registry)).unwrap();
        assert_eq!(added, vec!["Pri".to_string()]);
        assert_eq!(catalog.get("Pri").unwrap().ordinal, 5);

        let record = registry
            .create("Pri")
            .unwrap()
            .parse("<13>Oct 11 14:01:13 hello");
        assert_eq!(record.field("PRI").unwrap(), "<13>");
        assert_eq!(record.field("msg").unwrap(), "hello");
    }

    #[test]
    fn test_missing_template_file() {
        let config = Config {
            templates: Some(TemplateSection {
                file: Some(PathBuf::from("/nonexistent/templates.conf")),
            }),
        };
        let mut catalog = TemplateCatalog::builtin().unwrap();
        assert!(matches!(
            config.apply(&mut catalog, None).unwrap_err(),
            Error::Config { .. }
        ));
    }

    #[test]
    fn test_layered_later_wins() {
        let dir = tempdir().unwrap();
        let first = dir.path().join("first.cfg");
        let second = dir.path().join("second.cfg");
        std::fs::write(&first, "[RSysTradiVariant]\nfile = \"/a.conf\"\n").unwrap();
        std::fs::write(&second, "[RSysTradiVariant]\nfile = \"/b.conf\"\n").unwrap();
        let missing = dir.path().join("missing.cfg");

        let config = Config::load_layered(&[first, missing, second]).unwrap();
        assert_eq!(config.template_file(), Some(Path::new("/b.conf")));
    }

    #[test]
    fn test_user_config_skips_logtools_ini() {
        let home = tempdir().unwrap();
        std::fs::write(
            home.path().join(".logtoolsrc"),
            "[logparse]\nparser: CommonLogFormat\n\n[RSysTradiVariant]\nfile = /home/me/templates.conf\n",
        )
        .unwrap();

        let paths = Config::default_paths(Some(home.path()));
        assert!(paths
            .iter()
            .all(|p| p.extension().and_then(|e| e.to_str()) == Some("toml")));
        assert_eq!(Config::load_layered(&paths[1..]).unwrap(), Config::default());

        std::fs::write(
            home.path().join(USER_CONFIG),
            "[RSysTradiVariant]\nfile = \"/home/me/templates.conf\"\n",
        )
        .unwrap();
        let config = Config::load_layered(&paths[1..]).unwrap();
        assert_eq!(
            config.template_file(),
            Some(Path::new("/home/me/templates.conf"))
        );
    }
}
