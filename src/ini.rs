use anyhow::{Context, Result};
use ini::{Ini, Properties};
use std::path::Path;
use tracing::debug;

pub const DEFAULT_INI_FILE_PATH: &str = "~/.posterm";
pub const DEFAULT_INI_SECTION: &str = "default";

const INI_HOST: &str = "host";
const INI_PATH: &str = "path";
const INI_METHOD: &str = "method";
const INI_PROTO: &str = "proto";
const INI_THEME: &str = "theme";
const INI_PAGE_SHIFT: &str = "page_shift";
const INI_PRETTY_JSON: &str = "pretty_json";
const INI_LOG_FILE: &str = "log_file";
const INI_HEADER_PREFIX: &str = "header:";

/// One `[section]` of the profile file.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Profile {
    host: Option<String>,
    path: Option<String>,
    method: Option<String>,
    proto: Option<String>,
    theme: Option<String>,
    page_shift: Option<usize>,
    pretty_json: Option<bool>,
    log_file: Option<String>,
    headers: Vec<(String, String)>,
}

fn try_get<T>(section: &Properties, key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    section
        .get(key)
        .map(|s| {
            s.trim()
                .parse::<T>()
                .with_context(|| format!("Invalid value for {key}: {s}"))
        })
        .transpose()
}

impl Profile {
    fn from_section(section: &Properties) -> Result<Self> {
        let headers = section
            .iter()
            .filter_map(|(key, value)| {
                key.strip_prefix(INI_HEADER_PREFIX)
                    .map(|name| (name.trim().to_string(), value.trim().to_string()))
            })
            .collect();

        Ok(Profile {
            host: try_get(section, INI_HOST)?,
            path: try_get(section, INI_PATH)?,
            method: try_get(section, INI_METHOD)?,
            proto: try_get(section, INI_PROTO)?,
            theme: try_get(section, INI_THEME)?,
            page_shift: try_get(section, INI_PAGE_SHIFT)?,
            pretty_json: try_get(section, INI_PRETTY_JSON)?,
            log_file: try_get(section, INI_LOG_FILE)?,
            headers,
        })
    }

    pub fn host(&self) -> Option<&String> {
        self.host.as_ref()
    }

    pub fn path(&self) -> Option<&String> {
        self.path.as_ref()
    }

    pub fn method(&self) -> Option<&String> {
        self.method.as_ref()
    }

    pub fn proto(&self) -> Option<&String> {
        self.proto.as_ref()
    }

    pub fn theme(&self) -> Option<&String> {
        self.theme.as_ref()
    }

    pub fn page_shift(&self) -> Option<usize> {
        self.page_shift
    }

    pub fn pretty_json(&self) -> Option<bool> {
        self.pretty_json
    }

    pub fn log_file(&self) -> Option<&String> {
        self.log_file.as_ref()
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }
}

pub struct IniFile;

impl IniFile {
    /// Loads `name` from the profile file. A missing file or section yields
    /// `None`; an unreadable file or a malformed value is an error.
    pub fn load_profile(file_path: &str, name: &str) -> Result<Option<Profile>> {
        let expanded = shellexpand::tilde(file_path).to_string();
        if !Path::new(&expanded).exists() {
            debug!(path = %expanded, "profile file not found");
            return Ok(None);
        }

        let ini = Ini::load_from_file(&expanded)
            .with_context(|| format!("Failed to read profile file {expanded}"))?;
        let section = match ini.section(Some(name)) {
            Some(s) => s,
            None => {
                debug!(path = %expanded, profile = name, "profile section not found");
                return Ok(None);
            }
        };

        let profile = Profile::from_section(section)
            .with_context(|| format!("Invalid profile [{name}] in {expanded}"))?;
        Ok(Some(profile))
    }
}
