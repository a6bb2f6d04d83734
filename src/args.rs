use std::ffi::OsString;

use anyhow::{bail, Result};

pub use clap::Parser;

use crate::ini::{DEFAULT_INI_FILE_PATH, DEFAULT_INI_SECTION};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct ClapArgs {
    #[clap(help = "Target host, optionally with scheme and port (e.g. example.com:8080)")]
    host: Option<String>,
    #[clap(short = 'p', long, default_value = DEFAULT_INI_SECTION, help = "profile name")]
    profile: String,
    #[clap(long, default_value = DEFAULT_INI_FILE_PATH, help = "profile file path")]
    config: String,
    #[clap(short = 'm', long, help = "HTTP method (GET/POST/PUT/DELETE etc.)")]
    method: Option<String>,
    #[clap(long, help = "URL path")]
    path: Option<String>,
    #[clap(long, help = "HTTP/1 minor version (0 or 1)")]
    proto: Option<String>,
    #[clap(
        short = 'H',
        long = "header",
        name = "KEY: VALUE",
        help = "HTTP header to start with"
    )]
    headers: Vec<String>,
    #[clap(short = 't', long, help = "syntax highlighting theme")]
    theme: Option<String>,
    #[clap(long, help = "lines to scroll per page key")]
    page_shift: Option<usize>,
    #[clap(long, help = "pretty-print JSON response bodies")]
    pretty: bool,
    #[clap(short = 'l', long, help = "write logs to this file")]
    log_file: Option<String>,
    #[clap(
        short = 'v',
        long,
        help = "Log debug messages",
        default_value = "false"
    )]
    verbose: bool,
}

#[derive(Debug)]
pub struct CommandLineArgs {
    host: Option<String>,
    profile: String,
    config: String,
    method: Option<String>,
    path: Option<String>,
    proto: Option<String>,
    headers: Vec<(String, String)>,
    theme: Option<String>,
    page_shift: Option<usize>,
    pretty: bool,
    log_file: Option<String>,
    verbose: bool,
}

fn split_headers(raw: Vec<String>) -> Result<Vec<(String, String)>> {
    raw.into_iter()
        .map(|s| match s.split_once(':') {
            Some((name, value)) => Ok((name.trim().to_string(), value.trim().to_string())),
            None => bail!("Invalid header format: {}", s),
        })
        .collect()
}

impl CommandLineArgs {
    fn from_clap(args: ClapArgs) -> Result<Self> {
        Ok(Self {
            host: args.host,
            profile: args.profile,
            config: args.config,
            method: args.method,
            path: args.path,
            proto: args.proto,
            headers: split_headers(args.headers)?,
            theme: args.theme,
            page_shift: args.page_shift,
            pretty: args.pretty,
            log_file: args.log_file,
            verbose: args.verbose,
        })
    }

    pub fn parse() -> Result<Self> {
        Self::from_clap(ClapArgs::parse())
    }

    #[allow(dead_code)]
    pub fn parse_from<I, T>(itr: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Self::from_clap(ClapArgs::parse_from(itr))
    }

    pub fn host(&self) -> Option<&String> {
        self.host.as_ref()
    }

    pub fn profile(&self) -> &String {
        &self.profile
    }

    pub fn config(&self) -> &String {
        &self.config
    }

    pub fn method(&self) -> Option<&String> {
        self.method.as_ref()
    }

    pub fn path(&self) -> Option<&String> {
        self.path.as_ref()
    }

    pub fn proto(&self) -> Option<&String> {
        self.proto.as_ref()
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn theme(&self) -> Option<&String> {
        self.theme.as_ref()
    }

    pub fn page_shift(&self) -> Option<usize> {
        self.page_shift
    }

    pub fn pretty(&self) -> bool {
        self.pretty
    }

    pub fn log_file(&self) -> Option<&String> {
        self.log_file.as_ref()
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }
}
