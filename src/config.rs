use crate::args::CommandLineArgs;
use crate::draft::RequestDraft;
use crate::field::{HEADER, HEADER_VAL, HOST, METHOD, PATH, PROTO};
use crate::focus::FocusMachine;
use crate::ini::Profile;
use crate::pager::DEFAULT_PAGE_SHIFT;
use crate::render::DEFAULT_THEME;

use tracing::debug;

/// Everything the session needs from the command line and the profile file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    host: Option<String>,
    path: Option<String>,
    method: Option<String>,
    proto: Option<String>,
    headers: Vec<(String, String)>,
    theme: String,
    page_shift: usize,
    pretty_json: bool,
    log_file: Option<String>,
    verbose: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            host: None,
            path: None,
            method: None,
            proto: None,
            headers: Vec::new(),
            theme: DEFAULT_THEME.to_string(),
            page_shift: DEFAULT_PAGE_SHIFT,
            pretty_json: false,
            log_file: None,
            verbose: false,
        }
    }
}

impl Settings {
    /// Command line wins over the profile, the profile over built-in defaults.
    /// Headers from both sources are kept, profile ones first, so a command
    /// line header with the same name is committed last and replaces it.
    pub fn resolve(args: &CommandLineArgs, profile: Option<&Profile>) -> Self {
        let defaults = Settings::default();
        let pick = |cli: Option<&String>, ini: Option<&String>| cli.or(ini).cloned();

        let mut headers: Vec<(String, String)> = profile
            .map(|p| p.headers().to_vec())
            .unwrap_or_default();
        headers.extend(args.headers().iter().cloned());

        Settings {
            host: pick(args.host(), profile.and_then(|p| p.host())),
            path: pick(args.path(), profile.and_then(|p| p.path())),
            method: pick(args.method(), profile.and_then(|p| p.method())),
            proto: pick(args.proto(), profile.and_then(|p| p.proto())),
            headers,
            theme: pick(args.theme(), profile.and_then(|p| p.theme())).unwrap_or(defaults.theme),
            page_shift: args
                .page_shift()
                .or(profile.and_then(|p| p.page_shift()))
                .unwrap_or(defaults.page_shift),
            pretty_json: args.pretty() || profile.and_then(|p| p.pretty_json()).unwrap_or(false),
            log_file: pick(args.log_file(), profile.and_then(|p| p.log_file())),
            verbose: args.verbose(),
        }
    }

    pub fn theme(&self) -> &str {
        &self.theme
    }

    pub fn page_shift(&self) -> usize {
        self.page_shift
    }

    pub fn pretty_json(&self) -> bool {
        self.pretty_json
    }

    pub fn log_file(&self) -> Option<&String> {
        self.log_file.as_ref()
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }

    /// Feeds the configured request parts through the same commit logic the
    /// user drives from the keyboard.
    pub fn seed(&self, focus: &mut FocusMachine, draft: &mut RequestDraft) {
        let singles = [
            (HOST, &self.host),
            (PROTO, &self.proto),
            (METHOD, &self.method),
            (PATH, &self.path),
        ];
        for (slot, value) in singles {
            if let Some(text) = value {
                focus.seed(slot, text, draft);
            }
        }

        for (name, value) in &self.headers {
            debug!(%name, "seeding header");
            focus.fields_mut().get_mut(HEADER).set_value(name);
            focus.seed(HEADER_VAL, value, draft);
        }
    }
}
