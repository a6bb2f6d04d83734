mod app;
mod args;
mod commit;
mod config;
mod decoder;
mod draft;
mod field;
mod focus;
mod http;
mod ini;
mod input;
mod keymap;
mod logging;
mod pager;
mod render;
mod ui;
mod url;

use anyhow::{bail, Context, Result};
use app::App;
use args::CommandLineArgs;
use config::Settings;
use ini::IniFile;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("{e:#}");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cmd_args = CommandLineArgs::parse()?;
    let profile = IniFile::load_profile(cmd_args.config(), cmd_args.profile())?;
    let settings = Settings::resolve(&cmd_args, profile.as_ref());

    logging::init(settings.log_file(), settings.verbose())?;
    info!(profile = %cmd_args.profile(), "starting posterm {}", env!("CARGO_PKG_VERSION"));

    if !atty::is(atty::Stream::Stdout) {
        bail!("stdout is not a terminal");
    }

    let (width, height) =
        crossterm::terminal::size().context("Failed to read the terminal size")?;
    let app = App::new(&settings, width, height);

    app::install_panic_hook();
    let mut terminal = app::init_terminal()?;
    let result = app::run(app, &mut terminal).await;
    app::restore_terminal()?;

    info!("bye");
    result
}
