//! TagMod - Gorilla Tag Mod Installer
//!
//! Command-line front end: installs BepInEx and plugin DLLs into a Gorilla Tag folder.

use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};

use tagmod_rust::catalog::Catalog;
use tagmod_rust::config::AppConfig;
use tagmod_rust::docs::{self, ReadmeLine, Span};
use tagmod_rust::installers::{PluginAction, TaskContext};
use tagmod_rust::logging::{init_logger, log_file_path, log_info, log_warning};
use tagmod_rust::session::Session;
use tagmod_rust::utils::UreqFetcher;

#[derive(Parser)]
#[command(name = "tagmod", version, about = "Gorilla Tag mod installer")]
struct Cli {
    /// Gorilla Tag folder (or any folder above it)
    #[arg(long, global = true)]
    path: Option<PathBuf>,

    /// Developer mode: use this folder as-is, without looking for the game
    #[arg(long, global = true, value_name = "DIR")]
    dev_path: Option<PathBuf>,

    /// Only write log lines to the log file
    #[arg(long, short, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Look for Gorilla Tag in the usual install locations
    Detect,
    /// Check a folder and remember the game directory found in it
    Validate { folder: PathBuf },
    /// List available mods
    Catalog,
    /// Show BepInEx and plugin state for the current folder
    Status,
    /// Install BepInEx (required before installing mods)
    Bootstrap,
    /// Download and install mods
    Install(ModArgs),
    /// Remove installed mods
    Uninstall(ModArgs),
    /// Rename mods to *.disabled so BepInEx skips them
    Disable(ModArgs),
    /// Re-enable disabled mods
    Enable(ModArgs),
    /// Remove BepInEx and all plugins
    Unmod {
        /// Don't ask for confirmation
        #[arg(long)]
        yes: bool,
    },
    /// Show a mod's README
    Readme { name: String },
    /// Show a mod's short description
    About { name: String },
}

#[derive(Args)]
struct ModArgs {
    /// Mod names as listed by `catalog` (case-insensitive) or owner/repo
    #[arg(required_unless_present = "all")]
    mods: Vec<String>,

    /// Every mod in the catalog
    #[arg(long, conflicts_with = "mods")]
    all: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logger(cli.quiet);
    log_info("TagMod starting up...");

    let config = AppConfig::load();
    let catalog = Catalog::load(&config);
    let mut session = Session::new(config, catalog);
    if let Some(dir) = &cli.dev_path {
        session = session.with_dev_override(dir);
    }

    let cancel = Arc::new(AtomicBool::new(false));
    // elsewhere Ctrl-C keeps its default behavior and ends the process
    if is_cancellable(&cli.command) {
        let handler_flag = cancel.clone();
        if let Err(e) = ctrlc::set_handler(move || {
            eprintln!("Cancelling after the current step...");
            handler_flag.store(true, Ordering::Relaxed);
        }) {
            log_warning(&format!("Could not install Ctrl-C handler: {}", e));
        }
    }
    let ctx = TaskContext::new(|msg| println!("{}", msg), cancel);

    if let Some(path) = &cli.path {
        if !session.select_path(path) {
            println!("Selected folder is not a Gorilla Tag installation.");
            return ExitCode::FAILURE;
        }
    } else if session.target_path().is_none() && needs_target(&cli.command) {
        session.detect();
    }

    let ok = run(cli.command, &mut session, &ctx);

    if !ok {
        if let Some(path) = log_file_path() {
            eprintln!("See {} for details", path.display());
        }
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn needs_target(command: &Command) -> bool {
    !matches!(
        command,
        Command::Catalog
            | Command::Readme { .. }
            | Command::About { .. }
            | Command::Detect
            | Command::Validate { .. }
    )
}

/// Commands that check the cancel flag between steps
fn is_cancellable(command: &Command) -> bool {
    matches!(
        command,
        Command::Bootstrap
            | Command::Install(_)
            | Command::Uninstall(_)
            | Command::Disable(_)
            | Command::Enable(_)
    )
}

fn run(command: Command, session: &mut Session, ctx: &TaskContext) -> bool {
    let fetcher = UreqFetcher::new(&session.config);

    match command {
        Command::Detect => match session.detect() {
            Some(path) => {
                println!("Using path: {}", path.display());
                session.remember_target();
                true
            }
            None => {
                println!("Path not detected. Please pass --path or use `validate <folder>`.");
                false
            }
        },
        Command::Validate { folder } => {
            if !session.select_path(&folder) {
                println!("Selected folder is not a Gorilla Tag installation.");
                return false;
            }
            if let Some(found) = session.target_path() {
                println!("Selected path: {}", found.display());
            }
            session.remember_target();
            true
        }
        Command::Catalog => {
            for group in &session.catalog.groups {
                println!("{} ({})", group.group_name, group.subtitle);
                for entry in &group.mods {
                    println!("  {:<24} {}", entry.display_name, entry.repository_id);
                }
            }
            true
        }
        Command::Status => {
            let status = session.status();
            let Some(target) = status.target else {
                println!("No Gorilla Tag folder selected.");
                return false;
            };
            println!("Game folder: {}", target.display());
            println!(
                "BepInEx:     {}",
                if status.runtime_present { "installed" } else { "not installed" }
            );
            if status.plugins.is_empty() {
                println!("Plugins:     none");
            }
            for plugin in &status.plugins {
                let state = if plugin.disabled { "disabled" } else { "enabled" };
                println!("  {:<40} {}", plugin.file_name, state);
            }
            true
        }
        Command::Bootstrap => match session.bootstrap(&fetcher, ctx) {
            Ok(()) => {
                session.remember_target();
                true
            }
            Err(e) => {
                println!("Error installing BepInEx: {}", e);
                false
            }
        },
        Command::Install(args) => batch(session, &fetcher, ctx, PluginAction::Install, args),
        Command::Uninstall(args) => batch(session, &fetcher, ctx, PluginAction::Uninstall, args),
        Command::Disable(args) => batch(session, &fetcher, ctx, PluginAction::Disable, args),
        Command::Enable(args) => batch(session, &fetcher, ctx, PluginAction::Enable, args),
        Command::Unmod { yes } => {
            if !yes && !confirm_unmod() {
                println!("Unmod cancelled.");
                return true;
            }
            match session.unmod() {
                Ok(()) => {
                    println!("BepInEx and plugins removed");
                    true
                }
                Err(e) => {
                    println!("Error during unmod: {}", e);
                    false
                }
            }
        }
        Command::Readme { name } => {
            let Some(entry) = session.catalog.find(&name).cloned() else {
                println!("Unknown mod: {}", name);
                return false;
            };
            match docs::fetch_readme(&fetcher, &session.config, &entry.repository_id) {
                Some(text) => {
                    print_readme(&docs::parse_readme(&text));
                    true
                }
                None => {
                    println!("Unable to load README");
                    false
                }
            }
        }
        Command::About { name } => {
            let Some(entry) = session.catalog.find(&name).cloned() else {
                println!("Unknown mod: {}", name);
                return false;
            };
            match docs::fetch_description(&fetcher, &session.config, &entry.repository_id) {
                Some(description) => {
                    println!("{}", description);
                    true
                }
                None => {
                    println!("Unable to fetch mod info");
                    false
                }
            }
        }
    }
}

fn batch(
    session: &mut Session,
    fetcher: &UreqFetcher,
    ctx: &TaskContext,
    action: PluginAction,
    args: ModArgs,
) -> bool {
    if args.all {
        session.select_all();
    } else if let Err(e) = session.select(&args.mods) {
        println!("{}", e);
        return false;
    }

    match session.run_batch(fetcher, action, ctx) {
        Ok(reports) => {
            let failed = reports.iter().filter(|r| r.result.is_err()).count();
            println!(
                "{} of {} mods done, {} failed",
                reports.len() - failed,
                reports.len(),
                failed
            );
            failed == 0
        }
        Err(e) => {
            println!("{}", e);
            false
        }
    }
}

fn confirm_unmod() -> bool {
    print!(
        "This will remove BepInEx and all plugins. Some mods may have added folders outside \
         BepInEx; those must be deleted manually.\nContinue? [y/N] "
    );
    let _ = io::stdout().flush();

    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

fn print_readme(lines: &[ReadmeLine]) {
    let styled = io::stdout().is_terminal();
    for line in lines {
        match line {
            ReadmeLine::Header(text) if styled => println!("\x1b[1m{}\x1b[0m", text),
            ReadmeLine::Header(text) => println!("{}", text),
            ReadmeLine::Text(spans) => {
                let mut out = String::new();
                for span in spans {
                    match span {
                        Span::Text(text) => out.push_str(text),
                        Span::Link { text, url } if styled => {
                            // OSC 8 hyperlink
                            out.push_str(&format!("\x1b]8;;{}\x1b\\{}\x1b]8;;\x1b\\", url, text))
                        }
                        Span::Link { text, url } => out.push_str(&format!("{} <{}>", text, url)),
                    }
                }
                println!("{}", out);
            }
        }
    }
}
