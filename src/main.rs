// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use savingsdesk::{app::App, cli, commands, db};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let mut app = App::open()?;

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Database initialized at {}", db::db_path()?.display());
        }
        Some(("config", sub)) => commands::config::handle(&mut app, sub)?,
        Some(("lookup", sub)) => commands::lookups::handle(&app, sub)?,
        Some(("platform", sub)) => commands::platforms::handle(&app, sub)?,
        Some(("project", sub)) => commands::projects::handle(&mut app, sub)?,
        Some(("financial", sub)) => commands::financial::handle(&mut app, sub)?,
        Some(("change", sub)) => commands::changes::handle(&mut app, sub)?,
        Some(("doc", sub)) => commands::documents::handle(&app, sub)?,
        Some(("import", sub)) => commands::importer::handle(&mut app, sub)?,
        Some(("export", sub)) => commands::exporter::handle(&app, sub)?,
        Some(("doctor", _)) => commands::doctor::handle(&app)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
