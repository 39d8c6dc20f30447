// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::Connection;
use savingsdesk::app::App;
use savingsdesk::config::{PlatformDiffMode, Settings, get_setting, set_setting};
use savingsdesk::error::AppError;
use savingsdesk::{cli, commands};
use std::time::Duration;

fn app() -> App {
    App::from_connection(Connection::open_in_memory().unwrap()).unwrap()
}

fn run_config(app: &mut App, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["savingsdesk", "config"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    match matches.subcommand() {
        Some(("config", m)) => commands::config::handle(app, m),
        _ => panic!("no config subcommand"),
    }
}

#[test]
fn defaults_apply_on_a_fresh_store() {
    let app = app();
    assert_eq!(app.settings, Settings::default());
    assert_eq!(app.settings.actor, "admin");
    assert_eq!(app.settings.platform_diff, PlatformDiffMode::WholeList);
    assert!(app.settings.feed_url.is_none());
}

#[test]
fn invalid_values_are_rejected_before_storing() {
    let app = app();
    for (key, value) in [
        ("cache_ttl_secs", "soon"),
        ("platform_diff", "sideways"),
        ("actor", "  "),
        ("colour", "blue"),
    ] {
        assert!(matches!(
            set_setting(&app.conn, key, value),
            Err(AppError::Validation(_))
        ));
        assert_eq!(get_setting(&app.conn, key).unwrap(), None);
    }
}

#[test]
fn cli_set_reloads_settings() {
    let mut app = app();
    run_config(&mut app, &["set", "--key", "platform_diff", "--value", "single-block"]).unwrap();
    run_config(&mut app, &["set", "--key", "cache_ttl_secs", "--value", "5"]).unwrap();
    run_config(&mut app, &["set", "--key", "actor", "--value", " planner "]).unwrap();

    assert_eq!(app.settings.platform_diff, PlatformDiffMode::SingleBlock);
    assert_eq!(app.settings.cache_ttl, Duration::from_secs(5));
    assert_eq!(app.lookup_cache().ttl(), Duration::from_secs(5));
    assert_eq!(app.settings.actor, "planner");
    run_config(&mut app, &["show"]).unwrap();
}

#[test]
fn blank_feed_url_means_local_units() {
    let app = app();
    set_setting(&app.conn, "feed_url", "").unwrap();
    let s = Settings::load(&app.conn).unwrap();
    assert!(s.feed_url.is_none());
}
