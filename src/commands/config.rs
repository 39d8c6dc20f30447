// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::app::App;
use crate::config::{KNOWN_KEYS, get_setting, set_setting};
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::Result;
use std::collections::BTreeMap;

pub fn handle(app: &mut App, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", sub)) => {
            let mut stored = BTreeMap::new();
            for key in KNOWN_KEYS {
                stored.insert(key, get_setting(&app.conn, key)?);
            }
            if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &app.settings)? {
                return Ok(());
            }
            let s = &app.settings;
            let effective = [
                s.actor.clone(),
                s.cache_ttl.as_secs().to_string(),
                s.feed_url.clone().unwrap_or_default(),
                serde_json::to_value(s.platform_diff)?
                    .as_str()
                    .unwrap_or_default()
                    .to_string(),
            ];
            let rows = KNOWN_KEYS
                .iter()
                .zip(effective)
                .map(|(k, v)| {
                    let source = if stored.get(k).is_some_and(|v| v.is_some()) {
                        "stored"
                    } else {
                        "default"
                    };
                    vec![k.to_string(), v, source.to_string()]
                })
                .collect();
            println!("{}", pretty_table(&["Key", "Value", "Source"], rows));
        }
        Some(("set", sub)) => {
            let key = sub.get_one::<String>("key").unwrap();
            let value = sub.get_one::<String>("value").unwrap();
            set_setting(&app.conn, key, value)?;
            app.reload_settings()?;
            println!("Set {} = {}", key.trim(), value.trim());
        }
        _ => {}
    }
    Ok(())
}
