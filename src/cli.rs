// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, crate_version};

fn req(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).required(true).help(help)
}

fn opt(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).help(help)
}

fn many(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).action(ArgAction::Append).help(help)
}

fn flag(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).action(ArgAction::SetTrue).help(help)
}

fn json_flags(cmd: Command) -> Command {
    cmd.arg(flag("json", "Print as pretty JSON"))
        .arg(flag("jsonl", "Print as JSON lines"))
}

fn project_arg() -> Arg {
    req("project", "Project id or internal id")
}

pub fn build_cli() -> Command {
    Command::new("savingsdesk")
        .about("Procurement savings projections and change requests")
        .version(crate_version!())
        .subcommand_required(false)
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(
            Command::new("config")
                .about("Runtime settings")
                .subcommand(json_flags(Command::new("show")))
                .subcommand(
                    Command::new("set")
                        .arg(req("key", "actor | cache_ttl_secs | feed_url | platform_diff"))
                        .arg(req("value", "New value")),
                ),
        )
        .subcommand(
            Command::new("lookup")
                .about("Lookup reference tables")
                .subcommand(Command::new("kinds"))
                .subcommand(json_flags(
                    Command::new("list")
                        .arg(req("kind", "Lookup collection, e.g. brand"))
                        .arg(flag("all", "Include inactive entries")),
                ))
                .subcommand(
                    Command::new("add")
                        .arg(req("kind", "Lookup collection"))
                        .arg(many("set", "field=value").required(true)),
                )
                .subcommand(
                    Command::new("update")
                        .arg(req("kind", "Lookup collection"))
                        .arg(req("id", "Document id"))
                        .arg(many("set", "field=value").required(true)),
                )
                .subcommand(
                    Command::new("rm")
                        .arg(req("kind", "Lookup collection"))
                        .arg(req("id", "Document id")),
                ),
        )
        .subcommand(
            Command::new("platform")
                .about("Platform directory and monthly units")
                .subcommand(
                    Command::new("add")
                        .arg(req("id", "Platform id"))
                        .arg(req("name", "Platform name"))
                        .arg(req("pool", "direct | common"))
                        .arg(opt("group", "Platform group (direct pool)"))
                        .arg(opt("fg", "Functional group id (common pool)")),
                )
                .subcommand(
                    Command::new("map-group")
                        .arg(req("fg", "Functional group id"))
                        .arg(req("group", "Platform group")),
                )
                .subcommand(json_flags(
                    Command::new("list").arg(req("fg", "Functional group id")),
                ))
                .subcommand(json_flags(
                    Command::new("units").arg(req("platform", "Platform id")),
                )),
        )
        .subcommand(
            Command::new("project")
                .about("Projects")
                .subcommand(
                    Command::new("next-id")
                        .arg(req("fg", "Functional group name"))
                        .arg(opt("date", "YYYY-MM-DD, defaults to today")),
                )
                .subcommand(Command::new("check-id").arg(req("id", "Project id")))
                .subcommand(
                    Command::new("create")
                        .arg(opt("project-id", "Project id"))
                        .arg(opt("description", "Description"))
                        .arg(opt("start", "Start date YYYY-MM-DD"))
                        .arg(opt("fixed-total", "Annual fixed-cost savings, auto-spread"))
                        .arg(many("set", "metadata field=value"))
                        .arg(many("doc", "type=path of a document to attach")),
                )
                .subcommand(json_flags(Command::new("show").arg(project_arg())))
                .subcommand(json_flags(Command::new("list"))),
        )
        .subcommand(
            Command::new("financial")
                .about("Edit a project's financial picture")
                .subcommand(json_flags(Command::new("show").arg(project_arg())))
                .subcommand(
                    Command::new("add-block")
                        .arg(project_arg())
                        .arg(opt("platform", "Platform id"))
                        .arg(opt("unit-cost", "Unit cost savings"))
                        .arg(opt("volume", "Total volume for blocks without a platform")),
                )
                .subcommand(
                    Command::new("set-platform")
                        .arg(project_arg())
                        .arg(req("block", "Block id"))
                        .arg(req("platform", "Platform id, empty to clear")),
                )
                .subcommand(
                    Command::new("set-unit-cost")
                        .arg(project_arg())
                        .arg(req("block", "Block id"))
                        .arg(req("value", "Unit cost savings")),
                )
                .subcommand(
                    Command::new("set-volume")
                        .arg(project_arg())
                        .arg(req("block", "Block id"))
                        .arg(req("value", "Total volume")),
                )
                .subcommand(
                    Command::new("rm-block")
                        .arg(project_arg())
                        .arg(req("block", "Block id")),
                )
                .subcommand(
                    Command::new("set-start")
                        .arg(project_arg())
                        .arg(opt("date", "YYYY-MM-DD"))
                        .arg(flag("clear", "Remove the start date")),
                )
                .subcommand(
                    Command::new("set-fixed-total")
                        .arg(project_arg())
                        .arg(req("value", "Annual total")),
                )
                .subcommand(
                    Command::new("set-fixed-month")
                        .arg(project_arg())
                        .arg(req("month", "YYYY-MM"))
                        .arg(req("value", "Savings for that month")),
                ),
        )
        .subcommand(
            Command::new("change")
                .about("Change review and approval")
                .subcommand(json_flags(
                    Command::new("review")
                        .arg(project_arg())
                        .arg(many("set", "metadata field=value"))
                        .arg(many("platform", "block=platform id"))
                        .arg(many("unit-cost", "block=unit cost"))
                        .arg(many("fixed-month", "YYYY-MM=value"))
                        .arg(opt("fixed-total", "Annual fixed-cost total"))
                        .arg(opt("start", "Start date YYYY-MM-DD"))
                        .arg(flag("submit", "File the change request"))
                        .arg(opt("reason", "Reason code"))
                        .arg(opt("comment", "Comment code")),
                ))
                .subcommand(json_flags(
                    Command::new("list").arg(req("project", "Project id")),
                ))
                .subcommand(Command::new("approve").arg(req("id", "Change request id")))
                .subcommand(Command::new("reject").arg(req("id", "Change request id"))),
        )
        .subcommand(
            Command::new("doc")
                .about("Project documents")
                .subcommand(
                    Command::new("attach")
                        .arg(project_arg())
                        .arg(req("type", "Document type"))
                        .arg(req("path", "File to upload")),
                )
                .subcommand(json_flags(Command::new("list").arg(project_arg())))
                .subcommand(
                    Command::new("fetch")
                        .arg(req("id", "Document id"))
                        .arg(req("out", "Destination file")),
                ),
        )
        .subcommand(
            Command::new("import")
                .about("Bulk import from files")
                .subcommand(Command::new("units").arg(req("path", "CSV: platform_id,month,units")))
                .subcommand(
                    Command::new("lookups")
                        .arg(req("kind", "Lookup collection"))
                        .arg(req("path", "CSV with a header row of field names")),
                )
                .subcommand(Command::new("legacy").arg(req("path", "JSON array of legacy projects"))),
        )
        .subcommand(
            Command::new("export").about("Export data").subcommand(
                Command::new("projection")
                    .arg(project_arg())
                    .arg(req("format", "csv | json"))
                    .arg(req("out", "Output path")),
            ),
        )
        .subcommand(Command::new("doctor").about("Check data consistency"))
}
