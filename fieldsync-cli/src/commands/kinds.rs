//! Kinds command - list entity kinds and their endpoints.

use anyhow::Result;
use fieldsync_core::EntityKind;
use serde::Serialize;

use crate::Cli;
use crate::output::JsonFormatter;

#[derive(Debug, Serialize)]
struct KindOutput {
    kind: EntityKind,
    name: &'static str,
    path: String,
}

/// Runs the kinds command.
pub fn run(cli: &Cli) -> Result<()> {
    let kinds: Vec<KindOutput> = EntityKind::all()
        .iter()
        .map(|kind| KindOutput {
            kind: *kind,
            name: kind.display_name(),
            path: kind.collection_path(),
        })
        .collect();

    JsonFormatter::new(cli.pretty).print(&kinds)
}
