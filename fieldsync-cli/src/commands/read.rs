//! Read commands - get and list.

use std::num::NonZeroU32;

use anyhow::Result;
use clap::Args;
use fieldsync_core::{Constraint, EntityKind, Filter};
use fieldsync_fetch::{ListPage, ListQuery, PageCursor, SortOrder};
use serde_json::Value;
use tracing::info;

use super::Session;
use super::args::loose_pair;
use crate::Cli;
use crate::output::JsonFormatter;

/// Arguments for the get command.
#[derive(Args)]
pub struct GetArgs {
    /// Entity kind, e.g. task or "inventory item".
    pub kind: EntityKind,

    /// One or more object ids.
    #[arg(required = true)]
    pub ids: Vec<String>,
}

/// Arguments for the list command.
#[derive(Args)]
pub struct ListArgs {
    /// Entity kind.
    pub kind: EntityKind,

    /// Require KEY to equal VALUE (JSON or plain text). Repeatable.
    #[arg(long = "where", value_name = "KEY=VALUE")]
    pub equals: Vec<String>,

    /// Require KEY to contain VALUE. Repeatable.
    #[arg(long, value_name = "KEY=VALUE")]
    pub contains: Vec<String>,

    /// Field to sort by.
    #[arg(long)]
    pub sort: Option<String>,

    /// Sort descending.
    #[arg(long, requires = "sort")]
    pub desc: bool,

    /// Page size.
    #[arg(long, default_value = "100")]
    pub limit: NonZeroU32,

    /// Fetch every page instead of the first.
    #[arg(long)]
    pub all: bool,
}

impl ListArgs {
    /// Builds the list query from the flags.
    pub fn query(&self) -> Result<ListQuery> {
        let mut filter = Filter::new();
        for raw in &self.equals {
            let (key, value) = loose_pair(raw)?;
            filter.push(Constraint::equals(key, value));
        }
        for raw in &self.contains {
            let (key, value) = loose_pair(raw)?;
            filter.push(Constraint::contains(key, value));
        }

        let mut query = ListQuery::filtered(filter);
        if let Some(field) = &self.sort {
            let order = if self.desc {
                SortOrder::Desc
            } else {
                SortOrder::Asc
            };
            query = query.sorted_by(field.clone(), order);
        }
        Ok(query)
    }
}

/// Runs the get command.
pub async fn get(args: &GetArgs, session: &Session, cli: &Cli) -> Result<()> {
    let out = JsonFormatter::new(cli.pretty);
    let repo = &session.repo;

    if let [id] = args.ids.as_slice() {
        let value: Value = repo.get(args.kind, id, &session.cancel).await?;
        out.print(&value)
    } else {
        let values: Vec<Value> = repo.get_many(args.kind, &args.ids, &session.cancel).await?;
        out.print(&values)
    }
}

/// Runs the list command.
pub async fn list(args: &ListArgs, session: &Session, cli: &Cli) -> Result<()> {
    let out = JsonFormatter::new(cli.pretty);
    let query = args.query()?;

    if args.all {
        let repo = session.repo.clone().with_page_size(args.limit);
        let values: Vec<Value> = repo.list_all(args.kind, &query, &session.cancel).await?;
        info!(count = values.len(), kind = %args.kind, "Listed");
        out.print(&values)
    } else {
        let page: ListPage<Value> = session
            .repo
            .list(args.kind, &query, PageCursor::first(args.limit), &session.cancel)
            .await?;
        out.print(&page)
    }
}
