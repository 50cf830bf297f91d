//! Write commands - create, patch, delete and workflow.

use anyhow::{Result, bail};
use clap::Args;
use fieldsync_core::EntityKind;
use fieldsync_repo::PatchSet;
use serde_json::{Value, json};
use tracing::info;

use super::Session;
use super::args::loose_pair;
use crate::Cli;
use crate::output::JsonFormatter;

/// Arguments for the create command.
#[derive(Args)]
pub struct CreateArgs {
    /// Entity kind.
    pub kind: EntityKind,

    /// Object fields as a JSON object.
    pub body: String,
}

/// Arguments for the patch command.
#[derive(Args)]
pub struct PatchArgs {
    /// Entity kind.
    pub kind: EntityKind,

    /// Object id.
    pub id: String,

    /// Set KEY to VALUE (JSON or plain text). Repeatable.
    #[arg(long = "set", value_name = "KEY=VALUE", required = true)]
    pub fields: Vec<String>,
}

/// Arguments for the delete command.
#[derive(Args)]
pub struct DeleteArgs {
    /// Entity kind.
    pub kind: EntityKind,

    /// Object id.
    pub id: String,

    /// Mark the object deleted instead of removing it.
    #[arg(long)]
    pub soft: bool,
}

/// Arguments for the workflow command.
#[derive(Args)]
pub struct WorkflowArgs {
    /// Workflow name.
    pub name: String,

    /// Payload as a JSON object.
    #[arg(default_value = "{}")]
    pub body: String,
}

/// Parses `raw` as a JSON object.
fn json_object(raw: &str) -> Result<Value> {
    let value: Value = serde_json::from_str(raw)?;
    if !value.is_object() {
        bail!("expected a JSON object, got {raw}");
    }
    Ok(value)
}

impl PatchArgs {
    /// Builds the patch from the `--set` flags.
    pub fn changes(&self) -> Result<PatchSet> {
        let mut builder = PatchSet::builder();
        for raw in &self.fields {
            let (key, value) = loose_pair(raw)?;
            builder = builder.set(key, value);
        }
        Ok(builder.build()?)
    }
}

/// Runs the create command.
pub async fn create(args: &CreateArgs, session: &Session, cli: &Cli) -> Result<()> {
    let body = json_object(&args.body)?;
    let id = session.repo.create(args.kind, &body, &session.cancel).await?;
    info!(%id, kind = %args.kind, "Created");
    JsonFormatter::new(cli.pretty).print(&json!({ "id": id }))
}

/// Runs the patch command.
pub async fn patch(args: &PatchArgs, session: &Session) -> Result<()> {
    let changes = args.changes()?;
    session
        .repo
        .patch(args.kind, &args.id, &changes, &session.cancel)
        .await?;
    info!(id = %args.id, fields = changes.len(), "Patched");
    Ok(())
}

/// Runs the delete command.
pub async fn delete(args: &DeleteArgs, session: &Session) -> Result<()> {
    if args.soft {
        session
            .repo
            .soft_delete(args.kind, &args.id, &session.cancel)
            .await?;
    } else {
        session
            .repo
            .hard_delete(args.kind, &args.id, &session.cancel)
            .await?;
    }
    info!(id = %args.id, soft = args.soft, "Deleted");
    Ok(())
}

/// Runs the workflow command.
pub async fn workflow(args: &WorkflowArgs, session: &Session) -> Result<()> {
    let payload = json_object(&args.body)?;
    session
        .repo
        .run_workflow(&args.name, &payload, &session.cancel)
        .await?;
    info!(name = %args.name, "Workflow triggered");
    Ok(())
}
