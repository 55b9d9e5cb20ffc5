// src/tracker/bd.rs

//! [`IssueTracker`] backed by the `bd` command-line tool.
//!
//! Every operation is one `bd` invocation run in the target workspace with
//! `tokio::process::Command`. Only `create` produces output we need; it is
//! requested as JSON and parsed with `serde_json`.

use std::path::PathBuf;
use std::process::Stdio;

use serde::Deserialize;
use tokio::process::Command;
use tracing::{debug, info};

use crate::tracker::{CreateIssue, CreatedIssue, IssueTracker, TrackerError, TrackerFuture};

/// Directory `bd init` creates in a workspace.
pub const BEADS_DIR: &str = ".beads";

#[derive(Debug, Clone)]
pub struct BdTracker {
    binary: String,
    workspace: PathBuf,
}

/// The subset of `bd create --json` output we rely on.
#[derive(Debug, Deserialize)]
struct CreateOutput {
    id: String,
    #[serde(default)]
    title: Option<String>,
}

impl BdTracker {
    pub fn new(binary: impl Into<String>, workspace: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            workspace: workspace.into(),
        }
    }

    fn run(&self, args: Vec<String>) -> TrackerFuture<'static, String> {
        let binary = self.binary.clone();
        let workspace = self.workspace.clone();

        Box::pin(async move {
            let command = format!("{binary} {}", args.join(" "));
            debug!(command = %command, workspace = ?workspace, "running tracker command");

            let output = Command::new(&binary)
                .args(&args)
                .current_dir(&workspace)
                .stdin(Stdio::null())
                .output()
                .await
                .map_err(|source| TrackerError::Spawn {
                    program: binary.clone(),
                    source,
                })?;

            if !output.status.success() {
                return Err(TrackerError::Exit {
                    command,
                    code: output.status.code().unwrap_or(-1),
                    stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
                });
            }

            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        })
    }
}

/// Command-line arguments for `bd create`.
///
/// Titles and bodies come straight from the task file and may start with
/// `-`, so values are attached with `=` and the title follows `--`.
pub fn create_args(request: &CreateIssue) -> Vec<String> {
    let mut args = vec!["create".to_string()];
    if let Some(description) = &request.description {
        args.push(format!("--description={description}"));
    }
    args.push(format!("--type={}", request.kind.as_str()));
    if let Some(parent) = &request.parent {
        args.push(format!("--parent={parent}"));
    }
    if let Some(priority) = request.priority {
        args.push(format!("--priority={priority}"));
    }
    args.push("--json".to_string());
    args.push("--".to_string());
    args.push(request.title.clone());
    args
}

impl IssueTracker for BdTracker {
    fn create(&mut self, request: CreateIssue) -> TrackerFuture<'_, CreatedIssue> {
        let run = self.run(create_args(&request));
        Box::pin(async move {
            let stdout = run.await?;
            let parsed: CreateOutput =
                serde_json::from_str(stdout.trim()).map_err(|e| TrackerError::Output {
                    command: "create".to_string(),
                    reason: e.to_string(),
                })?;
            info!(id = %parsed.id, title = %request.title, kind = request.kind.as_str(), "created issue");
            Ok(CreatedIssue {
                id: parsed.id,
                title: parsed.title.unwrap_or(request.title),
                kind: request.kind,
            })
        })
    }

    fn add_dependency(&mut self, blocked: &str, blocking: &str) -> TrackerFuture<'_, ()> {
        let run = self.run(vec![
            "dep".to_string(),
            "add".to_string(),
            blocked.to_string(),
            blocking.to_string(),
        ]);
        Box::pin(async move {
            run.await?;
            Ok(())
        })
    }

    fn update_status(&mut self, id: &str, status: &str) -> TrackerFuture<'_, ()> {
        let run = self.run(vec![
            "update".to_string(),
            id.to_string(),
            "--status".to_string(),
            status.to_string(),
        ]);
        Box::pin(async move {
            run.await?;
            Ok(())
        })
    }

    fn close(&mut self, id: &str) -> TrackerFuture<'_, ()> {
        let run = self.run(vec!["close".to_string(), id.to_string()]);
        Box::pin(async move {
            run.await?;
            Ok(())
        })
    }

    fn check_initialized(&mut self) -> TrackerFuture<'_, bool> {
        let dir = self.workspace.join(BEADS_DIR);
        Box::pin(async move {
            let initialized = tokio::fs::metadata(&dir)
                .await
                .map(|m| m.is_dir())
                .unwrap_or(false);
            debug!(dir = ?dir, initialized, "checked tracker workspace");
            Ok(initialized)
        })
    }
}
