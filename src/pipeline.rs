use std::io;
use std::path::Path;
use tracing::{error, info, warn};

use crate::config::Settings;
use crate::error::{HookError, Result};
use crate::runner::CommandRunner;

const DUBIOUS_OWNERSHIP: &str = "dubious ownership";

/// How far an update got.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Pulled, no build file present.
    Pulled,
    /// Pulled and built.
    Built,
}

fn log_ownership_hint(dir: &Path, output: &str) {
    let dir = dir.display();
    if output.contains(DUBIOUS_OWNERSHIP) {
        warn!(
            "git refused to operate on {dir} because it is owned by another user. \
             Transfer ownership with 'sudo chown -R www-data {dir}' and run \
             'git config --global --add safe.directory {dir}'."
        );
    } else {
        info!(
            "Note: if this results in 'detected dubious ownership in repository', the owner of \
             {dir} differs from the user running the pull. Fix it with \
             'sudo chown -R www-data {dir}' and 'git config --global --add safe.directory {dir}'."
        );
    }
}

/// Pull the working copy at `dir`, then build it if it carries a build file.
///
/// No rollback: a failed build leaves the freshly pulled revision in place.
pub async fn run_update(
    runner: &dyn CommandRunner,
    settings: &Settings,
    dir: &Path,
) -> Result<UpdateOutcome> {
    let dir_str = dir.display().to_string();

    // 1. pull
    let pull = runner
        .run(dir, &settings.pull_command)
        .await
        .map_err(|e| {
            error!("Failed to start pull in {}: {}", dir_str, e);
            HookError::PullFailed {
                dir: dir_str.clone(),
                output: e.to_string(),
            }
        })?;
    if !pull.success {
        error!(
            "Failed pulling repository {} (exit status {:?}):\n{}",
            dir_str, pull.status, pull.output
        );
        log_ownership_hint(dir, &pull.output);
        return Err(HookError::PullFailed {
            dir: dir_str,
            output: pull.output,
        });
    }
    info!("Pull output for {}:\n{}", dir_str, pull.output);

    // 2. build file present?
    let has_build_file = match tokio::fs::metadata(dir.join(&settings.build_file)).await {
        Ok(meta) => meta.is_file(),
        Err(e) if e.kind() == io::ErrorKind::NotFound => false,
        Err(e) => {
            error!(
                "Cannot inspect {} in {}: {}",
                settings.build_file, dir_str, e
            );
            return Err(HookError::BuildFailed {
                dir: dir_str,
                output: e.to_string(),
            });
        }
    };
    if !has_build_file {
        info!(
            "No {} found in {}, nothing to build but the repository is up to date",
            settings.build_file, dir_str
        );
        return Ok(UpdateOutcome::Pulled);
    }

    // 3. build
    let build = runner
        .run(dir, &settings.build_command)
        .await
        .map_err(|e| {
            error!("Failed to start build in {}: {}", dir_str, e);
            HookError::BuildFailed {
                dir: dir_str.clone(),
                output: e.to_string(),
            }
        })?;
    if !build.success {
        error!(
            "Failed building repository {} (exit status {:?}):\n{}",
            dir_str, build.status, build.output
        );
        return Err(HookError::BuildFailed {
            dir: dir_str,
            output: build.output,
        });
    }
    info!("Build output for {}:\n{}", dir_str, build.output);

    Ok(UpdateOutcome::Built)
}
