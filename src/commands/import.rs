//! commands::import
//!
//! Imports an unmanaged tree as a new module.
//!
//! The arguments are the repository directory, the vendor branch tag and
//! the release tag, in that order. The whole local tree is uploaded: every
//! folder is declared with a repository path under the module directory and
//! every file is sent as `Modified`. Names matching [`DEFAULT_IGNORES`] or
//! a `-I` pattern are skipped; the pattern `!` clears every pattern before
//! it, defaults included.

use tracing::debug;

use crate::core::types::ResourcePath;
use crate::engine::command::{Command, Request};
use crate::engine::options::{collect_option_arguments, LocalOption};
use crate::engine::progress::ProgressMonitor;
use crate::engine::{check_cancelled, CommandError};
use crate::session::Session;
use crate::workspace::ResourceHandle;

/// Names never imported unless `-I !` clears them.
pub const DEFAULT_IGNORES: &[&str] = &[
    "RCS", "SCCS", "CVS", "CVS.adm", "RCSLOG", "cvslog.*", "tags", "TAGS", ".make.state",
    ".nse_depinfo", "*~", "#*", ".#*", ",*", "_$*", "*$", "*.old", "*.bak", "*.BAK", "*.orig",
    "*.rej", ".del-*", "*.a", "*.olb", "*.o", "*.obj", "*.so", "*.exe", "*.Z", "*.elc", "*.ln",
    "core",
];

/// Make an `-I` option ignoring names that match `pattern`.
///
/// A pattern may start or end with `*`; anything else matches exactly.
pub fn make_ignore_option(pattern: impl Into<String>) -> LocalOption {
    LocalOption::with_argument("-I", pattern)
}

/// Make a `-b` option naming the vendor branch number.
pub fn make_branch_option(branch: impl Into<String>) -> LocalOption {
    LocalOption::with_argument("-b", branch)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Import;

pub static IMPORT: Import = Import;

impl Command for Import {
    fn command_id(&self) -> &'static str {
        "import"
    }

    /// The root only, once the three arguments are known to be present.
    fn compute_work_resources(
        &self,
        session: &Session,
        request: &Request,
    ) -> Result<Vec<ResourceHandle>, CommandError> {
        match request.arguments.len() {
            0 => return Err(CommandError::MissingArgument("repository")),
            1 => return Err(CommandError::MissingArgument("vendor tag")),
            2 => return Err(CommandError::MissingArgument("release tag")),
            _ => {}
        }
        Ok(vec![session.local_root()])
    }

    fn send_local_resource_state(
        &self,
        session: &mut Session,
        request: &Request,
        _resources: &[ResourceHandle],
        monitor: &dyn ProgressMonitor,
    ) -> Result<(), CommandError> {
        let module = request
            .arguments
            .first()
            .ok_or(CommandError::MissingArgument("repository"))?
            .trim_end_matches('/');
        let ignored = ignore_patterns(request);

        monitor.begin_task("importing", 1);
        upload_folder(session, &ResourcePath::root(), module, &ignored, monitor)?;
        monitor.worked(1);
        monitor.done();
        Ok(())
    }

    /// Files go in relative to the repository root, not to any local
    /// folder sync info.
    fn send_local_working_directory(&self, session: &mut Session) -> Result<(), CommandError> {
        session.send_constructed_root_directory()?;
        Ok(())
    }
}

fn upload_folder(
    session: &mut Session,
    folder: &ResourcePath,
    repository: &str,
    ignored: &[&str],
    monitor: &dyn ProgressMonitor,
) -> Result<(), CommandError> {
    check_cancelled(monitor)?;
    session.send_directory(folder, repository)?;

    let members = session.workspace().members(folder)?;
    let (folders, files): (Vec<_>, Vec<_>) = members
        .into_iter()
        .filter(|member| {
            let skip = is_ignored(member.name(), ignored);
            if skip {
                debug!(path = %member.path(), "ignored by import pattern");
            }
            !skip
        })
        .partition(|member| member.is_folder());

    for file in &files {
        if !session.workspace().exists(file.path()) {
            continue;
        }
        let contents = session.workspace().read_file(file.path())?;
        session.send_modified(file.name(), &contents)?;
    }
    for child in &folders {
        let child_repository = format!("{}/{}", repository, child.name());
        upload_folder(session, child.path(), &child_repository, ignored, monitor)?;
    }
    Ok(())
}

fn ignore_patterns(request: &Request) -> Vec<&str> {
    let mut patterns: Vec<&str> = DEFAULT_IGNORES.to_vec();
    for pattern in collect_option_arguments(&request.local_options, "-I") {
        if pattern == "!" {
            patterns.clear();
        } else {
            patterns.push(pattern);
        }
    }
    patterns
}

fn is_ignored(name: &str, patterns: &[&str]) -> bool {
    patterns.iter().any(|pattern| {
        if let Some(suffix) = pattern.strip_prefix('*') {
            name.ends_with(suffix)
        } else if let Some(prefix) = pattern.strip_suffix('*') {
            name.starts_with(prefix)
        } else {
            name == *pattern
        }
    })
}
