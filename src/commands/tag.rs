//! commands::tag
//!
//! Tags the repository revisions of working files.
//!
//! The first argument is the tag name; the rest name the resources to tag,
//! defaulting to the whole working root. All arguments, tag name first, are
//! sent as they were given.

use super::send_structure;
use crate::core::types::Tag;
use crate::engine::command::{check_resources_managed, default_work_resources, Command, Request};
use crate::engine::options::LocalOption;
use crate::engine::progress::ProgressMonitor;
use crate::engine::CommandError;
use crate::session::Session;
use crate::workspace::ResourceHandle;

/// Make the tag a branch tag.
pub const CREATE_BRANCH: LocalOption = LocalOption::new("-b");
/// Delete the tag instead of creating it.
pub const DELETE_TAG: LocalOption = LocalOption::new("-d");
/// Move an existing tag.
pub const FORCE_REASSIGNMENT: LocalOption = LocalOption::new("-F");

#[derive(Debug, Clone, Copy, Default)]
pub struct TagCommand;

pub static TAG: TagCommand = TagCommand;

impl Command for TagCommand {
    fn command_id(&self) -> &'static str {
        "tag"
    }

    fn compute_work_resources(
        &self,
        session: &Session,
        request: &Request,
    ) -> Result<Vec<ResourceHandle>, CommandError> {
        let (name, paths) = request
            .arguments
            .split_first()
            .ok_or(CommandError::MissingArgument("tag name"))?;
        Tag::version(name.as_str())?;
        default_work_resources(session, paths)
    }

    fn send_local_resource_state(
        &self,
        session: &mut Session,
        request: &Request,
        resources: &[ResourceHandle],
        monitor: &dyn ProgressMonitor,
    ) -> Result<(), CommandError> {
        check_resources_managed(session, resources)?;
        send_structure(session, request, resources, monitor, false, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures;

    #[test]
    fn tag_name_then_paths() {
        let (mut session, connection) = fixtures::session(
            fixtures::workspace(),
            &["M T src/a.c", "ok"],
        );
        let request = Request::new()
            .local(CREATE_BRANCH)
            .arguments(["release-1", "src"]);
        let status = TAG
            .execute(&mut session, &fixtures::context(), &request, None, None)
            .unwrap();
        assert!(status.is_ok());

        let lines = connection.sent_lines();
        assert_eq!(lines[0], "Argument -b");
        assert!(lines.contains(&"Directory src".to_string()));
        assert!(lines.contains(&"Unchanged a.c".to_string()));
        assert!(!lines.contains(&"Unchanged clean.c".to_string()));
        assert_eq!(
            &lines[lines.len() - 3..],
            &["Argument release-1".to_string(), "Argument src".to_string(), "tag".to_string()]
        );
    }

    #[test]
    fn no_paths_tags_root() {
        let (mut session, connection) = fixtures::session(fixtures::workspace(), &["ok"]);
        let request = Request::new().argument("snapshot");
        TAG.execute(&mut session, &fixtures::context(), &request, None, None)
            .unwrap();
        assert!(connection.sent_lines().contains(&"Unchanged clean.c".to_string()));
    }

    mod arguments {
        use super::*;

        #[test]
        fn missing_tag_name() {
            let (mut session, connection) = fixtures::session(fixtures::workspace(), &["ok"]);
            let result = TAG.execute(&mut session, &fixtures::context(), &Request::new(), None, None);
            assert!(matches!(result, Err(CommandError::MissingArgument("tag name"))));
            assert!(connection.sent_lines().is_empty());
        }

        #[test]
        fn invalid_tag_name() {
            let (mut session, _) = fixtures::session(fixtures::workspace(), &["ok"]);
            let request = Request::new().argument("bad tag");
            let result = TAG.execute(&mut session, &fixtures::context(), &request, None, None);
            assert!(matches!(result, Err(CommandError::InvalidArgument(_))));
        }
    }
}
