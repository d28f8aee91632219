//! Post-invocation synchronization, keyed by verb.
//!
//! Adding a handler: append one entry to `POST_INVOCATION_HANDLERS`.

use crate::core::config::WorkspaceLayout;
use crate::core::error::RushPnpmError;
use crate::core::fs_sync::{self, SyncAction};
use crate::core::output;

pub(crate) struct PostInvocationHandler {
    pub verb: &'static str,
    pub run: fn(&WorkspaceLayout) -> Result<(), RushPnpmError>,
}

/// Handlers run only after PNPM exited with status 0.
pub(crate) const POST_INVOCATION_HANDLERS: &[PostInvocationHandler] = &[PostInvocationHandler {
    verb: "patch-commit",
    run: sync_committed_patches,
}];

/// Run the handler registered for `verb`, if there is one. Returns whether a
/// handler ran.
pub fn run_post_invocation(verb: &str, layout: &WorkspaceLayout) -> Result<bool, RushPnpmError> {
    let Some(handler) = POST_INVOCATION_HANDLERS.iter().find(|h| h.verb == verb) else {
        return Ok(false);
    };
    tracing::info!(verb, "running post-invocation sync");
    (handler.run)(layout)?;
    Ok(true)
}

/// After `pnpm patch-commit`: publish the patches PNPM wrote into
/// `common/temp` to their committed locations.
///
/// The patch folder is copied before the lockfile is synced; the lockfile
/// is what makes the new patch set take effect.
pub fn sync_committed_patches(layout: &WorkspaceLayout) -> Result<(), RushPnpmError> {
    if !layout.temp_patches.is_dir() {
        tracing::debug!(
            path = %layout.temp_patches.display(),
            "no temporary patches folder; nothing to sync"
        );
        return Ok(());
    }

    let copied = fs_sync::copy_dir_recursive(&layout.temp_patches, &layout.committed_patches)?;
    let lockfile = fs_sync::sync_file(&layout.temp_lockfile, &layout.committed_lockfile)?;
    tracing::info!(copied, ?lockfile, "patch state synchronized");

    let lockfile_note = match lockfile {
        SyncAction::Copied => "updated",
        SyncAction::Removed => "removed",
        SyncAction::Unchanged => "left unchanged",
    };
    output::print_warning(&format!(
        "Rush refreshed {} ({} file(s)) and {} the shrinkwrap file {}. Please commit this change to Git.",
        layout.committed_patches.display(),
        copied,
        lockfile_note,
        layout.committed_lockfile.display()
    ));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn patch_commit_copies_patches_and_lockfile() {
        let tmp = tempdir().unwrap();
        let layout = WorkspaceLayout::new(tmp.path());
        fs::create_dir_all(&layout.temp_patches).unwrap();
        fs::write(layout.temp_patches.join("left-pad@1.3.0.patch"), "diff").unwrap();
        fs::write(&layout.temp_lockfile, "lockfileVersion: '9.0'").unwrap();

        assert!(run_post_invocation("patch-commit", &layout).unwrap());

        assert_eq!(
            fs::read_to_string(layout.committed_patches.join("left-pad@1.3.0.patch")).unwrap(),
            "diff"
        );
        assert_eq!(
            fs::read_to_string(&layout.committed_lockfile).unwrap(),
            "lockfileVersion: '9.0'"
        );
    }

    #[test]
    fn missing_temp_lockfile_removes_committed_one() {
        let tmp = tempdir().unwrap();
        let layout = WorkspaceLayout::new(tmp.path());
        fs::create_dir_all(&layout.temp_patches).unwrap();
        fs::create_dir_all(layout.committed_lockfile.parent().unwrap()).unwrap();
        fs::write(&layout.committed_lockfile, "stale").unwrap();

        sync_committed_patches(&layout).unwrap();

        assert!(!layout.committed_lockfile.exists());
        assert!(layout.committed_patches.is_dir());
    }

    #[test]
    fn no_temp_patches_folder_is_a_no_op() {
        let tmp = tempdir().unwrap();
        let layout = WorkspaceLayout::new(tmp.path());
        fs::create_dir_all(&layout.common_temp).unwrap();
        fs::write(&layout.temp_lockfile, "lockfileVersion: '9.0'").unwrap();

        assert!(run_post_invocation("patch-commit", &layout).unwrap());

        assert!(!layout.committed_patches.exists());
        assert!(!layout.committed_lockfile.exists());
    }

    #[test]
    fn other_verbs_have_no_handler() {
        let tmp = tempdir().unwrap();
        let layout = WorkspaceLayout::new(tmp.path());
        fs::create_dir_all(&layout.temp_patches).unwrap();

        for verb in ["patch", "install", "update", "run"] {
            assert!(!run_post_invocation(verb, &layout).unwrap(), "{}", verb);
        }
        assert!(!layout.committed_patches.exists());
    }
}
