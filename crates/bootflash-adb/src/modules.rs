//! Kernel module tree installer
//!
//! Mirrors an `INSTALL_MOD_PATH` tree (as produced by `make
//! modules_install`) onto the board. Only the part below
//! `lib/modules/<version>` is copied; the `source` and `build` links the
//! kernel build leaves there are skipped.

use crate::error::{AdbError, Result};
use crate::target::remote_join;
use crate::transport::Transport;
use log::{debug, info};
use std::path::{Component, Path};
use walkdir::WalkDir;

/// Directories with fewer components than this (relative to the tree root)
/// are assumed to exist on the board already
const MIN_COMPONENTS: usize = 3;

/// Entries never pushed
const SKIPPED: [&str; 2] = ["source", "build"];

/// What an install did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InstallReport {
    /// Remote directories created
    pub directories: usize,
    /// Files pushed
    pub files: usize,
}

/// Fail with [`AdbError::PermissionDenied`] unless the remote shell is root
pub fn require_root<T: Transport + ?Sized>(transport: &mut T) -> Result<()> {
    let output = transport.execute_checked(&["id"])?;
    if !output.stdout.contains("root") {
        return Err(AdbError::PermissionDenied(output.stdout.trim().to_string()));
    }
    Ok(())
}

/// Install the module tree rooted at `root` onto the board
pub fn install_modules<T: Transport + ?Sized>(
    transport: &mut T,
    root: &Path,
) -> Result<InstallReport> {
    if !root.is_dir() {
        return Err(AdbError::MissingInput(root.to_path_buf()));
    }
    require_root(transport)?;

    let mut report = InstallReport::default();
    let walker = WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter();

    for entry in walker {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(root)
            .map_err(|_| AdbError::MissingInput(entry.path().to_path_buf()))?;
        let remote = remote_path(relative);

        if entry.file_type().is_dir() {
            if relative.components().count() >= MIN_COMPONENTS {
                info!("mkdir: {}", remote);
                transport.execute_checked(&["mkdir", "-p", remote.as_str()])?;
                report.directories += 1;
            }
            continue;
        }

        let depth = relative.components().count().saturating_sub(1);
        let name = entry.file_name().to_string_lossy();
        if depth < MIN_COMPONENTS || SKIPPED.contains(&name.as_ref()) {
            debug!("Skipping {}", relative.display());
            continue;
        }

        info!("push: {}", remote);
        transport.push(entry.path(), &remote)?;
        report.files += 1;
    }

    info!(
        "Installed {} file(s) into {} director(ies)",
        report.files, report.directories
    );
    Ok(report)
}

/// `lib/modules/6.1` -> `/lib/modules/6.1`
fn remote_path(relative: &Path) -> String {
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .fold(String::from("/"), |dir, part| remote_join(&dir, &part))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockTransport;
    use std::fs;

    fn module_tree() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let ver = dir.path().join("lib/modules/6.1.0");
        fs::create_dir_all(ver.join("kernel/drivers/net")).unwrap();
        fs::write(ver.join("modules.dep"), "").unwrap();
        fs::write(ver.join("kernel/drivers/net/r8152.ko"), [0u8; 8]).unwrap();
        fs::write(ver.join("source"), "").unwrap();
        fs::write(ver.join("build"), "").unwrap();
        fs::write(dir.path().join("lib/modules/README"), "").unwrap();
        dir
    }

    #[test]
    fn test_install_modules() {
        let tree = module_tree();
        let mut mock = MockTransport::new();

        let report = install_modules(&mut mock, tree.path()).unwrap();

        assert_eq!(report.files, 2);
        assert_eq!(report.directories, 4);
        assert_eq!(
            mock.commands(),
            [
                "id",
                "mkdir -p /lib/modules/6.1.0",
                "mkdir -p /lib/modules/6.1.0/kernel",
                "mkdir -p /lib/modules/6.1.0/kernel/drivers",
                "mkdir -p /lib/modules/6.1.0/kernel/drivers/net",
            ]
        );
        let remotes: Vec<&str> = mock.pushes().into_iter().map(|(_, r)| r).collect();
        assert_eq!(
            remotes,
            [
                "/lib/modules/6.1.0/kernel/drivers/net/r8152.ko",
                "/lib/modules/6.1.0/modules.dep",
            ]
        );
    }

    #[test]
    fn test_requires_root() {
        let tree = module_tree();
        let mut mock = MockTransport::new();
        mock.id_output = "uid=2000(shell) gid=2000(shell)".into();

        let err = install_modules(&mut mock, tree.path()).unwrap_err();
        assert!(matches!(err, AdbError::PermissionDenied(ref id) if id.contains("shell")));
        assert!(mock.pushes().is_empty());
    }

    #[test]
    fn test_missing_tree() {
        let dir = tempfile::tempdir().unwrap();
        let mut mock = MockTransport::new();
        let err = install_modules(&mut mock, &dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, AdbError::MissingInput(_)));
        assert!(mock.calls.is_empty());
    }

    #[test]
    fn test_remote_path() {
        assert_eq!(remote_path(Path::new("lib/modules/6.1")), "/lib/modules/6.1");
        assert_eq!(remote_path(Path::new("")), "/");
    }
}
