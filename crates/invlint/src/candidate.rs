//! file role classification
//!
//! The directory layout encodes what a file is for (tasks, handlers, group
//! vars, ...), and the role decides which checks apply. Roles are a closed
//! enumeration: the only behavioral difference between them is which checks
//! run.
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Tasks,
    Handlers,
    RoleVars,
    GroupVars,
    HostVars,
    Meta,
    Code,
    Inventory,
    Rolesfile,
    Makefile,
    Template,
    File,
    Playbook,
    Doc,
}

/// Determine a file's role from its path
///
/// Returns [None] for files with no recognized role.
pub fn classify(path: &Path) -> Option<FileKind> {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let parent_dir = path
        .parent()
        .and_then(Path::file_name)
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let path_string = path.to_string_lossy();
    let dir_has = |segment: &str| {
        path.parent()
            .map(|parent| parent.components().any(|c| c.as_os_str() == segment))
            .unwrap_or(false)
    };
    let path_has = |segment: &str| path.components().any(|c| c.as_os_str() == segment);

    let kind = match parent_dir.as_str() {
        "tasks" => FileKind::Tasks,
        "handlers" => FileKind::Handlers,
        "vars" | "defaults" => FileKind::RoleVars,
        _ if dir_has("group_vars") => FileKind::GroupVars,
        _ if dir_has("host_vars") => FileKind::HostVars,
        "meta" => FileKind::Meta,
        "library" | "lookup_plugins" | "callback_plugins" | "filter_plugins" => FileKind::Code,
        _ if file_name.ends_with(".py") => FileKind::Code,
        "inventory" => FileKind::Inventory,
        _ if path_string.contains("rolesfile") || path_string.contains("requirements") => {
            FileKind::Rolesfile
        }
        _ if path_string.contains("Makefile") => FileKind::Makefile,
        _ if path_has("templates") || file_name.ends_with(".j2") => FileKind::Template,
        _ if path_has("files") => FileKind::File,
        _ if file_name.ends_with(".yml") || file_name.ends_with(".yaml") => FileKind::Playbook,
        _ if file_name.contains("README") => FileKind::Doc,
        _ => return None,
    };

    Some(kind)
}

impl FileKind {
    /// YAML roles get the indentation check
    pub fn checks_indentation(&self) -> bool {
        matches!(
            self,
            FileKind::Tasks
                | FileKind::Handlers
                | FileKind::RoleVars
                | FileKind::GroupVars
                | FileKind::HostVars
                | FileKind::Meta
                | FileKind::Rolesfile
                | FileKind::Playbook
        )
    }

    /// variable files get the duplicate key check
    pub fn checks_duplicate_keys(&self) -> bool {
        matches!(
            self,
            FileKind::RoleVars | FileKind::GroupVars | FileKind::HostVars
        )
    }

    /// group vars files get the sibling conflict check
    pub fn checks_group_conflicts(&self) -> bool {
        matches!(self, FileKind::GroupVars)
    }
}
