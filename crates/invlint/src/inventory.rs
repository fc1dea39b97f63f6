//! arena-backed inventory graph
//!
//! [Inventory] tracks
//! - the groups (name, local vars, relations to hosts and other groups)
//! - the hosts (name, direct group memberships)
//! and defines a numeric index for each. Once added those indices are stable
//! (removal is not possible). All relations are stored as index sets, so the
//! acyclic but richly connected graph has no ownership cycles.
//!
//! Membership is transitive: a host directly assigned to a child group is a
//! member of every ancestor group, see [Inventory::hosts_of] and
//! [Inventory::groups_of_host].
use indexmap::IndexMap;
use std::collections::BTreeSet;
use std::path::Path;

/// A group's locally declared variables, before inheritance filtering
pub type Vars = IndexMap<String, serde_yaml::Value>;

/// Index of a [Group] within an [Inventory]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(usize);

/// Index of a [Host] within an [Inventory]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HostId(usize);

#[derive(Debug)]
pub struct Group {
    pub name: String,
    pub vars: Vars,
    /// directly assigned hosts
    pub hosts: BTreeSet<HostId>,
    pub parent_groups: BTreeSet<GroupId>,
    pub child_groups: BTreeSet<GroupId>,
}

#[derive(Debug)]
pub struct Host {
    pub name: String,
    /// groups this host is directly assigned to
    pub groups: BTreeSet<GroupId>,
}

#[derive(Default, Debug)]
pub struct Inventory {
    groups: Vec<Group>,
    hosts: Vec<Host>,
    group_index: IndexMap<String, GroupId>,
    host_index: IndexMap<String, HostId>,
}

impl Inventory {
    pub fn group(&self, id: GroupId) -> &Group {
        &self.groups[id.0]
    }

    pub fn host(&self, id: HostId) -> &Host {
        &self.hosts[id.0]
    }

    pub fn group_named(&self, name: &str) -> Option<GroupId> {
        self.group_index.get(name).copied()
    }

    pub fn host_named(&self, name: &str) -> Option<HostId> {
        self.host_index.get(name).copied()
    }

    /// Look up an existing group by name or add an empty one
    pub fn ensure_group(&mut self, name: &str) -> GroupId {
        if let Some(id) = self.group_index.get(name) {
            return *id;
        }

        let id = GroupId(self.groups.len());
        self.groups.push(Group {
            name: name.to_string(),
            vars: Default::default(),
            hosts: Default::default(),
            parent_groups: Default::default(),
            child_groups: Default::default(),
        });
        self.group_index.insert(name.to_string(), id);
        tracing::trace!(group = name, "new group");
        id
    }

    pub fn ensure_host(&mut self, name: &str) -> HostId {
        if let Some(id) = self.host_index.get(name) {
            return *id;
        }

        let id = HostId(self.hosts.len());
        self.hosts.push(Host {
            name: name.to_string(),
            groups: Default::default(),
        });
        self.host_index.insert(name.to_string(), id);
        tracing::trace!(host = name, "new host");
        id
    }

    pub fn add_host(&mut self, group: GroupId, host: HostId) {
        self.groups[group.0].hosts.insert(host);
        self.hosts[host.0].groups.insert(group);
    }

    pub fn add_child(&mut self, parent: GroupId, child: GroupId) {
        self.groups[parent.0].child_groups.insert(child);
        self.groups[child.0].parent_groups.insert(parent);
    }

    pub fn set_var(&mut self, group: GroupId, key: &str, value: serde_yaml::Value) {
        self.groups[group.0].vars.insert(key.to_string(), value);
    }

    /// Transitive parents of `group`
    ///
    /// The starting group itself is never yielded and every node is visited
    /// at most once, so traversal terminates even on a malformed cyclic
    /// graph.
    pub fn ancestors(&self, group: GroupId) -> Vec<GroupId> {
        fn parents(group: &Group) -> &BTreeSet<GroupId> {
            &group.parent_groups
        }
        self.expand(group, parents)
    }

    /// Transitive children of `group`
    pub fn descendants(&self, group: GroupId) -> Vec<GroupId> {
        fn children(group: &Group) -> &BTreeSet<GroupId> {
            &group.child_groups
        }
        self.expand(group, children)
    }

    fn expand(&self, group: GroupId, edges: fn(&Group) -> &BTreeSet<GroupId>) -> Vec<GroupId> {
        let mut seen: BTreeSet<GroupId> = BTreeSet::new();
        let mut queue: Vec<GroupId> = edges(self.group(group)).iter().copied().collect();

        while let Some(next) = queue.pop() {
            if next == group || !seen.insert(next) {
                continue;
            }
            queue.extend(edges(self.group(next)).iter().copied());
        }

        seen.into_iter().collect()
    }

    /// Hosts of `group`, including hosts of every descendant group
    pub fn hosts_of(&self, group: GroupId) -> BTreeSet<HostId> {
        let mut hosts = self.group(group).hosts.clone();
        for descendant in self.descendants(group) {
            hosts.extend(self.group(descendant).hosts.iter().copied());
        }
        hosts
    }

    /// Groups `host` is a member of, including ancestors of its direct groups
    pub fn groups_of_host(&self, host: HostId) -> BTreeSet<GroupId> {
        let mut groups = self.host(host).groups.clone();
        for direct in &self.host(host).groups {
            groups.extend(self.ancestors(*direct));
        }
        groups
    }
}

impl Inventory {
    /// Load an inventory from a file or directory
    ///
    /// Directories are probed for the conventional file names, and a
    /// `group_vars/` directory next to the inventory file is merged into the
    /// named groups' vars.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let mut file = path.to_path_buf();
        if file.is_dir() {
            file = ["hosts", "hosts.yml", "hosts.yaml", "inventory"]
                .iter()
                .map(|name| path.join(name))
                .find(|candidate| candidate.is_file())
                .ok_or_else(|| LoadError::NoInventoryFound(path.to_path_buf()))?;
        }

        tracing::info!(path=%file.display(), "loading inventory");
        let contents = std::fs::read_to_string(&file)?;
        let mut inventory = Self::from_yaml_str(&contents)?;

        if path.is_dir() {
            inventory.merge_group_vars_dir(&path.join("group_vars"))?;
        }

        Ok(inventory)
    }

    /// Merge `group_vars/<name>.yml` files into the named groups
    ///
    /// Each file is a plain mapping of variables for the group its stem
    /// names. File entries win over vars declared in the inventory file.
    /// Files naming a group with no inventory membership are skipped.
    fn merge_group_vars_dir(&mut self, dir: &Path) -> Result<(), LoadError> {
        if !dir.is_dir() {
            return Ok(());
        }

        let mut files: Vec<std::path::PathBuf> = Vec::new();
        for dir_entry in std::fs::read_dir(dir)? {
            let dir_entry = dir_entry?;
            if !dir_entry.file_type()?.is_file() {
                continue;
            }
            if dir_entry.file_name().to_string_lossy().starts_with('.') {
                continue;
            }
            files.push(dir_entry.path());
        }
        // directory iteration order is not stable
        files.sort();

        for file in files {
            let Some(stem) = file.file_stem() else {
                continue;
            };
            let name = stem.to_string_lossy().into_owned();
            let Some(group) = self.group_named(&name) else {
                tracing::debug!(group = %name, "group vars file without inventory group");
                continue;
            };

            tracing::info!(path=%file.display(), group = %name, "loading group vars");
            let contents = std::fs::read_to_string(&file)?;
            let vars: serde_yaml::Value = serde_yaml::from_str(&contents)?;
            self.add_group_vars(group, &vars)?;
        }

        Ok(())
    }

    /// Build the graph from a YAML inventory document
    ///
    /// The document is a mapping of group names to group bodies, where a
    /// body may carry `hosts`, `vars` and `children` mappings.
    pub fn from_yaml_str(text: &str) -> Result<Self, LoadError> {
        let document: serde_yaml::Value = serde_yaml::from_str(text)?;
        let serde_yaml::Value::Mapping(root) = document else {
            return Err(LoadError::InvalidStructure {
                group: "<root>".to_string(),
                detail: "expected a mapping of group names",
            });
        };

        let mut inventory = Self::default();
        for (name, body) in &root {
            let Some(name) = name.as_str() else {
                return Err(LoadError::InvalidStructure {
                    group: "<root>".to_string(),
                    detail: "group names must be strings",
                });
            };
            let group = inventory.ensure_group(name);
            inventory.add_group_body(group, body)?;
        }

        Ok(inventory)
    }

    fn add_group_body(&mut self, group: GroupId, body: &serde_yaml::Value) -> Result<(), LoadError> {
        let mapping = match body {
            serde_yaml::Value::Null => return Ok(()),
            serde_yaml::Value::Mapping(mapping) => mapping,
            _ => return Err(self.invalid(group, "group body must be a mapping")),
        };

        for (key, value) in mapping {
            match key.as_str() {
                Some("hosts") => self.add_group_hosts(group, value)?,
                Some("vars") => self.add_group_vars(group, value)?,
                Some("children") => self.add_group_children(group, value)?,
                _ => tracing::debug!(key = ?key, "ignoring unknown inventory key"),
            }
        }

        Ok(())
    }

    fn add_group_hosts(&mut self, group: GroupId, hosts: &serde_yaml::Value) -> Result<(), LoadError> {
        let mapping = match hosts {
            serde_yaml::Value::Null => return Ok(()),
            serde_yaml::Value::Mapping(mapping) => mapping,
            _ => return Err(self.invalid(group, "hosts must be a mapping of host names")),
        };

        for (name, _host_vars) in mapping {
            let Some(name) = name.as_str() else {
                return Err(self.invalid(group, "host names must be strings"));
            };
            let host = self.ensure_host(name);
            self.add_host(group, host);
        }

        Ok(())
    }

    fn add_group_vars(&mut self, group: GroupId, vars: &serde_yaml::Value) -> Result<(), LoadError> {
        let mapping = match vars {
            serde_yaml::Value::Null => return Ok(()),
            serde_yaml::Value::Mapping(mapping) => mapping,
            _ => return Err(self.invalid(group, "vars must be a mapping")),
        };

        for (key, value) in mapping {
            let Some(key) = key.as_str() else {
                return Err(self.invalid(group, "variable names must be strings"));
            };
            self.set_var(group, key, value.clone());
        }

        Ok(())
    }

    fn add_group_children(&mut self, group: GroupId, children: &serde_yaml::Value) -> Result<(), LoadError> {
        let mapping = match children {
            serde_yaml::Value::Null => return Ok(()),
            serde_yaml::Value::Mapping(mapping) => mapping,
            _ => return Err(self.invalid(group, "children must be a mapping of group names")),
        };

        for (name, body) in mapping {
            let Some(name) = name.as_str() else {
                return Err(self.invalid(group, "group names must be strings"));
            };
            let child = self.ensure_group(name);
            self.add_child(group, child);
            self.add_group_body(child, body)?;
        }

        Ok(())
    }

    fn invalid(&self, group: GroupId, detail: &'static str) -> LoadError {
        LoadError::InvalidStructure {
            group: self.group(group).name.clone(),
            detail,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("no inventory file found in {}", .0.display())]
    NoInventoryFound(std::path::PathBuf),
    #[error("unable to read inventory: {0}")]
    Io(#[from] std::io::Error),
    #[error("unable to parse inventory: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("unexpected structure under group '{group}': {detail}")]
    InvalidStructure { group: String, detail: &'static str },
}

/// Utility macro to create [Inventory] fixtures
///
/// ```
/// invlint::inventory! {r#"
/// all:
///   children:
///     web:
///       hosts:
///         app1:
/// "#};
/// ```
///
/// # Panic
/// Panics on invalid input
#[macro_export]
macro_rules! inventory {
    { $yaml:expr } => {
        $crate::inventory::Inventory::from_yaml_str($yaml).expect("inventory must parse")
    };
}
