//! sibling group variable conflict detection
//!
//! Two groups that share at least one host and both locally define the same
//! variable silently compete: whichever gets merged last wins at apply time.
//! This check flags every such (group, sibling, variable) triple ahead of
//! deployment. "Locally define" is judged after inheritance filtering, see
//! [crate::resolve].
use crate::inventory::{GroupId, Inventory, LoadError};
use crate::report::{rule, Error, Report};
use crate::resolve::ResolutionContext;
use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};

/// Find variables that `group_name` defines in competition with a sibling
///
/// Siblings are the groups connected to the group through a shared host or a
/// shared parent/child edge. Siblings and variables are visited in sorted
/// order so output is stable for a given inventory.
///
/// A group name with no inventory membership yields no errors.
pub fn find_conflicts(
    inventory: &Inventory,
    ctx: &mut ResolutionContext,
    group_name: &str,
) -> Vec<Error> {
    let Some(group) = inventory.group_named(group_name) else {
        // vars file exists but no related group in the inventory
        tracing::debug!(group = group_name, "group not present in inventory");
        return Vec::new();
    };

    let group_vars: BTreeSet<String> = ctx.resolve(inventory, group).keys().cloned().collect();
    let group_hosts = inventory.hosts_of(group);

    let mut siblings: BTreeSet<GroupId> = BTreeSet::new();
    for host in &group_hosts {
        siblings.extend(inventory.groups_of_host(*host));
    }
    for child in &inventory.group(group).child_groups {
        siblings.extend(inventory.group(*child).parent_groups.iter().copied());
    }
    for parent in &inventory.group(group).parent_groups {
        siblings.extend(inventory.group(*parent).child_groups.iter().copied());
    }
    siblings.remove(&group);

    let mut siblings: Vec<GroupId> = siblings.into_iter().collect();
    siblings.sort_by(|a, b| inventory.group(*a).name.cmp(&inventory.group(*b).name));

    let mut errors = Vec::new();
    for sibling in siblings {
        let sibling_vars: BTreeSet<String> =
            ctx.resolve(inventory, sibling).keys().cloned().collect();

        let common_vars: Vec<&String> = group_vars.intersection(&sibling_vars).collect();
        let mut common_hosts: Vec<&str> = group_hosts
            .intersection(&inventory.hosts_of(sibling))
            .map(|host| inventory.host(*host).name.as_str())
            .collect();
        common_hosts.sort_unstable();

        if common_vars.is_empty() || common_hosts.is_empty() {
            continue;
        }

        for var in common_vars {
            errors.push(Error::new(
                None,
                format!(
                    "Sibling groups {} and {} with common hosts {} both define variable {}",
                    inventory.group(group).name,
                    inventory.group(sibling).name,
                    common_hosts.join(", "),
                    var
                ),
            ));
        }
    }

    errors
}

/// Review a group vars file for variables competing across sibling groups
///
/// The owning group name and the inventory root are both encoded in the
/// path: the root is everything before the `group_vars` component (the work
/// directory when `group_vars` comes first), the group name is the file stem
/// below it. A broken inventory becomes a single document-level error.
pub fn review(path: &Path) -> Report {
    let report = Report::empty(path.display().to_string(), rule::GROUP_VARS);

    let Some((inventory_root, group_name)) = split_group_vars_path(path) else {
        tracing::debug!(path=%path.display(), "not a group_vars path");
        return report;
    };

    let inventory = match Inventory::load(&inventory_root) {
        Ok(inventory) => inventory,
        Err(error) => return broken_inventory(report, error),
    };

    let mut ctx = ResolutionContext::default();
    let errors = find_conflicts(&inventory, &mut ctx, &group_name);
    Report::new(report.path, rule::GROUP_VARS, errors)
}

fn broken_inventory(report: Report, error: LoadError) -> Report {
    Report::new(
        report.path,
        rule::GROUP_VARS,
        vec![Error::new(None, format!("Inventory is broken: {error}"))],
    )
}

/// Split a group vars path into (inventory root, group name)
///
/// `inventories/staging/group_vars/web.yml` -> (`inventories/staging`, `web`)
fn split_group_vars_path(path: &Path) -> Option<(PathBuf, String)> {
    let components: Vec<Component> = path.components().collect();
    let position = components
        .iter()
        .position(|component| component.as_os_str() == "group_vars")?;

    let group_file = components.get(position + 1)?;
    let group_name = Path::new(group_file.as_os_str())
        .file_stem()?
        .to_string_lossy()
        .into_owned();

    let inventory_root = if position == 0 {
        PathBuf::from(".")
    } else {
        components[..position]
            .iter()
            .map(|component| component.as_os_str())
            .collect()
    };

    Some((inventory_root, group_name))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::inventory;
    use pretty_assertions::assert_eq;

    fn messages(errors: &[Error]) -> Vec<&str> {
        errors.iter().map(|e| e.message.as_str()).collect()
    }

    #[test]
    fn competing_definition_over_shared_host() {
        let inv = inventory! {r#"
all:
  children:
    web:
      hosts:
        app1:
        app2:
      vars:
        region: eu-west-1
    db:
      hosts:
        app1:
      vars:
        region: us-east-1
"#};
        let mut ctx = ResolutionContext::default();

        let errors = find_conflicts(&inv, &mut ctx, "web");
        assert_eq!(
            messages(&errors),
            ["Sibling groups web and db with common hosts app1 both define variable region"]
        );
        assert!(errors[0].line.is_none());
    }

    #[test]
    fn disjoint_hosts_do_not_conflict() {
        let inv = inventory! {r#"
all:
  children:
    web:
      hosts:
        app1:
      vars:
        region: eu-west-1
    db:
      hosts:
        db1:
      vars:
        region: us-east-1
"#};
        let mut ctx = ResolutionContext::default();

        assert_eq!(find_conflicts(&inv, &mut ctx, "web"), Vec::new());
    }

    #[test]
    fn pure_inheritance_does_not_conflict() {
        // both groups restate what they inherit from `all`
        let inv = inventory! {r#"
all:
  vars:
    region: eu
  children:
    web:
      hosts:
        app1:
      vars:
        region: eu
    db:
      hosts:
        app1:
      vars:
        region: eu
"#};
        let mut ctx = ResolutionContext::default();

        assert_eq!(find_conflicts(&inv, &mut ctx, "web"), Vec::new());
    }

    #[test]
    fn several_common_hosts_are_listed_sorted() {
        let inv = inventory! {r#"
all:
  children:
    web:
      hosts:
        beta:
        alpha:
      vars:
        port: 80
    db:
      hosts:
        beta:
        alpha:
      vars:
        port: 5432
"#};
        let mut ctx = ResolutionContext::default();

        let errors = find_conflicts(&inv, &mut ctx, "web");
        assert_eq!(
            messages(&errors),
            ["Sibling groups web and db with common hosts alpha, beta both define variable port"]
        );
    }

    #[test]
    fn unknown_group_yields_no_errors() {
        let inv = inventory! {"all:"};
        let mut ctx = ResolutionContext::default();

        assert_eq!(find_conflicts(&inv, &mut ctx, "ghost"), Vec::new());
    }

    #[test]
    fn split_paths() {
        let (root, group) =
            split_group_vars_path(Path::new("inventories/staging/group_vars/web.yml")).unwrap();
        assert_eq!(root, PathBuf::from("inventories/staging"));
        assert_eq!(group, "web");

        let (root, group) = split_group_vars_path(Path::new("group_vars/db.yml")).unwrap();
        assert_eq!(root, PathBuf::from("."));
        assert_eq!(group, "db");

        assert!(split_group_vars_path(Path::new("roles/x/tasks/main.yml")).is_none());
    }
}
