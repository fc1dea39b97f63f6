//! inheritance-aware variable resolution
//!
//! Reduces a group's vars to the entries that are locally meaningful:
//! - a variable restating an ancestor's value verbatim is pure inheritance
//!   and is dropped from the group
//! - a variable overriding an ancestor's value stays with the group, and the
//!   ancestor's entry is dropped from the cache so the override is recorded
//!   exactly once, at the lowest group that performs it
use crate::inventory::{GroupId, Inventory};
use indexmap::IndexMap;
use std::collections::HashMap;

/// A group's variables after inheritance filtering
pub type ResolvedVars = IndexMap<String, serde_yaml::Value>;

/// Memoized resolution state for one analysis run
///
/// Construct fresh per run. Entries are only ever added, or have single keys
/// removed by the override step; a cached entry is never wholesale replaced,
/// so two lookups for the same group observe the same entry.
#[derive(Default, Debug)]
pub struct ResolutionContext {
    cache: HashMap<GroupId, ResolvedVars>,
}

impl ResolutionContext {
    /// Resolve `group` against all of its ancestors
    ///
    /// Deterministic and idempotent; memoized by group identity.
    pub fn resolve(&mut self, inventory: &Inventory, group: GroupId) -> &ResolvedVars {
        self.ensure_resolved(inventory, group);
        &self.cache[&group]
    }

    fn ensure_resolved(&mut self, inventory: &Inventory, group: GroupId) {
        if self.cache.contains_key(&group) {
            return;
        }

        let mut working = inventory.group(group).vars.clone();

        // every ancestor, not just immediate parents
        for ancestor in inventory.ancestors(group) {
            self.ensure_resolved(inventory, ancestor);
            let ancestor_vars = self.cache.get_mut(&ancestor).unwrap();

            let common: Vec<String> = working
                .keys()
                .filter(|key| ancestor_vars.contains_key(key.as_str()))
                .cloned()
                .collect();

            for key in common {
                if ancestor_vars[&key] == working[&key] {
                    // inherited verbatim, contributes no new information
                    working.shift_remove(&key);
                    tracing::trace!(
                        group = %inventory.group(group).name,
                        key = %key,
                        "dropping inherited variable"
                    );
                } else {
                    // overridden here; the ancestor's definition no longer
                    // reads as locally meaningful for the ancestor
                    ancestor_vars.shift_remove(&key);
                    tracing::trace!(
                        ancestor = %inventory.group(ancestor).name,
                        key = %key,
                        "dropping overridden ancestor variable"
                    );
                }
            }
        }

        self.cache.insert(group, working);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::inventory;
    use pretty_assertions::assert_eq;

    fn keys(vars: &ResolvedVars) -> Vec<&str> {
        vars.keys().map(String::as_str).collect()
    }

    #[test]
    fn pure_inheritance_is_filtered() {
        let inv = inventory! {r#"
parent:
  vars:
    region: eu
  children:
    child:
      vars:
        region: eu
"#};
        let mut ctx = ResolutionContext::default();

        let child = inv.group_named("child").unwrap();
        assert_eq!(keys(ctx.resolve(&inv, child)), Vec::<&str>::new());

        // the parent keeps its definition
        let parent = inv.group_named("parent").unwrap();
        assert_eq!(keys(ctx.resolve(&inv, parent)), ["region"]);
    }

    #[test]
    fn override_is_attributed_to_the_lowest_group() {
        let inv = inventory! {r#"
parent:
  vars:
    region: a
  children:
    child:
      vars:
        region: b
"#};
        let mut ctx = ResolutionContext::default();

        let child = inv.group_named("child").unwrap();
        let parent = inv.group_named("parent").unwrap();

        assert_eq!(keys(ctx.resolve(&inv, child)), ["region"]);
        // the ancestor's entry was removed when the override was found
        assert_eq!(keys(ctx.resolve(&inv, parent)), Vec::<&str>::new());
    }

    #[test]
    fn grandparent_inheritance_is_filtered_too() {
        let inv = inventory! {r#"
top:
  vars:
    zone: z1
  children:
    middle:
      children:
        bottom:
          vars:
            zone: z1
            own: yes
"#};
        let mut ctx = ResolutionContext::default();

        let bottom = inv.group_named("bottom").unwrap();
        assert_eq!(keys(ctx.resolve(&inv, bottom)), ["own"]);
    }

    #[test]
    fn resolution_is_idempotent() {
        let inv = inventory! {r#"
parent:
  vars:
    region: a
  children:
    child:
      vars:
        region: b
        extra: 1
"#};
        let mut ctx = ResolutionContext::default();
        let child = inv.group_named("child").unwrap();

        let first = ctx.resolve(&inv, child).clone();
        let second = ctx.resolve(&inv, child).clone();
        assert_eq!(first, second);
        assert_eq!(keys(&first), ["region", "extra"]);
    }

    #[test]
    fn unrelated_groups_keep_their_vars() {
        let inv = inventory! {r#"
web:
  vars:
    region: eu
db:
  vars:
    region: us
"#};
        let mut ctx = ResolutionContext::default();

        let web = inv.group_named("web").unwrap();
        let db = inv.group_named("db").unwrap();

        assert_eq!(keys(ctx.resolve(&inv, web)), ["region"]);
        assert_eq!(keys(ctx.resolve(&inv, db)), ["region"]);
    }
}
