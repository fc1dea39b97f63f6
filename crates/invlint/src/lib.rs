//! # invlint - pre-flight inventory linting
//!
//! For CLI usage see the `invlint` binary (`invlint check --help`).
//!
//! ## Introduction for developers
//!
//! Read this to understand how `invlint` works internally.
//!
//! ### Inventory terms
//!
//! Quick introduction to terms used to describe elements of an inventory.
//!
//! In inventory terms...
//! - a `host` is a named target system
//! - a `group` is a named collection of hosts
//! - groups carry `vars`, a key/value mapping of configuration variables
//! - groups can contain other groups, forming an acyclic parent/child graph
//! - a host in a child group is also a member of every ancestor group
//!
//! This is a valid YAML inventory:
//! ```yaml
//! all:
//!   children:
//!     web:
//!       hosts:
//!         app1:
//!         app2:
//!       vars:
//!         region: eu-west-1
//!     db:
//!       hosts:
//!         app1:
//! ```
//!
//! ### Loading
//!
//! [inventory::Inventory] stores all groups and hosts in flat tables and
//! refers to them by index ([inventory::GroupId], [inventory::HostId]).
//! Parent/child/host relations are index sets, so the richly connected graph
//! has no ownership cycles. When pointed at a directory the loader probes the
//! conventional file names (`hosts`, `hosts.yml`, `hosts.yaml`, `inventory`).
//!
//! ### Resolution
//!
//! see [resolve::ResolutionContext]
//!
//! A group restating a variable it would inherit anyway carries no signal, so
//! before comparing groups we reduce each group's vars to the entries that
//! genuinely originate or diverge at that group. The reduction is memoized
//! per group for the lifetime of one [resolve::ResolutionContext].
//!
//! ### Checks
//!
//! - [conflicts] flags variables defined by two groups that share hosts
//! - [indent] enforces monotonic two-space indentation steps
//! - [dupkeys] reports keys that recur within a document
//!
//! [candidate::classify] decides which checks apply to a given file path.
//!
//! ### Output
//!
//! Every check produces a [report::Report], rendered as one line per error:
//! `path:line: [rule] message <original line text>` (the line number is
//! omitted for document-level errors). A run succeeds when no report carries
//! any error.
pub mod candidate;
pub mod conflicts;
pub mod dupkeys;
pub mod indent;
pub mod inventory;
pub mod report;
pub mod resolve;
