//! Multiple-inheritance elimination over grouping references.
//!
//! Every referenced schema gets an *inheritance id set*: one string per path
//! through its all-of chain, each segment delimited as `<name>`. A grouping
//! `B` that composes grouping `A` has the id `<B><A>`, which textually
//! contains `A`'s id `<A>`. A reference whose ids are all contained in
//! another reference's ids adds nothing and is dropped; the most specific
//! reference wins.

use std::collections::{BTreeSet, HashMap};

use indexmap::IndexMap;

use crate::openapi::{Schema, SchemaKind};

/// Bound on all-of chain length when computing ids.
const MAX_CHAIN: usize = 64;

/// Inheritance id set of the schema registered under `name`.
pub fn inheritance_ids(name: &str, schemas: &IndexMap<String, Schema>) -> BTreeSet<String> {
    ids(name, schemas, 0)
}

fn ids(name: &str, schemas: &IndexMap<String, Schema>, depth: usize) -> BTreeSet<String> {
    let own = format!("<{name}>");
    if depth >= MAX_CHAIN {
        return BTreeSet::from([own]);
    }

    let prefixed = |target: &str| -> Vec<String> {
        ids(target, schemas, depth + 1)
            .into_iter()
            .map(|id| format!("{own}{id}"))
            .collect()
    };

    let result: BTreeSet<String> = match schemas.get(name).map(|s| &s.kind) {
        Some(SchemaKind::AllOf(members)) => members
            .iter()
            .filter_map(Schema::ref_name)
            .flat_map(prefixed)
            .collect(),
        Some(SchemaKind::Ref(target)) => prefixed(target).into_iter().collect(),
        _ => BTreeSet::new(),
    };

    if result.is_empty() {
        BTreeSet::from([own])
    } else {
        result
    }
}

/// Whether `mine` covers `yours`: every id of `yours` is contained in at
/// least one id of `mine`.
pub fn more_specific(mine: &BTreeSet<String>, yours: &BTreeSet<String>) -> bool {
    yours
        .iter()
        .all(|y| mine.iter().any(|m| m.contains(y.as_str())))
}

/// Drop duplicate references and references covered by a more specific one.
///
/// Order of the survivors follows their first occurrence in `refs`.
pub fn optimize(refs: &[String], schemas: &IndexMap<String, Schema>) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(refs.len());
    for r in refs {
        if unique.contains(r) {
            tracing::debug!(name = %r, "duplicated models");
        } else {
            unique.push(r.clone());
        }
    }
    if unique.len() < 2 {
        return unique;
    }

    let id_sets: HashMap<&str, BTreeSet<String>> = unique
        .iter()
        .map(|r| (r.as_str(), inheritance_ids(r, schemas)))
        .collect();

    let survivors: Vec<String> = unique
        .iter()
        .filter(|r| {
            let mine = &id_sets[r.as_str()];
            let covered = id_sets
                .iter()
                .any(|(other, theirs)| *other != r.as_str() && more_specific(theirs, mine));
            if covered {
                tracing::debug!(name = %r, "more specific models found");
            }
            !covered
        })
        .cloned()
        .collect();

    if survivors.len() != unique.len() {
        tracing::debug!(from = unique.len(), to = survivors.len(), "optimization succeeded");
    }
    survivors
}
