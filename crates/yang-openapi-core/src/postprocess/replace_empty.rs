//! Replace trivial single-reference wrappers with their target.

use std::collections::HashMap;

use super::{PassResult, PostProcessor};
use crate::openapi::{OpenApi, Operation, SchemaKind};

/// Bound on wrapper-to-wrapper chains followed when resolving a target.
const MAX_CHAIN: usize = 64;

/// Removes every schema that is an all-of of exactly one reference and
/// points all references to it at the referenced schema instead.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReplaceEmptyWithParent;

fn direct_replacements(api: &OpenApi) -> HashMap<String, String> {
    api.components
        .schemas
        .iter()
        .filter_map(|(name, schema)| match &schema.kind {
            SchemaKind::AllOf(members) if members.len() == 1 => members[0]
                .ref_name()
                .map(|target| (name.clone(), target.to_string())),
            _ => None,
        })
        .collect()
}

/// Follow wrapper chains so every replacement points at a kept schema.
fn resolve(direct: &HashMap<String, String>) -> HashMap<String, String> {
    direct
        .iter()
        .map(|(from, to)| {
            let mut target = to;
            for _ in 0..MAX_CHAIN {
                match direct.get(target) {
                    Some(next) if next != from => target = next,
                    _ => break,
                }
            }
            (from.clone(), target.clone())
        })
        .collect()
}

/// Replace words of `text` that name a replaced schema.
fn fix_text(text: &mut String, replacements: &HashMap<String, String>) {
    if !text.split(' ').any(|w| replacements.contains_key(w)) {
        return;
    }
    tracing::debug!(description = %text, "fixing description");
    *text = text
        .split(' ')
        .map(|w| replacements.get(w).map(String::as_str).unwrap_or(w))
        .collect::<Vec<_>>()
        .join(" ");
}

fn fix_operation(op: &mut Operation, replacements: &HashMap<String, String>) {
    fix_text(&mut op.description, replacements);
    if let Some(body) = &mut op.request_body {
        if let Some(description) = &mut body.description {
            fix_text(description, replacements);
        }
    }
    for response in op.responses.values_mut() {
        fix_text(&mut response.description, replacements);
    }
}

impl PostProcessor for ReplaceEmptyWithParent {
    fn name(&self) -> &'static str {
        "replace-empty-with-parent"
    }

    fn process(&self, mut api: OpenApi) -> PassResult {
        let replacements = resolve(&direct_replacements(&api));
        if replacements.is_empty() {
            return PassResult::api_only(api);
        }
        tracing::debug!(count = replacements.len(), "replacements found for definitions");

        let mut rewrite = |name: &mut String| {
            if let Some(target) = replacements.get(name.as_str()) {
                *name = target.clone();
            }
        };

        api.visit_operation_schemas_mut(&mut |schema| schema.visit_refs_mut(&mut rewrite));
        for item in api.paths.values_mut() {
            for op in item.operations_mut() {
                fix_operation(op, &replacements);
            }
        }

        for name in replacements.keys() {
            tracing::debug!(name = %name, "removing model from definitions");
            api.components.schemas.shift_remove(name);
        }
        for schema in api.components.schemas.values_mut() {
            schema.visit_refs_mut(&mut rewrite);
        }

        PassResult::api_only(api)
    }
}
