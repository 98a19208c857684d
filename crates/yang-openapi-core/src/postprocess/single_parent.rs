//! Flatten multiple inheritance down to one parent.

use indexmap::IndexMap;

use super::{PassResult, PostProcessor};
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::openapi::{OpenApi, Schema, SchemaKind};

/// Every all-of with more than one reference keeps its first reference as
/// the parent. Properties of the other referenced objects are copied into
/// the inline object member. References to anything other than a plain
/// object stay and are reported.
#[derive(Debug, Default, Clone, Copy)]
pub struct SingleParentInheritance;

impl SingleParentInheritance {
    const NAME: &'static str = "single-parent-inheritance";
}

/// What to do with one composed schema: references to unpack together
/// with the properties they contribute, and references that must stay.
struct Plan {
    unpack: Vec<(String, IndexMap<String, Schema>)>,
    kept: Vec<String>,
}

fn plan(api: &OpenApi, members: &[Schema]) -> Option<Plan> {
    let refs: Vec<&str> = members.iter().filter_map(Schema::ref_name).collect();
    if refs.len() < 2 {
        return None;
    }
    let mut plan = Plan {
        unpack: Vec::new(),
        kept: Vec::new(),
    };
    for &r in &refs[1..] {
        match api.components.schemas.get(r).and_then(Schema::properties) {
            Some(props) => plan.unpack.push((r.to_string(), props.clone())),
            None => plan.kept.push(r.to_string()),
        }
    }
    Some(plan)
}

impl PostProcessor for SingleParentInheritance {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn process(&self, mut api: OpenApi) -> PassResult {
        let plans: Vec<(String, Plan)> = api
            .components
            .schemas
            .iter()
            .filter_map(|(name, schema)| {
                let members = schema.members()?;
                plan(&api, members).map(|p| (name.clone(), p))
            })
            .collect();

        let mut diagnostics = Vec::new();
        for (name, plan) in plans {
            let Some(SchemaKind::AllOf(members)) =
                api.components.schemas.get_mut(&name).map(|s| &mut s.kind)
            else {
                continue;
            };

            if !plan.unpack.is_empty() {
                let unpacked: Vec<&str> = plan.unpack.iter().map(|(r, _)| r.as_str()).collect();
                members.retain(|m| m.ref_name().map_or(true, |r| !unpacked.contains(&r)));

                let inline = match members.iter().position(|m| m.properties().is_some()) {
                    Some(pos) => pos,
                    None => {
                        tracing::debug!(name = %name, "adding inline model for unpacked values");
                        members.push(Schema::object(IndexMap::new()));
                        members.len() - 1
                    }
                };
                if let Some(props) = members[inline].properties_mut() {
                    for (_, source) in &plan.unpack {
                        for (key, value) in source {
                            props.entry(key.clone()).or_insert_with(|| value.clone());
                        }
                    }
                }
                tracing::debug!(name = %name, count = plan.unpack.len(), "unpacked models");
            }

            if !plan.kept.is_empty() {
                tracing::warn!(name = %name, references = ?plan.kept, "cannot unpack references, only simple models supported");
                diagnostics.push(Diagnostic::new(
                    DiagnosticKind::PostProcessing {
                        processor: Self::NAME.to_string(),
                    },
                    name.clone(),
                    format!("references {} kept", plan.kept.join(", ")),
                ));
            }
        }

        PassResult { api, diagnostics }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_second_parent_is_unpacked() {
        let api = api_with(vec![
            ("m.A", object(&["a"])),
            ("m.B", object(&["b"])),
            (
                "m.Node",
                Schema::all_of(vec![
                    Schema::reference("m.A"),
                    Schema::reference("m.B"),
                    object(&["own"]),
                ]),
            ),
        ]);

        let result = SingleParentInheritance.process(api);
        assert!(result.diagnostics.is_empty());

        let members = result.api.components.schemas["m.Node"].members().unwrap().to_vec();
        assert_eq!(members.len(), 2);
        assert_eq!(members[0].ref_name(), Some("m.A"));
        let keys: Vec<_> = members[1].properties().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["own", "b"]);
    }

    #[test]
    fn test_inline_object_created_when_absent() {
        let api = api_with(vec![
            ("m.A", object(&["a"])),
            ("m.B", object(&["b"])),
            (
                "m.Node",
                Schema::all_of(vec![Schema::reference("m.A"), Schema::reference("m.B")]),
            ),
        ]);

        let api = SingleParentInheritance.process(api).api;
        let members = api.components.schemas["m.Node"].members().unwrap();
        assert_eq!(members.len(), 2);
        assert!(members[1].properties().unwrap().contains_key("b"));
    }

    #[test]
    fn test_composed_target_is_kept_and_reported() {
        let api = api_with(vec![
            ("m.A", object(&["a"])),
            ("m.C", Schema::all_of(vec![Schema::reference("m.A"), object(&["c"])])),
            (
                "m.Node",
                Schema::all_of(vec![Schema::reference("m.A"), Schema::reference("m.C")]),
            ),
        ]);

        let result = SingleParentInheritance.process(api);
        assert_eq!(result.diagnostics.len(), 1);
        let members = result.api.components.schemas["m.Node"].members().unwrap();
        assert!(members.iter().any(|m| m.ref_name() == Some("m.C")));
    }
}
