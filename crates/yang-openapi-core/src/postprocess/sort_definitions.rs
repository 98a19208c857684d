//! Deterministic all-of member order.

use super::{PassResult, PostProcessor};
use crate::openapi::{OpenApi, SchemaKind};

/// In every all-of, reference members come first ordered by target name;
/// other members follow in their original order.
#[derive(Debug, Default, Clone, Copy)]
pub struct SortDefinitions;

impl PostProcessor for SortDefinitions {
    fn name(&self) -> &'static str {
        "sort-definitions"
    }

    fn process(&self, mut api: OpenApi) -> PassResult {
        for schema in api.components.schemas.values_mut() {
            if let SchemaKind::AllOf(members) = &mut schema.kind {
                // Stable sort keeps non-reference members in place
                // relative to each other.
                members.sort_by(|a, b| match (a.ref_name(), b.ref_name()) {
                    (Some(x), Some(y)) => x.cmp(y),
                    (Some(_), None) => std::cmp::Ordering::Less,
                    (None, Some(_)) => std::cmp::Ordering::Greater,
                    (None, None) => std::cmp::Ordering::Equal,
                });
            }
        }
        PassResult::api_only(api)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::openapi::Schema;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_references_first_sorted() {
        let api = api_with(vec![(
            "m.Node",
            Schema::all_of(vec![
                object(&["first"]),
                Schema::reference("m.Z"),
                object(&["second"]),
                Schema::reference("m.B"),
            ]),
        )]);

        let api = SortDefinitions.process(api).api;
        let members = api.components.schemas["m.Node"].members().unwrap();

        assert_eq!(members[0].ref_name(), Some("m.B"));
        assert_eq!(members[1].ref_name(), Some("m.Z"));
        assert!(members[2].properties().unwrap().contains_key("first"));
        assert!(members[3].properties().unwrap().contains_key("second"));
    }
}
