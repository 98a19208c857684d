//! Graph-rewriting passes run over the finished document.
//!
//! Passes run in the configured order; each receives the output of the
//! previous one.

mod replace_empty;
mod single_parent;
mod sort_definitions;

pub use replace_empty::ReplaceEmptyWithParent;
pub use single_parent::SingleParentInheritance;
pub use sort_definitions::SortDefinitions;

use crate::config::PostProcessorKind;
use crate::diagnostics::Diagnostic;
use crate::openapi::OpenApi;

/// Result of a single post-processing pass.
#[derive(Debug)]
pub struct PassResult {
    pub api: OpenApi,
    /// Anomalies the pass could not resolve.
    pub diagnostics: Vec<Diagnostic>,
}

impl PassResult {
    pub fn api_only(api: OpenApi) -> Self {
        Self {
            api,
            diagnostics: Vec::new(),
        }
    }

    /// Move the diagnostics into `sink` and return the document for the
    /// next pass.
    pub fn merge_into(self, sink: &mut Vec<Diagnostic>) -> OpenApi {
        sink.extend(self.diagnostics);
        self.api
    }
}

pub trait PostProcessor {
    fn name(&self) -> &'static str;

    fn process(&self, api: OpenApi) -> PassResult;
}

pub fn processor_for(kind: PostProcessorKind) -> Box<dyn PostProcessor> {
    match kind {
        PostProcessorKind::ReplaceEmptyWithParent => Box::new(ReplaceEmptyWithParent),
        PostProcessorKind::SortDefinitions => Box::new(SortDefinitions),
        PostProcessorKind::SingleParentInheritance => Box::new(SingleParentInheritance),
    }
}

/// Run the configured passes in order.
pub fn run_chain(
    mut api: OpenApi,
    kinds: &[PostProcessorKind],
    diagnostics: &mut Vec<Diagnostic>,
) -> OpenApi {
    for &kind in kinds {
        let processor = processor_for(kind);
        tracing::debug!(processor = processor.name(), "running post-processor");
        api = processor.process(api).merge_into(diagnostics);
    }
    api
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::openapi::Schema;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_chain_runs_in_order() {
        let api = api_with(vec![
            ("m.A", object(&["x"])),
            ("m.Wrapper", Schema::all_of(vec![Schema::reference("m.A")])),
            (
                "m.Node",
                Schema::all_of(vec![
                    object(&["own"]),
                    Schema::reference("m.Wrapper"),
                ]),
            ),
        ]);

        let mut diagnostics = Vec::new();
        let api = run_chain(
            api,
            &[
                PostProcessorKind::ReplaceEmptyWithParent,
                PostProcessorKind::SortDefinitions,
            ],
            &mut diagnostics,
        );

        let node = &api.components.schemas["m.Node"];
        assert_eq!(node.members().unwrap()[0].ref_name(), Some("m.A"));
        assert!(!api.components.schemas.contains_key("m.Wrapper"));
        assert!(diagnostics.is_empty());
    }
}
