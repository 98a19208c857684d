//! Registers path items for containers, lists and RPCs of one module.

use indexmap::IndexMap;

use super::operations::{ModelRef, OperationFactory};
use super::printer::{printer_for, PathPrinter, PathTemplate};
use super::segment::{KeyParam, PathSegment};
use super::tags::{generators_for, TagGenerator};
use crate::config::GenerateOptions;
use crate::error::GenerateError;
use crate::openapi::{Operation, Parameter, PathItem};

/// Renders paths under the root of each segment's kind (`/data/` or
/// `/operations/`).
pub struct PathHandler<'a> {
    module: String,
    printer: Box<dyn PathPrinter>,
    taggers: Vec<Box<dyn TagGenerator>>,
    factory: OperationFactory<'a>,
    template: PathTemplate,
    full_crud: bool,
}

fn parameters(params: &[&KeyParam]) -> Vec<Parameter> {
    params.iter().map(|p| p.to_parameter()).collect()
}

impl<'a> PathHandler<'a> {
    pub fn new(module: impl Into<String>, options: &'a GenerateOptions) -> Result<Self, GenerateError> {
        Ok(Self {
            module: module.into(),
            printer: printer_for(options.path_style),
            taggers: generators_for(&options.tags),
            factory: OperationFactory::new(&options.media_types),
            template: PathTemplate::new()?,
            full_crud: options.full_crud,
        })
    }

    /// Sorted union of every tag generator's output, then the module name.
    fn tags(&self, segment: &PathSegment<'_>) -> Vec<String> {
        let mut tags: Vec<String> = self.taggers.iter().flat_map(|t| t.tags(segment)).collect();
        tags.sort();
        tags.dedup();
        tags.push(self.module.clone());
        tags
    }

    fn render(&self, segment: &PathSegment<'_>, collection: bool) -> String {
        let prefix = segment.kind().prefix();
        let path = format!("{prefix}{}", self.printer.path(segment, collection));
        let params = if collection {
            segment.list_params()
        } else {
            segment.path_params()
        };
        let expected: Vec<&str> = params.iter().map(|p| p.name.as_str()).collect();
        if self.template.keys(&path) != expected {
            tracing::warn!(path = %path, ?expected, "path placeholders do not match parameters");
        }
        path
    }

    fn insert(paths: &mut IndexMap<String, PathItem>, path: String, item: PathItem) {
        if paths.insert(path.clone(), item).is_some() {
            tracing::debug!(path = %path, "path replaced");
        }
    }

    fn tagged(&self, mut op: Operation, tags: &[String]) -> Operation {
        op.tags = tags.to_vec();
        op
    }

    fn item(&self, segment: &PathSegment<'_>, model: &str) -> PathItem {
        let tags = self.tags(segment);
        let params = segment.path_params();
        let mut item = PathItem {
            get: Some(self.tagged(self.factory.get(model, parameters(&params)), &tags)),
            ..PathItem::default()
        };
        if self.full_crud && !segment.is_read_only() {
            item.put = Some(self.tagged(self.factory.replace(model, parameters(&params)), &tags));
            item.post = Some(self.tagged(self.factory.create(model, parameters(&params)), &tags));
            item.delete = Some(self.tagged(self.factory.delete(model, parameters(&params)), &tags));
        }
        item
    }

    pub fn container(&self, paths: &mut IndexMap<String, PathItem>, segment: &PathSegment<'_>, model: &str) {
        let path = self.render(segment, false);
        tracing::debug!(path = %path, model, "container path");
        Self::insert(paths, path, self.item(segment, model));
    }

    /// Registers the entry path and, for writable lists, a create-only
    /// path on the enclosing collection.
    pub fn list(&self, paths: &mut IndexMap<String, PathItem>, segment: &PathSegment<'_>, model: &str) {
        let path = self.render(segment, false);
        tracing::debug!(path = %path, model, "list path");
        Self::insert(paths, path, self.item(segment, model));

        if !self.full_crud || segment.is_read_only() {
            return;
        }
        let tags = self.tags(segment);
        let collection = PathItem {
            post: Some(self.tagged(
                self.factory.create(model, parameters(&segment.list_params())),
                &tags,
            )),
            ..PathItem::default()
        };
        let path = self.render(segment, true);
        Self::insert(paths, path, collection);
    }

    pub fn rpc(
        &self,
        paths: &mut IndexMap<String, PathItem>,
        segment: &PathSegment<'_>,
        input: Option<ModelRef<'_>>,
        output: Option<ModelRef<'_>>,
    ) {
        let path = self.render(segment, false);
        let rpc = segment.name().unwrap_or_default();
        let mut op = self
            .factory
            .invoke(rpc, input, output, parameters(&segment.path_params()));
        op.tags = vec![self.module.clone()];
        tracing::debug!(path = %path, "rpc path");
        Self::insert(
            paths,
            path,
            PathItem {
                post: Some(op),
                ..PathItem::default()
            },
        );
    }
}
