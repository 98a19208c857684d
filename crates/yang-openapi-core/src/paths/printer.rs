//! Rendering of segment chains into path strings.

use regex::Regex;

use super::segment::PathSegment;
use crate::config::PathStyle;

/// Renders a segment chain as a path string.
///
/// Implementors only decide how one segment looks; the chain walk is
/// shared. `previous_module` is the module of the preceding named segment.
pub trait PathPrinter {
    fn segment(
        &self,
        segment: &PathSegment<'_>,
        previous_module: Option<&str>,
        drop_params: bool,
    ) -> String;

    /// Render the chain ending at `segment`. With `drop_last_params` the
    /// final segment is printed without its keys, which addresses the
    /// enclosing collection of a list.
    fn path(&self, segment: &PathSegment<'_>, drop_last_params: bool) -> String {
        let chain = segment.chain();
        let last = chain.len().saturating_sub(1);
        let mut out = String::new();
        let mut previous: Option<&str> = None;
        for (idx, seg) in chain.iter().enumerate() {
            out.push_str(&self.segment(seg, previous, drop_last_params && idx == last));
            previous = Some(seg.module());
        }
        out
    }
}

fn param_names(segment: &PathSegment<'_>) -> Vec<String> {
    segment
        .params()
        .iter()
        .map(|p| format!("{{{}}}", p.name))
        .collect()
}

/// RFC 8040 style: `module:name={k1},{k2}/`. The module prefix is emitted
/// on the first segment and wherever the module changes.
#[derive(Debug, Default, Clone, Copy)]
pub struct Rfc8040PathPrinter;

impl PathPrinter for Rfc8040PathPrinter {
    fn segment(
        &self,
        segment: &PathSegment<'_>,
        previous_module: Option<&str>,
        drop_params: bool,
    ) -> String {
        let name = segment.name().unwrap_or_default();
        let mut out = if previous_module == Some(segment.module()) {
            name.to_string()
        } else {
            format!("{}:{name}", segment.module())
        };
        if !drop_params && !segment.params().is_empty() {
            out.push('=');
            out.push_str(&param_names(segment).join(","));
        }
        out.push('/');
        out
    }
}

/// OpenDaylight style: `module:name/{k1}/{k2}/`, module on every segment.
#[derive(Debug, Default, Clone, Copy)]
pub struct OdlPathPrinter;

impl PathPrinter for OdlPathPrinter {
    fn segment(
        &self,
        segment: &PathSegment<'_>,
        _previous_module: Option<&str>,
        drop_params: bool,
    ) -> String {
        let mut out = format!("{}:{}/", segment.module(), segment.name().unwrap_or_default());
        if !drop_params {
            for param in param_names(segment) {
                out.push_str(&param);
                out.push('/');
            }
        }
        out
    }
}

pub fn printer_for(style: PathStyle) -> Box<dyn PathPrinter> {
    match style {
        PathStyle::Rfc8040 => Box::new(Rfc8040PathPrinter),
        PathStyle::Odl => Box::new(OdlPathPrinter),
    }
}

/// Extracts `{name}` placeholders from a rendered path.
#[derive(Debug, Clone)]
pub struct PathTemplate {
    placeholder: Regex,
}

impl PathTemplate {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            placeholder: Regex::new(r"\{([^}]+)\}")?,
        })
    }

    /// Placeholder names in order of appearance.
    pub fn keys(&self, path: &str) -> Vec<String> {
        self.placeholder
            .captures_iter(path)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .collect()
    }
}
