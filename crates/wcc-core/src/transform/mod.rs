//! Per-component rule transformation: reads a `*.wcc.yaml` spec and turns
//! the imported upstream rules into `:host` and `:root` stylesheets.

pub mod engine;
pub mod request;
pub mod rules;
pub mod template;

pub use engine::{
    build_stylesheet, build_stylesheets, output_paths, transform, BuildReport, BuiltStylesheet,
    ComponentStylesheets,
};
pub use request::{SelectorSource, TransformationRequest, TransformationSpec};
pub use rules::{HardRule, RuleSet};
pub use template::{Segment, SelectorTemplate};
