//! Math rendering for the preview.
//!
//! Inline (`$…$`) and block (`$$…$$`) math nodes are routed through a
//! [`RenderRules`] table to the LaTeX adapters, which produce [`MathView`]s.

pub mod adapters;
pub mod rules;

pub use adapters::{
    render_latex_block, render_latex_inline, MathPlacement, MathView, PlainTypesetter, Typesetter,
};
pub use rules::{MathAdapter, RenderRules, RuleKey};
