//! Render-rule table for math nodes.
//!
//! The preview asks the table first for every node. Math nodes are handed
//! to the adapter registered under their key with the node's raw content;
//! everything else comes back as `None` and takes the default path.

use crate::markdown::{MarkdownNode, MarkdownNodeType};
use crate::math::adapters::{render_latex_block, render_latex_inline, MathView};

/// A render adapter: raw math content in, visual node out.
pub type MathAdapter = fn(&str) -> MathView;

/// The node kinds the table overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKey {
    MathInline,
    MathBlock,
}

impl RuleKey {
    /// Every key, in table order.
    pub const ALL: [RuleKey; 2] = [RuleKey::MathInline, RuleKey::MathBlock];

    /// The node kind name used by markdown renderers.
    pub fn as_str(self) -> &'static str {
        match self {
            RuleKey::MathInline => "math_inline",
            RuleKey::MathBlock => "math_block",
        }
    }

    /// The key for a node type, if the table covers it.
    pub fn for_node(node_type: &MarkdownNodeType) -> Option<RuleKey> {
        match node_type {
            MarkdownNodeType::Math { display: false, .. } => Some(RuleKey::MathInline),
            MarkdownNodeType::Math { display: true, .. } => Some(RuleKey::MathBlock),
            _ => None,
        }
    }
}

/// Fixed two-entry table from math node kind to adapter.
#[derive(Debug, Clone, Copy)]
pub struct RenderRules {
    inline: MathAdapter,
    block: MathAdapter,
}

impl Default for RenderRules {
    fn default() -> Self {
        Self::math()
    }
}

impl RenderRules {
    /// The standard table wired to the LaTeX adapters.
    pub fn math() -> Self {
        Self::with_adapters(render_latex_inline, render_latex_block)
    }

    /// Same keys, different functions behind them.
    pub fn with_adapters(inline: MathAdapter, block: MathAdapter) -> Self {
        Self { inline, block }
    }

    /// The adapter registered under `key`.
    pub fn adapter(&self, key: RuleKey) -> MathAdapter {
        match key {
            RuleKey::MathInline => self.inline,
            RuleKey::MathBlock => self.block,
        }
    }

    /// Render `node` through the table, or `None` if no rule covers it.
    pub fn dispatch(&self, node: &MarkdownNode) -> Option<MathView> {
        let key = RuleKey::for_node(&node.node_type)?;
        match &node.node_type {
            MarkdownNodeType::Math { literal, .. } => Some(self.adapter(key)(literal)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::MarkdownProfile;
    use crate::math::adapters::MathPlacement;
    use std::cell::RefCell;

    thread_local! {
        static CALLS: RefCell<Vec<(&'static str, String)>> = const { RefCell::new(Vec::new()) };
    }

    fn recording_inline(content: &str) -> MathView {
        CALLS.with(|c| c.borrow_mut().push(("inline", content.to_string())));
        render_latex_inline(content)
    }

    fn recording_block(content: &str) -> MathView {
        CALLS.with(|c| c.borrow_mut().push(("block", content.to_string())));
        render_latex_block(content)
    }

    fn take_calls() -> Vec<(&'static str, String)> {
        CALLS.with(|c| std::mem::take(&mut *c.borrow_mut()))
    }

    fn node(node_type: MarkdownNodeType) -> MarkdownNode {
        MarkdownNode {
            node_type,
            children: Vec::new(),
            start_line: 1,
        }
    }

    #[test]
    fn test_keys_are_fixed() {
        let names: Vec<_> = RuleKey::ALL.iter().map(|k| k.as_str()).collect();
        assert_eq!(names, vec!["math_inline", "math_block"]);
    }

    #[test]
    fn test_block_node_dispatches_to_block_adapter() {
        take_calls();
        let rules = RenderRules::with_adapters(recording_inline, recording_block);
        let math_block = node(MarkdownNodeType::Math {
            display: true,
            literal: "x^2".to_string(),
        });

        let view = rules.dispatch(&math_block).expect("math_block has a rule");

        assert_eq!(take_calls(), vec![("block", "x^2".to_string())]);
        assert_eq!(view.placement, MathPlacement::Block);
        assert_eq!(view.markup, "x^2");
    }

    #[test]
    fn test_inline_node_dispatches_to_inline_adapter() {
        take_calls();
        let rules = RenderRules::with_adapters(recording_inline, recording_block);
        let math_inline = node(MarkdownNodeType::Math {
            display: false,
            literal: r"\alpha".to_string(),
        });

        let view = rules.dispatch(&math_inline).expect("math_inline has a rule");

        assert_eq!(take_calls(), vec![("inline", r"\alpha".to_string())]);
        assert_eq!(view.placement, MathPlacement::Inline);
    }

    #[test]
    fn test_other_nodes_use_default_path() {
        take_calls();
        let rules = RenderRules::with_adapters(recording_inline, recording_block);

        assert!(rules.dispatch(&node(MarkdownNodeType::Text("x^2".into()))).is_none());
        assert!(rules.dispatch(&node(MarkdownNodeType::Code("$x$".into()))).is_none());
        assert!(rules.dispatch(&node(MarkdownNodeType::Paragraph)).is_none());
        assert!(take_calls().is_empty());
    }

    #[test]
    fn test_dispatch_on_parsed_document() {
        take_calls();
        let rules = RenderRules::with_adapters(recording_inline, recording_block);
        let doc = MarkdownProfile::with_math().parse("$$x^2$$");
        let math = doc
            .root
            .find(&|n| RuleKey::for_node(&n.node_type).is_some())
            .expect("parsed math node");

        assert_eq!(RuleKey::for_node(&math.node_type), Some(RuleKey::MathBlock));
        rules.dispatch(math);
        assert_eq!(take_calls(), vec![("block", "x^2".to_string())]);
    }

    #[test]
    fn test_default_table_is_math() {
        let inline = node(MarkdownNodeType::Math {
            display: false,
            literal: "y".to_string(),
        });
        let block = node(MarkdownNodeType::Math {
            display: true,
            literal: r"\frac{1}{2}".to_string(),
        });

        for math in [&inline, &block] {
            assert_eq!(
                RenderRules::default().dispatch(math),
                RenderRules::math().dispatch(math)
            );
        }
        let view = RenderRules::default().dispatch(&inline).expect("inline rule");
        assert_eq!(view.placement, MathPlacement::Inline);
        let view = RenderRules::default().dispatch(&block).expect("block rule");
        assert_eq!(view.placement, MathPlacement::Block);
    }
}
