//! Data-driven element classification.
//!
//! A [`Classifier`] is an ordered list of rules. Each rule pairs a matcher
//! (tag names, a CSS selector or a class name) with the kind of node the
//! matching element becomes. Rules are tried top to bottom and the first
//! match wins, so platform rules placed ahead of [`Classifier::standard_rules`]
//! override the HTML defaults.

use crate::error::{Error, Result};
use scraper::{ElementRef, Selector};
use serde::{Deserialize, Serialize};

/// How a rule recognizes an element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Matcher {
    /// Any of the given lowercase tag names
    Tag(Vec<String>),
    /// A CSS selector
    Selector(String),
    /// A single class name
    Class(String),
}

/// What a matched element becomes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleKind {
    /// Fenced code; optional selectors locate the language label and the code text
    CodeBlock {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        language_selector: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        code_selector: Option<String>,
    },
    MathInline,
    MathBlock,
    Heading,
    Paragraph,
    List,
    Table,
    Blockquote,
    HorizontalRule,
    /// Splice the children into the parent's output
    Flatten,
    /// Drop the element and its subtree
    Skip,
}

/// One classification rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub matcher: Matcher,
    #[serde(flatten)]
    pub kind: RuleKind,
}

impl Rule {
    /// Rule matching any of the given tag names.
    pub fn tags<S: Into<String>>(names: impl IntoIterator<Item = S>, kind: RuleKind) -> Self {
        Self {
            matcher: Matcher::Tag(
                names
                    .into_iter()
                    .map(|n| n.into().to_ascii_lowercase())
                    .collect(),
            ),
            kind,
        }
    }

    /// Rule matching a CSS selector.
    pub fn selector(css: impl Into<String>, kind: RuleKind) -> Self {
        Self {
            matcher: Matcher::Selector(css.into()),
            kind,
        }
    }

    /// Rule matching a class name.
    pub fn class(name: impl Into<String>, kind: RuleKind) -> Self {
        Self {
            matcher: Matcher::Class(name.into()),
            kind,
        }
    }
}

/// A rule with its selectors parsed.
#[derive(Debug, Clone)]
enum CompiledMatcher {
    Tag(Vec<String>),
    Selector(Selector),
    Class(String),
}

impl CompiledMatcher {
    fn matches(&self, element: &ElementRef<'_>) -> bool {
        match self {
            CompiledMatcher::Tag(names) => {
                let name = element.value().name();
                names.iter().any(|n| n == name)
            }
            CompiledMatcher::Selector(selector) => selector.matches(element),
            CompiledMatcher::Class(class) => element.value().classes().any(|c| c == class),
        }
    }
}

/// Classification result for one element.
#[derive(Debug, Clone)]
pub enum Action {
    CodeBlock {
        language: Option<Selector>,
        code: Option<Selector>,
    },
    MathInline,
    MathBlock,
    Heading,
    Paragraph,
    List,
    Table,
    Blockquote,
    HorizontalRule,
    Flatten,
    Skip,
}

/// Ordered, compiled rule list.
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: Vec<(CompiledMatcher, Action)>,
}

impl Default for Classifier {
    fn default() -> Self {
        // Standard rules use only literal selectors
        Self::new(&Self::standard_rules()).expect("standard rules are valid")
    }
}

impl Classifier {
    /// Compile a rule list. Fails on the first unparsable selector.
    pub fn new(rules: &[Rule]) -> Result<Self> {
        let rules = rules
            .iter()
            .map(|rule| Ok((compile_matcher(&rule.matcher)?, compile_kind(&rule.kind)?)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    /// Compile platform rules followed by the standard HTML rules.
    pub fn with_platform_rules(platform: &[Rule]) -> Result<Self> {
        let mut rules = platform.to_vec();
        rules.extend(Self::standard_rules());
        Self::new(&rules)
    }

    /// Rules for plain semantic HTML and common math renderers.
    pub fn standard_rules() -> Vec<Rule> {
        vec![
            Rule::tags(
                ["pre"],
                RuleKind::CodeBlock {
                    language_selector: None,
                    code_selector: Some("code".into()),
                },
            ),
            Rule::class("katex-display", RuleKind::MathBlock),
            Rule::selector("math[display=\"block\"]", RuleKind::MathBlock),
            Rule::class("katex", RuleKind::MathInline),
            Rule::tags(["math"], RuleKind::MathInline),
            Rule::tags(["h1", "h2", "h3", "h4", "h5", "h6"], RuleKind::Heading),
            Rule::tags(["p"], RuleKind::Paragraph),
            Rule::tags(["ul", "ol"], RuleKind::List),
            Rule::tags(["table"], RuleKind::Table),
            Rule::tags(["blockquote"], RuleKind::Blockquote),
            Rule::tags(["hr"], RuleKind::HorizontalRule),
            Rule::tags(["button"], RuleKind::Skip),
        ]
    }

    /// First matching action, or `None` when no rule applies.
    pub fn classify(&self, element: &ElementRef<'_>) -> Option<&Action> {
        self.rules
            .iter()
            .find(|(matcher, _)| matcher.matches(element))
            .map(|(_, action)| action)
    }

    /// Number of compiled rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Parse a CSS selector, mapping failures to [`Error::InvalidSelector`].
pub fn parse_selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| Error::InvalidSelector(format!("{}: {:?}", css, e)))
}

fn compile_matcher(matcher: &Matcher) -> Result<CompiledMatcher> {
    Ok(match matcher {
        Matcher::Tag(names) => {
            CompiledMatcher::Tag(names.iter().map(|n| n.to_ascii_lowercase()).collect())
        }
        Matcher::Selector(css) => CompiledMatcher::Selector(parse_selector(css)?),
        Matcher::Class(name) => CompiledMatcher::Class(name.clone()),
    })
}

fn compile_kind(kind: &RuleKind) -> Result<Action> {
    let optional = |css: &Option<String>| css.as_deref().map(parse_selector).transpose();

    Ok(match kind {
        RuleKind::CodeBlock {
            language_selector,
            code_selector,
        } => Action::CodeBlock {
            language: optional(language_selector)?,
            code: optional(code_selector)?,
        },
        RuleKind::MathInline => Action::MathInline,
        RuleKind::MathBlock => Action::MathBlock,
        RuleKind::Heading => Action::Heading,
        RuleKind::Paragraph => Action::Paragraph,
        RuleKind::List => Action::List,
        RuleKind::Table => Action::Table,
        RuleKind::Blockquote => Action::Blockquote,
        RuleKind::HorizontalRule => Action::HorizontalRule,
        RuleKind::Flatten => Action::Flatten,
        RuleKind::Skip => Action::Skip,
    })
}
