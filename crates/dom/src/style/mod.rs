//! Author stylesheets, inline styles and the cascade used for computed values.

pub mod inline;
pub mod selector;
pub mod syntax;

pub use selector::{SelectorElement, Specificity};
pub use syntax::{Declaration, StyleRule, Stylesheet};

use inline::parse_style_attribute;

/// Elements that are not rendered unless an author rule says otherwise.
const HIDDEN_ELEMENTS: [&str; 9] = [
    "head", "script", "link", "style", "meta", "title", "template", "base", "noscript",
];

/// Phrasing elements rendered inline by default.
const INLINE_ELEMENTS: [&str; 12] = [
    "a", "abbr", "b", "code", "em", "i", "img", "label", "small", "span", "strong", "sub",
];

/// Cascade order key: `!important` beats normal, inline beats author, then
/// specificity, then source order.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
struct Priority {
    important: bool,
    inline: bool,
    specificity: Specificity,
    order: usize,
}

/// Winning value of `property` for `element`.
///
/// `sheets` are the document's stylesheets in tree order; `inline_style` is
/// the element's `style` attribute.
pub fn cascaded_value<'sheet, E, I>(
    element: &E,
    sheets: I,
    inline_style: Option<&str>,
    property: &str,
) -> Option<String>
where
    E: SelectorElement,
    I: IntoIterator<Item = &'sheet Stylesheet>,
{
    let property = property.to_ascii_lowercase();
    let mut winner: Option<(Priority, &str)> = None;
    let mut order: usize = 0;
    let mut consider = |priority: Priority, value: &'sheet str| {
        if winner.is_none_or(|(best, _)| priority >= best) {
            winner = Some((priority, value));
        }
    };
    for sheet in sheets {
        for rule in &sheet.rules {
            order = order.saturating_add(1);
            let Some(specificity) = rule
                .selectors
                .iter()
                .filter(|selector| selector.matches(element))
                .map(|selector| selector.specificity)
                .max()
            else {
                continue;
            };
            for decl in rule.declarations.iter().filter(|decl| decl.name == property) {
                consider(
                    Priority {
                        important: decl.important,
                        inline: false,
                        specificity,
                        order,
                    },
                    &decl.value,
                );
            }
        }
    }
    let mut result = winner.map(|(priority, value)| (priority, value.to_owned()));
    if let Some(attribute) = inline_style {
        for decl in parse_style_attribute(attribute)
            .into_iter()
            .filter(|decl| decl.property == property)
        {
            let priority = Priority {
                important: decl.important,
                inline: true,
                specificity: Specificity::default(),
                order: usize::MAX,
            };
            if result.as_ref().is_none_or(|(best, _)| priority >= *best) {
                result = Some((priority, decl.value));
            }
        }
    }
    result.map(|(_, value)| value)
}

/// User-agent `display` for an element without author styling.
pub fn default_display(tag: &str) -> &'static str {
    let tag = tag.to_ascii_lowercase();
    if HIDDEN_ELEMENTS.contains(&tag.as_str()) {
        "none"
    } else if INLINE_ELEMENTS.contains(&tag.as_str()) {
        "inline"
    } else {
        "block"
    }
}
