//! Selector parsing and matching.
//!
//! Supports compound selectors built from type, `#id`, `.class` and `*`,
//! joined by descendant (whitespace) or child (`>`) combinators. Anything else
//! (pseudo-classes, attribute selectors, sibling combinators) makes the
//! selector unsupported.

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SimpleSelector {
    Type(String),
    Id(String),
    Class(String),
    Universal,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Combinator {
    Descendant,
    Child,
}

#[derive(Clone, Debug, Eq, PartialEq, Default)]
pub struct CompoundSelector {
    pub simples: Vec<SimpleSelector>,
}

#[derive(Clone, Debug, Eq, PartialEq, Default)]
pub struct ComplexSelector {
    // Left-to-right sequence of (compound, combinator-to-next). The last combinator is None.
    pub sequence: Vec<(CompoundSelector, Option<Combinator>)>,
    pub specificity: Specificity,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Default)]
pub struct Specificity(pub u32);

impl Specificity {
    pub const fn from_counts(ids: u32, classes: u32, types: u32) -> Self {
        Self((ids << 20) | (classes << 10) | types)
    }
}

/// The element surface selector matching needs.
pub trait SelectorElement: Sized {
    fn local_name(&self) -> Option<String>;
    fn id(&self) -> Option<String>;
    fn has_class(&self, class: &str) -> bool;
    /// Nearest ancestor that is an element.
    fn parent_element(&self) -> Option<Self>;
}

impl ComplexSelector {
    /// Whether `element` is matched by this selector.
    pub fn matches<E: SelectorElement>(&self, element: &E) -> bool {
        match self.sequence.len().checked_sub(1) {
            Some(last) => self.matches_at(element, last),
            None => false,
        }
    }

    fn matches_at<E: SelectorElement>(&self, element: &E, index: usize) -> bool {
        let Some((compound, _)) = self.sequence.get(index) else {
            return false;
        };
        if !compound.matches(element) {
            return false;
        }
        let Some(previous) = index.checked_sub(1) else {
            return true;
        };
        let combinator = self
            .sequence
            .get(previous)
            .and_then(|(_, combinator)| *combinator);
        match combinator {
            Some(Combinator::Child) => element
                .parent_element()
                .is_some_and(|parent| self.matches_at(&parent, previous)),
            Some(Combinator::Descendant) | None => {
                let mut ancestor = element.parent_element();
                while let Some(candidate) = ancestor {
                    if self.matches_at(&candidate, previous) {
                        return true;
                    }
                    ancestor = candidate.parent_element();
                }
                false
            }
        }
    }
}

impl CompoundSelector {
    fn matches<E: SelectorElement>(&self, element: &E) -> bool {
        self.simples.iter().all(|simple| match simple {
            SimpleSelector::Universal => true,
            SimpleSelector::Type(tag) => element
                .local_name()
                .is_some_and(|name| name.eq_ignore_ascii_case(tag)),
            SimpleSelector::Id(id) => element.id().is_some_and(|value| value == *id),
            SimpleSelector::Class(class) => element.has_class(class),
        })
    }
}

/// Parse a comma-separated selector list. `None` if any selector is unsupported.
pub fn parse_selector_list(prelude: &str) -> Option<Vec<ComplexSelector>> {
    let selectors: Option<Vec<ComplexSelector>> =
        prelude.split(',').map(parse_complex_selector).collect();
    selectors.filter(|list| !list.is_empty())
}

fn parse_complex_selector(text: &str) -> Option<ComplexSelector> {
    let spaced = text.replace('>', " > ");
    let mut sequence: Vec<(CompoundSelector, Option<Combinator>)> = Vec::new();
    let mut pending: Option<Combinator> = None;
    for token in spaced.split_whitespace() {
        if token == ">" {
            // A child combinator needs a compound on its left.
            sequence.last()?;
            pending = Some(Combinator::Child);
            continue;
        }
        let compound = parse_compound(token)?;
        if let Some(last) = sequence.last_mut() {
            last.1 = Some(pending.take().unwrap_or(Combinator::Descendant));
        }
        sequence.push((compound, None));
    }
    if sequence.is_empty() || pending.is_some() {
        return None;
    }
    let specificity = specificity_of(&sequence);
    Some(ComplexSelector {
        sequence,
        specificity,
    })
}

fn parse_compound(token: &str) -> Option<CompoundSelector> {
    let mut simples: Vec<SimpleSelector> = Vec::new();
    let mut rest = token;
    if let Some(after) = rest.strip_prefix('*') {
        simples.push(SimpleSelector::Universal);
        rest = after;
    } else {
        let end = rest.find(['#', '.']).unwrap_or(rest.len());
        let (tag, after) = rest.split_at(end);
        if !tag.is_empty() {
            if !is_ident(tag) {
                return None;
            }
            simples.push(SimpleSelector::Type(tag.to_ascii_lowercase()));
        }
        rest = after;
    }
    while !rest.is_empty() {
        let marker = rest.chars().next()?;
        let body = rest.get(1..)?;
        let end = body.find(['#', '.']).unwrap_or(body.len());
        let (name, after) = body.split_at(end);
        if !is_ident(name) {
            return None;
        }
        match marker {
            '#' => simples.push(SimpleSelector::Id(name.to_owned())),
            '.' => simples.push(SimpleSelector::Class(name.to_owned())),
            _ => return None,
        }
        rest = after;
    }
    if simples.is_empty() {
        return None;
    }
    Some(CompoundSelector { simples })
}

fn is_ident(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with(|character: char| character.is_ascii_digit())
        && name
            .chars()
            .all(|character| character.is_alphanumeric() || character == '-' || character == '_')
}

fn specificity_of(sequence: &[(CompoundSelector, Option<Combinator>)]) -> Specificity {
    let (mut ids, mut classes, mut types) = (0_u32, 0_u32, 0_u32);
    for simple in sequence.iter().flat_map(|(compound, _)| &compound.simples) {
        match simple {
            SimpleSelector::Id(_) => ids = ids.saturating_add(1),
            SimpleSelector::Class(_) => classes = classes.saturating_add(1),
            SimpleSelector::Type(_) => types = types.saturating_add(1),
            SimpleSelector::Universal => {}
        }
    }
    Specificity::from_counts(ids, classes, types)
}
