//! Stylesheet parsing on top of cssparser.
//!
//! Only qualified style rules are kept; at-rules are skipped. Selector
//! preludes are parsed into `SelectorList`s, and a rule whose prelude fails
//! to parse is dropped as a whole.

use super::selector::{parse_selector_list, ComplexSelector};
use cssparser::{
    AtRuleParser, BasicParseErrorKind, CowRcStr, DeclarationParser, ParseError, Parser,
    ParserInput, ParserState, QualifiedRuleParser, RuleBodyItemParser, RuleBodyParser,
    StyleSheetParser,
};
use log::debug;

/// A single author declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Declaration {
    /// Lowercased property name.
    pub name: String,
    /// Raw value text without `!important`.
    pub value: String,
    pub important: bool,
}

/// A style rule: every selector of the prelude shares the declarations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StyleRule {
    pub selectors: Vec<ComplexSelector>,
    pub declarations: Vec<Declaration>,
}

/// A parsed stylesheet in source order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Stylesheet {
    pub rules: Vec<StyleRule>,
}

impl Stylesheet {
    /// Parse stylesheet text. Never fails; invalid rules are skipped.
    pub fn parse(css: &str) -> Self {
        let mut input = ParserInput::new(css);
        let mut parser = Parser::new(&mut input);
        let mut top = TopLevelParser;
        let mut sheet = Self::default();
        for rule in StyleSheetParser::new(&mut parser, &mut top).flatten() {
            sheet.rules.push(rule);
        }
        debug!("Stylesheet: parsed {} rules", sheet.rules.len());
        sheet
    }
}

/// Split a trailing `!important` off a raw value.
fn split_important_tail(value: &str) -> (String, bool) {
    let trimmed = value.trim();
    if let Some(pos) = trimmed.rfind("!important")
        && let Some(prefix) = trimmed.get(..pos)
    {
        return (prefix.trim_end().to_owned(), true);
    }
    (trimmed.to_owned(), false)
}

/// Records property name and raw value for each declaration in a block.
struct BodyDeclParser;

impl<'i> DeclarationParser<'i> for BodyDeclParser {
    type Declaration = Declaration;
    type Error = ();

    fn parse_value<'t>(
        &mut self,
        name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
        _decl_start: &ParserState,
    ) -> Result<Self::Declaration, ParseError<'i, Self::Error>> {
        let start = input.position();
        while input.next_including_whitespace_and_comments().is_ok() {}
        let (value, important) = split_important_tail(input.slice_from(start));
        Ok(Declaration {
            name: name.to_ascii_lowercase(),
            value,
            important,
        })
    }
}

impl<'i> AtRuleParser<'i> for BodyDeclParser {
    type Prelude = ();
    type AtRule = Declaration;
    type Error = ();
}

impl<'i> QualifiedRuleParser<'i> for BodyDeclParser {
    type Prelude = ();
    type QualifiedRule = Declaration;
    type Error = ();
}

impl<'i> RuleBodyItemParser<'i, Declaration, ()> for BodyDeclParser {
    fn parse_declarations(&self) -> bool {
        true
    }
    fn parse_qualified(&self) -> bool {
        false
    }
}

/// Builds `StyleRule`s for top-level qualified rules.
struct TopLevelParser;

impl<'i> AtRuleParser<'i> for TopLevelParser {
    type Prelude = ();
    type AtRule = StyleRule;
    type Error = ();

    fn parse_prelude<'t>(
        &mut self,
        _name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i, Self::Error>> {
        while input.next().is_ok() {}
        Ok(())
    }

    fn parse_block<'t>(
        &mut self,
        _prelude: Self::Prelude,
        _state: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::AtRule, ParseError<'i, Self::Error>> {
        Err(input.new_error(BasicParseErrorKind::AtRuleBodyInvalid))
    }

    fn rule_without_block(
        &mut self,
        _prelude: Self::Prelude,
        _state: &ParserState,
    ) -> Result<Self::AtRule, Self::Error> {
        Err(())
    }
}

impl<'i> QualifiedRuleParser<'i> for TopLevelParser {
    type Prelude = Vec<ComplexSelector>;
    type QualifiedRule = StyleRule;
    type Error = ();

    fn parse_prelude<'t>(
        &mut self,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i, Self::Error>> {
        let start = input.position();
        while input.next_including_whitespace_and_comments().is_ok() {}
        let raw = input.slice_from(start);
        parse_selector_list(raw).ok_or_else(|| {
            debug!("Stylesheet: dropping rule with unsupported selector `{}`", raw.trim());
            input.new_error(BasicParseErrorKind::QualifiedRuleInvalid)
        })
    }

    fn parse_block<'t>(
        &mut self,
        prelude: Self::Prelude,
        _state: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::QualifiedRule, ParseError<'i, Self::Error>> {
        let mut body = BodyDeclParser;
        let declarations: Vec<Declaration> =
            RuleBodyParser::new(input, &mut body).flatten().collect();
        Ok(StyleRule {
            selectors: prelude,
            declarations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::Stylesheet;

    #[test]
    fn parses_rules_and_skips_at_rules() {
        let sheet = Stylesheet::parse(
            "@media print { #x { color: red } }\n#x { display: none; color: red !important }\n:hover { display: none }\n.a, div > .b { display: inline }",
        );
        assert_eq!(sheet.rules.len(), 2);
        let first = &sheet.rules[0];
        assert_eq!(first.declarations.len(), 2);
        assert_eq!(first.declarations[0].name, "display");
        assert_eq!(first.declarations[0].value, "none");
        assert!(first.declarations[1].important);
        assert_eq!(first.declarations[1].value, "red");
        assert_eq!(sheet.rules[1].selectors.len(), 2);
    }
}
