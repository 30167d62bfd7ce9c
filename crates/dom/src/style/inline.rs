//! `style="..."` attribute handling.

/// One declaration of an inline style attribute.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InlineDeclaration {
    /// Property name normalized to ASCII lowercase.
    pub property: String,
    pub value: String,
    pub important: bool,
}

/// Parse a style attribute into declarations, in source order.
///
/// Splits on `;`, then on the first `:`. Items without a colon, with an empty
/// property or with an empty value are skipped.
pub fn parse_style_attribute(input: &str) -> Vec<InlineDeclaration> {
    let mut out: Vec<InlineDeclaration> = Vec::new();
    for raw_item in input.split(';') {
        let Some((raw_prop, raw_value)) = raw_item.split_once(':') else {
            continue;
        };
        let property = raw_prop.trim().to_ascii_lowercase();
        let mut value = raw_value.trim();
        let mut important = false;
        if let Some(stripped) = value.strip_suffix("!important") {
            value = stripped.trim_end();
            important = true;
        }
        if property.is_empty() || value.is_empty() {
            continue;
        }
        out.push(InlineDeclaration {
            property,
            value: value.to_owned(),
            important,
        });
    }
    out
}

/// Set `property` to `value` within an existing attribute string, keeping the
/// order of the other declarations. An empty `value` removes the property.
pub fn set_style_property(attribute: &str, property: &str, value: &str) -> String {
    let property = property.trim().to_ascii_lowercase();
    let value = value.trim();
    let mut declarations = parse_style_attribute(attribute);
    declarations.retain(|decl| decl.property != property);
    if !value.is_empty() {
        declarations.push(InlineDeclaration {
            property,
            value: value.to_owned(),
            important: false,
        });
    }
    serialize(&declarations)
}

/// Serialize declarations back into attribute text.
pub fn serialize(declarations: &[InlineDeclaration]) -> String {
    declarations
        .iter()
        .map(|decl| {
            if decl.important {
                format!("{}: {} !important;", decl.property, decl.value)
            } else {
                format!("{}: {};", decl.property, decl.value)
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::{parse_style_attribute, set_style_property};

    #[test]
    fn skips_invalid_items() {
        let decls = parse_style_attribute("color: red; ;bogus; Display : none !important; width:");
        assert_eq!(decls.len(), 2);
        assert_eq!(decls[1].property, "display");
        assert_eq!(decls[1].value, "none");
        assert!(decls[1].important);
    }

    #[test]
    fn replaces_and_removes_properties() {
        let updated = set_style_property("display: none; color: red", "display", "block");
        assert_eq!(updated, "color: red; display: block;");
        let removed = set_style_property(&updated, "color", "");
        assert_eq!(removed, "display: block;");
    }
}
