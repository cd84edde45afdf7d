//! Conservative selector parser and matcher (spec.md §4.5's described
//! fallback): `tag`, `.class`, `#id`, and descendant combinators only.
//! Pseudo-elements drop the rule; pseudo-classes are stripped before
//! matching.

use super::value::Specificity;

/// Minimal element introspection the matcher needs. The transcoder's
/// DOM wrapper implements this over `markup5ever_rcdom::Handle`.
pub trait ElementInfo: Clone {
    fn tag_name(&self) -> String;
    fn id(&self) -> Option<String>;
    fn classes(&self) -> Vec<String>;
    fn parent(&self) -> Option<Self>;

    /// The raw `style="..."` attribute, if any. Defaults to `None` so
    /// test doubles don't need to implement it.
    fn inline_style(&self) -> Option<String> {
        None
    }
}

#[derive(Debug, Clone, Default)]
pub struct CompoundSelector {
    pub tag: Option<String>,
    pub classes: Vec<String>,
    pub id: Option<String>,
}

/// A descendant-combinator chain, e.g. `div.article p` parses into two
/// compounds `[div.article, p]`; the last compound matches the element
/// itself, earlier ones must match some ancestor in order.
#[derive(Debug, Clone)]
pub struct Selector {
    pub compounds: Vec<CompoundSelector>,
}

/// Parse one selector (no commas — split those before calling). Returns
/// `None` if it contains a pseudo-element (`::x`), which drops the rule
/// outright per spec.
pub fn parse_selector(raw: &str) -> Option<Selector> {
    if raw.contains("::") {
        return None;
    }
    let mut compounds = Vec::new();
    for part in raw.split_whitespace() {
        let stripped = strip_pseudo_classes(part);
        if stripped.is_empty() {
            continue;
        }
        compounds.push(parse_compound(&stripped));
    }
    if compounds.is_empty() {
        return None;
    }
    Some(Selector { compounds })
}

fn strip_pseudo_classes(part: &str) -> String {
    part.split(':').next().unwrap_or("").to_string()
}

fn parse_compound(part: &str) -> CompoundSelector {
    let mut compound = CompoundSelector::default();
    let mut tag_end = part.len();
    for (i, c) in part.char_indices() {
        if c == '.' || c == '#' {
            tag_end = i;
            break;
        }
    }
    let tag = &part[..tag_end];
    if !tag.is_empty() && tag != "*" {
        compound.tag = Some(tag.to_ascii_lowercase());
    }

    let mut rest = &part[tag_end..];
    while !rest.is_empty() {
        let marker = rest.chars().next().unwrap();
        let end = rest[1..]
            .find(['.', '#'])
            .map(|p| p + 1)
            .unwrap_or(rest.len());
        let token = &rest[1..end];
        match marker {
            '.' => compound.classes.push(token.to_string()),
            '#' => compound.id = Some(token.to_string()),
            _ => {}
        }
        rest = &rest[end..];
    }
    compound
}

fn compound_matches<E: ElementInfo>(compound: &CompoundSelector, element: &E) -> bool {
    if let Some(tag) = &compound.tag {
        if element.tag_name().to_ascii_lowercase() != *tag {
            return false;
        }
    }
    if let Some(id) = &compound.id {
        if element.id().as_deref() != Some(id.as_str()) {
            return false;
        }
    }
    if !compound.classes.is_empty() {
        let classes = element.classes();
        if !compound.classes.iter().all(|c| classes.contains(c)) {
            return false;
        }
    }
    true
}

/// Does `element` match `selector`, walking up to an unbounded number of
/// ancestors for each descendant combinator?
pub fn matches<E: ElementInfo>(selector: &Selector, element: &E) -> bool {
    let Some((last, rest)) = selector.compounds.split_last() else {
        return false;
    };
    if !compound_matches(last, element) {
        return false;
    }
    let mut current = element.clone();
    for target in rest.iter().rev() {
        loop {
            match current.parent() {
                Some(p) => {
                    current = p;
                    if compound_matches(target, &current) {
                        break;
                    }
                }
                None => return false,
            }
        }
    }
    true
}

/// Split a selector list (`h1, h2.foo, :not(a, b)`) on top-level commas,
/// using `cssparser`'s tokenizer so commas nested inside a pseudo-class
/// argument list or `[attr~="a, b"]` don't split the selector in two.
pub fn split_top_level_commas(raw: &str) -> Vec<String> {
    use cssparser::{ParseError, Parser, ParserInput, Token};

    let mut input = ParserInput::new(raw);
    let mut parser = Parser::new(&mut input);
    let mut parts = Vec::new();
    let mut start = parser.position();

    loop {
        match parser.next_including_whitespace() {
            Ok(Token::Comma) => {
                parts.push(parser.slice_from(start).trim_end_matches(',').trim().to_string());
                start = parser.position();
            }
            Ok(Token::Function(_))
            | Ok(Token::ParenthesisBlock)
            | Ok(Token::SquareBracketBlock)
            | Ok(Token::CurlyBracketBlock) => {
                let _ = parser.parse_nested_block(|p: &mut Parser<'_, '_>| -> Result<(), ParseError<'_, ()>> {
                    while p.next_including_whitespace().is_ok() {}
                    Ok(())
                });
            }
            Ok(_) => {}
            Err(_) => break,
        }
    }

    let tail = parser.slice_from(start).trim().to_string();
    if !tail.is_empty() {
        parts.push(tail);
    }
    parts.into_iter().filter(|p| !p.is_empty()).collect()
}

/// Specificity summed across all compounds in the chain.
pub fn specificity(selector: &Selector) -> Specificity {
    let mut ids = 0;
    let mut classes = 0;
    let mut tags = 0;
    for compound in &selector.compounds {
        if compound.id.is_some() {
            ids += 1;
        }
        classes += compound.classes.len() as u32;
        if compound.tag.is_some() {
            tags += 1;
        }
    }
    Specificity(ids, classes, tags)
}
