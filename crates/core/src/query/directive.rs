//! Directive tokenizer.
//!
//! Grammar, applied left to right:
//!
//! ```text
//! ["-"] field ["&" | "|"] ["*"] ":" [op] value ("," value)*
//! field = artist | circle | magazine | parody | tag | title | pages
//! op    = "<" | "<=" | ">" | ">="          (pages only)
//! value = "\"" phrase "\"" | token
//! ```
//!
//! A directive starts at the beginning of the input or after whitespace.
//! Anything that does not start a directive is left in [`Scan::remainder`].

use super::Comparison;
use crate::Error;
use crate::model::Taxonomy;

/// The field a directive constrains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Taxonomy(Taxonomy),
    Title,
    Pages,
}

impl Field {
    fn parse(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case("title") {
            Some(Field::Title)
        } else if name.eq_ignore_ascii_case("pages") {
            Some(Field::Pages)
        } else {
            Taxonomy::parse(name).map(Field::Taxonomy)
        }
    }
}

/// How the values of one directive combine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Combinator {
    /// Any one value matching is sufficient.
    #[default]
    Or,
    /// Every value must match independently.
    And,
}

/// One parsed `field:value` unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub field: Field,
    /// Exclusion; only ever set on taxonomy fields.
    pub negated: bool,
    /// Always `Or` when `negated` is set.
    pub combinator: Combinator,
    pub wildcard: bool,
    /// Only ever set on `pages`.
    pub comparison: Option<Comparison>,
    /// Raw values, trimmed and non-empty. `pages` carries exactly one positive integer.
    pub values: Vec<String>,
}

impl Directive {
    /// Page count carried by a `pages` directive.
    pub fn page_count(&self) -> Option<u32> {
        match self.field {
            Field::Pages => self.values.first().and_then(|v| v.parse().ok()),
            _ => None,
        }
    }
}

/// Tokenizer output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scan {
    pub directives: Vec<Directive>,
    /// Directive-shaped tokens that were dropped.
    pub malformed: usize,
    /// Input with every directive-shaped span removed, whitespace collapsed.
    pub remainder: String,
}

impl Scan {
    /// Whether the input carried any directive syntax at all.
    ///
    /// Free-text fallback only applies when this is false.
    pub fn is_structured(&self) -> bool {
        !self.directives.is_empty() || self.malformed > 0
    }
}

/// Scan `input` for directives.
pub fn scan(input: &str) -> Scan {
    let mut out = Scan::default();
    let mut remainder = String::with_capacity(input.len());
    let mut pos = 0;
    let mut at_boundary = true;

    while pos < input.len() {
        let rest = &input[pos..];
        if at_boundary && let Some((consumed, parsed)) = parse_directive(rest) {
            match parsed {
                Ok(directive) => out.directives.push(directive),
                Err(err) => {
                    tracing::debug!(error = %err, "dropping malformed directive");
                    out.malformed += 1;
                }
            }
            remainder.push(' ');
            pos += consumed;
            at_boundary = false;
            continue;
        }

        let Some(c) = rest.chars().next() else { break };
        remainder.push(c);
        at_boundary = c.is_whitespace();
        pos += c.len_utf8();
    }

    out.remainder = remainder.split_whitespace().collect::<Vec<_>>().join(" ");
    out
}

/// Try to read one directive at the start of `s`.
///
/// Returns `None` when `s` does not start with directive syntax, otherwise
/// the number of bytes the directive spans and the parse outcome.
fn parse_directive(s: &str) -> Option<(usize, Result<Directive, Error>)> {
    let mut rest = s;

    let negated = rest.starts_with('-');
    if negated {
        rest = &rest[1..];
    }

    let name_len = rest.find(|c: char| !c.is_ascii_alphabetic()).unwrap_or(rest.len());
    let field = Field::parse(&rest[..name_len])?;
    rest = &rest[name_len..];

    let combinator = if let Some(after) = rest.strip_prefix('&') {
        rest = after;
        Combinator::And
    } else if let Some(after) = rest.strip_prefix('|') {
        rest = after;
        Combinator::Or
    } else {
        Combinator::Or
    };

    let wildcard = rest.starts_with('*');
    if wildcard {
        rest = &rest[1..];
    }

    rest = rest.strip_prefix(':')?;

    let comparison = match field {
        Field::Pages => {
            let (op, after) = parse_comparison(rest);
            rest = after;
            Some(op)
        }
        _ => None,
    };

    let (values, after) = parse_values(rest);
    let consumed = s.len() - after.len();
    let text = &s[..consumed];

    if values.is_empty() {
        return Some((consumed, Err(Error::MalformedDirective(format!("`{text}` has no value")))));
    }

    let directive = match field {
        Field::Taxonomy(_) => Directive {
            field,
            negated,
            // exclusion wins over an explicit combinator
            combinator: if negated { Combinator::Or } else { combinator },
            wildcard,
            comparison: None,
            values,
        },
        Field::Title => {
            Directive { field, negated: false, combinator: Combinator::Or, wildcard, comparison: None, values }
        }
        Field::Pages => {
            let count = match values.as_slice() {
                [single] => single.parse::<u32>().ok().filter(|n| *n > 0),
                _ => None,
            };
            let Some(count) = count else {
                return Some((
                    consumed,
                    Err(Error::MalformedDirective(format!("`{text}` is not a positive page count"))),
                ));
            };
            Directive {
                field,
                negated: false,
                combinator: Combinator::Or,
                wildcard: false,
                comparison,
                values: vec![count.to_string()],
            }
        }
    };

    Some((consumed, Ok(directive)))
}

fn parse_comparison(s: &str) -> (Comparison, &str) {
    let ops = [("<=", Comparison::Lte), (">=", Comparison::Gte), ("<", Comparison::Lt), (">", Comparison::Gt)];
    for (prefix, op) in ops {
        if let Some(rest) = s.strip_prefix(prefix) {
            return (op, rest);
        }
    }
    (Comparison::Eq, s)
}

/// Read a comma-separated value list. Quoted phrases are kept whole.
fn parse_values(s: &str) -> (Vec<String>, &str) {
    let mut values = Vec::new();
    let mut rest = s;

    loop {
        let (value, after) = match rest.strip_prefix('"') {
            Some(quoted) => match quoted.find('"') {
                Some(end) => (&quoted[..end], &quoted[end + 1..]),
                // unterminated: run to the next whitespace
                None => {
                    let end = quoted.find(char::is_whitespace).unwrap_or(quoted.len());
                    (&quoted[..end], &quoted[end..])
                }
            },
            None => {
                let end = rest.find(|c: char| c.is_whitespace() || c == ',').unwrap_or(rest.len());
                (&rest[..end], &rest[end..])
            }
        };

        let value = value.trim();
        if !value.is_empty() {
            values.push(value.to_string());
        }
        rest = after;

        match rest.strip_prefix(',') {
            Some(next) => rest = next,
            None => break,
        }
    }

    (values, rest)
}
