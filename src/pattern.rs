//! Regex rewriting with back-reference templates.
//!
//! Replacement templates use the substitution language the catalog rules are
//! written in:
//!
//! - `$1`, `$12`: numbered group. Digits are read greedily and backed off to
//!   the longest prefix naming an existing group.
//! - `${name}` or `${2}`: named or numbered group
//! - `$&` or `$0`: the whole match
//! - `$$`: a literal `$`
//!
//! Groups that did not participate in the match substitute as empty. A `$`
//! that starts none of the forms above is copied literally.

use regex::{Captures, Regex};

/// Template applied when a rule does not configure one.
pub const DEFAULT_TEMPLATE: &str = "$1";

/// A compiled source pattern.
#[derive(Debug, Clone)]
pub struct Pattern {
    regex: Regex,
}

impl Pattern {
    /// Compile a pattern.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(pattern)?,
        })
    }

    /// Whether the pattern matches anywhere in `input`.
    pub fn matches(&self, input: &str) -> bool {
        self.regex.is_match(input)
    }

    /// Parse `template` against this pattern's groups and replace every
    /// non-overlapping match in `input`.
    pub fn substitute(&self, input: &str, template: &str) -> String {
        self.replace_all(input, &Template::parse(template, &self.regex))
    }

    /// Replace every non-overlapping match in `input` with a parsed template.
    ///
    /// An empty match directly after a non-empty one is replaced too, so
    /// `(.*)` matches twice on `"abc"`: the text, then the empty end.
    pub fn replace_all(&self, input: &str, template: &Template) -> String {
        let mut out = String::with_capacity(input.len());
        let mut copied = 0;
        let mut pos = 0;

        while let Some(caps) = self.regex.captures_at(input, pos) {
            let Some(m) = caps.get(0) else { break };
            out.push_str(&input[copied..m.start()]);
            out.push_str(&template.expand(&caps));
            copied = m.end();

            if !m.is_empty() {
                pos = m.end();
                continue;
            }
            // Empty match: step over one character before searching again.
            match input[m.end()..].chars().next() {
                Some(c) => pos = m.end() + c.len_utf8(),
                None => break,
            }
        }

        out.push_str(&input[copied..]);
        out
    }

    /// Parse a template against this pattern's groups.
    pub fn template(&self, template: &str) -> Template {
        Template::parse(template, &self.regex)
    }
}

/// A parsed replacement template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    parts: Vec<Part>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Literal(String),
    Group(usize),
    Named(String),
}

impl Template {
    /// Parse a template, resolving group references against `regex`.
    pub fn parse(template: &str, regex: &Regex) -> Self {
        let group_count = regex.captures_len();
        let mut parts = Vec::new();
        let mut literal = String::new();
        let mut rest = template;

        while let Some(pos) = rest.find('$') {
            literal.push_str(&rest[..pos]);
            let after = &rest[pos + 1..];

            let (part, consumed) = match after.as_bytes().first().copied() {
                Some(b'$') => (None, 1),
                Some(b'&') => (Some(Part::Group(0)), 1),
                Some(b'{') => match after.find('}') {
                    Some(end) => {
                        let name = &after[1..end];
                        match group_reference(name, regex) {
                            Some(part) => (Some(part), end + 1),
                            None => (literal_dollar(), 0),
                        }
                    }
                    None => (literal_dollar(), 0),
                },
                Some(b) if b.is_ascii_digit() => {
                    match numbered_reference(after, group_count) {
                        Some((index, len)) => (Some(Part::Group(index)), len),
                        None => (literal_dollar(), 0),
                    }
                }
                _ => (literal_dollar(), 0),
            };

            match part {
                // `$$` collapses into the literal run.
                None => literal.push('$'),
                Some(Part::Literal(text)) => literal.push_str(&text),
                Some(group) => {
                    if !literal.is_empty() {
                        parts.push(Part::Literal(std::mem::take(&mut literal)));
                    }
                    parts.push(group);
                }
            }
            rest = &after[consumed..];
        }

        literal.push_str(rest);
        if !literal.is_empty() {
            parts.push(Part::Literal(literal));
        }

        Self { parts }
    }

    /// Render the template for one match.
    pub fn expand(&self, caps: &Captures) -> String {
        let mut out = String::new();
        for part in &self.parts {
            match part {
                Part::Literal(text) => out.push_str(text),
                Part::Group(index) => {
                    if let Some(m) = caps.get(*index) {
                        out.push_str(m.as_str());
                    }
                }
                Part::Named(name) => {
                    if let Some(m) = caps.name(name) {
                        out.push_str(m.as_str());
                    }
                }
            }
        }
        out
    }
}

fn literal_dollar() -> Option<Part> {
    Some(Part::Literal("$".to_string()))
}

fn group_reference(name: &str, regex: &Regex) -> Option<Part> {
    if !name.is_empty() && name.bytes().all(|b| b.is_ascii_digit()) {
        let index: usize = name.parse().ok()?;
        return (index < regex.captures_len()).then_some(Part::Group(index));
    }
    regex
        .capture_names()
        .flatten()
        .any(|n| n == name)
        .then(|| Part::Named(name.to_string()))
}

/// Longest digit prefix of `s` that names an existing group.
fn numbered_reference(s: &str, group_count: usize) -> Option<(usize, usize)> {
    let digits = s.bytes().take_while(u8::is_ascii_digit).count();
    (1..=digits).rev().find_map(|len| {
        let index: usize = s[..len].parse().ok()?;
        (index < group_count).then_some((index, len))
    })
}
