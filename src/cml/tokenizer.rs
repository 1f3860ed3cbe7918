use crate::cml::error::CmlError;

/// A start or end tag, with everything else in the document skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tag<'a> {
    Start(StartTag<'a>),
    End { name: &'a str, line: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartTag<'a> {
    pub name: &'a str,
    pub attrs: Vec<(&'a str, String)>,
    /// `<atom .../>` form, no matching end tag follows.
    pub empty: bool,
    pub line: usize,
}

impl<'a> StartTag<'a> {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Drop a namespace prefix: `cml:atom` becomes `atom`.
pub fn local_name(name: &str) -> &str {
    name.rsplit(':').next().unwrap_or(name)
}

/// Split a document into tags.
///
/// Text content, comments, processing instructions, doctype declarations and
/// CDATA sections are skipped. Attribute values have their entities decoded.
pub fn tokenize(input: &str) -> Result<Vec<Tag<'_>>, CmlError> {
    let mut tags = Vec::new();
    let mut pos = 0;

    while let Some(offset) = input[pos..].find('<') {
        let start = pos + offset;
        let rest = &input[start..];
        let line = line_at(input, start);

        if rest.starts_with("<!DOCTYPE") {
            let end = doctype_end(rest)
                .ok_or_else(|| CmlError::syntax(line, "unterminated '<!DOCTYPE'"))?;
            pos = start + end + 1;
            continue;
        }

        if let Some(skip) = [("<!--", "-->"), ("<![CDATA[", "]]>"), ("<?", "?>"), ("<!", ">")]
            .iter()
            .find(|(open, _)| rest.starts_with(open))
        {
            let (open, close) = skip;
            let end = rest[open.len()..]
                .find(close)
                .ok_or_else(|| CmlError::syntax(line, format!("unterminated '{open}'")))?;
            pos = start + open.len() + end + close.len();
            continue;
        }

        let end = tag_end(rest).ok_or_else(|| CmlError::syntax(line, "unterminated tag"))?;
        let inner = &rest[1..end];
        pos = start + end + 1;

        if let Some(name) = inner.strip_prefix('/') {
            let name = name.trim();
            if name.is_empty() {
                return Err(CmlError::syntax(line, "empty closing tag"));
            }
            tags.push(Tag::End { name, line });
            continue;
        }

        let (inner, empty) = match inner.strip_suffix('/') {
            Some(s) => (s, true),
            None => (inner, false),
        };
        let name_end = inner
            .find(|c: char| c.is_whitespace())
            .unwrap_or(inner.len());
        let name = &inner[..name_end];
        if name.is_empty() {
            return Err(CmlError::syntax(line, "tag without a name"));
        }
        let attrs = parse_attrs(&inner[name_end..], line)?;
        tags.push(Tag::Start(StartTag {
            name,
            attrs,
            empty,
            line,
        }));
    }

    Ok(tags)
}

fn line_at(input: &str, offset: usize) -> usize {
    input[..offset].matches('\n').count() + 1
}

// index of the '>' closing the tag that starts at s[0], skipping quoted '>'
fn tag_end(s: &str) -> Option<usize> {
    let mut quote = None;
    for (i, c) in s.char_indices().skip(1) {
        match (quote, c) {
            (None, '"' | '\'') => quote = Some(c),
            (Some(q), _) if c == q => quote = None,
            (None, '>') => return Some(i),
            _ => {}
        }
    }
    None
}

// index of the '>' closing a doctype, past any bracketed internal subset
fn doctype_end(s: &str) -> Option<usize> {
    let mut quote = None;
    let mut depth = 0usize;
    for (i, c) in s.char_indices().skip(2) {
        match (quote, c) {
            (None, '"' | '\'') => quote = Some(c),
            (Some(q), _) if c == q => quote = None,
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.saturating_sub(1),
            (None, '>') if depth == 0 => return Some(i),
            _ => {}
        }
    }
    None
}

fn parse_attrs(s: &str, line: usize) -> Result<Vec<(&str, String)>, CmlError> {
    let mut attrs = Vec::new();
    let mut rest = s.trim_start();

    while !rest.is_empty() {
        let eq = rest.find('=').ok_or_else(|| {
            CmlError::syntax(line, format!("attribute without value near '{rest}'"))
        })?;
        let name = rest[..eq].trim_end();
        if name.is_empty() || name.contains(char::is_whitespace) {
            return Err(CmlError::syntax(line, format!("bad attribute name '{name}'")));
        }
        let value_part = rest[eq + 1..].trim_start();
        let quote = value_part
            .chars()
            .next()
            .filter(|c| *c == '"' || *c == '\'')
            .ok_or_else(|| CmlError::syntax(line, format!("unquoted value for '{name}'")))?;
        let close = value_part[1..]
            .find(quote)
            .ok_or_else(|| CmlError::syntax(line, format!("unterminated value for '{name}'")))?;
        let raw = &value_part[1..1 + close];
        attrs.push((name, decode_entities(raw, line)?));
        rest = value_part[close + 2..].trim_start();
    }

    Ok(attrs)
}

fn decode_entities(raw: &str, line: usize) -> Result<String, CmlError> {
    if !raw.contains('&') {
        return Ok(raw.to_string());
    }
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let semi = rest[amp..]
            .find(';')
            .ok_or_else(|| CmlError::syntax(line, "unterminated entity"))?;
        let entity = &rest[amp + 1..amp + semi];
        let ch = match entity {
            "lt" => Some('<'),
            "gt" => Some('>'),
            "amp" => Some('&'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            _ => entity
                .strip_prefix("#x")
                .map(|hex| u32::from_str_radix(hex, 16).ok())
                .unwrap_or_else(|| entity.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                .and_then(char::from_u32),
        };
        let ch = ch.ok_or_else(|| CmlError::syntax(line, format!("unknown entity '&{entity};'")))?;
        out.push(ch);
        rest = &rest[amp + semi + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start<'a>(tag: &'a Tag<'a>) -> &'a StartTag<'a> {
        match tag {
            Tag::Start(s) => s,
            other => panic!("expected start tag, got {other:?}"),
        }
    }

    #[test]
    fn start_and_end_tags() {
        let tags = tokenize("<cml><molecule id=\"m1\"></molecule></cml>").unwrap();
        assert_eq!(tags.len(), 4);
        assert_eq!(start(&tags[0]).name, "cml");
        assert_eq!(start(&tags[1]).attr("id"), Some("m1"));
        assert_eq!(tags[2], Tag::End { name: "molecule", line: 1 });
    }

    #[test]
    fn self_closing_tag() {
        let tags = tokenize("<atom id='a1' elementType='C'/>").unwrap();
        let atom = start(&tags[0]);
        assert!(atom.empty);
        assert_eq!(atom.attr("id"), Some("a1"));
        assert_eq!(atom.attr("elementType"), Some("C"));
    }

    #[test]
    fn self_closing_without_attributes() {
        let tags = tokenize("<bondArray/>").unwrap();
        assert!(start(&tags[0]).empty);
        assert_eq!(start(&tags[0]).name, "bondArray");
    }

    #[test]
    fn skips_prolog_comments_and_text() {
        let doc = "<?xml version=\"1.0\"?>\n<!DOCTYPE cml>\n<!-- <atom id=\"x\"/> -->\n<cml>text<![CDATA[<a>]]></cml>";
        let tags = tokenize(doc).unwrap();
        assert_eq!(tags.len(), 2);
        assert_eq!(start(&tags[0]).line, 4);
    }

    #[test]
    fn doctype_with_internal_subset() {
        let doc = "<!DOCTYPE cml [\n  <!ENTITY ns \"http://www.xml-cml.org/schema\">\n  <!ELEMENT cml ANY>\n]>\n<cml><atom id=\"a1\"/></cml>";
        let tags = tokenize(doc).unwrap();
        assert_eq!(tags.len(), 3);
        assert_eq!(start(&tags[0]).name, "cml");
        assert_eq!(start(&tags[0]).line, 5);
        assert_eq!(start(&tags[1]).attr("id"), Some("a1"));
    }

    #[test]
    fn unterminated_doctype_is_error() {
        assert!(matches!(
            tokenize("<!DOCTYPE cml [ <!ELEMENT cml ANY>"),
            Err(CmlError::Syntax { line: 1, .. })
        ));
    }

    #[test]
    fn quoted_gt_inside_attribute() {
        let tags = tokenize("<atom title=\"a>b\" id=\"a1\"/>").unwrap();
        assert_eq!(start(&tags[0]).attr("title"), Some("a>b"));
        assert_eq!(start(&tags[0]).attr("id"), Some("a1"));
    }

    #[test]
    fn spaces_around_equals() {
        let tags = tokenize("<bond order = \"2\"\n   atomRefs2=\"a1 a2\"/>").unwrap();
        assert_eq!(start(&tags[0]).attr("order"), Some("2"));
        assert_eq!(start(&tags[0]).attr("atomRefs2"), Some("a1 a2"));
    }

    #[test]
    fn decodes_entities() {
        let tags = tokenize("<m title=\"a &amp; b &lt;&#65;&#x42;&gt;\"/>").unwrap();
        assert_eq!(start(&tags[0]).attr("title"), Some("a & b <AB>"));
    }

    #[test]
    fn namespace_prefix_stripped() {
        assert_eq!(local_name("cml:atom"), "atom");
        assert_eq!(local_name("atom"), "atom");
    }

    #[test]
    fn unterminated_tag_is_error() {
        assert!(matches!(
            tokenize("<cml>\n<atom id=\"a1\""),
            Err(CmlError::Syntax { line: 2, .. })
        ));
    }

    #[test]
    fn unquoted_attribute_is_error() {
        assert!(matches!(tokenize("<atom id=a1/>"), Err(CmlError::Syntax { .. })));
    }

    #[test]
    fn unknown_entity_is_error() {
        assert!(matches!(
            tokenize("<atom id=\"&bogus;\"/>"),
            Err(CmlError::Syntax { .. })
        ));
    }

    #[test]
    fn unterminated_comment_is_error() {
        assert!(matches!(tokenize("<!-- never closed"), Err(CmlError::Syntax { .. })));
    }
}
