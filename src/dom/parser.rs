use crate::dom::document::{Document, Element, NodeId};
use crate::error::PanelError;

/// Elements that never have children or an end tag.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose body is kept verbatim instead of parsed.
pub const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "template"];

/// Parse server-rendered markup into detached nodes of `doc`.
///
/// Lenient where browsers are lenient (stray end tags are dropped, open
/// elements are closed at end of input) and strict where the markup is
/// unusable (unterminated tags, comments or quoted attribute values).
pub fn parse_fragment(doc: &mut Document, html: &str) -> Result<Vec<NodeId>, PanelError> {
    let mut parser = FragmentParser { src: html, pos: 0 };
    let mut top: Vec<NodeId> = Vec::new();
    let mut open: Vec<(String, NodeId)> = Vec::new();

    while parser.pos < html.len() {
        let rest = parser.rest();

        if rest.starts_with("<!--") {
            let body_start = parser.pos + 4;
            let end = html[body_start..]
                .find("-->")
                .ok_or_else(|| parser.error("unterminated comment"))?;
            let node = doc.create_comment(&html[body_start..body_start + end]);
            attach(doc, &open, &mut top, node);
            parser.pos = body_start + end + 3;
        } else if rest.starts_with("</") {
            let end = rest.find('>').ok_or_else(|| parser.error("unterminated end tag"))?;
            let name = rest[2..end].trim().to_ascii_lowercase();
            if let Some(i) = open.iter().rposition(|(tag, _)| *tag == name) {
                open.truncate(i);
            }
            parser.pos += end + 1;
        } else if rest.starts_with("<!") || rest.starts_with("<?") {
            let end = rest.find('>').ok_or_else(|| parser.error("unterminated declaration"))?;
            parser.pos += end + 1;
        } else if starts_tag(rest) {
            let (element, self_closing) = parser.start_tag()?;
            let tag = element.tag.clone();
            let node = doc.create_element(element);
            attach(doc, &open, &mut top, node);

            if VOID_ELEMENTS.contains(&tag.as_str()) || self_closing {
                continue;
            }
            if RAW_TEXT_ELEMENTS.contains(&tag.as_str()) {
                let body = parser.raw_body(&tag)?;
                if let Some(el) = doc.element_mut(node) {
                    el.raw = Some(body);
                }
            } else if tag == "textarea" {
                let body = parser.raw_body(&tag)?;
                let text = doc.create_text(&decode_entities(&body));
                doc.append_child(node, text);
            } else {
                open.push((tag, node));
            }
        } else {
            let len = text_run_len(rest);
            let node = doc.create_text(&decode_entities(&rest[..len]));
            attach(doc, &open, &mut top, node);
            parser.pos += len;
        }
    }

    Ok(top)
}

fn attach(doc: &mut Document, open: &[(String, NodeId)], top: &mut Vec<NodeId>, node: NodeId) {
    match open.last() {
        Some((_, parent)) => doc.append_child(*parent, node),
        None => top.push(node),
    }
}

fn starts_tag(s: &str) -> bool {
    let mut chars = s.chars();
    chars.next() == Some('<') && chars.next().is_some_and(|c| c.is_ascii_alphabetic())
}

/// Length of the text run at the start of `s`: up to the next `<` that opens
/// markup. A lone `<` that opens nothing is kept as text.
fn text_run_len(s: &str) -> usize {
    let mut offset = 0;
    loop {
        let search_from = if offset == 0 && s.starts_with('<') { 1 } else { offset };
        match s[search_from..].find('<') {
            Some(i) => {
                let at = search_from + i;
                let tail = &s[at..];
                if starts_tag(tail) || tail.starts_with("</") || tail.starts_with("<!") || tail.starts_with("<?") {
                    return at;
                }
                offset = at + 1;
            }
            None => return s.len(),
        }
    }
}

struct FragmentParser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> FragmentParser<'a> {
    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn error(&self, message: &str) -> PanelError {
        PanelError::Markup {
            offset: self.pos,
            message: message.to_string(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(&pred) {
            self.bump();
        }
        &self.src[start..self.pos]
    }

    /// Parse `<tag attr=...>` starting at `<`. Returns the element and whether
    /// it was written self-closing.
    fn start_tag(&mut self) -> Result<(Element, bool), PanelError> {
        let tag_start = self.pos;
        self.bump();
        let name = self.take_while(|c| c.is_ascii_alphanumeric() || c == '-' || c == ':');
        let mut element = Element::new(name);

        loop {
            self.skip_whitespace();
            match self.peek() {
                None => {
                    return Err(PanelError::Markup {
                        offset: tag_start,
                        message: format!("unterminated <{}> tag", element.tag),
                    });
                }
                Some('>') => {
                    self.bump();
                    return Ok((element, false));
                }
                Some('/') => {
                    self.bump();
                    if self.peek() == Some('>') {
                        self.bump();
                        return Ok((element, true));
                    }
                }
                Some(_) => {
                    let attr_name = self
                        .take_while(|c| !c.is_whitespace() && c != '=' && c != '>' && c != '/')
                        .to_ascii_lowercase();
                    if attr_name.is_empty() {
                        return Err(self.error("empty attribute name"));
                    }
                    self.skip_whitespace();
                    let value = if self.peek() == Some('=') {
                        self.bump();
                        self.skip_whitespace();
                        self.attribute_value()?
                    } else {
                        String::new()
                    };
                    if !element.has_attr(&attr_name) {
                        element.set_attr(&attr_name, &value);
                    }
                }
            }
        }
    }

    fn attribute_value(&mut self) -> Result<String, PanelError> {
        match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                let open_at = self.pos;
                self.bump();
                let value = self.take_while(|c| c != quote);
                if self.bump() != Some(quote) {
                    return Err(PanelError::Markup {
                        offset: open_at,
                        message: "unterminated attribute value".to_string(),
                    });
                }
                Ok(decode_entities(value))
            }
            _ => {
                let value = self.take_while(|c| !c.is_whitespace() && c != '>');
                Ok(decode_entities(value))
            }
        }
    }

    /// Consume everything up to the matching `</tag>` and return it verbatim.
    fn raw_body(&mut self, tag: &str) -> Result<String, PanelError> {
        let close = format!("</{}", tag);
        let lowered = self.rest().to_ascii_lowercase();
        let end = lowered
            .find(&close)
            .ok_or_else(|| self.error(&format!("missing </{}>", tag)))?;
        let body = self.rest()[..end].to_string();
        let after_close = &lowered[end..];
        let gt = after_close
            .find('>')
            .ok_or_else(|| self.error(&format!("unterminated </{}>", tag)))?;
        self.pos += end + gt + 1;
        Ok(body)
    }
}

/// Decode the character references server templates emit.
pub fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail
            .find(';')
            .filter(|semi| *semi <= 10)
            .and_then(|semi| decode_reference(&tail[1..semi]).map(|c| (c, semi)));
        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &tail[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_reference(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        "times" => Some('\u{d7}'),
        _ => {
            let digits = name.strip_prefix('#')?;
            let code = match digits.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => digits.parse::<u32>().ok()?,
            };
            char::from_u32(code)
        }
    }
}
