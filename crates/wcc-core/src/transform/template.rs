/// An output selector, possibly holding `\N` placeholders that are filled
/// from the capture groups of a `$from` regex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorTemplate {
    Literal(String),
    Parameterized(Vec<Segment>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Capture(usize),
}

impl SelectorTemplate {
    pub fn parse(source: &str) -> Self {
        let mut segments = Vec::new();
        let mut text = String::new();
        let mut chars = source.char_indices().peekable();

        while let Some((i, ch)) = chars.next() {
            let digits_start = i + ch.len_utf8();
            if ch == '\\' && chars.peek().is_some_and(|(_, next)| next.is_ascii_digit()) {
                let mut end = digits_start;
                while let Some(&(j, d)) = chars.peek() {
                    if !d.is_ascii_digit() {
                        break;
                    }
                    end = j + 1;
                    chars.next();
                }
                if let Ok(group) = source[digits_start..end].parse::<usize>() {
                    if !text.is_empty() {
                        segments.push(Segment::Text(std::mem::take(&mut text)));
                    }
                    segments.push(Segment::Capture(group));
                    continue;
                }
                text.push_str(&source[i..end]);
                continue;
            }
            text.push(ch);
        }

        if segments.is_empty() {
            return Self::Literal(text);
        }
        if !text.is_empty() {
            segments.push(Segment::Text(text));
        }
        Self::Parameterized(segments)
    }

    pub fn is_parameterized(&self) -> bool {
        matches!(self, Self::Parameterized(_))
    }

    /// Highest capture group the template refers to.
    pub fn max_capture(&self) -> Option<usize> {
        match self {
            Self::Literal(_) => None,
            Self::Parameterized(segments) => segments
                .iter()
                .filter_map(|segment| match segment {
                    Segment::Capture(n) => Some(*n),
                    Segment::Text(_) => None,
                })
                .max(),
        }
    }

    /// Fill placeholders from `groups` (index 0 is the whole match). Groups
    /// that did not participate render as empty text.
    pub fn render(&self, groups: &[Option<String>]) -> String {
        match self {
            Self::Literal(text) => text.clone(),
            Self::Parameterized(segments) => segments
                .iter()
                .map(|segment| match segment {
                    Segment::Text(text) => text.as_str(),
                    Segment::Capture(n) => groups
                        .get(*n)
                        .and_then(|g| g.as_deref())
                        .unwrap_or(""),
                })
                .collect(),
        }
    }
}
