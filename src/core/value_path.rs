use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

/// Address of a slot inside a [`Value`](crate::core::value::Value) tree.
/// Keys render as `.key`, indices as `[3]`; the root is the empty path, so
/// every non-root path starts with `.` or `[`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ValuePath {
    segments: Vec<PathSegment>,
}

impl ValuePath {
    pub fn new(segments: Vec<PathSegment>) -> Self {
        Self { segments }
    }

    pub fn root() -> Self {
        Self::default()
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[PathSegment] {
        self.segments.as_slice()
    }

    pub fn child_key(&self, key: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Key(key.into()));
        Self { segments }
    }

    pub fn child_index(&self, index: usize) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Index(index));
        Self { segments }
    }

    pub fn parse(input: &str) -> Result<Self, ValuePathParseError> {
        let raw = input.trim();
        if raw.is_empty() {
            return Ok(Self::root());
        }

        let chars: Vec<char> = raw.chars().collect();
        let mut idx = 0usize;
        let mut out = Vec::<PathSegment>::new();

        while idx < chars.len() {
            let ch = chars[idx];
            if ch == '.' {
                idx += 1;
                let key = parse_key(&chars, &mut idx)?;
                out.push(PathSegment::Key(key));
                continue;
            }

            if ch == '[' {
                let index = parse_index(&chars, &mut idx)?;
                out.push(PathSegment::Index(index));
                continue;
            }

            // A bare leading key is tolerated so plain dotted traversal
            // strings address the same slots as normalized paths.
            if out.is_empty() {
                let key = parse_key(&chars, &mut idx)?;
                out.push(PathSegment::Key(key));
                continue;
            }

            return Err(ValuePathParseError::new(format!(
                "unexpected character '{}' at position {}",
                ch, idx
            )));
        }

        Ok(Self::new(out))
    }
}

impl fmt::Display for ValuePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            match segment {
                PathSegment::Key(key) => {
                    f.write_str(".")?;
                    f.write_str(key)?;
                }
                PathSegment::Index(index) => {
                    write!(f, "[{index}]")?;
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValuePathParseError {
    message: String,
}

impl ValuePathParseError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for ValuePathParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message.as_str())
    }
}

impl std::error::Error for ValuePathParseError {}

fn parse_key(chars: &[char], idx: &mut usize) -> Result<String, ValuePathParseError> {
    let start = *idx;
    while *idx < chars.len() {
        let ch = chars[*idx];
        if ch == '.' || ch == '[' || ch == ']' {
            break;
        }
        *idx += 1;
    }
    if *idx == start {
        return Err(ValuePathParseError::new(format!(
            "expected key at position {}",
            start
        )));
    }
    Ok(chars[start..*idx].iter().collect::<String>())
}

fn parse_index(chars: &[char], idx: &mut usize) -> Result<usize, ValuePathParseError> {
    // caller guarantees chars[*idx] == '['
    *idx += 1;
    let start = *idx;
    while *idx < chars.len() && chars[*idx] != ']' {
        *idx += 1;
    }
    if *idx >= chars.len() {
        return Err(ValuePathParseError::new("unterminated '[' segment"));
    }
    let raw = chars[start..*idx].iter().collect::<String>();
    *idx += 1;
    raw.trim()
        .parse::<usize>()
        .map_err(|_| ValuePathParseError::new(format!("invalid array index '{}'", raw.trim())))
}
