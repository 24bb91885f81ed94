#![forbid(unsafe_code)]

//! Colour-code tables and the token-to-span translator.
//!
//! The backend decorates text with terminal styling tokens. A
//! [`ColourTable`] maps each token literal to a symbolic name, and
//! [`ColourTable::translate`] rewrites the tokens into
//! `<span class="colour-code-<name>">` openers.
//!
//! # Span layout
//!
//! Openers are written where the tokens were; the matching `</span>` closers
//! are all appended at the end of the line, one per replacement. Codes are
//! processed in table order, every occurrence of one code before the next,
//! so the result for `"[31mHello[0m"` with the bracket table is:
//!
//! ```text
//! <span class="colour-code-red">Hello<span class="colour-code-reset"></span></span>
//! ```
//!
//! Text between tokens is copied verbatim (no HTML escaping). Use
//! [`crate::sgr::SgrConverter`] for an escaping, state-tracking conversion of
//! real ANSI sequences.

use crate::error::ColourTableError;

/// Class prefix shared by every generated span.
pub const CLASS_PREFIX: &str = "colour-code-";

const CLOSE_TAG: &str = "</span>";
const ESC: char = '\u{1b}';

/// Names and SGR parameters of the built-in codes, in table order.
const BUILTIN_CODES: [(&str, &str); 17] = [
    ("BLACK", "30"),
    ("RED", "31"),
    ("GREEN", "32"),
    ("YELLOW", "33"),
    ("BLUE", "34"),
    ("MAGENTA", "35"),
    ("CYAN", "36"),
    ("WHITE", "37"),
    ("GREY", "90"),
    ("BOLD", "1"),
    ("DIM", "2"),
    ("ITALIC", "3"),
    ("UNDERLINE", "4"),
    ("BLINK", "5"),
    ("INVERT", "7"),
    ("STRIKETHROUGH", "9"),
    ("RESET", "0"),
];

/// Which built-in literal set a table uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "snake_case"))]
pub enum TableKind {
    /// Bare bracket codes such as `[31m` (the escape byte already stripped).
    #[default]
    Bracket,
    /// Full ANSI sequences such as `ESC[31m`.
    Escape,
}

/// Semantic colour roles used by the quiz renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThemeRole {
    Error,
    Info,
    Success,
    Warning,
}

impl ThemeRole {
    /// Name of the code this role renders with.
    #[must_use]
    pub const fn code_name(self) -> &'static str {
        match self {
            Self::Error => "RED",
            Self::Info => "BLUE",
            Self::Success => "GREEN",
            Self::Warning => "YELLOW",
        }
    }
}

/// One table entry: a symbolic name and the literal it stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColourCode {
    name: Box<str>,
    literal: Box<str>,
    open_tag: Box<str>,
}

impl ColourCode {
    fn new(name: &str, literal: &str) -> Self {
        let open_tag = format!(
            "<span class=\"{CLASS_PREFIX}{}\">",
            name.to_ascii_lowercase()
        );
        Self {
            name: name.into(),
            literal: literal.into(),
            open_tag: open_tag.into(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn literal(&self) -> &str {
        &self.literal
    }

    /// The `<span class="colour-code-…">` opener this code translates to.
    #[must_use]
    pub fn open_tag(&self) -> &str {
        &self.open_tag
    }
}

/// Ordered, validated mapping from code names to token literals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColourTable {
    codes: Vec<ColourCode>,
}

impl ColourTable {
    /// Build a custom table. Entry order is the translation order.
    ///
    /// # Errors
    ///
    /// Rejects empty tables, empty literals, names that cannot be used as a
    /// class suffix, duplicate names, literals that occur inside another
    /// literal, and literals that could match generated markup.
    pub fn new<N, L>(entries: impl IntoIterator<Item = (N, L)>) -> Result<Self, ColourTableError>
    where
        N: AsRef<str>,
        L: AsRef<str>,
    {
        let mut codes: Vec<ColourCode> = Vec::new();
        for (name, literal) in entries {
            let (name, literal) = (name.as_ref(), literal.as_ref());
            if !is_class_suffix(name) {
                return Err(ColourTableError::InvalidName { name: name.into() });
            }
            if literal.is_empty() {
                return Err(ColourTableError::EmptyLiteral { name: name.into() });
            }
            if codes.iter().any(|c| c.name.eq_ignore_ascii_case(name)) {
                return Err(ColourTableError::DuplicateName { name: name.into() });
            }
            for existing in &codes {
                if existing.literal.contains(literal) {
                    return Err(ColourTableError::OverlappingLiterals {
                        outer: existing.name.to_string(),
                        inner: name.into(),
                    });
                }
                if literal.contains(&*existing.literal) {
                    return Err(ColourTableError::OverlappingLiterals {
                        outer: name.into(),
                        inner: existing.name.to_string(),
                    });
                }
            }
            codes.push(ColourCode::new(name, literal));
        }
        if codes.is_empty() {
            return Err(ColourTableError::Empty);
        }
        if let Some(code) = codes.iter().find(|c| literal_in_markup(&c.literal, &codes)) {
            return Err(ColourTableError::LiteralInMarkup {
                name: code.name.to_string(),
            });
        }
        Ok(Self { codes })
    }

    /// Bracket codes (`[31m`), as emitted once the escape byte is lost.
    #[must_use]
    pub fn bracket() -> Self {
        Self::builtin(|param| format!("[{param}m"))
    }

    /// Real ANSI sequences (`ESC[31m`).
    #[must_use]
    pub fn escape() -> Self {
        Self::builtin(|param| format!("{ESC}[{param}m"))
    }

    /// The built-in table for `kind`.
    #[must_use]
    pub fn from_kind(kind: TableKind) -> Self {
        match kind {
            TableKind::Bracket => Self::bracket(),
            TableKind::Escape => Self::escape(),
        }
    }

    fn builtin(literal: impl Fn(&str) -> String) -> Self {
        let codes = BUILTIN_CODES
            .iter()
            .map(|(name, param)| ColourCode::new(name, &literal(param)))
            .collect();
        Self { codes }
    }

    /// Codes in translation order.
    pub fn iter(&self) -> impl Iterator<Item = &ColourCode> {
        self.codes.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Look a code up by name, ignoring ASCII case.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ColourCode> {
        self.codes.iter().find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Rewrite every token into a span opener and append one closer per
    /// replacement at the end of the text.
    ///
    /// Scanning resumes after each inserted opener and never looks at the
    /// appended closers, so a literal that happens to occur in the generated
    /// markup cannot cause runaway replacement.
    #[must_use]
    pub fn translate(&self, text: &str) -> String {
        let mut body = text.to_owned();
        let mut replaced = 0usize;

        for code in &self.codes {
            let mut cursor = 0;
            while let Some(found) = body[cursor..].find(code.literal()) {
                let start = cursor + found;
                body.replace_range(start..start + code.literal.len(), code.open_tag());
                cursor = start + code.open_tag.len();
                replaced += 1;
            }
        }

        if replaced > 0 {
            body.reserve(replaced * CLOSE_TAG.len());
            for _ in 0..replaced {
                body.push_str(CLOSE_TAG);
            }
        }
        body
    }

    /// Remove every token, leaving the visible text (useful for measuring
    /// display width).
    #[must_use]
    pub fn strip(&self, text: &str) -> String {
        self.codes
            .iter()
            .fold(text.to_owned(), |acc, code| acc.replace(code.literal(), ""))
    }

    /// Wrap `text` in the named code followed by `RESET`.
    ///
    /// Returns `None` when the table lacks either code.
    #[must_use]
    pub fn with_colour(&self, text: &str, name: &str) -> Option<String> {
        let code = self.get(name)?;
        let reset = self.get("RESET")?;
        Some(format!("{}{text}{}", code.literal(), reset.literal()))
    }

    /// Wrap `text` in the code for a semantic role.
    #[must_use]
    pub fn themed(&self, text: &str, role: ThemeRole) -> Option<String> {
        self.with_colour(text, role.code_name())
    }

    /// `True/False` with each word in its success/error colour.
    #[must_use]
    pub fn true_or_false_styled(&self) -> Option<String> {
        Some(format!(
            "{}/{}",
            self.themed("True", ThemeRole::Success)?,
            self.themed("False", ThemeRole::Error)?
        ))
    }
}

impl Default for ColourTable {
    fn default() -> Self {
        Self::bracket()
    }
}

/// Whether `literal` could be found in a translation's output outside the
/// text it was written for: inside an opener or closer, or straddling a tag
/// edge. Every tag starts with `<` and ends with `>`, so a literal free of
/// both can only match wholly inside one tag.
fn literal_in_markup(literal: &str, codes: &[ColourCode]) -> bool {
    literal.contains(['<', '>'])
        || CLOSE_TAG.contains(literal)
        || codes.iter().any(|c| c.open_tag.contains(literal))
}

fn is_class_suffix(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}
