use std::borrow::Cow;

const NO_BREAK_SPACE: char = '\u{00a0}';

/// Which whitespace variants get folded to a plain ASCII space.
///
/// The exported statute pages pad their text with non-breaking spaces, and some of them also
/// carry literal tabs. Non-breaking spaces are always folded; tabs only under `Normalize`.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum TabPolicy {
    #[default]
    Normalize,
    Keep,
}

impl TabPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normalize => "normalize",
            Self::Keep => "keep",
        }
    }

    fn folds(self, ch: char) -> bool {
        match self {
            Self::Normalize => ch == NO_BREAK_SPACE || ch == '\t',
            Self::Keep => ch == NO_BREAK_SPACE,
        }
    }
}

pub fn normalize_space(text: &str, policy: TabPolicy) -> Cow<'_, str> {
    if !text.chars().any(|ch| policy.folds(ch)) {
        return Cow::Borrowed(text);
    }

    Cow::Owned(
        text.chars()
            .map(|ch| if policy.folds(ch) { ' ' } else { ch })
            .collect(),
    )
}

/// Normalized text with leading whitespace removed, as used for marker matching.
pub fn normalize_leading(text: &str, policy: TabPolicy) -> String {
    normalize_space(text, policy).trim_start().to_string()
}
