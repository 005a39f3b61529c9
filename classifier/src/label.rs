use std::fmt;

use serde::{Deserialize, Serialize};

/// Ground truth / verdict for a voice clip.
///
/// The numeric value is the class index used by the classifier:
/// `0 = REAL`, `1 = FAKE`. Dataset assembly and result formatting both go
/// through this type rather than through raw integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Label {
    /// Genuine human speech.
    Real = 0,
    /// Synthetically generated speech.
    Fake = 1,
}

impl Label {
    pub const ALL: [Label; 2] = [Label::Real, Label::Fake];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Label::Real),
            1 => Some(Label::Fake),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Label::Real => "REAL",
            Label::Fake => "FAKE",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_index() {
        assert_eq!(Label::Real.index(), 0);
        assert_eq!(Label::Fake.index(), 1);
        assert_eq!(Label::from_index(1), Some(Label::Fake));
        assert_eq!(Label::from_index(2), None);
    }

    #[test]
    fn label_display_and_serde() {
        assert_eq!(Label::Fake.to_string(), "FAKE");
        assert_eq!(serde_json::to_string(&Label::Real).unwrap(), "\"REAL\"");
        let l: Label = serde_json::from_str("\"FAKE\"").unwrap();
        assert_eq!(l, Label::Fake);
    }
}
