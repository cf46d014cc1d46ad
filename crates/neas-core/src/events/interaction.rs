//! User-interaction signals that count as activity.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The fixed set of interaction signals that keep a session alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionKind {
    /// Pointer (mouse) button pressed.
    #[serde(rename = "mousedown")]
    PointerDown,
    /// Key pressed.
    #[serde(rename = "keydown")]
    KeyDown,
    /// Content scrolled.
    Scroll,
    /// Touch started.
    #[serde(rename = "touchstart")]
    TouchStart,
}

impl InteractionKind {
    /// Every interaction kind, in listener attachment order.
    pub const ALL: [InteractionKind; 4] = [
        Self::PointerDown,
        Self::KeyDown,
        Self::Scroll,
        Self::TouchStart,
    ];

    /// Position of this kind within [`InteractionKind::ALL`].
    pub fn index(self) -> usize {
        match self {
            Self::PointerDown => 0,
            Self::KeyDown => 1,
            Self::Scroll => 2,
            Self::TouchStart => 3,
        }
    }

    /// The DOM event name this kind corresponds to.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PointerDown => "mousedown",
            Self::KeyDown => "keydown",
            Self::Scroll => "scroll",
            Self::TouchStart => "touchstart",
        }
    }
}

impl fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_matches_all_order() {
        for (i, kind) in InteractionKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }

    #[test]
    fn test_serde_uses_dom_names() {
        let json = serde_json::to_string(&InteractionKind::PointerDown).unwrap();
        assert_eq!(json, "\"mousedown\"");
        let kind: InteractionKind = serde_json::from_str("\"touchstart\"").unwrap();
        assert_eq!(kind, InteractionKind::TouchStart);
    }
}
