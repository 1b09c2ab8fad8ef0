use core::fmt;
use serde::{Deserialize, Serialize};

/// One hidden attribute of an opponent configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum AttributeKind {
    Ability = 0,
    Item = 1,
    Moves = 2,
    Spread = 3,
    Tera = 4,
}

impl AttributeKind {
    pub const ALL: [AttributeKind; 5] = [
        AttributeKind::Ability,
        AttributeKind::Item,
        AttributeKind::Moves,
        AttributeKind::Spread,
        AttributeKind::Tera,
    ];

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(AttributeKind::Ability),
            1 => Some(AttributeKind::Item),
            2 => Some(AttributeKind::Moves),
            3 => Some(AttributeKind::Spread),
            4 => Some(AttributeKind::Tera),
            _ => None,
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    /// Attributes holding exactly one value; the move attribute holds up to four.
    pub const fn is_single_valued(self) -> bool {
        !matches!(self, AttributeKind::Moves)
    }

    pub const fn label(self) -> &'static str {
        match self {
            AttributeKind::Ability => "ability",
            AttributeKind::Item => "item",
            AttributeKind::Moves => "moves",
            AttributeKind::Spread => "spread",
            AttributeKind::Tera => "tera",
        }
    }
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::AttributeKind;

    #[test]
    fn display_uses_snake_case_labels() {
        assert_eq!(AttributeKind::Moves.to_string(), "moves");
        assert_eq!(AttributeKind::Tera.to_string(), "tera");
    }

    #[test]
    fn from_index_round_trips_all() {
        for kind in AttributeKind::ALL {
            assert_eq!(AttributeKind::from_index(kind.index()), Some(kind));
        }
        assert_eq!(AttributeKind::from_index(5), None);
    }

    #[test]
    fn only_moves_are_multi_valued() {
        let multi: Vec<_> = AttributeKind::ALL
            .iter()
            .filter(|kind| !kind.is_single_valued())
            .collect();
        assert_eq!(multi, vec![&AttributeKind::Moves]);
    }
}
