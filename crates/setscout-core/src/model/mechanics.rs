//! Static game knowledge the inference rules key off.
//!
//! Lookups go through [`to_id`] so display-name formatting never matters.

use super::names::to_id;
use super::observation::StatusKind;

pub const BOOSTER_ENERGY: &str = "Booster Energy";

/// Bit-mask of mechanical classes an item belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ItemTraits(u16);

impl ItemTraits {
    pub const EMPTY: Self = Self(0);
    /// Locks the holder into the first move it selects.
    pub const CHOICE_LOCK: Self = Self(1 << 0);
    /// Restores HP at the end of every turn.
    pub const PASSIVE_HEAL: Self = Self(1 << 1);
    /// Ignores entry hazards on switch-in.
    pub const HAZARD_IMMUNITY: Self = Self(1 << 2);
    /// Grants Ground immunity and pops, announced, on the first hit.
    pub const AIR_BALLOON: Self = Self(1 << 3);
    /// Halves one super-effective hit and is consumed, announced.
    pub const RESIST_BERRY: Self = Self(1 << 4);
    /// Raises Speed.
    pub const SPEED_BOOST: Self = Self(1 << 5);
    /// Makes multi-hit moves land four or five times.
    pub const MULTI_HIT: Self = Self(1 << 6);
    /// Inflicts a status on the holder at end of turn.
    pub const STATUS_ORB: Self = Self(1 << 7);
    /// Activates Protosynthesis or Quark Drive.
    pub const BOOSTER: Self = Self(1 << 8);

    pub fn contains(self, other: ItemTraits) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }

    pub fn intersects(self, other: ItemTraits) -> bool {
        self.0 & other.0 != 0
    }

    pub fn with(mut self, other: ItemTraits) -> Self {
        self.0 |= other.0;
        self
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// Bit-mask of status conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StatusMask(u8);

impl StatusMask {
    pub const EMPTY: Self = Self(0);

    pub fn contains(self, status: StatusKind) -> bool {
        let bit = 1 << status as u8;
        self.0 & bit != 0
    }

    pub fn with(mut self, status: StatusKind) -> Self {
        let bit = 1 << status as u8;
        self.0 |= bit;
        self
    }

    pub fn of(statuses: &[StatusKind]) -> Self {
        statuses
            .iter()
            .fold(Self::EMPTY, |mask, status| mask.with(*status))
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// Mechanical classes of `item`.
pub fn item_traits(item: &str) -> ItemTraits {
    match to_id(item).as_str() {
        "choiceband" | "choicespecs" => ItemTraits::CHOICE_LOCK,
        "choicescarf" => ItemTraits::CHOICE_LOCK.with(ItemTraits::SPEED_BOOST),
        "leftovers" | "blacksludge" => ItemTraits::PASSIVE_HEAL,
        "heavydutyboots" => ItemTraits::HAZARD_IMMUNITY,
        "airballoon" => ItemTraits::AIR_BALLOON,
        "loadeddice" => ItemTraits::MULTI_HIT,
        "flameorb" | "toxicorb" => ItemTraits::STATUS_ORB,
        "boosterenergy" => ItemTraits::BOOSTER,
        "quickclaw" => ItemTraits::SPEED_BOOST,
        "occaberry" | "passhoberry" | "wacanberry" | "rindoberry" | "yacheberry"
        | "chopleberry" | "kebiaberry" | "shucaberry" | "cobaberry" | "payapaberry"
        | "tangaberry" | "chartiberry" | "kasibberry" | "habanberry" | "colburberry"
        | "babiriberry" | "roseliberry" => ItemTraits::RESIST_BERRY,
        _ => ItemTraits::EMPTY,
    }
}

/// Moves that deal no direct damage. Unknown moves count as damaging.
pub fn is_status_move(name: &str) -> bool {
    matches!(
        to_id(name).as_str(),
        "swordsdance"
            | "nastyplot"
            | "dragondance"
            | "calmmind"
            | "bulkup"
            | "quiverdance"
            | "shellsmash"
            | "agility"
            | "irondefense"
            | "amnesia"
            | "shiftgear"
            | "tidyup"
            | "victorydance"
            | "coil"
            | "curse"
            | "bellydrum"
            | "growth"
            | "protect"
            | "detect"
            | "kingsshield"
            | "spikyshield"
            | "banefulbunker"
            | "silktrap"
            | "substitute"
            | "recover"
            | "roost"
            | "slackoff"
            | "softboiled"
            | "moonlight"
            | "morningsun"
            | "synthesis"
            | "shoreup"
            | "wish"
            | "rest"
            | "painsplit"
            | "strengthsap"
            | "leechseed"
            | "stealthrock"
            | "spikes"
            | "toxicspikes"
            | "stickyweb"
            | "defog"
            | "courtchange"
            | "willowisp"
            | "toxic"
            | "thunderwave"
            | "glare"
            | "spore"
            | "sleeppowder"
            | "yawn"
            | "encore"
            | "taunt"
            | "haze"
            | "whirlwind"
            | "roar"
            | "teleport"
            | "partingshot"
            | "healbell"
            | "aromatherapy"
            | "trickroom"
            | "tailwind"
            | "reflect"
            | "lightscreen"
            | "auroraveil"
            | "raindance"
            | "sunnyday"
            | "sandstorm"
            | "snowscape"
            | "chillyreception"
            | "shedtail"
            | "filletaway"
            | "destinybond"
            | "memento"
            | "healingwish"
            | "lunardance"
            | "revivalblessing"
            | "trick"
            | "switcheroo"
    )
}

/// The berry that weakens one super-effective hit of `move_type`.
pub fn resist_berry(move_type: &str) -> Option<&'static str> {
    let berry = match to_id(move_type).as_str() {
        "fire" => "Occa Berry",
        "water" => "Passho Berry",
        "electric" => "Wacan Berry",
        "grass" => "Rindo Berry",
        "ice" => "Yache Berry",
        "fighting" => "Chople Berry",
        "poison" => "Kebia Berry",
        "ground" => "Shuca Berry",
        "flying" => "Coba Berry",
        "psychic" => "Payapa Berry",
        "bug" => "Tanga Berry",
        "rock" => "Charti Berry",
        "ghost" => "Kasib Berry",
        "dragon" => "Haban Berry",
        "dark" => "Colbur Berry",
        "steel" => "Babiri Berry",
        "fairy" => "Roseli Berry",
        _ => return None,
    };
    Some(berry)
}

/// Statuses `item` inflicts on its holder.
pub fn induced_status(item: &str) -> StatusMask {
    match to_id(item).as_str() {
        "flameorb" => StatusMask::of(&[StatusKind::Burn]),
        "toxicorb" => StatusMask::of(&[StatusKind::Poison, StatusKind::Toxic]),
        _ => StatusMask::EMPTY,
    }
}

/// Statuses `ability` turns into an advantage.
pub fn status_affinity(ability: &str) -> StatusMask {
    match to_id(ability).as_str() {
        "guts" | "marvelscale" | "quickfeet" => StatusMask::of(&[
            StatusKind::Burn,
            StatusKind::Poison,
            StatusKind::Toxic,
            StatusKind::Paralysis,
        ]),
        "poisonheal" | "toxicboost" => StatusMask::of(&[StatusKind::Poison, StatusKind::Toxic]),
        "flareboost" => StatusMask::of(&[StatusKind::Burn]),
        _ => StatusMask::EMPTY,
    }
}

/// Abilities that activate from Booster Energy or a field condition.
pub fn is_paradox_ability(ability: &str) -> bool {
    matches!(to_id(ability).as_str(), "protosynthesis" | "quarkdrive")
}

/// Abilities that restore HP every turn without an item.
pub fn heals_passively(ability: &str) -> bool {
    matches!(
        to_id(ability).as_str(),
        "poisonheal" | "raindish" | "icebody" | "dryskin"
    )
}

/// Abilities that already explain avoiding all indirect damage.
pub fn ignores_indirect_damage(ability: &str) -> bool {
    to_id(ability) == "magicguard"
}

/// The single item a forme cannot exist without.
pub fn forme_required_item(species: &str) -> Option<&'static str> {
    let item = match to_id(species).as_str() {
        "ogerponwellspring" => "Wellspring Mask",
        "ogerponhearthflame" => "Hearthflame Mask",
        "ogerponcornerstone" => "Cornerstone Mask",
        "zaciancrowned" => "Rusted Sword",
        "zamazentacrowned" => "Rusted Shield",
        "giratinaorigin" => "Griseous Core",
        "dialgaorigin" => "Adamant Crystal",
        "palkiaorigin" => "Lustrous Globe",
        _ => return None,
    };
    Some(item)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn choice_scarf_is_both_lock_and_speed() {
        let traits = item_traits("Choice Scarf");
        assert!(traits.contains(ItemTraits::CHOICE_LOCK));
        assert!(traits.contains(ItemTraits::SPEED_BOOST));
        assert!(!traits.contains(ItemTraits::PASSIVE_HEAL));
    }

    #[test]
    fn status_moves_are_recognised_by_id() {
        assert!(is_status_move("Swords Dance"));
        assert!(is_status_move("will-o-wisp"));
        assert!(!is_status_move("Sucker Punch"));
        assert!(!is_status_move("Some Future Move"));
    }

    #[test]
    fn unknown_items_have_no_traits() {
        assert!(item_traits("Black Glasses").is_empty());
        assert!(!ItemTraits::EMPTY.contains(ItemTraits::EMPTY));
    }

    #[test]
    fn toxic_orb_covers_both_poisons() {
        let mask = induced_status("Toxic Orb");
        assert!(mask.contains(StatusKind::Poison));
        assert!(mask.contains(StatusKind::Toxic));
        assert!(!mask.contains(StatusKind::Burn));
    }

    #[test]
    fn poison_heal_does_not_profit_from_burn() {
        assert!(status_affinity("Poison Heal").contains(StatusKind::Toxic));
        assert!(!status_affinity("Poison Heal").contains(StatusKind::Burn));
        assert!(status_affinity("Guts").contains(StatusKind::Burn));
        assert!(status_affinity("Intimidate").is_empty());
    }

    #[test]
    fn resist_berries_are_typed() {
        assert_eq!(resist_berry("Fire"), Some("Occa Berry"));
        let babiri = resist_berry("steel").unwrap_or_default();
        assert!(item_traits(babiri).contains(ItemTraits::RESIST_BERRY));
        assert_eq!(resist_berry("Normal"), None);
    }

    #[test]
    fn formes_map_to_required_items() {
        assert_eq!(
            forme_required_item("Ogerpon-Wellspring"),
            Some("Wellspring Mask")
        );
        assert_eq!(forme_required_item("Ogerpon"), None);
    }
}
