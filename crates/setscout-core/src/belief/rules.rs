//! Closed registry of inference rules.
//!
//! Each [`Rule`] inspects the belief state after an observation's direct
//! reveal has been applied and answers with declarative [`Effect`]s. Rules
//! never mutate state themselves, so every one of them can be tested in
//! isolation by evaluating it against a hand-built state.

use super::hard::BeliefState;
use super::soft::SoftConfig;
use crate::correlation::CorrelationTable;
use crate::model::mechanics::{
    BOOSTER_ENERGY, ItemTraits, heals_passively, ignores_indirect_damage, induced_status,
    is_paradox_ability, is_status_move, item_traits, resist_berry, status_affinity,
};
use crate::model::names::same_id;
use crate::model::{AttributeKind, Effectiveness, HazardKind, Observation, ObservationKind, StatusKind};

/// A single change requested by a rule.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Force the listed values to zero.
    Eliminate {
        attribute: AttributeKind,
        values: Vec<String>,
    },
    /// Force every value not listed to zero.
    Retain {
        attribute: AttributeKind,
        values: Vec<String>,
    },
    /// Multiply one value by a likelihood factor.
    Scale {
        attribute: AttributeKind,
        value: String,
        factor: f64,
    },
    /// Prove one value.
    Confirm {
        attribute: AttributeKind,
        value: String,
    },
}

impl Effect {
    pub fn attribute(&self) -> AttributeKind {
        match self {
            Effect::Eliminate { attribute, .. }
            | Effect::Retain { attribute, .. }
            | Effect::Scale { attribute, .. }
            | Effect::Confirm { attribute, .. } => *attribute,
        }
    }
}

/// Shared, read-only inputs of rule evaluation.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub correlations: &'a CorrelationTable,
    pub soft: &'a SoftConfig,
}

/// Every inference the processor knows how to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    /// Two distinct moves rule out items that lock the holder into one move.
    MoveLockBroken,
    /// Reweights candidates that co-occur with a revealed value.
    Correlation,
    /// A self-inflicted status points at the item that induces it.
    StatusOrb,
    /// End-of-turn healing rules out items that do not heal.
    PassiveHeal,
    /// Hazard damage rules out hazard immunity.
    HazardDamage,
    /// Shrugging off a hazard points at hazard immunity.
    HazardAvoided,
    /// An unannounced hit rules out items that would have announced themselves.
    UnannouncedHit,
    /// A paradox ability activating outside its field condition proves Booster Energy.
    BoosterEnergy,
    /// A long multi-hit streak points at Loaded Dice.
    MultiHitDice,
    /// Outspeeding unexpectedly points at speed items.
    SpeedAnomaly,
}

impl Rule {
    pub const ALL: [Rule; 10] = [
        Rule::MoveLockBroken,
        Rule::Correlation,
        Rule::StatusOrb,
        Rule::PassiveHeal,
        Rule::HazardDamage,
        Rule::HazardAvoided,
        Rule::UnannouncedHit,
        Rule::BoosterEnergy,
        Rule::MultiHitDice,
        Rule::SpeedAnomaly,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Rule::MoveLockBroken => "move_lock_broken",
            Rule::Correlation => "correlation",
            Rule::StatusOrb => "status_orb",
            Rule::PassiveHeal => "passive_heal",
            Rule::HazardDamage => "hazard_damage",
            Rule::HazardAvoided => "hazard_avoided",
            Rule::UnannouncedHit => "unannounced_hit",
            Rule::BoosterEnergy => "booster_energy",
            Rule::MultiHitDice => "multi_hit_dice",
            Rule::SpeedAnomaly => "speed_anomaly",
        }
    }

    /// Observation kinds this rule reacts to.
    pub fn triggers(self) -> &'static [ObservationKind] {
        match self {
            Rule::MoveLockBroken => &[ObservationKind::MoveRevealed],
            Rule::Correlation => &[
                ObservationKind::MoveRevealed,
                ObservationKind::AbilityRevealed,
                ObservationKind::ItemRevealed,
                ObservationKind::TeraRevealed,
                ObservationKind::BoosterActivated,
            ],
            Rule::StatusOrb => &[ObservationKind::StatusSelfInflicted],
            Rule::PassiveHeal => &[ObservationKind::PassiveHealObserved],
            Rule::HazardDamage => &[ObservationKind::HazardDamageTaken],
            Rule::HazardAvoided => &[ObservationKind::HazardAvoided],
            Rule::UnannouncedHit => &[ObservationKind::DamageTaken],
            Rule::BoosterEnergy => &[ObservationKind::BoosterActivated],
            Rule::MultiHitDice => &[ObservationKind::MultiHit],
            Rule::SpeedAnomaly => &[ObservationKind::SpeedAnomaly],
        }
    }

    pub fn evaluate(
        self,
        state: &BeliefState,
        observation: &Observation,
        ctx: &RuleContext<'_>,
    ) -> Vec<Effect> {
        match (self, observation) {
            (Rule::MoveLockBroken, Observation::MoveRevealed { .. }) => move_lock_broken(state),
            (Rule::Correlation, observation) => match revealed_value(observation) {
                Some((attribute, value)) => correlation(state, attribute, value, ctx),
                None => Vec::new(),
            },
            (Rule::StatusOrb, Observation::StatusSelfInflicted { status }) => {
                status_orb(state, *status, ctx.soft)
            }
            (Rule::PassiveHeal, Observation::PassiveHealObserved) => passive_heal(state),
            (Rule::HazardDamage, Observation::HazardDamageTaken) => {
                vec![eliminate_items(state, |traits| {
                    traits.contains(ItemTraits::HAZARD_IMMUNITY)
                })]
            }
            (
                Rule::HazardAvoided,
                Observation::HazardAvoided {
                    hazard,
                    naturally_immune,
                },
            ) => hazard_avoided(state, *hazard, *naturally_immune, ctx.soft),
            (
                Rule::UnannouncedHit,
                Observation::DamageTaken {
                    percent_of_max,
                    effectiveness,
                    move_type,
                },
            ) => unannounced_hit(state, *percent_of_max, *effectiveness, move_type.as_deref()),
            (
                Rule::BoosterEnergy,
                Observation::BoosterActivated {
                    ability,
                    field_condition,
                },
            ) => {
                if *field_condition || !is_paradox_ability(ability) {
                    return Vec::new();
                }
                vec![Effect::Confirm {
                    attribute: AttributeKind::Item,
                    value: BOOSTER_ENERGY.to_string(),
                }]
            }
            (Rule::MultiHitDice, Observation::MultiHit { hits }) => {
                if *hits < ctx.soft.multi_hit_threshold {
                    return Vec::new();
                }
                scale_items(state, ItemTraits::MULTI_HIT, ctx.soft.multi_hit_boost)
            }
            (Rule::SpeedAnomaly, Observation::SpeedAnomaly) => {
                scale_items(state, ItemTraits::SPEED_BOOST, ctx.soft.speed_item_boost)
            }
            _ => Vec::new(),
        }
    }
}

/// Ordered set of active rules, grouped by trigger on lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleBook {
    rules: Vec<Rule>,
}

impl Default for RuleBook {
    fn default() -> Self {
        Self::standard()
    }
}

impl RuleBook {
    /// Every rule, in registry order.
    pub fn standard() -> Self {
        Self {
            rules: Rule::ALL.to_vec(),
        }
    }

    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn with(mut self, rule: Rule) -> Self {
        if !self.rules.contains(&rule) {
            self.rules.push(rule);
        }
        self
    }

    pub fn without(mut self, rule: Rule) -> Self {
        self.rules.retain(|active| *active != rule);
        self
    }

    pub fn contains(&self, rule: Rule) -> bool {
        self.rules.contains(&rule)
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn rules_for(&self, kind: ObservationKind) -> impl Iterator<Item = Rule> + '_ {
        self.rules
            .iter()
            .copied()
            .filter(move |rule| rule.triggers().contains(&kind))
    }
}

/// The attribute value an observation names directly, if any.
pub(crate) fn revealed_value(observation: &Observation) -> Option<(AttributeKind, &str)> {
    match observation {
        Observation::MoveRevealed { name } => Some((AttributeKind::Moves, name.as_str())),
        Observation::AbilityRevealed { ability } | Observation::BoosterActivated { ability, .. } => {
            Some((AttributeKind::Ability, ability.as_str()))
        }
        Observation::ItemRevealed { item } => Some((AttributeKind::Item, item.as_str())),
        Observation::TeraRevealed { tera_type } => Some((AttributeKind::Tera, tera_type.as_str())),
        _ => None,
    }
}

/// Two different damaging moves cannot come from a Choice-locked holder.
fn move_lock_broken(state: &BeliefState) -> Vec<Effect> {
    let damaging = state
        .observed_moves()
        .iter()
        .filter(|name| !is_status_move(name))
        .count();
    if damaging < 2 {
        return Vec::new();
    }
    vec![eliminate_items(state, |traits| {
        traits.contains(ItemTraits::CHOICE_LOCK)
    })]
}

fn correlation(
    state: &BeliefState,
    attribute: AttributeKind,
    value: &str,
    ctx: &RuleContext<'_>,
) -> Vec<Effect> {
    if ctx.correlations.is_empty() {
        return Vec::new();
    }
    let mut effects = Vec::new();
    for target in AttributeKind::ALL {
        for candidate in state.open_candidates(target) {
            if target == attribute && same_id(&candidate, value) {
                continue;
            }
            let factor = ctx
                .correlations
                .weight((attribute, value), (target, &candidate));
            if factor != 1.0 {
                effects.push(Effect::Scale {
                    attribute: target,
                    value: candidate,
                    factor,
                });
            }
        }
    }
    effects
}

fn status_orb(state: &BeliefState, status: StatusKind, soft: &SoftConfig) -> Vec<Effect> {
    let ability = likely_ability(state, soft);
    let profits = ability.is_some_and(|ability| status_affinity(ability).contains(status));
    let factor = if !profits {
        soft.status_orb_base_boost
    } else if ability.is_some_and(heals_passively) {
        // Only Poison Heal both heals passively and profits from a status.
        soft.poison_heal_orb_boost
    } else {
        soft.status_orb_ability_boost
    };
    state
        .open_candidates(AttributeKind::Item)
        .into_iter()
        .filter(|item| induced_status(item).contains(status))
        .map(|item| Effect::Scale {
            attribute: AttributeKind::Item,
            value: item,
            factor,
        })
        .collect()
}

fn passive_heal(state: &BeliefState) -> Vec<Effect> {
    if state
        .confirmed_value(AttributeKind::Ability)
        .is_some_and(heals_passively)
    {
        return Vec::new();
    }
    let healing: Vec<String> = state
        .belief(AttributeKind::Item)
        .keys()
        .filter(|item| item_traits(item).contains(ItemTraits::PASSIVE_HEAL))
        .map(str::to_string)
        .collect();
    vec![Effect::Retain {
        attribute: AttributeKind::Item,
        values: healing,
    }]
}

fn hazard_avoided(
    state: &BeliefState,
    hazard: HazardKind,
    naturally_immune: bool,
    soft: &SoftConfig,
) -> Vec<Effect> {
    if naturally_immune
        || state
            .confirmed_value(AttributeKind::Ability)
            .is_some_and(ignores_indirect_damage)
    {
        return Vec::new();
    }
    if hazard == HazardKind::StealthRock {
        let immune: Vec<String> = state
            .belief(AttributeKind::Item)
            .keys()
            .filter(|item| item_traits(item).contains(ItemTraits::HAZARD_IMMUNITY))
            .map(str::to_string)
            .collect();
        return vec![Effect::Retain {
            attribute: AttributeKind::Item,
            values: immune,
        }];
    }
    // Grounded hazards are also dodged by floating.
    let floating = ItemTraits::HAZARD_IMMUNITY.with(ItemTraits::AIR_BALLOON);
    scale_items(state, floating, soft.hazard_avoidance_boost)
}

fn unannounced_hit(
    state: &BeliefState,
    percent_of_max: f64,
    effectiveness: Effectiveness,
    move_type: Option<&str>,
) -> Vec<Effect> {
    // A confirmed Balloon or berry was announced when consumed; later hits say nothing.
    if percent_of_max <= 0.0 || state.confirmed_value(AttributeKind::Item).is_some() {
        return Vec::new();
    }
    let mut effects = vec![eliminate_items(state, |traits| {
        traits.contains(ItemTraits::AIR_BALLOON)
    })];
    if effectiveness == Effectiveness::SuperEffective {
        if let Some(berry) = move_type.and_then(resist_berry) {
            effects.push(Effect::Eliminate {
                attribute: AttributeKind::Item,
                values: vec![berry.to_string()],
            });
        }
    }
    effects
}

/// The confirmed ability, or the favourite when it clears the confidence threshold.
fn likely_ability<'s>(state: &'s BeliefState, soft: &SoftConfig) -> Option<&'s str> {
    if let Some(confirmed) = state.confirmed_value(AttributeKind::Ability) {
        return Some(confirmed);
    }
    state
        .belief(AttributeKind::Ability)
        .argmax()
        .filter(|(_, prob)| *prob >= soft.ability_confidence_threshold)
        .map(|(ability, _)| ability)
}

fn eliminate_items(state: &BeliefState, matches: impl Fn(ItemTraits) -> bool) -> Effect {
    Effect::Eliminate {
        attribute: AttributeKind::Item,
        values: state
            .belief(AttributeKind::Item)
            .keys()
            .filter(|item| matches(item_traits(item)))
            .map(str::to_string)
            .collect(),
    }
}

/// Boosts every open item sharing a trait with `wanted`.
fn scale_items(state: &BeliefState, wanted: ItemTraits, factor: f64) -> Vec<Effect> {
    state
        .open_candidates(AttributeKind::Item)
        .into_iter()
        .filter(|item| item_traits(item).intersects(wanted))
        .map(|item| Effect::Scale {
            attribute: AttributeKind::Item,
            value: item,
            factor,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::belief::ConfirmationSource;
    use crate::corpus::{SpeciesUsage, UsageCorpus};
    use crate::space::ConfigurationSpace;
    use std::sync::Arc;

    fn state_with_items(ability: &[(&str, f64)], items: &[(&str, f64)]) -> BeliefState {
        let mut corpus = UsageCorpus::new();
        corpus.insert(
            "Testmon",
            SpeciesUsage::default()
                .with(AttributeKind::Ability, ability)
                .with(AttributeKind::Item, items)
                .with(
                    AttributeKind::Moves,
                    &[("Earthquake", 0.5), ("U-turn", 0.3), ("Stone Edge", 0.2)],
                ),
        );
        let space = ConfigurationSpace::build("Testmon", &corpus).expect("known species");
        BeliefState::new(Arc::new(space))
    }

    fn evaluate(rule: Rule, state: &BeliefState, observation: &Observation) -> Vec<Effect> {
        let correlations = CorrelationTable::standard();
        let soft = SoftConfig::default();
        let ctx = RuleContext {
            correlations: &correlations,
            soft: &soft,
        };
        rule.evaluate(state, observation, &ctx)
    }

    #[test]
    fn every_rule_has_a_trigger() {
        for rule in Rule::ALL {
            assert!(!rule.triggers().is_empty(), "{} never fires", rule.name());
        }
    }

    #[test]
    fn rule_book_routes_by_observation_kind() {
        let book = RuleBook::standard().without(Rule::Correlation);
        let rules: Vec<_> = book.rules_for(ObservationKind::MoveRevealed).collect();
        assert_eq!(rules, vec![Rule::MoveLockBroken]);
        assert!(RuleBook::empty().rules_for(ObservationKind::MoveRevealed).next().is_none());
    }

    #[test]
    fn status_orb_uses_ability_boost_when_ability_profits() {
        let state = state_with_items(
            &[("Guts", 0.9), ("Intimidate", 0.1)],
            &[("Flame Orb", 0.2), ("Leftovers", 0.8)],
        );
        let effects = evaluate(
            Rule::StatusOrb,
            &state,
            &Observation::StatusSelfInflicted {
                status: StatusKind::Burn,
            },
        );
        assert_eq!(
            effects,
            vec![Effect::Scale {
                attribute: AttributeKind::Item,
                value: "Flame Orb".to_string(),
                factor: 20.0,
            }]
        );
    }

    #[test]
    fn poison_heal_gets_the_strongest_toxic_orb_boost() {
        let state = state_with_items(
            &[("Poison Heal", 1.0)],
            &[("Toxic Orb", 0.2), ("Leftovers", 0.8)],
        );
        let effects = evaluate(
            Rule::StatusOrb,
            &state,
            &Observation::StatusSelfInflicted {
                status: StatusKind::Toxic,
            },
        );
        assert_eq!(
            effects,
            vec![Effect::Scale {
                attribute: AttributeKind::Item,
                value: "Toxic Orb".to_string(),
                factor: 30.0,
            }]
        );
    }

    #[test]
    fn status_moves_do_not_break_a_choice_lock() {
        let mut state = state_with_items(
            &[("Intimidate", 1.0)],
            &[("Choice Band", 0.5), ("Leftovers", 0.5)],
        );
        for name in ["Earthquake", "Swords Dance"] {
            state.observe_move(name).expect("room for moves");
        }
        let reveal = Observation::move_revealed("Swords Dance");
        assert!(evaluate(Rule::MoveLockBroken, &state, &reveal).is_empty());

        state.observe_move("Stone Edge").expect("room for moves");
        assert_eq!(
            evaluate(Rule::MoveLockBroken, &state, &Observation::move_revealed("Stone Edge")),
            vec![Effect::Eliminate {
                attribute: AttributeKind::Item,
                values: vec!["Choice Band".to_string()],
            }]
        );
    }

    #[test]
    fn hits_after_a_confirmed_item_infer_nothing() {
        let mut state = state_with_items(
            &[("Intimidate", 1.0)],
            &[("Air Balloon", 0.4), ("Occa Berry", 0.6)],
        );
        state
            .confirm(AttributeKind::Item, "Air Balloon", ConfirmationSource::Revealed)
            .expect("known item");
        let hit = Observation::DamageTaken {
            percent_of_max: 40.0,
            effectiveness: Effectiveness::SuperEffective,
            move_type: Some("Fire".to_string()),
        };
        assert!(evaluate(Rule::UnannouncedHit, &state, &hit).is_empty());
    }

    #[test]
    fn status_orb_falls_back_to_base_boost() {
        let state = state_with_items(
            &[("Guts", 0.3), ("Intimidate", 0.7)],
            &[("Toxic Orb", 0.2), ("Leftovers", 0.8)],
        );
        let effects = evaluate(
            Rule::StatusOrb,
            &state,
            &Observation::StatusSelfInflicted {
                status: StatusKind::Toxic,
            },
        );
        assert_eq!(effects.len(), 1);
        assert!(matches!(effects[0], Effect::Scale { factor, .. } if factor == 5.0));
    }

    #[test]
    fn stealth_rock_avoidance_retains_boots() {
        let state = state_with_items(
            &[("Intimidate", 1.0)],
            &[("Heavy-Duty Boots", 0.3), ("Leftovers", 0.7)],
        );
        let effects = evaluate(
            Rule::HazardAvoided,
            &state,
            &Observation::HazardAvoided {
                hazard: HazardKind::StealthRock,
                naturally_immune: false,
            },
        );
        assert_eq!(
            effects,
            vec![Effect::Retain {
                attribute: AttributeKind::Item,
                values: vec!["Heavy-Duty Boots".to_string()],
            }]
        );
    }

    #[test]
    fn magic_guard_explains_hazard_avoidance() {
        let state = state_with_items(
            &[("Magic Guard", 1.0)],
            &[("Heavy-Duty Boots", 0.3), ("Life Orb", 0.7)],
        );
        let effects = evaluate(
            Rule::HazardAvoided,
            &state,
            &Observation::HazardAvoided {
                hazard: HazardKind::StealthRock,
                naturally_immune: false,
            },
        );
        assert!(effects.is_empty());
    }

    #[test]
    fn spikes_avoidance_boosts_boots_and_balloon() {
        let state = state_with_items(
            &[("Intimidate", 1.0)],
            &[("Heavy-Duty Boots", 0.2), ("Air Balloon", 0.2), ("Leftovers", 0.6)],
        );
        let effects = evaluate(
            Rule::HazardAvoided,
            &state,
            &Observation::HazardAvoided {
                hazard: HazardKind::Spikes,
                naturally_immune: false,
            },
        );
        let boosted: Vec<_> = effects
            .iter()
            .filter_map(|effect| match effect {
                Effect::Scale { value, factor, .. } => Some((value.as_str(), *factor)),
                _ => None,
            })
            .collect();
        assert_eq!(boosted, vec![("Air Balloon", 3.0), ("Heavy-Duty Boots", 3.0)]);
    }

    #[test]
    fn super_effective_hit_rules_out_matching_berry_only() {
        let state = state_with_items(
            &[("Intimidate", 1.0)],
            &[("Occa Berry", 0.2), ("Shuca Berry", 0.2), ("Air Balloon", 0.6)],
        );
        let effects = evaluate(
            Rule::UnannouncedHit,
            &state,
            &Observation::DamageTaken {
                percent_of_max: 55.0,
                effectiveness: Effectiveness::SuperEffective,
                move_type: Some("Fire".to_string()),
            },
        );
        assert_eq!(
            effects,
            vec![
                Effect::Eliminate {
                    attribute: AttributeKind::Item,
                    values: vec!["Air Balloon".to_string()],
                },
                Effect::Eliminate {
                    attribute: AttributeKind::Item,
                    values: vec!["Occa Berry".to_string()],
                },
            ]
        );
    }

    #[test]
    fn booster_energy_needs_no_field_condition() {
        let state = state_with_items(&[("Protosynthesis", 1.0)], &[("Booster Energy", 0.5)]);
        let in_sun = Observation::BoosterActivated {
            ability: "Protosynthesis".to_string(),
            field_condition: true,
        };
        assert!(evaluate(Rule::BoosterEnergy, &state, &in_sun).is_empty());

        let unprompted = Observation::BoosterActivated {
            ability: "Protosynthesis".to_string(),
            field_condition: false,
        };
        assert_eq!(
            evaluate(Rule::BoosterEnergy, &state, &unprompted),
            vec![Effect::Confirm {
                attribute: AttributeKind::Item,
                value: BOOSTER_ENERGY.to_string(),
            }]
        );
    }

    #[test]
    fn short_multi_hit_streak_is_ignored() {
        let state = state_with_items(&[("Skill Link", 1.0)], &[("Loaded Dice", 0.4), ("Leftovers", 0.6)]);
        assert!(evaluate(Rule::MultiHitDice, &state, &Observation::MultiHit { hits: 2 }).is_empty());
        assert_eq!(
            evaluate(Rule::MultiHitDice, &state, &Observation::MultiHit { hits: 5 }).len(),
            1
        );
    }

    #[test]
    fn correlation_skips_the_revealed_value() {
        let state = state_with_items(&[("Intimidate", 1.0)], &[("Choice Scarf", 0.5), ("Leftovers", 0.5)]);
        let effects = evaluate(Rule::Correlation, &state, &Observation::move_revealed("U-turn"));
        assert!(effects.iter().all(|effect| !matches!(
            effect,
            Effect::Scale { value, .. } if value == "U-turn"
        )));
        assert!(effects.contains(&Effect::Scale {
            attribute: AttributeKind::Item,
            value: "Choice Scarf".to_string(),
            factor: 1.3,
        }));
        assert!(effects.contains(&Effect::Scale {
            attribute: AttributeKind::Moves,
            value: "Earthquake".to_string(),
            factor: 1.5,
        }));
    }
}
