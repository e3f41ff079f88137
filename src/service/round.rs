//! 單局結算
//!
//! 一局中每位玩家一副手牌，計算玩家之間的分數轉移。

use std::collections::BTreeMap;

use crate::errors::{MahjongError, MahjongResult};
use crate::game::{ScoredHand, Wind, EAST_FACTOR, NORMAL_FACTOR};
use super::player::PlayerId;

/// 一位玩家在本局的手牌
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoundEntry {
    player: PlayerId,
    player_wind: Wind,
    hand: ScoredHand,
}

impl RoundEntry {
    pub fn player(&self) -> &PlayerId {
        &self.player
    }

    pub fn player_wind(&self) -> Wind {
        self.player_wind
    }

    pub fn hand(&self) -> &ScoredHand {
        &self.hand
    }
}

/// 一局
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Round {
    prevailing_wind: Wind,
    entries: Vec<RoundEntry>,
}

/// 任一方為東家時加倍
fn wind_bonus(a: Wind, b: Wind) -> i32 {
    if a == Wind::East || b == Wind::East {
        EAST_FACTOR
    } else {
        NORMAL_FACTOR
    }
}

impl Round {
    pub fn new(prevailing_wind: Wind) -> Self {
        Self {
            prevailing_wind,
            entries: Vec::new(),
        }
    }

    pub fn prevailing_wind(&self) -> Wind {
        self.prevailing_wind
    }

    /// 加入或取代玩家的手牌；玩家風位取自手牌
    pub fn add_hand(&mut self, player: PlayerId, hand: ScoredHand) -> MahjongResult<()> {
        if hand.prevailing_wind() != self.prevailing_wind {
            return Err(MahjongError::invalid_state(format!(
                "hand for {} uses prevailing wind {} but the round is {}",
                player,
                hand.prevailing_wind().name(),
                self.prevailing_wind.name()
            )));
        }
        let entry = RoundEntry {
            player_wind: hand.own_wind(),
            player,
            hand,
        };
        match self.entries.iter_mut().find(|e| e.player == entry.player) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
        Ok(())
    }

    pub fn remove_hand(&mut self, player: &PlayerId) -> Option<ScoredHand> {
        let index = self.entries.iter().position(|e| &e.player == player)?;
        Some(self.entries.remove(index).hand)
    }

    pub fn entries(&self) -> &[RoundEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hand_count(&self) -> usize {
        self.entries.len()
    }

    pub fn has_hand_for(&self, player: &PlayerId) -> bool {
        self.entry(player).is_some()
    }

    fn entry(&self, player: &PlayerId) -> Option<&RoundEntry> {
        self.entries.iter().find(|e| &e.player == player)
    }

    pub fn hand(&self, player: &PlayerId) -> Option<&ScoredHand> {
        self.entry(player).map(|e| &e.hand)
    }

    pub fn player_wind(&self, player: &PlayerId) -> Option<Wind> {
        self.entry(player).map(|e| e.player_wind)
    }

    pub fn players(&self) -> impl Iterator<Item = &PlayerId> {
        self.entries.iter().map(|e| &e.player)
    }

    /// 和牌的玩家（輸入過程中可能為零或多位）
    pub fn mahjong_winners(&self) -> Vec<&PlayerId> {
        self.entries
            .iter()
            .filter(|e| e.hand.is_mahjong())
            .map(|e| &e.player)
            .collect()
    }

    /// 每位列出的玩家都有手牌
    pub fn is_complete<'a>(&self, players: impl IntoIterator<Item = &'a PlayerId>) -> bool {
        players.into_iter().all(|p| self.has_hand_for(p))
    }

    /// 玩家本局的分數變化
    pub fn committed_score_delta(&self, player: &PlayerId) -> MahjongResult<i32> {
        let this = self.entry(player).ok_or_else(|| {
            MahjongError::lookup(format!("player {} has no hand in this round", player))
        })?;
        Ok(self.delta_for(this))
    }

    fn delta_for(&self, this: &RoundEntry) -> i32 {
        let this_score = this.hand.limited_total();
        let others = self.entries.iter().filter(|e| e.player != this.player);

        if self.entries.len() == 2 {
            let that_score = others
                .map(|e| e.hand.limited_total())
                .fold(0, i32::saturating_add);
            return if this.hand.is_mahjong() {
                this_score.saturating_mul(2).saturating_sub(that_score)
            } else {
                this_score.saturating_sub(that_score.saturating_mul(2))
            };
        }

        others
            .map(|other| {
                let bonus = wind_bonus(this.player_wind, other.player_wind);
                let other_score = other.hand.limited_total();
                if this.hand.is_mahjong() {
                    this_score.saturating_mul(bonus)
                } else if other.hand.is_mahjong() {
                    other_score.saturating_mul(bonus).saturating_neg()
                } else {
                    this_score.saturating_sub(other_score).saturating_mul(bonus)
                }
            })
            .fold(0, i32::saturating_add)
    }

    /// 所有玩家的分數變化
    pub fn score_deltas(&self) -> BTreeMap<PlayerId, i32> {
        self.entries
            .iter()
            .map(|e| (e.player.clone(), self.delta_for(e)))
            .collect()
    }
}

// ============================================================================
// 單元測試
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::game::{
        Dragon, Group, SchemeDefinition, ScoringScheme, Suit, Tile, Visibility, MAX_LIMIT_SCORE,
    };

    fn scheme() -> Arc<ScoringScheme> {
        Arc::new(ScoringScheme::british())
    }

    fn hand_of(groups: Vec<Group>, own: Wind, prevailing: Wind) -> ScoredHand {
        hand_with(scheme(), groups, own, prevailing)
    }

    fn hand_with(scheme: Arc<ScoringScheme>, groups: Vec<Group>, own: Wind, prevailing: Wind) -> ScoredHand {
        let mut hand = ScoredHand::new(scheme, own, prevailing);
        for group in groups {
            hand.add(group);
        }
        hand
    }

    fn hand_2(own: Wind, prevailing: Wind) -> ScoredHand {
        hand_of(vec![Group::pung(Tile::suited(Suit::Characters, 2), Visibility::Exposed).unwrap()], own, prevailing)
    }

    fn hand_4(own: Wind, prevailing: Wind) -> ScoredHand {
        hand_of(vec![Group::pung(Tile::suited(Suit::Bamboo, 3), Visibility::Concealed).unwrap()], own, prevailing)
    }

    fn hand_16(own: Wind, prevailing: Wind) -> ScoredHand {
        hand_of(vec![Group::kong(Tile::suited(Suit::Circles, 9), Visibility::Exposed).unwrap()], own, prevailing)
    }

    fn groups_136() -> Vec<Group> {
        vec![
            Group::pung(Tile::dragon(Dragon::Red), Visibility::Exposed).unwrap(),
            Group::chow(Tile::suited(Suit::Characters, 2)).unwrap(),
            Group::kong(Tile::suited(Suit::Bamboo, 7), Visibility::Concealed).unwrap(),
            Group::pair(Tile::suited(Suit::Bamboo, 3)).unwrap(),
            Group::pung(Tile::dragon(Dragon::White), Visibility::Exposed).unwrap(),
        ]
    }

    fn hand_136(own: Wind, prevailing: Wind) -> ScoredHand {
        hand_of(groups_136(), own, prevailing)
    }

    fn ids(names: &[&str]) -> Vec<PlayerId> {
        names.iter().map(|n| PlayerId::new(*n)).collect()
    }

    fn assert_zero_sum(round: &Round) {
        assert_eq!(round.score_deltas().values().sum::<i32>(), 0);
    }

    #[test]
    fn test_east_wins_four_players() {
        let p = ids(&["e", "s", "w", "n"]);
        let mut round = Round::new(Wind::East);
        round.add_hand(p[0].clone(), hand_136(Wind::East, Wind::East)).unwrap();
        round.add_hand(p[1].clone(), hand_2(Wind::South, Wind::East)).unwrap();
        round.add_hand(p[2].clone(), hand_4(Wind::West, Wind::East)).unwrap();
        round.add_hand(p[3].clone(), hand_16(Wind::North, Wind::East)).unwrap();

        assert_eq!(round.committed_score_delta(&p[0]).unwrap(), 136 * 2 * 3);
        assert_eq!(round.committed_score_delta(&p[1]).unwrap(), -272 + (2 - 4) + (2 - 16));
        assert_eq!(round.committed_score_delta(&p[2]).unwrap(), -272 + (4 - 2) + (4 - 16));
        assert_eq!(round.committed_score_delta(&p[3]).unwrap(), -272 + (16 - 2) + (16 - 4));
        assert_zero_sum(&round);
        assert_eq!(round.mahjong_winners(), vec![&p[0]]);
    }

    #[test]
    fn test_south_wins_four_players() {
        let p = ids(&["e", "s", "w", "n"]);
        let mut round = Round::new(Wind::North);
        round.add_hand(p[0].clone(), hand_4(Wind::East, Wind::North)).unwrap();
        round.add_hand(p[1].clone(), hand_136(Wind::South, Wind::North)).unwrap();
        round.add_hand(p[2].clone(), hand_2(Wind::West, Wind::North)).unwrap();
        round.add_hand(p[3].clone(), hand_16(Wind::North, Wind::North)).unwrap();

        assert_eq!(round.committed_score_delta(&p[1]).unwrap(), 544);
        assert_eq!(round.committed_score_delta(&p[0]).unwrap(), -272 + (4 - 2) * 2 + (4 - 16) * 2);
        assert_eq!(round.committed_score_delta(&p[2]).unwrap(), -136 + (2 - 4) * 2 + (2 - 16));
        assert_eq!(round.committed_score_delta(&p[3]).unwrap(), -136 + (16 - 4) * 2 + (16 - 2));
        assert_zero_sum(&round);
    }

    #[test]
    fn test_two_players() {
        let p = ids(&["e", "w"]);
        let mut round = Round::new(Wind::East);
        round.add_hand(p[0].clone(), hand_2(Wind::East, Wind::East)).unwrap();
        round.add_hand(p[1].clone(), hand_136(Wind::South, Wind::East)).unwrap();
        assert_eq!(round.committed_score_delta(&p[0]).unwrap(), -272 + 2);
        assert_eq!(round.committed_score_delta(&p[1]).unwrap(), 272 - 2);
        assert_zero_sum(&round);
    }

    #[test]
    fn test_three_players() {
        let p = ids(&["e", "s", "w"]);
        let mut round = Round::new(Wind::East);
        round.add_hand(p[0].clone(), hand_2(Wind::East, Wind::East)).unwrap();
        round.add_hand(p[1].clone(), hand_4(Wind::South, Wind::East)).unwrap();
        round.add_hand(p[2].clone(), hand_136(Wind::West, Wind::East)).unwrap();
        assert_eq!(round.committed_score_delta(&p[2]).unwrap(), 408);
        assert_eq!(round.committed_score_delta(&p[0]).unwrap(), -272 + (2 - 4) * 2);
        assert_eq!(round.committed_score_delta(&p[1]).unwrap(), -136 + (4 - 2) * 2);
        assert_zero_sum(&round);
    }

    #[test]
    fn test_incremental_entry() {
        let p = ids(&["e", "s", "w"]);
        let mut round = Round::new(Wind::East);
        assert!(round.is_empty());
        assert!(round.mahjong_winners().is_empty());

        round.add_hand(p[0].clone(), hand_136(Wind::East, Wind::East)).unwrap();
        round.add_hand(p[1].clone(), hand_136(Wind::South, Wind::East)).unwrap();
        assert_eq!(round.mahjong_winners().len(), 2);
        assert!(!round.is_complete(&p));

        round.add_hand(p[1].clone(), hand_2(Wind::South, Wind::East)).unwrap();
        round.add_hand(p[2].clone(), hand_4(Wind::West, Wind::East)).unwrap();
        assert_eq!(round.hand_count(), 3);
        assert!(round.is_complete(&p));
        assert_eq!(round.mahjong_winners(), vec![&p[0]]);
        assert_eq!(round.player_wind(&p[2]), Some(Wind::West));
        assert_eq!(round.hand(&p[1]).map(|h| h.limited_total()), Some(2));

        assert!(round.remove_hand(&p[2]).is_some());
        assert!(!round.has_hand_for(&p[2]));
    }

    #[test]
    fn test_widest_limit_does_not_overflow() {
        let mut definition = SchemeDefinition::british();
        definition.limit_score = MAX_LIMIT_SCORE;
        for entry in definition.elements.iter_mut().filter(|e| e.key == "mahjong") {
            entry.multiplier = 10_000_000;
        }
        let wide = Arc::new(ScoringScheme::from_definition(&definition).unwrap());

        let p = ids(&["e", "w"]);
        let mut round = Round::new(Wind::East);
        round.add_hand(p[0].clone(), hand_with(wide.clone(), groups_136(), Wind::East, Wind::East)).unwrap();
        round.add_hand(p[1].clone(), hand_with(wide.clone(), vec![], Wind::South, Wind::East)).unwrap();
        assert_eq!(round.hand(&p[0]).map(|h| h.limited_total()), Some(MAX_LIMIT_SCORE));
        assert_eq!(round.committed_score_delta(&p[0]).unwrap(), 2 * MAX_LIMIT_SCORE);
        assert_zero_sum(&round);

        let p = ids(&["e", "s", "w", "n"]);
        let mut round = Round::new(Wind::East);
        round.add_hand(p[0].clone(), hand_with(wide.clone(), groups_136(), Wind::East, Wind::East)).unwrap();
        for (id, wind) in p[1..].iter().zip([Wind::South, Wind::West, Wind::North]) {
            round.add_hand(id.clone(), hand_with(wide.clone(), vec![], wind, Wind::East)).unwrap();
        }
        assert_eq!(round.committed_score_delta(&p[0]).unwrap(), MAX_LIMIT_SCORE * 2 * 3);
        assert_zero_sum(&round);
    }

    #[test]
    fn test_errors() {
        let mut round = Round::new(Wind::South);
        assert!(matches!(
            round.add_hand(PlayerId::new("x"), hand_2(Wind::East, Wind::East)),
            Err(MahjongError::InvalidState { .. })
        ));
        assert!(matches!(
            round.committed_score_delta(&PlayerId::new("x")),
            Err(MahjongError::Lookup { .. })
        ));
    }
}
