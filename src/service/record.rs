//! 可序列化的狀態樹
//!
//! 只記錄輸入（座位、牌組、和牌方式、各局），衍生值在載入時重新計算。

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::errors::{MahjongError, MahjongResult};
use crate::game::{
    Group, GroupType, Qualifier, ScoredHand, ScoringScheme, Tile, Visibility, Wind,
    GAME_RECORD_VERSION,
};
use super::player::PlayerId;
use super::round::Round;
use super::state::Scores;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub id: PlayerId,
    pub name: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatRecord {
    pub player_id: Option<PlayerId>,
    #[serde(default)]
    pub starting: bool,
    #[serde(default)]
    pub ending: bool,
    #[serde(default)]
    pub east: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRecord {
    pub kind: GroupType,
    pub visibility: Visibility,
    pub first_tile: Tile,
}

impl GroupRecord {
    pub fn from_group(group: &Group) -> Self {
        Self {
            kind: group.group_type(),
            visibility: group.visibility(),
            first_tile: group.first_tile(),
        }
    }

    pub fn to_group(&self) -> MahjongResult<Group> {
        Group::restore(self.kind, self.first_tile, self.visibility)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandRecord {
    pub groups: Vec<GroupRecord>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub completed_by: BTreeSet<Qualifier>,
}

impl HandRecord {
    pub fn from_hand(hand: &ScoredHand) -> Self {
        Self {
            groups: hand.groups().iter().map(|g| GroupRecord::from_group(g.group())).collect(),
            completed_by: hand.qualifiers().clone(),
        }
    }

    pub fn to_hand(
        &self,
        scheme: &Arc<ScoringScheme>,
        own_wind: Wind,
        prevailing_wind: Wind,
    ) -> MahjongResult<ScoredHand> {
        let mut hand = ScoredHand::new(scheme.clone(), own_wind, prevailing_wind);
        for group in &self.groups {
            hand.add(group.to_group()?);
        }
        for qualifier in &self.completed_by {
            hand.set_qualifier(*qualifier, true);
        }
        Ok(hand)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundHandRecord {
    pub player_id: PlayerId,
    pub player_wind: Wind,
    pub hand: HandRecord,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundRecord {
    pub prevailing_wind: Wind,
    pub hands: Vec<RoundHandRecord>,
}

impl RoundRecord {
    pub fn from_round(round: &Round) -> Self {
        Self {
            prevailing_wind: round.prevailing_wind(),
            hands: round
                .entries()
                .iter()
                .map(|e| RoundHandRecord {
                    player_id: e.player().clone(),
                    player_wind: e.player_wind(),
                    hand: HandRecord::from_hand(e.hand()),
                })
                .collect(),
        }
    }

    pub fn to_round(&self, scheme: &Arc<ScoringScheme>) -> MahjongResult<Round> {
        let mut round = Round::new(self.prevailing_wind);
        for entry in &self.hands {
            let hand = entry.hand.to_hand(scheme, entry.player_wind, self.prevailing_wind)?;
            round.add_hand(entry.player_id.clone(), hand)?;
        }
        Ok(round)
    }
}

/// 整場對局的狀態樹
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    pub version: u32,
    pub scheme_name: String,
    pub players: Vec<PlayerRecord>,
    pub seats: Vec<SeatRecord>,
    pub started: bool,
    pub finished: bool,
    pub prevailing_wind: Wind,
    pub rounds: Vec<RoundRecord>,
    pub scores: Vec<Scores>,
}

impl GameRecord {
    pub fn to_json(&self) -> MahjongResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> MahjongResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub(crate) fn check_version(&self) -> MahjongResult<()> {
        if self.version != GAME_RECORD_VERSION {
            return Err(MahjongError::serialization(format!(
                "unsupported record version {} (expected {})",
                self.version, GAME_RECORD_VERSION
            )));
        }
        Ok(())
    }
}

// ============================================================================
// 單元測試
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Dragon, Suit};

    #[test]
    fn test_concealed_pair_survives_round_trip() {
        let scheme = Arc::new(ScoringScheme::british());
        let mut hand = ScoredHand::new(scheme.clone(), Wind::South, Wind::East);
        for tile in [1, 3, 5, 7] {
            hand.add(Group::pung(Tile::suited(Suit::Bamboo, tile), Visibility::Concealed).unwrap());
        }
        hand.add(Group::pair(Tile::dragon(Dragon::Green)).unwrap());
        hand.set_qualifier(Qualifier::PairConcealed, true);
        hand.set_qualifier(Qualifier::WallTile, true);

        let record = HandRecord::from_hand(&hand);
        let json = serde_json::to_string(&record).unwrap();
        let restored: HandRecord = serde_json::from_str(&json).unwrap();
        let rebuilt = restored.to_hand(&scheme, Wind::South, Wind::East).unwrap();

        assert!(rebuilt.is_pair_concealed());
        assert!(rebuilt.has_qualifier(Qualifier::WallTile));
        assert_eq!(rebuilt.is_mahjong(), hand.is_mahjong());
        assert_eq!(rebuilt.unlimited_total(), hand.unlimited_total());
        assert_eq!(rebuilt.groups(), hand.groups());
    }

    #[test]
    fn test_group_record_json_shape() {
        let record = GroupRecord::from_group(&Group::chow(Tile::suited(Suit::Circles, 9)).unwrap());
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            r#"{"kind":"chow","visibility":"exposed","first_tile":{"suited":{"suit":"circles","number":7}}}"#
        );
    }

    #[test]
    fn test_invalid_group_record_is_rejected() {
        let json = r#"{"kind":"chow","visibility":"exposed","first_tile":{"wind":"east"}}"#;
        let record: GroupRecord = serde_json::from_str(json).unwrap();
        assert!(matches!(record.to_group(), Err(MahjongError::InvalidModel { .. })));

        let json = r#"{"kind":"pung","visibility":"exposed","first_tile":{"suited":{"suit":"bamboo","number":12}}}"#;
        let record: GroupRecord = serde_json::from_str(json).unwrap();
        assert!(record.to_group().is_err());
    }

    #[test]
    fn test_completed_by_is_omitted_when_empty() {
        let json = serde_json::to_string(&HandRecord::default()).unwrap();
        assert_eq!(json, r#"{"groups":[]}"#);
    }

    #[test]
    fn test_bad_json_is_serialization_error() {
        assert!(matches!(
            GameRecord::from_json("[1, 2"),
            Err(MahjongError::Serialization { .. })
        ));
    }
}
