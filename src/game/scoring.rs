//! 計分引擎
//!
//! 唯一的計分規則：總分 = (Σ 分數) × (Π 倍數)，
//! 牌組與整手的貢獻合併後只計算一次。

use super::groups::{Group, GroupType, Visibility};
use super::scheme::{ScoreElement, ScoringScheme};
use super::tiles::{Tile, Wind};

// ============================================================================
// 貢獻與列表
// ============================================================================

/// 單項計分貢獻
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Contribution {
    pub element: ScoreElement,
    pub score: i32,
    pub multiplier: i32,
}

impl Contribution {
    pub fn new(element: ScoreElement, score: i32, multiplier: i32) -> Self {
        Self { element, score, multiplier }
    }

    pub fn has_effect(&self) -> bool {
        self.score != 0 || self.multiplier != 1
    }
}

/// 貢獻列表
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ScoreList {
    items: Vec<Contribution>,
}

impl ScoreList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_contributions(items: Vec<Contribution>) -> Self {
        Self { items }
    }

    pub fn push(&mut self, contribution: Contribution) {
        self.items.push(contribution);
    }

    pub fn extend(&mut self, other: &ScoreList) {
        self.items.extend_from_slice(&other.items);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Contribution> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn score_sum(&self) -> i32 {
        self.items.iter().fold(0, |acc, c| acc.saturating_add(c.score))
    }

    pub fn multiplier_product(&self) -> i32 {
        self.items.iter().fold(1, |acc, c| acc.saturating_mul(c.multiplier))
    }

    /// (Σ 分數) × (Π 倍數)
    pub fn total(&self) -> i32 {
        self.score_sum().saturating_mul(self.multiplier_product())
    }

    pub fn has_effect(&self) -> bool {
        self.items.iter().any(Contribution::has_effect)
    }
}

impl<'a> IntoIterator for &'a ScoreList {
    type Item = &'a Contribution;
    type IntoIter = std::slice::Iter<'a, Contribution>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

// ============================================================================
// 牌組計分
// ============================================================================

/// 依牌組類型與風位決定計分元素
pub fn group_element(group: &Group, own_wind: Wind, prevailing_wind: Wind) -> ScoreElement {
    use ScoreElement::*;

    let tile = group.first_tile();
    let concealed = group.visibility() == Visibility::Concealed;

    match group.group_type() {
        GroupType::Pair => match tile {
            Tile::Suited { .. } => PairSuit,
            Tile::Dragon(_) => PairDragon,
            Tile::Wind(wind) if wind == own_wind => PairOwnWind,
            Tile::Wind(wind) if wind == prevailing_wind => PairPrevailingWind,
            Tile::Wind(_) => PairWind,
        },
        GroupType::Chow => ChowSuit,
        GroupType::Pung => match tile {
            Tile::Suited { .. } => match (concealed, tile.is_major()) {
                (false, false) => PungExposedMinorSuit,
                (false, true) => PungExposedMajorSuit,
                (true, false) => PungConcealedMinorSuit,
                (true, true) => PungConcealedMajorSuit,
            },
            Tile::Dragon(_) if concealed => PungConcealedDragon,
            Tile::Dragon(_) => PungExposedDragon,
            Tile::Wind(wind) => match (concealed, wind == own_wind, wind == prevailing_wind) {
                (false, true, true) => PungExposedPrevailingOwnWind,
                (false, true, false) => PungExposedOwnWind,
                (false, false, true) => PungExposedPrevailingWind,
                (false, false, false) => PungExposedWind,
                (true, true, true) => PungConcealedPrevailingOwnWind,
                (true, true, false) => PungConcealedOwnWind,
                (true, false, true) => PungConcealedPrevailingWind,
                (true, false, false) => PungConcealedWind,
            },
        },
        GroupType::Kong => match tile {
            Tile::Suited { .. } => match (concealed, tile.is_major()) {
                (false, false) => KongExposedMinorSuit,
                (false, true) => KongExposedMajorSuit,
                (true, false) => KongConcealedMinorSuit,
                (true, true) => KongConcealedMajorSuit,
            },
            Tile::Dragon(_) if concealed => KongConcealedDragon,
            Tile::Dragon(_) => KongExposedDragon,
            Tile::Wind(wind) => match (concealed, wind == own_wind, wind == prevailing_wind) {
                (false, true, true) => KongExposedPrevailingOwnWind,
                (false, true, false) => KongExposedOwnWind,
                (false, false, true) => KongExposedPrevailingWind,
                (false, false, false) => KongExposedWind,
                (true, true, true) => KongConcealedPrevailingOwnWind,
                (true, true, false) => KongConcealedOwnWind,
                (true, false, true) => KongConcealedPrevailingWind,
                (true, false, false) => KongConcealedWind,
            },
        },
    }
}

/// 計算單一牌組的貢獻列表
pub fn score_group(
    group: &Group,
    scheme: &ScoringScheme,
    own_wind: Wind,
    prevailing_wind: Wind,
) -> ScoreList {
    scheme.contributions(group_element(group, own_wind, prevailing_wind)).clone()
}

/// 已計分的牌組
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScoredGroup {
    group: Group,
    contributions: ScoreList,
}

impl ScoredGroup {
    pub fn new(group: Group, scheme: &ScoringScheme, own_wind: Wind, prevailing_wind: Wind) -> Self {
        let contributions = score_group(&group, scheme, own_wind, prevailing_wind);
        Self { group, contributions }
    }

    /// 翻轉明暗後重新計分（不修改自身）
    pub fn toggled(&self, scheme: &ScoringScheme, own_wind: Wind, prevailing_wind: Wind) -> Self {
        Self::new(self.group.toggled(), scheme, own_wind, prevailing_wind)
    }

    pub fn group(&self) -> &Group {
        &self.group
    }

    pub fn contributions(&self) -> &ScoreList {
        &self.contributions
    }

    pub fn total(&self) -> i32 {
        self.contributions.total()
    }
}

// ============================================================================
// 單元測試
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::tiles::{Dragon, Suit};
    use rand::seq::SliceRandom;
    use rand::{rngs::StdRng, SeedableRng};

    fn scored(group: Group, own: Wind, prevailing: Wind) -> ScoredGroup {
        ScoredGroup::new(group, &ScoringScheme::british(), own, prevailing)
    }

    #[test]
    fn test_total_law() {
        let list = ScoreList::from_contributions(vec![
            Contribution::new(ScoreElement::Mahjong, 10, 1),
            Contribution::new(ScoreElement::PungExposedDragon, 4, 2),
            Contribution::new(ScoreElement::NoChows, 0, 2),
            Contribution::new(ScoreElement::PungExposedMinorSuit, 2, 1),
        ]);
        assert_eq!(list.score_sum(), 16);
        assert_eq!(list.multiplier_product(), 4);
        assert_eq!(list.total(), 64);
        assert_eq!(ScoreList::new().total(), 0);
    }

    #[test]
    fn test_total_ignores_order() {
        let mut items = vec![
            Contribution::new(ScoreElement::Mahjong, 10, 1),
            Contribution::new(ScoreElement::KongConcealedDragon, 32, 2),
            Contribution::new(ScoreElement::AllConcealed, 0, 2),
            Contribution::new(ScoreElement::MahjongByWallTile, 2, 1),
            Contribution::new(ScoreElement::SingleSuit, 0, 2),
        ];
        let expected = ScoreList::from_contributions(items.clone()).total();
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..20 {
            items.shuffle(&mut rng);
            assert_eq!(ScoreList::from_contributions(items.clone()).total(), expected);
        }
    }

    #[test]
    fn test_suited_groups() {
        let minor = Group::pung(Tile::suited(Suit::Characters, 2), Visibility::Exposed).unwrap();
        assert_eq!(scored(minor, Wind::East, Wind::East).total(), 2);
        let concealed = Group::pung(Tile::suited(Suit::Bamboo, 3), Visibility::Concealed).unwrap();
        assert_eq!(scored(concealed, Wind::East, Wind::East).total(), 4);
        let major = Group::kong(Tile::suited(Suit::Circles, 9), Visibility::Exposed).unwrap();
        assert_eq!(scored(major, Wind::East, Wind::East).total(), 16);
        let chow = Group::chow(Tile::suited(Suit::Characters, 2)).unwrap();
        assert_eq!(scored(chow, Wind::East, Wind::East).total(), 0);
        let pair = Group::pair(Tile::suited(Suit::Bamboo, 3)).unwrap();
        assert_eq!(scored(pair, Wind::East, Wind::East).total(), 0);
    }

    #[test]
    fn test_dragon_groups() {
        let pung = Group::pung(Tile::dragon(Dragon::Red), Visibility::Exposed).unwrap();
        assert_eq!(scored(pung, Wind::East, Wind::East).total(), 8);
        let kong = Group::kong(Tile::dragon(Dragon::Green), Visibility::Concealed).unwrap();
        assert_eq!(scored(kong, Wind::East, Wind::East).total(), 64);
        let pair = Group::pair(Tile::dragon(Dragon::White)).unwrap();
        assert_eq!(scored(pair, Wind::East, Wind::East).total(), 2);
    }

    #[test]
    fn test_wind_pairs() {
        let pair = || Group::pair(Tile::wind(Wind::South)).unwrap();
        let own = scored(pair(), Wind::South, Wind::East);
        assert_eq!(own.contributions().iter().next().map(|c| c.element), Some(ScoreElement::PairOwnWind));
        let prevailing = scored(pair(), Wind::West, Wind::South);
        assert_eq!(
            prevailing.contributions().iter().next().map(|c| c.element),
            Some(ScoreElement::PairPrevailingWind)
        );
        assert_eq!(scored(pair(), Wind::West, Wind::East).total(), 0);
    }

    #[test]
    fn test_wind_pungs_and_kongs() {
        let pung = |v| Group::pung(Tile::wind(Wind::North), v).unwrap();
        assert_eq!(scored(pung(Visibility::Exposed), Wind::East, Wind::East).total(), 4);
        assert_eq!(scored(pung(Visibility::Exposed), Wind::North, Wind::East).total(), 8);
        assert_eq!(scored(pung(Visibility::Exposed), Wind::East, Wind::North).total(), 8);
        assert_eq!(scored(pung(Visibility::Exposed), Wind::North, Wind::North).total(), 16);
        assert_eq!(scored(pung(Visibility::Concealed), Wind::North, Wind::North).total(), 32);

        let kong = Group::kong(Tile::wind(Wind::North), Visibility::Concealed).unwrap();
        assert_eq!(scored(kong, Wind::North, Wind::North).total(), 128);
    }

    #[test]
    fn test_toggle_recomputes() {
        let scheme = ScoringScheme::british();
        let exposed = ScoredGroup::new(
            Group::pung(Tile::suited(Suit::Bamboo, 1), Visibility::Exposed).unwrap(),
            &scheme,
            Wind::East,
            Wind::East,
        );
        let concealed = exposed.toggled(&scheme, Wind::East, Wind::East);
        assert_eq!(exposed.total(), 4);
        assert_eq!(concealed.total(), 8);
        assert!(concealed.group().is_concealed());
        assert!(!exposed.group().is_concealed());
    }
}
