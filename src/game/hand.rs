//! 單一玩家的手牌計分
//!
//! `ScoredHand` 每次變動後都呼叫純函數 `recompute` 重新計算衍生值。

use std::collections::BTreeSet;
use std::sync::Arc;

use log::debug;
use serde::{Deserialize, Serialize};

use super::groups::{Group, GroupType};
use super::scheme::{ScoreElement, ScoringScheme};
use super::scoring::{Contribution, ScoreList, ScoredGroup};
use super::tiles::{Suit, Wind};
use crate::errors::{MahjongError, MahjongResult};

// ============================================================================
// 和牌方式
// ============================================================================

/// 和牌方式 / 整手附加條件
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Qualifier {
    LooseTile,        // 嶺上開花
    WallTile,         // 自摸
    LastWallTile,     // 海底撈月
    LastDiscard,      // 河底撈魚
    RobbingKong,      // 搶槓
    OnlyPossibleTile, // 獨聽
    OriginalCall,     // 天聽和牌
    PairConcealed,    // 對子為暗（不存入集合，改變對子明暗）
    NonMahjongOriginalCall,
}

impl Qualifier {
    pub fn all() -> &'static [Qualifier] {
        &[
            Qualifier::LooseTile,
            Qualifier::WallTile,
            Qualifier::LastWallTile,
            Qualifier::LastDiscard,
            Qualifier::RobbingKong,
            Qualifier::OnlyPossibleTile,
            Qualifier::OriginalCall,
            Qualifier::PairConcealed,
            Qualifier::NonMahjongOriginalCall,
        ]
    }

    /// 對應的計分元素
    pub fn element(&self) -> Option<ScoreElement> {
        match self {
            Qualifier::LooseTile => Some(ScoreElement::MahjongByLooseTile),
            Qualifier::WallTile => Some(ScoreElement::MahjongByWallTile),
            Qualifier::LastWallTile => Some(ScoreElement::MahjongByLastWallTile),
            Qualifier::LastDiscard => Some(ScoreElement::MahjongByLastDiscard),
            Qualifier::RobbingKong => Some(ScoreElement::MahjongByRobbingKong),
            Qualifier::OnlyPossibleTile => Some(ScoreElement::MahjongByOnlyPossibleTile),
            Qualifier::OriginalCall => Some(ScoreElement::MahjongByOriginalCall),
            Qualifier::PairConcealed => None,
            Qualifier::NonMahjongOriginalCall => Some(ScoreElement::OriginalCall),
        }
    }

    /// 只在和牌時計分
    pub fn is_mahjong_only(&self) -> bool {
        !matches!(self, Qualifier::PairConcealed | Qualifier::NonMahjongOriginalCall)
    }
}

// ============================================================================
// 重新計算
// ============================================================================

/// 手牌衍生值
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HandTotals {
    pub weight: i32,
    pub pair_count: usize,
    pub is_mahjong: bool,
    pub requires_pair_concealed_info: bool,
    pub whole_hand: ScoreList,
    pub unlimited_total: i32,
    pub limited_total: i32,
}

/// 由牌組、附加條件與方案計算衍生值
pub fn recompute(
    groups: &[ScoredGroup],
    qualifiers: &BTreeSet<Qualifier>,
    scheme: &ScoringScheme,
) -> HandTotals {
    let weight: i32 = groups.iter().map(|g| g.group().hand_size()).sum();
    let pair_count = groups.iter().filter(|g| g.group().is_pair()).count();
    let is_mahjong = weight == scheme.mahjong_hand_size() && pair_count == 1;

    let mut combined = ScoreList::new();
    for group in groups {
        combined.extend(group.contributions());
    }

    let mut whole_hand = ScoreList::new();
    let mut requires_pair_concealed_info = false;

    if is_mahjong {
        whole_hand.extend(scheme.contributions(ScoreElement::Mahjong));

        let has_chow = groups.iter().any(|g| g.group().group_type() == GroupType::Chow);
        let all_major = !has_chow && groups.iter().all(|g| g.group().first_tile().is_major());
        if all_major {
            whole_hand.extend(scheme.contributions(ScoreElement::AllMajor));
        }
        if !has_chow {
            whole_hand.extend(scheme.contributions(ScoreElement::NoChows));
        }

        let suits: BTreeSet<Suit> = groups.iter().filter_map(|g| g.group().first_tile().suit()).collect();
        if suits.len() == 1 {
            whole_hand.extend(scheme.contributions(ScoreElement::SingleSuit));
        }

        if groups.iter().all(|g| g.group().is_concealed()) {
            whole_hand.extend(scheme.contributions(ScoreElement::AllConcealed));
        }
        requires_pair_concealed_info = groups
            .iter()
            .filter(|g| !g.group().is_pair())
            .all(|g| g.group().is_concealed());

        for element in qualifiers
            .iter()
            .filter(|q| q.is_mahjong_only())
            .filter_map(Qualifier::element)
        {
            whole_hand.extend(scheme.contributions(element));
        }
    } else if qualifiers.contains(&Qualifier::NonMahjongOriginalCall) {
        whole_hand.extend(scheme.contributions(ScoreElement::OriginalCall));
    }

    combined.extend(&whole_hand);
    let unlimited_total = combined.total();
    let limited_total = unlimited_total.min(scheme.limit_score());

    HandTotals {
        weight,
        pair_count,
        is_mahjong,
        requires_pair_concealed_info,
        whole_hand,
        unlimited_total,
        limited_total,
    }
}

// ============================================================================
// 手牌
// ============================================================================

/// 一位玩家在一局中的手牌
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScoredHand {
    scheme: Arc<ScoringScheme>,
    own_wind: Wind,
    prevailing_wind: Wind,
    groups: Vec<ScoredGroup>,
    qualifiers: BTreeSet<Qualifier>,
    latest_addition: Option<usize>,
    totals: HandTotals,
}

impl ScoredHand {
    pub fn new(scheme: Arc<ScoringScheme>, own_wind: Wind, prevailing_wind: Wind) -> Self {
        let mut hand = Self {
            scheme,
            own_wind,
            prevailing_wind,
            groups: Vec::new(),
            qualifiers: BTreeSet::new(),
            latest_addition: None,
            totals: HandTotals::default(),
        };
        hand.refresh();
        hand
    }

    fn refresh(&mut self) {
        self.totals = recompute(&self.groups, &self.qualifiers, &self.scheme);
        debug!(
            "hand recomputed: weight={} mahjong={} total={} ({})",
            self.totals.weight,
            self.totals.is_mahjong,
            self.totals.limited_total,
            self.calculation()
        );
    }

    /// 加入牌組，返回其排序後的位置
    pub fn add(&mut self, group: Group) -> usize {
        let scored = ScoredGroup::new(group, &self.scheme, self.own_wind, self.prevailing_wind);
        let position = self
            .groups
            .iter()
            .position(|g| g.group().display_cmp(scored.group()).is_gt())
            .unwrap_or(self.groups.len());
        self.groups.insert(position, scored);
        self.latest_addition = Some(position);
        self.refresh();
        position
    }

    /// 移除第一個相同的牌組
    pub fn remove(&mut self, group: &Group) -> bool {
        match self.groups.iter().position(|g| g.group() == group) {
            Some(index) => {
                self.take_at(index);
                self.refresh();
                true
            }
            None => false,
        }
    }

    pub fn remove_at(&mut self, index: usize) -> MahjongResult<ScoredGroup> {
        if index >= self.groups.len() {
            return Err(MahjongError::lookup(format!(
                "group index {} out of range ({} groups)",
                index,
                self.groups.len()
            )));
        }
        let removed = self.take_at(index);
        self.refresh();
        Ok(removed)
    }

    fn take_at(&mut self, index: usize) -> ScoredGroup {
        self.latest_addition = match self.latest_addition {
            Some(latest) if latest == index => None,
            Some(latest) if latest > index => Some(latest - 1),
            other => other,
        };
        self.groups.remove(index)
    }

    /// 以新牌組取代最近加入的牌組；沒有時直接加入
    pub fn replace_latest_addition(&mut self, group: Group) -> usize {
        if let Some(latest) = self.latest_addition {
            self.take_at(latest);
        }
        self.add(group)
    }

    pub fn latest_addition_position(&self) -> Option<usize> {
        self.latest_addition
    }

    /// 還能宣告的張數
    pub fn available_tile_capacity(&self) -> i32 {
        let hand_size = self.scheme.mahjong_hand_size();
        let weight = self.totals.weight;
        if self.totals.pair_count > 1 {
            (hand_size - 1 - weight).max(0)
        } else {
            (hand_size - weight).max(0)
        }
    }

    /// 設定附加條件
    ///
    /// `PairConcealed` 不存入集合而是翻轉對子的明暗；返回顯示的牌組是否改變。
    pub fn set_qualifier(&mut self, qualifier: Qualifier, on: bool) -> bool {
        let changed = match qualifier {
            Qualifier::PairConcealed => self.set_pair_concealed(on),
            _ => {
                if on {
                    self.qualifiers.insert(qualifier);
                } else {
                    self.qualifiers.remove(&qualifier);
                }
                false
            }
        };
        self.refresh();
        changed
    }

    fn set_pair_concealed(&mut self, concealed: bool) -> bool {
        let index = match self.groups.iter().position(|g| g.group().is_pair()) {
            Some(index) => index,
            None => return false,
        };
        if self.groups[index].group().is_concealed() == concealed {
            return false;
        }
        let toggled = self.groups[index].toggled(&self.scheme, self.own_wind, self.prevailing_wind);
        self.groups[index] = toggled;
        true
    }

    pub fn has_qualifier(&self, qualifier: Qualifier) -> bool {
        match qualifier {
            Qualifier::PairConcealed => self.is_pair_concealed(),
            _ => self.qualifiers.contains(&qualifier),
        }
    }

    pub fn is_pair_concealed(&self) -> bool {
        self.groups
            .iter()
            .any(|g| g.group().is_pair() && g.group().is_concealed())
    }

    pub fn qualifiers(&self) -> &BTreeSet<Qualifier> {
        &self.qualifiers
    }

    pub fn groups(&self) -> &[ScoredGroup] {
        &self.groups
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn scheme(&self) -> &Arc<ScoringScheme> {
        &self.scheme
    }

    pub fn own_wind(&self) -> Wind {
        self.own_wind
    }

    pub fn prevailing_wind(&self) -> Wind {
        self.prevailing_wind
    }

    pub fn totals(&self) -> &HandTotals {
        &self.totals
    }

    pub fn is_mahjong(&self) -> bool {
        self.totals.is_mahjong
    }

    pub fn requires_pair_concealed_info(&self) -> bool {
        self.totals.requires_pair_concealed_info
    }

    pub fn unlimited_total(&self) -> i32 {
        self.totals.unlimited_total
    }

    pub fn limited_total(&self) -> i32 {
        self.totals.limited_total
    }

    /// 所有牌組的貢獻
    pub fn group_scores(&self) -> ScoreList {
        let mut list = ScoreList::new();
        for group in &self.groups {
            list.extend(group.contributions());
        }
        list
    }

    /// 整手的貢獻
    pub fn whole_hand_scores(&self) -> &ScoreList {
        &self.totals.whole_hand
    }

    /// 有實際效果的整手計分說明
    pub fn score_descriptions(&self) -> Vec<&'static str> {
        self.totals
            .whole_hand
            .iter()
            .filter(|c| c.has_effect())
            .map(|c: &Contribution| c.element.description())
            .collect()
    }

    /// 計算式 "(牌組+整手)x倍數"
    pub fn calculation(&self) -> String {
        let groups = self.group_scores();
        let whole = &self.totals.whole_hand;
        let multiplier = groups.multiplier_product().saturating_mul(whole.multiplier_product());
        format!("({}+{})x{}", groups.score_sum(), whole.score_sum(), multiplier)
    }
}

// ============================================================================
// 單元測試
// ============================================================================
