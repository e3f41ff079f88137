//! 計分方案
//!
//! 計分元素的中繼資料放在聲明式 `ELEMENT_DEFS` 表中（順序與 `ScoreElement` 一致），
//! 同一張表也帶有內建英式規則的分值。
//!
//! 外部提供的方案以 `SchemeDefinition`（serde）載入，載入時驗證：
//! 每個元素都必須定義、不可重複、分數 ≥ 0、倍數 ≥ 1。

use std::collections::BTreeSet;

use log::warn;
use serde::{Deserialize, Serialize};

use super::constants::{
    DEFAULT_INITIAL_SCORE, DEFAULT_LIMIT_SCORE, DEFAULT_MAHJONG_HAND_SIZE, MAX_INITIAL_SCORE,
    MAX_LIMIT_SCORE,
};
use super::scoring::{Contribution, ScoreList};
use crate::errors::{MahjongError, MahjongResult};

// ============================================================================
// 計分元素定義表
// ============================================================================

/// 計分元素定義
#[derive(Clone, Copy)]
pub struct ElementDef {
    pub element: ScoreElement,
    pub key: &'static str,
    pub description: &'static str,
    pub british_score: i32,
    pub british_multiplier: i32,
}

pub const ELEMENT_COUNT: usize = 51;

macro_rules! def {
    ($element:ident, $key:expr, $description:expr, $score:expr, $multiplier:expr) => {
        ElementDef {
            element: ScoreElement::$element,
            key: $key,
            description: $description,
            british_score: $score,
            british_multiplier: $multiplier,
        }
    };
}

/// 計分元素表（順序與 ScoreElement 枚舉值一致）
pub static ELEMENT_DEFS: [ElementDef; ELEMENT_COUNT] = [
    // 對子
    def!(PairSuit, "pair-suit", "Pair of suit tiles", 0, 1),
    def!(PairWind, "pair-wind", "Pair of winds", 0, 1),
    def!(PairOwnWind, "pair-own-wind", "Pair of own wind", 2, 1),
    def!(PairPrevailingWind, "pair-prevailing-wind", "Pair of prevailing wind", 2, 1),
    def!(PairDragon, "pair-dragon", "Pair of dragons", 2, 1),
    // 順子
    def!(ChowSuit, "chow-suit", "Chow", 0, 1),
    // 刻子
    def!(PungExposedMinorSuit, "pung-exposed-minor-suit", "Exposed pung of minor tiles", 2, 1),
    def!(PungExposedMajorSuit, "pung-exposed-major-suit", "Exposed pung of major tiles", 4, 1),
    def!(PungConcealedMinorSuit, "pung-concealed-minor-suit", "Concealed pung of minor tiles", 4, 1),
    def!(PungConcealedMajorSuit, "pung-concealed-major-suit", "Concealed pung of major tiles", 8, 1),
    def!(PungExposedPrevailingOwnWind, "pung-exposed-prevailing-own-wind", "Exposed pung of own and prevailing wind", 4, 1),
    def!(PungExposedOwnWind, "pung-exposed-own-wind", "Exposed pung of own wind", 4, 1),
    def!(PungExposedPrevailingWind, "pung-exposed-prevailing-wind", "Exposed pung of prevailing wind", 4, 1),
    def!(PungExposedWind, "pung-exposed-wind", "Exposed pung of winds", 4, 1),
    def!(PungConcealedPrevailingOwnWind, "pung-concealed-prevailing-own-wind", "Concealed pung of own and prevailing wind", 8, 1),
    def!(PungConcealedOwnWind, "pung-concealed-own-wind", "Concealed pung of own wind", 8, 1),
    def!(PungConcealedPrevailingWind, "pung-concealed-prevailing-wind", "Concealed pung of prevailing wind", 8, 1),
    def!(PungConcealedWind, "pung-concealed-wind", "Concealed pung of winds", 8, 1),
    def!(PungOwnWindMultiplier, "pung-own-wind-multiplier", "Pung of own wind", 0, 2),
    def!(PungPrevailingWindMultiplier, "pung-prevailing-wind-multiplier", "Pung of prevailing wind", 0, 2),
    def!(PungExposedDragon, "pung-exposed-dragon", "Exposed pung of dragons", 4, 2),
    def!(PungConcealedDragon, "pung-concealed-dragon", "Concealed pung of dragons", 8, 2),
    // 槓子
    def!(KongExposedMinorSuit, "kong-exposed-minor-suit", "Exposed kong of minor tiles", 8, 1),
    def!(KongExposedMajorSuit, "kong-exposed-major-suit", "Exposed kong of major tiles", 16, 1),
    def!(KongConcealedMinorSuit, "kong-concealed-minor-suit", "Concealed kong of minor tiles", 16, 1),
    def!(KongConcealedMajorSuit, "kong-concealed-major-suit", "Concealed kong of major tiles", 32, 1),
    def!(KongExposedPrevailingOwnWind, "kong-exposed-prevailing-own-wind", "Exposed kong of own and prevailing wind", 16, 1),
    def!(KongExposedOwnWind, "kong-exposed-own-wind", "Exposed kong of own wind", 16, 1),
    def!(KongExposedPrevailingWind, "kong-exposed-prevailing-wind", "Exposed kong of prevailing wind", 16, 1),
    def!(KongExposedWind, "kong-exposed-wind", "Exposed kong of winds", 16, 1),
    def!(KongConcealedPrevailingOwnWind, "kong-concealed-prevailing-own-wind", "Concealed kong of own and prevailing wind", 32, 1),
    def!(KongConcealedOwnWind, "kong-concealed-own-wind", "Concealed kong of own wind", 32, 1),
    def!(KongConcealedPrevailingWind, "kong-concealed-prevailing-wind", "Concealed kong of prevailing wind", 32, 1),
    def!(KongConcealedWind, "kong-concealed-wind", "Concealed kong of winds", 32, 1),
    def!(KongOwnWindMultiplier, "kong-own-wind-multiplier", "Kong of own wind", 0, 2),
    def!(KongPrevailingWindMultiplier, "kong-prevailing-wind-multiplier", "Kong of prevailing wind", 0, 2),
    def!(KongExposedDragon, "kong-exposed-dragon", "Exposed kong of dragons", 16, 2),
    def!(KongConcealedDragon, "kong-concealed-dragon", "Concealed kong of dragons", 32, 2),
    // 整手
    def!(OriginalCall, "original-call", "Original call", 0, 1),
    def!(Mahjong, "mahjong", "Mahjong", 10, 1),
    def!(NoChows, "no-chows", "No chows", 0, 2),
    def!(SingleSuit, "single-suit", "Single suit", 0, 2),
    def!(AllMajor, "all-major", "All major tiles", 0, 2),
    def!(AllConcealed, "all-concealed", "All concealed", 0, 2),
    def!(MahjongByLooseTile, "mahjong-by-loose-tile", "Mahjong by loose tile", 0, 2),
    def!(MahjongByOnlyPossibleTile, "mahjong-by-only-possible-tile", "Mahjong by only possible tile", 2, 1),
    def!(MahjongByWallTile, "mahjong-by-wall-tile", "Mahjong by wall tile", 2, 1),
    def!(MahjongByLastWallTile, "mahjong-by-last-wall-tile", "Mahjong by last wall tile", 0, 2),
    def!(MahjongByLastDiscard, "mahjong-by-last-discard", "Mahjong by last discard", 0, 2),
    def!(MahjongByRobbingKong, "mahjong-by-robbing-kong", "Mahjong by robbing a kong", 0, 2),
    def!(MahjongByOriginalCall, "mahjong-by-original-call", "Mahjong by original call", 0, 2),
];

/// 計分元素
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ScoreElement {
    PairSuit,
    PairWind,
    PairOwnWind,
    PairPrevailingWind,
    PairDragon,
    ChowSuit,
    PungExposedMinorSuit,
    PungExposedMajorSuit,
    PungConcealedMinorSuit,
    PungConcealedMajorSuit,
    PungExposedPrevailingOwnWind,
    PungExposedOwnWind,
    PungExposedPrevailingWind,
    PungExposedWind,
    PungConcealedPrevailingOwnWind,
    PungConcealedOwnWind,
    PungConcealedPrevailingWind,
    PungConcealedWind,
    PungOwnWindMultiplier,
    PungPrevailingWindMultiplier,
    PungExposedDragon,
    PungConcealedDragon,
    KongExposedMinorSuit,
    KongExposedMajorSuit,
    KongConcealedMinorSuit,
    KongConcealedMajorSuit,
    KongExposedPrevailingOwnWind,
    KongExposedOwnWind,
    KongExposedPrevailingWind,
    KongExposedWind,
    KongConcealedPrevailingOwnWind,
    KongConcealedOwnWind,
    KongConcealedPrevailingWind,
    KongConcealedWind,
    KongOwnWindMultiplier,
    KongPrevailingWindMultiplier,
    KongExposedDragon,
    KongConcealedDragon,
    OriginalCall,        // 未和牌時的天聽
    Mahjong,
    NoChows,
    SingleSuit,
    AllMajor,
    AllConcealed,
    MahjongByLooseTile,
    MahjongByOnlyPossibleTile,
    MahjongByWallTile,
    MahjongByLastWallTile,
    MahjongByLastDiscard,
    MahjongByRobbingKong,
    MahjongByOriginalCall,
}

impl ScoreElement {
    pub fn all() -> impl Iterator<Item = ScoreElement> {
        ELEMENT_DEFS.iter().map(|def| def.element)
    }

    pub fn to_index(&self) -> usize {
        *self as usize
    }

    pub fn key(&self) -> &'static str {
        ELEMENT_DEFS[self.to_index()].key
    }

    pub fn description(&self) -> &'static str {
        ELEMENT_DEFS[self.to_index()].description
    }

    pub fn from_key(key: &str) -> Option<ScoreElement> {
        ELEMENT_DEFS.iter().find(|def| def.key == key).map(|def| def.element)
    }

    /// 組合元素：風刻/風槓在基礎分之後附加的門風、場風倍數
    pub fn components(&self) -> &'static [ScoreElement] {
        use ScoreElement::*;
        match self {
            PungExposedPrevailingOwnWind | PungConcealedPrevailingOwnWind => {
                &[PungOwnWindMultiplier, PungPrevailingWindMultiplier]
            }
            PungExposedOwnWind | PungConcealedOwnWind => &[PungOwnWindMultiplier],
            PungExposedPrevailingWind | PungConcealedPrevailingWind => &[PungPrevailingWindMultiplier],
            KongExposedPrevailingOwnWind | KongConcealedPrevailingOwnWind => {
                &[KongOwnWindMultiplier, KongPrevailingWindMultiplier]
            }
            KongExposedOwnWind | KongConcealedOwnWind => &[KongOwnWindMultiplier],
            KongExposedPrevailingWind | KongConcealedPrevailingWind => &[KongPrevailingWindMultiplier],
            _ => &[],
        }
    }
}

// ============================================================================
// 方案定義（外部提供）
// ============================================================================

fn default_hand_size() -> i32 {
    DEFAULT_MAHJONG_HAND_SIZE
}

fn default_limit_score() -> i32 {
    DEFAULT_LIMIT_SCORE
}

fn default_initial_score() -> i32 {
    DEFAULT_INITIAL_SCORE
}

fn default_multiplier() -> i32 {
    1
}

/// 單一元素的原始定義
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementDefinition {
    pub key: String,
    #[serde(default)]
    pub score: i32,
    #[serde(default = "default_multiplier")]
    pub multiplier: i32,
}

/// 方案原始定義
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SchemeDefinition {
    pub name: String,
    pub display_name: String,
    #[serde(default = "default_hand_size")]
    pub mahjong_hand_size: i32,
    #[serde(default = "default_limit_score")]
    pub limit_score: i32,
    #[serde(default = "default_initial_score")]
    pub initial_score: i32,
    pub elements: Vec<ElementDefinition>,
}

impl SchemeDefinition {
    pub fn british() -> Self {
        Self {
            name: "british".to_string(),
            display_name: "British".to_string(),
            mahjong_hand_size: DEFAULT_MAHJONG_HAND_SIZE,
            limit_score: DEFAULT_LIMIT_SCORE,
            initial_score: DEFAULT_INITIAL_SCORE,
            elements: ELEMENT_DEFS
                .iter()
                .map(|def| ElementDefinition {
                    key: def.key.to_string(),
                    score: def.british_score,
                    multiplier: def.british_multiplier,
                })
                .collect(),
        }
    }

    pub fn from_json_str(json: &str) -> MahjongResult<Self> {
        serde_json::from_str(json).map_err(|err| {
            warn!("scheme definition rejected: {}", err);
            MahjongError::configuration(err.to_string())
        })
    }

    pub fn to_json(&self) -> MahjongResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

// ============================================================================
// 計分方案
// ============================================================================

/// 已載入的計分方案（唯讀）
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScoringScheme {
    name: String,
    display_name: String,
    mahjong_hand_size: i32,
    limit_score: i32,
    initial_score: i32,
    base: Vec<Contribution>,  // 依 ScoreElement 索引
    lists: Vec<ScoreList>,    // 依 ScoreElement 索引，已展開組合元素
}

impl ScoringScheme {
    /// 內建英式方案
    pub fn british() -> Self {
        let base = ELEMENT_DEFS
            .iter()
            .map(|def| Contribution::new(def.element, def.british_score, def.british_multiplier))
            .collect();
        Self::build(
            "british".to_string(),
            "British".to_string(),
            DEFAULT_MAHJONG_HAND_SIZE,
            DEFAULT_LIMIT_SCORE,
            DEFAULT_INITIAL_SCORE,
            base,
        )
    }

    pub fn from_definition(definition: &SchemeDefinition) -> MahjongResult<Self> {
        Self::load(definition).map_err(|err| {
            warn!("scheme '{}' rejected: {}", definition.name, err);
            err
        })
    }

    pub fn from_json_str(json: &str) -> MahjongResult<Self> {
        Self::from_definition(&SchemeDefinition::from_json_str(json)?)
    }

    fn load(definition: &SchemeDefinition) -> MahjongResult<Self> {
        if definition.mahjong_hand_size <= 0 {
            return Err(MahjongError::configuration(format!(
                "mahjong hand size must be positive, got {}",
                definition.mahjong_hand_size
            )));
        }
        if definition.limit_score < 0 || definition.initial_score < 0 {
            return Err(MahjongError::configuration(
                "limit score and initial score must not be negative",
            ));
        }
        if definition.limit_score > MAX_LIMIT_SCORE {
            return Err(MahjongError::configuration(format!(
                "limit score {} exceeds {}",
                definition.limit_score, MAX_LIMIT_SCORE
            )));
        }
        if definition.initial_score > MAX_INITIAL_SCORE {
            return Err(MahjongError::configuration(format!(
                "initial score {} exceeds {}",
                definition.initial_score, MAX_INITIAL_SCORE
            )));
        }

        let mut slots: Vec<Option<Contribution>> = vec![None; ELEMENT_COUNT];
        for entry in &definition.elements {
            let element = ScoreElement::from_key(&entry.key).ok_or_else(|| {
                MahjongError::configuration(format!("unknown score element '{}'", entry.key))
            })?;
            if entry.score < 0 {
                return Err(MahjongError::configuration(format!(
                    "'{}' has negative score {}",
                    entry.key, entry.score
                )));
            }
            if entry.multiplier < 1 {
                return Err(MahjongError::configuration(format!(
                    "'{}' has multiplier {} (must be at least 1)",
                    entry.key, entry.multiplier
                )));
            }
            let slot = &mut slots[element.to_index()];
            if slot.is_some() {
                return Err(MahjongError::configuration(format!(
                    "'{}' is defined more than once",
                    entry.key
                )));
            }
            *slot = Some(Contribution::new(element, entry.score, entry.multiplier));
        }

        let missing: BTreeSet<&str> = ScoreElement::all()
            .filter(|element| slots[element.to_index()].is_none())
            .map(|element| element.key())
            .collect();
        if !missing.is_empty() {
            return Err(MahjongError::configuration(format!(
                "missing score elements: {}",
                missing.into_iter().collect::<Vec<_>>().join(", ")
            )));
        }

        let base = slots.into_iter().flatten().collect();
        Ok(Self::build(
            definition.name.clone(),
            definition.display_name.clone(),
            definition.mahjong_hand_size,
            definition.limit_score,
            definition.initial_score,
            base,
        ))
    }

    fn build(
        name: String,
        display_name: String,
        mahjong_hand_size: i32,
        limit_score: i32,
        initial_score: i32,
        base: Vec<Contribution>,
    ) -> Self {
        let lists = ScoreElement::all()
            .map(|element| {
                let mut list = ScoreList::new();
                list.push(base[element.to_index()]);
                for component in element.components() {
                    list.push(base[component.to_index()]);
                }
                list
            })
            .collect();

        Self {
            name,
            display_name,
            mahjong_hand_size,
            limit_score,
            initial_score,
            base,
            lists,
        }
    }

    /// 匯出為可重新載入的定義
    pub fn to_definition(&self) -> SchemeDefinition {
        SchemeDefinition {
            name: self.name.clone(),
            display_name: self.display_name.clone(),
            mahjong_hand_size: self.mahjong_hand_size,
            limit_score: self.limit_score,
            initial_score: self.initial_score,
            elements: self
                .base
                .iter()
                .map(|c| ElementDefinition {
                    key: c.element.key().to_string(),
                    score: c.score,
                    multiplier: c.multiplier,
                })
                .collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn mahjong_hand_size(&self) -> i32 {
        self.mahjong_hand_size
    }

    pub fn limit_score(&self) -> i32 {
        self.limit_score
    }

    pub fn initial_score(&self) -> i32 {
        self.initial_score
    }

    /// 元素的貢獻列表（載入時已驗證完整，不會失敗）
    pub fn contributions(&self, element: ScoreElement) -> &ScoreList {
        &self.lists[element.to_index()]
    }

    pub fn contributions_for(&self, key: &str) -> MahjongResult<&ScoreList> {
        ScoreElement::from_key(key)
            .map(|element| self.contributions(element))
            .ok_or_else(|| MahjongError::configuration(format!("unknown score element '{}'", key)))
    }

    /// 是否有任何非零分數或非 1 倍數
    pub fn has_effect(&self, element: ScoreElement) -> bool {
        self.contributions(element).has_effect()
    }
}

impl Default for ScoringScheme {
    fn default() -> Self {
        Self::british()
    }
}

// ============================================================================
// 單元測試
// ============================================================================
