//! 計分引擎模組
//!
//! 包含單手計分所需的規則定義：
//! - `constants`: 規則常量
//! - `tiles`: 牌面
//! - `groups`: 牌組（對子/順子/刻子/槓子）
//! - `scheme`: 計分方案與元素表
//! - `scoring`: 計分規則與牌組計分
//! - `hand`: 單一玩家的手牌
//!
//! 對局狀態（座位、輪莊、累計分數）在 `service` 模組中處理。

pub mod constants;
pub mod tiles;
pub mod groups;
pub mod scheme;
pub mod scoring;
pub mod hand;

pub use constants::*;
pub use tiles::{Dragon, Suit, Tile, TileType, Wind};
pub use groups::{Group, GroupType, Visibility};
pub use scheme::{ElementDefinition, SchemeDefinition, ScoreElement, ScoringScheme, ELEMENT_COUNT, ELEMENT_DEFS};
pub use scoring::{group_element, score_group, Contribution, ScoreList, ScoredGroup};
pub use hand::{recompute, HandTotals, Qualifier, ScoredHand};
