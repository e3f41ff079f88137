//! 麻將計分與對局記錄引擎
//!
//! - `game`: 單手計分（牌、牌組、計分方案、手牌）
//! - `service`: 對局（玩家、單局結算、輪莊、狀態樹）
//! - `errors`: 錯誤類型

pub mod errors;
pub mod game;
pub mod service;

pub use errors::{MahjongError, MahjongResult};
pub use game::{Group, Qualifier, ScoredHand, ScoringScheme, Tile, Wind};
pub use service::{Game, GameRecord, PlayerId, PlayerRegistry, Round};
