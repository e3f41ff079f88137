//! 對局服務層
//!
//! 在計分引擎之上管理玩家身分、單局結算、對局狀態機與可序列化的狀態樹

pub mod player;
pub mod round;
pub mod state;
pub mod record;
pub mod summary;

pub use player::{Player, PlayerId, PlayerRegistry};
pub use round::{Round, RoundEntry};
pub use state::{Game, Scores};
pub use record::{GameRecord, GroupRecord, HandRecord, PlayerRecord, RoundHandRecord, RoundRecord, SeatRecord};
pub use summary::RoundSummary;
