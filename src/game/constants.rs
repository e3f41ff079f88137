//! 規則常量定義

// ============================================================================
// 計分方案預設值
// ============================================================================

pub const DEFAULT_MAHJONG_HAND_SIZE: i32 = 14; // 和牌所需的有效張數（槓只算 3 張）
pub const DEFAULT_LIMIT_SCORE: i32 = 1000;     // 單手上限
pub const DEFAULT_INITIAL_SCORE: i32 = 2000;   // 開局分數
pub const MAX_LIMIT_SCORE: i32 = 10_000_000;   // 上限的最大允許值（單局轉移最多 12 倍）
pub const MAX_INITIAL_SCORE: i32 = 1_000_000_000;

// ============================================================================
// 牌桌常量
// ============================================================================

pub const SEAT_COUNT: usize = 4;    // 座位數
pub const MIN_PLAYERS: usize = 2;   // 開局最少人數
pub const EAST_FACTOR: i32 = 2;     // 任一方為東家時的支付倍數
pub const NORMAL_FACTOR: i32 = 1;

// ============================================================================
// 牌面常量
// ============================================================================

pub const MIN_NUMBER: u8 = 1;
pub const MAX_NUMBER: u8 = 9;
pub const MAX_CHOW_START: u8 = 7;   // 順子最大起始數字（7-8-9）

pub const GAME_RECORD_VERSION: u32 = 1;
