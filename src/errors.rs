//! 錯誤類型
//!
//! 所有失敗的操作都不會留下部分更新的狀態。

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MahjongError {
    /// 計分方案定義錯誤（缺少元素、負分、倍數 < 1）
    Configuration { message: String },
    /// 在不允許的遊戲狀態下呼叫操作
    InvalidState { message: String },
    /// 座位索引越界、找不到玩家
    Lookup { message: String },
    /// 無法存在的牌組（字牌順子、數字越界）
    InvalidModel { message: String },
    /// 狀態樹無法重建
    Serialization { message: String },
}

impl MahjongError {
    pub fn configuration(message: impl Into<String>) -> Self {
        MahjongError::Configuration { message: message.into() }
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        MahjongError::InvalidState { message: message.into() }
    }

    pub fn lookup(message: impl Into<String>) -> Self {
        MahjongError::Lookup { message: message.into() }
    }

    pub fn invalid_model(message: impl Into<String>) -> Self {
        MahjongError::InvalidModel { message: message.into() }
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        MahjongError::Serialization { message: message.into() }
    }
}

impl fmt::Display for MahjongError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MahjongError::Configuration { message } => {
                write!(f, "Configuration error: {}", message)
            }
            MahjongError::InvalidState { message } => {
                write!(f, "Invalid state: {}", message)
            }
            MahjongError::Lookup { message } => {
                write!(f, "Lookup error: {}", message)
            }
            MahjongError::InvalidModel { message } => {
                write!(f, "Invalid model: {}", message)
            }
            MahjongError::Serialization { message } => {
                write!(f, "Serialization error: {}", message)
            }
        }
    }
}

impl std::error::Error for MahjongError {}

impl From<serde_json::Error> for MahjongError {
    fn from(err: serde_json::Error) -> Self {
        MahjongError::serialization(err.to_string())
    }
}

pub type MahjongResult<T> = Result<T, MahjongError>;
