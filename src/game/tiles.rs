//! 牌面定義
//!
//! `TileType` 的宣告順序即手牌中牌組的顯示排序（箭牌 < 風牌 < 數牌）。

use std::fmt;

use serde::{Deserialize, Serialize};

use super::constants::{MAX_NUMBER, MIN_NUMBER};
use crate::errors::{MahjongError, MahjongResult};

/// 數牌花色
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Suit {
    Circles,    // 筒
    Characters, // 萬
    Bamboo,     // 索
}

impl Suit {
    pub fn all() -> &'static [Suit] {
        &[Suit::Circles, Suit::Characters, Suit::Bamboo]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Suit::Circles => "CIRCLES",
            Suit::Characters => "CHARACTERS",
            Suit::Bamboo => "BAMBOO",
        }
    }
}

/// 箭牌
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dragon {
    Red,
    White,
    Green,
}

impl Dragon {
    pub fn all() -> &'static [Dragon] {
        &[Dragon::Red, Dragon::White, Dragon::Green]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Dragon::Red => "RED",
            Dragon::White => "WHITE",
            Dragon::Green => "GREEN",
        }
    }
}

/// 風
///
/// 同時用於風牌、玩家門風與場風。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Wind {
    #[default]
    East,
    South,
    West,
    North,
}

impl Wind {
    pub fn all() -> &'static [Wind] {
        &[Wind::East, Wind::South, Wind::West, Wind::North]
    }

    /// 正常輪轉順序中的下一個風（北之後回到東）
    pub fn next(&self) -> Wind {
        match self {
            Wind::East => Wind::South,
            Wind::South => Wind::West,
            Wind::West => Wind::North,
            Wind::North => Wind::East,
        }
    }

    pub fn to_index(&self) -> usize {
        match self {
            Wind::East => 0,
            Wind::South => 1,
            Wind::West => 2,
            Wind::North => 3,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Wind::East => "EAST",
            Wind::South => "SOUTH",
            Wind::West => "WEST",
            Wind::North => "NORTH",
        }
    }
}

/// 牌的種類（決定排序的第一鍵）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TileType {
    Dragon,
    Wind,
    Suit,
}

/// 單張牌
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tile {
    Suited { suit: Suit, number: u8 }, // number: 1..=9
    Wind(Wind),
    Dragon(Dragon),
}

impl Tile {
    /// 建立數牌
    ///
    /// # Panics
    ///
    /// `number` 不在 1..=9 時 panic；來自外部的資料請用 [`Tile::try_suited`]。
    pub fn suited(suit: Suit, number: u8) -> Self {
        assert!(
            (MIN_NUMBER..=MAX_NUMBER).contains(&number),
            "suited tile number out of range: {}",
            number
        );
        Tile::Suited { suit, number }
    }

    pub fn try_suited(suit: Suit, number: u8) -> MahjongResult<Self> {
        if (MIN_NUMBER..=MAX_NUMBER).contains(&number) {
            Ok(Tile::Suited { suit, number })
        } else {
            Err(MahjongError::invalid_model(format!(
                "suited tile number must be 1..=9, got {}",
                number
            )))
        }
    }

    pub fn wind(wind: Wind) -> Self {
        Tile::Wind(wind)
    }

    pub fn dragon(dragon: Dragon) -> Self {
        Tile::Dragon(dragon)
    }

    /// 確認牌面合法（反序列化後使用）
    pub fn validated(self) -> MahjongResult<Self> {
        match self {
            Tile::Suited { suit, number } => Tile::try_suited(suit, number),
            other => Ok(other),
        }
    }

    pub fn tile_type(&self) -> TileType {
        match self {
            Tile::Suited { .. } => TileType::Suit,
            Tile::Wind(_) => TileType::Wind,
            Tile::Dragon(_) => TileType::Dragon,
        }
    }

    pub fn suit(&self) -> Option<Suit> {
        match self {
            Tile::Suited { suit, .. } => Some(*suit),
            _ => None,
        }
    }

    pub fn number(&self) -> Option<u8> {
        match self {
            Tile::Suited { number, .. } => Some(*number),
            _ => None,
        }
    }

    /// 么九牌：字牌以及 1、9 數牌
    pub fn is_major(&self) -> bool {
        match self {
            Tile::Suited { number, .. } => *number == MIN_NUMBER || *number == MAX_NUMBER,
            Tile::Wind(_) | Tile::Dragon(_) => true,
        }
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tile::Suited { suit, number } => write!(f, "[{} {}]", number, suit.name()),
            Tile::Wind(wind) => write!(f, "[{} WIND]", wind.name()),
            Tile::Dragon(dragon) => write!(f, "[{} DRAGON]", dragon.name()),
        }
    }
}

// ============================================================================
// 單元測試
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_major() {
        assert!(Tile::suited(Suit::Bamboo, 1).is_major());
        assert!(Tile::suited(Suit::Circles, 9).is_major());
        for number in 2..=8 {
            assert!(!Tile::suited(Suit::Characters, number).is_major());
        }
        for wind in Wind::all() {
            assert!(Tile::wind(*wind).is_major());
        }
        for dragon in Dragon::all() {
            assert!(Tile::dragon(*dragon).is_major());
        }
    }

    #[test]
    fn test_equality_by_value() {
        assert_eq!(Tile::suited(Suit::Bamboo, 5), Tile::suited(Suit::Bamboo, 5));
        assert_ne!(Tile::suited(Suit::Bamboo, 5), Tile::suited(Suit::Circles, 5));
        assert_ne!(Tile::wind(Wind::East), Tile::wind(Wind::South));
        assert_ne!(Tile::dragon(Dragon::Red), Tile::wind(Wind::East));
    }

    #[test]
    fn test_try_suited_rejects_out_of_range() {
        assert!(Tile::try_suited(Suit::Bamboo, 0).is_err());
        assert!(Tile::try_suited(Suit::Bamboo, 10).is_err());
        assert!(Tile::try_suited(Suit::Bamboo, 9).is_ok());
    }

    #[test]
    fn test_wind_rotation() {
        assert_eq!(Wind::East.next(), Wind::South);
        assert_eq!(Wind::North.next(), Wind::East);
        let mut wind = Wind::East;
        for _ in 0..4 {
            wind = wind.next();
        }
        assert_eq!(wind, Wind::East);
    }

    #[test]
    fn test_tile_type_order() {
        assert!(TileType::Dragon < TileType::Wind);
        assert!(TileType::Wind < TileType::Suit);
    }
}
