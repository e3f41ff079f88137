//! 牌組定義（對子、順子、刻子、槓子）

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::constants::MAX_CHOW_START;
use super::tiles::{Tile, TileType};
use crate::errors::{MahjongError, MahjongResult};

/// 牌組類型
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupType {
    Pair,
    Chow,
    Pung,
    Kong,
}

impl GroupType {
    pub fn all() -> &'static [GroupType] {
        &[GroupType::Pair, GroupType::Chow, GroupType::Pung, GroupType::Kong]
    }

    /// 實際張數
    pub fn size(&self) -> usize {
        match self {
            GroupType::Pair => 2,
            GroupType::Chow | GroupType::Pung => 3,
            GroupType::Kong => 4,
        }
    }

    /// 計入和牌張數的權重（槓子只算 3 張）
    pub fn hand_size(&self) -> i32 {
        match self {
            GroupType::Pair => 2,
            GroupType::Chow | GroupType::Pung | GroupType::Kong => 3,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            GroupType::Pair => "PAIR",
            GroupType::Chow => "CHOW",
            GroupType::Pung => "PUNG",
            GroupType::Kong => "KONG",
        }
    }
}

/// 明/暗
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Exposed,
    Concealed,
}

impl Visibility {
    pub fn toggled(&self) -> Visibility {
        match self {
            Visibility::Exposed => Visibility::Concealed,
            Visibility::Concealed => Visibility::Exposed,
        }
    }
}

/// 一組牌
///
/// 建立後不可變；對子與順子一律為明牌。
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Group {
    group_type: GroupType,
    tiles: Vec<Tile>,
    visibility: Visibility,
}

impl Group {
    pub fn new(group_type: GroupType, tile: Tile, visibility: Visibility) -> MahjongResult<Self> {
        let tile = tile.validated()?;
        let visibility = match group_type {
            GroupType::Pair | GroupType::Chow => Visibility::Exposed,
            GroupType::Pung | GroupType::Kong => visibility,
        };

        let tiles = match group_type {
            GroupType::Chow => chow_tiles(tile)?,
            _ => vec![tile; group_type.size()],
        };

        Ok(Self { group_type, tiles, visibility })
    }

    pub fn pair(tile: Tile) -> MahjongResult<Self> {
        Self::new(GroupType::Pair, tile, Visibility::Exposed)
    }

    /// 順子；起始牌為 8 或 9 時一律變成 7-8-9
    pub fn chow(tile: Tile) -> MahjongResult<Self> {
        Self::new(GroupType::Chow, tile, Visibility::Exposed)
    }

    pub fn pung(tile: Tile, visibility: Visibility) -> MahjongResult<Self> {
        Self::new(GroupType::Pung, tile, visibility)
    }

    pub fn kong(tile: Tile, visibility: Visibility) -> MahjongResult<Self> {
        Self::new(GroupType::Kong, tile, visibility)
    }

    /// 從存檔還原，保留暗對子
    pub fn restore(group_type: GroupType, tile: Tile, visibility: Visibility) -> MahjongResult<Self> {
        let group = Self::new(group_type, tile, visibility)?;
        if group.visibility != visibility {
            Ok(group.toggled())
        } else {
            Ok(group)
        }
    }

    /// 翻轉明暗，不套用對子/順子的明牌規則
    pub fn toggled(&self) -> Self {
        Self {
            group_type: self.group_type,
            tiles: self.tiles.clone(),
            visibility: self.visibility.toggled(),
        }
    }

    pub fn group_type(&self) -> GroupType {
        self.group_type
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn is_concealed(&self) -> bool {
        self.visibility == Visibility::Concealed
    }

    pub fn is_pair(&self) -> bool {
        self.group_type == GroupType::Pair
    }

    pub fn first_tile(&self) -> Tile {
        self.tiles[0]
    }

    pub fn tile_type(&self) -> TileType {
        self.first_tile().tile_type()
    }

    pub fn hand_size(&self) -> i32 {
        self.group_type.hand_size()
    }

    /// 手牌顯示排序
    ///
    /// 對子排最後；其餘依 牌種 → 箭/風/花色 → 刻槓先於順子 → 數字。
    /// 相同的箭牌或風牌視為相等（穩定排序保留加入順序）。
    pub fn display_cmp(&self, other: &Group) -> Ordering {
        self.display_key().cmp(&other.display_key())
    }

    fn display_key(&self) -> (bool, TileType, usize, bool, u8) {
        let tile = self.first_tile();
        let identity = match tile {
            Tile::Dragon(dragon) => dragon as usize,
            Tile::Wind(wind) => wind.to_index(),
            Tile::Suited { suit, .. } => suit as usize,
        };
        let is_chow = self.group_type == GroupType::Chow;
        let number = tile.number().unwrap_or(0);
        (self.is_pair(), tile.tile_type(), identity, is_chow, number)
    }
}

fn chow_tiles(tile: Tile) -> MahjongResult<Vec<Tile>> {
    let (suit, number) = match tile {
        Tile::Suited { suit, number } => (suit, number),
        other => {
            return Err(MahjongError::invalid_model(format!(
                "a chow needs suited tiles, got {}",
                other
            )))
        }
    };

    let start = number.min(MAX_CHOW_START);
    (start..start + 3).map(|n| Tile::try_suited(suit, n)).collect()
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.group_type.name())?;
        if self.is_concealed() {
            write!(f, " (concealed)")?;
        }
        for tile in &self.tiles {
            write!(f, " {}", tile)?;
        }
        Ok(())
    }
}

// ============================================================================
// 單元測試
// ============================================================================
