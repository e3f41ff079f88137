//! 玩家身分
//!
//! 玩家以不透明 id 識別，名稱可隨時修改。
//! 反序列化時透過 `PlayerRegistry`（身分映射）取得同一個玩家。

use std::collections::BTreeMap;
use std::fmt;

use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::errors::{MahjongError, MahjongResult};

/// 玩家 id（128 位元十六進位字串）
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        PlayerId(id.into())
    }

    pub fn random(rng: &mut StdRng) -> Self {
        let bytes: [u8; 16] = rng.gen();
        PlayerId(bytes.iter().map(|b| format!("{:02x}", b)).collect())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 玩家（相等性只看 id）
#[derive(Clone, Debug, Eq)]
pub struct Player {
    id: PlayerId,
    name: String,
}

impl Player {
    pub fn id(&self) -> &PlayerId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl PartialEq for Player {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

/// 身分映射
pub struct PlayerRegistry {
    rng: StdRng,
    players: BTreeMap<PlayerId, Player>,
}

impl PlayerRegistry {
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            rng,
            players: BTreeMap::new(),
        }
    }

    /// 建立新玩家
    pub fn create(&mut self, name: impl Into<String>) -> PlayerId {
        let mut id = PlayerId::random(&mut self.rng);
        while self.players.contains_key(&id) {
            id = PlayerId::random(&mut self.rng);
        }
        self.players.insert(
            id.clone(),
            Player {
                id: id.clone(),
                name: name.into(),
            },
        );
        id
    }

    /// 已存在則返回原玩家（名稱不變），否則以此 id 註冊
    pub fn resolve(&mut self, id: &PlayerId, name: &str) -> &Player {
        self.players.entry(id.clone()).or_insert_with(|| Player {
            id: id.clone(),
            name: name.to_string(),
        })
    }

    pub fn get(&self, id: &PlayerId) -> MahjongResult<&Player> {
        self.players
            .get(id)
            .ok_or_else(|| MahjongError::lookup(format!("unknown player id {}", id)))
    }

    pub fn name_of(&self, id: &PlayerId) -> MahjongResult<&str> {
        self.get(id).map(Player::name)
    }

    pub fn rename(&mut self, id: &PlayerId, name: impl Into<String>) -> MahjongResult<()> {
        let player = self
            .players
            .get_mut(id)
            .ok_or_else(|| MahjongError::lookup(format!("unknown player id {}", id)))?;
        player.name = name.into();
        Ok(())
    }

    pub fn contains(&self, id: &PlayerId) -> bool {
        self.players.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }
}

impl Default for PlayerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// 單元測試
// ============================================================================
