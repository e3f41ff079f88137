//! 對局狀態管理
//!
//! 狀態：未開始 → 進行中 → 已結束。
//! 失敗的操作不會修改任何狀態。

use std::collections::BTreeMap;
use std::sync::Arc;

use log::{debug, info};

use crate::errors::{MahjongError, MahjongResult};
use crate::game::{ScoredHand, ScoringScheme, Wind, MIN_PLAYERS, SEAT_COUNT};
use super::player::{PlayerId, PlayerRegistry};
use super::record::{GameRecord, PlayerRecord, RoundRecord, SeatRecord};
use super::round::Round;
use super::summary::{summarize, RoundSummary};

pub type Scores = BTreeMap<PlayerId, i32>;

/// 對局
#[derive(Clone, Debug)]
pub struct Game {
    scheme: Arc<ScoringScheme>,

    // 座位
    seats: [Option<PlayerId>; SEAT_COUNT],
    starting_seat: Option<usize>,
    ending_seat: Option<usize>,
    east_seat: Option<usize>,

    // 進度
    prevailing_wind: Wind,
    started: bool,
    finished: bool,

    // 已提交的局與分數快照（索引 0 為開局分數）
    rounds: Vec<Round>,
    scores: Vec<Scores>,
}

impl Game {
    pub fn new(scheme: Arc<ScoringScheme>) -> Self {
        Self {
            scheme,
            seats: Default::default(),
            starting_seat: None,
            ending_seat: None,
            east_seat: None,
            prevailing_wind: Wind::East,
            started: false,
            finished: false,
            rounds: Vec::new(),
            scores: Vec::new(),
        }
    }

    pub fn scheme(&self) -> &Arc<ScoringScheme> {
        &self.scheme
    }

    // ========================================================================
    // 開局前
    // ========================================================================

    pub fn assign_seat(&mut self, player: PlayerId, index: usize) -> MahjongResult<()> {
        self.require_not_started("assign a seat")?;
        if index >= SEAT_COUNT {
            return Err(MahjongError::lookup(format!("seat index {} out of range", index)));
        }
        if let Some(occupant) = &self.seats[index] {
            return Err(MahjongError::invalid_state(format!(
                "seat {} is already taken by {}",
                index, occupant
            )));
        }
        if self.seat_of(&player).is_some() {
            return Err(MahjongError::invalid_state(format!("{} already has a seat", player)));
        }
        self.seats[index] = Some(player);
        Ok(())
    }

    /// 所有玩家往下一個座位移動
    pub fn rotate_seats(&mut self) -> MahjongResult<()> {
        self.require_not_started("rotate seats")?;
        self.seats.rotate_right(1);
        Ok(())
    }

    pub fn start(&mut self, east: &PlayerId) -> MahjongResult<()> {
        self.require_not_started("start the game")?;
        let occupied = self.seats.iter().flatten().count();
        if occupied < MIN_PLAYERS {
            return Err(MahjongError::invalid_state(format!(
                "need at least {} players to start, have {}",
                MIN_PLAYERS, occupied
            )));
        }
        let starting = self
            .seat_of(east)
            .ok_or_else(|| MahjongError::lookup(format!("{} is not seated", east)))?;

        self.starting_seat = Some(starting);
        self.ending_seat = Some(self.previous_occupied(starting));
        self.started = true;
        self.reset_progress();
        info!("game started with {} players, east {}", occupied, east);
        Ok(())
    }

    fn reset_progress(&mut self) {
        self.east_seat = self.starting_seat;
        self.prevailing_wind = Wind::East;
        self.finished = false;
        self.rounds.clear();
        let initial = self.scheme.initial_score();
        self.scores = vec![self.players().into_iter().map(|p| (p.clone(), initial)).collect()];
    }

    // ========================================================================
    // 進行中
    // ========================================================================

    /// 以目前場風建立空的一局
    pub fn new_round(&self) -> MahjongResult<Round> {
        self.require_in_progress("create a round")?;
        Ok(Round::new(self.prevailing_wind))
    }

    /// 以玩家目前的風位建立空手牌
    pub fn new_hand(&self, player: &PlayerId) -> MahjongResult<ScoredHand> {
        let wind = self.player_wind(player)?;
        Ok(ScoredHand::new(self.scheme.clone(), wind, self.prevailing_wind))
    }

    pub fn is_complete_round(&self, round: &Round) -> bool {
        round.is_complete(self.players())
    }

    pub fn add_round(&mut self, round: Round) -> MahjongResult<()> {
        self.require_in_progress("add a round")?;
        self.validate_round(&round)?;

        let east_seat = self.east_seat.ok_or_else(|| MahjongError::invalid_state("no east player"))?;
        let east_won = self.seats[east_seat]
            .as_ref()
            .and_then(|east| round.hand(east))
            .map(|hand| hand.is_mahjong())
            .unwrap_or(false);

        let deltas = round.score_deltas();
        let mut snapshot = self.scores.last().cloned().unwrap_or_default();
        for (player, delta) in &deltas {
            let total = snapshot.entry(player.clone()).or_insert(0);
            *total = total.saturating_add(*delta);
        }
        self.scores.push(snapshot);
        self.rounds.push(round);

        if east_won {
            // 東家和牌：連莊
        } else if Some(east_seat) == self.ending_seat && self.prevailing_wind == Wind::North {
            self.finished = true;
        } else {
            let next = self.next_occupied(east_seat);
            self.east_seat = Some(next);
            if Some(next) == self.starting_seat {
                self.prevailing_wind = self.prevailing_wind.next();
            }
        }

        debug!(
            "round {} committed: deltas={:?} east={:?} wind={}",
            self.rounds.len(),
            deltas,
            self.east_player(),
            self.prevailing_wind.name()
        );
        if self.finished {
            info!("game finished after {} rounds", self.rounds.len());
        }
        Ok(())
    }

    fn validate_round(&self, round: &Round) -> MahjongResult<()> {
        if round.prevailing_wind() != self.prevailing_wind {
            return Err(MahjongError::invalid_state(format!(
                "round prevailing wind {} does not match game wind {}",
                round.prevailing_wind().name(),
                self.prevailing_wind.name()
            )));
        }
        if !self.is_complete_round(round) {
            return Err(MahjongError::invalid_state("round is missing a hand for a seated player"));
        }
        for player in round.players() {
            let seat_wind = self.player_wind(player).map_err(|_| {
                MahjongError::invalid_state(format!("{} has a hand but no seat", player))
            })?;
            if round.player_wind(player) != Some(seat_wind) {
                return Err(MahjongError::invalid_state(format!(
                    "hand for {} was declared with the wrong seat wind",
                    player
                )));
            }
        }
        let winners = round.mahjong_winners().len();
        if winners != 1 {
            return Err(MahjongError::invalid_state(format!(
                "a round needs exactly one mahjong, found {}",
                winners
            )));
        }
        Ok(())
    }

    /// 移除最後一局：重設到開局狀態後重播其餘各局
    pub fn pop_round(&mut self) -> MahjongResult<Round> {
        if !self.started {
            return Err(MahjongError::invalid_state("cannot pop a round before the game starts"));
        }
        if self.rounds.is_empty() {
            return Err(MahjongError::invalid_state("no rounds to pop"));
        }

        let backup = self.clone();
        let mut rounds = std::mem::take(&mut self.rounds);
        let last = match rounds.pop() {
            Some(last) => last,
            None => return Err(MahjongError::invalid_state("no rounds to pop")),
        };
        self.reset_progress();
        for round in rounds {
            if let Err(err) = self.add_round(round) {
                *self = backup;
                return Err(err);
            }
        }
        info!("round {} popped", self.rounds.len() + 1);
        Ok(last)
    }

    // ========================================================================
    // 查詢
    // ========================================================================

    pub fn seats(&self) -> &[Option<PlayerId>; SEAT_COUNT] {
        &self.seats
    }

    pub fn player_at(&self, index: usize) -> MahjongResult<Option<&PlayerId>> {
        self.seats
            .get(index)
            .map(Option::as_ref)
            .ok_or_else(|| MahjongError::lookup(format!("seat index {} out of range", index)))
    }

    /// 依座位順序列出玩家
    pub fn players(&self) -> Vec<&PlayerId> {
        self.seats.iter().flatten().collect()
    }

    pub fn seat_of(&self, player: &PlayerId) -> Option<usize> {
        self.seats.iter().position(|s| s.as_ref() == Some(player))
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn prevailing_wind(&self) -> Wind {
        self.prevailing_wind
    }

    pub fn east_player(&self) -> Option<&PlayerId> {
        self.east_seat.and_then(|i| self.seats[i].as_ref())
    }

    pub fn starting_player(&self) -> Option<&PlayerId> {
        self.starting_seat.and_then(|i| self.seats[i].as_ref())
    }

    pub fn ending_player(&self) -> Option<&PlayerId> {
        self.ending_seat.and_then(|i| self.seats[i].as_ref())
    }

    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    pub fn round_count(&self) -> usize {
        self.rounds.len()
    }

    pub fn last_round(&self) -> Option<&Round> {
        self.rounds.last()
    }

    /// 玩家目前的風位：從東家座位起依序分配，空位不佔風
    pub fn player_wind(&self, player: &PlayerId) -> MahjongResult<Wind> {
        let east = self
            .east_seat
            .ok_or_else(|| MahjongError::invalid_state("the game has not started"))?;
        self.winds_from(east)
            .into_iter()
            .find(|(p, _)| *p == player)
            .map(|(_, wind)| wind)
            .ok_or_else(|| MahjongError::lookup(format!("{} is not seated", player)))
    }

    /// 從指定座位起的 (玩家, 風位) 順序
    pub(crate) fn winds_from(&self, seat: usize) -> Vec<(&PlayerId, Wind)> {
        let mut wind = Wind::East;
        let mut result = Vec::new();
        for offset in 0..SEAT_COUNT {
            if let Some(player) = &self.seats[(seat + offset) % SEAT_COUNT] {
                result.push((player, wind));
                wind = wind.next();
            }
        }
        result
    }

    /// 從目前東家起的 (玩家, 風位)
    pub fn player_winds(&self) -> MahjongResult<Vec<(&PlayerId, Wind)>> {
        let east = self
            .east_seat
            .ok_or_else(|| MahjongError::invalid_state("the game has not started"))?;
        Ok(self.winds_from(east))
    }

    pub fn player_score(&self, player: &PlayerId) -> MahjongResult<i32> {
        self.scores
            .last()
            .and_then(|s| s.get(player))
            .copied()
            .ok_or_else(|| MahjongError::lookup(format!("no score for {}", player)))
    }

    /// 所有分數快照（索引 0 為開局分數）
    pub fn round_scores(&self) -> &[Scores] {
        &self.scores
    }

    pub fn initial_scores(&self) -> Option<&Scores> {
        self.scores.first()
    }

    pub fn last_round_start_scores(&self) -> Option<&Scores> {
        if self.rounds.is_empty() {
            return None;
        }
        self.scores.get(self.scores.len() - 2)
    }

    pub fn last_round_end_scores(&self) -> Option<&Scores> {
        if self.rounds.is_empty() {
            return None;
        }
        self.scores.last()
    }

    pub fn round_summaries(&self) -> Vec<RoundSummary> {
        summarize(self)
    }

    // ========================================================================
    // 座位輪轉
    // ========================================================================

    fn next_occupied(&self, seat: usize) -> usize {
        (1..=SEAT_COUNT)
            .map(|offset| (seat + offset) % SEAT_COUNT)
            .find(|&i| self.seats[i].is_some())
            .unwrap_or(seat)
    }

    fn previous_occupied(&self, seat: usize) -> usize {
        (1..=SEAT_COUNT)
            .map(|offset| (seat + SEAT_COUNT - offset) % SEAT_COUNT)
            .find(|&i| self.seats[i].is_some())
            .unwrap_or(seat)
    }

    fn require_not_started(&self, action: &str) -> MahjongResult<()> {
        if self.started {
            return Err(MahjongError::invalid_state(format!(
                "cannot {} after the game has started",
                action
            )));
        }
        Ok(())
    }

    fn require_in_progress(&self, action: &str) -> MahjongResult<()> {
        if !self.started {
            return Err(MahjongError::invalid_state(format!(
                "cannot {} before the game starts",
                action
            )));
        }
        if self.finished {
            return Err(MahjongError::invalid_state(format!(
                "cannot {} after the game has finished",
                action
            )));
        }
        Ok(())
    }

    // ========================================================================
    // 狀態樹
    // ========================================================================

    pub fn to_state(&self, registry: &PlayerRegistry) -> MahjongResult<GameRecord> {
        let players = self
            .players()
            .into_iter()
            .map(|id| {
                registry.get(id).map(|p| PlayerRecord {
                    id: id.clone(),
                    name: p.name().to_string(),
                })
            })
            .collect::<MahjongResult<Vec<_>>>()?;

        let seats = (0..SEAT_COUNT)
            .map(|i| SeatRecord {
                player_id: self.seats[i].clone(),
                starting: self.starting_seat == Some(i),
                ending: self.ending_seat == Some(i),
                east: self.east_seat == Some(i),
            })
            .collect();

        Ok(GameRecord {
            version: crate::game::GAME_RECORD_VERSION,
            scheme_name: self.scheme.name().to_string(),
            players,
            seats,
            started: self.started,
            finished: self.finished,
            prevailing_wind: self.prevailing_wind,
            rounds: self.rounds.iter().map(RoundRecord::from_round).collect(),
            scores: self.scores.clone(),
        })
    }

    /// 由狀態樹重建：依序重播各局並核對記錄的輪轉與分數
    pub fn from_state(
        record: &GameRecord,
        scheme: Arc<ScoringScheme>,
        registry: &mut PlayerRegistry,
    ) -> MahjongResult<Game> {
        record.check_version()?;
        if record.scheme_name != scheme.name() {
            return Err(MahjongError::serialization(format!(
                "record was scored with '{}' but '{}' was supplied",
                record.scheme_name,
                scheme.name()
            )));
        }
        if record.seats.len() != SEAT_COUNT {
            return Err(MahjongError::serialization(format!(
                "expected {} seats, found {}",
                SEAT_COUNT,
                record.seats.len()
            )));
        }

        let mut game = Game::new(scheme);
        for (index, seat) in record.seats.iter().enumerate() {
            if let Some(id) = &seat.player_id {
                if !record.players.iter().any(|p| &p.id == id) {
                    return Err(MahjongError::serialization(format!(
                        "seat {} refers to unknown player {}",
                        index, id
                    )));
                }
                game.assign_seat(id.clone(), index).map_err(replay_error)?;
            }
        }

        if record.started {
            let starting = record
                .seats
                .iter()
                .find(|s| s.starting)
                .and_then(|s| s.player_id.clone())
                .ok_or_else(|| MahjongError::serialization("started game without a starting player"))?;
            game.start(&starting).map_err(replay_error)?;
            for round in &record.rounds {
                let round = round.to_round(&game.scheme)?;
                game.add_round(round).map_err(replay_error)?;
            }
        } else if !record.rounds.is_empty() {
            return Err(MahjongError::serialization("rounds recorded for a game that never started"));
        }

        game.check_against(record)?;

        // 驗證通過後才寫入身分表
        for player in &record.players {
            registry.resolve(&player.id, &player.name);
        }
        Ok(game)
    }

    fn check_against(&self, record: &GameRecord) -> MahjongResult<()> {
        let recorded_east = record.seats.iter().position(|s| s.east);
        let recorded_ending = record.seats.iter().position(|s| s.ending);
        if recorded_east != self.east_seat
            || recorded_ending != self.ending_seat
            || record.prevailing_wind != self.prevailing_wind
            || record.finished != self.finished
        {
            return Err(MahjongError::serialization(
                "replayed rotation does not match the recorded rotation",
            ));
        }
        if record.started && record.scores != self.scores {
            return Err(MahjongError::serialization(
                "replayed scores do not match the recorded scores",
            ));
        }
        Ok(())
    }
}

fn replay_error(err: MahjongError) -> MahjongError {
    MahjongError::serialization(format!("cannot replay record: {}", err))
}

// ============================================================================
// 單元測試
// ============================================================================
