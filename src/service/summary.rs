//! 每局摘要（顯示用）

use std::collections::BTreeMap;

use crate::game::Wind;
use super::player::PlayerId;
use super::state::{Game, Scores};

/// 一列摘要；第 0 列為開局狀態
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoundSummary {
    pub index: usize,
    pub prevailing_wind: Wind,
    pub totals: Scores,
    pub increments: Scores,
    pub winds: BTreeMap<PlayerId, Wind>,
    pub winners: Vec<PlayerId>,
}

pub(crate) fn summarize(game: &Game) -> Vec<RoundSummary> {
    let (initial_scores, starting) = match (game.initial_scores(), game.starting_player()) {
        (Some(initial), Some(starting)) => (initial, starting),
        _ => return Vec::new(),
    };

    let starting_winds = game
        .seat_of(starting)
        .map(|seat| game.winds_from(seat))
        .unwrap_or_default()
        .into_iter()
        .map(|(p, w)| (p.clone(), w))
        .collect();

    let mut rows = vec![RoundSummary {
        index: 0,
        prevailing_wind: Wind::East,
        totals: initial_scores.clone(),
        increments: initial_scores.keys().map(|p| (p.clone(), 0)).collect(),
        winds: starting_winds,
        winners: Vec::new(),
    }];

    let snapshots = game.round_scores();
    for (i, round) in game.rounds().iter().enumerate() {
        let before = &snapshots[i];
        let after = &snapshots[i + 1];
        rows.push(RoundSummary {
            index: i + 1,
            prevailing_wind: round.prevailing_wind(),
            totals: after.clone(),
            increments: after
                .iter()
                .map(|(p, total)| (p.clone(), total - before.get(p).copied().unwrap_or(0)))
                .collect(),
            winds: round
                .entries()
                .iter()
                .map(|e| (e.player().clone(), e.player_wind()))
                .collect(),
            winners: round.mahjong_winners().into_iter().cloned().collect(),
        });
    }
    rows
}

// ============================================================================
// 單元測試
// ============================================================================

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::game::{Group, ScoringScheme, Suit, Tile, Visibility};
    use crate::service::state::Game;
    use crate::service::player::PlayerId;
    use crate::game::Wind;

    #[test]
    fn test_summaries_follow_rounds() {
        let mut game = Game::new(Arc::new(ScoringScheme::british()));
        assert!(game.round_summaries().is_empty());

        let a = PlayerId::new("a");
        let b = PlayerId::new("b");
        game.assign_seat(a.clone(), 0).unwrap();
        game.assign_seat(b.clone(), 2).unwrap();
        game.start(&a).unwrap();

        let mut round = game.new_round().unwrap();
        let mut winner = game.new_hand(&b).unwrap();
        for n in [1, 4, 7] {
            winner.add(Group::chow(Tile::suited(Suit::Bamboo, n)).unwrap());
        }
        winner.add(Group::pung(Tile::suited(Suit::Bamboo, 9), Visibility::Exposed).unwrap());
        winner.add(Group::pair(Tile::suited(Suit::Bamboo, 5)).unwrap());
        assert!(winner.is_mahjong());
        // (4 + 10) × 清一色
        assert_eq!(winner.limited_total(), 28);
        round.add_hand(b.clone(), winner).unwrap();
        round.add_hand(a.clone(), game.new_hand(&a).unwrap()).unwrap();
        game.add_round(round).unwrap();

        let rows = game.round_summaries();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].winds.get(&a), Some(&Wind::East));
        assert_eq!(rows[0].winds.get(&b), Some(&Wind::South));
        assert_eq!(rows[0].totals.get(&a), Some(&2000));
        assert_eq!(rows[1].winners, vec![b.clone()]);
        assert_eq!(rows[1].increments.get(&b), Some(&56));
        assert_eq!(rows[1].increments.get(&a), Some(&-56));
        assert_eq!(rows[1].totals.get(&a), Some(&1944));
        assert_eq!(game.east_player(), Some(&b));
    }
}
