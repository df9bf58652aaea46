//! Shakmaty-backed implementation of the [`RulesEngine`] contract.

use shakmaty::{
    fen::Fen, san::San, uci::UciMove, CastlingMode, Chess, EnPassantMode, Move, Position,
};

use gambit_shared::types::{Color, GameStatus, MoveInput};

use crate::{RulesEngine, RulesError, Termination, Verdict};

/// Standard chess rules.
///
/// Detects checkmate, stalemate, insufficient material, and the automatic
/// fifty-move draw.  Threefold repetition needs position history that a bare
/// FEN does not carry, so this engine never reports it; the status exists
/// for engines that track repetition across moves.
#[derive(Debug, Clone, Default)]
pub struct StandardRules;

impl StandardRules {
    pub fn new() -> Self {
        Self
    }
}

impl RulesEngine for StandardRules {
    fn apply(&self, position: &str, mv: &MoveInput) -> Result<Verdict, RulesError> {
        let fen: Fen = position
            .parse()
            .map_err(|e| RulesError::InvalidPosition(format!("{e}")))?;
        let before: Chess = fen
            .into_position(CastlingMode::Standard)
            .map_err(|e| RulesError::InvalidPosition(format!("{e}")))?;

        let mover = color_from(before.turn());
        let m = parse_move(&before, mv)?;

        if !before.is_legal(&m) {
            return Err(RulesError::IllegalMove(uci_string(mv)));
        }

        // SAN depends on the position before the move.
        let san = San::from_move(&before, &m);
        let captured = m.is_capture();

        let after = before
            .play(&m)
            .map_err(|_| RulesError::IllegalMove(uci_string(mv)))?;

        let notation = format!("{}{}", san, check_suffix(&after));
        let terminal = detect_termination(&after, mover);

        Ok(Verdict {
            new_position: Fen::from_position(after.clone(), EnPassantMode::Legal).to_string(),
            notation,
            captured,
            side_to_move: color_from(after.turn()),
            terminal,
        })
    }
}

fn parse_move(position: &Chess, mv: &MoveInput) -> Result<Move, RulesError> {
    let uci: UciMove = uci_string(mv)
        .parse()
        .map_err(|_| RulesError::MalformedMove(uci_string(mv)))?;
    uci.to_move(position)
        .map_err(|_| RulesError::IllegalMove(uci_string(mv)))
}

fn uci_string(mv: &MoveInput) -> String {
    let mut s = format!(
        "{}{}",
        mv.from.to_ascii_lowercase(),
        mv.to.to_ascii_lowercase()
    );
    if let Some(p) = mv.promotion {
        s.push(p.to_ascii_lowercase());
    }
    s
}

fn check_suffix(position: &Chess) -> &'static str {
    if position.is_checkmate() {
        "#"
    } else if position.is_check() {
        "+"
    } else {
        ""
    }
}

fn detect_termination(position: &Chess, mover: Color) -> Option<Termination> {
    if position.is_checkmate() {
        // The side to move is mated; the mover won.
        Some(Termination {
            status: GameStatus::Checkmate,
            winner: Some(mover),
        })
    } else if position.is_stalemate() {
        Some(Termination {
            status: GameStatus::Stalemate,
            winner: None,
        })
    } else if position.is_insufficient_material() {
        Some(Termination {
            status: GameStatus::InsufficientMaterial,
            winner: None,
        })
    } else if position.halfmoves() >= 100 {
        Some(Termination {
            status: GameStatus::Draw,
            winner: None,
        })
    } else {
        None
    }
}

fn color_from(color: shakmaty::Color) -> Color {
    match color {
        shakmaty::Color::White => Color::White,
        shakmaty::Color::Black => Color::Black,
    }
}
