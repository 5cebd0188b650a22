//! Rules authority: legality, move application and status over FEN positions.
//!
//! The controller never inspects a board itself. It hands the current
//! [`Position`] and a candidate move to a [`RulesAuthority`] and stores what
//! comes back. [`CozyRules`] implements the authority on top of `cozy-chess`.

use cozy_chess::{Board, Color, File, Move, Piece, Square as CozySquare};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::RulesError;
use crate::notation;
use crate::types::{
    GameStatus, LegalMove, MoveFlags, MoveRecord, MoveSpec, PieceKind, Promotion, Side, Square,
};

/// Standard starting position.
pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Opaque board state encoded as FEN.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Position(String);

impl Position {
    pub fn from_fen(fen: impl Into<String>) -> Self {
        Self(fen.into())
    }

    pub fn as_fen(&self) -> &str {
        &self.0
    }

    /// Piece placement, side to move, castling and en-passant fields.
    ///
    /// Two positions with the same key are the same position for repetition
    /// purposes; the move clocks are ignored.
    pub fn repetition_key(&self) -> String {
        self.0.split_whitespace().take(4).collect::<Vec<_>>().join(" ")
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of applying a legal move.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Applied {
    pub position: Position,
    pub record: MoveRecord,
}

/// Pure, synchronous oracle over positions.
pub trait RulesAuthority: Send + Sync {
    fn initial_position(&self) -> Position;

    /// Legal moves for the side to move, optionally restricted to one origin square.
    fn legal_moves(&self, position: &Position, from: Option<Square>)
        -> Result<Vec<LegalMove>, RulesError>;

    /// Apply a fully specified move. Illegal moves return
    /// [`RulesError::IllegalMove`] and leave nothing changed.
    fn apply_move(&self, position: &Position, mv: &MoveSpec) -> Result<Applied, RulesError>;

    fn status(&self, position: &Position) -> Result<GameStatus, RulesError>;

    fn side_to_move(&self, position: &Position) -> Result<Side, RulesError>;
}

/// [`RulesAuthority`] backed by `cozy-chess`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CozyRules;

impl CozyRules {
    pub fn new() -> Self {
        Self
    }
}

impl RulesAuthority for CozyRules {
    fn initial_position(&self) -> Position {
        Position::from_fen(Board::default().to_string())
    }

    fn legal_moves(
        &self,
        position: &Position,
        from: Option<Square>,
    ) -> Result<Vec<LegalMove>, RulesError> {
        let board = parse_board(position)?;
        Ok(legal_pairs(&board)
            .into_iter()
            .map(|(lm, _)| lm)
            .filter(|lm| from.map_or(true, |sq| lm.spec.from == sq))
            .collect())
    }

    fn apply_move(&self, position: &Position, mv: &MoveSpec) -> Result<Applied, RulesError> {
        let board = parse_board(position)?;
        let pairs = legal_pairs(&board);
        let (legal, raw) = pairs
            .iter()
            .find(|(lm, _)| lm.spec == *mv)
            .copied()
            .ok_or(RulesError::IllegalMove { mv: *mv })?;

        let captured = if legal.flags.en_passant {
            Some(PieceKind::Pawn)
        } else if legal.flags.capture {
            board.piece_on(raw.to).map(piece_kind)
        } else {
            None
        };

        let mut child = board.clone();
        child.play_unchecked(raw);
        let san = notation::san(&pairs, &legal, &child);

        Ok(Applied {
            position: Position::from_fen(child.to_string()),
            record: MoveRecord {
                side: side(board.side_to_move()),
                from: legal.spec.from,
                to: legal.spec.to,
                promotion: legal.spec.promotion,
                captured,
                san,
            },
        })
    }

    fn status(&self, position: &Position) -> Result<GameStatus, RulesError> {
        let board = parse_board(position)?;
        Ok(board_status(&board))
    }

    fn side_to_move(&self, position: &Position) -> Result<Side, RulesError> {
        let board = parse_board(position)?;
        Ok(side(board.side_to_move()))
    }
}

fn parse_board(position: &Position) -> Result<Board, RulesError> {
    Board::from_fen(position.as_fen(), false).map_err(|e| RulesError::InvalidPosition {
        fen: position.as_fen().to_string(),
        reason: format!("{e:?}"),
    })
}

pub(crate) fn board_status(board: &Board) -> GameStatus {
    let has_moves = board.generate_moves(|_| true);
    let in_check = !board.checkers().is_empty();

    if !has_moves {
        return if in_check {
            GameStatus::Checkmate
        } else {
            GameStatus::Stalemate
        };
    }
    if board.halfmove_clock() >= 100 || is_insufficient_material(board) {
        return GameStatus::Draw;
    }
    if in_check {
        GameStatus::Check
    } else {
        GameStatus::InProgress
    }
}

/// Bare kings, a single minor piece, or bishops that all stand on one square colour.
fn is_insufficient_material(board: &Board) -> bool {
    let heavy = board.pieces(Piece::Pawn) | board.pieces(Piece::Rook) | board.pieces(Piece::Queen);
    if !heavy.is_empty() {
        return false;
    }
    let knights = board.pieces(Piece::Knight);
    let bishops = board.pieces(Piece::Bishop);
    let minors = knights.len() + bishops.len();
    if minors <= 1 {
        return true;
    }
    if !knights.is_empty() {
        return false;
    }
    let mut shades = bishops
        .into_iter()
        .map(|sq| (sq.file() as u8 + sq.rank() as u8) % 2);
    match shades.next() {
        Some(first) => shades.all(|shade| shade == first),
        None => true,
    }
}

/// Every legal move in our representation next to the raw `cozy-chess` move.
///
/// `cozy-chess` encodes castling as the king capturing its own rook; it is
/// rewritten here as the king's two-square step.
pub(crate) fn legal_pairs(board: &Board) -> Vec<(LegalMove, Move)> {
    let mover = board.side_to_move();
    let mut out = Vec::with_capacity(64);
    board.generate_moves(|moves| {
        let piece = moves.piece;
        for mv in moves {
            out.push((describe(board, mover, piece, mv), mv));
        }
        false
    });
    out
}

fn describe(board: &Board, mover: Color, piece: Piece, mv: Move) -> LegalMove {
    let castle = piece == Piece::King && board.color_on(mv.to) == Some(mover);
    let to = if castle {
        let file = if mv.to.file() as u8 > mv.from.file() as u8 {
            File::G
        } else {
            File::C
        };
        CozySquare::new(file, mv.from.rank())
    } else {
        mv.to
    };
    let en_passant =
        piece == Piece::Pawn && mv.from.file() != mv.to.file() && board.piece_on(mv.to).is_none();
    let capture = !castle && (board.piece_on(mv.to).is_some() || en_passant);

    LegalMove {
        spec: MoveSpec {
            from: square(mv.from),
            to: square(to),
            promotion: mv.promotion.and_then(promotion),
        },
        piece: piece_kind(piece),
        flags: MoveFlags {
            capture,
            en_passant,
            castle,
        },
    }
}

fn square(sq: CozySquare) -> Square {
    Square::at(sq.file() as u8, sq.rank() as u8)
}

fn side(color: Color) -> Side {
    match color {
        Color::White => Side::White,
        Color::Black => Side::Black,
    }
}

pub(crate) fn piece_kind(piece: Piece) -> PieceKind {
    match piece {
        Piece::Pawn => PieceKind::Pawn,
        Piece::Knight => PieceKind::Knight,
        Piece::Bishop => PieceKind::Bishop,
        Piece::Rook => PieceKind::Rook,
        Piece::Queen => PieceKind::Queen,
        Piece::King => PieceKind::King,
    }
}

fn promotion(piece: Piece) -> Option<Promotion> {
    match piece {
        Piece::Queen => Some(Promotion::Queen),
        Piece::Rook => Some(Promotion::Rook),
        Piece::Bishop => Some(Promotion::Bishop),
        Piece::Knight => Some(Promotion::Knight),
        Piece::Pawn | Piece::King => None,
    }
}

#[cfg(test)]
#[path = "rules_tests.rs"]
mod rules_tests;
