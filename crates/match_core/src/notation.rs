//! Standard Algebraic Notation for applied moves.

use cozy_chess::{Board, Move};

use crate::types::{LegalMove, PieceKind};

/// SAN for `mv`, with `after` the board once it has been played.
///
/// `legal` must hold every legal move of the board `mv` was played from; it
/// decides whether the origin needs disambiguation.
pub(crate) fn san(legal: &[(LegalMove, Move)], mv: &LegalMove, after: &Board) -> String {
    let mut san = String::new();

    if mv.flags.castle {
        if mv.spec.to.file() > mv.spec.from.file() {
            san.push_str("O-O");
        } else {
            san.push_str("O-O-O");
        }
    } else {
        if let Some(letter) = mv.piece.san_letter() {
            san.push(letter);
            push_disambiguation(&mut san, legal, mv);
        }

        if mv.flags.capture {
            if mv.piece == PieceKind::Pawn {
                san.push(mv.spec.from.file_char());
            }
            san.push('x');
        }

        san.push_str(&mv.spec.to.to_string());

        if let Some(promo) = mv.spec.promotion {
            san.push('=');
            san.push(promo.kind().san_letter().unwrap_or('Q'));
        }
    }

    if !after.checkers().is_empty() {
        let mated = !after.generate_moves(|_| true);
        san.push(if mated { '#' } else { '+' });
    }

    san
}

/// File if it separates the candidates, else rank, else both.
fn push_disambiguation(san: &mut String, legal: &[(LegalMove, Move)], mv: &LegalMove) {
    let rivals: Vec<&LegalMove> = legal
        .iter()
        .map(|(lm, _)| lm)
        .filter(|lm| {
            lm.piece == mv.piece
                && lm.spec.to == mv.spec.to
                && lm.spec.from != mv.spec.from
                && lm.spec.promotion == mv.spec.promotion
        })
        .collect();

    if rivals.is_empty() {
        return;
    }

    let from = mv.spec.from;
    let file_unique = rivals.iter().all(|r| r.spec.from.file() != from.file());
    let rank_unique = rivals.iter().all(|r| r.spec.from.rank() != from.rank());

    if file_unique {
        san.push(from.file_char());
    } else if rank_unique {
        san.push(from.rank_char());
    } else {
        san.push(from.file_char());
        san.push(from.rank_char());
    }
}

#[cfg(test)]
#[path = "notation_tests.rs"]
mod notation_tests;
