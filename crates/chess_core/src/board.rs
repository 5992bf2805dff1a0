use std::fmt;
use std::str::FromStr;

use tracing::trace;

use crate::error::{PositionError, PositionResult};
use crate::moves::{CoordMove, MoveValidator};
use crate::types::*;

/// Standard starting position.
pub const STARTPOS_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CastlingRights {
    pub wk: bool,
    pub wq: bool,
    pub bk: bool,
    pub bq: bool,
}

impl CastlingRights {
    pub fn all() -> Self {
        Self {
            wk: true,
            wq: true,
            bk: true,
            bq: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.wk || self.wq || self.bk || self.bq)
    }

    /// Canonical `KQkq` subset, or `-`.
    pub fn to_fen(self) -> String {
        if self.is_empty() {
            return "-".to_string();
        }
        let mut s = String::with_capacity(4);
        for (set, ch) in [(self.wk, 'K'), (self.wq, 'Q'), (self.bk, 'k'), (self.bq, 'q')] {
            if set {
                s.push(ch);
            }
        }
        s
    }

    /// Parses `-` or a non-empty run of distinct `KQkq` characters.
    pub fn from_fen(s: &str) -> Option<Self> {
        let mut rights = CastlingRights::default();
        if s == "-" {
            return Some(rights);
        }
        if s.is_empty() {
            return None;
        }
        for c in s.chars() {
            let flag = match c {
                'K' => &mut rights.wk,
                'Q' => &mut rights.wq,
                'k' => &mut rights.bk,
                'q' => &mut rights.bq,
                _ => return None,
            };
            if *flag {
                return None;
            }
            *flag = true;
        }
        Some(rights)
    }
}

/// A chess position as carried by FEN.
///
/// `board[0]` is rank 8 and `board[7]` is rank 1, the same order the FEN
/// board text is written in. Nothing here enforces chess rules; the record
/// only changes through [`Position::set_fen`] and [`Position::apply_move`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Position {
    pub board: [[Option<Piece>; 8]; 8],
    pub side_to_move: Color,
    pub castling: CastlingRights,
    pub en_passant: Option<Square>,
    /// Carried through opaquely, never updated by move application.
    pub halfmove_clock: u32,
    pub fullmove_number: u32,
}

impl Position {
    pub fn startpos() -> Self {
        let mut p = Position {
            board: [[None; 8]; 8],
            side_to_move: Color::White,
            castling: CastlingRights::all(),
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        };

        // Pawns
        for f in 0..8 {
            p.board[1][f] = Some(Piece::new(Color::Black, PieceKind::Pawn));
            p.board[6][f] = Some(Piece::new(Color::White, PieceKind::Pawn));
        }
        // Back ranks
        let back = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];
        for (f, &kind) in back.iter().enumerate() {
            p.board[0][f] = Some(Piece::new(Color::Black, kind));
            p.board[7][f] = Some(Piece::new(Color::White, kind));
        }
        p
    }

    /// Parses Forsyth-Edwards Notation.
    ///
    /// Exactly six fields separated by single spaces are required. Every
    /// rank group must cover eight files using piece letters and single
    /// digits `1`-`8`. Input without a canonical serialization (two digits
    /// in a row, padded counters, extra spaces) is rejected, so accepted
    /// text always round-trips through [`Position::to_fen`].
    pub fn from_fen(fen: &str) -> PositionResult<Self> {
        let parts: Vec<&str> = fen.split(' ').collect();
        if parts.len() > 1 && parts.iter().any(|p| p.is_empty()) {
            return Err(PositionError::malformed_fen(
                fen,
                "fields must be separated by single spaces",
            ));
        }
        if parts.len() != 6 {
            return Err(PositionError::malformed_fen(
                fen,
                format!("expected 6 fields, found {}", parts.len()),
            ));
        }

        let board = parse_board(fen, parts[0])?;

        let side_to_move = Color::from_fen(parts[1]).ok_or_else(|| {
            PositionError::malformed_fen(fen, format!("invalid side to move '{}'", parts[1]))
        })?;

        let castling = CastlingRights::from_fen(parts[2]).ok_or_else(|| {
            PositionError::malformed_fen(fen, format!("invalid castling rights '{}'", parts[2]))
        })?;

        let en_passant = if parts[3] == "-" {
            None
        } else {
            Some(Square::from_coord(parts[3]).ok_or_else(|| {
                PositionError::malformed_fen(fen, format!("invalid en-passant square '{}'", parts[3]))
            })?)
        };

        let halfmove_clock = parse_counter(fen, "half-move clock", parts[4])?;
        let fullmove_number = parse_counter(fen, "full-move number", parts[5])?;
        if fullmove_number == 0 {
            return Err(PositionError::malformed_fen(fen, "full-move number must be positive"));
        }
        // apply_move increments it unconditionally
        if fullmove_number == u32::MAX {
            return Err(PositionError::malformed_fen(fen, "full-move number out of range"));
        }

        Ok(Position {
            board,
            side_to_move,
            castling,
            en_passant,
            halfmove_clock,
            fullmove_number,
        })
    }

    /// Replaces the whole position with the one described by `fen`.
    /// On error the current position is left as it was.
    pub fn set_fen(&mut self, fen: &str) -> PositionResult<()> {
        *self = Position::from_fen(fen)?;
        Ok(())
    }

    pub fn to_fen(&self) -> String {
        let mut fen = String::with_capacity(90);
        for (row_idx, row) in self.board.iter().enumerate() {
            let mut empty_count = 0;
            for cell in row {
                match cell {
                    None => empty_count += 1,
                    Some(pc) => {
                        if empty_count > 0 {
                            fen.push_str(&empty_count.to_string());
                            empty_count = 0;
                        }
                        fen.push(pc.fen_char());
                    }
                }
            }
            if empty_count > 0 {
                fen.push_str(&empty_count.to_string());
            }
            if row_idx != 7 {
                fen.push('/');
            }
        }

        let ep = self.en_passant.map_or_else(|| "-".to_string(), Square::coord);
        fen.push_str(&format!(
            " {} {} {} {} {}",
            self.side_to_move.fen_char(),
            self.castling.to_fen(),
            ep,
            self.halfmove_clock,
            self.fullmove_number
        ));
        fen
    }

    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.board[sq.row as usize][sq.col as usize]
    }
    pub fn set_piece(&mut self, sq: Square, pc: Option<Piece>) {
        self.board[sq.row as usize][sq.col as usize] = pc;
    }

    /// Relocates whatever stands on the source square, without any rule check.
    ///
    /// The destination is overwritten whatever it holds. The side to move
    /// flips and the full-move number goes up by one on every call, for
    /// either colour.
    pub fn apply_move(&mut self, mv: CoordMove) {
        // Copy then clear: a move onto its own square empties it.
        let moved = self.piece_at(mv.from);
        self.set_piece(mv.to, moved);
        self.set_piece(mv.from, None);

        self.side_to_move = self.side_to_move.other();
        self.fullmove_number = self.fullmove_number.saturating_add(1);
        trace!(%mv, fen = %self, "applied move");
    }

    /// Like [`Position::apply_move`], but asks `validator` first when one is given.
    ///
    /// A rejected move leaves the position untouched.
    pub fn apply_move_checked(
        &mut self,
        mv: CoordMove,
        validator: Option<&mut dyn MoveValidator>,
    ) -> PositionResult<()> {
        if let Some(v) = validator
            && !v.is_legal(self, mv)?
        {
            return Err(PositionError::IllegalMove(mv));
        }
        self.apply_move(mv);
        Ok(())
    }

    /// Text diagram with `viewpoint`'s pieces at the bottom.
    ///
    /// Eight rank lines, each starting with its rank number, followed by a
    /// line of file letters. Empty squares print as `.`.
    pub fn render(&self, viewpoint: Color) -> String {
        let (rows, cols): ([usize; 8], [usize; 8]) = match viewpoint {
            Color::White => ([0, 1, 2, 3, 4, 5, 6, 7], [0, 1, 2, 3, 4, 5, 6, 7]),
            Color::Black => ([7, 6, 5, 4, 3, 2, 1, 0], [7, 6, 5, 4, 3, 2, 1, 0]),
        };

        let mut out = String::new();
        for row in rows {
            out.push_str(&(8 - row).to_string());
            for col in cols {
                out.push(' ');
                out.push(self.board[row][col].map_or('.', Piece::fen_char));
            }
            out.push('\n');
        }
        out.push(' ');
        for col in cols {
            out.push(' ');
            out.push((b'a' + col as u8) as char);
        }
        out.push('\n');
        out
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::startpos()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_fen())
    }
}

impl FromStr for Position {
    type Err = PositionError;

    fn from_str(s: &str) -> PositionResult<Self> {
        Position::from_fen(s)
    }
}

fn parse_board(fen: &str, board_part: &str) -> PositionResult<[[Option<Piece>; 8]; 8]> {
    let mut board = [[None; 8]; 8];
    let ranks: Vec<&str> = board_part.split('/').collect();
    if ranks.len() != 8 {
        return Err(PositionError::malformed_fen(
            fen,
            format!("expected 8 rank groups, found {}", ranks.len()),
        ));
    }

    for (row, rank_str) in ranks.iter().enumerate() {
        let rank_label = 8 - row;
        let mut file: usize = 0;
        let mut prev_digit = false;
        for ch in rank_str.chars() {
            if let Some(d) = ch.to_digit(10).filter(|d| (1..=8).contains(d)) {
                if prev_digit {
                    return Err(PositionError::malformed_fen(
                        fen,
                        format!("adjacent digits in rank {rank_label}"),
                    ));
                }
                file += d as usize;
                prev_digit = true;
            } else if let Some(pc) = Piece::from_fen_char(ch) {
                if file < 8 {
                    board[row][file] = Some(pc);
                }
                file += 1;
                prev_digit = false;
            } else {
                return Err(PositionError::malformed_fen(
                    fen,
                    format!("invalid character '{ch}' in rank {rank_label}"),
                ));
            }
            if file > 8 {
                break;
            }
        }
        if file != 8 {
            return Err(PositionError::malformed_fen(
                fen,
                format!("rank {rank_label} covers {file} files instead of 8"),
            ));
        }
    }
    Ok(board)
}

fn parse_counter(fen: &str, name: &str, text: &str) -> PositionResult<u32> {
    let padded = text.len() > 1 && text.starts_with('0');
    if padded || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(PositionError::malformed_fen(fen, format!("invalid {name} '{text}'")));
    }
    text.parse()
        .map_err(|_| PositionError::malformed_fen(fen, format!("invalid {name} '{text}'")))
}

#[cfg(test)]
#[path = "board_tests.rs"]
mod board_tests;
