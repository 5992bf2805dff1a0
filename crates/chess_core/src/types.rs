/// Side of the board, also the side to move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Color {
    White,
    Black,
}

impl Color {
    /// The opponent.
    pub fn other(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
    /// FEN side-to-move code.
    pub fn fen_char(self) -> char {
        match self {
            Color::White => 'w',
            Color::Black => 'b',
        }
    }
    /// Reads `w` or `b`; anything else is `None`.
    pub fn from_fen(s: &str) -> Option<Color> {
        match s {
            "w" => Some(Color::White),
            "b" => Some(Color::Black),
            _ => None,
        }
    }
}

/// Piece type without colour.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

/// A coloured piece as it sits on a square.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Piece {
    pub color: Color,
    pub kind: PieceKind,
}

impl Piece {
    pub fn new(color: Color, kind: PieceKind) -> Self {
        Self { color, kind }
    }

    /// Parses one of `KQRBNPkqrbnp`. Upper case is White.
    pub fn from_fen_char(ch: char) -> Option<Piece> {
        let kind = match ch.to_ascii_lowercase() {
            'p' => PieceKind::Pawn,
            'n' => PieceKind::Knight,
            'b' => PieceKind::Bishop,
            'r' => PieceKind::Rook,
            'q' => PieceKind::Queen,
            'k' => PieceKind::King,
            _ => return None,
        };
        let color = if ch.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        Some(Piece { color, kind })
    }

    pub fn fen_char(self) -> char {
        let ch = match self.kind {
            PieceKind::Pawn => 'p',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        };
        match self.color {
            Color::White => ch.to_ascii_uppercase(),
            Color::Black => ch,
        }
    }
}

/// A board cell addressed the way the FEN board text is laid out:
/// row 0 is rank 8, row 7 is rank 1, column 0 is file `a`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Square {
    pub row: u8,
    pub col: u8,
}

impl Square {
    pub fn new(row: u8, col: u8) -> Option<Self> {
        if row < 8 && col < 8 {
            Some(Self { row, col })
        } else {
            None
        }
    }

    /// Parses a coordinate such as `e4`.
    pub fn from_coord(c: &str) -> Option<Self> {
        let b = c.as_bytes();
        if b.len() != 2 {
            return None;
        }
        Some(Self {
            row: rank_to_row(b[1])?,
            col: file_to_col(b[0])?,
        })
    }

    pub fn coord(self) -> String {
        let f = (b'a' + self.col) as char;
        let r = (b'8' - self.row) as char;
        format!("{f}{r}")
    }
}

// Helpers
pub fn file_to_col(f: u8) -> Option<u8> {
    if (b'a'..=b'h').contains(&f) {
        Some(f - b'a')
    } else {
        None
    }
}
/// `row = 7 - (rank - '1')`: rank 1 is row 7, rank 8 is row 0.
pub fn rank_to_row(r: u8) -> Option<u8> {
    if (b'1'..=b'8').contains(&r) {
        Some(7 - (r - b'1'))
    } else {
        None
    }
}
