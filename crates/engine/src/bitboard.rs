use crate::types::Square;

pub type Bitboard = u64;

// Fixed direction tables. Move generation walks them in this order, so the
// order here is the order moves come out in.
pub const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (-2, -1), (-2, 1), (-1, -2), (-1, 2),
    (1, -2), (1, 2), (2, -1), (2, 1),
];

pub const KING_STEPS: [(i8, i8); 8] = [
    (-1, -1), (0, -1), (1, -1),
    (-1, 0), (1, 0),
    (-1, 1), (0, 1), (1, 1),
];

pub const ROOK_DIRECTIONS: [(i8, i8); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];

pub const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

pub fn get_bit(bitboard: Bitboard, square: Square) -> bool {
    (bitboard & (1u64 << square.index())) != 0
}

pub fn count_bits(bitboard: Bitboard) -> u32 {
    bitboard.count_ones()
}

// Pop LSB (remove and return the least significant bit)
pub fn pop_lsb(bitboard: &mut Bitboard) -> Option<Square> {
    if *bitboard == 0 {
        None
    } else {
        let lsb = bitboard.trailing_zeros() as u8;
        *bitboard &= *bitboard - 1;
        Some(Square::at(lsb % 8, lsb / 8))
    }
}

pub struct BitboardIterator {
    bitboard: Bitboard,
}

impl Iterator for BitboardIterator {
    type Item = Square;

    fn next(&mut self) -> Option<Self::Item> {
        pop_lsb(&mut self.bitboard)
    }
}

/// Squares of the set bits, lowest index first
pub fn iterate_bits(bitboard: Bitboard) -> BitboardIterator {
    BitboardIterator { bitboard }
}

const fn leaper_mask(square: usize, offsets: &[(i8, i8); 8]) -> Bitboard {
    let file = (square % 8) as i8;
    let rank = (square / 8) as i8;
    let mut mask = 0u64;
    let mut i = 0;
    while i < 8 {
        let f = file + offsets[i].0;
        let r = rank + offsets[i].1;
        if f >= 0 && f < 8 && r >= 0 && r < 8 {
            mask |= 1u64 << ((r * 8 + f) as u32);
        }
        i += 1;
    }
    mask
}

const fn leaper_table(offsets: &[(i8, i8); 8]) -> [Bitboard; 64] {
    let mut table = [0u64; 64];
    let mut square = 0;
    while square < 64 {
        table[square] = leaper_mask(square, offsets);
        square += 1;
    }
    table
}

// Pre-generated attack masks, built at compile time
static KNIGHT_ATTACKS: [Bitboard; 64] = leaper_table(&KNIGHT_OFFSETS);
static KING_ATTACKS: [Bitboard; 64] = leaper_table(&KING_STEPS);

pub fn get_knight_attacks(square: Square) -> Bitboard {
    KNIGHT_ATTACKS[square.index()]
}

pub fn get_king_attacks(square: Square) -> Bitboard {
    KING_ATTACKS[square.index()]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    #[test]
    fn test_knight_attack_masks() {
        let e4_attacks = get_knight_attacks(sq("e4"));
        for name in ["c3", "c5", "d2", "d6", "f2", "f6", "g3", "g5"] {
            assert!(get_bit(e4_attacks, sq(name)), "knight on e4 should attack {}", name);
        }
        assert_eq!(count_bits(e4_attacks), 8);

        assert_eq!(count_bits(get_knight_attacks(sq("a1"))), 2);
        assert_eq!(count_bits(get_knight_attacks(sq("h8"))), 2);
        assert_eq!(count_bits(get_knight_attacks(sq("b1"))), 3);
    }

    #[test]
    fn test_king_attack_masks() {
        assert_eq!(count_bits(get_king_attacks(sq("e4"))), 8);
        assert_eq!(count_bits(get_king_attacks(sq("a1"))), 3);
        assert_eq!(count_bits(get_king_attacks(sq("e1"))), 5);
        assert!(!get_bit(get_king_attacks(sq("h1")), sq("a2")));
    }

    #[test]
    fn iterate_bits_is_ascending() {
        let squares: Vec<Square> = iterate_bits(get_king_attacks(sq("a1"))).collect();
        assert_eq!(squares, vec![sq("b1"), sq("a2"), sq("b2")]);
    }
}
