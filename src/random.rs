//! The game's seeded board generator.
//!
//! The daily board is drawn from an Alea-style generator seeded with the MD5
//! hex digest of a date string. Reproducing the generator bit for bit lets the
//! solver work on a day's board without a snapshot.
use crate::engine::{Board, Brick, HEIGHT, WIDTH};
use crate::error::{FormerError, FormerResult};
use chrono::{Days, NaiveDate};
use md5::{Digest, Md5};

const TWO_POW_32: f64 = 4_294_967_296.0;
const TWO_POW_NEG_32: f64 = 2.328_306_436_538_696_3e-10;

/// Days between a board's date and the date its seed is derived from.
pub const SEED_DATE_OFFSET_DAYS: u64 = 31;

/// Colour drawn for each quarter of the unit interval.
const DRAW_ORDER: [Brick; 4] = [Brick::Orange, Brick::Pink, Brick::Green, Brick::Blue];

/// Truncates towards zero and wraps into `u32` range.
fn wrap_u32(value: f64) -> f64 {
    value as u64 as u32 as f64
}

/// String hash used to seed the generator. Its state carries over between
/// calls, so hashing the same input twice gives different values.
struct Mash {
    seed: f64,
}

impl Mash {
    fn new() -> Self {
        Mash { seed: 4_022_871_197.0 }
    }

    fn hash(&mut self, input: &str) -> f64 {
        for ch in input.chars() {
            self.seed += ch as u32 as f64;
            let mut product = 0.025_196_032_824_169_38 * self.seed;
            self.seed = wrap_u32(product);
            product -= self.seed;
            product *= self.seed;
            self.seed = wrap_u32(product);
            product -= self.seed;
            self.seed += wrap_u32(product * TWO_POW_32);
        }
        wrap_u32(self.seed) * TWO_POW_NEG_32
    }
}

/// Multiply-with-carry generator producing values in `[0, 1)`.
#[derive(Clone, Debug, PartialEq)]
pub struct AleaRng {
    s0: f64,
    s1: f64,
    s2: f64,
    carry: f64,
}

impl AleaRng {
    /// Seeds the generator from a string.
    ///
    /// # Examples
    /// ```
    /// use former_solver::random::AleaRng;
    ///
    /// let mut a = AleaRng::new("seed");
    /// let mut b = AleaRng::new("seed");
    /// assert_eq!(a.next_f64(), b.next_f64());
    /// ```
    pub fn new(seed: &str) -> Self {
        let mut mash = Mash::new();
        let mut s0 = mash.hash(" ");
        let mut s1 = mash.hash(" ");
        let mut s2 = mash.hash(" ");

        for state in [&mut s0, &mut s1, &mut s2] {
            *state -= mash.hash(seed);
            if *state < 0.0 {
                *state += 1.0;
            }
        }

        AleaRng {
            s0,
            s1,
            s2,
            carry: 1.0,
        }
    }

    pub fn next_f64(&mut self) -> f64 {
        let t = 2_091_639.0 * self.s0 + self.carry * TWO_POW_NEG_32;
        self.s0 = self.s1;
        self.s1 = self.s2;
        self.carry = t.trunc();
        self.s2 = t - self.carry;
        self.s2
    }
}

/// Fills a board from `rng`, one draw per cell in row-major order.
pub fn board_from_rng(rng: &mut AleaRng) -> Board {
    let mut grid = [[None; WIDTH]; HEIGHT];
    for row in grid.iter_mut() {
        for cell in row.iter_mut() {
            let index = ((rng.next_f64() * 4.0).floor() as usize).min(DRAW_ORDER.len() - 1);
            *cell = Some(DRAW_ORDER[index]);
        }
    }
    Board::from_grid(&grid)
}

/// Generates the board for an arbitrary seed string.
pub fn board_from_seed(seed: &str) -> Board {
    board_from_rng(&mut AleaRng::new(seed))
}

/// Seed string for the board published on `date`: the MD5 hex digest of the
/// date 31 days earlier, formatted `DDMMYYYY`.
pub fn seed_for_date(date: NaiveDate) -> FormerResult<String> {
    let seed_date = date
        .checked_sub_days(Days::new(SEED_DATE_OFFSET_DAYS))
        .ok_or_else(|| FormerError::InvalidDate {
            message: format!("{} is too early to derive a seed", date),
        })?;
    let digest = Md5::digest(seed_date.format("%d%m%Y").to_string().as_bytes());
    Ok(hex::encode(digest))
}

/// Generates the board the game shows on `date`.
pub fn board_from_date(date: NaiveDate) -> FormerResult<Board> {
    Ok(board_from_seed(&seed_for_date(date)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alea_sequence() {
        let mut rng = AleaRng::new("hello");
        assert_eq!(rng.next_f64(), 0.8750656815245748);
        assert_eq!(rng.next_f64(), 0.33650841237977147);
        assert_eq!(rng.next_f64(), 0.6642807484604418);
    }

    #[test]
    fn test_alea_values_in_unit_interval() {
        let mut rng = AleaRng::new("range");
        for _ in 0..10_000 {
            let value = rng.next_f64();
            assert!((0.0..1.0).contains(&value), "{}", value);
        }
    }

    #[test]
    fn test_seed_for_date() {
        let date = NaiveDate::from_ymd_opt(2024, 11, 27).unwrap();
        assert_eq!(seed_for_date(date).unwrap(), "f5a4b413dd8ad80dcd96bdf346d05924");
        assert!(matches!(
            seed_for_date(NaiveDate::MIN),
            Err(FormerError::InvalidDate { .. })
        ));
    }

    #[test]
    fn test_board_from_date() {
        let board = board_from_date(NaiveDate::from_ymd_opt(2024, 11, 27).unwrap()).unwrap();
        let expected = [
            "PGGPGPO", "PGOBPGB", "BGGOGBG", "OOOOOOG", "BBGOBOP", "GBBGGBB", "OBGOPGO",
            "BPPOBOP", "GOOPOOP",
        ];
        assert_eq!(board.to_plain_string(), expected.join("\n"));
        assert_eq!(board.fingerprint(), 1_968_677_493);
        assert_eq!(board.click_groups().len(), 37);
    }

    #[test]
    fn test_board_from_date_across_leap_day() {
        let board = board_from_date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()).unwrap();
        let expected = [
            "OPOPGOG", "GPGBBBO", "BBOGBPG", "GOBGPGG", "OGOBGGB", "OGGOGBO", "GPBBOOO",
            "GOPPPPP", "GGBGPGG",
        ];
        assert_eq!(board.to_plain_string(), expected.join("\n"));
    }

    #[test]
    fn test_board_from_seed() {
        let board = board_from_seed("former");
        assert_eq!(board.brick_count(), crate::engine::CELLS);
        assert_eq!(board.fingerprint(), 3_204_669_477);
        assert_eq!(
            board.to_plain_string().lines().next(),
            Some("BGPOPGP")
        );
    }
}
