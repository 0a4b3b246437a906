use crate::engine::{Board, Brick, HEIGHT, WIDTH};
use crate::error::{FormerError, FormerResult};

/// Parses an array of string slices into a `Board` object.
///
/// Each string slice in the input array represents a row on the board, starting from row 0
/// (the top). If fewer than `HEIGHT` rows are provided, the remaining rows are empty.
/// Similarly, if a row string is shorter than `WIDTH` characters, the rest of that
/// row is empty. No gravity is applied; the cells are taken as written.
///
/// Valid characters are:
/// - 'O': `Brick::Orange`
/// - 'G': `Brick::Green`
/// - 'P': `Brick::Pink`
/// - 'B': `Brick::Blue`
/// - '.': empty
///
/// # Returns
/// * `Ok(Board)` if parsing is successful.
/// * `Err(FormerError::InvalidShape)` if there are more than `HEIGHT` rows or a row is
///   longer than `WIDTH` characters.
/// * `Err(FormerError::InvalidCharacter)` for any other character.
///
/// # Examples
/// ```
/// use former_solver::utils::board_from_str_array;
/// use former_solver::engine::Brick;
///
/// let board = board_from_str_array(&["OGP", "B.O"]).unwrap();
/// assert_eq!(board.brick_at_xy(0, 0).unwrap(), Some(Brick::Orange));
/// assert_eq!(board.brick_at_xy(1, 1).unwrap(), None);
/// assert_eq!(board.brick_at_xy(2, 1).unwrap(), Some(Brick::Orange));
/// assert_eq!(board.brick_at_xy(0, 2).unwrap(), None);
///
/// assert!(board_from_str_array(&["OXB"]).is_err());
/// ```
pub fn board_from_str_array(s: &[&str]) -> FormerResult<Board> {
    if s.len() > HEIGHT {
        return Err(FormerError::InvalidShape {
            message: format!("expected at most {} rows, found {}", HEIGHT, s.len()),
        });
    }

    let mut grid = [[None; WIDTH]; HEIGHT];

    for (y, row_str) in s.iter().enumerate() {
        let length = row_str.chars().count();
        if length > WIDTH {
            return Err(FormerError::InvalidShape {
                message: format!(
                    "row {} is too long, expected at most {} characters, found {}",
                    y, WIDTH, length
                ),
            });
        }

        for (x, ch) in row_str.chars().enumerate() {
            grid[y][x] = match ch {
                '.' => None,
                _ => Some(Brick::from_char(ch).ok_or(FormerError::InvalidCharacter { ch, x, y })?),
            };
        }
    }
    Ok(Board::from_grid(&grid))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_from_str_array_valid() {
        let board_str = [
            "OGPBOGP", ".......", "BPGOBPG", ".......", "OGPBOGP", ".......", "BPGOBPG",
            ".......", "OGPBOGP",
        ];
        let board = board_from_str_array(&board_str).unwrap();
        assert_eq!(board.brick_at_xy(0, 0).unwrap(), Some(Brick::Orange));
        assert_eq!(board.brick_at_xy(3, 2).unwrap(), Some(Brick::Orange));
        assert_eq!(board.brick_at_xy(0, 1).unwrap(), None);
        assert_eq!(board.brick_count(), 35);
    }

    #[test]
    fn test_board_from_str_array_invalid_char() {
        let result = board_from_str_array(&["OGPBX"]);
        assert!(matches!(
            result,
            Err(FormerError::InvalidCharacter { ch: 'X', x: 4, y: 0 })
        ));
    }

    #[test]
    fn test_board_from_str_array_with_spaces() {
        let result = board_from_str_array(&["O G"]);
        assert!(matches!(
            result,
            Err(FormerError::InvalidCharacter { ch: ' ', .. })
        ));
    }

    #[test]
    fn test_board_from_str_array_row_too_long() {
        let too_long_row = "O".repeat(WIDTH + 1);
        let result = board_from_str_array(&[too_long_row.as_str()]);
        let message = result.unwrap_err().to_string();
        assert!(message.contains("row 0 is too long"), "{}", message);
    }

    #[test]
    fn test_board_from_str_array_too_many_rows() {
        let rows = vec!["O"; HEIGHT + 1];
        let result = board_from_str_array(&rows);
        assert!(matches!(result, Err(FormerError::InvalidShape { .. })));
    }

    #[test]
    fn test_board_from_str_array_empty_input() {
        let board_str: [&str; 0] = [];
        let board = board_from_str_array(&board_str).unwrap();
        assert!(board.is_empty());
    }
}
