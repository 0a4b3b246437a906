//! Board snapshots exported from the game.
//!
//! A snapshot is a JSON array of `HEIGHT` rows, each an array of `WIDTH` gem
//! objects. Only `gemColor` and `isEmpty` are read; sprite and colour metadata
//! the game attaches to each gem is ignored.
use crate::engine::{Board, Brick, HEIGHT, WIDTH};
use crate::error::{FormerError, FormerResult};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// One cell of a snapshot.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GemData {
    #[serde(default)]
    pub gem_color: String,
    #[serde(default)]
    pub is_empty: bool,
}

impl GemData {
    fn brick(&self, x: usize, y: usize) -> FormerResult<Option<Brick>> {
        if self.is_empty {
            return Ok(None);
        }
        brick_from_gem_color(&self.gem_color)
            .map(Some)
            .ok_or_else(|| FormerError::UnknownGemColor {
                name: self.gem_color.clone(),
                x,
                y,
            })
    }
}

/// Maps the game's gem names to brick colours.
pub fn brick_from_gem_color(name: &str) -> Option<Brick> {
    match name {
        "diagonal" => Some(Brick::Orange),
        "pil" => Some(Brick::Green),
        "sirkel" => Some(Brick::Pink),
        "firkant" => Some(Brick::Blue),
        _ => None,
    }
}

/// Builds a board from decoded snapshot rows, indexed `[y][x]`.
///
/// # Returns
/// * `Err(FormerError::InvalidShape)` unless there are exactly `HEIGHT` rows of
///   `WIDTH` cells.
/// * `Err(FormerError::UnknownGemColor)` for an occupied cell with an
///   unrecognised colour name.
pub fn board_from_gems(rows: &[Vec<GemData>]) -> FormerResult<Board> {
    if rows.len() != HEIGHT {
        return Err(FormerError::InvalidShape {
            message: format!("expected {} rows, found {}", HEIGHT, rows.len()),
        });
    }

    let mut grid = [[None; WIDTH]; HEIGHT];
    for (y, row) in rows.iter().enumerate() {
        if row.len() != WIDTH {
            return Err(FormerError::InvalidShape {
                message: format!("row {} has {} cells, expected {}", y, row.len(), WIDTH),
            });
        }
        for (x, gem) in row.iter().enumerate() {
            grid[y][x] = gem.brick(x, y)?;
        }
    }
    Ok(Board::from_grid(&grid))
}

/// Parses a snapshot from a JSON string.
pub fn load_snapshot(json: &str) -> FormerResult<Board> {
    let rows: Vec<Vec<GemData>> = serde_json::from_str(json)?;
    board_from_gems(&rows)
}

/// Reads and parses a snapshot file.
pub fn read_snapshot<P: AsRef<Path>>(path: P) -> FormerResult<Board> {
    let json = fs::read_to_string(path)?;
    load_snapshot(&json)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gem_json(cell: char) -> String {
        let name = match cell {
            'O' => "diagonal",
            'G' => "pil",
            'P' => "sirkel",
            'B' => "firkant",
            '?' => "stjerne",
            _ => return r#"{"gemColor":"","isEmpty":true,"tintColor":0}"#.to_string(),
        };
        format!(
            r#"{{"gemColor":"{}","sprite":{{"name":"gem","x":12.5,"visible":true}},"isEmpty":false,"blastColor":16777215}}"#,
            name
        )
    }

    fn snapshot_json(rows: &[&str]) -> String {
        let rows: Vec<String> = rows
            .iter()
            .map(|row| {
                let cells: Vec<String> = row.chars().map(gem_json).collect();
                format!("[{}]", cells.join(","))
            })
            .collect();
        format!("[{}]", rows.join(","))
    }

    const ROWS: [&str; HEIGHT] = [
        ".......", ".......", "O......", "OG.....", "PGB....", "PPBO...", "BOGPB..", "GGOPBO.",
        "OBPGOGB",
    ];

    #[test]
    fn test_load_snapshot_maps_colours() {
        let board = load_snapshot(&snapshot_json(&ROWS)).unwrap();
        assert_eq!(board.brick_count(), 28);
        assert_eq!(board.brick_at_xy(0, 2).unwrap(), Some(Brick::Orange));
        assert_eq!(board.brick_at_xy(1, 3).unwrap(), Some(Brick::Green));
        assert_eq!(board.brick_at_xy(0, 4).unwrap(), Some(Brick::Pink));
        assert_eq!(board.brick_at_xy(2, 4).unwrap(), Some(Brick::Blue));
        assert_eq!(board.brick_at_xy(6, 7).unwrap(), None);
        assert_eq!(board.to_plain_string(), ROWS.join("\n"));
    }

    #[test]
    fn test_load_snapshot_rejects_unknown_colour() {
        let mut rows = ROWS;
        rows[8] = "OBP?OGB";
        let result = load_snapshot(&snapshot_json(&rows));
        match result {
            Err(FormerError::UnknownGemColor { name, x, y }) => {
                assert_eq!(name, "stjerne");
                assert_eq!((x, y), (3, 8));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_empty_cell_ignores_colour_name() {
        let gem = GemData {
            gem_color: "stjerne".to_string(),
            is_empty: true,
        };
        assert_eq!(gem.brick(0, 0).unwrap(), None);
    }

    #[test]
    fn test_load_snapshot_rejects_wrong_shape() {
        let result = load_snapshot(&snapshot_json(&ROWS[..8]));
        assert!(matches!(result, Err(FormerError::InvalidShape { .. })));

        let mut rows = ROWS;
        rows[0] = "......";
        let result = load_snapshot(&snapshot_json(&rows));
        assert!(matches!(result, Err(FormerError::InvalidShape { .. })));
    }

    #[test]
    fn test_load_snapshot_rejects_malformed_json() {
        assert!(matches!(load_snapshot("[[{]]"), Err(FormerError::Json(_))));
    }

    #[test]
    fn test_read_snapshot_missing_file() {
        let result = read_snapshot("does/not/exist.json");
        assert!(matches!(result, Err(FormerError::Io(_))));
    }
}
