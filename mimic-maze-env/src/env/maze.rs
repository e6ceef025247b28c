use crate::Direction;
use anyhow::{bail, Result};

/// `(row, column)` of a cell.
pub type Pos = (usize, usize);

/// Static structure of a maze parsed from a layout.
#[derive(Debug, Clone)]
pub(super) struct Maze {
    pub height: usize,
    pub width: usize,
    walls: Vec<bool>,
    pub pellets: Vec<bool>,
    pub player_start: Pos,
    pub ghost_starts: Vec<Pos>,
}

impl Maze {
    pub fn parse(layout: &[String]) -> Result<Self> {
        let height = layout.len();
        let width = layout.first().map(|r| r.chars().count()).unwrap_or(0);
        if height == 0 || width == 0 {
            bail!("empty maze layout");
        }

        let mut walls = Vec::with_capacity(height * width);
        let mut pellets = Vec::with_capacity(height * width);
        let mut player_start = None;
        let mut ghost_starts = vec![];

        for (r, row) in layout.iter().enumerate() {
            if row.chars().count() != width {
                bail!("row {} of the maze layout has not {} cells", r, width);
            }
            for (c, ch) in row.chars().enumerate() {
                walls.push(ch == '#');
                pellets.push(ch == '.');
                match ch {
                    'P' if player_start.is_some() => bail!("more than one player start"),
                    'P' => player_start = Some((r, c)),
                    'G' => ghost_starts.push((r, c)),
                    _ => {}
                }
            }
        }

        let player_start = match player_start {
            Some(pos) => pos,
            None => bail!("no player start in the maze layout"),
        };

        Ok(Self {
            height,
            width,
            walls,
            pellets,
            player_start,
            ghost_starts,
        })
    }

    #[inline]
    pub fn index(&self, (r, c): Pos) -> usize {
        r * self.width + c
    }

    /// Number of pellets at the start of an episode.
    pub fn num_pellets(&self) -> usize {
        self.pellets.iter().filter(|p| **p).count()
    }

    pub fn is_wall(&self, pos: Pos) -> bool {
        self.walls[self.index(pos)]
    }

    /// The cell next to `pos` in direction `dir`, unless it is a wall or off the maze.
    pub fn neighbor(&self, (r, c): Pos, dir: Direction) -> Option<Pos> {
        let (dr, dc) = dir.offset();
        let r = r.checked_add_signed(dr)?;
        let c = c.checked_add_signed(dc)?;
        if r >= self.height || c >= self.width || self.is_wall((r, c)) {
            None
        } else {
            Some((r, c))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(rows: &[&str]) -> Vec<String> {
        rows.iter().map(|r| r.to_string()).collect()
    }

    #[test]
    fn test_parse() -> Result<()> {
        let maze = Maze::parse(&layout(&["#####", "#P.G#", "#####"]))?;
        assert_eq!((maze.height, maze.width), (3, 5));
        assert_eq!(maze.player_start, (1, 1));
        assert_eq!(maze.ghost_starts, vec![(1, 3)]);
        assert_eq!(maze.pellets.iter().filter(|p| **p).count(), 1);
        assert!(maze.is_wall((0, 0)));
        Ok(())
    }

    #[test]
    fn test_neighbor() -> Result<()> {
        let maze = Maze::parse(&layout(&["P.", ".#"]))?;
        assert_eq!(maze.neighbor((0, 0), Direction::Right), Some((0, 1)));
        assert_eq!(maze.neighbor((0, 0), Direction::Down), Some((1, 0)));
        assert_eq!(maze.neighbor((0, 0), Direction::Up), None);
        assert_eq!(maze.neighbor((0, 0), Direction::Left), None);
        assert_eq!(maze.neighbor((0, 1), Direction::Down), None);
        Ok(())
    }

    #[test]
    fn test_invalid_layouts() {
        assert!(Maze::parse(&[]).is_err());
        assert!(Maze::parse(&layout(&["#.#", "#."])).is_err());
        assert!(Maze::parse(&layout(&["#..#"])).is_err());
        assert!(Maze::parse(&layout(&["P..P"])).is_err());
    }
}
