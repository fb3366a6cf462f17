// src/task.rs
use crate::error::Result;
use crate::tile::Tile;

/// A step that takes a tile, does its work, and hands the tile back.
///
/// An execution engine drives tasks one tile at a time; per-call arguments
/// travel in `Args`, everything else is fixed when the task is built.
pub trait TileTask {
    type Args;

    fn execute(&self, tile: Tile, args: Self::Args) -> Result<Tile>;

    fn name(&self) -> &str;
}
