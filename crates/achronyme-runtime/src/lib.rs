pub mod arena;
pub mod engine;

pub use arena::{ArenaStats, Handle, HandleArena};
pub use engine::{Engine, UnaryKernel};
