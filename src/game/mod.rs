pub mod bounds;
pub mod constants;
pub mod engine;
pub mod entity;
pub mod performance;
pub mod potential;
pub mod quadtree;
pub mod state;
pub mod systems;
