pub mod collision;
pub mod gravity;
pub mod physics;
pub mod response;
pub mod spawn;
