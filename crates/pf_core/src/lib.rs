pub mod animation;
pub mod input;
pub mod time;
pub mod timer;
