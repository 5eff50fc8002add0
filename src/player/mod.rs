pub mod cursor;
pub mod playlist;
pub mod video;
pub mod visualizer;
