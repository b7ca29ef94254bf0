pub mod timeline;
pub mod world;
