pub mod sprite;
