// animal-talk-core/src/models/mod.rs
pub mod tools;
