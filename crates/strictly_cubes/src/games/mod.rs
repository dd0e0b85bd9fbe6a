//! Game implementations.

pub mod cubes;
