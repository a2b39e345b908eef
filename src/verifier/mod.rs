pub mod answer;

pub use answer::{canonicalize, check};
