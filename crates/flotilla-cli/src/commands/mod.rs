pub mod evaluate;
pub mod simulate;
pub mod strategy;
