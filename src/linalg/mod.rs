pub mod operator;

pub use operator::{norm, relative_change, LinearOperator};
