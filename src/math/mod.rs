//! Numerical building blocks: element-wise trial averaging and least squares.

pub mod mean;
pub mod ols;

pub use mean::*;
pub use ols::*;
