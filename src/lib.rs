//! Seller net-proceeds estimation for marketplace listings, with a
//! multi-product PDF report.

pub mod domain;
pub mod infra;
pub mod report;
pub mod util;
