pub mod fmp;
pub mod fmp_dto;
pub mod frank;
pub mod frank_dto;
pub mod utils;

pub use fmp::FmpApi;
pub use frank::FrankApi;
