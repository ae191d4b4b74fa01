pub mod input_utils;
pub mod math;
