pub mod consts;
pub mod utils;
