pub mod gate;
pub mod login;
pub mod refresh;
pub mod register;
pub mod token_utils;
