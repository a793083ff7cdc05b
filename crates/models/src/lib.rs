pub mod errors;
pub mod db;
pub mod user_detail;
