pub mod errors;
pub mod db;
pub mod user;
pub mod module;
pub mod question;

#[cfg(test)]
mod tests;
