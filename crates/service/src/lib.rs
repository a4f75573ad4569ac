//! Service layer for the question bank.
//! - Runs every operation in one storage transaction and finalizes it.
//! - Enforces ownership of questions against an explicit acting user.
//! - Reuses entity definitions in `models` crate.

pub mod errors;
pub mod clock;
pub mod identity;
pub mod question;
#[cfg(test)]
pub mod test_support;
