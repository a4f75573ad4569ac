pub mod seaorm;

pub use seaorm::{SeaOrmQuestionRepository, SeaOrmStorage};
