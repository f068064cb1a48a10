use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    #[error("budget, people and nights must be positive (budget={budget}, people={people}, nights={nights})")]
    InvalidInput {
        budget: f64,
        people: u32,
        nights: u32,
    },
    #[error("catalog has no {pool} options")]
    EmptyCatalog { pool: &'static str },
}

pub type PlanResult<T> = std::result::Result<T, PlanError>;
