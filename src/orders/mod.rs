//! # Order Services
//!
//! Everything that happens to an order after the assembly saga created it:
//! status changes and agent assignment ([`lifecycle`]), and customer
//! feedback with the bonus and rating follow-ups it triggers ([`feedback`]).

pub mod error;
pub mod feedback;
pub mod lifecycle;

pub use error::LifecycleError;
pub use feedback::{FeedbackOutcome, FeedbackRequest};
pub use lifecycle::AgentAssignment;

use crate::repository::OrderRepository;

#[derive(Clone)]
pub struct OrderService {
    repo: OrderRepository,
}

impl OrderService {
    pub fn new(repo: OrderRepository) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &OrderRepository {
        &self.repo
    }
}
