use crate::domain::fraud::FraudDashboard;
use crate::domain::operator::Operator;

pub struct FraudPageData {
    pub dashboard: FraudDashboard,
    pub operators: Vec<Operator>,
}
