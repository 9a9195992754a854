use crate::domain::operator::OperatorWorkload;

/// Data required to render the operators page.
#[derive(Debug)]
pub struct OperatorsPageData {
    pub operators: Vec<OperatorWorkload>,
}
