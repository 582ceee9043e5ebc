use super::errors::ExtractionError;
use super::model::Receipt;

/// Result of extracting a single image.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionOutcome {
    Success(Receipt),
    Failure(ExtractionError),
}

impl ExtractionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ExtractionOutcome::Success(_))
    }

    pub fn receipt(&self) -> Option<&Receipt> {
        match self {
            ExtractionOutcome::Success(receipt) => Some(receipt),
            ExtractionOutcome::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ExtractionError> {
        match self {
            ExtractionOutcome::Success(_) => None,
            ExtractionOutcome::Failure(error) => Some(error),
        }
    }

    pub fn failure_reason(&self) -> Option<String> {
        self.error().map(|error| error.to_string())
    }
}

impl From<Result<Receipt, ExtractionError>> for ExtractionOutcome {
    fn from(result: Result<Receipt, ExtractionError>) -> Self {
        match result {
            Ok(receipt) => ExtractionOutcome::Success(receipt),
            Err(error) => ExtractionOutcome::Failure(error),
        }
    }
}

/// Outcomes of a batch, position `i` belonging to the image submitted at `i`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchResult {
    outcomes: Vec<ExtractionOutcome>,
}

impl BatchResult {
    pub fn new(outcomes: Vec<ExtractionOutcome>) -> Self {
        Self { outcomes }
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ExtractionOutcome> {
        self.outcomes.get(index)
    }

    pub fn outcomes(&self) -> &[ExtractionOutcome] {
        &self.outcomes
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ExtractionOutcome> {
        self.outcomes.iter()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.len() - self.succeeded()
    }
}

impl IntoIterator for BatchResult {
    type Item = ExtractionOutcome;
    type IntoIter = std::vec::IntoIter<ExtractionOutcome>;

    fn into_iter(self) -> Self::IntoIter {
        self.outcomes.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;

    fn receipt() -> Receipt {
        Receipt {
            merchant_name: "Corner Shop".to_string(),
            transaction_date: None,
            total_amount: BigDecimal::from(4),
            line_items: vec![],
        }
    }

    #[test]
    fn should_convert_result_into_outcome() {
        let success: ExtractionOutcome = Ok(receipt()).into();
        let failure: ExtractionOutcome = Err(ExtractionError::NoResultReturned).into();

        assert!(success.is_success());
        assert_eq!(success.receipt(), Some(&receipt()));
        assert_eq!(
            failure.failure_reason(),
            Some("extraction.no_result_returned".to_string())
        );
        assert!(failure.receipt().is_none());
    }

    #[test]
    fn should_count_successes_and_failures() {
        let result = BatchResult::new(vec![
            ExtractionOutcome::Success(receipt()),
            ExtractionOutcome::Failure(ExtractionError::BackendUnavailable),
            ExtractionOutcome::Success(receipt()),
        ]);

        assert_eq!(result.len(), 3);
        assert_eq!(result.succeeded(), 2);
        assert_eq!(result.failed(), 1);
        assert_eq!(
            result.get(1).and_then(|o| o.error()),
            Some(&ExtractionError::BackendUnavailable)
        );
    }
}
