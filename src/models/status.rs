#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    Pending,
    InProgress,
    Delivered,
}

impl OrderStatus {
    pub fn canonical(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::InProgress => "in-progress",
            OrderStatus::Delivered => "delivered",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered)
    }
}

/// Wire labels for the status set. Two deployments of the original system
/// disagreed on the middle state's label, so it is configuration here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusVocabulary {
    in_progress_label: &'static str,
}

impl StatusVocabulary {
    pub fn standard() -> Self {
        Self {
            in_progress_label: "in-progress",
        }
    }

    pub fn out_for_delivery() -> Self {
        Self {
            in_progress_label: "out-for-delivery",
        }
    }

    pub fn label(&self, status: OrderStatus) -> &'static str {
        match status {
            OrderStatus::Pending => "pending",
            OrderStatus::InProgress => self.in_progress_label,
            OrderStatus::Delivered => "delivered",
        }
    }

    pub fn parse(&self, raw: &str) -> Option<OrderStatus> {
        match raw {
            "pending" => Some(OrderStatus::Pending),
            "delivered" => Some(OrderStatus::Delivered),
            other if other == self.in_progress_label => Some(OrderStatus::InProgress),
            _ => None,
        }
    }
}

impl Default for StatusVocabulary {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::{OrderStatus, StatusVocabulary};

    #[test]
    fn standard_vocabulary_round_trips_all_states() {
        let vocabulary = StatusVocabulary::standard();

        for status in [
            OrderStatus::Pending,
            OrderStatus::InProgress,
            OrderStatus::Delivered,
        ] {
            assert_eq!(vocabulary.parse(vocabulary.label(status)), Some(status));
        }
    }

    #[test]
    fn out_for_delivery_vocabulary_uses_variant_label() {
        let vocabulary = StatusVocabulary::out_for_delivery();

        assert_eq!(vocabulary.label(OrderStatus::InProgress), "out-for-delivery");
        assert_eq!(
            vocabulary.parse("out-for-delivery"),
            Some(OrderStatus::InProgress)
        );
        assert_eq!(vocabulary.parse("in-progress"), None);
    }

    #[test]
    fn unknown_label_does_not_parse() {
        let vocabulary = StatusVocabulary::standard();
        assert_eq!(vocabulary.parse("shipped"), None);
    }

    #[test]
    fn delivered_is_terminal() {
        assert!(OrderStatus::Delivered.is_terminal());
        assert!(!OrderStatus::Pending.is_terminal());
        assert!(!OrderStatus::InProgress.is_terminal());
    }
}
