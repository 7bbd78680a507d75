/// Schema shared by every example of a stream.
///
/// Features are numeric and addressed by position; the class is nominal and
/// addressed by its index into `class_labels`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamHeader {
    relation_name: String,
    feature_names: Vec<String>,
    class_labels: Vec<String>,
}

impl StreamHeader {
    pub fn new(relation_name: String, feature_names: Vec<String>, class_labels: Vec<String>) -> Self {
        Self {
            relation_name,
            feature_names,
            class_labels,
        }
    }

    pub fn relation_name(&self) -> &str {
        &self.relation_name
    }

    pub fn number_of_features(&self) -> usize {
        self.feature_names.len()
    }

    pub fn number_of_classes(&self) -> usize {
        self.class_labels.len()
    }

    pub fn feature_name(&self, index: usize) -> Option<&str> {
        self.feature_names.get(index).map(String::as_str)
    }

    pub fn class_label(&self, index: usize) -> Option<&str> {
        self.class_labels.get(index).map(String::as_str)
    }

    pub fn index_of_class(&self, label: &str) -> Option<usize> {
        self.class_labels.iter().position(|l| l == label)
    }
}
