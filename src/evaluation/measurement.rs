use std::fmt;

/// Named scalar describing the state of a model.
///
/// Typical examples: `"ensemble size"`, `"change detections"`.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub name: &'static str,
    pub value: f64,
}

impl Measurement {
    #[inline]
    pub fn new(name: &'static str, value: f64) -> Self {
        Self { name, value }
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.name, self.value)
    }
}

/// Looks up a measurement by name.
pub fn find<'a>(measurements: &'a [Measurement], name: &str) -> Option<&'a Measurement> {
    measurements.iter().find(|m| m.name == name)
}
