use crate::core::{Example, StreamHeader};
use crate::streams::Stream;
use std::io::Error;
use std::sync::Arc;

/// Replays a fixed list of examples.
pub struct VecStream {
    header: Arc<StreamHeader>,
    examples: Vec<Example>,
    idx: usize,
}

impl VecStream {
    pub fn new(header: Arc<StreamHeader>, examples: Vec<Example>) -> Self {
        Self {
            header,
            examples,
            idx: 0,
        }
    }
}

impl Stream for VecStream {
    fn header(&self) -> &Arc<StreamHeader> {
        &self.header
    }

    fn has_more_instances(&self) -> bool {
        self.idx < self.examples.len()
    }

    fn next_instance(&mut self) -> Option<Example> {
        let example = self.examples.get(self.idx)?.clone();
        self.idx += 1;
        Some(example)
    }

    fn restart(&mut self) -> Result<(), Error> {
        self.idx = 0;
        Ok(())
    }
}
