use crate::opiterator::*;
use common::{MinibaseError, Tuple};
use std::io::Write;

/// Manages the execution of queries using OpIterators.
#[derive(Default)]
pub struct Executor {
    /// Executor state
    pub plan: Option<Box<dyn OpIterator>>,
}

impl Executor {
    /// Initializes an executor without a plan.
    pub fn new_ref() -> Self {
        Self { plan: None }
    }

    pub fn configure_query(&mut self, physical_plan: Box<dyn OpIterator>) {
        self.plan = Some(physical_plan);
    }

    fn plan_mut(&mut self) -> Result<&mut Box<dyn OpIterator>, MinibaseError> {
        self.plan
            .as_mut()
            .ok_or_else(|| MinibaseError::ExecutionError(String::from("No query configured")))
    }

    /// Opens the physical plan iterator to begin execution.
    pub fn start(&mut self) -> Result<(), MinibaseError> {
        self.plan_mut()?.open()
    }

    /// Returns the next tuple or None if there is no such tuple.
    pub fn next(&mut self) -> Result<Option<Tuple>, MinibaseError> {
        self.plan_mut()?.next()
    }

    /// Closes the physical plan iterator.
    pub fn close(&mut self) -> Result<(), MinibaseError> {
        self.plan_mut()?.close()
    }

    /// Consumes the physical plan iterator into a vector of tuples.
    pub fn execute(&mut self) -> Result<Vec<Tuple>, MinibaseError> {
        self.start()?;
        let tuples = drain(self.plan_mut()?.as_mut())?;
        self.close()?;
        Ok(tuples)
    }

    /// Runs the plan and writes one line per result tuple, in emission
    /// order. Returns the number of tuples written.
    ///
    /// # Arguments
    ///
    /// * `out` - Sink for the rendered tuples.
    pub fn write_results<W: Write>(&mut self, out: &mut W) -> Result<usize, MinibaseError> {
        self.start()?;
        let mut count = 0;
        while let Some(t) = self.next()? {
            writeln!(out, "{}", t)?;
            count += 1;
        }
        self.close()?;
        out.flush()?;
        Ok(count)
    }
}
