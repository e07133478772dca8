use std::io::{self, Write};
use std::time::Instant;

/// Timing context for one equilibration run.
///
/// Carried explicitly from the call site to the report sink, so throughput
/// accounting needs no process-wide state.
pub struct RunTimer {
    started: Instant,
    molecules: usize,
    atoms: usize,
}

impl RunTimer {
    /// Starts the clock. Call before the equilibration step.
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
            molecules: 0,
            atoms: 0,
        }
    }

    /// Records the size of the processed batch.
    pub fn record(&mut self, molecules: usize, atoms: usize) {
        self.molecules += molecules;
        self.atoms += atoms;
    }

    /// Writes a one-line throughput summary to `writer`.
    pub fn report(&self, writer: &mut dyn Write) -> io::Result<()> {
        let elapsed = self.started.elapsed();
        let per_molecule = if self.molecules > 0 {
            elapsed.as_secs_f64() / self.molecules as f64
        } else {
            0.0
        };
        writeln!(
            writer,
            "{} molecules ({} atoms) equilibrated in {:.3} s ({:.3e} s/molecule)",
            self.molecules,
            self.atoms,
            elapsed.as_secs_f64(),
            per_molecule
        )
    }
}
