use serde::{Serialize, Deserialize};

/// Per-epoch training statistics produced by `Trainer::run_epoch`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochStats {
    /// 0-based epoch number.
    pub epoch: usize,
    /// Total epochs requested for this run.
    pub total_epochs: usize,
    /// Cost of the last mini-batch of the epoch. This is the value recorded
    /// in the history and reported as the epoch's cost.
    pub cost: f64,
    /// Mean cost over all mini-batches of the epoch.
    pub mean_batch_cost: f64,
    /// Number of mini-batches processed.
    pub batches: usize,
    /// Wall-clock duration of this single epoch in milliseconds.
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpochRecord {
    pub epoch: usize,
    pub cost: f64,
}

/// Append-only (epoch, cost) series, for plotting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EpochHistory {
    records: Vec<EpochRecord>,
}

impl EpochHistory {
    pub fn new() -> EpochHistory {
        EpochHistory { records: Vec::new() }
    }

    pub fn push(&mut self, epoch: usize, cost: f64) {
        self.records.push(EpochRecord { epoch, cost });
    }

    pub fn records(&self) -> &[EpochRecord] {
        &self.records
    }

    pub fn costs(&self) -> impl Iterator<Item = f64> + '_ {
        self.records.iter().map(|r| r.cost)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn last(&self) -> Option<&EpochRecord> {
        self.records.last()
    }

    /// Writes the history as pretty-printed JSON.
    pub fn save_json(&self, path: &str) -> std::io::Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
    }
}

/// Progress is reported every quarter of the run and on the final epoch.
/// The quarter is rounded half to even, so 10 epochs report every 2nd.
pub fn should_report(epoch: usize, total_epochs: usize) -> bool {
    let every = ((total_epochs as f64) * 0.25).round_ties_even() as usize;
    epoch + 1 == total_epochs || every == 0 || epoch % every == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_each_quarter_and_last_epoch() {
        let reported: Vec<usize> = (0..125).filter(|&e| should_report(e, 125)).collect();
        // round(31.25) = 31
        assert_eq!(reported, vec![0, 31, 62, 93, 124]);
    }

    #[test]
    fn quarter_rounds_half_to_even() {
        let reported: Vec<usize> = (0..10).filter(|&e| should_report(e, 10)).collect();
        // round(2.5) = 2
        assert_eq!(reported, vec![0, 2, 4, 6, 8, 9]);
        let reported: Vec<usize> = (0..6).filter(|&e| should_report(e, 6)).collect();
        // round(1.5) = 2
        assert_eq!(reported, vec![0, 2, 4, 5]);
    }

    #[test]
    fn short_runs_report_every_epoch() {
        assert!(should_report(0, 1));
        assert!((0..2).all(|e| should_report(e, 2)));
        assert!((0..3).all(|e| should_report(e, 3)));
    }

    #[test]
    fn history_is_append_only_in_order() {
        let mut history = EpochHistory::new();
        history.push(0, 0.7);
        history.push(1, 0.5);
        assert_eq!(history.len(), 2);
        assert_eq!(history.costs().collect::<Vec<_>>(), vec![0.7, 0.5]);
        assert_eq!(history.last(), Some(&EpochRecord { epoch: 1, cost: 0.5 }));
    }
}
