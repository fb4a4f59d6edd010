use core::f64;
use std::collections::HashMap;
use std::fmt::Display;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Duration;

use streaming_merkle::Result;

/// Summary of latency samples, in microseconds per operation.
#[derive(Debug, Clone)]
pub struct Stat {
  pub count: usize,
  pub mean: f64,
  pub median: f64,
  pub std_dev: f64,
  pub min: f64,
  pub max: f64,
}

impl Stat {
  pub fn from_vec(mut data: Vec<f64>) -> Stat {
    if data.is_empty() {
      return Stat { count: 0, mean: f64::NAN, median: f64::NAN, std_dev: f64::NAN, min: f64::NAN, max: f64::NAN };
    }
    data.sort_by(f64::total_cmp);
    let count = data.len();
    let min = data[0];
    let max = data[count - 1];
    let mean = data.iter().sum::<f64>() / count as f64;
    let median = if count % 2 == 0 { (data[count / 2 - 1] + data[count / 2]) / 2.0 } else { data[count / 2] };
    let variance = data.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / count as f64;
    Stat { count, mean, median, std_dev: variance.sqrt(), min, max }
  }
}

impl Display for Stat {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    // 2σ (equivalent to 95.4% confidence interval) calculated as a percentage
    let two_sigma_percent = if self.mean > 0.0 { (2.0 * self.std_dev / self.mean) * 100.0 } else { 0.0 };
    write!(
      f,
      "{}: {:.3}µs/op ±{:.1}% [{:.3}|{:.3}|{:.3}]",
      self.count, self.mean, two_sigma_percent, self.min, self.median, self.max
    )
  }
}

/// Latency samples grouped by tree size.
pub struct Report {
  data_set: HashMap<u64, Vec<f64>>,
}

impl Report {
  pub fn new() -> Self {
    Report { data_set: HashMap::new() }
  }

  /// Records `elapsed` spent on `ops` operations against a tree of `n` leaves.
  pub fn add(&mut self, n: u64, elapsed: Duration, ops: usize) {
    if ops > 0 {
      let per_op = elapsed.as_nanos() as f64 / 1000.0 / ops as f64;
      self.data_set.entry(n).or_default().push(per_op);
    }
  }

  pub fn single(&self, n: u64) -> Option<Stat> {
    self.data_set.get(&n).map(|ys| Stat::from_vec(ys.clone()))
  }

  pub fn save_to_csv(&self, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    writeln!(writer, "N,COUNT,MEAN,MEDIAN,STDDEV,MIN,MAX")?;

    let mut xs = self.data_set.keys().copied().collect::<Vec<_>>();
    xs.sort_unstable();
    for x in xs {
      let Some(y) = self.single(x) else { continue };
      writeln!(
        writer,
        "{},{},{:.3},{:.3},{:.3},{:.3},{:.3}",
        x, y.count, y.mean, y.median, y.std_dev, y.min, y.max
      )?;
    }

    writer.flush()?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::fs::read_to_string;

  #[test]
  fn stat_of_samples() {
    let s = Stat::from_vec(vec![4.0, 1.0, 3.0, 2.0]);
    assert_eq!(4, s.count);
    assert_eq!(2.5, s.mean);
    assert_eq!(2.5, s.median);
    assert_eq!(1.0, s.min);
    assert_eq!(4.0, s.max);
    assert!((s.std_dev - 1.25f64.sqrt()).abs() < 1e-12);

    let empty = Stat::from_vec(Vec::new());
    assert_eq!(0, empty.count);
    assert!(empty.mean.is_nan());
  }

  #[test]
  fn report_is_per_operation() {
    let mut report = Report::new();
    report.add(8, Duration::from_micros(100), 10);
    report.add(8, Duration::from_micros(300), 10);
    report.add(8, Duration::from_micros(300), 0);
    let s = report.single(8).unwrap();
    assert_eq!(2, s.count);
    assert_eq!(20.0, s.mean);
    assert!(report.single(16).is_none());
  }

  #[test]
  fn report_to_csv() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.csv");
    let mut report = Report::new();
    report.add(1024, Duration::from_micros(5), 1);
    report.add(2, Duration::from_micros(1), 1);
    report.save_to_csv(&path).unwrap();

    let lines = read_to_string(&path).unwrap().lines().map(str::to_string).collect::<Vec<_>>();
    assert_eq!(
      vec![
        "N,COUNT,MEAN,MEDIAN,STDDEV,MIN,MAX",
        "2,1,1.000,1.000,0.000,1.000,1.000",
        "1024,1,5.000,5.000,0.000,5.000,5.000"
      ],
      lines
    );
  }
}
