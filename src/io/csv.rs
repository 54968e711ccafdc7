/*!
# Saving chain traces to CSV

Enable via the `csv` feature.
*/

use ndarray::{Array2, Axis};
use std::error::Error;
use std::fs::File;
use std::io::Write;

use csv::Writer;

use crate::report::ReportRow;

/**
Saves a trace of shape **chain × sample** as CSV.

The file has a header row `chain,sample,x` followed by one row per stored state.

# Examples

```rust
use ndarray::arr2;
use reflect_mcmc::io::csv::save_csv;

let trace = arr2(&[[0.5, 0.6], [0.5, 0.4]]);
let path = std::env::temp_dir().join("reflect_mcmc_doc_trace.csv");
save_csv(&trace, path.to_str().unwrap())?;
# Ok::<(), Box<dyn std::error::Error>>(())
```
*/
pub fn save_csv<T: std::fmt::Display>(trace: &Array2<T>, filename: &str) -> Result<(), Box<dyn Error>> {
    let mut wtr = Writer::from_writer(File::create(filename)?);
    write_trace(&mut wtr, trace)?;
    Ok(())
}

/// Writes the report rows as CSV with header `it,x,mean,nacpt`.
pub fn save_report_csv(rows: &[ReportRow], filename: &str) -> Result<(), Box<dyn Error>> {
    let mut wtr = Writer::from_writer(File::create(filename)?);
    wtr.write_record(["it", "x", "mean", "nacpt"])?;
    for row in rows {
        wtr.write_record(&[
            row.iteration.to_string(),
            row.state.to_string(),
            row.running_mean.to_string(),
            row.accepted.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

fn write_trace<W: Write, T: std::fmt::Display>(
    wtr: &mut Writer<W>,
    trace: &Array2<T>,
) -> Result<(), Box<dyn Error>> {
    wtr.write_record(["chain", "sample", "x"])?;
    for (chain_idx, chain) in trace.axis_iter(Axis(0)).enumerate() {
        for (sample_idx, x) in chain.iter().enumerate() {
            wtr.write_record(&[chain_idx.to_string(), sample_idx.to_string(), x.to_string()])?;
        }
    }
    wtr.flush()?;
    Ok(())
}
