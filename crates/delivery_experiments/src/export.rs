//! CSV and JSON export of sweep results.

use std::error::Error;
use std::fs::File;
use std::path::Path;

use crate::sweep::SweepResult;

pub fn export_to_csv<P: AsRef<Path>>(
    results: &[SweepResult],
    path: P,
) -> Result<(), Box<dyn Error>> {
    export_to_csv_impl(results, File::create(path)?)
}

pub fn export_to_json<P: AsRef<Path>>(
    results: &[SweepResult],
    path: P,
) -> Result<(), Box<dyn Error>> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, results)?;
    Ok(())
}

fn export_to_csv_impl(results: &[SweepResult], file: File) -> Result<(), Box<dyn Error>> {
    let mut wtr = csv::Writer::from_writer(file);

    wtr.write_record([
        "mode",
        "density",
        "seed",
        "slots_priced",
        "discounted_slots",
        "best_deals",
        "good_deals",
        "solo_required_slots",
        "avg_discount_cents",
        "min_final_fee_cents",
        "finalized_orders",
    ])?;

    for result in results {
        wtr.write_record([
            format!("{:?}", result.mode).to_lowercase(),
            format!("{:?}", result.density).to_lowercase(),
            result.seed.to_string(),
            result.slots_priced.to_string(),
            result.discounted_slots.to_string(),
            result.best_deals.to_string(),
            result.good_deals.to_string(),
            result.solo_required_slots.to_string(),
            format!("{:.2}", result.avg_discount_cents),
            result.min_final_fee_cents.to_string(),
            result.finalized_orders.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use delivery_core::decay::DeliveryMode;
    use delivery_core::scenario::StopDensity;

    #[test]
    fn csv_has_a_header_and_one_row_per_result() {
        let results = vec![SweepResult {
            mode: DeliveryMode::Bicycle,
            density: StopDensity::High,
            seed: 7,
            slots_priced: 24,
            discounted_slots: 9,
            best_deals: 2,
            good_deals: 4,
            solo_required_slots: 15,
            avg_discount_cents: 12.5,
            min_final_fee_cents: 393,
            finalized_orders: 1,
        }];

        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("sweep.csv");
        export_to_csv(&results, &path).expect("export");

        let content = std::fs::read_to_string(&path).expect("read back");
        let mut lines = content.lines();
        assert!(lines.next().expect("header").starts_with("mode,density,seed"));
        let row = lines.next().expect("row");
        assert!(row.starts_with("bicycle,high,7,24,9,2,4,15,12.50,393,1"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn json_export_is_an_array_of_results() {
        let results = vec![SweepResult {
            mode: DeliveryMode::Car,
            density: StopDensity::Low,
            seed: 7,
            slots_priced: 24,
            discounted_slots: 3,
            best_deals: 0,
            good_deals: 1,
            solo_required_slots: 21,
            avg_discount_cents: 4.0,
            min_final_fee_cents: 441,
            finalized_orders: 1,
        }];

        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("sweep.json");
        export_to_json(&results, &path).expect("export");

        let parsed: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).expect("read back"))
                .expect("valid json");
        let rows = parsed.as_array().expect("array");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["mode"], "car");
        assert_eq!(rows[0]["minFinalFeeCents"], 441);
    }
}
