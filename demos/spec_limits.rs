use qc_charts::prelude::*;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> qc_charts::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "qc_charts=debug".into()),
        )
        .init();

    let (values, batches) = generate_batches();
    let data = MeasurementTable::new()
        .with_numeric("value", values)?
        .with_column("batch", batches)?;
    let specs = SpecTable::from_column("value", [("LSL", 12.0), ("USL", 18.0), ("Target", 15.0)]);

    let boxes = qc_plot(&data, &specs, "value").group_by("batch").build()?;
    println!("{}", boxes.to_json()?);

    let ecdf = qc_plot(&data, &specs, "value").ecdf().group_by("batch").build()?;
    println!("{}", ecdf.to_json()?);

    Ok(())
}

/// Three batches of 50: A on target, B running high, C with wider spread.
fn generate_batches() -> (Vec<f64>, Vec<&'static str>) {
    let batches = [("A", 15.0, 1.5), ("B", 16.0, 1.0), ("C", 14.0, 2.0)];
    let mut values = Vec::with_capacity(150);
    let mut labels = Vec::with_capacity(150);

    for (name, center, spread) in batches {
        for i in 0..50 {
            let t = i as f64;
            let noise = (t * 0.7).sin() * 0.6 + (t * 1.9).cos() * 0.4;
            values.push(center + spread * noise);
            labels.push(name);
        }
    }
    (values, labels)
}
