//! Parquet export of pricing telemetry.

use std::error::Error;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray, UInt64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use crate::telemetry::PricingTelemetry;

/// Write every finalized order to a Parquet file.
pub fn write_finalized_orders_parquet<P: AsRef<Path>>(
    path: P,
    telemetry: &PricingTelemetry,
) -> Result<(), Box<dyn Error>> {
    let orders = &telemetry.finalized_orders;
    let mut order_ids = Vec::with_capacity(orders.len());
    let mut quote_ids = Vec::with_capacity(orders.len());
    let mut slot_ids = Vec::with_capacity(orders.len());
    let mut subtotal_cents = Vec::with_capacity(orders.len());
    let mut delivery_fee_cents = Vec::with_capacity(orders.len());
    let mut discount_cents = Vec::with_capacity(orders.len());
    let mut total_cents = Vec::with_capacity(orders.len());
    let mut lat = Vec::with_capacity(orders.len());
    let mut lon = Vec::with_capacity(orders.len());
    let mut finalized_at_ms = Vec::with_capacity(orders.len());

    for record in orders {
        order_ids.push(record.order_id.clone());
        quote_ids.push(record.quote_id.clone());
        slot_ids.push(record.slot_id.clone());
        subtotal_cents.push(record.subtotal_cents);
        delivery_fee_cents.push(record.delivery_fee_cents);
        discount_cents.push(record.discount_cents);
        total_cents.push(record.total_cents);
        lat.push(record.lat);
        lon.push(record.lon);
        finalized_at_ms.push(record.finalized_at.timestamp_millis());
    }

    let schema = Schema::new(vec![
        Field::new("order_id", DataType::Utf8, false),
        Field::new("quote_id", DataType::Utf8, false),
        Field::new("slot_id", DataType::Utf8, false),
        Field::new("subtotal_cents", DataType::Int64, false),
        Field::new("delivery_fee_cents", DataType::Int64, false),
        Field::new("discount_cents", DataType::Int64, false),
        Field::new("total_cents", DataType::Int64, false),
        Field::new("lat", DataType::Float64, false),
        Field::new("lon", DataType::Float64, false),
        Field::new("finalized_at_ms", DataType::Int64, false),
    ]);

    let arrays: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(order_ids)),
        Arc::new(StringArray::from(quote_ids)),
        Arc::new(StringArray::from(slot_ids)),
        Arc::new(Int64Array::from(subtotal_cents)),
        Arc::new(Int64Array::from(delivery_fee_cents)),
        Arc::new(Int64Array::from(discount_cents)),
        Arc::new(Int64Array::from(total_cents)),
        Arc::new(Float64Array::from(lat)),
        Arc::new(Float64Array::from(lon)),
        Arc::new(Int64Array::from(finalized_at_ms)),
    ];

    write_record_batch(path, schema, arrays)
}

/// Write every priced-slot sample to a Parquet file.
pub fn write_priced_slot_samples_parquet<P: AsRef<Path>>(
    path: P,
    telemetry: &PricingTelemetry,
) -> Result<(), Box<dyn Error>> {
    let samples = &telemetry.priced_slots;
    let mut slot_ids = Vec::with_capacity(samples.len());
    let mut computed_at_ms = Vec::with_capacity(samples.len());
    let mut score = Vec::with_capacity(samples.len());
    let mut discount_fraction = Vec::with_capacity(samples.len());
    let mut final_fee_cents = Vec::with_capacity(samples.len());
    let mut neighbor_count = Vec::with_capacity(samples.len());
    let mut requires_solo = Vec::with_capacity(samples.len());

    for sample in samples {
        slot_ids.push(sample.slot_id.clone());
        computed_at_ms.push(sample.computed_at.timestamp_millis());
        score.push(sample.score);
        discount_fraction.push(sample.discount_fraction);
        final_fee_cents.push(sample.final_fee_cents);
        neighbor_count.push(sample.neighbor_count as u64);
        requires_solo.push(sample.requires_solo_minimum);
    }

    let schema = Schema::new(vec![
        Field::new("slot_id", DataType::Utf8, false),
        Field::new("computed_at_ms", DataType::Int64, false),
        Field::new("score", DataType::Float64, false),
        Field::new("discount_fraction", DataType::Float64, false),
        Field::new("final_fee_cents", DataType::Int64, false),
        Field::new("neighbor_count", DataType::UInt64, false),
        Field::new("requires_solo_minimum", DataType::Boolean, false),
    ]);

    let arrays: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(slot_ids)),
        Arc::new(Int64Array::from(computed_at_ms)),
        Arc::new(Float64Array::from(score)),
        Arc::new(Float64Array::from(discount_fraction)),
        Arc::new(Int64Array::from(final_fee_cents)),
        Arc::new(UInt64Array::from(neighbor_count)),
        Arc::new(BooleanArray::from(requires_solo)),
    ];

    write_record_batch(path, schema, arrays)
}

fn write_record_batch<P: AsRef<Path>>(
    path: P,
    schema: Schema,
    arrays: Vec<ArrayRef>,
) -> Result<(), Box<dyn Error>> {
    let schema = Arc::new(schema);
    let batch = RecordBatch::try_new(schema.clone(), arrays)?;
    let file = File::create(path)?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}
