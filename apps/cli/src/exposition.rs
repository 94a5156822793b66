//! Prometheus text exposition of engine metric samples

use prometheus::{CounterVec, Encoder, GaugeVec, Opts, Registry, TextEncoder};
use std::collections::BTreeMap;
use wardline_engine::telemetry::{Sample, SampleKind};

enum Family {
    Counter(CounterVec),
    Gauge(GaugeVec),
}

/// Render `samples` in the Prometheus text format.
///
/// Samples sharing a name become one metric family; their label names must
/// agree, which holds for every snapshot the engine produces.
pub fn render(samples: &[Sample]) -> anyhow::Result<String> {
    let registry = Registry::new();
    let mut families: BTreeMap<&str, Family> = BTreeMap::new();

    for sample in samples {
        if !families.contains_key(sample.name.as_str()) {
            let label_names: Vec<&str> = sample.labels.iter().map(|(k, _)| k.as_str()).collect();
            let opts = Opts::new(sample.name.as_str(), sample.help);
            let family = match sample.kind {
                SampleKind::Counter => {
                    let vec = CounterVec::new(opts, &label_names)?;
                    registry.register(Box::new(vec.clone()))?;
                    Family::Counter(vec)
                }
                SampleKind::Gauge => {
                    let vec = GaugeVec::new(opts, &label_names)?;
                    registry.register(Box::new(vec.clone()))?;
                    Family::Gauge(vec)
                }
            };
            families.insert(sample.name.as_str(), family);
        }

        let values: Vec<&str> = sample.labels.iter().map(|(_, v)| v.as_str()).collect();
        match families.get(sample.name.as_str()) {
            Some(Family::Counter(vec)) => {
                vec.get_metric_with_label_values(&values)?.inc_by(sample.value)
            }
            Some(Family::Gauge(vec)) => {
                vec.get_metric_with_label_values(&values)?.set(sample.value)
            }
            None => {}
        }
    }

    let mut buffer = Vec::new();
    TextEncoder::new().encode(&registry.gather(), &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}
