use shared::metrics_defs::{MetricDef, MetricType};

pub const REQUEST_DURATION: MetricDef = MetricDef {
    name: "request.duration",
    metric_type: MetricType::Histogram,
    description: "Full pipeline duration per request, in seconds",
};

pub const EMPTY_EXPERIMENT_SET: MetricDef = MetricDef {
    name: "experiments.empty_set",
    metric_type: MetricType::Counter,
    description: "Requests failed because the listing revealed no experiments",
};

pub const STORE_ERRORS: MetricDef = MetricDef {
    name: "store.errors",
    metric_type: MetricType::Counter,
    description: "Requests failed by a backing store error",
};

pub const GENERIC_NOT_FOUND: MetricDef = MetricDef {
    name: "requests.generic_404",
    metric_type: MetricType::Counter,
    description: "Requests that exhausted the fallback chain",
};

pub const ALL_METRICS: &[MetricDef] = &[
    REQUEST_DURATION,
    EMPTY_EXPERIMENT_SET,
    STORE_ERRORS,
    GENERIC_NOT_FOUND,
];
