use mealwise::config::{AppConfig, AppEnvironment};
use mealwise::discounts::DiscountProvider;
use mealwise::error::AppError;
use mealwise::meals::{GeminiMealSuggester, MealSource};
use mealwise::planner::MealPlanService;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub(crate) type Planner = MealPlanService<DiscountProvider>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) usage: Arc<UsageMetrics>,
    pub(crate) planner: Arc<Planner>,
    pub(crate) environment: AppEnvironment,
    pub(crate) assistant_model: Option<String>,
    pub(crate) started_at: Instant,
}

/// Builds the planning service from configuration: the selected discount
/// source and, when an API key is present, the generative meal assistant.
pub(crate) fn build_planner(config: &AppConfig) -> Result<Planner, AppError> {
    let provider = Arc::new(DiscountProvider::from_config(&config.discounts)?);
    let planner = MealPlanService::new(provider, config.discounts.search_radius_km);

    match GeminiMealSuggester::from_config(&config.assistant)? {
        Some(suggester) => Ok(planner.with_suggester(Arc::new(suggester))),
        None => Ok(planner),
    }
}

/// In-process request counters backing the JSON metrics endpoints.
#[derive(Debug, Default)]
pub(crate) struct UsageMetrics {
    optimize_requests: AtomicU64,
    succeeded: AtomicU64,
    empty_results: AtomicU64,
    validation_failures: AtomicU64,
    upstream_failures: AtomicU64,
    generative_meals: AtomicU64,
    rule_based_meals: AtomicU64,
    latency_micros_total: AtomicU64,
}

pub(crate) enum OptimizeOutcome {
    Success { empty: bool, meal_source: MealSource },
    Invalid,
    Upstream,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct UsageSnapshot {
    pub(crate) optimize_requests: u64,
    pub(crate) succeeded: u64,
    pub(crate) empty_results: u64,
    pub(crate) validation_failures: u64,
    pub(crate) upstream_failures: u64,
    pub(crate) generative_meals: u64,
    pub(crate) rule_based_meals: u64,
    pub(crate) average_latency_ms: f64,
}

impl UsageMetrics {
    pub(crate) fn record(&self, outcome: OptimizeOutcome, elapsed: Duration) {
        self.optimize_requests.fetch_add(1, Ordering::Relaxed);
        let micros = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX);
        self.latency_micros_total
            .fetch_add(micros, Ordering::Relaxed);

        match outcome {
            OptimizeOutcome::Success { empty, meal_source } => {
                self.succeeded.fetch_add(1, Ordering::Relaxed);
                if empty {
                    self.empty_results.fetch_add(1, Ordering::Relaxed);
                }
                match meal_source {
                    MealSource::Generative => {
                        self.generative_meals.fetch_add(1, Ordering::Relaxed);
                    }
                    MealSource::RuleBased => {
                        self.rule_based_meals.fetch_add(1, Ordering::Relaxed);
                    }
                    MealSource::None => {}
                }
            }
            OptimizeOutcome::Invalid => {
                self.validation_failures.fetch_add(1, Ordering::Relaxed);
            }
            OptimizeOutcome::Upstream => {
                self.upstream_failures.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    pub(crate) fn snapshot(&self) -> UsageSnapshot {
        let optimize_requests = self.optimize_requests.load(Ordering::Relaxed);
        let latency_total = self.latency_micros_total.load(Ordering::Relaxed);
        let average_latency_ms = if optimize_requests > 0 {
            (latency_total as f64 / optimize_requests as f64 / 1000.0 * 100.0).round() / 100.0
        } else {
            0.0
        };

        UsageSnapshot {
            optimize_requests,
            succeeded: self.succeeded.load(Ordering::Relaxed),
            empty_results: self.empty_results.load(Ordering::Relaxed),
            validation_failures: self.validation_failures.load(Ordering::Relaxed),
            upstream_failures: self.upstream_failures.load(Ordering::Relaxed),
            generative_meals: self.generative_meals.load(Ordering::Relaxed),
            rule_based_meals: self.rule_based_meals.load(Ordering::Relaxed),
            average_latency_ms,
        }
    }
}

impl UsageSnapshot {
    pub(crate) fn success_rate(&self) -> f64 {
        if self.optimize_requests == 0 {
            return 1.0;
        }
        (self.succeeded as f64 / self.optimize_requests as f64 * 1000.0).round() / 1000.0
    }
}
