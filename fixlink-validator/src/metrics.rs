/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Validator metric handles.
//!
//! All handles are created against an injected registry; nothing is
//! process-global. Metric names live under the `fix_marketdata_validator`
//! namespace.

use prometheus::{IntCounterVec, IntGaugeVec, Opts, Registry};

/// Namespace of every validator metric.
const NAMESPACE: &str = "fix";

/// Subsystem of every validator metric.
const SUBSYSTEM: &str = "marketdata_validator";

fn opts(name: &str, help: &str) -> Opts {
    Opts::new(name, help).namespace(NAMESPACE).subsystem(SUBSYSTEM)
}

/// Counter and gauge handles of the market-data validator.
#[derive(Debug, Clone)]
pub struct ValidatorMetrics {
    /// Incremental refresh messages received, per security.
    pub incremental_refreshes: IntCounterVec,
    /// Order updates, per security, update action, order type and side.
    pub order_updates: IntCounterVec,
    /// Trade updates, per security and update type.
    pub trade_updates: IntCounterVec,
    /// Validator errors, per security and error label.
    pub errors: IntCounterVec,
    /// Orders currently in the book, per security, type and side.
    pub orders: IntGaugeVec,
    /// Updates that left the book crossed, per security.
    pub crossed_updates: IntCounterVec,
    /// 1 while the book is crossed, per security.
    pub book_crossed: IntGaugeVec,
    /// 1 while the FIX connection is logged on, per session id.
    pub connection: IntGaugeVec,
}

impl ValidatorMetrics {
    /// Creates and registers the validator metrics.
    ///
    /// # Errors
    /// Returns `prometheus::Error` when a handle cannot be registered
    /// (e.g. a name collision on a shared registry).
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let incremental_refreshes = IntCounterVec::new(
            opts(
                "incremental_refreshes_total",
                "Number of incremental refresh messages received",
            ),
            &["security"],
        )?;
        let order_updates = IntCounterVec::new(
            opts("order_updates_total", "Number of order updates"),
            &["security", "update", "type", "side"],
        )?;
        let trade_updates = IntCounterVec::new(
            opts("trade_updates_total", "Number of trade updates"),
            &["security", "type"],
        )?;
        let errors = IntCounterVec::new(
            opts("errors_total", "Number of validator errors"),
            &["security", "error"],
        )?;
        let orders = IntGaugeVec::new(
            opts("orders", "Current orders in the book"),
            &["security", "type", "side"],
        )?;
        let crossed_updates = IntCounterVec::new(
            opts(
                "crossed_updates_total",
                "Number of updates that resulted in a crossed book",
            ),
            &["security"],
        )?;
        let book_crossed = IntGaugeVec::new(
            opts("book_crossed", "Book crossed for security"),
            &["security"],
        )?;
        let connection = IntGaugeVec::new(
            opts("fix_connection", "Status of the FIX connection"),
            &["sessionID"],
        )?;

        registry.register(Box::new(incremental_refreshes.clone()))?;
        registry.register(Box::new(order_updates.clone()))?;
        registry.register(Box::new(trade_updates.clone()))?;
        registry.register(Box::new(errors.clone()))?;
        registry.register(Box::new(orders.clone()))?;
        registry.register(Box::new(crossed_updates.clone()))?;
        registry.register(Box::new(book_crossed.clone()))?;
        registry.register(Box::new(connection.clone()))?;

        Ok(Self {
            incremental_refreshes,
            order_updates,
            trade_updates,
            errors,
            orders,
            crossed_updates,
            book_crossed,
            connection,
        })
    }

    /// Seeds a security's error and crossed counters at zero so delta
    /// queries work from the first reported error.
    pub fn seed_security(&self, security: &str) {
        self.errors
            .with_label_values(&[security, "order not found"])
            .inc_by(0);
        self.errors
            .with_label_values(&[security, "order already exists"])
            .inc_by(0);
        self.crossed_updates.with_label_values(&[security]).inc_by(0);
        self.book_crossed.with_label_values(&[security]).set(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prometheus::Encoder;

    #[test]
    fn test_metrics_register_once() {
        let registry = Registry::new();
        let metrics = ValidatorMetrics::new(&registry).unwrap();
        metrics.seed_security("ABC");

        metrics
            .order_updates
            .with_label_values(&["ABC", "new", "limit", "bid"])
            .inc();
        metrics.book_crossed.with_label_values(&["ABC"]).set(1);

        let mut buffer = Vec::new();
        prometheus::TextEncoder::new()
            .encode(&registry.gather(), &mut buffer)
            .unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.contains("fix_marketdata_validator_order_updates_total"));
        assert!(text.contains("fix_marketdata_validator_book_crossed"));
    }

    #[test]
    fn test_double_registration_fails() {
        let registry = Registry::new();
        let _first = ValidatorMetrics::new(&registry).unwrap();
        assert!(ValidatorMetrics::new(&registry).is_err());
    }

    #[test]
    fn test_seed_security_zeroes() {
        let registry = Registry::new();
        let metrics = ValidatorMetrics::new(&registry).unwrap();
        metrics.seed_security("XYZ");

        assert_eq!(
            metrics
                .errors
                .with_label_values(&["XYZ", "order not found"])
                .get(),
            0
        );
        assert_eq!(metrics.book_crossed.with_label_values(&["XYZ"]).get(), 0);
    }
}
