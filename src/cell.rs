use serde::Serialize;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

/// The value of a cell at a point in time, pushed to subscribers on every
/// mutation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CellReading {
    pub total: f64,
    pub growth: f64,
}

/// A named quantity with an accumulated `total` and a per-turn `growth`
/// rate.
///
/// Totals are never clamped. Consumable resources can be driven negative and
/// callers see the negative value; enforcing a floor is the caller's
/// business.
#[derive(Debug)]
pub struct ResourceCell {
    total: f64,
    growth: f64,
    feed: watch::Sender<CellReading>,
}

impl ResourceCell {
    pub fn new(total: f64, growth: f64) -> Self {
        let (feed, _) = watch::channel(CellReading { total, growth });
        Self {
            total,
            growth,
            feed,
        }
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    pub fn growth(&self) -> f64 {
        self.growth
    }

    pub fn reading(&self) -> CellReading {
        CellReading {
            total: self.total,
            growth: self.growth,
        }
    }

    /// Adds to the per-turn growth rate. Additive and order-independent
    /// across callers.
    pub fn increment_per_turn(&mut self, amount: f64) {
        self.growth += amount;
        self.publish();
    }

    /// Adds to the total immediately.
    pub fn increment_total(&mut self, amount: f64) {
        self.total += amount;
        self.publish();
    }

    /// Overwrites the total.
    pub fn set_total(&mut self, value: f64) {
        self.total = value;
        self.publish();
    }

    /// The turn-advance growth step: fold the growth rate into the total.
    pub fn apply_growth(&mut self) {
        if self.growth != 0.0 {
            self.total += self.growth;
            self.publish();
        }
    }

    /// Subscribe to mutations. The receiver always holds the latest reading.
    pub fn subscribe(&self) -> watch::Receiver<CellReading> {
        self.feed.subscribe()
    }

    /// The subscription as an async stream of readings.
    pub fn stream(&self) -> WatchStream<CellReading> {
        WatchStream::new(self.feed.subscribe())
    }

    fn publish(&self) {
        self.feed.send_replace(self.reading());
    }
}
