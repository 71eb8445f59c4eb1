//! Per-run cash and position bookkeeping for the suggestion engine.

use common::Error;

/// A position opened at `entry_index` of the series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpenPosition {
    pub shares: f64,
    pub entry_price: f64,
    pub entry_index: usize,
}

/// Cash plus at most one open position.
#[derive(Debug, Clone)]
pub struct Portfolio {
    initial_capital: f64,
    capital: f64,
    position: Option<OpenPosition>,
}

impl Portfolio {
    pub fn new(initial_capital: f64) -> Self {
        Self {
            initial_capital,
            capital: initial_capital,
            position: None,
        }
    }

    pub fn capital(&self) -> f64 {
        self.capital
    }

    pub fn is_flat(&self) -> bool {
        self.position.is_none()
    }

    /// Capital gained (or lost) since the run started.
    pub fn profit(&self) -> f64 {
        self.capital - self.initial_capital
    }

    /// Spend capital on as many whole shares as it affords at `price`.
    ///
    /// Returns the share count, which may be zero when capital is below one
    /// share's price.
    pub fn open(&mut self, index: usize, price: f64) -> Result<f64, Error> {
        if let Some(pos) = &self.position {
            return Err(Error::InvalidArgument(format!(
                "position already open since index {}",
                pos.entry_index
            )));
        }
        if !price.is_finite() || price <= 0.0 {
            return Err(Error::InvalidPrice { index, price });
        }

        let shares = (self.capital / price).floor();
        self.capital -= shares * price;
        self.position = Some(OpenPosition {
            shares,
            entry_price: price,
            entry_index: index,
        });
        Ok(shares)
    }

    /// Liquidate the open position at `price`, if any.
    ///
    /// A non-finite or negative exit price leaves the position open.
    pub fn close(&mut self, index: usize, price: f64) -> Result<Option<OpenPosition>, Error> {
        if self.position.is_none() {
            return Ok(None);
        }
        if !price.is_finite() || price < 0.0 {
            return Err(Error::InvalidPrice { index, price });
        }
        let pos = self.position.take();
        if let Some(pos) = &pos {
            self.capital += pos.shares * price;
        }
        Ok(pos)
    }
}
