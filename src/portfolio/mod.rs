// Portfolio valuation from account balances
use crate::api::{Account, MarketData};
use crate::error::ApiError;
use crate::models::{parse_decimal, Snapshot};
use crate::notify::Notifier;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

const TOTAL_PREFIX: &str = "total_";

/// Keep only `total_<currency>` balances above zero
pub fn positive_totals(balances: &Map<String, Value>) -> Map<String, Value> {
    balances
        .iter()
        .filter(|(key, value)| key.starts_with(TOTAL_PREFIX) && parse_decimal(value) > 0.0)
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// One currency held in the account
#[derive(Debug, Clone, PartialEq)]
pub struct Holding {
    pub currency: String,
    pub quantity: f64,
    /// Latest closing price in the quote currency
    pub price: Option<f64>,
    pub value: Option<f64>,
    /// Quantity-weighted mean price of buy fills
    pub avg_cost: Option<f64>,
}

impl Holding {
    /// Unrealised return against the cost basis, in percent
    pub fn unrealised_pct(&self) -> Option<f64> {
        match (self.price, self.avg_cost) {
            (Some(price), Some(cost)) if cost > 0.0 => Some((price - cost) / cost * 100.0),
            _ => None,
        }
    }
}

/// Value each positive balance at the snapshot's closing price.
///
/// The quote currency itself is reported as cash, not as a holding.
pub fn value_holdings(
    totals: &Map<String, Value>,
    snapshot: &Snapshot,
    quote: &str,
) -> (Vec<Holding>, f64) {
    let mut cash = 0.0;
    let mut holdings = Vec::new();

    for (key, amount) in totals {
        let Some(currency) = key.strip_prefix(TOTAL_PREFIX) else {
            continue;
        };
        let currency = currency.to_uppercase();
        let quantity = parse_decimal(amount);
        if !quantity.is_finite() {
            tracing::warn!(currency = %currency, "Unparseable balance: {}", amount);
            continue;
        }

        if currency.eq_ignore_ascii_case(quote) {
            cash += quantity;
            continue;
        }

        let price = snapshot
            .get(&currency)
            .map(|info| info.closing_price)
            .filter(|p| p.is_finite());
        if price.is_none() {
            tracing::warn!(currency = %currency, "No {} price for holding", quote);
        }

        holdings.push(Holding {
            value: price.map(|p| p * quantity),
            currency,
            quantity,
            price,
            avg_cost: None,
        });
    }

    holdings.sort_by(|a, b| {
        b.value
            .unwrap_or(0.0)
            .total_cmp(&a.value.unwrap_or(0.0))
            .then_with(|| a.currency.cmp(&b.currency))
    });

    (holdings, cash)
}

/// Quantity-weighted mean price of the buy fills in `rows`.
///
/// A row is a buy when its `search` code is `"1"`; sells and rows without
/// usable units or price are ignored.
pub fn average_buy_price(rows: &[Value]) -> Option<f64> {
    let (units, cost) = rows
        .iter()
        .filter(|row| row.get("search").and_then(Value::as_str) == Some("1"))
        .filter_map(|row| {
            let units = row.get("units").map(parse_decimal)?;
            let price = row.get("price").map(parse_decimal)?;
            (units.is_finite() && price.is_finite() && units > 0.0).then_some((units, price))
        })
        .fold((0.0, 0.0), |(total_units, total_cost), (units, price)| {
            (total_units + units, total_cost + units * price)
        });

    (units > 0.0).then(|| cost / units)
}

/// Valued account at one point in time
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioDigest {
    pub quote: String,
    pub generated_at: DateTime<Utc>,
    pub holdings: Vec<Holding>,
    pub cash: f64,
}

impl PortfolioDigest {
    pub fn total_value(&self) -> f64 {
        self.cash + self.holdings.iter().filter_map(|h| h.value).sum::<f64>()
    }

    pub fn render(&self) -> String {
        let mut out = format!(
            "*Portfolio* ({})\n\n",
            self.generated_at.format("%Y-%m-%d %H:%M UTC")
        );

        for holding in &self.holdings {
            out.push_str(&format!("{}: {}", holding.currency, holding.quantity));
            match holding.value {
                Some(value) => out.push_str(&format!(" ≈ {:.0} {}", value, self.quote)),
                None => out.push_str(" (no price)"),
            }
            if let (Some(cost), Some(pct)) = (holding.avg_cost, holding.unrealised_pct()) {
                out.push_str(&format!(", avg {:.2} ({:+.2}%)", cost, pct));
            }
            out.push('\n');
        }

        out.push_str(&format!("{}: {:.0}\n", self.quote, self.cash));
        out.push_str(&format!("\nTotal ≈ {:.0} {}\n", self.total_value(), self.quote));
        out
    }
}

/// Builds and delivers the portfolio digest
pub struct PortfolioReporter<A, M, N> {
    account: A,
    market: M,
    notifier: N,
    quote: String,
}

impl<A: Account, M: MarketData, N: Notifier> PortfolioReporter<A, M, N> {
    pub fn new(account: A, market: M, notifier: N, quote: impl Into<String>) -> Self {
        Self {
            account,
            market,
            notifier,
            quote: quote.into(),
        }
    }

    pub async fn digest(&self) -> Result<PortfolioDigest, ApiError> {
        let balances = self.account.balances().await?;
        let totals = positive_totals(&balances);
        tracing::info!("{} positive balance(s)", totals.len());

        let snapshot = self.market.snapshot(&self.quote).await?;
        let (mut holdings, cash) = value_holdings(&totals, &snapshot, &self.quote);

        for holding in &mut holdings {
            match self
                .account
                .user_transactions(&holding.currency, &self.quote)
                .await
            {
                Ok(rows) => holding.avg_cost = average_buy_price(&rows),
                Err(e) => {
                    tracing::warn!(currency = %holding.currency, "Transaction history unavailable: {}", e)
                }
            }
        }

        Ok(PortfolioDigest {
            quote: self.quote.clone(),
            generated_at: Utc::now(),
            holdings,
            cash,
        })
    }

    /// Build the digest and deliver it; delivery failures are logged only
    pub async fn run(&self) -> Result<PortfolioDigest, ApiError> {
        let digest = self.digest().await?;

        if let Err(e) = self.notifier.send(&digest.render()).await {
            tracing::error!("Portfolio delivery failed, not retrying: {}", e);
        }
        Ok(digest)
    }
}
